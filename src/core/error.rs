//! 统一错误处理模块
//!
//! 提供骨骼系统范围内的统一错误类型定义
//!
//! ## 错误分类
//!
//! - **查找失败**: 按名称/ID 查找节点时返回 `None`，不产生错误
//! - **越界访问**: 句柄、顶点索引、分量索引越界 (`*OutOfRange`)
//! - **奇异变换**: 父节点模型变换不可逆 (`SingularTransform`)
//! - **通道数据无效**: `NodeTransform` 源参数个数与类型不符 (`InvalidChannelData`)
//!
//! 所有错误都是局部可恢复的，由调用方（加载器或求值器）处理。

use thiserror::Error;

use crate::animation::node_transform::TransformKind;
use crate::animation::skeleton_node::NodeIndex;

/// 骨骼数据模型错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SkeletonError {
    #[error("Unknown node index: {0}")]
    UnknownNode(NodeIndex),

    #[error("Unknown node name: {0}")]
    UnknownNodeName(String),

    #[error("Skeleton has no root node")]
    NoRoot,

    #[error("Node handle {handle} out of range (skeleton has {count} nodes)")]
    HandleOutOfRange { handle: usize, count: usize },

    #[error("Vertex {vertex} out of range ({count} vertices attached)")]
    VertexOutOfRange { vertex: usize, count: usize },

    #[error("Weight {index} out of range for vertex {vertex} ({count} weights)")]
    WeightOutOfRange {
        vertex: usize,
        index: usize,
        count: usize,
    },

    #[error("Source component {index} out of range (source has {len} values)")]
    ComponentOutOfRange { index: usize, len: usize },

    #[error("Parent model transform of node '{node}' is singular")]
    SingularTransform { node: String },

    #[error("Invalid {kind:?} channel data: expected {expected} values, got {actual}")]
    InvalidChannelData {
        kind: TransformKind,
        expected: usize,
        actual: usize,
    },

    #[error("Cached model transform of node '{node}' does not match its ancestors")]
    InconsistentModelTransform { node: String },

    #[error("Unknown animation: {0}")]
    UnknownAnimation(String),
}

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 文件读取错误
    #[error("Config file error: {0}")]
    FileError(#[from] std::io::Error),
    /// 解析错误
    #[error("Config parse error: {0}")]
    ParseError(String),
    /// 验证错误
    #[error("Config validation error: {0}")]
    ValidationError(String),
}

pub type SkeletonResult<T> = Result<T, SkeletonError>;
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SkeletonError::HandleOutOfRange {
            handle: 7,
            count: 3,
        };
        assert_eq!(
            err.to_string(),
            "Node handle 7 out of range (skeleton has 3 nodes)"
        );

        let err = SkeletonError::InvalidChannelData {
            kind: TransformKind::Rotate,
            expected: 4,
            actual: 3,
        };
        assert!(err.to_string().contains("Rotate"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: ConfigError = io.into();
        assert!(matches!(err, ConfigError::FileError(_)));
    }
}
