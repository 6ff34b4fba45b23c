//! 蒙皮绑定数据
//!
//! 每个顶点对应一组 (节点名称, 权重)。本层不做归一化，
//! 权重之和由消费方（蒙皮求值器）负责处理。

use crate::core::error::{SkeletonError, SkeletonResult};

/// 顶点对单个节点的权重
#[derive(Debug, Clone, PartialEq)]
pub struct NodeWeight {
    pub node: String,
    pub weight: f64,
}

/// 原始顶点权重表（按顶点索引）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VertexWeights {
    vertices: Vec<Vec<NodeWeight>>,
}

impl VertexWeights {
    pub fn new() -> Self {
        Self::default()
    }

    /// 调整顶点数量；保留已有顶点的权重，新顶点为空列表
    pub fn resize(&mut self, vertices: usize) {
        self.vertices.resize_with(vertices, Vec::new);
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn add(&mut self, vertex: usize, node: impl Into<String>, weight: f64) -> SkeletonResult<()> {
        let count = self.vertices.len();
        self.vertices
            .get_mut(vertex)
            .ok_or(SkeletonError::VertexOutOfRange { vertex, count })?
            .push(NodeWeight {
                node: node.into(),
                weight,
            });
        Ok(())
    }

    pub fn weights(&self, vertex: usize) -> SkeletonResult<&[NodeWeight]> {
        self.vertices
            .get(vertex)
            .map(Vec::as_slice)
            .ok_or(SkeletonError::VertexOutOfRange {
                vertex,
                count: self.vertices.len(),
            })
    }

    pub fn weight(&self, vertex: usize, index: usize) -> SkeletonResult<&NodeWeight> {
        let weights = self.weights(vertex)?;
        weights.get(index).ok_or(SkeletonError::WeightOutOfRange {
            vertex,
            index,
            count: weights.len(),
        })
    }
}
