//! 基本变换通道
//!
//! `NodeTransform` 保存一个原始变换通道（矩阵、平移、旋转或缩放）的源参数，
//! 以及由源参数派生出的 4x4 缓存矩阵。
//!
//! 旋转通道的角度以**度**存储在源参数中，在 [`NodeTransform::recalculate_matrix`]
//! 中转换为弧度。这是本 crate 唯一的角度约定。

use std::fmt::Write as _;
use std::ops::Mul;

use glam::{DMat4, DVec3};
use serde::{Deserialize, Serialize};

use crate::core::error::{SkeletonError, SkeletonResult};

/// 变换通道类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransformKind {
    /// 完整 4x4 矩阵（16 个值，行主序）
    Matrix,
    /// 平移 (x, y, z)
    Translate,
    /// 旋转 (轴 x, 轴 y, 轴 z, 角度)
    Rotate,
    /// 缩放 (x, y, z)
    Scale,
}

impl TransformKind {
    /// 该类型要求的源参数个数
    pub fn arity(self) -> usize {
        match self {
            TransformKind::Matrix => 16,
            TransformKind::Translate | TransformKind::Scale => 3,
            TransformKind::Rotate => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TransformKind::Matrix => "MATRIX",
            TransformKind::Translate => "TRANSLATE",
            TransformKind::Rotate => "ROTATE",
            TransformKind::Scale => "SCALE",
        }
    }
}

/// 原始变换通道
///
/// 修改源参数后缓存矩阵即失效（[`is_stale`](Self::is_stale) 返回 `true`），
/// 必须调用 [`recalculate_matrix`](Self::recalculate_matrix) 重新派生。
#[derive(Debug, Clone, PartialEq)]
pub struct NodeTransform {
    sid: String,
    kind: TransformKind,
    source: Vec<f64>,
    transform: DMat4,
    stale: bool,
}

impl NodeTransform {
    pub fn new(kind: TransformKind) -> Self {
        Self {
            sid: "_default_".to_string(),
            kind,
            source: Vec::new(),
            transform: DMat4::IDENTITY,
            stale: false,
        }
    }

    pub fn with_matrix(matrix: DMat4, sid: impl Into<String>, kind: TransformKind) -> Self {
        Self {
            sid: sid.into(),
            kind,
            source: Vec::new(),
            transform: matrix,
            stale: false,
        }
    }

    pub fn sid(&self) -> &str {
        &self.sid
    }

    pub fn set_sid(&mut self, sid: impl Into<String>) {
        self.sid = sid.into();
    }

    pub fn kind(&self) -> TransformKind {
        self.kind
    }

    pub fn source(&self) -> &[f64] {
        &self.source
    }

    /// 缓存矩阵。源参数修改后需先调用 `recalculate_matrix`。
    pub fn matrix(&self) -> DMat4 {
        self.transform
    }

    /// 直接替换缓存矩阵
    pub fn set(&mut self, matrix: DMat4) {
        self.transform = matrix;
        self.stale = false;
    }

    /// 源参数是否在最近一次 `recalculate_matrix` 之后被修改过
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// 以行主序写入 16 个矩阵分量
    pub fn set_source_matrix(&mut self, matrix: DMat4) {
        self.source = matrix.transpose().to_cols_array().to_vec();
        self.stale = true;
    }

    /// 写入平移或缩放向量
    pub fn set_source_vector(&mut self, vector: DVec3) {
        self.source = vec![vector.x, vector.y, vector.z];
        self.stale = true;
    }

    /// 写入旋转轴与角度（度）
    pub fn set_source_axis_angle(&mut self, axis: DVec3, angle_degrees: f64) {
        self.source = vec![axis.x, axis.y, axis.z, angle_degrees];
        self.stale = true;
    }

    /// 修改单个源参数分量，用于动画采样
    pub fn set_component(&mut self, index: usize, value: f64) -> SkeletonResult<()> {
        let len = self.source.len();
        let slot = self
            .source
            .get_mut(index)
            .ok_or(SkeletonError::ComponentOutOfRange { index, len })?;
        *slot = value;
        self.stale = true;
        Ok(())
    }

    /// 根据源参数重新计算缓存矩阵
    pub fn recalculate_matrix(&mut self) -> SkeletonResult<()> {
        let expected = self.kind.arity();
        if self.source.len() != expected {
            return Err(self.invalid_data());
        }

        let s = &self.source;
        self.transform = match self.kind {
            TransformKind::Matrix => {
                let mut values = [0.0; 16];
                values.copy_from_slice(s);
                // 源数据为行主序，glam 为列主序
                DMat4::from_cols_array(&values).transpose()
            }
            TransformKind::Translate => DMat4::from_translation(DVec3::new(s[0], s[1], s[2])),
            TransformKind::Rotate => {
                let axis = DVec3::new(s[0], s[1], s[2]);
                if !axis.is_finite() || axis.length_squared() == 0.0 {
                    return Err(self.invalid_data());
                }
                DMat4::from_axis_angle(axis.normalize(), s[3].to_radians())
            }
            TransformKind::Scale => DMat4::from_scale(DVec3::new(s[0], s[1], s[2])),
        };
        self.stale = false;
        Ok(())
    }

    /// 源参数的可读描述
    pub fn source_report(&self) -> String {
        let mut report = self.sid.clone();
        for value in &self.source {
            let _ = write!(report, " {}", value);
        }
        report
    }

    fn invalid_data(&self) -> SkeletonError {
        SkeletonError::InvalidChannelData {
            kind: self.kind,
            expected: self.kind.arity(),
            actual: self.source.len(),
        }
    }
}

impl Mul<&NodeTransform> for &NodeTransform {
    type Output = DMat4;

    fn mul(self, rhs: &NodeTransform) -> DMat4 {
        self.transform * rhs.transform
    }
}

impl Mul<DMat4> for &NodeTransform {
    type Output = DMat4;

    fn mul(self, rhs: DMat4) -> DMat4 {
        self.transform * rhs
    }
}
