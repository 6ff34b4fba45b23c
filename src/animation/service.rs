//! 骨骼变换服务层
//!
//! 遵循贫血模型，节点树只保存数据，变换传播逻辑封装在 `SkeletonService` 中。
//! 所有函数都显式接收节点树与节点索引。
//!
//! 不变式：对树中任意节点 N，
//! `N.model = (N.parent 为空 ? 单位矩阵 : N.parent.model) * N.local`。

use glam::{DMat4, DVec4};

use super::skeleton_node::{NodeIndex, NodeTree};
use crate::core::error::{SkeletonError, SkeletonResult};

/// 骨骼变换服务 - 封装节点树上的变换算法
pub struct SkeletonService;

impl SkeletonService {
    /// 设置局部变换并重新计算模型变换
    ///
    /// `propagate` 为 `true` 时同时更新全部后代的模型变换。
    pub fn set_transform(
        tree: &mut NodeTree,
        node: NodeIndex,
        matrix: DMat4,
        propagate: bool,
    ) -> SkeletonResult<()> {
        let parent_model = tree.parent_model_transform(node)?;
        let target = tree.node_mut(node)?;
        target.transform = matrix;
        target.model_transform = parent_model * matrix;

        if propagate {
            Self::update_children_transforms(tree, node)?;
        }
        Ok(())
    }

    /// 设置重置基准并应用为当前局部变换（同时传播）
    pub fn set_initial_transform(
        tree: &mut NodeTree,
        node: NodeIndex,
        matrix: DMat4,
    ) -> SkeletonResult<()> {
        tree.node_mut(node)?.initial_transform = matrix;
        Self::set_transform(tree, node, matrix, true)
    }

    /// 直接设置模型变换，并反推局部变换
    ///
    /// 父节点模型变换不可逆时返回 `SingularTransform`，节点保持不变。
    pub fn set_model_transform(
        tree: &mut NodeTree,
        node: NodeIndex,
        matrix: DMat4,
        propagate: bool,
    ) -> SkeletonResult<()> {
        let has_parent = tree.node(node)?.parent().is_some();
        let local = if has_parent {
            let parent_model = tree.parent_model_transform(node)?;
            let relative = relative_determinant(&parent_model);
            let inverse = parent_model.inverse();
            if !relative.is_finite()
                || relative.abs() <= tree.settings().singular_epsilon
                || !inverse.is_finite()
            {
                return Err(SkeletonError::SingularTransform {
                    node: tree.node(node)?.name().to_string(),
                });
            }
            inverse * matrix
        } else {
            matrix
        };

        let target = tree.node_mut(node)?;
        target.model_transform = matrix;
        target.transform = local;

        if propagate {
            Self::update_children_transforms(tree, node)?;
        }
        Ok(())
    }

    /// 恢复初始变换
    ///
    /// `recursive` 为 `true` 时整棵子树都恢复初始变换。
    pub fn reset(tree: &mut NodeTree, node: NodeIndex, recursive: bool) -> SkeletonResult<()> {
        if recursive {
            for index in Self::subtree_preorder(tree, node)? {
                let target = tree.node_mut(index)?;
                target.transform = target.initial_transform;
            }
        }

        let initial = tree.node(node)?.initial_transform();
        Self::set_transform(tree, node, initial, true)
    }

    /// 根据祖先的当前状态重新计算所有后代的模型变换
    ///
    /// 先序遍历，节点的模型变换确定后才处理其子树。
    pub fn update_children_transforms(tree: &mut NodeTree, node: NodeIndex) -> SkeletonResult<()> {
        let mut to_visit: Vec<NodeIndex> = tree.node(node)?.children().iter().rev().copied().collect();

        while let Some(index) = to_visit.pop() {
            let parent_model = tree.parent_model_transform(index)?;
            let current = tree.node_mut(index)?;
            current.model_transform = parent_model * current.transform;
            to_visit.extend(current.children().iter().rev().copied());
        }

        if tree.settings().verify_after_update {
            if let Err(err) = Self::verify_model_transforms(tree, node) {
                tracing::warn!(target: "skeleton", "Model transform drift after update: {}", err);
            }
        }
        Ok(())
    }

    /// 重新计算子树中每个节点的模型变换并与缓存值比较
    pub fn verify_model_transforms(tree: &NodeTree, node: NodeIndex) -> SkeletonResult<()> {
        let tolerance = tree.settings().consistency_tolerance;

        for index in Self::subtree_preorder(tree, node)? {
            let current = tree.node(index)?;
            let expected = tree.parent_model_transform(index)? * current.transform();
            let scale = expected
                .to_cols_array()
                .iter()
                .fold(1.0_f64, |acc, v| acc.max(v.abs()));
            if !current
                .model_transform()
                .abs_diff_eq(expected, tolerance * scale)
            {
                return Err(SkeletonError::InconsistentModelTransform {
                    node: current.name().to_string(),
                });
            }
        }
        Ok(())
    }

    /// 子树的先序序列：先处理节点，再按存储顺序处理子节点
    pub fn subtree_preorder(tree: &NodeTree, node: NodeIndex) -> SkeletonResult<Vec<NodeIndex>> {
        tree.node(node)?;

        let mut order = Vec::new();
        let mut to_visit = vec![node];
        while let Some(index) = to_visit.pop() {
            order.push(index);
            to_visit.extend(tree.node(index)?.children().iter().rev().copied());
        }
        Ok(order)
    }
}

/// 行列式除以各列长度之积，结果与均匀缩放无关，绝对值不超过 1
///
/// 仿射矩阵只取左上 3x3 部分，平移不参与计算。
fn relative_determinant(matrix: &DMat4) -> f64 {
    let det = matrix.determinant();
    let norm = if matrix.row(3) == DVec4::W {
        matrix.x_axis.truncate().length()
            * matrix.y_axis.truncate().length()
            * matrix.z_axis.truncate().length()
    } else {
        matrix.x_axis.length() * matrix.y_axis.length() * matrix.z_axis.length() * matrix.w_axis.length()
    };
    if norm == 0.0 {
        0.0
    } else {
        det / norm
    }
}
