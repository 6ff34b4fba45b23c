//! 骨骼数据结构
//!
//! `Skeleton` 独占一棵节点树，维护句柄到节点的稠密映射，
//! 并持有命名动画与逐顶点的蒙皮权重。

use std::collections::HashMap;
use std::fmt::Write as _;

use glam::{DMat4, DVec3};

use super::clip::{scale_translation, SkeletonAnimation};
use super::service::SkeletonService;
use super::skeleton_node::{NodeIndex, NodeTree, SkeletonNode};
use super::skin::{NodeWeight, VertexWeights};
use crate::core::error::{SkeletonError, SkeletonResult};

// ============================================================================
// 骨骼
// ============================================================================

/// 骨骼
#[derive(Debug, Clone)]
pub struct Skeleton {
    /// 节点树
    tree: NodeTree,
    /// 根节点
    root: Option<NodeIndex>,
    /// 句柄 -> 节点索引
    handles: Vec<NodeIndex>,
    /// 网格到骨骼的全局对齐变换
    bind_shape_transform: DMat4,
    /// 动画名称 -> 动画
    animations: HashMap<String, SkeletonAnimation>,
    /// 逐顶点权重
    weights: VertexWeights,
}

impl Default for Skeleton {
    fn default() -> Self {
        Self {
            tree: NodeTree::new(),
            root: None,
            handles: Vec::new(),
            bind_shape_transform: DMat4::IDENTITY,
            animations: HashMap::new(),
            weights: VertexWeights::new(),
        }
    }
}

impl Skeleton {
    /// 由加载器构建的节点树创建骨骼
    pub fn new(tree: NodeTree, root: NodeIndex) -> SkeletonResult<Self> {
        let mut skeleton = Self {
            tree,
            ..Self::default()
        };
        skeleton.set_root_node(root)?;
        Ok(skeleton)
    }

    pub fn tree(&self) -> &NodeTree {
        &self.tree
    }

    /// 可变访问节点树；在根下追加节点后需调用 `build_node_map`
    pub fn tree_mut(&mut self) -> &mut NodeTree {
        &mut self.tree
    }

    pub fn set_root_node(&mut self, root: NodeIndex) -> SkeletonResult<()> {
        self.tree.node(root)?;
        self.root = Some(root);
        self.build_node_map()
    }

    pub fn root(&self) -> Option<NodeIndex> {
        self.root
    }

    pub fn root_node(&self) -> Option<&SkeletonNode> {
        self.root.and_then(|root| self.tree.get(root))
    }

    /// 从根开始先序遍历，按顺序分配从 0 开始的句柄
    pub fn build_node_map(&mut self) -> SkeletonResult<()> {
        for index in std::mem::take(&mut self.handles) {
            if let Some(node) = self.tree.get_mut(index) {
                node.handle = None;
            }
        }

        let Some(root) = self.root else {
            return Ok(());
        };

        let order = SkeletonService::subtree_preorder(&self.tree, root)?;
        for (handle, &index) in order.iter().enumerate() {
            self.tree.node_mut(index)?.handle = Some(handle);
        }
        self.handles = order;

        tracing::debug!(target: "skeleton", "Node map rebuilt with {} nodes", self.handles.len());
        Ok(())
    }

    pub fn node(&self, index: NodeIndex) -> SkeletonResult<&SkeletonNode> {
        self.tree.node(index)
    }

    pub fn node_mut(&mut self, index: NodeIndex) -> SkeletonResult<&mut SkeletonNode> {
        self.tree.node_mut(index)
    }

    /// 按句柄访问；未分配的句柄返回 `HandleOutOfRange`
    pub fn node_by_handle(&self, handle: usize) -> SkeletonResult<&SkeletonNode> {
        let index = self
            .handles
            .get(handle)
            .ok_or(SkeletonError::HandleOutOfRange {
                handle,
                count: self.handles.len(),
            })?;
        self.tree.node(*index)
    }

    /// 按句柄顺序返回第一个同名节点
    pub fn node_by_name(&self, name: &str) -> Option<&SkeletonNode> {
        self.nodes().find(|node| node.name() == name)
    }

    /// 按句柄顺序返回第一个 ID 匹配的节点
    pub fn node_by_id(&self, id: &str) -> Option<&SkeletonNode> {
        self.nodes().find(|node| node.id() == id)
    }

    /// 按句柄顺序遍历节点
    pub fn nodes(&self) -> impl Iterator<Item = &SkeletonNode> {
        self.handles.iter().filter_map(|&index| self.tree.get(index))
    }

    pub fn num_nodes(&self) -> usize {
        self.handles.len()
    }

    pub fn num_joints(&self) -> usize {
        self.nodes().filter(|node| node.is_joint()).count()
    }

    // ------------------------------------------------------------------
    // 变换
    // ------------------------------------------------------------------

    pub fn set_transform(
        &mut self,
        node: NodeIndex,
        matrix: DMat4,
        propagate: bool,
    ) -> SkeletonResult<()> {
        SkeletonService::set_transform(&mut self.tree, node, matrix, propagate)
    }

    pub fn set_initial_transform(&mut self, node: NodeIndex, matrix: DMat4) -> SkeletonResult<()> {
        SkeletonService::set_initial_transform(&mut self.tree, node, matrix)
    }

    pub fn set_model_transform(
        &mut self,
        node: NodeIndex,
        matrix: DMat4,
        propagate: bool,
    ) -> SkeletonResult<()> {
        SkeletonService::set_model_transform(&mut self.tree, node, matrix, propagate)
    }

    pub fn reset(&mut self, node: NodeIndex, recursive: bool) -> SkeletonResult<()> {
        SkeletonService::reset(&mut self.tree, node, recursive)
    }

    pub fn update_children_transforms(&mut self, node: NodeIndex) -> SkeletonResult<()> {
        SkeletonService::update_children_transforms(&mut self.tree, node)
    }

    /// 缩放骨骼
    ///
    /// 只缩放每个节点局部变换与每个动画关键帧的平移分量；
    /// 旋转/缩放分量、绑定形状变换与顶点权重保持不变。
    pub fn scale(&mut self, factor: f64) -> SkeletonResult<()> {
        for index in self.handles.clone() {
            let mut local = self.tree.node(index)?.transform();
            scale_translation(&mut local, factor);
            SkeletonService::set_transform(&mut self.tree, index, local, false)?;
        }

        if let Some(root) = self.root {
            SkeletonService::update_children_transforms(&mut self.tree, root)?;
        }

        for animation in self.animations.values_mut() {
            animation.scale(factor);
        }

        tracing::debug!(target: "skeleton", "Scaled skeleton by {}", factor);
        Ok(())
    }

    pub fn set_bind_shape_transform(&mut self, matrix: DMat4) {
        self.bind_shape_transform = matrix;
    }

    pub fn bind_shape_transform(&self) -> DMat4 {
        self.bind_shape_transform
    }

    // ------------------------------------------------------------------
    // 顶点权重
    // ------------------------------------------------------------------

    pub fn set_num_vert_attached(&mut self, vertices: usize) {
        self.weights.resize(vertices);
    }

    pub fn num_vert_attached(&self) -> usize {
        self.weights.len()
    }

    pub fn add_vert_node_weight(
        &mut self,
        vertex: usize,
        node: impl Into<String>,
        weight: f64,
    ) -> SkeletonResult<()> {
        self.weights.add(vertex, node, weight)
    }

    pub fn num_vert_node_weights(&self, vertex: usize) -> SkeletonResult<usize> {
        self.weights.weights(vertex).map(<[NodeWeight]>::len)
    }

    pub fn vert_node_weight(&self, vertex: usize, index: usize) -> SkeletonResult<&NodeWeight> {
        self.weights.weight(vertex, index)
    }

    pub fn vertex_weights(&self) -> &VertexWeights {
        &self.weights
    }

    // ------------------------------------------------------------------
    // 动画
    // ------------------------------------------------------------------

    /// 添加动画，同名动画被覆盖
    pub fn add_animation(&mut self, name: impl Into<String>, animation: SkeletonAnimation) {
        self.animations.insert(name.into(), animation);
    }

    pub fn animation(&self, name: &str) -> Option<&SkeletonAnimation> {
        self.animations.get(name)
    }

    pub fn animation_list(&self) -> &HashMap<String, SkeletonAnimation> {
        &self.animations
    }

    pub fn num_animations(&self) -> usize {
        self.animations.len()
    }

    /// 将动画在指定时间的姿态应用到骨骼
    ///
    /// 先设置每个被动画节点的局部变换，再从根统一更新模型变换。
    pub fn apply_animation(&mut self, name: &str, time: f64, looping: bool) -> SkeletonResult<()> {
        let pose = self
            .animations
            .get(name)
            .ok_or_else(|| SkeletonError::UnknownAnimation(name.to_string()))?
            .pose_at(time, looping);
        let root = self.root.ok_or(SkeletonError::NoRoot)?;

        for (node_name, matrix) in pose {
            match self.node_by_name(&node_name).map(SkeletonNode::index) {
                Some(index) => SkeletonService::set_transform(&mut self.tree, index, matrix, false)?,
                None => {
                    tracing::debug!(target: "skeleton", "Animation '{}' targets missing node '{}'", name, node_name)
                }
            }
        }

        let root_local = self.tree.node(root)?.transform();
        SkeletonService::set_transform(&mut self.tree, root, root_local, true)?;

        tracing::trace!(target: "skeleton", "Applied animation '{}' at t={}", name, time);
        Ok(())
    }

    // ------------------------------------------------------------------
    // 蒙皮
    // ------------------------------------------------------------------

    /// 最终蒙皮矩阵：模型变换 * 逆绑定变换 * 绑定形状变换
    pub fn skinning_matrix(&self, node: NodeIndex) -> SkeletonResult<DMat4> {
        let node = self.tree.node(node)?;
        Ok(node.model_transform() * node.inverse_bind_transform() * self.bind_shape_transform)
    }

    /// 按顶点权重混合蒙皮后的位置，权重按总和归一化
    pub fn skin_position(&self, vertex: usize, position: DVec3) -> SkeletonResult<DVec3> {
        let weights = self.weights.weights(vertex)?;
        let total: f64 = weights.iter().map(|w| w.weight).sum();
        if total.abs() <= f64::EPSILON {
            return Ok(self.bind_shape_transform.transform_point3(position));
        }

        let mut blended = DVec3::ZERO;
        for weight in weights {
            let node = self
                .node_by_name(&weight.node)
                .ok_or_else(|| SkeletonError::UnknownNodeName(weight.node.clone()))?;
            blended += self.skinning_matrix(node.index())?.transform_point3(position) * weight.weight;
        }
        Ok(blended / total)
    }

    /// 按句柄顺序返回所有关节的单精度蒙皮矩阵
    pub fn skinning_matrices_f32(&self) -> Vec<[[f32; 4]; 4]> {
        self.nodes()
            .filter(|node| node.is_joint())
            .map(|node| {
                (node.model_transform() * node.inverse_bind_transform() * self.bind_shape_transform)
                    .as_mat4()
                    .to_cols_array_2d()
            })
            .collect()
    }

    /// 蒙皮矩阵的字节表示，用于写入 GPU 缓冲区
    pub fn skinning_matrix_bytes(&self) -> Vec<u8> {
        let data = self.skinning_matrices_f32();
        bytemuck::cast_slice(&data).to_vec()
    }

    // ------------------------------------------------------------------
    // 诊断
    // ------------------------------------------------------------------

    /// 可读的变换转储（非稳定格式）
    pub fn transforms_report(&self) -> String {
        let mut report = String::new();
        for node in self.nodes() {
            let _ = writeln!(report, "---------------\n{}", node.name());

            for raw in node.raw_transforms() {
                let _ = writeln!(report, "\t{} {}", raw.sid(), raw.kind().label());
                let _ = writeln!(report, "{}\n+++++++++++", raw.matrix());
            }

            let _ = writeln!(report, "{}", node.model_transform());
            if node.is_joint() {
                let _ = writeln!(report, "{}", node.inverse_bind_transform());
            }
        }
        report
    }

    pub fn log_transforms(&self) {
        if tracing::enabled!(target: "skeleton", tracing::Level::DEBUG) {
            tracing::debug!(target: "skeleton", "\n{}", self.transforms_report());
        }
    }
}

// ============================================================================
// 测试
// ============================================================================
