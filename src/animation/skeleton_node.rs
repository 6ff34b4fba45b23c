//! 骨骼节点与节点树
//!
//! 节点存储在 [`NodeTree`] 中（按创建顺序排列的数组），通过 [`NodeIndex`] 寻址。
//! 父节点引用是非拥有的索引；子节点列表保持插入顺序。树只能追加，不支持分离节点。

use std::fmt;

use glam::DMat4;
use serde::{Deserialize, Serialize};

use super::node_transform::NodeTransform;
use crate::config::TransformSettings;
use crate::core::error::{SkeletonError, SkeletonResult};

/// 节点在 [`NodeTree`] 中的位置（创建顺序）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(pub(crate) usize);

impl NodeIndex {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 节点类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SkeletonNodeKind {
    #[default]
    Node,
    Joint,
}

/// 骨骼节点
#[derive(Debug, Clone)]
pub struct SkeletonNode {
    index: NodeIndex,
    name: String,
    id: String,
    kind: SkeletonNodeKind,
    /// 局部变换（相对于父节点）
    pub(crate) transform: DMat4,
    /// 模型变换（相对于骨骼根）
    pub(crate) model_transform: DMat4,
    pub(crate) initial_transform: DMat4,
    inverse_bind_transform: DMat4,
    raw_transforms: Vec<NodeTransform>,
    parent: Option<NodeIndex>,
    children: Vec<NodeIndex>,
    pub(crate) handle: Option<usize>,
}

impl SkeletonNode {
    fn new(
        index: NodeIndex,
        parent: Option<NodeIndex>,
        name: String,
        id: String,
        kind: SkeletonNodeKind,
    ) -> Self {
        Self {
            index,
            name,
            id,
            kind,
            transform: DMat4::IDENTITY,
            model_transform: DMat4::IDENTITY,
            initial_transform: DMat4::IDENTITY,
            inverse_bind_transform: DMat4::IDENTITY,
            raw_transforms: Vec::new(),
            parent,
            children: Vec::new(),
            handle: None,
        }
    }

    pub fn index(&self) -> NodeIndex {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    pub fn kind(&self) -> SkeletonNodeKind {
        self.kind
    }

    pub fn set_kind(&mut self, kind: SkeletonNodeKind) {
        self.kind = kind;
    }

    pub fn is_joint(&self) -> bool {
        self.kind == SkeletonNodeKind::Joint
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// 局部变换
    pub fn transform(&self) -> DMat4 {
        self.transform
    }

    /// 模型变换（缓存值）
    pub fn model_transform(&self) -> DMat4 {
        self.model_transform
    }

    pub fn initial_transform(&self) -> DMat4 {
        self.initial_transform
    }

    /// 逆绑定变换，仅对关节有意义
    pub fn inverse_bind_transform(&self) -> DMat4 {
        self.inverse_bind_transform
    }

    pub fn set_inverse_bind_transform(&mut self, matrix: DMat4) {
        self.inverse_bind_transform = matrix;
    }

    pub fn parent(&self) -> Option<NodeIndex> {
        self.parent
    }

    pub fn children(&self) -> &[NodeIndex] {
        &self.children
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// 由所属骨骼的 `build_node_map` 分配
    pub fn handle(&self) -> Option<usize> {
        self.handle
    }

    pub fn raw_transforms(&self) -> &[NodeTransform] {
        &self.raw_transforms
    }

    pub fn num_raw_transforms(&self) -> usize {
        self.raw_transforms.len()
    }

    pub fn raw_transform(&self, index: usize) -> Option<&NodeTransform> {
        self.raw_transforms.get(index)
    }

    pub fn raw_transform_mut(&mut self, index: usize) -> Option<&mut NodeTransform> {
        self.raw_transforms.get_mut(index)
    }

    pub fn add_raw_transform(&mut self, transform: NodeTransform) {
        self.raw_transforms.push(transform);
    }
}

/// 节点树（节点数组）
///
/// 丢弃整棵树时逐个释放数组元素，不会递归。
#[derive(Debug, Clone, Default)]
pub struct NodeTree {
    nodes: Vec<SkeletonNode>,
    settings: TransformSettings,
}

impl NodeTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: TransformSettings) -> Self {
        Self {
            nodes: Vec::new(),
            settings,
        }
    }

    pub fn settings(&self) -> &TransformSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: TransformSettings) {
        self.settings = settings;
    }

    /// 创建节点；`parent` 不为空时立即登记为其最后一个子节点
    pub fn add_node(
        &mut self,
        parent: Option<NodeIndex>,
        name: impl Into<String>,
        id: impl Into<String>,
        kind: SkeletonNodeKind,
    ) -> SkeletonResult<NodeIndex> {
        if let Some(parent) = parent {
            self.node(parent)?;
        }

        let index = NodeIndex(self.nodes.len());
        self.nodes
            .push(SkeletonNode::new(index, parent, name.into(), id.into(), kind));

        if let Some(parent) = parent {
            self.nodes[parent.0].children.push(index);
        }
        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, index: NodeIndex) -> Option<&SkeletonNode> {
        self.nodes.get(index.0)
    }

    pub fn get_mut(&mut self, index: NodeIndex) -> Option<&mut SkeletonNode> {
        self.nodes.get_mut(index.0)
    }

    pub fn node(&self, index: NodeIndex) -> SkeletonResult<&SkeletonNode> {
        self.get(index).ok_or(SkeletonError::UnknownNode(index))
    }

    pub fn node_mut(&mut self, index: NodeIndex) -> SkeletonResult<&mut SkeletonNode> {
        self.nodes
            .get_mut(index.0)
            .ok_or(SkeletonError::UnknownNode(index))
    }

    /// 按创建顺序遍历所有节点
    pub fn iter(&self) -> impl Iterator<Item = &SkeletonNode> {
        self.nodes.iter()
    }

    pub fn child(&self, index: NodeIndex, child: usize) -> Option<&SkeletonNode> {
        let child = *self.get(index)?.children.get(child)?;
        self.get(child)
    }

    /// 仅在直接子节点中查找
    pub fn child_by_name(&self, index: NodeIndex, name: &str) -> Option<&SkeletonNode> {
        self.get(index)?
            .children
            .iter()
            .filter_map(|&c| self.get(c))
            .find(|c| c.name == name)
    }

    /// 仅在直接子节点中查找
    pub fn child_by_id(&self, index: NodeIndex, id: &str) -> Option<&SkeletonNode> {
        self.get(index)?
            .children
            .iter()
            .filter_map(|&c| self.get(c))
            .find(|c| c.id == id)
    }

    pub(crate) fn parent_model_transform(&self, index: NodeIndex) -> SkeletonResult<DMat4> {
        match self.node(index)?.parent {
            Some(parent) => Ok(self.node(parent)?.model_transform),
            None => Ok(DMat4::IDENTITY),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> (NodeTree, NodeIndex) {
        let mut tree = NodeTree::new();
        let root = tree
            .add_node(None, "root", "root_id", SkeletonNodeKind::Node)
            .unwrap();
        tree.add_node(Some(root), "hip", "hip_id", SkeletonNodeKind::Joint)
            .unwrap();
        tree.add_node(Some(root), "spine", "spine_id", SkeletonNodeKind::Joint)
            .unwrap();
        tree.add_node(Some(root), "hip", "hip_dup", SkeletonNodeKind::Joint)
            .unwrap();
        (tree, root)
    }

    #[test]
    fn test_add_node_links_parent() {
        let (tree, root) = sample_tree();
        let root_node = tree.node(root).unwrap();
        assert!(root_node.is_root());
        assert_eq!(root_node.child_count(), 3);

        let spine = tree.child(root, 1).unwrap();
        assert_eq!(spine.name(), "spine");
        assert_eq!(spine.parent(), Some(root));
        assert!(spine.is_joint());
        assert_eq!(spine.handle(), None);
    }

    #[test]
    fn test_add_node_unknown_parent() {
        let mut tree = NodeTree::new();
        let result = tree.add_node(Some(NodeIndex(4)), "a", "a", SkeletonNodeKind::Node);
        assert_eq!(result, Err(SkeletonError::UnknownNode(NodeIndex(4))));
        assert!(tree.is_empty());
    }

    #[test]
    fn test_child_lookup_first_match() {
        let (tree, root) = sample_tree();
        assert_eq!(tree.child_by_name(root, "hip").unwrap().id(), "hip_id");
        assert_eq!(tree.child_by_id(root, "hip_dup").unwrap().name(), "hip");
        assert!(tree.child_by_name(root, "head").is_none());
        assert!(tree.child(root, 9).is_none());
    }

    #[test]
    fn test_child_lookup_is_not_recursive() {
        let (mut tree, root) = sample_tree();
        let spine = tree.child_by_name(root, "spine").unwrap().index();
        tree.add_node(Some(spine), "neck", "neck_id", SkeletonNodeKind::Joint)
            .unwrap();
        assert!(tree.child_by_name(root, "neck").is_none());
        assert!(tree.child_by_name(spine, "neck").is_some());
    }

    #[test]
    fn test_raw_transforms() {
        use crate::animation::node_transform::TransformKind;

        let (mut tree, root) = sample_tree();
        let node = tree.node_mut(root).unwrap();
        node.add_raw_transform(NodeTransform::new(TransformKind::Translate));
        node.add_raw_transform(NodeTransform::new(TransformKind::Rotate));
        assert_eq!(node.num_raw_transforms(), 2);
        assert_eq!(
            node.raw_transform(1).unwrap().kind(),
            TransformKind::Rotate
        );
        node.raw_transform_mut(0).unwrap().set_sid("location");
        assert_eq!(node.raw_transforms()[0].sid(), "location");
    }
}
