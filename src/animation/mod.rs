//! 骨骼动画数据模型
//!
//! 提供层级变换、逐顶点蒙皮权重和关键帧动画采样。
//!
//! ## 功能特性
//!
//! - 原始变换通道 (`NodeTransform`)
//! - 节点树与模型变换传播 (`NodeTree`, `SkeletonService`)
//! - 句柄索引的骨骼 (`Skeleton`)
//! - 节点关键帧动画 (`NodeAnimation`, `SkeletonAnimation`)
//!
//! ## 使用示例
//!
//! ```rust
//! use glam::{DMat4, DVec3};
//! use skeleton_core::animation::{NodeTree, Skeleton, SkeletonNodeKind, SkeletonService};
//!
//! let mut tree = NodeTree::new();
//! let root = tree.add_node(None, "root", "root", SkeletonNodeKind::Joint)?;
//! let arm = tree.add_node(Some(root), "arm", "arm", SkeletonNodeKind::Joint)?;
//! SkeletonService::set_transform(&mut tree, root, DMat4::from_translation(DVec3::X), false)?;
//! SkeletonService::set_transform(&mut tree, arm, DMat4::from_translation(DVec3::Y), false)?;
//!
//! let mut skeleton = Skeleton::new(tree, root)?;
//! skeleton.scale(2.0)?;
//! let arm = skeleton.node_by_name("arm").unwrap();
//! assert_eq!(arm.model_transform().w_axis.truncate(), DVec3::new(2.0, 2.0, 0.0));
//! # Ok::<(), skeleton_core::SkeletonError>(())
//! ```

pub mod clip;
pub mod keyframe;
pub mod node_transform;
pub mod service;
pub mod skeleton;
pub mod skeleton_node;
pub mod skin;


pub use clip::{NodeAnimation, SkeletonAnimation};
pub use keyframe::{Interpolate, InterpolationMode, Keyframe, KeyframeTrack};
pub use node_transform::{NodeTransform, TransformKind};
pub use service::SkeletonService;
pub use skeleton::Skeleton;
pub use skeleton_node::{NodeIndex, NodeTree, SkeletonNode, SkeletonNodeKind};
pub use skin::{NodeWeight, VertexWeights};
