//! # Skeleton Core
//!
//! Skeletal animation data model shared between mesh importers and runtime pose evaluation.
//!
//! ## Features
//!
//! - **Transform channels**: matrix, translate, rotate and scale channels with derived matrices
//! - **Node tree**: parent/child hierarchy with cached model transforms and explicit propagation
//! - **Skeleton**: dense handle map, name/id lookup, position-only scaling
//! - **Skinning data**: bind shape, inverse bind transforms and raw per-vertex weights
//! - **Animation**: keyframed per-node matrices with looping and interpolated sampling
//!
//! ## Architecture Design
//!
//! Data and algorithms are kept apart, following the **Anemic Domain Model (贫血模型)** pattern:
//! - **State**: `NodeTree` / `SkeletonNode` hold plain data
//! - **Service**: `SkeletonService` implements propagation over an explicit tree and node index
//! - **Aggregate**: `Skeleton` owns the tree, animations and weights and delegates to the service
//!
//! ### Example
//!
//! ```rust
//! use glam::{DMat4, DVec3};
//! use skeleton_core::animation::{NodeTree, Skeleton, SkeletonNodeKind};
//!
//! let mut tree = NodeTree::new();
//! let root = tree.add_node(None, "pelvis", "pelvis", SkeletonNodeKind::Joint)?;
//! let mut skeleton = Skeleton::new(tree, root)?;
//! skeleton.set_transform(root, DMat4::from_translation(DVec3::Y), true)?;
//! assert!(skeleton.node_by_id("missing").is_none());
//! # Ok::<(), skeleton_core::SkeletonError>(())
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Errors, helper macros and logging setup
//! - [`config`]: Configuration loading and validation
//! - [`animation`]: Skeleton data model and animation sampling

/// Errors, helper macros and logging setup
pub mod core;
/// Configuration system
pub mod config;
/// Skeleton data model and animation sampling
pub mod animation;

pub use crate::animation::{
    NodeAnimation, NodeIndex, NodeTransform, NodeTree, Skeleton, SkeletonAnimation, SkeletonNode,
    SkeletonNodeKind, SkeletonService, TransformKind,
};
pub use crate::config::SkeletonConfig;
pub use crate::core::error::{ConfigError, SkeletonError, SkeletonResult};
