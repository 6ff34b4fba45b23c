use glam::{DMat4, DQuat, DVec3};
use skeleton_core::animation::{NodeTree, Skeleton, SkeletonAnimation, SkeletonNodeKind};
use skeleton_core::core::init_logging;
use skeleton_core::{SkeletonConfig, SkeletonResult};

/// 构建一个三节点的手臂骨骼并播放一段简单动画
fn run(config: &SkeletonConfig) -> SkeletonResult<()> {
    let mut tree = NodeTree::with_settings(config.transforms);
    let shoulder = tree.add_node(None, "shoulder", "shoulder", SkeletonNodeKind::Joint)?;
    let elbow = tree.add_node(Some(shoulder), "elbow", "elbow", SkeletonNodeKind::Joint)?;
    let wrist = tree.add_node(Some(elbow), "wrist", "wrist", SkeletonNodeKind::Joint)?;

    let mut skeleton = Skeleton::new(tree, shoulder)?;
    skeleton.set_initial_transform(shoulder, DMat4::from_translation(DVec3::new(0.0, 1.5, 0.0)))?;
    skeleton.set_initial_transform(elbow, DMat4::from_translation(DVec3::new(0.3, 0.0, 0.0)))?;
    skeleton.set_initial_transform(wrist, DMat4::from_translation(DVec3::new(0.25, 0.0, 0.0)))?;

    let mut bend = SkeletonAnimation::new("bend");
    bend.add_key_frame("elbow", 0.0, DMat4::from_translation(DVec3::new(0.3, 0.0, 0.0)));
    bend.add_key_frame(
        "elbow",
        1.0,
        DMat4::from_rotation_translation(
            DQuat::from_rotation_z(std::f64::consts::FRAC_PI_2),
            DVec3::new(0.3, 0.0, 0.0),
        ),
    );
    skeleton.add_animation("bend", bend);

    skeleton.apply_animation("bend", 0.5, true)?;
    skeleton.scale(100.0)?;

    if let Some(node) = skeleton.node_by_name("wrist") {
        tracing::info!(
            target: "skeleton",
            "wrist model position: {:?}",
            node.model_transform().w_axis.truncate()
        );
    }
    skeleton.log_transforms();
    Ok(())
}

fn main() {
    let mut config = SkeletonConfig::load_or_default();
    config.apply_env_overrides();
    init_logging(&config.logging);

    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(&config) {
        eprintln!("Skeleton demo failed: {}", e);
        std::process::exit(1);
    }
}
