use super::keyframe::{InterpolationMode, KeyframeTrack};
use glam::DMat4;
use std::collections::HashMap;

/// 只缩放矩阵的平移分量
pub(crate) fn scale_translation(matrix: &mut DMat4, factor: f64) {
    matrix.w_axis.x *= factor;
    matrix.w_axis.y *= factor;
    matrix.w_axis.z *= factor;
}

/// 单个节点的关键帧动画（时间 -> 局部变换矩阵）
#[derive(Debug, Clone, PartialEq)]
pub struct NodeAnimation {
    /// 节点名称
    pub name: String,
    /// 矩阵轨道
    pub track: KeyframeTrack<DMat4>,
}

impl NodeAnimation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            track: KeyframeTrack::new(InterpolationMode::Linear),
        }
    }

    /// 添加关键帧，同一时间的关键帧会被覆盖
    pub fn add_key_frame(&mut self, time: f64, matrix: DMat4) {
        self.track.add_keyframe(time, matrix);
    }

    pub fn frame_count(&self) -> usize {
        self.track.len()
    }

    pub fn key_frame(&self, index: usize) -> Option<(f64, DMat4)> {
        self.track.get(index).map(|k| (k.time, k.value))
    }

    /// 动画长度（最后一个关键帧的时间）
    pub fn length(&self) -> f64 {
        self.track.duration()
    }

    /// 采样指定时间的局部变换
    ///
    /// `looping` 为 `true` 时时间按动画长度取模。
    pub fn frame_at(&self, time: f64, looping: bool) -> Option<DMat4> {
        let length = self.length();
        let time = if looping && length > 0.0 {
            time.rem_euclid(length)
        } else {
            time
        };
        self.track.sample(time)
    }

    /// 缩放所有关键帧的平移分量
    pub fn scale(&mut self, factor: f64) {
        for matrix in self.track.values_mut() {
            scale_translation(matrix, factor);
        }
    }
}

/// 骨骼动画：节点名称 -> 节点动画
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkeletonAnimation {
    /// 动画名称
    pub name: String,
    /// 节点动画
    pub node_animations: HashMap<String, NodeAnimation>,
}

impl SkeletonAnimation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            node_animations: HashMap::new(),
        }
    }

    /// 为指定节点添加关键帧，节点动画不存在时自动创建
    pub fn add_key_frame(&mut self, node: &str, time: f64, matrix: DMat4) {
        self.node_animations
            .entry(node.to_string())
            .or_insert_with(|| NodeAnimation::new(node))
            .add_key_frame(time, matrix);
    }

    pub fn node_animation(&self, node: &str) -> Option<&NodeAnimation> {
        self.node_animations.get(node)
    }

    pub fn has_node(&self, node: &str) -> bool {
        self.node_animations.contains_key(node)
    }

    pub fn node_count(&self) -> usize {
        self.node_animations.len()
    }

    /// 所有节点动画中最长的长度
    pub fn length(&self) -> f64 {
        self.node_animations
            .values()
            .map(NodeAnimation::length)
            .fold(0.0, f64::max)
    }

    /// 采样所有节点在指定时间的局部变换
    pub fn pose_at(&self, time: f64, looping: bool) -> HashMap<String, DMat4> {
        self.node_animations
            .iter()
            .filter_map(|(name, anim)| anim.frame_at(time, looping).map(|m| (name.clone(), m)))
            .collect()
    }

    /// 缩放所有节点动画的平移分量
    pub fn scale(&mut self, factor: f64) {
        for anim in self.node_animations.values_mut() {
            anim.scale(factor);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{DQuat, DVec3};

    fn walk() -> SkeletonAnimation {
        let mut clip = SkeletonAnimation::new("walk");
        clip.add_key_frame("hip", 0.0, DMat4::from_translation(DVec3::ZERO));
        clip.add_key_frame("hip", 2.0, DMat4::from_translation(DVec3::new(2.0, 2.0, 2.0)));
        clip.add_key_frame("knee", 0.0, DMat4::from_translation(DVec3::Y));
        clip
    }

    #[test]
    fn test_skeleton_animation() {
        let clip = walk();
        assert_eq!(clip.node_count(), 2);
        assert!(clip.has_node("knee"));
        assert_eq!(clip.length(), 2.0);

        let pos = clip
            .node_animation("hip")
            .unwrap()
            .frame_at(1.0, false)
            .unwrap()
            .w_axis
            .truncate();
        assert!((pos.x - 1.0).abs() < 0.001);
        assert!((pos.y - 1.0).abs() < 0.001);
        assert!((pos.z - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_frame_at_looping() {
        let clip = walk();
        let hip = clip.node_animation("hip").unwrap();
        let looped = hip.frame_at(3.0, true).unwrap();
        let direct = hip.frame_at(1.0, false).unwrap();
        assert!(looped.abs_diff_eq(direct, 1e-9));

        let clamped = hip.frame_at(3.0, false).unwrap();
        assert_eq!(clamped.w_axis.truncate(), DVec3::new(2.0, 2.0, 2.0));
    }

    #[test]
    fn test_frame_at_hidden_bone() {
        let hidden = DMat4::from_scale(DVec3::ZERO);
        let mut clip = SkeletonAnimation::new("hide");
        clip.add_key_frame("tail", 0.0, hidden);
        let tail = clip.node_animation("tail").unwrap();
        assert_eq!(tail.frame_at(0.0, false), Some(hidden));
        assert_eq!(tail.frame_at(0.0, true), Some(hidden));
        assert!(clip.pose_at(1.0, false)["tail"].is_finite());
    }

    #[test]
    fn test_pose_at() {
        let pose = walk().pose_at(0.0, false);
        assert_eq!(pose.len(), 2);
        assert_eq!(pose["knee"].w_axis.truncate(), DVec3::Y);
    }

    #[test]
    fn test_scale_translation_only() {
        let rotation = DQuat::from_rotation_x(0.3);
        let mut clip = SkeletonAnimation::new("turn");
        clip.add_key_frame(
            "hip",
            0.0,
            DMat4::from_rotation_translation(rotation, DVec3::new(1.0, 2.0, 3.0)),
        );
        let before = clip.node_animation("hip").unwrap().key_frame(0).unwrap().1;

        clip.scale(2.0);
        let (time, after) = clip.node_animation("hip").unwrap().key_frame(0).unwrap();
        assert_eq!(time, 0.0);
        assert_eq!(after.w_axis.truncate(), DVec3::new(2.0, 4.0, 6.0));
        assert_eq!(after.x_axis, before.x_axis);
        assert_eq!(after.y_axis, before.y_axis);
        assert_eq!(after.z_axis, before.z_axis);
    }
}
