use glam::{DMat4, DQuat, DVec3, DVec4};

/// 插值模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterpolationMode {
    /// 线性插值
    #[default]
    Linear,
    /// 阶梯插值 (无插值)
    Step,
}

/// 可在两个关键帧之间插值的值
pub trait Interpolate: Clone {
    fn interpolate(&self, other: &Self, t: f64) -> Self;
}

impl Interpolate for DVec3 {
    fn interpolate(&self, other: &Self, t: f64) -> Self {
        self.lerp(*other, t)
    }
}

impl Interpolate for DQuat {
    fn interpolate(&self, other: &Self, t: f64) -> Self {
        self.slerp(*other, t)
    }
}

/// 矩阵分解为缩放、旋转、平移后分别插值
///
/// 任一端无法无损分解（奇异、含剪切或投影）时退化为逐分量线性插值。
impl Interpolate for DMat4 {
    fn interpolate(&self, other: &Self, t: f64) -> Self {
        match (decompose(self), decompose(other)) {
            (Some((s0, r0, t0)), Some((s1, r1, t1))) => DMat4::from_scale_rotation_translation(
                s0.lerp(s1, t),
                r0.slerp(r1, t),
                t0.lerp(t1, t),
            ),
            _ => *self * (1.0 - t) + *other * t,
        }
    }
}

/// 分解后能重建原矩阵时返回 (缩放, 旋转, 平移)
fn decompose(matrix: &DMat4) -> Option<(DVec3, DQuat, DVec3)> {
    let det = matrix.determinant();
    if det == 0.0 || !det.is_finite() || matrix.row(3) != DVec4::W {
        return None;
    }
    let (scale, rotation, translation) = matrix.to_scale_rotation_translation();
    if !scale.is_finite() || !rotation.is_finite() || !translation.is_finite() {
        return None;
    }
    let rebuilt = DMat4::from_scale_rotation_translation(scale, rotation, translation);
    let magnitude = matrix
        .to_cols_array()
        .iter()
        .fold(1.0_f64, |acc, v| acc.max(v.abs()));
    rebuilt
        .abs_diff_eq(*matrix, 1e-9 * magnitude)
        .then_some((scale, rotation, translation))
}

/// 关键帧
#[derive(Debug, Clone, PartialEq)]
pub struct Keyframe<T> {
    /// 时间 (秒)
    pub time: f64,
    /// 值
    pub value: T,
}

/// 关键帧轨道
///
/// 关键帧按时间升序保存；同一时间只保留最后写入的值。
#[derive(Debug, Clone, PartialEq)]
pub struct KeyframeTrack<T> {
    /// 关键帧列表
    pub keyframes: Vec<Keyframe<T>>,
    /// 插值模式
    pub interpolation: InterpolationMode,
}

impl<T> Default for KeyframeTrack<T> {
    fn default() -> Self {
        Self::new(InterpolationMode::default())
    }
}

impl<T> KeyframeTrack<T> {
    pub fn new(interpolation: InterpolationMode) -> Self {
        Self {
            keyframes: Vec::new(),
            interpolation,
        }
    }

    /// 添加关键帧，时间已存在时覆盖
    pub fn add_keyframe(&mut self, time: f64, value: T) {
        match self
            .keyframes
            .binary_search_by(|k| k.time.total_cmp(&time))
        {
            Ok(index) => self.keyframes[index].value = value,
            Err(index) => self.keyframes.insert(index, Keyframe { time, value }),
        }
    }

    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    /// 最后一个关键帧的时间
    pub fn duration(&self) -> f64 {
        self.keyframes.last().map_or(0.0, |k| k.time)
    }

    pub fn get(&self, index: usize) -> Option<&Keyframe<T>> {
        self.keyframes.get(index)
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.keyframes.iter_mut().map(|k| &mut k.value)
    }

    /// 找到包围 `time` 的两个关键帧及归一化位置
    ///
    /// 时间早于第一帧或晚于最后一帧时两端返回同一帧。
    pub fn bracket(&self, time: f64) -> Option<(&Keyframe<T>, &Keyframe<T>, f64)> {
        let first = self.keyframes.first()?;
        let last = self.keyframes.last()?;

        if time.is_nan() || time <= first.time {
            return Some((first, first, 0.0));
        }
        if time >= last.time {
            return Some((last, last, 0.0));
        }

        // 第一个时间大于 time 的关键帧
        let upper = self.keyframes.partition_point(|k| k.time <= time);
        let k0 = &self.keyframes[upper - 1];
        let k1 = &self.keyframes[upper];
        let span = k1.time - k0.time;
        let t = if span > 0.0 { (time - k0.time) / span } else { 0.0 };
        Some((k0, k1, t))
    }
}

impl<T: Interpolate> KeyframeTrack<T> {
    /// 获取指定时间的值
    ///
    /// 落在关键帧上（包括两端钳制）时原样返回该关键帧的值。
    pub fn sample(&self, time: f64) -> Option<T> {
        let (k0, k1, t) = self.bracket(time)?;
        if t == 0.0 || std::ptr::eq(k0, k1) {
            return Some(k0.value.clone());
        }
        match self.interpolation {
            InterpolationMode::Step => Some(k0.value.clone()),
            InterpolationMode::Linear => Some(k0.value.interpolate(&k1.value, t)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyframe_track() {
        let mut track = KeyframeTrack::<DVec3>::new(InterpolationMode::Linear);

        track.add_keyframe(1.0, DVec3::new(1.0, 1.0, 1.0));
        track.add_keyframe(0.0, DVec3::new(0.0, 0.0, 0.0));

        assert_eq!(track.keyframes[0].time, 0.0);
        let value = track.sample(0.5).unwrap();
        assert!((value.x - 0.5).abs() < 0.001);
        assert!((value.y - 0.5).abs() < 0.001);
        assert!((value.z - 0.5).abs() < 0.001);
    }

    #[test]
    fn test_same_time_overwrites() {
        let mut track = KeyframeTrack::<DVec3>::default();
        track.add_keyframe(1.0, DVec3::X);
        track.add_keyframe(1.0, DVec3::Y);
        assert_eq!(track.len(), 1);
        assert_eq!(track.sample(1.0), Some(DVec3::Y));
    }

    #[test]
    fn test_clamps_outside_range() {
        let mut track = KeyframeTrack::<DVec3>::default();
        track.add_keyframe(1.0, DVec3::X);
        track.add_keyframe(2.0, DVec3::Y);
        assert_eq!(track.sample(-3.0), Some(DVec3::X));
        assert_eq!(track.sample(10.0), Some(DVec3::Y));
        assert_eq!(track.duration(), 2.0);
    }

    #[test]
    fn test_step_interpolation() {
        let mut track = KeyframeTrack::<DVec3>::new(InterpolationMode::Step);
        track.add_keyframe(0.0, DVec3::ZERO);
        track.add_keyframe(1.0, DVec3::ONE);
        assert_eq!(track.sample(0.99), Some(DVec3::ZERO));
        assert_eq!(track.sample(1.0), Some(DVec3::ONE));
    }

    #[test]
    fn test_empty_track() {
        let track = KeyframeTrack::<DQuat>::default();
        assert!(track.sample(0.0).is_none());
        assert_eq!(track.duration(), 0.0);
    }

    #[test]
    fn test_zero_scale_key_stays_finite() {
        let hidden = DMat4::from_scale(DVec3::ZERO);
        let mut track = KeyframeTrack::<DMat4>::default();
        track.add_keyframe(0.0, hidden);
        assert_eq!(track.sample(0.0), Some(hidden));
        assert_eq!(track.sample(5.0), Some(hidden));

        track.add_keyframe(1.0, DMat4::IDENTITY);
        let mid = track.sample(0.5).unwrap();
        assert!(mid.is_finite());
        assert!(mid.abs_diff_eq(DMat4::from_scale(DVec3::splat(0.5)), 1e-12));
    }

    #[test]
    fn test_sheared_key_returned_unchanged() {
        let sheared = DMat4::from_scale(DVec3::new(1.0, 3.0, 1.0)) * DMat4::from_rotation_z(0.7);
        assert!(decompose(&sheared).is_none());

        let mut track = KeyframeTrack::<DMat4>::default();
        track.add_keyframe(0.0, sheared);
        track.add_keyframe(1.0, DMat4::IDENTITY);
        assert_eq!(track.sample(0.0), Some(sheared));
        assert_eq!(track.sample(-1.0), Some(sheared));

        let mid = track.sample(0.5).unwrap();
        assert!(mid.abs_diff_eq((sheared + DMat4::IDENTITY) * 0.5, 1e-12));
    }

    #[test]
    fn test_matrix_interpolation() {
        let a = DMat4::from_translation(DVec3::ZERO);
        let b = DMat4::from_scale_rotation_translation(
            DVec3::ONE,
            DQuat::from_rotation_y(std::f64::consts::FRAC_PI_2),
            DVec3::new(2.0, 0.0, 0.0),
        );
        let mid = a.interpolate(&b, 0.5);
        let (_, rotation, translation) = mid.to_scale_rotation_translation();
        assert!(translation.abs_diff_eq(DVec3::new(1.0, 0.0, 0.0), 1e-9));
        assert!(rotation.abs_diff_eq(DQuat::from_rotation_y(std::f64::consts::FRAC_PI_4), 1e-9));
    }
}
