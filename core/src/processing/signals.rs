use crate::math::GeometryHelper;
use crate::pose_interface::BodyFrame;
use crate::prelude::StageResult;
use crate::processing::buffer_pool::BufferPool;

/// Derives per-frame scalar signals from the valid-frame sequence. Each
/// series is aligned by valid-frame index; sentinel frames were excluded
/// upstream.
pub struct SignalExtractor;

impl SignalExtractor {
    /// Mean of the left and right knee angles per frame.
    pub fn knee_angle_series(frames: &[BodyFrame], pool: &mut BufferPool) -> StageResult<Vec<f32>> {
        let mut series = pool.checkout(frames.len())?;
        for (slot, frame) in series.iter_mut().zip(frames) {
            let left = GeometryHelper::joint_angle(&frame.left_hip, &frame.left_knee, &frame.left_ankle);
            let right =
                GeometryHelper::joint_angle(&frame.right_hip, &frame.right_knee, &frame.right_ankle);
            *slot = (left + right) / 2.0;
        }
        Ok(series)
    }

    pub fn left_knee_angle_series(
        frames: &[BodyFrame],
        pool: &mut BufferPool,
    ) -> StageResult<Vec<f32>> {
        let mut series = pool.checkout(frames.len())?;
        for (slot, frame) in series.iter_mut().zip(frames) {
            *slot = GeometryHelper::joint_angle(&frame.left_hip, &frame.left_knee, &frame.left_ankle);
        }
        Ok(series)
    }

    pub fn right_knee_angle_series(
        frames: &[BodyFrame],
        pool: &mut BufferPool,
    ) -> StageResult<Vec<f32>> {
        let mut series = pool.checkout(frames.len())?;
        for (slot, frame) in series.iter_mut().zip(frames) {
            *slot =
                GeometryHelper::joint_angle(&frame.right_hip, &frame.right_knee, &frame.right_ankle);
        }
        Ok(series)
    }

    /// Mean of the left and right elbow angles per frame.
    pub fn elbow_angle_series(frames: &[BodyFrame], pool: &mut BufferPool) -> StageResult<Vec<f32>> {
        let mut series = pool.checkout(frames.len())?;
        for (slot, frame) in series.iter_mut().zip(frames) {
            let left =
                GeometryHelper::joint_angle(&frame.left_shoulder, &frame.left_elbow, &frame.left_wrist);
            let right = GeometryHelper::joint_angle(
                &frame.right_shoulder,
                &frame.right_elbow,
                &frame.right_wrist,
            );
            *slot = (left + right) / 2.0;
        }
        Ok(series)
    }

    /// Left elbow angle per frame; the side the movement heuristics track.
    pub fn left_elbow_angle_series(
        frames: &[BodyFrame],
        pool: &mut BufferPool,
    ) -> StageResult<Vec<f32>> {
        let mut series = pool.checkout(frames.len())?;
        for (slot, frame) in series.iter_mut().zip(frames) {
            *slot =
                GeometryHelper::joint_angle(&frame.left_shoulder, &frame.left_elbow, &frame.left_wrist);
        }
        Ok(series)
    }

    pub fn hip_height_series(frames: &[BodyFrame], pool: &mut BufferPool) -> StageResult<Vec<f32>> {
        let mut series = pool.checkout(frames.len())?;
        for (slot, frame) in series.iter_mut().zip(frames) {
            *slot = frame.hip_height();
        }
        Ok(series)
    }

    pub fn shoulder_height_series(
        frames: &[BodyFrame],
        pool: &mut BufferPool,
    ) -> StageResult<Vec<f32>> {
        let mut series = pool.checkout(frames.len())?;
        for (slot, frame) in series.iter_mut().zip(frames) {
            *slot = frame.shoulder_height();
        }
        Ok(series)
    }

    /// Orientation of the hip-midpoint-to-shoulder-midpoint segment per
    /// frame, in degrees from the horizontal.
    pub fn torso_incline_series(
        frames: &[BodyFrame],
        pool: &mut BufferPool,
    ) -> StageResult<Vec<f32>> {
        let mut series = pool.checkout(frames.len())?;
        for (slot, frame) in series.iter_mut().zip(frames) {
            *slot = GeometryHelper::segment_incline(frame.hip_midpoint(), frame.shoulder_midpoint());
        }
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose_interface::landmark::{
        Landmark, LandmarkFrame, LANDMARK_COUNT, LEFT_ANKLE, LEFT_HIP, LEFT_KNEE, RIGHT_ANKLE,
        RIGHT_HIP, RIGHT_KNEE,
    };
    use crate::pose_interface::BodyFrame;

    fn frame_with(points: &[(usize, f32, f32)]) -> BodyFrame {
        let mut landmarks = vec![Landmark::default(); LANDMARK_COUNT];
        for &(index, x, y) in points {
            landmarks[index] = Landmark {
                x,
                y,
                z: 0.0,
                visibility: 1.0,
            };
        }
        BodyFrame::from_frame(&LandmarkFrame::new(landmarks)).unwrap()
    }

    #[test]
    fn knee_angle_series_averages_both_legs() {
        // Left leg straight (180 deg), right leg bent at 90 deg.
        let frame = frame_with(&[
            (LEFT_HIP, 0.4, 0.2),
            (LEFT_KNEE, 0.4, 0.5),
            (LEFT_ANKLE, 0.4, 0.8),
            (RIGHT_HIP, 0.6, 0.5),
            (RIGHT_KNEE, 0.6, 0.7),
            (RIGHT_ANKLE, 0.8, 0.7),
        ]);
        let mut pool = BufferPool::with_capacity(2);
        let series = SignalExtractor::knee_angle_series(&[frame], &mut pool).unwrap();
        assert_eq!(series.len(), 1);
        assert!((series[0] - 135.0).abs() < 1e-3);
    }

    #[test]
    fn torso_incline_is_vertical_for_upright_pose() {
        let frame = frame_with(&[
            (crate::pose_interface::landmark::LEFT_SHOULDER, 0.45, 0.3),
            (crate::pose_interface::landmark::RIGHT_SHOULDER, 0.55, 0.3),
            (LEFT_HIP, 0.45, 0.7),
            (RIGHT_HIP, 0.55, 0.7),
        ]);
        let mut pool = BufferPool::with_capacity(2);
        let series = SignalExtractor::torso_incline_series(&[frame], &mut pool).unwrap();
        assert!((series[0] - 90.0).abs() < 1e-3);
    }
}
