use serde::{Deserialize, Serialize};

use crate::prelude::{StageError, StageResult};

/// Number of joints the upstream pose source reports per detected frame.
pub const LANDMARK_COUNT: usize = 33;

// Fixed index-to-body-part mapping of the upstream pose model. This is an
// external contract and is never remapped.
pub const NOSE: usize = 0;
pub const LEFT_SHOULDER: usize = 11;
pub const RIGHT_SHOULDER: usize = 12;
pub const LEFT_ELBOW: usize = 13;
pub const RIGHT_ELBOW: usize = 14;
pub const LEFT_WRIST: usize = 15;
pub const RIGHT_WRIST: usize = 16;
pub const LEFT_HIP: usize = 23;
pub const RIGHT_HIP: usize = 24;
pub const LEFT_KNEE: usize = 25;
pub const RIGHT_KNEE: usize = 26;
pub const LEFT_ANKLE: usize = 27;
pub const RIGHT_ANKLE: usize = 28;

/// A single body-joint sample with normalized position and confidence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub visibility: f32,
}

/// The full set of joint samples for one captured instant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LandmarkFrame {
    pub landmarks: Vec<Landmark>,
}

impl LandmarkFrame {
    pub fn new(landmarks: Vec<Landmark>) -> Self {
        Self { landmarks }
    }
}

/// Typed accessor over one valid frame, built once so that a malformed
/// frame shape surfaces immediately instead of deep in a computation.
#[derive(Debug, Clone, Copy)]
pub struct BodyFrame {
    pub nose: Landmark,
    pub left_shoulder: Landmark,
    pub right_shoulder: Landmark,
    pub left_elbow: Landmark,
    pub right_elbow: Landmark,
    pub left_wrist: Landmark,
    pub right_wrist: Landmark,
    pub left_hip: Landmark,
    pub right_hip: Landmark,
    pub left_knee: Landmark,
    pub right_knee: Landmark,
    pub left_ankle: Landmark,
    pub right_ankle: Landmark,
}

impl BodyFrame {
    pub fn from_frame(frame: &LandmarkFrame) -> StageResult<Self> {
        let points = &frame.landmarks;
        if points.len() != LANDMARK_COUNT {
            return Err(StageError::InvalidInput(format!(
                "expected {} landmarks per frame, got {}",
                LANDMARK_COUNT,
                points.len()
            )));
        }

        Ok(Self {
            nose: points[NOSE],
            left_shoulder: points[LEFT_SHOULDER],
            right_shoulder: points[RIGHT_SHOULDER],
            left_elbow: points[LEFT_ELBOW],
            right_elbow: points[RIGHT_ELBOW],
            left_wrist: points[LEFT_WRIST],
            right_wrist: points[RIGHT_WRIST],
            left_hip: points[LEFT_HIP],
            right_hip: points[RIGHT_HIP],
            left_knee: points[LEFT_KNEE],
            right_knee: points[RIGHT_KNEE],
            left_ankle: points[LEFT_ANKLE],
            right_ankle: points[RIGHT_ANKLE],
        })
    }

    /// Mean vertical position of the two hips.
    pub fn hip_height(&self) -> f32 {
        (self.left_hip.y + self.right_hip.y) / 2.0
    }

    /// Mean vertical position of the two shoulders.
    pub fn shoulder_height(&self) -> f32 {
        (self.left_shoulder.y + self.right_shoulder.y) / 2.0
    }

    /// Midpoint of the two shoulders in the image plane.
    pub fn shoulder_midpoint(&self) -> (f32, f32) {
        (
            (self.left_shoulder.x + self.right_shoulder.x) / 2.0,
            (self.left_shoulder.y + self.right_shoulder.y) / 2.0,
        )
    }

    /// Midpoint of the two hips in the image plane.
    pub fn hip_midpoint(&self) -> (f32, f32) {
        (
            (self.left_hip.x + self.right_hip.x) / 2.0,
            (self.left_hip.y + self.right_hip.y) / 2.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_of(count: usize) -> LandmarkFrame {
        LandmarkFrame::new(vec![Landmark::default(); count])
    }

    #[test]
    fn body_frame_rejects_short_frames() {
        let err = BodyFrame::from_frame(&frame_of(17)).unwrap_err();
        assert!(err.to_string().contains("expected 33 landmarks"));
    }

    #[test]
    fn body_frame_reads_fixed_indices() {
        let mut points = vec![Landmark::default(); LANDMARK_COUNT];
        points[LEFT_KNEE].x = 0.25;
        points[RIGHT_ANKLE].y = 0.9;
        let body = BodyFrame::from_frame(&LandmarkFrame::new(points)).unwrap();
        assert_eq!(body.left_knee.x, 0.25);
        assert_eq!(body.right_ankle.y, 0.9);
    }

    #[test]
    fn hip_height_is_mean_of_both_hips() {
        let mut points = vec![Landmark::default(); LANDMARK_COUNT];
        points[LEFT_HIP].y = 0.4;
        points[RIGHT_HIP].y = 0.6;
        let body = BodyFrame::from_frame(&LandmarkFrame::new(points)).unwrap();
        assert!((body.hip_height() - 0.5).abs() < 1e-6);
    }
}
