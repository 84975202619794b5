use serde::{Deserialize, Serialize};

use crate::pose_interface::landmark::LandmarkFrame;

/// Ancillary metadata accompanying a captured session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureAncillary {
    /// Frames the capture attempted, including those where no pose was found.
    pub total_frames: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fps: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Landmark sequence consumed by the analysis core. A `None` entry is the
/// "no pose detected" sentinel for that frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapturePayload {
    pub frames: Vec<Option<LandmarkFrame>>,
    pub ancillary: CaptureAncillary,
}

impl CapturePayload {
    pub fn new(frames: Vec<Option<LandmarkFrame>>, ancillary: CaptureAncillary) -> Self {
        Self { frames, ancillary }
    }

    /// Number of frames in which the pose source found a body.
    pub fn valid_frames(&self) -> usize {
        self.frames.iter().filter(|frame| frame.is_some()).count()
    }
}
