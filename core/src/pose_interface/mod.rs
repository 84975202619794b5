pub mod capture;
pub mod landmark;
pub mod result;

pub use capture::{CaptureAncillary, CapturePayload};
pub use landmark::{BodyFrame, Landmark, LandmarkFrame, LANDMARK_COUNT};
pub use result::{AnalysisQuality, AnalysisResult, ExerciseLabel, ExerciseType};
