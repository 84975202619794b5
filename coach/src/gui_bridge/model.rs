use crate::workflow::runner::WorkflowResult;
use formcore::pose_interface::AnalysisResult;
use serde::{Deserialize, Serialize};

/// Snapshot of the latest analysis, shaped for a polling front-end.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VisualizationModel {
    pub analysis: Option<AnalysisResult>,
    pub angle_profile: Vec<f32>,
    pub valid_frames: usize,
    pub total_frames: usize,
    pub notes: Vec<String>,
}

impl VisualizationModel {
    pub fn from_workflow(result: &WorkflowResult) -> Self {
        Self {
            analysis: Some(result.analysis.clone()),
            angle_profile: result.angle_profile.clone(),
            valid_frames: result.valid_frames,
            total_frames: result.total_frames,
            notes: result.notes.clone(),
        }
    }
}
