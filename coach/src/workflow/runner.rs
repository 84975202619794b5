use crate::workflow::config::WorkflowConfig;
use formcore::pose_interface::{AnalysisResult, CapturePayload};
use formcore::processing::WorkoutAnalyzer;
use log::info;

pub struct WorkflowResult {
    pub analysis: AnalysisResult,
    pub angle_profile: Vec<f32>,
    pub valid_frames: usize,
    pub total_frames: usize,
    pub notes: Vec<String>,
}

#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    /// Runs the full analysis workflow on one capture. The engine never
    /// fails; degraded stages are visible in the notes.
    pub fn execute(&self, payload: &CapturePayload) -> WorkflowResult {
        let analyzer = WorkoutAnalyzer::new(self.config.to_stage_config());
        let report = analyzer.analyze_report(payload);
        info!(
            "workflow: {} over {}/{} frames",
            report.result.exercise_name, report.valid_frames, report.total_frames
        );

        WorkflowResult {
            analysis: report.result,
            angle_profile: report.angle_profile,
            valid_frames: report.valid_frames,
            total_frames: report.total_frames,
            notes: report.notes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::profile::build_capture_payload;
    use formcore::pose_interface::{ExerciseLabel, ExerciseType};

    #[test]
    fn runner_executes_workflow() {
        let cfg = WorkflowConfig::default();
        let runner = Runner::new(cfg);
        let payload = build_capture_payload(ExerciseType::Squat, 120).unwrap();
        let result = runner.execute(&payload);
        assert_eq!(result.analysis.exercise_name, ExerciseLabel::Squat);
        assert!(result.analysis.rep_count >= 3);
        assert_eq!(result.total_frames, 120);
        assert_eq!(result.angle_profile.len(), result.valid_frames);
    }
}
