use crate::pose_interface::{
    AnalysisQuality, AnalysisResult, BodyFrame, CapturePayload, ExerciseLabel, ExerciseType,
    LandmarkFrame,
};
use crate::prelude::{ProcessingStage, StageConfig, StageInput, StageResult};
use crate::processing::classify::{ClassifierPolicy, ClassifyStage};
use crate::processing::form::{FormPolicy, FormStage};
use crate::processing::repetition::{RepetitionPolicy, RepetitionStage};
use crate::telemetry::log::LogManager;
use crate::telemetry::metrics::MetricsRecorder;

const NO_POSE_MSG: &str = "Could not detect pose in video";
const TOO_SHORT_MSG: &str = "Video too short for analysis";
const FORM_FAULT_MSG: &str = "Error analyzing form";

/// Quality ratio above which an analysis counts as high quality.
const HIGH_QUALITY_RATIO: f32 = 0.8;

/// Everything the driver layer may want beyond the result record.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub result: AnalysisResult,
    /// Smoothed canonical angle signal used for repetition counting.
    pub angle_profile: Vec<f32>,
    pub valid_frames: usize,
    pub total_frames: usize,
    pub notes: Vec<String>,
}

/// Validates input sufficiency and sequences classification, repetition
/// counting, and form analysis into one result record.
///
/// Holds no mutable state beyond telemetry counters, so independent
/// sequences may be analyzed concurrently by separate instances.
pub struct WorkoutAnalyzer {
    config: StageConfig,
    classifier_policy: ClassifierPolicy,
    repetition_policy: RepetitionPolicy,
    form_policy: FormPolicy,
    metrics: MetricsRecorder,
    logger: LogManager,
}

impl WorkoutAnalyzer {
    pub fn new(config: StageConfig) -> Self {
        Self {
            config,
            classifier_policy: ClassifierPolicy::default(),
            repetition_policy: RepetitionPolicy::default(),
            form_policy: FormPolicy::default(),
            metrics: MetricsRecorder::new(),
            logger: LogManager::new("analyzer"),
        }
    }

    pub fn metrics_snapshot(&self) -> (usize, usize) {
        self.metrics.snapshot()
    }

    /// The core operation: one structured verdict per landmark sequence.
    /// Never fails; every call returns a complete, schema-valid record.
    pub fn analyze(&self, payload: &CapturePayload) -> AnalysisResult {
        self.analyze_report(payload).result
    }

    pub fn analyze_report(&self, payload: &CapturePayload) -> AnalysisReport {
        let valid_raw: Vec<&LandmarkFrame> = payload.frames.iter().flatten().collect();
        let valid_frames = valid_raw.len();
        // Guards a zero or understated capture count in the ancillary data.
        let total_frames = payload.ancillary.total_frames.max(valid_frames);

        if valid_raw.is_empty() {
            return self.degenerate_report(NO_POSE_MSG, valid_frames, total_frames);
        }
        if valid_frames < self.config.min_valid_frames {
            return self.degenerate_report(TOO_SHORT_MSG, valid_frames, total_frames);
        }

        // Typed accessors are built up front so a malformed frame surfaces
        // here instead of deep inside a stage.
        let mut frames = Vec::with_capacity(valid_frames);
        for raw in &valid_raw {
            match BodyFrame::from_frame(raw) {
                Ok(frame) => frames.push(frame),
                Err(err) => {
                    self.metrics.record_stage_fault();
                    self.metrics.record_analysis();
                    self.logger.record(&format!("malformed frame: {}", err));
                    return AnalysisReport {
                        result: AnalysisResult {
                            exercise_name: ExerciseLabel::Error,
                            rep_count: 0,
                            feedback: vec![format!("Analysis failed: {}", err)],
                            form_score: 0.0,
                            analysis_quality: None,
                        },
                        angle_profile: Vec::new(),
                        valid_frames,
                        total_frames,
                        notes: vec![format!("aborted on malformed frame: {}", err)],
                    };
                }
            }
        }

        let mut notes = Vec::new();

        // Each stage is isolated: a fault degrades only its contribution.
        let (exercise, confidence) = match self.run_classifier(&frames, &mut notes) {
            Ok(decision) => decision,
            Err(err) => {
                self.metrics.record_stage_fault();
                notes.push(format!("classification degraded: {}", err));
                (ExerciseType::Unknown, 0)
            }
        };

        let (rep_count, angle_profile) = match self.run_repetition(&frames, exercise, &mut notes) {
            Ok(counted) => counted,
            Err(err) => {
                self.metrics.record_stage_fault();
                notes.push(format!("repetition counting degraded: {}", err));
                (0, Vec::new())
            }
        };

        let (feedback, form_score) = match self.run_form(&frames, exercise, &mut notes) {
            Ok(scored) => scored,
            Err(err) => {
                self.metrics.record_stage_fault();
                notes.push(format!("form analysis degraded: {}", err));
                (
                    vec![FORM_FAULT_MSG.to_string()],
                    self.form_policy.fallback_score,
                )
            }
        };

        let quality = if valid_frames as f32 / total_frames as f32 > HIGH_QUALITY_RATIO {
            AnalysisQuality::High
        } else {
            AnalysisQuality::Medium
        };

        self.logger.record(&format!(
            "exercise {:?} confidence {} reps {} score {:.1}",
            exercise, confidence, rep_count, form_score
        ));
        self.metrics.record_analysis();

        AnalysisReport {
            result: AnalysisResult {
                exercise_name: exercise.into(),
                rep_count,
                feedback,
                form_score: round_to_tenth(form_score.clamp(0.0, 10.0)),
                analysis_quality: Some(quality),
            },
            angle_profile,
            valid_frames,
            total_frames,
            notes,
        }
    }

    fn degenerate_report(
        &self,
        reason: &str,
        valid_frames: usize,
        total_frames: usize,
    ) -> AnalysisReport {
        self.logger.record(reason);
        self.metrics.record_analysis();
        AnalysisReport {
            result: AnalysisResult {
                exercise_name: ExerciseLabel::Unknown,
                rep_count: 0,
                feedback: vec![reason.to_string()],
                form_score: 0.0,
                analysis_quality: None,
            },
            angle_profile: Vec::new(),
            valid_frames,
            total_frames,
            notes: vec![reason.to_string()],
        }
    }

    fn run_classifier(
        &self,
        frames: &[BodyFrame],
        notes: &mut Vec<String>,
    ) -> StageResult<(ExerciseType, u32)> {
        let mut stage =
            ClassifyStage::with_policy(frames.len().max(1), self.classifier_policy.clone());
        stage.initialize(&self.config)?;
        let output = stage.execute(StageInput {
            frames: frames.to_vec(),
            exercise: None,
        })?;
        stage.cleanup();

        notes.extend(output.metadata.notes);
        Ok((
            output.metadata.exercise.unwrap_or(ExerciseType::Unknown),
            output.metadata.confidence.unwrap_or(0),
        ))
    }

    fn run_repetition(
        &self,
        frames: &[BodyFrame],
        exercise: ExerciseType,
        notes: &mut Vec<String>,
    ) -> StageResult<(u32, Vec<f32>)> {
        let mut stage =
            RepetitionStage::with_policy(frames.len().max(1), self.repetition_policy.clone());
        stage.initialize(&self.config)?;
        let output = stage.execute(StageInput {
            frames: frames.to_vec(),
            exercise: Some(exercise),
        })?;
        stage.cleanup();

        notes.extend(output.metadata.notes);
        Ok((output.metadata.rep_count.unwrap_or(0), output.samples))
    }

    fn run_form(
        &self,
        frames: &[BodyFrame],
        exercise: ExerciseType,
        notes: &mut Vec<String>,
    ) -> StageResult<(Vec<String>, f32)> {
        let mut stage = FormStage::with_policy(frames.len().max(1), self.form_policy.clone());
        stage.initialize(&self.config)?;
        let output = stage.execute(StageInput {
            frames: frames.to_vec(),
            exercise: Some(exercise),
        })?;
        stage.cleanup();

        notes.extend(output.metadata.notes);
        let feedback = if output.metadata.feedback.is_empty() {
            vec![FORM_FAULT_MSG.to_string()]
        } else {
            output.metadata.feedback
        };
        Ok((
            feedback,
            output
                .metadata
                .form_score
                .unwrap_or(self.form_policy.fallback_score),
        ))
    }
}

impl Default for WorkoutAnalyzer {
    fn default() -> Self {
        Self::new(StageConfig::default())
    }
}

fn round_to_tenth(score: f32) -> f32 {
    (score * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose_interface::landmark::{
        Landmark, LANDMARK_COUNT, LEFT_ANKLE, LEFT_ELBOW, LEFT_HIP, LEFT_KNEE, LEFT_SHOULDER,
        LEFT_WRIST, NOSE, RIGHT_ANKLE, RIGHT_ELBOW, RIGHT_HIP, RIGHT_KNEE, RIGHT_SHOULDER,
        RIGHT_WRIST,
    };
    use crate::pose_interface::CaptureAncillary;
    use std::f32::consts::TAU;

    fn capture(frames: Vec<Option<LandmarkFrame>>) -> CapturePayload {
        let total_frames = frames.len();
        CapturePayload::new(
            frames,
            CaptureAncillary {
                total_frames,
                fps: None,
                source: None,
            },
        )
    }

    /// Side-view squat frame parameterized by the knee angle in degrees.
    /// Knees track the toes, the torso stays vertical, and the hips stay
    /// below knee level, so no violation rule fires.
    fn squat_frame(knee_angle: f32) -> LandmarkFrame {
        let rad = knee_angle.to_radians();
        let knee = (0.5f32, 0.7f32);
        let ankle = (0.7f32, 0.7f32);
        let hip = (knee.0 + 0.35 * rad.cos(), knee.1 + 0.35 * rad.sin());
        let shoulder = (hip.0, hip.1 - 0.5);

        let mut landmarks = vec![Landmark::default(); LANDMARK_COUNT];
        let mut place = |index: usize, point: (f32, f32)| {
            landmarks[index] = Landmark {
                x: point.0,
                y: point.1,
                z: 0.0,
                visibility: 1.0,
            };
        };
        place(NOSE, (shoulder.0, shoulder.1 - 0.1));
        place(LEFT_SHOULDER, shoulder);
        place(RIGHT_SHOULDER, shoulder);
        place(LEFT_ELBOW, (shoulder.0 + 0.1, shoulder.1));
        place(RIGHT_ELBOW, (shoulder.0 + 0.1, shoulder.1));
        place(LEFT_WRIST, (shoulder.0 + 0.2, shoulder.1));
        place(RIGHT_WRIST, (shoulder.0 + 0.2, shoulder.1));
        place(LEFT_HIP, hip);
        place(RIGHT_HIP, hip);
        place(LEFT_KNEE, knee);
        place(RIGHT_KNEE, knee);
        place(LEFT_ANKLE, ankle);
        place(RIGHT_ANKLE, ankle);
        LandmarkFrame::new(landmarks)
    }

    /// Two clean squat cycles over 40 frames: knee angle swings between
    /// 85 and 170 degrees with 20 samples between same-kind extrema.
    fn two_rep_squat_capture() -> CapturePayload {
        let frames = (0..40)
            .map(|i| {
                let phase = (i as f32 - 5.0) / 20.0 * TAU;
                Some(squat_frame(127.5 - 42.5 * phase.cos()))
            })
            .collect();
        capture(frames)
    }

    #[test]
    fn all_sentinel_capture_reports_no_pose() {
        let analyzer = WorkoutAnalyzer::default();
        let result = analyzer.analyze(&capture(vec![None; 45]));
        assert_eq!(
            result.to_json(),
            "{\"exerciseName\":\"unknown\",\"repCount\":0,\
             \"feedback\":[\"Could not detect pose in video\"],\"formScore\":0.0}"
        );
    }

    #[test]
    fn short_capture_reports_too_short() {
        let analyzer = WorkoutAnalyzer::default();
        let frames = (0..20).map(|_| Some(squat_frame(120.0))).collect();
        let result = analyzer.analyze(&capture(frames));
        assert_eq!(result.exercise_name, ExerciseLabel::Unknown);
        assert_eq!(result.rep_count, 0);
        assert_eq!(result.feedback, vec![TOO_SHORT_MSG.to_string()]);
        assert_eq!(result.form_score, 0.0);
        assert!(result.analysis_quality.is_none());
    }

    #[test]
    fn malformed_frame_shape_reports_error() {
        let analyzer = WorkoutAnalyzer::default();
        let stub = LandmarkFrame::new(vec![Landmark::default(); 10]);
        let result = analyzer.analyze(&capture(vec![Some(stub); 35]));
        assert_eq!(result.exercise_name, ExerciseLabel::Error);
        assert!(result.feedback[0].starts_with("Analysis failed:"));
        assert_eq!(result.form_score, 0.0);
        assert!(result.analysis_quality.is_none());
    }

    #[test]
    fn clean_squat_capture_is_fully_scored() {
        let analyzer = WorkoutAnalyzer::default();
        let result = analyzer.analyze(&two_rep_squat_capture());
        assert_eq!(result.exercise_name, ExerciseLabel::Squat);
        assert_eq!(result.rep_count, 2);
        assert_eq!(
            result.feedback,
            vec!["Excellent squat form! Keep it up!".to_string()]
        );
        assert_eq!(result.form_score, 10.0);
        assert_eq!(result.analysis_quality, Some(AnalysisQuality::High));
    }

    #[test]
    fn dropped_frames_lower_analysis_quality() {
        let analyzer = WorkoutAnalyzer::default();
        let mut frames: Vec<Option<LandmarkFrame>> = two_rep_squat_capture().frames;
        // Lose a quarter of the capture to detection failures.
        frames.extend(std::iter::repeat_with(|| None).take(14));
        let result = analyzer.analyze(&capture(frames));
        assert_eq!(result.analysis_quality, Some(AnalysisQuality::Medium));
    }

    #[test]
    fn analysis_is_deterministic() {
        let analyzer = WorkoutAnalyzer::default();
        let payload = two_rep_squat_capture();
        let first = analyzer.analyze(&payload);
        let second = analyzer.analyze(&payload);
        assert_eq!(first.to_json(), second.to_json());
    }

    #[test]
    fn report_exposes_profile_and_counters() {
        let analyzer = WorkoutAnalyzer::default();
        let report = analyzer.analyze_report(&two_rep_squat_capture());
        assert_eq!(report.valid_frames, 40);
        assert_eq!(report.total_frames, 40);
        assert_eq!(report.angle_profile.len(), 40);
        assert!(!report.notes.is_empty());
        assert_eq!(analyzer.metrics_snapshot(), (1, 0));
    }
}
