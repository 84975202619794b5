use crate::generator::template::neutral_pose;
use anyhow::Context;
use formcore::pose_interface::landmark::{
    LEFT_ANKLE, LEFT_ELBOW, LEFT_HIP, LEFT_KNEE, LEFT_SHOULDER, LEFT_WRIST, NOSE, RIGHT_ANKLE,
    RIGHT_ELBOW, RIGHT_HIP, RIGHT_KNEE, RIGHT_SHOULDER, RIGHT_WRIST,
};
use formcore::pose_interface::{CaptureAncillary, CapturePayload, ExerciseType, Landmark, LandmarkFrame};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

/// Configuration for generating synthetic capture data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub exercise: ExerciseType,
    pub frames: usize,
    /// Samples per repetition cycle.
    pub period: usize,
    /// Uniform jitter applied to every landmark coordinate.
    pub noise: f32,
    /// Fraction of frames replaced by the no-pose sentinel.
    pub dropout: f32,
    pub seed: u64,
    pub fps: f32,
    pub description: Option<String>,
    pub scenario: Option<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            exercise: ExerciseType::Squat,
            frames: 120,
            period: 30,
            noise: 0.002,
            dropout: 0.0,
            seed: 0,
            fps: 30.0,
            description: None,
            scenario: None,
        }
    }
}

impl GeneratorConfig {
    fn normalized_period(&self) -> usize {
        self.period.max(2)
    }
}

fn jitter(rng: &mut StdRng, noise: f32) -> f32 {
    if noise > 0.0 {
        rng.gen_range(-noise..noise)
    } else {
        0.0
    }
}

fn rotate(v: (f32, f32), degrees: f32) -> (f32, f32) {
    let rad = degrees.to_radians();
    (
        v.0 * rad.cos() - v.1 * rad.sin(),
        v.0 * rad.sin() + v.1 * rad.cos(),
    )
}

fn place(landmarks: &mut [Landmark], index: usize, point: (f32, f32)) {
    landmarks[index].x = point.0;
    landmarks[index].y = point.1;
}

/// Side-view squat: knees over the toes, torso vertical, hips driven by
/// the knee angle.
fn squat_frame(knee_angle: f32) -> Vec<Landmark> {
    let rad = knee_angle.to_radians();
    let knee = (0.5, 0.7);
    let ankle = (0.7, 0.7);
    let hip = (knee.0 + 0.35 * rad.cos(), knee.1 + 0.35 * rad.sin());
    let shoulder = (hip.0, hip.1 - 0.5);

    let mut landmarks = neutral_pose();
    place(&mut landmarks, NOSE, (shoulder.0, shoulder.1 - 0.1));
    place(&mut landmarks, LEFT_SHOULDER, shoulder);
    place(&mut landmarks, RIGHT_SHOULDER, shoulder);
    place(&mut landmarks, LEFT_ELBOW, (shoulder.0 + 0.1, shoulder.1));
    place(&mut landmarks, RIGHT_ELBOW, (shoulder.0 + 0.1, shoulder.1));
    place(&mut landmarks, LEFT_WRIST, (shoulder.0 + 0.2, shoulder.1));
    place(&mut landmarks, RIGHT_WRIST, (shoulder.0 + 0.2, shoulder.1));
    place(&mut landmarks, LEFT_HIP, hip);
    place(&mut landmarks, RIGHT_HIP, hip);
    place(&mut landmarks, LEFT_KNEE, knee);
    place(&mut landmarks, RIGHT_KNEE, knee);
    place(&mut landmarks, LEFT_ANKLE, ankle);
    place(&mut landmarks, RIGHT_ANKLE, ankle);
    landmarks
}

/// Horizontal push-up: body height tracks the elbow bend.
fn push_up_frame(elbow_angle: f32) -> Vec<Landmark> {
    let rad = elbow_angle.to_radians();
    // 0 at lockout, 1 at the bottom of the press.
    let depth = (172.0 - elbow_angle) / 107.0;
    let shoulder = (0.25, 0.45 + 0.18 * depth);
    let ankle = (0.8, 0.62);
    let hip = (0.5, (shoulder.1 + ankle.1) / 2.0);
    let elbow = (shoulder.0, shoulder.1 + 0.15);
    let wrist = (elbow.0 + 0.15 * rad.sin(), elbow.1 - 0.15 * rad.cos());

    let mut landmarks = neutral_pose();
    place(&mut landmarks, NOSE, (0.2, shoulder.1 - 0.02));
    place(&mut landmarks, LEFT_SHOULDER, shoulder);
    place(&mut landmarks, RIGHT_SHOULDER, shoulder);
    place(&mut landmarks, LEFT_ELBOW, elbow);
    place(&mut landmarks, RIGHT_ELBOW, elbow);
    place(&mut landmarks, LEFT_WRIST, wrist);
    place(&mut landmarks, RIGHT_WRIST, wrist);
    place(&mut landmarks, LEFT_HIP, hip);
    place(&mut landmarks, RIGHT_HIP, hip);
    place(&mut landmarks, LEFT_KNEE, (0.65, 0.62));
    place(&mut landmarks, RIGHT_KNEE, (0.65, 0.62));
    place(&mut landmarks, LEFT_ANKLE, ankle);
    place(&mut landmarks, RIGHT_ANKLE, ankle);
    landmarks
}

/// Forward lunge: the left leg works through the stride, the right leg
/// stays planted near lockout.
fn lunge_frame(left_knee_angle: f32) -> Vec<Landmark> {
    let left_knee = (0.55, 0.65);
    let left_ankle = (0.6, 0.85);
    let right_knee = (0.7, 0.75);
    let right_ankle = (0.75, 0.95);
    let shank = (0.2425, 0.9701);

    let left_dir = rotate(shank, left_knee_angle);
    let left_hip = (left_knee.0 + 0.3 * left_dir.0, left_knee.1 + 0.3 * left_dir.1);
    let right_dir = rotate(shank, 170.0);
    let right_hip = (
        right_knee.0 + 0.3 * right_dir.0,
        right_knee.1 + 0.3 * right_dir.1,
    );
    let shoulder = (0.43, 0.25);

    let mut landmarks = neutral_pose();
    place(&mut landmarks, NOSE, (shoulder.0, shoulder.1 - 0.1));
    place(&mut landmarks, LEFT_SHOULDER, shoulder);
    place(&mut landmarks, RIGHT_SHOULDER, shoulder);
    place(&mut landmarks, LEFT_ELBOW, (shoulder.0 - 0.1, shoulder.1 + 0.05));
    place(&mut landmarks, RIGHT_ELBOW, (shoulder.0 - 0.1, shoulder.1 + 0.05));
    place(&mut landmarks, LEFT_WRIST, (shoulder.0 - 0.2, shoulder.1 + 0.1));
    place(&mut landmarks, RIGHT_WRIST, (shoulder.0 - 0.2, shoulder.1 + 0.1));
    place(&mut landmarks, LEFT_HIP, left_hip);
    place(&mut landmarks, RIGHT_HIP, right_hip);
    place(&mut landmarks, LEFT_KNEE, left_knee);
    place(&mut landmarks, RIGHT_KNEE, right_knee);
    place(&mut landmarks, LEFT_ANKLE, left_ankle);
    place(&mut landmarks, RIGHT_ANKLE, right_ankle);
    landmarks
}

fn build_frame(config: &GeneratorConfig, index: usize) -> Vec<Landmark> {
    let period = config.normalized_period() as f32;
    let phase = (index as f32 - period / 4.0) / period * TAU;
    match config.exercise {
        ExerciseType::Squat => squat_frame(127.5 - 42.5 * phase.cos()),
        ExerciseType::PushUp => push_up_frame(118.5 - 53.5 * phase.cos()),
        ExerciseType::Lunge => lunge_frame(120.0 - 25.0 * phase.cos()),
        // Standing still at lockout; classifies as unknown downstream.
        ExerciseType::Unknown => squat_frame(170.0),
    }
}

pub fn build_capture_payload_from_config(config: &GeneratorConfig) -> anyhow::Result<CapturePayload> {
    if config.frames == 0 {
        anyhow::bail!("generator requires at least one frame");
    }
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut frames = Vec::with_capacity(config.frames);

    for index in 0..config.frames {
        if config.dropout > 0.0 && rng.gen::<f32>() < config.dropout {
            frames.push(None);
            continue;
        }
        let mut landmarks = build_frame(config, index);
        for landmark in &mut landmarks {
            landmark.x += jitter(&mut rng, config.noise);
            landmark.y += jitter(&mut rng, config.noise);
        }
        frames.push(Some(LandmarkFrame::new(landmarks)));
    }

    let ancillary = CaptureAncillary {
        total_frames: config.frames,
        fps: Some(config.fps),
        source: config.scenario.clone(),
    };
    Ok(CapturePayload::new(frames, ancillary))
}

pub fn build_capture_payload(exercise: ExerciseType, frames: usize) -> anyhow::Result<CapturePayload> {
    let config = GeneratorConfig {
        exercise,
        frames,
        ..Default::default()
    };
    build_capture_payload_from_config(&config)
        .with_context(|| format!("generating {:?} capture", exercise))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::config::WorkflowConfig;
    use formcore::pose_interface::ExerciseLabel;
    use formcore::processing::WorkoutAnalyzer;

    fn analyze(config: &GeneratorConfig) -> formcore::pose_interface::AnalysisResult {
        let payload = build_capture_payload_from_config(config).unwrap();
        let analyzer = WorkoutAnalyzer::new(WorkflowConfig::default().to_stage_config());
        analyzer.analyze(&payload)
    }

    #[test]
    fn generator_builds_expected_frame_count() {
        let payload = build_capture_payload(ExerciseType::Squat, 90).unwrap();
        assert_eq!(payload.frames.len(), 90);
        assert_eq!(payload.ancillary.total_frames, 90);
        assert_eq!(payload.valid_frames(), 90);
    }

    #[test]
    fn dropout_injects_sentinel_frames() {
        let config = GeneratorConfig {
            dropout: 0.5,
            seed: 7,
            ..Default::default()
        };
        let payload = build_capture_payload_from_config(&config).unwrap();
        let valid = payload.valid_frames();
        assert!(valid < config.frames);
        assert!(valid > 0);
    }

    #[test]
    fn push_up_profile_analyzes_as_push_up() {
        let config = GeneratorConfig {
            exercise: ExerciseType::PushUp,
            ..Default::default()
        };
        let result = analyze(&config);
        assert_eq!(result.exercise_name, ExerciseLabel::PushUp);
        assert!((3..=5).contains(&result.rep_count));
    }

    #[test]
    fn lunge_profile_analyzes_as_lunge() {
        let config = GeneratorConfig {
            exercise: ExerciseType::Lunge,
            ..Default::default()
        };
        let result = analyze(&config);
        assert_eq!(result.exercise_name, ExerciseLabel::Lunge);
        assert!((3..=5).contains(&result.rep_count));
        assert_eq!(result.feedback, vec!["Great lunge form!".to_string()]);
        assert_eq!(result.form_score, 10.0);
    }

    #[test]
    fn motionless_profile_stays_unknown() {
        let config = GeneratorConfig {
            exercise: ExerciseType::Unknown,
            ..Default::default()
        };
        let result = analyze(&config);
        assert_eq!(result.exercise_name, ExerciseLabel::Unknown);
        assert_eq!(result.rep_count, 0);
        assert_eq!(result.form_score, 5.0);
    }
}
