use crate::math::{SmoothingHelper, StatsHelper};
use crate::pose_interface::{BodyFrame, ExerciseType};
use crate::prelude::{
    ProcessingStage, StageConfig, StageError, StageInput, StageMetadata, StageOutput, StageResult,
};
use crate::processing::buffer_pool::BufferPool;
use crate::processing::signals::SignalExtractor;
use crate::telemetry::log::LogManager;

/// One threshold paired with the points it contributes.
#[derive(Debug, Clone, Copy)]
pub struct SingleRule {
    pub threshold: f32,
    pub points: u32,
}

/// Two thresholds that must hold together.
#[derive(Debug, Clone, Copy)]
pub struct PairRule {
    pub first: f32,
    pub second: f32,
    pub points: u32,
}

/// Empirically tuned classification thresholds. The values are domain
/// policy; they must not be renormalized without validation against real
/// movement data.
#[derive(Debug, Clone)]
pub struct ClassifierPolicy {
    pub decision_floor: u32,
    pub horizontal_gap: f32,
    pub horizontal_ratio: f32,
    pub asymmetry_degrees: f32,
    /// hip_movement AND knee_movement.
    pub squat_drop: PairRule,
    pub squat_hip: SingleRule,
    pub squat_knee: SingleRule,
    /// elbow_movement AND shoulder_movement.
    pub push_up_press: PairRule,
    pub push_up_horizontal_points: u32,
    pub push_up_elbow: SingleRule,
    pub lunge_asymmetry_points: u32,
    /// hip_movement AND knee_movement.
    pub lunge_drop: PairRule,
}

impl Default for ClassifierPolicy {
    fn default() -> Self {
        Self {
            decision_floor: 50,
            horizontal_gap: 0.15,
            horizontal_ratio: 0.6,
            asymmetry_degrees: 30.0,
            squat_drop: PairRule {
                first: 0.2,
                second: 0.25,
                points: 40,
            },
            squat_hip: SingleRule {
                threshold: 0.3,
                points: 30,
            },
            squat_knee: SingleRule {
                threshold: 0.4,
                points: 30,
            },
            push_up_press: PairRule {
                first: 0.3,
                second: 0.15,
                points: 40,
            },
            push_up_horizontal_points: 35,
            push_up_elbow: SingleRule {
                threshold: 0.4,
                points: 25,
            },
            lunge_asymmetry_points: 60,
            lunge_drop: PairRule {
                first: 0.25,
                second: 0.3,
                points: 40,
            },
        }
    }
}

/// Aggregate movement metrics computed on the smoothed signals. Angle
/// ranges are normalized by 180 to yield a fraction.
#[derive(Debug, Clone, Default)]
pub struct MovementMetrics {
    pub hip_movement: f32,
    pub knee_movement: f32,
    pub shoulder_movement: f32,
    pub elbow_movement: f32,
    pub horizontal_position: bool,
    pub asymmetric_leg_movement: bool,
}

/// Confidence-scored exercise classification over the movement metrics.
pub struct ClassifyStage {
    pool: BufferPool,
    config: Option<StageConfig>,
    policy: ClassifierPolicy,
    logger: LogManager,
}

impl ClassifyStage {
    pub fn new(pool_size: usize) -> Self {
        Self::with_policy(pool_size, ClassifierPolicy::default())
    }

    pub fn with_policy(pool_size: usize, policy: ClassifierPolicy) -> Self {
        Self {
            pool: BufferPool::with_capacity(pool_size),
            config: None,
            policy,
            logger: LogManager::new("classify"),
        }
    }

    /// Per-exercise confidence totals, in the fixed tie-break order.
    pub fn confidence_scores(&self, metrics: &MovementMetrics) -> [(ExerciseType, u32); 3] {
        let policy = &self.policy;

        let mut squat = 0;
        if metrics.hip_movement > policy.squat_drop.first
            && metrics.knee_movement > policy.squat_drop.second
        {
            squat += policy.squat_drop.points;
        }
        if metrics.hip_movement > policy.squat_hip.threshold {
            squat += policy.squat_hip.points;
        }
        if metrics.knee_movement > policy.squat_knee.threshold {
            squat += policy.squat_knee.points;
        }

        let mut push_up = 0;
        if metrics.elbow_movement > policy.push_up_press.first
            && metrics.shoulder_movement > policy.push_up_press.second
        {
            push_up += policy.push_up_press.points;
        }
        if metrics.horizontal_position {
            push_up += policy.push_up_horizontal_points;
        }
        if metrics.elbow_movement > policy.push_up_elbow.threshold {
            push_up += policy.push_up_elbow.points;
        }

        let mut lunge = 0;
        if metrics.asymmetric_leg_movement {
            lunge += policy.lunge_asymmetry_points;
        }
        if metrics.hip_movement > policy.lunge_drop.first
            && metrics.knee_movement > policy.lunge_drop.second
        {
            lunge += policy.lunge_drop.points;
        }

        [
            (ExerciseType::Squat, squat),
            (ExerciseType::PushUp, push_up),
            (ExerciseType::Lunge, lunge),
        ]
    }

    /// Maximum-confidence winner; exact ties resolve in evaluation order.
    fn decide(&self, scores: &[(ExerciseType, u32); 3]) -> (ExerciseType, u32) {
        let top = scores.iter().map(|(_, score)| *score).max().unwrap_or(0);
        if top < self.policy.decision_floor {
            return (ExerciseType::Unknown, top);
        }
        for &(exercise, score) in scores {
            if score == top {
                return (exercise, score);
            }
        }
        (ExerciseType::Unknown, top)
    }

    /// Derives the aggregate metrics plus the smoothed hip-height profile.
    /// Each metric needs at least two valid frames, otherwise it stays
    /// 0 / false.
    fn derive_metrics(
        &mut self,
        frames: &[BodyFrame],
        window: usize,
    ) -> StageResult<(MovementMetrics, Vec<f32>)> {
        if frames.len() < 2 {
            return Ok((MovementMetrics::default(), Vec::new()));
        }

        let hip_raw = SignalExtractor::hip_height_series(frames, &mut self.pool)?;
        let hip = SmoothingHelper::savgol(&hip_raw, window);
        self.pool.release(hip_raw);

        let knee_raw = SignalExtractor::knee_angle_series(frames, &mut self.pool)?;
        let knee = SmoothingHelper::savgol(&knee_raw, window);
        self.pool.release(knee_raw);

        let shoulder_raw = SignalExtractor::shoulder_height_series(frames, &mut self.pool)?;
        let shoulder = SmoothingHelper::savgol(&shoulder_raw, window);

        let elbow_raw = SignalExtractor::left_elbow_angle_series(frames, &mut self.pool)?;
        let elbow = SmoothingHelper::savgol(&elbow_raw, window);
        self.pool.release(elbow_raw);

        let horizontal_frames = frames
            .iter()
            .filter(|frame| (frame.shoulder_height() - frame.hip_height()).abs() < self.policy.horizontal_gap)
            .count();
        let horizontal_position =
            horizontal_frames as f32 / frames.len() as f32 > self.policy.horizontal_ratio;

        let left_knee = SignalExtractor::left_knee_angle_series(frames, &mut self.pool)?;
        let right_knee = SignalExtractor::right_knee_angle_series(frames, &mut self.pool)?;
        let leg_span_gap = (StatsHelper::span(&left_knee) - StatsHelper::span(&right_knee)).abs();
        let asymmetric_leg_movement = leg_span_gap > self.policy.asymmetry_degrees;
        self.pool.release(left_knee);
        self.pool.release(right_knee);

        let metrics = MovementMetrics {
            hip_movement: StatsHelper::span(&hip),
            knee_movement: StatsHelper::span(&knee) / 180.0,
            shoulder_movement: StatsHelper::span(&shoulder),
            elbow_movement: StatsHelper::span(&elbow) / 180.0,
            horizontal_position,
            asymmetric_leg_movement,
        };
        self.pool.release(shoulder_raw);

        Ok((metrics, hip))
    }
}

impl ProcessingStage for ClassifyStage {
    fn initialize(&mut self, config: &StageConfig) -> StageResult<()> {
        self.config = Some(config.clone());
        Ok(())
    }

    fn execute(&mut self, input: StageInput) -> StageResult<StageOutput> {
        let config = self
            .config
            .as_ref()
            .ok_or_else(|| StageError::Internal("stage not initialized".into()))?;
        if input.frames.is_empty() {
            return Err(StageError::InvalidInput("no frames provided".into()));
        }

        let window = config.smoothing_window;
        let (metrics, hip_profile) = self.derive_metrics(&input.frames, window)?;
        let scores = self.confidence_scores(&metrics);
        let (exercise, confidence) = self.decide(&scores);

        self.logger
            .record(&format!("exercise {:?} confidence {}", exercise, confidence));

        let metadata = StageMetadata {
            exercise: Some(exercise),
            confidence: Some(confidence),
            notes: vec![format!("classified {:?} at {}", exercise, confidence)],
            ..Default::default()
        };

        Ok(StageOutput {
            samples: hip_profile,
            metadata,
        })
    }

    fn cleanup(&mut self) {
        self.pool.reset();
        self.config = None;
    }
}
