use crate::math::{find_peaks, find_valleys, SmoothingHelper, StatsHelper};
use crate::pose_interface::{BodyFrame, ExerciseType};
use crate::prelude::{
    ProcessingStage, StageConfig, StageError, StageInput, StageMetadata, StageOutput, StageResult,
};
use crate::processing::buffer_pool::BufferPool;
use crate::processing::signals::SignalExtractor;
use crate::telemetry::log::LogManager;

/// Extrema thresholds for one exercise's canonical angle signal.
#[derive(Debug, Clone, Copy)]
pub struct ExtremaWindow {
    /// Smallest angle that still counts as the locked-out position.
    pub lockout_floor: f32,
    /// Largest angle that still counts as the deepest position.
    pub bottom_ceiling: f32,
    /// Minimum samples between consecutive extrema of the same kind.
    pub min_spacing: usize,
}

/// Empirically tuned counting thresholds; preserved exactly.
#[derive(Debug, Clone)]
pub struct RepetitionPolicy {
    pub smoothing_cap: usize,
    pub squat: ExtremaWindow,
    pub push_up: ExtremaWindow,
    pub lunge: ExtremaWindow,
}

impl Default for RepetitionPolicy {
    fn default() -> Self {
        Self {
            smoothing_cap: 7,
            squat: ExtremaWindow {
                lockout_floor: 160.0,
                bottom_ceiling: 90.0,
                min_spacing: 10,
            },
            push_up: ExtremaWindow {
                lockout_floor: 160.0,
                bottom_ceiling: 70.0,
                min_spacing: 8,
            },
            lunge: ExtremaWindow {
                lockout_floor: 140.0,
                bottom_ceiling: 100.0,
                min_spacing: 10,
            },
        }
    }
}

/// Peak/valley-based repetition counting on the canonical angle signal of
/// the classified exercise.
pub struct RepetitionStage {
    pool: BufferPool,
    config: Option<StageConfig>,
    policy: RepetitionPolicy,
    logger: LogManager,
}

impl RepetitionStage {
    pub fn new(pool_size: usize) -> Self {
        Self::with_policy(pool_size, RepetitionPolicy::default())
    }

    pub fn with_policy(pool_size: usize, policy: RepetitionPolicy) -> Self {
        Self {
            pool: BufferPool::with_capacity(pool_size),
            config: None,
            policy,
            logger: LogManager::new("repetition"),
        }
    }

    /// A completed repetition needs both a lockout and a bottom extremum;
    /// the minimum guards against an unmatched extremum at a boundary.
    pub fn count_cycles(signal: &[f32], window: &ExtremaWindow) -> u32 {
        let peaks = find_peaks(signal, window.lockout_floor, window.min_spacing);
        let valleys = find_valleys(signal, window.bottom_ceiling, window.min_spacing);
        peaks.len().min(valleys.len()) as u32
    }

    fn canonical_signal(
        &mut self,
        frames: &[BodyFrame],
        exercise: ExerciseType,
    ) -> StageResult<Vec<f32>> {
        match exercise {
            ExerciseType::Squat => SignalExtractor::knee_angle_series(frames, &mut self.pool),
            ExerciseType::PushUp => SignalExtractor::elbow_angle_series(frames, &mut self.pool),
            ExerciseType::Lunge => {
                // The working leg is the one with the larger raw range.
                let left = SignalExtractor::left_knee_angle_series(frames, &mut self.pool)?;
                let right = SignalExtractor::right_knee_angle_series(frames, &mut self.pool)?;
                if StatsHelper::span(&left) > StatsHelper::span(&right) {
                    self.pool.release(right);
                    Ok(left)
                } else {
                    self.pool.release(left);
                    Ok(right)
                }
            }
            ExerciseType::Unknown => Err(StageError::InvalidInput(
                "no canonical signal for unknown exercise".into(),
            )),
        }
    }

    fn extrema_window(&self, exercise: ExerciseType) -> Option<&ExtremaWindow> {
        match exercise {
            ExerciseType::Squat => Some(&self.policy.squat),
            ExerciseType::PushUp => Some(&self.policy.push_up),
            ExerciseType::Lunge => Some(&self.policy.lunge),
            ExerciseType::Unknown => None,
        }
    }
}

impl ProcessingStage for RepetitionStage {
    fn initialize(&mut self, config: &StageConfig) -> StageResult<()> {
        self.config = Some(config.clone());
        Ok(())
    }

    fn execute(&mut self, input: StageInput) -> StageResult<StageOutput> {
        let config = self
            .config
            .as_ref()
            .ok_or_else(|| StageError::Internal("stage not initialized".into()))?;
        let exercise = input
            .exercise
            .ok_or_else(|| StageError::InvalidInput("classification missing".into()))?;

        // Unknown movement patterns yield zero without extrema detection.
        let window = match self.extrema_window(exercise) {
            Some(window) => *window,
            None => {
                return Ok(StageOutput {
                    samples: Vec::new(),
                    metadata: StageMetadata {
                        rep_count: Some(0),
                        notes: vec!["unknown exercise, no repetitions counted".to_string()],
                        ..Default::default()
                    },
                });
            }
        };

        if input.frames.len() < config.min_rep_frames {
            return Ok(StageOutput {
                samples: Vec::new(),
                metadata: StageMetadata {
                    rep_count: Some(0),
                    notes: vec![format!(
                        "{} frames is below the counting minimum",
                        input.frames.len()
                    )],
                    ..Default::default()
                },
            });
        }

        let raw = self.canonical_signal(&input.frames, exercise)?;
        let smoothing = usize::min(self.policy.smoothing_cap, raw.len());
        let smoothed = SmoothingHelper::savgol(&raw, smoothing);
        self.pool.release(raw);

        let rep_count = Self::count_cycles(&smoothed, &window);
        self.logger
            .record(&format!("{:?} repetitions {}", exercise, rep_count));

        Ok(StageOutput {
            samples: smoothed,
            metadata: StageMetadata {
                rep_count: Some(rep_count),
                notes: vec![format!("counted {} repetitions", rep_count)],
                ..Default::default()
            },
        })
    }

    fn cleanup(&mut self) {
        self.pool.reset();
        self.config = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::TAU;

    fn knee_oscillation(samples: usize, period: f32) -> Vec<f32> {
        (0..samples)
            .map(|i| 125.0 + 45.0 * (i as f32 / period * TAU).sin())
            .collect()
    }

    #[test]
    fn five_cycle_squat_signal_counts_five() {
        let policy = RepetitionPolicy::default();
        let signal = knee_oscillation(150, 30.0);
        let smoothed = SmoothingHelper::savgol(&signal, 7);
        let reps = RepetitionStage::count_cycles(&smoothed, &policy.squat);
        assert!((4..=6).contains(&reps), "expected 5 +/- 1, got {}", reps);
    }

    #[test]
    fn shallow_movement_counts_nothing() {
        let policy = RepetitionPolicy::default();
        // Oscillates between 110 and 140: never locks out, never deep.
        let signal: Vec<f32> = (0..120)
            .map(|i| 125.0 + 15.0 * (i as f32 / 30.0 * TAU).sin())
            .collect();
        assert_eq!(RepetitionStage::count_cycles(&signal, &policy.squat), 0);
    }

    #[test]
    fn unmatched_boundary_extremum_does_not_count() {
        let policy = RepetitionPolicy::default();
        // One full lockout peak but the bottom never reaches 90.
        let signal: Vec<f32> = (0..60)
            .map(|i| 130.0 + 38.0 * (i as f32 / 60.0 * TAU).sin())
            .collect();
        assert_eq!(RepetitionStage::count_cycles(&signal, &policy.squat), 0);
    }

    #[test]
    fn unknown_exercise_yields_zero_reps() {
        let mut stage = RepetitionStage::new(8);
        stage.initialize(&StageConfig::default()).unwrap();
        let output = stage
            .execute(StageInput {
                frames: Vec::new(),
                exercise: Some(ExerciseType::Unknown),
            })
            .unwrap();
        assert_eq!(output.metadata.rep_count, Some(0));
        stage.cleanup();
    }

    #[test]
    fn too_few_frames_yield_zero_reps() {
        let mut stage = RepetitionStage::new(8);
        stage.initialize(&StageConfig::default()).unwrap();
        let output = stage
            .execute(StageInput {
                frames: Vec::new(),
                exercise: Some(ExerciseType::Squat),
            })
            .unwrap();
        assert_eq!(output.metadata.rep_count, Some(0));
        stage.cleanup();
    }
}
