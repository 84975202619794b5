use crate::math::GeometryHelper;
use crate::pose_interface::{BodyFrame, ExerciseType};
use crate::prelude::{
    ProcessingStage, StageConfig, StageError, StageInput, StageMetadata, StageOutput, StageResult,
};
use crate::processing::buffer_pool::BufferPool;
use crate::processing::signals::SignalExtractor;
use crate::telemetry::log::LogManager;

/// One per-frame violation rule: the margin that triggers it, the fraction
/// of frames that must exceed the margin before feedback fires, and the
/// score penalty when it does.
#[derive(Debug, Clone, Copy)]
pub struct ViolationRule {
    pub margin: f32,
    pub frame_fraction: f32,
    pub penalty: f32,
}

/// Empirically tuned form thresholds and penalties; preserved exactly.
#[derive(Debug, Clone)]
pub struct FormPolicy {
    pub max_score: f32,
    pub fallback_score: f32,
    pub squat_knee_cave: ViolationRule,
    pub squat_knee_forward: ViolationRule,
    pub squat_torso_lean: ViolationRule,
    pub squat_depth: ViolationRule,
    pub push_up_hip_sag: ViolationRule,
    pub push_up_hip_pike: ViolationRule,
    pub push_up_partial_rom: ViolationRule,
    pub push_up_head_drop: ViolationRule,
    pub lunge_knee_forward: ViolationRule,
    pub lunge_torso_lean: ViolationRule,
    pub lunge_depth: ViolationRule,
}

impl Default for FormPolicy {
    fn default() -> Self {
        Self {
            max_score: 10.0,
            fallback_score: 5.0,
            squat_knee_cave: ViolationRule {
                margin: 0.02,
                frame_fraction: 0.15,
                penalty: 2.5,
            },
            squat_knee_forward: ViolationRule {
                margin: 0.05,
                frame_fraction: 0.2,
                penalty: 1.5,
            },
            // margin is the minimum torso incline in degrees here.
            squat_torso_lean: ViolationRule {
                margin: 60.0,
                frame_fraction: 0.25,
                penalty: 2.0,
            },
            squat_depth: ViolationRule {
                margin: 0.02,
                frame_fraction: 0.3,
                penalty: 1.5,
            },
            push_up_hip_sag: ViolationRule {
                margin: 0.03,
                frame_fraction: 0.2,
                penalty: 2.5,
            },
            push_up_hip_pike: ViolationRule {
                margin: 0.03,
                frame_fraction: 0.2,
                penalty: 2.0,
            },
            // margin is the elbow angle that marks a partial press.
            push_up_partial_rom: ViolationRule {
                margin: 110.0,
                frame_fraction: 0.3,
                penalty: 2.0,
            },
            push_up_head_drop: ViolationRule {
                margin: 0.05,
                frame_fraction: 0.25,
                penalty: 1.0,
            },
            lunge_knee_forward: ViolationRule {
                margin: 0.05,
                frame_fraction: 0.2,
                penalty: 2.0,
            },
            lunge_torso_lean: ViolationRule {
                margin: 0.08,
                frame_fraction: 0.25,
                penalty: 1.5,
            },
            // margin is the normalized knee height marking a shallow stride.
            lunge_depth: ViolationRule {
                margin: 0.7,
                frame_fraction: 0.3,
                penalty: 1.5,
            },
        }
    }
}

const SQUAT_KNEE_CAVE_MSG: &str = "Keep your knees aligned with your toes - avoid knee cave";
const SQUAT_KNEE_FORWARD_MSG: &str = "Keep your knees behind your toes";
const SQUAT_TORSO_MSG: &str = "Keep your chest up and back straight";
const SQUAT_DEPTH_MSG: &str = "Go deeper - hips should go below knee level";
const SQUAT_PRAISE_MSG: &str = "Excellent squat form! Keep it up!";
const PUSH_UP_SAG_MSG: &str = "Keep your core tight - avoid hip sag";
const PUSH_UP_PIKE_MSG: &str = "Keep your body straight - avoid piking your hips";
const PUSH_UP_ROM_MSG: &str = "Go lower - chest should nearly touch the ground";
const PUSH_UP_HEAD_MSG: &str = "Keep your head in neutral position";
const PUSH_UP_PRAISE_MSG: &str = "Perfect push-up form! Well done!";
const LUNGE_KNEE_MSG: &str = "Keep your front knee behind your toes";
const LUNGE_TORSO_MSG: &str = "Keep your torso upright";
const LUNGE_DEPTH_MSG: &str = "Go deeper in your lunge";
const LUNGE_PRAISE_MSG: &str = "Great lunge form!";
const UNRECOGNIZED_MSG: &str = "Exercise not recognized for detailed analysis";

/// Rule-based form scoring with qualitative feedback per exercise.
pub struct FormStage {
    pool: BufferPool,
    config: Option<StageConfig>,
    policy: FormPolicy,
    logger: LogManager,
}

struct RuleTally {
    violations: usize,
    rule: ViolationRule,
    message: &'static str,
}

impl FormStage {
    pub fn new(pool_size: usize) -> Self {
        Self::with_policy(pool_size, FormPolicy::default())
    }

    pub fn with_policy(pool_size: usize, policy: FormPolicy) -> Self {
        Self {
            pool: BufferPool::with_capacity(pool_size),
            config: None,
            policy,
            logger: LogManager::new("form"),
        }
    }

    fn settle(&self, tallies: Vec<RuleTally>, total_frames: usize, praise: &str) -> (Vec<String>, f32) {
        let mut feedback = Vec::new();
        let mut score = self.policy.max_score;
        for tally in tallies {
            if tally.violations as f32 > total_frames as f32 * tally.rule.frame_fraction {
                feedback.push(tally.message.to_string());
                score -= tally.rule.penalty;
            }
        }
        if feedback.is_empty() {
            feedback.push(praise.to_string());
        }
        (feedback, score.clamp(0.0, self.policy.max_score))
    }

    fn squat_form(&mut self, frames: &[BodyFrame]) -> StageResult<(Vec<String>, f32)> {
        let policy = self.policy.clone();
        let torso = SignalExtractor::torso_incline_series(frames, &mut self.pool)?;

        let mut cave = 0;
        let mut forward = 0;
        let mut lean = 0;
        let mut shallow = 0;
        for (frame, incline) in frames.iter().zip(&torso) {
            let knee_x = frame.left_knee.x;
            if knee_x < frame.left_hip.x.min(frame.left_ankle.x) - policy.squat_knee_cave.margin {
                cave += 1;
            }
            if knee_x > frame.left_ankle.x + policy.squat_knee_forward.margin {
                forward += 1;
            }
            if *incline < policy.squat_torso_lean.margin {
                lean += 1;
            }
            let knee_height = (frame.left_knee.y + frame.right_knee.y) / 2.0;
            if frame.hip_height() < knee_height - policy.squat_depth.margin {
                shallow += 1;
            }
        }
        self.pool.release(torso);

        let tallies = vec![
            RuleTally {
                violations: cave,
                rule: policy.squat_knee_cave,
                message: SQUAT_KNEE_CAVE_MSG,
            },
            RuleTally {
                violations: forward,
                rule: policy.squat_knee_forward,
                message: SQUAT_KNEE_FORWARD_MSG,
            },
            RuleTally {
                violations: lean,
                rule: policy.squat_torso_lean,
                message: SQUAT_TORSO_MSG,
            },
            RuleTally {
                violations: shallow,
                rule: policy.squat_depth,
                message: SQUAT_DEPTH_MSG,
            },
        ];
        Ok(self.settle(tallies, frames.len(), SQUAT_PRAISE_MSG))
    }

    fn push_up_form(&mut self, frames: &[BodyFrame]) -> StageResult<(Vec<String>, f32)> {
        let policy = self.policy.clone();

        let mut sag = 0;
        let mut pike = 0;
        let mut partial = 0;
        let mut head = 0;
        for frame in frames {
            let shoulder_height = frame.shoulder_height();
            let hip_height = frame.hip_height();
            let ankle_height = (frame.left_ankle.y + frame.right_ankle.y) / 2.0;

            if hip_height > shoulder_height.max(ankle_height) + policy.push_up_hip_sag.margin {
                sag += 1;
            }
            if hip_height < shoulder_height.min(ankle_height) - policy.push_up_hip_pike.margin {
                pike += 1;
            }
            let elbow_angle =
                GeometryHelper::joint_angle(&frame.left_shoulder, &frame.left_elbow, &frame.left_wrist);
            if elbow_angle > policy.push_up_partial_rom.margin {
                partial += 1;
            }
            if frame.nose.y > shoulder_height + policy.push_up_head_drop.margin {
                head += 1;
            }
        }

        let tallies = vec![
            RuleTally {
                violations: sag,
                rule: policy.push_up_hip_sag,
                message: PUSH_UP_SAG_MSG,
            },
            RuleTally {
                violations: pike,
                rule: policy.push_up_hip_pike,
                message: PUSH_UP_PIKE_MSG,
            },
            RuleTally {
                violations: partial,
                rule: policy.push_up_partial_rom,
                message: PUSH_UP_ROM_MSG,
            },
            RuleTally {
                violations: head,
                rule: policy.push_up_head_drop,
                message: PUSH_UP_HEAD_MSG,
            },
        ];
        Ok(self.settle(tallies, frames.len(), PUSH_UP_PRAISE_MSG))
    }

    fn lunge_form(&mut self, frames: &[BodyFrame]) -> StageResult<(Vec<String>, f32)> {
        let policy = self.policy.clone();

        let mut forward = 0;
        let mut lean = 0;
        let mut shallow = 0;
        for frame in frames {
            if frame.left_knee.x > frame.left_ankle.x + policy.lunge_knee_forward.margin {
                forward += 1;
            }
            let (shoulder_x, _) = frame.shoulder_midpoint();
            let (hip_x, _) = frame.hip_midpoint();
            if (shoulder_x - hip_x).abs() > policy.lunge_torso_lean.margin {
                lean += 1;
            }
            if frame.left_knee.y.min(frame.right_knee.y) > policy.lunge_depth.margin {
                shallow += 1;
            }
        }

        let tallies = vec![
            RuleTally {
                violations: forward,
                rule: policy.lunge_knee_forward,
                message: LUNGE_KNEE_MSG,
            },
            RuleTally {
                violations: lean,
                rule: policy.lunge_torso_lean,
                message: LUNGE_TORSO_MSG,
            },
            RuleTally {
                violations: shallow,
                rule: policy.lunge_depth,
                message: LUNGE_DEPTH_MSG,
            },
        ];
        Ok(self.settle(tallies, frames.len(), LUNGE_PRAISE_MSG))
    }
}

impl ProcessingStage for FormStage {
    fn initialize(&mut self, config: &StageConfig) -> StageResult<()> {
        self.config = Some(config.clone());
        Ok(())
    }

    fn execute(&mut self, input: StageInput) -> StageResult<StageOutput> {
        if self.config.is_none() {
            return Err(StageError::Internal("stage not initialized".into()));
        }
        let exercise = input
            .exercise
            .ok_or_else(|| StageError::InvalidInput("classification missing".into()))?;

        let (feedback, form_score) = match exercise {
            ExerciseType::Squat => self.squat_form(&input.frames)?,
            ExerciseType::PushUp => self.push_up_form(&input.frames)?,
            ExerciseType::Lunge => self.lunge_form(&input.frames)?,
            ExerciseType::Unknown => (
                vec![UNRECOGNIZED_MSG.to_string()],
                self.policy.fallback_score,
            ),
        };

        self.logger
            .record(&format!("{:?} form score {:.1}", exercise, form_score));

        Ok(StageOutput {
            samples: Vec::new(),
            metadata: StageMetadata {
                feedback,
                form_score: Some(form_score),
                notes: vec![format!("form score {:.1}", form_score)],
                ..Default::default()
            },
        })
    }

    fn cleanup(&mut self) {
        self.pool.reset();
        self.config = None;
    }
}
