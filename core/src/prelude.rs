use serde::{Deserialize, Serialize};

use crate::pose_interface::{BodyFrame, ExerciseType};

/// Shared configuration for each analysis stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageConfig {
    pub min_valid_frames: usize,
    pub min_rep_frames: usize,
    pub smoothing_window: usize,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            min_valid_frames: 30,
            min_rep_frames: 10,
            smoothing_window: 5,
        }
    }
}

/// Input payload for an analysis stage.
#[derive(Debug, Clone)]
pub struct StageInput {
    pub frames: Vec<BodyFrame>,
    pub exercise: Option<ExerciseType>,
}

/// Output produced by each stage.
#[derive(Debug, Clone)]
pub struct StageOutput {
    /// The stage's primary derived signal, one sample per valid frame.
    pub samples: Vec<f32>,
    pub metadata: StageMetadata,
}

/// Metadata used for chaining stages and telemetry.
#[derive(Debug, Clone, Default)]
pub struct StageMetadata {
    pub exercise: Option<ExerciseType>,
    pub confidence: Option<u32>,
    pub rep_count: Option<u32>,
    pub feedback: Vec<String>,
    pub form_score: Option<f32>,
    pub notes: Vec<String>,
}

/// Common error type for stage execution.
#[derive(thiserror::Error, Debug)]
pub enum StageError {
    #[error("buffer exhaustion: {0}")]
    BufferExhaustion(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("internal failure: {0}")]
    Internal(String),
}

pub type StageResult<T> = Result<T, StageError>;

/// Trait describing object-oriented analysis stages.
pub trait ProcessingStage {
    fn initialize(&mut self, config: &StageConfig) -> StageResult<()>;
    fn execute(&mut self, input: StageInput) -> StageResult<StageOutput>;
    fn cleanup(&mut self);
}
