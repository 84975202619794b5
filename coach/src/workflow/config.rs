use anyhow::Context;
use formcore::prelude::StageConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkflowConfig {
    pub min_valid_frames: usize,
    pub min_rep_frames: usize,
    pub smoothing_window: usize,
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(min_valid_frames: usize, min_rep_frames: usize, smoothing_window: usize) -> Self {
        Self {
            min_valid_frames,
            min_rep_frames,
            smoothing_window,
        }
    }

    pub fn to_stage_config(&self) -> StageConfig {
        StageConfig {
            min_valid_frames: self.min_valid_frames,
            min_rep_frames: self.min_rep_frames,
            smoothing_window: self.smoothing_window,
        }
    }
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        let stage = StageConfig::default();
        Self {
            min_valid_frames: stage.min_valid_frames,
            min_rep_frames: stage.min_rep_frames,
            smoothing_window: stage.smoothing_window,
        }
    }
}
