//! Core signal-analysis engine for the Rust workout form platform.
//!
//! The modules turn a noisy sequence of body-joint landmarks into a
//! structured verdict: exercise classification, repetition count, and
//! rule-based form feedback, with well-defined processing stages.

pub mod math;
pub mod pose_interface;
pub mod prelude;
pub mod processing;
pub mod telemetry;

pub use prelude::{ProcessingStage, StageInput, StageOutput};
