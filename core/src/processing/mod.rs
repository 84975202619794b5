pub mod analyzer;
pub mod buffer_pool;
pub mod classify;
pub mod form;
pub mod repetition;
pub mod signals;

pub use analyzer::{AnalysisReport, WorkoutAnalyzer};
pub use buffer_pool::BufferPool;
pub use classify::ClassifyStage;
pub use form::FormStage;
pub use repetition::RepetitionStage;
pub use signals::SignalExtractor;
