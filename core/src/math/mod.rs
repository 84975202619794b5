pub mod geometry;
pub mod matrix;
pub mod peaks;
pub mod smoothing;
pub mod stats;

pub use geometry::GeometryHelper;
pub use matrix::MatrixHelper;
pub use peaks::{find_peaks, find_valleys};
pub use smoothing::SmoothingHelper;
pub use stats::StatsHelper;
