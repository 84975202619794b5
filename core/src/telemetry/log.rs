use log::info;

/// Scoped logger used by the analysis stages.
pub struct LogManager {
    scope: &'static str,
}

impl LogManager {
    pub fn new(scope: &'static str) -> Self {
        Self { scope }
    }

    pub fn record(&self, message: &str) {
        info!("{}: {}", self.scope, message);
    }
}

impl Default for LogManager {
    fn default() -> Self {
        Self::new("analysis")
    }
}
