use std::sync::Mutex;

/// Counters for completed analyses and degraded stages.
pub struct MetricsRecorder {
    inner: Mutex<Metrics>,
}

struct Metrics {
    analyses: usize,
    stage_faults: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Metrics {
                analyses: 0,
                stage_faults: 0,
            }),
        }
    }

    pub fn record_analysis(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.analyses += 1;
        }
    }

    pub fn record_stage_fault(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.stage_faults += 1;
        }
    }

    pub fn snapshot(&self) -> (usize, usize) {
        if let Ok(metrics) = self.inner.lock() {
            (metrics.analyses, metrics.stage_faults)
        } else {
            (0, 0)
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}
