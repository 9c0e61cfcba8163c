//! Transfer-level statistical aggregation over a sequence of frame decodes.

use crate::logging::StatSummary;

/// Accumulates per-frame decode outcomes and computes summary statistics.
#[derive(Debug, Default)]
pub struct TransferAggregator {
    error_count_samples: Vec<f64>,
    frames_attempted: usize,
    frames_successful: usize,
}

impl TransferAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one frame decode attempt.
    pub fn record(&mut self, success: bool, error_count: Option<usize>) {
        self.frames_attempted += 1;
        if success {
            self.frames_successful += 1;
        }
        if let Some(count) = error_count {
            self.error_count_samples.push(count as f64);
        }
    }

    pub fn frames_attempted(&self) -> usize {
        self.frames_attempted
    }

    pub fn frames_successful(&self) -> usize {
        self.frames_successful
    }

    pub fn success_rate(&self) -> f64 {
        if self.frames_attempted == 0 {
            0.0
        } else {
            self.frames_successful as f64 / self.frames_attempted as f64
        }
    }

    pub fn error_count_summary(&self) -> StatSummary {
        self.compute_stat_summary(&self.error_count_samples)
    }

    fn compute_stat_summary(&self, samples: &[f64]) -> StatSummary {
        if samples.is_empty() {
            return StatSummary {
                mean: 0.0,
                stddev: 0.0,
                min: 0.0,
                max: 0.0,
                samples: 0,
            };
        }

        let mean = samples.iter().sum::<f64>() / samples.len() as f64;
        let variance = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / samples.len() as f64;
        let stddev = variance.sqrt();
        let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
        let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        StatSummary {
            mean,
            stddev,
            min,
            max,
            samples: samples.len(),
        }
    }
}
