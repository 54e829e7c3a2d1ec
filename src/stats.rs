use crate::errors::SpeedTestError;
use serde::Serialize;

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }

    Some(samples.iter().sum::<f64>() / samples.len() as f64)
}

/// Population standard deviation (divides by N) around the mean.
pub fn population_std_dev(samples: &[f64]) -> Option<f64> {
    let avg = mean(samples)?;

    let variance = samples
        .iter()
        .map(|sample| (sample - avg).powi(2))
        .sum::<f64>()
        / samples.len() as f64;

    Some(variance.sqrt())
}

/// Round-trip statistics for one server, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatencyStats {
    /// Mean round-trip time.
    pub avg_ms: f64,
    /// Population standard deviation of the round-trip times.
    pub jitter_ms: f64,
    /// Number of successful samples the figures are based on.
    pub samples: usize,
}

impl LatencyStats {
    /// Summarise a sample sequence. Fails when there is nothing to
    /// summarise; an empty sequence has no average and no jitter.
    pub fn from_samples(samples: &[f64]) -> Result<Self, SpeedTestError> {
        match (mean(samples), population_std_dev(samples)) {
            (Some(avg_ms), Some(jitter_ms)) => {
                Ok(Self { avg_ms, jitter_ms, samples: samples.len() })
            }
            _ => Err(SpeedTestError::latency_probe_failed(
                "no successful latency sample",
            )),
        }
    }
}
