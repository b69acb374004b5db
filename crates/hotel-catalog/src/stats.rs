//! Request latency statistics

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Latencies kept in memory
pub const RETAINED_SAMPLES: usize = 500;
/// Latencies summarized in a snapshot
pub const WINDOW: usize = 100;

#[derive(Debug, Default)]
struct Samples {
    count: u64,
    latencies: VecDeque<Duration>,
}

/// Counts completed requests and keeps their recent latencies
#[derive(Debug, Default)]
pub struct RequestStats {
    samples: Mutex<Samples>,
}

/// Point-in-time summary of `RequestStats`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub request_count: u64,
    /// Mean latency over the last `WINDOW` requests, ms rounded to 0.1
    pub avg_response_ms: f64,
    /// Max latency over the last `WINDOW` requests, ms rounded to 0.1
    pub peak_response_ms: f64,
}

impl RequestStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, latency: Duration) {
        let mut samples = self.samples.lock().unwrap_or_else(|e| e.into_inner());
        samples.count += 1;
        samples.latencies.push_back(latency);
        while samples.latencies.len() > RETAINED_SAMPLES {
            samples.latencies.pop_front();
        }
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let samples = self.samples.lock().unwrap_or_else(|e| e.into_inner());
        let recent: Vec<f64> = samples
            .latencies
            .iter()
            .rev()
            .take(WINDOW)
            .map(|d| d.as_secs_f64() * 1000.0)
            .collect();

        if recent.is_empty() {
            return StatsSnapshot {
                request_count: samples.count,
                ..Default::default()
            };
        }

        let avg = recent.iter().sum::<f64>() / recent.len() as f64;
        let peak = recent.iter().copied().fold(0.0, f64::max);
        StatsSnapshot {
            request_count: samples.count,
            avg_response_ms: round_tenth(avg),
            peak_response_ms: round_tenth(peak),
        }
    }

    pub fn reset(&self) {
        let mut samples = self.samples.lock().unwrap_or_else(|e| e.into_inner());
        *samples = Samples::default();
    }
}

fn round_tenth(ms: f64) -> f64 {
    (ms * 10.0).round() / 10.0
}
