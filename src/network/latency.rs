//! Connection latency sampling.
//!
//! A sample is the time it takes to complete a TCP handshake with the
//! target, measured on the SMB port by default since every domain
//! controller serves it. Attempts run back to back with a fixed pause, and
//! the pause also follows the last attempt so runs of equal `count` always
//! take comparable wall time.

use super::connect;
use crate::utils::{as_millis_f64, EventSink, ProbeError, Result, TestResult};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const LATENCY_COUNT: u32 = 10;
pub const LATENCY_PORT: u16 = 445;
pub const LATENCY_TIMEOUT: Duration = Duration::from_secs(2);
pub const LATENCY_INTERVAL: Duration = Duration::from_millis(500);

/// Aggregate over the successful samples of one run, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatencyStats {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub samples: usize,
}

impl LatencyStats {
    /// Returns `None` when no attempt produced a sample.
    pub fn from_samples(samples: &[Option<f64>]) -> Option<Self> {
        let valid: Vec<f64> = samples.iter().flatten().copied().collect();
        if valid.is_empty() {
            return None;
        }

        let sum: f64 = valid.iter().sum();
        let min = valid.iter().copied().fold(f64::INFINITY, f64::min);
        let max = valid.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Some(Self {
            // Rounding in the sum can land a hair outside [min, max].
            mean: (sum / valid.len() as f64).clamp(min, max),
            min,
            max,
            samples: valid.len(),
        })
    }
}

pub struct LatencySampler {
    pub host: String,
    pub count: u32,
    pub port: u16,
    pub timeout: Duration,
    pub interval: Duration,
    sink: Arc<dyn EventSink>,
}

impl LatencySampler {
    pub fn new(host: String, sink: Arc<dyn EventSink>) -> Self {
        Self {
            host,
            count: LATENCY_COUNT,
            port: LATENCY_PORT,
            timeout: LATENCY_TIMEOUT,
            interval: LATENCY_INTERVAL,
            sink,
        }
    }

    pub fn with_count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Runs every attempt and returns one slot per attempt.
    pub async fn collect(&self) -> Vec<Option<f64>> {
        let mut samples = Vec::with_capacity(self.count as usize);

        for _ in 0..self.count {
            let start = Instant::now();
            let sample = match connect(&self.host, self.port, self.timeout).await {
                Ok(stream) => {
                    let elapsed = start.elapsed();
                    drop(stream);
                    Some(as_millis_f64(elapsed))
                }
                Err(_) => None,
            };
            samples.push(sample);

            tokio::time::sleep(self.interval).await;
        }

        samples
    }

    pub async fn sample(&self) -> Result<LatencyStats> {
        let samples = self.collect().await;
        LatencyStats::from_samples(&samples).ok_or(ProbeError::NoSamples)
    }

    pub async fn run(&self) -> TestResult {
        self.sink
            .info(&format!("Testing latency to {}...", self.host));
        let test_name = format!("Latency to {}", self.host);
        let start = Instant::now();

        match self.sample().await {
            Ok(stats) => {
                let details = format!(
                    "Latency to {}: Avg={:.2}ms, Min={:.2}ms, Max={:.2}ms",
                    self.host, stats.mean, stats.min, stats.max
                );
                self.sink.info(&details);
                TestResult::new(test_name).success(start.elapsed(), details)
            }
            Err(error) => {
                let details = format!("All latency tests to {} failed", self.host);
                self.sink.warn(&details);
                TestResult::new(test_name).failure(start.elapsed(), details, error)
            }
        }
    }
}
