use std::time::{Duration, Instant};
use thiserror::Error;

pub mod sink;

pub use sink::*;

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("{0}")]
    Resolution(String),
    #[error("{0}")]
    ProcessInvocation(String),
    #[error("Unexpected ping output: {0}")]
    UnexpectedOutput(String),
    #[error("{0}")]
    PacketLoss(String),
    #[error("Connection timeout")]
    ConnectionTimeout,
    #[error("Connection refused")]
    ConnectionRefused,
    #[error("All attempts failed")]
    NoSamples,
    #[error("{0}")]
    Unknown(String),
}

impl ProbeError {
    /// Timeouts and refusals both mean "closed" for a port check.
    pub fn is_closed(&self) -> bool {
        matches!(
            self,
            ProbeError::ConnectionTimeout | ProbeError::ConnectionRefused
        )
    }
}

pub type Result<T> = std::result::Result<T, ProbeError>;

#[must_use]
#[derive(Debug)]
pub struct TestResult {
    pub test_name: String,
    pub success: bool,
    pub duration: Duration,
    pub details: String,
    pub error: Option<ProbeError>,
}

impl TestResult {
    pub const fn new(test_name: String) -> Self {
        Self {
            test_name,
            success: false,
            duration: Duration::ZERO,
            details: String::new(),
            error: None,
        }
    }

    pub fn success(mut self, duration: Duration, details: String) -> Self {
        self.success = true;
        self.duration = duration;
        self.details = details;
        self
    }

    /// Records a failure. `details` carries the human-readable line that is
    /// printed for the probe; the typed error stays available for callers.
    pub fn failure(mut self, duration: Duration, details: String, error: ProbeError) -> Self {
        self.success = false;
        self.duration = duration;
        self.details = details;
        self.error = Some(error);
        self
    }

    pub fn message(&self) -> &str {
        &self.details
    }
}

pub fn format_duration(duration: Duration) -> String {
    let ms = duration.as_millis();
    if ms < 1000 {
        format!("{ms}ms")
    } else {
        format!("{:.2}s", duration.as_secs_f32())
    }
}

pub fn as_millis_f64(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

pub async fn measure_time<F, Fut, T>(f: F) -> (Duration, T)
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = T>,
{
    let start = Instant::now();
    let result = f().await;
    let duration = start.elapsed();
    (duration, result)
}

mod tests;
