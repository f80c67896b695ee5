use super::connect;
use crate::utils::{measure_time, EventSink, Result, TestResult};
use std::sync::Arc;
use std::time::Duration;

pub const PORT_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Single connection attempt against one `host:port`.
pub struct PortProbe {
    pub host: String,
    pub port: u16,
    pub timeout: Duration,
    sink: Arc<dyn EventSink>,
}

impl PortProbe {
    pub fn new(host: String, port: u16, sink: Arc<dyn EventSink>) -> Self {
        Self {
            host,
            port,
            timeout: PORT_CHECK_TIMEOUT,
            sink,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn check(&self) -> Result<()> {
        let _stream = connect(&self.host, self.port, self.timeout).await?;
        Ok(())
    }

    pub async fn run(&self) -> TestResult {
        self.sink
            .info(&format!("Checking port {} on {}...", self.port, self.host));

        let (duration, result) = measure_time(|| self.check()).await;
        self.report(duration, result)
    }

    /// Turns the outcome of [`check`](Self::check) into the printed line.
    /// Timeouts and refusals read the same: the port is closed.
    pub fn report(&self, duration: Duration, result: Result<()>) -> TestResult {
        let test_name = format!("Port {} on {}", self.port, self.host);

        match result {
            Ok(()) => {
                let details = format!("Port {} is open on {}", self.port, self.host);
                self.sink.info(&details);
                TestResult::new(test_name).success(duration, details)
            }
            Err(error) if error.is_closed() => {
                let details = format!("Port {} is closed on {}", self.port, self.host);
                self.sink.warn(&details);
                TestResult::new(test_name).failure(duration, details, error)
            }
            Err(error) => {
                let details = format!(
                    "Error checking port {} on {}: {}",
                    self.port, self.host, error
                );
                self.sink.error(&details);
                TestResult::new(test_name).failure(duration, details, error)
            }
        }
    }
}
