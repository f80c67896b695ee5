//! ICMP reachability probe.
//!
//! Raw ICMP sockets need privileges the tool should not ask for, so the
//! probe shells out to the system `ping` and reads its statistics block:
//!
//! ```text
//! 5 packets transmitted, 5 received, 0% packet loss, time 4005ms
//! ```
//!
//! # Examples
//! ```rust
//! use netstab::network::parse_ping_output;
//!
//! let output = "PING dc1 (10.0.0.5) 56(84) bytes of data.\n\
//!               5 packets transmitted, 5 received, 0% packet loss, time 4005ms\n";
//! let line = parse_ping_output(output).unwrap();
//! assert!(line.contains("0% packet loss"));
//! ```

use crate::utils::{measure_time, EventSink, ProbeError, Result, TestResult};
use std::sync::Arc;
use tokio::process::Command;

pub const PING_COUNT: u32 = 5;
/// Seconds `ping` waits for each reply.
pub const PING_WAIT_SECS: u32 = 2;

pub struct PingProbe {
    pub host: String,
    pub count: u32,
    pub program: String,
    sink: Arc<dyn EventSink>,
}

impl PingProbe {
    pub fn new(host: String, sink: Arc<dyn EventSink>) -> Self {
        Self {
            host,
            count: PING_COUNT,
            program: "ping".to_string(),
            sink,
        }
    }

    pub fn with_count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    /// Overrides the ping executable. Mostly useful where `ping` lives
    /// outside `PATH`.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn args(&self) -> Vec<String> {
        vec![
            "-c".to_string(),
            self.count.to_string(),
            "-W".to_string(),
            PING_WAIT_SECS.to_string(),
            self.host.clone(),
        ]
    }

    /// Runs `ping` and returns its statistics line when no packet was lost.
    pub async fn ping(&self) -> Result<String> {
        let args = self.args();
        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .await
            .map_err(|e| {
                self.sink.error(&format!(
                    "Could not run command: {} {}: {}",
                    self.program,
                    args.join(" "),
                    e
                ));
                ProbeError::ProcessInvocation(e.to_string())
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let text = if stderr.trim().is_empty() {
                stdout
                    .lines()
                    .find(|line| line.contains("packets transmitted"))
                    .map(str::trim)
                    .unwrap_or("no output")
                    .to_string()
            } else {
                stderr.trim().to_string()
            };
            self.sink.warn(&format!(
                "Command failed ({}): {} {}",
                output.status,
                self.program,
                args.join(" ")
            ));
            return Err(ProbeError::ProcessInvocation(text));
        }

        parse_ping_output(&stdout)
    }

    pub async fn run(&self) -> TestResult {
        self.sink.info(&format!("Pinging {}...", self.host));
        let test_name = format!("Ping {}", self.host);

        let (duration, result) = measure_time(|| self.ping()).await;

        match result {
            Ok(line) => {
                let details = format!("Ping results for {}: {}", self.host, line);
                self.sink.info(&details);
                TestResult::new(test_name).success(duration, details)
            }
            Err(error @ ProbeError::PacketLoss(_)) => {
                let details = format!("Ping results for {}: {}", self.host, error);
                self.sink.warn(&details);
                TestResult::new(test_name).failure(duration, details, error)
            }
            Err(error @ ProbeError::UnexpectedOutput(_)) => {
                let details = format!("Unexpected ping output for {}", self.host);
                self.sink.warn(&details);
                TestResult::new(test_name).failure(duration, details, error)
            }
            Err(error) => {
                let details = format!("Ping to {} failed: {}", self.host, error);
                self.sink.warn(&details);
                TestResult::new(test_name).failure(duration, details, error)
            }
        }
    }
}

/// Finds the statistics line in `ping` output and checks it for loss.
///
/// Returns the trimmed line when loss is exactly zero, `PacketLoss` with the
/// line for any other figure, and `UnexpectedOutput` when there is no
/// statistics line at all.
pub fn parse_ping_output(output: &str) -> Result<String> {
    let line = output
        .lines()
        .map(str::trim)
        .find(|line| line.contains("packets transmitted"))
        .ok_or_else(|| ProbeError::UnexpectedOutput("no packet statistics".to_string()))?;

    match loss_percent(line) {
        Some(loss) if loss == 0.0 => Ok(line.to_string()),
        _ => Err(ProbeError::PacketLoss(line.to_string())),
    }
}

/// Extracts the number in front of `% packet loss`. Accepts both the Linux
/// (`0%`) and BSD (`0.0%`) spellings.
pub fn loss_percent(line: &str) -> Option<f64> {
    let (head, _) = line.split_once("% packet loss")?;
    head.rsplit(|c: char| c.is_whitespace() || c == ',')
        .next()?
        .parse::<f64>()
        .ok()
}
