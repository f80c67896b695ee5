//! Summary table and console narration.

use crate::utils::{format_duration, TestResult};
use colored::*;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::fmt;
use std::io::{self, IsTerminal, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    DnsResolution,
    Ping,
    PortChecks,
    Latency,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::DnsResolution,
        Category::Ping,
        Category::PortChecks,
        Category::Latency,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Category::DnsResolution => "dns_resolution",
            Category::Ping => "ping",
            Category::PortChecks => "port_checks",
            Category::Latency => "latency",
        }
    }

    /// `dns_resolution` -> `Dns Resolution`.
    pub fn title(&self) -> String {
        self.key()
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn heading(&self) -> &'static str {
        match self {
            Category::DnsResolution => "DNS Resolution Tests:",
            Category::Ping => "Ping Tests:",
            Category::PortChecks => "Port Checks:",
            Category::Latency => "Latency Tests:",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Tally {
    pub success: u32,
    pub failure: u32,
}

impl Tally {
    pub fn record(&mut self, success: bool) {
        if success {
            self.success += 1;
        } else {
            self.failure += 1;
        }
    }

    pub fn total(&self) -> u32 {
        self.success + self.failure
    }

    /// Percentage of successful probes, `None` if the category never ran.
    pub fn success_rate(&self) -> Option<f64> {
        match self.total() {
            0 => None,
            total => Some(self.success as f64 / total as f64 * 100.0),
        }
    }

    pub fn format_rate(&self) -> String {
        self.success_rate()
            .map(|rate| format!("{:.2}%", rate))
            .unwrap_or_else(|| "N/A".to_string())
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Summary {
    tallies: [Tally; 4],
}

impl Summary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, category: Category, success: bool) {
        self.tallies[category as usize].record(success);
    }

    pub fn tally(&self, category: Category) -> Tally {
        self.tallies[category as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, Tally)> + '_ {
        Category::ALL.iter().map(|c| (*c, self.tally(*c)))
    }
}

pub fn render_summary(summary: &Summary) -> String {
    let mut output = String::new();
    output.push_str("Test Summary:\n");
    output.push_str(&"=".repeat(50));
    output.push('\n');

    for (category, tally) in summary.iter() {
        output.push_str(&format!("{}:\n", category.title()));
        output.push_str(&format!("  Successful: {}\n", tally.success));
        output.push_str(&format!("  Failed: {}\n", tally.failure));
        output.push_str(&format!("  Success Rate: {}\n", tally.format_rate()));
        output.push('\n');
    }

    output
}

/// Receives every probe result as the driver tallies it.
pub trait Reporter {
    fn phase_started(&mut self, category: Category, probes: usize);
    fn result(&mut self, category: Category, result: &TestResult);
    fn phase_finished(&mut self, category: Category);
}

/// Prints to stdout. The latency phase shows a progress bar on stderr
/// because its probes take several seconds each and finish out of order.
///
/// Every line goes out under [`MultiProgress::suspend`], as does the log
/// writer from [`ProgressLogWriter`], so the bar is cleared before anything
/// else reaches the terminal. When stderr is not a terminal the bar is
/// hidden and lines are written straight through.
pub struct ConsoleReporter<W: Write = io::Stdout> {
    out: W,
    multi: MultiProgress,
    progress: Option<ProgressBar>,
}

impl ConsoleReporter {
    pub fn new(multi: MultiProgress) -> Self {
        Self::with_writer(multi, io::stdout())
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn with_writer(multi: MultiProgress, out: W) -> Self {
        Self {
            out,
            multi,
            progress: None,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(result: &TestResult) -> String {
        let duration = format!("({})", format_duration(result.duration)).cyan();
        if result.success {
            format!("{} {} {}", "✓".green().bold(), result.details, duration)
        } else {
            format!(
                "{} {} {}",
                "✗".red().bold(),
                result.details.red(),
                duration
            )
        }
    }

    fn emit(&mut self, line: &str) {
        let out = &mut self.out;
        self.multi.suspend(|| {
            // A closed stdout leaves nothing to report to.
            let _ = writeln!(out, "{}", line);
            let _ = out.flush();
        });
    }
}

impl<W: Write> Reporter for ConsoleReporter<W> {
    fn phase_started(&mut self, category: Category, probes: usize) {
        self.emit(&format!("\n{}", category.heading().bold().blue()));

        if category == Category::Latency && probes > 0 {
            let pb = self.multi.add(ProgressBar::new(probes as u64));
            if let Ok(style) = ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg}")
            {
                pb.set_style(style.progress_chars("█▉▊▋▌▍▎▏  "));
            }
            pb.set_message("sampling latency...");
            self.progress = Some(pb);
        }
    }

    fn result(&mut self, _category: Category, result: &TestResult) {
        self.emit(&Self::line(result));
        if let Some(pb) = &self.progress {
            pb.inc(1);
        }
    }

    fn phase_finished(&mut self, _category: Category) {
        if let Some(pb) = self.progress.take() {
            pb.finish_and_clear();
            self.multi.remove(&pb);
        }
    }
}

/// Log destination that clears the progress bar around each record.
/// Handed to `env_logger` as a pipe target.
pub struct ProgressLogWriter {
    multi: MultiProgress,
}

impl ProgressLogWriter {
    pub fn new(multi: MultiProgress) -> Self {
        Self { multi }
    }
}

impl Write for ProgressLogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.multi.suspend(|| io::stderr().write_all(buf))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()
    }
}

/// Progress handle for the console. Draws to stderr only when it is a
/// terminal.
pub fn console_progress() -> MultiProgress {
    if io::stderr().is_terminal() {
        MultiProgress::new()
    } else {
        MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_order_and_keys() {
        let keys: Vec<&str> = Category::ALL.iter().map(|c| c.key()).collect();
        assert_eq!(keys, vec!["dns_resolution", "ping", "port_checks", "latency"]);
    }

    #[test]
    fn test_category_title() {
        assert_eq!(Category::DnsResolution.title(), "Dns Resolution");
        assert_eq!(Category::PortChecks.title(), "Port Checks");
        assert_eq!(Category::Ping.title(), "Ping");
    }

    #[test]
    fn test_rate_undefined_without_attempts() {
        let tally = Tally::default();
        assert_eq!(tally.success_rate(), None);
        assert_eq!(tally.format_rate(), "N/A");
    }

    #[test]
    fn test_rate_two_decimals() {
        let mut tally = Tally::default();
        tally.record(true);
        tally.record(false);
        tally.record(false);

        assert_eq!(tally.total(), 3);
        assert_eq!(tally.format_rate(), "33.33%");

        let mut half = Tally::default();
        half.record(true);
        half.record(false);
        assert_eq!(half.success_rate(), Some(50.0));
        assert_eq!(half.format_rate(), "50.00%");
    }

    #[test]
    fn test_summary_record() {
        let mut summary = Summary::new();
        summary.record(Category::Ping, true);
        summary.record(Category::Ping, false);
        summary.record(Category::Latency, true);

        assert_eq!(
            summary.tally(Category::Ping),
            Tally {
                success: 1,
                failure: 1
            }
        );
        assert_eq!(summary.tally(Category::PortChecks).total(), 0);
        assert_eq!(summary.tally(Category::Latency).success, 1);
    }

    #[test]
    fn test_render_summary() {
        let mut summary = Summary::new();
        summary.record(Category::DnsResolution, true);
        summary.record(Category::DnsResolution, false);

        let output = render_summary(&summary);
        assert!(output.contains("Dns Resolution:\n  Successful: 1\n  Failed: 1\n  Success Rate: 50.00%"));
        assert!(output.contains("Port Checks:\n  Successful: 0\n  Failed: 0\n  Success Rate: N/A"));

        let dns = output.find("Dns Resolution").unwrap();
        let ping = output.find("Ping:").unwrap();
        let ports = output.find("Port Checks").unwrap();
        let latency = output.find("Latency:").unwrap();
        assert!(dns < ping && ping < ports && ports < latency);
    }

    fn hidden_reporter() -> ConsoleReporter<Vec<u8>> {
        ConsoleReporter::with_writer(
            MultiProgress::with_draw_target(ProgressDrawTarget::hidden()),
            Vec::new(),
        )
    }

    fn failed(details: &str) -> TestResult {
        TestResult::new("latency".to_string()).failure(
            std::time::Duration::from_millis(1500),
            details.to_string(),
            crate::utils::ProbeError::NoSamples,
        )
    }

    #[test]
    fn test_latency_lines_written_without_terminal() {
        let mut reporter = hidden_reporter();
        reporter.phase_started(Category::Latency, 2);
        reporter.result(Category::Latency, &failed("All latency tests to 127.0.0.1 failed"));
        reporter.result(
            Category::Latency,
            &TestResult::new("latency".to_string()).success(
                std::time::Duration::from_millis(40),
                "Latency to dc1: Avg=1.00ms, Min=0.50ms, Max=1.50ms".to_string(),
            ),
        );
        reporter.phase_finished(Category::Latency);

        let output = String::from_utf8(reporter.into_inner()).unwrap();
        assert!(output.contains("Latency Tests:"));
        assert!(output.contains("All latency tests to 127.0.0.1 failed"));
        assert!(output.contains("Latency to dc1: Avg=1.00ms, Min=0.50ms, Max=1.50ms"));
        assert!(output.find("Latency Tests:") < output.find("All latency tests"));
    }

    #[test]
    fn test_result_line_shows_duration() {
        let mut reporter = hidden_reporter();
        reporter.result(Category::Ping, &failed("Ping to dc1 failed: timeout"));

        let output = String::from_utf8(reporter.into_inner()).unwrap();
        assert!(output.contains("Ping to dc1 failed: timeout"));
        assert!(output.contains("1.50s"));
    }

    #[test]
    fn test_log_writer_passes_bytes_through() {
        let mut writer =
            ProgressLogWriter::new(MultiProgress::with_draw_target(ProgressDrawTarget::hidden()));
        assert_eq!(writer.write(b"[INFO] probing\n").unwrap(), 15);
        assert!(writer.flush().is_ok());
    }
}
