//! Orchestrates the four probe phases against the domain and its
//! controllers.
//!
//! DNS, ping and port checks run one after another. Latency sampling is slow
//! (ten paced attempts per host) so those probes run as tokio tasks, at most
//! [`LATENCY_WORKERS`] at a time, and are tallied in whatever order they
//! finish. Only the collecting loop touches the [`Summary`].

use crate::dns::DnsProbe;
use crate::network::{LatencySampler, PingProbe, PortProbe, DOMAIN_CONTROLLER_PORTS};
use crate::report::{Category, Reporter, Summary};
use crate::utils::{EventSink, ProbeError, TestResult};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

pub const LATENCY_WORKERS: usize = 5;

/// The probes a run is made of. [`SystemProber`] talks to the real network;
/// tests substitute scripted answers.
pub trait Prober: Send + Sync + 'static {
    fn resolve(&self, host: &str) -> impl Future<Output = TestResult> + Send;
    fn ping(&self, host: &str) -> impl Future<Output = TestResult> + Send;
    fn check_port(&self, host: &str, port: u16) -> impl Future<Output = TestResult> + Send;
    fn sample_latency(&self, host: &str) -> impl Future<Output = TestResult> + Send;
}

pub struct SystemProber {
    sink: Arc<dyn EventSink>,
}

impl SystemProber {
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self { sink }
    }
}

impl Prober for SystemProber {
    async fn resolve(&self, host: &str) -> TestResult {
        DnsProbe::new(host.to_string(), self.sink.clone()).run().await
    }

    async fn ping(&self, host: &str) -> TestResult {
        PingProbe::new(host.to_string(), self.sink.clone()).run().await
    }

    async fn check_port(&self, host: &str, port: u16) -> TestResult {
        PortProbe::new(host.to_string(), port, self.sink.clone())
            .run()
            .await
    }

    async fn sample_latency(&self, host: &str) -> TestResult {
        LatencySampler::new(host.to_string(), self.sink.clone())
            .run()
            .await
    }
}

#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub ports: Vec<u16>,
    pub latency_workers: usize,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            ports: DOMAIN_CONTROLLER_PORTS.to_vec(),
            latency_workers: LATENCY_WORKERS,
        }
    }
}

pub struct Diagnostics<P: Prober> {
    prober: Arc<P>,
    config: RunnerConfig,
    sink: Arc<dyn EventSink>,
}

impl<P: Prober> Diagnostics<P> {
    pub fn new(prober: P, sink: Arc<dyn EventSink>) -> Self {
        Self {
            prober: Arc::new(prober),
            config: RunnerConfig::default(),
            sink,
        }
    }

    pub fn with_config(mut self, config: RunnerConfig) -> Self {
        self.config = config;
        self
    }

    /// Runs every phase to completion and returns the tallies. Probe
    /// failures are counted, never returned as errors.
    pub async fn run<R: Reporter>(
        &self,
        domain: &str,
        hosts: &[String],
        reporter: &mut R,
    ) -> Summary {
        let mut summary = Summary::new();
        let targets: Vec<String> = std::iter::once(domain.to_string())
            .chain(hosts.iter().cloned())
            .collect();

        reporter.phase_started(Category::DnsResolution, targets.len());
        for target in &targets {
            let result = self.prober.resolve(target).await;
            tally(&mut summary, reporter, Category::DnsResolution, &result);
        }
        reporter.phase_finished(Category::DnsResolution);

        reporter.phase_started(Category::Ping, targets.len());
        for target in &targets {
            let result = self.prober.ping(target).await;
            tally(&mut summary, reporter, Category::Ping, &result);
        }
        reporter.phase_finished(Category::Ping);

        reporter.phase_started(Category::PortChecks, hosts.len() * self.config.ports.len());
        for host in hosts {
            for &port in &self.config.ports {
                let result = self.prober.check_port(host, port).await;
                tally(&mut summary, reporter, Category::PortChecks, &result);
            }
        }
        reporter.phase_finished(Category::PortChecks);

        reporter.phase_started(Category::Latency, targets.len());
        self.latency_phase(&targets, &mut summary, reporter).await;
        reporter.phase_finished(Category::Latency);

        summary
    }

    async fn latency_phase<R: Reporter>(
        &self,
        targets: &[String],
        summary: &mut Summary,
        reporter: &mut R,
    ) {
        let permits = Arc::new(Semaphore::new(self.config.latency_workers.max(1)));
        let mut tasks = JoinSet::new();
        let mut hosts_by_task = HashMap::new();

        for target in targets {
            let prober = Arc::clone(&self.prober);
            let permits = Arc::clone(&permits);
            let host = target.clone();

            let handle = tasks.spawn(async move {
                let _permit = match permits.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(e) => {
                        return TestResult::new(format!("Latency to {}", host)).failure(
                            Duration::ZERO,
                            format!("{} generated an exception: {}", host, e),
                            ProbeError::Unknown(e.to_string()),
                        )
                    }
                };
                prober.sample_latency(&host).await
            });
            hosts_by_task.insert(handle.id(), target.clone());
        }

        while let Some(joined) = tasks.join_next_with_id().await {
            let result = match joined {
                Ok((_, result)) => result,
                Err(e) => {
                    let host = hosts_by_task
                        .get(&e.id())
                        .map(String::as_str)
                        .unwrap_or("unknown host");
                    let details = format!("{} generated an exception: {}", host, e);
                    self.sink.error(&details);
                    TestResult::new(format!("Latency to {}", host)).failure(
                        Duration::ZERO,
                        details,
                        ProbeError::Unknown(e.to_string()),
                    )
                }
            };
            tally(summary, reporter, Category::Latency, &result);
        }
    }
}

fn tally<R: Reporter>(
    summary: &mut Summary,
    reporter: &mut R,
    category: Category,
    result: &TestResult,
) {
    summary.record(category, result.success);
    reporter.result(category, result);
}
