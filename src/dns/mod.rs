//! Resolver probe.
//!
//! Resolution goes through the platform resolver (`getaddrinfo` behind
//! `tokio::net::lookup_host`), so search domains, `/etc/hosts` and the
//! system timeout all apply exactly as they do for other programs on the
//! host.

use crate::utils::{measure_time, EventSink, ProbeError, Result, TestResult};
use std::net::IpAddr;
use std::sync::Arc;

pub struct DnsProbe {
    pub host: String,
    sink: Arc<dyn EventSink>,
}

impl DnsProbe {
    pub fn new(host: String, sink: Arc<dyn EventSink>) -> Self {
        Self { host, sink }
    }

    /// Resolves the host to its addresses, in resolver order and without
    /// duplicates. `getaddrinfo` hands back one entry per socket type, so the
    /// same address usually shows up more than once.
    pub async fn resolve(&self) -> Result<Vec<IpAddr>> {
        let addrs = tokio::net::lookup_host((self.host.as_str(), 0))
            .await
            .map_err(|e| ProbeError::Resolution(e.to_string()))?;

        let mut ips: Vec<IpAddr> = Vec::new();
        for addr in addrs {
            if !ips.contains(&addr.ip()) {
                ips.push(addr.ip());
            }
        }

        if ips.is_empty() {
            return Err(ProbeError::Resolution("no addresses returned".to_string()));
        }
        Ok(ips)
    }

    pub async fn run(&self) -> TestResult {
        self.sink.info(&format!("Resolving DNS for {}...", self.host));
        let test_name = format!("DNS resolution for {}", self.host);

        let (duration, result) = measure_time(|| self.resolve()).await;

        match result {
            Ok(ips) => {
                let details = format!(
                    "DNS resolution for {}: {}",
                    self.host,
                    format_addresses(&ips)
                );
                self.sink.info(&details);
                TestResult::new(test_name).success(duration, details)
            }
            Err(error) => {
                let details = format!("DNS resolution failed for {}: {}", self.host, error);
                self.sink.warn(&details);
                TestResult::new(test_name).failure(duration, details, error)
            }
        }
    }
}

pub fn format_addresses(ips: &[IpAddr]) -> String {
    ips.iter()
        .map(|ip| ip.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
