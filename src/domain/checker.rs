//! Domain availability checker

use crate::domain::probe::{DnsProbe, RegistryProbe};
use crate::domain::{AvailabilityProbe, NameResolver, RegistryTextSource, SystemResolver};
use crate::error::{EmojiDomainError, Result};
use crate::idna::to_ascii;
use crate::types::{Availability, AvailabilityResult, BatchResult, CheckConfig, CheckMethod, Evidence};
use chrono::Utc;
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;

/// Domain availability checker: DNS first, registry text as fallback
#[derive(Clone)]
pub struct DomainChecker {
    config: CheckConfig,
    semaphore: Arc<Semaphore>,
    probes: Arc<Vec<Box<dyn AvailabilityProbe>>>,
}

impl DomainChecker {
    /// Create a new domain checker with default configuration
    pub fn new() -> Self {
        Self::with_config(CheckConfig::default())
    }

    /// Create a checker that uses the system resolver and WHOIS over TCP
    pub fn with_config(config: CheckConfig) -> Self {
        #[cfg(feature = "whois")]
        let registry: Option<Arc<dyn RegistryTextSource>> = Some(Arc::new(
            crate::domain::WhoisClient::new(config.whois_server.clone(), config.probe_timeout),
        ));
        #[cfg(not(feature = "whois"))]
        let registry: Option<Arc<dyn RegistryTextSource>> = None;

        Self::build(config, Some(Arc::new(SystemResolver)), registry)
    }

    /// Create a checker on top of custom collaborators
    pub fn with_collaborators(
        config: CheckConfig,
        resolver: Arc<dyn NameResolver>,
        registry: Arc<dyn RegistryTextSource>,
    ) -> Self {
        Self::build(config, Some(resolver), Some(registry))
    }

    fn build(
        config: CheckConfig,
        resolver: Option<Arc<dyn NameResolver>>,
        registry: Option<Arc<dyn RegistryTextSource>>,
    ) -> Self {
        let mut probes: Vec<Box<dyn AvailabilityProbe>> = Vec::new();

        // Order matters: the DNS probe can short-circuit the registry lookup.
        if config.enable_dns {
            if let Some(resolver) = resolver {
                probes.push(Box::new(DnsProbe::new(resolver, config.probe_timeout)));
            }
        }
        if config.enable_whois {
            if let Some(registry) = registry {
                probes.push(Box::new(RegistryProbe::new(registry, config.probe_timeout)));
            }
        }

        Self {
            semaphore: Arc::new(Semaphore::new(config.concurrent_checks.max(1))),
            probes: Arc::new(probes),
            config,
        }
    }

    /// Check a single domain. Never fails: problems end up in the result.
    pub async fn resolve(&self, domain: &str) -> AvailabilityResult {
        match canonical_form(domain) {
            Ok(ascii_domain) => self.run_probes(domain, ascii_domain).await,
            Err(e) => unconvertible(domain, e),
        }
    }

    /// Run the probes in order against an ACE domain, stopping at the first
    /// conclusive report.
    async fn run_probes(&self, domain: &str, ascii_domain: String) -> AvailabilityResult {
        let start_time = Instant::now();

        let mut evidence = Evidence::default();
        let mut availability = Availability::Unknown;
        let mut method = CheckMethod::Failed;

        for probe in self.probes.iter() {
            let report = probe.probe(&ascii_domain).await;
            evidence.merge(report.evidence);
            availability = report.availability;
            method = report.method;

            if availability != Availability::Unknown {
                break;
            }
        }

        if self.probes.is_empty() {
            evidence.error = Some("No checking methods enabled".to_string());
        }

        let duration = start_time.elapsed();
        tracing::debug!(
            domain = %domain,
            ascii_domain = %ascii_domain,
            method = %method,
            status = %availability,
            duration_ms = %duration.as_millis(),
            "Domain check completed"
        );

        AvailabilityResult {
            domain: domain.to_string(),
            ascii_domain,
            availability,
            method,
            evidence,
            checked_at: Utc::now(),
            check_duration: Some(duration),
            attempts: 1,
        }
    }

    /// Check 1..=`max_batch_size` domains concurrently.
    ///
    /// Every domain runs in its own task; a task that fails or panics only
    /// marks its own domain as `failed`.
    pub async fn resolve_many(&self, domains: &[String]) -> Result<BatchResult> {
        if domains.is_empty() || domains.len() > self.config.max_batch_size {
            return Err(EmojiDomainError::size(domains.len(), self.config.max_batch_size));
        }

        let batch_start = Instant::now();
        let mut seen = HashSet::new();
        let unique: Vec<String> = domains
            .iter()
            .filter(|d| seen.insert(d.as_str()))
            .cloned()
            .collect();

        let handles: Vec<_> = unique
            .iter()
            .map(|domain| {
                let checker = self.clone();
                let domain = domain.clone();
                tokio::spawn(async move { checker.resolve_with_retry(&domain).await })
            })
            .collect();

        let joined = join_all(handles).await;

        let results: Vec<AvailabilityResult> = unique
            .iter()
            .zip(joined)
            .map(|(domain, joined)| match joined {
                Ok(result) => result,
                Err(e) => {
                    tracing::warn!(domain = %domain, error = %e, "Domain check task failed");
                    AvailabilityResult::failed(domain.as_str(), domain.as_str(), format!("check task failed: {}", e))
                }
            })
            .collect();

        let batch = BatchResult::new(results);
        let batch_duration = batch_start.elapsed();
        tracing::info!(
            domains_requested = %domains.len(),
            domains_processed = %batch.counts.total,
            available = %batch.counts.available,
            taken = %batch.counts.taken,
            unknown = %batch.counts.unknown,
            batch_duration_ms = %batch_duration.as_millis(),
            "Batch domain check completed"
        );

        Ok(batch)
    }

    async fn resolve_with_retry(&self, domain: &str) -> AvailabilityResult {
        let _permit = match self.semaphore.acquire().await {
            Ok(permit) => permit,
            Err(e) => {
                return AvailabilityResult::failed(domain, domain, format!("Failed to acquire semaphore: {}", e))
            }
        };

        // Convert once; only the probe phase is retried.
        let ascii_domain = match canonical_form(domain) {
            Ok(ascii) => ascii,
            Err(e) => return unconvertible(domain, e),
        };

        let mut result = self.run_probes(domain, ascii_domain.clone()).await;
        let mut attempts = 1;
        while result.method == CheckMethod::Failed && attempts <= self.config.retry_attempts {
            attempts += 1;
            tracing::debug!(domain = %domain, attempt = attempts, "Retrying failed domain check");
            result = self.run_probes(domain, ascii_domain.clone()).await;
        }
        result.attempts = attempts as u32;
        result
    }

    /// Methods in the order they are tried
    pub fn methods(&self) -> Vec<CheckMethod> {
        self.probes.iter().map(|p| p.method_name()).collect()
    }
}

impl Default for DomainChecker {
    fn default() -> Self {
        Self::new()
    }
}

/// ACE form the probes run against; ASCII input is used as given
fn canonical_form(domain: &str) -> Result<String> {
    if domain.is_ascii() {
        Ok(domain.to_string())
    } else {
        to_ascii(domain)
    }
}

fn unconvertible(domain: &str, error: EmojiDomainError) -> AvailabilityResult {
    tracing::warn!(domain = %domain, error = %error, "Cannot convert domain to ASCII");
    AvailabilityResult::failed(domain, domain, error.to_string())
}
