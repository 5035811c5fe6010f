//! Core types and structures for emoji-domain

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::time::Duration;

use crate::error::{EmojiDomainError, Result};

/// Default per-probe timeout in seconds
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 5;

/// Maximum number of domains accepted by a single batch
pub const MAX_BATCH_SIZE: usize = 50;

/// Tri-state domain availability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    Available,
    Taken,
    Unknown,
}

impl Availability {
    /// `Some(true)` when available, `Some(false)` when taken, `None` when unknown
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Availability::Available => Some(true),
            Availability::Taken => Some(false),
            Availability::Unknown => None,
        }
    }
}

impl std::fmt::Display for Availability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Availability::Available => write!(f, "available"),
            Availability::Taken => write!(f, "taken"),
            Availability::Unknown => write!(f, "unknown"),
        }
    }
}

/// Which probe produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckMethod {
    Dns,
    /// Registry text classification
    Whois,
    Failed,
}

impl std::fmt::Display for CheckMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckMethod::Dns => write!(f, "dns"),
            CheckMethod::Whois => write!(f, "whois"),
            CheckMethod::Failed => write!(f, "failed"),
        }
    }
}

/// Diagnostic payload collected by the probes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dns_records: Vec<IpAddr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whois_summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registrar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Evidence {
    /// Fold in another probe's evidence, keeping fields already set
    pub fn merge(&mut self, other: Evidence) {
        if self.dns_records.is_empty() {
            self.dns_records = other.dns_records;
        }
        self.dns_error = self.dns_error.take().or(other.dns_error);
        self.whois_summary = self.whois_summary.take().or(other.whois_summary);
        self.registrar = self.registrar.take().or(other.registrar);
        self.creation_date = self.creation_date.take().or(other.creation_date);
        self.error = self.error.take().or(other.error);
    }
}

/// Availability check result for one domain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityResult {
    /// Domain as requested
    pub domain: String,
    /// ACE form the probes ran against
    pub ascii_domain: String,
    pub availability: Availability,
    pub method: CheckMethod,
    pub evidence: Evidence,
    pub checked_at: DateTime<Utc>,
    pub check_duration: Option<Duration>,
    /// Probe rounds run, including retries
    #[serde(default)]
    pub attempts: u32,
}

impl AvailabilityResult {
    /// Result for a domain whose resolution could not complete
    pub fn failed(domain: impl Into<String>, ascii_domain: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            ascii_domain: ascii_domain.into(),
            availability: Availability::Unknown,
            method: CheckMethod::Failed,
            evidence: Evidence {
                error: Some(error.into()),
                ..Default::default()
            },
            checked_at: Utc::now(),
            check_duration: None,
            attempts: 1,
        }
    }

    pub fn available(&self) -> Option<bool> {
        self.availability.as_bool()
    }

    pub fn registrar(&self) -> Option<&str> {
        self.evidence.registrar.as_deref()
    }

    pub fn creation_date(&self) -> Option<&str> {
        self.evidence.creation_date.as_deref()
    }
}

/// Summary counts of a batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchCounts {
    pub total: usize,
    pub available: usize,
    pub taken: usize,
    pub unknown: usize,
}

impl BatchCounts {
    /// Count the given results
    pub fn from_results<'a>(results: impl IntoIterator<Item = &'a AvailabilityResult>) -> Self {
        results.into_iter().fold(Self::default(), |mut counts, result| {
            counts.total += 1;
            match result.availability {
                Availability::Available => counts.available += 1,
                Availability::Taken => counts.taken += 1,
                Availability::Unknown => counts.unknown += 1,
            }
            counts
        })
    }
}

/// Results of a batch check, in request order and keyed by domain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult {
    pub per_domain: Vec<AvailabilityResult>,
    pub counts: BatchCounts,
}

impl BatchResult {
    pub fn new(per_domain: Vec<AvailabilityResult>) -> Self {
        let counts = BatchCounts::from_results(&per_domain);
        Self { per_domain, counts }
    }

    /// Look up the result for a requested domain
    pub fn get(&self, domain: &str) -> Option<&AvailabilityResult> {
        self.per_domain.iter().find(|r| r.domain == domain)
    }

    pub fn len(&self) -> usize {
        self.per_domain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.per_domain.is_empty()
    }
}

/// Configuration for domain checking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckConfig {
    pub concurrent_checks: usize,
    pub probe_timeout: Duration,
    /// Extra attempts for domains whose result is `failed`
    pub retry_attempts: usize,
    pub enable_dns: bool,
    pub enable_whois: bool,
    pub max_batch_size: usize,
    /// Query this WHOIS server instead of the per-TLD default
    pub whois_server: Option<String>,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            concurrent_checks: 10,
            probe_timeout: Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS),
            retry_attempts: 0,
            enable_dns: true,
            enable_whois: true,
            max_batch_size: MAX_BATCH_SIZE,
            whois_server: None,
        }
    }
}

impl CheckConfig {
    /// Build a configuration from `EMOJI_DOMAIN_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup("EMOJI_DOMAIN_CONCURRENCY") {
            config.concurrent_checks = parse_number("EMOJI_DOMAIN_CONCURRENCY", &value)?;
            if config.concurrent_checks == 0 {
                return Err(EmojiDomainError::config("EMOJI_DOMAIN_CONCURRENCY must be at least 1"));
            }
        }
        if let Some(value) = lookup("EMOJI_DOMAIN_TIMEOUT_SECS") {
            let secs: u64 = parse_number("EMOJI_DOMAIN_TIMEOUT_SECS", &value)?;
            config.probe_timeout = Duration::from_secs(secs.max(1));
        }
        if let Some(value) = lookup("EMOJI_DOMAIN_RETRIES") {
            config.retry_attempts = parse_number("EMOJI_DOMAIN_RETRIES", &value)?;
        }
        if let Some(value) = lookup("EMOJI_DOMAIN_WHOIS_SERVER") {
            let value = value.trim();
            if !value.is_empty() {
                config.whois_server = Some(value.to_string());
            }
        }

        Ok(config)
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| EmojiDomainError::config(format!("{} must be a number, got '{}'", key, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn result_with(domain: &str, availability: Availability) -> AvailabilityResult {
        AvailabilityResult {
            domain: domain.to_string(),
            ascii_domain: domain.to_string(),
            availability,
            method: CheckMethod::Whois,
            evidence: Evidence::default(),
            checked_at: Utc::now(),
            check_duration: None,
            attempts: 1,
        }
    }

    #[test]
    fn test_batch_counts_add_up() {
        let batch = BatchResult::new(vec![
            result_with("a.com", Availability::Available),
            result_with("b.com", Availability::Taken),
            result_with("c.com", Availability::Taken),
            AvailabilityResult::failed("d.com", "d.com", "boom"),
        ]);

        assert_eq!(batch.counts.total, batch.len());
        assert_eq!(batch.counts.available, 1);
        assert_eq!(batch.counts.taken, 2);
        assert_eq!(batch.counts.unknown, 1);
        assert_eq!(batch.get("d.com").map(|r| r.method), Some(CheckMethod::Failed));
    }

    #[test]
    fn test_method_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&CheckMethod::Whois).unwrap(), "\"whois\"");
        assert_eq!(serde_json::to_string(&Availability::Taken).unwrap(), "\"taken\"");
    }

    #[test]
    fn test_config_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("EMOJI_DOMAIN_CONCURRENCY", "4"),
            ("EMOJI_DOMAIN_TIMEOUT_SECS", "2"),
            ("EMOJI_DOMAIN_WHOIS_SERVER", "whois.example.net"),
        ]
        .into_iter()
        .collect();

        let config = CheckConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.concurrent_checks, 4);
        assert_eq!(config.probe_timeout, Duration::from_secs(2));
        assert_eq!(config.retry_attempts, 0);
        assert_eq!(config.whois_server.as_deref(), Some("whois.example.net"));
    }

    #[test]
    fn test_config_rejects_garbage() {
        let err = CheckConfig::from_lookup(|k| {
            (k == "EMOJI_DOMAIN_RETRIES").then(|| "lots".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, EmojiDomainError::Config { .. }));
    }
}
