//! DNS and registry-text probes

use async_trait::async_trait;
use regex::Regex;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use super::{AvailabilityProbe, NameResolver, RegistryTextSource};
use crate::error::{EmojiDomainError, Result};
use crate::types::{Availability, CheckMethod, Evidence};

/// Phrases registries use for unregistered domains
pub const AVAILABLE_INDICATORS: &[&str] = &[
    "no match",
    "not found",
    "no entries found",
    "domain available",
    "not registered",
    "no data found",
];

/// Phrases that only show up for registered domains
pub const REGISTERED_INDICATORS: &[&str] = &[
    "creation date",
    "registered",
    "registrar:",
    "name server",
    "status: active",
];

/// Outcome of a single probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReport {
    pub availability: Availability,
    pub method: CheckMethod,
    pub evidence: Evidence,
}

impl ProbeReport {
    fn failed(evidence: Evidence) -> Self {
        Self {
            availability: Availability::Unknown,
            method: CheckMethod::Failed,
            evidence,
        }
    }

    /// Whether the report settles the question without further probes
    pub fn is_conclusive(&self) -> bool {
        self.availability != Availability::Unknown
    }
}

/// Address lookup: any address means the domain is taken. A failed lookup
/// proves nothing and only records the error.
pub struct DnsProbe {
    resolver: Arc<dyn NameResolver>,
    timeout: Duration,
}

impl DnsProbe {
    pub fn new(resolver: Arc<dyn NameResolver>, timeout: Duration) -> Self {
        Self { resolver, timeout }
    }
}

#[async_trait]
impl AvailabilityProbe for DnsProbe {
    async fn probe(&self, domain: &str) -> ProbeReport {
        let lookup = timeout(self.timeout, self.resolver.lookup(domain))
            .await
            .unwrap_or_else(|_| Err(EmojiDomainError::timeout("DNS lookup", self.timeout)));

        match lookup {
            Ok(addresses) if !addresses.is_empty() => ProbeReport {
                availability: Availability::Taken,
                method: CheckMethod::Dns,
                evidence: Evidence {
                    dns_records: addresses,
                    ..Default::default()
                },
            },
            Ok(_) => ProbeReport::failed(Evidence {
                dns_error: Some("no address records".to_string()),
                ..Default::default()
            }),
            Err(e) => {
                tracing::debug!(domain = %domain, method = "dns", error = %e, "DNS lookup failed");
                ProbeReport::failed(Evidence {
                    dns_error: Some(e.to_string()),
                    ..Default::default()
                })
            }
        }
    }

    fn method_name(&self) -> CheckMethod {
        CheckMethod::Dns
    }
}

/// Registry text lookup classified by indicator phrases
pub struct RegistryProbe {
    source: Arc<dyn RegistryTextSource>,
    timeout: Duration,
}

impl RegistryProbe {
    pub fn new(source: Arc<dyn RegistryTextSource>, timeout: Duration) -> Self {
        Self { source, timeout }
    }
}

#[async_trait]
impl AvailabilityProbe for RegistryProbe {
    async fn probe(&self, domain: &str) -> ProbeReport {
        let fetched = timeout(self.timeout, self.source.fetch(domain))
            .await
            .unwrap_or_else(|_| Err(EmojiDomainError::timeout("WHOIS lookup", self.timeout)));

        let text = match fetched {
            Ok(text) => text,
            Err(e) => {
                tracing::debug!(domain = %domain, method = "whois", error = %e, "WHOIS lookup failed");
                return ProbeReport::failed(Evidence {
                    error: Some(format!("WHOIS lookup failed: {}", e)),
                    ..Default::default()
                });
            }
        };

        let availability = classify_registry_text(&text);
        let mut evidence = Evidence::default();

        match availability {
            Availability::Available => {
                evidence.whois_summary = Some("Domain appears available".to_string());
            }
            Availability::Taken => {
                evidence.whois_summary = Some("Domain is registered".to_string());
                match extract_registration(&text) {
                    Ok((registrar, creation_date)) => {
                        evidence.registrar = registrar;
                        evidence.creation_date = creation_date;
                    }
                    Err(e) => {
                        tracing::warn!(domain = %domain, error = %e, "Failed to extract registration details");
                    }
                }
            }
            Availability::Unknown => {
                evidence.whois_summary = Some("Unable to determine availability".to_string());
            }
        }

        ProbeReport {
            availability,
            method: CheckMethod::Whois,
            evidence,
        }
    }

    fn method_name(&self) -> CheckMethod {
        CheckMethod::Whois
    }
}

/// Classify raw registry text.
///
/// A registered indicator wins over an available one. Registered phrases
/// that are part of an available phrase ("not registered") do not count.
pub fn classify_registry_text(text: &str) -> Availability {
    let lower = text.to_lowercase();

    let has_available = AVAILABLE_INDICATORS.iter().any(|p| lower.contains(p));

    let stripped = AVAILABLE_INDICATORS
        .iter()
        .fold(lower, |acc, p| acc.replace(p, " "));
    let has_registered = REGISTERED_INDICATORS.iter().any(|p| stripped.contains(p));

    if has_registered {
        Availability::Taken
    } else if has_available {
        Availability::Available
    } else {
        Availability::Unknown
    }
}

/// Pull registrar and creation date out of registry text, first match wins
pub fn extract_registration(text: &str) -> Result<(Option<String>, Option<String>)> {
    let registrar = Regex::new(r"(?i)registrar:[ \t]*([^\r\n]+)")
        .map_err(|e| EmojiDomainError::internal(e.to_string()))?;
    let creation = Regex::new(r"(?i)creation date:[ \t]*([^\r\n]+)")
        .map_err(|e| EmojiDomainError::internal(e.to_string()))?;

    let first = |re: &Regex| {
        re.captures_iter(text)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str().trim())
            .find(|v| !v.is_empty())
            .map(str::to_string)
    };

    Ok((first(&registrar), first(&creation)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    struct StaticResolver(Result<Vec<IpAddr>>);

    #[async_trait]
    impl NameResolver for StaticResolver {
        async fn lookup(&self, _domain: &str) -> Result<Vec<IpAddr>> {
            self.0.clone()
        }
    }

    struct StaticRegistry(Result<String>);

    #[async_trait]
    impl RegistryTextSource for StaticRegistry {
        async fn fetch(&self, _domain: &str) -> Result<String> {
            self.0.clone()
        }
    }

    struct SlowRegistry;

    #[async_trait]
    impl RegistryTextSource for SlowRegistry {
        async fn fetch(&self, _domain: &str) -> Result<String> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok("No match".to_string())
        }
    }

    fn registry_probe(text: Result<String>) -> RegistryProbe {
        RegistryProbe::new(Arc::new(StaticRegistry(text)), Duration::from_secs(1))
    }

    #[test]
    fn test_classify() {
        assert_eq!(
            classify_registry_text("No match for domain \"EXAMPLE123.COM\""),
            Availability::Available
        );
        assert_eq!(classify_registry_text("Domain NOT REGISTERED"), Availability::Available);
        assert_eq!(
            classify_registry_text("No match for nameserver\nRegistrar: Foo"),
            Availability::Taken
        );
        assert_eq!(classify_registry_text("Status: ACTIVE"), Availability::Taken);
        assert_eq!(classify_registry_text("Rate limit exceeded"), Availability::Unknown);
    }

    #[test]
    fn test_extract_registration() {
        let text = "Domain Name: EXAMPLE.COM\nRegistrar: Example Registrar\nCreation Date: 1999-01-01";
        let (registrar, created) = extract_registration(text).unwrap();
        assert_eq!(registrar.as_deref(), Some("Example Registrar"));
        assert_eq!(created.as_deref(), Some("1999-01-01"));

        let (registrar, created) = extract_registration("Registrar:   \r\nstatus: active").unwrap();
        assert_eq!(registrar, None);
        assert_eq!(created, None);

        let text = "Registrar:   \nRegistrar WHOIS Server: whois.example.net\nRegistrar: Second Line Registrar";
        let (registrar, _) = extract_registration(text).unwrap();
        assert_eq!(registrar.as_deref(), Some("Second Line Registrar"));
    }

    #[tokio::test]
    async fn test_registry_probe_taken() {
        let probe = registry_probe(Ok(
            "Domain Name: EXAMPLE.COM\nRegistrar: Example Registrar\nCreation Date: 1999-01-01".to_string(),
        ));
        let report = probe.probe("example.com").await;
        assert_eq!(report.availability, Availability::Taken);
        assert_eq!(report.method, CheckMethod::Whois);
        assert_eq!(report.evidence.registrar.as_deref(), Some("Example Registrar"));
        assert_eq!(report.evidence.creation_date.as_deref(), Some("1999-01-01"));
    }

    #[tokio::test]
    async fn test_registry_probe_transport_failure() {
        let probe = registry_probe(Err(EmojiDomainError::network("connection refused", None)));
        let report = probe.probe("example.com").await;
        assert_eq!(report.availability, Availability::Unknown);
        assert_eq!(report.method, CheckMethod::Failed);
        assert!(report.evidence.error.unwrap().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_registry_probe_timeout() {
        let probe = RegistryProbe::new(Arc::new(SlowRegistry), Duration::from_millis(20));
        let report = probe.probe("slow.com").await;
        assert_eq!(report.method, CheckMethod::Failed);
        assert!(report.evidence.error.unwrap().contains("timed out after 20ms"));
    }

    #[test]
    fn test_registry_probe_inconclusive_text() {
        let probe = registry_probe(Ok("Rate limit exceeded, try again later".to_string()));
        let report = tokio_test::block_on(probe.probe("example.com"));
        assert!(!report.is_conclusive());
        assert_eq!(report.method, CheckMethod::Whois);
        assert_eq!(
            report.evidence.whois_summary.as_deref(),
            Some("Unable to determine availability")
        );
    }

    #[tokio::test]
    async fn test_dns_probe() {
        let addr = IpAddr::V4(Ipv4Addr::new(93, 184, 216, 34));
        let probe = DnsProbe::new(Arc::new(StaticResolver(Ok(vec![addr]))), Duration::from_secs(1));
        let report = probe.probe("example.com").await;
        assert!(report.is_conclusive());
        assert_eq!(report.method, CheckMethod::Dns);
        assert_eq!(report.evidence.dns_records, vec![addr]);

        let probe = DnsProbe::new(
            Arc::new(StaticResolver(Err(EmojiDomainError::network("NXDOMAIN", None)))),
            Duration::from_secs(1),
        );
        let report = probe.probe("xn--ls8h.la").await;
        assert!(!report.is_conclusive());
        assert!(report.evidence.dns_error.unwrap().contains("NXDOMAIN"));
    }
}
