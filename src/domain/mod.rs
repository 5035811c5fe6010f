//! Domain availability checking module

pub mod checker;
pub mod probe;
pub mod whois;

// Re-export main functionality
pub use checker::DomainChecker;
pub use probe::{classify_registry_text, DnsProbe, ProbeReport, RegistryProbe};
pub use whois::SystemResolver;
#[cfg(feature = "whois")]
pub use whois::WhoisClient;

use crate::error::Result;
use crate::types::CheckMethod;
use async_trait::async_trait;
use std::net::IpAddr;

/// Name resolution used by the DNS probe
#[async_trait]
pub trait NameResolver: Send + Sync {
    /// Resolve the addresses of an ACE domain
    async fn lookup(&self, domain: &str) -> Result<Vec<IpAddr>>;
}

/// Source of raw registry (WHOIS) text
#[async_trait]
pub trait RegistryTextSource: Send + Sync {
    /// Fetch the registry text for an ACE domain
    async fn fetch(&self, domain: &str) -> Result<String>;
}

/// One availability strategy. Probes never fail; errors end up in the report.
#[async_trait]
pub trait AvailabilityProbe: Send + Sync {
    /// Check an ACE domain
    async fn probe(&self, domain: &str) -> ProbeReport;

    /// Get the method name
    fn method_name(&self) -> CheckMethod;
}
