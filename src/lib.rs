//! Emoji Domain - convert emoji domains to punycode and check their availability
//!
//! Bootstring (RFC 3492) transcoding with `xn--` framing, plus a tiered
//! DNS / WHOIS availability checker with bounded-concurrency batches.

pub mod domain;
pub mod error;
pub mod idna;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{EmojiDomainError, Result};
pub use types::{
    Availability, AvailabilityResult, BatchCounts, BatchResult, CheckConfig, CheckMethod, Evidence,
};

// Re-export main functionality
pub use domain::DomainChecker;
pub use idna::{decode_label, encode_label, to_ascii, to_unicode};

/// Initialize the library
pub fn init() -> Result<()> {
    // Load .env file if it exists
    dotenv::dotenv().ok();
    Ok(())
}
