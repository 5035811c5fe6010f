//! Punycode conversion between Unicode (emoji) domains and their ACE form
//!
//! `bootstring` holds the RFC 3492 transcoder, `label` the `xn--` framing
//! and `analysis` the reporting helpers built on top of both.

pub mod analysis;
pub mod bootstring;
pub mod label;

// Re-export main functionality
pub use analysis::{
    bulk_convert, contains_emoji, suggest_domains, validate_domain_format, BulkConversion,
    ConversionReport, Direction, DomainSuggestion,
};
pub use bootstring::{adapt_bias, decode_label, encode_label};
pub use label::{normalize_input, to_ascii, to_unicode};
