//! ACE framing: `xn--` labels and dot-separated domains

use super::bootstring::{decode_label, encode_label};
use crate::error::{EmojiDomainError, Result};

pub const ACE_PREFIX: &str = "xn--";
pub const MAX_LABEL_OCTETS: usize = 63;
pub const MAX_DOMAIN_OCTETS: usize = 253;

/// True if the label carries the ACE prefix (any case)
pub fn has_ace_prefix(label: &str) -> bool {
    label
        .get(..ACE_PREFIX.len())
        .map_or(false, |p| p.eq_ignore_ascii_case(ACE_PREFIX))
}

/// Convert a Unicode domain into its ASCII-compatible form.
///
/// Labels without non-ASCII characters pass through untouched, including
/// labels that already start with `xn--`.
pub fn to_ascii(domain: &str) -> Result<String> {
    let labels = domain
        .split('.')
        .map(label_to_ascii)
        .collect::<Result<Vec<_>>>()?;

    let ascii = labels.join(".");
    if ascii.len() > MAX_DOMAIN_OCTETS {
        return Err(EmojiDomainError::length(
            format!("Domain '{}'", domain),
            ascii.len(),
            MAX_DOMAIN_OCTETS,
        ));
    }
    Ok(ascii)
}

fn label_to_ascii(label: &str) -> Result<String> {
    let ascii = if label.is_ascii() {
        label.to_string()
    } else if has_ace_prefix(label) {
        return Err(EmojiDomainError::ace(
            label,
            EmojiDomainError::invalid_input("already ACE-prefixed but contains non-ASCII characters", None),
        ));
    } else {
        let points: Vec<char> = label.chars().collect();
        let encoded = encode_label(&points).map_err(|e| EmojiDomainError::ace(label, e))?;
        format!("{}{}", ACE_PREFIX, encoded)
    };

    if ascii.len() > MAX_LABEL_OCTETS {
        return Err(EmojiDomainError::length(
            format!("Label '{}'", label),
            ascii.len(),
            MAX_LABEL_OCTETS,
        ));
    }
    Ok(ascii)
}

/// Convert an ACE domain back to Unicode. Never fails: a label that does
/// not decode is kept as it was.
pub fn to_unicode(domain: &str) -> String {
    domain
        .split('.')
        .map(|label| decode_ace_label(label).unwrap_or_else(|_| label.to_string()))
        .collect::<Vec<_>>()
        .join(".")
}

/// Decode one label, reporting why it could not be decoded.
///
/// Labels without the ACE prefix are returned unchanged.
pub fn decode_ace_label(label: &str) -> Result<String> {
    if !has_ace_prefix(label) {
        return Ok(label.to_string());
    }

    let decoded: String = decode_label(&label[ACE_PREFIX.len()..])
        .map_err(|e| EmojiDomainError::ace(label, e))?
        .into_iter()
        .collect();

    // An empty or still-prefixed result would decode differently on a second pass.
    if decoded.is_empty() || has_ace_prefix(&decoded) {
        return Err(EmojiDomainError::ace(
            label,
            EmojiDomainError::invalid_input("decodes to an empty or ACE-prefixed label", None),
        ));
    }
    Ok(decoded)
}

/// Clean up user input: trim, drop an http(s) scheme and anything after the host
pub fn normalize_input(input: &str) -> String {
    let trimmed = input.trim();
    let without_scheme = ["https://", "http://"]
        .iter()
        .find_map(|scheme| {
            trimmed
                .get(..scheme.len())
                .filter(|p| p.eq_ignore_ascii_case(scheme))
                .map(|_| &trimmed[scheme.len()..])
        })
        .unwrap_or(trimmed);

    without_scheme
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default()
        .to_string()
}
