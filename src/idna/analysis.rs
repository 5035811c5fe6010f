//! Conversion reports, bulk conversion and emoji domain suggestions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::label::{decode_ace_label, has_ace_prefix, to_ascii, to_unicode, MAX_LABEL_OCTETS};
use crate::error::{EmojiDomainError, Result};

/// Most inputs accepted by one bulk conversion
pub const MAX_BULK_INPUTS: usize = 50;

/// TLDs used for suggestions when none are given
pub const SUGGESTION_TLDS: &[&str] = &["com", "io", "ai", "ws", "la", "me", "co", "app"];

const MAX_SUGGESTIONS: usize = 20;

/// Emoji blocks recognised by [`contains_emoji`]
const EMOJI_RANGES: &[(u32, u32)] = &[
    (0x1F600, 0x1F64F),
    (0x1F300, 0x1F5FF),
    (0x1F680, 0x1F6FF),
    (0x1F1E0, 0x1F1FF),
    (0x2600, 0x26FF),
    (0x2700, 0x27BF),
];

/// Check whether the text contains a character from the common emoji blocks
pub fn contains_emoji(text: &str) -> bool {
    text.chars().any(|c| {
        let c = c as u32;
        EMOJI_RANGES.iter().any(|&(lo, hi)| (lo..=hi).contains(&c))
    })
}

/// Lexical problems that keep a string from being used as a domain
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatValidation {
    pub valid: bool,
    pub issues: Vec<String>,
}

/// Check a domain for whitespace, forbidden characters and overlong labels
pub fn validate_domain_format(domain: &str) -> FormatValidation {
    let mut issues = Vec::new();

    if domain.chars().any(char::is_whitespace) {
        issues.push("Domains cannot contain spaces".to_string());
    }
    if domain.chars().any(|c| "<>:\"\\|?*".contains(c)) {
        issues.push("Contains invalid characters for domains".to_string());
    }
    if domain.split('.').any(|label| label.len() > MAX_LABEL_OCTETS) {
        issues.push(format!("Label too long (max {} characters)", MAX_LABEL_OCTETS));
    }

    FormatValidation {
        valid: issues.is_empty(),
        issues,
    }
}

/// Conversion direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    ToAscii,
    ToUnicode,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::ToAscii => write!(f, "to-ascii"),
            Direction::ToUnicode => write!(f, "to-unicode"),
        }
    }
}

impl std::str::FromStr for Direction {
    type Err = EmojiDomainError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "to-ascii" | "emoji-to-punycode" => Ok(Direction::ToAscii),
            "to-unicode" | "punycode-to-emoji" => Ok(Direction::ToUnicode),
            other => Err(EmojiDomainError::invalid_input(
                format!("unknown direction '{}', expected to-ascii or to-unicode", other),
                None,
            )),
        }
    }
}

/// Details of a single conversion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionReport {
    pub input: String,
    pub output: String,
    pub direction: Direction,
    pub contains_emoji: bool,
    pub character_count: usize,
    pub output_length: usize,
    pub label_count: usize,
    pub ace_labels: usize,
    pub validation: FormatValidation,
    pub timestamp: DateTime<Utc>,
}

impl ConversionReport {
    /// Convert a Unicode domain to ACE and describe the result
    pub fn emoji_to_ascii(input: &str) -> Result<Self> {
        let output = to_ascii(input)?;
        Ok(Self::build(input, output, Direction::ToAscii, contains_emoji(input)))
    }

    /// Convert an ACE domain to Unicode and describe the result
    pub fn ascii_to_emoji(input: &str) -> Self {
        let output = to_unicode(input);
        let has_emoji = contains_emoji(&output);
        Self::build(input, output, Direction::ToUnicode, has_emoji)
    }

    fn build(input: &str, output: String, direction: Direction, contains_emoji: bool) -> Self {
        let ace_source = match direction {
            Direction::ToAscii => output.as_str(),
            Direction::ToUnicode => input,
        };
        Self {
            input: input.to_string(),
            direction,
            contains_emoji,
            character_count: input.chars().count(),
            output_length: output.chars().count(),
            label_count: input.split('.').count(),
            ace_labels: ace_source.split('.').filter(|l| has_ace_prefix(l)).count(),
            validation: validate_domain_format(input),
            timestamp: Utc::now(),
            output,
        }
    }
}

/// One entry of a bulk conversion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkItem {
    pub input: String,
    pub output: Option<String>,
    pub success: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkConversion {
    pub direction: Direction,
    pub results: Vec<BulkItem>,
    pub summary: BulkSummary,
}

/// Convert up to [`MAX_BULK_INPUTS`] domains, recording failures per item
pub fn bulk_convert<S: AsRef<str>>(inputs: &[S], direction: Direction) -> Result<BulkConversion> {
    if inputs.is_empty() || inputs.len() > MAX_BULK_INPUTS {
        return Err(EmojiDomainError::size(inputs.len(), MAX_BULK_INPUTS));
    }

    let results: Vec<BulkItem> = inputs
        .iter()
        .map(|input| {
            let input = input.as_ref();
            let converted = match direction {
                Direction::ToAscii => to_ascii(input),
                Direction::ToUnicode => strict_to_unicode(input),
            };
            match converted {
                Ok(output) => BulkItem {
                    input: input.to_string(),
                    output: Some(output),
                    success: true,
                    error: None,
                },
                Err(e) => BulkItem {
                    input: input.to_string(),
                    output: None,
                    success: false,
                    error: Some(e.to_string()),
                },
            }
        })
        .collect();

    let successful = results.iter().filter(|r| r.success).count();
    let summary = BulkSummary {
        total: results.len(),
        successful,
        failed: results.len() - successful,
    };

    Ok(BulkConversion {
        direction,
        results,
        summary,
    })
}

fn strict_to_unicode(input: &str) -> Result<String> {
    input
        .to_lowercase()
        .split('.')
        .map(decode_ace_label)
        .collect::<Result<Vec<_>>>()
        .map(|labels| labels.join("."))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainSuggestion {
    pub domain: String,
    pub ascii_domain: String,
    pub priority: Priority,
}

/// Build emoji domain variations for the given TLDs (at most 20)
pub fn suggest_domains(emoji: &str, tlds: &[String]) -> Result<Vec<DomainSuggestion>> {
    let emoji = emoji.trim();
    if !contains_emoji(emoji) {
        return Err(EmojiDomainError::invalid_input("input must contain emoji characters", None));
    }

    let tlds: Vec<&str> = if tlds.is_empty() {
        SUGGESTION_TLDS.to_vec()
    } else {
        tlds.iter().map(|t| t.trim_start_matches('.')).collect()
    };

    let variations = [
        emoji.to_string(),
        format!("{emoji}{emoji}"),
        format!("{emoji}🌟"),
        format!("{emoji}💎"),
        format!("🚀{emoji}"),
    ];

    let mut suggestions = Vec::with_capacity(MAX_SUGGESTIONS);
    for (idx, variation) in variations.iter().enumerate() {
        for tld in &tlds {
            if suggestions.len() == MAX_SUGGESTIONS {
                return Ok(suggestions);
            }
            let domain = format!("{}.{}", variation, tld);
            let ascii_domain = to_ascii(&domain)?;
            suggestions.push(DomainSuggestion {
                domain,
                ascii_domain,
                priority: if idx == 0 { Priority::High } else { Priority::Medium },
            });
        }
    }

    Ok(suggestions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_emoji() {
        assert!(contains_emoji("🏠"));
        assert!(contains_emoji("go🚀now"));
        assert!(contains_emoji("☕"));
        assert!(!contains_emoji("bücher"));
        assert!(!contains_emoji("example"));
    }

    #[test]
    fn test_validate_domain_format() {
        assert!(validate_domain_format("🏠.com").valid);

        let result = validate_domain_format("my house?.com");
        assert!(!result.valid);
        assert_eq!(result.issues.len(), 2);
    }

    #[test]
    fn test_conversion_reports() {
        let report = ConversionReport::emoji_to_ascii("🏠.com").unwrap();
        assert_eq!(report.output, "xn--ls8h.com");
        assert!(report.contains_emoji);
        assert_eq!(report.character_count, 5);
        assert_eq!(report.ace_labels, 1);

        let report = ConversionReport::ascii_to_emoji("xn--ls8h.com");
        assert_eq!(report.output, "🏠.com");
        assert!(report.contains_emoji);
        assert_eq!(report.label_count, 2);
        assert_eq!(report.ace_labels, 1);
    }

    #[test]
    fn test_bulk_convert_partial_failure() {
        let inputs = ["🏠.com", "xn--🏠.com", "plain.org"];
        let bulk = bulk_convert(&inputs, Direction::ToAscii).unwrap();
        assert_eq!(bulk.summary, BulkSummary { total: 3, successful: 2, failed: 1 });
        assert_eq!(bulk.results[0].output.as_deref(), Some("xn--ls8h.com"));
        assert!(bulk.results[1].error.is_some());

        let bulk = bulk_convert(&["XN--LS8H.la", "xn--99999999999999.la"], Direction::ToUnicode).unwrap();
        assert_eq!(bulk.results[0].output.as_deref(), Some("🏠.la"));
        assert!(!bulk.results[1].success);
    }

    #[test]
    fn test_bulk_convert_bounds() {
        let empty: [&str; 0] = [];
        assert!(matches!(
            bulk_convert(&empty, Direction::ToAscii).unwrap_err(),
            EmojiDomainError::Size { count: 0, .. }
        ));

        let many = vec!["a.com"; MAX_BULK_INPUTS + 1];
        assert!(matches!(
            bulk_convert(&many, Direction::ToAscii).unwrap_err(),
            EmojiDomainError::Size { count: 51, .. }
        ));
    }

    #[test]
    fn test_direction_parsing() {
        assert_eq!("to-ascii".parse::<Direction>().unwrap(), Direction::ToAscii);
        assert_eq!("punycode-to-emoji".parse::<Direction>().unwrap(), Direction::ToUnicode);
        assert!("sideways".parse::<Direction>().is_err());
    }

    #[test]
    fn test_suggestions() {
        let suggestions = suggest_domains("🏠", &[]).unwrap();
        assert_eq!(suggestions.len(), 20);
        assert_eq!(suggestions[0].domain, "🏠.com");
        assert_eq!(suggestions[0].ascii_domain, "xn--ls8h.com");
        assert_eq!(suggestions[0].priority, Priority::High);
        assert_eq!(suggestions[8].priority, Priority::Medium);

        let tlds = vec![".ws".to_string()];
        let suggestions = suggest_domains("🏠", &tlds).unwrap();
        assert_eq!(suggestions.len(), 5);
        assert!(suggestions.iter().all(|s| s.ascii_domain.ends_with(".ws")));

        assert!(suggest_domains("house", &[]).is_err());
    }
}
