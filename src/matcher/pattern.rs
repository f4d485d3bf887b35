//! Pattern matching implementation.

use crate::crypto::{AddressEncoding, ADDRESS_LEN, ADDRESS_MARKER};
use crate::error::ConfigError;

/// Number of hex digits in an address body.
const ADDRESS_DIGITS: usize = ADDRESS_LEN * 2;

/// A compiled prefix/suffix pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    /// Prefix, marker stripped (lowercased unless case sensitive)
    prefix: String,
    /// Suffix (lowercased unless case sensitive)
    suffix: String,
    /// Whether matching is case sensitive
    case_sensitive: bool,
}

impl Pattern {
    /// Creates a new pattern.
    ///
    /// A leading `0x` on the prefix is treated as the address marker and
    /// dropped, so `"0xdead"` and `"dead"` are the same pattern.
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>, case_sensitive: bool) -> Self {
        let prefix = prefix.into();
        let prefix = strip_marker(&prefix);
        let suffix = suffix.into();

        let normalize = |s: &str| {
            if case_sensitive {
                s.to_owned()
            } else {
                s.to_ascii_lowercase()
            }
        };

        Self {
            prefix: normalize(prefix),
            suffix: normalize(&suffix),
            case_sensitive,
        }
    }

    /// Returns the prefix pattern (without marker).
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the suffix pattern.
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// The address rendering this pattern must be tested against.
    ///
    /// Case-sensitive patterns only make sense against the mixed-case
    /// checksum form.
    pub fn encoding(&self) -> AddressEncoding {
        if self.case_sensitive {
            AddressEncoding::Checksum
        } else {
            AddressEncoding::Lowercase
        }
    }

    /// Matches an encoded address against this pattern.
    #[inline]
    pub fn matches(&self, address: &str) -> bool {
        self.matches_bytes(address.as_bytes())
    }

    /// Matches an encoded address held in a byte buffer.
    #[inline]
    pub fn matches_bytes(&self, address: &[u8]) -> bool {
        let body = address
            .strip_prefix(ADDRESS_MARKER.as_bytes())
            .unwrap_or(address);
        let prefix = self.prefix.as_bytes();
        let suffix = self.suffix.as_bytes();

        if prefix.len() > body.len() || suffix.len() > body.len() {
            return false;
        }

        let head = &body[..prefix.len()];
        let tail = &body[body.len() - suffix.len()..];

        if self.case_sensitive {
            head == prefix && tail == suffix
        } else {
            head.eq_ignore_ascii_case(prefix) && tail.eq_ignore_ascii_case(suffix)
        }
    }

    /// Checks that the pattern can ever match a derived address.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, part) in [("Prefix", &self.prefix), ("Suffix", &self.suffix)] {
            if !part.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(ConfigError::InvalidPattern(format!(
                    "{} must contain only hex characters (0-9, a-f)",
                    name
                )));
            }
        }

        if self.prefix.len() + self.suffix.len() > ADDRESS_DIGITS {
            return Err(ConfigError::InvalidPattern(format!(
                "Combined prefix + suffix cannot be longer than {} characters",
                ADDRESS_DIGITS
            )));
        }

        Ok(())
    }

    /// Returns the estimated difficulty (number of attempts to find a match).
    ///
    /// Each hex digit has 16 possible values. In case-sensitive mode every
    /// letter also has to land on the right case, which halves its odds.
    pub fn estimated_difficulty(&self) -> u64 {
        let digits = (self.prefix.len() + self.suffix.len()) as u32;
        let base = 16u64.saturating_pow(digits);

        if self.case_sensitive {
            let letters = self
                .prefix
                .chars()
                .chain(self.suffix.chars())
                .filter(|c| c.is_ascii_alphabetic())
                .count() as u32;
            base.saturating_mul(2u64.saturating_pow(letters))
        } else {
            base
        }
    }

    /// Returns a human-readable difficulty estimate.
    pub fn difficulty_description(&self) -> String {
        let diff = self.estimated_difficulty();
        match diff {
            0..=1_000 => "Very Easy (< 1 second)".into(),
            1_001..=100_000 => "Easy (seconds)".into(),
            100_001..=10_000_000 => "Medium (minutes)".into(),
            10_000_001..=1_000_000_000 => "Hard (hours)".into(),
            _ => "Very Hard (days or more)".into(),
        }
    }
}

fn strip_marker(pattern: &str) -> &str {
    pattern
        .strip_prefix(ADDRESS_MARKER)
        .or_else(|| pattern.strip_prefix("0X"))
        .unwrap_or(pattern)
}

/// Tests an encoded address against a prefix and suffix.
///
/// Empty prefix or suffix match vacuously. Patterns longer than the address
/// body never match.
pub fn matches(address: &str, prefix: &str, suffix: &str, case_sensitive: bool) -> bool {
    Pattern::new(prefix, suffix, case_sensitive).matches(address)
}
