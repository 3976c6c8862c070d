//! Core type definitions for LICA
//!
//! These types flow through every stage of the classification cascade and
//! make up the public result shape.

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

// =============================================================================
// Category
// =============================================================================

/// Reserved sub-level meaning "no finer distinction".
pub const GENERAL: &str = "general";

/// Top-level used for every result that is not a taxonomy category.
pub const UNCATEGORIZED: &str = "uncategorized";

/// A (top-level, sub-level) pair from the taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Category {
    pub top_level: String,
    pub sub_level: String,
}

impl Category {
    pub fn new(top_level: impl Into<String>, sub_level: impl Into<String>) -> Self {
        Self {
            top_level: top_level.into(),
            sub_level: sub_level.into(),
        }
    }

    /// The `(top, "general")` category for a top-level name.
    pub fn general(top_level: impl Into<String>) -> Self {
        Self::new(top_level, GENERAL)
    }

    #[inline]
    pub fn is_general(&self) -> bool {
        self.sub_level == GENERAL
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.top_level, self.sub_level)
    }
}

// =============================================================================
// Scheme Masks
// =============================================================================

bitflags::bitflags! {
    /// URL scheme mask.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct SchemeMask: u8 {
        const HTTP = 1 << 0;
        const HTTPS = 1 << 1;
        const WS = 1 << 2;
        const WSS = 1 << 3;
        const FTP = 1 << 4;
        /// Plain web schemes
        const WEB = Self::HTTP.bits() | Self::HTTPS.bits();
    }
}

impl SchemeMask {
    /// Parse a single scheme name (`"https"`, `"ftp"`, ...).
    pub fn from_scheme(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "http" => Some(Self::HTTP),
            "https" => Some(Self::HTTPS),
            "ws" => Some(Self::WS),
            "wss" => Some(Self::WSS),
            "ftp" => Some(Self::FTP),
            _ => None,
        }
    }
}

impl Default for SchemeMask {
    fn default() -> Self {
        Self::WEB
    }
}

// =============================================================================
// Uncategorized sub-levels
// =============================================================================

/// The URL or title hit a privacy guard.
pub const IGNORED: &str = "ignored";
/// Neither a URL nor a title was supplied.
pub const INVALID_DATA: &str = "invalid_data";
/// The URL could not be decomposed.
pub const INVALID_URL: &str = "invalid_url";
/// Two top-levels tied for the highest keyword count.
pub const NO_CONSENSUS: &str = "no_consensus";
/// No token matched the keyword index.
pub const UNKNOWN: &str = "unknown";

// =============================================================================
// Reason
// =============================================================================

/// Which rule or fallback produced a classification.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Reason {
    SingleTopicSite,
    SingleTopicSubdomain,
    SingleTopicPath,
    KeywordMatching,
    IgnoredDomain,
    IgnoredWords,
    EmptyValues,
    /// URL decomposition failed; carries the parser's error detail.
    InvalidUrl(String),
}

impl Reason {
    pub fn as_str(&self) -> &str {
        match self {
            Self::SingleTopicSite => "single_topic_site",
            Self::SingleTopicSubdomain => "single_topic_subdomain",
            Self::SingleTopicPath => "single_topic_path",
            Self::KeywordMatching => "keyword_matching",
            Self::IgnoredDomain => "ignored_domain",
            Self::IgnoredWords => "ignored_words",
            Self::EmptyValues => "empty_values",
            Self::InvalidUrl(detail) => detail,
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Reason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// =============================================================================
// Classification
// =============================================================================

/// Result of classifying a URL and/or title.
///
/// Every call produces one of these; "could not classify" is expressed
/// through an `uncategorized` top-level and the `reason`, never an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub top_level: String,
    pub sub_level: String,
    pub reason: Reason,
}

impl Classification {
    /// A result pointing at a taxonomy category.
    pub fn categorized(category: &Category, reason: Reason) -> Self {
        Self {
            top_level: category.top_level.clone(),
            sub_level: category.sub_level.clone(),
            reason,
        }
    }

    /// An `uncategorized` result with the given status sub-level.
    pub fn uncategorized(status: &str, reason: Reason) -> Self {
        Self {
            top_level: UNCATEGORIZED.to_string(),
            sub_level: status.to_string(),
            reason,
        }
    }

    #[inline]
    pub fn is_categorized(&self) -> bool {
        self.top_level != UNCATEGORIZED
    }

    /// The `(top_level, sub_level, reason)` triple.
    pub fn as_tuple(&self) -> (&str, &str, &str) {
        (&self.top_level, &self.sub_level, self.reason.as_str())
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {} ({})", self.top_level, self.sub_level, self.reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_tags() {
        assert_eq!(Reason::SingleTopicSubdomain.to_string(), "single_topic_subdomain");
        assert_eq!(Reason::InvalidUrl("missing scheme".into()).to_string(), "missing scheme");
    }

    #[test]
    fn test_classification_json_shape() {
        let c = Classification::categorized(&Category::new("sports", "soccer"), Reason::SingleTopicSite);
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, r#"{"top_level":"sports","sub_level":"soccer","reason":"single_topic_site"}"#);
    }

    #[test]
    fn test_scheme_from_scheme() {
        assert_eq!(SchemeMask::from_scheme("HTTPS"), Some(SchemeMask::HTTPS));
        assert_eq!(SchemeMask::from_scheme("data"), None);
        assert!(SchemeMask::default().contains(SchemeMask::HTTP));
        assert!(!SchemeMask::default().contains(SchemeMask::FTP));
    }
}
