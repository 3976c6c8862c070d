//! Raw rule payload
//!
//! The plain data bundle a classifier is compiled from. Loading it (file,
//! network, extension storage) is the host program's business; this module
//! only defines its shape and JSON encoding.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::BuildError;

/// Everything needed to build a classifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulePayload {
    /// top-level -> sub-levels
    pub taxonomy: BTreeMap<String, Vec<String>>,
    /// registrable domain -> category label
    pub domain_rules: BTreeMap<String, String>,
    /// host (with subdomain) -> category label
    pub host_rules: BTreeMap<String, String>,
    /// host/first-segment -> category label
    pub path_rules: BTreeMap<String, String>,
    /// registrable domain (or bare domain name) -> public suffixes
    #[serde(deserialize_with = "deserialize_suffix_sets")]
    pub ignore_domains: BTreeMap<String, BTreeSet<String>>,
    /// category label -> keywords and two-word phrases
    pub keywords: BTreeMap<String, Vec<String>>,
    pub stopwords: Stopwords,
}

/// The two stopword lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stopwords {
    /// Function words excluded from scoring.
    #[serde(alias = "english")]
    pub content: Vec<String>,
    /// Words that make a whole URL/title ignorable.
    #[serde(alias = "web")]
    pub sensitive: Vec<String>,
}

/// Per-section entry counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PayloadStats {
    pub top_levels: usize,
    pub sub_levels: usize,
    pub domain_rules: usize,
    pub host_rules: usize,
    pub path_rules: usize,
    pub ignore_domains: usize,
    pub keywords: usize,
    pub content_stopwords: usize,
    pub sensitive_stopwords: usize,
}

impl RulePayload {
    pub fn from_json(text: &str) -> Result<Self, BuildError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, BuildError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn stats(&self) -> PayloadStats {
        PayloadStats {
            top_levels: self.taxonomy.len(),
            sub_levels: self.taxonomy.values().map(Vec::len).sum(),
            domain_rules: self.domain_rules.len(),
            host_rules: self.host_rules.len(),
            path_rules: self.path_rules.len(),
            ignore_domains: self.ignore_domains.len(),
            keywords: self.keywords.values().map(Vec::len).sum(),
            content_stopwords: self.stopwords.content.len(),
            sensitive_stopwords: self.stopwords.sensitive.len(),
        }
    }
}

/// Accepts `{"domain": ["com", "co.uk"]}` as well as the older
/// `{"domain": {"com": 1, "co.uk": 1}}` shape.
fn deserialize_suffix_sets<'de, D>(deserializer: D) -> Result<BTreeMap<String, BTreeSet<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Suffixes {
        List(BTreeSet<String>),
        Keys(BTreeMap<String, serde_json::Value>),
    }

    let raw = BTreeMap::<String, Suffixes>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(domain, suffixes)| {
            let set = match suffixes {
                Suffixes::List(set) => set,
                Suffixes::Keys(map) => map.into_keys().collect(),
            };
            (domain, set)
        })
        .collect())
}
