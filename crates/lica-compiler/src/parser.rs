use std::collections::{BTreeMap, BTreeSet};

use lica_core::payload::Stopwords;
use serde::Deserialize;
use serde_json::Value;

/// Failure to read one of the source documents.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("{document}: malformed json: {source}")]
    Json {
        document: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("{document}: missing field `{field}`")]
    MissingField {
        document: &'static str,
        field: &'static str,
    },
    #[error("{document}: {detail}")]
    InvalidShape {
        document: &'static str,
        detail: String,
    },
}

/// Raw text of every source document.
#[derive(Debug, Clone, Copy)]
pub struct SourceTexts<'a> {
    /// `{top: [sub, ...]}`
    pub hierarchy: &'a str,
    /// `{domain_rules: {...}, host_rules: {...}, path_rules: {...}}`
    pub domain_rules: &'a str,
    /// `{positive_words: {top: {sub: [kw, ...]}}, ignore_domains: {...}}`
    pub keywords: &'a str,
    /// `{english: [...], web: [...]}`
    pub stopwords: &'a str,
    /// Site group dump `{group: [site, ...]}` and its `{group: "top/sub"}` mapping.
    pub site_groups: Option<(&'a str, &'a str)>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DomainRuleFile {
    pub domain_rules: BTreeMap<String, String>,
    pub host_rules: BTreeMap<String, String>,
    pub path_rules: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordFile {
    /// top-level -> sub-level -> keywords
    pub positive_words: BTreeMap<String, BTreeMap<String, Vec<String>>>,
    pub ignore_domains: BTreeMap<String, BTreeSet<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteGroups {
    pub sites: BTreeMap<String, Vec<String>>,
    /// group -> category label
    pub mapping: BTreeMap<String, String>,
}

/// All parsed source documents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceSet {
    pub hierarchy: BTreeMap<String, Vec<String>>,
    pub rules: DomainRuleFile,
    pub keywords: KeywordFile,
    pub stopwords: Stopwords,
    pub site_groups: Option<SiteGroups>,
}

pub fn parse_sources(texts: &SourceTexts<'_>) -> Result<SourceSet, CompileError> {
    let hierarchy = parse_json("hierarchy", texts.hierarchy)?;
    let rules = parse_json("domain rules", texts.domain_rules)?;
    let keywords = parse_keyword_file(texts.keywords)?;
    let stopwords = parse_json("stopwords", texts.stopwords)?;

    let site_groups = match texts.site_groups {
        Some((sites, mapping)) => Some(SiteGroups {
            sites: parse_json("site groups", sites)?,
            mapping: parse_json("site group mapping", mapping)?,
        }),
        None => None,
    };

    Ok(SourceSet {
        hierarchy,
        rules,
        keywords,
        stopwords,
        site_groups,
    })
}

fn parse_json<T: for<'de> Deserialize<'de>>(document: &'static str, text: &str) -> Result<T, CompileError> {
    serde_json::from_str(text).map_err(|source| CompileError::Json { document, source })
}

fn parse_keyword_file(text: &str) -> Result<KeywordFile, CompileError> {
    const DOCUMENT: &str = "keywords";

    #[derive(Deserialize)]
    struct Raw {
        positive_words: Option<BTreeMap<String, BTreeMap<String, Vec<String>>>>,
        #[serde(default)]
        ignore_domains: BTreeMap<String, Value>,
    }

    let raw: Raw = parse_json(DOCUMENT, text)?;
    let positive_words = raw.positive_words.ok_or(CompileError::MissingField {
        document: DOCUMENT,
        field: "positive_words",
    })?;

    let mut ignore_domains = BTreeMap::new();
    for (domain, value) in raw.ignore_domains {
        let suffixes = suffix_set(&value).ok_or_else(|| CompileError::InvalidShape {
            document: DOCUMENT,
            detail: format!("ignore_domains.{} must be a list or object of suffixes", domain),
        })?;
        ignore_domains.insert(domain, suffixes);
    }

    Ok(KeywordFile {
        positive_words,
        ignore_domains,
    })
}

/// Suffixes given as `["com", ...]`, `{"com": ...}` or a single `"com"`.
fn suffix_set(value: &Value) -> Option<BTreeSet<String>> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect(),
        Value::Object(map) => Some(map.keys().cloned().collect()),
        Value::String(suffix) => Some(BTreeSet::from([suffix.clone()])),
        _ => None,
    }
}
