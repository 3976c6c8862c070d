//! Error types
//!
//! Only payload inconsistencies are hard errors. Per-URL failures are
//! reported through [`UrlError`] and folded into an `invalid_url`
//! classification by the classifier.

use std::fmt;

/// Failure to decompose a URL into suffix / registrable domain / host / path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UrlError {
    #[error("no valid url scheme found")]
    MissingScheme,
    #[error("unsupported url scheme: {0}")]
    UnsupportedScheme(String),
    #[error("url has no host")]
    MissingHost,
    #[error("ip address host: {0}")]
    IpAddressHost(String),
    #[error("malformed host: {0}")]
    InvalidHost(String),
    #[error("no known public suffix for host: {0}")]
    UnknownSuffix(String),
    #[error("host is a public suffix: {0}")]
    NoRegistrableDomain(String),
}

/// Payload section a problem was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    DomainRules,
    HostRules,
    PathRules,
    Keywords,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::DomainRules => "domain_rules",
            Self::HostRules => "host_rules",
            Self::PathRules => "path_rules",
            Self::Keywords => "keywords",
        })
    }
}

/// One inconsistency found while compiling a payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PayloadProblem {
    #[error("{section}: `{key}` references unknown category `{label}`")]
    UnknownLabel {
        section: Section,
        key: String,
        label: String,
    },
    #[error("{section}: cannot parse rule `{key}`: {source}")]
    InvalidRuleUrl {
        section: Section,
        key: String,
        #[source]
        source: UrlError,
    },
    #[error("taxonomy: label `{label}` is defined more than once")]
    DuplicateLabel { label: String },
    #[error("domain_rules: `{key}` is not a registrable domain")]
    NotRegistrableDomain { key: String },
    #[error("host_rules: `{key}` has no subdomain")]
    EmptyHostRule { key: String },
    #[error("host_rules: `{key}` conflicts with another host rule")]
    ConflictingHostRule { key: String },
    #[error("path_rules: `{key}` has no path segment")]
    EmptyPathRule { key: String },
    #[error("path_rules: `{key}` conflicts with another path rule")]
    ConflictingPathRule { key: String },
}

/// Classifier construction failure.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// Every problem found in the payload; construction never keeps a
    /// partially built store.
    #[error("invalid payload ({} problem(s)): {}", .0.len(), first_problem(.0))]
    InvalidPayload(Vec<PayloadProblem>),
    #[error("malformed payload json: {0}")]
    Json(#[from] serde_json::Error),
}

impl BuildError {
    /// The individual payload problems, if any.
    pub fn problems(&self) -> &[PayloadProblem] {
        match self {
            Self::InvalidPayload(problems) => problems,
            Self::Json(_) => &[],
        }
    }
}

fn first_problem(problems: &[PayloadProblem]) -> String {
    problems
        .first()
        .map(|p| p.to_string())
        .unwrap_or_default()
}

/// Collects problems across the independent build stages.
#[derive(Debug, Default)]
pub(crate) struct Problems(Vec<PayloadProblem>);

impl Problems {
    pub(crate) fn push(&mut self, problem: PayloadProblem) {
        self.0.push(problem);
    }

    pub(crate) fn extend(&mut self, other: Problems) {
        self.0.extend(other.0);
    }

    pub(crate) fn into_result<T>(self, value: T) -> Result<T, BuildError> {
        if self.0.is_empty() {
            Ok(value)
        } else {
            Err(BuildError::InvalidPayload(self.0))
        }
    }
}
