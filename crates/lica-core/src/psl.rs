//! Public Suffix List (PSL) seam for registrable-domain extraction
//!
//! The classifier never computes public suffixes itself. It asks a
//! [`SuffixList`] to split a host, so the host program decides where the
//! suffix data comes from: a full `publicsuffix::List` parsed from the
//! Mozilla list, or the small built-in [`HeuristicSuffixes`] table.
//!
//! # Examples
//!
//! ```
//! use lica_core::psl::{HeuristicSuffixes, SuffixList};
//!
//! let split = HeuristicSuffixes.split("news.bbc.co.uk").unwrap();
//! assert_eq!(split.suffix, "co.uk");
//! assert_eq!(split.registrable, "bbc.co.uk");
//! ```

use publicsuffix::Psl;

/// A host split around its public suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostSplit<'h> {
    /// Non-registrable suffix, e.g. `co.uk`.
    pub suffix: &'h str,
    /// Registrable domain, e.g. `bbc.co.uk`.
    pub registrable: &'h str,
}

impl<'h> HostSplit<'h> {
    /// Labels left of the registrable domain, in host order.
    pub fn subdomain(&self, host: &'h str) -> &'h str {
        let cut = host.len().saturating_sub(self.registrable.len() + 1);
        if host.len() > self.registrable.len() {
            &host[..cut]
        } else {
            ""
        }
    }
}

/// Splits lower-cased hosts into public suffix and registrable domain.
///
/// Implementations return `None` when the host has no known public suffix
/// or when the host is itself a public suffix.
pub trait SuffixList {
    fn split<'h>(&self, host: &'h str) -> Option<HostSplit<'h>>;
}

impl<T: SuffixList + ?Sized> SuffixList for &T {
    fn split<'h>(&self, host: &'h str) -> Option<HostSplit<'h>> {
        (**self).split(host)
    }
}

impl<T: SuffixList + ?Sized> SuffixList for Box<T> {
    fn split<'h>(&self, host: &'h str) -> Option<HostSplit<'h>> {
        (**self).split(host)
    }
}

impl<T: SuffixList + ?Sized> SuffixList for std::sync::Arc<T> {
    fn split<'h>(&self, host: &'h str) -> Option<HostSplit<'h>> {
        (**self).split(host)
    }
}

// =============================================================================
// publicsuffix::List
// =============================================================================

impl SuffixList for publicsuffix::List {
    fn split<'h>(&self, host: &'h str) -> Option<HostSplit<'h>> {
        let domain = self.domain(host.as_bytes())?;
        let suffix = domain.suffix();

        // The implicit `*` rule matches anything; only listed suffixes count.
        if !suffix.is_known() {
            return None;
        }

        let registrable_len = domain.as_bytes().len();
        let suffix_len = suffix.as_bytes().len();
        Some(HostSplit {
            suffix: host.get(host.len().checked_sub(suffix_len)?..)?,
            registrable: host.get(host.len().checked_sub(registrable_len)?..)?,
        })
    }
}

/// Parse the text of a public suffix list.
pub fn parse_suffix_list(text: &str) -> Result<publicsuffix::List, publicsuffix::Error> {
    text.parse()
}

// =============================================================================
// Heuristic fallback
// =============================================================================

/// Common two-part suffixes for the heuristic.
const COMMON_TWO_PART_TLDS: &[&str] = &[
    "co.uk", "co.jp", "co.nz", "co.za", "co.in", "co.kr",
    "com.au", "com.br", "com.cn", "com.mx", "com.tw", "com.hk",
    "net.au", "net.nz",
    "org.uk", "org.au",
    "gov.uk", "gov.au",
    "ac.uk", "ac.jp",
    "ne.jp", "or.jp",
];

/// Approximate suffix splitting without PSL data.
///
/// Treats the last label as the suffix, or the last two labels when they
/// form one of a handful of well-known two-part suffixes. Single-label
/// hosts (`localhost`) have no suffix.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicSuffixes;

impl SuffixList for HeuristicSuffixes {
    fn split<'h>(&self, host: &'h str) -> Option<HostSplit<'h>> {
        let labels: Vec<&str> = host.split('.').collect();
        let n = labels.len();
        if n < 2 || labels.iter().any(|l| l.is_empty()) {
            return None;
        }

        let last_two = format!("{}.{}", labels[n - 2], labels[n - 1]);
        let suffix_labels = if COMMON_TWO_PART_TLDS.contains(&last_two.as_str()) {
            2
        } else {
            1
        };
        if n <= suffix_labels {
            return None;
        }

        let suffix_len: usize = labels[n - suffix_labels..].iter().map(|l| l.len()).sum::<usize>()
            + (suffix_labels - 1);
        let registrable_len = suffix_len + labels[n - suffix_labels - 1].len() + 1;

        Some(HostSplit {
            suffix: &host[host.len() - suffix_len..],
            registrable: &host[host.len() - registrable_len..],
        })
    }
}
