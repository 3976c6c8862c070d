//! LICA Core Library
//!
//! This crate classifies a URL (optionally with a page title) into a
//! two-level topic taxonomy plus a reason tag naming the rule that fired.
//!
//! # Architecture
//!
//! A [`Classifier`] is compiled once from a [`RulePayload`] and is immutable
//! afterwards. Classification runs a fixed cascade: ignore list, whole-site
//! rule, subdomain rule, first-path-segment rule, and finally keyword
//! tallying over the tokenized URL and title.
//!
//! # Modules
//!
//! - `payload`: Raw rule payload shape and JSON encoding
//! - `psl`: Public suffix seam for registrable-domain extraction
//! - `url`: URL decomposition
//! - `taxonomy`: Category label resolution
//! - `rules`: Domain, host-trie and path rule indexes
//! - `lexicon`: Tokenizer, keyword index and stopwords
//! - `rank`: Tally ranking and tie-breaks
//! - `classifier`: The classification cascade
//! - `types`: Shared type definitions

pub mod classifier;
pub mod error;
pub mod lexicon;
pub mod payload;
pub mod psl;
pub mod rank;
pub mod rules;
pub mod taxonomy;
pub mod types;
pub mod url;

#[cfg(test)]
mod fixtures;

// Re-export commonly used types
pub use classifier::{Classifier, ClassifierOptions, Explanation};
pub use error::{BuildError, PayloadProblem, UrlError};
pub use payload::{PayloadStats, RulePayload, Stopwords};
pub use psl::{parse_suffix_list, HeuristicSuffixes, SuffixList};
pub use types::{Category, Classification, Reason, SchemeMask};
