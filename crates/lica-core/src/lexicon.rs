//! Lexicon index and tokenizer
//!
//! Maps words (and optionally two-word phrases) to categories, and holds the
//! two stopword sets used by the keyword fallback.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::error::{PayloadProblem, Problems, Section};
use crate::payload::RulePayload;
use crate::taxonomy::Taxonomy;
use crate::types::Category;

// =============================================================================
// Tokenizer
// =============================================================================

const MIN_TOKEN_LEN: usize = 3;

/// Extract candidate words from a URL and title.
///
/// The two strings are joined with a space and lower-cased; every maximal
/// run of at least three ASCII letters `a`-`z` is a token. Digits,
/// punctuation and shorter runs are dropped.
pub fn tokenize(url: &str, title: &str) -> Vec<String> {
    let text = format!("{} {}", url, title).to_lowercase();
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut token_start = None;

    for i in 0..=bytes.len() {
        let is_alpha = i < bytes.len() && bytes[i].is_ascii_lowercase();

        if is_alpha {
            if token_start.is_none() {
                token_start = Some(i);
            }
        } else if let Some(ts) = token_start.take() {
            if i - ts >= MIN_TOKEN_LEN {
                tokens.push(text[ts..i].to_string());
            }
        }
    }

    tokens
}

/// Append adjacent-token bigrams (`"real estate"`) to a token stream.
pub fn with_bigrams(mut tokens: Vec<String>) -> Vec<String> {
    let bigrams: Vec<String> = tokens
        .windows(2)
        .map(|pair| format!("{} {}", pair[0], pair[1]))
        .collect();
    tokens.extend(bigrams);
    tokens
}

// =============================================================================
// Tally
// =============================================================================

/// Keyword hit counts: top-level -> sub-level -> count.
///
/// Ordered maps keep every downstream ranking deterministic.
pub type Tally = BTreeMap<String, BTreeMap<String, u32>>;

// =============================================================================
// Lexicon Index
// =============================================================================

/// Keyword -> category index plus stopword sets.
#[derive(Debug, Default)]
pub struct Lexicon {
    keywords: HashMap<String, Category>,
    content_stopwords: HashSet<String>,
    sensitive_stopwords: HashSet<String>,
}

impl Lexicon {
    pub(crate) fn build(payload: &RulePayload, taxonomy: &Taxonomy) -> (Self, Problems) {
        let mut problems = Problems::default();
        let mut keywords: HashMap<String, Category> = HashMap::new();
        let mut conflicts = 0usize;

        for (label, words) in &payload.keywords {
            let Some(category) = taxonomy.resolve(label) else {
                problems.push(PayloadProblem::UnknownLabel {
                    section: Section::Keywords,
                    key: label.clone(),
                    label: label.clone(),
                });
                continue;
            };

            for word in words {
                let word = normalize_word(word);
                if word.is_empty() {
                    continue;
                }
                match keywords.get(&word) {
                    Some(existing) if *existing != category => {
                        log::warn!(
                            "keyword `{}` listed under {} and {}; keeping {}",
                            word,
                            existing,
                            category,
                            existing
                        );
                        conflicts += 1;
                    }
                    Some(_) => {}
                    None => {
                        keywords.insert(word, category.clone());
                    }
                }
            }
        }

        let sensitive_stopwords: HashSet<String> = payload
            .stopwords
            .sensitive
            .iter()
            .map(|w| normalize_word(w))
            .filter(|w| !w.is_empty())
            .collect();

        let content_stopwords: HashSet<String> = payload
            .stopwords
            .content
            .iter()
            .map(|w| normalize_word(w))
            .filter(|w| !w.is_empty() && !sensitive_stopwords.contains(w))
            .collect();

        log::debug!(
            "lexicon: {} keywords ({} conflicts), {} content / {} sensitive stopwords",
            keywords.len(),
            conflicts,
            content_stopwords.len(),
            sensitive_stopwords.len()
        );

        let lexicon = Self {
            keywords,
            content_stopwords,
            sensitive_stopwords,
        };
        (lexicon, problems)
    }

    /// Category for a token or bigram.
    #[inline]
    pub fn lookup(&self, token: &str) -> Option<&Category> {
        self.keywords.get(token)
    }

    #[inline]
    pub fn is_content_stopword(&self, token: &str) -> bool {
        self.content_stopwords.contains(token)
    }

    /// True if any token is a sensitive word.
    pub fn contains_sensitive<S: AsRef<str>>(&self, tokens: &[S]) -> bool {
        tokens
            .iter()
            .any(|token| self.sensitive_stopwords.contains(token.as_ref()))
    }

    /// Count keyword hits per category, skipping content stopwords.
    pub fn tally<S: AsRef<str>>(&self, tokens: &[S]) -> Tally {
        let mut tally = Tally::new();

        for token in tokens {
            let token = token.as_ref();
            if self.is_content_stopword(token) {
                continue;
            }
            if let Some(category) = self.lookup(token) {
                *tally
                    .entry(category.top_level.clone())
                    .or_default()
                    .entry(category.sub_level.clone())
                    .or_insert(0) += 1;
            }
        }

        tally
    }

    pub fn keyword_count(&self) -> usize {
        self.keywords.len()
    }
}

fn normalize_word(word: &str) -> String {
    word.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
