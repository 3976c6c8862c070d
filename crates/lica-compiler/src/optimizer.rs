use std::collections::{BTreeMap, BTreeSet, HashSet};

use lica_core::RulePayload;

/// Label used in the domain-rule sources for sites outside the interest taxonomy.
pub const NOT_IN_USE: &str = "not in use";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OptimizeStats {
    pub keywords_before: usize,
    pub keywords_after: usize,
    /// Same keyword repeated under one label.
    pub keywords_deduped: usize,
    /// Same keyword under a second label; the first label keeps it.
    pub keyword_conflicts: usize,
    /// Rule keys that collapsed onto another after normalization.
    pub rules_deduped: usize,
    pub not_in_use_dropped: usize,
    /// Content stopwords removed because they are also sensitive.
    pub stopword_overlap: usize,
}

/// Normalize a payload in place.
pub fn optimize_payload(payload: &mut RulePayload) -> OptimizeStats {
    let mut stats = OptimizeStats::default();

    for rules in [
        &mut payload.domain_rules,
        &mut payload.host_rules,
        &mut payload.path_rules,
    ] {
        let (normalized, deduped, dropped) = normalize_rules(std::mem::take(rules));
        *rules = normalized;
        stats.rules_deduped += deduped;
        stats.not_in_use_dropped += dropped;
    }

    payload.ignore_domains = std::mem::take(&mut payload.ignore_domains)
        .into_iter()
        .fold(BTreeMap::new(), |mut acc: BTreeMap<String, BTreeSet<String>>, (domain, suffixes)| {
            acc.entry(normalize(&domain))
                .or_default()
                .extend(suffixes.iter().map(|s| normalize(s)));
            acc
        });

    stats.keywords_before = payload.keywords.values().map(Vec::len).sum();
    let mut seen: HashSet<String> = HashSet::new();
    for words in payload.keywords.values_mut() {
        let mut kept = Vec::with_capacity(words.len());
        let mut local: HashSet<String> = HashSet::new();
        for word in words.drain(..) {
            let word = normalize(&word);
            if word.is_empty() || !local.insert(word.clone()) {
                stats.keywords_deduped += 1;
                continue;
            }
            if !seen.insert(word.clone()) {
                stats.keyword_conflicts += 1;
                continue;
            }
            kept.push(word);
        }
        *words = kept;
    }
    payload.keywords.retain(|_, words| !words.is_empty());
    stats.keywords_after = payload.keywords.values().map(Vec::len).sum();

    let sensitive = dedupe_words(&payload.stopwords.sensitive);
    let content = dedupe_words(&payload.stopwords.content);
    let before = content.len();
    let content: Vec<String> = content.into_iter().filter(|w| !sensitive.contains(w)).collect();
    stats.stopword_overlap = before - content.len();
    payload.stopwords.content = content;
    payload.stopwords.sensitive = sensitive;

    if stats.keyword_conflicts > 0 {
        log::warn!("{} keyword(s) listed under more than one category", stats.keyword_conflicts);
    }
    log::debug!("optimize: {:?}", stats);

    stats
}

/// Lower-case and trim keys, dropping out-of-taxonomy labels. Returns the
/// normalized map with counts of collapsed and dropped entries.
fn normalize_rules(rules: BTreeMap<String, String>) -> (BTreeMap<String, String>, usize, usize) {
    let mut out = BTreeMap::new();
    let mut deduped = 0;
    let mut dropped = 0;

    for (key, label) in rules {
        if is_not_in_use(&label) {
            dropped += 1;
            continue;
        }
        let label = normalize(&label);
        let key = key.trim().to_lowercase();
        if out.contains_key(&key) {
            deduped += 1;
            continue;
        }
        out.insert(key, label);
    }

    (out, deduped, dropped)
}

pub(crate) fn is_not_in_use(label: &str) -> bool {
    normalize(label) == NOT_IN_USE
}

fn dedupe_words(words: &[String]) -> Vec<String> {
    let set: BTreeSet<String> = words
        .iter()
        .map(|w| normalize(w))
        .filter(|w| !w.is_empty())
        .collect();
    set.into_iter().collect()
}

fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> RulePayload {
        let mut payload = RulePayload::default();
        payload.domain_rules.insert("Taste.com.au ".into(), "Cooking".into());
        payload.domain_rules.insert("taste.com.au".into(), "wine".into());
        payload.domain_rules.insert("facebook.com".into(), "not in use".into());
        payload.keywords.insert("coins".into(), vec!["Coins".into(), "coins ".into(), "mint".into()]);
        payload.keywords.insert("golf".into(), vec!["mint".into(), "putter".into()]);
        payload.keywords.insert("tennis".into(), vec!["".into()]);
        payload.stopwords.content = vec!["the".into(), "Login".into(), "the".into()];
        payload.stopwords.sensitive = vec!["login".into()];
        payload
    }

    #[test]
    fn normalizes_rules() {
        let mut payload = payload();
        let stats = optimize_payload(&mut payload);
        assert_eq!(payload.domain_rules.len(), 1);
        assert!(payload.domain_rules.contains_key("taste.com.au"));
        assert_eq!(stats.rules_deduped, 1);
        assert_eq!(stats.not_in_use_dropped, 1);
    }

    #[test]
    fn dedupes_keywords_first_label_wins() {
        let mut payload = payload();
        let stats = optimize_payload(&mut payload);
        assert_eq!(payload.keywords["coins"], vec!["coins", "mint"]);
        assert_eq!(payload.keywords["golf"], vec!["putter"]);
        assert!(!payload.keywords.contains_key("tennis"));
        assert_eq!(stats.keywords_before, 6);
        assert_eq!(stats.keywords_after, 3);
        assert_eq!(stats.keywords_deduped, 2);
        assert_eq!(stats.keyword_conflicts, 1);
    }

    #[test]
    fn sensitive_stopwords_win() {
        let mut payload = payload();
        let stats = optimize_payload(&mut payload);
        assert_eq!(payload.stopwords.content, vec!["the"]);
        assert_eq!(payload.stopwords.sensitive, vec!["login"]);
        assert_eq!(stats.stopword_overlap, 1);
    }
}
