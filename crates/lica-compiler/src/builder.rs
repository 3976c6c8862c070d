use std::collections::{BTreeMap, HashSet};

use lica_core::types::GENERAL;
use lica_core::url::decompose_rule_key;
use lica_core::{HeuristicSuffixes, RulePayload};

use crate::optimizer::is_not_in_use;
use crate::parser::{SiteGroups, SourceSet};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileStats {
    pub top_levels: usize,
    pub keywords: usize,
    pub domain_rules: usize,
    pub host_rules: usize,
    pub path_rules: usize,
    /// Domain rules contributed by site groups.
    pub site_group_rules: usize,
    /// Site groups with no category mapping.
    pub unmapped_groups: usize,
    /// Site-group entries with no registrable domain.
    pub skipped_sites: usize,
    /// Explicit `not in use` domain rules, dropped before site groups merge.
    pub not_in_use_dropped: usize,
}

/// Assemble one payload from the parsed source documents.
pub fn build_payload(sources: &SourceSet) -> (RulePayload, CompileStats) {
    let mut stats = CompileStats::default();

    let mut payload = RulePayload {
        taxonomy: sources.hierarchy.clone(),
        domain_rules: sources.rules.domain_rules.clone(),
        host_rules: sources.rules.host_rules.clone(),
        path_rules: sources.rules.path_rules.clone(),
        ignore_domains: sources.keywords.ignore_domains.clone(),
        keywords: keyword_section(&sources.keywords.positive_words),
        stopwords: sources.stopwords.clone(),
    };

    let before = payload.domain_rules.len();
    payload.domain_rules.retain(|_, label| !is_not_in_use(label));
    stats.not_in_use_dropped = before - payload.domain_rules.len();

    if let Some(groups) = &sources.site_groups {
        let merged = merge_site_groups(&mut payload.domain_rules, groups);
        stats.site_group_rules = merged.added;
        stats.unmapped_groups = merged.unmapped;
        stats.skipped_sites = merged.skipped;
        if merged.unmapped > 0 {
            log::warn!("{} site group(s) have no category mapping", merged.unmapped);
        }
        if merged.skipped > 0 {
            log::warn!("{} site group entries have no registrable domain", merged.skipped);
        }
    }

    stats.top_levels = payload.taxonomy.len();
    stats.keywords = payload.keywords.values().map(Vec::len).sum();
    stats.domain_rules = payload.domain_rules.len();
    stats.host_rules = payload.host_rules.len();
    stats.path_rules = payload.path_rules.len();

    log::debug!("build: {:?}", stats);

    (payload, stats)
}

/// Flatten `{top: {sub: [kw]}}` into `{"top/sub": [kw]}`; `general` sub-levels
/// collapse to the bare top-level label.
fn keyword_section(
    positive_words: &BTreeMap<String, BTreeMap<String, Vec<String>>>,
) -> BTreeMap<String, Vec<String>> {
    let mut section: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for (top, subs) in positive_words {
        for (sub, words) in subs {
            if words.is_empty() {
                continue;
            }
            let label = if sub.trim().eq_ignore_ascii_case(GENERAL) {
                top.clone()
            } else {
                format!("{}/{}", top, sub)
            };
            section.entry(label).or_default().extend(words.iter().cloned());
        }
    }

    section
}

#[derive(Debug, Default)]
struct SiteGroupMerge {
    added: usize,
    unmapped: usize,
    skipped: usize,
}

/// Explicit domain rules always win over site-group membership.
///
/// Sites are reduced to their registrable domain, so `www.golfdigest.com` and
/// `https://golfdigest.com/news` both land on `golfdigest.com`.
fn merge_site_groups(domain_rules: &mut BTreeMap<String, String>, groups: &SiteGroups) -> SiteGroupMerge {
    let mut merge = SiteGroupMerge::default();
    let explicit: HashSet<String> = domain_rules
        .keys()
        .map(|key| site_domain(key).unwrap_or_else(|| key.trim().to_lowercase()))
        .collect();

    for (group, sites) in &groups.sites {
        let Some(label) = groups.mapping.get(group) else {
            log::debug!("site group {:?} has no mapping", group);
            merge.unmapped += 1;
            continue;
        };

        for site in sites {
            if site.trim().is_empty() {
                continue;
            }
            let Some(domain) = site_domain(site) else {
                log::debug!("site group {:?}: skipping {:?}", group, site);
                merge.skipped += 1;
                continue;
            };
            if explicit.contains(&domain) || domain_rules.contains_key(&domain) {
                continue;
            }
            domain_rules.insert(domain, label.clone());
            merge.added += 1;
        }
    }

    merge
}

fn site_domain(site: &str) -> Option<String> {
    decompose_rule_key(site, &HeuristicSuffixes)
        .ok()
        .map(|parsed| parsed.registrable_domain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::optimize_payload;
    use crate::parser::{parse_sources, SourceTexts};
    use lica_core::{Classifier, HeuristicSuffixes, Reason};

    const HIERARCHY: &str = r#"{"sports": ["golf", "soccer"], "food & drink": ["cooking"]}"#;
    const RULES: &str = r#"{
        "domain_rules": {"espn.com": "sports", "facebook.com": "not in use"},
        "host_rules": {"soccerblog.dallasnews.com": "soccer"},
        "path_rules": {"nytimes.com/dining": "cooking"}
    }"#;
    const KEYWORDS: &str = r#"{
        "positive_words": {
            "sports": {"golf": ["golf", "putter"], "general": ["stadium"], "soccer": []}
        },
        "ignore_domains": {"paypal": ["com"]}
    }"#;
    const STOPWORDS: &str = r#"{"english": ["the", "www", "com", "https"], "web": ["login"]}"#;
    const SITES: &str = r#"{"Golf Fans": ["GolfDigest.com", "espn.com"], "Misc": ["example.com"]}"#;
    const MAPPING: &str = r#"{"Golf Fans": "sports/golf"}"#;

    fn sources() -> SourceSet {
        parse_sources(&SourceTexts {
            hierarchy: HIERARCHY,
            domain_rules: RULES,
            keywords: KEYWORDS,
            stopwords: STOPWORDS,
            site_groups: Some((SITES, MAPPING)),
        })
        .expect("sources should parse")
    }

    #[test]
    fn qualifies_keyword_labels() {
        let (payload, stats) = build_payload(&sources());
        assert_eq!(payload.keywords["sports/golf"], vec!["golf", "putter"]);
        assert_eq!(payload.keywords["sports"], vec!["stadium"]);
        assert!(!payload.keywords.contains_key("sports/soccer"));
        assert_eq!(stats.keywords, 3);
    }

    #[test]
    fn site_groups_never_override_rules() {
        let (payload, stats) = build_payload(&sources());
        assert_eq!(payload.domain_rules["espn.com"], "sports");
        assert_eq!(payload.domain_rules["golfdigest.com"], "sports/golf");
        assert!(!payload.domain_rules.contains_key("example.com"));
        assert_eq!(stats.site_group_rules, 1);
        assert_eq!(stats.unmapped_groups, 1);
    }

    #[test]
    fn compiled_payload_builds_classifier() {
        let (mut payload, _) = build_payload(&sources());
        optimize_payload(&mut payload);
        assert!(!payload.domain_rules.contains_key("facebook.com"));

        let classifier = Classifier::build(&payload, HeuristicSuffixes).expect("payload should build");

        let result = classifier.classify("https://golfdigest.com/news", "");
        assert_eq!(result.as_tuple(), ("sports", "golf", "single_topic_site"));

        let result = classifier.classify("https://www.nytimes.com/dining/recipe", "");
        assert_eq!(result.reason, Reason::SingleTopicPath);
        assert_eq!(result.sub_level, "cooking");

        let result = classifier.classify("https://example.org/new-putter-review", "");
        assert_eq!(result.as_tuple(), ("sports", "golf", "keyword_matching"));

        let result = classifier.classify("https://www.paypal.com/", "");
        assert_eq!(result.reason, Reason::IgnoredDomain);
    }

    fn sources_with_groups(sites: &str, mapping: &str) -> SourceSet {
        parse_sources(&SourceTexts {
            hierarchy: HIERARCHY,
            domain_rules: RULES,
            keywords: KEYWORDS,
            stopwords: STOPWORDS,
            site_groups: Some((sites, mapping)),
        })
        .expect("sources should parse")
    }

    #[test]
    fn site_groups_reduce_to_registrable_domain() {
        let sites = r#"{"Golf Fans": [
            "www.GolfDigest.com", "https://golfchannel.com/news", "localhost", "www.espn.com"
        ]}"#;
        let (mut payload, stats) = build_payload(&sources_with_groups(sites, MAPPING));
        assert_eq!(payload.domain_rules["golfdigest.com"], "sports/golf");
        assert_eq!(payload.domain_rules["golfchannel.com"], "sports/golf");
        assert!(!payload.domain_rules.contains_key("www.golfdigest.com"));
        assert_eq!(payload.domain_rules["espn.com"], "sports");
        assert_eq!(stats.site_group_rules, 2);
        assert_eq!(stats.skipped_sites, 1);

        optimize_payload(&mut payload);
        let classifier = Classifier::build(&payload, HeuristicSuffixes).expect("payload should build");
        let result = classifier.classify("https://www.golfdigest.com/", "");
        assert_eq!(result.as_tuple(), ("sports", "golf", "single_topic_site"));
    }

    #[test]
    fn site_groups_fill_not_in_use_domains() {
        let sites = r#"{"Social": ["facebook.com"]}"#;
        let mapping = r#"{"Social": "sports/soccer"}"#;
        let (mut payload, stats) = build_payload(&sources_with_groups(sites, mapping));
        assert_eq!(payload.domain_rules["facebook.com"], "sports/soccer");
        assert_eq!(stats.not_in_use_dropped, 1);
        assert_eq!(stats.site_group_rules, 1);

        optimize_payload(&mut payload);
        assert_eq!(payload.domain_rules["facebook.com"], "sports/soccer");
        let classifier = Classifier::build(&payload, HeuristicSuffixes).expect("payload should build");
        let result = classifier.classify("https://facebook.com/", "");
        assert_eq!(result.as_tuple(), ("sports", "soccer", "single_topic_site"));
    }
}
