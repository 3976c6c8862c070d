//! Classifier
//!
//! Composes the taxonomy, rule store and lexicon into the single
//! `classify(url, title)` entry point. A built [`Classifier`] is immutable;
//! share it freely (`&Classifier` or `Arc<Classifier>`) across threads.

use serde::{Deserialize, Serialize};

use crate::error::{BuildError, Problems};
use crate::lexicon::{tokenize, with_bigrams, Lexicon, Tally};
use crate::payload::RulePayload;
use crate::psl::SuffixList;
use crate::rank::{decide, Decision};
use crate::rules::{RuleStats, RuleStore};
use crate::taxonomy::Taxonomy;
use crate::types::{
    Classification, Reason, SchemeMask, IGNORED, INVALID_DATA, INVALID_URL, NO_CONSENSUS, UNKNOWN,
};
use crate::url::decompose;

/// Tunables fixed at build time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierOptions {
    /// Also score adjacent-word pairs (`"real estate"`).
    pub bigrams: bool,
    /// URL schemes accepted by `classify`.
    pub schemes: SchemeMask,
}

impl Default for ClassifierOptions {
    fn default() -> Self {
        Self {
            bigrams: true,
            schemes: SchemeMask::default(),
        }
    }
}

/// A classification together with the keyword evidence behind it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Explanation {
    pub classification: Classification,
    /// Tokens considered by the keyword fallback, bigrams included. Empty
    /// when a structural rule decided.
    pub tokens: Vec<String>,
    /// Keyword hits; empty unless the keyword fallback ran to a tally.
    pub tally: Tally,
}

impl Explanation {
    fn decided(classification: Classification) -> Self {
        Self {
            classification,
            tokens: Vec::new(),
            tally: Tally::new(),
        }
    }
}

/// Compiled, read-only classifier.
pub struct Classifier {
    taxonomy: Taxonomy,
    rules: RuleStore,
    lexicon: Lexicon,
    suffixes: Box<dyn SuffixList + Send + Sync>,
    options: ClassifierOptions,
}

impl std::fmt::Debug for Classifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Classifier")
            .field("taxonomy_labels", &self.taxonomy.len())
            .field("rules", &self.rules.stats())
            .field("keywords", &self.lexicon.keyword_count())
            .field("options", &self.options)
            .finish()
    }
}

impl Classifier {
    /// Build with default options.
    pub fn build<S>(payload: &RulePayload, suffixes: S) -> Result<Self, BuildError>
    where
        S: SuffixList + Send + Sync + 'static,
    {
        Self::build_with_options(payload, suffixes, ClassifierOptions::default())
    }

    /// Compile every index from `payload`.
    ///
    /// All sections are checked before failing, so the error lists every
    /// inconsistency in the payload at once.
    pub fn build_with_options<S>(
        payload: &RulePayload,
        suffixes: S,
        options: ClassifierOptions,
    ) -> Result<Self, BuildError>
    where
        S: SuffixList + Send + Sync + 'static,
    {
        let mut problems = Problems::default();

        let (taxonomy, taxonomy_problems) = Taxonomy::build(&payload.taxonomy);
        problems.extend(taxonomy_problems);

        let (rules, rule_problems) = RuleStore::build(payload, &taxonomy, &suffixes);
        problems.extend(rule_problems);

        let (lexicon, lexicon_problems) = Lexicon::build(payload, &taxonomy);
        problems.extend(lexicon_problems);

        problems.into_result(Self {
            taxonomy,
            rules,
            lexicon,
            suffixes: Box::new(suffixes),
            options,
        })
    }

    /// Classify a URL and/or page title. Either may be empty, not both.
    pub fn classify(&self, url: &str, title: &str) -> Classification {
        self.explain(url, title).classification
    }

    /// Same cascade as [`classify`](Self::classify), keeping the keyword
    /// evidence.
    pub fn explain(&self, url: &str, title: &str) -> Explanation {
        let url = url.trim();
        let title = title.trim();

        if url.is_empty() && title.is_empty() {
            return Explanation::decided(Classification::uncategorized(INVALID_DATA, Reason::EmptyValues));
        }

        if !url.is_empty() {
            let parsed = match decompose(url, &self.suffixes, self.options.schemes) {
                Ok(parsed) => parsed,
                Err(e) => {
                    return Explanation::decided(Classification::uncategorized(
                        INVALID_URL,
                        Reason::InvalidUrl(e.to_string()),
                    ));
                }
            };

            if self.rules.is_blacklisted(&parsed) {
                return Explanation::decided(Classification::uncategorized(IGNORED, Reason::IgnoredDomain));
            }

            let structural = self
                .rules
                .match_domain(&parsed)
                .or_else(|| self.rules.match_host(&parsed))
                .or_else(|| self.rules.match_path(&parsed));

            if let Some((category, reason)) = structural {
                return Explanation::decided(Classification::categorized(category, reason));
            }
        }

        self.match_keywords(url, title)
    }

    fn match_keywords(&self, url: &str, title: &str) -> Explanation {
        let mut tokens = tokenize(url, title);
        if self.options.bigrams {
            tokens = with_bigrams(tokens);
        }

        // Checked on the unfiltered stream so stopword removal can't hide it
        if self.lexicon.contains_sensitive(&tokens) {
            return Explanation {
                classification: Classification::uncategorized(IGNORED, Reason::IgnoredWords),
                tokens,
                tally: Tally::new(),
            };
        }

        let tally = self.lexicon.tally(&tokens);
        log::trace!("tally for {:?}: {:?}", url, tally);

        let classification = match decide(&tally) {
            Decision::Empty => Classification::uncategorized(UNKNOWN, Reason::KeywordMatching),
            Decision::NoConsensus => Classification::uncategorized(NO_CONSENSUS, Reason::KeywordMatching),
            Decision::Winner(category) => Classification::categorized(&category, Reason::KeywordMatching),
        };

        Explanation {
            classification,
            tokens,
            tally,
        }
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    pub fn options(&self) -> ClassifierOptions {
        self.options
    }

    pub fn rule_stats(&self) -> RuleStats {
        self.rules.stats()
    }

    pub fn keyword_count(&self) -> usize {
        self.lexicon.keyword_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{fixture_payload, suffix_list};
    use crate::types::{Category, UNCATEGORIZED};

    fn classifier() -> Classifier {
        Classifier::build(&fixture_payload(), suffix_list()).unwrap()
    }

    fn triple(c: &Classification) -> (&str, &str, &str) {
        c.as_tuple()
    }

    #[test]
    fn test_keyword_scenario() {
        let c = classifier().classify(
            "http://www.coinweek.com/us-coins/the-marvelous-pogue-family-coin-collection/",
            "",
        );
        assert_eq!(triple(&c), ("hobbies & interests", "coins", "keyword_matching"));
    }

    #[test]
    fn test_single_topic_site() {
        let c = classifier().classify("http://taste.com.au", "");
        assert_eq!(triple(&c), ("food & drink", "cooking", "single_topic_site"));
    }

    #[test]
    fn test_single_topic_subdomain() {
        let c = classifier().classify("http://soccerblog.dallasnews.com", "");
        assert_eq!(triple(&c), ("sports", "soccer", "single_topic_subdomain"));
    }

    #[test]
    fn test_single_topic_path() {
        let classifier = classifier();
        let expected = ("automotive", "general", "single_topic_path");
        assert_eq!(triple(&classifier.classify("http://csmonitor.com/In-Gear", "")), expected);
        assert_eq!(triple(&classifier.classify("http://csmonitor.com/In-Gear/extra", "")), expected);
        assert_eq!(
            triple(&classifier.classify("http://something.csmonitor.com/In-Gear/something.html", "")),
            expected
        );
    }

    #[test]
    fn test_invalid_inputs() {
        let classifier = classifier();
        assert_eq!(
            triple(&classifier.classify("", "")),
            ("uncategorized", "invalid_data", "empty_values")
        );
        assert_eq!(
            triple(&classifier.classify("   ", "")),
            ("uncategorized", "invalid_data", "empty_values")
        );

        let c = classifier.classify("not-a-url-no-scheme", "");
        assert_eq!(c.top_level, UNCATEGORIZED);
        assert_eq!(c.sub_level, INVALID_URL);
        assert_eq!(c.reason.to_string(), "no valid url scheme found");

        let c = classifier.classify("http://localhost:5000/", "");
        assert_eq!(c.sub_level, INVALID_URL);
    }

    #[test]
    fn test_invalid_url_never_falls_back_to_title() {
        let c = classifier().classify("something.something.com", "rare coins for sale");
        assert_eq!(c.sub_level, INVALID_URL);
    }

    #[test]
    fn test_title_only_uses_keywords() {
        let c = classifier().classify("", "Golf swing tips for the weekend");
        assert_eq!(triple(&c), ("sports", "golf", "keyword_matching"));
    }

    #[test]
    fn test_ignored_domain_beats_everything() {
        let classifier = classifier();
        let c = classifier.classify("https://www.paypal.com/golf/coins", "golf coins");
        assert_eq!(triple(&c), ("uncategorized", "ignored", "ignored_domain"));
    }

    #[test]
    fn test_domain_rule_beats_keywords() {
        let c = classifier().classify("http://taste.com.au/golf/golf/golf", "golf");
        assert_eq!(c.reason, Reason::SingleTopicSite);
    }

    #[test]
    fn test_host_rule_requires_full_sequence() {
        let c = classifier().classify("http://extra.soccerblog.dallasnews.com", "");
        assert_ne!(c.reason, Reason::SingleTopicSubdomain);
    }

    #[test]
    fn test_sensitive_words() {
        let classifier = classifier();
        let c = classifier.classify("https://coinweek.com/login", "coins");
        assert_eq!(triple(&c), ("uncategorized", "ignored", "ignored_words"));

        // Also a content stopword in this payload; still caught
        let mut payload = fixture_payload();
        payload.stopwords.content.push("password".into());
        let classifier = Classifier::build(&payload, suffix_list()).unwrap();
        let c = classifier.classify("", "reset your password coins");
        assert_eq!(c.reason, Reason::IgnoredWords);
    }

    #[test]
    fn test_unknown_and_no_consensus() {
        let classifier = classifier();
        let c = classifier.classify("http://example.com/nothing-here", "");
        assert_eq!(triple(&c), ("uncategorized", "unknown", "keyword_matching"));

        let c = classifier.classify("http://example.com/golf/coins", "");
        assert_eq!(triple(&c), ("uncategorized", "no_consensus", "keyword_matching"));
    }

    #[test]
    fn test_sub_level_tie_is_general() {
        let c = classifier().classify("http://example.com/golf/soccer", "");
        assert_eq!(triple(&c), ("sports", "general", "keyword_matching"));
    }

    #[test]
    fn test_bigram_option() {
        let url = "http://example.com/real-estate";
        let with = classifier().classify(url, "");
        assert_eq!(triple(&with), ("home & garden", "real estate", "keyword_matching"));

        let options = ClassifierOptions {
            bigrams: false,
            ..ClassifierOptions::default()
        };
        let without = Classifier::build_with_options(&fixture_payload(), suffix_list(), options)
            .unwrap()
            .classify(url, "");
        assert_eq!(without.sub_level, UNKNOWN);
    }

    #[test]
    fn test_scheme_option() {
        let options = ClassifierOptions {
            schemes: SchemeMask::WEB | SchemeMask::FTP,
            ..ClassifierOptions::default()
        };
        let classifier = Classifier::build_with_options(&fixture_payload(), suffix_list(), options).unwrap();
        let c = classifier.classify("ftp://taste.com.au/pub", "");
        assert_eq!(c.reason, Reason::SingleTopicSite);
    }

    #[test]
    fn test_results_stay_inside_taxonomy() {
        let classifier = classifier();
        let inputs = [
            ("http://www.coinweek.com/us-coins/", ""),
            ("http://example.com/golf/golf/soccer", ""),
            ("http://example.com/real-estate", "golf"),
            ("", "coins and numismatics"),
            ("http://au.movies.yahoo.com/", ""),
        ];
        for (url, title) in inputs {
            let c = classifier.classify(url, title);
            if c.is_categorized() {
                assert!(classifier
                    .taxonomy()
                    .contains(&Category::new(c.top_level.clone(), c.sub_level.clone())));
            }
        }
    }

    #[test]
    fn test_idempotent() {
        let classifier = classifier();
        let url = "http://example.com/golf/soccer/coins";
        assert_eq!(classifier.classify(url, "x"), classifier.classify(url, "x"));
    }

    #[test]
    fn test_explain_keeps_tally() {
        let explanation = classifier().explain("http://example.com/golf/golf/soccer", "");
        assert_eq!(explanation.tally["sports"]["golf"], 2);
        assert!(explanation.tokens.contains(&"golf soccer".to_string()));
        assert_eq!(explanation.classification.sub_level, "golf");

        let explanation = classifier().explain("http://taste.com.au", "");
        assert!(explanation.tally.is_empty());
        assert!(explanation.tokens.is_empty());
    }

    #[test]
    fn test_build_fails_atomically() {
        let mut payload = fixture_payload();
        payload.domain_rules.insert("example.org".into(), "knitting".into());
        payload.keywords.insert("crochet".into(), vec!["hook".into()]);
        match Classifier::build(&payload, suffix_list()) {
            Err(BuildError::InvalidPayload(problems)) => assert_eq!(problems.len(), 2),
            other => panic!("expected payload error, got {:?}", other),
        }
    }

    #[test]
    fn test_shared_across_threads() {
        let classifier = std::sync::Arc::new(classifier());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let classifier = std::sync::Arc::clone(&classifier);
                std::thread::spawn(move || classifier.classify("http://soccerblog.dallasnews.com", "").reason)
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), Reason::SingleTopicSubdomain);
        }
    }
}
