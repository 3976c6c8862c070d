//! Rule store
//!
//! Three independent structural indexes plus the ignore list, all keyed on
//! the registrable domain:
//!
//! - domain rules: the whole site is single-topic
//! - host rules: a trie over subdomain labels per domain
//! - path rules: the first path segment per domain
//!
//! Built once from a [`RulePayload`]; read-only afterwards.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::error::{PayloadProblem, Problems, Section};
use crate::payload::RulePayload;
use crate::psl::SuffixList;
use crate::taxonomy::Taxonomy;
use crate::types::{Category, Reason};
use crate::url::{decompose_rule_key, ParsedUrl};

// =============================================================================
// Host Trie
// =============================================================================

/// Host-rule trie node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostNode {
    /// More labels follow.
    Interior(HashMap<String, HostNode>),
    /// A rule ends here.
    Terminal(Category),
}

/// Subdomain trie for one registrable domain.
///
/// Labels are stored in host order: `au.movies.yahoo.com` is the path
/// `au -> movies` under `yahoo.com`, so `movies.yahoo.com` is a separate
/// root entry and never shares a node with it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostTrie {
    root: HashMap<String, HostNode>,
}

/// Why a host rule could not be inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertConflict {
    /// The rule passes through or ends on a terminal of another rule, or ends
    /// on an interior node, or repeats a rule with another category.
    Overlap,
}

impl HostTrie {
    /// Insert a rule for `labels` given in host order (`["au", "movies"]`).
    pub fn insert(&mut self, labels: &[String], category: Category) -> Result<(), InsertConflict> {
        let mut iter = labels.iter().peekable();
        let mut level = &mut self.root;

        while let Some(label) = iter.next() {
            if iter.peek().is_none() {
                let conflict = match level.get(label) {
                    None => false,
                    Some(HostNode::Terminal(existing)) => *existing != category,
                    Some(HostNode::Interior(_)) => true,
                };
                if conflict {
                    return Err(InsertConflict::Overlap);
                }
                level
                    .entry(label.clone())
                    .or_insert(HostNode::Terminal(category));
                return Ok(());
            }

            let node = level
                .entry(label.clone())
                .or_insert_with(|| HostNode::Interior(HashMap::new()));
            level = match node {
                HostNode::Interior(children) => children,
                HostNode::Terminal(_) => return Err(InsertConflict::Overlap),
            };
        }

        // Empty label sequences never reach here with a category attached
        Err(InsertConflict::Overlap)
    }

    /// Look up `labels` given in host order. Every label must be consumed and
    /// the walk must end on a terminal.
    pub fn lookup(&self, labels: &[String]) -> Option<&Category> {
        let mut iter = labels.iter();
        let mut node = self.root.get(iter.next()?)?;

        for label in iter {
            node = match node {
                HostNode::Interior(children) => children.get(label)?,
                HostNode::Terminal(_) => return None,
            };
        }

        match node {
            HostNode::Terminal(category) => Some(category),
            HostNode::Interior(_) => None,
        }
    }

    /// Number of terminal rules.
    pub fn len(&self) -> usize {
        fn count(level: &HashMap<String, HostNode>) -> usize {
            level
                .values()
                .map(|node| match node {
                    HostNode::Terminal(_) => 1,
                    HostNode::Interior(children) => count(children),
                })
                .sum()
        }
        count(&self.root)
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }
}

// =============================================================================
// Rule Store
// =============================================================================

/// Entry counts for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuleStats {
    pub domain_rules: usize,
    pub host_rules: usize,
    pub path_rules: usize,
    pub ignore_domains: usize,
}

/// Compiled structural rules.
#[derive(Debug, Default)]
pub struct RuleStore {
    domain_rules: HashMap<String, Category>,
    host_rules: HashMap<String, HostTrie>,
    path_rules: HashMap<String, HashMap<String, Category>>,
    ignore_domains: HashMap<String, BTreeSet<String>>,
}

impl RuleStore {
    pub(crate) fn build<S>(payload: &RulePayload, taxonomy: &Taxonomy, suffixes: &S) -> (Self, Problems)
    where
        S: SuffixList + ?Sized,
    {
        let mut problems = Problems::default();
        let mut store = Self::default();

        let rules = resolve_rules(Section::DomainRules, &payload.domain_rules, taxonomy, suffixes, &mut problems);
        for (key, parsed, category) in rules {
            if !parsed.subdomain_labels.is_empty() || !parsed.path_segments.is_empty() {
                problems.push(PayloadProblem::NotRegistrableDomain { key: key.to_string() });
                continue;
            }
            store.domain_rules.insert(parsed.registrable_domain, category);
        }

        let rules = resolve_rules(Section::HostRules, &payload.host_rules, taxonomy, suffixes, &mut problems);
        for (key, parsed, category) in rules {
            if parsed.subdomain_labels.is_empty() {
                problems.push(PayloadProblem::EmptyHostRule { key: key.to_string() });
                continue;
            }
            let trie = store.host_rules.entry(parsed.registrable_domain).or_default();
            if trie.insert(&parsed.subdomain_labels, category).is_err() {
                problems.push(PayloadProblem::ConflictingHostRule { key: key.to_string() });
            }
        }

        let rules = resolve_rules(Section::PathRules, &payload.path_rules, taxonomy, suffixes, &mut problems);
        for (key, parsed, category) in rules {
            let Some(segment) = parsed.path_segments.first() else {
                problems.push(PayloadProblem::EmptyPathRule { key: key.to_string() });
                continue;
            };
            let segments = store.path_rules.entry(parsed.registrable_domain).or_default();
            if segments.get(segment).is_some_and(|existing| *existing != category) {
                problems.push(PayloadProblem::ConflictingPathRule { key: key.to_string() });
            } else {
                segments.insert(segment.clone(), category);
            }
        }

        for (domain, suffixes) in &payload.ignore_domains {
            let suffixes = suffixes.iter().map(|s| s.trim().to_lowercase()).collect();
            store.ignore_domains.insert(domain.trim().to_lowercase(), suffixes);
        }

        let stats = store.stats();
        log::debug!(
            "rule store: {} domain, {} host, {} path rules, {} ignored domains",
            stats.domain_rules,
            stats.host_rules,
            stats.path_rules,
            stats.ignore_domains
        );

        (store, problems)
    }

    /// True if the domain is on the ignore list for this URL's suffix.
    ///
    /// Ignore entries are keyed by registrable domain or by bare domain name.
    pub fn is_blacklisted(&self, parsed: &ParsedUrl) -> bool {
        [parsed.registrable_domain.as_str(), parsed.domain_name()]
            .iter()
            .filter_map(|key| self.ignore_domains.get(*key))
            .any(|suffixes| suffixes.contains(&parsed.public_suffix))
    }

    /// Whole-site rule.
    pub fn match_domain(&self, parsed: &ParsedUrl) -> Option<(&Category, Reason)> {
        self.domain_rules
            .get(&parsed.registrable_domain)
            .map(|category| (category, Reason::SingleTopicSite))
    }

    /// Subdomain rule; the full label sequence must match.
    pub fn match_host(&self, parsed: &ParsedUrl) -> Option<(&Category, Reason)> {
        if parsed.subdomain_labels.is_empty() {
            return None;
        }
        self.host_rules
            .get(&parsed.registrable_domain)?
            .lookup(&parsed.subdomain_labels)
            .map(|category| (category, Reason::SingleTopicSubdomain))
    }

    /// First-path-segment rule. Deeper segments never matter.
    pub fn match_path(&self, parsed: &ParsedUrl) -> Option<(&Category, Reason)> {
        let segment = parsed.first_segment()?;
        self.path_rules
            .get(&parsed.registrable_domain)?
            .get(segment)
            .map(|category| (category, Reason::SingleTopicPath))
    }

    pub fn stats(&self) -> RuleStats {
        RuleStats {
            domain_rules: self.domain_rules.len(),
            host_rules: self.host_rules.values().map(HostTrie::len).sum(),
            path_rules: self.path_rules.values().map(HashMap::len).sum(),
            ignore_domains: self.ignore_domains.len(),
        }
    }
}

/// Resolve labels and parse keys for one rule section, recording every failure.
fn resolve_rules<'p, S>(
    section: Section,
    rules: &'p BTreeMap<String, String>,
    taxonomy: &Taxonomy,
    suffixes: &S,
    problems: &mut Problems,
) -> Vec<(&'p str, ParsedUrl, Category)>
where
    S: SuffixList + ?Sized,
{
    let mut out = Vec::with_capacity(rules.len());
    for (key, label) in rules {
        let category = taxonomy.resolve(label);
        if category.is_none() {
            problems.push(PayloadProblem::UnknownLabel {
                section,
                key: key.clone(),
                label: label.clone(),
            });
        }

        match decompose_rule_key(key, suffixes) {
            Ok(parsed) => {
                if let Some(category) = category {
                    out.push((key.as_str(), parsed, category));
                }
            }
            Err(source) => problems.push(PayloadProblem::InvalidRuleUrl {
                section,
                key: key.clone(),
                source,
            }),
        }
    }
    out
}
