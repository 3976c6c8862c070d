//! Taxonomy index
//!
//! Resolves the category labels used throughout the payload into canonical
//! [`Category`] pairs. Built once from the raw hierarchy
//! (`top-level -> [sub-level, ...]`).

use std::collections::{BTreeMap, HashMap};

use crate::error::{PayloadProblem, Problems};
use crate::types::{Category, GENERAL};

/// Label -> category lookup.
#[derive(Debug, Default)]
pub struct Taxonomy {
    labels: HashMap<String, Category>,
    hierarchy: BTreeMap<String, Vec<String>>,
}

impl Taxonomy {
    /// Build the index. Labels are case-insensitive.
    ///
    /// A sub-level listed under two top-levels, or sharing a name with a
    /// top-level, is reported as a duplicate. `general` is implicit under
    /// every top-level and skipped if listed.
    pub(crate) fn build(raw: &BTreeMap<String, Vec<String>>) -> (Self, Problems) {
        let mut problems = Problems::default();
        let mut labels: HashMap<String, Category> = HashMap::new();
        let mut hierarchy = BTreeMap::new();

        for top in raw.keys() {
            let top = normalize_label(top);
            labels.insert(top.clone(), Category::general(top));
        }

        for (top, subs) in raw {
            let top = normalize_label(top);
            let mut kept = Vec::with_capacity(subs.len());

            for sub in subs {
                let sub = normalize_label(sub);
                if sub.is_empty() || sub == GENERAL {
                    continue;
                }
                if labels.contains_key(&sub) {
                    problems.push(PayloadProblem::DuplicateLabel { label: sub });
                    continue;
                }
                labels.insert(sub.clone(), Category::new(top.clone(), sub.clone()));
                kept.push(sub);
            }

            hierarchy.insert(top, kept);
        }

        log::debug!(
            "taxonomy: {} top-levels, {} labels",
            hierarchy.len(),
            labels.len()
        );

        (Self { labels, hierarchy }, problems)
    }

    /// Resolve a label.
    ///
    /// Accepts a top-level name (resolves to `general`), a sub-level name, or
    /// a qualified `top/sub` label.
    pub fn resolve(&self, label: &str) -> Option<Category> {
        let label = normalize_label(label);

        if let Some(category) = self.labels.get(&label) {
            return Some(category.clone());
        }

        let (top, sub) = label.split_once('/')?;
        let (top, sub) = (top.trim(), sub.trim());
        let subs = self.hierarchy.get(top)?;
        if sub == GENERAL || subs.iter().any(|s| s == sub) {
            Some(Category::new(top, sub))
        } else {
            None
        }
    }

    /// Whether a category exists in this taxonomy.
    pub fn contains(&self, category: &Category) -> bool {
        match self.hierarchy.get(&category.top_level) {
            Some(subs) => category.is_general() || subs.contains(&category.sub_level),
            None => false,
        }
    }

    pub fn top_levels(&self) -> impl Iterator<Item = &str> {
        self.hierarchy.keys().map(|s| s.as_str())
    }

    /// Sub-levels of a top-level, excluding the implicit `general`.
    pub fn sub_levels(&self, top_level: &str) -> Option<&[String]> {
        self.hierarchy.get(top_level).map(|v| v.as_slice())
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

fn normalize_label(label: &str) -> String {
    label.trim().to_lowercase()
}
