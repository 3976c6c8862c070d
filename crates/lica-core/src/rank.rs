//! Tally ranking
//!
//! Turns a keyword tally into a single decision. The top-level with the
//! highest summed count wins outright or not at all; inside the winner the
//! highest sub-level wins, with ties collapsing to `general`.

use crate::lexicon::Tally;
use crate::types::{Category, GENERAL};

/// Outcome of ranking a tally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Nothing in the tally.
    Empty,
    /// Two or more top-levels share the highest sum.
    NoConsensus,
    Winner(Category),
}

/// Rank a tally.
pub fn decide(tally: &Tally) -> Decision {
    let ranking: Vec<(&str, u32)> = tally
        .iter()
        .map(|(top, subs)| (top.as_str(), subs.values().sum()))
        .collect();

    let Some(top_level) = unique_max(&ranking) else {
        return if ranking.is_empty() {
            Decision::Empty
        } else {
            Decision::NoConsensus
        };
    };

    let subs: Vec<(&str, u32)> = tally[top_level]
        .iter()
        .map(|(sub, count)| (sub.as_str(), *count))
        .collect();
    let sub_level = unique_max(&subs).unwrap_or(GENERAL);

    Decision::Winner(Category::new(top_level, sub_level))
}

/// The entry with the strictly highest score, or None on an empty list or a
/// tie at rank one.
fn unique_max<'a>(scores: &[(&'a str, u32)]) -> Option<&'a str> {
    let best = scores.iter().map(|(_, score)| *score).max()?;
    let mut leaders = scores.iter().filter(|(_, score)| *score == best);
    let (name, _) = leaders.next()?;
    if leaders.next().is_some() {
        None
    } else {
        Some(*name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tally(entries: &[(&str, &str, u32)]) -> Tally {
        let mut tally = Tally::new();
        for (top, sub, count) in entries {
            tally
                .entry(top.to_string())
                .or_default()
                .insert(sub.to_string(), *count);
        }
        tally
    }

    #[test]
    fn test_empty() {
        assert_eq!(decide(&Tally::new()), Decision::Empty);
    }

    #[test]
    fn test_single_entry() {
        let t = tally(&[("hobbies & interests", "coins", 1)]);
        assert_eq!(
            decide(&t),
            Decision::Winner(Category::new("hobbies & interests", "coins"))
        );
    }

    #[test]
    fn test_top_level_by_sum() {
        // sports = 3, science = 11
        let t = tally(&[
            ("sports", "golf", 1),
            ("sports", "baseball", 2),
            ("science", "general", 9),
            ("science", "chemistry", 2),
        ]);
        assert_eq!(decide(&t), Decision::Winner(Category::general("science")));
    }

    #[test]
    fn test_top_level_tie() {
        let t = tally(&[("sports", "golf", 2), ("science", "chemistry", 1), ("science", "physics", 1)]);
        assert_eq!(decide(&t), Decision::NoConsensus);
    }

    #[test]
    fn test_tie_below_rank_one_is_fine() {
        let t = tally(&[("sports", "golf", 3), ("science", "chemistry", 1), ("travel", "general", 1)]);
        assert_eq!(decide(&t), Decision::Winner(Category::new("sports", "golf")));
    }

    #[test]
    fn test_sub_level_tie_is_general() {
        let t = tally(&[("sports", "golf", 2), ("sports", "soccer", 2), ("sports", "tennis", 1)]);
        assert_eq!(decide(&t), Decision::Winner(Category::general("sports")));
    }
}
