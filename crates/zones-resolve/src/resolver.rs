//! Two-pass greedy entity resolution.
//!
//! Pass 1 pairs labels that are spelled identically. Pass 2 pairs each
//! remaining left label with the nearest remaining right label by
//! Levenshtein distance. Every right label is used at most once, so the
//! outcome depends on the order of both inputs.

use std::collections::BTreeMap;

use rapidfuzz::distance::levenshtein;
use serde::Serialize;
use tracing::debug;

/// How a pair was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    Exact,
    Nearest,
}

/// One resolved label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchedPair {
    pub left: String,
    pub right: String,
    /// Levenshtein distance between the two labels.
    pub distance: usize,
    pub kind: MatchKind,
}

/// Pairs in the order they were recorded: all exact pairs, then nearest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResolutionMapping {
    pairs: Vec<MatchedPair>,
}

impl ResolutionMapping {
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn pairs(&self) -> &[MatchedPair] {
        &self.pairs
    }

    pub fn iter(&self) -> impl Iterator<Item = &MatchedPair> {
        self.pairs.iter()
    }

    /// The label `left` resolved to. For a repeated left label the last
    /// recorded pair wins.
    pub fn get(&self, left: &str) -> Option<&str> {
        self.pairs
            .iter()
            .rev()
            .find(|pair| pair.left == left)
            .map(|pair| pair.right.as_str())
    }

    /// Left label to right label, last pair winning for repeated keys.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.pairs
            .iter()
            .map(|pair| (pair.left.clone(), pair.right.clone()))
            .collect()
    }

    pub fn count(&self, kind: MatchKind) -> usize {
        self.pairs.iter().filter(|pair| pair.kind == kind).count()
    }
}

impl<'a> IntoIterator for &'a ResolutionMapping {
    type Item = &'a MatchedPair;
    type IntoIter = std::slice::Iter<'a, MatchedPair>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.iter()
    }
}

/// Levenshtein distance over Unicode scalar values, without normalization.
pub fn edit_distance(a: &str, b: &str) -> usize {
    levenshtein::distance(a.chars(), b.chars())
}

/// Resolves `left` labels against `right` labels.
///
/// The result holds at most `min(left.len(), right.len())` pairs and never
/// uses a right label twice. Ties in pass 2 go to the earliest remaining
/// right label.
pub fn resolve<L, R>(left: &[L], right: &[R]) -> ResolutionMapping
where
    L: AsRef<str>,
    R: AsRef<str>,
{
    let mut left_pool: Vec<usize> = (0..left.len()).collect();
    let mut right_pool: Vec<usize> = (0..right.len()).collect();
    let mut pairs = Vec::new();

    let mut consumed = vec![false; left.len()];
    for &i in &left_pool {
        if right_pool.is_empty() {
            break;
        }
        let label = left[i].as_ref();
        if let Some(pos) = right_pool.iter().position(|&j| right[j].as_ref() == label) {
            let j = right_pool.remove(pos);
            pairs.push(MatchedPair {
                left: label.to_string(),
                right: right[j].as_ref().to_string(),
                distance: 0,
                kind: MatchKind::Exact,
            });
            consumed[i] = true;
        }
    }
    // Consumed left labels leave the pool only once the whole pass is done.
    left_pool.retain(|&i| !consumed[i]);
    debug!(exact = pairs.len(), "exact pass complete");

    for &i in &left_pool {
        if right_pool.is_empty() {
            break;
        }
        let label = left[i].as_ref();
        let mut best: Option<(usize, usize)> = None;
        for (pos, &j) in right_pool.iter().enumerate() {
            let distance = edit_distance(label, right[j].as_ref());
            if best.is_none_or(|(_, min)| distance < min) {
                best = Some((pos, distance));
            }
        }
        if let Some((pos, distance)) = best {
            let j = right_pool.remove(pos);
            pairs.push(MatchedPair {
                left: label.to_string(),
                right: right[j].as_ref().to_string(),
                distance,
                kind: MatchKind::Nearest,
            });
        }
    }
    debug!(
        pairs = pairs.len(),
        unmatched_left = left.len() - pairs.len(),
        "nearest pass complete"
    );

    ResolutionMapping { pairs }
}
