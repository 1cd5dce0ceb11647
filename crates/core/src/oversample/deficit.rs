//! Long-tail word set and per-word deficits.

use std::collections::{HashMap, HashSet};

use super::frequency::FrequencyTable;

/// Words whose corpus frequency is at or below the threshold.
pub type LongTailSet = HashSet<String>;

/// Remaining occurrences each long-tail word still needs.
///
/// Values only ever go down and stop at zero.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DeficitTable {
    remaining: HashMap<String, u64>,
    /// Number of words with a positive remaining deficit
    outstanding: usize,
}

impl DeficitTable {
    /// Build a table from explicit `(word, deficit)` pairs.
    pub fn from_needs<I, S>(needs: I) -> Self
    where
        I: IntoIterator<Item = (S, u64)>,
        S: Into<String>,
    {
        let remaining: HashMap<String, u64> =
            needs.into_iter().map(|(w, d)| (w.into(), d)).collect();
        let outstanding = remaining.values().filter(|&&d| d > 0).count();
        Self {
            remaining,
            outstanding,
        }
    }

    /// Remaining deficit of `word`, `None` if it is not a long-tail word.
    pub fn get(&self, word: &str) -> Option<u64> {
        self.remaining.get(word).copied()
    }

    /// True if `word` still needs occurrences.
    pub fn is_deficient(&self, word: &str) -> bool {
        self.get(word).is_some_and(|d| d > 0)
    }

    /// Lower the deficit of `word` by `amount`, flooring at zero.
    ///
    /// Returns the new value. Unknown words are left alone and report 0.
    pub fn consume(&mut self, word: &str, amount: u64) -> u64 {
        let Some(d) = self.remaining.get_mut(word) else {
            return 0;
        };
        if *d > 0 {
            *d = d.saturating_sub(amount);
            if *d == 0 {
                self.outstanding -= 1;
            }
        }
        *d
    }

    /// True once no word has a positive deficit.
    pub fn is_satisfied(&self) -> bool {
        self.outstanding == 0
    }

    /// Number of words that still need occurrences.
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    /// Sum of all remaining deficits.
    pub fn total(&self) -> u64 {
        self.remaining.values().sum()
    }

    /// Number of tracked long-tail words, satisfied ones included.
    pub fn len(&self) -> usize {
        self.remaining.len()
    }

    pub fn is_empty(&self) -> bool {
        self.remaining.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.remaining.iter().map(|(w, d)| (w.as_str(), *d))
    }
}

/// Words seen at most `threshold` times.
///
/// Only observed words can qualify; a word absent from the table has no
/// utterance that could be duplicated for it.
pub fn long_tail_set(freq: &FrequencyTable, threshold: u64) -> LongTailSet {
    freq.iter()
        .filter(|&(_, count)| count <= threshold)
        .map(|(word, _)| word.to_string())
        .collect()
}

/// `max(0, target - freq[w])` for every long-tail word.
pub fn compute_deficits(freq: &FrequencyTable, long_tail: &LongTailSet, target_count: u64) -> DeficitTable {
    DeficitTable::from_needs(
        long_tail
            .iter()
            .map(|w| (w.clone(), target_count.saturating_sub(freq.get(w)))),
    )
}
