//! Pass 2: greedy duplication of utterances that carry deficient words.
//!
//! Utterances are visited strictly in corpus order. Each one that
//! contains deficient words is duplicated `need` times, where `need` is
//! the largest remaining deficit among those words (optionally capped),
//! and every one of its deficient words is credited with `need`. Words
//! with a smaller deficit are overspent; that is accepted so the pass
//! stays single and linear. The outcome depends on corpus order, so the
//! pass must never be reordered or split across threads.

use anyhow::{Context, Result};

use super::deficit::DeficitTable;
use super::dup_id;
use crate::language::{Tokenizer, WordFilter};
use crate::types::{SelectedEntry, Utterance};

/// Result of a selection pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionOutcome {
    pub entries: Vec<SelectedEntry>,
    /// Utterances read before the pass ended
    pub scanned: usize,
    /// Pass stopped because every deficit reached zero
    pub terminated_early: bool,
}

/// Distinct deficient words among `words`, first occurrence order.
fn deficient_hits<'w, I>(words: I, deficits: &DeficitTable) -> Vec<&'w str>
where
    I: IntoIterator<Item = &'w str>,
{
    let mut hits: Vec<&str> = Vec::new();
    for w in words {
        if deficits.is_deficient(w) && !hits.contains(&w) {
            hits.push(w);
        }
    }
    hits
}

/// Apply the selection rule to one utterance whose content words are known.
///
/// Appends the duplicates to `out` and returns how many were emitted.
pub fn select_utterance<'w, I>(
    utt: &Utterance,
    words: I,
    deficits: &mut DeficitTable,
    max_dup_per_utt: Option<u64>,
    out: &mut Vec<SelectedEntry>,
) -> u64
where
    I: IntoIterator<Item = &'w str>,
{
    let hits = deficient_hits(words, deficits);
    let Some(mut need) = hits.iter().filter_map(|w| deficits.get(w)).max() else {
        return 0;
    };
    if let Some(cap) = max_dup_per_utt {
        need = need.min(cap);
    }

    out.extend((1..=need).map(|k| SelectedEntry {
        id: dup_id::encode(&utt.id, k),
        text: utt.text.clone(),
        source_id: utt.id.clone(),
    }));
    for w in &hits {
        deficits.consume(w, need);
    }

    log::debug!("{}: {} duplicates for {:?}", utt.id, need, hits);
    need
}

/// Pass-2 driver sharing the pass-1 tokenizer and filter.
pub struct LongTailSelector<'a> {
    tokenizer: &'a dyn Tokenizer,
    filter: &'a WordFilter,
    max_dup_per_utt: Option<u64>,
    verbose_every: usize,
}

impl<'a> LongTailSelector<'a> {
    pub fn new(
        tokenizer: &'a dyn Tokenizer,
        filter: &'a WordFilter,
        max_dup_per_utt: Option<u64>,
        verbose_every: usize,
    ) -> Self {
        Self {
            tokenizer,
            filter,
            max_dup_per_utt,
            verbose_every,
        }
    }

    /// Scan `utterances` in order, consuming `deficits` as entries are chosen.
    ///
    /// Returns as soon as no deficit is left; with nothing to do, no
    /// utterance is read at all.
    pub fn select<I>(&self, utterances: I, deficits: &mut DeficitTable) -> Result<SelectionOutcome>
    where
        I: IntoIterator<Item = Result<Utterance>>,
    {
        let mut outcome = SelectionOutcome::default();
        if deficits.is_satisfied() {
            outcome.terminated_early = true;
            return Ok(outcome);
        }

        for utt in utterances {
            let utt = utt?;
            outcome.scanned += 1;

            let tokens = self
                .tokenizer
                .tokenize(&utt.text)
                .with_context(|| format!("Tokenizer failed on utterance {}", utt.id))?;
            select_utterance(
                &utt,
                self.filter.content_words(&tokens),
                deficits,
                self.max_dup_per_utt,
                &mut outcome.entries,
            );

            if self.verbose_every > 0 && outcome.scanned % self.verbose_every == 0 {
                log::info!(
                    "[pass2] processed {} lines (selected {})",
                    outcome.scanned,
                    outcome.entries.len()
                );
            }

            if deficits.is_satisfied() {
                outcome.terminated_early = true;
                break;
            }
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::language::tokenizer::PretaggedTokenizer;

    fn corpus(lines: &[(&str, &str)]) -> Vec<Result<Utterance>> {
        lines.iter().map(|(id, t)| Ok(Utterance::new(*id, *t))).collect()
    }

    fn ids(entries: &[SelectedEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn test_single_word_fills_deficit_and_stops() {
        let filter = WordFilter::default();
        let selector = LongTailSelector::new(&PretaggedTokenizer, &filter, None, 0);
        let mut deficits = DeficitTable::from_needs([("鹿児島", 7)]);
        let lines = corpus(&[
            ("u1", "鹿児島/名詞 へ/助詞"),
            ("u2", "鹿児島/名詞"),
            ("u3", "鹿児島/名詞"),
        ]);

        let outcome = selector.select(lines, &mut deficits).unwrap();
        assert_eq!(
            ids(&outcome.entries),
            vec!["u1_dup1", "u1_dup2", "u1_dup3", "u1_dup4", "u1_dup5", "u1_dup6", "u1_dup7"]
        );
        assert_eq!(deficits.get("鹿児島"), Some(0));
        assert_eq!(outcome.scanned, 1);
        assert!(outcome.terminated_early);
    }

    #[test]
    fn test_cap_limits_duplicates_and_scan_continues() {
        let filter = WordFilter::default();
        let selector = LongTailSelector::new(&PretaggedTokenizer, &filter, Some(3), 0);
        let mut deficits = DeficitTable::from_needs([("鹿児島", 7)]);
        let lines = corpus(&[
            ("u1", "鹿児島/名詞"),
            ("u2", "天気/名詞"),
            ("u3", "鹿児島/名詞"),
            ("u4", "鹿児島/名詞"),
            ("u5", "鹿児島/名詞"),
        ]);

        let outcome = selector.select(lines, &mut deficits).unwrap();
        let mut per_source: HashMap<&str, usize> = HashMap::new();
        for e in &outcome.entries {
            *per_source.entry(e.source_id.as_str()).or_default() += 1;
        }
        assert_eq!(per_source.get("u1"), Some(&3));
        assert_eq!(per_source.get("u2"), None);
        assert_eq!(per_source.get("u3"), Some(&3));
        assert_eq!(per_source.get("u4"), Some(&1));
        assert_eq!(per_source.get("u5"), None);
        assert_eq!(outcome.entries.len(), 7);
        assert_eq!(outcome.scanned, 4);
        assert!(outcome.terminated_early);
    }

    #[test]
    fn test_cap_after_first_utterance() {
        let mut deficits = DeficitTable::from_needs([("鹿児島", 7)]);
        let mut out = Vec::new();
        let n = select_utterance(
            &Utterance::new("u1", "t"),
            ["鹿児島"],
            &mut deficits,
            Some(3),
            &mut out,
        );
        assert_eq!(n, 3);
        assert_eq!(deficits.get("鹿児島"), Some(4));
        assert!(!deficits.is_satisfied());
    }

    #[test]
    fn test_need_is_max_of_hits_and_overspends() {
        let mut deficits = DeficitTable::from_needs([("a", 5), ("b", 2), ("c", 9)]);
        let mut out = Vec::new();
        let n = select_utterance(
            &Utterance::new("u1", "a b"),
            ["a", "b", "zzz"],
            &mut deficits,
            None,
            &mut out,
        );
        assert_eq!(n, 5);
        assert_eq!(out.len(), 5);
        assert_eq!(deficits.get("a"), Some(0));
        assert_eq!(deficits.get("b"), Some(0));
        assert_eq!(deficits.get("c"), Some(9));
    }

    #[test]
    fn test_repeated_word_is_credited_once() {
        let mut deficits = DeficitTable::from_needs([("a", 5), ("b", 8)]);
        let mut out = Vec::new();
        select_utterance(
            &Utterance::new("u1", "a a b"),
            ["a", "a", "b"],
            &mut deficits,
            Some(2),
            &mut out,
        );
        assert_eq!(out.len(), 2);
        assert_eq!(deficits.get("a"), Some(3));
        assert_eq!(deficits.get("b"), Some(6));
    }

    #[test]
    fn test_no_hits_emits_nothing() {
        let mut deficits = DeficitTable::from_needs([("a", 5), ("z", 0)]);
        let mut out = Vec::new();
        let n = select_utterance(&Utterance::new("u1", "t"), ["b", "z"], &mut deficits, None, &mut out);
        assert_eq!(n, 0);
        assert!(out.is_empty());
        assert_eq!(deficits.get("a"), Some(5));
    }

    #[test]
    fn test_entries_keep_text_and_source() {
        let mut deficits = DeficitTable::from_needs([("a", 2)]);
        let mut out = Vec::new();
        select_utterance(&Utterance::new("spk1-0001", "a/名詞"), ["a"], &mut deficits, None, &mut out);
        for (k, e) in out.iter().enumerate() {
            assert_eq!(e.id, format!("spk1-0001_dup{}", k + 1));
            assert_eq!(e.text, "a/名詞");
            assert_eq!(e.source_id, "spk1-0001");
        }
    }

    #[test]
    fn test_satisfied_words_do_not_trigger_after_stop() {
        let filter = WordFilter::default();
        let selector = LongTailSelector::new(&PretaggedTokenizer, &filter, None, 0);
        let mut deficits = DeficitTable::from_needs([("札幌", 2), ("函館", 1)]);
        let lines = corpus(&[
            ("u1", "札幌/名詞 函館/名詞"),
            ("u2", "札幌/名詞"),
            ("u3", "函館/名詞"),
        ]);

        let outcome = selector.select(lines, &mut deficits).unwrap();
        assert_eq!(ids(&outcome.entries), vec!["u1_dup1", "u1_dup2"]);
        assert_eq!(outcome.scanned, 1);
        assert!(outcome.terminated_early);
    }

    #[test]
    fn test_deficits_never_increase() {
        let filter = WordFilter::default();
        let selector = LongTailSelector::new(&PretaggedTokenizer, &filter, Some(2), 0);
        let mut deficits = DeficitTable::from_needs([("札幌", 4), ("函館", 1), ("仙台", 6)]);
        let before: HashMap<String, u64> =
            deficits.iter().map(|(w, d)| (w.to_string(), d)).collect();
        let lines = corpus(&[
            ("u1", "札幌/名詞 函館/名詞"),
            ("u2", "仙台/名詞 札幌/名詞"),
            ("u3", "函館/名詞"),
        ]);

        selector.select(lines, &mut deficits).unwrap();
        for (w, d) in deficits.iter() {
            assert!(d <= before[w], "{} went from {} to {}", w, before[w], d);
        }
        assert_eq!(deficits.get("札幌"), Some(0));
        assert_eq!(deficits.get("函館"), Some(0));
        assert_eq!(deficits.get("仙台"), Some(4));
    }

    #[test]
    fn test_order_changes_outcome() {
        let filter = WordFilter::default();
        let selector = LongTailSelector::new(&PretaggedTokenizer, &filter, None, 0);
        let forward = corpus(&[("u1", "札幌/名詞 函館/名詞"), ("u2", "函館/名詞")]);
        let backward = corpus(&[("u2", "函館/名詞"), ("u1", "札幌/名詞 函館/名詞")]);

        let mut d1 = DeficitTable::from_needs([("札幌", 3), ("函館", 1)]);
        let mut d2 = d1.clone();
        let a = selector.select(forward, &mut d1).unwrap();
        let b = selector.select(backward, &mut d2).unwrap();
        assert_eq!(a.entries.len(), 3);
        assert_eq!(b.entries.len(), 4);
    }

    #[test]
    fn test_nothing_to_do_reads_nothing() {
        let filter = WordFilter::default();
        let selector = LongTailSelector::new(&PretaggedTokenizer, &filter, None, 0);
        let mut deficits = DeficitTable::from_needs([("札幌", 0)]);
        let lines = corpus(&[("u1", "not tagged")]);

        let outcome = selector.select(lines, &mut deficits).unwrap();
        assert!(outcome.entries.is_empty());
        assert_eq!(outcome.scanned, 0);
    }

    #[test]
    fn test_tokenizer_failure_propagates() {
        let filter = WordFilter::default();
        let selector = LongTailSelector::new(&PretaggedTokenizer, &filter, Some(1), 0);
        let mut deficits = DeficitTable::from_needs([("札幌", 5)]);
        let lines = corpus(&[("u1", "札幌/名詞"), ("u2", "broken"), ("u3", "札幌/名詞")]);

        // u1 leaves 4 outstanding, so the scan must reach u2
        let err = selector.select(lines, &mut deficits).unwrap_err();
        assert!(format!("{:#}", err).contains("u2"));
        assert_eq!(deficits.get("札幌"), Some(4));
    }
}
