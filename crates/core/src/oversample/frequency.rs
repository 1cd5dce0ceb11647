//! Pass 1: count content words over the whole corpus.

use std::collections::HashMap;

use anyhow::{Context, Result};

use crate::language::{Tokenizer, WordFilter};
use crate::types::Utterance;

/// Corpus-wide occurrence count per content word.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: HashMap<String, u64>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one occurrence of `word`.
    pub fn add(&mut self, word: &str) {
        if let Some(c) = self.counts.get_mut(word) {
            *c += 1;
        } else {
            self.counts.insert(word.to_string(), 1);
        }
    }

    /// Occurrences of `word`; 0 if it was never seen.
    pub fn get(&self, word: &str) -> u64 {
        self.counts.get(word).copied().unwrap_or(0)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.counts.contains_key(word)
    }

    /// Number of distinct words.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(w, c)| (w.as_str(), *c))
    }
}

impl<S: Into<String>> FromIterator<(S, u64)> for FrequencyTable {
    fn from_iter<I: IntoIterator<Item = (S, u64)>>(iter: I) -> Self {
        Self {
            counts: iter.into_iter().map(|(w, c)| (w.into(), c)).collect(),
        }
    }
}

/// Streaming pass-1 counter.
///
/// Holds only the growing table, never the corpus.
pub struct FrequencyCounter<'a> {
    tokenizer: &'a dyn Tokenizer,
    filter: &'a WordFilter,
    verbose_every: usize,
    table: FrequencyTable,
    processed: usize,
}

impl<'a> FrequencyCounter<'a> {
    pub fn new(tokenizer: &'a dyn Tokenizer, filter: &'a WordFilter, verbose_every: usize) -> Self {
        Self {
            tokenizer,
            filter,
            verbose_every,
            table: FrequencyTable::new(),
            processed: 0,
        }
    }

    /// Tokenize one utterance and count its content words.
    pub fn observe(&mut self, utt: &Utterance) -> Result<()> {
        let tokens = self
            .tokenizer
            .tokenize(&utt.text)
            .with_context(|| format!("Tokenizer failed on utterance {}", utt.id))?;
        for word in self.filter.content_words(&tokens) {
            self.table.add(word);
        }

        self.processed += 1;
        if self.verbose_every > 0 && self.processed % self.verbose_every == 0 {
            log::info!("[pass1] processed {} lines", self.processed);
        }
        Ok(())
    }

    pub fn processed(&self) -> usize {
        self.processed
    }

    /// Return the table and the number of utterances seen.
    pub fn finish(self) -> (FrequencyTable, usize) {
        (self.table, self.processed)
    }
}

/// Run pass 1 over `utterances`.
///
/// A read or tokenizer error aborts the count.
pub fn count_frequencies<I>(
    utterances: I,
    tokenizer: &dyn Tokenizer,
    filter: &WordFilter,
    verbose_every: usize,
) -> Result<(FrequencyTable, usize)>
where
    I: IntoIterator<Item = Result<Utterance>>,
{
    let mut counter = FrequencyCounter::new(tokenizer, filter, verbose_every);
    for utt in utterances {
        counter.observe(&utt?)?;
    }
    Ok(counter.finish())
}
