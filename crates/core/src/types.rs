use serde::{Deserialize, Serialize};

/// One transcribed unit of audio from a text manifest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Utterance {
    pub id: String,
    /// Transcript, surrounding whitespace trimmed
    pub text: String,
}

impl Utterance {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// A morpheme returned by the tokenizer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Token {
    /// Surface form as it appears in the text
    pub surface: String,
    /// Coarse part-of-speech tag (first feature field for MeCab)
    pub pos: String,
}

impl Token {
    pub fn new(surface: impl Into<String>, pos: impl Into<String>) -> Self {
        Self {
            surface: surface.into(),
            pos: pos.into(),
        }
    }
}

/// A duplicated utterance chosen by the long-tail selector.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct SelectedEntry {
    /// Synthetic id, `<source_id>_dup<k>`
    pub id: String,
    pub text: String,
    /// Id of the utterance this entry duplicates
    pub source_id: String,
}

/// A selected entry resolved to its audio path, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestRow {
    pub id: String,
    pub text: String,
    pub path: String,
}

/// Aggregate numbers reported at the end of a `select` run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SelectSummary {
    /// Utterances read during pass 1
    pub utterances_counted: usize,
    /// Distinct content words seen in pass 1
    pub vocabulary_size: usize,
    pub long_tail_words: usize,
    pub total_deficit: u64,
    /// Utterances read during pass 2 (stops early when deficits are met)
    pub utterances_scanned: usize,
    pub terminated_early: bool,
    pub selected_before_shuffle: usize,
    pub selected_after_shuffle: usize,
    pub written: usize,
    pub missing_paths: usize,
}
