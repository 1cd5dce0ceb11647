//! Configuration for the long-tail selection pipeline.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default content-word tag (IPADIC / UniDic noun).
pub const DEFAULT_CONTENT_POS: &str = "名詞";

/// Which tokens count as words. Shared by both passes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WordFilterConfig {
    /// Minimum word length in characters
    pub min_len: usize,
    /// Reject words made only of ASCII letters and digits
    pub filter_alnum: bool,
    /// Reject words made only of kana
    pub filter_kana: bool,
    /// Part-of-speech tag a token must carry to be counted
    pub content_pos: String,
}

impl Default for WordFilterConfig {
    fn default() -> Self {
        Self {
            min_len: 2,
            filter_alnum: true,
            filter_kana: true,
            content_pos: DEFAULT_CONTENT_POS.to_string(),
        }
    }
}

/// Thresholds and knobs for `select`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SelectConfig {
    /// Words with frequency <= threshold are long-tail
    pub threshold: u64,
    /// Desired minimum occurrences per long-tail word
    pub target_count: u64,
    /// Cap on duplicates emitted per source utterance
    pub max_dup_per_utt: Option<u64>,
    /// Shuffle seed
    pub seed: u64,
    /// Progress log interval in utterances (0 disables)
    pub verbose_every: usize,
    pub filter: WordFilterConfig,
}

impl Default for SelectConfig {
    fn default() -> Self {
        Self {
            threshold: 200,
            target_count: 200,
            max_dup_per_utt: None,
            seed: 42,
            verbose_every: 100_000,
            filter: WordFilterConfig::default(),
        }
    }
}

impl SelectConfig {
    /// Reject values that would make the run meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.threshold == 0 {
            return Err(ConfigError::InvalidValue {
                field: "threshold",
                value: self.threshold.to_string(),
                reason: "must be positive",
            });
        }
        if self.target_count == 0 {
            return Err(ConfigError::InvalidValue {
                field: "target_count",
                value: self.target_count.to_string(),
                reason: "must be positive",
            });
        }
        if self.max_dup_per_utt == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "max_dup_per_utt",
                value: "0".to_string(),
                reason: "must be positive when set",
            });
        }
        if self.filter.content_pos.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "content_pos",
                value: format!("{:?}", self.filter.content_pos),
                reason: "must not be empty",
            });
        }
        Ok(())
    }
}
