//! Error types callers may want to match on.
//!
//! Everything else is reported through `anyhow` with context attached.

use std::path::PathBuf;

use thiserror::Error;

/// Rejected configuration, raised before any corpus scan.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid configuration value: {field} = {value} ({reason})")]
    InvalidValue {
        field: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// Manifest consistency errors.
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error(
        "Line count mismatch: text {} has {text_lines}, scp {} has {scp_lines}",
        text.display(),
        scp.display()
    )]
    LineCountMismatch {
        text: PathBuf,
        scp: PathBuf,
        text_lines: usize,
        scp_lines: usize,
    },

    #[error("Utt mismatch at line {line}: text utt={text_utt}, scp utt={scp_utt}")]
    UttMismatch {
        line: usize,
        text_utt: String,
        scp_utt: String,
    },

    #[error("Failed to parse line {line} of {}", path.display())]
    Unparseable { path: PathBuf, line: usize },

    #[error("Audio not found for {utt}: {}", path.display())]
    MissingAudio { utt: String, path: PathBuf },

    #[error("Got {texts} text manifests but {scps} scp manifests")]
    PairCountMismatch { texts: usize, scps: usize },

    #[error("Not enough val candidates after avoid filter: need {needed}, got {available}")]
    NotEnoughValCandidates { needed: usize, available: usize },
}

/// Tokenizer backend failures. Always fatal for a run.
#[derive(Error, Debug)]
pub enum TokenizerError {
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} exited before finishing the analysis")]
    Exited(String),

    #[error("Malformed tokenizer output line: {0:?}")]
    MalformedLine(String),

    #[error("Token {0:?} has no part-of-speech tag (expected surface/POS)")]
    MissingTag(String),

    #[error("Input of {len} bytes does not fit the tokenizer buffer ({limit} bytes)")]
    InputTooLong { len: usize, limit: usize },
}
