//! Long-tail lexical oversampling for speech-transcript corpora.
//!
//! Reads an `id<TAB>text` manifest, counts content words, and duplicates
//! utterances so that rare words reach a target frequency. Results are
//! joined back to an `id<TAB>path` index and written as paired manifests.

pub mod config;
pub mod error;
pub mod language;
pub mod manifest;
pub mod oversample;
pub mod types;
