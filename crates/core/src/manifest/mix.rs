//! Shuffle-mix several text/scp pairs into one pair.
//!
//! Inside a pair the two manifests are aligned by position, not by id,
//! so every pair is validated and loaded before anything is written.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::error::ManifestError;
use crate::manifest::writer::PairedWriter;
use crate::oversample::shuffle::shuffle_seeded;
use crate::types::ManifestRow;

/// Default seed for `mix`.
pub const DEFAULT_MIX_SEED: u64 = 1234;

/// Options for [`mix`].
#[derive(Debug, Clone)]
pub struct MixConfig {
    pub seed: u64,
    /// Require the text and scp ids to match on every line
    pub strict_utt: bool,
}

impl Default for MixConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_MIX_SEED,
            strict_utt: true,
        }
    }
}

/// Split an aligned line; a lone id gets an empty payload.
fn parse_aligned_line(line: &str) -> Option<(&str, &str)> {
    let line = line.trim_end_matches(['\n', '\r']);
    if line.trim().is_empty() {
        return None;
    }
    let split = if line.contains('\t') {
        line.split_once('\t')
    } else {
        line.trim()
            .split_once(char::is_whitespace)
            .map(|(id, rest)| (id, rest.trim_start()))
    };
    Some(split.unwrap_or((line.trim(), "")))
}

/// Load one positionally aligned text/scp pair.
pub fn load_pair(text_path: &Path, scp_path: &Path, strict_utt: bool) -> Result<Vec<ManifestRow>> {
    let texts = std::fs::read_to_string(text_path)
        .with_context(|| format!("Failed to read {}", text_path.display()))?;
    let scps = std::fs::read_to_string(scp_path)
        .with_context(|| format!("Failed to read {}", scp_path.display()))?;

    let text_lines: Vec<&str> = texts.lines().collect();
    let scp_lines: Vec<&str> = scps.lines().collect();
    if text_lines.len() != scp_lines.len() {
        return Err(ManifestError::LineCountMismatch {
            text: text_path.to_path_buf(),
            scp: scp_path.to_path_buf(),
            text_lines: text_lines.len(),
            scp_lines: scp_lines.len(),
        }
        .into());
    }

    let mut rows = Vec::with_capacity(text_lines.len());
    for (idx, (t_line, s_line)) in text_lines.iter().zip(&scp_lines).enumerate() {
        let (t_utt, text) = parse_aligned_line(t_line).ok_or_else(|| ManifestError::Unparseable {
            path: text_path.to_path_buf(),
            line: idx,
        })?;
        let (s_utt, wav) = parse_aligned_line(s_line).ok_or_else(|| ManifestError::Unparseable {
            path: scp_path.to_path_buf(),
            line: idx,
        })?;
        if strict_utt && t_utt != s_utt {
            return Err(ManifestError::UttMismatch {
                line: idx,
                text_utt: t_utt.to_string(),
                scp_utt: s_utt.to_string(),
            }
            .into());
        }
        let id = if t_utt.is_empty() { s_utt } else { t_utt };
        rows.push(ManifestRow {
            id: id.to_string(),
            text: text.to_string(),
            path: wav.to_string(),
        });
    }
    Ok(rows)
}

/// Mix `text_files[i]`/`scp_files[i]` pairs, shuffle, and write the result.
///
/// Returns the number of entries written.
pub fn mix(
    text_files: &[PathBuf],
    scp_files: &[PathBuf],
    out_text: &Path,
    out_scp: &Path,
    config: &MixConfig,
) -> Result<usize> {
    if text_files.len() != scp_files.len() {
        return Err(ManifestError::PairCountMismatch {
            texts: text_files.len(),
            scps: scp_files.len(),
        }
        .into());
    }

    let mut rows = Vec::new();
    for (text_path, scp_path) in text_files.iter().zip(scp_files) {
        let pair = load_pair(text_path, scp_path, config.strict_utt)?;
        log::info!("Loaded {} entries from {}", pair.len(), text_path.display());
        rows.extend(pair);
    }

    shuffle_seeded(&mut rows, config.seed);

    let mut writer = PairedWriter::create(out_text, out_scp)?;
    for row in &rows {
        writer.write(&row.id, &row.text, &row.path)?;
    }
    let written = writer.commit()?;
    log::info!("Mixed {} entries from {} pairs", written, text_files.len());
    Ok(written)
}
