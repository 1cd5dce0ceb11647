//! Rebase a transcript onto an audio directory and split it into train
//! and val manifests.
//!
//! The val set has exactly `val_size` entries, sampled without
//! replacement from the utterances that are not on the avoid list. Both
//! outputs keep transcript order.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::error::{ConfigError, ManifestError};
use crate::manifest::rebase::{RebaseConfig, resolve_audio};
use crate::manifest::writer::PairedWriter;
use crate::oversample::shuffle::shuffle_seeded;
use crate::types::ManifestRow;

pub const DEFAULT_VAL_SIZE: usize = 2000;
pub const DEFAULT_SPLIT_SEED: u64 = 42;

/// Options for [`split`].
#[derive(Debug, Clone)]
pub struct SplitConfig {
    pub audio: RebaseConfig,
    /// Exact number of val entries
    pub val_size: usize,
    pub seed: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            audio: RebaseConfig::default(),
            val_size: DEFAULT_VAL_SIZE,
            seed: DEFAULT_SPLIT_SEED,
        }
    }
}

impl SplitConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.val_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "val_size",
                value: self.val_size.to_string(),
                reason: "must be positive",
            });
        }
        Ok(())
    }
}

/// The four manifests written by [`split`].
#[derive(Debug, Clone)]
pub struct SplitPaths {
    pub train_text: PathBuf,
    pub train_scp: PathBuf,
    pub val_text: PathBuf,
    pub val_scp: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitSummary {
    pub processed: usize,
    pub valid: usize,
    pub missing: usize,
    pub avoid_listed: usize,
    pub val_candidates: usize,
    pub train: usize,
    pub val: usize,
}

/// Read utterance ids to keep out of val: the first field of every
/// non-blank line, so a transcript or scp works as the list.
pub fn load_avoid_set(path: &Path) -> Result<HashSet<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read avoid list: {}", path.display()))?;
    Ok(content
        .lines()
        .filter_map(|line| line.split_whitespace().next())
        .map(str::to_string)
        .collect())
}

/// Choose the row indices that go to val.
///
/// Returns the chosen indices and the number of candidates they were
/// drawn from.
pub fn pick_val(
    rows: &[ManifestRow],
    avoid: &HashSet<String>,
    val_size: usize,
    seed: u64,
) -> Result<(HashSet<usize>, usize)> {
    let mut candidates: Vec<usize> = rows
        .iter()
        .enumerate()
        .filter(|(_, row)| !avoid.contains(&row.id))
        .map(|(idx, _)| idx)
        .collect();
    let available = candidates.len();
    if available < val_size {
        return Err(ManifestError::NotEnoughValCandidates {
            needed: val_size,
            available,
        }
        .into());
    }

    shuffle_seeded(&mut candidates, seed);
    candidates.truncate(val_size);
    Ok((candidates.into_iter().collect(), available))
}

/// Resolve audio for `transcript`, split it, and write both pairs.
///
/// Nothing is written unless the val set can be filled. If the train
/// pair fails to land, the already committed val pair is removed again.
pub fn split(
    audio_dir: &Path,
    transcript: &Path,
    avoid: &HashSet<String>,
    paths: &SplitPaths,
    config: &SplitConfig,
) -> Result<SplitSummary> {
    config.validate()?;
    let resolved = resolve_audio(audio_dir, transcript, &config.audio)?;
    let (val_indices, val_candidates) =
        pick_val(&resolved.rows, avoid, config.val_size, config.seed)?;

    let mut train = PairedWriter::create(&paths.train_text, &paths.train_scp)?;
    let mut val = PairedWriter::create(&paths.val_text, &paths.val_scp)?;
    for (idx, row) in resolved.rows.iter().enumerate() {
        let writer = if val_indices.contains(&idx) { &mut val } else { &mut train };
        writer.write(&row.id, &row.text, &row.path)?;
    }

    let val_written = val.commit()?;
    let train_written = match train.commit() {
        Ok(n) => n,
        Err(e) => {
            let _ = std::fs::remove_file(&paths.val_text);
            let _ = std::fs::remove_file(&paths.val_scp);
            return Err(e);
        }
    };
    log::info!("Split {} entries: {} train, {} val", resolved.rows.len(), train_written, val_written);

    Ok(SplitSummary {
        processed: resolved.processed,
        valid: resolved.rows.len(),
        missing: resolved.missing,
        avoid_listed: avoid.len(),
        val_candidates,
        train: train_written,
        val: val_written,
    })
}
