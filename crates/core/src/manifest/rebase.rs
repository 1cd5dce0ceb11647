//! Rebuild text/scp manifests against a new audio directory.
//!
//! Audio files are expected to be named `<utt_id><ext>` inside the
//! directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::error::ManifestError;
use crate::manifest::reader::ManifestReader;
use crate::manifest::writer::PairedWriter;
use crate::types::ManifestRow;

/// Options for [`rebase`].
#[derive(Debug, Clone)]
pub struct RebaseConfig {
    /// Audio extension including the dot
    pub ext: String,
    /// Skip entries without audio instead of failing
    pub skip_missing: bool,
}

impl Default for RebaseConfig {
    fn default() -> Self {
        Self {
            ext: ".flac".to_string(),
            skip_missing: false,
        }
    }
}

/// Counts reported by [`rebase`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RebaseSummary {
    pub processed: usize,
    pub written: usize,
    pub missing: usize,
}

/// Transcript entries that have audio, plus the counts behind them.
#[derive(Debug, Clone, Default)]
pub struct ResolvedEntries {
    pub rows: Vec<ManifestRow>,
    pub processed: usize,
    pub missing: usize,
}

/// Pair every transcript line with `<audio_dir>/<utt_id><ext>`.
///
/// Paths in the result are absolute. A missing file is an error unless
/// `config.skip_missing` is set.
pub fn resolve_audio(
    audio_dir: &Path,
    transcript: &Path,
    config: &RebaseConfig,
) -> Result<ResolvedEntries> {
    let audio_dir: PathBuf = std::path::absolute(audio_dir)
        .with_context(|| format!("Failed to resolve {}", audio_dir.display()))?;

    let mut resolved = ResolvedEntries::default();
    for utt in ManifestReader::open(transcript)? {
        let utt = utt?;
        resolved.processed += 1;

        let audio_path = audio_dir.join(format!("{}{}", utt.id, config.ext));
        if !audio_path.exists() {
            resolved.missing += 1;
            if config.skip_missing {
                log::debug!("Skipping {}: no audio at {}", utt.id, audio_path.display());
                continue;
            }
            return Err(ManifestError::MissingAudio {
                utt: utt.id,
                path: audio_path,
            }
            .into());
        }
        resolved.rows.push(ManifestRow {
            id: utt.id,
            text: utt.text,
            path: audio_path.to_string_lossy().into_owned(),
        });
    }

    if resolved.missing > 0 {
        log::warn!("{} entries skipped because their audio is missing", resolved.missing);
    }
    Ok(resolved)
}

/// Write a text/scp pair for every transcript line with audio in `audio_dir`.
pub fn rebase(
    audio_dir: &Path,
    transcript: &Path,
    out_text: &Path,
    out_scp: &Path,
    config: &RebaseConfig,
) -> Result<RebaseSummary> {
    let resolved = resolve_audio(audio_dir, transcript, config)?;

    let mut writer = PairedWriter::create(out_text, out_scp)?;
    for row in &resolved.rows {
        writer.write(&row.id, &row.text, &row.path)?;
    }
    Ok(RebaseSummary {
        processed: resolved.processed,
        written: writer.commit()?,
        missing: resolved.missing,
    })
}
