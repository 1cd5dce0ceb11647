//! Build a `wav.scp` index from a directory of audio files.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::manifest::writer::atomic_write;

/// File name written inside the output directory.
pub const SCP_FILE_NAME: &str = "wav.scp";

/// Audio files directly inside `audio_dir` whose name ends in `ext`,
/// as `(utt_id, absolute path)` sorted by path.
///
/// The utterance id is the file name without `ext`.
pub fn scan_audio(audio_dir: &Path, ext: &str) -> Result<Vec<(String, PathBuf)>> {
    let audio_dir = std::path::absolute(audio_dir)
        .with_context(|| format!("Failed to resolve {}", audio_dir.display()))?;
    let entries = std::fs::read_dir(&audio_dir)
        .with_context(|| format!("Failed to read audio directory: {}", audio_dir.display()))?;

    let mut found = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            log::warn!("Skipping non UTF-8 file name: {}", path.display());
            continue;
        };
        match name.strip_suffix(ext) {
            Some(id) if !id.is_empty() => found.push((id.to_string(), path.clone())),
            _ => {}
        }
    }
    found.sort_by(|a, b| a.1.cmp(&b.1));
    Ok(found)
}

/// Write `<output_dir>/wav.scp` for every matching file in `audio_dir`.
///
/// Returns the scp path and the number of entries. With no matching
/// files nothing is written.
pub fn write_scp(audio_dir: &Path, output_dir: &Path, ext: &str) -> Result<(PathBuf, usize)> {
    let files = scan_audio(audio_dir, ext)?;
    let scp_path = output_dir.join(SCP_FILE_NAME);
    if files.is_empty() {
        log::warn!("No files found in {} with extension {}", audio_dir.display(), ext);
        return Ok((scp_path, 0));
    }
    log::info!("Found {} files in {}", files.len(), audio_dir.display());

    let mut content = String::new();
    for (id, path) in &files {
        content.push_str(id);
        content.push('\t');
        content.push_str(&path.to_string_lossy());
        content.push('\n');
    }
    atomic_write(&scp_path, content.as_bytes())
        .with_context(|| format!("Failed to write {}", scp_path.display()))?;
    Ok((scp_path, files.len()))
}
