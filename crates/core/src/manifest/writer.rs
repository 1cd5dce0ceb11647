//! Writing paired text/scp manifests.
//!
//! Both files are staged next to their destination and only renamed into
//! place by [`PairedWriter::commit`]. Dropping the writer without
//! committing removes the staged files, so a failed run never leaves a
//! half-written manifest behind.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};

/// Compute SHA-256 hash of a file's contents.
///
/// Returns a 64-character hex string.
pub fn file_hash(path: &Path) -> Result<String> {
    let mut hasher = Sha256::new();
    let mut file = File::open(path)
        .with_context(|| format!("Failed to open file for hashing: {}", path.display()))?;
    std::io::copy(&mut file, &mut hasher)?;
    Ok(format!("{:x}", hasher.finalize()))
}

/// Atomically write data to a file via temp file + rename.
pub fn atomic_write(target: &Path, data: &[u8]) -> Result<()> {
    ensure_parent(target)?;
    let tmp_path = staging_path(target);
    std::fs::write(&tmp_path, data)?;
    std::fs::rename(&tmp_path, target)?;
    Ok(())
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
    }
    Ok(())
}

/// `out/text` -> `out/text.tmp`
fn staging_path(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}

/// One staged output file.
struct StagedFile {
    target: PathBuf,
    staging: PathBuf,
    out: BufWriter<File>,
}

impl StagedFile {
    fn create(target: &Path) -> Result<Self> {
        ensure_parent(target)?;
        let staging = staging_path(target);
        let file = File::create(&staging)
            .with_context(|| format!("Failed to create {}", staging.display()))?;
        Ok(Self {
            target: target.to_path_buf(),
            staging,
            out: BufWriter::new(file),
        })
    }

    fn write_record(&mut self, id: &str, payload: &str) -> Result<()> {
        writeln!(self.out, "{}\t{}", id, payload)
            .with_context(|| format!("Failed to write {}", self.staging.display()))
    }

    fn flush(&mut self) -> Result<()> {
        self.out
            .flush()
            .with_context(|| format!("Failed to write {}", self.staging.display()))
    }

    fn publish(&self) -> Result<()> {
        std::fs::rename(&self.staging, &self.target)
            .with_context(|| format!("Failed to move {} into place", self.target.display()))
    }
}

/// Writes `id<TAB>text` and `id<TAB>path` lines in lockstep.
pub struct PairedWriter {
    text: Option<StagedFile>,
    scp: Option<StagedFile>,
    written: usize,
}

impl PairedWriter {
    pub fn create(text_path: &Path, scp_path: &Path) -> Result<Self> {
        Ok(Self {
            text: Some(StagedFile::create(text_path)?),
            scp: Some(StagedFile::create(scp_path)?),
            written: 0,
        })
    }

    /// Append one record to both manifests.
    pub fn write(&mut self, id: &str, text: &str, path: &str) -> Result<()> {
        if let (Some(t), Some(s)) = (self.text.as_mut(), self.scp.as_mut()) {
            t.write_record(id, text)?;
            s.write_record(id, path)?;
            self.written += 1;
        }
        Ok(())
    }

    pub fn written(&self) -> usize {
        self.written
    }

    /// Flush both files and move them to their final names.
    ///
    /// Either both manifests land or neither does: the scp goes first
    /// and is removed again if the text cannot follow it.
    pub fn commit(mut self) -> Result<usize> {
        for staged in self.text.iter_mut().chain(self.scp.iter_mut()) {
            staged.flush()?;
        }
        if let Some(scp) = &self.scp {
            scp.publish()?;
        }
        if let Some(text) = &self.text {
            if let Err(e) = text.publish() {
                if let Some(scp) = &self.scp {
                    let _ = std::fs::remove_file(&scp.target);
                }
                return Err(e);
            }
        }
        self.text = None;
        self.scp = None;
        Ok(self.written)
    }
}

impl Drop for PairedWriter {
    fn drop(&mut self) {
        for staged in [self.text.take(), self.scp.take()].into_iter().flatten() {
            let staging = staged.staging.clone();
            drop(staged);
            let _ = std::fs::remove_file(staging);
        }
    }
}
