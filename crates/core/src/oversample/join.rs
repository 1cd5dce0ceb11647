//! Resolve selected entries to audio paths and write the paired manifests.

use std::path::Path;

use anyhow::Result;

use super::dup_id;
use crate::manifest::{PairedWriter, PathIndex};
use crate::types::{ManifestRow, SelectedEntry};

/// Rows ready to be written plus the entries that had no audio path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JoinOutcome {
    pub rows: Vec<ManifestRow>,
    pub missing: usize,
}

/// Look up every entry's source utterance in `index`, keeping entry order.
///
/// Entries whose source id is not in the index are dropped and counted.
pub fn join_paths(entries: &[SelectedEntry], index: &PathIndex) -> JoinOutcome {
    let mut outcome = JoinOutcome::default();
    for entry in entries {
        let source = dup_id::source_of(&entry.id);
        debug_assert_eq!(source, entry.source_id);
        match index.get(source) {
            Some(path) => outcome.rows.push(ManifestRow {
                id: entry.id.clone(),
                text: entry.text.clone(),
                path: path.to_string(),
            }),
            None => {
                log::debug!("No path for {} (source {})", entry.id, source);
                outcome.missing += 1;
            }
        }
    }
    if outcome.missing > 0 {
        log::warn!(
            "{} entries skipped because utt_id not found in SCP",
            outcome.missing
        );
    }
    outcome
}

/// Write `rows` to `out_text` / `out_scp`, line for line.
///
/// Nothing appears at the destination paths unless every row was written.
pub fn write_manifests(rows: &[ManifestRow], out_text: &Path, out_scp: &Path) -> Result<usize> {
    let mut writer = PairedWriter::create(out_text, out_scp)?;
    for row in rows {
        writer.write(&row.id, &row.text, &row.path)?;
    }
    writer.commit()
}
