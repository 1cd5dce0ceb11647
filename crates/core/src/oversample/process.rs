//! The `select` pipeline: count, compute deficits, select, shuffle, join, write.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use super::deficit::{compute_deficits, long_tail_set};
use super::frequency::count_frequencies;
use super::join::{join_paths, write_manifests};
use super::selector::LongTailSelector;
use super::shuffle::shuffle_seeded;
use crate::config::SelectConfig;
use crate::language::{Tokenizer, WordFilter};
use crate::manifest::writer::{atomic_write, file_hash};
use crate::manifest::{ManifestReader, PathIndex};
use crate::types::SelectSummary;

/// Input and output locations of a `select` run.
#[derive(Debug, Clone, Serialize)]
pub struct SelectPaths {
    pub input_text: PathBuf,
    pub input_scp: PathBuf,
    pub output_text: PathBuf,
    pub output_scp: PathBuf,
}

/// Everything `--report` writes.
#[derive(Debug, Clone, Serialize)]
pub struct SelectReport<'a> {
    pub tokenizer: &'a str,
    pub paths: &'a SelectPaths,
    pub config: &'a SelectConfig,
    pub input_text_sha256: String,
    pub input_scp_sha256: String,
    pub summary: &'a SelectSummary,
}

/// Run the full long-tail selection.
///
/// The configuration is validated before any file is touched. The
/// tokenizer is shared by both passes. Outputs are only moved into place
/// once every stage has succeeded.
pub fn process(
    paths: &SelectPaths,
    config: &SelectConfig,
    tokenizer: &dyn Tokenizer,
) -> Result<SelectSummary> {
    config.validate()?;
    let filter = WordFilter::new(config.filter.clone());
    let mut summary = SelectSummary::default();

    log::info!("Pass 1: counting words ({} tokenizer)", tokenizer.name());
    let (freq, counted) = count_frequencies(
        ManifestReader::open(&paths.input_text)?,
        tokenizer,
        &filter,
        config.verbose_every,
    )
    .context("Pass 1 failed")?;
    summary.utterances_counted = counted;
    summary.vocabulary_size = freq.len();

    let long_tail = long_tail_set(&freq, config.threshold);
    log::info!(
        "Identified {} long-tail words (<= {}) out of {}",
        long_tail.len(),
        config.threshold,
        freq.len()
    );
    let mut deficits = compute_deficits(&freq, &long_tail, config.target_count);
    summary.long_tail_words = long_tail.len();
    summary.total_deficit = deficits.total();
    log::info!("Total remaining occurrences needed: {}", summary.total_deficit);

    log::info!("Pass 2: selecting lines and duplicating");
    let selector = LongTailSelector::new(
        tokenizer,
        &filter,
        config.max_dup_per_utt,
        config.verbose_every,
    );
    let outcome = selector
        .select(ManifestReader::open(&paths.input_text)?, &mut deficits)
        .context("Pass 2 failed")?;
    summary.utterances_scanned = outcome.scanned;
    summary.terminated_early = outcome.terminated_early;
    if outcome.terminated_early {
        log::info!("All deficits met after {} lines", outcome.scanned);
    } else {
        log::info!(
            "Corpus exhausted with {} words still short ({} occurrences)",
            deficits.outstanding(),
            deficits.total()
        );
    }

    let mut selected = outcome.entries;
    summary.selected_before_shuffle = selected.len();
    log::info!("Selected {} duplicated entries before shuffling", selected.len());
    shuffle_seeded(&mut selected, config.seed);
    summary.selected_after_shuffle = selected.len();
    log::info!("Shuffled output entries (seed {})", config.seed);

    log::info!("Loading SCP map: {}", paths.input_scp.display());
    let index = PathIndex::load(&paths.input_scp)?;
    let joined = join_paths(&selected, &index);
    summary.missing_paths = joined.missing;

    log::info!("Writing outputs");
    summary.written = write_manifests(&joined.rows, &paths.output_text, &paths.output_scp)?;
    Ok(summary)
}

/// Write the run report as pretty JSON.
pub fn write_report(
    report_path: &Path,
    paths: &SelectPaths,
    config: &SelectConfig,
    tokenizer: &dyn Tokenizer,
    summary: &SelectSummary,
) -> Result<()> {
    let report = SelectReport {
        tokenizer: tokenizer.name(),
        paths,
        config,
        input_text_sha256: file_hash(&paths.input_text)?,
        input_scp_sha256: file_hash(&paths.input_scp)?,
        summary,
    };
    let json = serde_json::to_string_pretty(&report)?;
    atomic_write(report_path, json.as_bytes())
        .with_context(|| format!("Failed to write report: {}", report_path.display()))?;
    log::info!("Report: {}", report_path.display());
    Ok(())
}
