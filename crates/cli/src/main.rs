//! Longtail CLI — long-tail oversampling and manifest tools for ASR corpora.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use longtail_core::config::{DEFAULT_CONTENT_POS, SelectConfig, WordFilterConfig};
use longtail_core::language::get_tokenizer;
use longtail_core::manifest::mix::{DEFAULT_MIX_SEED, MixConfig, mix};
use longtail_core::manifest::rebase::{RebaseConfig, rebase};
use longtail_core::manifest::scp::write_scp;
use longtail_core::manifest::split::{
    DEFAULT_SPLIT_SEED, DEFAULT_VAL_SIZE, SplitConfig, SplitPaths, load_avoid_set, split,
};
use longtail_core::oversample::{SelectPaths, process, write_report};

// ─── Top-level CLI ───────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "longtail",
    about = "Long-tail word oversampling and manifest tools for speech corpora",
    version,
)]
struct Cli {
    /// Show verbose output
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Duplicate utterances containing rare words, then shuffle
    Select(SelectArgs),
    /// Shuffle-mix several text/scp pairs into one
    Mix(MixArgs),
    /// Rebuild text/scp manifests against a new audio directory
    Rebase(RebaseArgs),
    /// Rebuild manifests and split them into train/val
    Split(SplitArgs),
    /// Generate wav.scp from a directory of audio files
    Scp(ScpArgs),
}

// ─── Select ──────────────────────────────────────────────────────

#[derive(Parser, Debug)]
struct SelectArgs {
    /// Input text file (utt_id<TAB>text)
    #[arg(long)]
    input_text: PathBuf,

    /// Input scp file (utt_id<TAB>path)
    #[arg(long)]
    input_scp: PathBuf,

    /// Output text file path
    #[arg(long)]
    output_text: PathBuf,

    /// Output scp file path
    #[arg(long)]
    output_scp: PathBuf,

    /// Word frequency <= threshold is considered long-tail
    #[arg(long, default_value_t = 200)]
    threshold: u64,

    /// Ensure each long-tail word appears at least this many times
    #[arg(long, default_value_t = 200)]
    target_count: u64,

    /// Optional cap on how many times a single sentence can be duplicated
    #[arg(long)]
    max_dup_per_utt: Option<u64>,

    /// Shuffle seed
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Minimum word length to consider
    #[arg(long, default_value_t = 2)]
    min_len: usize,

    /// Keep pure alnum tokens
    #[arg(long, default_value_t = false)]
    no_filter_alnum: bool,

    /// Keep pure kana tokens
    #[arg(long, default_value_t = false)]
    no_filter_kana: bool,

    /// Print progress every N lines (0 to disable)
    #[arg(long, default_value_t = 100_000)]
    verbose_every: usize,

    /// Tokenizer backend
    #[arg(long, default_value = "mecab", value_parser = ["mecab", "pretagged"])]
    tokenizer: String,

    /// Extra argument passed to mecab (repeatable, e.g. --mecab-arg=-d --mecab-arg=/path/dic)
    #[arg(long = "mecab-arg", allow_hyphen_values = true)]
    mecab_args: Vec<String>,

    /// Part-of-speech tag counted as a content word
    #[arg(long, default_value = DEFAULT_CONTENT_POS)]
    content_pos: String,

    /// Write a JSON run report here
    #[arg(long)]
    report: Option<PathBuf>,
}

// ─── Mix ─────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
struct MixArgs {
    /// Input text files (utt_id<TAB>text)
    #[arg(long, num_args = 1.., required = true)]
    text_files: Vec<PathBuf>,

    /// Input scp files, in the same order as --text-files
    #[arg(long, num_args = 1.., required = true)]
    scp_files: Vec<PathBuf>,

    /// Output mixed text file
    #[arg(long)]
    output_text: PathBuf,

    /// Output mixed scp file
    #[arg(long)]
    output_scp: PathBuf,

    /// Shuffle seed
    #[arg(long, default_value_t = DEFAULT_MIX_SEED)]
    seed: u64,

    /// Allow differing utt_ids between text/scp lines (still position-aligned)
    #[arg(long, default_value_t = false)]
    no_strict_utt: bool,
}

// ─── Rebase ──────────────────────────────────────────────────────

#[derive(Parser, Debug)]
struct RebaseArgs {
    /// Directory containing audio files named <utt_id><ext>
    #[arg(long)]
    audio_dir: PathBuf,

    /// Transcript file with utt_id and text
    #[arg(long)]
    transcript: PathBuf,

    /// Output scp file path
    #[arg(long)]
    output_scp: PathBuf,

    /// Output text file path
    #[arg(long)]
    output_text: PathBuf,

    /// Audio file extension
    #[arg(long, default_value = ".flac")]
    ext: String,

    /// Skip entries whose audio file is missing instead of failing
    #[arg(long, default_value_t = false)]
    skip_missing: bool,
}

// ─── Split ───────────────────────────────────────────────────────

#[derive(Parser, Debug)]
struct SplitArgs {
    /// Directory containing audio files named <utt_id><ext>
    #[arg(long)]
    audio_dir: PathBuf,

    /// Transcript file with utt_id and text
    #[arg(long)]
    transcript: PathBuf,

    /// Output train scp file path
    #[arg(long)]
    output_train_scp: PathBuf,

    /// Output train text file path
    #[arg(long)]
    output_train_text: PathBuf,

    /// Output val scp file path
    #[arg(long)]
    output_val_scp: PathBuf,

    /// Output val text file path
    #[arg(long)]
    output_val_text: PathBuf,

    /// Audio file extension
    #[arg(long, default_value = ".flac")]
    ext: String,

    /// Skip entries whose audio file is missing instead of failing
    #[arg(long, default_value_t = false)]
    skip_missing: bool,

    /// Exact number of val entries to sample
    #[arg(long, default_value_t = DEFAULT_VAL_SIZE)]
    val_size: usize,

    /// Random seed
    #[arg(long, default_value_t = DEFAULT_SPLIT_SEED)]
    seed: u64,

    /// List whose first field per line (utt_id) is kept out of val
    #[arg(long)]
    avoid_val_list: Option<PathBuf>,
}

// ─── Scp ─────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
struct ScpArgs {
    /// Directory containing the audio files
    audio_dir: PathBuf,

    /// Directory to save the generated wav.scp
    output_dir: PathBuf,

    /// Audio file extension
    #[arg(long, default_value = ".flac")]
    ext: String,
}

// ─── Main ────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    // Init logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    let result = match cli.command {
        Command::Select(args) => run_select(args),
        Command::Mix(args) => run_mix(args),
        Command::Rebase(args) => run_rebase(args),
        Command::Split(args) => run_split(args),
        Command::Scp(args) => run_scp(args),
    };

    if let Err(e) = result {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}

// ─── Select runner ───────────────────────────────────────────────

fn run_select(args: SelectArgs) -> Result<()> {
    let config = SelectConfig {
        threshold: args.threshold,
        target_count: args.target_count,
        max_dup_per_utt: args.max_dup_per_utt,
        seed: args.seed,
        verbose_every: args.verbose_every,
        filter: WordFilterConfig {
            min_len: args.min_len,
            filter_alnum: !args.no_filter_alnum,
            filter_kana: !args.no_filter_kana,
            content_pos: args.content_pos,
        },
    };
    // Fail before spawning the tokenizer or reading the corpus
    config.validate()?;

    if !args.input_text.exists() {
        bail!("File not found: {}", args.input_text.display());
    }
    if !args.input_scp.exists() {
        bail!("File not found: {}", args.input_scp.display());
    }

    let tokenizer = get_tokenizer(&args.tokenizer, &args.mecab_args)
        .with_context(|| format!("Failed to initialise {} tokenizer", args.tokenizer))?;

    let paths = SelectPaths {
        input_text: args.input_text,
        input_scp: args.input_scp,
        output_text: args.output_text,
        output_scp: args.output_scp,
    };
    let summary = process(&paths, &config, tokenizer.as_ref())?;

    if let Some(report_path) = &args.report {
        write_report(report_path, &paths, &config, tokenizer.as_ref(), &summary)?;
    }

    println!("Long-tail words: {} (<= {})", summary.long_tail_words, config.threshold);
    println!("Total deficit: {}", summary.total_deficit);
    println!("Selected before shuffle: {}", summary.selected_before_shuffle);
    println!("Selected after shuffle: {}", summary.selected_after_shuffle);
    if summary.missing_paths > 0 {
        println!(
            "WARN: {} entries skipped because utt_id not found in SCP",
            summary.missing_paths
        );
    }
    println!("Written: {}", summary.written);
    println!("Text: {}", paths.output_text.display());
    println!("SCP : {}", paths.output_scp.display());

    Ok(())
}

// ─── Mix runner ──────────────────────────────────────────────────

fn run_mix(args: MixArgs) -> Result<()> {
    let config = MixConfig {
        seed: args.seed,
        strict_utt: !args.no_strict_utt,
    };
    let written = mix(
        &args.text_files,
        &args.scp_files,
        &args.output_text,
        &args.output_scp,
        &config,
    )?;

    println!("Mixed {} entries from {} pairs", written, args.text_files.len());
    println!("Text -> {}", args.output_text.display());
    println!("SCP  -> {}", args.output_scp.display());

    Ok(())
}

// ─── Rebase runner ───────────────────────────────────────────────

fn run_rebase(args: RebaseArgs) -> Result<()> {
    if !args.audio_dir.is_dir() {
        bail!("Audio directory not found: {}", args.audio_dir.display());
    }

    let config = RebaseConfig {
        ext: args.ext,
        skip_missing: args.skip_missing,
    };
    let summary = rebase(
        &args.audio_dir,
        &args.transcript,
        &args.output_text,
        &args.output_scp,
        &config,
    )?;

    println!("Processed transcript: {} entries", summary.processed);
    println!("Written: {}", summary.written);
    if summary.missing > 0 {
        println!(
            "Missing audio: {}{}",
            summary.missing,
            if config.skip_missing { " (skipped)" } else { "" }
        );
    }
    println!("SCP: {}", args.output_scp.display());
    println!("TEXT: {}", args.output_text.display());

    Ok(())
}

// ─── Split runner ────────────────────────────────────────────────

fn run_split(args: SplitArgs) -> Result<()> {
    let config = SplitConfig {
        audio: RebaseConfig {
            ext: args.ext,
            skip_missing: args.skip_missing,
        },
        val_size: args.val_size,
        seed: args.seed,
    };
    config.validate()?;

    if !args.audio_dir.is_dir() {
        bail!("Audio directory not found: {}", args.audio_dir.display());
    }
    let avoid = match &args.avoid_val_list {
        Some(path) => load_avoid_set(path)?,
        None => Default::default(),
    };

    let paths = SplitPaths {
        train_text: args.output_train_text,
        train_scp: args.output_train_scp,
        val_text: args.output_val_text,
        val_scp: args.output_val_scp,
    };
    let summary = split(&args.audio_dir, &args.transcript, &avoid, &paths, &config)?;

    println!("Processed transcript: {} entries", summary.processed);
    println!("Valid (audio exists): {}", summary.valid);
    if summary.missing > 0 {
        println!(
            "Missing audio: {}{}",
            summary.missing,
            if config.audio.skip_missing { " (skipped)" } else { "" }
        );
    }
    println!("Avoid list size: {}", summary.avoid_listed);
    println!("Val candidates after avoid filter: {}", summary.val_candidates);
    println!("Val selected: {}", summary.val);
    println!("Train selected: {}", summary.train);
    println!("TRAIN SCP : {}", paths.train_scp.display());
    println!("TRAIN TEXT: {}", paths.train_text.display());
    println!("VAL SCP   : {}", paths.val_scp.display());
    println!("VAL TEXT  : {}", paths.val_text.display());

    Ok(())
}

// ─── Scp runner ──────────────────────────────────────────────────

fn run_scp(args: ScpArgs) -> Result<()> {
    if !args.audio_dir.is_dir() {
        bail!("Audio directory not found: {}", args.audio_dir.display());
    }

    let (scp_path, count) = write_scp(&args.audio_dir, &args.output_dir, &args.ext)?;
    if count == 0 {
        println!(
            "No files found in {} with extension {}",
            args.audio_dir.display(),
            args.ext
        );
    } else {
        println!("Wrote {} entries to {}", count, scp_path.display());
    }

    Ok(())
}
