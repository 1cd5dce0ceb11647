//! Tokenizer interface and backends.
//!
//! Splits transcript text into surface/part-of-speech pairs:
//! - MecabTokenizer: a long-lived `mecab` subprocess
//! - PretaggedTokenizer: text that was already tagged as `surface/POS`

use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::Mutex;

use anyhow::{Result, anyhow, bail};

use crate::error::TokenizerError;
use crate::types::Token;

/// Tokenizer backend trait.
///
/// Implementations are created once per run and reused for every
/// utterance of both passes. Backends with a costly start-up (loading a
/// dictionary, spawning a process) must never be re-created per call.
pub trait Tokenizer: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Tokenize one transcript, preserving token order.
    fn tokenize(&self, text: &str) -> Result<Vec<Token>>;
}

/// Handles of a running `mecab` process.
struct MecabProcess {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

/// Input buffer passed to mecab as `-b` unless the caller sets one.
pub const MECAB_INPUT_BUFFER: usize = 1 << 20;

/// mecab clamps `-b` into this range.
const MECAB_MIN_BUFFER: usize = 8192;
const MECAB_MAX_BUFFER: usize = 8192 * 640;

/// MeCab in its default output format, one process for the whole run.
///
/// Each call writes one line to mecab's stdin and reads the analysis back
/// up to the `EOS` marker. mecab cuts lines longer than its input buffer
/// into several sentences with one `EOS` each, so such lines are refused.
pub struct MecabTokenizer {
    program: String,
    input_limit: usize,
    process: Mutex<MecabProcess>,
}

/// Input buffer size given in mecab arguments, if any.
fn buffer_size_arg(args: &[String]) -> Option<usize> {
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        let value = match arg.as_str() {
            "-b" | "--input-buffer-size" => iter.next().map(String::as_str),
            other => other
                .strip_prefix("--input-buffer-size=")
                .or_else(|| other.strip_prefix("-b")),
        };
        if let Some(size) = value.and_then(|v| v.parse().ok()) {
            return Some(size);
        }
    }
    None
}

/// Refuse lines mecab would split at its buffer boundary.
fn check_input_len(line: &str, limit: usize) -> Result<(), TokenizerError> {
    if line.len() + 1 >= limit {
        return Err(TokenizerError::InputTooLong {
            len: line.len(),
            limit,
        });
    }
    Ok(())
}

impl MecabTokenizer {
    /// Start `mecab` with extra arguments (e.g. `-d /path/to/dic`).
    pub fn spawn(program: &str, args: &[String]) -> Result<Self> {
        let mut args = args.to_vec();
        let input_limit = match buffer_size_arg(&args) {
            Some(size) => size.clamp(MECAB_MIN_BUFFER, MECAB_MAX_BUFFER),
            None => {
                args.extend(["-b".to_string(), MECAB_INPUT_BUFFER.to_string()]);
                MECAB_INPUT_BUFFER
            }
        };

        let mut child = Command::new(program)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| TokenizerError::Spawn {
                program: program.to_string(),
                source,
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| anyhow!("{} stdin not captured", program))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| anyhow!("{} stdout not captured", program))?;

        log::info!("Started {} (pid {})", program, child.id());
        Ok(Self {
            program: program.to_string(),
            input_limit,
            process: Mutex::new(MecabProcess {
                child,
                stdin,
                stdout: BufReader::new(stdout),
            }),
        })
    }
}

impl Tokenizer for MecabTokenizer {
    fn name(&self) -> &str {
        "mecab"
    }

    fn tokenize(&self, text: &str) -> Result<Vec<Token>> {
        // One request per line; embedded newlines would desync the stream
        let line = text.replace(['\n', '\r'], " ");
        check_input_len(&line, self.input_limit)?;

        let mut process = self
            .process
            .lock()
            .map_err(|_| anyhow!("{} handle poisoned by an earlier failure", self.program))?;

        writeln!(process.stdin, "{}", line)?;
        process.stdin.flush()?;

        let mut tokens = Vec::new();
        let mut buf = String::new();
        loop {
            buf.clear();
            if process.stdout.read_line(&mut buf)? == 0 {
                return Err(TokenizerError::Exited(self.program.clone()).into());
            }
            let out = buf.trim_end_matches(['\n', '\r']);
            if out == "EOS" {
                break;
            }
            tokens.push(parse_mecab_line(out)?);
        }
        Ok(tokens)
    }
}

impl Drop for MecabTokenizer {
    fn drop(&mut self) {
        if let Ok(process) = self.process.get_mut() {
            let _ = process.child.kill();
            let _ = process.child.wait();
        }
    }
}

/// Parse `surface\tPOS,POS1,...` into a token.
fn parse_mecab_line(line: &str) -> Result<Token, TokenizerError> {
    let (surface, features) = line
        .split_once('\t')
        .ok_or_else(|| TokenizerError::MalformedLine(line.to_string()))?;
    let pos = features.split(',').next().unwrap_or("");
    Ok(Token::new(surface, pos))
}

/// Whitespace-separated `surface/POS` tokens.
///
/// The tag is taken after the last `/`, so surfaces may contain slashes.
/// A token without a tag is an error, like a tagger crash would be.
#[derive(Debug, Default, Clone)]
pub struct PretaggedTokenizer;

impl Tokenizer for PretaggedTokenizer {
    fn name(&self) -> &str {
        "pretagged"
    }

    fn tokenize(&self, text: &str) -> Result<Vec<Token>> {
        text.split_whitespace()
            .map(|raw| -> Result<Token> {
                match raw.rsplit_once('/') {
                    Some((surface, pos)) if !surface.is_empty() && !pos.is_empty() => {
                        Ok(Token::new(surface, pos))
                    }
                    _ => Err(TokenizerError::MissingTag(raw.to_string()).into()),
                }
            })
            .collect()
    }
}

/// Check if the `mecab` binary can be started.
pub fn mecab_available() -> bool {
    Command::new("mecab")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Get a tokenizer backend by name.
///
/// Modes:
/// - "mecab" — persistent `mecab` subprocess, `mecab_args` passed through.
/// - "pretagged" — input text is already `surface/POS` tokens.
pub fn get_tokenizer(name: &str, mecab_args: &[String]) -> Result<Box<dyn Tokenizer>> {
    match name {
        "mecab" => Ok(Box::new(MecabTokenizer::spawn("mecab", mecab_args)?)),
        "pretagged" => Ok(Box::new(PretaggedTokenizer)),
        _ => bail!("Unknown tokenizer: '{}'. Available: mecab, pretagged", name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mecab_line_ipadic() {
        let t = parse_mecab_line("東京\t名詞,固有名詞,地域,一般,*,*,東京,トウキョウ,トーキョー").unwrap();
        assert_eq!(t.surface, "東京");
        assert_eq!(t.pos, "名詞");
    }

    #[test]
    fn test_parse_mecab_line_without_tab() {
        let err = parse_mecab_line("東京 名詞").unwrap_err();
        assert!(matches!(err, TokenizerError::MalformedLine(_)));
    }

    #[test]
    fn test_buffer_size_arg() {
        let args = |a: &[&str]| a.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        assert_eq!(buffer_size_arg(&args(&["-d", "/dic"])), None);
        assert_eq!(buffer_size_arg(&args(&["-b", "65536"])), Some(65536));
        assert_eq!(buffer_size_arg(&args(&["-b4096"])), Some(4096));
        assert_eq!(buffer_size_arg(&args(&["--input-buffer-size=100"])), Some(100));
        assert_eq!(buffer_size_arg(&args(&["--input-buffer-size", "200"])), Some(200));
    }

    #[test]
    fn test_check_input_len() {
        assert!(check_input_len("東京に行く", 8192).is_ok());
        let long = "あ".repeat(3000);
        let err = check_input_len(&long, 8192).unwrap_err();
        assert!(matches!(err, TokenizerError::InputTooLong { len: 9000, limit: 8192 }));
        assert!(check_input_len(&long, MECAB_INPUT_BUFFER).is_ok());
    }

    #[test]
    fn test_pretagged_tokenize() {
        let tokens = PretaggedTokenizer.tokenize("東京/名詞 に/助詞 行く/動詞").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::new("東京", "名詞"),
                Token::new("に", "助詞"),
                Token::new("行く", "動詞"),
            ]
        );
    }

    #[test]
    fn test_pretagged_surface_with_slash() {
        let tokens = PretaggedTokenizer.tokenize("km/h/名詞").unwrap();
        assert_eq!(tokens, vec![Token::new("km/h", "名詞")]);
    }

    #[test]
    fn test_pretagged_missing_tag_fails() {
        assert!(PretaggedTokenizer.tokenize("東京/名詞 大阪").is_err());
        assert!(PretaggedTokenizer.tokenize("大阪/").is_err());
    }

    #[test]
    fn test_pretagged_empty_text() {
        assert!(PretaggedTokenizer.tokenize("   ").unwrap().is_empty());
    }

    #[test]
    fn test_get_tokenizer_pretagged() {
        let tokenizer = get_tokenizer("pretagged", &[]).unwrap();
        assert_eq!(tokenizer.name(), "pretagged");
    }

    #[test]
    fn test_get_tokenizer_unknown() {
        assert!(get_tokenizer("sudachi", &[]).is_err());
    }

    #[test]
    fn test_spawn_missing_binary_fails() {
        let result = MecabTokenizer::spawn("longtail-no-such-tagger", &[]);
        assert!(result.is_err());
    }

    #[test]
    fn test_mecab_roundtrip_when_installed() {
        if !mecab_available() {
            return;
        }
        let tokenizer = MecabTokenizer::spawn("mecab", &[]).unwrap();
        let first = tokenizer.tokenize("東京に行く").unwrap();
        let second = tokenizer.tokenize("東京に行く").unwrap();
        assert!(!first.is_empty());
        assert_eq!(first, second);
        assert!(first.iter().any(|t| t.surface == "東京"));

        let small = MecabTokenizer::spawn("mecab", &["-b".to_string(), "64".to_string()]).unwrap();
        assert_eq!(small.input_limit, MECAB_MIN_BUFFER);
        assert!(small.tokenize(&"東京".repeat(2000)).is_err());
        assert_eq!(small.tokenize("東京に行く").unwrap(), first);
    }
}
