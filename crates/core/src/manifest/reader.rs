//! Reading two-column `id<TAB>payload` manifests.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::types::Utterance;

/// Split a manifest line into `(id, payload)`.
///
/// The line is trimmed, then split on the first tab, or on the first run
/// of whitespace when there is no tab. Returns `None` for blank lines and
/// lines with a single field.
pub fn parse_line(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    if line.contains('\t') {
        line.split_once('\t')
    } else {
        line.split_once(char::is_whitespace)
            .map(|(id, rest)| (id, rest.trim_start()))
    }
}

/// Lazy iterator over the utterances of a text manifest.
///
/// Malformed lines are skipped without being reported; I/O errors are
/// yielded to the caller.
pub struct ManifestReader<R> {
    path: PathBuf,
    lines: Lines<R>,
    line_no: usize,
}

impl ManifestReader<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open manifest: {}", path.display()))?;
        Ok(Self::new(path, BufReader::new(file)))
    }
}

impl<R: BufRead> ManifestReader<R> {
    /// Wrap any buffered reader; `path` is only used in error messages.
    pub fn new(path: &Path, reader: R) -> Self {
        Self {
            path: path.to_path_buf(),
            lines: reader.lines(),
            line_no: 0,
        }
    }
}

impl<R: BufRead> Iterator for ManifestReader<R> {
    type Item = Result<Utterance>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = self.lines.next()?;
            self.line_no += 1;
            let line = match line {
                Ok(l) => l,
                Err(e) => {
                    return Some(Err(e).with_context(|| {
                        format!("Failed to read line {} of {}", self.line_no, self.path.display())
                    }));
                }
            };
            if let Some((id, text)) = parse_line(&line) {
                return Some(Ok(Utterance::new(id, text)));
            }
        }
    }
}

/// Utterance id to audio path, loaded from an scp manifest.
///
/// Later lines win when an id repeats.
#[derive(Debug, Default, Clone)]
pub struct PathIndex {
    paths: HashMap<String, String>,
}

impl PathIndex {
    pub fn load(path: &Path) -> Result<Self> {
        let mut index = Self::default();
        for entry in ManifestReader::open(path)? {
            let entry = entry?;
            index.paths.insert(entry.id, entry.text);
        }
        Ok(index)
    }

    pub fn get(&self, utt_id: &str) -> Option<&str> {
        self.paths.get(utt_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl FromIterator<(String, String)> for PathIndex {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            paths: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn read_all(content: &str) -> Vec<Utterance> {
        ManifestReader::new(Path::new("mem"), Cursor::new(content.to_string()))
            .collect::<Result<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn test_parse_line_tab() {
        assert_eq!(parse_line("utt1\t今日は 晴れ\n"), Some(("utt1", "今日は 晴れ")));
    }

    #[test]
    fn test_parse_line_whitespace_fallback() {
        assert_eq!(parse_line("utt1   hello world"), Some(("utt1", "hello world")));
    }

    #[test]
    fn test_parse_line_tab_wins_over_space() {
        assert_eq!(parse_line("utt 1\ttext"), Some(("utt 1", "text")));
    }

    #[test]
    fn test_parse_line_single_field() {
        assert_eq!(parse_line("utt1"), None);
        assert_eq!(parse_line("utt1\t"), None);
        assert_eq!(parse_line("   "), None);
        assert_eq!(parse_line(""), None);
    }

    #[test]
    fn test_reader_skips_malformed_lines() {
        let utts = read_all("a\tone\n\nbroken\nb two\n");
        assert_eq!(utts, vec![Utterance::new("a", "one"), Utterance::new("b", "two")]);
    }

    #[test]
    fn test_reader_keeps_file_order() {
        let utts = read_all("z\t1\ny\t2\nx\t3\n");
        let ids: Vec<&str> = utts.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["z", "y", "x"]);
    }

    #[test]
    fn test_open_missing_file() {
        assert!(ManifestReader::open(Path::new("/nonexistent/longtail/text")).is_err());
    }

    #[test]
    fn test_path_index_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wav.scp");
        std::fs::write(&path, "a\t/data/a.flac\nb /data/b.flac\nbad\na\t/data/a2.flac\n").unwrap();

        let index = PathIndex::load(&path).unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.get("a"), Some("/data/a2.flac"));
        assert_eq!(index.get("b"), Some("/data/b.flac"));
        assert_eq!(index.get("bad"), None);
    }
}
