//! Decide which tokens count as words for frequency purposes.

use crate::config::WordFilterConfig;
use crate::types::Token;

/// Hiragana ぁ..ん, katakana ァ..ン and the long vowel mark.
fn is_kana(c: char) -> bool {
    matches!(c, '\u{3041}'..='\u{3093}' | '\u{30A1}'..='\u{30F3}' | '\u{30FC}')
}

/// Not a word character: anything but letters and digits, plus `_`.
fn is_non_word(c: char) -> bool {
    c == '_' || !c.is_alphanumeric()
}

/// Return true if `word` should be counted.
///
/// Pure: the same inputs always give the same answer, so pass 1 and
/// pass 2 agree as long as they share the arguments.
pub fn is_valid_word(word: &str, min_len: usize, filter_alnum: bool, filter_kana: bool) -> bool {
    if word.chars().count() < min_len {
        return false;
    }
    if word.is_empty() {
        return true;
    }
    if filter_alnum && word.chars().all(|c| c.is_ascii_alphanumeric()) {
        return false;
    }
    if filter_kana && word.chars().all(is_kana) {
        return false;
    }
    if word.chars().all(is_non_word) {
        return false;
    }
    true
}

/// Content-word rule applied identically by both passes.
#[derive(Debug, Clone)]
pub struct WordFilter {
    config: WordFilterConfig,
}

impl WordFilter {
    pub fn new(config: WordFilterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WordFilterConfig {
        &self.config
    }

    pub fn accepts(&self, word: &str) -> bool {
        is_valid_word(
            word,
            self.config.min_len,
            self.config.filter_alnum,
            self.config.filter_kana,
        )
    }

    /// True if the token carries the content tag and passes the filter.
    pub fn is_content_word(&self, token: &Token) -> bool {
        token.pos == self.config.content_pos && self.accepts(&token.surface)
    }

    /// Surfaces of the content words in `tokens`, in order, repeats kept.
    pub fn content_words<'a>(&'a self, tokens: &'a [Token]) -> impl Iterator<Item = &'a str> + 'a {
        tokens
            .iter()
            .filter(move |t| self.is_content_word(t))
            .map(|t| t.surface.as_str())
    }
}

impl Default for WordFilter {
    fn default() -> Self {
        Self::new(WordFilterConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_len_counts_chars_not_bytes() {
        // 2 chars, 6 bytes
        assert!(is_valid_word("東京", 2, true, true));
        assert!(!is_valid_word("東", 2, true, true));
        assert!(is_valid_word("東", 1, true, true));
    }

    #[test]
    fn test_alnum_filter() {
        assert!(!is_valid_word("ABC123", 2, true, true));
        assert!(is_valid_word("ABC123", 2, false, true));
        // Mixed with non-ASCII is not pure alnum
        assert!(is_valid_word("AI技術", 2, true, true));
        // Full-width digits are not ASCII
        assert!(is_valid_word("１２３", 2, true, true));
    }

    #[test]
    fn test_kana_filter() {
        assert!(!is_valid_word("ひらがな", 2, true, true));
        assert!(!is_valid_word("カタカナ", 2, true, true));
        assert!(!is_valid_word("ラーメン", 2, true, true));
        assert!(is_valid_word("ラーメン", 2, true, false));
        // Kanji mixed with kana survives
        assert!(is_valid_word("お茶", 2, true, true));
    }

    #[test]
    fn test_kana_range_edges() {
        assert!(is_kana('ぁ'));
        assert!(is_kana('ん'));
        assert!(is_kana('ァ'));
        assert!(is_kana('ン'));
        assert!(is_kana('ー'));
        // ゔ and ヴ sit just outside the ranges
        assert!(!is_kana('ゔ'));
        assert!(!is_kana('ヴ'));
        assert!(!is_kana('・'));
    }

    #[test]
    fn test_punctuation_always_rejected() {
        assert!(!is_valid_word("。、", 1, false, false));
        assert!(!is_valid_word("!!", 1, false, false));
        assert!(!is_valid_word("__", 1, false, false));
        assert!(!is_valid_word("「」", 1, false, false));
        assert!(is_valid_word("a_", 1, false, false));
    }

    #[test]
    fn test_content_word_requires_pos() {
        let filter = WordFilter::default();
        assert!(filter.is_content_word(&Token::new("東京", "名詞")));
        assert!(!filter.is_content_word(&Token::new("東京", "動詞")));
        assert!(!filter.is_content_word(&Token::new("これ", "名詞")));
    }

    #[test]
    fn test_content_words_keeps_order_and_repeats() {
        let filter = WordFilter::default();
        let tokens = vec![
            Token::new("東京", "名詞"),
            Token::new("に", "助詞"),
            Token::new("大阪", "名詞"),
            Token::new("東京", "名詞"),
        ];
        let words: Vec<&str> = filter.content_words(&tokens).collect();
        assert_eq!(words, vec!["東京", "大阪", "東京"]);
    }

    #[test]
    fn test_custom_content_pos() {
        let filter = WordFilter::new(WordFilterConfig {
            content_pos: "NOUN".into(),
            filter_alnum: false,
            ..Default::default()
        });
        assert!(filter.is_content_word(&Token::new("river", "NOUN")));
        assert!(!filter.is_content_word(&Token::new("river", "名詞")));
    }
}
