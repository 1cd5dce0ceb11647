//! Tokenization and the content-word rule.

pub mod tokenizer;
pub mod word_filter;

pub use tokenizer::{Tokenizer, get_tokenizer};
pub use word_filter::{WordFilter, is_valid_word};
