//! Two-column manifest I/O and the line-join tools built on it.

pub mod mix;
pub mod reader;
pub mod rebase;
pub mod scp;
pub mod split;
pub mod writer;

pub use reader::{ManifestReader, PathIndex, parse_line};
pub use writer::PairedWriter;
