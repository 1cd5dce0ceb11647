//! Long-tail lexical oversampling.

pub mod deficit;
pub mod dup_id;
pub mod frequency;
pub mod join;
pub mod process;
pub mod selector;
pub mod shuffle;

pub use deficit::{DeficitTable, LongTailSet};
pub use frequency::FrequencyTable;
pub use process::{SelectPaths, process, write_report};
pub use selector::{LongTailSelector, SelectionOutcome};
