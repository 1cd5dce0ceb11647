//! Synthetic ids for duplicated utterances: `<source_id>_dup<k>`, k >= 1.
//!
//! The selector encodes and the joiner decodes; both go through here.

/// Separator between the source id and the duplicate number.
pub const DUP_SEPARATOR: &str = "_dup";

/// Build the id of the `k`-th duplicate of `source_id` (1-based).
pub fn encode(source_id: &str, k: u64) -> String {
    debug_assert!(k >= 1, "duplicate numbers start at 1");
    format!("{}{}{}", source_id, DUP_SEPARATOR, k)
}

/// Split a duplicate id into `(source_id, k)`.
///
/// Only the last separator is considered, so source ids that themselves
/// contain `_dup` survive the round trip.
pub fn decode(id: &str) -> Option<(&str, u64)> {
    let (source, k) = id.rsplit_once(DUP_SEPARATOR)?;
    if k.is_empty() || !k.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    match k.parse::<u64>() {
        Ok(k) if k >= 1 => Some((source, k)),
        _ => None,
    }
}

/// Strip the duplicate suffix; ids without one are returned unchanged.
pub fn source_of(id: &str) -> &str {
    decode(id).map(|(source, _)| source).unwrap_or(id)
}
