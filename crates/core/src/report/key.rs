//! Grouping key derivation

use ledgersync_domain::constants::{GROUP_KEY_SEGMENTS, GROUP_KEY_SEPARATOR};
use ledgersync_domain::StoredRecord;

/// Rebuild a `major.sub.detail` key from a flat account code.
///
/// Segments are taken by character position, so multi-byte codes never split
/// inside a character. Empty trailing segments are left out: `"1234"` yields
/// `"123.4"`.
pub fn grouping_key(code: &str) -> String {
    let chars: Vec<char> = code.chars().collect();
    GROUP_KEY_SEGMENTS
        .iter()
        .filter_map(|&(start, end)| {
            let end = end.min(chars.len());
            (start < end).then(|| chars[start..end].iter().collect::<String>())
        })
        .collect::<Vec<_>>()
        .join(GROUP_KEY_SEPARATOR)
}

/// Grouping key of a stored row; an empty code falls back to its identity.
pub fn record_key(record: &StoredRecord) -> String {
    if record.code.is_empty() {
        grouping_key(&record.external_id)
    } else {
        grouping_key(&record.code)
    }
}
