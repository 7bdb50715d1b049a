//! Primary-key codec: one path segment per row.
//!
//! A row is addressed by its primary-key tuple. The codec joins the
//! stringified components with a fixed delimiter so the tuple fits in a
//! single directory-entry name, and splits the segment back when a path is
//! resolved. Components whose text contains the delimiter, a path
//! separator, or NUL are outside the codec's contract; no escaping is
//! attempted.

use crate::error::{BlobFsError, BlobFsResult};

/// Delimiter joining key components inside one path segment.
pub const KEY_DELIMITER: char = ',';

/// Encode a primary-key tuple as a single path segment.
///
/// Components must already be in key ordinal order.
pub fn encode(components: &[String]) -> String {
    components.join(&KEY_DELIMITER.to_string())
}

/// Decode a path segment into its key components.
///
/// Fails with [`BlobFsError::InvalidKey`] when the segment does not split
/// into exactly `arity` components.
pub fn decode(segment: &str, arity: usize) -> BlobFsResult<Vec<String>> {
    let components: Vec<String> = segment.split(KEY_DELIMITER).map(str::to_owned).collect();
    if components.len() != arity {
        return Err(BlobFsError::InvalidKey {
            segment: segment.to_owned(),
            expected: arity,
            actual: components.len(),
        });
    }
    Ok(components)
}
