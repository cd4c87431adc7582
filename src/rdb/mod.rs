//! The RDB stream decoder.
//!
//! A pull parser that consumes a byte stream prefixed by the fixed `REDIS`
//! header, dispatches on the tagged-opcode control language, and rebuilds
//! strings, lists, sets, sorted sets, and hashes across their physical
//! encodings: raw, integer-packed, LZF-compressed, ziplist-packed, and
//! quicklist-wrapped.

mod cursor;
mod decoder;
mod encoding;
mod error;
mod lzf;
mod object;
mod ziplist;

pub use decoder::{RdbDecoder, Snapshot};
pub use error::DecodeError;
pub use object::{DecodeOptions, ListOrder};

use std::path::Path;

use bytes::Bytes;

/// Reads an RDB file from disk and decodes it.
pub async fn parse_rdb_file(path: impl AsRef<Path>) -> Result<Snapshot, DecodeError> {
    let data = tokio::fs::read(path)
        .await
        .map_err(|e| DecodeError::Io(e.to_string()))?;

    RdbDecoder::new(Bytes::from(data)).decode()
}
