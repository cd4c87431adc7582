use thiserror::Error;

/// Errors produced while decoding an RDB stream.
///
/// Every variant is fatal for the whole parse: there is no local recovery,
/// and a failed decode never exposes a partially populated catalog. Where a
/// stream position exists the variant carries the cursor offset so a bad
/// input can be located.
#[derive(Error, Debug, PartialEq, Clone)]
pub enum DecodeError {
    #[error("failed to read rdb file: {0}")]
    Io(String),
    #[error("bad magic bytes, expected \"REDIS\"")]
    BadMagic,
    #[error("cannot handle RDB format version {0:?}")]
    UnsupportedVersion(String),
    #[error("short read at offset {offset}: needed {needed} bytes, {available} available")]
    ShortRead {
        offset: usize,
        needed: usize,
        available: usize,
    },
    #[error("unknown length encoding 0x{byte:02x} at offset {offset}")]
    UnknownLengthEncoding { byte: u8, offset: usize },
    #[error("encoded-value marker where a plain length was required at offset {offset}")]
    UnexpectedEncodedLength { offset: usize },
    #[error("unknown string encoding {code} at offset {offset}")]
    UnknownStringEncoding { code: u8, offset: usize },
    #[error("unknown object type 0x{tag:02x} at offset {offset}")]
    UnknownObjectType { tag: u8, offset: usize },
    #[error("module payloads are not supported (object type 0x{tag:02x} at offset {offset})")]
    ModuleUnsupported { tag: u8, offset: usize },
    #[error("unknown ziplist entry flag 0x{flag:02x}")]
    UnknownZiplistFlag { flag: u8 },
    #[error("ziplist blob too small for its header ({len} bytes)")]
    ZiplistHeaderTooSmall { len: usize },
    #[error("ziplist entry runs past the end of its blob (index {index}, blob length {len})")]
    ZiplistOverrun { index: usize, len: usize },
    #[error("lzf stream is malformed: {0}")]
    LzfCorrupt(&'static str),
    #[error("lzf produced {produced} bytes, expected {expected}")]
    LzfLengthMismatch { produced: usize, expected: usize },
    #[error("invalid sorted set score {text:?} at offset {offset}")]
    InvalidScore { text: String, offset: usize },
    #[error("expiry timestamp out of range at offset {offset}")]
    InvalidExpiry { offset: usize },
}
