use std::collections::HashMap;

use bytes::Bytes;
use jiff::Timestamp;

use crate::catalog::{Catalog, Entry};
use crate::rdb::cursor::Cursor;
use crate::rdb::encoding::{read_length, read_string};
use crate::rdb::error::DecodeError;
use crate::rdb::object::{self, DecodeOptions};

const OPCODE_AUX: u8 = 0xFA;
const OPCODE_RESIZEDB: u8 = 0xFB;
const OPCODE_EXPIRETIME_MS: u8 = 0xFC;
const OPCODE_EXPIRETIME: u8 = 0xFD;
const OPCODE_SELECTDB: u8 = 0xFE;
const OPCODE_EOF: u8 = 0xFF;

const MAGIC: &[u8] = b"REDIS";
const MAX_VERSION: u32 = 8;
const HEADER_LEN: usize = 9;
const CHECKSUM_LEN: usize = 8;

/// Everything recovered from one RDB stream.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Version digits from the header, in `[1, 8]`.
    pub version: u32,
    /// AUX metadata fields (`redis-ver`, `ctime`, ...).
    pub aux: HashMap<String, String>,
    pub catalog: Catalog,
    /// CRC64 trailer bytes, when the stream carries them. Captured, not
    /// verified.
    pub checksum: Option<[u8; 8]>,
}

/// Pull parser over a complete RDB byte stream.
///
/// The parse is synchronous and all-or-nothing: [`decode`](Self::decode)
/// consumes the decoder and either returns a full [`Snapshot`] or the first
/// error, never a partially populated catalog.
#[derive(Debug)]
pub struct RdbDecoder {
    cursor: Cursor,
    options: DecodeOptions,
    current_db: u64,
    pending_expiry: Option<Timestamp>,
}

impl RdbDecoder {
    pub fn new(data: Bytes) -> Self {
        Self::with_options(data, DecodeOptions::default())
    }

    pub fn with_options(data: Bytes, options: DecodeOptions) -> Self {
        Self {
            cursor: Cursor::new(data),
            options,
            current_db: 0,
            pending_expiry: None,
        }
    }

    /// Runs the parse to completion.
    pub fn decode(mut self) -> Result<Snapshot, DecodeError> {
        let version = self.read_header()?;
        let mut aux = HashMap::new();
        let mut catalog = Catalog::new();
        let checksum;

        loop {
            let mut type_tag = self.cursor.take_byte()?;

            match type_tag {
                OPCODE_AUX => {
                    let key = read_string(&mut self.cursor)?;
                    let value = read_string(&mut self.cursor)?;
                    aux.insert(lossy(&key), lossy(&value));
                    continue;
                }
                OPCODE_SELECTDB => {
                    self.current_db = read_length(&mut self.cursor)? as u64;
                    continue;
                }
                OPCODE_RESIZEDB => {
                    let main_size = read_length(&mut self.cursor)? as u64;
                    let expires_size = read_length(&mut self.cursor)? as u64;
                    let database = catalog.database_mut(self.current_db);
                    database.declared_size = Some(main_size);
                    database.declared_expires = Some(expires_size);
                    continue;
                }
                OPCODE_EXPIRETIME => {
                    self.pending_expiry = Some(self.read_second_expiry()?);
                    continue;
                }
                OPCODE_EXPIRETIME_MS => {
                    self.pending_expiry = Some(self.read_millisecond_expiry()?);
                    // The object type for the expiring key follows directly.
                    type_tag = self.cursor.take_byte()?;
                }
                OPCODE_EOF => {
                    checksum = self.read_trailer();
                    break;
                }
                _ => {}
            }

            let key = read_string(&mut self.cursor)?;
            // A pending expiry pairs with exactly this load, then clears.
            let expires_at = self.pending_expiry.take();
            if let Some(object) = object::load_object(&mut self.cursor, type_tag, self.options)? {
                catalog
                    .database_mut(self.current_db)
                    .entries
                    .insert(key, Entry { object, expires_at });
            }
        }

        Ok(Snapshot {
            version,
            aux,
            catalog,
            checksum,
        })
    }

    /// Nine header bytes: the `REDIS` magic and four ASCII version digits.
    fn read_header(&mut self) -> Result<u32, DecodeError> {
        let header = self.cursor.take(HEADER_LEN)?;
        if &header[..MAGIC.len()] != MAGIC {
            return Err(DecodeError::BadMagic);
        }

        let digits = &header[MAGIC.len()..];
        if !digits.iter().all(u8::is_ascii_digit) {
            return Err(DecodeError::UnsupportedVersion(lossy(digits)));
        }

        let version: u32 = lossy(digits)
            .parse()
            .map_err(|_| DecodeError::UnsupportedVersion(lossy(digits)))?;
        if version < 1 || version > MAX_VERSION {
            return Err(DecodeError::UnsupportedVersion(lossy(digits)));
        }

        Ok(version)
    }

    fn read_second_expiry(&mut self) -> Result<Timestamp, DecodeError> {
        let offset = self.cursor.offset();
        let buf = self.cursor.take(4)?;
        let seconds = u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);

        Timestamp::from_second(seconds as i64).map_err(|_| DecodeError::InvalidExpiry { offset })
    }

    fn read_millisecond_expiry(&mut self) -> Result<Timestamp, DecodeError> {
        let offset = self.cursor.offset();
        let buf = self.cursor.take(8)?;
        let millis = u64::from_le_bytes([
            buf[0], buf[1], buf[2], buf[3], buf[4], buf[5], buf[6], buf[7],
        ]);

        i64::try_from(millis)
            .ok()
            .and_then(|millis| Timestamp::from_millisecond(millis).ok())
            .ok_or(DecodeError::InvalidExpiry { offset })
    }

    /// Captures the CRC64 trailer when the stream carries one. Old streams
    /// end right at the EOF opcode.
    fn read_trailer(&mut self) -> Option<[u8; 8]> {
        if self.cursor.remaining() < CHECKSUM_LEN {
            return None;
        }
        let buf = self.cursor.take(CHECKSUM_LEN).ok()?;
        let mut checksum = [0u8; 8];
        checksum.copy_from_slice(&buf);
        Some(checksum)
    }
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
