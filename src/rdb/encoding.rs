use bytes::Bytes;

use crate::rdb::cursor::Cursor;
use crate::rdb::error::DecodeError;
use crate::rdb::lzf;

const ENC_INT8: u8 = 0;
const ENC_INT16: u8 = 1;
const ENC_INT32: u8 = 2;
const ENC_LZF: u8 = 3;

const LEN_32BIT: u8 = 0x80;
const LEN_64BIT: u8 = 0x81;

/// How the bytes following a length marker are laid out.
#[derive(Debug)]
enum StringForm {
    /// Plain payload of the given byte length.
    Raw(usize),
    /// The low six bits named one of the special string encodings.
    Encoded(u8),
}

/// Decodes the bit-packed length form.
///
/// The top two bits of the first byte select the scheme: `00` keeps the
/// length in the remaining six bits, `01` combines them big-endian with one
/// more byte for fourteen bits, and a whole byte of `0x80`/`0x81` is
/// followed by a big-endian u32/u64. A `11` prefix is not a length at all
/// but an encoded-value marker surfaced to [`read_string`].
fn read_string_form(cursor: &mut Cursor) -> Result<StringForm, DecodeError> {
    let offset = cursor.offset();
    let first = cursor.take_byte()?;

    match first >> 6 {
        0b00 => Ok(StringForm::Raw((first & 0x3F) as usize)),
        0b01 => {
            let second = cursor.take_byte()?;
            // High six bits from the first byte, low eight from the second.
            Ok(StringForm::Raw(
                (((first & 0x3F) as usize) << 8) | second as usize,
            ))
        }
        0b10 => match first {
            LEN_32BIT => {
                let buf = cursor.take(4)?;
                let len = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]);
                Ok(StringForm::Raw(len as usize))
            }
            LEN_64BIT => {
                let buf = cursor.take(8)?;
                let len = u64::from_be_bytes([
                    buf[0], buf[1], buf[2], buf[3], buf[4], buf[5], buf[6], buf[7],
                ]);
                Ok(StringForm::Raw(len as usize))
            }
            byte => Err(DecodeError::UnknownLengthEncoding { byte, offset }),
        },
        _ => Ok(StringForm::Encoded(first & 0x3F)),
    }
}

/// Reads a plain length. Encoded-value markers are not lengths and are
/// rejected here; callers that accept them go through [`read_string`].
pub fn read_length(cursor: &mut Cursor) -> Result<usize, DecodeError> {
    let offset = cursor.offset();
    match read_string_form(cursor)? {
        StringForm::Raw(len) => Ok(len),
        StringForm::Encoded(_) => Err(DecodeError::UnexpectedEncodedLength { offset }),
    }
}

/// Reads one RDB string object: raw bytes, a packed integer rendered as
/// decimal text, or an LZF-compressed payload.
pub fn read_string(cursor: &mut Cursor) -> Result<Bytes, DecodeError> {
    let offset = cursor.offset();
    match read_string_form(cursor)? {
        StringForm::Raw(len) => cursor.take(len),
        StringForm::Encoded(code) => match code {
            ENC_INT8 => {
                let buf = cursor.take(1)?;
                Ok(decimal(buf[0] as i8 as i64))
            }
            ENC_INT16 => {
                let buf = cursor.take(2)?;
                Ok(decimal(i16::from_le_bytes([buf[0], buf[1]]) as i64))
            }
            ENC_INT32 => {
                let buf = cursor.take(4)?;
                Ok(decimal(
                    i32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]) as i64,
                ))
            }
            ENC_LZF => read_lzf_string(cursor),
            code => Err(DecodeError::UnknownStringEncoding { code, offset }),
        },
    }
}

/// Compressed length, uncompressed length, then the compressed payload.
fn read_lzf_string(cursor: &mut Cursor) -> Result<Bytes, DecodeError> {
    let compressed_len = read_length(cursor)?;
    let uncompressed_len = read_length(cursor)?;
    let compressed = cursor.take(compressed_len)?;

    Ok(Bytes::from(lzf::decompress(&compressed, uncompressed_len)?))
}

pub(crate) fn decimal(value: i64) -> Bytes {
    Bytes::from(value.to_string().into_bytes())
}
