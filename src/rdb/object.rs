use std::collections::{HashMap, HashSet};

use bytes::Bytes;

use crate::catalog::{RdbObject, RdbValue};
use crate::rdb::cursor::Cursor;
use crate::rdb::encoding::{read_length, read_string};
use crate::rdb::error::DecodeError;
use crate::rdb::ziplist::Ziplist;

pub(crate) const TYPE_STRING: u8 = 0;
pub(crate) const TYPE_LIST: u8 = 1;
pub(crate) const TYPE_SET: u8 = 2;
pub(crate) const TYPE_ZSET: u8 = 3;
pub(crate) const TYPE_HASH: u8 = 4;
pub(crate) const TYPE_ZSET_2: u8 = 5;
pub(crate) const TYPE_MODULE: u8 = 6;
pub(crate) const TYPE_MODULE_2: u8 = 7;
pub(crate) const TYPE_HASH_ZIPMAP: u8 = 9;
pub(crate) const TYPE_LIST_ZIPLIST: u8 = 10;
pub(crate) const TYPE_SET_INTSET: u8 = 11;
pub(crate) const TYPE_ZSET_ZIPLIST: u8 = 12;
pub(crate) const TYPE_HASH_ZIPLIST: u8 = 13;
pub(crate) const TYPE_LIST_QUICKLIST: u8 = 14;

const SCORE_NAN: u8 = 253;
const SCORE_POS_INF: u8 = 254;
const SCORE_NEG_INF: u8 = 255;

/// Where decoded list elements are inserted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListOrder {
    /// Each decoded element goes to the front, reversing stream order.
    #[default]
    Prepend,
    /// Stream order is kept.
    Append,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DecodeOptions {
    pub list_order: ListOrder,
}

/// Loads one object body from the stream.
///
/// Returns `None` for encodings that are recognized but not interpreted
/// (zipmap, intset): their blob is consumed so the stream stays aligned,
/// but nothing is materialized.
pub(crate) fn load_object(
    cursor: &mut Cursor,
    type_tag: u8,
    options: DecodeOptions,
) -> Result<Option<RdbObject>, DecodeError> {
    cursor.reset_object_bytes();

    let value = match type_tag {
        TYPE_STRING => Some(RdbValue::String(read_string(cursor)?)),
        TYPE_LIST => {
            let count = read_length(cursor)?;
            let mut items = Vec::with_capacity(count);
            for _ in 0..count {
                insert_list_item(&mut items, read_string(cursor)?, options.list_order);
            }
            Some(RdbValue::List(items))
        }
        TYPE_SET => {
            let count = read_length(cursor)?;
            let mut members = HashSet::with_capacity(count);
            for _ in 0..count {
                members.insert(read_string(cursor)?);
            }
            Some(RdbValue::Set(members))
        }
        TYPE_ZSET | TYPE_ZSET_2 => {
            let count = read_length(cursor)?;
            let mut members = HashMap::with_capacity(count);
            for _ in 0..count {
                let member = read_string(cursor)?;
                let score = if type_tag == TYPE_ZSET_2 {
                    read_binary_double(cursor)?
                } else {
                    read_textual_double(cursor)?
                };
                members.insert(member, score);
            }
            Some(RdbValue::SortedSet(members))
        }
        TYPE_HASH => {
            let count = read_length(cursor)?;
            let mut fields = HashMap::with_capacity(count);
            for _ in 0..count {
                let field = read_string(cursor)?;
                let value = read_string(cursor)?;
                fields.insert(field, value);
            }
            Some(RdbValue::Hash(fields))
        }
        TYPE_MODULE | TYPE_MODULE_2 => {
            return Err(DecodeError::ModuleUnsupported {
                tag: type_tag,
                offset: cursor.offset(),
            });
        }
        TYPE_HASH_ZIPMAP | TYPE_SET_INTSET => {
            read_string(cursor)?;
            None
        }
        TYPE_LIST_ZIPLIST => {
            let mut items = Vec::new();
            load_ziplist_into(cursor, &mut items, options.list_order)?;
            Some(RdbValue::List(items))
        }
        TYPE_ZSET_ZIPLIST => {
            let blob = read_string(cursor)?;
            let mut ziplist = Ziplist::new(blob)?;
            // Member and score alternate, so the logical size is half the
            // physical entry count.
            let pairs = ziplist.entry_count() / 2;
            let mut members = HashMap::with_capacity(pairs as usize);
            for _ in 0..pairs {
                let member = ziplist.next_entry()?;
                let score_text = ziplist.next_entry()?;
                let score = parse_score_text(&score_text, cursor.offset())?;
                members.insert(member, score);
            }
            Some(RdbValue::SortedSet(members))
        }
        TYPE_HASH_ZIPLIST => {
            let blob = read_string(cursor)?;
            let mut ziplist = Ziplist::new(blob)?;
            let pairs = ziplist.entry_count() / 2;
            let mut fields = HashMap::with_capacity(pairs as usize);
            for _ in 0..pairs {
                let field = ziplist.next_entry()?;
                let value = ziplist.next_entry()?;
                fields.insert(field, value);
            }
            Some(RdbValue::Hash(fields))
        }
        TYPE_LIST_QUICKLIST => {
            let segments = read_length(cursor)?;
            let mut items = Vec::new();
            for _ in 0..segments {
                load_ziplist_into(cursor, &mut items, options.list_order)?;
            }
            Some(RdbValue::List(items))
        }
        tag => {
            return Err(DecodeError::UnknownObjectType {
                tag,
                offset: cursor.offset(),
            });
        }
    };

    Ok(value.map(|value| RdbObject {
        value,
        load_len: cursor.object_bytes(),
    }))
}

fn insert_list_item(items: &mut Vec<Bytes>, item: Bytes, order: ListOrder) {
    match order {
        ListOrder::Prepend => items.insert(0, item),
        ListOrder::Append => items.push(item),
    }
}

/// Reads one string-wrapped ziplist and feeds every entry into `items`.
fn load_ziplist_into(
    cursor: &mut Cursor,
    items: &mut Vec<Bytes>,
    order: ListOrder,
) -> Result<(), DecodeError> {
    let blob = read_string(cursor)?;
    let mut ziplist = Ziplist::new(blob)?;
    for _ in 0..ziplist.entry_count() {
        insert_list_item(items, ziplist.next_entry()?, order);
    }
    Ok(())
}

/// v1 score: one length byte with sentinels for NaN and the infinities,
/// otherwise that many bytes of ASCII decimal.
fn read_textual_double(cursor: &mut Cursor) -> Result<f64, DecodeError> {
    match cursor.take_byte()? {
        SCORE_NAN => Ok(f64::NAN),
        SCORE_POS_INF => Ok(f64::INFINITY),
        SCORE_NEG_INF => Ok(f64::NEG_INFINITY),
        len => {
            let offset = cursor.offset();
            let text = cursor.take(len as usize)?;
            parse_score_text(&text, offset)
        }
    }
}

/// v2 score: IEEE-754 binary64, little-endian.
fn read_binary_double(cursor: &mut Cursor) -> Result<f64, DecodeError> {
    let buf = cursor.take(8)?;
    Ok(f64::from_le_bytes([
        buf[0], buf[1], buf[2], buf[3], buf[4], buf[5], buf[6], buf[7],
    ]))
}

fn parse_score_text(text: &[u8], offset: usize) -> Result<f64, DecodeError> {
    std::str::from_utf8(text)
        .ok()
        .and_then(|text| text.parse::<f64>().ok())
        .ok_or_else(|| DecodeError::InvalidScore {
            text: String::from_utf8_lossy(text).into_owned(),
            offset,
        })
}
