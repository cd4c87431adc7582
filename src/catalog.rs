//! Typed objects decoded from an RDB stream and the catalog that holds them.
//!
//! The catalog namespaces entries by database id, so identical key bytes in
//! two databases never collide. Values are strongly shaped per type so
//! consumers can pattern-match instead of probing a type-erased container.

use std::collections::{BTreeMap, HashMap, HashSet};

use bytes::Bytes;
use jiff::Timestamp;

/// A decoded Redis value.
///
/// Sorted set scores admit NaN and the infinities; a v1 stream writes them
/// as the sentinel length bytes 253/254/255.
#[derive(Debug, Clone, PartialEq)]
pub enum RdbValue {
    String(Bytes),
    List(Vec<Bytes>),
    Set(HashSet<Bytes>),
    SortedSet(HashMap<Bytes, f64>),
    Hash(HashMap<Bytes, Bytes>),
}

impl RdbValue {
    /// Canonical RDB type tag. Packed encodings normalize to their logical
    /// type and ZSET v2 normalizes to 3.
    pub fn type_tag(&self) -> u8 {
        match self {
            RdbValue::String(_) => 0,
            RdbValue::List(_) => 1,
            RdbValue::Set(_) => 2,
            RdbValue::SortedSet(_) => 3,
            RdbValue::Hash(_) => 4,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            RdbValue::String(_) => "string",
            RdbValue::List(_) => "list",
            RdbValue::Set(_) => "set",
            RdbValue::SortedSet(_) => "zset",
            RdbValue::Hash(_) => "hash",
        }
    }

    /// Number of elements: pairs for hashes and sorted sets, one for a
    /// plain string.
    pub fn element_count(&self) -> usize {
        match self {
            RdbValue::String(_) => 1,
            RdbValue::List(items) => items.len(),
            RdbValue::Set(members) => members.len(),
            RdbValue::SortedSet(members) => members.len(),
            RdbValue::Hash(fields) => fields.len(),
        }
    }
}

/// One decoded object together with the number of stream bytes its load
/// consumed.
#[derive(Debug, Clone, PartialEq)]
pub struct RdbObject {
    pub value: RdbValue,
    pub load_len: usize,
}

/// A keyed object plus its expiry, when the stream carried one.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub object: RdbObject,
    pub expires_at: Option<Timestamp>,
}

/// One logical Redis database inside the snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Database {
    pub entries: HashMap<Bytes, Entry>,
    /// Advertised main-table size from RESIZEDB, when seen.
    pub declared_size: Option<u64>,
    /// Advertised expires-table size from RESIZEDB, when seen.
    pub declared_expires: Option<u64>,
}

/// Every decoded key, namespaced by database id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    databases: BTreeMap<u64, Database>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn database_mut(&mut self, id: u64) -> &mut Database {
        self.databases.entry(id).or_default()
    }

    pub fn database(&self, id: u64) -> Option<&Database> {
        self.databases.get(&id)
    }

    /// Databases in ascending id order.
    pub fn databases(&self) -> impl Iterator<Item = (u64, &Database)> {
        self.databases.iter().map(|(id, db)| (*id, db))
    }

    pub fn get(&self, db: u64, key: &[u8]) -> Option<&Entry> {
        self.databases.get(&db).and_then(|db| db.entries.get(key))
    }

    /// Every `(database id, key)` pair in the catalog.
    pub fn keys(&self) -> impl Iterator<Item = (u64, &Bytes)> {
        self.databases
            .iter()
            .flat_map(|(id, db)| db.entries.keys().map(move |key| (*id, key)))
    }

    /// Total number of keys across all databases.
    pub fn len(&self) -> usize {
        self.databases.values().map(|db| db.entries.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
