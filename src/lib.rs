//! An RDB snapshot explorer.
//!
//! This crate decodes a Redis persistence snapshot (RDB) file into an
//! in-memory catalog of typed objects and serves read-only queries over
//! HTTP. The decoder supports:
//!
//! - RDB format versions 1 through 8
//! - Strings, lists, sets, sorted sets, and hashes
//! - Integer-packed and LZF-compressed string encodings
//! - Ziplist-packed and quicklist-wrapped aggregate encodings
//! - Key expiry opcodes in seconds and milliseconds
//!
//! Decoding is synchronous and all-or-nothing: a malformed stream yields a
//! single [`rdb::DecodeError`] and no catalog.

pub mod catalog;
pub mod rdb;
pub mod server;
