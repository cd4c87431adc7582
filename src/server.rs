//! Read-only HTTP query surface over a decoded snapshot.
//!
//! Two endpoints, both answering the `{code, errMsg, data}` envelope:
//!
//! - `GET /keys[?db=N][&pattern=G]` lists keys, optionally restricted to
//!   one database and filtered by a glob pattern.
//! - `GET /keys/:key[?db=N]` looks one key up and returns its type and
//!   fully shaped value.
//!
//! The snapshot is immutable once serving starts; handlers only read.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use globset::Glob;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::catalog::{Entry, RdbValue};
use crate::rdb::Snapshot;

/// Response envelope shared by every endpoint.
#[derive(Debug, Serialize)]
pub struct Envelope {
    pub code: i32,
    #[serde(rename = "errMsg")]
    pub err_msg: String,
    pub data: Value,
}

impl Envelope {
    fn ok(data: Value) -> Json<Self> {
        Json(Self {
            code: 0,
            err_msg: String::new(),
            data,
        })
    }

    fn err(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            code: 1,
            err_msg: message.into(),
            data: Value::Null,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct KeysQuery {
    pub db: Option<u64>,
    pub pattern: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct KeyQuery {
    pub db: Option<u64>,
}

/// Serves the query surface until the listener fails or the task is
/// dropped.
pub async fn serve(snapshot: Arc<Snapshot>, addr: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(snapshot)).await
}

pub fn router(snapshot: Arc<Snapshot>) -> Router {
    Router::new()
        .route("/keys", get(list_keys))
        .route("/keys/:key", get(get_key))
        .with_state(snapshot)
}

async fn list_keys(
    State(snapshot): State<Arc<Snapshot>>,
    Query(query): Query<KeysQuery>,
) -> (StatusCode, Json<Envelope>) {
    let matcher = match query.pattern.as_deref() {
        Some(pattern) => match Glob::new(pattern) {
            Ok(glob) => Some(glob.compile_matcher()),
            Err(e) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Envelope::err(format!("invalid pattern: {}", e)),
                );
            }
        },
        None => None,
    };

    let mut rows: Vec<(u64, String, &'static str)> = Vec::new();
    for (db_id, database) in snapshot.catalog.databases() {
        if query.db.is_some_and(|want| want != db_id) {
            continue;
        }
        for (key, entry) in &database.entries {
            let key = String::from_utf8_lossy(key).into_owned();
            if matcher.as_ref().is_some_and(|m| !m.is_match(&key)) {
                continue;
            }
            rows.push((db_id, key, entry.object.value.type_name()));
        }
    }
    rows.sort();

    let data = rows
        .into_iter()
        .map(|(db, key, type_name)| json!({ "db": db, "key": key, "type": type_name }))
        .collect();

    (StatusCode::OK, Envelope::ok(Value::Array(data)))
}

async fn get_key(
    State(snapshot): State<Arc<Snapshot>>,
    Path(key): Path<String>,
    Query(query): Query<KeyQuery>,
) -> (StatusCode, Json<Envelope>) {
    let db = query.db.unwrap_or(0);

    match snapshot.catalog.get(db, key.as_bytes()) {
        Some(entry) => (StatusCode::OK, Envelope::ok(entry_json(entry))),
        None => (
            StatusCode::NOT_FOUND,
            Envelope::err(format!("key not found: {}", key)),
        ),
    }
}

fn entry_json(entry: &Entry) -> Value {
    let mut data = json!({
        "type": entry.object.value.type_name(),
        "typeTag": entry.object.value.type_tag(),
        "elements": entry.object.value.element_count(),
        "loadLen": entry.object.load_len,
        "value": value_json(&entry.object.value),
    });
    if let Some(expires_at) = entry.expires_at {
        data["expiresAt"] = Value::String(expires_at.to_string());
    }
    data
}

fn value_json(value: &RdbValue) -> Value {
    match value {
        RdbValue::String(bytes) => Value::String(text(bytes)),
        RdbValue::List(items) => Value::Array(items.iter().map(|b| Value::String(text(b))).collect()),
        RdbValue::Set(members) => {
            let mut members: Vec<String> = members.iter().map(|b| text(b)).collect();
            members.sort();
            json!(members)
        }
        RdbValue::SortedSet(members) => {
            let members: BTreeMap<String, Value> = members
                .iter()
                .map(|(member, score)| (text(member), score_json(*score)))
                .collect();
            json!(members)
        }
        RdbValue::Hash(fields) => {
            let fields: BTreeMap<String, String> = fields
                .iter()
                .map(|(field, value)| (text(field), text(value)))
                .collect();
            json!(fields)
        }
    }
}

/// JSON numbers cannot carry NaN or the infinities; those scores become
/// strings.
fn score_json(score: f64) -> Value {
    if score.is_nan() {
        json!("nan")
    } else if score == f64::INFINITY {
        json!("inf")
    } else if score == f64::NEG_INFINITY {
        json!("-inf")
    } else {
        json!(score)
    }
}

fn text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
