//! Import normalization for Rust+ pairing output
//!
//! Different pairing tools (the `rustplus.js` CLI, FCM listeners, community
//! bots) emit the same four values under different key names. Each field is
//! resolved from an ordered list of key paths; the first path holding a
//! truthy value wins. Adding support for a new tool means appending a path.

use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::credentials::Credentials;

/// Errors raised while reading an import document
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("file is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    #[error("expected a JSON object, found {found}")]
    NotAnObject { found: &'static str },
}

/// Result type for normalization
pub type NormalizeResult<T> = Result<T, NormalizeError>;

type KeyPath = &'static [&'static str];

struct FieldRule {
    field: &'static str,
    paths: &'static [KeyPath],
}

const SERVER: FieldRule = FieldRule {
    field: "server",
    paths: &[&["server"], &["ip"], &["host"], &["serverDetails", "ip"]],
};

const PORT: FieldRule = FieldRule {
    field: "port",
    paths: &[&["port"], &["appPort"], &["serverDetails", "port"]],
};

const ACCOUNT_ID: FieldRule = FieldRule {
    field: "steam_id",
    paths: &[&["steamId"], &["steam_id"], &["playerId"], &["steamID"]],
};

const SESSION_TOKEN: FieldRule = FieldRule {
    field: "player_token",
    paths: &[&["playerToken"], &["player_token"], &["token"]],
};

/// Map an arbitrary import document onto [`Credentials`]
///
/// Never fails: missing fields come back empty (or `0` for the port), which
/// yields an unpaired record.
pub fn normalize(doc: &Value) -> Credentials {
    Credentials {
        server: resolve(doc, &SERVER).map(coerce_string).unwrap_or_default(),
        port: resolve(doc, &PORT).map(coerce_port).unwrap_or(0),
        account_id: resolve(doc, &ACCOUNT_ID)
            .map(coerce_string)
            .unwrap_or_default(),
        session_token: resolve(doc, &SESSION_TOKEN)
            .map(coerce_string)
            .unwrap_or_default(),
    }
}

/// Parse pasted text and normalize it
///
/// Blank input is read as `{}`.
pub fn normalize_str(text: &str) -> NormalizeResult<Credentials> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(Credentials::default());
    }

    let doc: Value = serde_json::from_str(text)?;
    if !doc.is_object() {
        return Err(NormalizeError::NotAnObject {
            found: kind_name(&doc),
        });
    }
    Ok(normalize(&doc))
}

/// Parse an uploaded file (UTF-8 JSON) and normalize it
pub fn normalize_slice(bytes: &[u8]) -> NormalizeResult<Credentials> {
    normalize_str(std::str::from_utf8(bytes)?)
}

fn resolve<'a>(doc: &'a Value, rule: &FieldRule) -> Option<&'a Value> {
    rule.paths
        .iter()
        .filter_map(|path| lookup(doc, path))
        .find(|value| is_truthy(value))
}

fn lookup<'a>(doc: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(doc, |value, key| value.get(*key))
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn coerce_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Anything that is not an integer in `1..=65535` is treated as unset
fn coerce_port(value: &Value) -> u16 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match parsed {
        Some(f) if f.fract() == 0.0 && (1.0..=f64::from(u16::MAX)).contains(&f) => f as u16,
        _ => {
            warn!(
                "Ignoring unusable {} value in import: {}",
                PORT.field, value
            );
            0
        }
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
