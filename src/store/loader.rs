//! Tolerant reading of the persisted JSON documents.
//!
//! Historical writers of these files were sloppy: trailing commas before a
//! closing brace or bracket, single-quoted strings, capitalized field names,
//! and numbers or booleans stored as strings. The repair rules here are kept
//! compatible with what those writers produced:
//!
//! - a trailing comma before `}` or `]` is stripped
//! - single quotes are rewritten to double quotes across the whole text
//! - field names of record objects are lowercased
//!
//! Type reinterpretation of string values ("123.45" -> number, "true" ->
//! bool) is handled per declared field by the model's deserializers, not by
//! blanket literal evaluation.

use crate::error::{Error, Result};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::LazyLock;

static TRAILING_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*([}\]])").expect("trailing comma pattern"));

/// Reads and parses one document, applying the repair rules above.
///
/// Returns `Ok(None)` when the file does not exist; the caller substitutes
/// the empty default for that document only and keeps loading the others.
pub(crate) fn read_document<T>(path: &Path, document: &str) -> Result<Option<T>>
where
    T: DeserializeOwned,
{
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(Error::load(document, e)),
    };

    let normalized = normalize_text(&text);
    let value: Value =
        serde_json::from_str(&normalized).map_err(|e| Error::load(document, e))?;
    let value = lowercase_record_keys(value);
    let parsed = serde_json::from_value(value).map_err(|e| Error::load(document, e))?;
    Ok(Some(parsed))
}

/// Strips trailing separators and rewrites single quotes as double quotes.
///
/// The quote rewrite is a whole-text replacement, matching the historical
/// loader; an apostrophe inside a description will break the document just
/// as it always did.
pub(crate) fn normalize_text(text: &str) -> String {
    let without_commas = TRAILING_COMMA.replace_all(text, "$1");
    without_commas.replace('\'', "\"")
}

/// Lowercases the field names of every object in a top-level array.
///
/// Record documents are arrays of objects; the registry document is an
/// object and its keys are left alone.
pub(crate) fn lowercase_record_keys(value: Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| match item {
                    Value::Object(map) => Value::Object(
                        map.into_iter().map(|(k, v)| (k.to_lowercase(), v)).collect(),
                    ),
                    other => other,
                })
                .collect(),
        ),
        other => other,
    }
}
