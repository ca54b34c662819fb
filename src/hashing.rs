//! Hashing - SHA-256 for Documents and Inputs
//!
//! Document hashes identify a generated email byte-for-byte. Input hashes
//! identify a (content, theme, layout) triple independent of field order,
//! so structurally equal inputs always hash the same.

use serde::Serialize;
use serde_json::{to_string, Value};
use sha2::{Digest, Sha256};

use crate::templates::{Content, Layout};
use crate::theme::Theme;

/// Compute SHA-256 hash of bytes, return hex string
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Convert to canonical JSON (sorted keys, no whitespace)
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let v: Value = serde_json::to_value(value)?;
    to_string(&sort_value(&v))
}

fn sort_value(v: &Value) -> Value {
    match v {
        Value::Object(map) => {
            let mut sorted: Vec<_> = map.iter().collect();
            sorted.sort_by(|a, b| a.0.cmp(b.0));
            Value::Object(
                sorted
                    .into_iter()
                    .map(|(k, v)| (k.clone(), sort_value(v)))
                    .collect(),
            )
        }
        Value::Array(arr) => Value::Array(arr.iter().map(sort_value).collect()),
        _ => v.clone(),
    }
}

/// Hash of a generated document.
pub fn compute_document_hash(html: &str) -> String {
    sha256_hex(html.as_bytes())
}

#[derive(Serialize)]
struct RenderInputs<'a> {
    content: &'a Content,
    theme: &'a Theme,
    layout: Layout,
}

/// Hash of the inputs to one generation.
/// input_hash = sha256(canonical_json({content, theme, layout}) + ":" + engine_version)
pub fn compute_input_hash(
    content: &Content,
    theme: &Theme,
    layout: Layout,
    engine_version: &str,
) -> Result<String, serde_json::Error> {
    let canonical = canonical_json(&RenderInputs { content, theme, layout })?;
    Ok(sha256_hex(format!("{canonical}:{engine_version}").as_bytes()))
}

mod hex {
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().map(|b| format!("{:02x}", b)).collect()
    }
}
