//! Hashing primitives.
//!
//! Two unrelated digests live here:
//!
//! - [`checksum`]: the evidence binder's configuration checksum. A 32-bit
//!   rolling hash (`h = h * 31 + unit`, wrapping) over the canonical JSON of
//!   the wizard snapshot, rendered as `0x` + hex of the absolute value. It is
//!   fast and deterministic but NOT cryptographic: collisions are expected at
//!   a low rate and an adversary can forge them trivially. It signals that a
//!   configuration changed; it does not attest that it was not tampered with.
//! - [`sha256_hex`]: SHA-256 for file digests in artifact manifests.

use purviewx_types::WizardData;
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Checksum of a wizard snapshot. See the crate docs for its guarantees.
pub fn checksum(data: &WizardData) -> serde_json::Result<String> {
    checksum_of(data)
}

/// Checksum of an arbitrary JSON document, independent of object key order.
pub fn checksum_value(value: &Value) -> String {
    rolling_hash(&canonical_json(value))
}

/// Checksum of any serializable value.
pub fn checksum_of<T: Serialize>(value: &T) -> serde_json::Result<String> {
    Ok(checksum_value(&serde_json::to_value(value)?))
}

/// Compact JSON with object keys sorted at every depth.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (i, (key, v)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(v, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, v) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(v, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

/// 32-bit rolling hash over UTF-16 code units, `0x`-prefixed hex output.
pub fn rolling_hash(text: &str) -> String {
    let mut hash: i32 = 0;
    for unit in text.encode_utf16() {
        hash = hash
            .wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i32::from(unit));
    }
    format!("0x{:x}", hash.unsigned_abs())
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut h = Sha256::new();
    h.update(bytes);
    hex::encode(h.finalize())
}
