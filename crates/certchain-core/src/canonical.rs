//! Canonical CBOR encoding for deterministic block hashing.
//!
//! This module implements RFC 8949 Core Deterministic Encoding:
//! - Map keys sorted by encoded byte comparison
//! - Integers use smallest valid encoding
//! - Definite lengths only
//! - No floats (timestamps are i64 milliseconds, dates are ISO text)
//!
//! Two structurally identical blocks produce identical bytes, and thus
//! identical hashes, regardless of how they were constructed.

use chrono::NaiveDate;
use ciborium::value::{Integer, Value};

use crate::block::Block;
use crate::crypto::Sha256Hash;
use crate::error::CoreError;
use crate::record::{Record, DATE_FORMAT};
use crate::types::BlockHash;

/// Block field keys (integer keys for compact encoding).
mod block_keys {
    pub const INDEX: u64 = 0;
    pub const TIMESTAMP: u64 = 1;
    pub const RECORDS: u64 = 2;
    pub const PROOF: u64 = 3;
    pub const PREVIOUS_HASH: u64 = 4;
}

/// Record field keys.
mod record_keys {
    pub const CERTIFIER: u64 = 0;
    pub const CERTIFIER_NAME: u64 = 1;
    pub const RECIPIENT: u64 = 2;
    pub const CERTIFICATE_ID: u64 = 3;
    pub const CERTIFICATE_NAME: u64 = 4;
    pub const EXPIRATION_DATE: u64 = 5;
}

/// Encode a block to canonical CBOR bytes.
pub fn canonical_block_bytes(block: &Block) -> Vec<u8> {
    encode_cbor_value_canonical(&block_to_cbor_value(block))
}

/// Encode a single record to canonical CBOR bytes.
pub fn canonical_record_bytes(record: &Record) -> Vec<u8> {
    encode_cbor_value_canonical(&record_to_cbor_value(record))
}

/// SHA-256 over the canonical encoding of a block.
pub fn hash_block(block: &Block) -> BlockHash {
    Sha256Hash::hash(&canonical_block_bytes(block)).into()
}

fn key(k: u64) -> Value {
    Value::Integer(k.into())
}

fn block_to_cbor_value(block: &Block) -> Value {
    let records = block.records.iter().map(record_to_cbor_value).collect();

    Value::Map(vec![
        (key(block_keys::INDEX), Value::Integer(block.index.into())),
        (key(block_keys::TIMESTAMP), Value::Integer(block.timestamp.into())),
        (key(block_keys::RECORDS), Value::Array(records)),
        (key(block_keys::PROOF), Value::Integer(block.proof.into())),
        (
            key(block_keys::PREVIOUS_HASH),
            Value::Bytes(block.previous_hash.0.to_vec()),
        ),
    ])
}

fn record_to_cbor_value(record: &Record) -> Value {
    Value::Map(vec![
        (key(record_keys::CERTIFIER), Value::Text(record.certifier.clone())),
        (
            key(record_keys::CERTIFIER_NAME),
            Value::Text(record.certifier_name.clone()),
        ),
        (key(record_keys::RECIPIENT), Value::Text(record.recipient.clone())),
        (
            key(record_keys::CERTIFICATE_ID),
            Value::Integer(record.certificate_id.into()),
        ),
        (
            key(record_keys::CERTIFICATE_NAME),
            Value::Text(record.certificate_name.clone()),
        ),
        (
            key(record_keys::EXPIRATION_DATE),
            Value::Text(record.expiration_date_string()),
        ),
    ])
}

/// Encode a CBOR Value to canonical bytes.
fn encode_cbor_value_canonical(value: &Value) -> Vec<u8> {
    let mut buf = Vec::new();
    encode_value_to(&mut buf, value);
    buf
}

/// Recursively encode a CBOR value.
///
/// Only the value kinds produced by `block_to_cbor_value` are reachable.
fn encode_value_to(buf: &mut Vec<u8>, value: &Value) {
    match value {
        Value::Integer(i) => encode_integer(buf, *i),
        Value::Bytes(b) => encode_bytes(buf, b),
        Value::Text(s) => encode_text(buf, s),
        Value::Array(arr) => encode_array(buf, arr),
        Value::Map(entries) => encode_map_canonical(buf, entries),
        Value::Bool(b) => buf.push(if *b { 0xf5 } else { 0xf4 }),
        Value::Null => buf.push(0xf6),
        Value::Float(_) => unreachable!("floats are never produced by the block encoder"),
        _ => unreachable!("unsupported CBOR value type"),
    }
}

/// Encode a CBOR integer (major types 0 and 1).
fn encode_integer(buf: &mut Vec<u8>, i: Integer) {
    let n = i128::from(i);

    if n >= 0 {
        encode_uint(buf, 0, n as u64);
    } else {
        // CBOR encodes -1 as 0, -2 as 1, etc.
        encode_uint(buf, 1, (-1 - n) as u64);
    }
}

/// Encode an unsigned integer with the given major type.
fn encode_uint(buf: &mut Vec<u8>, major: u8, n: u64) {
    let mt = major << 5;
    if n < 24 {
        buf.push(mt | (n as u8));
    } else if n <= 0xff {
        buf.push(mt | 24);
        buf.push(n as u8);
    } else if n <= 0xffff {
        buf.push(mt | 25);
        buf.extend_from_slice(&(n as u16).to_be_bytes());
    } else if n <= 0xffff_ffff {
        buf.push(mt | 26);
        buf.extend_from_slice(&(n as u32).to_be_bytes());
    } else {
        buf.push(mt | 27);
        buf.extend_from_slice(&n.to_be_bytes());
    }
}

/// Encode a byte string (major type 2).
fn encode_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    encode_uint(buf, 2, bytes.len() as u64);
    buf.extend_from_slice(bytes);
}

/// Encode a text string (major type 3).
fn encode_text(buf: &mut Vec<u8>, s: &str) {
    encode_uint(buf, 3, s.len() as u64);
    buf.extend_from_slice(s.as_bytes());
}

/// Encode an array (major type 4).
fn encode_array(buf: &mut Vec<u8>, arr: &[Value]) {
    encode_uint(buf, 4, arr.len() as u64);
    for item in arr {
        encode_value_to(buf, item);
    }
}

/// Encode a map canonically (major type 5).
///
/// Keys are sorted by their encoded byte comparison.
fn encode_map_canonical(buf: &mut Vec<u8>, entries: &[(Value, Value)]) {
    let mut key_value_pairs: Vec<(Vec<u8>, &Value)> = entries
        .iter()
        .map(|(k, v)| {
            let mut key_buf = Vec::new();
            encode_value_to(&mut key_buf, k);
            (key_buf, v)
        })
        .collect();

    key_value_pairs.sort_by(|a, b| a.0.cmp(&b.0));

    encode_uint(buf, 5, key_value_pairs.len() as u64);

    for (key_bytes, value) in key_value_pairs {
        buf.extend_from_slice(&key_bytes);
        encode_value_to(buf, value);
    }
}

/// Decode a block from canonical bytes.
///
/// Rejects input that decodes but is not in canonical form, so that
/// `canonical_block_bytes(decode_block(b)?) == b` always holds.
pub fn decode_block(bytes: &[u8]) -> Result<Block, CoreError> {
    let value: Value =
        ciborium::from_reader(bytes).map_err(|e| CoreError::DecodingError(e.to_string()))?;

    let block = cbor_value_to_block(&value)?;

    if canonical_block_bytes(&block) != bytes {
        return Err(CoreError::MalformedBlock("not in canonical form".into()));
    }

    Ok(block)
}

fn map_get(map: &[(Value, Value)], k: u64) -> Option<&Value> {
    map.iter()
        .find(|(key, _)| matches!(key, Value::Integer(i) if i128::from(*i) == k as i128))
        .map(|(_, v)| v)
}

fn as_u64(value: Option<&Value>) -> Option<u64> {
    match value {
        Some(Value::Integer(i)) => u64::try_from(*i).ok(),
        _ => None,
    }
}

fn as_text(value: Option<&Value>) -> Option<&str> {
    match value {
        Some(Value::Text(s)) => Some(s.as_str()),
        _ => None,
    }
}

fn cbor_value_to_block(value: &Value) -> Result<Block, CoreError> {
    let map = match value {
        Value::Map(m) => m,
        _ => return Err(CoreError::MalformedBlock("expected map".into())),
    };

    let index = as_u64(map_get(map, block_keys::INDEX))
        .ok_or_else(|| CoreError::MalformedBlock("missing index".into()))?;

    let timestamp = match map_get(map, block_keys::TIMESTAMP) {
        Some(Value::Integer(i)) => i64::try_from(*i)
            .map_err(|_| CoreError::MalformedBlock("timestamp out of range".into()))?,
        _ => return Err(CoreError::MalformedBlock("missing timestamp".into())),
    };

    let records = match map_get(map, block_keys::RECORDS) {
        Some(Value::Array(arr)) => arr
            .iter()
            .map(cbor_value_to_record)
            .collect::<Result<Vec<_>, _>>()?,
        _ => return Err(CoreError::MalformedBlock("missing records".into())),
    };

    let proof = as_u64(map_get(map, block_keys::PROOF))
        .ok_or_else(|| CoreError::MalformedBlock("missing proof".into()))?;

    let previous_hash = match map_get(map, block_keys::PREVIOUS_HASH) {
        Some(Value::Bytes(b)) => BlockHash::try_from(b.as_slice())
            .map_err(|_| CoreError::MalformedBlock("previous_hash must be 32 bytes".into()))?,
        _ => return Err(CoreError::MalformedBlock("missing previous_hash".into())),
    };

    Ok(Block {
        index,
        timestamp,
        records,
        proof,
        previous_hash,
    })
}

fn cbor_value_to_record(value: &Value) -> Result<Record, CoreError> {
    let map = match value {
        Value::Map(m) => m,
        _ => return Err(CoreError::MalformedRecord("expected map".into())),
    };

    let text = |k: u64, name: &str| -> Result<String, CoreError> {
        as_text(map_get(map, k))
            .map(String::from)
            .ok_or_else(|| CoreError::MalformedRecord(format!("missing {}", name)))
    };

    let certificate_id = as_u64(map_get(map, record_keys::CERTIFICATE_ID))
        .ok_or_else(|| CoreError::MalformedRecord("missing certificate_id".into()))?;

    let date_text = text(record_keys::EXPIRATION_DATE, "expiration_date")?;
    let expiration_date = NaiveDate::parse_from_str(&date_text, DATE_FORMAT)
        .map_err(|e| CoreError::MalformedRecord(format!("expiration_date: {}", e)))?;

    Ok(Record {
        certifier: text(record_keys::CERTIFIER, "certifier")?,
        certifier_name: text(record_keys::CERTIFIER_NAME, "certifier_name")?,
        recipient: text(record_keys::RECIPIENT, "recipient")?,
        certificate_id,
        certificate_name: text(record_keys::CERTIFICATE_NAME, "certificate_name")?,
        expiration_date,
    })
}
