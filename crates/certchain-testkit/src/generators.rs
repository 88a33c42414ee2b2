//! Proptest generators for property-based testing.

use chrono::NaiveDate;
use proptest::prelude::*;

use certchain_core::{Block, BlockHash, Record, RecordFields};

/// Generate a non-empty identifier or display string.
pub fn text_field() -> impl Strategy<Value = String> {
    "[A-Za-z0-9][A-Za-z0-9 .:_-]{0,31}".prop_map(String::from)
}

/// Generate a calendar date between 2000 and 2099.
pub fn date() -> impl Strategy<Value = NaiveDate> {
    (2000i32..2100, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default())
}

/// Generate a valid record.
pub fn record() -> impl Strategy<Value = Record> {
    (
        text_field(),
        text_field(),
        text_field(),
        any::<u64>(),
        text_field(),
        date(),
    )
        .prop_map(|(certifier, certifier_name, recipient, id, name, expires)| {
            Record::new(certifier, certifier_name, recipient, id, name, expires)
        })
}

/// Generate the submission form of a valid record.
pub fn record_fields() -> impl Strategy<Value = RecordFields> {
    record().prop_map(|r| RecordFields::from(&r))
}

/// Generate a random BlockHash.
pub fn block_hash() -> impl Strategy<Value = BlockHash> {
    any::<[u8; 32]>().prop_map(BlockHash::from_bytes)
}

/// Generate an arbitrary (not necessarily chain-valid) block.
pub fn block() -> impl Strategy<Value = Block> {
    (
        1u64..=10_000,
        0i64..=4_102_444_800_000,
        prop::collection::vec(record(), 0..8),
        any::<u64>(),
        block_hash(),
    )
        .prop_map(|(index, timestamp, records, proof, previous_hash)| Block {
            index,
            timestamp,
            records,
            proof,
            previous_hash,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use certchain_core::{canonical_block_bytes, decode_block, hash_block};

    proptest! {
        #[test]
        fn test_fields_validate_into_same_record(r in record()) {
            let fields = RecordFields::from(&r);
            prop_assert_eq!(Record::try_from(fields), Ok(r));
        }

        #[test]
        fn test_hash_deterministic(b in block()) {
            prop_assert_eq!(hash_block(&b), hash_block(&b.clone()));
        }

        #[test]
        fn test_decode_inverts_encode(b in block()) {
            let bytes = canonical_block_bytes(&b);
            prop_assert_eq!(decode_block(&bytes).ok(), Some(b));
        }

        #[test]
        fn test_hash_differs_for_different_blocks(a in block(), b in block()) {
            prop_assume!(a != b);
            prop_assert_ne!(hash_block(&a), hash_block(&b));
        }
    }
}
