//! Record validation and full-chain verification.

use crate::block::{Block, GENESIS_INDEX};
use crate::error::{ChainError, ValidationError};
use crate::pow::AdmissionGate;
use crate::record::Record;
use crate::types::BlockHash;

/// Validate a record's text fields.
///
/// Typed fields (`certificate_id`, `expiration_date`) are well-formed by
/// construction; text fields must contain something other than whitespace.
pub fn validate_record(record: &Record) -> Result<(), ValidationError> {
    let text_fields = [
        ("certifier", &record.certifier),
        ("certifier_name", &record.certifier_name),
        ("recipient", &record.recipient),
        ("certificate_name", &record.certificate_name),
    ];

    for (name, value) in text_fields {
        if value.trim().is_empty() {
            return Err(ValidationError::EmptyField(name));
        }
    }

    Ok(())
}

/// Verify every chain invariant over a sequence of sealed blocks.
///
/// This performs:
/// - Non-empty check
/// - Genesis shape (index 1, sentinel previous hash)
/// - Index contiguity
/// - Hash linkage to the predecessor
/// - Proof validity relative to the predecessor's proof
pub fn validate_chain(blocks: &[Block], gate: &AdmissionGate) -> Result<(), ChainError> {
    let genesis = blocks.first().ok_or(ChainError::Empty)?;

    if genesis.index != GENESIS_INDEX {
        return Err(ChainError::InvalidGenesis(format!(
            "index is {}, expected {}",
            genesis.index, GENESIS_INDEX
        )));
    }
    if genesis.previous_hash != BlockHash::GENESIS {
        return Err(ChainError::InvalidGenesis(
            "previous_hash is not the genesis sentinel".into(),
        ));
    }

    for pair in blocks.windows(2) {
        let (parent, block) = (&pair[0], &pair[1]);

        let expected_index = parent.index + 1;
        if block.index != expected_index {
            return Err(ChainError::IndexGap {
                expected: expected_index,
                got: block.index,
            });
        }

        let expected_hash = parent.compute_hash();
        if block.previous_hash != expected_hash {
            return Err(ChainError::BrokenLink {
                index: block.index,
                expected: expected_hash,
                got: block.previous_hash,
            });
        }

        if !gate.is_valid(parent.proof, block.proof) {
            return Err(ChainError::InvalidProof {
                index: block.index,
                last_proof: parent.proof,
                proof: block.proof,
            });
        }
    }

    Ok(())
}
