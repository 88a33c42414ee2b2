//! Golden test vectors for deterministic verification.
//!
//! These vectors pin the consensus parameters: any implementation that
//! hashes blocks or checks proofs differently fails them.

use certchain_core::{
    canonical_block_bytes, hash_block, AdmissionGate, Block, BlockHash, Difficulty, Record,
};
use serde::{Deserialize, Serialize};

use crate::fixtures::{alice_record, fixed_clock, FIXED_GENESIS_TIMESTAMP};

/// Expected first valid proof for a given previous proof and difficulty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProofVector {
    pub name: String,
    pub difficulty: u8,
    pub last_proof: u64,
    pub expected_proof: u64,
}

/// Expected canonical encoding and hash of a block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoldenVector {
    pub name: String,
    pub block: Block,
    /// Canonical CBOR (hex).
    pub expected_bytes: String,
    /// SHA-256 of the canonical bytes (hex).
    pub expected_hash: String,
}

/// All proof-of-work vectors.
pub fn proof_vectors() -> Vec<ProofVector> {
    let v = |name: &str, difficulty, last_proof, expected_proof| ProofVector {
        name: name.to_string(),
        difficulty,
        last_proof,
        expected_proof,
    };
    vec![
        v("genesis successor", 4, 100, 35293),
        v("third block", 4, 35293, 35089),
        v("fourth block", 4, 35089, 119678),
        v("difficulty 1", 1, 100, 16),
        v("difficulty 2", 2, 100, 226),
        v("difficulty 3", 3, 100, 6016),
        v("zero last proof", 4, 0, 69732),
    ]
}

const GENESIS_HASH: &str = "d91a7a53dbc9bf0a49d64c37cb022b51365498c46918be66a0e4160d8fad8888";

/// All block vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    let genesis = Block::genesis(FIXED_GENESIS_TIMESTAMP, 100);

    let alice_block = Block {
        index: 2,
        timestamp: fixed_clock(),
        records: vec![alice_record()],
        proof: 35293,
        previous_hash: BlockHash::from_hex(GENESIS_HASH).unwrap_or(BlockHash::GENESIS),
    };

    vec![
        GoldenVector {
            name: "genesis".into(),
            block: genesis,
            expected_bytes: "a50001011b00000194658b100002800318640458200000000000000000000000000000000000000000000000000000000000000000".into(),
            expected_hash: GENESIS_HASH.into(),
        },
        GoldenVector {
            name: "alice certificate".into(),
            block: alice_block,
            expected_bytes: "a50002011b00000194658bfa600281a60061410169416c69636520496e63026142030104654365727431056a323033302d30312d3031031989dd045820d91a7a53dbc9bf0a49d64c37cb022b51365498c46918be66a0e4160d8fad8888".into(),
            expected_hash: "0117cbea5510ed276e467ac52e0f95a2517144a9006d477ca296c46bc00772e1".into(),
        },
    ]
}

/// Check every vector. Returns the names of failing vectors.
pub fn verify_all_vectors() -> Vec<String> {
    let mut failures = Vec::new();

    for vector in proof_vectors() {
        let ok = Difficulty::new(vector.difficulty)
            .map(|d| AdmissionGate::new(d).find_proof(vector.last_proof) == vector.expected_proof)
            .unwrap_or(false);
        if !ok {
            failures.push(vector.name);
        }
    }

    for vector in all_vectors() {
        let bytes = hex::encode(canonical_block_bytes(&vector.block));
        let hash = hash_block(&vector.block).to_hex();
        if bytes != vector.expected_bytes || hash != vector.expected_hash {
            failures.push(vector.name);
        }
    }

    failures
}

/// The records carried by the block vectors, for callers that rebuild them.
pub fn vector_records() -> Vec<Record> {
    all_vectors()
        .into_iter()
        .flat_map(|v| v.block.records)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{alice_fields, TestFixture};

    #[test]
    fn test_all_vectors_pass() {
        assert_eq!(verify_all_vectors(), Vec::<String>::new());
    }

    #[test]
    fn test_vectors_link() {
        let vectors = all_vectors();
        assert!(vectors[1].block.follows(&vectors[0].block));
    }

    #[test]
    fn test_vector_records() {
        assert_eq!(vector_records(), vec![alice_record()]);
    }

    #[test]
    fn test_vectors_survive_json() {
        let json = serde_json::to_string(&all_vectors()).unwrap();
        let parsed: Vec<GoldenVector> = serde_json::from_str(&json).unwrap();
        let blocks: Vec<Block> = parsed.into_iter().map(|v| v.block).collect();
        let expected: Vec<Block> = all_vectors().into_iter().map(|v| v.block).collect();
        assert_eq!(blocks, expected);
    }

    #[tokio::test]
    async fn test_ledger_reproduces_vectors() {
        let fixture = TestFixture::reproducible(4);
        fixture.ledger.submit_record(alice_fields()).await.unwrap();
        fixture.ledger.trigger_seal().await.unwrap();

        let chain = fixture.ledger.get_chain().await.unwrap().chain;
        let expected: Vec<Block> = all_vectors().into_iter().map(|v| v.block).collect();
        assert_eq!(chain, expected);
    }
}
