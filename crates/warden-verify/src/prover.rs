// crates/warden-verify/src/prover.rs
//
// DigestProver: produces transparent proofs that `DigestVerifier` accepts.
//
// Word i of the proof is SHA-256 over a domain tag, the index, the verifier
// address and all five public inputs. Anyone holding the inputs can produce
// it, so this is only for development ledgers and demos.

use warden_core::crypto::hash_bytes;
use warden_core::traits::ProofInputs;
use warden_core::types::{Address, Field, Proof, PROOF_WORDS};

const DOMAIN_TAG: &[u8] = b"warden-digest-proof-v1";

/// Compute one proof word.
pub(crate) fn proof_word(verifier: &Address, inputs: &ProofInputs, index: u8) -> Field {
    let mut packed = Vec::with_capacity(DOMAIN_TAG.len() + 1 + 20 + 5 * 32);
    packed.extend_from_slice(DOMAIN_TAG);
    packed.push(index);
    packed.extend_from_slice(verifier.as_bytes());
    for input in [
        inputs.root,
        inputs.group_id,
        inputs.signal_hash,
        inputs.nullifier_hash,
        inputs.external_nullifier_hash,
    ] {
        packed.extend_from_slice(input.as_bytes());
    }
    Field(hash_bytes(&packed))
}

/// Generates digest proofs for a specific verifier address.
pub struct DigestProver {
    verifier: Address,
}

impl DigestProver {
    pub fn new(verifier: Address) -> Self {
        Self { verifier }
    }

    /// Produce the proof for `inputs`.
    pub fn prove(&self, inputs: &ProofInputs) -> Proof {
        let mut words = [Field::ZERO; PROOF_WORDS];
        for (i, word) in words.iter_mut().enumerate() {
            *word = proof_word(&self.verifier, inputs, i as u8);
        }
        Proof(words)
    }
}
