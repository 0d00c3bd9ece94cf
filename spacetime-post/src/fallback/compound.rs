use anyhow::Context;
use log::debug;
use serde::{Deserialize, Serialize};
use spacetime_core::{
    compound_proof::CompoundProof,
    error::{Error, Result},
    proof::ProofScheme,
};

use crate::fallback::{FallbackPoSt, Proof, PublicInputs, PublicParams};

/// The self-contained proof of one partition: its index and its (padded) vanilla proof.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionPoStProof {
    pub partition_index: u64,
    pub proof: Proof,
}

impl PartitionPoStProof {
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).context("failed to serialize partition proof")
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes).map_err(|err| {
            anyhow::Error::from(Error::ProofAggregation(format!(
                "malformed partition proof: {}",
                err
            )))
        })
    }
}

pub struct FallbackPoStCompound;

impl CompoundProof<FallbackPoSt> for FallbackPoStCompound {
    fn partition_proof(
        pub_params: &PublicParams,
        pub_in: &PublicInputs,
        vanilla_proof: &Proof,
        k: usize,
    ) -> Result<Vec<u8>> {
        debug!("verifying vanilla proofs of partition {}", k);
        if !FallbackPoSt::verify(pub_params, pub_in, vanilla_proof)? {
            return Err(Error::ProofAggregation(format!(
                "vanilla proofs of partition {} failed to verify",
                k
            ))
            .into());
        }

        PartitionPoStProof {
            partition_index: k as u64,
            proof: vanilla_proof.clone(),
        }
        .to_bytes()
    }

    fn verify_partition_proof(
        pub_params: &PublicParams,
        pub_in: &PublicInputs,
        proof_bytes: &[u8],
        k: usize,
    ) -> Result<bool> {
        let partition_proof = PartitionPoStProof::from_bytes(proof_bytes)?;
        if partition_proof.partition_index != k as u64 {
            return Ok(false);
        }

        FallbackPoSt::verify(pub_params, pub_in, &partition_proof.proof)
    }
}
