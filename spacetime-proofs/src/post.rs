//! Proof generation keyed by `RegisteredPoStProof`.
//!
//! Inputs arrive the way a remote caller holds them: a numeric miner id, raw randomness
//! bytes and serialized vanilla proofs. Every returned proof carries its proof type.

use std::collections::BTreeMap;

use anyhow::{ensure, Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use spacetime_core::{error::Error, sector::SectorId};

use crate::api::{self, as_challenge_seed, to_prover_id};
use crate::registry::RegisteredPoStProof;
use crate::types::{FallbackPoStSectorProof, PartitionSnarkProof, PoStType, PrivateReplicaInfo};

/// Numeric id of a miner actor.
pub type ActorId = u64;

/// A bincode serialized `FallbackPoStSectorProof`.
pub type VanillaProofBytes = Vec<u8>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoStProof {
    pub post_proof: RegisteredPoStProof,
    pub proof_bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionProof {
    pub post_proof: RegisteredPoStProof,
    pub proof_bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackChallenges {
    /// Challenged sectors, ascending.
    pub sectors: Vec<SectorId>,
    pub challenges: BTreeMap<SectorId, Vec<u64>>,
}

impl FallbackChallenges {
    /// The challenges of every sector, flattened in sector order.
    pub fn flattened(&self) -> Vec<u64> {
        self.challenges.values().flatten().copied().collect()
    }

    /// Number of challenges per sector.
    pub fn stride(&self) -> usize {
        self.challenges.values().next().map_or(0, Vec::len)
    }
}

fn decode_vanilla_proofs(
    vanilla_proofs: &[VanillaProofBytes],
) -> Result<Vec<FallbackPoStSectorProof>> {
    vanilla_proofs
        .iter()
        .enumerate()
        .map(|(i, bytes)| {
            bincode::deserialize(bytes).map_err(|err| {
                anyhow::Error::from(Error::InvalidInput(format!(
                    "malformed vanilla proof {}: {}",
                    i, err
                )))
            })
        })
        .collect()
}

fn ensure_window(registered_proof: RegisteredPoStProof) -> Result<()> {
    ensure!(
        registered_proof.typ() == PoStType::Window,
        Error::InvalidInput(format!("{:?} is not a window proof type", registered_proof))
    );
    Ok(())
}

pub fn generate_fallback_sector_challenges(
    registered_proof: RegisteredPoStProof,
    randomness: &[u8],
    sector_ids: &[SectorId],
    prover_id: ActorId,
) -> Result<FallbackChallenges> {
    info!("generate_fallback_sector_challenges:start");

    let config = registered_proof.as_v1_config()?;
    let randomness = as_challenge_seed(randomness)?;
    let prover_id = to_prover_id(prover_id)?;

    let challenges =
        api::generate_fallback_sector_challenges(&config, &randomness, sector_ids, prover_id)
            .with_context(|| format!("challenge derivation failed for {:?}", registered_proof))?;
    let sectors = challenges.keys().copied().collect();

    info!("generate_fallback_sector_challenges:finish");

    Ok(FallbackChallenges {
        sectors,
        challenges,
    })
}

pub fn generate_single_vanilla_proof(
    registered_proof: RegisteredPoStProof,
    sector_id: SectorId,
    replica: &PrivateReplicaInfo,
    challenges: &[u64],
) -> Result<VanillaProofBytes> {
    let config = registered_proof.as_v1_config()?;

    let proof = api::generate_single_vanilla_proof(&config, sector_id, replica, challenges)
        .with_context(|| format!("vanilla proof failed for {:?}", registered_proof))?;

    bincode::serialize(&proof).context("failed to serialize vanilla proof")
}

pub fn generate_winning_post_with_vanilla(
    registered_proof: RegisteredPoStProof,
    randomness: &[u8],
    prover_id: ActorId,
    vanilla_proofs: &[VanillaProofBytes],
) -> Result<PoStProof> {
    ensure!(
        registered_proof.typ() == PoStType::Winning,
        Error::InvalidInput(format!("{:?} is not a winning proof type", registered_proof))
    );

    let config = registered_proof.as_v1_config()?;
    let randomness = as_challenge_seed(randomness)?;
    let prover_id = to_prover_id(prover_id)?;
    let vanilla_proofs = decode_vanilla_proofs(vanilla_proofs)?;

    let proof_bytes =
        api::generate_winning_post_with_vanilla(&config, &randomness, prover_id, vanilla_proofs)
            .with_context(|| format!("winning post failed for {:?}", registered_proof))?;

    Ok(PoStProof {
        post_proof: registered_proof,
        proof_bytes,
    })
}

pub fn generate_window_post_with_vanilla(
    registered_proof: RegisteredPoStProof,
    randomness: &[u8],
    prover_id: ActorId,
    vanilla_proofs: &[VanillaProofBytes],
) -> Result<PoStProof> {
    ensure_window(registered_proof)?;

    let config = registered_proof.as_v1_config()?;
    let randomness = as_challenge_seed(randomness)?;
    let prover_id = to_prover_id(prover_id)?;
    let vanilla_proofs = decode_vanilla_proofs(vanilla_proofs)?;

    let proof_bytes =
        api::generate_window_post_with_vanilla(&config, &randomness, prover_id, vanilla_proofs)
            .with_context(|| format!("window post failed for {:?}", registered_proof))?;

    Ok(PoStProof {
        post_proof: registered_proof,
        proof_bytes,
    })
}

pub fn generate_single_window_post_with_vanilla(
    registered_proof: RegisteredPoStProof,
    randomness: &[u8],
    prover_id: ActorId,
    vanilla_proofs: &[VanillaProofBytes],
    partition_index: usize,
) -> Result<PartitionProof> {
    ensure_window(registered_proof)?;

    let config = registered_proof.as_v1_config()?;
    let randomness = as_challenge_seed(randomness)?;
    let prover_id = to_prover_id(prover_id)?;
    let vanilla_proofs = decode_vanilla_proofs(vanilla_proofs)?;

    let PartitionSnarkProof(proof_bytes) = api::generate_single_window_post_with_vanilla(
        &config,
        &randomness,
        prover_id,
        vanilla_proofs,
        partition_index,
    )
    .with_context(|| {
        format!(
            "window post partition {} failed for {:?}",
            partition_index, registered_proof
        )
    })?;

    Ok(PartitionProof {
        post_proof: registered_proof,
        proof_bytes,
    })
}

/// Merges the proofs of every partition of a window, given in partition order.
pub fn merge_window_post_partition_proofs(
    registered_proof: RegisteredPoStProof,
    partition_proofs: Vec<PartitionProof>,
) -> Result<PoStProof> {
    ensure_window(registered_proof)?;
    ensure!(
        !partition_proofs.is_empty(),
        Error::InvalidInput("no partition proofs to merge".to_string())
    );

    if let Some(mismatch) = partition_proofs
        .iter()
        .find(|p| p.post_proof != registered_proof)
    {
        return Err(Error::ProofAggregation(format!(
            "partition proof of type {:?} cannot be merged into {:?}",
            mismatch.post_proof, registered_proof
        ))
        .into());
    }

    let proof_bytes = api::merge_window_post_partition_proofs(
        partition_proofs
            .into_iter()
            .map(|p| PartitionSnarkProof(p.proof_bytes))
            .collect(),
    )
    .with_context(|| format!("merge failed for {:?}", registered_proof))?;

    Ok(PoStProof {
        post_proof: registered_proof,
        proof_bytes,
    })
}

/// Number of partitions `num_sectors` sectors are proven in.
pub fn get_num_partition_for_fallback_post(
    registered_proof: RegisteredPoStProof,
    num_sectors: usize,
) -> Result<usize> {
    let config = registered_proof.as_v1_config()?;
    Ok(api::get_num_partition_for_fallback_post(&config, num_sectors))
}
