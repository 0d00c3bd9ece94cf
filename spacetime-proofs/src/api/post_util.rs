use std::collections::BTreeMap;

use anyhow::{ensure, Context, Result};
use log::{debug, info};
use spacetime_core::{
    compound_proof::{self, CompoundProof},
    error::Error,
    hasher::{Sha256Domain, Sha256Function},
    merkle::compute_root,
    multi_proof::MultiProof,
    proof::ProofScheme,
    sector::{OrderedSectorSet, SectorId},
    settings::SETTINGS,
};
use spacetime_post::fallback::{
    self, generate_leaf_challenges, FallbackPoSt, FallbackPoStCompound, PartitionPoStProof,
    PublicSector,
};

use crate::types::{
    ChallengeSeed, FallbackPoStSectorProof, PartitionSnarkProof, PoStConfig, PoStType,
    PrivateReplicaInfo, ProverId, SnarkProof, VanillaProof,
};

pub(crate) fn fallback_setup_params(post_config: &PoStConfig) -> fallback::SetupParams {
    fallback::SetupParams {
        sector_size: u64::from(post_config.sector_size),
        challenge_count: post_config.challenge_count,
        sector_count: post_config.sector_count,
        shape: post_config.typ.into(),
        api_version: post_config.api_version,
    }
}

pub(crate) fn fallback_public_params(post_config: &PoStConfig) -> Result<fallback::PublicParams> {
    FallbackPoSt::setup(&fallback_setup_params(post_config))
}

pub(crate) fn compound_public_params(
    post_config: &PoStConfig,
    partitions: Option<usize>,
) -> Result<compound_proof::PublicParams<FallbackPoSt>> {
    FallbackPoStCompound::setup(&compound_proof::SetupParams {
        vanilla_params: fallback_setup_params(post_config),
        partitions,
    })
}

/// Sorts sector ids ascending, rejecting an empty list and duplicates.
fn canonical_sector_ids(pub_sectors: &[SectorId]) -> Result<Vec<SectorId>> {
    ensure!(
        !pub_sectors.is_empty(),
        Error::InvalidInput("no sectors to challenge".to_string())
    );

    let ordered: OrderedSectorSet = pub_sectors.iter().copied().collect();
    ensure!(
        ordered.len() == pub_sectors.len(),
        Error::InvalidInput("duplicate sector ids".to_string())
    );

    Ok(ordered.into_iter().collect())
}

/// Builds the public inputs of a proving window from its vanilla proofs, in canonical order.
pub(crate) fn fallback_public_inputs(
    randomness: &ChallengeSeed,
    prover_id: ProverId,
    vanilla_proofs: &[FallbackPoStSectorProof],
) -> Result<fallback::PublicInputs> {
    let mut sectors: Vec<PublicSector> = vanilla_proofs
        .iter()
        .map(|proof| PublicSector {
            id: proof.sector_id,
            comm_r: proof.comm_r,
        })
        .collect();
    sectors.sort_by_key(|s| s.id);

    let ids: Vec<SectorId> = sectors.iter().map(|s| s.id).collect();
    canonical_sector_ids(&ids)?;

    Ok(fallback::PublicInputs {
        randomness: Sha256Domain(*randomness),
        prover_id: Sha256Domain(prover_id),
        sectors,
        k: None,
    })
}

/// Generates the challenges per SectorId required for either a Window
/// proof-of-spacetime or a Winning proof-of-spacetime.
pub fn generate_fallback_sector_challenges(
    post_config: &PoStConfig,
    randomness: &ChallengeSeed,
    pub_sectors: &[SectorId],
    prover_id: ProverId,
) -> Result<BTreeMap<SectorId, Vec<u64>>> {
    info!("generate_sector_challenges:start");

    let public_params = fallback_public_params(post_config)?;
    let sectors = canonical_sector_ids(pub_sectors)?;

    let randomness_safe = Sha256Domain(*randomness);
    let prover_id_safe = Sha256Domain(prover_id);

    let sector_challenges: BTreeMap<SectorId, Vec<u64>> = sectors
        .iter()
        .enumerate()
        .map(|(sector_index, sector)| {
            let challenges = generate_leaf_challenges(
                &public_params,
                &randomness_safe,
                &prover_id_safe,
                u64::from(*sector),
                sector_index,
            );
            (*sector, challenges)
        })
        .collect();

    info!("generate_sector_challenges:finish");

    Ok(sector_challenges)
}

/// Generates a single vanilla proof required for either Window proof-of-spacetime
/// or Winning proof-of-spacetime.
pub fn generate_single_vanilla_proof(
    post_config: &PoStConfig,
    sector_id: SectorId,
    replica: &PrivateReplicaInfo,
    challenges: &[u64],
) -> Result<FallbackPoStSectorProof> {
    info!("generate_single_vanilla_proof:start: {:?}", sector_id);

    let leafs = post_config.sector_size.leafs();
    ensure!(
        !challenges.is_empty(),
        Error::InvalidInput(format!("no challenges for {}", sector_id))
    );
    if let Some(c) = challenges.iter().find(|&&c| c >= leafs as u64) {
        return Err(Error::InvalidInput(format!(
            "challenge {} of {} is out of bounds for {} leafs",
            c, sector_id, leafs
        ))
        .into());
    }

    let replica_access = |err: anyhow::Error| Error::ReplicaAccess {
        sector_id,
        reason: format!("{:#}", err),
    };

    let aux = replica.aux().map_err(replica_access)?;
    let comm_r = replica.safe_comm_r();
    ensure!(
        Sha256Function::hash2(&aux.comm_c, &aux.comm_r_last) == comm_r,
        Error::ReplicaAccess {
            sector_id,
            reason: "comm_r does not match the persisted commitments".to_string(),
        }
    );

    let tree = replica
        .merkle_tree(post_config.sector_size)
        .map_err(replica_access)?;
    let replica_data = replica.map_replica().map_err(replica_access)?;
    ensure!(
        replica_data.len() as u64 == u64::from(post_config.sector_size),
        Error::ReplicaAccess {
            sector_id,
            reason: format!(
                "replica holds {} bytes, expected {}",
                replica_data.len(),
                u64::from(post_config.sector_size)
            ),
        }
    );

    if SETTINGS.verify_cache {
        debug!("verifying cached tree of {:?}", sector_id);
        let root = compute_root(&replica_data).map_err(replica_access)?;
        ensure!(
            root == tree.root(),
            Error::ReplicaAccess {
                sector_id,
                reason: "cached tree does not match the replica".to_string(),
            }
        );
    }

    let priv_sector = fallback::PrivateSector {
        tree: &tree,
        replica: &replica_data,
        comm_c: aux.comm_c,
        comm_r_last: aux.comm_r_last,
    };

    let vanilla_proof = fallback::vanilla_proof(sector_id, &priv_sector, challenges)
        .with_context(|| {
            format!(
                "generate_single_vanilla_proof: vanilla_proof failed: {:?}",
                sector_id
            )
        })?;

    info!("generate_single_vanilla_proof:finish: {:?}", sector_id);

    Ok(FallbackPoStSectorProof {
        sector_id,
        comm_r,
        vanilla_proof,
    })
}

// Partition a flat vector of vanilla sector proofs. The public inputs hold every
// sector of the window in canonical order; each partition takes the next
// `sector_count` of them.
pub fn partition_vanilla_proofs(
    pub_params: &fallback::PublicParams,
    pub_inputs: &fallback::PublicInputs,
    partition_count: usize,
    fallback_sector_proofs: &[FallbackPoStSectorProof],
) -> Result<Vec<VanillaProof>> {
    info!("partition_vanilla_proofs:start");

    let num_sectors_per_chunk = pub_params.sector_count;
    let num_sectors = pub_inputs.sectors.len();
    ensure!(
        num_sectors <= partition_count * num_sectors_per_chunk,
        Error::InvalidInput(format!(
            "cannot prove the provided number of sectors: {} > {} * {}",
            num_sectors, partition_count, num_sectors_per_chunk,
        ))
    );

    let partition_proofs = (0..partition_count)
        .map(|k| {
            single_partition_vanilla_proofs(
                pub_params,
                &FallbackPoSt::with_partition(pub_inputs.clone(), Some(k)),
                fallback_sector_proofs,
            )
        })
        .collect::<Result<Vec<_>>>()?;

    info!("partition_vanilla_proofs:finish");

    Ok(partition_proofs)
}

/// Collects the vanilla proofs of partition `pub_inputs.k`, padded to `sector_count`.
pub fn single_partition_vanilla_proofs(
    pub_params: &fallback::PublicParams,
    pub_inputs: &fallback::PublicInputs,
    fallback_sector_proofs: &[FallbackPoStSectorProof],
) -> Result<VanillaProof> {
    info!("single_partition_vanilla_proofs:start");
    let partition_index = pub_inputs.k.ok_or_else(|| {
        Error::InvalidInput("must have a partition index".to_string())
    })?;

    debug!("processing partition: {}", partition_index);

    let num_sectors_per_chunk = pub_params.sector_count;
    let partition_count = div_ceil(pub_inputs.sectors.len(), num_sectors_per_chunk);
    let sectors_chunk = pub_inputs
        .sectors
        .chunks(num_sectors_per_chunk)
        .nth(partition_index)
        .ok_or(Error::PartitionIndexOutOfRange {
            index: partition_index,
            count: partition_count,
        })?;

    let mut sector_proofs = Vec::with_capacity(num_sectors_per_chunk);
    for pub_sector in sectors_chunk {
        let cur_proof = fallback_sector_proofs
            .iter()
            .find(|proof| proof.sector_id == pub_sector.id)
            .ok_or_else(|| {
                Error::InvalidInput(format!("missing vanilla proof for {}", pub_sector.id))
            })?;

        ensure!(
            cur_proof.vanilla_proof.sectors.len() == 1,
            Error::InvalidInput(format!(
                "vanilla proof for {} covers {} sectors",
                pub_sector.id,
                cur_proof.vanilla_proof.sectors.len()
            ))
        );
        sector_proofs.extend(cur_proof.vanilla_proof.sectors.iter().cloned());
    }

    // If there were less than the required number of sectors provided, we duplicate the last one
    // to pad the proof out.
    while sector_proofs.len() < num_sectors_per_chunk {
        sector_proofs.push(sector_proofs[sector_proofs.len() - 1].clone());
    }

    info!("single_partition_vanilla_proofs:finish");

    Ok(fallback::Proof {
        sectors: sector_proofs,
    })
}

/// Concatenates the proofs of every partition of a window, in partition order.
///
/// Each proof must hold exactly one partition, and the partition at position `i` must
/// be partition `i`. Anything else fails instead of producing an unverifiable proof.
pub fn merge_window_post_partition_proofs(proofs: Vec<PartitionSnarkProof>) -> Result<SnarkProof> {
    info!("merge_window_post_partition_proofs:start");
    ensure!(
        !proofs.is_empty(),
        Error::InvalidInput("no partition proofs to merge".to_string())
    );

    let mut proof = Vec::with_capacity(proofs.iter().map(|p| p.0.len()).sum());
    for (position, partition) in proofs.into_iter().enumerate() {
        let multi_proof = MultiProof::from_bytes(&partition.0)
            .with_context(|| format!("partition proof at position {}", position))?;
        ensure!(
            multi_proof.len() == 1,
            Error::ProofAggregation(format!(
                "partition proof at position {} holds {} partitions",
                position,
                multi_proof.len()
            ))
        );

        let partition_proof = PartitionPoStProof::from_bytes(&multi_proof.partition_proofs[0])
            .with_context(|| format!("partition proof at position {}", position))?;
        ensure!(
            partition_proof.partition_index == position as u64,
            Error::ProofAggregation(format!(
                "expected partition {}, found partition {}",
                position, partition_proof.partition_index
            ))
        );

        proof.extend(partition.0);
    }

    info!("merge_window_post_partition_proofs:finish");

    Ok(proof)
}

fn div_ceil(a: usize, b: usize) -> usize {
    (a + b - 1) / b
}

pub(crate) fn get_partitions_for_window_post(
    total_sector_count: usize,
    post_config: &PoStConfig,
) -> Option<usize> {
    let partitions = div_ceil(total_sector_count, post_config.sector_count.max(1));

    if partitions > 1 {
        Some(partitions)
    } else {
        None
    }
}

pub fn get_num_partition_for_fallback_post(config: &PoStConfig, num_sectors: usize) -> usize {
    match config.typ {
        PoStType::Window => get_partitions_for_window_post(num_sectors, config).unwrap_or(1),
        PoStType::Winning => 1,
    }
}
