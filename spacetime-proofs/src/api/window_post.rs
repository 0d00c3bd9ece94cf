use anyhow::{ensure, Context, Result};
use log::info;
use spacetime_core::{compound_proof::CompoundProof, error::Error, proof::ProofScheme};
use spacetime_post::fallback::{FallbackPoSt, FallbackPoStCompound};

use crate::{
    api::post_util::{
        compound_public_params, fallback_public_inputs, get_partitions_for_window_post,
        partition_vanilla_proofs, single_partition_vanilla_proofs,
    },
    types::{
        ChallengeSeed, FallbackPoStSectorProof, PartitionSnarkProof, PoStConfig, PoStType,
        ProverId, SnarkProof,
    },
};

fn ensure_window_config(
    post_config: &PoStConfig,
    vanilla_proofs: &[FallbackPoStSectorProof],
) -> Result<()> {
    ensure!(
        post_config.typ == PoStType::Window,
        Error::InvalidInput("invalid post config type".to_string())
    );
    ensure!(
        !vanilla_proofs.is_empty(),
        Error::InvalidInput("no vanilla proofs".to_string())
    );
    Ok(())
}

/// Generates a Window proof-of-spacetime with provided vanilla proofs.
pub fn generate_window_post_with_vanilla(
    post_config: &PoStConfig,
    randomness: &ChallengeSeed,
    prover_id: ProverId,
    vanilla_proofs: Vec<FallbackPoStSectorProof>,
) -> Result<SnarkProof> {
    info!("generate_window_post_with_vanilla:start");
    ensure_window_config(post_config, &vanilla_proofs)?;

    let partitions = get_partitions_for_window_post(vanilla_proofs.len(), post_config);
    let pub_params = compound_public_params(post_config, partitions)?;
    let partition_count = FallbackPoStCompound::partition_count(&pub_params);

    let pub_inputs = fallback_public_inputs(randomness, prover_id, &vanilla_proofs)?;
    let partitioned_proofs = partition_vanilla_proofs(
        &pub_params.vanilla_params,
        &pub_inputs,
        partition_count,
        &vanilla_proofs,
    )?;

    let proof =
        FallbackPoStCompound::prove_with_vanilla(&pub_params, &pub_inputs, partitioned_proofs)
            .context("generate_window_post_with_vanilla: partition proofs failed")?;

    info!("generate_window_post_with_vanilla:finish");

    proof.to_vec()
}

/// Generates a Window proof-of-spacetime with provided vanilla proofs of a single partition.
///
/// `vanilla_proofs` holds the vanilla proofs of the whole window; the partition count and
/// the sectors belonging to `partition_index` are derived from them.
pub fn generate_single_window_post_with_vanilla(
    post_config: &PoStConfig,
    randomness: &ChallengeSeed,
    prover_id: ProverId,
    vanilla_proofs: Vec<FallbackPoStSectorProof>,
    partition_index: usize,
) -> Result<PartitionSnarkProof> {
    info!("generate_single_window_post_with_vanilla:start");
    ensure_window_config(post_config, &vanilla_proofs)?;

    let partitions = get_partitions_for_window_post(vanilla_proofs.len(), post_config);
    let pub_params = compound_public_params(post_config, partitions)?;
    let partition_count = FallbackPoStCompound::partition_count(&pub_params);
    ensure!(
        partition_index < partition_count,
        Error::PartitionIndexOutOfRange {
            index: partition_index,
            count: partition_count,
        }
    );

    let pub_inputs = fallback_public_inputs(randomness, prover_id, &vanilla_proofs)?;
    let partition_pub_inputs = FallbackPoSt::with_partition(pub_inputs, Some(partition_index));
    let partition_proof = single_partition_vanilla_proofs(
        &pub_params.vanilla_params,
        &partition_pub_inputs,
        &vanilla_proofs,
    )?;

    let proof = FallbackPoStCompound::prove_partition_with_vanilla(
        &pub_params,
        &partition_pub_inputs,
        &partition_proof,
        partition_index,
    )
    .with_context(|| {
        format!(
            "generate_single_window_post_with_vanilla: partition {} failed",
            partition_index
        )
    })?;

    info!("generate_single_window_post_with_vanilla:finish");

    Ok(PartitionSnarkProof(proof.to_vec()?))
}
