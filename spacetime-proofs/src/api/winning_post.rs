use anyhow::{ensure, Context, Result};
use log::info;
use spacetime_core::{compound_proof::CompoundProof, error::Error};
use spacetime_post::fallback::FallbackPoStCompound;

use crate::{
    api::post_util::{compound_public_params, fallback_public_inputs, partition_vanilla_proofs},
    types::{ChallengeSeed, FallbackPoStSectorProof, PoStConfig, PoStType, ProverId, SnarkProof},
};

/// Generates a Winning proof-of-spacetime with provided vanilla proofs.
///
/// Selecting the challenged sectors is left to the caller; exactly `sector_count`
/// vanilla proofs are expected and they form a single partition.
pub fn generate_winning_post_with_vanilla(
    post_config: &PoStConfig,
    randomness: &ChallengeSeed,
    prover_id: ProverId,
    vanilla_proofs: Vec<FallbackPoStSectorProof>,
) -> Result<SnarkProof> {
    info!("generate_winning_post_with_vanilla:start");
    ensure!(
        post_config.typ == PoStType::Winning,
        Error::InvalidInput("invalid post config type".to_string())
    );
    ensure!(
        vanilla_proofs.len() == post_config.sector_count,
        Error::InvalidInput(format!(
            "expected {} vanilla proofs, got {}",
            post_config.sector_count,
            vanilla_proofs.len()
        ))
    );

    let pub_params = compound_public_params(post_config, None)?;
    let pub_inputs = fallback_public_inputs(randomness, prover_id, &vanilla_proofs)?;
    let partitioned_proofs =
        partition_vanilla_proofs(&pub_params.vanilla_params, &pub_inputs, 1, &vanilla_proofs)?;

    let proof =
        FallbackPoStCompound::prove_with_vanilla(&pub_params, &pub_inputs, partitioned_proofs)
            .context("generate_winning_post_with_vanilla: partition proof failed")?;

    info!("generate_winning_post_with_vanilla:finish");

    proof.to_vec()
}
