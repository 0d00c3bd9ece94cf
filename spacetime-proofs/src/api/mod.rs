use anyhow::{ensure, Result};
use spacetime_core::error::Error;

use crate::types::{ChallengeSeed, ProverId};

mod post_util;
mod window_post;
mod winning_post;

pub use post_util::*;
pub use window_post::*;
pub use winning_post::*;

/// Builds the prover id of a miner: the LEB128 encoding of its actor id, zero padded.
///
/// Actor ids are limited to the signed 64 bit range.
pub fn to_prover_id(miner_id: u64) -> Result<ProverId> {
    ensure!(
        miner_id <= i64::MAX as u64,
        Error::InvalidInput(format!("miner id {} exceeds the actor id range", miner_id))
    );

    let mut prover_id = ProverId::default();
    let mut id = miner_id;
    for byte in prover_id.iter_mut() {
        *byte = (id & 0x7f) as u8;
        id >>= 7;
        if id == 0 {
            break;
        }
        *byte |= 0x80;
    }

    Ok(prover_id)
}

/// Checks that `randomness` is exactly one 32 byte seed.
pub fn as_challenge_seed(randomness: &[u8]) -> Result<ChallengeSeed> {
    ensure!(
        randomness.len() == 32,
        Error::InvalidInput(format!(
            "randomness must be 32 bytes, got {}",
            randomness.len()
        ))
    );

    let mut seed = ChallengeSeed::default();
    seed.copy_from_slice(randomness);
    Ok(seed)
}
