use serde::{Deserialize, Serialize};
use spacetime_core::{hasher::Sha256Domain, sector::SectorId};
use spacetime_post::fallback;

mod post_config;
mod private_replica_info;
mod sector_size;

pub use post_config::*;
pub use private_replica_info::*;
pub use sector_size::*;

pub type Commitment = [u8; 32];
pub type ChallengeSeed = [u8; 32];
pub type ProverId = [u8; 32];

/// A complete proof: the serialized partition proofs of a proving window.
pub type SnarkProof = Vec<u8>;

/// The serialized proof of a single window partition.
#[derive(Debug, Clone, PartialEq, Eq)]
#[repr(transparent)]
pub struct PartitionSnarkProof(pub Vec<u8>);

pub type VanillaProof = fallback::Proof;

/// Commitments persisted next to a replica's tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistentAux {
    pub comm_c: Sha256Domain,
    pub comm_r_last: Sha256Domain,
}

// This FallbackPoStSectorProof is used during Fallback PoSt, but
// contains only Vanilla proof information and is not a full Fallback
// PoSt proof.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackPoStSectorProof {
    pub sector_id: SectorId,
    pub comm_r: Sha256Domain,
    pub vanilla_proof: VanillaProof, // Has comm_c, comm_r_last, inclusion_proofs
}
