use crate::sector::SectorId;

pub use anyhow::Result;

/// Error kinds surfaced by the proving pipeline.
///
/// Public functions return `anyhow::Result`; callers classify failures with
/// `err.downcast_ref::<Error>()`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("unsupported proof type: {0}")]
    UnsupportedProofType(String),
    #[error("replica of {sector_id} is not accessible: {reason}")]
    ReplicaAccess { sector_id: SectorId, reason: String },
    #[error("partition index {index} is out of range, there are {count} partitions")]
    PartitionIndexOutOfRange { index: usize, count: usize },
    #[error("proof aggregation failed: {0}")]
    ProofAggregation(String),
    #[error("Out of bounds access {} > {}", _0, _1)]
    OutOfBounds(usize, usize),
    #[error("malformed merkle tree: {0}")]
    MalformedMerkleTree(String),
    #[error("{}", _0)]
    Io(#[from] ::std::io::Error),
}
