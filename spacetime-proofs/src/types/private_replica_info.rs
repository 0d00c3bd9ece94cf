use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{ensure, Context, Result};
use bincode::deserialize;
use log::trace;
use memmap2::Mmap;
use spacetime_core::{
    cache_key::CacheKey,
    error::Error,
    hasher::Sha256Domain,
    merkle::{map_replica, tree_store_config, DiskTree},
};

use crate::types::{Commitment, PersistentAux, SectorSize};

/// The minimal information required about a replica, in order to be able to generate
/// a PoSt over it.
///
/// Nothing is read from disk on construction; the cache files are opened when a
/// vanilla proof is generated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PrivateReplicaInfo {
    /// Path to the replica.
    replica: PathBuf,
    /// The replica commitment.
    comm_r: Commitment,
    /// Contains sector-specific (e.g. merkle trees) assets
    pub cache_dir: PathBuf,
}

impl PrivateReplicaInfo {
    pub fn new(replica: PathBuf, comm_r: Commitment, cache_dir: PathBuf) -> Result<Self> {
        ensure!(
            comm_r != [0; 32],
            Error::InvalidInput("Invalid all zero commitment (comm_r)".to_string())
        );

        Ok(PrivateReplicaInfo {
            replica,
            comm_r,
            cache_dir,
        })
    }

    pub fn cache_dir_path(&self) -> &Path {
        self.cache_dir.as_path()
    }

    pub fn replica_path(&self) -> &Path {
        self.replica.as_path()
    }

    pub fn comm_r(&self) -> Commitment {
        self.comm_r
    }

    pub fn safe_comm_r(&self) -> Sha256Domain {
        Sha256Domain(self.comm_r)
    }

    /// Reads the persisted commitments of this replica.
    pub fn aux(&self) -> Result<PersistentAux> {
        let p_aux_path = self.cache_dir.join(CacheKey::PAux.to_string());
        let p_aux_bytes = fs::read(&p_aux_path)
            .with_context(|| format!("could not read from path={:?}", p_aux_path))?;

        deserialize(&p_aux_bytes)
            .with_context(|| format!("could not deserialize path={:?}", p_aux_path))
    }

    /// Opens the persisted tree of this particular replica.
    pub fn merkle_tree(&self, sector_size: SectorSize) -> Result<DiskTree> {
        let config = tree_store_config(&self.cache_dir);
        trace!(
            "post: opening tree {:?} in {:?} with {} leafs",
            config.id,
            config.path,
            sector_size.leafs()
        );

        DiskTree::open(&config, sector_size.leafs())
    }

    /// Memory maps the replica data.
    pub fn map_replica(&self) -> Result<Mmap> {
        map_replica(&self.replica)
    }
}
