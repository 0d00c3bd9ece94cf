#![allow(dead_code)]

use std::fs;
use std::path::Path;

use rand::{Rng, RngCore};
use spacetime_core::{
    cache_key::CacheKey,
    error::Error,
    hasher::{Sha256Domain, Sha256Function},
    merkle::{create_tree_store, tree_store_config},
    sector::SectorId,
};
use spacetime_proofs::{Commitment, PersistentAux, PrivateReplicaInfo};

pub fn random_bytes<R: Rng>(rng: &mut R) -> [u8; 32] {
    let mut bytes = [0u8; 32];
    rng.fill_bytes(&mut bytes);
    bytes
}

/// Writes a random replica of `sector_size` bytes under `dir`, along with the tree and
/// commitments of its cache directory.
pub fn create_replica<R: Rng>(
    rng: &mut R,
    dir: &Path,
    name: &str,
    sector_size: u64,
) -> (PrivateReplicaInfo, Commitment) {
    let replica_path = dir.join(format!("replica-{}", name));
    let cache_dir = dir.join(format!("cache-{}", name));
    fs::create_dir_all(&cache_dir).expect("failed to create cache dir");

    let mut data = vec![0u8; sector_size as usize];
    rng.fill_bytes(&mut data);
    fs::write(&replica_path, &data).expect("failed to write replica");

    let tree = create_tree_store(&replica_path, tree_store_config(&cache_dir))
        .expect("failed to create tree");

    let p_aux = PersistentAux {
        comm_c: Sha256Domain(random_bytes(rng)),
        comm_r_last: tree.root(),
    };
    fs::write(
        cache_dir.join(CacheKey::PAux.to_string()),
        bincode::serialize(&p_aux).expect("failed to serialize p_aux"),
    )
    .expect("failed to write p_aux");

    let comm_r = Sha256Function::hash2(&p_aux.comm_c, &p_aux.comm_r_last).0;
    let replica = PrivateReplicaInfo::new(replica_path, comm_r, cache_dir)
        .expect("failed to create replica info");

    (replica, comm_r)
}

pub fn sector_ids(ids: &[u64]) -> Vec<SectorId> {
    ids.iter().copied().map(SectorId::from).collect()
}

pub fn assert_error<T: std::fmt::Debug>(
    res: anyhow::Result<T>,
    check: impl FnOnce(&Error) -> bool,
) {
    let err = res.expect_err("expected an error");
    let inner = err
        .downcast_ref::<Error>()
        .unwrap_or_else(|| panic!("unexpected error kind: {:?}", err));
    assert!(check(inner), "unexpected error: {:?}", err);
}
