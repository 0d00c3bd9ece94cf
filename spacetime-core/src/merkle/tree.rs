use std::fs::File;
use std::path::Path;

use anyhow::{ensure, Context};
use generic_array::typenum::Unsigned;
use log::{info, trace};
use memmap2::{Mmap, MmapOptions};
use merkletree::merkle::{self, get_merkle_tree_len, Element, FromIndexedParallelIterator};
use merkletree::store::{DiskStore, Store, StoreConfig, VecStore};
use rayon::prelude::{ParallelIterator, ParallelSlice};

use crate::cache_key::CacheKey;
use crate::error::{Error, Result};
use crate::hasher::{Sha256Domain, Sha256Function};
use crate::merkle::{MerkleProof, TreeArity};
use crate::util::NODE_SIZE;

/// A binary sha256 tree over a replica, backed by a merkletree store.
pub struct MerkleTreeWrapper<S: Store<Sha256Domain>> {
    pub inner: BinaryTree<S>,
}

/// The replica tree as persisted in a cache directory.
pub type DiskTree = MerkleTreeWrapper<DiskStore<Sha256Domain>>;

pub type BinaryTree<S> = merkle::MerkleTree<Sha256Domain, Sha256Function, S, TreeArity>;

impl<S: Store<Sha256Domain>> From<BinaryTree<S>> for MerkleTreeWrapper<S> {
    fn from(tree: BinaryTree<S>) -> Self {
        Self { inner: tree }
    }
}

impl<S: Store<Sha256Domain>> std::fmt::Debug for MerkleTreeWrapper<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MerkleTreeWrapper")
            .field("inner", &self.inner)
            .finish()
    }
}

impl<S: Store<Sha256Domain>> std::ops::Deref for MerkleTreeWrapper<S> {
    type Target = BinaryTree<S>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<S: Store<Sha256Domain>> MerkleTreeWrapper<S> {
    /// Generates the inclusion proof for leaf `i`.
    pub fn gen_proof(&self, i: usize) -> Result<MerkleProof> {
        ensure!(i < self.inner.leafs(), Error::OutOfBounds(i, self.inner.leafs()));

        let proof = self.inner.gen_proof(i)?;
        MerkleProof::try_from_proof(proof)
    }
}

impl DiskTree {
    /// Opens the tree with `leafs` leaves persisted under `config`.
    pub fn open(config: &StoreConfig, leafs: usize) -> Result<Self> {
        check_leafs(leafs)?;

        let tree_len = get_merkle_tree_len(leafs, TreeArity::to_usize())?;
        let store = DiskStore::new_from_disk(tree_len, TreeArity::to_usize(), config)
            .with_context(|| format!("could not open tree {:?} in {:?}", config.id, config.path))?;
        let tree = BinaryTree::<DiskStore<Sha256Domain>>::from_data_store(store, leafs)
            .map_err(|err| Error::MalformedMerkleTree(format!("{:?}: {:#}", config.id, err)))?;

        Ok(tree.into())
    }
}

/// Store location of the replica tree in `cache_dir`.
pub fn tree_store_config(cache_dir: &Path) -> StoreConfig {
    StoreConfig::new(cache_dir, CacheKey::CommRLastTree.to_string(), 0)
}

fn check_leafs(leafs: usize) -> Result<()> {
    ensure!(
        leafs >= 2 && leafs.is_power_of_two(),
        Error::MalformedMerkleTree(format!("{} leafs is not a power of two", leafs))
    );
    Ok(())
}

fn check_replica(data: &[u8]) -> Result<()> {
    ensure!(
        data.len() % NODE_SIZE == 0,
        Error::MalformedMerkleTree(format!(
            "replica length {} is not a multiple of {}",
            data.len(),
            NODE_SIZE
        ))
    );
    check_leafs(data.len() / NODE_SIZE)
}

/// Computes the root of the tree over a replica without persisting it.
pub fn compute_root(replica_data: &[u8]) -> Result<Sha256Domain> {
    check_replica(replica_data)?;

    let tree = BinaryTree::<VecStore<Sha256Domain>>::from_par_iter(
        replica_data.par_chunks(NODE_SIZE).map(Sha256Domain::from_slice),
    )?;
    Ok(tree.root())
}

/// Memory maps a replica file read-only.
pub fn map_replica(replica_path: &Path) -> Result<Mmap> {
    let file = File::open(replica_path)
        .with_context(|| format!("could not open path={:?}", replica_path))?;
    let len = file
        .metadata()
        .with_context(|| format!("could not stat path={:?}", replica_path))?
        .len();
    ensure!(
        len > 0,
        Error::MalformedMerkleTree(format!("{:?} is empty", replica_path))
    );

    let map = unsafe { MmapOptions::new().map(&file) }
        .with_context(|| format!("could not mmap path={:?}", replica_path))?;
    Ok(map)
}

/// Builds the tree over the replica at `replica_path` and persists it under `config`.
pub fn create_tree_store(replica_path: &Path, config: StoreConfig) -> Result<DiskTree> {
    info!("create_tree_store:start: {:?}", config.id);

    let replica = map_replica(replica_path)?;
    check_replica(&replica)?;
    trace!(
        "building tree of {} leafs in {:?}",
        replica.len() / NODE_SIZE,
        config.path
    );

    let id = config.id.clone();
    let tree = BinaryTree::<DiskStore<Sha256Domain>>::from_par_iter_with_config(
        replica.par_chunks(NODE_SIZE).map(Sha256Domain::from_slice),
        config,
    )
    .with_context(|| format!("could not build tree {:?}", id))?;

    info!("create_tree_store:finish: {:?}", id);
    Ok(tree.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::{RngCore, SeedableRng};
    use rand_xorshift::XorShiftRng;
    use tempfile::tempdir;

    use crate::TEST_SEED;

    fn write_replica(path: &Path, leafs: usize) -> Vec<u8> {
        let rng = &mut XorShiftRng::from_seed(TEST_SEED);
        let mut data = vec![0u8; leafs * NODE_SIZE];
        rng.fill_bytes(&mut data);
        std::fs::write(path, &data).expect("failed to write replica");
        data
    }

    #[test]
    fn test_create_and_prove_every_leaf() {
        let dir = tempdir().expect("tempdir failure");
        let replica_path = dir.path().join("replica");
        let data = write_replica(&replica_path, 64);

        let tree = create_tree_store(&replica_path, tree_store_config(dir.path()))
            .expect("create failure");
        assert_eq!(tree.leafs(), 64);
        assert_eq!(tree.root(), compute_root(&data).expect("compute_root failure"));

        for i in 0..tree.leafs() {
            let proof = tree.gen_proof(i).expect("gen_proof failure");
            let expected_leaf =
                Sha256Domain::try_from_bytes(&data[i * NODE_SIZE..(i + 1) * NODE_SIZE])
                    .expect("leaf");

            assert!(proof.verify(), "failed to validate");
            assert_eq!(proof.path().len(), proof.expected_len(tree.leafs()));
            assert_eq!(proof.path().len(), 6);
            assert!(proof.validate(i), "failed to validate valid merkle path");
            assert!(proof.validate_data(expected_leaf), "failed to validate valid data");
            assert!(!proof.validate((i + 1) % tree.leafs()));
            assert_eq!(tree.read_at(i).expect("read_at failure"), expected_leaf);
        }
    }

    #[test]
    fn test_root_matches_hash2_levels() {
        let dir = tempdir().expect("tempdir failure");
        let replica_path = dir.path().join("replica");
        let data = write_replica(&replica_path, 4);

        let leaf = |i: usize| {
            Sha256Domain::try_from_bytes(&data[i * NODE_SIZE..(i + 1) * NODE_SIZE]).expect("leaf")
        };
        let expected = Sha256Function::hash2(
            &Sha256Function::hash2(&leaf(0), &leaf(1)),
            &Sha256Function::hash2(&leaf(2), &leaf(3)),
        );

        let tree = create_tree_store(&replica_path, tree_store_config(dir.path()))
            .expect("create failure");
        assert_eq!(tree.root(), expected);
    }

    #[test]
    fn test_open_rejects_wrong_sizes() {
        let dir = tempdir().expect("tempdir failure");
        let replica_path = dir.path().join("replica");
        let config = tree_store_config(dir.path());
        write_replica(&replica_path, 16);
        let created = create_tree_store(&replica_path, config.clone()).expect("create failure");

        let opened = DiskTree::open(&config, 16).expect("open failure");
        assert_eq!(opened.root(), created.root());
        assert!(DiskTree::open(&config, 32).is_err());
        assert!(DiskTree::open(&config, 12).is_err());
        assert!(DiskTree::open(&tree_store_config(&dir.path().join("missing")), 16).is_err());
    }

    #[test]
    fn test_tampered_proof_fails() {
        let dir = tempdir().expect("tempdir failure");
        let replica_path = dir.path().join("replica");
        write_replica(&replica_path, 8);
        let tree = create_tree_store(&replica_path, tree_store_config(dir.path()))
            .expect("create failure");

        let proof = tree.gen_proof(5).expect("gen_proof failure");
        let mut tampered = proof.clone();
        tampered.break_sibling(1, Sha256Domain([9; 32]));

        assert!(proof.validate(5));
        assert!(!tampered.verify());
        assert!(!tampered.validate(5));
        assert!(!tampered.validate_data(proof.leaf()));
        assert!(tree.gen_proof(8).is_err());
    }

    #[test]
    fn test_non_power_of_two_replica_is_rejected() {
        let dir = tempdir().expect("tempdir failure");
        let replica_path = dir.path().join("replica");
        write_replica(&replica_path, 6);

        assert!(create_tree_store(&replica_path, tree_store_config(dir.path())).is_err());
        assert!(compute_root(&[0u8; 6 * NODE_SIZE]).is_err());
    }
}
