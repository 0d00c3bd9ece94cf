#![allow(dead_code)]

use rand::{Rng, RngCore};
use spacetime_core::{
    hasher::{Sha256Domain, Sha256Function},
    merkle::{create_tree_store, tree_store_config, DiskTree},
    sector::SectorId,
    util::NODE_SIZE,
};
use spacetime_post::fallback::{
    self, generate_leaf_challenges, vanilla_proof, PrivateSector, Proof, PublicParams,
    PublicSector, SectorProof,
};
use tempfile::{tempdir, TempDir};

pub fn random_domain<R: Rng>(rng: &mut R) -> Sha256Domain {
    let mut bytes = [0u8; 32];
    rng.fill_bytes(&mut bytes);
    Sha256Domain(bytes)
}

pub struct TestSector {
    pub id: SectorId,
    pub tree: DiskTree,
    pub replica: Vec<u8>,
    pub comm_c: Sha256Domain,
}

impl TestSector {
    pub fn comm_r(&self) -> Sha256Domain {
        Sha256Function::hash2(&self.comm_c, &self.tree.root())
    }

    pub fn private(&self) -> PrivateSector<'_> {
        PrivateSector {
            tree: &self.tree,
            replica: &self.replica,
            comm_c: self.comm_c,
            comm_r_last: self.tree.root(),
        }
    }
}

/// Replicas, trees and randomness of one proving window.
pub struct TestWindow {
    _dir: TempDir,
    pub sectors: Vec<TestSector>,
    pub randomness: Sha256Domain,
    pub prover_id: Sha256Domain,
}

impl TestWindow {
    pub fn new<R: Rng>(rng: &mut R, leafs: usize, total_sector_count: usize) -> Self {
        let dir = tempdir().expect("tempdir failure");

        let sectors = (0..total_sector_count)
            .map(|i| {
                let replica_path = dir.path().join(format!("replica-{}", i));
                let cache_dir = dir.path().join(format!("cache-{}", i));
                std::fs::create_dir_all(&cache_dir).expect("failed to create cache dir");

                let mut replica = vec![0u8; leafs * NODE_SIZE];
                rng.fill_bytes(&mut replica);
                std::fs::write(&replica_path, &replica).expect("failed to write replica");

                let tree = create_tree_store(&replica_path, tree_store_config(&cache_dir))
                    .expect("failed to create tree");

                TestSector {
                    id: SectorId::from(7 + 3 * i as u64),
                    tree,
                    replica,
                    comm_c: random_domain(rng),
                }
            })
            .collect();

        TestWindow {
            _dir: dir,
            sectors,
            randomness: random_domain(rng),
            prover_id: random_domain(rng),
        }
    }

    pub fn pub_sectors(&self) -> Vec<PublicSector> {
        self.sectors
            .iter()
            .map(|s| PublicSector {
                id: s.id,
                comm_r: s.comm_r(),
            })
            .collect()
    }

    pub fn pub_inputs(&self) -> fallback::PublicInputs {
        fallback::PublicInputs {
            randomness: self.randomness,
            prover_id: self.prover_id,
            sectors: self.pub_sectors(),
            k: None,
        }
    }

    pub fn challenges(&self, pub_params: &PublicParams, sector_index: usize) -> Vec<u64> {
        generate_leaf_challenges(
            pub_params,
            &self.randomness,
            &self.prover_id,
            self.sectors[sector_index].id.into(),
            sector_index,
        )
    }

    /// One vanilla sector proof per sector, in window order.
    pub fn sector_proofs(&self, pub_params: &PublicParams) -> Vec<SectorProof> {
        self.sectors
            .iter()
            .enumerate()
            .map(|(i, sector)| {
                let challenges = self.challenges(pub_params, i);
                let mut proof = vanilla_proof(sector.id, &sector.private(), &challenges)
                    .expect("vanilla proof failed");
                proof.sectors.remove(0)
            })
            .collect()
    }
}

/// Groups sector proofs into partitions, padding the last one with its final sector proof.
pub fn partition_proofs(sector_proofs: Vec<SectorProof>, sector_count: usize) -> Vec<Proof> {
    sector_proofs
        .chunks(sector_count)
        .map(|chunk| {
            let mut sectors = chunk.to_vec();
            while sectors.len() < sector_count {
                sectors.push(sectors[sectors.len() - 1].clone());
            }
            Proof { sectors }
        })
        .collect()
}
