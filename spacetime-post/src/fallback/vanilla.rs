use anyhow::ensure;
use byteorder::{ByteOrder, LittleEndian};
use log::{error, trace};
use rayon::prelude::{
    IndexedParallelIterator, IntoParallelIterator, IntoParallelRefIterator, ParallelIterator,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use spacetime_core::{
    api_version::ApiVersion,
    error::{Error, Result},
    hasher::{Sha256Domain, Sha256Function},
    merkle::{DiskTree, MerkleProof},
    proof::ProofScheme,
    sector::SectorId,
    util::{data_at_node, NODE_SIZE},
};

use crate::fallback::get_challenge_index;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoStShape {
    Window,
    Winning,
}

#[derive(Debug, Clone)]
pub struct SetupParams {
    /// Size of the sector in bytes.
    pub sector_size: u64,
    /// Number of challenges per sector.
    pub challenge_count: usize,
    /// Number of challenged sectors.
    pub sector_count: usize,
    pub shape: PoStShape,
    pub api_version: ApiVersion,
}

#[derive(Debug, Clone)]
pub struct PublicParams {
    /// Size of the sector in bytes.
    pub sector_size: u64,
    /// Number of challenges per sector.
    pub challenge_count: usize,
    /// Number of challenged sectors.
    pub sector_count: usize,
    pub shape: PoStShape,
    pub api_version: ApiVersion,
}

impl PublicParams {
    pub fn leafs(&self) -> usize {
        self.sector_size as usize / NODE_SIZE
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicInputs {
    pub randomness: Sha256Domain,
    pub prover_id: Sha256Domain,
    /// All sectors of the proving window, in ascending id order.
    pub sectors: Vec<PublicSector>,
    /// Partition index
    pub k: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicSector {
    pub id: SectorId,
    pub comm_r: Sha256Domain,
}

/// What the prover holds for a single sector.
#[derive(Debug)]
pub struct PrivateSector<'a> {
    pub tree: &'a DiskTree,
    /// The replica data the tree was built over.
    pub replica: &'a [u8],
    pub comm_c: Sha256Domain,
    pub comm_r_last: Sha256Domain,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof {
    pub sectors: Vec<SectorProof>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectorProof {
    pub inclusion_proofs: Vec<MerkleProof>,
    pub comm_c: Sha256Domain,
    pub comm_r_last: Sha256Domain,
}

impl SectorProof {
    pub fn comm_r_last(&self) -> Sha256Domain {
        self.comm_r_last
    }

    pub fn commitments(&self) -> Vec<Sha256Domain> {
        self.inclusion_proofs.iter().map(MerkleProof::root).collect()
    }

    // Returns a read-only reference.
    pub fn inclusion_proofs(&self) -> &[MerkleProof] {
        &self.inclusion_proofs
    }
}

#[derive(Debug, Clone)]
pub struct FallbackPoSt;

fn challenge_hasher(randomness: &Sha256Domain, prover_id: &Sha256Domain, sector_id: u64) -> Sha256 {
    let mut hasher = Sha256::new();
    hasher.update(randomness.as_ref());
    hasher.update(prover_id.as_ref());
    hasher.update(&sector_id.to_le_bytes()[..]);
    hasher
}

/// Generate all challenged leaves of the sector at `sector_index` in the proving window.
pub fn generate_leaf_challenges(
    pub_params: &PublicParams,
    randomness: &Sha256Domain,
    prover_id: &Sha256Domain,
    sector_id: u64,
    sector_index: usize,
) -> Vec<u64> {
    // avoid rehashing fixed inputs
    let hasher = challenge_hasher(randomness, prover_id, sector_id);

    (0..pub_params.challenge_count)
        .map(|n| {
            let challenge_index = get_challenge_index(
                pub_params.api_version,
                sector_index,
                pub_params.challenge_count,
                n,
            );
            generate_leaf_challenge_inner(hasher.clone(), pub_params, challenge_index)
        })
        .collect()
}

/// Generates challenge, such that the range fits into the sector.
pub fn generate_leaf_challenge(
    pub_params: &PublicParams,
    randomness: &Sha256Domain,
    prover_id: &Sha256Domain,
    sector_id: u64,
    leaf_challenge_index: u64,
) -> u64 {
    let hasher = challenge_hasher(randomness, prover_id, sector_id);
    generate_leaf_challenge_inner(hasher, pub_params, leaf_challenge_index)
}

pub fn generate_leaf_challenge_inner(
    mut hasher: Sha256,
    pub_params: &PublicParams,
    leaf_challenge_index: u64,
) -> u64 {
    hasher.update(&leaf_challenge_index.to_le_bytes()[..]);
    let hash = hasher.finalize();

    let leaf_challenge = LittleEndian::read_u64(&hash[..8]);

    leaf_challenge % (pub_params.sector_size / NODE_SIZE as u64)
}

// Generates a single vanilla proof, given the private sector and its challenges.
pub fn vanilla_proof(
    sector_id: SectorId,
    priv_sector: &PrivateSector<'_>,
    challenges: &[u64],
) -> Result<Proof> {
    ensure!(
        !challenges.is_empty(),
        Error::InvalidInput(format!("no challenges for {}", sector_id))
    );

    let tree = priv_sector.tree;
    let tree_leafs = tree.leafs();
    if let Some(c) = challenges.iter().find(|&&c| c >= tree_leafs as u64) {
        return Err(Error::InvalidInput(format!(
            "challenge {} of {} is out of bounds for {} leafs",
            c, sector_id, tree_leafs
        ))
        .into());
    }

    trace!("Generating proof for tree leafs {}", tree_leafs);

    let replica_access = |reason: String| Error::ReplicaAccess { sector_id, reason };

    ensure!(
        tree.root() == priv_sector.comm_r_last,
        replica_access("tree root does not match comm_r_last".to_string())
    );

    let inclusion_proofs = challenges
        .into_par_iter()
        .map(|&challenged_leaf| {
            let challenged_leaf = challenged_leaf as usize;
            let proof = tree
                .gen_proof(challenged_leaf)
                .map_err(|err| replica_access(format!("{:#}", err)))?;

            let data = data_at_node(priv_sector.replica, challenged_leaf)
                .and_then(Sha256Domain::try_from_bytes)
                .map_err(|err| replica_access(format!("{:#}", err)))?;

            ensure!(
                proof.validate(challenged_leaf) && proof.validate_data(data),
                replica_access(format!("invalid inclusion proof for leaf {}", challenged_leaf))
            );

            Ok(proof)
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Proof {
        sectors: vec![SectorProof {
            inclusion_proofs,
            comm_c: priv_sector.comm_c,
            comm_r_last: priv_sector.comm_r_last,
        }],
    })
}

/// Checks one sector proof found at `sector_index` in the proving window.
fn verify_sector_proof(
    pub_params: &PublicParams,
    pub_inputs: &PublicInputs,
    sector_index: usize,
    pub_sector: &PublicSector,
    sector_proof: &SectorProof,
) -> bool {
    let sector_id = pub_sector.id;
    let comm_r_last = sector_proof.comm_r_last;
    let inclusion_proofs = &sector_proof.inclusion_proofs;

    // Verify that H(Comm_c || Comm_r_last) == Comm_R
    if Sha256Function::hash2(&sector_proof.comm_c, &comm_r_last) != pub_sector.comm_r {
        error!("hash(comm_c || comm_r_last) != comm_r: {}", sector_id);
        return false;
    }

    if inclusion_proofs.len() != pub_params.challenge_count {
        error!(
            "unexpected number of inclusion proofs for {}: {} != {}",
            sector_id,
            inclusion_proofs.len(),
            pub_params.challenge_count
        );
        return false;
    }

    let challenges = generate_leaf_challenges(
        pub_params,
        &pub_inputs.randomness,
        &pub_inputs.prover_id,
        sector_id.into(),
        sector_index,
    );

    inclusion_proofs
        .iter()
        .zip(challenges)
        .all(|(inclusion_proof, challenged_leaf)| {
            // validate all comm_r_lasts match
            if inclusion_proof.root() != comm_r_last {
                error!("inclusion proof root != comm_r_last: {}", sector_id);
                return false;
            }

            // validate the path length
            if inclusion_proof.expected_len(pub_params.leafs()) != inclusion_proof.path().len() {
                error!("wrong path length: {}", sector_id);
                return false;
            }

            if !inclusion_proof.validate(challenged_leaf as usize) {
                error!("invalid inclusion proof: {}", sector_id);
                return false;
            }
            true
        })
}

impl ProofScheme for FallbackPoSt {
    type PublicParams = PublicParams;
    type SetupParams = SetupParams;
    type PublicInputs = PublicInputs;
    type Proof = Proof;

    fn setup(sp: &Self::SetupParams) -> Result<Self::PublicParams> {
        ensure!(
            sp.sector_size.is_power_of_two() && sp.sector_size >= 2 * NODE_SIZE as u64,
            Error::InvalidInput(format!("invalid sector size {}", sp.sector_size))
        );
        ensure!(
            sp.challenge_count > 0 && sp.sector_count > 0,
            Error::InvalidInput("challenge and sector counts must be positive".to_string())
        );

        Ok(PublicParams {
            sector_size: sp.sector_size,
            challenge_count: sp.challenge_count,
            sector_count: sp.sector_count,
            shape: sp.shape,
            api_version: sp.api_version,
        })
    }

    /// Verifies the proof of partition `pub_inputs.k`.
    fn verify(
        pub_params: &Self::PublicParams,
        pub_inputs: &Self::PublicInputs,
        proof: &Self::Proof,
    ) -> Result<bool> {
        let num_sectors_per_chunk = pub_params.sector_count;
        let partition_index = pub_inputs.k.unwrap_or(0);

        // A winning proof is a single partition over exactly `sector_count` sectors.
        if pub_params.shape == PoStShape::Winning
            && (partition_index != 0 || pub_inputs.sectors.len() != num_sectors_per_chunk)
        {
            error!(
                "winning proof must cover {} sectors in one partition, got partition {} of {} sectors",
                num_sectors_per_chunk,
                partition_index,
                pub_inputs.sectors.len()
            );
            return Ok(false);
        }

        let pub_sectors_chunk = pub_inputs
            .sectors
            .chunks(num_sectors_per_chunk)
            .nth(partition_index)
            .ok_or_else(|| {
                Error::InvalidInput(format!(
                    "no sectors for partition {} of {} sectors",
                    partition_index,
                    pub_inputs.sectors.len()
                ))
            })?;

        if proof.sectors.len() != num_sectors_per_chunk {
            error!(
                "invalid number of sectors in the partition proof {}: {} != {}",
                partition_index,
                proof.sectors.len(),
                num_sectors_per_chunk,
            );
            return Ok(false);
        }

        // Padding repeats the last real sector proof.
        let (real, padding) = proof.sectors.split_at(pub_sectors_chunk.len());
        if let Some(last) = real.last() {
            if padding.iter().any(|p| p != last) {
                error!("invalid padding in partition proof {}", partition_index);
                return Ok(false);
            }
        }

        let first_index = partition_index * num_sectors_per_chunk;
        let is_valid = pub_sectors_chunk
            .par_iter()
            .zip(real.par_iter())
            .enumerate()
            .all(|(i, (pub_sector, sector_proof))| {
                verify_sector_proof(
                    pub_params,
                    pub_inputs,
                    first_index + i,
                    pub_sector,
                    sector_proof,
                )
            });

        Ok(is_valid)
    }

    fn with_partition(mut pub_in: Self::PublicInputs, k: Option<usize>) -> Self::PublicInputs {
        pub_in.k = k;
        pub_in
    }
}
