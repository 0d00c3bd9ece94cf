use anyhow::ensure;
use generic_array::typenum::{Unsigned, U2};
use merkletree::hash::Algorithm;
use merkletree::proof;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::hasher::{Sha256Domain, Sha256Function};

/// Branching factor of the replica tree.
pub type TreeArity = U2;

/// Inclusion proof of a single leaf in the replica tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProof {
    /// Root of the merkle tree.
    root: Sha256Domain,
    /// The original leaf data for this proof.
    leaf: Sha256Domain,
    /// The path from leaf to root.
    path: InclusionPath,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct InclusionPath {
    path: Vec<PathElement>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct PathElement {
    hashes: Vec<Sha256Domain>,
    index: usize,
}

impl InclusionPath {
    /// Calculate the root of this path, given the leaf as input.
    fn root(&self, leaf: Sha256Domain) -> Sha256Domain {
        let mut a = Sha256Function::default();
        (0..self.path.len()).fold(leaf, |h, height| {
            a.reset();

            let index = self.path[height].index;
            let mut nodes = self.path[height].hashes.clone();
            nodes.insert(index, h);

            a.multi_node(&nodes, height)
        })
    }

    fn path_index(&self) -> usize {
        self.path
            .iter()
            .rev()
            .fold(0, |acc, p| (acc * TreeArity::to_usize()) + p.index)
    }
}

/// The lemma of a base tree proof is the leaf, one sibling group per level, then the root.
fn extract_path(lemma: &[Sha256Domain], path: &[usize]) -> InclusionPath {
    let path = lemma[1..lemma.len() - 1]
        .chunks(TreeArity::to_usize() - 1)
        .zip(path.iter())
        .map(|(hashes, index)| PathElement {
            hashes: hashes.to_vec(),
            index: *index,
        })
        .collect::<Vec<_>>();

    InclusionPath { path }
}

impl MerkleProof {
    /// Converts a proof generated by the tree store.
    pub fn try_from_proof(p: proof::Proof<Sha256Domain, TreeArity>) -> Result<Self> {
        ensure!(
            p.top_layer_nodes() == 0 && p.sub_layer_nodes() == 0,
            Error::MalformedMerkleTree("compound tree proofs are not supported".to_string())
        );
        ensure!(
            p.lemma().len() >= 2 && p.lemma().len() == p.path().len() + 2,
            Error::MalformedMerkleTree(format!(
                "lemma of {} nodes for a path of {}",
                p.lemma().len(),
                p.path().len()
            ))
        );

        Ok(MerkleProof {
            root: p.root(),
            leaf: p.item(),
            path: extract_path(p.lemma(), p.path()),
        })
    }

    pub fn leaf(&self) -> Sha256Domain {
        self.leaf
    }

    pub fn root(&self) -> Sha256Domain {
        self.root
    }

    /// Sibling hashes and the position of the proven node, from the leaves up.
    pub fn path(&self) -> Vec<(Vec<Sha256Domain>, usize)> {
        self.path
            .path
            .iter()
            .map(|x| (x.hashes.clone(), x.index))
            .collect::<Vec<_>>()
    }

    pub fn path_index(&self) -> usize {
        self.path.path_index()
    }

    /// Calculates the expected length of the path, given the number of leaves in the tree.
    pub fn expected_len(&self, leaves: usize) -> usize {
        let mut len = 0;
        let mut width = leaves;
        while width > 1 {
            width /= TreeArity::to_usize();
            len += 1;
        }
        len
    }

    pub fn verify(&self) -> bool {
        self.root == self.path.root(self.leaf)
    }

    /// Validates the MerkleProof and that it corresponds to the supplied node.
    pub fn validate(&self, node: usize) -> bool {
        if !self.verify() {
            return false;
        }

        node == self.path_index()
    }

    pub fn validate_data(&self, data: Sha256Domain) -> bool {
        if !self.verify() {
            return false;
        }

        self.leaf == data
    }

    #[cfg(test)]
    pub(crate) fn break_sibling(&mut self, height: usize, node: Sha256Domain) {
        self.path.path[height].hashes[0] = node;
    }
}
