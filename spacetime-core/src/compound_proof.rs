use std::time::Instant;

use anyhow::ensure;
use lazy_static::lazy_static;
use log::{info, trace};
use rayon::prelude::{IndexedParallelIterator, IntoParallelRefIterator, ParallelIterator};

use crate::error::{Error, Result};
use crate::multi_proof::MultiProof;
use crate::proof::ProofScheme;
use crate::settings::SETTINGS;

lazy_static! {
    static ref THREAD_POOL: rayon::ThreadPool = rayon::ThreadPoolBuilder::new()
        .num_threads(SETTINGS.window_post_synthesis_num_cpus as usize)
        .build()
        .expect("failed to build thread pool");
}

#[derive(Clone)]
pub struct SetupParams<S: ProofScheme> {
    pub vanilla_params: S::SetupParams,
    pub partitions: Option<usize>,
}

#[derive(Clone)]
pub struct PublicParams<S: ProofScheme> {
    pub vanilla_params: S::PublicParams,
    pub partitions: Option<usize>,
}

/// The CompoundProof trait turns the vanilla proofs of a proof::ProofScheme into
/// self-contained partition proofs, one per partition, collected in a `MultiProof`.
///
/// Implementations supply `partition_proof` and `verify_partition_proof`; the remaining
/// methods take care of partition bookkeeping.
pub trait CompoundProof<S: ProofScheme>
where
    S::Proof: Sync + Send,
    S::PublicParams: Sync + Send,
    S::PublicInputs: Sync + Send,
{
    // setup is equivalent to ProofScheme::setup.
    fn setup(sp: &SetupParams<S>) -> Result<PublicParams<S>> {
        ensure!(
            sp.partitions != Some(0),
            Error::InvalidInput("cannot specify zero partitions".to_string())
        );

        Ok(PublicParams {
            vanilla_params: S::setup(&sp.vanilla_params)?,
            partitions: sp.partitions,
        })
    }

    fn partition_count(public_params: &PublicParams<S>) -> usize {
        public_params.partitions.unwrap_or(1)
    }

    /// Produces the proofs of every partition, in partition order.
    fn prove_with_vanilla(
        pub_params: &PublicParams<S>,
        pub_in: &S::PublicInputs,
        vanilla_proofs: Vec<S::Proof>,
    ) -> Result<MultiProof> {
        let partition_count = Self::partition_count(pub_params);
        ensure!(
            vanilla_proofs.len() == partition_count,
            Error::InvalidInput(format!(
                "expected {} partition vanilla proofs, got {}",
                partition_count,
                vanilla_proofs.len()
            ))
        );

        info!("partition_proofs:start: {} partitions", partition_count);
        let start = Instant::now();

        let partition_proofs = THREAD_POOL.install(|| {
            vanilla_proofs
                .par_iter()
                .enumerate()
                .map(|(k, vanilla_proof)| {
                    trace!("proving partition {}", k);
                    let partition_pub_in = S::with_partition(pub_in.clone(), Some(k));
                    Self::partition_proof(
                        &pub_params.vanilla_params,
                        &partition_pub_in,
                        vanilla_proof,
                        k,
                    )
                })
                .collect::<Result<Vec<_>>>()
        })?;

        info!(
            "partition_proofs:finish: total_partition_proof_time: {:?}",
            start.elapsed()
        );

        Ok(MultiProof::new(partition_proofs))
    }

    /// Produces the proof of partition `k` only.
    fn prove_partition_with_vanilla(
        pub_params: &PublicParams<S>,
        pub_in: &S::PublicInputs,
        vanilla_proof: &S::Proof,
        k: usize,
    ) -> Result<MultiProof> {
        let partition_count = Self::partition_count(pub_params);
        ensure!(
            k < partition_count,
            Error::PartitionIndexOutOfRange {
                index: k,
                count: partition_count,
            }
        );

        let partition_pub_in = S::with_partition(pub_in.clone(), Some(k));
        let proof =
            Self::partition_proof(&pub_params.vanilla_params, &partition_pub_in, vanilla_proof, k)?;

        Ok(MultiProof::new(vec![proof]))
    }

    // verify checks every partition proof against the public inputs alone.
    fn verify(
        public_params: &PublicParams<S>,
        public_inputs: &S::PublicInputs,
        multi_proof: &MultiProof,
    ) -> Result<bool> {
        if multi_proof.len() != Self::partition_count(public_params) {
            return Ok(false);
        }

        for (k, proof_bytes) in multi_proof.partition_proofs.iter().enumerate() {
            let partition_pub_in = S::with_partition(public_inputs.clone(), Some(k));
            if !Self::verify_partition_proof(
                &public_params.vanilla_params,
                &partition_pub_in,
                proof_bytes,
                k,
            )? {
                return Ok(false);
            }
        }

        Ok(true)
    }

    /// Encodes the proof of partition `k`, which must be bound to `k`.
    fn partition_proof(
        pub_params: &S::PublicParams,
        pub_in: &S::PublicInputs,
        vanilla_proof: &S::Proof,
        k: usize,
    ) -> Result<Vec<u8>>;

    fn verify_partition_proof(
        pub_params: &S::PublicParams,
        pub_in: &S::PublicInputs,
        proof_bytes: &[u8],
        k: usize,
    ) -> Result<bool>;
}
