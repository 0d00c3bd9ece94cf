use pretty_assertions::assert_eq;
use rand::SeedableRng;
use rand_xorshift::XorShiftRng;
use spacetime_core::{
    api_version::ApiVersion,
    compound_proof::{self, CompoundProof},
    error::Error,
    hasher::Sha256Domain,
    multi_proof::MultiProof,
    util::NODE_SIZE,
    TEST_SEED,
};
use spacetime_post::fallback::{
    self, FallbackPoSt, FallbackPoStCompound, PartitionPoStProof, PoStShape,
};

mod support;

use support::{partition_proofs, TestWindow};

const LEAFS: usize = 64;

fn setup(
    sector_count: usize,
    partitions: Option<usize>,
) -> compound_proof::PublicParams<FallbackPoSt> {
    let setup_params = compound_proof::SetupParams {
        vanilla_params: fallback::SetupParams {
            sector_size: (LEAFS * NODE_SIZE) as u64,
            challenge_count: 5,
            sector_count,
            shape: PoStShape::Window,
            api_version: ApiVersion::V1_1_0,
        },
        partitions,
    };

    FallbackPoStCompound::setup(&setup_params).expect("setup failed")
}

#[test]
fn test_fallback_post_compound_three_partitions() {
    fil_logger::maybe_init();

    let rng = &mut XorShiftRng::from_seed(TEST_SEED);
    let pub_params = setup(2, Some(3));
    let window = TestWindow::new(rng, LEAFS, 5);
    let pub_inputs = window.pub_inputs();

    let vanilla_proofs = partition_proofs(window.sector_proofs(&pub_params.vanilla_params), 2);
    assert_eq!(FallbackPoStCompound::partition_count(&pub_params), 3);

    let multi_proof =
        FallbackPoStCompound::prove_with_vanilla(&pub_params, &pub_inputs, vanilla_proofs.clone())
            .expect("failed to prove");
    assert_eq!(multi_proof.len(), 3);
    assert!(FallbackPoStCompound::verify(&pub_params, &pub_inputs, &multi_proof)
        .expect("failed to verify"));

    // Proving one partition at a time and concatenating gives the same bytes.
    let mut pieces = Vec::new();
    for (k, vanilla_proof) in vanilla_proofs.iter().enumerate() {
        let single = FallbackPoStCompound::prove_partition_with_vanilla(
            &pub_params,
            &pub_inputs,
            vanilla_proof,
            k,
        )
        .expect("failed to prove partition");
        assert_eq!(single.len(), 1);

        let decoded =
            PartitionPoStProof::from_bytes(&single.partition_proofs[0]).expect("decode failed");
        assert_eq!(decoded.partition_index, k as u64);
        assert_eq!(&decoded.proof, vanilla_proof);

        pieces.extend(single.to_vec().expect("to_vec failed"));
    }
    assert_eq!(pieces, multi_proof.to_vec().expect("to_vec failed"));

    let parsed = MultiProof::from_bytes(&pieces).expect("from_bytes failed");
    assert_eq!(parsed, multi_proof);
}

#[test]
fn test_fallback_post_compound_partition_out_of_range() {
    let rng = &mut XorShiftRng::from_seed(TEST_SEED);
    let pub_params = setup(2, Some(2));
    let window = TestWindow::new(rng, LEAFS, 4);
    let pub_inputs = window.pub_inputs();

    let vanilla_proofs = partition_proofs(window.sector_proofs(&pub_params.vanilla_params), 2);

    let err = FallbackPoStCompound::prove_partition_with_vanilla(
        &pub_params,
        &pub_inputs,
        &vanilla_proofs[1],
        2,
    )
    .expect_err("partition 2 does not exist");
    match err.downcast_ref::<Error>() {
        Some(Error::PartitionIndexOutOfRange { index, count }) => {
            assert_eq!((*index, *count), (2, 2));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_fallback_post_compound_rejects_invalid_vanilla_proofs() {
    let rng = &mut XorShiftRng::from_seed(TEST_SEED);
    let pub_params = setup(2, Some(2));
    let window = TestWindow::new(rng, LEAFS, 4);
    let mut pub_inputs = window.pub_inputs();

    let vanilla_proofs = partition_proofs(window.sector_proofs(&pub_params.vanilla_params), 2);
    pub_inputs.sectors[2].comm_r = Sha256Domain([2; 32]);

    let err = FallbackPoStCompound::prove_with_vanilla(&pub_params, &pub_inputs, vanilla_proofs)
        .expect_err("invalid vanilla proofs must not aggregate");
    assert!(matches!(
        err.downcast_ref::<Error>(),
        Some(Error::ProofAggregation(_))
    ));
}

#[test]
fn test_fallback_post_compound_verify_rejects_swapped_partitions() {
    let rng = &mut XorShiftRng::from_seed(TEST_SEED);
    let pub_params = setup(1, Some(2));
    let window = TestWindow::new(rng, LEAFS, 2);
    let pub_inputs = window.pub_inputs();

    let vanilla_proofs = partition_proofs(window.sector_proofs(&pub_params.vanilla_params), 1);
    let multi_proof =
        FallbackPoStCompound::prove_with_vanilla(&pub_params, &pub_inputs, vanilla_proofs)
            .expect("failed to prove");

    let mut swapped = multi_proof.clone();
    swapped.partition_proofs.swap(0, 1);
    assert!(!FallbackPoStCompound::verify(&pub_params, &pub_inputs, &swapped)
        .expect("failed to verify"));

    let truncated = MultiProof::new(multi_proof.partition_proofs[..1].to_vec());
    assert!(!FallbackPoStCompound::verify(&pub_params, &pub_inputs, &truncated)
        .expect("failed to verify"));

    let garbage = MultiProof::new(vec![vec![1, 2, 3], vec![4]]);
    assert!(FallbackPoStCompound::verify(&pub_params, &pub_inputs, &garbage).is_err());
}

#[test]
fn test_zero_partitions_are_rejected() {
    let setup_params = compound_proof::SetupParams::<FallbackPoSt> {
        vanilla_params: fallback::SetupParams {
            sector_size: (LEAFS * NODE_SIZE) as u64,
            challenge_count: 5,
            sector_count: 1,
            shape: PoStShape::Window,
            api_version: ApiVersion::V1_1_0,
        },
        partitions: Some(0),
    };
    assert!(FallbackPoStCompound::setup(&setup_params).is_err());
}
