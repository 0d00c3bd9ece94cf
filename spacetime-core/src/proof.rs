use serde::de::DeserializeOwned;
use serde::ser::Serialize;

use crate::error::Result;

/// The ProofScheme trait provides the methods that any proof scheme needs to implement.
///
/// Proving is scheme specific (vanilla proofs are produced sector by sector from private
/// replica data); what is shared is parameter setup and the partitioned verification.
pub trait ProofScheme {
    type PublicParams: Clone;
    type SetupParams: Clone;
    type PublicInputs: Clone;
    type Proof: Clone + Serialize + DeserializeOwned;

    /// setup is used to generate public parameters from setup parameters in order to specialize
    /// a ProofScheme to the specific parameters required by a consumer.
    fn setup(_: &Self::SetupParams) -> Result<Self::PublicParams>;

    /// verify returns true if the supplied proof is valid for the given public parameter and public inputs.
    /// Remember that proof is untrusted, and any data it provides MUST be validated as corresponding
    /// to the supplied public parameters and inputs.
    fn verify(
        pub_params: &Self::PublicParams,
        pub_inputs: &Self::PublicInputs,
        proof: &Self::Proof,
    ) -> Result<bool>;

    fn verify_all_partitions(
        pub_params: &Self::PublicParams,
        pub_in: &Self::PublicInputs,
        proofs: &[Self::Proof],
    ) -> Result<bool> {
        for (k, proof) in proofs.iter().enumerate() {
            let partition_pub_in = Self::with_partition((*pub_in).clone(), Some(k));

            if !Self::verify(pub_params, &partition_pub_in, proof)? {
                return Ok(false);
            }
        }

        Ok(true)
    }

    // This method must be specialized by concrete ProofScheme implementations which use partitions.
    fn with_partition(pub_in: Self::PublicInputs, _k: Option<usize>) -> Self::PublicInputs {
        pub_in
    }
}
