use spacetime_core::api_version::ApiVersion;

/// Selects the challenge index used to determine the leaf challenge for PoSt
pub fn get_challenge_index(
    api_version: ApiVersion,
    sector_index: usize,
    challenge_count_per_sector: usize,
    challenge_index: usize,
) -> u64 {
    (if api_version.has_positional_challenges() {
        sector_index * challenge_count_per_sector + challenge_index
    } else {
        challenge_index
    }) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_challenge_index_by_version() {
        assert_eq!(get_challenge_index(ApiVersion::V1_0_0, 3, 10, 4), 34);
        assert_eq!(get_challenge_index(ApiVersion::V1_1_0, 0, 10, 9), 9);
        assert_eq!(get_challenge_index(ApiVersion::V1_2_0, 3, 10, 4), 4);
    }
}
