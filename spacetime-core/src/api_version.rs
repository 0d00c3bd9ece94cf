use std::fmt::{self, Debug, Display, Formatter};
use std::str::FromStr;

use anyhow::{format_err, Error, Result};
use semver::Version;

/// Versions of the proving rules that change the bytes of a proof.
///
/// Versions `1.0.0` and `1.1.0` derive leaf challenges from the position of a sector
/// across the whole proving window, `1.2.0` derives them from the challenge number alone.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum ApiVersion {
    V1_0_0,
    V1_1_0,
    V1_2_0,
}

impl ApiVersion {
    pub fn as_semver(&self) -> Version {
        match self {
            ApiVersion::V1_0_0 => Version::new(1, 0, 0),
            ApiVersion::V1_1_0 => Version::new(1, 1, 0),
            ApiVersion::V1_2_0 => Version::new(1, 2, 0),
        }
    }

    /// Whether challenge indices depend on the sector's position in the proving window.
    #[inline]
    pub fn has_positional_challenges(&self) -> bool {
        matches!(self, ApiVersion::V1_0_0 | ApiVersion::V1_1_0)
    }
}

impl Debug for ApiVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl Display for ApiVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let semver = self.as_semver();
        write!(f, "{}.{}.{}", semver.major, semver.minor, semver.patch)
    }
}

impl FromStr for ApiVersion {
    type Err = Error;

    fn from_str(api_version_str: &str) -> Result<Self> {
        let api_version = Version::parse(api_version_str)?;
        match (api_version.major, api_version.minor, api_version.patch) {
            (1, 0, 0) => Ok(ApiVersion::V1_0_0),
            (1, 1, 0) => Ok(ApiVersion::V1_1_0),
            (1, 2, 0) => Ok(ApiVersion::V1_2_0),
            (major, minor, patch) => Err(format_err!(
                "unknown api version {}.{}.{}",
                major,
                minor,
                patch
            )),
        }
    }
}
