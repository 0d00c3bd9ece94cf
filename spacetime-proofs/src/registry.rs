use std::convert::TryFrom;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use spacetime_core::{api_version::ApiVersion, error::Error};

use crate::constants::{
    SECTOR_SIZE_2_KIB, SECTOR_SIZE_32_GIB, SECTOR_SIZE_512_MIB, SECTOR_SIZE_64_GIB,
    SECTOR_SIZE_8_MIB, WINDOW_POST_CHALLENGE_COUNT, WINDOW_POST_SECTOR_COUNT,
    WINNING_POST_CHALLENGE_COUNT, WINNING_POST_SECTOR_COUNT,
};
use crate::types::{PoStConfig, PoStType, SectorSize};

/// Available PoSt proof types, numbered as registered on chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegisteredPoStProof {
    StackedDrgWinning2KiBV1,
    StackedDrgWinning8MiBV1,
    StackedDrgWinning512MiBV1,
    StackedDrgWinning32GiBV1,
    StackedDrgWinning64GiBV1,

    StackedDrgWindow2KiBV1,
    StackedDrgWindow8MiBV1,
    StackedDrgWindow512MiBV1,
    StackedDrgWindow32GiBV1,
    StackedDrgWindow64GiBV1,

    StackedDrgWindow2KiBV1_1,
    StackedDrgWindow8MiBV1_1,
    StackedDrgWindow512MiBV1_1,
    StackedDrgWindow32GiBV1_1,
    StackedDrgWindow64GiBV1_1,
}

use self::RegisteredPoStProof::*;

const ALL: [RegisteredPoStProof; 15] = [
    StackedDrgWinning2KiBV1,
    StackedDrgWinning8MiBV1,
    StackedDrgWinning512MiBV1,
    StackedDrgWinning32GiBV1,
    StackedDrgWinning64GiBV1,
    StackedDrgWindow2KiBV1,
    StackedDrgWindow8MiBV1,
    StackedDrgWindow512MiBV1,
    StackedDrgWindow32GiBV1,
    StackedDrgWindow64GiBV1,
    StackedDrgWindow2KiBV1_1,
    StackedDrgWindow8MiBV1_1,
    StackedDrgWindow512MiBV1_1,
    StackedDrgWindow32GiBV1_1,
    StackedDrgWindow64GiBV1_1,
];

impl RegisteredPoStProof {
    pub fn sector_size(self) -> SectorSize {
        let size = match self {
            StackedDrgWinning2KiBV1 | StackedDrgWindow2KiBV1 | StackedDrgWindow2KiBV1_1 => {
                SECTOR_SIZE_2_KIB
            }
            StackedDrgWinning8MiBV1 | StackedDrgWindow8MiBV1 | StackedDrgWindow8MiBV1_1 => {
                SECTOR_SIZE_8_MIB
            }
            StackedDrgWinning512MiBV1 | StackedDrgWindow512MiBV1 | StackedDrgWindow512MiBV1_1 => {
                SECTOR_SIZE_512_MIB
            }
            StackedDrgWinning32GiBV1 | StackedDrgWindow32GiBV1 | StackedDrgWindow32GiBV1_1 => {
                SECTOR_SIZE_32_GIB
            }
            StackedDrgWinning64GiBV1 | StackedDrgWindow64GiBV1 | StackedDrgWindow64GiBV1_1 => {
                SECTOR_SIZE_64_GIB
            }
        };
        SectorSize(size)
    }

    pub fn typ(self) -> PoStType {
        match self {
            StackedDrgWinning2KiBV1
            | StackedDrgWinning8MiBV1
            | StackedDrgWinning512MiBV1
            | StackedDrgWinning32GiBV1
            | StackedDrgWinning64GiBV1 => PoStType::Winning,
            _ => PoStType::Window,
        }
    }

    pub fn api_version(self) -> ApiVersion {
        match self {
            StackedDrgWindow2KiBV1_1
            | StackedDrgWindow8MiBV1_1
            | StackedDrgWindow512MiBV1_1
            | StackedDrgWindow32GiBV1_1
            | StackedDrgWindow64GiBV1_1 => ApiVersion::V1_1_0,
            _ => ApiVersion::V1_0_0,
        }
    }

    /// Resolves the parameters of this proof type.
    pub fn as_v1_config(self) -> Result<PoStConfig> {
        let sector_size = self.sector_size();

        let (challenge_count, sector_count) = match self.typ() {
            PoStType::Winning => (WINNING_POST_CHALLENGE_COUNT, WINNING_POST_SECTOR_COUNT),
            PoStType::Window => {
                let sector_count = WINDOW_POST_SECTOR_COUNT
                    .read()
                    .map_err(|_| anyhow!("WINDOW_POST_SECTOR_COUNT poisoned"))?
                    .get(&u64::from(sector_size))
                    .copied()
                    .ok_or_else(|| {
                        Error::UnsupportedProofType(format!(
                            "no window sector count for {:?}",
                            self
                        ))
                    })?;
                (WINDOW_POST_CHALLENGE_COUNT, sector_count)
            }
        };

        Ok(PoStConfig {
            sector_size,
            challenge_count,
            sector_count,
            typ: self.typ(),
            api_version: self.api_version(),
        })
    }
}

impl From<RegisteredPoStProof> for u64 {
    fn from(proof: RegisteredPoStProof) -> Self {
        proof as u64
    }
}

impl TryFrom<u64> for RegisteredPoStProof {
    type Error = anyhow::Error;

    fn try_from(id: u64) -> Result<Self> {
        if id >= ALL.len() as u64 {
            return Err(Error::InvalidInput(format!("unknown post proof type {}", id)).into());
        }
        Ok(ALL[id as usize])
    }
}
