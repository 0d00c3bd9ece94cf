use spacetime_core::api_version::ApiVersion;
use spacetime_post::fallback::PoStShape;

use crate::types::SectorSize;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoStConfig {
    pub sector_size: SectorSize,
    pub challenge_count: usize,
    pub sector_count: usize,
    pub typ: PoStType,
    pub api_version: ApiVersion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoStType {
    Winning,
    Window,
}

impl From<PoStType> for PoStShape {
    fn from(typ: PoStType) -> Self {
        match typ {
            PoStType::Window => PoStShape::Window,
            PoStType::Winning => PoStShape::Winning,
        }
    }
}
