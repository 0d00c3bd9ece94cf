use std::fmt::{self, Display, Formatter};

/// Names of the per-sector files kept in a replica's cache directory.
#[derive(Debug, Copy, Clone)]
pub enum CacheKey {
    PAux,
    CommRLastTree,
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match *self {
            CacheKey::PAux => write!(f, "p_aux"),
            CacheKey::CommRLastTree => write!(f, "tree-r-last"),
        }
    }
}
