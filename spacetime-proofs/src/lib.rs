#![deny(clippy::all, clippy::perf, clippy::correctness, rust_2018_idioms)]
#![warn(clippy::unwrap_used)]

mod api;

pub mod constants;
pub mod post;
pub mod registry;
pub mod types;

pub use self::api::*;
pub use self::constants::*;
pub use self::registry::RegisteredPoStProof;
pub use self::types::*;

pub use spacetime_core::error::Error;
