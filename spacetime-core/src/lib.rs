#![deny(clippy::all, clippy::perf, clippy::correctness, rust_2018_idioms)]
#![allow(clippy::upper_case_acronyms)]
#![allow(clippy::len_without_is_empty)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::ptr_arg)]
#![warn(clippy::unnecessary_lazy_evaluations)]

pub mod api_version;
pub mod cache_key;
pub mod compound_proof;
pub mod error;
pub mod hasher;
pub mod merkle;
pub mod multi_proof;
pub mod proof;
pub mod sector;
pub mod settings;
pub mod util;

pub const TEST_SEED: [u8; 16] = [
    0x59, 0x62, 0xbe, 0x5d, 0x76, 0x3d, 0x31, 0x8d, 0x17, 0xdb, 0x37, 0x32, 0x54, 0x06, 0xbc, 0xe5,
];
