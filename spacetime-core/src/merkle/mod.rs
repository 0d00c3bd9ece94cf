mod proof;
mod tree;

pub use proof::*;
pub use tree::*;
