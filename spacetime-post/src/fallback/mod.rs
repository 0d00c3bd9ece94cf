mod compound;
mod utils;
mod vanilla;

pub use compound::*;
pub use utils::*;
pub use vanilla::*;
