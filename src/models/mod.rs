pub mod tryon;
pub mod upload;

pub use tryon::*;
pub use upload::*;
