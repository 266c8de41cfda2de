pub mod analysis;
pub mod transcript;

pub use analysis::*;
pub use transcript::*;
