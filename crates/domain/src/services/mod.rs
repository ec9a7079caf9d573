pub mod collaborators;
pub mod delivery;

pub use collaborators::*;
pub use delivery::*;
