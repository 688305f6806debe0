pub mod configuration;
pub mod environment;
pub mod sources;
pub mod validation;

pub use configuration::*;
pub use environment::*;
pub use sources::*;
pub use validation::*;
