//! Command-line subcommands.

pub mod doctor;
pub mod search;
pub mod serve;

pub use doctor::doctor;
pub use search::search;
pub use serve::serve;
