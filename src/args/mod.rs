//! CLI argument types and parsing helpers.
mod cli;
mod parsers;
mod types;


pub use cli::ReplayArgs;
pub use types::{KeyModeArg, PositiveUsize};
