mod app;
mod cache;
mod config;
mod validation;

#[cfg(test)]
mod test_support;

pub use app::{AppError, AppResult};
pub use cache::{CacheError, ReductionError};
pub use config::ConfigError;
pub use validation::ValidationError;
