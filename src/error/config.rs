use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config '{path}': {source}")]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse TOML config '{path}': {source}")]
    ParseToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Failed to parse JSON config '{path}': {source}")]
    ParseJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Unsupported config extension '{ext}'. Use .toml or .json.")]
    UnsupportedExtension { ext: String },
    #[error("Config file must have .toml or .json extension.")]
    MissingExtension,
    #[error("Unsupported cache mode '{value}'. Use 'rolling' or 'tiled'.")]
    UnsupportedMode { value: String },
    #[error(
        "Unknown statistic mode '{value}'. Use mean, min_max, std_dev, quantile, or histogram."
    )]
    UnknownStatMode { value: String },
    #[error("Unsupported mode matching '{value}'. Use 'exact' or 'prefix'.")]
    UnsupportedModeMatching { value: String },
    #[error("Rolling mode requires a window.")]
    WindowRequired,
    #[error("Window {window} must not be set under tiled mode.")]
    WindowForbidden { window: usize },
    #[error("Window must be >= 1.")]
    WindowZero,
    #[cfg(test)]
    #[error("Test expectation failed: {message}")]
    TestExpectation { message: &'static str },
    #[cfg(test)]
    #[error("Test expectation failed: {message}: {value}")]
    TestExpectationValue {
        message: &'static str,
        value: String,
    },
}
