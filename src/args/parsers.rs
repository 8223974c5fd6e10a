use super::types::{KeyModeArg, PositiveUsize};
use crate::error::ValidationError;

pub(super) fn parse_positive_usize(s: &str) -> Result<PositiveUsize, ValidationError> {
    s.parse::<PositiveUsize>()
}

pub(super) fn parse_key_mode(s: &str) -> Result<KeyModeArg, ValidationError> {
    match s.split_once('=') {
        Some((key, mode)) if !key.trim().is_empty() && !mode.trim().is_empty() => {
            Ok(KeyModeArg {
                key: key.trim().to_owned(),
                mode: mode.trim().to_owned(),
            })
        }
        Some(_) | None => Err(ValidationError::InvalidKeyModeFormat {
            value: s.to_owned(),
        }),
    }
}
