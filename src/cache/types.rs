use std::collections::BTreeMap;

use ndarray::{ArrayD, ArrayViewD, Axis};
use serde::ser::{Serialize, SerializeSeq, Serializer};

/// Flat mapping from derived key (`"<key>/<suffix>"`) to a reduced value.
pub type Summary = BTreeMap<String, StatValue>;

/// A reduced statistic: a scalar for scalar samples, an array otherwise.
///
/// Arrays serialize as nested JSON lists.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum StatValue {
    Scalar(f64),
    Array(#[serde(serialize_with = "serialize_nested")] ArrayD<f64>),
}

impl StatValue {
    /// Wraps the result of reducing along the sample axis. Scalar samples
    /// reduce to a zero-dimensional array, which becomes a scalar.
    pub(crate) fn from_reduced(array: ArrayD<f64>) -> Self {
        if array.ndim() == 0 {
            StatValue::Scalar(array.first().copied().unwrap_or(f64::NAN))
        } else {
            StatValue::Array(array)
        }
    }

    #[must_use]
    pub const fn as_scalar(&self) -> Option<f64> {
        match self {
            StatValue::Scalar(value) => Some(*value),
            StatValue::Array(_) => None,
        }
    }

    #[must_use]
    pub const fn as_array(&self) -> Option<&ArrayD<f64>> {
        match self {
            StatValue::Scalar(_) => None,
            StatValue::Array(array) => Some(array),
        }
    }
}

impl From<f64> for StatValue {
    fn from(value: f64) -> Self {
        StatValue::Scalar(value)
    }
}

impl From<u64> for StatValue {
    fn from(value: u64) -> Self {
        StatValue::Scalar(value as f64)
    }
}

impl From<ArrayD<f64>> for StatValue {
    fn from(value: ArrayD<f64>) -> Self {
        StatValue::Array(value)
    }
}

fn serialize_nested<S>(array: &ArrayD<f64>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    Nested(array.view()).serialize(serializer)
}

struct Nested<'data>(ArrayViewD<'data, f64>);

impl Serialize for Nested<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if self.0.ndim() == 0 {
            return serializer.serialize_f64(self.0.first().copied().unwrap_or(f64::NAN));
        }
        let mut seq = serializer.serialize_seq(Some(self.0.len_of(Axis(0))))?;
        for row in self.0.outer_iter() {
            seq.serialize_element(&Nested(row))?;
        }
        seq.end()
    }
}
