use ndarray::{ArrayD, IxDyn};
use serde::{Deserialize, Serialize};

use crate::error::ReductionError;

/// One observed value under a metric key.
///
/// Samples are stored as given. Numeric checks happen when a key is reduced:
/// `Text` and `Other` values, and arrays whose nested rows differ in shape,
/// are rejected at that point, never at store time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Sample {
    Scalar(f64),
    Array(Vec<Sample>),
    Text(String),
    /// Any other JSON value (null, booleans, objects).
    Other(serde_json::Value),
}

impl Sample {
    /// Appends the numeric content of this sample to `out` in row-major order
    /// and returns its shape.
    fn flatten_into(&self, index: usize, out: &mut Vec<f64>) -> Result<Vec<usize>, ReductionError> {
        match self {
            Sample::Scalar(value) => {
                out.push(*value);
                Ok(Vec::new())
            }
            Sample::Text(value) => Err(ReductionError::NonNumeric {
                index,
                value: value.clone(),
            }),
            Sample::Other(value) => Err(ReductionError::NonNumeric {
                index,
                value: value.to_string(),
            }),
            Sample::Array(items) => {
                let mut inner: Option<Vec<usize>> = None;
                for item in items {
                    let found = item.flatten_into(index, out)?;
                    match inner.as_ref() {
                        Some(expected) if *expected != found => {
                            return Err(ReductionError::RaggedShape {
                                index,
                                expected: expected.clone(),
                                found,
                            });
                        }
                        Some(_) => {}
                        None => inner = Some(found),
                    }
                }
                let mut shape = Vec::with_capacity(1);
                shape.push(items.len());
                shape.extend(inner.unwrap_or_default());
                Ok(shape)
            }
        }
    }
}

/// Stacks samples along a new leading axis.
///
/// Every sample must share the shape of the first one.
pub(crate) fn stack<'samples, I>(samples: I) -> Result<ArrayD<f64>, ReductionError>
where
    I: IntoIterator<Item = &'samples Sample>,
{
    let mut data = Vec::new();
    let mut trailing: Option<Vec<usize>> = None;
    let mut rows = 0_usize;
    for (index, sample) in samples.into_iter().enumerate() {
        let found = sample.flatten_into(index, &mut data)?;
        match trailing.as_ref() {
            Some(expected) if *expected != found => {
                return Err(ReductionError::RaggedShape {
                    index,
                    expected: expected.clone(),
                    found,
                });
            }
            Some(_) => {}
            None => trailing = Some(found),
        }
        rows = rows.saturating_add(1);
    }
    let mut shape = Vec::with_capacity(1);
    shape.push(rows);
    shape.extend(trailing.unwrap_or_default());
    Ok(ArrayD::from_shape_vec(IxDyn(&shape), data)?)
}

impl From<f64> for Sample {
    fn from(value: f64) -> Self {
        Sample::Scalar(value)
    }
}

impl From<f32> for Sample {
    fn from(value: f32) -> Self {
        Sample::Scalar(f64::from(value))
    }
}

impl From<i32> for Sample {
    fn from(value: i32) -> Self {
        Sample::Scalar(f64::from(value))
    }
}

impl From<u32> for Sample {
    fn from(value: u32) -> Self {
        Sample::Scalar(f64::from(value))
    }
}

impl From<i64> for Sample {
    fn from(value: i64) -> Self {
        Sample::Scalar(value as f64)
    }
}

impl From<u64> for Sample {
    fn from(value: u64) -> Self {
        Sample::Scalar(value as f64)
    }
}

impl From<&str> for Sample {
    fn from(value: &str) -> Self {
        Sample::Text(value.to_owned())
    }
}

impl From<String> for Sample {
    fn from(value: String) -> Self {
        Sample::Text(value)
    }
}

impl<T> From<Vec<T>> for Sample
where
    T: Into<Sample>,
{
    fn from(values: Vec<T>) -> Self {
        Sample::Array(values.into_iter().map(Into::into).collect())
    }
}

impl<T, const N: usize> From<[T; N]> for Sample
where
    T: Into<Sample>,
{
    fn from(values: [T; N]) -> Self {
        Sample::Array(values.into_iter().map(Into::into).collect())
    }
}
