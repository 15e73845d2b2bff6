//! Samples produced by datasets and the batches assembled from them.
//!
//! A [`Sample`] is a small ordered map from field names (`"A"`, `"B"`,
//! `"A_paths"`, ...) to values. [`Batch::collate`] groups samples field by
//! field: tensors are stacked along a new leading dimension, paths and
//! scalars are collected into vectors.

use pixtrain_core::{stack, PixTrainError, Tensor};
use std::collections::BTreeMap;

/// A single value held by a [`Sample`].
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Tensor(Tensor),
    Path(String),
    Scalar(f32),
}

/// One data point returned by a dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sample {
    fields: BTreeMap<String, Field>,
}

impl Sample {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field, consuming and returning the sample for chaining.
    pub fn with(mut self, key: impl Into<String>, field: Field) -> Self {
        self.fields.insert(key.into(), field);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, field: Field) {
        self.fields.insert(key.into(), field);
    }

    pub fn get(&self, key: &str) -> Option<&Field> {
        self.fields.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A collated field of a [`Batch`].
#[derive(Debug, Clone, PartialEq)]
pub enum BatchField {
    /// Tensors stacked into shape `[batch, ...]`.
    Tensor(Tensor),
    Paths(Vec<String>),
    Scalars(Vec<f32>),
}

/// A group of samples assembled for one training step.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    fields: BTreeMap<String, BatchField>,
    len: usize,
}

impl Batch {
    /// Collates samples into a batch.
    ///
    /// Every sample must carry the same field names, and a given field must
    /// have the same kind (and, for tensors, the same shape) in every sample.
    ///
    /// # Errors
    ///
    /// - `PixTrainError::CollateError` for an empty list, mismatched keys or
    ///   mixed field kinds.
    /// - `PixTrainError::ShapeMismatch` when tensors of one field differ in shape.
    pub fn collate(samples: Vec<Sample>) -> Result<Batch, PixTrainError> {
        let first = samples
            .first()
            .ok_or_else(|| PixTrainError::CollateError("cannot collate an empty batch".into()))?;
        let keys: Vec<String> = first.fields.keys().cloned().collect();

        for (i, sample) in samples.iter().enumerate() {
            if !sample.fields.keys().eq(keys.iter()) {
                return Err(PixTrainError::CollateError(format!(
                    "sample {} has fields {:?}, expected {:?}",
                    i,
                    sample.keys().collect::<Vec<_>>(),
                    keys
                )));
            }
        }

        let mut fields = BTreeMap::new();
        for key in keys {
            let column: Vec<&Field> = samples.iter().map(|s| &s.fields[&key]).collect();
            fields.insert(key.clone(), collate_column(&key, &column)?);
        }

        Ok(Batch {
            fields,
            len: samples.len(),
        })
    }

    pub fn get(&self, key: &str) -> Option<&BatchField> {
        self.fields.get(key)
    }

    /// Returns the stacked tensor for `key`, if that field holds tensors.
    pub fn tensor(&self, key: &str) -> Option<&Tensor> {
        match self.fields.get(key) {
            Some(BatchField::Tensor(t)) => Some(t),
            _ => None,
        }
    }

    /// Returns the collected paths for `key`, if that field holds paths.
    pub fn paths(&self, key: &str) -> Option<&[String]> {
        match self.fields.get(key) {
            Some(BatchField::Paths(p)) => Some(p),
            _ => None,
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Number of samples in the batch.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

fn collate_column(key: &str, column: &[&Field]) -> Result<BatchField, PixTrainError> {
    let mixed = || PixTrainError::CollateError(format!("field '{}' mixes value kinds", key));

    match column[0] {
        Field::Tensor(_) => {
            let tensors = column
                .iter()
                .map(|f| match f {
                    Field::Tensor(t) => Ok(t.clone()),
                    _ => Err(mixed()),
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(BatchField::Tensor(stack(&tensors)?))
        }
        Field::Path(_) => column
            .iter()
            .map(|f| match f {
                Field::Path(p) => Ok(p.clone()),
                _ => Err(mixed()),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(BatchField::Paths),
        Field::Scalar(_) => column
            .iter()
            .map(|f| match f {
                Field::Scalar(v) => Ok(*v),
                _ => Err(mixed()),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(BatchField::Scalars),
    }
}

#[cfg(test)]
#[path = "sample_test.rs"]
mod tests;
