//! The reference dataset plugin.
//!
//! `TemplateDataset` shows what a dataset mode has to provide: construction
//! from options, an option setter, `len` and `get`. Its samples are
//! synthetic, so it also serves as a smoke-test dataset for the loader.

use super::traits::{BaseDataset, Dataset};
use crate::sample::{Field, Sample};
use pixtrain_core::{DataOptions, PixTrainError, Tensor};

/// Default number of samples when `dataset_size` is not given.
pub const DEFAULT_DATASET_SIZE: usize = 100;

#[derive(Debug, Clone)]
pub struct TemplateDataset {
    root: String,
    size: usize,
    input_nc: usize,
    output_nc: usize,
    new_dataset_option: f32,
}

impl BaseDataset for TemplateDataset {
    /// Reads `dataset_size`, `input_nc`, `output_nc` and `new_dataset_option`
    /// from the dataset-specific options.
    fn from_options(opt: &DataOptions) -> Result<Self, PixTrainError> {
        Ok(TemplateDataset {
            root: opt.dataroot.display().to_string(),
            size: opt.dataset_option("dataset_size")?.unwrap_or(DEFAULT_DATASET_SIZE),
            input_nc: opt.dataset_option("input_nc")?.unwrap_or(3),
            output_nc: opt.dataset_option("output_nc")?.unwrap_or(3),
            new_dataset_option: opt.dataset_option("new_dataset_option")?.unwrap_or(1.0),
        })
    }

    /// Adds `new_dataset_option` (default 2.0) and caps the dataset at 10
    /// samples unless the user chose a cap.
    fn modify_options(opt: &mut DataOptions, _is_train: bool) {
        opt.set_dataset_option_default("new_dataset_option", "2.0");
        if opt.max_dataset_size.is_none() {
            opt.max_dataset_size = Some(10);
        }
    }

    fn name(&self) -> &'static str {
        "TemplateDataset"
    }
}

impl Dataset for TemplateDataset {
    type Item = Sample;

    /// Sample `i` holds `data_A` filled with `i`, `data_B` filled with
    /// `i * new_dataset_option`, and a `path` under the data root.
    fn get(&self, index: usize) -> Result<Sample, PixTrainError> {
        if index >= self.size {
            return Err(PixTrainError::IndexOutOfBounds {
                index,
                len: self.size,
            });
        }
        let value = index as f32;
        Ok(Sample::new()
            .with("data_A", Field::Tensor(Tensor::full(vec![self.input_nc], value)))
            .with(
                "data_B",
                Field::Tensor(Tensor::full(vec![self.output_nc], value * self.new_dataset_option)),
            )
            .with("path", Field::Path(format!("{}/temp_{}", self.root, index))))
    }

    fn len(&self) -> usize {
        self.size
    }
}

#[cfg(test)]
#[path = "template_dataset_test.rs"]
mod tests;
