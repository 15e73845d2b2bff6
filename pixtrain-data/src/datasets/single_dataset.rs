use super::image_folder::make_dataset;
use super::traits::{BaseDataset, Dataset};
use crate::sample::{Field, Sample};
use pixtrain_core::{DataOptions, PixTrainError};
use std::path::PathBuf;

/// A dataset over a single folder of images, e.g. for one-sided inference.
///
/// Each sample carries the image location under `A_paths`; decoding is left
/// to the consumer.
#[derive(Debug, Clone)]
pub struct SingleDataset {
    a_paths: Vec<PathBuf>,
}

impl SingleDataset {
    pub fn paths(&self) -> &[PathBuf] {
        &self.a_paths
    }
}

impl BaseDataset for SingleDataset {
    /// Scans `dataroot` for images, keeping at most `max_dataset_size` of them.
    fn from_options(opt: &DataOptions) -> Result<Self, PixTrainError> {
        let a_paths = make_dataset(&opt.dataroot, opt.max_dataset_size())?;
        if a_paths.is_empty() {
            log::warn!("No images found under {}", opt.dataroot.display());
        }
        Ok(SingleDataset { a_paths })
    }

    fn name(&self) -> &'static str {
        "SingleDataset"
    }
}

impl Dataset for SingleDataset {
    type Item = Sample;

    fn get(&self, index: usize) -> Result<Sample, PixTrainError> {
        let path = self.a_paths.get(index).ok_or(PixTrainError::IndexOutOfBounds {
            index,
            len: self.a_paths.len(),
        })?;
        Ok(Sample::new().with("A_paths", Field::Path(path.display().to_string())))
    }

    fn len(&self) -> usize {
        self.a_paths.len()
    }
}

#[cfg(test)]
#[path = "single_dataset_test.rs"]
mod tests;
