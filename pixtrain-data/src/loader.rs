//! The dataset-mode loader used by training and test entry points.
//!
//! [`create_dataset`] resolves `opt.dataset_mode` through a
//! [`DatasetRegistry`], instantiates the dataset and wraps it in a batched,
//! optionally shuffled, multi-worker [`DataLoader`]. Iteration is capped at
//! `opt.max_dataset_size` samples.
//!
//! ```rust
//! use pixtrain_core::DataOptions;
//! use pixtrain_data::loader::create_dataset;
//! use pixtrain_data::registry::DatasetRegistry;
//!
//! let mut opt = DataOptions::new("template");
//! opt.batch_size = 4;
//! opt.max_dataset_size = Some(10);
//! let dataset = create_dataset(&opt, &DatasetRegistry::with_builtin()).unwrap();
//! assert_eq!(dataset.len(), 10);
//! for batch in dataset.iter().unwrap() {
//!     let batch = batch.unwrap();
//!     assert!(batch.len() <= 4);
//! }
//! ```

use crate::dataloader::{CollateFn, DataLoader, DataLoaderIter};
use crate::datasets::{BaseDataset, Dataset};
use crate::registry::DatasetRegistry;
use crate::sample::Batch;
use crate::samplers::{RandomSampler, Sampler, SequentialSampler};
use pixtrain_core::{DataOptions, PixTrainError};
use std::sync::Arc;

/// Creates the dataset loader selected by `opt.dataset_mode`.
///
/// This is the main entry point for training and test scripts.
///
/// # Errors
///
/// Fails with a lookup error if the mode cannot be resolved, or with the
/// dataset's own error if it cannot be built from `opt`.
pub fn create_dataset(
    opt: &DataOptions,
    registry: &DatasetRegistry,
) -> Result<ModeDataLoader, PixTrainError> {
    let data_loader = ModeDataLoader::new(opt, registry)?;
    Ok(data_loader.load_data())
}

/// A dataset of the configured mode wrapped in a batched, capped loader.
pub struct ModeDataLoader {
    opt: DataOptions,
    dataloader: DataLoader<Box<dyn BaseDataset>, Batch>,
}

impl ModeDataLoader {
    /// Resolves and instantiates the dataset named by `opt.dataset_mode`,
    /// then builds the batched loader around it.
    pub fn new(opt: &DataOptions, registry: &DatasetRegistry) -> Result<Self, PixTrainError> {
        let dataset_class = registry.find_dataset_using_name(&opt.dataset_mode)?;
        let dataset = dataset_class.create(opt)?;
        log::info!("dataset [{}] was created", dataset.name());
        Self::from_dataset(dataset, opt)
    }

    /// Builds the loader around an already instantiated dataset.
    ///
    /// Batches are shuffled unless `opt.serial_batches` is set, and
    /// `opt.num_threads` worker threads load them.
    pub fn from_dataset(
        dataset: Box<dyn BaseDataset>,
        opt: &DataOptions,
    ) -> Result<Self, PixTrainError> {
        let sampler: Box<dyn Sampler> = if opt.serial_batches {
            Box::new(SequentialSampler::new())
        } else {
            match opt.seed {
                Some(seed) => Box::new(RandomSampler::new(false, None).with_seed(seed)),
                None => Box::new(RandomSampler::new(false, None)),
            }
        };
        let collate_fn: CollateFn<Box<dyn BaseDataset>, Batch> = Arc::new(Batch::collate);
        let dataloader = DataLoader::new(dataset, opt.batch_size, sampler, opt.drop_last, collate_fn)?
            .with_num_workers(opt.num_threads);

        log::debug!(
            "Loader ready: batch_size={}, shuffle={}, num_threads={}, max_dataset_size={:?}",
            opt.batch_size,
            !opt.serial_batches,
            opt.num_threads,
            opt.max_dataset_size
        );
        Ok(ModeDataLoader {
            opt: opt.clone(),
            dataloader,
        })
    }

    pub fn load_data(self) -> Self {
        self
    }

    pub fn dataset(&self) -> &dyn BaseDataset {
        self.dataloader.dataset().as_ref()
    }

    pub fn options(&self) -> &DataOptions {
        &self.opt
    }

    /// Return the number of data in the dataset, capped at `max_dataset_size`.
    pub fn len(&self) -> usize {
        self.dataloader.dataset().len().min(self.opt.max_dataset_size())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Starts an epoch.
    ///
    /// Batch `i` is yielded only while `i * batch_size < max_dataset_size`,
    /// so the last batch may take the sample count past the cap.
    pub fn iter(&self) -> Result<ModeDataIter<'_>, PixTrainError> {
        Ok(ModeDataIter {
            inner: self.dataloader.iter()?,
            batch_index: 0,
            batch_size: self.opt.batch_size,
            max_dataset_size: self.opt.max_dataset_size(),
        })
    }
}

/// Iterator over the batches of one capped epoch.
pub struct ModeDataIter<'a> {
    inner: DataLoaderIter<'a, Box<dyn BaseDataset>, Batch>,
    batch_index: usize,
    batch_size: usize,
    max_dataset_size: usize,
}

impl Iterator for ModeDataIter<'_> {
    type Item = Result<Batch, PixTrainError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.batch_index.saturating_mul(self.batch_size) >= self.max_dataset_size {
            return None;
        }
        let batch = self.inner.next()?;
        self.batch_index += 1;
        Some(batch)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        // Batches that still start below the cap
        let under_cap = self
            .max_dataset_size
            .div_ceil(self.batch_size)
            .saturating_sub(self.batch_index);
        let (lower, upper) = self.inner.size_hint();
        (
            lower.min(under_cap),
            Some(upper.map_or(under_cap, |upper| upper.min(under_cap))),
        )
    }
}

#[cfg(test)]
#[path = "loader_test.rs"]
mod tests;
