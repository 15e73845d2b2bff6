// dataloader.rs
//! # DataLoader
//!
//! Generic batching over a [`Dataset`]: a [`Sampler`] decides the index
//! order of each epoch, indices are grouped into batches, items are fetched
//! from the dataset and a collate function assembles each batch.
//!
//! ## Basic usage
//!
//! ```rust
//! use pixtrain_data::dataloader::DataLoader;
//! use pixtrain_data::datasets::VecDataset;
//! use pixtrain_data::samplers::SequentialSampler;
//!
//! let dataset = VecDataset::new(vec![1, 2, 3, 4, 5, 6]);
//! let loader = DataLoader::with_default_collate(dataset, 2, Box::new(SequentialSampler::new()), false)
//!     .unwrap();
//! for batch in loader.iter().unwrap() {
//!     let batch = batch.expect("no error expected");
//!     println!("Batch: {:?}", batch);
//! }
//! ```
//!
//! ## Workers
//!
//! With `with_num_workers(n)` for `n > 0`, each epoch spawns `n` threads that
//! fetch and collate batches in parallel. Batches are still yielded in
//! sampler order. A worker panic is reported as the error of the batch it
//! was loading. By default the iterator waits as long as a batch takes; with
//! `with_timeout` a late batch ends the epoch with a `WorkerError`.

use crate::datasets::Dataset;
use crate::samplers::Sampler;
use crate::worker_pool::{BatchTask, WorkerPool};
use pixtrain_core::PixTrainError;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// Collate function assembling a list of dataset items into a batch.
pub type CollateFn<D, B> =
    Arc<dyn Fn(Vec<<D as Dataset>::Item>) -> Result<B, PixTrainError> + Send + Sync>;

/// Number of batches kept in flight per worker.
pub const DEFAULT_PREFETCH_FACTOR: usize = 2;

/// Generic DataLoader for batching and sampling data.
///
/// # Type Parameters
/// - `D`: The dataset type, which must implement [`Dataset`].
/// - `B`: The batch type produced by the collate function. Defaults to a
///   plain `Vec` of items.
pub struct DataLoader<D: Dataset, B = Vec<<D as Dataset>::Item>> {
    dataset: Arc<D>,
    batch_size: usize,
    sampler: Box<dyn Sampler>,
    drop_last: bool,
    collate_fn: CollateFn<D, B>,
    num_workers: usize,
    prefetch_factor: usize,
    timeout: Option<Duration>,
}

impl<D, B> DataLoader<D, B>
where
    D: Dataset + Send + Sync + 'static,
    B: Send + 'static,
{
    /// Creates a new DataLoader that loads on the calling thread.
    ///
    /// # Arguments
    /// - `dataset`: The dataset to load from.
    /// - `batch_size`: Number of items per batch. Must be > 0.
    /// - `sampler`: Generates the index order of each epoch.
    /// - `drop_last`: If true, a trailing incomplete batch is skipped.
    /// - `collate_fn`: Assembles fetched items into a batch.
    ///
    /// # Errors
    /// Returns `PixTrainError::InvalidOption` if `batch_size` is 0.
    pub fn new(
        dataset: D,
        batch_size: usize,
        sampler: Box<dyn Sampler>,
        drop_last: bool,
        collate_fn: CollateFn<D, B>,
    ) -> Result<Self, PixTrainError> {
        if batch_size == 0 {
            return Err(PixTrainError::InvalidOption(
                "batch_size must be greater than 0".to_string(),
            ));
        }
        Ok(Self {
            dataset: Arc::new(dataset),
            batch_size,
            sampler,
            drop_last,
            collate_fn,
            num_workers: 0,
            prefetch_factor: DEFAULT_PREFETCH_FACTOR,
            timeout: None,
        })
    }

    /// Sets the number of worker threads (0 = load on the calling thread).
    pub fn with_num_workers(mut self, num_workers: usize) -> Self {
        self.num_workers = num_workers;
        self
    }

    /// Sets how many batches each worker may have in flight. Must be > 0.
    pub fn with_prefetch_factor(mut self, prefetch_factor: usize) -> Self {
        self.prefetch_factor = prefetch_factor.max(1);
        self
    }

    /// Sets the maximum time to wait for a batch from the workers.
    ///
    /// Without a timeout the iterator waits indefinitely. When the timeout
    /// fires, the epoch yields a `WorkerError` and then ends.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn dataset(&self) -> &D {
        &self.dataset
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn num_workers(&self) -> usize {
        self.num_workers
    }

    /// Number of batches one epoch yields.
    pub fn len(&self) -> usize {
        let num_samples = self.sampler.len(self.dataset.len());
        if self.drop_last {
            num_samples / self.batch_size
        } else {
            num_samples.div_ceil(self.batch_size)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Starts a new epoch and returns an iterator over its batches.
    ///
    /// # Errors
    /// Returns `PixTrainError::WorkerError` if worker threads cannot be spawned.
    pub fn iter(&self) -> Result<DataLoaderIter<'_, D, B>, PixTrainError> {
        let mut batches: Vec<Vec<usize>> = Vec::with_capacity(self.len());
        let mut current = Vec::with_capacity(self.batch_size);
        for idx in self.sampler.iter(self.dataset.len()) {
            current.push(idx);
            if current.len() == self.batch_size {
                batches.push(std::mem::replace(&mut current, Vec::with_capacity(self.batch_size)));
            }
        }
        if !current.is_empty() && !self.drop_last {
            batches.push(current);
        }

        let mode = if self.num_workers > 0 && !batches.is_empty() {
            let pool = WorkerPool::spawn(
                self.num_workers,
                self.prefetch_factor,
                self.dataset.clone(),
                self.collate_fn.clone(),
            )?;
            IterMode::Workers {
                pool,
                next_dispatch: 0,
                in_flight: 0,
                reorder: BTreeMap::new(),
            }
        } else {
            IterMode::Single
        };

        log::debug!(
            "Starting epoch: {} batches of up to {} items, {} workers",
            batches.len(),
            self.batch_size,
            self.num_workers
        );

        Ok(DataLoaderIter {
            loader: self,
            batches,
            next_yield: 0,
            mode,
        })
    }
}

impl<D: Dataset + Send + Sync + 'static> DataLoader<D, Vec<<D as Dataset>::Item>> {
    /// Creates a DataLoader whose batches are plain `Vec`s of items.
    ///
    /// ```rust
    /// # use pixtrain_data::dataloader::DataLoader;
    /// # use pixtrain_data::datasets::VecDataset;
    /// # use pixtrain_data::samplers::SequentialSampler;
    /// let dataset = VecDataset::new(vec![1, 2, 3, 4, 5, 6]);
    /// let loader = DataLoader::with_default_collate(dataset, 2, Box::new(SequentialSampler::new()), false);
    /// assert!(loader.is_ok());
    /// ```
    pub fn with_default_collate(
        dataset: D,
        batch_size: usize,
        sampler: Box<dyn Sampler>,
        drop_last: bool,
    ) -> Result<Self, PixTrainError> {
        let collate_fn: CollateFn<D, Vec<D::Item>> = Arc::new(|items: Vec<D::Item>| Ok(items));
        Self::new(dataset, batch_size, sampler, drop_last, collate_fn)
    }
}

/// Fetches the items at `indices` and collates them.
pub(crate) fn fetch_batch<D, B>(
    dataset: &D,
    indices: &[usize],
    collate_fn: &(dyn Fn(Vec<D::Item>) -> Result<B, PixTrainError> + Send + Sync),
) -> Result<B, PixTrainError>
where
    D: Dataset + ?Sized,
{
    let items = indices
        .iter()
        .map(|&idx| dataset.get(idx))
        .collect::<Result<Vec<_>, _>>()?;
    collate_fn(items)
}

enum IterMode<B> {
    Single,
    Workers {
        pool: WorkerPool<B>,
        next_dispatch: usize,
        in_flight: usize,
        reorder: BTreeMap<usize, Result<B, PixTrainError>>,
    },
}

/// Iterator over the batches of one epoch.
///
/// Yields `Ok(batch)` for each batch, or `Err` when fetching an item or
/// collating failed; iteration continues with the next batch after such an
/// error. If the worker pool itself fails (a disconnected worker or an
/// expired timeout), that error is yielded once and the epoch ends.
pub struct DataLoaderIter<'a, D: Dataset, B> {
    loader: &'a DataLoader<D, B>,
    batches: Vec<Vec<usize>>,
    next_yield: usize,
    mode: IterMode<B>,
}

impl<D, B> DataLoaderIter<'_, D, B>
where
    D: Dataset + Send + Sync + 'static,
    B: Send + 'static,
{
    /// Keeps every worker busy up to the prefetch limit.
    fn dispatch(&mut self) -> Result<(), PixTrainError> {
        if let IterMode::Workers {
            pool,
            next_dispatch,
            in_flight,
            ..
        } = &mut self.mode
        {
            let limit = self.loader.prefetch_factor * pool.num_workers();
            while *in_flight < limit && *next_dispatch < self.batches.len() {
                let batch_index = *next_dispatch;
                let task = BatchTask {
                    batch_index,
                    indices: std::mem::take(&mut self.batches[batch_index]),
                };
                pool.send(batch_index % pool.num_workers(), task)?;
                *next_dispatch += 1;
                *in_flight += 1;
            }
        }
        Ok(())
    }

    /// Returns the next batch in sampler order. The outer error means the
    /// pool itself failed and no further batch can be trusted.
    fn next_from_workers(&mut self) -> Result<Result<B, PixTrainError>, PixTrainError> {
        self.dispatch()?;
        let wanted = self.next_yield;
        let timeout = self.loader.timeout;
        match &mut self.mode {
            IterMode::Workers {
                pool,
                in_flight,
                reorder,
                ..
            } => loop {
                if let Some(result) = reorder.remove(&wanted) {
                    return Ok(result);
                }
                let (batch_index, result) = pool.recv(timeout)?;
                *in_flight -= 1;
                reorder.insert(batch_index, result);
            },
            IterMode::Single => unreachable!("next_from_workers called without a worker pool"),
        }
    }
}

impl<D, B> Iterator for DataLoaderIter<'_, D, B>
where
    D: Dataset + Send + Sync + 'static,
    B: Send + 'static,
{
    type Item = Result<B, PixTrainError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_yield >= self.batches.len() {
            return None;
        }
        let result = match self.mode {
            IterMode::Single => {
                let indices = std::mem::take(&mut self.batches[self.next_yield]);
                fetch_batch(self.loader.dataset.as_ref(), &indices, self.loader.collate_fn.as_ref())
            }
            IterMode::Workers { .. } => match self.next_from_workers() {
                Ok(result) => result,
                Err(e) => {
                    log::warn!("Ending epoch at batch {}: {}", self.next_yield, e);
                    self.next_yield = self.batches.len();
                    return Some(Err(e));
                }
            },
        };
        log::debug!("Yielding batch {}", self.next_yield);
        self.next_yield += 1;
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.batches.len() - self.next_yield;
        (remaining, Some(remaining))
    }
}

#[cfg(test)]
#[path = "dataloader_test.rs"]
mod tests;
