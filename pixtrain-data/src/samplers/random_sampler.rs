// pixtrain-data/src/samplers/random_sampler.rs

use super::traits::Sampler;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicU64, Ordering};

/// A sampler that randomly samples indices from a dataset.
///
/// Without a seed every epoch draws from the thread RNG. With a seed, epoch
/// `e` (counted from the first call to `iter`) uses `seed + e`, so runs are
/// reproducible while each epoch still gets a fresh order.
#[derive(Debug)]
pub struct RandomSampler {
    replacement: bool,
    num_samples: Option<usize>,
    seed: Option<u64>,
    epoch: AtomicU64,
}

impl RandomSampler {
    /// Creates a new `RandomSampler`.
    ///
    /// # Arguments
    ///
    /// * `replacement`: If `true`, an index can be selected multiple times.
    /// * `num_samples`: The total number of samples to draw. If `None`, it defaults to the dataset size.
    pub fn new(replacement: bool, num_samples: Option<usize>) -> Self {
        RandomSampler {
            replacement,
            num_samples,
            seed: None,
            epoch: AtomicU64::new(0),
        }
    }

    /// Makes the sampler deterministic, deriving each epoch's RNG from `seed`.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn epoch_rng(&self) -> StdRng {
        let epoch = self.epoch.fetch_add(1, Ordering::Relaxed);
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(epoch)),
            None => StdRng::from_entropy(),
        }
    }
}

impl Sampler for RandomSampler {
    fn iter(&self, dataset_len: usize) -> Box<dyn Iterator<Item = usize> + Send + Sync> {
        if dataset_len == 0 {
            return Box::new(std::iter::empty());
        }

        let mut rng = self.epoch_rng();
        let actual_num_samples = self.num_samples.unwrap_or(dataset_len);

        if self.replacement {
            let indices: Vec<usize> = (0..actual_num_samples)
                .map(|_| rng.gen_range(0..dataset_len))
                .collect();
            Box::new(indices.into_iter())
        } else {
            if actual_num_samples > dataset_len {
                log::warn!(
                    "RandomSampler: num_samples ({}) > dataset_len ({}) without replacement. Returning empty iterator.",
                    actual_num_samples,
                    dataset_len
                );
                return Box::new(std::iter::empty());
            }
            let mut indices: Vec<usize> = (0..dataset_len).collect();
            indices.shuffle(&mut rng);
            indices.truncate(actual_num_samples);
            Box::new(indices.into_iter())
        }
    }

    fn len(&self, dataset_len: usize) -> usize {
        self.num_samples.unwrap_or(dataset_len)
    }
}

#[cfg(test)]
#[path = "random_sampler_test.rs"]
mod tests;
