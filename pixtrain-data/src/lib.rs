//! Dataset discovery and batched loading.
//!
//! - [`registry`]: resolves a dataset mode name to a dataset implementation.
//! - [`loader`]: wraps the resolved dataset in a capped, batched loader.
//! - [`dataloader`], [`samplers`], [`sample`]: the generic loading machinery.

pub mod dataloader;
pub mod datasets;
pub mod loader;
pub mod registry;
pub mod sample;
pub mod samplers;
mod worker_pool;

// Re-export main components
pub use dataloader::DataLoader;
pub use datasets::{BaseDataset, Dataset, VecDataset};
pub use loader::{create_dataset, ModeDataLoader};
pub use registry::DatasetRegistry;
pub use sample::{Batch, Sample};
