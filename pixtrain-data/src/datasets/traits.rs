use crate::sample::Sample;
use pixtrain_core::{DataOptions, PixTrainError};

/// Represents a dataset that can be accessed by index.
///
/// A dataset is a collection of items, where each item can be a single value,
/// a tuple, a [`Sample`], or any other custom type that implements
/// `Send + 'static`.
pub trait Dataset {
    /// The type of a single item returned by the dataset.
    ///
    /// This type must be `Send` and `'static` so that items can be produced
    /// on loader worker threads.
    type Item: Send + 'static;

    /// Returns the item at the given index.
    ///
    /// # Arguments
    ///
    /// * `index` - The index of the item to retrieve.
    ///
    /// # Errors
    ///
    /// Returns `PixTrainError` if the index is out of bounds or if there's
    /// an issue retrieving the item.
    fn get(&self, index: usize) -> Result<Self::Item, PixTrainError>;

    /// Returns the total number of items in the dataset.
    fn len(&self) -> usize;

    /// Checks if the dataset is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The capability every dataset plugin must provide.
///
/// A plugin dataset is built from [`DataOptions`], produces [`Sample`]s and
/// can be shared with loader workers. Only types implementing this trait can
/// be exported from a dataset module in the
/// [`DatasetRegistry`](crate::registry::DatasetRegistry).
///
/// To add a dataset mode `dummy`, implement this trait for a `DummyDataset`
/// type and register it under the mode name `"dummy"`:
///
/// ```rust
/// use pixtrain_core::{DataOptions, PixTrainError};
/// use pixtrain_data::datasets::{BaseDataset, Dataset};
/// use pixtrain_data::registry::DatasetRegistry;
/// use pixtrain_data::sample::{Field, Sample};
///
/// struct DummyDataset;
///
/// impl Dataset for DummyDataset {
///     type Item = Sample;
///     fn get(&self, index: usize) -> Result<Sample, PixTrainError> {
///         Ok(Sample::new().with("index", Field::Scalar(index as f32)))
///     }
///     fn len(&self) -> usize {
///         4
///     }
/// }
///
/// impl BaseDataset for DummyDataset {
///     fn from_options(_opt: &DataOptions) -> Result<Self, PixTrainError> {
///         Ok(DummyDataset)
///     }
///     fn name(&self) -> &'static str {
///         "DummyDataset"
///     }
/// }
///
/// let mut registry = DatasetRegistry::new();
/// registry.register_dataset::<DummyDataset>("dummy", "DummyDataset");
/// assert!(registry.find_dataset_using_name("dummy").is_ok());
/// ```
pub trait BaseDataset: Dataset<Item = Sample> + Send + Sync {
    /// Builds the dataset from the options.
    fn from_options(opt: &DataOptions) -> Result<Self, PixTrainError>
    where
        Self: Sized;

    /// Adds dataset-specific options or changes the defaults of existing ones.
    ///
    /// Called before the dataset is created; `is_train` tells whether the
    /// options are for training.
    fn modify_options(_opt: &mut DataOptions, _is_train: bool)
    where
        Self: Sized,
    {
    }

    /// The dataset's type name, e.g. `"TemplateDataset"`.
    fn name(&self) -> &'static str;
}

impl Dataset for Box<dyn BaseDataset> {
    type Item = Sample;

    fn get(&self, index: usize) -> Result<Sample, PixTrainError> {
        (**self).get(index)
    }

    fn len(&self) -> usize {
        (**self).len()
    }
}
