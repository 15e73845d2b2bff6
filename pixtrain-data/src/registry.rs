//! Name-based lookup of dataset implementations.
//!
//! A dataset mode `m` names the module `data.m_dataset`. The module exports
//! one or more dataset classes; the one whose type name, lower-cased, equals
//! `m` without underscores followed by `dataset` is the implementation for
//! that mode. For example the mode `unaligned_pair` resolves to a class named
//! `UnalignedPairDataset` in the module `data.unaligned_pair_dataset`.
//!
//! Modules are registered explicitly. [`DatasetRegistry::with_builtin`]
//! includes the datasets shipped with this crate; user plugins are added with
//! [`DatasetRegistry::register_dataset`].

use crate::datasets::{BaseDataset, SingleDataset, TemplateDataset};
use pixtrain_core::{DataOptions, PixTrainError};
use std::collections::HashMap;
use std::fmt;

/// Builds a boxed dataset from options.
pub type DatasetConstructor = fn(&DataOptions) -> Result<Box<dyn BaseDataset>, PixTrainError>;

/// A dataset's hook for adding options or changing their defaults.
pub type OptionSetter = fn(&mut DataOptions, bool);

/// A dataset implementation exported by a module.
#[derive(Clone, Copy)]
pub struct DatasetClass {
    type_name: &'static str,
    constructor: DatasetConstructor,
    option_setter: OptionSetter,
}

impl DatasetClass {
    /// Describes the dataset type `T` under the given type name.
    pub fn of<T: BaseDataset + 'static>(type_name: &'static str) -> Self {
        DatasetClass {
            type_name,
            constructor: construct::<T>,
            option_setter: T::modify_options,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Instantiates the dataset.
    pub fn create(&self, opt: &DataOptions) -> Result<Box<dyn BaseDataset>, PixTrainError> {
        (self.constructor)(opt)
    }

    pub fn option_setter(&self) -> OptionSetter {
        self.option_setter
    }
}

impl fmt::Debug for DatasetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatasetClass")
            .field("type_name", &self.type_name)
            .finish()
    }
}

fn construct<T: BaseDataset + 'static>(
    opt: &DataOptions,
) -> Result<Box<dyn BaseDataset>, PixTrainError> {
    Ok(Box::new(T::from_options(opt)?))
}

/// A named group of exported dataset classes.
#[derive(Debug, Clone)]
pub struct DatasetModule {
    path: String,
    exports: Vec<DatasetClass>,
}

impl DatasetModule {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn exports(&self) -> &[DatasetClass] {
        &self.exports
    }

    /// Adds a class to the module's exports.
    pub fn export(&mut self, class: DatasetClass) -> &mut Self {
        self.exports.push(class);
        self
    }
}

/// Maps module paths to dataset modules.
#[derive(Debug, Clone, Default)]
pub struct DatasetRegistry {
    modules: HashMap<String, DatasetModule>,
}

/// The canonical module path for a dataset mode.
pub fn module_path(dataset_name: &str) -> String {
    format!("data.{}_dataset", dataset_name)
}

/// The class name a dataset mode must match, compared case-insensitively.
pub fn target_class_name(dataset_name: &str) -> String {
    format!("{}dataset", dataset_name.replace('_', ""))
}

impl DatasetRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the `template` and `single` datasets.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register_dataset::<TemplateDataset>("template", "TemplateDataset");
        registry.register_dataset::<SingleDataset>("single", "SingleDataset");
        registry
    }

    /// Returns the module for a dataset mode, creating it if needed.
    pub fn register_module(&mut self, dataset_name: &str) -> &mut DatasetModule {
        let path = module_path(dataset_name);
        self.modules
            .entry(path.clone())
            .or_insert_with(|| DatasetModule {
                path,
                exports: Vec::new(),
            })
    }

    /// Exports the dataset type `T` as `type_name` from the module of `dataset_name`.
    pub fn register_dataset<T: BaseDataset + 'static>(
        &mut self,
        dataset_name: &str,
        type_name: &'static str,
    ) -> &mut Self {
        log::debug!(
            "Registering {} in {}",
            type_name,
            module_path(dataset_name)
        );
        self.register_module(dataset_name)
            .export(DatasetClass::of::<T>(type_name));
        self
    }

    pub fn module(&self, path: &str) -> Option<&DatasetModule> {
        self.modules.get(path)
    }

    /// The registered module paths, sorted.
    pub fn module_paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.modules.keys().map(String::as_str).collect();
        paths.sort_unstable();
        paths
    }

    /// Resolves a dataset mode to its dataset class.
    ///
    /// When several exports of the module match, the last one wins.
    ///
    /// # Errors
    ///
    /// - `PixTrainError::DatasetModuleNotFound` if no module `data.<name>_dataset` is registered.
    /// - `PixTrainError::DatasetClassNotFound` if the module exports no matching class.
    pub fn find_dataset_using_name(&self, dataset_name: &str) -> Result<&DatasetClass, PixTrainError> {
        let dataset_filename = module_path(dataset_name);
        let module = self.modules.get(&dataset_filename).ok_or_else(|| {
            PixTrainError::DatasetModuleNotFound {
                module: dataset_filename.clone(),
            }
        })?;

        let target = target_class_name(dataset_name).to_lowercase();
        module
            .exports
            .iter()
            .rev()
            .find(|class| class.type_name.to_lowercase() == target)
            .ok_or(PixTrainError::DatasetClassNotFound {
                module: dataset_filename,
                target: target_class_name(dataset_name),
            })
    }

    /// Returns the option setter of the dataset class for `dataset_name`.
    pub fn get_option_setter(&self, dataset_name: &str) -> Result<OptionSetter, PixTrainError> {
        let class = self.find_dataset_using_name(dataset_name)?;
        log::debug!("Using option setter of {}", class.type_name());
        Ok(class.option_setter())
    }
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;
