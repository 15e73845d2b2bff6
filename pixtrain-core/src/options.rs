//! Options consumed by the data layer.
//!
//! `DataOptions` is the option bag passed from the command line to dataset
//! resolution and loader construction. Dataset plugins may add their own
//! options through `--dataset-opt key=value` and may re-default the generic
//! ones from their option setter before the dataset is created.

use crate::error::PixTrainError;
use clap::Args;
use std::path::PathBuf;
use std::str::FromStr;

/// Options that drive dataset resolution and batched loading.
#[derive(Args, Debug, Clone, PartialEq)]
pub struct DataOptions {
    /// Chooses how datasets are loaded, e.g. `template` or `single`
    #[arg(long, default_value = "template")]
    pub dataset_mode: String,

    /// Path to the dataset root directory
    #[arg(long, default_value = ".")]
    pub dataroot: PathBuf,

    /// Dataset split, e.g. train, val or test
    #[arg(long, default_value = "train")]
    pub phase: String,

    /// Input batch size
    #[arg(long, default_value_t = 1)]
    pub batch_size: usize,

    /// Take batches in order instead of shuffling
    #[arg(long)]
    pub serial_batches: bool,

    /// Number of loader worker threads (0 loads on the calling thread)
    #[arg(long, default_value_t = 4)]
    pub num_threads: usize,

    /// Maximum number of samples allowed per epoch; unbounded when unset
    #[arg(long)]
    pub max_dataset_size: Option<usize>,

    /// Whether the options are used for training
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub is_train: bool,

    /// Base seed for shuffling; a random order is drawn each run when unset
    #[arg(long)]
    pub seed: Option<u64>,

    /// Drop the last incomplete batch
    #[arg(long)]
    pub drop_last: bool,

    /// Dataset-specific option as key=value (repeatable)
    #[arg(long = "dataset-opt", value_parser = parse_key_val)]
    pub dataset_options: Vec<(String, String)>,
}

impl Default for DataOptions {
    fn default() -> Self {
        DataOptions {
            dataset_mode: "template".to_string(),
            dataroot: PathBuf::from("."),
            phase: "train".to_string(),
            batch_size: 1,
            serial_batches: false,
            num_threads: 4,
            max_dataset_size: None,
            is_train: true,
            seed: None,
            drop_last: false,
            dataset_options: Vec::new(),
        }
    }
}

impl DataOptions {
    /// Creates default options selecting the given dataset mode.
    pub fn new(dataset_mode: impl Into<String>) -> Self {
        DataOptions {
            dataset_mode: dataset_mode.into(),
            ..Default::default()
        }
    }

    /// The configured sample cap, or `usize::MAX` when unbounded.
    pub fn max_dataset_size(&self) -> usize {
        self.max_dataset_size.unwrap_or(usize::MAX)
    }

    /// Returns the raw value of a dataset-specific option. Later entries win.
    pub fn dataset_option_str(&self, key: &str) -> Option<&str> {
        self.dataset_options
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Parses a dataset-specific option into `T`.
    ///
    /// Returns `Ok(None)` when the option is absent.
    ///
    /// # Errors
    ///
    /// Returns `PixTrainError::InvalidOption` if the value does not parse.
    pub fn dataset_option<T: FromStr>(&self, key: &str) -> Result<Option<T>, PixTrainError> {
        match self.dataset_option_str(key) {
            None => Ok(None),
            Some(raw) => raw.parse::<T>().map(Some).map_err(|_| {
                PixTrainError::InvalidOption(format!(
                    "dataset option '{}' has invalid value '{}'",
                    key, raw
                ))
            }),
        }
    }

    /// Sets a dataset-specific option.
    pub fn set_dataset_option(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.dataset_options.push((key.into(), value.into()));
    }

    /// Sets a dataset-specific option only if the user has not given one.
    pub fn set_dataset_option_default(&mut self, key: &str, value: impl Into<String>) {
        if self.dataset_option_str(key).is_none() {
            let value = value.into();
            log::debug!("Defaulting dataset option {} = {}", key, value);
            self.dataset_options.push((key.to_string(), value));
        }
    }
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid KEY=value: no `=` found in `{}`", s))?;
    if key.is_empty() {
        return Err(format!("invalid KEY=value: empty key in `{}`", s));
    }
    Ok((key.to_string(), value.to_string()))
}

#[cfg(test)]
#[path = "options_test.rs"]
mod tests;
