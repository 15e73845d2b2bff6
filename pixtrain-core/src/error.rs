use thiserror::Error;

/// Custom error type for the pixtrain data layer.
#[derive(Error, Debug, PartialEq, Clone)] // PartialEq for easier testing
pub enum PixTrainError {
    #[error("Shape mismatch: expected {expected:?}, got {actual:?} during operation {operation}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
        operation: String,
    },

    #[error("Index out of bounds: index {index} for dataset of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("Tensor creation error: data length {data_len} does not match shape {shape:?}")]
    TensorCreationError { data_len: usize, shape: Vec<usize> },

    #[error("Cannot stack an empty list of tensors")]
    EmptyTensorList,

    /// No dataset module is registered under the canonical module path.
    #[error("No module named '{module}'")]
    DatasetModuleNotFound { module: String },

    /// The module exists but exports no dataset class matching the naming convention.
    #[error(
        "In {module}.py, there should be a subclass of BaseDataset with class name that matches {target} in lowercase."
    )]
    DatasetClassNotFound { module: String, target: String },

    #[error("Invalid option: {0}")]
    InvalidOption(String),

    #[error("Collate error: {0}")]
    CollateError(String),

    #[error("I/O error on '{path}': {message}")]
    Io { path: String, message: String },

    #[error("Worker error: {0}")]
    WorkerError(String),
}

impl PixTrainError {
    /// Returns true for the two failures raised by dataset lookup.
    pub fn is_lookup_error(&self) -> bool {
        matches!(
            self,
            PixTrainError::DatasetModuleNotFound { .. } | PixTrainError::DatasetClassNotFound { .. }
        )
    }

    /// Builds an `Io` error from a path and the underlying `std::io::Error`.
    pub fn io(path: &std::path::Path, err: &std::io::Error) -> Self {
        PixTrainError::Io {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }
}
