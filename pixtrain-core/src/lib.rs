// Core types shared by the pixtrain crates
pub mod error;
pub mod options;
pub mod tensor;

// Re-export the main types so they are reachable as `pixtrain_core::Tensor` etc.
pub use error::PixTrainError;
pub use options::DataOptions;
pub use tensor::{stack, Tensor};
