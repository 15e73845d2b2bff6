use crate::error::PixTrainError;

/// A dense, contiguous `f32` tensor.
///
/// This is deliberately small: samples produced by datasets carry their
/// numeric fields as `Tensor`s, and the data loader only ever needs to stack
/// them into a batch along a new leading dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    data: Vec<f32>,
    shape: Vec<usize>,
}

impl Tensor {
    /// Creates a tensor from flat row-major data and a shape.
    ///
    /// # Errors
    ///
    /// Returns `PixTrainError::TensorCreationError` if `data.len()` does not
    /// match the number of elements implied by `shape`.
    pub fn new(data: Vec<f32>, shape: Vec<usize>) -> Result<Self, PixTrainError> {
        let numel: usize = shape.iter().product();
        if data.len() != numel {
            return Err(PixTrainError::TensorCreationError {
                data_len: data.len(),
                shape,
            });
        }
        Ok(Tensor { data, shape })
    }

    /// Creates a tensor filled with `value`.
    pub fn full(shape: Vec<usize>, value: f32) -> Self {
        let numel: usize = shape.iter().product();
        Tensor {
            data: vec![value; numel],
            shape,
        }
    }

    /// Creates a 0-dimensional tensor holding a single value.
    pub fn scalar(value: f32) -> Self {
        Tensor {
            data: vec![value],
            shape: vec![],
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn numel(&self) -> usize {
        self.data.len()
    }

    pub fn into_data(self) -> Vec<f32> {
        self.data
    }
}

/// Stacks tensors of identical shape along a new leading dimension.
///
/// Stacking `n` tensors of shape `[d0, d1, ...]` produces a tensor of shape
/// `[n, d0, d1, ...]`.
///
/// # Errors
///
/// - `PixTrainError::EmptyTensorList` if `tensors` is empty.
/// - `PixTrainError::ShapeMismatch` if any tensor's shape differs from the first.
pub fn stack(tensors: &[Tensor]) -> Result<Tensor, PixTrainError> {
    let first = tensors.first().ok_or(PixTrainError::EmptyTensorList)?;
    let item_shape = first.shape.clone();

    let mut data = Vec::with_capacity(first.numel() * tensors.len());
    for tensor in tensors {
        if tensor.shape != item_shape {
            return Err(PixTrainError::ShapeMismatch {
                expected: item_shape,
                actual: tensor.shape.clone(),
                operation: "stack".to_string(),
            });
        }
        data.extend_from_slice(&tensor.data);
    }

    let mut shape = Vec::with_capacity(item_shape.len() + 1);
    shape.push(tensors.len());
    shape.extend_from_slice(&item_shape);
    Ok(Tensor { data, shape })
}

#[cfg(test)]
#[path = "tensor_test.rs"]
mod tests;
