// pixtrain-data/src/sample_test.rs

use super::*;

fn sample(i: usize) -> Sample {
    Sample::new()
        .with("A", Field::Tensor(Tensor::full(vec![3], i as f32)))
        .with("A_paths", Field::Path(format!("img_{}.png", i)))
        .with("weight", Field::Scalar(i as f32 * 0.5))
}

#[test]
fn test_sample_fields() {
    let s = sample(1);
    assert_eq!(s.len(), 3);
    assert_eq!(s.keys().collect::<Vec<_>>(), vec!["A", "A_paths", "weight"]);
    assert_eq!(s.get("A_paths"), Some(&Field::Path("img_1.png".into())));
    assert!(s.get("B").is_none());
}

#[test]
fn test_collate_stacks_tensors_and_collects_paths() {
    let batch = Batch::collate(vec![sample(0), sample(1)]).unwrap();
    assert_eq!(batch.len(), 2);

    let a = batch.tensor("A").unwrap();
    assert_eq!(a.shape(), &[2, 3]);
    assert_eq!(a.data(), &[0.0, 0.0, 0.0, 1.0, 1.0, 1.0]);

    assert_eq!(
        batch.paths("A_paths").unwrap(),
        &["img_0.png".to_string(), "img_1.png".to_string()]
    );
    assert_eq!(batch.get("weight"), Some(&BatchField::Scalars(vec![0.0, 0.5])));
}

#[test]
fn test_collate_empty_fails() {
    assert!(matches!(
        Batch::collate(vec![]),
        Err(PixTrainError::CollateError(_))
    ));
}

#[test]
fn test_collate_mismatched_keys() {
    let other = Sample::new().with("B", Field::Scalar(1.0));
    assert!(matches!(
        Batch::collate(vec![sample(0), other]),
        Err(PixTrainError::CollateError(_))
    ));
}

#[test]
fn test_collate_mixed_kinds() {
    let a = Sample::new().with("x", Field::Scalar(1.0));
    let b = Sample::new().with("x", Field::Path("p".into()));
    assert!(matches!(
        Batch::collate(vec![a, b]),
        Err(PixTrainError::CollateError(_))
    ));
}

#[test]
fn test_collate_shape_mismatch() {
    let a = Sample::new().with("x", Field::Tensor(Tensor::full(vec![2], 0.0)));
    let b = Sample::new().with("x", Field::Tensor(Tensor::full(vec![3], 0.0)));
    assert!(matches!(
        Batch::collate(vec![a, b]),
        Err(PixTrainError::ShapeMismatch { .. })
    ));
}
