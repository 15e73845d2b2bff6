// pixtrain-data/src/datasets/single_dataset_test.rs

use super::*;
use crate::datasets::image_folder::is_image_file;
use std::fs;
use std::path::Path;

fn touch(path: &Path) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, b"").unwrap();
}

fn options_for(root: &Path) -> DataOptions {
    let mut opt = DataOptions::new("single");
    opt.dataroot = root.to_path_buf();
    opt
}

#[test]
fn test_is_image_file() {
    assert!(is_image_file(Path::new("a/b.png")));
    assert!(is_image_file(Path::new("b.JPG")));
    assert!(!is_image_file(Path::new("notes.txt")));
    assert!(!is_image_file(Path::new("no_extension")));
}

#[test]
fn test_single_dataset_lists_sorted_images_recursively() {
    let dir = tempfile::tempdir().unwrap();
    touch(&dir.path().join("b.png"));
    touch(&dir.path().join("a.jpg"));
    touch(&dir.path().join("nested/c.jpeg"));
    touch(&dir.path().join("readme.txt"));

    let dataset = SingleDataset::from_options(&options_for(dir.path())).unwrap();
    assert_eq!(dataset.len(), 3);
    assert_eq!(dataset.name(), "SingleDataset");
    let expected = dir.path().join("a.jpg").display().to_string();
    assert_eq!(dataset.get(0).unwrap().get("A_paths"), Some(&Field::Path(expected)));
    assert!(dataset.paths()[2].ends_with("nested/c.jpeg"));
}

#[test]
fn test_single_dataset_respects_max_dataset_size() {
    let dir = tempfile::tempdir().unwrap();
    for i in 0..5 {
        touch(&dir.path().join(format!("{}.png", i)));
    }
    let mut opt = options_for(dir.path());
    opt.max_dataset_size = Some(2);
    let dataset = SingleDataset::from_options(&opt).unwrap();
    assert_eq!(dataset.len(), 2);
}

#[test]
fn test_single_dataset_missing_root() {
    let dir = tempfile::tempdir().unwrap();
    let opt = options_for(&dir.path().join("missing"));
    assert!(matches!(
        SingleDataset::from_options(&opt),
        Err(PixTrainError::Io { .. })
    ));
}

#[test]
fn test_single_dataset_root_is_file() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("x.png");
    touch(&file);
    assert!(matches!(
        SingleDataset::from_options(&options_for(&file)),
        Err(PixTrainError::Io { .. })
    ));
}

#[test]
fn test_single_dataset_out_of_bounds() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = SingleDataset::from_options(&options_for(dir.path())).unwrap();
    assert!(dataset.is_empty());
    assert_eq!(
        dataset.get(0),
        Err(PixTrainError::IndexOutOfBounds { index: 0, len: 0 })
    );
}
