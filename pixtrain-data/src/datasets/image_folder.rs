// pixtrain-data/src/datasets/image_folder.rs

use pixtrain_core::PixTrainError;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File extensions recognised as images (compared case-insensitively).
pub const IMG_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "ppm", "bmp", "tif", "tiff", "webp"];

pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMG_EXTENSIONS.iter().any(|known| known.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

/// Collects the image files under `dir` recursively, sorted by path.
///
/// At most `max_dataset_size` paths are returned.
///
/// # Errors
///
/// Returns `PixTrainError::Io` if `dir` is not a readable directory or a
/// directory entry cannot be read.
pub fn make_dataset(dir: &Path, max_dataset_size: usize) -> Result<Vec<PathBuf>, PixTrainError> {
    let metadata = std::fs::metadata(dir).map_err(|e| PixTrainError::io(dir, &e))?;
    if !metadata.is_dir() {
        return Err(PixTrainError::Io {
            path: dir.display().to_string(),
            message: "not a valid directory".to_string(),
        });
    }

    let mut images = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = entry.map_err(|e| PixTrainError::Io {
            path: dir.display().to_string(),
            message: e.to_string(),
        })?;
        if entry.file_type().is_file() && is_image_file(entry.path()) {
            images.push(entry.into_path());
        }
    }
    images.sort();
    images.truncate(max_dataset_size);
    Ok(images)
}
