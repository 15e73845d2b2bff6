pub mod traits;
pub mod vec_dataset;
pub mod image_folder;
pub mod template_dataset;
pub mod single_dataset;

pub use traits::{BaseDataset, Dataset};
pub use vec_dataset::VecDataset;
pub use template_dataset::TemplateDataset;
pub use single_dataset::SingleDataset;
