// pixtrain-data/src/datasets/template_dataset_test.rs

use super::*;

#[test]
fn test_template_defaults() {
    let dataset = TemplateDataset::from_options(&DataOptions::new("template")).unwrap();
    assert_eq!(dataset.len(), DEFAULT_DATASET_SIZE);
    assert_eq!(dataset.name(), "TemplateDataset");
}

#[test]
fn test_template_sample_fields() {
    let mut opt = DataOptions::new("template");
    opt.dataroot = "/data/facades".into();
    opt.set_dataset_option("input_nc", "1");
    opt.set_dataset_option("new_dataset_option", "2.0");
    let dataset = TemplateDataset::from_options(&opt).unwrap();

    let sample = dataset.get(3).unwrap();
    assert_eq!(
        sample.get("data_A"),
        Some(&Field::Tensor(Tensor::full(vec![1], 3.0)))
    );
    assert_eq!(
        sample.get("data_B"),
        Some(&Field::Tensor(Tensor::full(vec![3], 6.0)))
    );
    assert_eq!(
        sample.get("path"),
        Some(&Field::Path("/data/facades/temp_3".to_string()))
    );
}

#[test]
fn test_template_out_of_bounds() {
    let mut opt = DataOptions::new("template");
    opt.set_dataset_option("dataset_size", "5");
    let dataset = TemplateDataset::from_options(&opt).unwrap();
    assert_eq!(
        dataset.get(5),
        Err(PixTrainError::IndexOutOfBounds { index: 5, len: 5 })
    );
}

#[test]
fn test_template_invalid_option() {
    let mut opt = DataOptions::new("template");
    opt.set_dataset_option("dataset_size", "many");
    assert!(matches!(
        TemplateDataset::from_options(&opt),
        Err(PixTrainError::InvalidOption(_))
    ));
}

#[test]
fn test_template_modify_options() {
    let mut opt = DataOptions::new("template");
    TemplateDataset::modify_options(&mut opt, true);
    assert_eq!(opt.max_dataset_size, Some(10));
    assert_eq!(opt.dataset_option_str("new_dataset_option"), Some("2.0"));
}

#[test]
fn test_template_modify_options_keeps_user_values() {
    let mut opt = DataOptions::new("template");
    opt.max_dataset_size = Some(3);
    opt.set_dataset_option("new_dataset_option", "0.5");
    TemplateDataset::modify_options(&mut opt, false);
    assert_eq!(opt.max_dataset_size, Some(3));
    assert_eq!(opt.dataset_option::<f32>("new_dataset_option"), Ok(Some(0.5)));
}
