// pixtrain-data/src/loader_test.rs

use super::*;
use crate::sample::BatchField;

fn template_options(dataset_size: usize, batch_size: usize, max: Option<usize>) -> DataOptions {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut opt = DataOptions::new("template");
    opt.set_dataset_option("dataset_size", dataset_size.to_string());
    opt.batch_size = batch_size;
    opt.max_dataset_size = max;
    opt.serial_batches = true;
    opt.num_threads = 0;
    opt
}

fn batch_sizes(loader: &ModeDataLoader) -> Vec<usize> {
    loader
        .iter()
        .unwrap()
        .map(|b| b.expect("Batch should not error").len())
        .collect()
}

#[test]
fn test_create_dataset_resolves_mode() {
    let loader = create_dataset(&template_options(8, 2, None), &DatasetRegistry::with_builtin()).unwrap();
    assert_eq!(loader.dataset().name(), "TemplateDataset");
    assert_eq!(loader.options().dataset_mode, "template");
}

#[test]
fn test_create_dataset_unknown_mode() {
    let opt = DataOptions::new("colorization");
    let result = create_dataset(&opt, &DatasetRegistry::with_builtin());
    match result {
        Err(e) => assert!(e.is_lookup_error()),
        Ok(_) => panic!("Expected a lookup error"),
    }
}

#[test]
fn test_len_is_min_of_dataset_and_cap() {
    let registry = DatasetRegistry::with_builtin();
    let uncapped = create_dataset(&template_options(8, 2, None), &registry).unwrap();
    assert_eq!(uncapped.len(), 8);

    let capped = create_dataset(&template_options(8, 2, Some(5)), &registry).unwrap();
    assert_eq!(capped.len(), 5);

    let loose_cap = create_dataset(&template_options(8, 2, Some(100)), &registry).unwrap();
    assert_eq!(loose_cap.len(), 8);
}

#[test]
fn test_iteration_without_cap_covers_dataset() {
    let loader = create_dataset(&template_options(7, 3, None), &DatasetRegistry::with_builtin()).unwrap();
    assert_eq!(batch_sizes(&loader), vec![3, 3, 1]);
}

#[test]
fn test_iteration_stops_at_cap() {
    // Cap 4 with batch size 2: batches 0 and 1 cover exactly 4 samples
    let loader =
        create_dataset(&template_options(10, 2, Some(4)), &DatasetRegistry::with_builtin()).unwrap();
    assert_eq!(batch_sizes(&loader), vec![2, 2]);
}

#[test]
fn test_last_batch_may_overshoot_cap() {
    // Batch 2 starts at sample 4 < 5, so it is still yielded: 6 samples in total
    let loader =
        create_dataset(&template_options(10, 2, Some(5)), &DatasetRegistry::with_builtin()).unwrap();
    let sizes = batch_sizes(&loader);
    assert_eq!(sizes, vec![2, 2, 2]);
    assert_eq!(sizes.iter().sum::<usize>(), 6);
}

#[test]
fn test_zero_cap_yields_nothing() {
    let loader =
        create_dataset(&template_options(10, 2, Some(0)), &DatasetRegistry::with_builtin()).unwrap();
    assert!(loader.is_empty());
    assert_eq!(loader.iter().unwrap().count(), 0);
}

#[test]
fn test_serial_batches_keep_order_with_workers() {
    let mut opt = template_options(9, 2, None);
    opt.num_threads = 3;
    let loader = create_dataset(&opt, &DatasetRegistry::with_builtin()).unwrap();

    let mut paths = Vec::new();
    for batch in loader.iter().unwrap() {
        let batch = batch.unwrap();
        paths.extend(batch.paths("path").unwrap().iter().cloned());
    }
    let expected: Vec<String> = (0..9).map(|i| format!("./temp_{}", i)).collect();
    assert_eq!(paths, expected);
}

#[test]
fn test_batches_are_collated() {
    let loader = create_dataset(&template_options(4, 4, None), &DatasetRegistry::with_builtin()).unwrap();
    let batch = loader.iter().unwrap().next().unwrap().unwrap();
    let data_a = batch.tensor("data_A").unwrap();
    assert_eq!(data_a.shape(), &[4, 3]);
    assert!(matches!(batch.get("path"), Some(BatchField::Paths(p)) if p.len() == 4));
}

#[test]
fn test_shuffled_with_seed_is_reproducible() {
    let mut opt = template_options(20, 5, None);
    opt.serial_batches = false;
    opt.seed = Some(3);
    opt.num_threads = 2;
    let registry = DatasetRegistry::with_builtin();

    let collect_paths = |loader: &ModeDataLoader| -> Vec<String> {
        loader
            .iter()
            .unwrap()
            .flat_map(|b| b.unwrap().paths("path").unwrap().to_vec())
            .collect()
    };
    let a = collect_paths(&create_dataset(&opt, &registry).unwrap());
    let b = collect_paths(&create_dataset(&opt, &registry).unwrap());
    assert_eq!(a.len(), 20);
    assert_eq!(a, b);
}

#[test]
fn test_zero_batch_size_rejected() {
    let opt = template_options(4, 0, None);
    assert!(matches!(
        create_dataset(&opt, &DatasetRegistry::with_builtin()),
        Err(PixTrainError::InvalidOption(_))
    ));
}

#[test]
fn test_from_dataset_with_single_mode() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["x.png", "y.png", "z.png"] {
        std::fs::write(dir.path().join(name), b"").unwrap();
    }
    let mut opt = DataOptions::new("single");
    opt.dataroot = dir.path().to_path_buf();
    opt.serial_batches = true;
    opt.batch_size = 2;

    let dataset = DatasetRegistry::with_builtin()
        .find_dataset_using_name("single")
        .unwrap()
        .create(&opt)
        .unwrap();
    let loader = ModeDataLoader::from_dataset(dataset, &opt).unwrap();
    assert_eq!(loader.len(), 3);
    assert_eq!(batch_sizes(&loader), vec![2, 1]);
}

#[test]
fn test_size_hint_respects_cap() {
    // Cap 5, batch size 2: three batches start below the cap out of five
    let loader =
        create_dataset(&template_options(10, 2, Some(5)), &DatasetRegistry::with_builtin()).unwrap();
    let mut iter = loader.iter().unwrap();
    assert_eq!(iter.size_hint(), (3, Some(3)));
    iter.next();
    assert_eq!(iter.size_hint(), (2, Some(2)));

    let uncapped = create_dataset(&template_options(7, 3, None), &DatasetRegistry::with_builtin()).unwrap();
    assert_eq!(uncapped.iter().unwrap().size_hint(), (3, Some(3)));
}
