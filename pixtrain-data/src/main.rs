//! pixtrain-data CLI: resolve a dataset mode and run it through the loader.

use clap::Parser;
use env_logger::Env;
use log::{debug, error, info};
use pixtrain_core::{DataOptions, PixTrainError};
use pixtrain_data::{create_dataset, DatasetRegistry};

#[derive(Parser, Debug)]
#[command(name = "pixtrain-data")]
#[command(version)]
#[command(about = "Load a dataset mode in batches and report what it yields")]
struct Cli {
    #[command(flatten)]
    opt: DataOptions,

    /// Number of epochs to iterate
    #[arg(long, default_value_t = 1)]
    epochs: usize,

    /// List the registered dataset modules and exit
    #[arg(long)]
    list_modes: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .format_target(false)
        .init();
}

fn run(cli: Cli) -> Result<(), PixTrainError> {
    let registry = DatasetRegistry::with_builtin();
    if cli.list_modes {
        for path in registry.module_paths() {
            println!("{}", path);
        }
        return Ok(());
    }

    let mut opt = cli.opt;
    // Let the dataset adjust its options before it is created
    let option_setter = registry.get_option_setter(&opt.dataset_mode)?;
    let is_train = opt.is_train;
    option_setter(&mut opt, is_train);
    debug!("Options: {:?}", opt);

    let dataset = create_dataset(&opt, &registry)?;
    info!("The number of {} images = {}", opt.phase, dataset.len());

    for epoch in 1..=cli.epochs {
        let mut num_batches = 0;
        let mut num_samples = 0;
        for batch in dataset.iter()? {
            let batch = batch?;
            debug!(
                "epoch {} batch {}: {} samples, fields {:?}",
                epoch,
                num_batches,
                batch.len(),
                batch.keys().collect::<Vec<_>>()
            );
            num_batches += 1;
            num_samples += batch.len();
        }
        info!(
            "End of epoch {} / {}: {} batches, {} samples",
            epoch, cli.epochs, num_batches, num_samples
        );
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose);
    if let Err(e) = run(cli) {
        error!("{}", e);
        std::process::exit(1);
    }
}
