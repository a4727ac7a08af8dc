/// main.rs — enhancer-clf entry point

mod cli;
mod config;
mod dataset;
mod error;
mod eval;
mod features;
mod kmer;
mod labels;
mod report;
mod svm;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command, RunArgs};
use config::{PipelineConfig, Task};
use dataset::{fasta, Dataset, DatasetAssembler};
use error::Result;
use eval::Evaluator;
use features::{select, FeatureVectorBuilder};
use kmer::KmerIndex;
use labels::LabelDeriver;
use report::SvgPlotter;
use svm::{Svc, SvcParams};

const LOG_ENV: &str = "ENHANCER_LOG";
const DEFAULT_LOG: &str = "enhancer_clf=info";

fn main() {
    init_tracing();
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // ── configuration: fail before any file is opened ────────────────
    let config = cli.command.config()?;
    info!(
        task = %config.task,
        k = config.k,
        normalize = config.normalize,
        folds = config.folds,
        select_k = ?config.select_k,
        "configuration"
    );
    let data = prepare(cli.command.run_args(), &config)?;

    match cli.command {
        Command::Evaluate { .. } => {
            let evaluator = Evaluator::new(config.test_fraction, config.seed)?;
            let mut classifier = Svc::new(svc_params(&config));
            let result = evaluator.evaluate(&data, &mut classifier)?;

            if let Some(dir) = &config.figures_dir {
                report::publish(&SvgPlotter::new(), &result, dir, &config.task.to_string());
            }
            println!("{}", serde_json::to_string_pretty(&result)?);
        }

        Command::CrossValidate { .. } => {
            let evaluator = Evaluator::new(config.test_fraction, config.seed)?;
            let params = svc_params(&config);
            let scores = evaluator.cross_validate(&data, config.folds, || Svc::new(params.clone()))?;
            println!("{}", serde_json::to_string_pretty(&scores)?);
        }
    }

    Ok(())
}

/// Read the records and assemble the dataset for an already validated run.
fn prepare(run: &RunArgs, config: &PipelineConfig) -> Result<Dataset> {
    let index = KmerIndex::build(config.k)?;
    let builder = FeatureVectorBuilder::new(&index, config.ambiguity)?;
    let assembler = DatasetAssembler::new(builder, LabelDeriver::new()?, config.normalize);

    // ── records ──────────────────────────────────────────────────────
    let positives = fasta::read_records(&run.positive)?;
    let negatives = match config.task {
        Task::Enhancer => fasta::read_records(&run.negative)?,
        Task::Tissue | Task::FineGrain => Vec::new(),
    };

    // ── features + labels ────────────────────────────────────────────
    let data = assembler.assemble(config.task, &positives, &negatives)?;

    // ── optional chi² column filter ──────────────────────────────────
    let Some(k) = config.select_k else {
        return Ok(data);
    };
    if k >= data.n_features() {
        warn!(select_k = k, columns = data.n_features(), "selection keeps every column");
        return Ok(data);
    }
    let scores = select::chi2_scores(data.features.view(), data.labels.view())?;
    let kept = select::top_k(scores.view(), k);
    let names: Vec<&str> = kept
        .iter()
        .filter_map(|&c| features::column_name(&index, c))
        .collect();
    info!(kept = kept.len(), columns = ?names, "chi² selection");
    Ok(data.select_columns(&kept))
}

fn svc_params(config: &PipelineConfig) -> SvcParams {
    SvcParams {
        cost: config.cost,
        gamma: config.gamma,
        ..Default::default()
    }
}
