/// cli.rs — enhancer-clf command-line interface
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{AmbiguityPolicy, PipelineConfig, DEFAULT_FOLDS, DEFAULT_K, DEFAULT_TEST_FRACTION};
use crate::error::Result;

/// enhancer-clf — k-mer enhancer classification
#[derive(Parser, Debug)]
#[command(
    name = "enhancer-clf",
    author,
    version,
    about = "Classify enhancer sequences from strand-collapsed k-mer counts with an RBF SVM",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Train on a held-out split and report accuracy, ROC and PR curves
    ///
    /// Examples:
    ///   enhancer-clf evaluate pos.fa neg.fa
    ///   enhancer-clf evaluate pos.fa neg.fa tissue --figures out/
    ///   enhancer-clf evaluate pos.fa.gz neg.fa.gz -k 4 --no-plots
    Evaluate {
        #[command(flatten)]
        run: RunArgs,
    },

    /// Stratified k-fold cross-validated accuracy
    ///
    /// Examples:
    ///   enhancer-clf cross-validate pos.fa neg.fa --folds 5
    CrossValidate {
        #[command(flatten)]
        run: RunArgs,

        /// Number of folds
        #[arg(long, value_name = "N", default_value_t = DEFAULT_FOLDS)]
        folds: usize,
    },
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// FASTA of positive (enhancer) regions, optionally gzipped
    #[arg(value_name = "POSITIVE")]
    pub positive: PathBuf,

    /// FASTA of negative (background) regions, optionally gzipped
    #[arg(value_name = "NEGATIVE")]
    pub negative: PathBuf,

    /// Label scheme: enhancer | tissue | fine-grain
    #[arg(value_name = "TASK", default_value = "enhancer")]
    pub task: String,

    /// k-mer length
    #[arg(short = 'k', long = "kmer-len", value_name = "K", default_value_t = DEFAULT_K)]
    pub k: usize,

    /// Keep raw k-mer counts instead of per-row frequencies
    #[arg(long)]
    pub no_normalize: bool,

    /// Fraction of rows held out for testing
    #[arg(long, value_name = "F", default_value_t = DEFAULT_TEST_FRACTION)]
    pub test_fraction: f64,

    /// Seed for the split and fold shuffles
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// SVM soft-margin cost C
    #[arg(short = 'C', long, default_value_t = 1.0)]
    pub cost: f64,

    /// RBF kernel width (default: 1 / number of features)
    #[arg(long)]
    pub gamma: Option<f64>,

    /// Keep only the K columns with the highest chi² score against the labels
    #[arg(long, value_name = "K")]
    pub select_k: Option<usize>,

    /// Drop k-mers with non-a/c/g/t bases instead of failing
    #[arg(long)]
    pub skip_ambiguous: bool,

    /// Directory for roc-curve.svg and pr-curve.svg
    #[arg(long, value_name = "DIR", default_value = "figures")]
    pub figures: PathBuf,

    /// Do not write any figures
    #[arg(long)]
    pub no_plots: bool,
}

impl Command {
    pub fn run_args(&self) -> &RunArgs {
        match self {
            Command::Evaluate { run } | Command::CrossValidate { run, .. } => run,
        }
    }

    /// Build and validate the run configuration. No file is touched here.
    pub fn config(&self) -> Result<PipelineConfig> {
        let folds = match self {
            Command::Evaluate { .. } => DEFAULT_FOLDS,
            Command::CrossValidate { folds, .. } => *folds,
        };
        self.run_args().to_config(folds)
    }
}

impl RunArgs {
    fn to_config(&self, folds: usize) -> Result<PipelineConfig> {
        let config = PipelineConfig {
            task: self.task.parse()?,
            k: self.k,
            normalize: !self.no_normalize,
            test_fraction: self.test_fraction,
            seed: self.seed,
            cost: self.cost,
            gamma: self.gamma,
            ambiguity: if self.skip_ambiguous {
                AmbiguityPolicy::Skip
            } else {
                AmbiguityPolicy::Reject
            },
            folds,
            select_k: self.select_k,
            figures_dir: (!self.no_plots).then(|| self.figures.clone()),
        };
        config.validate()?;
        Ok(config)
    }
}
