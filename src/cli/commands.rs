// ============================================================
// Layer 1 - CLI Commands and Arguments
// ============================================================
// Defines the subcommands `train`, `evaluate` and `summary`
// and all their configurable flags. Defaults reproduce the
// reference experiment: lr 1e-3, 10 epochs, batch size 32.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};
use crate::application::train_use_case::TrainConfig;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train GCN + MinCutPool on a benchmark and report test RMSE
    Train(TrainArgs),

    /// Score a saved checkpoint on the test split
    Evaluate(EvaluateArgs),

    /// Print the model summary for a dataset without training
    Summary(SummaryArgs),
}

/// Where the data comes from; shared by `train` and `summary`
#[derive(Args, Debug, Clone)]
pub struct DataArgs {
    /// Benchmark dataset name
    #[arg(long, default_value = "ogbg-molesol")]
    pub dataset: String,

    /// Directory holding (or receiving) downloaded datasets
    #[arg(long, default_value = "dataset")]
    pub data_root: String,

    /// Fail instead of downloading a missing dataset
    #[arg(long)]
    pub no_download: bool,

    /// Seed for shuffling and for the fallback random split
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Directory for checkpoints, configs and metrics.csv
    #[arg(long, default_value = "artifacts")]
    pub artifact_dir: String,

    /// Graphs per mini-batch
    #[arg(long, default_value_t = 32)]
    pub batch_size: usize,

    /// Number of full passes through the training split
    #[arg(long, default_value_t = 10)]
    pub epochs: usize,

    /// Adam learning rate
    #[arg(long, default_value_t = 1e-3)]
    pub lr: f64,

    /// Channels of both graph convolutions
    #[arg(long, default_value_t = 32)]
    pub hidden: usize,

    /// Epochs without validation improvement before stopping
    #[arg(long, default_value_t = 10)]
    pub patience: usize,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            dataset:      a.data.dataset,
            data_root:    a.data.data_root,
            artifact_dir: a.artifact_dir,
            batch_size:   a.batch_size,
            epochs:       a.epochs,
            lr:           a.lr,
            hidden:       a.hidden,
            patience:     a.patience,
            seed:         a.data.seed,
            download:     !a.data.no_download,
        }
    }
}

#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Directory written by a previous `train`
    #[arg(long, default_value = "artifacts")]
    pub artifact_dir: String,
}

#[derive(Args, Debug)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Channels of both graph convolutions
    #[arg(long, default_value_t = 32)]
    pub hidden: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    #[test]
    fn test_train_defaults_match_reference_run() {
        let cli = Cli::parse_from(["molgraph-regress", "train"]);
        let Commands::Train(args) = cli.command else { panic!("expected train") };
        let cfg: TrainConfig = args.into();

        assert_eq!(cfg.dataset, "ogbg-molesol");
        assert_eq!(cfg.lr, 1e-3);
        assert_eq!(cfg.epochs, 10);
        assert_eq!(cfg.batch_size, 32);
        assert_eq!(cfg.patience, 10);
        assert!(cfg.download);
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::parse_from([
            "molgraph-regress", "train",
            "--dataset", "ogbg-mollipo",
            "--epochs", "50",
            "--no-download",
        ]);
        let Commands::Train(args) = cli.command else { panic!("expected train") };
        let cfg: TrainConfig = args.into();

        assert_eq!(cfg.dataset, "ogbg-mollipo");
        assert_eq!(cfg.epochs, 50);
        assert!(!cfg.download);
    }
}
