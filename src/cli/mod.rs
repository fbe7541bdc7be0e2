// ============================================================
// Layer 1 - CLI / Presentation Layer
// ============================================================
// Parses command line arguments with clap and routes each
// subcommand to its use case. All printing of final results
// happens here; the work happens in Layer 2.
//
//   1. `train`    - load → split → build → fit → evaluate
//   2. `evaluate` - rescore the saved best model
//   3. `summary`  - print the layer table only
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, EvaluateArgs, SummaryArgs, TrainArgs};

#[derive(Parser, Debug)]
#[command(
    name = "molgraph-regress",
    version,
    about = "Train a GCN + MinCutPool network for molecular property regression on OGB benchmarks."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)    => Self::run_train(args),
            Commands::Evaluate(args) => Self::run_evaluate(args),
            Commands::Summary(args)  => Self::run_summary(args),
        }
    }

    fn run_train(args: TrainArgs) -> Result<()> {
        use crate::application::train_use_case::TrainUseCase;

        tracing::info!("Starting training on '{}'", args.data.dataset);
        let report = TrainUseCase::new(args.into()).execute()?;

        tracing::info!(
            "Ran {} epochs (best epoch {}{})",
            report.epochs_run,
            report.best_epoch,
            if report.stopped_early { ", stopped early" } else { "" },
        );
        println!("Done. RMSE: {:.4}", report.eval.rmse);
        Ok(())
    }

    fn run_evaluate(args: EvaluateArgs) -> Result<()> {
        use crate::application::evaluate_use_case::EvaluateUseCase;

        let result = EvaluateUseCase::new(&args.artifact_dir)?.execute()?;
        println!("Done. RMSE: {:.4}", result.rmse);
        Ok(())
    }

    fn run_summary(args: SummaryArgs) -> Result<()> {
        use crate::application::{prepare::prepare_dataset, train_use_case::model_config_for};
        use crate::ml::summary::ModelSummary;

        let d = &args.data;
        let (_, data) = prepare_dataset(&d.dataset, &d.data_root, !d.no_download, d.seed)?;
        println!("{}", ModelSummary::from_config(&model_config_for(&data, args.hidden)));
        Ok(())
    }
}
