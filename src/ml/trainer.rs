// ============================================================
// Layer 5 - Training Loop
// ============================================================
// Full train + validation loop using burn's DataLoader and Adam.
//
// Per epoch:
//   1. Shuffled pass over the training split on the autodiff
//      backend: forward → (MSE + cut + ortho) → backward → Adam
//   2. model.valid() drops autodiff, then the validation split
//      is scored on the inner backend (loss and RMSE)
//   3. One line printed, one CSV row logged
//   4. Early stopping decides whether to continue
//
// Early stopping watches the validation loss. When it has not
// improved for `patience` epochs, training stops and the weights
// of the best epoch are restored. A run that uses up all its
// epochs keeps the final weights.
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::Result;
use burn::{
    data::dataloader::{DataLoader, DataLoaderBuilder},
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};
use std::sync::Arc;

use crate::application::train_use_case::TrainConfig;
use crate::data::{
    batcher::{GraphBatch, GraphBatcher},
    dataset::MolGraphDataset,
};
use crate::domain::graph::GraphDataset;
use crate::infra::metrics::{EpochMetrics, MetricsLogger};
use crate::ml::{
    evaluator::rmse,
    model::{MolRegressor, MolRegressorConfig},
    predictor::predict,
};

// ─── Early stopping ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopDecision {
    /// New best value; keep these weights
    Improved,
    /// No improvement yet, still within patience
    Wait,
    /// Patience exhausted
    Stop,
}

#[derive(Debug, Clone)]
pub struct EarlyStopping {
    patience:   usize,
    best:       f64,
    best_epoch: usize,
    wait:       usize,
}

impl EarlyStopping {
    pub fn new(patience: usize) -> Self {
        Self { patience, best: f64::INFINITY, best_epoch: 0, wait: 0 }
    }

    /// Feed the monitored value of `epoch`. Lower is better;
    /// NaN never counts as an improvement.
    pub fn update(&mut self, epoch: usize, value: f64) -> StopDecision {
        if value < self.best {
            self.best       = value;
            self.best_epoch = epoch;
            self.wait       = 0;
            return StopDecision::Improved;
        }
        self.wait += 1;
        if self.wait >= self.patience { StopDecision::Stop } else { StopDecision::Wait }
    }

    pub fn best_epoch(&self) -> usize { self.best_epoch }

    pub fn best(&self) -> f64 { self.best }
}

// ─── Training ─────────────────────────────────────────────────────────────────

/// What a finished fit hands back to the application layer
pub struct FitOutcome<B: Backend> {
    /// Best-epoch weights after an early stop, final weights otherwise
    pub model:          MolRegressor<B>,
    pub history:        Vec<EpochMetrics>,
    /// 0 when no epoch ran
    pub best_epoch:     usize,
    /// Epoch whose weights `model` holds
    pub restored_epoch: usize,
    pub stopped_early:  bool,
}

/// Training loader: reshuffled every epoch, seeded so that two
/// runs with the same seed see the same batch order.
pub fn shuffled_loader<B: Backend>(
    dataset:    GraphDataset,
    batch_size: usize,
    seed:       u64,
    device:     &B::Device,
) -> Arc<dyn DataLoader<B, GraphBatch<B>>> {
    let batcher = GraphBatcher::new(dataset.n_node_features(), dataset.n_labels());
    DataLoaderBuilder::new(batcher)
        .batch_size(batch_size)
        .shuffle(seed)
        .num_workers(1)
        .set_device(device.clone())
        .build(MolGraphDataset::new(dataset))
}

pub fn train_loop<B: AutodiffBackend>(
    cfg:       &TrainConfig,
    model_cfg: &MolRegressorConfig,
    train:     GraphDataset,
    valid:     GraphDataset,
    logger:    Option<&MetricsLogger>,
    device:    B::Device,
) -> Result<FitOutcome<B>> {
    let mut model: MolRegressor<B> = model_cfg.init(&device);
    let mut optim = AdamConfig::new().with_epsilon(1e-7).init();

    let train_loader = shuffled_loader::<B>(train, cfg.batch_size, cfg.seed, &device);

    let mut stopper    = EarlyStopping::new(cfg.patience);
    let mut best_model = model.clone();
    let mut history    = Vec::with_capacity(cfg.epochs);
    let mut stopped_early = false;

    for epoch in 1..=cfg.epochs {
        // ── Training phase ────────────────────────────────────────────────────
        let mut train_loss_sum = 0.0f64;
        let mut train_batches  = 0usize;

        for batch in train_loader.iter() {
            let (loss, _) = model.forward_loss(batch);

            train_loss_sum += loss.clone().into_scalar().elem::<f64>();
            train_batches  += 1;

            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(cfg.lr, model, grads);
        }

        let train_loss = if train_batches > 0 {
            train_loss_sum / train_batches as f64
        } else { f64::NAN };

        // ── Validation phase (inner backend, no autodiff) ─────────────────────
        let preds    = predict(&model.valid(), valid.clone(), cfg.batch_size, &device)?;
        let val_rmse = if preds.is_empty() {
            f64::NAN
        } else {
            rmse(&preds.y_true, &preds.y_pred)?
        };

        let metrics = EpochMetrics::new(epoch, train_loss, preds.loss, val_rmse);
        println!(
            "Epoch {:>3}/{} | loss={:.4} | val_loss={:.4} | val_rmse={:.4}",
            epoch, cfg.epochs, train_loss, preds.loss, val_rmse,
        );
        if let Some(logger) = logger {
            logger.log(&metrics)?;
        }
        history.push(metrics);

        // ── Early stopping ────────────────────────────────────────────────────
        match stopper.update(epoch, metrics.monitored()) {
            StopDecision::Improved => best_model = model.clone(),
            StopDecision::Wait => {}
            StopDecision::Stop => {
                tracing::info!(
                    "Early stopping at epoch {} (best epoch {}, loss {:.4})",
                    epoch,
                    stopper.best_epoch(),
                    stopper.best(),
                );
                stopped_early = true;
                break;
            }
        }
    }

    let (model, restored_epoch) = if stopped_early {
        tracing::info!("Restoring weights from epoch {}", stopper.best_epoch());
        (best_model, stopper.best_epoch())
    } else {
        (model, history.len())
    };

    Ok(FitOutcome {
        model,
        history,
        best_epoch: stopper.best_epoch(),
        restored_epoch,
        stopped_early,
    })
}
