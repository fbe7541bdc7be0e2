// ============================================================
// Layer 2 - EvaluateUseCase
// ============================================================
// Re-scores a trained model without retraining:
//
//   Step 1: Read train_config.json / model_config.json
//   Step 2: Prepare the same dataset and split
//   Step 3: Rebuild the architecture, load best weights
//   Step 4: Predict the test split and compute RMSE

use anyhow::{bail, Result};
use burn::prelude::*;

use crate::application::prepare::prepare_dataset;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::{
    evaluator::{EvalResult, Evaluator},
    model::{MolRegressor, MolRegressorConfig},
    predictor::predict,
    EvalBackend,
};
use crate::domain::graph::GraphDataset;

pub struct EvaluateUseCase {
    ckpt: CheckpointManager,
}

impl EvaluateUseCase {
    pub fn new(artifact_dir: &str) -> Result<Self> {
        Ok(Self { ckpt: CheckpointManager::new(artifact_dir)? })
    }

    pub fn execute(&self) -> Result<EvalResult> {
        let cfg = self.ckpt.load_config()?;
        let (info, data) = prepare_dataset(&cfg.dataset, &cfg.data_root, cfg.download, cfg.seed)?;

        let device = burn::backend::wgpu::WgpuDevice::default();
        let result = score_checkpoint::<EvalBackend>(
            &self.ckpt,
            data.test,
            cfg.batch_size,
            &Evaluator::for_dataset(info)?,
            &device,
        )?;
        self.ckpt.save_eval(&result)?;
        Ok(result)
    }
}

/// Load the saved model and score it on `test`.
pub fn score_checkpoint<B: Backend>(
    ckpt:       &CheckpointManager,
    test:       GraphDataset,
    batch_size: usize,
    evaluator:  &Evaluator,
    device:     &B::Device,
) -> Result<EvalResult> {
    let model_cfg: MolRegressorConfig = ckpt.load_model_config()?;
    if model_cfg.n_node_features != test.n_node_features() {
        bail!(
            "Checkpoint expects {} node features but '{}' has {}",
            model_cfg.n_node_features,
            evaluator.name(),
            test.n_node_features()
        );
    }

    let model: MolRegressor<B> = ckpt.load_model(model_cfg.init(device), device)?;
    tracing::info!("Model loaded from '{}'", ckpt.dir().display());

    let preds = predict(&model, test, batch_size, device)?;
    Ok(evaluator.eval(&preds.y_true, &preds.y_pred)?)
}
