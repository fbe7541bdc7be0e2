// ============================================================
// Layer 6 - Checkpoint Manager
// ============================================================
// Saves and restores model weights using burn's CompactRecorder.
//
// What gets saved:
//   1. best_model.mpk     - weights kept by the training loop
//   2. train_config.json  - the run's TrainConfig
//   3. model_config.json  - the MolRegressorConfig (input width,
//                           cluster count, ...) needed to rebuild
//                           the exact architecture before loading
//                           the weights into it
//   4. eval_result.json   - the final test score
//
// Layout:
//   artifacts/
//     best_model.mpk
//     train_config.json
//     model_config.json
//     eval_result.json
//     metrics.csv          (written by MetricsLogger)
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{Context, Result};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
};
use serde::{de::DeserializeOwned, Serialize};
use std::{fs, path::{Path, PathBuf}};

use crate::application::train_use_case::TrainConfig;
use crate::ml::{evaluator::EvalResult, model::{MolRegressor, MolRegressorConfig}};

const MODEL_FILE:        &str = "best_model";
const TRAIN_CONFIG_FILE: &str = "train_config.json";
const MODEL_CONFIG_FILE: &str = "model_config.json";
const EVAL_FILE:         &str = "eval_result.json";

/// Manages saving and loading of run artifacts.
/// All files are stored in the configured directory.
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Create the manager, creating the directory if needed.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create artifact directory '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Save model weights (the recorder adds the extension).
    pub fn save_model<B: Backend>(&self, model: &MolRegressor<B>) -> Result<()> {
        let path = self.dir.join(MODEL_FILE);
        CompactRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| format!("Failed to save checkpoint to '{}'", path.display()))?;

        tracing::debug!("Saved checkpoint: '{}'", path.display());
        Ok(())
    }

    /// Load weights into a freshly built model of the same architecture.
    pub fn load_model<B: Backend>(
        &self,
        model:  MolRegressor<B>,
        device: &B::Device,
    ) -> Result<MolRegressor<B>> {
        let path = self.dir.join(MODEL_FILE);
        let record = CompactRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!("Cannot load checkpoint '{}'. Have you trained the model first?",
                    path.display())
            })?;
        Ok(model.load_record(record))
    }

    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        self.write_json(TRAIN_CONFIG_FILE, cfg)
    }

    pub fn load_config(&self) -> Result<TrainConfig> {
        self.read_json(TRAIN_CONFIG_FILE)
    }

    pub fn save_model_config(&self, cfg: &MolRegressorConfig) -> Result<()> {
        self.write_json(MODEL_CONFIG_FILE, cfg)
    }

    pub fn load_model_config(&self) -> Result<MolRegressorConfig> {
        self.read_json(MODEL_CONFIG_FILE)
    }

    pub fn save_eval(&self, result: &EvalResult) -> Result<()> {
        self.write_json(EVAL_FILE, result)
    }

    fn write_json<T: Serialize>(&self, name: &str, value: &T) -> Result<()> {
        let path = self.dir.join(name);
        let json = serde_json::to_string_pretty(value)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write '{}'", path.display()))?;
        tracing::debug!("Saved '{}'", path.display());
        Ok(())
    }

    fn read_json<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let path = self.dir.join(name);
        let json = fs::read_to_string(&path).with_context(|| {
            format!(
                "Cannot read '{}'. Make sure you have run 'train' first.",
                path.display()
            )
        })?;
        serde_json::from_str(&json).with_context(|| format!("Malformed '{}'", path.display()))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{ndarray::NdArrayDevice, NdArray};
    use tempfile::tempdir;

    type TestBackend = NdArray;

    #[test]
    fn test_model_weights_survive_save_and_load() {
        let tmp     = tempdir().unwrap();
        let ckpt    = CheckpointManager::new(tmp.path()).unwrap();
        let device  = NdArrayDevice::default();
        let cfg     = MolRegressorConfig::new(2, 2, 1);

        let trained: MolRegressor<TestBackend> = cfg.init(&device);
        ckpt.save_model(&trained).unwrap();

        let fresh: MolRegressor<TestBackend> = cfg.init(&device);
        let loaded = ckpt.load_model(fresh, &device).unwrap();

        let x    = Tensor::<TestBackend, 3>::ones([1, 3, 2], &device);
        let a    = Tensor::<TestBackend, 3>::ones([1, 3, 3], &device);
        let mask = Tensor::<TestBackend, 2>::ones([1, 3], &device);
        let p1   = trained.forward(x.clone(), a.clone(), mask.clone()).predictions.into_scalar();
        let p2   = loaded.forward(x, a, mask).predictions.into_scalar();
        // CompactRecorder stores half precision
        assert!((p1 - p2).abs() < 5e-2 * (1.0 + p1.abs()), "{p1} vs {p2}");
    }

    #[test]
    fn test_configs_round_trip() {
        let tmp  = tempdir().unwrap();
        let ckpt = CheckpointManager::new(tmp.path()).unwrap();

        let model_cfg = MolRegressorConfig::new(9, 27, 1).with_hidden(16);
        ckpt.save_model_config(&model_cfg).unwrap();
        let back = ckpt.load_model_config().unwrap();
        assert_eq!((back.n_clusters, back.hidden), (27, 16));

        ckpt.save_config(&TrainConfig::default()).unwrap();
        assert_eq!(ckpt.load_config().unwrap().batch_size, 32);
    }

    #[test]
    fn test_missing_checkpoint_mentions_training() {
        let tmp  = tempdir().unwrap();
        let ckpt = CheckpointManager::new(tmp.path()).unwrap();
        let err  = ckpt.load_config().unwrap_err().to_string();
        assert!(err.contains("run 'train' first"));
    }
}
