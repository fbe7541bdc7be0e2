// ============================================================
// Layer 5 - Predictor
// ============================================================
// Runs a model over a whole dataset without gradients and
// collects, in dataset order:
//   - y_pred: one prediction row per graph
//   - y_true: the matching target row (NaN where unlabeled)
//   - loss:   mean objective over batches (MSE + pooling losses)
//
// Used for the per-epoch validation pass and for the final
// test evaluation. The loader never shuffles here, so row i
// of the output belongs to graph i of the input.

use anyhow::{anyhow, Result};
use burn::{
    data::dataloader::{DataLoader, DataLoaderBuilder},
    prelude::*,
};
use std::sync::Arc;

use crate::data::{
    batcher::{GraphBatch, GraphBatcher},
    dataset::MolGraphDataset,
};
use crate::domain::graph::GraphDataset;
use crate::ml::model::MolRegressor;

#[derive(Debug, Clone, Default)]
pub struct Predictions {
    pub y_true: Vec<Vec<f32>>,
    pub y_pred: Vec<Vec<f32>>,
    /// NaN when the dataset is empty
    pub loss:   f64,
}

impl Predictions {
    pub fn is_empty(&self) -> bool {
        self.y_pred.is_empty()
    }
}

pub fn predict<B: Backend>(
    model:      &MolRegressor<B>,
    dataset:    GraphDataset,
    batch_size: usize,
    device:     &B::Device,
) -> Result<Predictions> {
    let n_out   = dataset.n_labels();
    let batcher = GraphBatcher::new(dataset.n_node_features(), n_out);
    let loader: Arc<dyn DataLoader<B, GraphBatch<B>>> = DataLoaderBuilder::new(batcher)
        .batch_size(batch_size)
        .set_device(device.clone())
        .build(MolGraphDataset::new(dataset));

    let mut out        = Predictions::default();
    let mut loss_sum   = 0.0f64;
    let mut n_batches  = 0usize;

    for batch in loader.iter() {
        let y      = batch.y.clone();
        let y_mask = batch.y_mask.clone();
        let (loss, output) = model.forward_loss(batch);

        loss_sum  += loss.into_scalar().elem::<f64>();
        n_batches += 1;

        let pred  = to_vec(output.predictions)?;
        let y     = to_vec(y)?;
        let y_mask = to_vec(y_mask)?;

        for ((p, t), m) in pred.chunks(n_out).zip(y.chunks(n_out)).zip(y_mask.chunks(n_out)) {
            out.y_pred.push(p.to_vec());
            // Masked-out labels were NaN before batching
            out.y_true.push(
                t.iter()
                    .zip(m)
                    .map(|(&v, &keep)| if keep > 0.0 { v } else { f32::NAN })
                    .collect(),
            );
        }
    }

    out.loss = if n_batches > 0 { loss_sum / n_batches as f64 } else { f64::NAN };
    tracing::debug!("Predicted {} graphs in {} batches", out.y_pred.len(), n_batches);
    Ok(out)
}

fn to_vec<B: Backend>(t: Tensor<B, 2>) -> Result<Vec<f32>> {
    t.into_data()
        .convert::<f32>()
        .to_vec::<f32>()
        .map_err(|e| anyhow!("Cannot read tensor data: {e:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::graph::MolGraph;
    use crate::ml::model::MolRegressorConfig;
    use burn::backend::{ndarray::NdArrayDevice, NdArray};

    type TestBackend = NdArray;

    fn dataset() -> GraphDataset {
        let graphs = (1..=5)
            .map(|n| {
                let edges = (0..n - 1).flat_map(|i| [(i, i + 1), (i + 1, i)]).collect();
                let y     = if n == 3 { f32::NAN } else { n as f32 };
                MolGraph::new(n, vec![1.0; n * 2], edges, vec![], vec![y]).unwrap()
            })
            .collect();
        GraphDataset::new(graphs).unwrap()
    }

    #[test]
    fn test_one_row_per_graph_in_order() {
        let device = NdArrayDevice::default();
        let model: MolRegressor<TestBackend> = MolRegressorConfig::new(2, 2, 1).init(&device);

        let preds = predict(&model, dataset(), 2, &device).unwrap();
        assert_eq!(preds.y_pred.len(), 5);
        assert_eq!(preds.y_true[0], vec![1.0]);
        assert_eq!(preds.y_true[4], vec![5.0]);
        assert!(preds.y_true[2][0].is_nan());
        assert!(preds.loss.is_finite());
    }

    #[test]
    fn test_empty_dataset_gives_nan_loss() {
        let device = NdArrayDevice::default();
        let model: MolRegressor<TestBackend> = MolRegressorConfig::new(2, 2, 1).init(&device);

        let empty = dataset().subset(&[]);
        let preds = predict(&model, empty, 4, &device).unwrap();
        assert!(preds.is_empty());
        assert!(preds.loss.is_nan());
    }
}
