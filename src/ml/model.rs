use burn::{nn::Linear, prelude::*};

use crate::data::batcher::GraphBatch;
use crate::ml::{
    gcn::{glorot_linear, GcnConv, GcnConvConfig},
    mincut::{MinCutPool, MinCutPoolConfig},
};

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize.
#[derive(Config, Debug)]
pub struct MolRegressorConfig {
    pub n_node_features: usize,
    /// k in MinCutPool(k); the pipeline uses max_nodes / 2
    pub n_clusters:      usize,
    pub n_out:           usize,
    #[config(default = 32)]
    pub hidden:          usize,
}

impl MolRegressorConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> MolRegressor<B> {
        MolRegressor {
            conv1: self.conv1().init(device),
            pool:  self.pool().init(device),
            conv2: self.conv2().init(device),
            head:  glorot_linear(self.hidden, self.n_out, true, device),
        }
    }

    pub fn conv1(&self) -> GcnConvConfig {
        GcnConvConfig::new(self.n_node_features, self.hidden)
    }

    pub fn pool(&self) -> MinCutPoolConfig {
        MinCutPoolConfig::new(self.hidden, self.n_clusters)
    }

    pub fn conv2(&self) -> GcnConvConfig {
        GcnConvConfig::new(self.hidden, self.hidden)
    }

    pub fn head_params(&self) -> usize {
        self.hidden * self.n_out + self.n_out
    }
}

/// GCNConv → MinCutPool → GCNConv → GlobalSumPool → Dense
#[derive(Module, Debug)]
pub struct MolRegressor<B: Backend> {
    pub conv1: GcnConv<B>,
    pub pool:  MinCutPool<B>,
    pub conv2: GcnConv<B>,
    pub head:  Linear<B>,
}

pub struct RegressionOutput<B: Backend> {
    /// [batch, n_out]
    pub predictions: Tensor<B, 2>,
    /// cut + ortho loss of the pooling layer, shape [1]
    pub aux_loss:    Tensor<B, 1>,
}

impl<B: Backend> MolRegressor<B> {
    /// x: [batch, n, F], a: [batch, n, n], mask: [batch, n] → predictions [batch, n_out]
    pub fn forward(&self, x: Tensor<B, 3>, a: Tensor<B, 3>, mask: Tensor<B, 2>) -> RegressionOutput<B> {
        let node_mask = mask.clone().unsqueeze_dim::<3>(2);

        // Padded rows would otherwise carry relu(bias) into the pool
        let h = self.conv1.forward(x, a.clone()) * node_mask;

        let pooled = self.pool.forward(h, a, mask);
        let h = self.conv2.forward(pooled.x, pooled.a); // [batch, k, hidden]

        // Global sum pool over clusters
        let [batch, _, hidden] = h.dims();
        let graph_emb = h.sum_dim(1).reshape([batch, hidden]);

        RegressionOutput {
            predictions: self.head.forward(graph_emb),
            aux_loss:    pooled.cut_loss + pooled.ortho_loss,
        }
    }

    /// MSE over labeled targets plus the pooling losses, shape [1]
    pub fn forward_loss(&self, batch: GraphBatch<B>) -> (Tensor<B, 1>, RegressionOutput<B>) {
        let output = self.forward(batch.x, batch.a, batch.mask);
        let mse    = masked_mse(output.predictions.clone(), batch.y, batch.y_mask);
        (mse + output.aux_loss.clone(), output)
    }
}

/// Mean squared error over entries where `y_mask` is 1.
/// Equals the plain MSE when every target is labeled.
pub fn masked_mse<B: Backend>(pred: Tensor<B, 2>, y: Tensor<B, 2>, y_mask: Tensor<B, 2>) -> Tensor<B, 1> {
    let sq_err  = (pred - y).powf_scalar(2.0) * y_mask.clone();
    let labeled = y_mask.sum().clamp_min(1.0);
    sq_err.sum() / labeled
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{ndarray::NdArrayDevice, NdArray};

    type TestBackend = NdArray;

    #[test]
    fn test_forward_shapes() {
        let device = NdArrayDevice::default();
        let model: MolRegressor<TestBackend> = MolRegressorConfig::new(9, 4, 1).init(&device);

        let x    = Tensor::<TestBackend, 3>::ones([3, 6, 9], &device);
        let a    = Tensor::<TestBackend, 3>::ones([3, 6, 6], &device);
        let mask = Tensor::<TestBackend, 2>::ones([3, 6], &device);

        let out = model.forward(x, a, mask);
        assert_eq!(out.predictions.dims(), [3, 1]);
        assert_eq!(out.aux_loss.dims(), [1]);
    }

    #[test]
    fn test_masked_mse_ignores_unlabeled() {
        let device = NdArrayDevice::default();
        let pred   = Tensor::<TestBackend, 2>::from_data(TensorData::new(vec![1.0f32, 5.0], [2, 1]), &device);
        let y      = Tensor::<TestBackend, 2>::from_data(TensorData::new(vec![3.0f32, 0.0], [2, 1]), &device);
        let mask   = Tensor::<TestBackend, 2>::from_data(TensorData::new(vec![1.0f32, 0.0], [2, 1]), &device);

        let mse = masked_mse(pred, y, mask).into_scalar();
        assert!((mse - 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_padding_does_not_change_prediction() {
        // Same 2-node graph, once unpadded and once padded to 4 nodes
        let device = NdArrayDevice::default();
        let model: MolRegressor<TestBackend> = MolRegressorConfig::new(2, 2, 1).init(&device);

        let x_small = vec![1.0f32, 2.0, 3.0, 4.0];
        let a_small = vec![0.5f32, 0.5, 0.5, 0.5];
        let small = model.forward(
            Tensor::from_data(TensorData::new(x_small.clone(), [1, 2, 2]), &device),
            Tensor::from_data(TensorData::new(a_small, [1, 2, 2]), &device),
            Tensor::ones([1, 2], &device),
        );

        let mut x_big = x_small;
        x_big.extend([0.0; 4]);
        let mut a_big = vec![0.0f32; 16];
        for (i, j) in [(0, 0), (0, 1), (1, 0), (1, 1)] {
            a_big[i * 4 + j] = 0.5;
        }
        let big = model.forward(
            Tensor::from_data(TensorData::new(x_big, [1, 4, 2]), &device),
            Tensor::from_data(TensorData::new(a_big, [1, 4, 4]), &device),
            Tensor::from_data(TensorData::new(vec![1.0f32, 1.0, 0.0, 0.0], [1, 4]), &device),
        );

        let p_small = small.predictions.into_scalar();
        let p_big   = big.predictions.into_scalar();
        assert!((p_small - p_big).abs() < 1e-4, "{p_small} vs {p_big}");
    }
}
