// ============================================================
// Layer 5 - MinCut Pooling
// ============================================================
// Coarsens every graph in the batch from n nodes to k clusters
// with a learned soft assignment (Bianchi et al., 2020):
//
//   S  = softmax(X W + b)            [batch, n, k]  (row-wise)
//   X' = Sᵀ X                        [batch, k, d]
//   A' = Sᵀ Â S                      [batch, k, k]
//
// A' then gets its diagonal zeroed and is renormalised as
// D'^{-1/2} A' D'^{-1/2}, so the next GCN sees a well-scaled
// adjacency between clusters.
//
// Two unsupervised auxiliary losses shape S:
//
//   cut   = -Tr(Sᵀ Â S) / Tr(Sᵀ D S)
//           minimising it keeps strongly connected nodes together
//
//   ortho = ‖ SᵀS / ‖SᵀS‖_F  −  I_k / √k ‖_F
//           minimising it spreads nodes evenly over clusters
//
// Both are averaged over the batch and added to the training
// objective by the model.
//
// Padding: S is multiplied by the node mask, so padded nodes
// belong to no cluster and contribute nothing to X', A' or
// either loss.
//
// Reference: Bianchi, Grattarola, Alippi (2020) Spectral
//            Clustering with Graph Neural Networks for Graph Pooling

use burn::{
    nn::Linear,
    prelude::*,
    tensor::activation::softmax,
};

use crate::ml::gcn::glorot_linear;

/// Guards the divisions in the losses and the degree scaling
const EPS: f32 = 1e-10;

#[derive(Config, Debug)]
pub struct MinCutPoolConfig {
    pub d_input:    usize,
    pub n_clusters: usize,
}

impl MinCutPoolConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> MinCutPool<B> {
        MinCutPool {
            assign:     glorot_linear(self.d_input, self.n_clusters, true, device),
            n_clusters: self.n_clusters,
        }
    }

    pub fn num_params(&self) -> usize {
        self.d_input * self.n_clusters + self.n_clusters
    }
}

#[derive(Module, Debug)]
pub struct MinCutPool<B: Backend> {
    pub assign:     Linear<B>,
    pub n_clusters: usize,
}

/// Pooled graph plus the two auxiliary losses (each shape [1])
pub struct PoolOutput<B: Backend> {
    pub x:          Tensor<B, 3>,
    pub a:          Tensor<B, 3>,
    pub cut_loss:   Tensor<B, 1>,
    pub ortho_loss: Tensor<B, 1>,
}

impl<B: Backend> MinCutPool<B> {
    /// Soft cluster assignment S [batch, n, k], zero on padded nodes
    pub fn assignment(&self, x: Tensor<B, 3>, mask: Tensor<B, 2>) -> Tensor<B, 3> {
        softmax(self.assign.forward(x), 2) * mask.unsqueeze_dim::<3>(2)
    }

    /// x: [batch, n, d], a: [batch, n, n], mask: [batch, n]
    pub fn forward(&self, x: Tensor<B, 3>, a: Tensor<B, 3>, mask: Tensor<B, 2>) -> PoolOutput<B> {
        let [batch, _, _] = x.dims();
        let k      = self.n_clusters;
        let device = x.device();
        let eye    = identity::<B>(k, &device); // [1, k, k]

        let s  = self.assignment(x.clone(), mask);
        let st = s.clone().swap_dims(1, 2); // [batch, k, n]

        // ── Pooled features and adjacency ─────────────────────────────────────
        let x_pool = st.clone().matmul(x);
        let a_pool = st.clone().matmul(a.clone()).matmul(s.clone());

        // ── Cut loss ──────────────────────────────────────────────────────────
        // Tr(Sᵀ D S) = Σ_i deg_i Σ_k S_ik², which avoids building diag(D)
        let cut_num = trace(a_pool.clone(), eye.clone(), batch);
        let degree  = a.sum_dim(2); // [batch, n, 1]
        let cut_den = (degree * s.clone().powf_scalar(2.0))
            .sum_dim(2)
            .sum_dim(1)
            .reshape([batch]);
        let cut_loss = (cut_num / cut_den.add_scalar(EPS)).neg().mean();

        // ── Orthogonality loss ────────────────────────────────────────────────
        let ss       = st.matmul(s.clone());
        let ss_norm  = frobenius(ss.clone());
        let target   = eye.clone().div_scalar((k as f32).sqrt());
        let ortho    = frobenius(ss / ss_norm.add_scalar(EPS) - target);
        let ortho_loss = ortho.reshape([batch]).mean();

        // ── Renormalise pooled adjacency ──────────────────────────────────────
        let off_diag = eye.neg().add_scalar(1.0);
        let a_pool   = a_pool * off_diag;
        let d_inv_sqrt = a_pool.clone().sum_dim(2).add_scalar(EPS).sqrt().recip(); // [batch, k, 1]
        let a_pool   = d_inv_sqrt.clone() * a_pool * d_inv_sqrt.swap_dims(1, 2);

        PoolOutput { x: x_pool, a: a_pool, cut_loss, ortho_loss }
    }
}

/// Identity matrix of size k with a leading broadcast dimension: [1, k, k]
fn identity<B: Backend>(k: usize, device: &B::Device) -> Tensor<B, 3> {
    let mut values = vec![0.0f32; k * k];
    for i in 0..k {
        values[i * k + i] = 1.0;
    }
    Tensor::from_data(TensorData::new(values, [1, k, k]), device)
}

/// Batched trace of [batch, k, k] → [batch]
fn trace<B: Backend>(m: Tensor<B, 3>, eye: Tensor<B, 3>, batch: usize) -> Tensor<B, 1> {
    (m * eye).sum_dim(2).sum_dim(1).reshape([batch])
}

/// Batched Frobenius norm of [batch, r, c] → [batch, 1, 1]
fn frobenius<B: Backend>(m: Tensor<B, 3>) -> Tensor<B, 3> {
    m.powf_scalar(2.0).sum_dim(2).sum_dim(1).sqrt()
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{ndarray::NdArrayDevice, NdArray};

    type TestBackend = NdArray;

    fn inputs(device: &NdArrayDevice) -> (Tensor<TestBackend, 3>, Tensor<TestBackend, 3>, Tensor<TestBackend, 2>) {
        // One 4-node graph padded to 5 nodes: path 0-1-2-3 with self-loops
        let n = 5;
        let mut a = vec![0.0f32; n * n];
        for (i, j) in [(0, 1), (1, 2), (2, 3)] {
            a[i * n + j] = 1.0;
            a[j * n + i] = 1.0;
        }
        for i in 0..4 {
            a[i * n + i] = 1.0;
        }
        let x    = Tensor::random([1, n, 3], burn::tensor::Distribution::Default, device);
        let a    = Tensor::from_data(TensorData::new(a, [1, n, n]), device);
        let mask = Tensor::from_data(TensorData::new(vec![1.0f32, 1.0, 1.0, 1.0, 0.0], [1, n]), device);
        (x, a, mask)
    }

    #[test]
    fn test_output_shapes() {
        let device = NdArrayDevice::default();
        let pool: MinCutPool<TestBackend> = MinCutPoolConfig::new(3, 2).init(&device);
        let (x, a, mask) = inputs(&device);

        assert_eq!(pool.assignment(x.clone(), mask.clone()).dims(), [1, 5, 2]);

        let out = pool.forward(x, a, mask);
        assert_eq!(out.x.dims(), [1, 2, 3]);
        assert_eq!(out.a.dims(), [1, 2, 2]);
        assert_eq!(out.cut_loss.dims(), [1]);
        assert_eq!(out.ortho_loss.dims(), [1]);
    }

    #[test]
    fn test_assignment_rows_sum_to_mask() {
        let device = NdArrayDevice::default();
        let pool: MinCutPool<TestBackend> = MinCutPoolConfig::new(3, 2).init(&device);
        let (x, _, mask) = inputs(&device);

        let rows: Vec<f32> = pool
            .assignment(x, mask)
            .sum_dim(2)
            .into_data()
            .to_vec()
            .unwrap();
        for (row, expected) in rows.iter().zip([1.0, 1.0, 1.0, 1.0, 0.0]) {
            assert!((row - expected).abs() < 1e-5, "row sum {row} != {expected}");
        }
    }

    #[test]
    fn test_losses_are_bounded() {
        // cut ∈ [-1, 0]; ortho ∈ [0, √2]
        let device = NdArrayDevice::default();
        let pool: MinCutPool<TestBackend> = MinCutPoolConfig::new(3, 2).init(&device);
        let (x, a, mask) = inputs(&device);

        let out   = pool.forward(x, a, mask);
        let cut   = out.cut_loss.into_scalar();
        let ortho = out.ortho_loss.into_scalar();
        assert!((-1.0 - 1e-5..=1e-5).contains(&cut), "cut loss {cut}");
        assert!((-1e-5..=2.0f32.sqrt() + 1e-5).contains(&ortho), "ortho loss {ortho}");
    }

    #[test]
    fn test_pooled_adjacency_has_zero_diagonal() {
        let device = NdArrayDevice::default();
        let pool: MinCutPool<TestBackend> = MinCutPoolConfig::new(3, 3).init(&device);
        let (x, a, mask) = inputs(&device);

        let a_pool: Vec<f32> = pool.forward(x, a, mask).a.into_data().to_vec().unwrap();
        for i in 0..3 {
            assert_eq!(a_pool[i * 3 + i], 0.0);
        }
    }
}
