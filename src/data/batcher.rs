// ============================================================
// Layer 4 - Graph Batcher (batch mode)
// ============================================================
// Implements burn's Batcher trait to turn a Vec<MolGraph> of
// DIFFERENT sizes into dense, equally-shaped tensors.
//
// How batch mode works:
//   Every graph in the mini-batch is zero-padded up to the
//   largest node count in that batch (n_max):
//
//     x    [b, n_max, F]      node features, 0 on padding rows
//     a    [b, n_max, n_max]  GCN-filtered adjacency, 0 on padding
//                              (never the raw 0/1 adjacency: GcnConv
//                              and MinCutPool expect D^-1/2 (A+I) D^-1/2)
//     mask [b, n_max]         1 = real node, 0 = padding
//     y    [b, n_out]         targets, NaN replaced by 0
//     y_mask [b, n_out]       1 = labeled, 0 = NaN label
//
//   Padding rows/columns of `a` are all zero, so convolutions
//   never move information into or out of padded nodes.
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::preprocessor::gcn_filter;
use crate::domain::graph::MolGraph;

// ─── GraphBatch ───────────────────────────────────────────────────────────────
/// A padded batch of graphs ready for the model forward pass.
#[derive(Debug, Clone)]
pub struct GraphBatch<B: Backend> {
    pub x:      Tensor<B, 3>,
    pub a:      Tensor<B, 3>,
    pub mask:   Tensor<B, 2>,
    pub y:      Tensor<B, 2>,
    pub y_mask: Tensor<B, 2>,
}

// ─── GraphBatcher ─────────────────────────────────────────────────────────────
/// Pads graphs to a common node count and stacks them.
/// Needs the dataset's widths so empty graphs still produce
/// correctly shaped rows.
#[derive(Clone, Debug)]
pub struct GraphBatcher {
    n_node_features: usize,
    n_labels:        usize,
}

impl GraphBatcher {
    pub fn new(n_node_features: usize, n_labels: usize) -> Self {
        Self { n_node_features, n_labels }
    }

    /// Dense padded arrays for a list of graphs, before they
    /// become tensors. Returns (x, a, mask, y, y_mask, n_max).
    fn pad(&self, items: &[MolGraph]) -> PaddedArrays {
        let b = items.len();
        let f = self.n_node_features;
        let o = self.n_labels;
        // At least one node slot so shapes never contain a zero
        let n_max = items.iter().map(|g| g.n_nodes).max().unwrap_or(0).max(1);

        let mut x      = vec![0.0f32; b * n_max * f];
        let mut a      = vec![0.0f32; b * n_max * n_max];
        let mut mask   = vec![0.0f32; b * n_max];
        let mut y      = vec![0.0f32; b * o];
        let mut y_mask = vec![0.0f32; b * o];

        for (gi, g) in items.iter().enumerate() {
            let n = g.n_nodes;

            // Node features: rows 0..n of this graph's slab
            let x_off = gi * n_max * f;
            x[x_off..x_off + n * f].copy_from_slice(&g.x);

            // Filtered adjacency: copy row by row into the padded slab
            let filt  = gcn_filter(n, &g.edges);
            let a_off = gi * n_max * n_max;
            for row in 0..n {
                let dst = a_off + row * n_max;
                a[dst..dst + n].copy_from_slice(&filt[row * n..(row + 1) * n]);
            }

            mask[gi * n_max..gi * n_max + n].fill(1.0);

            for (k, &label) in g.y.iter().enumerate() {
                if !label.is_nan() {
                    y[gi * o + k]      = label;
                    y_mask[gi * o + k] = 1.0;
                }
            }
        }

        PaddedArrays { x, a, mask, y, y_mask, n_max }
    }
}

struct PaddedArrays {
    x:      Vec<f32>,
    a:      Vec<f32>,
    mask:   Vec<f32>,
    y:      Vec<f32>,
    y_mask: Vec<f32>,
    n_max:  usize,
}

// ─── Burn Batcher Trait Implementation ────────────────────────────────────────
impl<B: Backend> Batcher<B, MolGraph, GraphBatch<B>> for GraphBatcher {
    fn batch(&self, items: Vec<MolGraph>, device: &B::Device) -> GraphBatch<B> {
        let b = items.len();
        let f = self.n_node_features;
        let o = self.n_labels;
        let p = self.pad(&items);
        let n = p.n_max;

        GraphBatch {
            x:      Tensor::from_data(TensorData::new(p.x, [b, n, f]), device),
            a:      Tensor::from_data(TensorData::new(p.a, [b, n, n]), device),
            mask:   Tensor::from_data(TensorData::new(p.mask, [b, n]), device),
            y:      Tensor::from_data(TensorData::new(p.y, [b, o]), device),
            y_mask: Tensor::from_data(TensorData::new(p.y_mask, [b, o]), device),
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{ndarray::NdArrayDevice, NdArray};

    type TestBackend = NdArray;

    fn graph(n: usize, edges: Vec<(usize, usize)>, y: f32) -> MolGraph {
        MolGraph::new(n, vec![1.0; n * 2], edges, vec![], vec![y]).unwrap()
    }

    #[test]
    fn test_pads_to_largest_graph() {
        let device  = NdArrayDevice::default();
        let batcher = GraphBatcher::new(2, 1);
        let batch: GraphBatch<TestBackend> = batcher.batch(
            vec![graph(2, vec![(0, 1), (1, 0)], 1.0), graph(4, vec![], 2.0)],
            &device,
        );

        assert_eq!(batch.x.dims(), [2, 4, 2]);
        assert_eq!(batch.a.dims(), [2, 4, 4]);
        assert_eq!(batch.mask.dims(), [2, 4]);
        assert_eq!(batch.y.dims(), [2, 1]);

        let mask: Vec<f32> = batch.mask.into_data().to_vec().unwrap();
        assert_eq!(mask, vec![1.0, 1.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_padding_rows_of_adjacency_are_zero() {
        let device  = NdArrayDevice::default();
        let batcher = GraphBatcher::new(2, 1);
        let batch: GraphBatch<TestBackend> = batcher.batch(
            vec![graph(1, vec![], 0.0), graph(3, vec![(0, 1), (1, 0)], 0.0)],
            &device,
        );

        let a: Vec<f32> = batch.a.into_data().to_vec().unwrap();
        // First graph: only a[0][0] = 1 (self-loop of the single atom)
        assert_eq!(&a[0..9], &[1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        // Second graph: isolated node 2 keeps its self-loop
        assert_eq!(a[9 + 8], 1.0);
    }

    #[test]
    fn test_nan_labels_are_masked() {
        let device  = NdArrayDevice::default();
        let batcher = GraphBatcher::new(2, 1);
        let batch: GraphBatch<TestBackend> = batcher.batch(
            vec![graph(1, vec![], f32::NAN), graph(1, vec![], 3.5)],
            &device,
        );

        let y: Vec<f32>      = batch.y.into_data().to_vec().unwrap();
        let y_mask: Vec<f32> = batch.y_mask.into_data().to_vec().unwrap();
        assert_eq!(y, vec![0.0, 3.5]);
        assert_eq!(y_mask, vec![0.0, 1.0]);
    }

    #[test]
    fn test_adjacency_is_filtered_not_raw() {
        let device  = NdArrayDevice::default();
        let batcher = GraphBatcher::new(2, 1);
        let batch: GraphBatch<TestBackend> =
            batcher.batch(vec![graph(2, vec![(0, 1), (1, 0)], 0.0)], &device);

        // Raw adjacency would be [[0, 1], [1, 0]]; with self-loops each
        // node has degree 2, so every entry becomes 1 / 2
        let a: Vec<f32> = batch.a.into_data().to_vec().unwrap();
        assert!(a.iter().all(|v| (v - 0.5).abs() < 1e-6), "{a:?}");
    }
}
