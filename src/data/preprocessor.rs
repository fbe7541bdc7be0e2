// ============================================================
// Layer 4 - Graph Preprocessor (GCN filter)
// ============================================================
// A graph convolution propagates features along edges with
// the renormalised adjacency from Kipf & Welling (2017):
//
//   Â = D^{-1/2} (A + I) D^{-1/2}
//
//   A  - binary adjacency built from the edge list
//   I  - identity, so every node also keeps its own features
//   D  - diagonal degree matrix of (A + I)
//
// Why normalise?
//   Without it, summing neighbour features makes high-degree
//   atoms produce much larger activations than low-degree ones
//   and stacked convolutions blow up numerically.
//
// Molecules are tiny (tens of atoms) so a dense n×n matrix
// per graph is cheaper and simpler than a sparse format.
//
// Reference: Kipf & Welling (2017) Semi-Supervised
//            Classification with Graph Convolutional Networks

/// Dense binary adjacency (row-major n×n) from an edge list.
/// Duplicate edges collapse to a single 1.
pub fn adjacency(n_nodes: usize, edges: &[(usize, usize)]) -> Vec<f32> {
    let mut a = vec![0.0f32; n_nodes * n_nodes];
    for &(src, dst) in edges {
        a[src * n_nodes + dst] = 1.0;
    }
    a
}

/// Renormalised GCN filter D^{-1/2} (A + I) D^{-1/2}, row-major n×n.
pub fn gcn_filter(n_nodes: usize, edges: &[(usize, usize)]) -> Vec<f32> {
    let mut a = adjacency(n_nodes, edges);

    // ── Step 1: add self-loops (an explicit self-edge stays at 1) ─────────────
    for i in 0..n_nodes {
        a[i * n_nodes + i] = 1.0;
    }

    // ── Step 2: degree^-1/2 of every row ──────────────────────────────────────
    // Every row has at least the self-loop, so degree >= 1.
    let inv_sqrt_deg: Vec<f32> = (0..n_nodes)
        .map(|i| {
            let deg: f32 = a[i * n_nodes..(i + 1) * n_nodes].iter().sum();
            1.0 / deg.sqrt()
        })
        .collect();

    // ── Step 3: scale rows and columns ────────────────────────────────────────
    for i in 0..n_nodes {
        for j in 0..n_nodes {
            a[i * n_nodes + j] *= inv_sqrt_deg[i] * inv_sqrt_deg[j];
        }
    }
    a
}
