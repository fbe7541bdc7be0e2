// ============================================================
// Layer 3 - Molecular Graph Domain Types
// ============================================================
// A molecule is represented as a small graph:
//   - nodes are atoms, each with a row of numeric features
//   - edges are bonds, stored as directed (src, dst) pairs
//     with local node indices (0..n_nodes)
//   - optional edge features, one row per edge
//   - a regression target vector (NaN = unlabeled)
//
// All matrices are stored row-major in flat Vec<f32>s.
// That keeps this layer free of tensor types: conversion to
// burn tensors happens in the batcher (Layer 4).
//
// Reference: Rust Book §5 (Structs), §8 (Vectors)

use serde::{Deserialize, Serialize};

use crate::domain::error::GraphError;

/// One molecular graph with node features, edges and target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MolGraph {
    pub n_nodes: usize,

    /// Row-major [n_nodes, n_node_features]
    pub x: Vec<f32>,

    /// Directed edges with local node indices
    pub edges: Vec<(usize, usize)>,

    /// Row-major [n_edges, n_edge_features]; empty when the
    /// dataset carries no edge features
    pub edge_features: Vec<f32>,

    /// Regression target(s) - [n_labels]
    pub y: Vec<f32>,
}

impl MolGraph {
    /// Build a graph and check its internal shapes.
    pub fn new(
        n_nodes:       usize,
        x:             Vec<f32>,
        edges:         Vec<(usize, usize)>,
        edge_features: Vec<f32>,
        y:             Vec<f32>,
    ) -> Result<Self, GraphError> {
        let graph = Self { n_nodes, x, edges, edge_features, y };
        graph.validate()?;
        Ok(graph)
    }

    /// Node feature width, derived from x. Zero-node graphs report 0.
    pub fn n_node_features(&self) -> usize {
        if self.n_nodes == 0 { 0 } else { self.x.len() / self.n_nodes }
    }

    pub fn n_edge_features(&self) -> usize {
        if self.edges.is_empty() { 0 } else { self.edge_features.len() / self.edges.len() }
    }

    pub fn n_labels(&self) -> usize {
        self.y.len()
    }

    fn validate(&self) -> Result<(), GraphError> {
        if self.n_nodes > 0 && self.x.len() % self.n_nodes != 0 {
            let n_features = self.x.len() / self.n_nodes;
            return Err(GraphError::NodeFeatureShape {
                n_nodes:    self.n_nodes,
                n_features,
                expected:   self.n_nodes * n_features,
                got:        self.x.len(),
            });
        }
        if self.n_nodes == 0 && !self.x.is_empty() {
            return Err(GraphError::NodeFeatureShape {
                n_nodes:    0,
                n_features: 0,
                expected:   0,
                got:        self.x.len(),
            });
        }

        if let Some(&(src, dst)) = self
            .edges
            .iter()
            .find(|&&(s, d)| s >= self.n_nodes || d >= self.n_nodes)
        {
            return Err(GraphError::EdgeOutOfRange { src, dst, n_nodes: self.n_nodes });
        }

        if !self.edge_features.is_empty()
            && (self.edges.is_empty() || self.edge_features.len() % self.edges.len() != 0)
        {
            return Err(GraphError::EdgeFeatureShape {
                expected: self.edges.len() * self.n_edge_features().max(1),
                got:      self.edge_features.len(),
            });
        }
        Ok(())
    }
}

/// An ordered collection of graphs sharing feature widths.
#[derive(Debug, Clone, Default)]
pub struct GraphDataset {
    graphs:          Vec<MolGraph>,
    n_node_features: usize,
    n_edge_features: usize,
    n_labels:        usize,
}

impl GraphDataset {
    /// Collect graphs into a dataset. Each width is taken from the
    /// first graph that can carry it: node width from the first graph
    /// with nodes, edge width from the first graph with edges.
    pub fn new(graphs: Vec<MolGraph>) -> Result<Self, GraphError> {
        let n_node_features = graphs
            .iter()
            .find(|g| g.n_nodes > 0)
            .map_or(0, MolGraph::n_node_features);
        let n_edge_features = graphs
            .iter()
            .find(|g| !g.edges.is_empty())
            .map_or(0, MolGraph::n_edge_features);
        let n_labels = graphs.first().map_or(0, MolGraph::n_labels);

        for (index, g) in graphs.iter().enumerate() {
            if g.n_nodes > 0 && g.n_node_features() != n_node_features {
                return Err(GraphError::WidthMismatch {
                    index,
                    what:     "node feature",
                    expected: n_node_features,
                    got:      g.n_node_features(),
                });
            }
            // Edge-less graphs carry no edge features, so only check the rest
            if !g.edges.is_empty() && g.n_edge_features() != n_edge_features {
                return Err(GraphError::WidthMismatch {
                    index,
                    what:     "edge feature",
                    expected: n_edge_features,
                    got:      g.n_edge_features(),
                });
            }
            if g.n_labels() != n_labels {
                return Err(GraphError::WidthMismatch {
                    index,
                    what:     "label",
                    expected: n_labels,
                    got:      g.n_labels(),
                });
            }
        }

        Ok(Self { graphs, n_node_features, n_edge_features, n_labels })
    }

    pub fn len(&self) -> usize { self.graphs.len() }

    pub fn into_graphs(self) -> Vec<MolGraph> { self.graphs }

    pub fn n_node_features(&self) -> usize { self.n_node_features }

    pub fn n_edge_features(&self) -> usize { self.n_edge_features }

    pub fn n_labels(&self) -> usize { self.n_labels }

    /// Largest node count over all graphs (N in the pooling size N / 2)
    pub fn max_nodes(&self) -> usize {
        self.graphs.iter().map(|g| g.n_nodes).max().unwrap_or(0)
    }

    /// Select graphs by index, in the order given.
    /// Indices must already be validated against len().
    pub fn subset(&self, indices: &[usize]) -> GraphDataset {
        Self {
            graphs:          indices.iter().map(|&i| self.graphs[i].clone()).collect(),
            n_node_features: self.n_node_features,
            n_edge_features: self.n_edge_features,
            n_labels:        self.n_labels,
        }
    }
}
