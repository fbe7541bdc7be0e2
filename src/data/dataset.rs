use burn::data::dataset::Dataset;

use crate::domain::graph::{GraphDataset, MolGraph};

/// Adapter exposing a GraphDataset through burn's Dataset trait,
/// so DataLoaderBuilder can index and shuffle it.
pub struct MolGraphDataset {
    graphs: Vec<MolGraph>,
}

impl MolGraphDataset {
    pub fn new(dataset: GraphDataset) -> Self {
        Self { graphs: dataset.into_graphs() }
    }
}

impl Dataset<MolGraph> for MolGraphDataset {
    fn get(&self, index: usize) -> Option<MolGraph> {
        self.graphs.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.graphs.len()
    }
}
