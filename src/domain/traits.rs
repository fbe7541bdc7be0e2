// ============================================================
// Layer 3 - Core Traits (Abstractions)
// ============================================================
// The application layer only needs "a dataset plus its split".
// Where it comes from (OGB CSV files on disk, an in-memory
// fixture in tests) is hidden behind GraphSource.
//
// Implementations:
//   - OgbLoader        → reads the OGB raw CSV layout
//   - InMemorySource   → wraps already-built graphs (tests only)
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;

use crate::domain::{graph::GraphDataset, split::SplitIndices};

// ─── GraphSource ──────────────────────────────────────────────────────────────
/// Any component that can produce a graph dataset and its split.
pub trait GraphSource {
    /// Load every graph in the dataset, in index order.
    fn load_graphs(&self) -> Result<GraphDataset>;

    /// Load the train / valid / test partition for `len` graphs.
    fn load_split(&self, len: usize) -> Result<SplitIndices>;
}

// ─── InMemorySource ───────────────────────────────────────────────────────────
/// A GraphSource over graphs that are already in memory.
#[cfg(test)]
pub struct InMemorySource {
    dataset: GraphDataset,
    split:   SplitIndices,
}

#[cfg(test)]
impl InMemorySource {
    pub fn new(dataset: GraphDataset, split: SplitIndices) -> Self {
        Self { dataset, split }
    }
}

#[cfg(test)]
impl GraphSource for InMemorySource {
    fn load_graphs(&self) -> Result<GraphDataset> {
        Ok(self.dataset.clone())
    }

    fn load_split(&self, len: usize) -> Result<SplitIndices> {
        self.split.validate(len)?;
        Ok(self.split.clone())
    }
}
