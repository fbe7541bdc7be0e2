// ============================================================
// Layer 2 - Dataset Preparation
// ============================================================
// The first half of every workflow: make sure the dataset is
// on disk, load it, and carve out the three splits.
//
//   Step 1: Resolve the dataset name in the catalog
//   Step 2: Download/extract if missing            (Layer 6)
//   Step 3: Load all graphs                        (Layer 4)
//   Step 4: Read the benchmark split, or fall back
//           to a seeded random split               (Layer 4)
//   Step 5: Build the three sub-datasets
//
// Both `train` and `evaluate` go through here, so the test
// split used for scoring is always the same one.

use anyhow::{Context, Result};

use crate::data::{
    catalog::{self, DatasetInfo},
    loader::OgbLoader,
    splitter::random_split,
};
use crate::domain::{graph::GraphDataset, split::SplitIndices, traits::GraphSource};
use crate::infra::fetch::DatasetFetcher;

/// Fractions for the fallback random split
const FALLBACK_TRAIN: f64 = 0.8;
const FALLBACK_VALID: f64 = 0.1;

#[derive(Debug)]
pub struct PreparedData {
    pub full:  GraphDataset,
    pub train: GraphDataset,
    pub valid: GraphDataset,
    pub test:  GraphDataset,
}

impl PreparedData {
    /// N: the largest graph in the whole dataset
    pub fn max_nodes(&self) -> usize {
        self.full.max_nodes()
    }
}

/// Fetch (if needed), load and split a catalogued dataset.
pub fn prepare_dataset(
    dataset_name:   &str,
    data_root:      &str,
    allow_download: bool,
    seed:           u64,
) -> Result<(&'static DatasetInfo, PreparedData)> {
    let info = catalog::lookup(dataset_name)?;

    let dir = DatasetFetcher::new(data_root).ensure(info, allow_download)?;
    tracing::info!("Using dataset '{}' at '{}'", info.name, dir.display());

    let loader = OgbLoader::new(&dir, info.split, info.add_inverse_edge);
    let random_seed = if loader.has_split() {
        None
    } else {
        tracing::warn!(
            "No '{}' split found for '{}'; using a random split (seed {})",
            info.split,
            info.name,
            seed
        );
        Some(seed)
    };

    let data = split_source(&loader, random_seed)
        .with_context(|| format!("Cannot prepare dataset '{}'", info.name))?;
    Ok((info, data))
}

/// Load graphs from any source and apply its split.
/// With `random_seed` set, the source's split is ignored and
/// a seeded random split is used instead.
pub fn split_source(source: &dyn GraphSource, random_seed: Option<u64>) -> Result<PreparedData> {
    let full = source.load_graphs()?;

    let split: SplitIndices = match random_seed {
        Some(seed) => random_split(full.len(), FALLBACK_TRAIN, FALLBACK_VALID, seed),
        None       => source.load_split(full.len())?,
    };

    let train = full.subset(&split.train);
    let valid = full.subset(&split.valid);
    let test  = full.subset(&split.test);
    tracing::info!(
        "Split: {} train, {} valid, {} test",
        train.len(),
        valid.len(),
        test.len()
    );

    Ok(PreparedData { full, train, valid, test })
}
