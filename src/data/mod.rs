// ============================================================
// Layer 4 - Data Pipeline
// ============================================================
// Everything from files on disk to padded tensor batches.
//
// The pipeline flows in this order:
//
//   OGB raw CSV tables (.csv / .csv.gz)
//       │
//       ▼
//   OgbLoader         → slices flat tables into MolGraphs
//       │
//       ▼
//   SplitIndices      → benchmark split (or random_split fallback)
//       │
//       ▼
//   MolGraphDataset   → implements burn's Dataset trait
//       │
//       ▼
//   GraphBatcher      → GCN filter + zero-padding into tensors
//       │
//       ▼
//   DataLoader        → feeds batches to the training loop
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Known benchmark datasets and their metadata
pub mod catalog;

/// Reads the OGB raw CSV layout
pub mod loader;

/// GCN adjacency normalisation
pub mod preprocessor;

/// Implements burn's Dataset trait for molecular graphs
pub mod dataset;

/// Implements burn's Batcher trait with per-batch padding
pub mod batcher;

/// Seeded random train/valid/test split
pub mod splitter;
