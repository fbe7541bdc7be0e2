// ============================================================
// Layer 6 - Infrastructure Layer
// ============================================================
// Cross-cutting concerns that don't belong in any specific
// business layer:
//
//   checkpoint.rs - model weights (burn CompactRecorder) plus
//                   the JSON configs needed to rebuild the
//                   model and the final evaluation result
//
//   metrics.rs    - per-epoch training metrics as CSV
//
//   fetch.rs      - downloading and unpacking benchmark
//                   datasets into the data root
//
// Reference: Rust Book §7 (Modules)
//            Rust Book §9 (Error Handling with anyhow)

/// Model checkpoint and config persistence
pub mod checkpoint;

/// Training metrics CSV logger
pub mod metrics;

/// Benchmark dataset download and extraction
pub mod fetch;
