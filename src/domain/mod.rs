// ============================================================
// Layer 3 - Domain Layer
// ============================================================
// Pure Rust structs and traits describing what the system
// works with: molecular graphs, datasets of them, and the
// benchmark's train/valid/test partition.
//
// Rules for this layer:
//   - NO burn types (tensors are built in Layer 4)
//   - NO file I/O or network calls
//   - Only plain structs, enums, and traits
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// Typed validation errors
pub mod error;

// Molecular graph and graph dataset
pub mod graph;

// Train / valid / test index partition
pub mod split;

// Core abstractions (traits) that other layers implement
pub mod traits;
