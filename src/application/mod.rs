// ============================================================
// Layer 2 - Application / Use Cases
// ============================================================
// Orchestrates the other layers to accomplish one goal:
// training and scoring a model, or re-scoring a saved one.
//
// Rules for this layer:
//   - No tensor math or model code here
//   - Only workflow coordination
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// Fetch, load and split a dataset (shared by both workflows)
pub mod prepare;

// load → split → build → fit → evaluate
pub mod train_use_case;

// Re-score a saved checkpoint on the test split
pub mod evaluate_use_case;
