// ============================================================
// Layer 5 - ML / Model Layer (Burn)
// ============================================================
// This layer contains the burn model code. Apart from the
// batcher in Layer 4 (which has to produce tensors), no other
// layer touches tensors directly.
//
// What's in this layer:
//
//   gcn.rs       - graph convolution  relu(Â · X W + b)
//   mincut.rs    - MinCut pooling with cut / orthogonality losses
//   model.rs     - GCN → MinCutPool → GCN → sum pool → Dense
//   trainer.rs   - Adam training loop with early stopping
//   predictor.rs - batched no-grad prediction over a dataset
//   evaluator.rs - benchmark RMSE
//   summary.rs   - printable layer table
//
// Reference: Burn Book §3 (Building Blocks), §5 (Training)

pub mod gcn;

pub mod mincut;

pub mod model;

pub mod trainer;

pub mod predictor;

pub mod evaluator;

pub mod summary;

/// Backend used for training (gradients tracked)
pub type TrainBackend = burn::backend::Autodiff<burn::backend::Wgpu>;

/// Backend used for prediction and evaluation
pub type EvalBackend = burn::backend::Wgpu;
