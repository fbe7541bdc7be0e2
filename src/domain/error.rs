// ============================================================
// Layer 3 - Domain Errors
// ============================================================
// Validation failures that originate in our own data model
// (graph shape checks, split checks, metric input checks).
//
// These are a typed enum rather than anyhow strings so that
// tests and callers can match on the exact failure.
// Higher layers wrap them into anyhow::Error with context.
//
// Reference: thiserror crate documentation
//            Rust Book §9 (Recoverable Errors with Result)

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum GraphError {
    /// Node-feature matrix length is not n_nodes * n_features
    #[error("node features: expected {expected} values ({n_nodes} nodes x {n_features} features), got {got}")]
    NodeFeatureShape {
        n_nodes:    usize,
        n_features: usize,
        expected:   usize,
        got:        usize,
    },

    /// Edge-feature matrix length is not n_edges * n_edge_features
    #[error("edge features: expected {expected} values, got {got}")]
    EdgeFeatureShape { expected: usize, got: usize },

    /// An edge references a node outside 0..n_nodes
    #[error("edge ({src}, {dst}) out of range for graph with {n_nodes} nodes")]
    EdgeOutOfRange { src: usize, dst: usize, n_nodes: usize },

    /// Graph in a dataset disagrees with the dataset's feature widths
    #[error("graph {index}: {what} width {got} does not match dataset width {expected}")]
    WidthMismatch {
        index:    usize,
        what:     &'static str,
        expected: usize,
        got:      usize,
    },

    /// Split index points past the end of the dataset
    #[error("split '{split}' index {index} out of range for dataset of {len} graphs")]
    SplitOutOfRange { split: &'static str, index: usize, len: usize },

    /// The same graph appears in two splits
    #[error("graph {index} appears in both '{first}' and '{second}' splits")]
    SplitOverlap {
        index:  usize,
        first:  &'static str,
        second: &'static str,
    },

    /// Evaluator input shapes differ
    #[error("y_true has shape {true_shape:?} but y_pred has shape {pred_shape:?}")]
    PredictionShape {
        true_shape: (usize, usize),
        pred_shape: (usize, usize),
    },

    /// Evaluator expected a different number of task columns
    #[error("expected {expected} task columns, got {got}")]
    TaskCount { expected: usize, got: usize },

    /// Evaluator received zero rows
    #[error("cannot evaluate on an empty set of predictions")]
    EmptyEvaluation,

    /// Dataset is scored with a metric the evaluator does not implement
    #[error("dataset '{dataset}' uses metric '{metric}', only 'rmse' is supported")]
    UnsupportedMetric { dataset: String, metric: String },

    /// Every label of a task is NaN
    #[error("task {task} has no labeled rows")]
    NoLabels { task: usize },
}
