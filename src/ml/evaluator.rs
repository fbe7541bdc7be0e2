// ============================================================
// Layer 5 - Benchmark Evaluator
// ============================================================
// Scores predictions the way the OGB graph property
// prediction evaluator does for regression datasets:
//
//   for each task column t:
//       keep rows where y_true[:, t] is not NaN
//       rmse_t = sqrt( mean( (y_true - y_pred)² ) )
//   score = mean over tasks of rmse_t
//
// Inputs are row-major: one Vec<f32> per graph, one entry
// per task. Accumulation is done in f64.

use serde::{Deserialize, Serialize};

use crate::data::catalog::DatasetInfo;
use crate::domain::error::GraphError;

/// The evaluator's report, serialised as {"rmse": value}
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvalResult {
    pub rmse: f64,
}

#[derive(Debug, Clone)]
pub struct Evaluator {
    name:      String,
    num_tasks: usize,
}

impl Evaluator {
    pub fn new(name: impl Into<String>, num_tasks: usize) -> Self {
        Self { name: name.into(), num_tasks }
    }

    /// Evaluator for a catalogued dataset; rejects metrics other than RMSE
    pub fn for_dataset(info: &DatasetInfo) -> Result<Self, GraphError> {
        if info.metric != "rmse" {
            return Err(GraphError::UnsupportedMetric {
                dataset: info.name.to_string(),
                metric:  info.metric.to_string(),
            });
        }
        Ok(Self::new(info.name, info.num_tasks))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn eval(&self, y_true: &[Vec<f32>], y_pred: &[Vec<f32>]) -> Result<EvalResult, GraphError> {
        let got = y_true.first().map_or(self.num_tasks, Vec::len);
        if got != self.num_tasks {
            return Err(GraphError::TaskCount { expected: self.num_tasks, got });
        }
        Ok(EvalResult { rmse: rmse(y_true, y_pred)? })
    }
}

/// Mean over tasks of the per-task RMSE on labeled rows.
pub fn rmse(y_true: &[Vec<f32>], y_pred: &[Vec<f32>]) -> Result<f64, GraphError> {
    let rows  = y_true.len();
    let tasks = y_true.first().map_or(0, Vec::len);
    let true_shape = (rows, tasks);

    let pred_shape = (y_pred.len(), y_pred.first().map_or(0, Vec::len));
    let ragged = y_true.iter().any(|r| r.len() != tasks) || y_pred.iter().any(|r| r.len() != tasks);
    if pred_shape != true_shape || ragged {
        return Err(GraphError::PredictionShape { true_shape, pred_shape });
    }
    if rows == 0 || tasks == 0 {
        return Err(GraphError::EmptyEvaluation);
    }

    let mut total = 0.0f64;
    for task in 0..tasks {
        let (sum_sq, count) = y_true
            .iter()
            .zip(y_pred)
            .filter(|(t, _)| !t[task].is_nan())
            .fold((0.0f64, 0usize), |(s, c), (t, p)| {
                let diff = t[task] as f64 - p[task] as f64;
                (s + diff * diff, c + 1)
            });
        if count == 0 {
            return Err(GraphError::NoLabels { task });
        }
        total += (sum_sq / count as f64).sqrt();
    }
    Ok(total / tasks as f64)
}
