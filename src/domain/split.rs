// ============================================================
// Layer 3 - Dataset Split Indices
// ============================================================
// Benchmarks ship a fixed train / valid / test partition
// (OGB molecule datasets use a scaffold split), expressed as
// lists of graph indices. Keeping the split as plain indices
// means the dataset itself is loaded once and then viewed
// three ways via GraphDataset::subset.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::error::GraphError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub valid: Vec<usize>,
    pub test:  Vec<usize>,
}

impl SplitIndices {
    pub fn new(train: Vec<usize>, valid: Vec<usize>, test: Vec<usize>) -> Self {
        Self { train, valid, test }
    }

    /// Check every index is within `len` and no graph is in two splits.
    pub fn validate(&self, len: usize) -> Result<(), GraphError> {
        let mut owner: HashMap<usize, &'static str> = HashMap::new();

        for (name, indices) in self.named() {
            for &index in indices {
                if index >= len {
                    return Err(GraphError::SplitOutOfRange { split: name, index, len });
                }
                if let Some(first) = owner.insert(index, name) {
                    if first != name {
                        return Err(GraphError::SplitOverlap { index, first, second: name });
                    }
                }
            }
        }
        Ok(())
    }

    pub fn named(&self) -> [(&'static str, &[usize]); 3] {
        [
            ("train", self.train.as_slice()),
            ("valid", self.valid.as_slice()),
            ("test",  self.test.as_slice()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_split_passes() {
        let s = SplitIndices::new(vec![0, 1, 2], vec![3], vec![4]);
        assert!(s.validate(5).is_ok());
    }

    #[test]
    fn test_out_of_range_index() {
        let s = SplitIndices::new(vec![0], vec![1], vec![7]);
        assert_eq!(
            s.validate(5),
            Err(GraphError::SplitOutOfRange { split: "test", index: 7, len: 5 })
        );
    }

    #[test]
    fn test_overlap_detected() {
        let s = SplitIndices::new(vec![0, 1], vec![1], vec![2]);
        assert_eq!(
            s.validate(3),
            Err(GraphError::SplitOverlap { index: 1, first: "train", second: "valid" })
        );
    }
}
