// ============================================================
// Layer 4 - Random Train/Valid/Test Splitter
// ============================================================
// Benchmarks normally ship their own split (see OgbLoader).
// This is the fallback for a dataset folder without split
// files: shuffle all graph indices with a seeded RNG and cut
// them into train / valid / test by fraction.
//
// Why seeded?
//   Evaluation later rebuilds the same test split from the
//   saved config. A thread_rng shuffle would give a different
//   test set every run and leak training graphs into it.
//
// Uses Fisher-Yates shuffle via rand::seq::SliceRandom.
//
// Reference: rand crate documentation

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::domain::split::SplitIndices;

/// Shuffle 0..len with `seed` and split by the two fractions.
/// Whatever remains after train and valid becomes test.
///
/// # Example
/// ```ignore
/// let split = random_split(100, 0.8, 0.1, 42);
/// // 80 train, 10 valid, 10 test
/// ```
pub fn random_split(len: usize, train_fraction: f64, valid_fraction: f64, seed: u64) -> SplitIndices {
    let mut indices: Vec<usize> = (0..len).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    // Clamp so tiny datasets and fractions summing > 1 never panic
    let n_train = (((len as f64) * train_fraction).round() as usize).min(len);
    let n_valid = (((len as f64) * valid_fraction).round() as usize).min(len - n_train);

    let test  = indices.split_off(n_train + n_valid);
    let valid = indices.split_off(n_train);

    tracing::debug!(
        "Random split (seed {}): {} train, {} valid, {} test",
        seed,
        indices.len(),
        valid.len(),
        test.len(),
    );

    SplitIndices::new(indices, valid, test)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correct_split_sizes() {
        let s = random_split(100, 0.8, 0.1, 0);
        assert_eq!(s.train.len(), 80);
        assert_eq!(s.valid.len(), 10);
        assert_eq!(s.test.len(),  10);
    }

    #[test]
    fn test_all_items_preserved_and_disjoint() {
        let s = random_split(57, 0.7, 0.2, 3);
        assert_eq!(s.train.len() + s.valid.len() + s.test.len(), 57);
        assert!(s.validate(57).is_ok());
    }

    #[test]
    fn test_same_seed_same_split() {
        assert_eq!(random_split(40, 0.8, 0.1, 9), random_split(40, 0.8, 0.1, 9));
    }

    #[test]
    fn test_empty_dataset() {
        let s = random_split(0, 0.8, 0.1, 1);
        assert!(s.train.is_empty() && s.valid.is_empty() && s.test.is_empty());
    }

    #[test]
    fn test_oversized_fractions_are_clamped() {
        let s = random_split(10, 0.9, 0.5, 1);
        assert_eq!(s.train.len(), 9);
        assert_eq!(s.valid.len(), 1);
        assert!(s.test.is_empty());
    }
}
