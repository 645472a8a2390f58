use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::{DatasetError, ImageRecord};

/// Split fractions the trained model's test set was defined with. These
/// must not change between training and evaluation runs, or "the test
/// set" stops referring to the same images.
pub const DEFAULT_TRAIN_FRACTION: f64 = 0.8;
pub const DEFAULT_SEED: u64 = 42;

/// A disjoint partition of the corpus. Union of the three subsets is the
/// full corpus.
#[derive(Debug, Clone)]
pub struct DatasetSplit {
    pub train: Vec<ImageRecord>,
    pub validation: Vec<ImageRecord>,
    pub test: Vec<ImageRecord>,
}

/// Partitions `records` into train/validation/test subsets.
///
/// The first stage shuffles with a seeded RNG and takes `train_fraction`
/// for training; the second stage re-seeds with the same seed and splits
/// the remainder evenly into validation and test. Re-seeding per stage
/// mirrors the two-stage split the model was trained with, so identical
/// `(records, train_fraction, seed)` always reproduce identical
/// membership.
pub fn partition(
    mut records: Vec<ImageRecord>,
    train_fraction: f64,
    seed: u64,
) -> Result<DatasetSplit, DatasetError> {
    if !(train_fraction > 0.0 && train_fraction < 1.0) {
        return Err(DatasetError::InvalidFraction(train_fraction));
    }

    let total = records.len();
    let mut rng = StdRng::seed_from_u64(seed);
    records.shuffle(&mut rng);

    let split_at = ((total as f64) * train_fraction).round() as usize;
    let split_at = split_at.min(total);
    let mut remainder = records.split_off(split_at);
    let train = records;

    let mut rng = StdRng::seed_from_u64(seed);
    remainder.shuffle(&mut rng);
    let half = remainder.len() / 2;
    let test = remainder.split_off(half);
    let validation = remainder;

    log::info!(
        "Dataset split: {} train, {} validation, {} test",
        train.len(),
        validation.len(),
        test.len()
    );

    for (name, subset) in [
        ("train", &train),
        ("validation", &validation),
        ("test", &test),
    ] {
        if subset.is_empty() {
            return Err(DatasetError::InsufficientData(format!(
                "{} subset is empty ({} records total); need more data per class",
                name, total
            )));
        }
    }

    Ok(DatasetSplit {
        train,
        validation,
        test,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::WasteClass;
    use std::collections::HashSet;
    use std::path::PathBuf;

    fn synthetic_records(count: usize) -> Vec<ImageRecord> {
        (0..count)
            .map(|i| ImageRecord {
                path: PathBuf::from(format!("img_{:04}.jpg", i)),
                label: if i % 2 == 0 {
                    WasteClass::Biodegradable
                } else {
                    WasteClass::NonBiodegradable
                },
            })
            .collect()
    }

    fn paths(subset: &[ImageRecord]) -> Vec<PathBuf> {
        subset.iter().map(|r| r.path.clone()).collect()
    }

    #[test]
    fn test_split_sizes() {
        let split = partition(synthetic_records(100), 0.8, 42).unwrap();
        assert_eq!(split.train.len(), 80);
        assert_eq!(split.validation.len(), 10);
        assert_eq!(split.test.len(), 10);
    }

    #[test]
    fn test_determinism() {
        let first = partition(synthetic_records(97), DEFAULT_TRAIN_FRACTION, DEFAULT_SEED).unwrap();
        let second =
            partition(synthetic_records(97), DEFAULT_TRAIN_FRACTION, DEFAULT_SEED).unwrap();
        assert_eq!(paths(&first.train), paths(&second.train));
        assert_eq!(paths(&first.validation), paths(&second.validation));
        assert_eq!(paths(&first.test), paths(&second.test));
    }

    #[test]
    fn test_different_seed_changes_membership() {
        let a = partition(synthetic_records(100), 0.8, 42).unwrap();
        let b = partition(synthetic_records(100), 0.8, 43).unwrap();
        assert_ne!(paths(&a.train), paths(&b.train));
    }

    #[test]
    fn test_completeness_and_disjointness() {
        let records = synthetic_records(61);
        let all: HashSet<PathBuf> = records.iter().map(|r| r.path.clone()).collect();
        let split = partition(records, 0.8, 7).unwrap();

        let train: HashSet<PathBuf> = split.train.iter().map(|r| r.path.clone()).collect();
        let val: HashSet<PathBuf> = split.validation.iter().map(|r| r.path.clone()).collect();
        let test: HashSet<PathBuf> = split.test.iter().map(|r| r.path.clone()).collect();

        assert!(train.is_disjoint(&val));
        assert!(train.is_disjoint(&test));
        assert!(val.is_disjoint(&test));

        let union: HashSet<PathBuf> = train.union(&val).cloned().chain(test.clone()).collect();
        assert_eq!(union, all);
    }

    #[test]
    fn test_insufficient_data() {
        assert!(matches!(
            partition(synthetic_records(0), 0.8, 42),
            Err(DatasetError::InsufficientData(_))
        ));
        // Two records: remainder of one cannot fill both validation and test.
        assert!(matches!(
            partition(synthetic_records(2), 0.8, 42),
            Err(DatasetError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_invalid_fraction() {
        assert!(matches!(
            partition(synthetic_records(10), 0.0, 42),
            Err(DatasetError::InvalidFraction(_))
        ));
        assert!(matches!(
            partition(synthetic_records(10), 1.0, 42),
            Err(DatasetError::InvalidFraction(_))
        ));
    }
}
