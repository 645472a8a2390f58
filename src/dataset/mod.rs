//! Training-side dataset handling: loading a class-per-folder image
//! corpus, harmonizing folder-derived labels to the canonical taxonomy,
//! and partitioning the corpus into reproducible train/validation/test
//! subsets.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::taxonomy::WasteClass;

mod harmonize;
mod partition;

pub use harmonize::LabelMapping;
pub use partition::{partition, DatasetSplit, DEFAULT_SEED, DEFAULT_TRAIN_FRACTION};

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Unrecognized label taxonomy: observed folder order {0:?}")]
    UnrecognizedTaxonomy(Vec<String>),
    #[error("Insufficient data: {0}")]
    InsufficientData(String),
    #[error("Train fraction must be in (0, 1), got {0}")]
    InvalidFraction(f64),
    #[error("No class folders found in {0}")]
    EmptyCorpus(PathBuf),
}

/// One labeled image in the corpus, with its label already harmonized to
/// the canonical taxonomy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRecord {
    pub path: PathBuf,
    pub label: WasteClass,
}

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "webp"];

fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Loads a corpus from a directory with one subdirectory per class.
///
/// Subdirectories are enumerated alphabetically, matching the imagefolder
/// convention the model was trained with, and the resulting raw label
/// indices are harmonized to the canonical taxonomy before any record is
/// returned. Files within a class are sorted by name so the corpus
/// contents are a pure function of the directory tree.
pub fn load_corpus<P: AsRef<Path>>(data_dir: P) -> Result<Vec<ImageRecord>, DatasetError> {
    let data_dir = data_dir.as_ref();

    let mut class_dirs: Vec<(String, PathBuf)> = fs::read_dir(data_dir)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| {
            entry
                .file_name()
                .to_str()
                .map(|name| (name.to_string(), entry.path()))
        })
        .collect();
    class_dirs.sort_by(|a, b| a.0.cmp(&b.0));

    if class_dirs.is_empty() {
        return Err(DatasetError::EmptyCorpus(data_dir.to_path_buf()));
    }

    let observed_order: Vec<String> = class_dirs.iter().map(|(name, _)| name.clone()).collect();
    let mapping = LabelMapping::from_observed(&observed_order)?;
    log::info!(
        "Observed folder order {:?}, harmonization: {}",
        observed_order,
        if mapping.is_swap() { "swap" } else { "identity" }
    );

    let mut records = Vec::new();
    for (raw_label, (name, dir)) in class_dirs.iter().enumerate() {
        let label = mapping.apply(raw_label).ok_or_else(|| {
            DatasetError::UnrecognizedTaxonomy(observed_order.clone())
        })?;

        let mut files: Vec<PathBuf> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| is_image_file(path))
            .collect();
        files.sort();

        log::info!("Class folder '{}' -> {} ({} images)", name, label, files.len());
        records.extend(files.into_iter().map(|path| ImageRecord { path, label }));
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_corpus(dir: &Path, folders: &[(&str, usize)]) {
        for (name, count) in folders {
            let class_dir = dir.join(name);
            fs::create_dir_all(&class_dir).unwrap();
            for i in 0..*count {
                fs::write(class_dir.join(format!("img_{:03}.jpg", i)), b"stub").unwrap();
            }
        }
    }

    #[test]
    fn test_load_corpus_alphabetic_or_folders() {
        let dir = std::env::temp_dir().join("wastesort-corpus-or");
        let _ = fs::remove_dir_all(&dir);
        make_corpus(&dir, &[("O", 3), ("R", 2)]);

        let records = load_corpus(&dir).unwrap();
        assert_eq!(records.len(), 5);
        // O sorts before R: organic folder maps to biodegradable.
        assert_eq!(
            records.iter().filter(|r| r.label == WasteClass::Biodegradable).count(),
            3
        );
        assert_eq!(
            records.iter().filter(|r| r.label == WasteClass::NonBiodegradable).count(),
            2
        );
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_load_corpus_deterministic() {
        let dir = std::env::temp_dir().join("wastesort-corpus-det");
        let _ = fs::remove_dir_all(&dir);
        make_corpus(&dir, &[("biodegradable", 4), ("non_biodegradable", 4)]);

        let first = load_corpus(&dir).unwrap();
        let second = load_corpus(&dir).unwrap();
        assert_eq!(first, second);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_load_corpus_rejects_unknown_folders() {
        let dir = std::env::temp_dir().join("wastesort-corpus-bad");
        let _ = fs::remove_dir_all(&dir);
        make_corpus(&dir, &[("glass", 1), ("metal", 1)]);

        assert!(matches!(
            load_corpus(&dir),
            Err(DatasetError::UnrecognizedTaxonomy(_))
        ));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_ignores_non_image_files() {
        let dir = std::env::temp_dir().join("wastesort-corpus-mixed");
        let _ = fs::remove_dir_all(&dir);
        make_corpus(&dir, &[("O", 2), ("R", 2)]);
        fs::write(dir.join("O").join("notes.txt"), b"not an image").unwrap();

        let records = load_corpus(&dir).unwrap();
        assert_eq!(records.len(), 4);
        let _ = fs::remove_dir_all(&dir);
    }
}
