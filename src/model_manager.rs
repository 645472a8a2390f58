use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use sha2::{Digest, Sha256};
use tokio::sync::Mutex;

use crate::models::BuiltinModel;

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Model not downloaded: {0}")]
    NotDownloaded(String),
    #[error("Download error: {0}")]
    DownloadError(#[from] reqwest::Error),
    #[error("Download failed with status {0}")]
    DownloadStatus(reqwest::StatusCode),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Hash mismatch: expected {expected}, got {actual}")]
    HashMismatch { expected: String, actual: String },
}

/// Resolves, downloads and verifies local model artifacts.
///
/// The cache location is resolved in order: `WASTESORT_CACHE` environment
/// variable, platform cache directory, `~/.cache`, system temp directory.
#[derive(Clone)]
pub struct ModelManager {
    models_dir: PathBuf,
    download_lock: Arc<Mutex<()>>,
}

impl ModelManager {
    pub fn new_default() -> io::Result<Self> {
        Self::new(Self::get_default_models_dir())
    }

    pub fn get_default_models_dir() -> PathBuf {
        if let Ok(path) = env::var("WASTESORT_CACHE") {
            return PathBuf::from(path).join("models");
        }
        if let Some(cache_dir) = dirs::cache_dir() {
            return cache_dir.join("wastesort").join("models");
        }
        if let Some(home_dir) = dirs::home_dir() {
            return home_dir.join(".cache").join("wastesort").join("models");
        }
        env::temp_dir().join("wastesort").join("models")
    }

    pub fn new<P: AsRef<Path>>(models_dir: P) -> io::Result<Self> {
        let models_dir = models_dir.as_ref().to_path_buf();
        fs::create_dir_all(&models_dir)?;
        Ok(Self {
            models_dir,
            download_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn get_model_path(&self, model: BuiltinModel) -> PathBuf {
        let info = model.get_model_info();
        self.models_dir.join(info.name).join("model.onnx")
    }

    pub fn is_model_downloaded(&self, model: BuiltinModel) -> bool {
        self.get_model_path(model).exists()
    }

    pub async fn download_model(&self, model: BuiltinModel) -> Result<(), ModelError> {
        let info = model.get_model_info();
        let _lock = self.download_lock.lock().await;

        let model_path = self.get_model_path(model);
        if model_path.exists() {
            log::info!("Model file exists at {:?}, verifying...", model_path);
            if self.verify_file(&model_path, info.sha256)? {
                log::info!("Existing model file verified successfully");
                return Ok(());
            }
            log::warn!("Model file verification failed, redownloading");
        }

        if let Err(e) = self.fetch_model(&info.model_url, &model_path, info.sha256).await {
            log::error!("Failed to setup model file: {}", e);
            let _ = self.remove_download(model);
            return Err(e);
        }
        log::info!("Model ready to use");
        Ok(())
    }

    /// Returns true when the file matches the expected hash, or when no
    /// hash is pinned for this artifact.
    fn verify_file(&self, path: &Path, expected_hash: Option<&str>) -> Result<bool, ModelError> {
        let Some(expected) = expected_hash else {
            log::warn!("No pinned hash for {:?}; skipping verification", path);
            return Ok(true);
        };
        let bytes = fs::read(path)?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let hash = format!("{:x}", hasher.finalize());
        log::debug!("Calculated hash {} (expected {})", hash, expected);
        Ok(hash == expected)
    }

    async fn fetch_model(
        &self,
        url: &str,
        path: &Path,
        expected_hash: Option<&str>,
    ) -> Result<(), ModelError> {
        log::info!("Downloading model from {} to {:?}", url, path);
        let response = reqwest::get(url).await?;
        if !response.status().is_success() {
            return Err(ModelError::DownloadStatus(response.status()));
        }
        let bytes = response.bytes().await?;
        log::info!("Downloaded {} bytes", bytes.len());

        if let Some(expected) = expected_hash {
            let mut hasher = Sha256::new();
            hasher.update(&bytes);
            let hash = format!("{:x}", hasher.finalize());
            if hash != expected {
                log::error!("Model hash mismatch: expected {}, got {}", expected, hash);
                return Err(ModelError::HashMismatch {
                    expected: expected.to_string(),
                    actual: hash,
                });
            }
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, bytes)?;
        log::info!("Model file downloaded successfully");
        Ok(())
    }

    pub fn remove_download(&self, model: BuiltinModel) -> Result<(), ModelError> {
        let model_path = self.get_model_path(model);
        if model_path.exists() {
            fs::remove_file(&model_path)?;
        }
        Ok(())
    }

    /// Downloads the model if it is missing; verifies and re-downloads a
    /// corrupted artifact when a hash is pinned.
    pub async fn ensure_model_downloaded(&self, model: BuiltinModel) -> Result<(), ModelError> {
        if !self.is_model_downloaded(model) {
            log::info!("Model not found, downloading...");
            return self.download_model(model).await;
        }
        let info = model.get_model_info();
        if !self.verify_file(&self.get_model_path(model), info.sha256)? {
            log::info!("Model verification failed, re-downloading...");
            self.remove_download(model)?;
            return self.download_model(model).await;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_path_layout() {
        let manager = ModelManager::new("/tmp/wastesort-test-cache/models").unwrap();
        let path = manager.get_model_path(BuiltinModel::WasteVit);
        assert!(path.to_str().unwrap().ends_with("waste-vit/model.onnx"));
    }

    #[test]
    fn test_default_models_dir() {
        env::set_var("WASTESORT_CACHE", "/tmp/wastesort-test-cache");
        let path = ModelManager::get_default_models_dir();
        assert!(path.to_str().unwrap().contains("/tmp/wastesort-test-cache/models"));
        env::remove_var("WASTESORT_CACHE");

        let path = ModelManager::get_default_models_dir();
        assert!(path.to_str().unwrap().contains("wastesort"));
    }

    #[test]
    fn test_unpinned_hash_skips_verification() {
        let dir = "/tmp/wastesort-test-cache/verify";
        let manager = ModelManager::new(dir).unwrap();
        let file = PathBuf::from(dir).join("dummy.onnx");
        fs::write(&file, b"not a real model").unwrap();
        assert!(manager.verify_file(&file, None).unwrap());
        assert!(!manager
            .verify_file(&file, Some("0000000000000000000000000000000000000000000000000000000000000000"))
            .unwrap());
        let _ = fs::remove_file(&file);
    }
}
