use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use image::DynamicImage;
use ort::session::Session;
use ort::value::Tensor;

use crate::config::EngineMode;
use crate::model_manager::ModelManager;
use crate::models::{BuiltinModel, ModelCharacteristics};
use crate::runtime::{create_session_builder, RuntimeConfig};
use crate::taxonomy::WasteClass;

use super::error::EngineError;
use super::preprocess::{image_to_tensor, softmax};
use super::{ClassScore, Distribution, InferenceEngine};

/// In-process inference over the ONNX waste classifier.
///
/// The session is read-only after construction and shared across
/// concurrent requests without locking.
pub struct LocalEngine {
    session: Arc<Session>,
    characteristics: ModelCharacteristics,
    model_version: String,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<LocalEngine>();
    }
};

impl LocalEngine {
    /// Loads the builtin waste model, downloading it into the cache first
    /// if necessary.
    pub async fn builtin(config: &RuntimeConfig) -> Result<Self, EngineError> {
        let model = BuiltinModel::WasteVit;
        let manager = ModelManager::new_default()
            .map_err(|e| EngineError::ModelError(format!("Failed to create model manager: {}", e)))?;
        manager
            .ensure_model_downloaded(model)
            .await
            .map_err(|e| EngineError::ModelError(e.to_string()))?;

        Self::from_file(
            manager.get_model_path(model),
            model.characteristics(),
            model.get_model_info().name.to_string(),
            config,
        )
    }

    /// Loads a model from an explicit ONNX file path.
    pub fn from_file<P: AsRef<Path>>(
        model_path: P,
        characteristics: ModelCharacteristics,
        model_version: String,
        config: &RuntimeConfig,
    ) -> Result<Self, EngineError> {
        let model_path = model_path.as_ref();
        if !model_path.exists() {
            return Err(EngineError::ModelError(format!(
                "Model file not found: {}",
                model_path.display()
            )));
        }

        let session = create_session_builder(config)?.commit_from_file(model_path)?;
        Self::validate_model(&session)?;
        log::info!("Model loaded from {}", model_path.display());

        Ok(Self {
            session: Arc::new(session),
            characteristics,
            model_version,
        })
    }

    /// The model must take one image tensor and emit one logits tensor.
    fn validate_model(session: &Session) -> Result<(), EngineError> {
        if session.inputs.is_empty() {
            return Err(EngineError::ModelError(
                "Model must have an image input (pixel_values)".to_string(),
            ));
        }
        if session.outputs.is_empty() {
            return Err(EngineError::ModelError(
                "Model must have a logits output".to_string(),
            ));
        }
        Ok(())
    }

    fn run_model(&self, image: &DynamicImage) -> Result<Vec<f32>, EngineError> {
        // Tensor and decoded buffers are scoped to this call; they drop on
        // every exit path.
        let input_array = image_to_tensor(image, self.characteristics.input_size);
        let input_dyn = input_array.into_dyn();
        let pixel_values = input_dyn.as_standard_layout();

        let mut input_tensors = HashMap::new();
        input_tensors.insert(
            "pixel_values",
            Tensor::from_array(&pixel_values)
                .map_err(|e| EngineError::ModelError(format!("Failed to create input tensor: {}", e)))?,
        );

        let outputs = self
            .session
            .run(input_tensors)
            .map_err(|e| EngineError::ModelError(format!("Failed to run model: {}", e)))?;
        let logits = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| EngineError::ModelError(format!("Failed to extract logits: {}", e)))?;

        let logits: Vec<f32> = logits.iter().cloned().collect();
        if logits.len() != self.characteristics.num_classes {
            return Err(EngineError::ModelError(format!(
                "Model emitted {} logits, expected {}",
                logits.len(),
                self.characteristics.num_classes
            )));
        }
        Ok(logits)
    }
}

#[rocket::async_trait]
impl InferenceEngine for LocalEngine {
    async fn infer(&self, image: &DynamicImage) -> Result<Distribution, EngineError> {
        let logits = self.run_model(image)?;
        let probabilities = softmax(&logits);

        let scores = probabilities
            .into_iter()
            .enumerate()
            .map(|(index, score)| {
                WasteClass::from_index(index)
                    .map(|class| ClassScore { class, score })
                    .ok_or_else(|| EngineError::UnknownLabel(format!("class index {}", index)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Distribution(scores))
    }

    fn mode(&self) -> EngineMode {
        EngineMode::Local
    }

    fn device(&self) -> &str {
        "cpu"
    }

    fn model_version(&self) -> &str {
        &self.model_version
    }
}
