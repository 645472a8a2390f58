use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use image::GenericImageView;

use crate::engine::{EngineError, InferenceEngine};
use crate::taxonomy::{class_info, ClassInfo, WasteClass};

/// Errors the request pipeline surfaces to the façade. Invalid input is
/// kept distinct from engine failure so the façade can map them to 4xx
/// and 5xx respectively.
#[derive(Debug)]
pub enum PipelineError {
    /// Uploaded bytes did not decode to a raster image
    InvalidImage(String),
    /// The inference engine failed
    Engine(EngineError),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidImage(msg) => write!(f, "Invalid image: {}", msg),
            Self::Engine(err) => write!(f, "Classification failed: {}", err),
        }
    }
}

impl std::error::Error for PipelineError {}

impl From<EngineError> for PipelineError {
    fn from(err: EngineError) -> Self {
        PipelineError::Engine(err)
    }
}

/// A finalized classification decision. Constructed per inference call,
/// relayed to the backend, returned to the caller, then discarded.
#[derive(Debug, Clone)]
pub struct Classification {
    pub class: WasteClass,
    /// Maximum probability in the engine's distribution, in [0, 1].
    pub confidence: f32,
    pub image_filename: String,
    pub timestamp: DateTime<Utc>,
}

impl Classification {
    /// Confidence as the wire format's 4-decimal fixed string.
    pub fn formatted_confidence(&self) -> String {
        format!("{:.4}", self.confidence)
    }

    /// Taxonomy metadata for the decided class.
    pub fn info(&self) -> &'static ClassInfo {
        class_info(self.class)
    }
}

/// Orchestrates decode, inference, confidence extraction and taxonomy
/// enrichment for one uploaded image. Polymorphic over the engine; holds
/// no per-request state.
pub struct ClassificationPipeline {
    engine: Arc<dyn InferenceEngine>,
}

impl ClassificationPipeline {
    pub fn new(engine: Arc<dyn InferenceEngine>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &dyn InferenceEngine {
        self.engine.as_ref()
    }

    /// Classifies one uploaded image.
    ///
    /// Decodes the bytes (failure is the caller's error, not retried),
    /// submits the image to the engine, selects the arg-max entry as the
    /// prediction and its probability as the confidence.
    pub async fn classify(
        &self,
        image_bytes: &[u8],
        filename: &str,
    ) -> Result<Classification, PipelineError> {
        // The decoded image is scoped to this call and dropped on every
        // exit path.
        let image = image::load_from_memory(image_bytes)
            .map_err(|e| PipelineError::InvalidImage(e.to_string()))?;
        log::info!(
            "Image loaded: {} ({}x{})",
            filename,
            image.width(),
            image.height()
        );

        let distribution = self.engine.infer(&image).await?;
        let best = distribution.best().ok_or_else(|| {
            PipelineError::Engine(EngineError::MalformedResponse(
                "engine produced an empty distribution".to_string(),
            ))
        })?;

        let result = Classification {
            class: best.class,
            confidence: best.score,
            image_filename: filename.to_string(),
            timestamp: Utc::now(),
        };
        log::info!(
            "Prediction: {}, Confidence: {}",
            result.class,
            result.formatted_confidence()
        );
        Ok(result)
    }
}
