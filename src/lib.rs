//! Waste image classification service.
//!
//! Classifies waste photos into two categories, biodegradable and
//! non-biodegradable, and forwards each decision to the trash2treasure
//! backend under the caller's authorization. Inference runs either
//! in-process over an ONNX model or against a hosted inference provider;
//! the request pipeline is polymorphic over the [`InferenceEngine`]
//! capability, so the two are interchangeable.
//!
//! # Basic Usage
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::Arc;
//! use wastesort::{ClassificationPipeline, RemoteEngine};
//!
//! let engine = RemoteEngine::new(
//!     "https://api-inference.huggingface.co/models/Claudineuwa/waste_classifier_Isaac".into(),
//!     std::env::var("WASTESORT_API_TOKEN")?,
//! )?;
//! let pipeline = ClassificationPipeline::new(Arc::new(engine));
//! # Ok(())
//! # }
//! ```
//!
//! The dataset side ([`dataset`]) reproduces the corpus handling the model
//! was trained with: alphabetic class-folder enumeration, label
//! harmonization to the canonical taxonomy, and a seeded 80/10/10
//! train/validation/test partition that yields identical membership on
//! every run.

pub mod config;
pub mod dataset;
pub mod engine;
pub mod model_manager;
pub mod models;
pub mod pipeline;
pub mod relay;
mod runtime;
pub mod server;
pub mod taxonomy;

pub use config::{ConfigError, EngineMode, ServiceConfig};
pub use dataset::{load_corpus, partition, DatasetError, DatasetSplit, ImageRecord, LabelMapping};
pub use engine::{
    ClassScore, Distribution, EngineError, InferenceEngine, LocalEngine, RemoteEngine,
};
pub use model_manager::{ModelError, ModelManager};
pub use models::{BuiltinModel, ModelCharacteristics, ModelInfo};
pub use pipeline::{Classification, ClassificationPipeline, PipelineError};
pub use relay::{BackendRelay, RelayOutcome};
pub use runtime::RuntimeConfig;
pub use server::AppState;
pub use taxonomy::{class_info, ClassInfo, WasteClass};

/// Initializes logging from the environment. Safe to call more than once;
/// later calls are no-ops.
pub fn init_logger() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default()).try_init();
}
