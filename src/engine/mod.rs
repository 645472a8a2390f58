//! The inference capability: mapping a decoded image to a probability
//! distribution over the waste taxonomy. Two interchangeable variants
//! implement it, an in-process ONNX model and a hosted HTTP provider.

use image::DynamicImage;

use crate::config::EngineMode;
use crate::taxonomy::WasteClass;

mod error;
mod local;
mod preprocess;
mod remote;

pub use error::EngineError;
pub use local::LocalEngine;
pub use preprocess::image_to_tensor;
pub use remote::{parse_provider_response, ProviderScore, RemoteEngine};

/// One scored taxonomy entry in an engine's output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassScore {
    pub class: WasteClass,
    pub score: f32,
}

/// An engine's probability distribution over the taxonomy, kept in the
/// order the engine produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Distribution(pub Vec<ClassScore>);

impl Distribution {
    /// Selects the highest-scored entry. Entries are scanned in received
    /// order with a strict comparison, so on an exact score tie the
    /// first-seen entry wins.
    pub fn best(&self) -> Option<ClassScore> {
        let mut best: Option<ClassScore> = None;
        for &entry in &self.0 {
            match best {
                Some(current) if entry.score <= current.score => {}
                _ => best = Some(entry),
            }
        }
        best
    }
}

/// The inference capability the request pipeline depends on.
///
/// Implementations are shared read-only across concurrent requests, hence
/// `Send + Sync`.
#[rocket::async_trait]
pub trait InferenceEngine: Send + Sync {
    /// Runs inference on a decoded image and returns the scored taxonomy
    /// distribution. Any failure is an `EngineError`; no default class is
    /// ever produced.
    async fn infer(&self, image: &DynamicImage) -> Result<Distribution, EngineError>;

    fn mode(&self) -> EngineMode;

    /// Compute device the engine runs on, for status reporting.
    fn device(&self) -> &str;

    /// Identifier of the model the engine serves.
    fn model_version(&self) -> &str;
}
