use std::io::Cursor;

use image::{DynamicImage, RgbImage};
use wastesort::engine::{ClassScore, Distribution, EngineError, InferenceEngine};
use wastesort::{EngineMode, WasteClass};

/// Engine returning a fixed distribution, for exercising the pipeline and
/// façade without a model.
pub struct MockEngine {
    pub scores: Vec<(WasteClass, f32)>,
}

impl MockEngine {
    pub fn new(scores: Vec<(WasteClass, f32)>) -> Self {
        Self { scores }
    }
}

#[rocket::async_trait]
impl InferenceEngine for MockEngine {
    async fn infer(&self, _image: &DynamicImage) -> Result<Distribution, EngineError> {
        Ok(Distribution(
            self.scores
                .iter()
                .map(|&(class, score)| ClassScore { class, score })
                .collect(),
        ))
    }

    fn mode(&self) -> EngineMode {
        EngineMode::Local
    }

    fn device(&self) -> &str {
        "mock"
    }

    fn model_version(&self) -> &str {
        "mock-model"
    }
}

/// Engine that always fails, for the inference-failure path.
pub struct FailingEngine;

#[rocket::async_trait]
impl InferenceEngine for FailingEngine {
    async fn infer(&self, _image: &DynamicImage) -> Result<Distribution, EngineError> {
        Err(EngineError::ProviderError("provider unreachable".to_string()))
    }

    fn mode(&self) -> EngineMode {
        EngineMode::Remote
    }

    fn device(&self) -> &str {
        "remote"
    }

    fn model_version(&self) -> &str {
        "mock-model"
    }
}

/// A small valid PNG for upload bodies.
pub fn sample_png() -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, image::Rgb([120, 200, 40])));
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, image::ImageFormat::Png)
        .expect("encoding test image");
    buffer.into_inner()
}
