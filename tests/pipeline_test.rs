mod common;

use std::sync::Arc;

use common::{sample_png, FailingEngine, MockEngine};
use wastesort::{ClassificationPipeline, PipelineError, WasteClass};

#[tokio::test]
async fn test_argmax_selection() {
    let engine = MockEngine::new(vec![
        (WasteClass::Biodegradable, 0.7),
        (WasteClass::NonBiodegradable, 0.3),
    ]);
    let pipeline = ClassificationPipeline::new(Arc::new(engine));

    let result = pipeline.classify(&sample_png(), "peel.png").await.unwrap();
    assert_eq!(result.class, WasteClass::Biodegradable);
    assert!((result.confidence - 0.7).abs() < 1e-6);
    assert_eq!(result.formatted_confidence(), "0.7000");
    assert_eq!(result.image_filename, "peel.png");
}

#[tokio::test]
async fn test_remote_style_selection_and_formatting() {
    // Provider ordering: non_biodegradable first with the higher score.
    let engine = MockEngine::new(vec![
        (WasteClass::NonBiodegradable, 0.55),
        (WasteClass::Biodegradable, 0.45),
    ]);
    let pipeline = ClassificationPipeline::new(Arc::new(engine));

    let result = pipeline.classify(&sample_png(), "can.png").await.unwrap();
    assert_eq!(result.class.canonical_name(), "non_biodegradable");
    assert_eq!(result.formatted_confidence(), "0.5500");
}

#[tokio::test]
async fn test_tie_break_first_seen_wins() {
    let engine = MockEngine::new(vec![
        (WasteClass::NonBiodegradable, 0.5),
        (WasteClass::Biodegradable, 0.5),
    ]);
    let pipeline = ClassificationPipeline::new(Arc::new(engine));

    let result = pipeline.classify(&sample_png(), "tie.png").await.unwrap();
    assert_eq!(result.class, WasteClass::NonBiodegradable);
}

#[tokio::test]
async fn test_prediction_determinism() {
    let engine = MockEngine::new(vec![
        (WasteClass::Biodegradable, 0.8125),
        (WasteClass::NonBiodegradable, 0.1875),
    ]);
    let pipeline = ClassificationPipeline::new(Arc::new(engine));
    let bytes = sample_png();

    let first = pipeline.classify(&bytes, "a.png").await.unwrap();
    let second = pipeline.classify(&bytes, "a.png").await.unwrap();
    assert_eq!(first.class, second.class);
    assert_eq!(first.formatted_confidence(), second.formatted_confidence());
}

#[tokio::test]
async fn test_invalid_image_is_user_error() {
    let engine = MockEngine::new(vec![(WasteClass::Biodegradable, 1.0)]);
    let pipeline = ClassificationPipeline::new(Arc::new(engine));

    let result = pipeline.classify(b"definitely not an image", "bad.png").await;
    assert!(matches!(result, Err(PipelineError::InvalidImage(_))));
}

#[tokio::test]
async fn test_engine_failure_propagates() {
    let pipeline = ClassificationPipeline::new(Arc::new(FailingEngine));

    let result = pipeline.classify(&sample_png(), "img.png").await;
    assert!(matches!(result, Err(PipelineError::Engine(_))));
}
