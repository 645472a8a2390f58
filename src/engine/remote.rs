use std::io::Cursor;
use std::time::Duration;

use image::DynamicImage;
use serde::Deserialize;

use crate::config::EngineMode;
use crate::taxonomy::WasteClass;

use super::error::EngineError;
use super::{ClassScore, Distribution, InferenceEngine};

/// Ceiling on a single provider call; a call that exceeds it is an
/// inference failure, not retried here.
const PROVIDER_TIMEOUT: Duration = Duration::from_secs(30);

/// One scored label as returned by the hosted inference provider.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ProviderScore {
    pub label: String,
    pub score: f32,
}

/// Inference over a hosted HTTP provider, authenticated with a bearer
/// credential.
pub struct RemoteEngine {
    client: reqwest::Client,
    provider_url: String,
    token: String,
    model_version: String,
}

impl RemoteEngine {
    pub fn new(provider_url: String, token: String) -> Result<Self, EngineError> {
        let client = reqwest::Client::builder()
            .timeout(PROVIDER_TIMEOUT)
            .build()
            .map_err(|e| EngineError::ProviderError(format!("Failed to build HTTP client: {}", e)))?;

        // Status endpoints report the model segment of the provider URL.
        let model_version = provider_url
            .rsplit('/')
            .next()
            .unwrap_or("unknown")
            .to_string();

        Ok(Self {
            client,
            provider_url,
            token,
            model_version,
        })
    }

    fn encode_jpeg(image: &DynamicImage) -> Result<Vec<u8>, EngineError> {
        let mut buffer = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(image.to_rgb8())
            .write_to(&mut buffer, image::ImageFormat::Jpeg)
            .map_err(|e| EngineError::PreprocessError(format!("Failed to encode image: {}", e)))?;
        Ok(buffer.into_inner())
    }

    fn resolve(scores: Vec<ProviderScore>) -> Result<Distribution, EngineError> {
        let resolved = scores
            .into_iter()
            .map(|entry| {
                WasteClass::from_label(&entry.label)
                    .map(|class| ClassScore { class, score: entry.score })
                    .ok_or(EngineError::UnknownLabel(entry.label))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Distribution(resolved))
    }
}

/// Parses the provider's response body into scored labels.
///
/// The provider returns either a flat array of `{label, score}` objects or
/// that array wrapped in an outer single-element array; both are accepted.
/// An empty or otherwise unparseable body is a `MalformedResponse`.
pub fn parse_provider_response(body: &str) -> Result<Vec<ProviderScore>, EngineError> {
    if body.trim().is_empty() {
        return Err(EngineError::MalformedResponse("empty body".to_string()));
    }

    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| EngineError::MalformedResponse(e.to_string()))?;

    // Unwrap the batch dimension if present.
    let entries = match value {
        serde_json::Value::Array(ref items)
            if items.first().map_or(false, |v| v.is_array()) =>
        {
            items[0].clone()
        }
        other => other,
    };

    let scores: Vec<ProviderScore> = serde_json::from_value(entries)
        .map_err(|e| EngineError::MalformedResponse(e.to_string()))?;

    if scores.is_empty() {
        return Err(EngineError::MalformedResponse("no scored labels".to_string()));
    }
    Ok(scores)
}

#[rocket::async_trait]
impl InferenceEngine for RemoteEngine {
    async fn infer(&self, image: &DynamicImage) -> Result<Distribution, EngineError> {
        let payload = Self::encode_jpeg(image)?;

        let response = self
            .client
            .post(&self.provider_url)
            .bearer_auth(&self.token)
            .header(reqwest::header::CONTENT_TYPE, "image/jpeg")
            .body(payload)
            .send()
            .await
            .map_err(|e| EngineError::ProviderError(format!("Provider request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!("Provider returned status {}: {}", status, body);
            return Err(EngineError::ProviderError(format!(
                "Provider returned status {}",
                status
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| EngineError::ProviderError(format!("Failed to read provider body: {}", e)))?;

        let scores = parse_provider_response(&body)?;
        Self::resolve(scores)
    }

    fn mode(&self) -> EngineMode {
        EngineMode::Remote
    }

    fn device(&self) -> &str {
        "remote"
    }

    fn model_version(&self) -> &str {
        &self.model_version
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flat_array() {
        let body = r#"[{"label":"non_biodegradable","score":0.55},{"label":"biodegradable","score":0.45}]"#;
        let scores = parse_provider_response(body).unwrap();
        assert_eq!(scores.len(), 2);
        assert_eq!(scores[0].label, "non_biodegradable");
        assert!((scores[0].score - 0.55).abs() < 1e-6);
    }

    #[test]
    fn test_parse_batched_array() {
        let body = r#"[[{"label":"biodegradable","score":0.9},{"label":"non_biodegradable","score":0.1}]]"#;
        let scores = parse_provider_response(body).unwrap();
        assert_eq!(scores.len(), 2);
        assert_eq!(scores[0].label, "biodegradable");
    }

    #[test]
    fn test_parse_rejects_empty_and_malformed() {
        assert!(matches!(
            parse_provider_response(""),
            Err(EngineError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_provider_response("not json"),
            Err(EngineError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_provider_response("[]"),
            Err(EngineError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_provider_response(r#"{"error":"loading"}"#),
            Err(EngineError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_resolve_unknown_label() {
        let scores = vec![ProviderScore { label: "glass".to_string(), score: 0.8 }];
        assert!(matches!(
            RemoteEngine::resolve(scores),
            Err(EngineError::UnknownLabel(_))
        ));
    }

    #[test]
    fn test_resolve_keeps_received_order() {
        let scores = vec![
            ProviderScore { label: "non_biodegradable".to_string(), score: 0.55 },
            ProviderScore { label: "biodegradable".to_string(), score: 0.45 },
        ];
        let dist = RemoteEngine::resolve(scores).unwrap();
        let best = dist.best().unwrap();
        assert_eq!(best.class, WasteClass::NonBiodegradable);
        assert!((best.score - 0.55).abs() < 1e-6);
    }
}
