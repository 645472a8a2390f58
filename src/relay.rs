use std::time::Duration;

use serde::Serialize;
use serde_json::json;

use crate::pipeline::Classification;

/// Fixed ceiling on one relay attempt.
const RELAY_TIMEOUT: Duration = Duration::from_secs(10);

/// What happened when a classification was forwarded to the backend.
///
/// A failed relay never invalidates the classification itself; the
/// outcome is attached to the response as an annotation. Making this a
/// plain value rather than an `Err` keeps the best-effort path visible in
/// the signature.
#[derive(Debug, Clone)]
pub enum RelayOutcome {
    /// Backend accepted the submission; payload is its response body.
    Accepted(serde_json::Value),
    /// Backend answered with a non-success status.
    Rejected { status: u16 },
    /// Backend was unreachable or timed out.
    Unreachable { message: String },
}

impl RelayOutcome {
    pub fn backend_accepted(&self) -> bool {
        matches!(self, RelayOutcome::Accepted(_))
    }

    /// The `backend_response` object for the predict envelope.
    pub fn annotation(&self) -> serde_json::Value {
        match self {
            RelayOutcome::Accepted(payload) => payload.clone(),
            RelayOutcome::Rejected { status } => json!({
                "backend_status": "error",
                "message": format!("Backend returned status {}", status),
            }),
            RelayOutcome::Unreachable { message } => json!({
                "backend_status": "error",
                "message": format!("Backend connection failed: {}", message),
            }),
        }
    }
}

/// The submission body the backend expects.
#[derive(Debug, Serialize)]
struct SubmissionPayload<'a> {
    prediction: &'a str,
    confidence: String,
    timestamp: String,
    image_filename: &'a str,
    model_version: &'a str,
    device: &'a str,
}

/// Forwards finalized classifications to the external backend, passing
/// the caller's authorization credential through unchanged.
pub struct BackendRelay {
    client: reqwest::Client,
    backend_url: String,
}

impl BackendRelay {
    /// Builds the relay client with the fixed timeout. A client that
    /// cannot be constructed is a startup error; the relay never runs
    /// without its timeout.
    pub fn new(backend_url: String) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(RELAY_TIMEOUT)
            .build()?;
        Ok(Self { client, backend_url })
    }

    pub fn backend_url(&self) -> &str {
        &self.backend_url
    }

    /// Sends one classification to the backend. Never fails the caller:
    /// every network or status problem is folded into the returned
    /// outcome.
    ///
    /// The caller must have presented an authorization credential before
    /// this is invoked; the façade's request guard enforces that, so a
    /// relay without credentials cannot be attempted.
    pub async fn send(
        &self,
        result: &Classification,
        device: &str,
        model_version: &str,
        authorization: &str,
    ) -> RelayOutcome {
        let payload = SubmissionPayload {
            prediction: result.class.canonical_name(),
            confidence: result.formatted_confidence(),
            timestamp: result.timestamp.to_rfc3339(),
            image_filename: &result.image_filename,
            model_version,
            device,
        };

        let response = self
            .client
            .post(&self.backend_url)
            .header(reqwest::header::AUTHORIZATION, authorization)
            .json(&payload)
            .send()
            .await;

        match response {
            Ok(response) if response.status().is_success() => {
                log::info!("Data successfully sent to backend");
                let body = response
                    .json::<serde_json::Value>()
                    .await
                    .unwrap_or(serde_json::Value::Null);
                RelayOutcome::Accepted(body)
            }
            Ok(response) => {
                let status = response.status().as_u16();
                log::warn!("Backend returned status {}", status);
                RelayOutcome::Rejected { status }
            }
            Err(e) => {
                log::warn!("Error sending to backend: {}", e);
                RelayOutcome::Unreachable { message: e.to_string() }
            }
        }
    }
}
