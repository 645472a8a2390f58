use ort::Error as OrtError;
use std::fmt;

/// Errors raised by an inference engine. Inference failure is always
/// surfaced as one of these; it is never substituted with a default class.
#[derive(Debug)]
pub enum EngineError {
    /// Image could not be prepared for the model
    PreprocessError(String),
    /// Error occurred while loading or running the local model
    ModelError(String),
    /// Remote provider was unreachable or returned a non-success status
    ProviderError(String),
    /// Remote provider returned an empty or unparseable body
    MalformedResponse(String),
    /// Engine produced a label outside the taxonomy
    UnknownLabel(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PreprocessError(msg) => write!(f, "Preprocess error: {}", msg),
            Self::ModelError(msg) => write!(f, "Model error: {}", msg),
            Self::ProviderError(msg) => write!(f, "Provider error: {}", msg),
            Self::MalformedResponse(msg) => write!(f, "Malformed provider response: {}", msg),
            Self::UnknownLabel(label) => write!(f, "Unknown label: {}", label),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<OrtError> for EngineError {
    fn from(err: OrtError) -> Self {
        EngineError::ModelError(err.to_string())
    }
}
