use std::env;

/// Which inference engine variant the service runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineMode {
    /// In-process ONNX model.
    Local,
    /// Hosted inference provider over HTTP.
    Remote,
}

impl EngineMode {
    pub fn as_str(self) -> &'static str {
        match self {
            EngineMode::Local => "local",
            EngineMode::Remote => "remote",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    MissingVar(&'static str),
    #[error("Invalid value for {var}: {value}")]
    InvalidVar { var: &'static str, value: String },
}

const DEFAULT_BACKEND_URL: &str =
    "https://trash2treasure-backend.onrender.com/wasteSubmission";
const DEFAULT_PORT: u16 = 10000;
const DEFAULT_PROVIDER_URL: &str =
    "https://api-inference.huggingface.co/models/Claudineuwa/waste_classifier_Isaac";

/// Environment-provided service configuration, validated once at startup.
/// The process must not serve traffic half-configured: a missing provider
/// credential in remote mode is a startup error, not a per-request one.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub engine_mode: EngineMode,
    pub port: u16,
    pub backend_url: String,
    pub provider_url: String,
    /// Bearer credential for the remote inference provider. Required in
    /// remote mode, unused in local mode.
    pub provider_token: Option<String>,
}

impl ServiceConfig {
    /// Reads configuration from the environment for the given engine mode.
    pub fn from_env(engine_mode: EngineMode) -> Result<Self, ConfigError> {
        let port = match env::var("PORT") {
            Ok(raw) => raw.parse::<u16>().map_err(|_| ConfigError::InvalidVar {
                var: "PORT",
                value: raw,
            })?,
            Err(_) => DEFAULT_PORT,
        };

        let backend_url =
            env::var("BACKEND_URL").unwrap_or_else(|_| DEFAULT_BACKEND_URL.to_string());
        let provider_url =
            env::var("PROVIDER_URL").unwrap_or_else(|_| DEFAULT_PROVIDER_URL.to_string());

        let provider_token = env::var("WASTESORT_API_TOKEN").ok().filter(|t| !t.is_empty());
        if engine_mode == EngineMode::Remote && provider_token.is_none() {
            return Err(ConfigError::MissingVar("WASTESORT_API_TOKEN"));
        }

        Ok(Self {
            engine_mode,
            port,
            backend_url,
            provider_url,
            provider_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_mode_needs_no_token() {
        env::remove_var("WASTESORT_API_TOKEN");
        let config = ServiceConfig::from_env(EngineMode::Local).unwrap();
        assert_eq!(config.engine_mode, EngineMode::Local);
        assert_eq!(config.backend_url, DEFAULT_BACKEND_URL);
        assert!(config.provider_token.is_none());
    }

    #[test]
    fn test_remote_mode_requires_token() {
        env::remove_var("WASTESORT_API_TOKEN");
        assert!(matches!(
            ServiceConfig::from_env(EngineMode::Remote),
            Err(ConfigError::MissingVar("WASTESORT_API_TOKEN"))
        ));
    }
}
