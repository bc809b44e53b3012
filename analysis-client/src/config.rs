//! Client configuration

use crate::{Error, Result, DEFAULT_BASE_URL, DEFAULT_REQUEST_TIMEOUT_SECONDS};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Scoring service connection settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientConfig {
    /// Base URL, without trailing slash
    pub base_url: String,

    /// Per-request timeout (seconds)
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECONDS,
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by `ANALYSIS_BASE_URL` / `ANALYSIS_TIMEOUT_SECS`,
    /// after loading `.env` if present
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let cfg: ClientConfig = config::Config::builder()
            .set_default("base_url", DEFAULT_BASE_URL)?
            .set_default("timeout_secs", DEFAULT_REQUEST_TIMEOUT_SECONDS as i64)?
            .add_source(config::Environment::with_prefix("ANALYSIS").try_parsing(true))
            .build()?
            .try_deserialize()?;

        debug!("Analysis client config: {:?}", cfg);
        cfg.validated()
    }

    /// Normalizes the base URL and rejects unusable values
    pub fn validated(mut self) -> Result<Self> {
        self.base_url = self.base_url.trim().trim_end_matches('/').to_string();

        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "base_url must be an http(s) URL, got {:?}",
                self.base_url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(Error::Config("timeout_secs must be positive".to_string()));
        }
        Ok(self)
    }

    /// Full URL for an endpoint path such as `/predict`
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = ClientConfig::default();
        assert_eq!(cfg.base_url, "http://localhost:8000");
        assert_eq!(cfg.timeout_secs, 30);
        assert_eq!(cfg.endpoint("/predict"), "http://localhost:8000/predict");
    }

    #[test]
    fn test_validation_trims_trailing_slash() {
        let cfg = ClientConfig {
            base_url: " https://scoring.internal/ ".to_string(),
            timeout_secs: 5,
        }
        .validated()
        .unwrap();
        assert_eq!(cfg.endpoint("/explain"), "https://scoring.internal/explain");
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let bad_scheme = ClientConfig {
            base_url: "localhost:8000".to_string(),
            timeout_secs: 5,
        };
        assert!(matches!(bad_scheme.validated(), Err(Error::Config(_))));

        let zero_timeout = ClientConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert!(zero_timeout.validated().is_err());
    }
}
