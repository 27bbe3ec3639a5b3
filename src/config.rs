use std::{env, path::PathBuf, time::Duration};
use tracing::{info, warn};

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_SESSION_PATH: &str = "data/session.json";

/// Where the backend lives and how the client talks to it.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub session_path: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            session_path: PathBuf::from(DEFAULT_SESSION_PATH),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Reads `DASHBOARD_API_URL`, `DASHBOARD_HTTP_TIMEOUT_SECS` and
    /// `DASHBOARD_SESSION_PATH`. Every fallback to a default is logged.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let base_url = match lookup("DASHBOARD_API_URL").filter(|v| !v.trim().is_empty()) {
            Some(url) => url.trim().to_string(),
            None => {
                info!("DASHBOARD_API_URL not set, using default backend {DEFAULT_API_URL}");
                DEFAULT_API_URL.to_string()
            }
        };

        let timeout_secs = match lookup("DASHBOARD_HTTP_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().unwrap_or_else(|err| {
                warn!(
                    "invalid DASHBOARD_HTTP_TIMEOUT_SECS {raw:?}: {err}, \
                     using {DEFAULT_TIMEOUT_SECS}"
                );
                DEFAULT_TIMEOUT_SECS
            }),
            None => DEFAULT_TIMEOUT_SECS,
        };

        let session_path = lookup("DASHBOARD_SESSION_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_PATH));

        Self {
            base_url,
            timeout: Duration::from_secs(timeout_secs),
            session_path,
        }
    }
}
