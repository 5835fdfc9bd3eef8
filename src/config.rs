//! Configuration types.

use std::path::PathBuf;
use std::time::Duration;

/// Wizard configuration.
#[derive(Debug, Clone)]
pub struct WizardConfig {
    /// Base URL of the lead/account API (no trailing slash).
    pub api_base: String,
    /// Per-request timeout for submission calls.
    pub request_timeout: Duration,
    /// Path of the durable session slot.
    pub session_path: PathBuf,
    /// Age after which a saved session is treated as absent.
    pub session_ttl: Duration,
    /// Serve the mocked backend in-process (demo mode).
    pub demo_mode: bool,
    /// Port the mocked backend listens on when demo mode is enabled.
    pub mock_port: u16,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            api_base: "http://127.0.0.1:8777/api".to_string(),
            request_timeout: Duration::from_secs(10),
            session_path: PathBuf::from("./data/ume_loans_session.json"),
            session_ttl: Duration::from_secs(24 * 60 * 60),
            demo_mode: true,
            mock_port: 8777,
        }
    }
}

impl WizardConfig {
    /// Build a config from environment variables, falling back to defaults.
    ///
    /// Recognized variables: `UME_LOANS_API_BASE`, `UME_LOANS_SESSION_PATH`,
    /// `UME_LOANS_SESSION_TTL_HOURS`, `UME_LOANS_DEMO`, `UME_LOANS_MOCK_PORT`.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let api_base = std::env::var("UME_LOANS_API_BASE")
            .map(|s| s.trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_base);

        let session_path = std::env::var("UME_LOANS_SESSION_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.session_path);

        let session_ttl = std::env::var("UME_LOANS_SESSION_TTL_HOURS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(|hours| Duration::from_secs(hours * 60 * 60))
            .unwrap_or(defaults.session_ttl);

        let demo_mode = std::env::var("UME_LOANS_DEMO")
            .map(|s| s != "0" && !s.eq_ignore_ascii_case("false"))
            .unwrap_or(defaults.demo_mode);

        let mock_port = std::env::var("UME_LOANS_MOCK_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.mock_port);

        Self {
            api_base,
            request_timeout: defaults.request_timeout,
            session_path,
            session_ttl,
            demo_mode,
            mock_port,
        }
    }
}
