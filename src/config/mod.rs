use std::env;
use std::time::Duration;

/// Default esa.io endpoint that team-scoped API paths are appended to
pub const DEFAULT_BASE_URL: &str = "https://api.esa.io/v1/teams";

/// Connection settings for the esa API client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL for team-scoped requests (default: "https://api.esa.io/v1/teams")
    pub base_url: String,

    /// OAuth access token sent as a Bearer token to the esa API
    pub access_token: Option<String>,

    /// User-Agent header (default: "esa-attachments/<version>")
    pub user_agent: String,

    /// Overall per-request timeout in seconds (default: none)
    pub timeout_secs: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            access_token: None,
            user_agent: concat!("esa-attachments/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let default = Self::default();
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            base_url: var("ESA_API_BASE_URL").unwrap_or(default.base_url),

            access_token: var("ESA_ACCESS_TOKEN").or(default.access_token),

            user_agent: var("ESA_USER_AGENT").unwrap_or(default.user_agent),

            timeout_secs: var("ESA_HTTP_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .or(default.timeout_secs),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}
