//! Client context configuration
//!
//! The context carries everything a service call needs besides the request
//! itself: region, endpoint overrides, HTTP behavior and the confirm
//! preference. It is built in layers: defaults, then the YAML config file,
//! then environment variables, then command line flags.

use crate::error::{Error, Result};
use crate::http::{HttpClientConfig, RateLimiterConfig};
use crate::loader::ServiceDefinition;
use crate::types::{BackoffType, ConfirmImpact, OptionStringExt, StringMap};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use url::Url;

// ============================================================================
// Client Context
// ============================================================================

/// Per-invocation client settings, passed explicitly into every call
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientContext {
    /// AWS region used to derive endpoints
    pub region: Option<String>,

    /// Endpoint used for every service unless overridden per service
    pub endpoint_url: Option<String>,

    /// Per-service endpoint overrides, keyed by service name
    pub endpoints: StringMap,

    /// Named credentials profile
    pub profile: Option<String>,

    /// Extra headers sent with every request
    pub headers: StringMap,

    /// Operations at or above this impact ask for confirmation
    pub confirm_preference: ConfirmImpact,

    /// HTTP client configuration
    pub http: HttpConfig,
}

impl Default for ClientContext {
    fn default() -> Self {
        Self {
            region: None,
            endpoint_url: None,
            endpoints: StringMap::new(),
            profile: None,
            headers: StringMap::new(),
            confirm_preference: ConfirmImpact::High,
            http: HttpConfig::default(),
        }
    }
}

/// Values given on the command line; each one wins over every other layer
#[derive(Debug, Clone, Default)]
pub struct ContextOverrides {
    pub region: Option<String>,
    pub endpoint_url: Option<String>,
    pub profile: Option<String>,
}

impl ClientContext {
    /// Create a context for a region
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: Some(region.into()),
            ..Self::default()
        }
    }

    /// Set the global endpoint override
    #[must_use]
    pub fn with_endpoint_url(mut self, url: impl Into<String>) -> Self {
        self.endpoint_url = Some(url.into());
        self
    }

    /// Set a per-service endpoint override
    #[must_use]
    pub fn with_service_endpoint(mut self, service: impl Into<String>, url: impl Into<String>) -> Self {
        self.endpoints.insert(service.into(), url.into());
        self
    }

    /// Set the confirm preference
    #[must_use]
    pub fn with_confirm_preference(mut self, preference: ConfirmImpact) -> Self {
        self.confirm_preference = preference;
        self
    }

    /// Parse a context from YAML
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load a context from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Default config file location (`$XDG_CONFIG_HOME/awscmd/config.yaml`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("awscmd").join("config.yaml"))
    }

    /// Build the context from every layer
    ///
    /// An explicit config file must exist; the default location is used
    /// only when present.
    pub fn load(config_file: Option<&Path>, overrides: &ContextOverrides) -> Result<Self> {
        let mut ctx = match config_file {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(path) => {
                    debug!("Loading config from {}", path.display());
                    Self::from_file(path)?
                }
                None => Self::default(),
            },
        };
        ctx.apply_env(|key| std::env::var(key).ok());
        ctx.apply_overrides(overrides);
        Ok(ctx)
    }

    /// Apply environment variables through a lookup function
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).none_if_empty();

        if let Some(region) = non_empty("AWS_REGION").or_else(|| non_empty("AWS_DEFAULT_REGION")) {
            self.region = Some(region);
        }
        if let Some(url) = non_empty("AWS_ENDPOINT_URL") {
            self.endpoint_url = Some(url);
        }
        if let Some(profile) = non_empty("AWS_PROFILE") {
            self.profile = Some(profile);
        }
    }

    /// Apply command line overrides
    pub fn apply_overrides(&mut self, overrides: &ContextOverrides) {
        if let Some(region) = overrides.region.clone().none_if_empty() {
            self.region = Some(region);
        }
        if let Some(url) = overrides.endpoint_url.clone().none_if_empty() {
            self.endpoint_url = Some(url);
        }
        if let Some(profile) = overrides.profile.clone().none_if_empty() {
            self.profile = Some(profile);
        }
    }

    /// Region name for messages, empty when unset
    pub fn region_name(&self) -> &str {
        self.region.as_deref().unwrap_or_default()
    }

    /// Resolve the base endpoint for a service
    ///
    /// Order: per-service override, global endpoint, then
    /// `https://{endpoint_prefix}.{region}.amazonaws.com`.
    pub fn endpoint_for(&self, service: &ServiceDefinition) -> Result<Url> {
        let raw = match self
            .endpoints
            .get(&service.name)
            .or(self.endpoint_url.as_ref())
        {
            Some(url) => url.clone(),
            None => {
                let region = self.region.as_deref().filter(|r| !r.is_empty()).ok_or_else(|| {
                    Error::config(format!(
                        "No region configured for {}; pass --region or set AWS_REGION",
                        service.name
                    ))
                })?;
                format!("https://{}.{}.amazonaws.com", service.endpoint_prefix, region)
            }
        };
        Ok(Url::parse(&raw)?)
    }

    /// HTTP client settings for this context
    pub fn http_client_config(&self) -> HttpClientConfig {
        let mut builder = HttpClientConfig::builder()
            .timeout(Duration::from_secs(self.http.timeout_seconds))
            .max_retries(self.http.max_retries)
            .backoff(
                self.http.retry_backoff.backoff_type,
                Duration::from_millis(self.http.retry_backoff.initial_ms),
                Duration::from_millis(self.http.retry_backoff.max_ms),
            );

        builder = match RateLimiterConfig::from_rate(
            self.http.rate_limit.requests_per_second,
            self.http.rate_limit.burst,
        ) {
            Some(limit) => builder.rate_limit(limit),
            None => builder.no_rate_limit(),
        };

        if let Some(agent) = &self.http.user_agent {
            builder = builder.user_agent(agent.clone());
        }
        for (key, value) in &self.headers {
            builder = builder.header(key.clone(), value.clone());
        }
        builder.build()
    }
}

// ============================================================================
// HTTP Config
// ============================================================================

/// HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Maximum number of retries
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Retry backoff configuration
    #[serde(default)]
    pub retry_backoff: BackoffConfig,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// User agent override
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            max_retries: default_max_retries(),
            retry_backoff: BackoffConfig::default(),
            rate_limit: RateLimitConfig::default(),
            user_agent: None,
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

/// Backoff configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackoffConfig {
    /// Type of backoff
    #[serde(rename = "type", default)]
    pub backoff_type: BackoffType,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_ms")]
    pub initial_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_ms")]
    pub max_ms: u64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            backoff_type: BackoffType::Exponential,
            initial_ms: default_initial_ms(),
            max_ms: default_max_ms(),
        }
    }
}

fn default_initial_ms() -> u64 {
    100
}

fn default_max_ms() -> u64 {
    20000
}

/// Rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Requests per second limit; 0 disables limiting
    #[serde(default = "default_rps")]
    pub requests_per_second: u32,

    /// Burst size, defaults to the per-second rate
    #[serde(default)]
    pub burst: Option<u32>,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: default_rps(),
            burst: None,
        }
    }
}

fn default_rps() -> u32 {
    10
}
