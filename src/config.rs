//! Configuration for provider backends and the dispatcher

use std::fmt;
use std::path::Path;
use std::time::Duration;
use serde::{Deserialize, Serialize};
use log::{debug, info, warn};

/// Environment variable overriding the request timeout
pub const TIMEOUT_ENV: &str = "AIDE_TIMEOUT_SECS";

/// Default per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

fn default_timeout_secs() -> u64
{   DEFAULT_TIMEOUT_SECS
}

/// Secret used to authenticate against a provider.
/// `Debug` never prints the key.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials
{   pub api_key: String
}

impl Credentials
{   pub fn new(api_key: impl Into<String>) -> Self
    {   Credentials
        {   api_key: api_key.into()
        }
    }

    /// `Bearer <token>` header value
    pub fn bearer(&self) -> String
    {   format!("Bearer {}", self.api_key.trim())
    }
}

impl fmt::Debug for Credentials
{   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {   f.debug_struct("Credentials")
          .field("api_key", &"<redacted>")
          .finish()
    }
}

/// Provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig
{   /// Which provider this entry configures
    pub provider: crate::Provider
  , /// API key, if given inline
    #[serde(default)]
    pub api_key: Option<String>
  , /// Environment variable holding the key, when `api_key` is unset
    #[serde(default)]
    pub api_key_env: Option<String>
  , /// Full endpoint URL (if custom)
    #[serde(default)]
    pub endpoint: Option<String>
  , /// Request timeout in seconds, overriding the global one
    #[serde(default)]
    pub timeout_secs: Option<u64>
}

impl ProviderConfig
{   pub fn new(
      provider: crate::Provider
    , api_key: impl Into<String>
    ) -> Self
    {   ProviderConfig
        {   provider
          , api_key: Some(api_key.into())
          , api_key_env: None
          , endpoint: None
          , timeout_secs: None
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self
    {   self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self
    {   self.timeout_secs = Some(secs);
        self
    }

    /// Resolve credentials: inline key first, then the named
    /// environment variable, then the provider's default variable
    pub fn credentials(&self)
      -> Result<Credentials, crate::error::Error>
    {   if let Some(key) = self.api_key.as_ref()
          .filter(|k| !k.trim().is_empty())
        {   return Ok(Credentials::new(key.clone()));
        }

        let var = self.api_key_env.as_deref()
          .unwrap_or(self.provider.api_key_env());
        match std::env::var(var)
        {   Ok(key) if !key.trim().is_empty() => {
              debug!("Using {} for {}", var, self.provider);
              Ok(Credentials::new(key))
            }
          , _ => Err(crate::error::Error::MissingApiKey(
              format!("{} (set {})", self.provider, var)
            ))
        }
    }

    /// Configured endpoint, or the provider's public one
    pub fn endpoint(&self) -> String
    {   self.endpoint.clone()
          .unwrap_or_else(||
            self.provider.default_endpoint().to_string()
          )
    }
}

/// Dispatcher configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AideConfig
{   /// Provider configurations
    #[serde(default)]
    pub providers: Vec<ProviderConfig>
  , /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64
  , /// When set, replaces every caller-supplied system prompt
    #[serde(default)]
    pub system_override: Option<String>
}

impl Default for AideConfig
{   fn default() -> Self
    {   AideConfig
        {   providers: vec![]
          , timeout_secs: DEFAULT_TIMEOUT_SECS
          , system_override: None
        }
    }
}

impl AideConfig
{   /// Configure every provider whose API key variable is set
    pub fn from_env() -> Self
    {   let mut config = AideConfig::default();

        for provider in crate::Provider::ALL
        {   if let Ok(key) = std::env::var(provider.api_key_env())
            {   if key.trim().is_empty()
                {   continue;
                }
                info!("Configured {} from environment", provider);
                config.providers.push(
                  ProviderConfig::new(provider, key)
                );
            }
        }

        match std::env::var(TIMEOUT_ENV).map(|v| v.parse::<u64>())
        {   Ok(Ok(secs)) => config.timeout_secs = secs
          , Ok(Err(e)) => {
              warn!("Ignoring invalid {}: {}", TIMEOUT_ENV, e);
            }
          , Err(_) => {}
        }

        if config.providers.is_empty()
        {   warn!(
              "No LLM providers configured. Set CORCEL_API_KEY, \
               OPENAI_API_KEY, or ANTHROPIC_API_KEY."
            );
        }
        config
    }

    /// Parse a JSON configuration document
    pub fn from_json_str(json: &str)
      -> Result<Self, crate::error::Error>
    {   let config: AideConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file
    pub fn from_file(path: impl AsRef<Path>)
      -> Result<Self, crate::error::Error>
    {   let path = path.as_ref();
        debug!("Loading config from {}", path.display());
        let json = std::fs::read_to_string(path).map_err(|e| {
          crate::error::Error::InvalidConfiguration(
            format!("cannot read {}: {}", path.display(), e)
          )
        })?;
        Self::from_json_str(&json)
    }

    /// Reject zero timeouts and duplicate provider entries
    pub fn validate(&self) -> Result<(), crate::error::Error>
    {   if self.timeout_secs == 0
        {   return Err(crate::error::Error::InvalidConfiguration(
              "timeout_secs must be positive".to_string()
            ));
        }
        for (i, p) in self.providers.iter().enumerate()
        {   if p.timeout_secs == Some(0)
            {   return Err(crate::error::Error::InvalidConfiguration(
                  format!("{}: timeout_secs must be positive", p.provider)
                ));
            }
            if self.providers[..i].iter()
              .any(|q| q.provider == p.provider)
            {   return Err(crate::error::Error::InvalidConfiguration(
                  format!("{} configured twice", p.provider)
                ));
            }
        }
        Ok(())
    }

    /// Effective timeout for one provider
    pub fn timeout_for(&self, provider: &ProviderConfig) -> Duration
    {   Duration::from_secs(
          provider.timeout_secs.unwrap_or(self.timeout_secs)
        )
    }

    pub fn with_provider(mut self, provider: ProviderConfig) -> Self
    {   self.providers.push(provider);
        self
    }

    pub fn with_system_override(mut self, prompt: impl Into<String>)
      -> Self
    {   self.system_override = Some(prompt.into());
        self
    }
}
