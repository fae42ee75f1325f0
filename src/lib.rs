pub mod error;
pub mod config;
pub mod prompt;
pub mod request;
pub mod providers;
pub mod client;
use serde::{Deserialize, Serialize};

/*

aide-backend: one query call in front of several chat-completion
APIs. A model name picks the provider, the prompt is compiled to
chat messages, the provider's payload is built, one HTTP request
is made, and the provider's response shape is unwrapped into a
uniform result.

aide-backend/
├── Cargo.toml
├── src/
│   ├── lib.rs          # Provider enum, routing, re-exports
│   ├── error.rs        # Error kinds surfaced to callers
│   ├── config.rs       # Credentials, endpoints, timeouts
│   ├── prompt.rs       # Prompt -> Markdown -> messages
│   ├── request.rs      # FunctionSpec, ModelKwargs, BackendResult
│   ├── client.rs       # Dispatcher
│   ├── providers/
│   │   ├── mod.rs      # Backend trait
│   │   ├── chat.rs     # Shared HTTP backend, wire formats
│   │   ├── corcel.rs
│   │   ├── openai.rs
│   │   └── anthropic.rs
│   └── bin/aide_query.rs  # Manual smoke test
└── tests/

*/

pub use client::{AideClient, QueryArgs, EVALUATOR_SYSTEM_PROMPT};
pub use config::{AideConfig, Credentials, ProviderConfig};
pub use error::Error;
pub use prompt::{Message, Prompt, Role, Section};
pub use providers::{Backend, ChatBackend, WireFormat};
pub use request::{BackendResult, FunctionSpec, ModelKwargs};

/// Supported chat-completion providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Provider
{   /// Corcel (cortext models)
    Corcel
  , /// OpenAI (GPT models)
    OpenAI
  , /// Anthropic (Claude models)
    Anthropic
}

/// Model-name fragments and the provider serving them.
/// Checked in order; the first fragment found wins.
const MODEL_ROUTES: [(&str, Provider); 3] = [
  ("cortext", Provider::Corcel)
, ("gpt-", Provider::OpenAI)
, ("claude", Provider::Anthropic)
];

impl Provider
{   pub const ALL: [Provider; 3] = [
      Provider::Corcel
    , Provider::OpenAI
    , Provider::Anthropic
    ];

    /// Pick the provider serving `model`
    pub fn from_model(model: &str) -> Result<Provider, Error>
    {   MODEL_ROUTES.iter()
          .find(|(fragment, _)| model.contains(fragment))
          .map(|(_, provider)| *provider)
          .ok_or_else(|| Error::UnknownModel(model.to_string()))
    }

    pub fn name(&self) -> &'static str
    {   match self
        {   Provider::Corcel => "corcel"
          , Provider::OpenAI => "openai"
          , Provider::Anthropic => "anthropic"
        }
    }

    /// Public chat endpoint
    pub fn default_endpoint(&self) -> &'static str
    {   match self
        {   Provider::Corcel => providers::corcel::ENDPOINT
          , Provider::OpenAI => providers::openai::ENDPOINT
          , Provider::Anthropic => providers::anthropic::ENDPOINT
        }
    }

    /// Environment variable conventionally holding the API key
    pub fn api_key_env(&self) -> &'static str
    {   match self
        {   Provider::Corcel => "CORCEL_API_KEY"
          , Provider::OpenAI => "OPENAI_API_KEY"
          , Provider::Anthropic => "ANTHROPIC_API_KEY"
        }
    }
}

impl std::fmt::Display for Provider
{   fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {   f.write_str(self.name())
    }
}
