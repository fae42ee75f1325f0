//! HTTP backend shared by all providers
//!
//! Providers differ only in endpoint, auth header, default payload
//! and response shape. `WireFormat` carries those differences;
//! `ChatBackend` does the rest once.

use std::time::{Duration, Instant};
use async_trait::async_trait;
use log::{debug, trace, error};
use reqwest::StatusCode;
use serde_json::{Map, Value};

use crate::config::{Credentials, ProviderConfig};
use crate::error::Error;
use crate::prompt::{opt_messages_to_list, Message, Prompt, Role};
use crate::request::{BackendResult, FunctionSpec, ModelKwargs};

/// Text and bookkeeping pulled out of a provider response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion
{   pub text: String
  , pub finish_reason: Option<String>
  , pub input_tokens: Option<u32>
  , pub output_tokens: Option<u32>
}

/// Request/response conventions of one provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireFormat
{   Corcel
  , OpenAi
  , Anthropic
}

impl WireFormat
{   pub fn for_provider(provider: crate::Provider) -> Self
    {   match provider
        {   crate::Provider::Corcel => WireFormat::Corcel
          , crate::Provider::OpenAI => WireFormat::OpenAi
          , crate::Provider::Anthropic => WireFormat::Anthropic
        }
    }

    /// Payload entries sent unless the caller overrides them
    pub fn default_payload(&self) -> Map<String, Value>
    {   match self
        {   WireFormat::Corcel => super::corcel::default_payload()
          , WireFormat::OpenAi => super::openai::default_payload()
          , WireFormat::Anthropic => super::anthropic::default_payload()
        }
    }

    /// Provider-specific rewrites applied after defaults and
    /// kwargs are merged
    pub fn shape_payload(
      &self
    , payload: &mut Map<String, Value>
    , func_spec: Option<&FunctionSpec>
    )
    {   match self
        {   WireFormat::Corcel => {
              super::corcel::shape_payload(payload, func_spec)
            }
          , WireFormat::OpenAi => {
              super::openai::shape_payload(payload, func_spec)
            }
          , WireFormat::Anthropic => {
              super::anthropic::shape_payload(payload, func_spec)
            }
        }
    }

    fn authorize(
      &self
    , request: reqwest::RequestBuilder
    , credentials: &Credentials
    ) -> reqwest::RequestBuilder
    {   match self
        {   WireFormat::Corcel | WireFormat::OpenAi => {
              request.header("Authorization", credentials.bearer())
            }
          , WireFormat::Anthropic => {
              request
                .header("x-api-key", credentials.api_key.trim())
                .header(
                  "anthropic-version",
                  super::anthropic::API_VERSION
                )
            }
        }
    }

    /// Pull the completion out of a 200 response body
    pub fn parse_response(
      &self
    , body: &[u8]
    , func_spec: Option<&FunctionSpec>
    ) -> Result<Completion, Error>
    {   match self
        {   WireFormat::Corcel => super::corcel::parse_response(body)
          , WireFormat::OpenAi => {
              super::openai::parse_response(body, func_spec)
            }
          , WireFormat::Anthropic => {
              super::anthropic::parse_response(body, func_spec)
            }
        }
    }
}

/// Backend issuing one JSON POST per query
pub struct ChatBackend
{   provider: crate::Provider
  , format: WireFormat
  , endpoint: String
  , credentials: Credentials
  , defaults: Map<String, Value>
  , http_client: reqwest::Client
}

impl ChatBackend
{   pub fn new(
      provider: crate::Provider
    , endpoint: impl Into<String>
    , credentials: Credentials
    , timeout: Duration
    ) -> Result<Self, Error>
    {   let format = WireFormat::for_provider(provider);
        let http_client = reqwest::Client::builder()
          .timeout(timeout)
          .build()
          .map_err(|e| {
            error!("Failed to build HTTP client: {}", e);
            Error::InvalidConfiguration(e.to_string())
          })?;
        let endpoint = endpoint.into();
        debug!("Creating {} backend for {}", provider, endpoint);
        Ok(ChatBackend
        {   provider
          , format
          , endpoint
          , credentials
          , defaults: format.default_payload()
          , http_client
        })
    }

    pub fn from_config(
      config: &ProviderConfig
    , timeout: Duration
    ) -> Result<Self, Error>
    {   ChatBackend::new(
          config.provider,
          config.endpoint(),
          config.credentials()?,
          timeout
        )
    }

    /// Replace the provider's default payload entries
    pub fn with_defaults(mut self, defaults: Map<String, Value>) -> Self
    {   self.defaults = defaults;
        self
    }

    pub fn endpoint(&self) -> &str
    {   &self.endpoint
    }

    pub fn format(&self) -> WireFormat
    {   self.format
    }

    /// Outbound JSON body: messages, then defaults, then kwargs,
    /// later entries winning on key collision
    pub fn build_payload(
      &self
    , system: Option<&Prompt>
    , user: Option<&Prompt>
    , func_spec: Option<&FunctionSpec>
    , kwargs: ModelKwargs
    ) -> Map<String, Value>
    {   let mut messages = opt_messages_to_list(system, user);
        if messages.is_empty()
        {   debug!("No prompt given, sending one empty user message");
            messages.push(Message::new(Role::User, ""));
        }

        let mut payload = Map::new();
        payload.insert("messages".to_string(), messages_to_json(&messages));
        payload.extend(self.defaults.clone());
        payload.extend(kwargs.filtered().into_map());
        self.format.shape_payload(&mut payload, func_spec);
        payload
    }
}

fn messages_to_json(messages: &[Message]) -> Value
{   Value::Array(
      messages.iter()
        .map(|m| serde_json::json!({
          "role": m.role.as_str(),
          "content": m.content,
        }))
        .collect()
    )
}

#[async_trait]
impl super::Backend for ChatBackend
{   fn provider(&self) -> crate::Provider
    {   self.provider
    }

    async fn query(
      &self
    , system: Option<&Prompt>
    , user: Option<&Prompt>
    , func_spec: Option<&FunctionSpec>
    , kwargs: ModelKwargs
    ) -> Result<BackendResult, Error>
    {   let payload = self.build_payload(system, user, func_spec, kwargs);
        trace!("{} request: {:?}", self.provider, payload);

        let start = Instant::now();
        let request = self.format
          .authorize(self.http_client.post(&self.endpoint), &self.credentials)
          .json(&payload);

        let response = request.send().await.map_err(|e| {
          error!("{} HTTP error: {}", self.provider, e);
          Error::from(e)
        })?;

        let status = response.status();
        trace!("{} response status: {}", self.provider, status);

        if status != StatusCode::OK
        {   let body = response.text().await
              .unwrap_or_else(|_| "<body unavailable>".to_string());
            error!(
              "{} API request failed with status code {}",
              self.provider, status.as_u16()
            );
            return Err(Error::ApiError
            {   status: status.as_u16()
              , body
            });
        }

        let body = response.bytes().await.map_err(|e| {
          error!("{} failed to read body: {}", self.provider, e);
          Error::from(e)
        })?;
        let elapsed = start.elapsed();

        let completion = self.format
          .parse_response(&body, func_spec)
          .map_err(|e| {
            error!(
              "{} API request with status code {} returned {}",
              self.provider, status.as_u16(), e
            );
            e
          })?;

        debug!(
          "{} answered in {:.2}s (finish_reason: {:?})",
          self.provider,
          elapsed.as_secs_f64(),
          completion.finish_reason
        );

        let mut metadata = Map::new();
        metadata.insert(
          "finish_reason".to_string(),
          completion.finish_reason
            .map(Value::String)
            .unwrap_or(Value::Null)
        );
        metadata.extend(payload);

        Ok(BackendResult
        {   output: completion.text
          , elapsed
          , input_tokens: completion.input_tokens
          , output_tokens: completion.output_tokens
          , metadata
        })
    }
}

/// Deserialize a response body, reporting any mismatch as a shape error
pub(crate) fn decode<T: serde::de::DeserializeOwned>(
  body: &[u8]
) -> Result<T, Error>
{   serde_json::from_slice(body)
      .map_err(|e| Error::ShapeMismatch(e.to_string()))
}
