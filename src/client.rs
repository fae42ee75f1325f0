use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use log::{debug, info, error};

use crate::config::AideConfig;
use crate::error::Error;
use crate::prompt::Prompt;
use crate::providers::{Backend, ChatBackend};
use crate::request::{BackendResult, FunctionSpec, ModelKwargs};
use crate::Provider;

/// System prompt for reviewing code execution output.
/// Install it with `AideConfig::with_system_override` to have every
/// query answered as an evaluation.
pub const EVALUATOR_SYSTEM_PROMPT: &str
  = "You should determine if there were any bugs as well as \
     report the empirical findings.";

/// Arguments of one dispatched query
#[derive(Debug, Clone, Default)]
pub struct QueryArgs
{   pub system_message: Option<Prompt>
  , pub user_message: Option<Prompt>
  , /// Model identifier, also used for routing
    pub model: String
  , pub temperature: Option<f64>
  , pub max_tokens: Option<u32>
  , pub func_spec: Option<FunctionSpec>
  , /// Extra tuning parameters; `model`, `temperature` and
    /// `max_tokens` above take precedence over same-named keys
    pub model_kwargs: ModelKwargs
}

impl QueryArgs
{   pub fn new(model: impl Into<String>) -> Self
    {   QueryArgs
        {   model: model.into()
          , ..Default::default()
        }
    }

    pub fn system(mut self, prompt: impl Into<Prompt>) -> Self
    {   self.system_message = Some(prompt.into());
        self
    }

    pub fn user(mut self, prompt: impl Into<Prompt>) -> Self
    {   self.user_message = Some(prompt.into());
        self
    }

    pub fn temperature(mut self, temperature: f64) -> Self
    {   self.temperature = Some(temperature);
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self
    {   self.max_tokens = Some(max_tokens);
        self
    }

    pub fn func_spec(mut self, spec: FunctionSpec) -> Self
    {   self.func_spec = Some(spec);
        self
    }

    pub fn kwargs(mut self, kwargs: ModelKwargs) -> Self
    {   self.model_kwargs = kwargs;
        self
    }
}

/// Dispatcher: routes each query to the backend serving its model
#[derive(Clone, Default)]
pub struct AideClient
{   backends: HashMap<Provider, Arc<dyn Backend>>
  , system_override: Option<Prompt>
}

impl fmt::Debug for AideClient
{   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {   f.debug_struct("AideClient")
          .field("providers", &self.providers())
          .field("system_override", &self.system_override)
          .finish()
    }
}

impl AideClient
{   /// Client with no backends; add them with `register`
    pub fn empty() -> Self
    {   Self::default()
    }

    /// Build one HTTP backend per configured provider
    pub fn new(config: &AideConfig) -> Result<Self, Error>
    {   config.validate()?;
        let mut client = AideClient
        {   backends: HashMap::new()
          , system_override: config.system_override.clone()
              .map(Prompt::Text)
        };

        for provider_config in &config.providers
        {   let backend = ChatBackend::from_config(
              provider_config,
              config.timeout_for(provider_config)
            )?;
            client.register(Arc::new(backend));
        }

        debug!("AideClient ready with {} backends", client.backends.len());
        Ok(client)
    }

    /// Configure providers from environment variables
    pub fn from_env() -> Result<Self, Error>
    {   Self::new(&AideConfig::from_env())
    }

    /// Install a backend, replacing any for the same provider
    pub fn register(&mut self, backend: Arc<dyn Backend>)
    {   let provider = backend.provider();
        info!("Registered {} backend", provider);
        self.backends.insert(provider, backend);
    }

    pub fn with_backend(mut self, backend: Arc<dyn Backend>) -> Self
    {   self.register(backend);
        self
    }

    pub fn with_system_override(mut self, prompt: impl Into<Prompt>) -> Self
    {   self.system_override = Some(prompt.into());
        self
    }

    pub fn backend(&self, provider: Provider) -> Option<Arc<dyn Backend>>
    {   self.backends.get(&provider).cloned()
    }

    pub fn providers(&self) -> Vec<Provider>
    {   Provider::ALL.into_iter()
          .filter(|p| self.backends.contains_key(p))
          .collect()
    }

    /// Backend serving `model`
    pub fn route(&self, model: &str) -> Result<Arc<dyn Backend>, Error>
    {   let provider = Provider::from_model(model).map_err(|e| {
          error!("No provider for model: {}", model);
          e
        })?;
        self.backend(provider).ok_or_else(|| {
          error!("{} routed to {}, which is not configured", model, provider);
          Error::MissingApiKey(provider.to_string())
        })
    }

    /// Query a model, returning only the completion text
    pub async fn query(&self, args: QueryArgs) -> Result<String, Error>
    {   self.query_full(args).await.map(|result| result.output)
    }

    /// Query a model, returning the full backend result
    pub async fn query_full(&self, args: QueryArgs)
      -> Result<BackendResult, Error>
    {   let QueryArgs
        {   system_message
          , user_message
          , model
          , temperature
          , max_tokens
          , func_spec
          , model_kwargs
        } = args;

        let kwargs = model_kwargs.merge(
          ModelKwargs::new()
            .set("model", model.as_str())
            .set_opt("temperature", temperature)
            .set_opt("max_tokens", max_tokens)
        );
        info!("Querying model {} with kwargs {:?}", model, kwargs);

        let backend = self.route(&model)?;
        let system = self.system_override.as_ref()
          .or(system_message.as_ref());

        backend.query(
          system,
          user_message.as_ref(),
          func_spec.as_ref(),
          kwargs
        ).await
    }
}
