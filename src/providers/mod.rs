//! LLM provider backends

pub mod chat;
pub mod corcel;
pub mod openai;
pub mod anthropic;

use async_trait::async_trait;

use crate::error::Error;
use crate::prompt::Prompt;
use crate::request::{BackendResult, FunctionSpec, ModelKwargs};

pub use chat::{ChatBackend, Completion, WireFormat};

/// Capability shared by every provider backend: one prompt in,
/// one completion out, one HTTP round trip in between.
#[async_trait]
pub trait Backend: Send + Sync
{   /// Provider this backend talks to
    fn provider(&self) -> crate::Provider;

    /// Compile the prompts, send one request, unwrap the response.
    /// `null` entries in `kwargs` are dropped so provider
    /// defaults apply; every other entry overrides the defaults.
    async fn query(
      &self
    , system: Option<&Prompt>
    , user: Option<&Prompt>
    , func_spec: Option<&FunctionSpec>
    , kwargs: ModelKwargs
    ) -> Result<BackendResult, Error>;
}
