use serde::Deserialize;
use serde_json::{Map, Value};
use log::warn;

use super::chat::{decode, Completion};
use crate::error::Error;
use crate::request::FunctionSpec;

pub const ENDPOINT: &str
  = "https://api.corcel.io/v1/text/cortext/chat";

pub const DEFAULT_MODEL: &str = "cortext-ultra";

pub fn default_payload() -> Map<String, Value>
{   let mut payload = Map::new();
    payload.insert("model".to_string(), DEFAULT_MODEL.into());
    payload.insert("stream".to_string(), false.into());
    payload.insert("top_p".to_string(), 1.into());
    payload.insert("temperature".to_string(), 0.0001.into());
    payload.insert("max_tokens".to_string(), 4096.into());
    payload
}

/// Corcel has no function-calling field; a spec is dropped
pub fn shape_payload(
  _payload: &mut Map<String, Value>
, func_spec: Option<&FunctionSpec>
)
{   if let Some(spec) = func_spec
    {   warn!(
          "Corcel does not support function calling, ignoring {}",
          spec.name
        );
    }
}

// ===== Response Types =====

// Body is a list of chunks, even with streaming off
#[derive(Debug, Deserialize)]
struct Chunk
{   #[serde(default)]
    choices: Vec<Choice>
}

#[derive(Debug, Deserialize)]
struct Choice
{   delta: Option<Delta>
  , finish_reason: Option<String>
}

#[derive(Debug, Deserialize)]
struct Delta
{   content: Option<String>
  , finish_reason: Option<String>
}

/// Text from `[0].choices[0].delta.content`
pub fn parse_response(body: &[u8]) -> Result<Completion, Error>
{   let chunks: Vec<Chunk> = decode(body)?;

    let choice = chunks.into_iter()
      .next()
      .and_then(|chunk| chunk.choices.into_iter().next())
      .ok_or_else(|| Error::ShapeMismatch(
        "missing choices[0]".to_string()
      ))?;

    let delta = choice.delta.ok_or_else(|| Error::ShapeMismatch(
      "missing choices[0].delta".to_string()
    ))?;

    let text = delta.content.ok_or_else(|| Error::ShapeMismatch(
      "missing choices[0].delta.content".to_string()
    ))?;

    Ok(Completion
    {   text
      , finish_reason: choice.finish_reason.or(delta.finish_reason)
      , input_tokens: None
      , output_tokens: None
    })
}
