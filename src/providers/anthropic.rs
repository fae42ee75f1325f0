use serde::Deserialize;
use serde_json::{Map, Value};
use log::debug;

use super::chat::{decode, Completion};
use crate::error::Error;
use crate::request::FunctionSpec;

pub const ENDPOINT: &str = "https://api.anthropic.com/v1/messages";

pub const API_VERSION: &str = "2023-06-01";

pub const DEFAULT_MODEL: &str = "claude-3-opus-20240229";

pub fn default_payload() -> Map<String, Value>
{   let mut payload = Map::new();
    payload.insert("model".to_string(), DEFAULT_MODEL.into());
    payload.insert("max_tokens".to_string(), 4096.into());
    payload
}

/// Anthropic takes the system prompt as a top-level field and
/// refuses a conversation without a user turn. A lone system
/// prompt is therefore sent as the user message.
pub fn shape_payload(
  payload: &mut Map<String, Value>
, func_spec: Option<&FunctionSpec>
)
{   if let Some(Value::Array(messages)) = payload.remove("messages")
    {   let (system, mut rest): (Vec<Value>, Vec<Value>)
          = messages.into_iter()
            .partition(|m| {
              m.get("role").and_then(Value::as_str) == Some("system")
            });

        let system_text = system.iter()
          .filter_map(|m| m.get("content").and_then(Value::as_str))
          .collect::<Vec<_>>()
          .join("\n\n");

        let only_empty_user = rest.iter().all(|m| {
          m.get("content").and_then(Value::as_str) == Some("")
        });

        if !system_text.is_empty()
        {   if only_empty_user
            {   debug!("No user turn, sending system prompt as user");
                rest = vec![serde_json::json!({
                  "role": "user",
                  "content": system_text,
                })];
            } else if payload.contains_key("system")
            {   debug!("system kwarg given, dropping compiled system prompt");
            } else
            {   payload.insert("system".to_string(), system_text.into());
            }
        }
        payload.insert("messages".to_string(), Value::Array(rest));
    }

    if let Some(spec) = func_spec
    {   payload.insert(
          "tools".to_string(),
          Value::Array(vec![spec.as_anthropic_tool()])
        );
        payload.insert(
          "tool_choice".to_string(),
          spec.anthropic_tool_choice()
        );
    }
}

// ===== Response Types =====

#[derive(Debug, Deserialize)]
struct MessagesResponse
{   #[serde(default)]
    content: Vec<ContentBlock>
  , stop_reason: Option<String>
  , usage: Option<Usage>
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock
{   Text
    {   text: String
    }
  , ToolUse
    {   input: Value
    }
  , #[serde(other)]
    Other
}

#[derive(Debug, Deserialize)]
struct Usage
{   input_tokens: Option<u32>
  , output_tokens: Option<u32>
}

/// Text blocks joined, or the tool_use input as JSON text when a
/// function spec was sent
pub fn parse_response(
  body: &[u8]
, func_spec: Option<&FunctionSpec>
) -> Result<Completion, Error>
{   let response: MessagesResponse = decode(body)?;

    if response.content.is_empty()
    {   return Err(Error::ShapeMismatch(
          "missing content blocks".to_string()
        ));
    }

    let text = match func_spec
    {   Some(spec) => response.content.iter()
          .find_map(|block| match block
          {   ContentBlock::ToolUse { input } => Some(input.to_string())
            , _ => None
          })
          .ok_or_else(|| Error::ShapeMismatch(
            format!("no tool_use block for function {}", spec.name)
          ))?
      , None => {
          let texts = response.content.iter()
            .filter_map(|block| match block
            {   ContentBlock::Text { text } => Some(text.as_str())
              , _ => None
            })
            .collect::<Vec<_>>();
          if texts.is_empty()
          {   return Err(Error::ShapeMismatch(
                "no text content block".to_string()
              ));
          }
          texts.concat()
        }
    };

    Ok(Completion
    {   text
      , finish_reason: response.stop_reason
      , input_tokens: response.usage.as_ref().and_then(|u| u.input_tokens)
      , output_tokens: response.usage.as_ref().and_then(|u| u.output_tokens)
    })
}
