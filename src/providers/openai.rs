use serde::Deserialize;
use serde_json::{Map, Value};

use super::chat::{decode, Completion};
use crate::error::Error;
use crate::request::FunctionSpec;

pub const ENDPOINT: &str
  = "https://api.openai.com/v1/chat/completions";

pub const DEFAULT_MODEL: &str = "gpt-4-turbo";

pub fn default_payload() -> Map<String, Value>
{   let mut payload = Map::new();
    payload.insert("model".to_string(), DEFAULT_MODEL.into());
    payload
}

/// A function spec becomes a single forced tool
pub fn shape_payload(
  payload: &mut Map<String, Value>
, func_spec: Option<&FunctionSpec>
)
{   if let Some(spec) = func_spec
    {   payload.insert(
          "tools".to_string(),
          Value::Array(vec![spec.as_openai_tool()])
        );
        payload.insert(
          "tool_choice".to_string(),
          spec.openai_tool_choice()
        );
    }
}

// ===== Response Types =====

#[derive(Debug, Deserialize)]
struct ChatResponse
{   #[serde(default)]
    choices: Vec<Choice>
  , usage: Option<Usage>
}

#[derive(Debug, Deserialize)]
struct Choice
{   message: Option<AssistantMessage>
  , finish_reason: Option<String>
}

#[derive(Debug, Deserialize)]
struct AssistantMessage
{   content: Option<String>
  , #[serde(default)]
    tool_calls: Vec<ToolCall>
}

#[derive(Debug, Deserialize)]
struct ToolCall
{   function: FunctionCall
}

#[derive(Debug, Deserialize)]
struct FunctionCall
{   arguments: String
}

#[derive(Debug, Deserialize)]
struct Usage
{   prompt_tokens: Option<u32>
  , completion_tokens: Option<u32>
}

/// Text from `choices[0].message.content`, or the forced tool
/// call's arguments when a function spec was sent
pub fn parse_response(
  body: &[u8]
, func_spec: Option<&FunctionSpec>
) -> Result<Completion, Error>
{   let response: ChatResponse = decode(body)?;

    let choice = response.choices.into_iter()
      .next()
      .ok_or_else(|| Error::ShapeMismatch(
        "missing choices[0]".to_string()
      ))?;

    let message = choice.message.ok_or_else(|| Error::ShapeMismatch(
      "missing choices[0].message".to_string()
    ))?;

    let text = match func_spec
    {   Some(spec) => message.tool_calls.into_iter()
          .next()
          .map(|call| call.function.arguments)
          .ok_or_else(|| Error::ShapeMismatch(
            format!("no tool call for function {}", spec.name)
          ))?
      , None => message.content.ok_or_else(|| Error::ShapeMismatch(
          "missing choices[0].message.content".to_string()
        ))?
    };

    Ok(Completion
    {   text
      , finish_reason: choice.finish_reason
      , input_tokens: response.usage.as_ref().and_then(|u| u.prompt_tokens)
      , output_tokens: response.usage.as_ref().and_then(|u| u.completion_tokens)
    })
}
