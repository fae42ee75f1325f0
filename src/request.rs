//! Unified request and result types shared by every backend

use std::time::Duration;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Function-call declaration forwarded to providers that support
/// structured output. Its schema is not inspected here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSpec
{   pub name: String
  , pub json_schema: Value
  , pub description: String
}

impl FunctionSpec
{   pub fn new(
      name: impl Into<String>
    , json_schema: Value
    , description: impl Into<String>
    ) -> Self
    {   FunctionSpec
        {   name: name.into()
          , json_schema
          , description: description.into()
        }
    }

    /// OpenAI-style `tools` entry
    pub fn as_openai_tool(&self) -> Value
    {   serde_json::json!({
          "type": "function",
          "function": {
            "name": self.name,
            "description": self.description,
            "parameters": self.json_schema,
          }
        })
    }

    /// OpenAI-style forced `tool_choice`
    pub fn openai_tool_choice(&self) -> Value
    {   serde_json::json!({
          "type": "function",
          "function": { "name": self.name }
        })
    }

    /// Anthropic-style `tools` entry
    pub fn as_anthropic_tool(&self) -> Value
    {   serde_json::json!({
          "name": self.name,
          "description": self.description,
          "input_schema": self.json_schema,
        })
    }

    /// Anthropic-style forced `tool_choice`
    pub fn anthropic_tool_choice(&self) -> Value
    {   serde_json::json!({ "type": "tool", "name": self.name })
    }
}

/// Optional tuning parameters merged into the outbound payload.
/// A `null` value means "leave it to the provider default".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelKwargs(Map<String, Value>);

impl ModelKwargs
{   pub fn new() -> Self
    {   ModelKwargs(Map::new())
    }

    /// Set a key, replacing any previous value
    pub fn set(mut self, key: &str, value: impl Into<Value>) -> Self
    {   self.0.insert(key.to_string(), value.into());
        self
    }

    /// Set a key to `value`, or to `null` when absent
    pub fn set_opt<T: Into<Value>>(
      mut self
    , key: &str
    , value: Option<T>
    ) -> Self
    {   self.0.insert(
          key.to_string(),
          value.map(Into::into).unwrap_or(Value::Null)
        );
        self
    }

    /// Overlay `other` on top of self; keys in `other` win
    pub fn merge(mut self, other: ModelKwargs) -> Self
    {   self.0.extend(other.0);
        self
    }

    /// Drop every `null` entry, leave the rest untouched
    pub fn filtered(self) -> Self
    {   ModelKwargs(
          self.0.into_iter()
            .filter(|(_, v)| !v.is_null())
            .collect()
        )
    }

    pub fn get(&self, key: &str) -> Option<&Value>
    {   self.0.get(key)
    }

    pub fn len(&self) -> usize
    {   self.0.len()
    }

    pub fn is_empty(&self) -> bool
    {   self.0.is_empty()
    }

    pub fn into_map(self) -> Map<String, Value>
    {   self.0
    }
}

impl From<Map<String, Value>> for ModelKwargs
{   fn from(map: Map<String, Value>) -> Self
    {   ModelKwargs(map)
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for ModelKwargs
{   fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self
    {   ModelKwargs(
          iter.into_iter().map(|(k, v)| (k.into(), v)).collect()
        )
    }
}

/// Outcome of one successful backend call
#[derive(Debug, Clone, PartialEq)]
pub struct BackendResult
{   /// Completion text, or function-call arguments as JSON text
    pub output: String
  , /// Wall-clock time spent on the HTTP round trip
    pub elapsed: Duration
  , pub input_tokens: Option<u32>
  , pub output_tokens: Option<u32>
  , /// `finish_reason` followed by an echo of the outbound payload
    pub metadata: Map<String, Value>
}

impl BackendResult
{   pub fn elapsed_secs(&self) -> f64
    {   self.elapsed.as_secs_f64()
    }

    pub fn finish_reason(&self) -> Option<&str>
    {   self.metadata.get("finish_reason").and_then(Value::as_str)
    }
}
