//! Prompt compilation into provider-neutral chat messages
//!
//! A prompt is either plain text or an ordered set of named sections.
//! Sections render as a Markdown document, one heading per key, nested
//! sections one heading level deeper. Omitted sections vanish entirely.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use log::trace;

/// Speaker of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role
{   System
  , User
  , Assistant
}

impl Role
{   pub fn as_str(&self) -> &'static str
    {   match self
        {   Role::System => "system"
          , Role::User => "user"
          , Role::Assistant => "assistant"
        }
    }
}

/// One entry of a conversation, in order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message
{   pub role: Role
  , pub content: String
}

impl Message
{   pub fn new(role: Role, content: impl Into<String>) -> Self
    {   Message
        {   role
          , content: content.into()
        }
    }
}

/// Body of a named prompt section
#[derive(Debug, Clone, PartialEq)]
pub enum Section
{   /// Body text, emitted as-is
    Text(String)
  , /// Rendered as a bullet list
    List(Vec<String>)
  , /// Sub-sections, one heading level deeper
    Nested(Vec<(String, Section)>)
  , /// Dropped before compilation, heading included
    Omitted
}

impl From<&str> for Section
{   fn from(s: &str) -> Self
    {   Section::Text(s.to_string())
    }
}

impl From<String> for Section
{   fn from(s: String) -> Self
    {   Section::Text(s)
    }
}

impl From<Option<String>> for Section
{   fn from(s: Option<String>) -> Self
    {   s.map(Section::Text).unwrap_or(Section::Omitted)
    }
}

impl From<Vec<String>> for Section
{   fn from(items: Vec<String>) -> Self
    {   Section::List(items)
    }
}

/// Uncompiled prompt
#[derive(Debug, Clone, PartialEq)]
pub enum Prompt
{   Text(String)
  , Sections(Vec<(String, Section)>)
}

impl Prompt
{   pub fn text(s: impl Into<String>) -> Self
    {   Prompt::Text(s.into())
    }

    /// Build a sectioned prompt, keeping the given order
    pub fn from_sections<I, K>(sections: I) -> Self
    where
      I: IntoIterator<Item = (K, Section)>
    , K: Into<String>
    {   Prompt::Sections(
          sections.into_iter()
            .map(|(k, s)| (k.into(), s))
            .collect()
        )
    }

    /// Build a prompt from JSON. `null` means no prompt at all;
    /// inside an object a `null` value marks an omitted section.
    pub fn from_json(value: Value) -> Option<Self>
    {   match value
        {   Value::Null => None
          , Value::String(s) => Some(Prompt::Text(s))
          , Value::Object(map) => Some(Prompt::Sections(
              map.into_iter()
                .map(|(k, v)| (k, section_from_json(v)))
                .collect()
            ))
          , Value::Array(items) => Some(Prompt::Text(
              render_list(&list_from_json(items))
            ))
          , other => Some(Prompt::Text(other.to_string()))
        }
    }

    /// Render to the text that becomes a message's content
    pub fn compile(&self) -> String
    {   compile_prompt_to_md(self)
    }
}

impl From<&str> for Prompt
{   fn from(s: &str) -> Self
    {   Prompt::Text(s.to_string())
    }
}

impl From<String> for Prompt
{   fn from(s: String) -> Self
    {   Prompt::Text(s)
    }
}

fn section_from_json(value: Value) -> Section
{   match value
    {   Value::Null => Section::Omitted
      , Value::String(s) => Section::Text(s)
      , Value::Array(items) => Section::List(list_from_json(items))
      , Value::Object(map) => Section::Nested(
          map.into_iter()
            .map(|(k, v)| (k, section_from_json(v)))
            .collect()
        )
      , other => Section::Text(other.to_string())
    }
}

fn list_from_json(items: Vec<Value>) -> Vec<String>
{   items.into_iter()
      .filter(|v| !v.is_null())
      .map(|v| match v
        {   Value::String(s) => s
          , other => other.to_string()
        })
      .collect()
}

/// Compile a prompt to a single Markdown document.
/// Plain text comes back verbatim.
pub fn compile_prompt_to_md(prompt: &Prompt) -> String
{   match prompt
    {   Prompt::Text(s) => s.clone()
      , Prompt::Sections(entries) => render_sections(entries, 1)
    }
}

fn render_sections(entries: &[(String, Section)], depth: usize)
  -> String
{   let prefix = "#".repeat(depth);
    let mut out: Vec<String> = Vec::new();
    for (name, section) in entries
    {   let body = match section
        {   Section::Omitted => {
              trace!("Skipping omitted section: {}", name);
              continue;
            }
          , Section::Text(text) => with_newline(text)
          , Section::List(items) => render_list(items)
          , Section::Nested(inner) => render_sections(inner, depth + 1)
        };
        out.push(format!("{} {}\n", prefix, name));
        out.push(body);
    }
    out.join("\n")
}

fn render_list(items: &[String]) -> String
{   let mut out = items.iter()
      .map(|s| format!("- {}", s))
      .collect::<Vec<_>>()
      .join("\n");
    out.push('\n');
    out
}

fn with_newline(text: &str) -> String
{   if text.ends_with('\n')
    {   text.to_string()
    } else
    {   format!("{}\n", text)
    }
}

/// Combine optional system and user prompts into a message list.
/// A side that is absent, or compiles to nothing, is left out;
/// both absent gives an empty list.
pub fn opt_messages_to_list(
  system: Option<&Prompt>
, user: Option<&Prompt>
) -> Vec<Message>
{   [(Role::System, system), (Role::User, user)]
      .into_iter()
      .filter_map(|(role, prompt)| {
        let content = prompt?.compile();
        if content.is_empty()
        {   None
        } else
        {   Some(Message { role, content })
        }
      })
      .collect()
}
