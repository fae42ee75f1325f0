use std::fmt;

/// Error type for backend queries and dispatch
/// Implements Clone so results can be handed across tasks
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error
{   /// No credentials configured for a provider
    MissingApiKey(String)
  , /// Model name matches no known provider
    UnknownModel(String)
  , /// Transport-level failure (connect, TLS, body read)
    HttpError(String)
  , /// Provider answered with a non-200 status
    ApiError
    {   status: u16
      , body: String
    }
  , /// 200 response whose body lacks the expected fields
    ShapeMismatch(String)
  , /// Body was not valid JSON, or a config file failed to parse
    ParseError(String)
  , /// Request exceeded the configured timeout
    Timeout
  , /// Invalid configuration
    InvalidConfiguration(String)
}

impl Error
{   /// HTTP status carried by the error, if the provider answered at all
    pub fn status(&self) -> Option<u16>
    {   match self
        {   Error::ApiError { status, .. } => Some(*status)
          , _ => None
        }
    }
}

impl fmt::Display for Error
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   match self
        {   Error::MissingApiKey(provider) => {
              write!(f, "Missing API key for: {}", provider)
            }
          , Error::UnknownModel(model) => {
              write!(f, "No backend handles model: {}", model)
            }
          , Error::HttpError(msg) => {
              write!(f, "HTTP error: {}", msg)
            }
          , Error::ApiError { status, body } => {
              write!(f,
                "API request failed with status code {}: {}",
                status, body
              )
            }
          , Error::ShapeMismatch(msg) => {
              write!(f, "Unexpected response shape: {}", msg)
            }
          , Error::ParseError(msg) => {
              write!(f, "Parse error: {}", msg)
            }
          , Error::Timeout => {
              write!(f, "Request timed out")
            }
          , Error::InvalidConfiguration(msg) => {
              write!(f, "Invalid configuration: {}", msg)
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<reqwest::Error> for Error
{   fn from(e: reqwest::Error) -> Self
    {   if e.is_timeout()
        {   Error::Timeout
        } else if e.is_decode()
        {   Error::ParseError(e.to_string())
        } else
        {   Error::HttpError(e.to_string())
        }
    }
}

impl From<serde_json::Error> for Error
{   fn from(e: serde_json::Error) -> Self
    {   Error::ParseError(e.to_string())
    }
}
