use std::time::Duration;

use aide_backend::request::ModelKwargs;
use aide_backend::{AideClient, AideConfig, Credentials, Error, Provider, ProviderConfig};
use serde_json::{json, Value};
use tokio_test::{assert_err, assert_ok};

#[test]
fn test_config_from_json()
{   let config = assert_ok!(AideConfig::from_json_str(r#"{
      "providers": [
        { "provider": "corcel", "api_key": "c-key" },
        { "provider": "anthropic", "api_key_env": "MY_ANTHROPIC_KEY",
          "endpoint": "http://localhost:9000/v1/messages",
          "timeout_secs": 5 }
      ],
      "system_override": "Evaluate the output."
    }"#));

    assert_eq!(config.providers.len(), 2);
    assert_eq!(config.providers[0].provider, Provider::Corcel);
    assert_eq!(
      config.providers[0].endpoint(),
      "https://api.corcel.io/v1/text/cortext/chat"
    );
    assert_eq!(
      config.providers[1].endpoint(),
      "http://localhost:9000/v1/messages"
    );
    assert_eq!(config.timeout_secs, 120);
    assert_eq!(config.timeout_for(&config.providers[0]), Duration::from_secs(120));
    assert_eq!(config.timeout_for(&config.providers[1]), Duration::from_secs(5));
    assert_eq!(config.system_override.as_deref(), Some("Evaluate the output."));
}

#[test]
fn test_config_rejects_duplicates_and_zero_timeout()
{   let err = assert_err!(AideConfig::from_json_str(r#"{
      "providers": [
        { "provider": "openai", "api_key": "a" },
        { "provider": "openai", "api_key": "b" }
      ]
    }"#));
    assert!(matches!(err, Error::InvalidConfiguration(_)));

    let err = assert_err!(AideConfig::from_json_str(r#"{ "timeout_secs": 0 }"#));
    assert!(matches!(err, Error::InvalidConfiguration(_)));
}

#[test]
fn test_config_unknown_provider_is_parse_error()
{   let err = assert_err!(AideConfig::from_json_str(r#"{
      "providers": [{ "provider": "mistral", "api_key": "m" }]
    }"#));
    assert!(matches!(err, Error::ParseError(_)));
}

#[test]
fn test_config_missing_file()
{   let err = assert_err!(AideConfig::from_file("tests/does-not-exist.json"));
    assert!(matches!(err, Error::InvalidConfiguration(_)));
}

#[test]
fn test_credentials_resolution()
{   let inline = ProviderConfig::new(Provider::OpenAI, "sk-inline");
    assert_eq!(assert_ok!(inline.credentials()), Credentials::new("sk-inline"));

    std::env::set_var("AIDE_TEST_CORCEL_KEY", "from-env");
    let from_env = ProviderConfig
    {   provider: Provider::Corcel
      , api_key: None
      , api_key_env: Some("AIDE_TEST_CORCEL_KEY".to_string())
      , endpoint: None
      , timeout_secs: None
    };
    assert_eq!(assert_ok!(from_env.credentials()).api_key, "from-env");

    let missing = ProviderConfig
    {   api_key_env: Some("AIDE_TEST_UNSET_KEY".to_string())
      , ..from_env
    };
    let err = assert_err!(missing.credentials());
    assert!(matches!(err, Error::MissingApiKey(_)));
}

#[test]
fn test_credentials_debug_is_redacted()
{   let creds = Credentials::new("super-secret");
    let shown = format!("{:?}", creds);
    assert!(!shown.contains("super-secret"));
    assert_eq!(creds.bearer(), "Bearer super-secret");
}

#[test]
fn test_client_needs_credentials_for_listed_provider()
{   let config = AideConfig::default().with_provider(ProviderConfig
    {   provider: Provider::Anthropic
      , api_key: None
      , api_key_env: Some("AIDE_TEST_NEVER_SET".to_string())
      , endpoint: None
      , timeout_secs: None
    });
    let err = assert_err!(AideClient::new(&config));
    assert!(matches!(err, Error::MissingApiKey(_)));
}

#[test]
fn test_kwargs_filter_drops_only_nulls()
{   let kwargs = ModelKwargs::new()
      .set("temperature", 0.0)
      .set("stream", false)
      .set("stop", json!([]))
      .set("top_p", Value::Null)
      .set_opt::<u32>("max_tokens", None)
      .set_opt("seed", Some(3));

    let filtered = kwargs.clone().filtered();
    assert_eq!(filtered.len(), 4);
    assert_eq!(filtered.get("temperature"), Some(&json!(0.0)));
    assert_eq!(filtered.get("stream"), Some(&json!(false)));
    assert_eq!(filtered.get("stop"), Some(&json!([])));
    assert_eq!(filtered.get("seed"), Some(&json!(3)));
    assert_eq!(filtered.get("top_p"), None);
    assert_eq!(filtered.get("max_tokens"), None);

    for (key, value) in filtered.clone().into_map()
    {   assert_eq!(kwargs.get(&key), Some(&value));
    }
}

#[test]
fn test_kwargs_merge_incoming_wins()
{   let base = ModelKwargs::new().set("model", "a").set("top_p", 1);
    let merged = base.merge(ModelKwargs::new().set("model", "b"));
    assert_eq!(merged.get("model"), Some(&json!("b")));
    assert_eq!(merged.get("top_p"), Some(&json!(1)));
}

// Only test touching the provider key variables and AIDE_TIMEOUT_SECS
#[test]
fn test_config_from_env()
{   std::env::set_var("CORCEL_API_KEY", "corcel-from-env");
    std::env::set_var("OPENAI_API_KEY", "   ");
    std::env::remove_var("ANTHROPIC_API_KEY");
    std::env::set_var("AIDE_TIMEOUT_SECS", "30");

    let config = AideConfig::from_env();
    let providers: Vec<Provider>
      = config.providers.iter().map(|p| p.provider).collect();
    assert_eq!(providers, vec![Provider::Corcel]);
    assert_eq!(
      assert_ok!(config.providers[0].credentials()).api_key,
      "corcel-from-env"
    );
    assert_eq!(config.timeout_secs, 30);

    std::env::set_var("AIDE_TIMEOUT_SECS", "soon");
    assert_eq!(AideConfig::from_env().timeout_secs, 120);

    std::env::remove_var("AIDE_TIMEOUT_SECS");
    std::env::remove_var("CORCEL_API_KEY");
    std::env::remove_var("OPENAI_API_KEY");
    assert!(AideConfig::from_env().providers.is_empty());
}
