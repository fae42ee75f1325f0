//! Manual smoke test: send one prompt through the dispatcher and
//! print the answer.
//!
//! Credentials come from `--config` or from `CORCEL_API_KEY`,
//! `OPENAI_API_KEY` and `ANTHROPIC_API_KEY`.

use std::path::PathBuf;
use std::process::ExitCode;

use aide_backend::{
  AideClient, AideConfig, Prompt, QueryArgs, Section,
  EVALUATOR_SYSTEM_PROMPT,
};
use clap::Parser;
use log::{error, info};

#[derive(Parser, Debug)]
#[command(name = "aide-query", about = "Send one prompt to an LLM backend")]
struct Args
{   /// Model identifier; also selects the provider
    #[arg(long, default_value = "cortext-ultra")]
    model: String
  , #[arg(long, default_value_t = 0.0001)]
    temperature: f64
  , #[arg(long, default_value_t = 4096)]
    max_tokens: u32
  , /// JSON file holding the prompt (string or object of sections)
    #[arg(long)]
    prompt: Option<PathBuf>
  , /// JSON config file; environment variables when absent
    #[arg(long)]
    config: Option<PathBuf>
  , /// Send the prompt as the user message instead of the system one
    #[arg(long)]
    as_user: bool
  , /// Replace the system prompt with the evaluator prompt
    #[arg(long)]
    evaluator: bool
}

fn house_prices_prompt() -> Prompt
{   Prompt::from_sections([
      ("Introduction", Section::from(
        "You are a Kaggle grandmaster attending a competition. \
         You have written code to solve this task and now need to \
         evaluate the output of the code execution. You should \
         determine if there were any bugs as well as report the \
         empirical findings."
      ))
    , ("Task description", Section::from("example_tasks/house_prices"))
    , ("Implementation", Section::Omitted)
    , ("Execution output", Section::Omitted)
    ])
}

fn load_prompt(path: &PathBuf)
  -> Result<Prompt, Box<dyn std::error::Error>>
{   let text = std::fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&text)?;
    Prompt::from_json(value)
      .ok_or_else(|| format!("{} holds no prompt", path.display()).into())
}

async fn run(args: Args) -> Result<String, Box<dyn std::error::Error>>
{   let mut config = match &args.config
    {   Some(path) => AideConfig::from_file(path)?
      , None => AideConfig::from_env()
    };
    if args.evaluator
    {   config = config.with_system_override(EVALUATOR_SYSTEM_PROMPT);
    }
    let client = AideClient::new(&config)?;

    let prompt = match &args.prompt
    {   Some(path) => load_prompt(path)?
      , None => house_prices_prompt()
    };

    let mut query = QueryArgs::new(args.model.clone())
      .temperature(args.temperature)
      .max_tokens(args.max_tokens);
    query = if args.as_user
    {   query.user(prompt)
    } else
    {   query.system(prompt)
    };

    info!("Sending smoke-test prompt to {}", args.model);
    Ok(client.query(query).await?)
}

#[tokio::main]
async fn main() -> ExitCode
{   env_logger::init();
    let args = Args::parse();

    match run(args).await
    {   Ok(output) => {
          println!("{}", output);
          ExitCode::SUCCESS
        }
      , Err(e) => {
          error!("Query failed: {}", e);
          eprintln!("{}", e);
          ExitCode::FAILURE
        }
    }
}
