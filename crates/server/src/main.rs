use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

mod api;
mod config;

use config::{AppState, Environment, ServerConfig};

#[derive(Parser, Debug)]
#[command(name = "bullpen")]
#[command(about = "MLB transfer agent over HTTP", long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "bullpen.toml")]
    config: PathBuf,

    /// Directory holding the prompt templates
    #[arg(long, default_value = "prompts")]
    prompts_dir: PathBuf,

    /// Port to listen on
    #[arg(short, long, default_value = "8000")]
    port: u16,

    /// Host to bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; real environment variables win
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bullpen=info,tower_http=debug".into()),
        )
        .with_target(false)
        .init();

    let args = Args::parse();

    tracing::info!("Starting Bullpen MLB transfer agent");

    let config = ServerConfig::load(&args.config)?;
    let env = Environment::from_env()?;

    tracing::info!("Model: {}", env.anthropic_model);
    if env.langsmith.tracing {
        tracing::info!(
            project = env.langsmith.project.as_deref().unwrap_or("default"),
            api_key_set = env.langsmith.api_key_set,
            "LangSmith tracing requested; traces are not exported by this server"
        );
    }

    let state = AppState::new(&config, &env, &args.prompts_dir, args.port)?;

    let addr = format!("{}:{}", args.host, args.port);
    tracing::info!("Starting API server on {}", addr);

    api::serve(&addr, state).await?;

    Ok(())
}
