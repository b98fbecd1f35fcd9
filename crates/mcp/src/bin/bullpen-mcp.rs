// Standalone MLB MCP server binary

use anyhow::Result;
use bullpen_mcp::server::McpServer;
use bullpen_mcp::tools::{mlb_registry, StatsApi};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "bullpen-mcp")]
#[command(about = "MLB statistics tools over the Model Context Protocol", long_about = None)]
struct Args {
    /// Serve streamable HTTP instead of stdio
    #[arg(long)]
    http: bool,

    /// Port for HTTP mode
    #[arg(short, long, env = "PORT", default_value = "8000")]
    port: u16,

    /// Host to bind to in HTTP mode
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries protocol traffic in stdio mode
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bullpen_mcp=info,tower_http=info".into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let registry = mlb_registry(&StatsApi::new()?);
    tracing::info!("Registered {} tools", registry.len());

    let server = McpServer::new(registry);

    if args.http {
        let addr = format!("{}:{}", args.host, args.port);
        bullpen_mcp::http::serve(&addr, server).await?;
    } else {
        server.serve_stdio().await?;
    }

    Ok(())
}
