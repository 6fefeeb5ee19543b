use anyhow::{Context, Result};
use codeops::config::AppConfig;
use codeops::server;
use std::net::SocketAddr;
use tokio::net::TcpListener;

#[derive(Debug, clap::Args)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:8787", env = "CODEOPS_BIND")]
    pub bind: SocketAddr,
}

pub async fn run(args: ServeArgs, config: AppConfig) -> Result<()> {
    let actions = config.action_handler();
    if !actions.router().has_providers() {
        tracing::warn!(
            "No AI provider configured; set GROQ_API_KEY and/or AI_GATEWAY_API_KEY. \
             /analyze-code will answer 500 until then."
        );
    }
    for line in config.describe_providers() {
        tracing::info!("Provider {}", line);
    }

    let listener = TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("Failed to bind {}", args.bind))?;
    let addr = listener.local_addr().context("Failed to read bound address")?;
    tracing::info!("CodeOps services listening on http://{}", addr);

    server::serve(listener, config.repo_fetcher(), actions)
        .await
        .context("Server terminated with an error")
}
