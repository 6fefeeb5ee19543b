//! CodeOps launcher library.
//!
//! Configuration loading, the HTTP host for the fetch and AI action services,
//! and orchestrator assembly. The `codeops` binary is a thin CLI over this.

pub mod config;
pub mod server;

pub use config::{AppConfig, ConfigError};

use codeops_pipeline::{HttpClient, LocalClient, Orchestrator};
use std::sync::Arc;

/// An orchestrator talking to the hosted services at `service_url`, or to
/// in-process services when no URL is configured.
pub fn build_orchestrator(config: &AppConfig) -> Orchestrator {
    let orchestrator = match config.service_url.as_deref() {
        Some(url) => {
            tracing::info!("Using hosted services at {}", url);
            let client =
                Arc::new(HttpClient::new(url).with_api_key(config.service_key.clone()));
            Orchestrator::new(client.clone(), client)
        }
        None => {
            let client = Arc::new(LocalClient::new(
                config.repo_fetcher(),
                config.action_handler(),
            ));
            Orchestrator::new(client.clone(), client)
        }
    };
    orchestrator.with_settings(config.orchestrator_settings())
}
