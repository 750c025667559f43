use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use codify_core::{
    build_router, codify_history_db_path, ChatCompletionsClient, CodifyConfig, InferenceClient,
    LoginMode, ProviderError, ServerConfig, SqliteHistoryStore, UnconfiguredInference,
};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_filter())
        .init();

    let codify_config = load_codify_config();
    let defaults = ServerConfig::from_codify_config(&codify_config);

    let bind = parse_socket("CODIFY_BIND", defaults.bind);
    let history_limit = parse_usize("CODIFY_HISTORY_LIMIT", defaults.history_limit);
    let login = match env::var("CODIFY_LOGIN_MODE") {
        Ok(v) => match LoginMode::from_label(&v) {
            Some(mode) => codify_config.login.policy_for(mode),
            None => {
                tracing::warn!(value = %v, "unknown CODIFY_LOGIN_MODE; using config");
                defaults.login.clone()
            }
        },
        Err(_) => defaults.login.clone(),
    };

    let config = ServerConfig {
        bind,
        history_limit,
        login,
        ..defaults
    };

    let db_path = match env::var("CODIFY_DB_PATH") {
        Ok(v) if !v.trim().is_empty() => PathBuf::from(v),
        _ => codify_history_db_path()?,
    };
    let store = SqliteHistoryStore::open(&db_path)?;
    tracing::info!(path = %db_path.display(), "history store opened");

    let inference = build_inference(&codify_config);

    let app = build_router(config.clone(), Arc::new(store), inference);

    let listener = TcpListener::bind(config.bind).await?;
    tracing::info!(
        addr = %config.bind,
        login = config.login.label(),
        languages = ?config.languages.labels(),
        "listening"
    );

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;

    Ok(())
}

fn load_codify_config() -> CodifyConfig {
    match CodifyConfig::load() {
        Ok(config) => config,
        Err(err) => {
            let path = CodifyConfig::config_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|_| "~/.codify/config.toml".to_string());
            tracing::warn!(%path, error = %err, "failed to load codify config; using defaults");
            CodifyConfig::default()
        }
    }
}

fn build_inference(config: &CodifyConfig) -> Arc<dyn InferenceClient> {
    let provider = &config.provider;
    match ChatCompletionsClient::from_config(provider) {
        Ok(client) => {
            tracing::info!(endpoint = %client.endpoint(), model = %provider.model, "inference client ready");
            Arc::new(client)
        }
        Err(ProviderError::MissingApiKey { env_var }) => {
            tracing::warn!(%env_var, "no provider credential; generation will fail until it is set");
            Arc::new(UnconfiguredInference::new(env_var, provider.model.clone()))
        }
        Err(err) => {
            tracing::error!(error = %err, "failed to build inference client");
            Arc::new(UnconfiguredInference::new(
                provider.api_key_env.clone(),
                provider.model.clone(),
            ))
        }
    }
}

fn parse_socket(key: &str, default: SocketAddr) -> SocketAddr {
    match env::var(key) {
        Ok(v) => v.parse().unwrap_or(default),
        Err(_) => default,
    }
}

fn parse_usize(key: &str, default: usize) -> usize {
    match env::var(key) {
        Ok(v) => v.parse::<usize>().ok().filter(|n| *n > 0).unwrap_or(default),
        Err(_) => default,
    }
}

fn tracing_filter() -> tracing_subscriber::EnvFilter {
    let explicit = env::var("CODIFY_LOG").or_else(|_| env::var("RUST_LOG")).ok();
    if let Some(filter) = explicit {
        return tracing_subscriber::EnvFilter::new(filter);
    }
    if matches!(
        env::var("CODIFY_DEBUG").as_deref(),
        Ok("1" | "true" | "TRUE" | "yes" | "YES")
    ) {
        return tracing_subscriber::EnvFilter::new("debug");
    }
    tracing_subscriber::EnvFilter::new("info")
}
