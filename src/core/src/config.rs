use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use crate::auth::LoginPolicy;
use crate::codify_config::CodifyConfig;
use crate::language::LanguageCatalog;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: 127.0.0.1:8501).
    pub bind: SocketAddr,
    /// Number of history records shown in the sidebar.
    pub history_limit: usize,
    /// How the login gate treats submitted credentials.
    pub login: LoginPolicy,
    /// Languages offered by the generator page.
    pub languages: LanguageCatalog,
    /// Inference engine name shown on the docs page.
    pub engine: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 8501),
            history_limit: 5,
            login: LoginPolicy::default(),
            languages: LanguageCatalog::default(),
            engine: "Groq LPU".to_string(),
        }
    }
}

impl ServerConfig {
    /// Defaults overlaid with the file-backed settings.
    pub fn from_codify_config(codify: &CodifyConfig) -> Self {
        Self {
            login: codify.login.policy(),
            languages: codify.language_catalog(),
            engine: codify.provider.engine.clone(),
            ..Self::default()
        }
    }
}
