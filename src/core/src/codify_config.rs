use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::auth::LoginPolicy;
use crate::language::{Language, LanguageCatalog};
use crate::paths::codify_config_path;

/// Optional `~/.codify/config.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CodifyConfig {
    pub provider: ProviderConfig,
    pub login: LoginConfig,
    pub ui: UiConfig,
}

impl CodifyConfig {
    pub fn load() -> Result<Self, String> {
        let path = codify_config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw =
            std::fs::read_to_string(&path).map_err(|e| format!("read config.toml: {e}"))?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<Self, String> {
        toml::from_str(raw).map_err(|e| format!("parse config.toml: {e}"))
    }

    pub fn config_path() -> Result<PathBuf, String> {
        codify_config_path()
    }

    pub fn language_catalog(&self) -> LanguageCatalog {
        let languages: Vec<Language> = self
            .ui
            .languages
            .iter()
            .filter(|l| !l.label.trim().is_empty())
            .map(|l| Language::new(l.label.trim(), l.syntax.trim(), l.extension.trim()))
            .collect();
        if languages.is_empty() {
            return LanguageCatalog::default();
        }
        LanguageCatalog::new(languages)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Display name of the inference engine on the docs page.
    pub engine: String,
    pub base_url: String,
    pub model: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Inline API key; the environment variable wins when both are set.
    pub api_key: String,
    /// System prompt; `{language}` is replaced with the target label.
    pub system_prompt: String,
    /// Request timeout in seconds; 0 leaves the client default.
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            engine: "Groq LPU".to_string(),
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "llama-3.3-70b-versatile".to_string(),
            api_key_env: "GROQ_API_KEY".to_string(),
            api_key: String::new(),
            system_prompt: "You are a professional Data Science script generator. \
                Return ONLY clean {language} code. Do not include markdown formatting, \
                explanations, or backticks. Just the code."
                .to_string(),
            timeout_secs: 0,
        }
    }
}

impl ProviderConfig {
    pub fn resolve_api_key(&self) -> Option<String> {
        let from_env = std::env::var(&self.api_key_env)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        from_env.or_else(|| {
            let inline = self.api_key.trim();
            (!inline.is_empty()).then(|| inline.to_string())
        })
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    pub fn render_system_prompt(&self, language: &str) -> String {
        self.system_prompt.replace("{language}", language)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginMode {
    Fixed,
    NonEmpty,
    AcceptAll,
}

impl LoginMode {
    pub fn from_label(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fixed" => Some(Self::Fixed),
            "non_empty" | "non-empty" => Some(Self::NonEmpty),
            "accept_all" | "accept-all" | "open" => Some(Self::AcceptAll),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoginConfig {
    pub mode: LoginMode,
    pub identity: String,
    pub secret: String,
}

impl Default for LoginConfig {
    fn default() -> Self {
        Self {
            mode: LoginMode::Fixed,
            identity: "admin".to_string(),
            secret: "cyber2026".to_string(),
        }
    }
}

impl LoginConfig {
    pub fn policy(&self) -> LoginPolicy {
        self.policy_for(self.mode)
    }

    pub fn policy_for(&self, mode: LoginMode) -> LoginPolicy {
        match mode {
            LoginMode::Fixed => LoginPolicy::Fixed {
                identity: self.identity.clone(),
                secret: self.secret.clone(),
            },
            LoginMode::NonEmpty => LoginPolicy::NonEmpty,
            LoginMode::AcceptAll => LoginPolicy::AcceptAll,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub languages: Vec<LanguageConfig>,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            languages: LanguageCatalog::default()
                .options()
                .into_iter()
                .map(|l| LanguageConfig {
                    label: l.label.clone(),
                    syntax: l.syntax.clone(),
                    extension: l.extension.clone(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LanguageConfig {
    pub label: String,
    pub syntax: String,
    pub extension: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = CodifyConfig::parse("").unwrap();
        assert_eq!(config.provider.model, "llama-3.3-70b-versatile");
        assert_eq!(config.login.mode, LoginMode::Fixed);
        assert_eq!(config.language_catalog().labels(), vec!["Python", "R", "SQL", "Julia"]);
    }

    #[test]
    fn overrides_sections() {
        let raw = r#"
            [provider]
            model = "mixtral"
            timeout_secs = 30

            [login]
            mode = "accept_all"

            [[ui.languages]]
            label = "Rust"
            syntax = "rust"
            extension = "rs"
        "#;
        let config = CodifyConfig::parse(raw).unwrap();
        assert_eq!(config.provider.model, "mixtral");
        assert_eq!(config.provider.timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.login.policy(), LoginPolicy::AcceptAll);
        let catalog = config.language_catalog();
        assert_eq!(catalog.labels(), vec!["Rust"]);
        assert_eq!(catalog.download_file_name("Rust"), "codify_output.rs");
    }

    #[test]
    fn blank_language_list_falls_back_to_defaults() {
        let raw = r#"
            [ui]
            languages = []
        "#;
        let config = CodifyConfig::parse(raw).unwrap();
        assert_eq!(config.language_catalog().labels().len(), 4);
    }

    #[test]
    fn system_prompt_mentions_language() {
        let provider = ProviderConfig::default();
        let prompt = provider.render_system_prompt("SQL");
        assert!(prompt.contains("Return ONLY clean SQL code."));
        assert!(!prompt.contains("{language}"));
    }

    #[test]
    fn login_mode_labels() {
        assert_eq!(LoginMode::from_label("NON_EMPTY"), Some(LoginMode::NonEmpty));
        assert_eq!(LoginMode::from_label("accept-all"), Some(LoginMode::AcceptAll));
        assert_eq!(LoginMode::from_label("sso"), None);
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(CodifyConfig::parse("provider = [").is_err());
    }
}
