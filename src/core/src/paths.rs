use std::path::PathBuf;

use directories::BaseDirs;

fn env_home_dir() -> Option<PathBuf> {
    if let Some(home) = std::env::var_os("HOME") {
        if !home.is_empty() {
            return Some(PathBuf::from(home));
        }
    }
    if let Some(profile) = std::env::var_os("USERPROFILE") {
        if !profile.is_empty() {
            return Some(PathBuf::from(profile));
        }
    }
    None
}

pub fn user_home_dir() -> Option<PathBuf> {
    if let Some(base) = BaseDirs::new() {
        return Some(base.home_dir().to_path_buf());
    }
    env_home_dir()
}

/// Resolve (and create) the Codify home directory.
///
/// `CODIFY_HOME` wins when set; otherwise `~/.codify`.
pub fn codify_home_dir() -> Result<PathBuf, String> {
    if let Some(override_dir) = std::env::var_os("CODIFY_HOME") {
        let path = PathBuf::from(override_dir);
        if path.is_relative() {
            return Err("CODIFY_HOME must be an absolute path".to_string());
        }
        std::fs::create_dir_all(&path)
            .map_err(|e| format!("failed to create CODIFY_HOME directory: {e}"))?;
        return Ok(path);
    }

    let home = user_home_dir().ok_or_else(|| {
        "failed to resolve user home; set CODIFY_HOME or HOME/USERPROFILE".to_string()
    })?;
    let dir = home.join(".codify");
    std::fs::create_dir_all(&dir).map_err(|e| format!("failed to create ~/.codify: {e}"))?;
    Ok(dir)
}

pub fn codify_config_path() -> Result<PathBuf, String> {
    Ok(codify_home_dir()?.join("config.toml"))
}

pub fn codify_history_db_path() -> Result<PathBuf, String> {
    Ok(codify_home_dir()?.join("history.db"))
}
