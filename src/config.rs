//! User configuration, loaded with confy

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::Result;

pub const APP_NAME: &str = "lockin";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the JSON state files
    pub data_directory: String,
    /// Text model used for planning, breakdowns and chat lines
    pub model: String,
    /// Image model used for infographics
    pub image_model: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Per-request timeout; no timeout when unset
    pub request_timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_directory: default_data_directory().to_string_lossy().into_owned(),
            model: "gemini-2.5-flash".to_string(),
            image_model: "gemini-2.5-flash-image".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            request_timeout_secs: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Ok(confy::load(APP_NAME, None)?)
    }

    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.data_directory)
    }
}

fn default_data_directory() -> PathBuf {
    if let Some(dirs) = ProjectDirs::from("ai", "lockin", APP_NAME) {
        return dirs.data_dir().to_path_buf();
    }
    dirs::home_dir()
        .map(|home| home.join(".lockin"))
        .unwrap_or_else(|| PathBuf::from(".lockin"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.image_model, "gemini-2.5-flash-image");
        assert_eq!(config.api_key_env, "GEMINI_API_KEY");
        assert!(config.request_timeout_secs.is_none());
        assert!(!config.data_directory.is_empty());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"model": "gemini-2.5-pro"}"#).unwrap();
        assert_eq!(config.model, "gemini-2.5-pro");
        assert_eq!(config.api_key_env, "GEMINI_API_KEY");
    }
}
