//! Configuration settings for Vidtwin.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub corpus: CorpusSettings,
    pub model: ModelSettings,
    pub context: ContextSettings,
    pub server: ServerSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
        }
    }
}

/// Which corpus backend answers retrieval queries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CorpusBackend {
    /// Keyword scan over a directory of JSON records.
    #[default]
    Scan,
    /// External nearest-neighbor index (Chroma REST API).
    Index,
}

impl std::str::FromStr for CorpusBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "scan" | "files" => Ok(CorpusBackend::Scan),
            "index" | "chroma" => Ok(CorpusBackend::Index),
            _ => Err(format!("Unknown corpus backend: {}", s)),
        }
    }
}

impl std::fmt::Display for CorpusBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CorpusBackend::Scan => write!(f, "scan"),
            CorpusBackend::Index => write!(f, "index"),
        }
    }
}

/// Corpus location settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusSettings {
    /// Backend selected at startup.
    pub backend: CorpusBackend,
    /// Directory of `<key>.json` records (scan backend).
    pub dataset_dir: String,
    /// Base URL of the index service (index backend).
    pub index_url: String,
    /// Collection name inside the index service.
    pub collection: String,
    /// Timeout for a single retrieval, in seconds.
    pub timeout_seconds: u64,
}

impl Default for CorpusSettings {
    fn default() -> Self {
        Self {
            backend: CorpusBackend::Scan,
            dataset_dir: "../video-dataset".to_string(),
            index_url: "http://localhost:8000".to_string(),
            collection: "videos".to_string(),
            timeout_seconds: 10,
        }
    }
}

/// Generative model provider type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ModelProvider {
    /// Google Gemini `generateContent` API.
    #[default]
    Gemini,
    /// OpenAI chat completions.
    OpenAI,
}

impl std::str::FromStr for ModelProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gemini" | "google" => Ok(ModelProvider::Gemini),
            "openai" => Ok(ModelProvider::OpenAI),
            _ => Err(format!("Unknown model provider: {}", s)),
        }
    }
}

impl std::fmt::Display for ModelProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelProvider::Gemini => write!(f, "gemini"),
            ModelProvider::OpenAI => write!(f, "openai"),
        }
    }
}

/// Generative model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    pub provider: ModelProvider,
    /// Model name passed to the provider.
    pub model: String,
    /// API key. Falls back to `GEMINI_API_KEY` / `OPENAI_API_KEY`.
    pub api_key: Option<String>,
    /// Override for the provider's base URL.
    pub base_url: Option<String>,
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
    pub max_output_tokens: u32,
    /// Upper bound on a single model call, in seconds.
    pub timeout_seconds: u64,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            provider: ModelProvider::Gemini,
            model: "gemini-2.0-flash".to_string(),
            api_key: None,
            base_url: None,
            temperature: 0.7,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens: 1000,
            timeout_seconds: 60,
        }
    }
}

impl ModelSettings {
    /// Resolve the API key from config or the provider's environment variable.
    pub fn resolved_api_key(&self) -> Option<String> {
        if let Some(key) = self.api_key.as_ref().filter(|k| !k.is_empty()) {
            return Some(key.clone());
        }
        let var = match self.provider {
            ModelProvider::Gemini => "GEMINI_API_KEY",
            ModelProvider::OpenAI => "OPENAI_API_KEY",
        };
        std::env::var(var).ok().filter(|k| !k.is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Context assembly settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextSettings {
    /// Number of ranked records placed in the context.
    pub max_sources: usize,
    /// Number of most recent conversation turns forwarded to the model.
    pub history_window: usize,
    /// Optional character budget for the rendered record blocks.
    pub max_context_chars: Option<usize>,
}

impl Default for ContextSettings {
    fn default() -> Self {
        Self {
            max_sources: 5,
            history_window: 10,
            max_context_chars: None,
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        let mut settings = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Settings::default()
        };

        settings.apply_env_overrides();
        settings.validate()?;
        Ok(settings)
    }

    /// Apply `VIDTWIN_*` environment overrides.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(dir) = std::env::var("VIDTWIN_DATASET_DIR") {
            if !dir.is_empty() {
                self.corpus.dataset_dir = dir;
            }
        }
        if let Ok(url) = std::env::var("VIDTWIN_INDEX_URL") {
            if !url.is_empty() {
                self.corpus.index_url = url;
            }
        }
    }

    /// Check values that would otherwise fail deep inside a request.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.corpus.backend == CorpusBackend::Index {
            url::Url::parse(&self.corpus.index_url).map_err(|e| {
                crate::error::VidtwinError::Config(format!(
                    "Invalid corpus.index_url '{}': {}",
                    self.corpus.index_url, e
                ))
            })?;
        }
        if self.context.max_sources == 0 {
            return Err(crate::error::VidtwinError::Config(
                "context.max_sources must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::VidtwinError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vidtwin")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded dataset directory path.
    pub fn dataset_dir(&self) -> PathBuf {
        Self::expand_path(&self.corpus.dataset_dir)
    }

    pub fn retrieval_timeout(&self) -> Duration {
        Duration::from_secs(self.corpus.timeout_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.corpus.backend, CorpusBackend::Scan);
        assert_eq!(settings.context.max_sources, 5);
        assert_eq!(settings.context.history_window, 10);
        assert!(settings.context.max_context_chars.is_none());
        assert_eq!(settings.model.top_k, 40);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [corpus]
            backend = "index"
            collection = "clips"

            [model]
            provider = "openai"
            model = "gpt-4o-mini"
            "#,
        )
        .unwrap();

        assert_eq!(settings.corpus.backend, CorpusBackend::Index);
        assert_eq!(settings.corpus.collection, "clips");
        assert_eq!(settings.corpus.index_url, "http://localhost:8000");
        assert_eq!(settings.model.provider, ModelProvider::OpenAI);
        assert_eq!(settings.model.max_output_tokens, 1000);
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(settings.server.port, 3000);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut settings = Settings::default();
        settings.context.max_context_chars = Some(4000);
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.context.max_context_chars, Some(4000));
    }

    #[test]
    fn test_validate_rejects_bad_index_url() {
        let mut settings = Settings::default();
        settings.corpus.backend = CorpusBackend::Index;
        settings.corpus.index_url = "not a url".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_backend_from_str() {
        assert_eq!("chroma".parse::<CorpusBackend>().unwrap(), CorpusBackend::Index);
        assert_eq!("Scan".parse::<CorpusBackend>().unwrap(), CorpusBackend::Scan);
        assert!("sqlite".parse::<CorpusBackend>().is_err());
    }
}
