use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ChatbotError, Result};

pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";
pub const DEFAULT_SOURCE_URL: &str = "https://brainlox.com/courses/category/technical";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub server: ServerConfig,
    pub corpus: CorpusConfig,
    pub splitter: SplitterConfig,
    pub provider: ProviderConfig,
    pub embedding: EmbeddingConfig,
    pub generation: GenerationConfig,
    pub retrieval: RetrievalConfig,
    pub refresh: RefreshConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:5000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    pub source_url: String,
    pub user_agent: String,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            user_agent: concat!("brainlox-chat/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitterConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            chunk_size: 900,
            chunk_overlap: 150,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub model: String,
    pub batch_size: usize,
    pub max_retries: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "models/embedding-001".to_string(),
            batch_size: 100,
            max_retries: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub model: String,
    pub temperature: f32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: "gemini-1.5-flash".to_string(),
            temperature: 0.3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: 3 }
    }
}

/// Periodic corpus rebuild. `None` keeps the startup snapshot for the process lifetime.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    pub interval_secs: Option<u64>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let global = Self::load_global()?;
        let project = Self::load_file(Path::new(".brainlox/brainlox-chat.toml"))?;
        let merged = Self::merge(global, project);
        let config = merged
            .with_overrides(|key| std::env::var(key).ok())
            .normalized();
        config.validate()?;
        Ok(config)
    }

    /// Loads an explicit config file, still honouring environment overrides.
    pub fn load_from(path: &Path) -> Result<Self> {
        let file = Self::load_file(path)?.ok_or_else(|| {
            ChatbotError::Config(format!("config file not found: {}", path.display()))
        })?;
        let config = file
            .with_overrides(|key| std::env::var(key).ok())
            .normalized();
        config.validate()?;
        Ok(config)
    }

    fn load_global() -> Result<Self> {
        let Some(path) = Self::global_path() else {
            return Ok(Self::default());
        };
        Ok(Self::load_file(&path)?.unwrap_or_default())
    }

    /// `config.toml` in the platform config dir; `None` when no home directory is known.
    fn global_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "brainlox")
            .map(|d| d.config_dir().join("config.toml"))
    }

    fn load_file(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map(Some)
            .map_err(|e| ChatbotError::Config(format!("{}: {e}", path.display())))
    }

    fn merge(global: Self, project: Option<Self>) -> Self {
        match project {
            Some(project) => Self {
                api_key: project.api_key.or(global.api_key),
                ..project
            },
            None => global,
        }
    }

    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(key) = lookup(API_KEY_ENV) {
            self.api_key = Some(key);
        }
        if let Some(bind) = lookup("BRAINLOX_BIND") {
            self.server.bind = bind;
        }
        if let Some(url) = lookup("BRAINLOX_SOURCE_URL") {
            self.corpus.source_url = url;
        }
        if let Some(secs) = lookup("BRAINLOX_REFRESH_SECS") {
            match secs.trim().parse::<u64>() {
                Ok(0) => self.refresh.interval_secs = None,
                Ok(n) => self.refresh.interval_secs = Some(n),
                Err(_) => tracing::warn!("ignoring invalid BRAINLOX_REFRESH_SECS={secs}"),
            }
        }
        self
    }

    /// A zero refresh interval means "never", whichever source it came from.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        if self.refresh.interval_secs == Some(0) {
            self.refresh.interval_secs = None;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        let splitter = &self.splitter;
        if splitter.chunk_size == 0 {
            return Err(ChatbotError::Config("chunk_size must be positive".into()));
        }
        if splitter.chunk_overlap >= splitter.chunk_size {
            return Err(ChatbotError::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                splitter.chunk_overlap, splitter.chunk_size
            )));
        }
        if self.retrieval.top_k == 0 {
            return Err(ChatbotError::Config("top_k must be at least 1".into()));
        }
        if !(0.0..=2.0).contains(&self.generation.temperature) {
            return Err(ChatbotError::Config(format!(
                "temperature {} is outside 0.0..=2.0",
                self.generation.temperature
            )));
        }
        if !(1..=100).contains(&self.embedding.batch_size) {
            return Err(ChatbotError::Config(
                "embedding batch_size must be between 1 and 100".into(),
            ));
        }
        Ok(())
    }

    /// The provider credential; the server refuses to start without one.
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(ChatbotError::MissingApiKey)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_match_pipeline_constants() {
        let config = Config::default();
        assert_eq!(config.splitter.chunk_size, 900);
        assert_eq!(config.splitter.chunk_overlap, 150);
        assert_eq!(config.retrieval.top_k, 3);
        assert_eq!(config.embedding.model, "models/embedding-001");
        assert_eq!(config.generation.model, "gemini-1.5-flash");
        assert!((config.generation.temperature - 0.3).abs() < f32::EPSILON);
        assert_eq!(config.corpus.source_url, DEFAULT_SOURCE_URL);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_or_blank_api_key_rejected() {
        let mut config = Config::default();
        assert!(matches!(
            config.require_api_key(),
            Err(ChatbotError::MissingApiKey)
        ));

        config.api_key = Some("   ".to_string());
        assert!(matches!(
            config.require_api_key(),
            Err(ChatbotError::MissingApiKey)
        ));

        config.api_key = Some(" abc ".to_string());
        assert_eq!(config.require_api_key().unwrap(), "abc");
    }

    #[test]
    fn test_env_overrides_file_values() {
        let file: Config = toml::from_str(
            r#"
api_key = "from-file"

[server]
bind = "0.0.0.0:8080"
"#,
        )
        .unwrap();

        let config = file.with_overrides(env(&[
            ("GOOGLE_API_KEY", "from-env"),
            ("BRAINLOX_REFRESH_SECS", "3600"),
        ]));

        assert_eq!(config.api_key.as_deref(), Some("from-env"));
        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert_eq!(config.refresh.interval_secs, Some(3600));
    }

    #[test]
    fn test_zero_refresh_disables() {
        let mut config = Config::default();
        config.refresh.interval_secs = Some(60);
        let config = config.with_overrides(env(&[("BRAINLOX_REFRESH_SECS", "0")]));
        assert_eq!(config.refresh.interval_secs, None);
    }

    #[test]
    fn test_zero_refresh_in_file_disables() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("brainlox-chat.toml");
        std::fs::write(&path, "[refresh]\ninterval_secs = 0\n").unwrap();

        let file = Config::load_file(&path).unwrap().unwrap();
        assert_eq!(file.refresh.interval_secs, Some(0));
        assert_eq!(file.normalized().refresh.interval_secs, None);

        let config = Config::load_from(&path).unwrap();
        assert_ne!(config.refresh.interval_secs, Some(0));
    }

    #[test]
    fn test_global_path_is_absolute() {
        if let Some(path) = Config::global_path() {
            assert!(path.is_absolute(), "{}", path.display());
            assert!(path.ends_with("config.toml"));
        }
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: Config = toml::from_str(
            r"
[splitter]
chunk_size = 500
",
        )
        .unwrap();
        assert_eq!(config.splitter.chunk_size, 500);
        assert_eq!(config.splitter.chunk_overlap, 150);
        assert_eq!(config.retrieval.top_k, 3);
    }

    #[test]
    fn test_project_file_inherits_global_key() {
        let global = Config {
            api_key: Some("global".to_string()),
            ..Config::default()
        };
        let project = Config {
            server: ServerConfig {
                bind: "127.0.0.1:9000".to_string(),
            },
            ..Config::default()
        };

        let merged = Config::merge(global, Some(project));
        assert_eq!(merged.api_key.as_deref(), Some("global"));
        assert_eq!(merged.server.bind, "127.0.0.1:9000");
    }

    #[test]
    fn test_overlap_must_be_smaller_than_size() {
        let mut config = Config::default();
        config.splitter.chunk_overlap = 900;
        assert!(matches!(config.validate(), Err(ChatbotError::Config(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("brainlox-chat.toml");
        std::fs::write(
            &path,
            r#"
[retrieval]
top_k = 5

[corpus]
source_url = "https://example.com/courses"
"#,
        )
        .unwrap();

        let config = Config::load_file(&path).unwrap().unwrap();
        assert_eq!(config.retrieval.top_k, 5);
        assert_eq!(config.corpus.source_url, "https://example.com/courses");

        let missing = Config::load_file(&dir.path().join("nope.toml")).unwrap();
        assert!(missing.is_none());
    }
}
