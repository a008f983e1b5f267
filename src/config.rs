use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;

/// Main configuration structure for the tutor gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub genai: GenAiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub name: String,
    pub version: String,
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenAiConfig {
    pub api_key: String,
    /// Cloud project the Vertex endpoint is scoped to.
    pub project: String,
    pub location: String,
    /// Model used for the single-shot classification and general calls.
    pub classify_model: String,
    /// Model used for the retrieval-grounded pipeline calls.
    pub rag_model: String,
    /// Per-pipeline corpus identifiers. Deliberately separate values even when
    /// a deployment points both at the same corpus.
    pub math_corpus: String,
    pub social_corpus: String,
}

impl Config {
    /// Load configuration from file with environment variable overrides.
    /// ALWAYS returns a valid config - never fails.
    pub fn load() -> Self {
        if dotenvy::dotenv().is_ok() {
            tracing::info!("Loaded .env from current directory");
        }

        let config_path = env::var("TG_CONFIG_PATH").unwrap_or_else(|_| "config.yaml".to_string());

        let mut config = if Path::new(&config_path).exists() {
            match fs::read_to_string(&config_path) {
                Ok(contents) => match serde_yaml::from_str::<Config>(&contents) {
                    Ok(config) => {
                        tracing::info!("Loaded configuration from {}", config_path);
                        config
                    }
                    Err(e) => {
                        tracing::error!(
                            "Failed to parse config file {}: {} - using defaults",
                            config_path,
                            e
                        );
                        Self::default()
                    }
                },
                Err(e) => {
                    tracing::error!(
                        "Failed to read config file {}: {} - using defaults",
                        config_path,
                        e
                    );
                    Self::default()
                }
            }
        } else {
            tracing::warn!("Config file not found at {} - using defaults", config_path);
            Self::default()
        };

        config.apply_env_overrides();

        // Validate configuration - log warnings but don't fail
        if let Err(e) = config.validate() {
            tracing::warn!("Config validation warnings: {} - continuing anyway", e);
        }

        config
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(name) = env::var("TG_SERVER_NAME") {
            self.server.name = name;
        }
        if let Ok(host) = env::var("TG_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = env::var("PORT") {
            if let Ok(port_num) = port.parse() {
                self.server.port = port_num;
            }
        }

        if let Ok(api_key) = env::var("GENAI_API_KEY") {
            self.genai.api_key = api_key;
        }
        if let Ok(project) = env::var("GENAI_PROJECT") {
            self.genai.project = project;
        }
        if let Ok(location) = env::var("GENAI_LOCATION") {
            self.genai.location = location;
        }
        if let Ok(model) = env::var("GENAI_CLASSIFY_MODEL") {
            self.genai.classify_model = model;
        }
        if let Ok(model) = env::var("GENAI_RAG_MODEL") {
            self.genai.rag_model = model;
        }
        if let Ok(corpus) = env::var("TG_MATH_CORPUS") {
            self.genai.math_corpus = corpus;
        }
        if let Ok(corpus) = env::var("TG_SOCIAL_CORPUS") {
            self.genai.social_corpus = corpus;
        }
    }

    /// Validate configuration
    fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        if self.server.port == 0 {
            return Err("Server port cannot be 0".into());
        }

        if self.genai.api_key == "PLACEHOLDER_GENAI_API_KEY" || self.genai.api_key.is_empty() {
            return Err("GENAI_API_KEY environment variable must be set".into());
        }

        if self.genai.math_corpus.is_empty() || self.genai.social_corpus.is_empty() {
            return Err("Pipeline corpus IDs cannot be empty".into());
        }

        if self.genai.math_corpus == self.genai.social_corpus {
            // Known deployment gap: both pipelines grounded against one corpus.
            return Err("math_corpus and social_corpus point at the same corpus".into());
        }

        Ok(())
    }

    /// Socket address the HTTP boundary binds to
    pub fn bind_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.server.host, self.server.port).parse()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "tutor-gateway".to_string(),
                version: "1.0.0".to_string(),
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            genai: GenAiConfig {
                api_key: env::var("GENAI_API_KEY").unwrap_or_else(|_| {
                    tracing::warn!("GENAI_API_KEY not set, using placeholder");
                    "PLACEHOLDER_GENAI_API_KEY".to_string()
                }),
                project: "nestbees".to_string(),
                location: "global".to_string(),
                classify_model: "gemini-2.5-flash".to_string(),
                rag_model: "gemini-2.5-flash-lite".to_string(),
                math_corpus:
                    "projects/nestbees/locations/us-central1/ragCorpora/4611686018427387904"
                        .to_string(),
                social_corpus:
                    "projects/nestbees/locations/us-central1/ragCorpora/4611686018427387904"
                        .to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_complete() {
        let config = Config::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.genai.classify_model, "gemini-2.5-flash");
        assert_eq!(config.genai.rag_model, "gemini-2.5-flash-lite");
        assert!(!config.genai.math_corpus.is_empty());
        assert!(!config.genai.social_corpus.is_empty());
    }

    #[test]
    fn test_validate_flags_shared_corpus() {
        let mut config = Config::default();
        config.genai.api_key = "test-key".to_string();
        // Defaults mirror the observed deployment where both pipelines share
        // one corpus; validate() calls that out as a warning condition.
        assert!(config.validate().is_err());

        config.genai.social_corpus = "projects/p/locations/l/ragCorpora/2".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bind_addr_parses() {
        let mut config = Config::default();
        config.server.host = "127.0.0.1".to_string();
        config.server.port = 8080;
        let addr = config.bind_addr().expect("addr");
        assert_eq!(addr.to_string(), "127.0.0.1:8080");
    }

    #[test]
    fn test_config_yaml_round_trip() {
        let yaml = r#"
server:
  name: tutor-gateway
  version: 1.0.0
  host: 127.0.0.1
  port: 4000
genai:
  api_key: from-file
  project: nestbees
  location: global
  classify_model: gemini-2.5-flash
  rag_model: gemini-2.5-flash-lite
  math_corpus: projects/p/locations/l/ragCorpora/1
  social_corpus: projects/p/locations/l/ragCorpora/2
"#;
        let config: Config = serde_yaml::from_str(yaml).expect("parse yaml");
        assert_eq!(config.server.port, 4000);
        assert_eq!(
            config.genai.math_corpus,
            "projects/p/locations/l/ragCorpora/1"
        );
    }
}
