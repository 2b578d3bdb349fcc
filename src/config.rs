use serde::Deserialize;
use std::env;
use std::sync::OnceLock;
use thiserror::Error;

/// Default base URL of the hosted Generative Language API.
pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com";
/// Model used for answer generation unless overridden.
pub const DEFAULT_GENERATION_MODEL: &str = "gemini-pro";
/// Model used for embeddings unless overridden.
pub const DEFAULT_EMBEDDING_MODEL: &str = "embedding-001";
/// Characters per chunk unless overridden.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;
/// Character overlap between adjacent chunks unless overridden.
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;
/// Number of retrieved chunks stuffed into the prompt unless overridden.
pub const DEFAULT_TOP_K: usize = 4;
/// Listening port unless overridden.
pub const DEFAULT_SERVER_PORT: u16 = 3000;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the Contract QA server.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// API key for the hosted Generative Language API, read once at startup.
    pub gemini_api_key: String,
    /// Base URL of the hosted API; overridable so tests can aim at a mock server.
    pub gemini_api_base_url: String,
    /// Model identifier used for answer generation.
    pub gemini_generation_model: String,
    /// Model identifier used for embeddings.
    pub gemini_embedding_model: String,
    /// Pipeline variant active for every request handled by this process.
    pub answer_mode: AnswerMode,
    /// Characters per chunk produced by the text splitter.
    pub text_splitter_chunk_size: usize,
    /// Character overlap between adjacent chunks; must be smaller than the chunk size.
    pub text_splitter_chunk_overlap: usize,
    /// Number of top-ranked chunks passed to the generation prompt.
    pub retriever_top_k: usize,
    /// Port the HTTP server listens on.
    pub server_port: u16,
}

/// Answering variants supported by the pipeline.
///
/// The service runs in exactly one mode, chosen at startup, instead of mixing
/// the two historical forks per request.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AnswerMode {
    /// Full pipeline: fetch the document, chunk, embed, retrieve, then answer.
    Retrieval,
    /// Forward the question (plus a bare mention of the file reference)
    /// straight to the model without touching the document.
    Direct,
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        let text_splitter_chunk_size =
            load_env_parsed("TEXT_SPLITTER_CHUNK_SIZE", DEFAULT_CHUNK_SIZE)?;
        let text_splitter_chunk_overlap =
            load_env_parsed("TEXT_SPLITTER_CHUNK_OVERLAP", DEFAULT_CHUNK_OVERLAP)?;
        validate_splitter(text_splitter_chunk_size, text_splitter_chunk_overlap)?;

        Ok(Self {
            gemini_api_key: load_env("GEMINI_API_KEY")?,
            gemini_api_base_url: load_env_optional("GEMINI_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            gemini_generation_model: load_env_optional("GEMINI_GENERATION_MODEL")
                .unwrap_or_else(|| DEFAULT_GENERATION_MODEL.to_string()),
            gemini_embedding_model: load_env_optional("GEMINI_EMBEDDING_MODEL")
                .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
            answer_mode: match load_env_optional("ANSWER_MODE") {
                Some(value) => value
                    .parse()
                    .map_err(|()| ConfigError::InvalidValue("ANSWER_MODE".to_string()))?,
                None => AnswerMode::Retrieval,
            },
            text_splitter_chunk_size,
            text_splitter_chunk_overlap,
            retriever_top_k: load_env_parsed("RETRIEVER_TOP_K", DEFAULT_TOP_K)?,
            server_port: load_env_parsed("SERVER_PORT", DEFAULT_SERVER_PORT)?,
        })
    }
}

fn load_env(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::MissingVariable(key.to_string()))
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn load_env_parsed<T: std::str::FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    match load_env_optional(key) {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

/// Reject splitter settings that cannot produce a terminating chunk sequence.
fn validate_splitter(chunk_size: usize, overlap: usize) -> Result<(), ConfigError> {
    if chunk_size == 0 {
        return Err(ConfigError::InvalidValue(
            "TEXT_SPLITTER_CHUNK_SIZE".to_string(),
        ));
    }
    if overlap >= chunk_size {
        return Err(ConfigError::InvalidValue(
            "TEXT_SPLITTER_CHUNK_OVERLAP".to_string(),
        ));
    }
    Ok(())
}

impl std::str::FromStr for AnswerMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "retrieval" => Ok(Self::Retrieval),
            "direct" => Ok(Self::Direct),
            _ => Err(()),
        }
    }
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from the environment and install it in the global cache.
pub fn init_config() {
    dotenvy::dotenv().ok();
    let config = Config::from_env().expect("Failed to load config from environment");
    tracing::debug!(
        base_url = %config.gemini_api_base_url,
        generation_model = %config.gemini_generation_model,
        embedding_model = %config.gemini_embedding_model,
        mode = ?config.answer_mode,
        server_port = config.server_port,
        "Loaded configuration"
    );
    CONFIG.set(config).expect("Failed to set config");
}
