use std::path::Path;

use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub backtrace: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingsConfig {
    /// Embedding provider: "openai" or "ollama"
    pub provider: String,
    pub endpoint: String,
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
    /// Instruction marker prepended to queries before embedding. Must match
    /// the marker used when the corpus was embedded or retrieval quality
    /// silently degrades.
    #[serde(default = "default_query_prefix")]
    pub query_prefix: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_query_prefix() -> String {
    "query: ".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorIndexConfig {
    /// Index query endpoint, e.g. "https://my-index-abc123.svc.pinecone.io"
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_top_k() -> usize {
    20
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_output_tokens: Option<u32>,
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_llm_endpoint() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_llm_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_llm_timeout_secs() -> u64 {
    120
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Base64-encoded cookie signing secret. When absent a fresh secret is
    /// generated at process start, invalidating all outstanding sessions.
    #[serde(default)]
    pub secret_key: Option<String>,
    #[serde(default = "default_session_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_session_timeout_secs() -> u64 {
    3600
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secret_key: None,
            timeout_secs: default_session_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Base64-encoded JSON service-account descriptor
    #[serde(default)]
    pub credentials_b64: Option<String>,
    #[serde(default)]
    pub spreadsheet_id: String,
    #[serde(default = "default_worksheet")]
    pub worksheet: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_worksheet() -> String {
    "Sheet1".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            credentials_b64: None,
            spreadsheet_id: String::new(),
            worksheet: default_worksheet(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub embeddings: EmbeddingsConfig,
    pub vector_index: VectorIndexConfig,
    pub llm: LlmConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub audit: AuditConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;

        let mut config: AppConfig = toml::from_str(&content)?;
        config.apply_env_overrides();

        Ok(config)
    }

    /// Load configuration from default config file path
    pub fn load() -> crate::Result<Self> {
        // Try to load from config.toml first, then fall back to config.example.toml
        if Path::new("config.toml").exists() {
            Self::from_file("config.toml")
        } else if Path::new("config.example.toml").exists() {
            println!(
                "Warning: Using config.example.toml. Please create config.toml for production use."
            );
            Self::from_file("config.example.toml")
        } else {
            Err(crate::GuideChatError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "No config file found. Please create config.toml or config.example.toml",
            )))
        }
    }

    /// Override secrets from the environment. The deployment surface supplies
    /// credentials as environment variables; the TOML file only carries
    /// non-secret defaults.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("GOOGLE_API_KEY") {
            self.llm.api_key = key;
        }
        if let Ok(key) = std::env::var("PINECONE_API_KEY") {
            self.vector_index.api_key = key;
        }
        if let Ok(key) = std::env::var("EMBEDDINGS_API_KEY") {
            self.embeddings.api_key = Some(key);
        }
        if let Ok(creds) = std::env::var("GOOGLE_CREDS_B64") {
            self.audit.credentials_b64 = Some(creds);
        }
        if let Ok(secret) = std::env::var("SESSION_SECRET") {
            self.session.secret_key = Some(secret);
        }
        if let Ok(port) = std::env::var("PORT") {
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
    }

    /// Get server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Get embedding model name
    pub fn embedding_model(&self) -> &str {
        &self.embeddings.model
    }

    /// Get query instruction prefix
    pub fn query_prefix(&self) -> &str {
        &self.embeddings.query_prefix
    }

    /// Get retrieval depth
    pub fn top_k(&self) -> usize {
        self.vector_index.top_k
    }

    /// Get LLM model identifier
    pub fn llm_model(&self) -> &str {
        &self.llm.model
    }

    /// Get session idle timeout in seconds
    pub fn session_timeout_secs(&self) -> u64 {
        self.session.timeout_secs
    }

    /// Check whether spreadsheet audit logging is enabled
    pub fn audit_enabled(&self) -> bool {
        self.audit.enabled
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                backtrace: true,
            },
            embeddings: EmbeddingsConfig {
                provider: "ollama".to_string(),
                endpoint: "http://localhost:11434".to_string(),
                model: "intfloat/e5-base".to_string(),
                api_key: None,
                query_prefix: default_query_prefix(),
                timeout_secs: default_timeout_secs(),
            },
            vector_index: VectorIndexConfig {
                endpoint: "https://multi-pdf-rag-docling-e5.svc.pinecone.io".to_string(),
                api_key: String::new(),
                top_k: default_top_k(),
                namespace: None,
                timeout_secs: default_timeout_secs(),
            },
            llm: LlmConfig {
                endpoint: default_llm_endpoint(),
                api_key: String::new(),
                model: default_llm_model(),
                temperature: None,
                max_output_tokens: None,
                timeout_secs: default_llm_timeout_secs(),
            },
            session: SessionConfig::default(),
            audit: AuditConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const SAMPLE: &str = r#"
[server]
host = "127.0.0.1"
port = 9000

[logging]
level = "debug"
backtrace = false

[embeddings]
provider = "openai"
endpoint = "https://api.openai.com/v1"
model = "text-embedding-3-small"

[vector_index]
endpoint = "https://guides.svc.pinecone.io"
api_key = "pc-key"
top_k = 5

[llm]
api_key = "llm-key"
"#;

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.embeddings.provider, "openai");
        assert_eq!(config.top_k(), 5);
        // Unspecified fields fall back to defaults
        assert_eq!(config.query_prefix(), "query: ");
        assert_eq!(config.llm_model(), "gemini-1.5-flash");
        assert_eq!(config.session_timeout_secs(), 3600);
        assert!(!config.audit_enabled());
    }

    #[test]
    fn test_bind_address() {
        let config = AppConfig::default();
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
    }
}
