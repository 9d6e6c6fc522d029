use serde::Deserialize;
use std::{fs, path::Path};

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub bind_addr: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    pub artifact_path: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            artifact_path: "model.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    pub bind_addr: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub model: ModelConfig,
    pub metrics: Option<MetricsConfig>,
}

impl AppConfig {
    /// Reads the TOML config named by `SHEMS_CONFIG` (default
    /// `shems-config.toml`). A missing file yields the built-in defaults;
    /// an unreadable or malformed file is an error.
    pub fn load() -> anyhow::Result<Self> {
        use std::env;

        let path = env::var("SHEMS_CONFIG").unwrap_or_else(|_| "shems-config.toml".to_string());
        if !Path::new(&path).exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(&path)?;
        let cfg: AppConfig = toml::from_str(&contents)?;
        Ok(cfg)
    }
}
