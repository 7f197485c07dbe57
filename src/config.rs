//! Application configuration loaded from environment variables.

use std::path::PathBuf;

use serde::Deserialize;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Server Configuration ===
    /// Address to bind the HTTP listener to.
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port.
    #[serde(default = "default_port")]
    pub port: u16,

    // === Filesystem Layout ===
    /// Directory holding `apps.json` and `free_v2rays.json`.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Single-line file holding the API secret key.
    #[serde(default = "default_secret_key_file")]
    pub secret_key_file: PathBuf,

    /// Directory holding the HTML pages.
    #[serde(default = "default_templates_dir")]
    pub templates_dir: PathBuf,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("static/data")
}

fn default_secret_key_file() -> PathBuf {
    PathBuf::from("static/data/secret_key.txt")
}

fn default_templates_dir() -> PathBuf {
    PathBuf::from("templates")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            data_dir: default_data_dir(),
            secret_key_file: default_secret_key_file(),
            templates_dir: default_templates_dir(),
        }
    }
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        if self.host.trim().is_empty() {
            return Err("HOST must not be empty".to_string());
        }

        if self.port == 0 {
            return Err("PORT must be non-zero".to_string());
        }

        Ok(())
    }

    /// Socket address string for the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
