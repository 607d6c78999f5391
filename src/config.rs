//! Configuration management with YAML support

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub images: ImagesConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub extractors: HashMap<String, ExtractorConfig>,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_path")]
    pub path: String,
}

/// Image root configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImagesConfig {
    #[serde(default = "default_image_root")]
    pub root: String,

    /// The one file extension picked up by sync, without the dot
    #[serde(default = "default_extension")]
    pub extension: String,

    #[serde(default = "default_enabled")]
    pub recursive: bool,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// URL prefix the image root is served under
    #[serde(default = "default_static_prefix")]
    pub static_prefix: String,

    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,

    #[serde(default = "default_page_size")]
    pub default_page_size: u32,
}

/// Individual extractor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

// Default value functions
fn default_database_path() -> String {
    "db/image_metadata.db".to_string()
}

fn default_image_root() -> String {
    "images".to_string()
}

fn default_extension() -> String {
    "png".to_string()
}

fn default_enabled() -> bool {
    true
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_static_prefix() -> String {
    "/images".to_string()
}

fn default_allowed_origins() -> Vec<String> {
    vec![
        "http://localhost".to_string(),
        "http://localhost:5173".to_string(),
    ]
}

fn default_page_size() -> u32 {
    20
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            root: default_image_root(),
            extension: default_extension(),
            recursive: true,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_prefix: default_static_prefix(),
            allowed_origins: default_allowed_origins(),
            default_page_size: default_page_size(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    /// Searches in order:
    /// 1. Provided path
    /// 2. ./gallery.yaml (current directory)
    /// 3. ~/.config/gallery/gallery.yaml
    pub fn load(path: &str) -> Result<Self> {
        let search_paths = vec![
            shellexpand::tilde(path).to_string(),
            "gallery.yaml".to_string(),
            shellexpand::tilde("~/.config/gallery/gallery.yaml").to_string(),
        ];

        for search_path in &search_paths {
            if std::path::Path::new(search_path).exists() {
                let content = std::fs::read_to_string(search_path)
                    .with_context(|| format!("Failed to read config file {}", search_path))?;
                let config: Config = serde_yaml::from_str(&content)
                    .with_context(|| format!("Invalid config file {}", search_path))?;
                return Ok(config);
            }
        }

        // No config file found, use defaults
        Ok(Config::default())
    }

    /// Get the database path, expanding ~ to home directory
    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.database.path).to_string())
    }

    /// Get the image root, expanding ~ to home directory
    pub fn image_root(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.images.root).to_string())
    }

    /// Extractors are enabled unless explicitly switched off
    pub fn is_extractor_enabled(&self, extractor_id: &str) -> bool {
        self.extractors
            .get(extractor_id)
            .map_or(true, |e| e.enabled)
    }

    /// Address the HTTP server binds to
    pub fn bind_address(&self) -> (String, u16) {
        (self.server.host.clone(), self.server.port)
    }
}
