//! Application configuration

use crate::filter::SortKey;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub browser: BrowserConfig,
    pub search: SearchConfig,
    pub upload: UploadSettings,
    pub simulation: SimulationConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub language: String,
    pub theme: String,
    /// Filter used when RUST_LOG is unset
    pub log_level: String,
    pub log_to_file: bool,
    pub log_retention_days: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            language: "it".to_string(),
            theme: "light".to_string(),
            log_level: "info".to_string(),
            log_to_file: true,
            log_retention_days: 7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub sort_by: SortKey,
    pub view_mode: ViewMode,
    pub confirm_delete: bool,
    /// Capacity shown in the storage meter (bytes)
    pub storage_capacity: u64,
    pub root_label: String,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            sort_by: SortKey::Name,
            view_mode: ViewMode::Grid,
            confirm_delete: true,
            storage_capacity: 107_374_182_400, // 100GB
            root_label: "My Files".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub sort_by: SortKey,
    pub recent_limit: usize,
    pub suggestion_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            sort_by: SortKey::Relevance,
            recent_limit: 10,
            suggestion_limit: 8,
        }
    }
}

/// Upload options as chosen in the upload settings panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UploadSettings {
    pub target_folder: String,
    pub overwrite_existing: bool,
    pub create_backup: bool,
    pub compress_images: bool,
    pub image_quality: ImageQuality,
    pub auto_rename: bool,
    pub preserve_structure: bool,
    /// Megabytes
    pub max_file_size: u64,
    /// Lower-case extensions without dot
    pub allowed_types: Vec<String>,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            target_folder: "root".to_string(),
            overwrite_existing: false,
            create_backup: true,
            compress_images: false,
            image_quality: ImageQuality::Original,
            auto_rename: true,
            preserve_structure: false,
            max_file_size: 100,
            allowed_types: ["pdf", "txt", "log", "exe", "mp3", "mp4", "jpg", "jpeg", "png", "gif"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl UploadSettings {
    /// Target folder as a path; "root" names the root folder
    pub fn target_path(&self) -> String {
        if self.target_folder == "root" {
            String::new()
        } else {
            self.target_folder.clone()
        }
    }

    pub fn allows(&self, extension: &str) -> bool {
        self.allowed_types.iter().any(|t| t.eq_ignore_ascii_case(extension))
    }
}

/// Timing of the simulated transport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub min_duration_ms: u64,
    pub max_duration_ms: u64,
    pub tick_ms: u64,
    /// Probability in [0, 1] that a finished transfer reports a failure
    pub failure_rate: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            min_duration_ms: 2000,
            max_duration_ms: 5000,
            tick_ms: 100,
            failure_rate: 0.1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite file; defaults to the data directory
    pub database_path: Option<PathBuf>,
    /// Keep all state in memory (nothing survives the process)
    pub in_memory: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageQuality {
    #[serde(rename = "original")]
    Original,
    #[serde(rename = "high")]
    High,
    #[serde(rename = "medium")]
    Medium,
    #[serde(rename = "low")]
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewMode {
    #[serde(rename = "grid")]
    Grid,
    #[serde(rename = "list")]
    List,
}

impl AppConfig {
    /// Load configuration from the default location
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from `path`, defaults if the file is missing
    pub fn load_from(config_path: &Path) -> anyhow::Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Self = toml::from_str(&content)?;
            tracing::info!("Configuration loaded from {:?}", config_path);
            Ok(config)
        } else {
            tracing::info!("Using default configuration");
            Ok(Self::default())
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, config_path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;

        tracing::info!("Configuration saved to {:?}", config_path);
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> PathBuf {
        ProjectDirs::from("com", "FileDeck", "FileDeck")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("./config.toml"))
    }
}
