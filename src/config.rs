use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{info, warn};

use crate::translator::TranslatorConfig;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub translator: TranslatorConfig,
    #[serde(default)]
    pub controller: ControllerConfig,
    #[serde(default)]
    pub detector: DetectorConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ControllerConfig {
    /// Delay between ticks in milliseconds
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

impl ControllerConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DetectorConfig {
    /// Minimum score for a hand to be detected
    #[serde(default = "default_confidence")]
    pub min_detection_confidence: f32,
    /// Minimum score to keep tracking a detected hand
    #[serde(default = "default_confidence")]
    pub min_tracking_confidence: f32,
    #[serde(default = "default_max_num_hands")]
    pub max_num_hands: u32,
    /// Webcam index (0 is the default camera)
    #[serde(default)]
    pub camera_index: u32,
}

fn default_tick_ms() -> u64 { 15 }
fn default_confidence() -> f32 { 0.9 }
fn default_max_num_hands() -> u32 { 2 }

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
        }
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            min_detection_confidence: default_confidence(),
            min_tracking_confidence: default_confidence(),
            max_num_hands: default_max_num_hands(),
            camera_index: 0,
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Load `path`, falling back to defaults when it is missing or invalid.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            info!("no config at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!("{:#}, using defaults", e);
                Self::default()
            }
        }
    }
}
