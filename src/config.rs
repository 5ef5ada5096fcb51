use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;
use crate::tree::IndicatorAssets;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub indicators: IndicatorAssets,
    pub layout: LayoutConfig,
    pub behavior: BehaviorConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Width of the tree panel in percent of the screen
    pub tree_panel_width: u16,
    pub indent_width: usize,
    pub show_details: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Two presses on the same row within this window count as a double-click
    pub double_click_ms: u64,
    pub tick_rate_ms: u64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            tree_panel_width: 50,
            indent_width: 2,
            show_details: true,
        }
    }
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            double_click_ms: 400,
            tick_rate_ms: 250,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file; missing fields keep their defaults
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Config = serde_json::from_str(&content)?;
        log::info!("Loaded configuration from {}", path.as_ref().display());
        Ok(config)
    }

    /// Load from `path` when given, otherwise use the defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
