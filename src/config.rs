use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use crate::display::SpectrumOptions;
pub const CONFIG_ENV: &str = "WATERFALL_CONFIG";
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub url: String,
    pub reconnect_delay_ms: u64,
    /// Generate frames locally instead of connecting.
    pub simulate: bool,
    pub simulated_bins: usize,
    pub simulated_interval_ms: u64,
}
impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: "ws://127.0.0.1:8888/websocket".to_owned(),
            reconnect_delay_ms: 1000,
            simulate: false,
            simulated_bins: 1024,
            simulated_interval_ms: 50,
        }
    }
}
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: f32,
    pub height: f32,
    /// When false only the maximize fallback is offered for fullscreen.
    pub allow_fullscreen: bool,
}
impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Waterfall".to_owned(),
            width: 1024.0,
            height: 768.0,
            allow_fullscreen: true,
        }
    }
}
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub display: SpectrumOptions,
    pub feed: FeedConfig,
    pub window: WindowConfig,
    pub averaging: u32,
    /// Enables the `+`/`-` averaging keys and `p` snapshots.
    pub extended_keys: bool,
}
impl Default for AppConfig {
    fn default() -> Self {
        Self {
            display: SpectrumOptions {
                spectrum_percent: 20,
                ..SpectrumOptions::default()
            },
            feed: FeedConfig::default(),
            window: WindowConfig::default(),
            averaging: 0,
            extended_keys: true,
        }
    }
}
impl AppConfig {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
    /// Defaults when `path` is `None`; otherwise the file must exist and parse.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("parsing config {}", path.display()))
    }
}
/// First command-line argument, else `$WATERFALL_CONFIG`.
pub fn config_path() -> Option<PathBuf> {
    std::env::args()
        .nth(1)
        .or_else(|| std::env::var(CONFIG_ENV).ok())
        .map(PathBuf::from)
}
