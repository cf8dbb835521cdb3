use serde::Deserialize;
use std::error::Error;
use std::fs;
use std::path::Path;

use delve_stream::StreamConfig;

/// Top-level TOML document: streaming knobs plus the synthetic world's settings.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub stream: StreamConfig,
    #[serde(default)]
    pub sim: SimConfig,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct SimConfig {
    #[serde(default = "default_seed")]
    pub seed: i32,
    #[serde(default = "default_layers")]
    pub layers: usize,
    /// Chunk payloads the source releases per tick.
    #[serde(default = "default_chunks_per_tick")]
    pub chunks_per_tick: usize,
    /// Ticks between view updates.
    #[serde(default = "default_view_every")]
    pub view_every: u64,
    /// Ticks between liquid-only refreshes of an already-sent chunk.
    #[serde(default = "default_tide_every")]
    pub tide_every: u64,
}

fn default_seed() -> i32 {
    1337
}
fn default_layers() -> usize {
    32
}
fn default_chunks_per_tick() -> usize {
    8
}
fn default_view_every() -> u64 {
    4
}
fn default_tide_every() -> u64 {
    10
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            layers: default_layers(),
            chunks_per_tick: default_chunks_per_tick(),
            view_every: default_view_every(),
            tide_every: default_tide_every(),
        }
    }
}

pub fn load_app_config(path: &Path) -> Result<AppConfig, Box<dyn Error>> {
    let s = fs::read_to_string(path)?;
    parse_app_config(&s)
}

pub fn parse_app_config(s: &str) -> Result<AppConfig, Box<dyn Error>> {
    let mut cfg: AppConfig = toml::from_str(s)?;
    cfg.stream = cfg.stream.sanitized();
    cfg.sim.layers = cfg.sim.layers.max(1);
    cfg.sim.view_every = cfg.sim.view_every.max(1);
    cfg.sim.tide_every = cfg.sim.tide_every.max(1);
    Ok(cfg)
}
