use std::path::PathBuf;
use std::time::Duration;

use log::{debug, info};
use serde::Deserialize;

use crate::controller::{DEFAULT_ECHO_TOLERANCE_PX, DEFAULT_STOP_THRESHOLD_PX};
use crate::wheel::{BrakeSettings, WheelSettings};

// ---------------------------------------------------------------------------
// ConfigFile — deserialized from TOML (all fields optional)
// ---------------------------------------------------------------------------

#[derive(Default, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    #[serde(default)]
    pub wheel: WheelConfigFile,
    #[serde(default)]
    pub controller: ControllerConfigFile,
    #[serde(default)]
    pub demo: DemoConfigFile,
}

#[derive(Default, Deserialize)]
#[serde(default)]
pub struct WheelConfigFile {
    pub smooth: Option<f64>,
    pub snap_px: Option<f64>,
    pub brake_min: Option<f64>,
    pub brake_zone_px: Option<f64>,
}

#[derive(Default, Deserialize)]
#[serde(default)]
pub struct ControllerConfigFile {
    pub align_offset: Option<f64>,
    pub echo_tolerance_px: Option<f64>,
    pub stop_threshold_px: Option<f64>,
}

#[derive(Default, Deserialize)]
#[serde(default)]
pub struct DemoConfigFile {
    pub frame_budget_ms: Option<u64>,
    pub scroll_step_lines: Option<u32>,
}

// ---------------------------------------------------------------------------
// Config — resolved (all fields concrete)
// ---------------------------------------------------------------------------

pub struct Config {
    pub wheel: WheelSettings,
    pub align_offset: f64,
    pub echo_tolerance_px: f64,
    pub stop_threshold_px: f64,
    pub demo: DemoConfig,
}

pub struct DemoConfig {
    pub frame_budget: Duration,
    pub scroll_step_lines: u32,
}

impl ConfigFile {
    /// Merge CLI values (overwrites non-None fields).
    pub fn merge_cli(&mut self, smooth: Option<f64>, snap_px: Option<f64>) {
        if let Some(v) = smooth {
            debug!("config: CLI override smooth={v}");
            self.wheel.smooth = smooth;
        }
        if let Some(v) = snap_px {
            debug!("config: CLI override snap_px={v}");
            self.wheel.snap_px = snap_px;
        }
    }

    /// Resolve to a Config by applying defaults to missing fields.
    /// Braking requires both of its fields; a lone one is ignored.
    pub fn resolve(self) -> Config {
        let defaults = WheelSettings::default();
        let brake = match (self.wheel.brake_min, self.wheel.brake_zone_px) {
            (Some(min_factor), Some(zone_px)) => Some(BrakeSettings { min_factor, zone_px }),
            (None, None) => None,
            _ => {
                info!("config: brake_min and brake_zone_px must both be set; braking disabled");
                None
            }
        };
        let config = Config {
            wheel: WheelSettings {
                smooth: self.wheel.smooth.unwrap_or(defaults.smooth),
                snap_px: self.wheel.snap_px.unwrap_or(defaults.snap_px),
                brake,
            },
            align_offset: self.controller.align_offset.unwrap_or(0.0),
            echo_tolerance_px: self
                .controller
                .echo_tolerance_px
                .unwrap_or(DEFAULT_ECHO_TOLERANCE_PX),
            stop_threshold_px: self
                .controller
                .stop_threshold_px
                .unwrap_or(DEFAULT_STOP_THRESHOLD_PX),
            demo: DemoConfig {
                frame_budget: Duration::from_millis(self.demo.frame_budget_ms.unwrap_or(32)),
                scroll_step_lines: self.demo.scroll_step_lines.unwrap_or(3),
            },
        };
        info!(
            "config: resolved smooth={}, snap_px={}, brake={:?}, align_offset={}, \
             echo_tolerance_px={}, stop_threshold_px={}, frame_budget={}ms, scroll_step={}",
            config.wheel.smooth,
            config.wheel.snap_px,
            config.wheel.brake,
            config.align_offset,
            config.echo_tolerance_px,
            config.stop_threshold_px,
            config.demo.frame_budget.as_millis(),
            config.demo.scroll_step_lines,
        );
        config
    }
}

/// Resolve the XDG config path for duoscroll.
fn config_path() -> Option<PathBuf> {
    let config_dir = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
    Some(config_dir.join("duoscroll").join("config.toml"))
}

/// Load config file. Returns `ConfigFile::default()` if no file exists.
/// Returns an error if the file exists but cannot be parsed.
pub fn load_config() -> anyhow::Result<ConfigFile> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            info!("config: no HOME or XDG_CONFIG_HOME set, using defaults");
            return Ok(ConfigFile::default());
        }
    };
    debug!("config: looking for {}", path.display());
    match std::fs::read_to_string(&path) {
        Ok(text) => {
            info!("config: loaded from {}", path.display());
            let cfg: ConfigFile = toml::from_str(&text)
                .map_err(|e| anyhow::anyhow!("failed to parse {}: {e}", path.display()))?;
            Ok(cfg)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!("config: {} not found, using defaults", path.display());
            Ok(ConfigFile::default())
        }
        Err(e) => Err(anyhow::anyhow!("failed to read {}: {e}", path.display())),
    }
}
