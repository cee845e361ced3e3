//! Configuration vault – reads/writes `~/.craftpilot/config.toml`.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use craftpilot_hal::UnknownActionPolicy;
use craftpilot_memory::{RecordFormat, SnapshotRecorder};
use craftpilot_runtime::AgentLoopConfig;
use serde::{Deserialize, Serialize};

/// Persisted settings.  Every field has a default, so a partial file is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the generate endpoint.
    #[serde(default = "default_inference_url")]
    pub inference_url: String,

    /// Model name sent with every request.
    #[serde(default = "default_model")]
    pub model: String,

    /// Tick rate of the headless driver.
    #[serde(default = "default_tick_rate_hz")]
    pub tick_rate_hz: u32,

    /// Maximum ticks between cycles for a stationary player.
    #[serde(default = "default_tick_budget")]
    pub tick_budget: u32,

    /// Transport timeout for inference requests.  Unset means wait forever.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,

    #[serde(default)]
    pub unknown_actions: UnknownActionPolicy,

    /// Directory for recorded snapshots.  Unset disables recording.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_dir: Option<PathBuf>,

    #[serde(default)]
    pub record_format: RecordFormat,
}

fn default_inference_url() -> String {
    craftpilot_runtime::inference::DEFAULT_BASE_URL.to_string()
}
fn default_model() -> String {
    craftpilot_runtime::inference::DEFAULT_MODEL.to_string()
}
fn default_tick_rate_hz() -> u32 {
    craftpilot_runtime::TICKS_PER_SECOND
}
fn default_tick_budget() -> u32 {
    craftpilot_runtime::TICKS_PER_SECOND
}

impl Default for Config {
    fn default() -> Self {
        Self {
            inference_url: default_inference_url(),
            model: default_model(),
            tick_rate_hz: default_tick_rate_hz(),
            tick_budget: default_tick_budget(),
            request_timeout_secs: None,
            unknown_actions: UnknownActionPolicy::default(),
            record_dir: None,
            record_format: RecordFormat::default(),
        }
    }
}

impl Config {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn loop_config(&self) -> AgentLoopConfig {
        AgentLoopConfig {
            tick_budget: self.tick_budget,
            unknown_actions: self.unknown_actions,
            recorder: self
                .record_dir
                .as_ref()
                .map(|dir| SnapshotRecorder::new(dir, self.record_format)),
        }
    }
}

/// Return the path to `~/.craftpilot/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".craftpilot").join("config.toml")
}

/// Load the config from disk.  Returns `None` if the file does not exist.
pub fn load() -> Result<Option<Config>, String> {
    load_from(&config_path())
}

pub(crate) fn load_from(path: &PathBuf) -> Result<Option<Config>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config at {}: {}", path.display(), e))?;
    let mut cfg = parse(&raw)?;
    apply_env_overrides(&mut cfg);
    Ok(Some(cfg))
}

/// Parse TOML text without applying environment overrides.
pub(crate) fn parse(raw: &str) -> Result<Config, String> {
    toml::from_str(raw).map_err(|e| format!("Failed to parse config: {}", e))
}

/// Apply `CRAFTPILOT_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `CRAFTPILOT_INFERENCE_URL` | `inference_url` |
/// | `CRAFTPILOT_MODEL` | `model` |
/// | `CRAFTPILOT_TICK_BUDGET` | `tick_budget` |
/// | `CRAFTPILOT_RECORD_DIR` | `record_dir` |
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("CRAFTPILOT_INFERENCE_URL") {
        cfg.inference_url = v;
    }
    if let Ok(v) = std::env::var("CRAFTPILOT_MODEL") {
        cfg.model = v;
    }
    if let Ok(v) = std::env::var("CRAFTPILOT_TICK_BUDGET")
        && let Ok(budget) = v.trim().parse::<u32>()
    {
        cfg.tick_budget = budget;
    }
    if let Ok(v) = std::env::var("CRAFTPILOT_RECORD_DIR")
        && !v.is_empty()
    {
        cfg.record_dir = Some(PathBuf::from(v));
    }
}

/// Save the config to disk, creating `~/.craftpilot/` if necessary.
pub fn save(cfg: &Config) -> Result<(), String> {
    save_to(cfg, &config_path())
}

pub(crate) fn save_to(cfg: &Config, path: &PathBuf) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(parent, fs::Permissions::from_mode(0o700))
                .map_err(|e| format!("Failed to set config directory permissions: {}", e))?;
        }
    }
    let raw =
        toml::to_string_pretty(cfg).map_err(|e| format!("Failed to serialize config: {}", e))?;
    #[cfg(unix)]
    {
        use std::io::Write;
        use std::os::unix::fs::OpenOptionsExt;
        fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .and_then(|mut f| f.write_all(raw.as_bytes()))
            .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))?;
    }
    #[cfg(not(unix))]
    fs::write(path, raw)
        .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))?;
    Ok(())
}
