//! Playground configuration – reads/writes `~/.tictac/config.toml`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tictac_hal::SimConfig;
use tictac_kernel::{ThermalPolicy, Thresholds};
use tictac_runtime::GameControllerConfig;
use tictac_types::{Player, PlaygroundError};

/// Warning / resume temperatures, degrees Celsius.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThermalConfig {
    #[serde(default = "default_standard_warn")]
    pub standard_warn: f32,
    #[serde(default = "default_standard_resume")]
    pub standard_resume: f32,
    #[serde(default = "default_precision_warn")]
    pub precision_warn: f32,
    #[serde(default = "default_precision_resume")]
    pub precision_resume: f32,
}

/// Behavior of the simulated table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimSettings {
    #[serde(default = "default_think_frames")]
    pub human_think_frames: u32,
    #[serde(default)]
    pub glitch_rate: f64,
    #[serde(default)]
    pub blur_rate: f64,
}

/// Persisted playground configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// JSON file with the X / O value tables.
    #[serde(default = "default_value_table")]
    pub value_table: PathBuf,

    /// Pause after each idle behavior.
    #[serde(default = "default_idle_pause")]
    pub idle_pause_secs: f64,

    /// Camera silence after which the robot asks for a reboot.
    #[serde(default = "default_camera_timeout")]
    pub camera_timeout_secs: u64,

    #[serde(default = "default_cooldown_poll")]
    pub cooldown_poll_secs: u64,

    #[serde(default = "default_recheck_delay")]
    pub recheck_delay_ms: u64,

    /// Time the head holds still on the board before each capture.
    #[serde(default = "default_gaze_settle")]
    pub gaze_settle_ms: u64,

    #[serde(default = "default_true")]
    pub double_check: bool,

    #[serde(default = "default_true")]
    pub follow_hand: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Skip the coin flip.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_player: Option<Player>,

    /// Shell command run after a camera stall, e.g. `sudo reboot`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reboot_command: Option<String>,

    #[serde(default)]
    pub thermal: ThermalConfig,

    #[serde(default)]
    pub sim: SimSettings,
}

fn default_value_table() -> PathBuf {
    PathBuf::from("data/q_values.json")
}
fn default_idle_pause() -> f64 {
    5.0
}
fn default_camera_timeout() -> u64 {
    30
}
fn default_cooldown_poll() -> u64 {
    30
}
fn default_recheck_delay() -> u64 {
    1000
}
fn default_gaze_settle() -> u64 {
    2000
}
fn default_true() -> bool {
    true
}
fn default_standard_warn() -> f32 {
    50.0
}
fn default_standard_resume() -> f32 {
    45.0
}
fn default_precision_warn() -> f32 {
    45.0
}
fn default_precision_resume() -> f32 {
    40.0
}
fn default_think_frames() -> u32 {
    2
}

impl Default for ThermalConfig {
    fn default() -> Self {
        Self {
            standard_warn: default_standard_warn(),
            standard_resume: default_standard_resume(),
            precision_warn: default_precision_warn(),
            precision_resume: default_precision_resume(),
        }
    }
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            human_think_frames: default_think_frames(),
            glitch_rate: 0.0,
            blur_rate: 0.0,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            value_table: default_value_table(),
            idle_pause_secs: default_idle_pause(),
            camera_timeout_secs: default_camera_timeout(),
            cooldown_poll_secs: default_cooldown_poll(),
            recheck_delay_ms: default_recheck_delay(),
            gaze_settle_ms: default_gaze_settle(),
            double_check: true,
            follow_hand: true,
            seed: None,
            first_player: None,
            reboot_command: None,
            thermal: ThermalConfig::default(),
            sim: SimSettings::default(),
        }
    }
}

impl Config {
    /// Controller settings derived from this file.
    ///
    /// # Errors
    ///
    /// Returns [`PlaygroundError::Config`] for thresholds without hysteresis
    /// or a negative idle pause.
    pub fn controller(&self) -> Result<GameControllerConfig, PlaygroundError> {
        let thermal_policy = ThermalPolicy::new(
            Thresholds::new(self.thermal.standard_warn, self.thermal.standard_resume),
            Thresholds::new(self.thermal.precision_warn, self.thermal.precision_resume),
        )?;
        let idle_pause = Duration::try_from_secs_f64(self.idle_pause_secs)
            .map_err(|e| PlaygroundError::Config(format!("idle_pause_secs: {e}")))?;
        Ok(GameControllerConfig {
            double_check: self.double_check,
            follow_hand: self.follow_hand,
            first_player: self.first_player,
            seed: self.seed,
            idle_pause,
            camera_timeout: Duration::from_secs(self.camera_timeout_secs),
            recheck_delay: Duration::from_millis(self.recheck_delay_ms),
            cooldown_poll_interval: Duration::from_secs(self.cooldown_poll_secs),
            thermal_policy,
        })
    }

    pub fn gaze_settle(&self) -> Duration {
        Duration::from_millis(self.gaze_settle_ms)
    }

    /// Settings of the simulated playground.
    pub fn simulation(&self) -> SimConfig {
        let mut sim = SimConfig {
            human_think_frames: self.sim.human_think_frames,
            glitch_rate: self.sim.glitch_rate,
            blur_rate: self.sim.blur_rate,
            ..SimConfig::default()
        };
        if let Some(seed) = self.seed {
            sim.seed = seed;
        }
        sim
    }
}

/// Return the path to `~/.tictac/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".tictac").join("config.toml")
}

/// Load the config, falling back to defaults when no file exists.  Env
/// overrides apply in both cases.
pub fn load() -> Result<Config, PlaygroundError> {
    load_from(&config_path())
}

pub(crate) fn load_from(path: &Path) -> Result<Config, PlaygroundError> {
    let mut cfg = if path.exists() {
        let raw = fs::read_to_string(path).map_err(|e| {
            PlaygroundError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        toml::from_str(&raw)
            .map_err(|e| PlaygroundError::Config(format!("failed to parse {}: {e}", path.display())))?
    } else {
        Config::default()
    };
    apply_env_overrides(&mut cfg);
    Ok(cfg)
}

/// Apply `TICTAC_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `TICTAC_VALUE_TABLE` | `value_table` |
/// | `TICTAC_SEED` | `seed` |
/// | `TICTAC_REBOOT_COMMAND` | `reboot_command` |
/// | `TICTAC_IDLE_PAUSE_SECS` | `idle_pause_secs` |
///
/// Unparseable numbers are ignored.
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("TICTAC_VALUE_TABLE") {
        cfg.value_table = PathBuf::from(v);
    }
    if let Ok(v) = std::env::var("TICTAC_SEED")
        && let Ok(seed) = v.parse::<u64>()
    {
        cfg.seed = Some(seed);
    }
    if let Ok(v) = std::env::var("TICTAC_REBOOT_COMMAND") {
        cfg.reboot_command = (!v.trim().is_empty()).then_some(v);
    }
    if let Ok(v) = std::env::var("TICTAC_IDLE_PAUSE_SECS")
        && let Ok(secs) = v.parse::<f64>()
    {
        cfg.idle_pause_secs = secs;
    }
}

/// Write the config, creating `~/.tictac/` if necessary.
pub fn save(cfg: &Config) -> Result<(), PlaygroundError> {
    save_to(cfg, &config_path())
}

pub(crate) fn save_to(cfg: &Config, path: &Path) -> Result<(), PlaygroundError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| PlaygroundError::Config(format!("failed to create config directory: {e}")))?;
    }
    let raw = toml::to_string_pretty(cfg)
        .map_err(|e| PlaygroundError::Config(format!("failed to serialize config: {e}")))?;
    fs::write(path, raw)
        .map_err(|e| PlaygroundError::Config(format!("failed to write {}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());

        let mut cfg = Config::default();
        cfg.first_player = Some(Player::Robot);
        cfg.reboot_command = Some("sudo reboot".to_string());
        save_to(&cfg, &path).expect("save");

        let loaded = load_from(&path).expect("load");
        assert_eq!(loaded.first_player, Some(Player::Robot));
        assert_eq!(loaded.camera_timeout_secs, 30);
        assert_eq!(loaded.thermal, ThermalConfig::default());
    }

    #[test]
    fn missing_file_means_defaults() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let cfg = load_from(&dir.path().join("absent.toml")).expect("defaults");
        assert_eq!(cfg.value_table, PathBuf::from("data/q_values.json"));
        assert!(cfg.double_check);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "follow_hand = false\n[thermal]\nstandard_warn = 55.0\n").unwrap();

        let cfg = load_from(&path).expect("load");
        assert!(!cfg.follow_hand);
        assert_eq!(cfg.thermal.standard_warn, 55.0);
        assert_eq!(cfg.thermal.standard_resume, 45.0);
        assert_eq!(cfg.sim.human_think_frames, 2);
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "camera_timeout_secs = \"soon\"").unwrap();
        assert!(matches!(load_from(&path), Err(PlaygroundError::Config(_))));
    }

    #[test]
    fn controller_config_carries_thresholds() {
        let c = Config::default().controller().expect("valid");
        assert_eq!(c.thermal_policy, ThermalPolicy::default());
        assert_eq!(c.idle_pause, Duration::from_secs(5));
        assert_eq!(c.recheck_delay, Duration::from_secs(1));
    }

    #[test]
    fn thresholds_without_hysteresis_are_rejected() {
        let mut cfg = Config::default();
        cfg.thermal.precision_resume = 46.0;
        assert!(cfg.controller().is_err());
    }

    #[test]
    fn config_path_points_to_tictac_dir() {
        let p = config_path_for_home("/home/player");
        assert!(p.ends_with(".tictac/config.toml"));
    }

    #[test]
    fn env_overrides_apply() {
        // SAFETY: single test touching these env-vars.
        unsafe {
            std::env::set_var("TICTAC_SEED", "42");
            std::env::set_var("TICTAC_IDLE_PAUSE_SECS", "not-a-number");
            std::env::set_var("TICTAC_REBOOT_COMMAND", "systemctl reboot");
        }
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.seed, Some(42));
        assert_eq!(cfg.idle_pause_secs, 5.0);
        assert_eq!(cfg.reboot_command.as_deref(), Some("systemctl reboot"));
        assert_eq!(cfg.simulation().seed, 42);
        unsafe {
            std::env::remove_var("TICTAC_SEED");
            std::env::remove_var("TICTAC_IDLE_PAUSE_SECS");
            std::env::remove_var("TICTAC_REBOOT_COMMAND");
        }
    }
}
