//! Harness configuration – TOML file, `OGOA_*` env overrides, normalisation.
//!
//! Precedence, lowest first: built-in defaults, the `--config` file,
//! environment variables, command-line flags.  [`Config::normalized`] turns
//! the merged result into the settings the runtime consumes.

use std::fs;
use std::path::Path;
use std::time::Duration;

use ogoa_runtime::{HarnessConfig, SerialSettings};
use ogoa_sim::SamplerParams;
use ogoa_types::OgoaError;
use serde::{Deserialize, Serialize};

/// Merged, not yet validated, harness configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Serial endpoint (e.g. `/dev/ttyACM0`, `COM7`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,

    #[serde(default = "default_baud")]
    pub baud: u32,

    /// Total run time in seconds.
    #[serde(default = "default_duration")]
    pub duration: f64,

    /// Seconds between `STATUS_REQUEST` frames.
    #[serde(default = "default_status_interval")]
    pub status_interval: f64,

    /// Seconds between lidar sweeps; 0 disables them.
    #[serde(default = "default_lidar_interval")]
    pub lidar_interval: f64,

    /// Seconds for one lap of the patrol trajectory.
    #[serde(default = "default_scenario_seconds")]
    pub scenario_seconds: f64,

    #[serde(default = "default_delta")]
    pub delta_min: u16,

    #[serde(default = "default_delta")]
    pub delta_max: u16,

    #[serde(default = "default_smooth_alpha")]
    pub smooth_alpha: f64,

    #[serde(default = "default_dropout_prob")]
    pub dropout_prob: f64,

    /// Noise seed; 0 draws from OS entropy.
    #[serde(default)]
    pub seed: u64,

    /// Seconds to wait after raising DTR/RTS.
    #[serde(default = "default_settle_delay")]
    pub settle_delay: f64,

    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
}

fn default_baud() -> u32 {
    115_200
}
fn default_duration() -> f64 {
    8.0
}
fn default_status_interval() -> f64 {
    1.0
}
fn default_lidar_interval() -> f64 {
    0.20
}
fn default_scenario_seconds() -> f64 {
    20.0
}
fn default_delta() -> u16 {
    2
}
fn default_smooth_alpha() -> f64 {
    0.35
}
fn default_dropout_prob() -> f64 {
    0.01
}
fn default_settle_delay() -> f64 {
    1.2
}
fn default_read_timeout_ms() -> u64 {
    50
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: None,
            baud: default_baud(),
            duration: default_duration(),
            status_interval: default_status_interval(),
            lidar_interval: default_lidar_interval(),
            scenario_seconds: default_scenario_seconds(),
            delta_min: default_delta(),
            delta_max: default_delta(),
            smooth_alpha: default_smooth_alpha(),
            dropout_prob: default_dropout_prob(),
            seed: 0,
            settle_delay: default_settle_delay(),
            read_timeout_ms: default_read_timeout_ms(),
        }
    }
}

/// Validated settings ready to hand to the runtime.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub serial: SerialSettings,
    pub harness: HarnessConfig,
    pub seed: u64,
}

impl Config {
    /// Validate and convert.
    ///
    /// Smoothing alpha is clamped to `[0, 1]` and dropout to `[0, 0.3]`; a
    /// lidar interval of zero or less disables sweeps.
    ///
    /// # Errors
    ///
    /// [`OgoaError::Config`] when no port is set, the baud rate or an
    /// angular step bound is zero, or a time value is negative or not a
    /// number.
    pub fn normalized(&self) -> Result<RunSettings, OgoaError> {
        let port = self
            .port
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| OgoaError::Config("no serial port given (use --port)".into()))?;
        if self.baud == 0 {
            return Err(OgoaError::Config("baud rate must be positive".into()));
        }
        if self.delta_min == 0 || self.delta_max == 0 {
            return Err(OgoaError::Config(format!(
                "angular step bounds must be at least 1 degree, got {}..{}",
                self.delta_min, self.delta_max
            )));
        }

        let lidar_interval = if self.lidar_interval > 0.0 {
            Some(seconds("lidar_interval", self.lidar_interval)?)
        } else {
            None
        };

        let serial = SerialSettings {
            path: port.to_string(),
            baud_rate: self.baud,
            read_timeout: Duration::from_millis(self.read_timeout_ms),
            settle_delay: seconds("settle_delay", self.settle_delay)?,
        };
        let harness = HarnessConfig {
            duration: seconds("duration", self.duration)?,
            status_interval: seconds("status_interval", self.status_interval)?,
            lidar_interval,
            scenario_seconds: self.scenario_seconds,
            min_step: self.delta_min,
            max_step: self.delta_max,
            sampler: SamplerParams::new(self.smooth_alpha, self.dropout_prob),
            ..HarnessConfig::default()
        };

        Ok(RunSettings {
            serial,
            harness,
            seed: self.seed,
        })
    }
}

fn seconds(name: &str, v: f64) -> Result<Duration, OgoaError> {
    Duration::try_from_secs_f64(v)
        .map_err(|_| OgoaError::Config(format!("{name} must be a non-negative number, got {v}")))
}

/// Load a config file.  Missing keys take their defaults.
pub fn load_from(path: &Path) -> Result<Config, OgoaError> {
    let raw = fs::read_to_string(path).map_err(|e| {
        OgoaError::Config(format!("Failed to read config at {}: {}", path.display(), e))
    })?;
    toml::from_str(&raw).map_err(|e| OgoaError::Config(format!("Failed to parse config: {e}")))
}

/// Write `cfg` as TOML, creating parent directories as needed.
pub fn save_to(cfg: &Config, path: &Path) -> Result<(), OgoaError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            OgoaError::Config(format!("Failed to create config directory: {e}"))
        })?;
    }
    let raw = toml::to_string_pretty(cfg)
        .map_err(|e| OgoaError::Config(format!("Failed to serialize config: {e}")))?;
    fs::write(path, raw).map_err(|e| {
        OgoaError::Config(format!("Failed to write config at {}: {}", path.display(), e))
    })
}

/// Apply `OGOA_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `OGOA_PORT` | `port` |
/// | `OGOA_BAUD` | `baud` |
/// | `OGOA_DURATION` | `duration` |
/// | `OGOA_SEED` | `seed` |
///
/// Values that do not parse are ignored.
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("OGOA_PORT")
        && !v.trim().is_empty()
    {
        cfg.port = Some(v);
    }
    if let Ok(v) = std::env::var("OGOA_BAUD")
        && let Ok(baud) = v.parse::<u32>()
    {
        cfg.baud = baud;
    }
    if let Ok(v) = std::env::var("OGOA_DURATION")
        && let Ok(secs) = v.parse::<f64>()
    {
        cfg.duration = secs;
    }
    if let Ok(v) = std::env::var("OGOA_SEED")
        && let Ok(seed) = v.parse::<u64>()
    {
        cfg.seed = seed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_port() -> Config {
        Config {
            port: Some("/dev/ttyACM0".into()),
            ..Config::default()
        }
    }

    #[test]
    fn roundtrip_default_config() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("ogoa").join("harness.toml");

        let cfg = with_port();
        save_to(&cfg, &path).expect("save");
        let loaded = load_from(&path).expect("load");
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("harness.toml");
        fs::write(&path, "port = \"COM7\"\ndelta_max = 6\n").unwrap();

        let cfg = load_from(&path).expect("load");
        assert_eq!(cfg.port.as_deref(), Some("COM7"));
        assert_eq!(cfg.delta_max, 6);
        assert_eq!(cfg.delta_min, 2);
        assert_eq!(cfg.baud, 115_200);
        assert!((cfg.lidar_interval - 0.20).abs() < 1e-12);
    }

    #[test]
    fn load_from_missing_file_is_config_error() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let err = load_from(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, OgoaError::Config(_)));
    }

    #[test]
    fn load_from_rejects_bad_toml() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("bad.toml");
        fs::write(&path, "baud = \"fast\"").unwrap();
        assert!(matches!(load_from(&path), Err(OgoaError::Config(_))));
    }

    #[test]
    fn normalized_requires_port() {
        let err = Config::default().normalized().unwrap_err();
        assert!(err.to_string().contains("serial port"));

        let blank = Config {
            port: Some("   ".into()),
            ..Config::default()
        };
        assert!(blank.normalized().is_err());
    }

    #[test]
    fn normalized_defaults() {
        let run = with_port().normalized().expect("valid");
        assert_eq!(run.serial.path, "/dev/ttyACM0");
        assert_eq!(run.serial.baud_rate, 115_200);
        assert_eq!(run.serial.read_timeout, Duration::from_millis(50));
        assert_eq!(run.serial.settle_delay, Duration::from_millis(1200));
        assert_eq!(run.harness.duration, Duration::from_secs(8));
        assert_eq!(run.harness.status_interval, Duration::from_secs(1));
        assert_eq!(run.harness.lidar_interval, Some(Duration::from_millis(200)));
        assert_eq!(run.harness.min_step, 2);
        assert_eq!(run.harness.max_step, 2);
        assert_eq!(run.seed, 0);
    }

    #[test]
    fn normalized_clamps_sampler_settings() {
        let cfg = Config {
            smooth_alpha: 4.0,
            dropout_prob: 0.75,
            ..with_port()
        };
        let run = cfg.normalized().expect("valid");
        assert!((run.harness.sampler.smoothing_alpha() - 1.0).abs() < 1e-12);
        assert!((run.harness.sampler.dropout_prob() - 0.3).abs() < 1e-12);
    }

    #[test]
    fn non_positive_lidar_interval_disables_sweeps() {
        for v in [0.0, -1.0] {
            let cfg = Config {
                lidar_interval: v,
                ..with_port()
            };
            assert_eq!(cfg.normalized().unwrap().harness.lidar_interval, None);
        }
    }

    #[test]
    fn negative_duration_is_rejected() {
        let cfg = Config {
            duration: -2.0,
            ..with_port()
        };
        assert!(matches!(cfg.normalized(), Err(OgoaError::Config(_))));
        let nan = Config {
            status_interval: f64::NAN,
            ..with_port()
        };
        assert!(nan.normalized().is_err());
    }

    #[test]
    fn zero_baud_is_rejected() {
        let cfg = Config {
            baud: 0,
            ..with_port()
        };
        assert!(cfg.normalized().is_err());
    }

    #[test]
    fn zero_step_bound_is_rejected() {
        for (min, max) in [(0, 3), (2, 0)] {
            let cfg = Config {
                delta_min: min,
                delta_max: max,
                ..with_port()
            };
            assert!(matches!(cfg.normalized(), Err(OgoaError::Config(_))));
        }
        let one = Config {
            delta_min: 1,
            delta_max: 3,
            ..with_port()
        };
        assert_eq!(one.normalized().expect("valid").harness.min_step, 1);
    }

    // All env-var cases share one test so they cannot race each other.
    #[test]
    fn apply_env_overrides_sets_and_ignores() {
        // SAFETY: the only test in this crate touching OGOA_* variables.
        unsafe {
            std::env::set_var("OGOA_PORT", "/dev/ttyUSB1");
            std::env::set_var("OGOA_BAUD", "9600");
            std::env::set_var("OGOA_DURATION", "2.5");
            std::env::set_var("OGOA_SEED", "not-a-number");
        }
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.port.as_deref(), Some("/dev/ttyUSB1"));
        assert_eq!(cfg.baud, 9600);
        assert!((cfg.duration - 2.5).abs() < 1e-12);
        assert_eq!(cfg.seed, 0);

        unsafe {
            std::env::set_var("OGOA_SEED", "42");
            std::env::set_var("OGOA_BAUD", "fast");
        }
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.seed, 42);
        assert_eq!(cfg.baud, 9600);

        unsafe {
            for k in ["OGOA_PORT", "OGOA_BAUD", "OGOA_DURATION", "OGOA_SEED"] {
                std::env::remove_var(k);
            }
        }
    }
}
