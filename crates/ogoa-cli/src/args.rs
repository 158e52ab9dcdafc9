//! Command-line flags.  Every setting flag is optional so that, when absent,
//! the config file or environment value underneath it wins.

use std::path::PathBuf;

use clap::Parser;

use crate::config::Config;

/// OGOA serial link tester with a simulated lidar.
#[derive(Parser, Debug)]
#[command(name = "ogoa-harness", author, version, about, long_about = None)]
pub struct Args {
    /// Serial port (e.g. /dev/ttyACM0 or COM7)
    #[arg(short, long)]
    pub port: Option<String>,

    /// Baud rate [default: 115200]
    #[arg(short, long)]
    pub baud: Option<u32>,

    /// Run duration in seconds [default: 8.0]
    #[arg(short, long)]
    pub duration: Option<f64>,

    /// Seconds between STATUS_REQUEST frames [default: 1.0]
    #[arg(long)]
    pub status_interval: Option<f64>,

    /// Seconds between simulated lidar sweeps, 0 disables [default: 0.20]
    #[arg(long, allow_negative_numbers = true)]
    pub lidar_interval: Option<f64>,

    /// Seconds for one hallway-to-corner loop [default: 20.0]
    #[arg(long)]
    pub scenario_seconds: Option<f64>,

    /// Minimum angular step in degrees [default: 2]
    #[arg(long)]
    pub delta_min: Option<u16>,

    /// Maximum angular step in degrees [default: 2]
    #[arg(long)]
    pub delta_max: Option<u16>,

    /// Per-angle temporal smoothing factor, clamped to [0, 1] [default: 0.35]
    #[arg(long)]
    pub smooth_alpha: Option<f64>,

    /// Probability of a no-return sample, clamped to [0, 0.3] [default: 0.01]
    #[arg(long)]
    pub dropout_prob: Option<f64>,

    /// Noise seed, 0 for a random one [default: 0]
    #[arg(long)]
    pub seed: Option<u64>,

    /// TOML file with any of the settings above
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Write the merged configuration to this file and exit
    #[arg(long)]
    pub save_config: Option<PathBuf>,

    /// Print the end-of-run summary as JSON
    #[arg(long)]
    pub summary_json: bool,
}

impl Args {
    /// Overwrite every field of `cfg` that was given on the command line.
    pub fn apply_to(&self, cfg: &mut Config) {
        if let Some(v) = &self.port {
            cfg.port = Some(v.clone());
        }
        if let Some(v) = self.baud {
            cfg.baud = v;
        }
        if let Some(v) = self.duration {
            cfg.duration = v;
        }
        if let Some(v) = self.status_interval {
            cfg.status_interval = v;
        }
        if let Some(v) = self.lidar_interval {
            cfg.lidar_interval = v;
        }
        if let Some(v) = self.scenario_seconds {
            cfg.scenario_seconds = v;
        }
        if let Some(v) = self.delta_min {
            cfg.delta_min = v;
        }
        if let Some(v) = self.delta_max {
            cfg.delta_max = v;
        }
        if let Some(v) = self.smooth_alpha {
            cfg.smooth_alpha = v;
        }
        if let Some(v) = self.dropout_prob {
            cfg.dropout_prob = v;
        }
        if let Some(v) = self.seed {
            cfg.seed = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn clap_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn no_flags_leave_config_untouched() {
        let args = Args::try_parse_from(["ogoa-harness"]).unwrap();
        let mut cfg = Config::default();
        args.apply_to(&mut cfg);
        assert_eq!(cfg, Config::default());
        assert!(!args.summary_json);
    }

    #[test]
    fn flags_override_config() {
        let args = Args::try_parse_from([
            "ogoa-harness",
            "--port",
            "COM7",
            "--baud",
            "57600",
            "--lidar-interval",
            "0",
            "--delta-min",
            "2",
            "--delta-max",
            "8",
            "--smooth-alpha",
            "0.5",
            "--seed",
            "7",
            "--summary-json",
        ])
        .unwrap();
        let mut cfg = Config {
            delta_min: 3,
            ..Config::default()
        };
        args.apply_to(&mut cfg);

        assert_eq!(cfg.port.as_deref(), Some("COM7"));
        assert_eq!(cfg.baud, 57_600);
        assert_eq!(cfg.lidar_interval, 0.0);
        assert_eq!(cfg.delta_min, 2);
        assert_eq!(cfg.delta_max, 8);
        assert!((cfg.smooth_alpha - 0.5).abs() < 1e-12);
        assert_eq!(cfg.seed, 7);
        // Untouched fields keep their lower-layer values.
        assert!((cfg.duration - 8.0).abs() < 1e-12);
        assert!(args.summary_json);
    }

    #[test]
    fn rejects_non_numeric_values() {
        assert!(Args::try_parse_from(["ogoa-harness", "--baud", "fast"]).is_err());
    }
}
