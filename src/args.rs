use clap::Parser;
use fivem_harvest_run::config::{HarvestConfig, Preset};
use std::path::PathBuf;

/// 🌾 FiveM harvest automation: opens the vehicle inventory, finds the item
/// by template matching and moves it, on a timer.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Harvest route the defaults are tuned for
    #[arg(long, value_enum, default_value_t = Preset::Pistachio)]
    pub preset: Preset,

    /// Seconds between iterations after a success
    #[arg(long, value_name = "SECS")]
    pub interval: Option<f64>,

    /// Seconds between iterations after a failure
    #[arg(long, value_name = "SECS")]
    pub fail_interval: Option<f64>,

    /// Item template image
    #[arg(long, value_name = "PATH")]
    pub template: Option<PathBuf>,

    /// Minimum match confidence (0..1)
    #[arg(long)]
    pub threshold: Option<f32>,

    /// Only look for the item and click it; no focus change, no keys
    #[arg(long)]
    pub detect_only: bool,

    /// Stop after this many iterations
    #[arg(long, value_name = "N")]
    pub max_iterations: Option<u64>,

    /// Save every capture, with the match outlined, into this directory
    #[arg(long, value_name = "DIR")]
    pub dump_dir: Option<PathBuf>,

    /// Enable debug output (RUST_LOG still takes precedence)
    #[arg(long)]
    pub debug: bool,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    pub print_config: bool,
}

impl Args {
    /// Overlay the flags that were given onto `config`.
    pub fn apply(&self, config: &mut HarvestConfig) {
        if let Some(secs) = self.interval {
            config.interval_secs = secs;
        }
        if let Some(secs) = self.fail_interval {
            config.fail_interval_secs = secs;
        }
        if let Some(path) = &self.template {
            config.template_path = path.clone();
        }
        if let Some(threshold) = self.threshold {
            config.match_threshold = threshold;
        }
        if self.detect_only {
            config.detect_only = true;
        }
        if self.max_iterations.is_some() {
            config.max_iterations = self.max_iterations;
        }
        if let Some(dir) = &self.dump_dir {
            config.capture_dump_dir = Some(dir.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_leave_config_alone() {
        let args = Args::try_parse_from(["fivem-harvest-run"]).unwrap();
        assert_eq!(args.preset, Preset::Pistachio);
        let mut config = HarvestConfig::preset(args.preset);
        args.apply(&mut config);
        assert_eq!(config, HarvestConfig::default());
    }

    #[test]
    fn test_flags_override_config() {
        let args = Args::try_parse_from([
            "fivem-harvest-run",
            "--preset",
            "wheat",
            "--interval",
            "30",
            "--threshold",
            "0.8",
            "--detect-only",
            "--max-iterations",
            "3",
            "--dump-dir",
            "captures",
        ])
        .unwrap();
        let mut config = HarvestConfig::preset(args.preset);
        args.apply(&mut config);

        assert_eq!(config.interval_secs, 30.0);
        assert_eq!(config.fail_interval_secs, 10.0);
        assert_eq!(config.match_threshold, 0.8);
        assert!(config.detect_only);
        assert!(!config.container_preopened);
        assert_eq!(config.max_iterations, Some(3));
        assert_eq!(config.capture_dump_dir, Some(PathBuf::from("captures")));
    }

    #[test]
    fn test_unknown_preset_rejected() {
        assert!(Args::try_parse_from(["fivem-harvest-run", "--preset", "cotton"]).is_err());
    }
}
