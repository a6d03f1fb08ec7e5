//! Configuration for the harvest loop
//!
//! Values come from a preset, then environment variables, then command-line
//! flags, each layer overriding the previous one.

use crate::desktop::KeyCode;
use crate::error::{HarvestError, HarvestResult};
use regex::Regex;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_INTERVAL: &str = "FIVEM_BOT_INTERVAL";
pub const ENV_FAIL_INTERVAL: &str = "FIVEM_BOT_FAIL_INTERVAL";
pub const ENV_TEMPLATE: &str = "FIVEM_BOT_TEMPLATE";
pub const ENV_THRESHOLD: &str = "FIVEM_BOT_THRESHOLD";
pub const ENV_WINDOW_PATTERN: &str = "FIVEM_BOT_WINDOW_PATTERN";
pub const ENV_CONTAINER_PREOPENED: &str = "FIVEM_BOT_CONTAINER_PREOPENED";
pub const ENV_SWITCH_AWAY: &str = "FIVEM_BOT_SWITCH_AWAY";
pub const ENV_FAILURE_LIMIT: &str = "FIVEM_BOT_FAILURE_LIMIT";
pub const ENV_JITTER_MIN: &str = "FIVEM_BOT_JITTER_MIN";
pub const ENV_JITTER_MAX: &str = "FIVEM_BOT_JITTER_MAX";
pub const ENV_DETECT_ONLY: &str = "FIVEM_BOT_DETECT_ONLY";
pub const ENV_DUMP_DIR: &str = "FIVEM_BOT_DUMP_DIR";

/// Which harvest route the defaults are tuned for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
pub enum Preset {
    /// Wheat field: trunk opened every cycle, short interval
    Wheat,
    /// Pistachio farm: trunk left open, long interval, Alt+Tab afterwards
    Pistachio,
}

/// Keys sent during one harvest sequence
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KeyBindings {
    /// Opens the container (vehicle inventory)
    pub container: KeyCode,
    /// Opens/closes the trunk sub-container
    pub trunk: KeyCode,
    /// Toggles the inventory menu
    pub menu: KeyCode,
    /// Closes and locks
    pub interact: KeyCode,
    /// Held while clicking the item
    pub click_modifier: KeyCode,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            container: KeyCode::Char('x'),
            trunk: KeyCode::Char('g'),
            menu: KeyCode::Tab,
            interact: KeyCode::Char('e'),
            click_modifier: KeyCode::Control,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HarvestConfig {
    /// Seconds between cycles after a success
    pub interval_secs: f64,
    /// Seconds between cycles after a failure
    pub fail_interval_secs: f64,
    pub template_path: PathBuf,
    pub match_threshold: f32,
    /// Regular expression matched against window titles
    pub window_pattern: String,
    /// Trunk is already open, so the trunk key is skipped on open and close
    pub container_preopened: bool,
    /// Alt+Tab away from the game once the sequence is done
    pub switch_away: bool,
    /// Consecutive failures that stop the loop
    pub failure_limit: u32,
    pub jitter_min_secs: f64,
    pub jitter_max_secs: f64,
    /// Wait for the inventory menu to render
    pub menu_settle_secs: f64,
    /// Only look for the item and click it; no focus, no keys
    pub detect_only: bool,
    pub capture_dump_dir: Option<PathBuf>,
    pub max_iterations: Option<u64>,
    pub keys: KeyBindings,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self::preset(Preset::Pistachio)
    }
}

impl HarvestConfig {
    pub fn preset(preset: Preset) -> Self {
        match preset {
            Preset::Wheat => Self {
                interval_secs: 20.0,
                fail_interval_secs: 10.0,
                template_path: PathBuf::from("items/ble.png"),
                match_threshold: 0.75,
                window_pattern: r".*FiveM.*".to_string(),
                container_preopened: false,
                switch_away: false,
                failure_limit: 5,
                jitter_min_secs: -2.0,
                jitter_max_secs: 4.0,
                menu_settle_secs: 0.5,
                detect_only: false,
                capture_dump_dir: None,
                max_iterations: None,
                keys: KeyBindings::default(),
            },
            Preset::Pistachio => Self {
                interval_secs: 155.0,
                template_path: PathBuf::from("assets/items/pistache.png"),
                container_preopened: true,
                switch_away: true,
                menu_settle_secs: 0.75,
                ..Self::preset(Preset::Wheat)
            },
        }
    }

    /// Overlay values from the process environment.
    pub fn apply_env(&mut self) -> HarvestResult<()> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Overlay values from `lookup` (the environment, or a map in tests).
    pub fn apply_env_with<F>(&mut self, lookup: F) -> HarvestResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_INTERVAL) {
            self.interval_secs = parse_secs(ENV_INTERVAL, &value)?;
        }
        if let Some(value) = lookup(ENV_FAIL_INTERVAL) {
            self.fail_interval_secs = parse_secs(ENV_FAIL_INTERVAL, &value)?;
        }
        if let Some(value) = lookup(ENV_TEMPLATE) {
            self.template_path = PathBuf::from(value);
        }
        if let Some(value) = lookup(ENV_THRESHOLD) {
            self.match_threshold = value
                .trim()
                .parse()
                .map_err(|_| HarvestError::invalid_config(ENV_THRESHOLD, &value, "expected a number"))?;
        }
        if let Some(value) = lookup(ENV_WINDOW_PATTERN) {
            self.window_pattern = value;
        }
        if let Some(value) = lookup(ENV_CONTAINER_PREOPENED) {
            self.container_preopened = parse_flag(ENV_CONTAINER_PREOPENED, &value)?;
        }
        if let Some(value) = lookup(ENV_SWITCH_AWAY) {
            self.switch_away = parse_flag(ENV_SWITCH_AWAY, &value)?;
        }
        if let Some(value) = lookup(ENV_FAILURE_LIMIT) {
            self.failure_limit = value.trim().parse().map_err(|_| {
                HarvestError::invalid_config(ENV_FAILURE_LIMIT, &value, "expected a whole number")
            })?;
        }
        if let Some(value) = lookup(ENV_JITTER_MIN) {
            self.jitter_min_secs = parse_signed_secs(ENV_JITTER_MIN, &value)?;
        }
        if let Some(value) = lookup(ENV_JITTER_MAX) {
            self.jitter_max_secs = parse_signed_secs(ENV_JITTER_MAX, &value)?;
        }
        if let Some(value) = lookup(ENV_DETECT_ONLY) {
            self.detect_only = parse_flag(ENV_DETECT_ONLY, &value)?;
        }
        if let Some(value) = lookup(ENV_DUMP_DIR) {
            self.capture_dump_dir = (!value.trim().is_empty()).then(|| PathBuf::from(value));
        }
        Ok(())
    }

    /// Check ranges and compile the window pattern.
    pub fn validate(&self) -> HarvestResult<()> {
        if !(0.0..=1.0).contains(&self.match_threshold) {
            return Err(HarvestError::invalid_config(
                "match_threshold",
                self.match_threshold.to_string(),
                "must be between 0 and 1",
            ));
        }
        for (key, value) in [
            ("interval", self.interval_secs),
            ("fail_interval", self.fail_interval_secs),
            ("menu_settle", self.menu_settle_secs),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(HarvestError::invalid_config(
                    key,
                    value.to_string(),
                    "must be a non-negative number of seconds",
                ));
            }
        }
        if !self.jitter_min_secs.is_finite()
            || !self.jitter_max_secs.is_finite()
            || self.jitter_min_secs > self.jitter_max_secs
        {
            return Err(HarvestError::invalid_config(
                "jitter",
                format!("{}..{}", self.jitter_min_secs, self.jitter_max_secs),
                "minimum must not exceed maximum",
            ));
        }
        if self.failure_limit == 0 {
            return Err(HarvestError::invalid_config(
                "failure_limit",
                "0",
                "must be at least 1",
            ));
        }
        if self.max_iterations == Some(0) {
            return Err(HarvestError::invalid_config(
                "max_iterations",
                "0",
                "must be at least 1",
            ));
        }
        self.window_regex()?;
        Ok(())
    }

    pub fn window_regex(&self) -> HarvestResult<Regex> {
        Ok(Regex::new(&self.window_pattern)?)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs_f64(self.interval_secs)
    }

    pub fn fail_interval(&self) -> Duration {
        Duration::from_secs_f64(self.fail_interval_secs)
    }

    pub fn menu_settle(&self) -> Duration {
        Duration::from_secs_f64(self.menu_settle_secs)
    }
}

fn parse_secs(key: &str, value: &str) -> HarvestResult<f64> {
    let secs = parse_signed_secs(key, value)?;
    if secs < 0.0 {
        return Err(HarvestError::invalid_config(key, value, "must not be negative"));
    }
    Ok(secs)
}

fn parse_signed_secs(key: &str, value: &str) -> HarvestResult<f64> {
    match value.trim().parse::<f64>() {
        Ok(secs) if secs.is_finite() => Ok(secs),
        _ => Err(HarvestError::invalid_config(key, value, "expected a number of seconds")),
    }
}

fn parse_flag(key: &str, value: &str) -> HarvestResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(HarvestError::invalid_config(key, value, "expected true or false")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_presets() {
        let wheat = HarvestConfig::preset(Preset::Wheat);
        assert_eq!(wheat.interval_secs, 20.0);
        assert_eq!(wheat.fail_interval_secs, 10.0);
        assert!(!wheat.container_preopened);
        assert!(!wheat.switch_away);
        assert_eq!(wheat.menu_settle(), Duration::from_millis(500));

        let pistachio = HarvestConfig::default();
        assert_eq!(pistachio, HarvestConfig::preset(Preset::Pistachio));
        assert_eq!(pistachio.interval(), Duration::from_secs(155));
        assert_eq!(pistachio.fail_interval(), Duration::from_secs(10));
        assert_eq!(pistachio.match_threshold, 0.75);
        assert_eq!(pistachio.failure_limit, 5);
        assert_eq!((pistachio.jitter_min_secs, pistachio.jitter_max_secs), (-2.0, 4.0));
        assert!(pistachio.container_preopened);
        assert!(pistachio.switch_away);
        assert!(pistachio.validate().is_ok());
    }

    #[test]
    fn test_env_overlay() {
        let mut config = HarvestConfig::preset(Preset::Wheat);
        config
            .apply_env_with(env(&[
                (ENV_INTERVAL, "45"),
                (ENV_FAIL_INTERVAL, "7.5"),
                (ENV_TEMPLATE, "assets/items/raisin.png"),
                (ENV_THRESHOLD, "0.9"),
                (ENV_SWITCH_AWAY, "yes"),
                (ENV_CONTAINER_PREOPENED, "1"),
                (ENV_FAILURE_LIMIT, "3"),
                (ENV_JITTER_MIN, "-1"),
                (ENV_JITTER_MAX, "0"),
                (ENV_DUMP_DIR, "captures"),
            ]))
            .unwrap();

        assert_eq!(config.interval(), Duration::from_secs(45));
        assert_eq!(config.fail_interval(), Duration::from_millis(7500));
        assert_eq!(config.template_path, PathBuf::from("assets/items/raisin.png"));
        assert_eq!(config.match_threshold, 0.9);
        assert!(config.switch_away);
        assert!(config.container_preopened);
        assert_eq!(config.failure_limit, 3);
        assert_eq!((config.jitter_min_secs, config.jitter_max_secs), (-1.0, 0.0));
        assert_eq!(config.capture_dump_dir, Some(PathBuf::from("captures")));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overlay_leaves_unset_values() {
        let mut config = HarvestConfig::default();
        config.apply_env_with(env(&[])).unwrap();
        assert_eq!(config, HarvestConfig::default());
    }

    #[test]
    fn test_env_rejects_garbage() {
        let mut config = HarvestConfig::default();
        let err = config
            .apply_env_with(env(&[(ENV_INTERVAL, "two minutes")]))
            .unwrap_err();
        assert!(matches!(err, HarvestError::InvalidConfig { ref key, .. } if key == ENV_INTERVAL));

        let err = config
            .apply_env_with(env(&[(ENV_INTERVAL, "-5")]))
            .unwrap_err();
        assert!(matches!(err, HarvestError::InvalidConfig { ref reason, .. } if reason == "must not be negative"));

        let err = config
            .apply_env_with(env(&[(ENV_SWITCH_AWAY, "maybe")]))
            .unwrap_err();
        assert!(matches!(err, HarvestError::InvalidConfig { .. }));
    }

    #[test]
    fn test_validate_ranges() {
        let mut config = HarvestConfig::default();
        config.match_threshold = 1.5;
        assert!(config.validate().is_err());

        let mut config = HarvestConfig::default();
        config.jitter_min_secs = 5.0;
        config.jitter_max_secs = 4.0;
        assert!(config.validate().is_err());

        let mut config = HarvestConfig::default();
        config.failure_limit = 0;
        assert!(config.validate().is_err());

        let mut config = HarvestConfig::default();
        config.max_iterations = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_window_pattern() {
        let mut config = HarvestConfig::default();
        config.window_pattern = "FiveM(".to_string();
        assert!(matches!(config.validate(), Err(HarvestError::InvalidPattern(_))));

        config.window_pattern = ".*FiveM.*".to_string();
        assert!(config.window_regex().unwrap().is_match("FiveM® by Cfx.re - Cayo Perico"));
    }
}
