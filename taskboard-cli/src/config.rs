//! `~/.taskboard/config.toml`: retry, simulated backend, display and logging
//! settings. Every section is optional; missing keys take their defaults.

use anyhow::{Context, Result, anyhow};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use taskboard_remote::SimulationConfig;
use taskboard_sync::RetryPolicy;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub retry: RetrySection,
    pub simulation: SimulationSection,
    pub display: DisplaySection,
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySection {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
}

impl Default for RetrySection {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_attempts: policy.max_attempts,
            base_delay_ms: u64::try_from(policy.base_delay.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSection {
    pub latency_min_ms: u64,
    pub latency_max_ms: u64,
    pub failure_rate: f64,
    pub seed: u64,
}

impl Default for SimulationSection {
    fn default() -> Self {
        let sim = SimulationConfig::default();
        Self {
            latency_min_ms: sim.latency_min_ms,
            latency_max_ms: sim.latency_max_ms,
            failure_rate: sim.failure_rate,
            seed: sim.seed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySection {
    /// IANA name used to render `created_at`.
    pub timezone: String,
}

impl Default for DisplaySection {
    fn default() -> Self {
        Self {
            timezone: "UTC".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// `EnvFilter` directives; `RUST_LOG` wins when set.
    pub filter: String,
    pub json: bool,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}

impl Config {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry.max_attempts,
            Duration::from_millis(self.retry.base_delay_ms),
        )
    }

    pub fn simulation(&self) -> SimulationConfig {
        SimulationConfig {
            latency_min_ms: self.simulation.latency_min_ms,
            latency_max_ms: self.simulation.latency_max_ms,
            failure_rate: self.simulation.failure_rate,
            seed: self.simulation.seed,
        }
    }

    pub fn timezone(&self) -> Result<Tz> {
        let tz = &self.display.timezone;
        tz.parse()
            .map_err(|_| anyhow!("invalid timezone in [display]: {tz}"))
    }
}

/// `$TASKBOARD_HOME`, else `~/.taskboard`.
pub fn taskboard_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("TASKBOARD_HOME") {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".taskboard"))
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(taskboard_home()?.join("config.toml"))
}

/// A missing file is not an error; it yields the defaults.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    parse_config(&s).with_context(|| format!("parse {}", path.display()))
}

pub fn parse_config(s: &str) -> Result<Config> {
    let cfg: Config = toml::from_str(s)?;
    cfg.simulation().validate()?;
    cfg.timezone()?;
    Ok(cfg)
}

pub fn save_config(path: &Path, cfg: &Config) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// Write the defaults unless a config already exists.
pub fn init_config(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    save_config(path, &Config::default())?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let cfg = parse_config("").unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.retry_policy(), RetryPolicy::default());
        assert_eq!(cfg.timezone().unwrap(), Tz::UTC);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = parse_config(
            r#"
[retry]
base_delay_ms = 250

[simulation]
failure_rate = 0.0

[display]
timezone = "America/Chicago"
"#,
        )
        .unwrap();

        assert_eq!(cfg.retry.max_attempts, 3);
        assert_eq!(cfg.retry_policy().base_delay, Duration::from_millis(250));
        assert_eq!(cfg.simulation().failure_rate, 0.0);
        assert_eq!(cfg.simulation().latency_max_ms, SimulationConfig::default().latency_max_ms);
        assert_eq!(cfg.timezone().unwrap(), chrono_tz::America::Chicago);
        assert!(!cfg.logging.json);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(parse_config("[display]\ntimezone = \"Mars/Olympus\"\n").is_err());
        assert!(parse_config("[simulation]\nfailure_rate = 2.0\n").is_err());
        assert!(parse_config("[simulation]\nlatency_min_ms = 900\nlatency_max_ms = 100\n").is_err());
    }

    #[test]
    fn defaults_round_trip_through_toml() {
        let s = toml::to_string_pretty(&Config::default()).unwrap();
        assert_eq!(parse_config(&s).unwrap(), Config::default());
    }

    #[test]
    fn init_refuses_to_overwrite() {
        let dir = std::env::temp_dir().join(format!("taskboard-cfg-{}", std::process::id()));
        let path = dir.join("config.toml");
        let _ = fs::remove_dir_all(&dir);

        assert!(init_config(&path).unwrap());
        fs::write(&path, "[logging]\njson = true\n").unwrap();
        assert!(!init_config(&path).unwrap());
        assert!(load_config(&path).unwrap().logging.json);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let path = std::env::temp_dir().join("taskboard-definitely-missing.toml");
        assert_eq!(load_config(&path).unwrap(), Config::default());
    }
}
