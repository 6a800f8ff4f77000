//! Run configuration for cbdrank
//!
//! Supports loading config from:
//! - A TOML file (e.g. `cbdrank.toml`)
//! - Environment variables (`CBDRANK_*`), which take priority
//!
//! ```toml
//! damping_factor = 0.85
//! tolerance = 1e-6
//! max_iterations = 1000
//! threads = 8
//!
//! [karma]
//! fan_out = "full"        # or "split"
//! scale_by_stake = false
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::errors::RankResult;
use crate::karma::KarmaPolicy;
use crate::rank::{RankParams, DEFAULT_DAMPING_FACTOR, DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE};

pub const ENV_DAMPING_FACTOR: &str = "CBDRANK_DAMPING_FACTOR";
pub const ENV_TOLERANCE: &str = "CBDRANK_TOLERANCE";
pub const ENV_MAX_ITERATIONS: &str = "CBDRANK_MAX_ITERATIONS";
pub const ENV_THREADS: &str = "CBDRANK_THREADS";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RankConfig {
    pub damping_factor: f64,
    pub tolerance: f64,
    pub max_iterations: usize,
    /// Worker threads for the CPU backend (None = one per core)
    pub threads: Option<usize>,
    pub karma: KarmaPolicy,
}

impl Default for RankConfig {
    fn default() -> Self {
        Self {
            damping_factor: DEFAULT_DAMPING_FACTOR,
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            threads: None,
            karma: KarmaPolicy::default(),
        }
    }
}

impl RankConfig {
    /// Load config with priority:
    /// 1. Environment variables (highest)
    /// 2. The TOML file at `path`, if given
    /// 3. Defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file {}", path.display()))?;
                Self::from_toml_str(&content)
                    .with_context(|| format!("Invalid config file {}", path.display()))?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Override fields from an environment lookup.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(value) = lookup(ENV_DAMPING_FACTOR) {
            self.damping_factor = value
                .trim()
                .parse()
                .with_context(|| format!("{} is not a number: {:?}", ENV_DAMPING_FACTOR, value))?;
        }
        if let Some(value) = lookup(ENV_TOLERANCE) {
            self.tolerance = value
                .trim()
                .parse()
                .with_context(|| format!("{} is not a number: {:?}", ENV_TOLERANCE, value))?;
        }
        if let Some(value) = lookup(ENV_MAX_ITERATIONS) {
            self.max_iterations = value
                .trim()
                .parse()
                .with_context(|| format!("{} is not an integer: {:?}", ENV_MAX_ITERATIONS, value))?;
        }
        if let Some(value) = lookup(ENV_THREADS) {
            let threads: usize = value
                .trim()
                .parse()
                .with_context(|| format!("{} is not an integer: {:?}", ENV_THREADS, value))?;
            self.threads = Some(threads);
        }
        Ok(())
    }

    /// Checked rank parameters for this config.
    pub fn rank_params(&self) -> RankResult<RankParams> {
        RankParams::new(self.damping_factor, self.tolerance)?.with_max_iterations(self.max_iterations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::RankError;
    use crate::karma::OwnerFanOut;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = RankConfig::default();
        assert_eq!(config.damping_factor, 0.85);
        assert_eq!(config.tolerance, 1e-6);
        assert_eq!(config.max_iterations, 1000);
        assert!(config.threads.is_none());
        assert_eq!(config.karma.fan_out, OwnerFanOut::Full);
        assert!(config.rank_params().is_ok());
    }

    #[test]
    fn test_toml_parsing() {
        let toml_str = r#"
damping_factor = 0.9
tolerance = 1e-8
threads = 4

[karma]
fan_out = "split"
scale_by_stake = true
"#;
        let config = RankConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.damping_factor, 0.9);
        assert_eq!(config.tolerance, 1e-8);
        assert_eq!(config.max_iterations, 1000);
        assert_eq!(config.threads, Some(4));
        assert_eq!(config.karma.fan_out, OwnerFanOut::Split);
        assert!(config.karma.scale_by_stake);
    }

    #[test]
    fn test_toml_unknown_fan_out_rejected() {
        let result = RankConfig::from_toml_str("[karma]\nfan_out = \"proportional\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_DAMPING_FACTOR, "0.7"),
            (ENV_MAX_ITERATIONS, " 50 "),
            (ENV_THREADS, "3"),
        ]
        .into_iter()
        .collect();

        let mut config = RankConfig::from_toml_str("damping_factor = 0.9\ntolerance = 1e-4").unwrap();
        config
            .apply_env(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.damping_factor, 0.7);
        assert_eq!(config.tolerance, 1e-4);
        assert_eq!(config.max_iterations, 50);
        assert_eq!(config.threads, Some(3));
    }

    #[test]
    fn test_env_override_not_a_number() {
        let mut config = RankConfig::default();
        let result = config.apply_env(|key| (key == ENV_TOLERANCE).then(|| "tiny".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_values_fail_validation() {
        let config = RankConfig {
            damping_factor: 1.2,
            ..RankConfig::default()
        };
        assert!(matches!(config.rank_params(), Err(RankError::InvalidParameter(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let result = RankConfig::load(Some(Path::new("/nonexistent/cbdrank.toml")));
        assert!(result.is_err());
    }
}
