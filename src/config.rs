use crate::evaluate::{MetricKind, Threshold};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Serialize)]
pub struct Config {
    pub cpu_threshold: f64,
    pub memory_threshold: f64,
    pub disk_threshold: f64,
    pub log_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cpu_threshold: default_cpu_threshold(),
            memory_threshold: default_memory_threshold(),
            disk_threshold: default_disk_threshold(),
            log_path: default_log_path(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration is invalid: {0}")]
    Validation(String),
    #[error("failed to render configuration as YAML: {0}")]
    Serialize(#[from] serde_yaml::Error),
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_threshold("cpu_threshold", self.cpu_threshold)?;
        validate_threshold("memory_threshold", self.memory_threshold)?;
        validate_threshold("disk_threshold", self.disk_threshold)?;
        if self.log_path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "log_path must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    pub fn threshold(&self, kind: MetricKind) -> Threshold {
        let percent = match kind {
            MetricKind::Cpu => self.cpu_threshold,
            MetricKind::Memory => self.memory_threshold,
            MetricKind::Disk => self.disk_threshold,
        };
        Threshold { kind, percent }
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

fn validate_threshold(field: &str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=100.0).contains(&value) {
        return Err(ConfigError::Validation(format!(
            "{field} must be in the range 0..100"
        )));
    }
    Ok(())
}

const fn default_cpu_threshold() -> f64 {
    80.0
}

const fn default_memory_threshold() -> f64 {
    80.0
}

const fn default_disk_threshold() -> f64 {
    80.0
}

fn default_log_path() -> String {
    "system_health.log".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_config_is_valid() {
        let cfg = Config::default();
        cfg.validate().expect("built-in configuration must validate");
        assert_eq!(cfg.log_path, "system_health.log");
    }

    #[test]
    fn threshold_out_of_range_is_rejected() {
        let cfg = Config {
            disk_threshold: 120.0,
            ..Config::default()
        };
        let err = cfg.validate().expect_err("disk threshold above 100");
        assert!(err.to_string().contains("disk_threshold"));

        let cfg = Config {
            cpu_threshold: -1.0,
            ..Config::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn empty_log_path_is_rejected() {
        let cfg = Config {
            log_path: "  ".to_string(),
            ..Config::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn threshold_lookup_follows_kind() {
        let cfg = Config {
            cpu_threshold: 70.0,
            memory_threshold: 75.0,
            disk_threshold: 90.0,
            ..Config::default()
        };
        assert_eq!(cfg.threshold(MetricKind::Cpu).percent, 70.0);
        assert_eq!(cfg.threshold(MetricKind::Memory).percent, 75.0);
        let disk = cfg.threshold(MetricKind::Disk);
        assert_eq!(disk.kind, MetricKind::Disk);
        assert_eq!(disk.percent, 90.0);
    }

    #[test]
    fn yaml_lists_every_setting() {
        let yaml = Config::default().to_yaml().expect("yaml");
        for key in [
            "cpu_threshold: 80.0",
            "memory_threshold: 80.0",
            "disk_threshold: 80.0",
            "log_path: system_health.log",
        ] {
            assert!(yaml.contains(key), "missing {key} in:\n{yaml}");
        }
    }
}
