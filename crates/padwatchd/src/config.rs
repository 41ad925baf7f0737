use std::fs;
use std::path::Path;

use padwatch::{ConfigError, SessionConfig};
use serde::Deserialize;

use crate::cli::Backend;

/// Daemon settings, read from yaml. Every field is optional.
///
/// ```yaml
/// backend: virtual
/// poll_interval_ms: 16
/// detect_interval_ms: 500
/// session:
///   axis_threshold: 0.02
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct DaemonConfig {
    pub backend: Backend,
    /// Period of process-events cycles.
    pub poll_interval_ms: u64,
    /// Period of detect cycles.
    pub detect_interval_ms: u64,
    pub session: SessionConfig,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Virtual,
            poll_interval_ms: 16,
            detect_interval_ms: 500,
            session: SessionConfig::default(),
        }
    }
}

impl DaemonConfig {
    /// Loads the config at `path`, or the defaults when no path is given.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let input = fs::read_to_string(path)?;
        Self::from_yaml_str(&input)
    }

    pub(crate) fn from_yaml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_ms == 0 || self.detect_interval_ms == 0 {
            return Err(ConfigError::Invalid("intervals must be positive".into()));
        }
        self.session.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_path_gives_defaults() {
        assert_eq!(DaemonConfig::load(None).unwrap(), DaemonConfig::default());
    }

    #[test]
    fn parses_full_config() {
        let yaml = "backend: sdl\npoll_interval_ms: 8\ndetect_interval_ms: 1000\nsession:\n  axis_threshold: 0.02\n";
        let config = DaemonConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.backend, Backend::Sdl);
        assert_eq!(config.poll_interval_ms, 8);
        assert_eq!(config.detect_interval_ms, 1000);
        assert!((config.session.axis_threshold - 0.02).abs() < f32::EPSILON);
    }

    #[test]
    fn rejects_zero_interval() {
        assert!(matches!(
            DaemonConfig::from_yaml_str("poll_interval_ms: 0\n"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn rejects_invalid_session() {
        assert!(matches!(
            DaemonConfig::from_yaml_str("session:\n  hotplug_capacity: 0\n"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn rejects_unknown_backend() {
        assert!(matches!(
            DaemonConfig::from_yaml_str("backend: xinput\n"),
            Err(ConfigError::Yaml(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let path = Path::new("/nonexistent/padwatchd.yaml");
        assert!(matches!(DaemonConfig::load(Some(path)), Err(ConfigError::Io(_))));
    }
}
