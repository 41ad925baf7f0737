use serde::Deserialize;

use crate::error::ConfigError;

const DEFAULT_HOTPLUG_CAPACITY: usize = 64;

/// Tunables of a [`Session`](crate::Session).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Axis changes at or below this magnitude update state without emitting an event.
    pub axis_threshold: f32,
    /// Capacity of the queue backends use to push hotplug notices. When it
    /// overflows, the next detect reattaches every listed device.
    pub hotplug_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            axis_threshold: 0.0,
            hotplug_capacity: DEFAULT_HOTPLUG_CAPACITY,
        }
    }
}

impl SessionConfig {
    /// Parse a config from yaml and validate it.
    pub fn from_yaml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_axis_threshold(mut self, threshold: f32) -> Self {
        self.axis_threshold = threshold;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.axis_threshold.is_finite() || !(0.0..2.0).contains(&self.axis_threshold)
        {
            return Err(ConfigError::Invalid(format!(
                "axis_threshold must be within [0, 2), got {}",
                self.axis_threshold
            )));
        }
        if self.hotplug_capacity == 0 {
            return Err(ConfigError::Invalid(
                "hotplug_capacity must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_uses_defaults() {
        let config = SessionConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, SessionConfig::default());
    }

    #[test]
    fn parses_threshold() {
        let config = SessionConfig::from_yaml_str("axis_threshold: 0.05\n").unwrap();
        assert!((config.axis_threshold - 0.05).abs() < f32::EPSILON);
        assert_eq!(config.hotplug_capacity, DEFAULT_HOTPLUG_CAPACITY);
    }

    #[test]
    fn rejects_unknown_fields() {
        assert!(matches!(
            SessionConfig::from_yaml_str("deadzone: 0.1\n"),
            Err(ConfigError::Yaml(_))
        ));
    }

    #[test]
    fn rejects_negative_threshold() {
        assert!(matches!(
            SessionConfig::from_yaml_str("axis_threshold: -0.5\n"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn rejects_zero_capacity() {
        assert!(matches!(
            SessionConfig::from_yaml_str("hotplug_capacity: 0\n"),
            Err(ConfigError::Invalid(_))
        ));
    }
}
