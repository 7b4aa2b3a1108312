//! Configuration system.
//!
//! Configuration structures are plain serde types loadable from TOML or RON
//! through the [`Config`] trait. [`ApplicationConfig`] is the top-level
//! structure applications should use; the nested sections can also be built
//! programmatically with the `with_*` builders.

pub use serde::{Deserialize, Serialize};

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

        // Try different formats
        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, Default::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Core engine behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Log level for the engine
    pub log_level: String,
    /// Whether to enable debug features
    pub debug_mode: bool,
    /// Target FPS for frame rate limiting
    pub target_fps: Option<u32>,
}

impl EngineConfig {
    /// Create a new engine configuration
    pub fn new() -> Self {
        Self {
            log_level: "info".to_string(),
            debug_mode: cfg!(debug_assertions),
            target_fps: None, // Unlimited by default
        }
    }

    /// Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Enable debug mode
    pub fn with_debug(mut self, enabled: bool) -> Self {
        self.debug_mode = enabled;
        self
    }

    /// Set target FPS
    pub fn with_target_fps(mut self, fps: u32) -> Self {
        self.target_fps = Some(fps);
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Scene dispatch configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneConfig {
    /// Content path of the scene to load and install as root at startup.
    /// `None` leaves the dispatcher without a root scene.
    pub initial_scene_path: Option<String>,
}

impl SceneConfig {
    /// Create a configuration with no startup scene
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the startup scene path
    pub fn with_initial_scene(mut self, path: impl Into<String>) -> Self {
        self.initial_scene_path = Some(path.into());
        self
    }
}

/// Top-level configuration that encompasses all engine subsystems.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Engine core configuration
    pub engine: EngineConfig,
    /// Scene dispatch configuration
    pub scene: SceneConfig,
}

impl ApplicationConfig {
    /// Create a new application configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }
}

impl Config for ApplicationConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scene_config_has_no_startup_scene() {
        let config = SceneConfig::default();
        assert!(config.initial_scene_path.is_none());
    }

    #[test]
    fn test_application_config_toml_round_trip() {
        let config = ApplicationConfig {
            engine: EngineConfig::new().with_log_level("debug").with_target_fps(60),
            scene: SceneConfig::new().with_initial_scene("scenes/main.ron"),
        };

        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: ApplicationConfig = toml::from_str(&text).unwrap();

        assert_eq!(parsed.engine.log_level, "debug");
        assert_eq!(parsed.engine.target_fps, Some(60));
        assert_eq!(
            parsed.scene.initial_scene_path.as_deref(),
            Some("scenes/main.ron")
        );
    }

    #[test]
    fn test_unsupported_extension_is_rejected() {
        let result = ApplicationConfig::default().save_to_file("config.yaml");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }
}
