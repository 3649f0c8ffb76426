//! Configuration system
//!
//! Configuration files are TOML or RON, picked by file extension.

pub use serde::{Deserialize, Serialize};

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

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
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
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

/// Clip-space depth range produced by projection matrices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DepthRange {
    /// OpenGL convention, near maps to -1 and far to +1
    #[default]
    NegativeOneToOne,
    /// Vulkan/Direct3D convention, near maps to 0 and far to 1
    ZeroToOne,
}

/// What to hand out as the normal matrix when the model-view is singular
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DegenerateNormalPolicy {
    /// Substitute the identity matrix
    #[default]
    Identity,
    /// Substitute the transpose of the non-inverted upper-left 3x3.
    /// A zero-scale instance then gets an all-zero normal matrix.
    Zeroed,
}

/// Settings for a [`ScopeStack`](crate::ScopeStack)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MatrixConfig {
    /// Depth range of every projection matrix the stack computes
    pub depth_range: DepthRange,
    /// Fallback for singular model-view matrices
    pub degenerate_normal: DegenerateNormalPolicy,
}

impl Config for MatrixConfig {}

impl MatrixConfig {
    /// Builder pattern: Set depth range
    #[must_use]
    pub fn with_depth_range(mut self, depth_range: DepthRange) -> Self {
        self.depth_range = depth_range;
        self
    }

    /// Builder pattern: Set degenerate normal policy
    #[must_use]
    pub fn with_degenerate_normal(mut self, policy: DegenerateNormalPolicy) -> Self {
        self.degenerate_normal = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MatrixConfig::default();
        assert_eq!(config.depth_range, DepthRange::NegativeOneToOne);
        assert_eq!(config.degenerate_normal, DegenerateNormalPolicy::Identity);
    }

    #[test]
    fn test_parse_toml_with_missing_fields() {
        let config: MatrixConfig = toml::from_str("depth_range = \"ZeroToOne\"\n").unwrap();
        assert_eq!(config.depth_range, DepthRange::ZeroToOne);
        assert_eq!(config.degenerate_normal, DegenerateNormalPolicy::Identity);
    }

    #[test]
    fn test_parse_ron() {
        let config: MatrixConfig = ron::from_str("(degenerate_normal: Zeroed)").unwrap();
        assert_eq!(config.depth_range, DepthRange::NegativeOneToOne);
        assert_eq!(config.degenerate_normal, DegenerateNormalPolicy::Zeroed);
    }

    #[test]
    fn test_save_and_load_toml_file() {
        let path = std::env::temp_dir().join(format!("render_matrices_config_{}.toml", std::process::id()));
        let path = path.to_string_lossy().to_string();

        let config = MatrixConfig::default()
            .with_depth_range(DepthRange::ZeroToOne)
            .with_degenerate_normal(DegenerateNormalPolicy::Zeroed);
        config.save_to_file(&path).unwrap();
        let loaded = MatrixConfig::load_from_file(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_unsupported_extension() {
        let result = MatrixConfig::default().save_to_file("matrices.json");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = MatrixConfig::load_from_file("/nonexistent/render_matrices/config.toml");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
