//! Editor configuration.
//!
//! Read from `.toml` or `.json` files, chosen by extension. Every field has
//! a default, so a partial file (or none at all) is fine.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Whether markdown editing is enabled at all. When off, the surface is
    /// left alone and input is ignored.
    pub markdown: bool,
    /// Wrap a re-rendered leaf in its ambient tag.
    pub wrap_ambient: bool,
    /// Appended after the caret's leaf when the caret sits at its end.
    pub caret_placeholder: char,
    /// Skip leaves that are empty or whitespace only.
    pub skip_blank_leaves: bool,
    /// Maximum number of undo snapshots kept.
    pub history_depth: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            markdown: true,
            wrap_ambient: true,
            caret_placeholder: '\u{200B}',
            skip_blank_leaves: true,
            history_depth: 100,
        }
    }
}

impl EditorConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load a config file, picking the format from its extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let config = match extension(path) {
            Some("json") => Self::from_json_str(&std::fs::read_to_string(path)?)?,
            Some("toml") => Self::from_toml_str(&std::fs::read_to_string(path)?)?,
            other => return Err(ConfigError::UnsupportedFormat(other.unwrap_or("").to_string())),
        };
        tracing::debug!(path = %path.display(), ?config, "loaded editor config");
        Ok(config)
    }

    /// Write the config back out, in the format matching the extension.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        match extension(path) {
            Some("json") => Ok(std::fs::write(path, serde_json::to_string_pretty(self)?)?),
            Some("toml") => Ok(std::fs::write(path, toml::to_string_pretty(self)?)?),
            other => Err(ConfigError::UnsupportedFormat(other.unwrap_or("").to_string())),
        }
    }
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|ext| ext.to_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert!(config.markdown);
        assert!(config.wrap_ambient);
        assert!(config.skip_blank_leaves);
        assert_eq!(config.caret_placeholder, '\u{200B}');
        assert_eq!(config.history_depth, 100);
    }

    #[test]
    fn test_partial_toml() {
        let config = EditorConfig::from_toml_str("markdown = false\nhistory_depth = 5\n").unwrap();
        assert!(!config.markdown);
        assert_eq!(config.history_depth, 5);
        assert!(config.wrap_ambient);
    }

    #[test]
    fn test_json() {
        let config = EditorConfig::from_json_str(r#"{"caret_placeholder": "|"}"#).unwrap();
        assert_eq!(config.caret_placeholder, '|');
        assert!(config.markdown);
    }

    #[test]
    fn test_invalid_toml() {
        let err = EditorConfig::from_toml_str("markdown = \"yes\"").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn test_load_and_save() {
        let dir = std::env::temp_dir().join(format!("tessera-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let config = EditorConfig {
            wrap_ambient: false,
            history_depth: 3,
            ..Default::default()
        };
        for name in ["editor.toml", "editor.json"] {
            let path = dir.join(name);
            config.save(&path).unwrap();
            assert_eq!(EditorConfig::load(&path).unwrap(), config);
        }

        let err = EditorConfig::load(dir.join("editor.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(ext) if ext == "yaml"));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
