// src/config.rs

//! Engine configuration
//!
//! Everything the engine treats as a convention (recipe file suffix, build
//! output directories to skip, version-control markers, manifest file name)
//! lives here so a caller can override it from a TOML file.
//!
//! # Example engine.toml
//!
//! ```toml
//! recipe_extension = "recipe"
//! ignored_directory = "bin"
//! vcs_markers = [".git", ".svn"]
//! manifest_file_name = "aws-deployments.json"
//! persisted_recipe_priority = 1000
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default suffix of recipe documents
pub const DEFAULT_RECIPE_EXTENSION: &str = "recipe";

/// Default build output directory excluded from recipe discovery
pub const DEFAULT_IGNORED_DIRECTORY: &str = "bin";

/// Default deployment manifest file name, stored next to the project file
pub const DEFAULT_MANIFEST_FILE_NAME: &str = "aws-deployments.json";

/// Default priority given to recipes snapshotted into deployment projects
pub const DEFAULT_PERSISTED_RECIPE_PRIORITY: i32 = 1000;

/// Engine-wide configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EngineConfig {
    /// Extension (without the dot) of recipe documents
    pub recipe_extension: String,

    /// Directory name that marks build output; recipe files below it are ignored
    pub ignored_directory: String,

    /// Directory names whose presence marks a version-control root
    pub vcs_markers: Vec<String>,

    /// Name of the deployment manifest file in the project directory
    pub manifest_file_name: String,

    /// Priority assigned to persisted deployment-project recipes
    pub persisted_recipe_priority: i32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            recipe_extension: DEFAULT_RECIPE_EXTENSION.to_string(),
            ignored_directory: DEFAULT_IGNORED_DIRECTORY.to_string(),
            vcs_markers: vec![".git".to_string(), ".svn".to_string()],
            manifest_file_name: DEFAULT_MANIFEST_FILE_NAME.to_string(),
            persisted_recipe_priority: DEFAULT_PERSISTED_RECIPE_PRIORITY,
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from TOML text; missing keys take their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid engine configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "Failed to read engine configuration {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Reject values that would make discovery meaningless
    pub fn validate(&self) -> Result<()> {
        if self.recipe_extension.trim().is_empty() {
            return Err(Error::Config("recipe_extension cannot be empty".to_string()));
        }
        if self.recipe_extension.starts_with('.') {
            return Err(Error::Config(format!(
                "recipe_extension must not start with a dot: {}",
                self.recipe_extension
            )));
        }
        if self.manifest_file_name.trim().is_empty() {
            return Err(Error::Config("manifest_file_name cannot be empty".to_string()));
        }
        Ok(())
    }

    /// Whether `path` carries the recipe extension
    pub fn is_recipe_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == self.recipe_extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.recipe_extension, "recipe");
        assert_eq!(config.ignored_directory, "bin");
        assert_eq!(config.vcs_markers, vec![".git", ".svn"]);
        assert_eq!(config.persisted_recipe_priority, 1000);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = EngineConfig::from_toml_str(r#"ignored_directory = "out""#).unwrap();
        assert_eq!(config.ignored_directory, "out");
        assert_eq!(config.recipe_extension, "recipe");
        assert_eq!(config.manifest_file_name, "aws-deployments.json");
    }

    #[test]
    fn test_rejects_dotted_extension() {
        let result = EngineConfig::from_toml_str(r#"recipe_extension = ".recipe""#);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_is_recipe_file() {
        let config = EngineConfig::default();
        assert!(config.is_recipe_file(Path::new("/a/b/MyRecipe.recipe")));
        assert!(!config.is_recipe_file(Path::new("/a/b/MyRecipe.json")));
        assert!(!config.is_recipe_file(Path::new("/a/b/recipe")));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.toml");
        std::fs::write(&path, "vcs_markers = [\".hg\"]\npersisted_recipe_priority = 5\n").unwrap();

        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.vcs_markers, vec![".hg"]);
        assert_eq!(config.persisted_recipe_priority, 5);
    }
}
