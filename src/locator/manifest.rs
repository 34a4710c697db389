// src/locator/manifest.rs
//! Deployment manifest reader
//!
//! A project that has had deployment projects generated from it carries a
//! manifest next to its project file listing where those projects were saved:
//!
//! ```json
//! {
//!   "DeploymentProjects": [
//!     { "SaveCdkDirectoryRelativePath": "../MyApp.Deployment" }
//!   ]
//! }
//! ```

use crate::config::EngineConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Source of previously generated deployment-project directories
#[async_trait]
pub trait DeploymentManifestSource: Send + Sync {
    /// Absolute paths of deployment-project directories recorded for a project
    async fn recipe_definition_paths(&self, project_path: &Path) -> Result<Vec<PathBuf>>;
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DeploymentManifest {
    #[serde(default)]
    deployment_projects: Option<Vec<DeploymentManifestEntry>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DeploymentManifestEntry {
    #[serde(default)]
    save_cdk_directory_relative_path: Option<String>,
}

/// Manifest stored as a JSON file in the project directory
#[derive(Debug, Clone)]
pub struct DeploymentManifestFile {
    file_name: String,
}

impl DeploymentManifestFile {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            file_name: config.manifest_file_name.clone(),
        }
    }

    /// Location of the manifest for a project file
    pub fn manifest_path(&self, project_path: &Path) -> PathBuf {
        project_path
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(&self.file_name)
    }
}

impl Default for DeploymentManifestFile {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

#[async_trait]
impl DeploymentManifestSource for DeploymentManifestFile {
    async fn recipe_definition_paths(&self, project_path: &Path) -> Result<Vec<PathBuf>> {
        let manifest_path = self.manifest_path(project_path);
        if !tokio::fs::try_exists(&manifest_path).await? {
            return Ok(Vec::new());
        }

        let content = tokio::fs::read_to_string(&manifest_path).await?;
        let manifest: DeploymentManifest = serde_json::from_str(&content).map_err(|e| {
            Error::DeserializationFailed(format!(
                "Invalid deployment manifest {}: {}",
                manifest_path.display(),
                e
            ))
        })?;

        let project_dir = manifest_path.parent().unwrap_or_else(|| Path::new(""));
        let mut paths = Vec::new();
        for entry in manifest.deployment_projects.unwrap_or_default() {
            let Some(relative) = entry
                .save_cdk_directory_relative_path
                .filter(|p| !p.is_empty())
            else {
                continue;
            };

            let absolute = project_dir.join(&relative);
            let resolved = match tokio::fs::canonicalize(&absolute).await {
                Ok(path) => path,
                Err(_) => {
                    debug!(
                        "Skipping missing deployment project directory {}",
                        absolute.display()
                    );
                    continue;
                }
            };
            if tokio::fs::metadata(&resolved).await.is_ok_and(|m| m.is_dir()) {
                paths.push(resolved);
            }
        }

        Ok(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_missing_manifest_is_empty() {
        let dir = tempdir().unwrap();
        let project = dir.path().join("App.csproj");
        let paths = DeploymentManifestFile::default()
            .recipe_definition_paths(&project)
            .await
            .unwrap();
        assert!(paths.is_empty());
    }

    #[tokio::test]
    async fn test_resolves_existing_directories() {
        let dir = tempdir().unwrap();
        let app = dir.path().join("App");
        fs::create_dir_all(&app).unwrap();
        fs::create_dir_all(dir.path().join("App.Deployment")).unwrap();
        fs::write(
            app.join("aws-deployments.json"),
            r#"{"DeploymentProjects": [
                {"SaveCdkDirectoryRelativePath": "../App.Deployment"},
                {"SaveCdkDirectoryRelativePath": "../Gone"},
                {"SaveCdkDirectoryRelativePath": ""}
            ]}"#,
        )
        .unwrap();

        let paths = DeploymentManifestFile::default()
            .recipe_definition_paths(&app.join("App.csproj"))
            .await
            .unwrap();
        assert_eq!(
            paths,
            vec![fs::canonicalize(dir.path().join("App.Deployment")).unwrap()]
        );
    }

    #[tokio::test]
    async fn test_malformed_manifest() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("aws-deployments.json"), "{ broken").unwrap();
        let result = DeploymentManifestFile::default()
            .recipe_definition_paths(&dir.path().join("App.csproj"))
            .await;
        assert!(matches!(result, Err(Error::DeserializationFailed(_))));
    }

    #[test]
    fn test_configured_file_name() {
        let config = EngineConfig {
            manifest_file_name: "deployments.json".to_string(),
            ..Default::default()
        };
        let manifest = DeploymentManifestFile::new(&config);
        assert_eq!(
            manifest.manifest_path(Path::new("/src/App/App.csproj")),
            PathBuf::from("/src/App/deployments.json")
        );
    }
}
