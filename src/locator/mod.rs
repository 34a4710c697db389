// src/locator/mod.rs
//! Custom recipe discovery
//!
//! Recipes outside the built-in catalog come from two places:
//! - deployment projects recorded in the project's deployment manifest
//! - `*.recipe` files anywhere under the project's version-control root
//!   (or the solution directory when the project is not under version control)
//!
//! A directory is reported only when every recipe file in it is named after
//! the directory itself. Discovery never fails; a strategy that errors is
//! logged and contributes nothing.

mod manifest;

pub use manifest::{DeploymentManifestFile, DeploymentManifestSource};

use crate::config::EngineConfig;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

/// Locates directories holding custom recipe documents
#[derive(Clone)]
pub struct CustomRecipeLocator {
    manifest: Arc<dyn DeploymentManifestSource>,
    config: EngineConfig,
}

impl CustomRecipeLocator {
    pub fn new(manifest: Arc<dyn DeploymentManifestSource>, config: EngineConfig) -> Self {
        Self { manifest, config }
    }

    /// Locator reading the manifest file named in `config`
    pub fn with_config(config: EngineConfig) -> Self {
        let manifest = Arc::new(DeploymentManifestFile::new(&config));
        Self::new(manifest, config)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Union of recipe directories from the manifest and the filesystem scan
    ///
    /// `project_path` is the absolute path of the project file and
    /// `solution_dir` the directory holding its solution.
    pub async fn locate_custom_recipe_paths(
        &self,
        project_path: &Path,
        solution_dir: &Path,
    ) -> BTreeSet<PathBuf> {
        let manifest_paths = match self.manifest.recipe_definition_paths(project_path).await {
            Ok(paths) => paths,
            Err(e) => {
                error!(
                    "Failed to load custom deployment recommendations from the deployment manifest: {}",
                    e
                );
                Vec::new()
            }
        };

        let config = self.config.clone();
        let project_path = project_path.to_path_buf();
        let solution_dir = solution_dir.to_path_buf();
        let scan = tokio::task::spawn_blocking(move || {
            let mut found = BTreeSet::new();
            for dir in manifest_paths {
                if contains_recipe_file(&dir, &config) {
                    found.insert(dir);
                }
            }
            for dir in scan_for_recipe_directories(&project_path, &solution_dir, &config) {
                if contains_recipe_file(&dir, &config) {
                    found.insert(dir);
                }
            }
            found
        })
        .await;

        match scan {
            Ok(found) => {
                for dir in &found {
                    info!("Found custom recipe directory {}", dir.display());
                }
                found
            }
            Err(e) => {
                error!("Custom recipe discovery task failed: {}", e);
                BTreeSet::new()
            }
        }
    }
}

/// Nearest ancestor of `start` (inclusive) holding a version-control marker
pub fn find_vcs_root(start: &Path, markers: &[String]) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| markers.iter().any(|marker| dir.join(marker).is_dir()))
        .map(Path::to_path_buf)
}

/// Directory to scan: the version-control root, unless there is none or it is
/// the filesystem root, in which case the solution directory
pub fn select_search_root(vcs_root: Option<&Path>, solution_dir: &Path) -> PathBuf {
    match vcs_root {
        Some(root) if root.parent().is_some() => root.to_path_buf(),
        Some(root) => {
            warn!(
                "Version control root {} is the filesystem root; scanning {} instead",
                root.display(),
                solution_dir.display()
            );
            solution_dir.to_path_buf()
        }
        None => solution_dir.to_path_buf(),
    }
}

/// Parent directories of every recipe file under the search root
fn scan_for_recipe_directories(
    project_path: &Path,
    solution_dir: &Path,
    config: &EngineConfig,
) -> Vec<PathBuf> {
    let project_dir = project_path.parent().unwrap_or(project_path);
    let vcs_root = find_vcs_root(project_dir, &config.vcs_markers);
    let root = select_search_root(vcs_root.as_deref(), solution_dir);

    if !root.is_dir() {
        warn!("Recipe search root {} does not exist", root.display());
        return Vec::new();
    }
    debug!("Scanning {} for custom recipes", root.display());

    let mut dirs = Vec::new();
    let walker = WalkDir::new(&root).into_iter().filter_entry(|entry| {
        entry.depth() == 0
            || !(entry.file_type().is_dir() && entry.file_name() == config.ignored_directory.as_str())
    });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Error while scanning {} for recipes: {}", root.display(), e);
                continue;
            }
        };
        if entry.file_type().is_file() && config.is_recipe_file(entry.path()) {
            if let Some(parent) = entry.path().parent() {
                dirs.push(parent.to_path_buf());
            }
        }
    }

    dirs
}

/// Whether `dir` holds at least one recipe file and all of them are named
/// after the directory
fn contains_recipe_file(dir: &Path, config: &EngineConfig) -> bool {
    let Some(dir_name) = dir.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Cannot read candidate recipe directory {}: {}", dir.display(), e);
            return false;
        }
    };

    let mut recipe_count = 0;
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() || !config.is_recipe_file(&path) {
            continue;
        }
        recipe_count += 1;
        let stem = path.file_stem().and_then(|s| s.to_str());
        if stem != Some(dir_name) {
            debug!(
                "Ignoring {}: recipe file {} does not match the directory name",
                dir.display(),
                path.display()
            );
            return false;
        }
    }

    recipe_count > 0
}
