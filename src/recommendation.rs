// src/recommendation.rs

//! Recommendations
//!
//! A recommendation binds one recipe to one target project and carries all
//! state of a configuration session: option setting overrides, replacement
//! tokens, the deployment bundle projection and the last validation state
//! of each setting. The recipe itself is shared and never mutated.

use crate::bundle::DeploymentBundle;
use crate::recipe::{OptionSettingItem, RecipeDefinition, SettingValue};
use crate::validation::ValidationState;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Replacement token for the project file name without extension
pub const REPLACE_TOKEN_PROJECT_NAME: &str = "{ProjectName}";

/// The project a recipe is being applied to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDefinition {
    /// Path of the project file
    pub project_path: PathBuf,
    /// Solution directory the project belongs to, when known
    pub solution_path: Option<PathBuf>,
}

impl ProjectDefinition {
    pub fn new(project_path: impl Into<PathBuf>) -> Self {
        Self {
            project_path: project_path.into(),
            solution_path: None,
        }
    }

    pub fn with_solution_path(mut self, solution_path: impl Into<PathBuf>) -> Self {
        self.solution_path = Some(solution_path.into());
        self
    }

    /// Project file name without its extension
    pub fn project_name(&self) -> String {
        self.project_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Directory holding the project file
    pub fn project_directory(&self) -> Option<&Path> {
        self.project_path.parent()
    }
}

/// A recipe bound to a project plus the overrides applied so far
#[derive(Debug, Clone)]
pub struct Recommendation {
    recipe: Arc<RecipeDefinition>,
    project: ProjectDefinition,
    computed_priority: i32,
    overrides: HashMap<String, SettingValue>,
    replacement_tokens: BTreeMap<String, String>,
    deployment_bundle: DeploymentBundle,
    validation: HashMap<String, ValidationState>,
    is_existing_cloud_application: bool,
}

impl Recommendation {
    pub fn new(
        recipe: Arc<RecipeDefinition>,
        project: ProjectDefinition,
        computed_priority: i32,
    ) -> Self {
        let mut replacement_tokens = BTreeMap::new();
        replacement_tokens.insert(
            REPLACE_TOKEN_PROJECT_NAME.to_string(),
            project.project_name(),
        );

        Self {
            recipe,
            project,
            computed_priority,
            overrides: HashMap::new(),
            replacement_tokens,
            deployment_bundle: DeploymentBundle::default(),
            validation: HashMap::new(),
            is_existing_cloud_application: false,
        }
    }

    /// Shared recipe; clone the `Arc` to hold setting references across writes
    pub fn recipe(&self) -> &Arc<RecipeDefinition> {
        &self.recipe
    }

    pub fn project(&self) -> &ProjectDefinition {
        &self.project
    }

    pub fn computed_priority(&self) -> i32 {
        self.computed_priority
    }

    pub fn name(&self) -> &str {
        &self.recipe.name
    }

    pub fn description(&self) -> &str {
        &self.recipe.description
    }

    /// Top-level settings offered for configuration
    pub fn configurable_option_setting_items(&self) -> &[OptionSettingItem] {
        self.recipe.option_settings()
    }

    /// Add or replace a replacement token such as `{StackName}`
    pub fn add_replacement_token(&mut self, token: impl Into<String>, value: impl Into<String>) {
        self.replacement_tokens.insert(token.into(), value.into());
    }

    pub fn replacement_tokens(&self) -> &BTreeMap<String, String> {
        &self.replacement_tokens
    }

    /// Substitute every replacement token in `text`
    pub fn apply_replacement_tokens(&self, text: &str) -> String {
        let mut result = text.to_string();
        for (token, value) in &self.replacement_tokens {
            result = result.replace(token.as_str(), value);
        }
        result
    }

    /// Override stored for a fully qualified setting id
    pub fn override_value(&self, fully_qualified_id: &str) -> Option<&SettingValue> {
        self.overrides.get(fully_qualified_id)
    }

    pub fn overrides(&self) -> &HashMap<String, SettingValue> {
        &self.overrides
    }

    pub(crate) fn set_override(&mut self, fully_qualified_id: &str, value: Option<SettingValue>) {
        match value {
            Some(value) => {
                self.overrides.insert(fully_qualified_id.to_string(), value);
            }
            None => {
                self.overrides.remove(fully_qualified_id);
            }
        }
    }

    pub fn deployment_bundle(&self) -> &DeploymentBundle {
        &self.deployment_bundle
    }

    pub(crate) fn deployment_bundle_mut(&mut self) -> &mut DeploymentBundle {
        &mut self.deployment_bundle
    }

    /// Last validation state of a setting; valid until validated otherwise
    pub fn validation_state(&self, fully_qualified_id: &str) -> ValidationState {
        self.validation
            .get(fully_qualified_id)
            .cloned()
            .unwrap_or_default()
    }

    pub(crate) fn set_validation_state(&mut self, fully_qualified_id: &str, state: ValidationState) {
        if state.is_valid() {
            self.validation.remove(fully_qualified_id);
        } else {
            self.validation.insert(fully_qualified_id.to_string(), state);
        }
    }

    /// Whether the recommendation redeploys an application that already exists
    pub fn is_existing_cloud_application(&self) -> bool {
        self.is_existing_cloud_application
    }

    /// Mark this recommendation as a redeployment of an existing application
    pub fn set_existing_cloud_application(&mut self, existing: bool) {
        self.is_existing_cloud_application = existing;
    }
}
