// src/recipe/definition.rs

//! Recipe definitions
//!
//! A recipe is a named, versioned deployment strategy template, expressed
//! as a tree of configurable option settings grouped into categories.

use super::graph::DependencyGraph;
use crate::config::EngineConfig;
use super::option::{OptionSettingItem, ValidatorConfig};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;
use tracing::debug;

/// A complete recipe as loaded from a recipe document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RecipeDefinition {
    pub id: String,

    #[serde(default)]
    pub version: String,

    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub short_description: String,

    #[serde(default)]
    pub target_service: String,

    pub deployment_type: DeploymentType,

    #[serde(default, rename = "DeploymentBundle")]
    pub deployment_bundle: DeploymentBundleType,

    /// Template the infrastructure project is generated from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cdk_project_template: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cdk_project_template_id: Option<String>,

    /// Set on recipes snapshotted into a deployment project
    #[serde(default)]
    pub persisted_deployment_project: bool,

    /// Recipe a persisted recipe was snapshotted from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_recipe_id: Option<String>,

    #[serde(default)]
    pub recipe_priority: i32,

    /// Scored by the recommendation engine; opaque here
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recommendation_rules: Vec<Value>,

    #[serde(default)]
    pub categories: Vec<Category>,

    #[serde(default)]
    pub option_settings: Vec<OptionSettingItem>,

    /// Cross-setting validators
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validators: Vec<ValidatorConfig>,

    /// Where the recipe was loaded from, when it came from disk
    #[serde(skip)]
    pub recipe_path: Option<PathBuf>,

    #[serde(skip)]
    pub(crate) dependency_graph: DependencyGraph,
}

impl RecipeDefinition {
    /// Top-level settings in declaration order
    pub fn option_settings(&self) -> &[OptionSettingItem] {
        &self.option_settings
    }

    /// `DependsOn` relationships between settings, keyed by fully qualified id
    pub fn dependency_graph(&self) -> &DependencyGraph {
        &self.dependency_graph
    }

    /// Walk a dot-separated path down the settings tree
    ///
    /// Descent stops at the first KeyValue item, which is returned no matter
    /// how many segments remain; those segments address keys of its map.
    pub fn find_option_setting(&self, path: &str) -> Option<&OptionSettingItem> {
        if path.trim().is_empty() {
            return None;
        }

        let mut siblings = self.option_settings.as_slice();
        let mut current: Option<&OptionSettingItem> = None;

        for segment in path.split('.') {
            if current.is_some_and(|item| item.is_key_value()) {
                break;
            }
            let item = siblings.iter().find(|item| item.id == segment)?;
            siblings = item.child_option_settings.as_slice();
            current = Some(item);
        }

        current
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    /// Categories sorted by display order
    pub fn ordered_categories(&self) -> Vec<&Category> {
        let mut categories: Vec<&Category> = self.categories.iter().collect();
        categories.sort_by_key(|c| c.order);
        categories
    }

    /// Assign fully qualified ids and rebuild the dependency graph
    pub(crate) fn finalize(&mut self) {
        for item in self.option_settings.iter_mut() {
            item.assign_paths(None);
        }

        let mut graph = DependencyGraph::new();
        let mut stack: Vec<&OptionSettingItem> = self.option_settings.iter().collect();
        while let Some(item) = stack.pop() {
            // an object's value is made of its children
            let deps: Vec<&str> = item
                .depends_on
                .iter()
                .map(|d| d.id.as_str())
                .chain(
                    item.child_option_settings
                        .iter()
                        .map(|c| c.fully_qualified_id()),
                )
                .collect();
            graph.add_setting(item.fully_qualified_id(), &deps);
            stack.extend(item.child_option_settings.iter());
        }
        debug!(
            "Built dependency graph for recipe {} with {} settings",
            self.id,
            graph.setting_count()
        );
        self.dependency_graph = graph;
    }

    /// Snapshot this recipe into a persisted deployment-project recipe
    ///
    /// The copy gets a fresh id, points back at this recipe through
    /// `BaseRecipeId`, drops its project template, takes the given display
    /// name and the configured persisted-recipe priority.
    pub fn snapshot_for_deployment_project(
        &self,
        name: &str,
        config: &EngineConfig,
    ) -> RecipeDefinition {
        let mut snapshot = self.clone();
        snapshot.id = uuid::Uuid::new_v4().to_string();
        snapshot.name = name.to_string();
        snapshot.cdk_project_template = None;
        snapshot.cdk_project_template_id = None;
        snapshot.persisted_deployment_project = true;
        snapshot.base_recipe_id = Some(self.id.clone());
        snapshot.recipe_priority = config.persisted_recipe_priority;
        snapshot.recipe_path = None;
        snapshot
    }
}

impl fmt::Display for RecipeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// Display grouping for option settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Category {
    pub id: String,
    #[serde(default)]
    pub display_name: String,
    /// Unique within a recipe
    pub order: i32,
}

/// How the recipe deploys the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeploymentType {
    /// A generated infrastructure-as-code project
    CdkProject,
    /// An existing Elastic Beanstalk environment
    BeanstalkEnvironment,
}

/// What gets built from the project before deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DeploymentBundleType {
    #[default]
    #[serde(rename = "None")]
    NoBundle,
    Container,
    DotnetPublishZipFile,
}
