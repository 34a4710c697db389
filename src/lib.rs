// src/lib.rs

//! Recipe Resolver
//!
//! Deployment recipe catalog and option-setting resolution engine.
//!
//! # Architecture
//!
//! - Recipes: immutable trees of typed option settings, loaded from JSON
//!   recipe documents with their dependency graph built once at load
//! - Recommendations: a recipe bound to a project, carrying overrides,
//!   replacement tokens and validation state in side maps
//! - Resolver: every read and write of a setting goes through
//!   `OptionSettingHandler` (path lookup, displayability, validation,
//!   change detection, deployment-bundle write-through)
//! - Settings documents: saved configurations replayed onto a recommendation
//! - Locator: discovery of custom recipes next to a project

pub mod bundle;
pub mod config;
mod error;
pub mod locator;
pub mod recipe;
pub mod recommendation;
pub mod resolver;
pub mod settings;
pub mod validation;

pub use bundle::DeploymentBundle;
pub use config::EngineConfig;
pub use error::{Error, Result};
pub use locator::{CustomRecipeLocator, DeploymentManifestFile, DeploymentManifestSource};
pub use recipe::{
    parse_recipe, parse_recipe_file, parse_recipe_value, validate_recipe, Category,
    Dependency, DependencyOperation, DeploymentBundleType, DeploymentType, OptionSettingItem,
    RecipeDefinition, SettingValue, ValueType,
};
pub use recommendation::{ProjectDefinition, Recommendation};
pub use resolver::{OptionSettingHandler, OptionSettingsType};
pub use settings::{DeploymentSettings, DeploymentSettingsHandler, SaveSettingsType, SettingsMetadata};
pub use validation::{
    ConfiguredValidatorFactory, ValidationContext, ValidationResult, ValidationState,
    ValidatorFactory,
};
