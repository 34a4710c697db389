// src/validation/factory.rs

//! Validator construction from recipe declarations

use super::builtin::{
    ComparisonValidator, DockerBuildArgsValidator, DotnetPublishArgsValidator,
    MinMaxConstraintValidator, RangeValidator, RegexValidator, RequiredValidator,
    StringLengthValidator, from_config,
};
use super::{OptionSettingValidator, RecipeValidator, ValidatorFactory};
use crate::error::Result;
use crate::recipe::{OptionSettingItem, RecipeDefinition};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// Builds an option setting validator from its `Configuration`
pub type OptionValidatorConstructor =
    Arc<dyn Fn(Option<&Value>) -> Result<Arc<dyn OptionSettingValidator>> + Send + Sync>;

/// Builds a recipe validator from its `Configuration`
pub type RecipeValidatorConstructor =
    Arc<dyn Fn(Option<&Value>) -> Result<Arc<dyn RecipeValidator>> + Send + Sync>;

/// Validator factory driven by a name-to-constructor registry
///
/// The built-in validators are registered by [`ConfiguredValidatorFactory::new`].
/// Validators that need live data (existing VPCs, instance types, ...) are
/// registered by the caller. Declarations naming an unregistered validator
/// are skipped with a warning.
#[derive(Clone)]
pub struct ConfiguredValidatorFactory {
    option_validators: HashMap<String, OptionValidatorConstructor>,
    recipe_validators: HashMap<String, RecipeValidatorConstructor>,
}

impl Default for ConfiguredValidatorFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfiguredValidatorFactory {
    /// Factory with the built-in validators registered
    pub fn new() -> Self {
        let mut factory = Self::empty();

        factory.register_option_validator("Required", |config| {
            let v: RequiredValidator = from_config("Required", config)?;
            Ok(Arc::new(v) as Arc<dyn OptionSettingValidator>)
        });
        factory.register_option_validator("Range", |config| {
            let v: RangeValidator = from_config("Range", config)?;
            Ok(Arc::new(v) as Arc<dyn OptionSettingValidator>)
        });
        factory.register_option_validator("Regex", |config| {
            Ok(Arc::new(RegexValidator::from_config(config)?) as Arc<dyn OptionSettingValidator>)
        });
        factory.register_option_validator("StringLength", |config| {
            let v: StringLengthValidator = from_config("StringLength", config)?;
            Ok(Arc::new(v) as Arc<dyn OptionSettingValidator>)
        });
        factory.register_option_validator("Comparison", |config| {
            Ok(Arc::new(ComparisonValidator::from_config(config)?)
                as Arc<dyn OptionSettingValidator>)
        });
        factory.register_option_validator("DockerBuildArgs", |_| {
            Ok(Arc::new(DockerBuildArgsValidator) as Arc<dyn OptionSettingValidator>)
        });
        factory.register_option_validator("DotnetPublishArgs", |_| {
            Ok(Arc::new(DotnetPublishArgsValidator) as Arc<dyn OptionSettingValidator>)
        });
        factory.register_recipe_validator("MinMaxConstraint", |config| {
            let v: MinMaxConstraintValidator = from_config("MinMaxConstraint", config)?;
            Ok(Arc::new(v) as Arc<dyn RecipeValidator>)
        });

        factory
    }

    /// Factory with nothing registered
    pub fn empty() -> Self {
        Self {
            option_validators: HashMap::new(),
            recipe_validators: HashMap::new(),
        }
    }

    /// Register (or replace) an option setting validator type
    pub fn register_option_validator<F>(&mut self, name: &str, constructor: F)
    where
        F: Fn(Option<&Value>) -> Result<Arc<dyn OptionSettingValidator>> + Send + Sync + 'static,
    {
        self.option_validators
            .insert(name.to_string(), Arc::new(constructor));
    }

    /// Register (or replace) a recipe validator type
    pub fn register_recipe_validator<F>(&mut self, name: &str, constructor: F)
    where
        F: Fn(Option<&Value>) -> Result<Arc<dyn RecipeValidator>> + Send + Sync + 'static,
    {
        self.recipe_validators
            .insert(name.to_string(), Arc::new(constructor));
    }

    pub fn has_option_validator(&self, name: &str) -> bool {
        self.option_validators.contains_key(name)
    }

    pub fn has_recipe_validator(&self, name: &str) -> bool {
        self.recipe_validators.contains_key(name)
    }
}

impl ValidatorFactory for ConfiguredValidatorFactory {
    fn build_validators(
        &self,
        item: &OptionSettingItem,
    ) -> Result<Vec<Arc<dyn OptionSettingValidator>>> {
        let mut validators = Vec::with_capacity(item.validators.len());
        for declared in &item.validators {
            match self.option_validators.get(&declared.validator_type) {
                Some(constructor) => validators.push(constructor(declared.configuration.as_ref())?),
                None => warn!(
                    "No validator registered for type {} on option setting {}, skipping",
                    declared.validator_type,
                    item.fully_qualified_id()
                ),
            }
        }
        Ok(validators)
    }

    fn build_recipe_validators(
        &self,
        recipe: &RecipeDefinition,
    ) -> Result<Vec<Arc<dyn RecipeValidator>>> {
        let mut validators = Vec::with_capacity(recipe.validators.len());
        for declared in &recipe.validators {
            match self.recipe_validators.get(&declared.validator_type) {
                Some(constructor) => validators.push(constructor(declared.configuration.as_ref())?),
                None => warn!(
                    "No recipe validator registered for type {} on recipe {}, skipping",
                    declared.validator_type, recipe.id
                ),
            }
        }
        Ok(validators)
    }
}
