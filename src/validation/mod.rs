// src/validation/mod.rs

//! Option setting and recipe validators
//!
//! Validators come in two flavors:
//!
//! - [`OptionSettingValidator`] checks the value of a single setting
//! - [`RecipeValidator`] checks constraints spanning several settings
//!
//! Both are built per setting (or per recipe) by a [`ValidatorFactory`]
//! from the `Validators` declared in the recipe document. Validators may
//! call out to external services, so both traits are async; they must not
//! mutate shared state since the resolver runs them concurrently.

mod builtin;
mod factory;

pub use builtin::{
    ComparisonValidator, DockerBuildArgsValidator, DotnetPublishArgsValidator,
    MinMaxConstraintValidator, RangeValidator, RegexValidator, RequiredValidator,
    StringLengthValidator,
};
pub use factory::{
    ConfiguredValidatorFactory, OptionValidatorConstructor, RecipeValidatorConstructor,
};

use crate::error::Result;
use crate::recipe::{OptionSettingItem, RecipeDefinition, SettingValue};
use crate::recommendation::Recommendation;
use crate::resolver::OptionSettingHandler;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Outcome of a single validator run
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub message: Option<String>,
    /// The rejected value, when invalid
    pub invalid_value: Option<SettingValue>,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            message: None,
            invalid_value: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            message: Some(message.into()),
            invalid_value: None,
        }
    }

    /// Attach the value that failed validation
    pub fn with_invalid_value(mut self, value: Option<SettingValue>) -> Self {
        self.invalid_value = value;
        self
    }

    /// Failure message, or an empty string for a valid result
    pub fn message(&self) -> &str {
        self.message.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationStatus {
    #[default]
    Valid,
    Invalid,
}

/// Last validation outcome of a setting, kept on the recommendation
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValidationState {
    pub status: ValidationStatus,
    pub message: Option<String>,
    pub invalid_value: Option<SettingValue>,
}

impl ValidationState {
    pub fn is_valid(&self) -> bool {
        self.status == ValidationStatus::Valid
    }

    pub(crate) fn invalid(message: String, invalid_value: Option<SettingValue>) -> Self {
        Self {
            status: ValidationStatus::Invalid,
            message: Some(message),
            invalid_value,
        }
    }
}

/// Deployment context handed to recipe validators
#[derive(Debug, Clone, Default)]
pub struct ValidationContext {
    pub aws_profile: Option<String>,
    pub aws_region: Option<String>,
    /// Additional context supplied by the caller
    pub properties: BTreeMap<String, String>,
}

/// What an option setting validator gets to look at besides the value
pub struct OptionValidationContext<'a> {
    pub recommendation: &'a Recommendation,
    pub item: &'a OptionSettingItem,
    pub handler: &'a OptionSettingHandler,
}

/// Validates the value of a single option setting
#[async_trait]
pub trait OptionSettingValidator: Send + Sync {
    /// Validator type name as written in recipe documents
    fn name(&self) -> &str;

    async fn validate(
        &self,
        value: Option<&SettingValue>,
        context: &OptionValidationContext<'_>,
    ) -> ValidationResult;
}

/// Validates constraints across the settings of a recommendation
#[async_trait]
pub trait RecipeValidator: Send + Sync {
    fn name(&self) -> &str;

    async fn validate(
        &self,
        recommendation: &Recommendation,
        handler: &OptionSettingHandler,
        context: &ValidationContext,
    ) -> ValidationResult;
}

/// Supplies the validators that apply to a setting or a recipe
pub trait ValidatorFactory: Send + Sync {
    /// Validators for one option setting, in declaration order
    fn build_validators(
        &self,
        item: &OptionSettingItem,
    ) -> Result<Vec<Arc<dyn OptionSettingValidator>>>;

    /// Cross-setting validators for a recipe
    fn build_recipe_validators(
        &self,
        recipe: &RecipeDefinition,
    ) -> Result<Vec<Arc<dyn RecipeValidator>>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_constructors() {
        let ok = ValidationResult::valid();
        assert!(ok.is_valid);
        assert_eq!(ok.message(), "");

        let failed = ValidationResult::failed("bad value")
            .with_invalid_value(Some(SettingValue::Int(7)));
        assert!(!failed.is_valid);
        assert_eq!(failed.message(), "bad value");
        assert_eq!(failed.invalid_value, Some(SettingValue::Int(7)));
    }

    #[test]
    fn test_default_state_is_valid() {
        let state = ValidationState::default();
        assert!(state.is_valid());
        assert!(state.message.is_none());

        let state = ValidationState::invalid("nope".into(), None);
        assert!(!state.is_valid());
    }
}
