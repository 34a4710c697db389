// src/validation/builtin.rs

//! Validators that ship with the engine
//!
//! Each validator is configured from the `Configuration` object of its
//! recipe declaration. Failure messages may contain `{{Token}}`
//! placeholders that are filled in from the configuration.

use super::{
    OptionSettingValidator, OptionValidationContext, RecipeValidator, ValidationContext,
    ValidationResult,
};
use crate::error::{Error, Result};
use crate::recipe::SettingValue;
use crate::recommendation::Recommendation;
use crate::resolver::OptionSettingHandler;
use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Deserialize a validator configuration, falling back to defaults when absent
pub(crate) fn from_config<T: DeserializeOwned + Default>(
    name: &str,
    config: Option<&Value>,
) -> Result<T> {
    match config {
        None | Some(Value::Null) => Ok(T::default()),
        Some(value) => serde_json::from_value(value.clone()).map_err(|e| {
            Error::InvalidRecipe(format!("Invalid configuration for validator {}: {}", name, e))
        }),
    }
}

/// Text form of a value as validators see it; absent values are empty
fn text(value: Option<&SettingValue>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Rejects empty values and empty lists
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct RequiredValidator {
    pub validation_failed_message: String,
}

impl Default for RequiredValidator {
    fn default() -> Self {
        Self {
            validation_failed_message:
                "The option setting '{{OptionSetting}}' can not be empty. Please select a valid value."
                    .to_string(),
        }
    }
}

#[async_trait]
impl OptionSettingValidator for RequiredValidator {
    fn name(&self) -> &str {
        "Required"
    }

    async fn validate(
        &self,
        value: Option<&SettingValue>,
        context: &OptionValidationContext<'_>,
    ) -> ValidationResult {
        let present = match value {
            Some(SettingValue::List(items)) => !items.is_empty(),
            other => !text(other).is_empty(),
        };
        if present {
            ValidationResult::valid()
        } else {
            ValidationResult::failed(
                self.validation_failed_message
                    .replace("{{OptionSetting}}", &context.item.name),
            )
        }
    }
}

/// Integer range check
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct RangeValidator {
    pub min: i64,
    pub max: i64,
    pub validation_failed_message: String,
    pub allow_empty_string: bool,
}

impl Default for RangeValidator {
    fn default() -> Self {
        Self {
            min: i64::from(i32::MIN),
            max: i64::from(i32::MAX),
            validation_failed_message:
                "Value must be greater than or equal to {{Min}} and less than or equal to {{Max}}"
                    .to_string(),
            allow_empty_string: false,
        }
    }
}

#[async_trait]
impl OptionSettingValidator for RangeValidator {
    fn name(&self) -> &str {
        "Range"
    }

    async fn validate(
        &self,
        value: Option<&SettingValue>,
        _context: &OptionValidationContext<'_>,
    ) -> ValidationResult {
        let input = text(value);
        if self.allow_empty_string && input.is_empty() {
            return ValidationResult::valid();
        }

        match input.trim().parse::<i64>() {
            Ok(n) if n >= self.min && n <= self.max => ValidationResult::valid(),
            _ => ValidationResult::failed(
                self.validation_failed_message
                    .replace("{{Min}}", &self.min.to_string())
                    .replace("{{Max}}", &self.max.to_string()),
            ),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct RegexConfig {
    regex: String,
    validation_failed_message: String,
    allow_empty_string: bool,
}

impl Default for RegexConfig {
    fn default() -> Self {
        Self {
            regex: "(.*)".to_string(),
            validation_failed_message: "Value must match Regex {{Regex}}".to_string(),
            allow_empty_string: false,
        }
    }
}

/// Pattern match; list values must match member by member
#[derive(Debug, Clone)]
pub struct RegexValidator {
    pattern: regex::Regex,
    message: String,
    allow_empty_string: bool,
}

impl RegexValidator {
    pub fn from_config(config: Option<&Value>) -> Result<Self> {
        let config: RegexConfig = from_config("Regex", config)?;
        let pattern = regex::Regex::new(&config.regex).map_err(|e| {
            Error::InvalidRecipe(format!("Invalid regex '{}': {}", config.regex, e))
        })?;
        Ok(Self {
            message: config.validation_failed_message.replace("{{Regex}}", &config.regex),
            pattern,
            allow_empty_string: config.allow_empty_string,
        })
    }

    fn accepts(&self, input: &str) -> bool {
        self.pattern.is_match(input) || (self.allow_empty_string && input.is_empty())
    }
}

#[async_trait]
impl OptionSettingValidator for RegexValidator {
    fn name(&self) -> &str {
        "Regex"
    }

    async fn validate(
        &self,
        value: Option<&SettingValue>,
        _context: &OptionValidationContext<'_>,
    ) -> ValidationResult {
        let valid = match value {
            Some(SettingValue::List(items)) => items.iter().all(|item| self.accepts(item)),
            other => self.accepts(&text(other)),
        };
        if valid {
            ValidationResult::valid()
        } else {
            ValidationResult::failed(self.message.clone())
        }
    }
}

/// Character count bounds
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct StringLengthValidator {
    pub min_length: usize,
    pub max_length: usize,
    pub validation_failed_message: String,
}

impl Default for StringLengthValidator {
    fn default() -> Self {
        Self {
            min_length: 0,
            max_length: 1000,
            validation_failed_message:
                "Invalid value. Number of characters must be between {{min}} and {{max}}"
                    .to_string(),
        }
    }
}

#[async_trait]
impl OptionSettingValidator for StringLengthValidator {
    fn name(&self) -> &str {
        "StringLength"
    }

    async fn validate(
        &self,
        value: Option<&SettingValue>,
        _context: &OptionValidationContext<'_>,
    ) -> ValidationResult {
        let length = text(value).chars().count();
        if length < self.min_length || length > self.max_length {
            ValidationResult::failed(
                self.validation_failed_message
                    .replace("{{min}}", &self.min_length.to_string())
                    .replace("{{max}}", &self.max_length.to_string()),
            )
        } else {
            ValidationResult::valid()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum ComparisonOperation {
    GreaterThan,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct ComparisonConfig {
    operation: Option<ComparisonOperation>,
    setting_id: Option<String>,
}

/// Numeric comparison against another setting of the same recommendation
#[derive(Debug, Clone)]
pub struct ComparisonValidator {
    pub operation: ComparisonOperation,
    pub setting_id: String,
}

impl ComparisonValidator {
    pub fn from_config(config: Option<&Value>) -> Result<Self> {
        let config: ComparisonConfig = from_config("Comparison", config)?;
        let operation = config.operation.ok_or_else(|| {
            Error::InvalidRecipe(
                "The Comparison validator is missing the configuration property 'Operation'"
                    .to_string(),
            )
        })?;
        let setting_id = config
            .setting_id
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                Error::InvalidRecipe(
                    "The Comparison validator is missing the configuration property 'SettingId'"
                        .to_string(),
                )
            })?;
        Ok(Self {
            operation,
            setting_id,
        })
    }
}

#[async_trait]
impl OptionSettingValidator for ComparisonValidator {
    fn name(&self) -> &str {
        "Comparison"
    }

    async fn validate(
        &self,
        value: Option<&SettingValue>,
        context: &OptionValidationContext<'_>,
    ) -> ValidationResult {
        let item = context.item;
        let Ok(input) = text(value).trim().parse::<f64>() else {
            return ValidationResult::failed(format!(
                "The value of '{}' is not a numeric value.",
                item.name
            ));
        };

        let other = match context
            .handler
            .get_option_setting(context.recommendation, &self.setting_id)
        {
            Ok(other) => other,
            Err(e) => return ValidationResult::failed(e.to_string()),
        };
        let other_value = match context
            .handler
            .get_option_setting_value(context.recommendation, other)
        {
            Ok(v) => v,
            Err(e) => return ValidationResult::failed(e.to_string()),
        };
        let Ok(compared) = text(other_value.as_ref()).trim().parse::<f64>() else {
            return ValidationResult::failed(format!(
                "The value of '{}' is not a numeric value.",
                other.name
            ));
        };

        match self.operation {
            ComparisonOperation::GreaterThan if input > compared => ValidationResult::valid(),
            ComparisonOperation::GreaterThan => ValidationResult::failed(format!(
                "The value of '{}' must be greater than the value of '{}'.",
                item.name, other.name
            )),
        }
    }
}

/// Rejects docker build arguments the build pipeline sets itself
#[derive(Debug, Clone, Default)]
pub struct DockerBuildArgsValidator;

#[async_trait]
impl OptionSettingValidator for DockerBuildArgsValidator {
    fn name(&self) -> &str {
        "DockerBuildArgs"
    }

    async fn validate(
        &self,
        value: Option<&SettingValue>,
        _context: &OptionValidationContext<'_>,
    ) -> ValidationResult {
        let args = text(value);
        let mut problems = Vec::new();

        if args.contains("-t ") || args.contains("--tag ") {
            problems.push(
                "You must not include -t/--tag as an additional argument as it is used internally.",
            );
        }
        if args.contains("-f ") || args.contains("--file ") {
            problems.push(
                "You must not include -f/--file as an additional argument as it is used internally.",
            );
        }

        if problems.is_empty() {
            ValidationResult::valid()
        } else {
            ValidationResult::failed(format!(
                "Invalid value for additional Docker build options.\n{}",
                problems.join("\n")
            ))
        }
    }
}

/// Rejects publish arguments that conflict with dedicated settings
#[derive(Debug, Clone, Default)]
pub struct DotnetPublishArgsValidator;

#[async_trait]
impl OptionSettingValidator for DotnetPublishArgsValidator {
    fn name(&self) -> &str {
        "DotnetPublishArgs"
    }

    async fn validate(
        &self,
        value: Option<&SettingValue>,
        _context: &OptionValidationContext<'_>,
    ) -> ValidationResult {
        let args = text(value);
        let mut problems = Vec::new();

        if args.contains("-o ") || args.contains("--output ") {
            problems.push(
                "You must not include -o/--output as an additional argument as it is used internally.",
            );
        }
        if args.contains("-c ") || args.contains("--configuration ") {
            problems.push(
                "You must not include -c/--configuration as an additional argument. You can set the build configuration in the advanced settings.",
            );
        }
        if args.contains("--self-contained") || args.contains("--no-self-contained") {
            problems.push(
                "You must not include --self-contained/--no-self-contained as an additional argument. You can set the self-contained property in the advanced settings.",
            );
        }

        if problems.is_empty() {
            ValidationResult::valid()
        } else {
            ValidationResult::failed(format!(
                "Invalid value for Dotnet Publish Arguments.\n{}",
                problems.join("\n")
            ))
        }
    }
}

/// Requires one setting to be less than or equal to another
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct MinMaxConstraintValidator {
    pub min_value_option_settings_id: String,
    pub max_value_option_settings_id: String,
    pub validation_failed_message: String,
}

impl Default for MinMaxConstraintValidator {
    fn default() -> Self {
        Self {
            min_value_option_settings_id: String::new(),
            max_value_option_settings_id: String::new(),
            validation_failed_message: "The value specified for {{MinValueOptionSettingsId}} must be less than or equal to the value specified for {{MaxValueOptionSettingsId}}".to_string(),
        }
    }
}

impl MinMaxConstraintValidator {
    fn read(
        &self,
        recommendation: &Recommendation,
        handler: &OptionSettingHandler,
        path: &str,
    ) -> Option<f64> {
        let item = handler.get_option_setting(recommendation, path).ok()?;
        handler
            .get_option_setting_value_as::<f64>(recommendation, item)
            .ok()
            .flatten()
    }
}

#[async_trait]
impl RecipeValidator for MinMaxConstraintValidator {
    fn name(&self) -> &str {
        "MinMaxConstraint"
    }

    async fn validate(
        &self,
        recommendation: &Recommendation,
        handler: &OptionSettingHandler,
        _context: &ValidationContext,
    ) -> ValidationResult {
        let min = self.read(recommendation, handler, &self.min_value_option_settings_id);
        let max = self.read(recommendation, handler, &self.max_value_option_settings_id);

        let (Some(min), Some(max)) = (min, max) else {
            return ValidationResult::failed(format!(
                "Could not find a valid value for {} or {}. Please provide a valid value and try again.",
                self.min_value_option_settings_id, self.max_value_option_settings_id
            ));
        };

        if min <= max {
            ValidationResult::valid()
        } else {
            ValidationResult::failed(
                self.validation_failed_message
                    .replace("{{MinValueOptionSettingsId}}", &self.min_value_option_settings_id)
                    .replace("{{MaxValueOptionSettingsId}}", &self.max_value_option_settings_id),
            )
        }
    }
}
