// src/resolver/mod.rs

//! Option setting resolution
//!
//! [`OptionSettingHandler`] mediates every read and write against the option
//! settings of a [`Recommendation`]: path lookup, value get/set with
//! override-over-default precedence, displayability, validation and change
//! detection. It holds no per-recommendation state, so one handler can
//! serve any number of recommendations.
//!
//! Setting references handed to the write operations must not borrow from
//! the recommendation being written. Clone the recipe `Arc` first:
//!
//! ```ignore
//! let recipe = Arc::clone(recommendation.recipe());
//! let item = handler.get_option_setting_from_recipe(&recipe, "EnvironmentType")?;
//! handler.set_option_setting_value(&mut recommendation, item, "LoadBalanced", false).await?;
//! ```

mod display;
mod map;
mod modified;
mod validate;

pub use map::OptionSettingsType;

use crate::error::{Error, Result};
use crate::recipe::{FromSettingValue, OptionSettingItem, RecipeDefinition, SettingValue};
use crate::recommendation::Recommendation;
use crate::validation::{
    ConfiguredValidatorFactory, OptionValidationContext, ValidationResult, ValidationState,
    ValidatorFactory,
};
use futures::future::join_all;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Stateless resolver over recommendation option settings
#[derive(Clone)]
pub struct OptionSettingHandler {
    validator_factory: Arc<dyn ValidatorFactory>,
}

impl Default for OptionSettingHandler {
    fn default() -> Self {
        Self::new(Arc::new(ConfiguredValidatorFactory::new()))
    }
}

impl OptionSettingHandler {
    pub fn new(validator_factory: Arc<dyn ValidatorFactory>) -> Self {
        Self { validator_factory }
    }

    pub fn validator_factory(&self) -> &Arc<dyn ValidatorFactory> {
        &self.validator_factory
    }

    /// Resolve a dot-separated path against the recommendation's recipe
    ///
    /// Descent stops at the first KeyValue setting; any remaining segments
    /// name a key inside its map.
    pub fn get_option_setting<'r>(
        &self,
        recommendation: &'r Recommendation,
        path: &str,
    ) -> Result<&'r OptionSettingItem> {
        self.get_option_setting_from_recipe(recommendation.recipe(), path)
    }

    /// Resolve a path against a bare recipe
    pub fn get_option_setting_from_recipe<'r>(
        &self,
        recipe: &'r RecipeDefinition,
        path: &str,
    ) -> Result<&'r OptionSettingItem> {
        recipe
            .find_option_setting(path)
            .ok_or_else(|| Error::SettingNotFound {
                recipe: recipe.name.clone(),
                path: path.to_string(),
            })
    }

    /// Effective value: override, else token-substituted default
    ///
    /// Object settings materialize as a map of their displayable children.
    pub fn get_option_setting_value(
        &self,
        recommendation: &Recommendation,
        item: &OptionSettingItem,
    ) -> Result<Option<SettingValue>> {
        if item.is_object() {
            let mut children = BTreeMap::new();
            for child in &item.child_option_settings {
                if !self.is_option_setting_displayable(recommendation, child)? {
                    continue;
                }
                if let Some(value) = self.get_option_setting_value(recommendation, child)? {
                    children.insert(child.id.clone(), value);
                }
            }
            return Ok(Some(SettingValue::Object(children)));
        }

        if let Some(value) = recommendation.override_value(item.fully_qualified_id()) {
            return Ok(Some(value.clone()));
        }

        self.get_option_setting_default_value(recommendation, item)
    }

    /// Effective value extracted as `T`; `None` when absent or of another shape
    pub fn get_option_setting_value_as<T: FromSettingValue>(
        &self,
        recommendation: &Recommendation,
        item: &OptionSettingItem,
    ) -> Result<Option<T>> {
        Ok(self
            .get_option_setting_value(recommendation, item)?
            .as_ref()
            .and_then(T::from_setting_value))
    }

    /// Default value with value mapping and replacement tokens applied
    pub fn get_option_setting_default_value(
        &self,
        recommendation: &Recommendation,
        item: &OptionSettingItem,
    ) -> Result<Option<SettingValue>> {
        if item.is_object() {
            let mut children = BTreeMap::new();
            for child in &item.child_option_settings {
                if let Some(value) = self.get_option_setting_default_value(recommendation, child)? {
                    children.insert(child.id.clone(), value);
                }
            }
            return Ok(Some(SettingValue::Object(children)));
        }

        let Some(default) = item.default_value.as_ref().filter(|v| !v.is_null()) else {
            return Ok(None);
        };

        let mapped = match default {
            Value::String(label) => item
                .value_mapping
                .get(label)
                .map(|underlying| Value::String(underlying.clone()))
                .unwrap_or_else(|| default.clone()),
            other => other.clone(),
        };
        let substituted = substitute_tokens(recommendation, mapped);

        SettingValue::from_json(item.value_type, &substituted)
            .map(Some)
            .map_err(|reason| invalid_value(item, reason))
    }

    /// Write a value and keep dependent state in sync
    ///
    /// Unless `skip_validation` is set, the setting's validators run first
    /// (only while it is displayable) and a failure aborts the write. After
    /// storing the override, settings depending on this one are re-validated
    /// and well-known build settings are mirrored onto the deployment bundle.
    /// Allowed values are enforced either way.
    pub async fn set_option_setting_value(
        &self,
        recommendation: &mut Recommendation,
        item: &OptionSettingItem,
        value: impl Into<Value>,
        skip_validation: bool,
    ) -> Result<()> {
        let value = value.into();

        if !item.is_object() {
            return self
                .set_leaf_value(recommendation, item, value, skip_validation)
                .await;
        }

        let mut assignments = Vec::new();
        let mut stack = vec![(item, value)];
        while let Some((current, value)) = stack.pop() {
            if !current.is_object() {
                assignments.push((current, value));
                continue;
            }
            match value {
                Value::Null => {
                    for child in current.child_option_settings.iter().rev() {
                        stack.push((child, Value::Null));
                    }
                }
                Value::Object(mut map) => {
                    if let Some(key) = map.keys().find(|key| current.child(key).is_none()) {
                        return Err(Error::SettingNotFound {
                            recipe: recommendation.recipe().name.clone(),
                            path: format!("{}.{}", current.fully_qualified_id(), key),
                        });
                    }
                    for child in current.child_option_settings.iter().rev() {
                        if let Some(child_value) = map.remove(&child.id) {
                            stack.push((child, child_value));
                        }
                    }
                }
                other => {
                    return Err(invalid_value(
                        current,
                        format!("expected an object, found {}", other),
                    ));
                }
            }
        }

        // Declaration order on a staged copy; committed only once every child is accepted
        let mut staged = recommendation.clone();
        for (child, value) in assignments {
            self.set_leaf_value(&mut staged, child, value, skip_validation)
                .await?;
        }
        *recommendation = staged;
        Ok(())
    }

    /// Resolve `path` and write to it
    ///
    /// A path that runs past a KeyValue setting writes a single key of its
    /// map; a `null` value removes that key.
    pub async fn set_option_setting_value_by_path(
        &self,
        recommendation: &mut Recommendation,
        path: &str,
        value: impl Into<Value>,
        skip_validation: bool,
    ) -> Result<()> {
        let recipe = Arc::clone(recommendation.recipe());
        let item = self.get_option_setting_from_recipe(&recipe, path)?;
        let value = value.into();

        let key = path
            .strip_prefix(item.fully_qualified_id())
            .and_then(|rest| rest.strip_prefix('.'))
            .filter(|key| item.is_key_value() && !key.is_empty());

        let Some(key) = key else {
            return self
                .set_option_setting_value(recommendation, item, value, skip_validation)
                .await;
        };

        let mut map = match self.get_option_setting_value(recommendation, item)? {
            Some(SettingValue::KeyValue(map)) => map,
            _ => BTreeMap::new(),
        };
        match value {
            Value::Null => {
                map.remove(key);
            }
            Value::String(s) => {
                map.insert(key.to_string(), s);
            }
            other => {
                map.insert(key.to_string(), other.to_string());
            }
        }

        self.set_option_setting_value(
            recommendation,
            item,
            SettingValue::KeyValue(map),
            skip_validation,
        )
        .await
    }

    async fn set_leaf_value(
        &self,
        recommendation: &mut Recommendation,
        item: &OptionSettingItem,
        value: Value,
        skip_validation: bool,
    ) -> Result<()> {
        let id = item.fully_qualified_id();
        let new_value = coerce_input(item, value)?;

        if !skip_validation && self.is_option_setting_displayable(recommendation, item)? {
            let failures = self
                .run_item_validators(recommendation, item, new_value.as_ref())
                .await?;
            if !failures.is_empty() {
                let message = join_messages(&failures);
                recommendation.set_validation_state(
                    id,
                    ValidationState::invalid(message.clone(), new_value),
                );
                return Err(Error::ValidationFailed(message));
            }
            recommendation.set_validation_state(id, ValidationState::default());
        }

        recommendation.set_override(id, new_value.clone());
        debug!("Set option setting {} of recipe {}", id, recommendation.recipe().id);

        if !skip_validation {
            let recipe = Arc::clone(recommendation.recipe());
            let dependent_ids = recipe.dependency_graph().transitive_dependents(id);
            let dependents: Vec<&OptionSettingItem> = dependent_ids
                .iter()
                .filter_map(|dependent| recipe.find_option_setting(dependent))
                .collect();
            if !dependents.is_empty() {
                self.run_option_setting_validators(recommendation, Some(dependents.as_slice()))
                    .await?;
            }
        }

        recommendation
            .deployment_bundle_mut()
            .apply_setting(id, new_value.as_ref());
        Ok(())
    }

    /// Run every validator of `item` against `value` concurrently; returns failures
    pub(crate) async fn run_item_validators(
        &self,
        recommendation: &Recommendation,
        item: &OptionSettingItem,
        value: Option<&SettingValue>,
    ) -> Result<Vec<ValidationResult>> {
        let validators = self.validator_factory.build_validators(item)?;
        if validators.is_empty() {
            return Ok(Vec::new());
        }

        let context = OptionValidationContext {
            recommendation,
            item,
            handler: self,
        };
        let results = join_all(validators.iter().map(|v| v.validate(value, &context))).await;

        Ok(results
            .into_iter()
            .filter(|result| !result.is_valid)
            .map(|result| result.with_invalid_value(value.cloned()))
            .collect())
    }
}

/// Newline-joined failure messages
pub(crate) fn join_messages(results: &[ValidationResult]) -> String {
    results
        .iter()
        .map(ValidationResult::message)
        .collect::<Vec<_>>()
        .join("\n")
}

fn invalid_value(item: &OptionSettingItem, reason: String) -> Error {
    Error::InvalidValue {
        path: item.fully_qualified_id().to_string(),
        expected: item.value_type.to_string(),
        reason,
    }
}

/// Convert an incoming value, enforcing `AllowedValues` and rejecting display labels
fn coerce_input(item: &OptionSettingItem, value: Value) -> Result<Option<SettingValue>> {
    if value.is_null() {
        return Ok(None);
    }

    if let Value::String(s) = &value {
        let is_label = item.value_mapping.contains_key(s)
            && !item.value_mapping.values().any(|underlying| underlying == s);
        if is_label && !item.allowed_values.iter().any(|allowed| allowed == s) {
            return Err(Error::ValidationFailed(format!(
                "'{}' is a display label of option setting {}, not a settable value",
                s,
                item.fully_qualified_id()
            )));
        }
    }

    let coerced = SettingValue::from_json(item.value_type, &value)
        .map_err(|reason| invalid_value(item, reason))?;

    if !item.allowed_values.is_empty() {
        let rejected: Vec<String> = match &coerced {
            SettingValue::List(members) => members
                .iter()
                .filter(|m| !item.is_allowed_value(m))
                .cloned()
                .collect(),
            scalar => {
                let text = scalar.to_string();
                if item.is_allowed_value(&text) {
                    Vec::new()
                } else {
                    vec![text]
                }
            }
        };
        if !rejected.is_empty() {
            return Err(Error::ValidationFailed(format!(
                "Invalid value '{}' for option setting {}. Valid values are: {}",
                rejected.join(", "),
                item.fully_qualified_id(),
                item.allowed_values.join(", ")
            )));
        }
    }

    Ok(Some(coerced))
}

/// Replace tokens in every string of a JSON value
fn substitute_tokens(recommendation: &Recommendation, value: Value) -> Value {
    match value {
        Value::String(s) => Value::String(recommendation.apply_replacement_tokens(&s)),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|v| substitute_tokens(recommendation, v))
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, substitute_tokens(recommendation, v)))
                .collect(),
        ),
        other => other,
    }
}
