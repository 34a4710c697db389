// src/recipe/option.rs

//! Option setting items
//!
//! An option setting item describes one configurable value of a recipe.
//! Items form a tree through `ChildOptionSettings`; an item's full identity
//! is the dot-joined path of ids from the recipe root, which the parser
//! assigns once when the recipe is loaded.

use super::value::ValueType;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A configurable value within a recipe
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OptionSettingItem {
    /// Unique among siblings only
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_setting_id: Option<String>,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Category id this setting is grouped under
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(rename = "Type")]
    pub value_type: ValueType,

    /// Identifies an external interactive resolver for this setting
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_hint: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub type_hint_data: BTreeMap<String, Value>,

    /// Default value; string leaves may contain replacement tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,

    #[serde(default)]
    pub advanced_setting: bool,

    /// Whether the setting may change when redeploying an existing application
    #[serde(default)]
    pub updatable: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validators: Vec<ValidatorConfig>,

    /// Closed set of settable values; empty means unrestricted
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_values: Vec<String>,

    /// Display label to underlying value
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub value_mapping: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<Dependency>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub child_option_settings: Vec<OptionSettingItem>,

    #[serde(skip)]
    pub(crate) fully_qualified_id: String,
}

impl OptionSettingItem {
    /// Dot-joined path from the recipe root
    ///
    /// Falls back to the bare id for items that did not come through the
    /// parser.
    pub fn fully_qualified_id(&self) -> &str {
        if self.fully_qualified_id.is_empty() {
            &self.id
        } else {
            &self.fully_qualified_id
        }
    }

    /// KeyValue items terminate path resolution
    pub fn is_key_value(&self) -> bool {
        self.value_type == ValueType::KeyValue
    }

    pub fn is_object(&self) -> bool {
        self.value_type == ValueType::Object
    }

    /// Direct child by id
    pub fn child(&self, id: &str) -> Option<&OptionSettingItem> {
        self.child_option_settings.iter().find(|c| c.id == id)
    }

    /// Whether `value` is settable under `AllowedValues`
    pub fn is_allowed_value(&self, value: &str) -> bool {
        self.allowed_values.is_empty() || self.allowed_values.iter().any(|v| v == value)
    }

    /// Assign fully qualified ids to this item and all of its descendants
    pub(crate) fn assign_paths(&mut self, parent_path: Option<&str>) {
        let mut stack: Vec<(&mut OptionSettingItem, Option<String>)> =
            vec![(self, parent_path.map(str::to_string))];

        while let Some((item, parent)) = stack.pop() {
            item.fully_qualified_id = match &parent {
                Some(p) => format!("{}.{}", p, item.id),
                None => item.id.clone(),
            };
            let own = item.fully_qualified_id.clone();
            for child in item.child_option_settings.iter_mut() {
                stack.push((child, Some(own.clone())));
            }
        }
    }
}

/// Condition under which a setting is displayable
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Dependency {
    /// Fully qualified id of the setting this condition reads
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<DependencyOperation>,

    /// Expected value for `Equals`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl Dependency {
    /// Operation, defaulting to `Equals` when unset
    pub fn operation(&self) -> DependencyOperation {
        self.operation.unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DependencyOperation {
    #[default]
    Equals,
    NotEmpty,
}

/// A validator declared on a setting or recipe
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ValidatorConfig {
    /// Validator name, e.g. `Range` or `Regex`
    pub validator_type: String,

    /// Validator-specific configuration object
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration: Option<Value>,
}
