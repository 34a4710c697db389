// src/resolver/modified.rs

//! Change detection against recipe defaults

use super::OptionSettingHandler;
use crate::error::Result;
use crate::recipe::{OptionSettingItem, SettingValue, ValueType};
use crate::recommendation::Recommendation;
use std::collections::{BTreeMap, BTreeSet};

impl OptionSettingHandler {
    /// Whether the current value of `item` differs from its default
    ///
    /// Hidden settings are never modified. Lists compare as sets, key-value
    /// maps as maps, and an empty string equals an absent string. Object
    /// settings are modified when any descendant is.
    pub fn is_option_setting_modified(
        &self,
        recommendation: &Recommendation,
        item: &OptionSettingItem,
    ) -> Result<bool> {
        if !self.is_option_setting_displayable(recommendation, item)? {
            return Ok(false);
        }

        if item.is_object() {
            for child in &item.child_option_settings {
                if self.is_option_setting_modified(recommendation, child)? {
                    return Ok(true);
                }
            }
            return Ok(false);
        }

        let current = self.get_option_setting_value(recommendation, item)?;
        let default = self.get_option_setting_default_value(recommendation, item)?;

        let modified = match item.value_type {
            ValueType::List => {
                let current = as_set(current.as_ref());
                let default = as_set(default.as_ref());
                current.len() != default.len() || current.iter().any(|m| !default.contains(m))
            }
            ValueType::KeyValue => {
                let current = as_map(current.as_ref());
                let default = as_map(default.as_ref());
                current.len() != default.len()
                    || current.iter().any(|(k, v)| default.get(k) != Some(v))
            }
            ValueType::String => normalize_string(current) != normalize_string(default),
            ValueType::Int | ValueType::Double | ValueType::Bool | ValueType::Object => {
                current != default
            }
        };

        Ok(modified)
    }
}

fn as_set(value: Option<&SettingValue>) -> BTreeSet<String> {
    value
        .and_then(SettingValue::as_list)
        .cloned()
        .unwrap_or_default()
}

fn as_map(value: Option<&SettingValue>) -> BTreeMap<String, String> {
    value
        .and_then(SettingValue::as_key_value)
        .cloned()
        .unwrap_or_default()
}

fn normalize_string(value: Option<SettingValue>) -> Option<SettingValue> {
    value.filter(|v| !matches!(v, SettingValue::String(s) if s.is_empty()))
}

#[cfg(test)]
mod tests {
    use crate::recipe::{SettingValue, parse_recipe_value};
    use crate::recommendation::{ProjectDefinition, Recommendation};
    use crate::resolver::OptionSettingHandler;
    use serde_json::json;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn recommendation() -> Recommendation {
        let recipe = parse_recipe_value(json!({
            "Id": "Beanstalk",
            "Name": "Beanstalk",
            "DeploymentType": "CdkProject",
            "OptionSettings": [
                {"Id": "Subnets", "Type": "List", "DefaultValue": ["subnet-a", "subnet-b"]},
                {"Id": "Tags", "Type": "KeyValue", "DefaultValue": {"team": "web"}},
                {"Id": "KeyPair", "Type": "String"},
                {"Id": "Count", "Type": "Int", "DefaultValue": 2},
                {"Id": "Hidden", "Type": "Int", "DefaultValue": 1,
                 "DependsOn": [{"Id": "Count", "Value": 100}]},
                {"Id": "Vpc", "Type": "Object", "ChildOptionSettings": [
                    {"Id": "VpcId", "Type": "String", "DefaultValue": "vpc-default"}
                ]}
            ]
        }))
        .unwrap();
        Recommendation::new(Arc::new(recipe), ProjectDefinition::new("/p/App.csproj"), 0)
    }

    fn modified(rec: &Recommendation, path: &str) -> bool {
        let handler = OptionSettingHandler::default();
        let item = handler.get_option_setting(rec, path).unwrap();
        handler.is_option_setting_modified(rec, item).unwrap()
    }

    #[test]
    fn test_nothing_modified_initially() {
        let rec = recommendation();
        for path in ["Subnets", "Tags", "KeyPair", "Count", "Hidden", "Vpc"] {
            assert!(!modified(&rec, path), "{path} reported modified");
        }
    }

    #[test]
    fn test_list_order_is_irrelevant() {
        let mut rec = recommendation();
        rec.set_override(
            "Subnets",
            Some(SettingValue::List(
                ["subnet-b", "subnet-a"].iter().map(|s| s.to_string()).collect(),
            )),
        );
        assert!(!modified(&rec, "Subnets"));

        rec.set_override(
            "Subnets",
            Some(SettingValue::List(["subnet-a"].iter().map(|s| s.to_string()).collect())),
        );
        assert!(modified(&rec, "Subnets"));
    }

    #[test]
    fn test_key_value_compares_entries() {
        let mut rec = recommendation();
        let mut tags = BTreeMap::new();
        tags.insert("team".to_string(), "api".to_string());
        rec.set_override("Tags", Some(SettingValue::KeyValue(tags)));
        assert!(modified(&rec, "Tags"));
    }

    #[test]
    fn test_empty_string_equals_absent() {
        let mut rec = recommendation();
        rec.set_override("KeyPair", Some(SettingValue::String(String::new())));
        assert!(!modified(&rec, "KeyPair"));
        rec.set_override("KeyPair", Some(SettingValue::String("my-key".into())));
        assert!(modified(&rec, "KeyPair"));
    }

    #[test]
    fn test_hidden_setting_never_modified() {
        let mut rec = recommendation();
        rec.set_override("Hidden", Some(SettingValue::Int(7)));
        assert!(!modified(&rec, "Hidden"));
        rec.set_override("Count", Some(SettingValue::Int(100)));
        assert!(modified(&rec, "Hidden"));
    }

    #[test]
    fn test_object_modified_through_child() {
        let mut rec = recommendation();
        rec.set_override("Vpc.VpcId", Some(SettingValue::String("vpc-other".into())));
        assert!(modified(&rec, "Vpc"));
    }
}
