// src/resolver/display.rs

//! Displayability of option settings
//!
//! A setting is displayable when every one of its `DependsOn` conditions
//! holds against the current values of the settings it names. The same
//! predicate gates validation, change detection and summaries.

use super::OptionSettingHandler;
use crate::error::Result;
use crate::recipe::{Dependency, DependencyOperation, OptionSettingItem, SettingValue};
use crate::recommendation::Recommendation;
use serde_json::Value;

impl OptionSettingHandler {
    /// Whether all dependencies of `item` are satisfied
    pub fn is_option_setting_displayable(
        &self,
        recommendation: &Recommendation,
        item: &OptionSettingItem,
    ) -> Result<bool> {
        for dependency in &item.depends_on {
            let target = self.get_option_setting(recommendation, &dependency.id)?;
            let value = self.get_option_setting_value(recommendation, target)?;
            if !is_satisfied(dependency, value.as_ref()) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Whether `item` belongs in the settings summary of a previous deployment
    pub fn is_summary_displayable(
        &self,
        recommendation: &Recommendation,
        item: &OptionSettingItem,
    ) -> Result<bool> {
        if !self.is_option_setting_displayable(recommendation, item)? {
            return Ok(false);
        }
        let value = self.get_option_setting_value(recommendation, item)?;
        Ok(value.is_some_and(|v| !v.to_string().is_empty()))
    }
}

fn is_satisfied(dependency: &Dependency, value: Option<&SettingValue>) -> bool {
    match (value, dependency.operation()) {
        (None, DependencyOperation::Equals) => dependency.value.is_none(),
        (None, DependencyOperation::NotEmpty) => false,
        (Some(value), DependencyOperation::Equals) => dependency
            .value
            .as_ref()
            .is_some_and(|expected| values_equal(value, expected)),
        (Some(value), DependencyOperation::NotEmpty) => !is_empty(value),
    }
}

fn values_equal(value: &SettingValue, expected: &Value) -> bool {
    let actual = value.to_json();
    match (&actual, expected) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => actual == *expected,
    }
}

/// Only lists, maps and strings can be empty; numbers and booleans never are
fn is_empty(value: &SettingValue) -> bool {
    match value {
        SettingValue::List(items) => items.is_empty(),
        SettingValue::KeyValue(map) => map.is_empty(),
        SettingValue::String(s) => s.trim().is_empty(),
        SettingValue::Int(_)
        | SettingValue::Double(_)
        | SettingValue::Bool(_)
        | SettingValue::Object(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::parse_recipe_value;
    use crate::recommendation::ProjectDefinition;
    use serde_json::json;
    use std::sync::Arc;

    fn recommendation() -> Recommendation {
        let recipe = parse_recipe_value(json!({
            "Id": "Beanstalk",
            "Name": "Beanstalk",
            "DeploymentType": "CdkProject",
            "OptionSettings": [
                {"Id": "InstanceCount", "Type": "Int", "DefaultValue": 0},
                {"Id": "KeyPair", "Type": "String", "DefaultValue": "   "},
                {"Id": "Tags", "Type": "KeyValue"},
                {"Id": "Subnets", "Type": "List", "DefaultValue": []},
                {"Id": "EnvironmentType", "Type": "String", "DefaultValue": "SingleInstance"},
                {"Id": "Ratio", "Type": "Double", "DefaultValue": 2},
                {"Id": "NeedsCount", "Type": "String",
                 "DependsOn": [{"Id": "InstanceCount", "Operation": "NotEmpty"}]},
                {"Id": "NeedsKeyPair", "Type": "String",
                 "DependsOn": [{"Id": "KeyPair", "Operation": "NotEmpty"}]},
                {"Id": "NeedsTags", "Type": "String",
                 "DependsOn": [{"Id": "Tags", "Operation": "NotEmpty"}]},
                {"Id": "NeedsSubnets", "Type": "String",
                 "DependsOn": [{"Id": "Subnets", "Operation": "NotEmpty"}]},
                {"Id": "LoadBalancerType", "Type": "String",
                 "DependsOn": [{"Id": "EnvironmentType", "Value": "LoadBalanced"}]},
                {"Id": "WithoutTags", "Type": "String",
                 "DependsOn": [{"Id": "Tags", "Value": null}]},
                {"Id": "BothConditions", "Type": "String",
                 "DependsOn": [
                    {"Id": "EnvironmentType", "Value": "SingleInstance"},
                    {"Id": "Ratio", "Value": 2.0}
                 ]}
            ]
        }))
        .unwrap();
        Recommendation::new(Arc::new(recipe), ProjectDefinition::new("/p/App.csproj"), 0)
    }

    fn displayable(rec: &Recommendation, path: &str) -> bool {
        let handler = OptionSettingHandler::default();
        let item = handler.get_option_setting(rec, path).unwrap();
        handler.is_option_setting_displayable(rec, item).unwrap()
    }

    #[test]
    fn test_no_dependencies_is_displayable() {
        assert!(displayable(&recommendation(), "InstanceCount"));
    }

    #[test]
    fn test_not_empty_numbers_always_pass() {
        assert!(displayable(&recommendation(), "NeedsCount"));
    }

    #[test]
    fn test_not_empty_rejects_blank_and_empty_collections() {
        let rec = recommendation();
        assert!(!displayable(&rec, "NeedsKeyPair"));
        assert!(!displayable(&rec, "NeedsTags"));
        assert!(!displayable(&rec, "NeedsSubnets"));
    }

    #[test]
    fn test_equals() {
        let mut rec = recommendation();
        assert!(!displayable(&rec, "LoadBalancerType"));
        rec.set_override("EnvironmentType", Some(SettingValue::String("LoadBalanced".into())));
        assert!(displayable(&rec, "LoadBalancerType"));
    }

    #[test]
    fn test_equals_null_matches_absent_value() {
        let mut rec = recommendation();
        assert!(displayable(&rec, "WithoutTags"));
        rec.set_override("Tags", Some(SettingValue::KeyValue(Default::default())));
        assert!(!displayable(&rec, "WithoutTags"));
    }

    #[test]
    fn test_all_dependencies_must_hold() {
        let mut rec = recommendation();
        assert!(displayable(&rec, "BothConditions"));
        rec.set_override("Ratio", Some(SettingValue::Double(2.5)));
        assert!(!displayable(&rec, "BothConditions"));
    }

    #[test]
    fn test_summary_displayable() {
        let handler = OptionSettingHandler::default();
        let rec = recommendation();
        let env = handler.get_option_setting(&rec, "EnvironmentType").unwrap();
        assert!(handler.is_summary_displayable(&rec, env).unwrap());
        let tags = handler.get_option_setting(&rec, "Tags").unwrap();
        assert!(!handler.is_summary_displayable(&rec, tags).unwrap());
        let lb = handler.get_option_setting(&rec, "LoadBalancerType").unwrap();
        assert!(!handler.is_summary_displayable(&rec, lb).unwrap());
    }
}
