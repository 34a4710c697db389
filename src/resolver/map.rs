// src/resolver/map.rs

//! Resolved configuration export

use super::OptionSettingHandler;
use crate::bundle::is_bundle_setting;
use crate::error::Result;
use crate::recommendation::Recommendation;
use serde_json::{Map, Value};

/// Which top-level settings to export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OptionSettingsType {
    #[default]
    All,
    /// Settings consumed by the infrastructure project
    Recipe,
    /// Settings mirrored onto the deployment bundle
    DeploymentBundle,
}

impl OptionSettingHandler {
    /// Effective value of every displayable top-level setting, keyed by id
    pub fn get_option_settings_map(
        &self,
        recommendation: &Recommendation,
        settings_type: OptionSettingsType,
    ) -> Result<Map<String, Value>> {
        let mut settings = Map::new();

        for item in recommendation.configurable_option_setting_items() {
            let in_bundle = is_bundle_setting(&item.id);
            let included = match settings_type {
                OptionSettingsType::All => true,
                OptionSettingsType::Recipe => !in_bundle,
                OptionSettingsType::DeploymentBundle => in_bundle,
            };
            if !included || !self.is_option_setting_displayable(recommendation, item)? {
                continue;
            }

            let value = self
                .get_option_setting_value(recommendation, item)?
                .map(|v| v.to_json())
                .unwrap_or(Value::Null);
            settings.insert(item.id.clone(), value);
        }

        Ok(settings)
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
            "Id": "Fargate",
            "Name": "Fargate",
            "DeploymentType": "CdkProject",
            "DeploymentBundle": "Container",
            "OptionSettings": [
                {"Id": "ServiceName", "Type": "String", "DefaultValue": "{ProjectName}-service"},
                {"Id": "DockerBuildArgs", "Type": "String", "DefaultValue": ""},
                {"Id": "ECRRepositoryName", "Type": "String", "DefaultValue": "{ProjectName}"},
                {"Id": "UseVPC", "Type": "Bool", "DefaultValue": false},
                {"Id": "VpcId", "Type": "String", "DependsOn": [{"Id": "UseVPC", "Value": true}]},
                {"Id": "Scaling", "Type": "Object", "ChildOptionSettings": [
                    {"Id": "Min", "Type": "Int", "DefaultValue": 1}
                ]}
            ]
        }))
        .unwrap();
        Recommendation::new(Arc::new(recipe), ProjectDefinition::new("/p/Api.csproj"), 0)
    }

    #[test]
    fn test_all_settings() {
        let handler = OptionSettingHandler::default();
        let map = handler
            .get_option_settings_map(&recommendation(), OptionSettingsType::All)
            .unwrap();

        assert_eq!(map.get("ServiceName"), Some(&json!("Api-service")));
        assert_eq!(map.get("Scaling"), Some(&json!({"Min": 1})));
        assert!(!map.contains_key("VpcId"));
        assert_eq!(map.len(), 5);
    }

    #[test]
    fn test_recipe_and_bundle_partition() {
        let handler = OptionSettingHandler::default();
        let rec = recommendation();

        let recipe = handler
            .get_option_settings_map(&rec, OptionSettingsType::Recipe)
            .unwrap();
        assert!(!recipe.contains_key("ECRRepositoryName"));
        assert!(recipe.contains_key("ServiceName"));

        let bundle = handler
            .get_option_settings_map(&rec, OptionSettingsType::DeploymentBundle)
            .unwrap();
        let keys: Vec<&str> = bundle.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["DockerBuildArgs", "ECRRepositoryName"]);
        assert_eq!(bundle.get("ECRRepositoryName"), Some(&json!("Api")));
    }
}
