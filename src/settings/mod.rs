// src/settings/mod.rs

//! Deployment settings documents
//!
//! A deployment settings file replays a saved configuration onto a
//! recommendation:
//!
//! ```json
//! {
//!   "AWSProfile": "default",
//!   "AWSRegion": "us-west-2",
//!   "ApplicationName": "WebApp",
//!   "RecipeId": "AspNetAppEcsFargate",
//!   "Settings": {
//!     "EnvironmentType": "LoadBalanced",
//!     "Vpc.IsDefault": false,
//!     "EnvironmentVariables": { "STAGE": "prod" }
//!   }
//! }
//! ```
//!
//! Entries are applied without per-entry validation; the whole
//! recommendation is validated once afterwards so every problem is reported
//! together.

use crate::error::{Error, Result};
use crate::recommendation::Recommendation;
use crate::resolver::{OptionSettingHandler, OptionSettingsType};
use crate::validation::ValidationContext;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Header of the aggregate error raised when applied settings fail validation
pub const CONFIGURATION_NEEDS_ADJUSTMENT_HEADER: &str =
    "The deployment configuration needs to be adjusted before it can be deployed:";

/// Saved deployment configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeploymentSettings {
    #[serde(rename = "AWSProfile", default, skip_serializing_if = "Option::is_none")]
    pub aws_profile: Option<String>,

    #[serde(rename = "AWSRegion", default, skip_serializing_if = "Option::is_none")]
    pub aws_region: Option<String>,

    #[serde(rename = "ApplicationName", default, skip_serializing_if = "Option::is_none")]
    pub application_name: Option<String>,

    #[serde(rename = "RecipeId", default, skip_serializing_if = "Option::is_none")]
    pub recipe_id: Option<String>,

    /// Setting path to value
    #[serde(rename = "Settings", default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Map<String, Value>>,
}

impl DeploymentSettings {
    /// Parse a settings document
    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| {
            Error::DeserializationFailed(format!("Invalid deployment settings: {}", e))
        })
    }

    /// Pretty-printed JSON, omitting unset fields
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            Error::DeserializationFailed(format!("Failed to serialize deployment settings: {}", e))
        })
    }
}

/// Which settings to include when building a settings document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveSettingsType {
    /// Every displayable setting
    All,
    /// Only settings that differ from their recipe defaults
    Modified,
}

/// Session metadata recorded alongside the settings
#[derive(Debug, Clone, Default)]
pub struct SettingsMetadata {
    pub aws_profile: Option<String>,
    pub aws_region: Option<String>,
    pub application_name: Option<String>,
}

/// Reads, applies and produces deployment settings documents
#[derive(Clone)]
pub struct DeploymentSettingsHandler {
    option_setting_handler: Arc<OptionSettingHandler>,
}

impl DeploymentSettingsHandler {
    pub fn new(option_setting_handler: Arc<OptionSettingHandler>) -> Self {
        Self {
            option_setting_handler,
        }
    }

    pub fn option_setting_handler(&self) -> &OptionSettingHandler {
        &self.option_setting_handler
    }

    /// Read a settings document from disk
    pub async fn read_settings(&self, path: &Path) -> Result<DeploymentSettings> {
        if !tokio::fs::try_exists(path).await? {
            return Err(Error::SettingsFileNotFound(path.to_path_buf()));
        }

        let content = tokio::fs::read_to_string(path).await?;

        serde_json::from_str(&content).map_err(|e| {
            Error::DeserializationFailed(format!(
                "An error occurred while trying to deserialize the deployment settings file located at {}.\n  {}",
                path.display(),
                e
            ))
        })
    }

    /// Apply every entry of `settings`, then validate the whole recommendation
    ///
    /// An unknown setting path aborts immediately with
    /// [`Error::ConfigurationNeedsAdjustment`]. Validation failures are
    /// collected and raised once, as a single aggregate error.
    pub async fn apply_settings(
        &self,
        settings: &DeploymentSettings,
        recommendation: &mut Recommendation,
        context: &ValidationContext,
    ) -> Result<()> {
        let handler = &self.option_setting_handler;
        let entries = settings.settings.clone().unwrap_or_default();

        for (path, value) in entries {
            match handler
                .set_option_setting_value_by_path(recommendation, &path, value, true)
                .await
            {
                Ok(()) => debug!("Applied setting {}", path),
                Err(e) if e.is_not_found() => {
                    return Err(Error::ConfigurationNeedsAdjustment(e.to_string()));
                }
                Err(e) => return Err(e),
            }
        }

        let mut failures = handler
            .run_option_setting_validators(recommendation, None)
            .await?;
        failures.extend(handler.run_recipe_validators(recommendation, context).await?);

        if failures.is_empty() {
            info!(
                "Applied deployment settings to recipe {}",
                recommendation.recipe().id
            );
            return Ok(());
        }

        let mut message = format!("{}\n", CONFIGURATION_NEEDS_ADJUSTMENT_HEADER);
        for failure in &failures {
            message.push_str(failure.message());
            message.push('\n');
        }
        Err(Error::ConfigurationNeedsAdjustment(message.trim().to_string()))
    }

    /// Build a settings document from the current state of a recommendation
    pub fn build_settings_document(
        &self,
        recommendation: &Recommendation,
        settings_type: SaveSettingsType,
        metadata: SettingsMetadata,
    ) -> Result<DeploymentSettings> {
        let handler = &self.option_setting_handler;
        let mut settings =
            handler.get_option_settings_map(recommendation, OptionSettingsType::All)?;

        if settings_type == SaveSettingsType::Modified {
            for item in recommendation.configurable_option_setting_items() {
                if !handler.is_option_setting_modified(recommendation, item)? {
                    settings.remove(item.fully_qualified_id());
                }
            }
        }

        Ok(DeploymentSettings {
            aws_profile: metadata.aws_profile,
            aws_region: metadata.aws_region,
            application_name: metadata.application_name,
            recipe_id: Some(recommendation.recipe().id.clone()),
            settings: Some(settings),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::{SettingValue, parse_recipe_value};
    use crate::recommendation::ProjectDefinition;
    use serde_json::json;

    fn recommendation() -> Recommendation {
        let recipe = parse_recipe_value(json!({
            "Id": "AspNetAppElasticBeanstalkLinux",
            "Name": "Elastic Beanstalk on Linux",
            "DeploymentType": "CdkProject",
            "OptionSettings": [
                {"Id": "EnvironmentType", "Type": "String", "DefaultValue": "SingleInstance",
                 "AllowedValues": ["SingleInstance", "LoadBalanced"]},
                {"Id": "InstanceType", "Name": "Instance Type", "Type": "String",
                 "Validators": [{"ValidatorType": "Required"}]},
                {"Id": "EnvironmentVariables", "Type": "KeyValue"}
            ]
        }))
        .unwrap();
        Recommendation::new(Arc::new(recipe), ProjectDefinition::new("/p/App.csproj"), 0)
    }

    fn handler() -> DeploymentSettingsHandler {
        DeploymentSettingsHandler::new(Arc::new(OptionSettingHandler::default()))
    }

    #[test]
    fn test_parse_document() {
        let settings = DeploymentSettings::from_json_str(
            r#"{"AWSRegion": "us-west-2", "RecipeId": "X", "Settings": {"A.B": 1}}"#,
        )
        .unwrap();
        assert_eq!(settings.aws_region.as_deref(), Some("us-west-2"));
        assert!(settings.aws_profile.is_none());
        assert_eq!(settings.settings.unwrap().get("A.B"), Some(&json!(1)));

        assert!(matches!(
            DeploymentSettings::from_json_str("[1, 2"),
            Err(Error::DeserializationFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deployment-settings.json");
        let err = handler().read_settings(&path).await.unwrap_err();
        assert!(matches!(err, Error::SettingsFileNotFound(_)));
        assert!(err.to_string().ends_with("doesn't exist"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_read_reports_io_errors() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("not-a-directory");
        std::fs::write(&file, "{}").unwrap();

        let err = handler()
            .read_settings(&file.join("deployment-settings.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[tokio::test]
    async fn test_read_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deployment-settings.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = handler().read_settings(&path).await.unwrap_err();
        assert!(matches!(err, Error::DeserializationFailed(_)));
        assert!(err.to_string().starts_with(
            "An error occurred while trying to deserialize the deployment settings file located at"
        ));
    }

    #[tokio::test]
    async fn test_apply_clean_settings() {
        let mut rec = recommendation();
        let settings = DeploymentSettings {
            settings: Some(
                json!({
                    "EnvironmentType": "LoadBalanced",
                    "InstanceType": "t3.large",
                    "EnvironmentVariables.STAGE": "prod"
                })
                .as_object()
                .unwrap()
                .clone(),
            ),
            ..Default::default()
        };

        handler()
            .apply_settings(&settings, &mut rec, &ValidationContext::default())
            .await
            .unwrap();

        assert_eq!(
            rec.override_value("EnvironmentType"),
            Some(&SettingValue::String("LoadBalanced".into()))
        );
        let vars = rec.override_value("EnvironmentVariables").unwrap();
        assert_eq!(vars.as_key_value().unwrap().get("STAGE").map(String::as_str), Some("prod"));
    }

    #[tokio::test]
    async fn test_apply_aggregates_failures() {
        let mut rec = recommendation();
        let settings = DeploymentSettings {
            settings: Some(Map::new()),
            ..Default::default()
        };

        let err = handler()
            .apply_settings(&settings, &mut rec, &ValidationContext::default())
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "The deployment configuration needs to be adjusted before it can be deployed:\nThe option setting 'Instance Type' can not be empty. Please select a valid value."
        );
    }

    #[tokio::test]
    async fn test_build_modified_document() {
        let handler = handler();
        let mut rec = recommendation();
        handler
            .option_setting_handler()
            .set_option_setting_value_by_path(&mut rec, "InstanceType", "t3.micro", false)
            .await
            .unwrap();

        let metadata = SettingsMetadata {
            aws_region: Some("eu-west-1".into()),
            ..Default::default()
        };
        let all = handler
            .build_settings_document(&rec, SaveSettingsType::All, metadata.clone())
            .unwrap();
        let all_settings = all.settings.unwrap();
        assert_eq!(all_settings.len(), 3);
        assert_eq!(all.recipe_id.as_deref(), Some("AspNetAppElasticBeanstalkLinux"));

        let modified = handler
            .build_settings_document(&rec, SaveSettingsType::Modified, metadata)
            .unwrap();
        assert_eq!(modified.aws_region.as_deref(), Some("eu-west-1"));
        let settings = modified.settings.clone().unwrap();
        assert_eq!(settings.len(), 1);
        assert_eq!(settings.get("InstanceType"), Some(&json!("t3.micro")));

        let text = modified.to_json_string().unwrap();
        assert!(!text.contains("AWSProfile"));
        assert!(text.contains("\"InstanceType\": \"t3.micro\""));
    }
}
