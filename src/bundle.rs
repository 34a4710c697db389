// src/bundle.rs

//! Deployment bundle side-record
//!
//! A handful of build and packaging settings are mirrored out of the generic
//! option setting tree so the build pipeline can read them without walking
//! the recipe. The resolver keeps this record in sync on every successful
//! write.

use crate::recipe::SettingValue;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DOCKER_EXECUTION_DIRECTORY: &str = "DockerExecutionDirectory";
pub const DOCKERFILE_PATH: &str = "DockerfilePath";
pub const DOCKER_BUILD_ARGS: &str = "DockerBuildArgs";
pub const ECR_REPOSITORY_NAME: &str = "ECRRepositoryName";
pub const DOTNET_BUILD_CONFIGURATION: &str = "DotnetBuildConfiguration";
pub const DOTNET_PUBLISH_ADDITIONAL_BUILD_ARGUMENTS: &str = "DotnetPublishAdditionalBuildArguments";
pub const DOTNET_PUBLISH_SELF_CONTAINED_BUILD: &str = "DotnetPublishSelfContainedBuild";

/// Publish configuration used until a build configuration is set
pub const DEFAULT_DOTNET_BUILD_CONFIGURATION: &str = "Release";

/// Setting ids mirrored onto the deployment bundle
pub const BUNDLE_SETTING_IDS: [&str; 7] = [
    DOCKER_EXECUTION_DIRECTORY,
    DOCKERFILE_PATH,
    DOCKER_BUILD_ARGS,
    ECR_REPOSITORY_NAME,
    DOTNET_BUILD_CONFIGURATION,
    DOTNET_PUBLISH_ADDITIONAL_BUILD_ARGUMENTS,
    DOTNET_PUBLISH_SELF_CONTAINED_BUILD,
];

/// Whether a top-level setting id is mirrored onto the deployment bundle
pub fn is_bundle_setting(id: &str) -> bool {
    BUNDLE_SETTING_IDS.contains(&id)
}

/// Build and packaging settings of a recommendation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeploymentBundle {
    /// Directory the container build runs from
    pub docker_execution_directory: String,
    pub dockerfile_path: String,
    pub docker_build_args: String,
    #[serde(rename = "ECRRepositoryName")]
    pub ecr_repository_name: String,
    pub dotnet_publish_build_configuration: String,
    pub dotnet_publish_additional_build_arguments: String,
    pub dotnet_publish_self_contained_build: bool,
}

impl Default for DeploymentBundle {
    fn default() -> Self {
        Self {
            docker_execution_directory: String::new(),
            dockerfile_path: String::new(),
            docker_build_args: String::new(),
            ecr_repository_name: String::new(),
            dotnet_publish_build_configuration: DEFAULT_DOTNET_BUILD_CONFIGURATION.to_string(),
            dotnet_publish_additional_build_arguments: String::new(),
            dotnet_publish_self_contained_build: false,
        }
    }
}

impl DeploymentBundle {
    /// Mirror a freshly written setting value
    ///
    /// Returns whether the id was recognized. Unrecognized ids and values of
    /// an unexpected shape leave the bundle untouched.
    pub(crate) fn apply_setting(&mut self, id: &str, value: Option<&SettingValue>) -> bool {
        let text = || value.map(|v| v.to_string()).unwrap_or_default();

        match id {
            DOCKER_EXECUTION_DIRECTORY => self.docker_execution_directory = text(),
            DOCKERFILE_PATH => self.dockerfile_path = text(),
            DOCKER_BUILD_ARGS => self.docker_build_args = text(),
            ECR_REPOSITORY_NAME => self.ecr_repository_name = text(),
            DOTNET_BUILD_CONFIGURATION => {
                self.dotnet_publish_build_configuration = match value {
                    Some(v) => v.to_string(),
                    None => DEFAULT_DOTNET_BUILD_CONFIGURATION.to_string(),
                }
            }
            DOTNET_PUBLISH_ADDITIONAL_BUILD_ARGUMENTS => {
                self.dotnet_publish_additional_build_arguments = text()
            }
            DOTNET_PUBLISH_SELF_CONTAINED_BUILD => match value {
                Some(SettingValue::Bool(b)) => self.dotnet_publish_self_contained_build = *b,
                None => self.dotnet_publish_self_contained_build = false,
                Some(other) => {
                    debug!("Ignoring non-boolean value {} for {}", other, id);
                    return false;
                }
            },
            _ => return false,
        }

        debug!("Mirrored {} onto the deployment bundle", id);
        true
    }
}
