// tests/common/mod.rs

//! Shared fixtures for integration tests.

#![allow(dead_code)]

use recipe_resolver::recipe::parse_recipe_value;
use recipe_resolver::{OptionSettingHandler, ProjectDefinition, RecipeDefinition, Recommendation};
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Recipe document modelled on an Elastic Beanstalk deployment
pub fn beanstalk_recipe_document() -> Value {
    json!({
        "Id": "AspNetAppElasticBeanstalkLinux",
        "Version": "1.0.0",
        "Name": "ASP.NET Core App to AWS Elastic Beanstalk on Linux",
        "ShortDescription": "Deploys to a Beanstalk environment",
        "TargetService": "AWS Elastic Beanstalk",
        "DeploymentType": "CdkProject",
        "DeploymentBundle": "DotnetPublishZipFile",
        "CdkProjectTemplate": "../CdkTemplates/AspNetAppElasticBeanstalkLinux",
        "CdkProjectTemplateId": "netdeploy.AspNetAppElasticBeanstalkLinux",
        "RecipePriority": 100,
        "Categories": [
            {"Id": "General", "DisplayName": "General", "Order": 10},
            {"Id": "Hosting", "DisplayName": "Hosting", "Order": 20},
            {"Id": "VPC", "DisplayName": "VPC", "Order": 30}
        ],
        "Validators": [
            {"ValidatorType": "MinMaxConstraint", "Configuration": {
                "MinValueOptionSettingsId": "AutoScaling.MinInstances",
                "MaxValueOptionSettingsId": "AutoScaling.MaxInstances"
            }}
        ],
        "OptionSettings": [
            {
                "Id": "EnvironmentName",
                "Name": "Environment Name",
                "Category": "General",
                "Type": "String",
                "DefaultValue": "{ProjectName}-dev",
                "Updatable": false,
                "Validators": [
                    {"ValidatorType": "Required"},
                    {"ValidatorType": "Regex", "Configuration": {"Regex": "^[a-zA-Z0-9-]{4,40}$"}}
                ]
            },
            {
                "Id": "EnvironmentType",
                "Name": "Environment Type",
                "Category": "Hosting",
                "Type": "String",
                "DefaultValue": "SingleInstance",
                "Updatable": true,
                "AllowedValues": ["SingleInstance", "LoadBalanced"],
                "ValueMapping": {
                    "Single Instance": "SingleInstance",
                    "Load Balanced": "LoadBalanced"
                }
            },
            {
                "Id": "LoadBalancerType",
                "Name": "Load Balancer Type",
                "Category": "Hosting",
                "Type": "String",
                "DefaultValue": "application",
                "AllowedValues": ["application", "classic", "network"],
                "DependsOn": [{"Id": "EnvironmentType", "Value": "LoadBalanced"}]
            },
            {
                "Id": "InstanceType",
                "Name": "EC2 Instance Type",
                "Category": "Hosting",
                "Type": "String",
                "TypeHint": "InstanceType",
                "DefaultValue": "t3.micro",
                "Updatable": true,
                "Validators": [{"ValidatorType": "Required"}]
            },
            {
                "Id": "UseVPC",
                "Name": "Use VPC",
                "Category": "VPC",
                "Type": "Bool"
            },
            {
                "Id": "Subnets",
                "Name": "Subnets",
                "Category": "VPC",
                "Type": "List",
                "DefaultValue": [],
                "Updatable": true,
                "DependsOn": [{"Id": "UseVPC", "Operation": "NotEmpty"}],
                "Validators": [
                    {"ValidatorType": "Regex", "Configuration": {
                        "Regex": "^subnet-[a-z0-9]+$",
                        "ValidationFailedMessage": "Invalid subnet id, must match {{Regex}}"
                    }}
                ]
            },
            {
                "Id": "SecurityGroups",
                "Name": "Security Groups",
                "Category": "VPC",
                "Type": "List",
                "DefaultValue": ["sg-default", "sg-web"]
            },
            {
                "Id": "EnvironmentVariables",
                "Name": "Environment Variables",
                "Category": "General",
                "Type": "KeyValue",
                "Updatable": true,
                "AdvancedSetting": true
            },
            {
                "Id": "AutoScaling",
                "Name": "Auto Scaling",
                "Category": "Hosting",
                "Type": "Object",
                "Updatable": true,
                "ChildOptionSettings": [
                    {"Id": "MinInstances", "Name": "Minimum Instances", "Type": "Int",
                     "DefaultValue": 1,
                     "Validators": [{"ValidatorType": "Range", "Configuration": {"Min": 1, "Max": 10}}]},
                    {"Id": "MaxInstances", "Name": "Maximum Instances", "Type": "Int",
                     "DefaultValue": 4,
                     "Validators": [{"ValidatorType": "Range", "Configuration": {"Min": 1, "Max": 10}}]}
                ]
            },
            {
                "Id": "DotnetBuildConfiguration",
                "Name": "Build Configuration",
                "Category": "General",
                "Type": "String",
                "DefaultValue": "Release",
                "AdvancedSetting": true
            }
        ]
    })
}

pub fn beanstalk_recipe() -> Arc<RecipeDefinition> {
    Arc::new(parse_recipe_value(beanstalk_recipe_document()).unwrap())
}

/// Fresh recommendation for a project called `WebApp`
pub fn beanstalk_recommendation() -> Recommendation {
    Recommendation::new(
        beanstalk_recipe(),
        ProjectDefinition::new("/src/WebApp/WebApp.csproj"),
        100,
    )
}

pub fn handler() -> OptionSettingHandler {
    OptionSettingHandler::default()
}

/// Write `<dir>/<name>.recipe`, creating `dir`
pub fn write_recipe_file(dir: &Path, name: &str) {
    fs::create_dir_all(dir).unwrap();
    fs::write(
        dir.join(format!("{}.recipe", name)),
        serde_json::to_string_pretty(&beanstalk_recipe_document()).unwrap(),
    )
    .unwrap();
}
