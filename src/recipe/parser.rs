// src/recipe/parser.rs

//! Recipe document parsing

use crate::error::{Error, Result};
use crate::recipe::definition::RecipeDefinition;
use crate::recipe::option::OptionSettingItem;
use crate::recipe::value::{SettingValue, ValueType};
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, warn};

/// Parse a recipe from a JSON string
pub fn parse_recipe(content: &str) -> Result<RecipeDefinition> {
    let value: Value = serde_json::from_str(content)
        .map_err(|e| Error::DeserializationFailed(format!("Invalid recipe document: {}", e)))?;
    parse_recipe_value(value)
}

/// Parse a recipe from an already-decoded JSON document
pub fn parse_recipe_value(value: Value) -> Result<RecipeDefinition> {
    let mut recipe: RecipeDefinition = serde_json::from_value(value)
        .map_err(|e| Error::DeserializationFailed(format!("Invalid recipe document: {}", e)))?;

    recipe.finalize();
    check_structure(&recipe)?;

    debug!("Parsed recipe {}", recipe);
    Ok(recipe)
}

/// Parse a recipe from a file
pub fn parse_recipe_file(path: &Path) -> Result<RecipeDefinition> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Io(format!("Failed to read recipe file {}: {}", path.display(), e)))?;

    let mut recipe = parse_recipe(&content).map_err(|e| match e {
        Error::DeserializationFailed(msg) => {
            Error::DeserializationFailed(format!("{}: {}", path.display(), msg))
        }
        Error::InvalidRecipe(msg) => Error::InvalidRecipe(format!("{}: {}", path.display(), msg)),
        other => other,
    })?;
    recipe.recipe_path = Some(path.to_path_buf());
    Ok(recipe)
}

/// Validate a recipe for completeness and correctness
///
/// Structural problems are errors; questionable but loadable content is
/// returned as warnings.
pub fn validate_recipe(recipe: &RecipeDefinition) -> Result<Vec<String>> {
    check_structure(recipe)?;

    let mut warnings = Vec::new();

    if recipe.version.is_empty() {
        warnings.push("Missing recipe version".to_string());
    }
    if recipe.option_settings.is_empty() {
        warnings.push("Recipe declares no option settings".to_string());
    }

    let mut stack: Vec<&OptionSettingItem> = recipe.option_settings.iter().collect();
    while let Some(item) = stack.pop() {
        let id = item.fully_qualified_id();

        if let Some(category) = &item.category {
            if recipe.category(category).is_none() {
                warnings.push(format!("{} references unknown category {}", id, category));
            }
        }

        if let Some(Value::String(default)) = &item.default_value {
            let underlying = item.value_mapping.get(default).unwrap_or(default);
            if !item.allowed_values.is_empty() && !item.is_allowed_value(underlying) {
                warnings.push(format!(
                    "{} default value '{}' is not one of its allowed values",
                    id, default
                ));
            }
        }

        if let Some(default) = &item.default_value {
            let is_token = matches!(default, Value::String(s) if s.contains('{'));
            if !item.is_object()
                && !is_token
                && SettingValue::from_json(item.value_type, default).is_err()
            {
                warnings.push(format!(
                    "{} default value does not match its type {}",
                    id, item.value_type
                ));
            }
        }

        stack.extend(item.child_option_settings.iter());
    }

    for warning in &warnings {
        warn!("Recipe {}: {}", recipe.id, warning);
    }

    Ok(warnings)
}

fn check_structure(recipe: &RecipeDefinition) -> Result<()> {
    if recipe.id.trim().is_empty() {
        return Err(Error::InvalidRecipe("Recipe id cannot be empty".to_string()));
    }
    if recipe.name.trim().is_empty() {
        return Err(Error::InvalidRecipe(format!(
            "Recipe {} name cannot be empty",
            recipe.id
        )));
    }

    let mut orders = HashSet::new();
    for category in &recipe.categories {
        if !orders.insert(category.order) {
            return Err(Error::InvalidRecipe(format!(
                "Recipe {} has more than one category with order {}",
                recipe.id, category.order
            )));
        }
    }

    let mut stack: Vec<&[OptionSettingItem]> = vec![recipe.option_settings.as_slice()];
    while let Some(siblings) = stack.pop() {
        let mut ids = HashSet::new();
        for item in siblings {
            if item.id.trim().is_empty() {
                return Err(Error::InvalidRecipe(format!(
                    "Recipe {} has an option setting with an empty id",
                    recipe.id
                )));
            }
            if !ids.insert(item.id.as_str()) {
                return Err(Error::InvalidRecipe(format!(
                    "Recipe {} declares option setting {} more than once",
                    recipe.id,
                    item.fully_qualified_id()
                )));
            }
            if item.value_type == ValueType::KeyValue && !item.child_option_settings.is_empty() {
                return Err(Error::InvalidRecipe(format!(
                    "KeyValue option setting {} cannot have child option settings",
                    item.fully_qualified_id()
                )));
            }
            for dependency in &item.depends_on {
                if recipe.find_option_setting(&dependency.id).is_none() {
                    return Err(Error::InvalidRecipe(format!(
                        "Option setting {} depends on {}, which does not exist in recipe {}",
                        item.fully_qualified_id(),
                        dependency.id,
                        recipe.id
                    )));
                }
            }
            stack.push(item.child_option_settings.as_slice());
        }
    }

    recipe.dependency_graph().topological_sort()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn base() -> Value {
        json!({
            "Id": "AspNetAppElasticBeanstalkLinux",
            "Version": "1.0.0",
            "Name": "ASP.NET Core App to AWS Elastic Beanstalk on Linux",
            "DeploymentType": "CdkProject",
            "DeploymentBundle": "DotnetPublishZipFile",
            "Categories": [
                {"Id": "General", "DisplayName": "General", "Order": 10},
                {"Id": "Hosting", "DisplayName": "Hosting", "Order": 20}
            ],
            "OptionSettings": [
                {"Id": "EnvironmentType", "Type": "String", "Category": "Hosting",
                 "DefaultValue": "SingleInstance",
                 "AllowedValues": ["SingleInstance", "LoadBalanced"]},
                {"Id": "UseVPC", "Type": "Bool", "DefaultValue": false}
            ]
        })
    }

    #[test]
    fn test_parse_valid_recipe() {
        let recipe = parse_recipe(&base().to_string()).unwrap();
        assert_eq!(recipe.id, "AspNetAppElasticBeanstalkLinux");
        assert_eq!(recipe.option_settings.len(), 2);
        assert!(validate_recipe(&recipe).unwrap().is_empty());
    }

    #[test]
    fn test_parse_invalid_json() {
        let result = parse_recipe("this is not json {");
        assert!(matches!(result, Err(Error::DeserializationFailed(_))));
    }

    #[test]
    fn test_duplicate_category_order_rejected() {
        let mut doc = base();
        doc["Categories"][1]["Order"] = json!(10);
        let err = parse_recipe_value(doc).unwrap_err();
        assert!(err.to_string().contains("order 10"));
    }

    #[test]
    fn test_duplicate_sibling_rejected() {
        let mut doc = base();
        doc["OptionSettings"][1]["Id"] = json!("EnvironmentType");
        assert!(matches!(parse_recipe_value(doc), Err(Error::InvalidRecipe(_))));
    }

    #[test]
    fn test_same_id_in_different_scopes_allowed() {
        let mut doc = base();
        doc["OptionSettings"]
            .as_array_mut()
            .unwrap()
            .push(json!({"Id": "Vpc", "Type": "Object", "ChildOptionSettings": [
                {"Id": "UseVPC", "Type": "Bool"}
            ]}));
        assert!(parse_recipe_value(doc).is_ok());
    }

    #[test]
    fn test_unknown_dependency_rejected() {
        let mut doc = base();
        doc["OptionSettings"][0]["DependsOn"] = json!([{"Id": "Missing", "Value": true}]);
        let err = parse_recipe_value(doc).unwrap_err();
        assert!(err.to_string().contains("Missing"));
    }

    #[test]
    fn test_dependency_cycle_rejected() {
        let mut doc = base();
        doc["OptionSettings"][0]["DependsOn"] = json!([{"Id": "UseVPC", "Value": true}]);
        doc["OptionSettings"][1]["DependsOn"] =
            json!([{"Id": "EnvironmentType", "Operation": "NotEmpty"}]);
        let err = parse_recipe_value(doc).unwrap_err();
        assert!(err.to_string().contains("Circular"));
    }

    #[test]
    fn test_key_value_with_children_rejected() {
        let mut doc = base();
        doc["OptionSettings"]
            .as_array_mut()
            .unwrap()
            .push(json!({"Id": "EnvVars", "Type": "KeyValue", "ChildOptionSettings": [
                {"Id": "Inner", "Type": "String"}
            ]}));
        assert!(matches!(parse_recipe_value(doc), Err(Error::InvalidRecipe(_))));
    }

    #[test]
    fn test_validate_warnings() {
        let mut doc = base();
        doc["OptionSettings"][0]["Category"] = json!("Nowhere");
        doc["OptionSettings"][0]["DefaultValue"] = json!("Dedicated");
        doc["OptionSettings"][1]["DefaultValue"] = json!("maybe");

        let recipe = parse_recipe_value(doc).unwrap();
        let warnings = validate_recipe(&recipe).unwrap();
        assert!(warnings.iter().any(|w| w.contains("unknown category Nowhere")));
        assert!(warnings.iter().any(|w| w.contains("allowed values")));
        assert!(warnings.iter().any(|w| w.contains("UseVPC default value")));
    }

    #[test]
    fn test_parse_recipe_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("MyRecipe.recipe");
        std::fs::write(&path, base().to_string()).unwrap();

        let recipe = parse_recipe_file(&path).unwrap();
        assert_eq!(recipe.recipe_path.as_deref(), Some(path.as_path()));
    }
}
