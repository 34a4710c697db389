// src/recipe/mod.rs

//! Recipe data model
//!
//! Recipes describe a deployment strategy for a category of projects as a
//! tree of typed option settings. A recipe document is JSON:
//!
//! ```json
//! {
//!   "Id": "AspNetAppEcsFargate",
//!   "Version": "1.0.0",
//!   "Name": "ASP.NET Core App to Amazon ECS using AWS Fargate",
//!   "DeploymentType": "CdkProject",
//!   "DeploymentBundle": "Container",
//!   "Categories": [{ "Id": "General", "DisplayName": "General", "Order": 10 }],
//!   "OptionSettings": [
//!     { "Id": "UseVPC", "Type": "Bool", "DefaultValue": false },
//!     {
//!       "Id": "Subnets",
//!       "Type": "List",
//!       "DependsOn": [{ "Id": "UseVPC", "Value": true }]
//!     }
//!   ]
//! }
//! ```
//!
//! Loaded recipes are immutable. Per-session state (overrides, validation
//! results) lives on the [`Recommendation`](crate::Recommendation).

mod definition;
pub mod graph;
mod option;
pub mod parser;
mod value;

pub use definition::{Category, DeploymentBundleType, DeploymentType, RecipeDefinition};
pub use graph::DependencyGraph;
pub use option::{Dependency, DependencyOperation, OptionSettingItem, ValidatorConfig};
pub use parser::{parse_recipe, parse_recipe_file, parse_recipe_value, validate_recipe};
pub use value::{FromSettingValue, SettingValue, ValueType};
