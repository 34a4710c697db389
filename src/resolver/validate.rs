// src/resolver/validate.rs

//! Validation pipeline

use super::{OptionSettingHandler, join_messages};
use crate::error::Result;
use crate::recipe::OptionSettingItem;
use crate::recommendation::Recommendation;
use crate::validation::{ValidationContext, ValidationResult, ValidationState};
use futures::future::join_all;
use std::sync::Arc;
use tracing::debug;

impl OptionSettingHandler {
    /// Validate settings and record their validation state
    ///
    /// With no explicit `items`, every configurable top-level setting is
    /// checked (only updatable ones when redeploying an existing
    /// application). Hidden settings are reset to valid and skipped along
    /// with their children. Returns every failing result.
    pub async fn run_option_setting_validators(
        &self,
        recommendation: &mut Recommendation,
        items: Option<&[&OptionSettingItem]>,
    ) -> Result<Vec<ValidationResult>> {
        let recipe = Arc::clone(recommendation.recipe());
        let roots: Vec<&OptionSettingItem> = match items {
            Some(items) => items.to_vec(),
            None => {
                let existing = recommendation.is_existing_cloud_application();
                recipe
                    .option_settings()
                    .iter()
                    .filter(|item| !existing || item.updatable)
                    .collect()
            }
        };

        let mut failures = Vec::new();
        let mut stack: Vec<&OptionSettingItem> = roots.into_iter().rev().collect();

        while let Some(item) = stack.pop() {
            let id = item.fully_qualified_id();

            if !self.is_option_setting_displayable(recommendation, item)? {
                recommendation.set_validation_state(id, ValidationState::default());
                continue;
            }

            let value = self.get_option_setting_value(recommendation, item)?;
            let item_failures = self
                .run_item_validators(recommendation, item, value.as_ref())
                .await?;

            if item_failures.is_empty() {
                recommendation.set_validation_state(id, ValidationState::default());
            } else {
                debug!("Option setting {} failed validation", id);
                recommendation.set_validation_state(
                    id,
                    ValidationState::invalid(join_messages(&item_failures), value),
                );
                failures.extend(item_failures);
            }

            stack.extend(item.child_option_settings.iter().rev());
        }

        Ok(failures)
    }

    /// Run the recipe's cross-setting validators; returns every failing result
    pub async fn run_recipe_validators(
        &self,
        recommendation: &Recommendation,
        context: &ValidationContext,
    ) -> Result<Vec<ValidationResult>> {
        let validators = self
            .validator_factory()
            .build_recipe_validators(recommendation.recipe())?;

        let results = join_all(
            validators
                .iter()
                .map(|v| v.validate(recommendation, self, context)),
        )
        .await;

        Ok(results.into_iter().filter(|r| !r.is_valid).collect())
    }
}
