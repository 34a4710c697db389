// src/main.rs

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use recipe_resolver::recipe::{parse_recipe_file, validate_recipe};
use recipe_resolver::{
    CustomRecipeLocator, DeploymentSettingsHandler, EngineConfig, OptionSettingHandler,
    OptionSettingsType, ProjectDefinition, Recommendation, ValidationContext,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "recipe-resolver")]
#[command(author, version, about = "Inspect deployment recipes and resolve their option settings", long_about = None)]
struct Cli {
    /// Engine configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and lint a recipe document
    Check {
        /// Path to the recipe file
        recipe: PathBuf,
    },
    /// Find custom recipe directories for a project
    Locate {
        /// Path to the project file
        project: PathBuf,
        /// Directory containing the solution file
        solution_dir: PathBuf,
    },
    /// Print the resolved configuration of a recipe as JSON
    Resolve {
        /// Path to the recipe file
        recipe: PathBuf,
        /// Deployment settings file to apply first
        #[arg(short, long)]
        settings: Option<PathBuf>,
        /// Project file the recipe is bound to
        #[arg(short, long, default_value = "Project.csproj")]
        project: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };

    match cli.command {
        Commands::Check { recipe } => {
            let definition = parse_recipe_file(&recipe)?;
            let warnings = validate_recipe(&definition)?;
            println!(
                "{}: {} option settings, {} warnings",
                definition,
                definition.option_settings().len(),
                warnings.len()
            );
            for warning in &warnings {
                println!("  warning: {}", warning);
            }
        }
        Commands::Locate {
            project,
            solution_dir,
        } => {
            let locator = CustomRecipeLocator::with_config(config);
            let found = locator
                .locate_custom_recipe_paths(&project, &solution_dir)
                .await;
            if found.is_empty() {
                info!("No custom recipes found");
            }
            for dir in found {
                println!("{}", dir.display());
            }
        }
        Commands::Resolve {
            recipe,
            settings,
            project,
        } => {
            let definition = Arc::new(parse_recipe_file(&recipe)?);
            let option_handler = Arc::new(OptionSettingHandler::default());
            let mut recommendation =
                Recommendation::new(definition, ProjectDefinition::new(project), 0);

            match settings {
                Some(path) => {
                    let settings_handler =
                        DeploymentSettingsHandler::new(Arc::clone(&option_handler));
                    let document = settings_handler.read_settings(&path).await?;
                    let context = ValidationContext {
                        aws_profile: document.aws_profile.clone(),
                        aws_region: document.aws_region.clone(),
                        ..Default::default()
                    };
                    settings_handler
                        .apply_settings(&document, &mut recommendation, &context)
                        .await
                        .with_context(|| format!("Failed to apply {}", path.display()))?;
                }
                None => {
                    let failures = option_handler
                        .run_option_setting_validators(&mut recommendation, None)
                        .await?;
                    for failure in &failures {
                        warn!("{}", failure.message());
                    }
                }
            }

            let resolved =
                option_handler.get_option_settings_map(&recommendation, OptionSettingsType::All)?;
            println!("{}", serde_json::to_string_pretty(&resolved)?);
        }
    }

    Ok(())
}
