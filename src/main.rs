//! Operator tool for the storefront configuration resolver.
//!
//! Drives the library from the command line: resolve the active
//! configuration, stage or publish an edited document, switch tenants, and
//! check or repair image links.

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use storefront_config::config::{load_settings, ResolverSettings};
use storefront_config::observability::init_logging;
use storefront_config::tenant::{TenantCoordinates, TenantRegistry};
use storefront_config::{StoreConfig, StoreContext};

#[derive(Parser)]
#[command(name = "storefront-config")]
#[command(about = "Resolve and publish storefront configuration", long_about = None)]
struct Cli {
    /// Settings file (TOML). Built-in defaults when omitted.
    #[arg(short, long)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the active configuration and print it
    Resolve,
    /// Validate a config file and store it as the local fallback
    Save { file: PathBuf },
    /// Publish a config file to the active tenant's remote store
    Publish { file: PathBuf },
    /// Select the active tenant, optionally registering its repository
    Select {
        tenant: String,
        #[command(flatten)]
        coordinates: CoordinateArgs,
    },
    /// Report image links outside the active tenant's repository
    CheckLinks,
    /// Rewrite the active tenant's image links to its repository
    RepairLinks,
}

/// Coordinate fields to set on the selected tenant.
#[derive(Args, Debug, Default)]
struct CoordinateArgs {
    #[arg(long)]
    owner: Option<String>,
    #[arg(long)]
    repo: Option<String>,
    #[arg(long)]
    branch: Option<String>,
    #[arg(long)]
    token: Option<String>,
}

impl CoordinateArgs {
    /// `existing` with the given fields replaced, or `None` when no field
    /// was given.
    fn apply(self, existing: Option<TenantCoordinates>) -> Option<TenantCoordinates> {
        if self.owner.is_none() && self.repo.is_none() && self.branch.is_none() && self.token.is_none() {
            return None;
        }
        let mut coords = existing.unwrap_or_default();
        if let Some(owner) = self.owner {
            coords.owner = owner;
        }
        if let Some(repo) = self.repo {
            coords.repo = repo;
        }
        if let Some(branch) = self.branch {
            coords = coords.with_branch(branch);
        }
        if let Some(token) = self.token {
            coords = coords.with_token(token);
        }
        Some(coords)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let settings = match &cli.settings {
        Some(path) => load_settings(path)?,
        None => ResolverSettings::default(),
    };
    init_logging(&settings.observability);

    let context = StoreContext::new(settings)?;

    match cli.command {
        Commands::Resolve => {
            let resolution = context.resolver().resolve().await;
            eprintln!(
                "source: {} (generation {})",
                resolution.source.as_str(),
                resolution.generation
            );
            println!("{}", serde_json::to_string_pretty(resolution.config.as_ref())?);
        }
        Commands::Save { file } => {
            let config = read_config(&file)?;
            context.resolver().save_local(config)?;
            println!("Saved {} as local fallback", file.display());
        }
        Commands::Publish { file } => {
            let config = read_config(&file)?;
            match context.resolver().publish(config).await {
                Ok(result) => {
                    let version = result.version.map(|v| v.to_string()).unwrap_or_default();
                    println!("Published (version {})", version);
                }
                Err(e) if e.is_conflict() => {
                    eprintln!("Conflict: {}. Resolve again and re-apply your edits.", e);
                    std::process::exit(2);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Commands::Select {
            tenant,
            coordinates,
        } => {
            let registry = context.registry();
            if let Some(coords) = coordinates.apply(registry.coordinates(&tenant)?) {
                registry.set_coordinates(&tenant, coords)?;
            }
            registry.set_active(&tenant)?;
            println!("Active tenant: {}", tenant);
        }
        Commands::CheckLinks => {
            if context.repair().check_active_tenant()? {
                println!("Some product images point outside the tenant repository");
            } else {
                println!("Image links are consistent");
            }
        }
        Commands::RepairLinks => {
            if context.repair().repair_active_tenant()? {
                println!("Image links corrected");
            } else {
                println!("Nothing to repair (no active tenant, config or repository)");
            }
        }
    }

    Ok(())
}

fn read_config(path: &Path) -> Result<StoreConfig, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}
