//! ovhdeploy CLI - Upload a build output tree to OVH Object Storage.
//!
//! This tool reads a JSON deploy configuration, optionally overridden from
//! the command line or environment, and runs a differential upload.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use ovhdeploy_common::Secret;
use ovhdeploy_deploy::{ConfigFile, DeployConfig, DeployPlugin};

#[derive(Parser)]
#[command(name = "ovhdeploy")]
#[command(about = "ovhdeploy - Differential uploads to OVH Object Storage")]
#[command(version)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload the build output.
    Upload(DeployArgs),

    /// Show which files an upload would transfer, without uploading.
    Plan(DeployArgs),
}

#[derive(Args)]
struct DeployArgs {
    /// Path to the JSON deploy configuration.
    #[arg(short, long, default_value = "ovhdeploy.json")]
    config: PathBuf,

    /// OVH application key.
    #[arg(long, env = "OVH_APP_KEY")]
    app_key: Option<String>,

    /// OVH application secret.
    #[arg(long, env = "OVH_APP_SECRET", hide_env_values = true)]
    app_secret: Option<String>,

    /// OVH consumer key.
    #[arg(long, env = "OVH_CONSUMER_KEY", hide_env_values = true)]
    consumer_key: Option<String>,

    /// Build output directory.
    #[arg(short, long)]
    dist_dir: Option<PathBuf>,

    /// Remote prefix inside the container.
    #[arg(short, long)]
    prefix: Option<String>,

    /// Manifest path for differential deploys.
    #[arg(short, long)]
    manifest: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Upload(args) => cmd_upload(args).await,
        Commands::Plan(args) => cmd_plan(args).await,
    }
}

/// Load the config file and apply command line overrides.
async fn load_config(args: DeployArgs) -> Result<DeployConfig> {
    let mut file = ConfigFile::load(&args.config)
        .await
        .with_context(|| format!("Failed to load {}", args.config.display()))?;

    if let Some(app_key) = args.app_key {
        file.app_key = Some(app_key);
    }
    if let Some(app_secret) = args.app_secret {
        file.app_secret = Some(Secret::new(app_secret));
    }
    if let Some(consumer_key) = args.consumer_key {
        file.consumer_key = Some(Secret::new(consumer_key));
    }
    if let Some(dist_dir) = args.dist_dir {
        file.dist_dir = Some(dist_dir);
    }
    if let Some(prefix) = args.prefix {
        file.prefix = Some(prefix);
    }
    if let Some(manifest) = args.manifest {
        file.manifest_path = Some(manifest);
    }

    DeployConfig::resolve(file).context("Invalid deploy configuration")
}

/// Run an upload.
async fn cmd_upload(args: DeployArgs) -> Result<()> {
    let config = load_config(args).await?;
    info!(
        "Uploading {} to container `{}` in {}",
        config.dist_dir.display(),
        config.container,
        config.region
    );

    let plugin = DeployPlugin::from_config(config)?;
    let report = plugin.upload().await.context("Upload failed")?;

    for file in &report.files_uploaded {
        println!("  {}", file);
    }
    println!("Successfully uploaded {} files.", report.files_uploaded.len());

    Ok(())
}

/// Print the upload plan.
async fn cmd_plan(args: DeployArgs) -> Result<()> {
    let config = load_config(args).await?;
    let plugin = DeployPlugin::from_config(config)?;

    let (endpoint, plan) = plugin.plan().await.context("Planning failed")?;

    println!("Storage: {}", endpoint.base_url);
    if plan.is_empty() {
        println!("Nothing to upload.");
    } else {
        println!("Files to upload:");
        for file in plan.files() {
            println!("  {}", file);
        }
    }

    Ok(())
}
