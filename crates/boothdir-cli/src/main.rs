use anyhow::{Context, Result};
use boothdir_core::config::BoothConfig;
use boothdir_core::engine::{DIRECTORY_KEY, DIRECTORY_SECTION, DateFolderEngine, DiskSync};
use chrono::{Local, NaiveDateTime};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "boothdir", version)]
#[command(about = "Dated save directories for photo-booth configurations")]
struct Cli {
    /// Booth configuration file (defaults to the standard location).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one wait-state pass and print the published directory list
    Tick {
        /// Also rewrite the directory line in the configuration file
        #[arg(long)]
        persist: bool,
        /// Evaluate at this instant instead of now (e.g. 2024-01-15T09:59)
        #[arg(long)]
        at: Option<String>,
    },
    /// Show the resolved base directories
    Bases,
    /// Restore the un-dated base directories into the configuration file
    Restore,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let path = cli
        .config
        .clone()
        .or_else(BoothConfig::default_path)
        .context("unable to determine the configuration path")?;
    let mut cfg = BoothConfig::load(&path)
        .with_context(|| format!("loading configuration {}", path.display()))?;

    match cli.command {
        Commands::Tick { persist, at } => {
            let sync = if persist {
                DiskSync::Persist
            } else {
                DiskSync::InMemoryOnly
            };
            let mut engine = DateFolderEngine::new(sync);
            engine.on_configure(&mut cfg);
            engine.on_startup(&cfg);
            let now = match at {
                Some(raw) => NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M")
                    .with_context(|| format!("invalid --at value {raw:?}"))?,
                None => Local::now().naive_local(),
            };
            engine.tick_at(&mut cfg, now);
            println!(
                "{}",
                cfg.get(DIRECTORY_SECTION, DIRECTORY_KEY).unwrap_or_default()
            );
        }
        Commands::Bases => {
            let mut engine = DateFolderEngine::new(DiskSync::InMemoryOnly);
            engine.on_configure(&mut cfg);
            for base in engine.bases() {
                println!("{} -> {}", base.display, base.canonical.display());
            }
        }
        Commands::Restore => {
            let mut engine = DateFolderEngine::new(DiskSync::InMemoryOnly);
            engine.on_configure(&mut cfg);
            engine.on_cleanup(&mut cfg);
            cfg.save()
                .with_context(|| format!("writing configuration {}", path.display()))?;
            println!(
                "{}",
                cfg.get(DIRECTORY_SECTION, DIRECTORY_KEY).unwrap_or_default()
            );
        }
    }
    Ok(())
}
