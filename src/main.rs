//! mhwmm - REFramework manager for Monster Hunter Wilds

use std::error::Error;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::Value;

use mhwmm_rust::catalog::{ReleaseCatalog, ReleaseRecord, UpdateCheck};
use mhwmm_rust::config::{ConfigStore, KEY_GAME_PATH};
use mhwmm_rust::context::AppContext;
use mhwmm_rust::games::validate_game_path;
use mhwmm_rust::http::HttpClient;
use mhwmm_rust::installers::{install_release, InstallPlan, TaskContext};

#[derive(Parser)]
#[command(name = "mhwmm")]
#[command(author, version, about = "REFramework manager for Monster Hunter Wilds")]
struct Cli {
    /// Write debug lines to the log
    #[arg(long, global = true)]
    debug: bool,

    /// Config file to use instead of the one in the data directory
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available REFramework nightly builds
    Releases {
        /// Page to show, starting at 1
        #[arg(long, default_value_t = 1)]
        page: usize,
        /// Releases per page
        #[arg(long, default_value_t = 10)]
        per_page: usize,
    },
    /// Find a release by build number or tag
    Search {
        /// Build number (1090) or full tag (nightly-01090-abc)
        query: String,
    },
    /// Check whether a newer build than the installed one exists
    Check,
    /// Install a build into the configured game directory
    Install {
        /// Build number or tag; the newest build when omitted
        query: Option<String>,
        /// TOML install plan overriding the built-in one
        #[arg(long)]
        plan: Option<PathBuf>,
    },
    /// Read or change config values
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Game installation settings
    Game {
        #[command(subcommand)]
        command: GameCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the value at a dotted key
    Get { key: String },
    /// Store a value at a dotted key (parsed as JSON, otherwise a string)
    Set { key: String, value: String },
}

#[derive(Subcommand)]
enum GameCommands {
    /// Set the Monster Hunter Wilds installation directory
    Set { path: String },
}

fn main() {
    let cli = Cli::parse();
    let ctx = AppContext::new(cli.debug);
    ctx.logger.info("mhwmm starting up...");

    if let Err(e) = run(&ctx, cli) {
        ctx.logger.error(&e.to_string());
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(ctx: &AppContext, cli: Cli) -> Result<(), Box<dyn Error>> {
    let mut store = match &cli.config {
        Some(path) => ConfigStore::app_at(ctx, path),
        None => ConfigStore::app(ctx),
    };
    store.load()?;

    match cli.command {
        Commands::Releases { page, per_page } => {
            let catalog = fetch_catalog(ctx, &store)?;
            let pages = catalog.page_count(per_page);
            for release in catalog.page(per_page, page) {
                print_release(&release);
            }
            println!("Page {} of {} ({} releases)", page, pages, catalog.len());
        }
        Commands::Search { query } => {
            let catalog = fetch_catalog(ctx, &store)?;
            match catalog.search(&query)? {
                Some(release) => print_release(&release),
                None => println!("No release matches '{}'", query),
            }
        }
        Commands::Check => {
            let catalog = fetch_catalog(ctx, &store)?;
            match catalog.check_for_update_from(&store) {
                UpdateCheck::Available { installed, latest } => println!(
                    "Update available: build {} -> {} ({})",
                    installed, latest.version, latest.tag
                ),
                UpdateCheck::UpToDate => println!("REFramework is up to date"),
                UpdateCheck::Skipped => println!("Update check skipped (nothing installed or no releases)"),
            }
        }
        Commands::Install { query, plan } => {
            let catalog = fetch_catalog(ctx, &store)?;
            let release = match query {
                Some(q) => catalog.search(&q)?.ok_or(format!("No release matches '{}'", q))?,
                None => catalog.latest().ok_or("The release feed is empty")?,
            };
            let plan = match plan {
                Some(path) => InstallPlan::from_file(&path)?,
                None => InstallPlan::reframework(),
            };

            let cancel = Arc::new(AtomicBool::new(false));
            let flag = cancel.clone();
            if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed)) {
                ctx.logger.warning(&format!("Could not install Ctrl-C handler: {}", e));
            }

            let task = TaskContext::new(
                |status| eprintln!("{}", status),
                |done, total| {
                    eprint!("\r  {:>3}% ({} / {} bytes)", done * 100 / total.max(1), done, total);
                    if done >= total {
                        eprintln!();
                    }
                    let _ = std::io::stderr().flush();
                },
                cancel,
            );

            let http = HttpClient::from_config(&store);
            let report = install_release(ctx, &mut store, http, &release, &plan, task)?;
            println!(
                "Installed {} (build {}): {} copied, {} skipped, {} cleaned up",
                release.tag,
                release.version,
                report.deployed.applied.len(),
                report.deployed.skipped.len(),
                report.cleaned.len()
            );
        }
        Commands::Config { command } => match command {
            ConfigCommands::Get { key } => match store.get_value(&key) {
                Some(value) => println!("{}", serde_json::to_string_pretty(value)?),
                None => return Err(format!("Config key '{}' is not set", key).into()),
            },
            ConfigCommands::Set { key, value } => {
                let value = serde_json::from_str::<Value>(&value).unwrap_or_else(|_| Value::String(value));
                store.set(&key, value, true)?;
                println!("Saved {}", key);
            }
        },
        Commands::Game { command } => match command {
            GameCommands::Set { path } => {
                let root = validate_game_path(&path)?;
                store.set(KEY_GAME_PATH, root.to_string_lossy().to_string(), true)?;
                println!("Game path set to {}", root.display());
            }
        },
    }

    Ok(())
}

fn fetch_catalog(ctx: &AppContext, store: &ConfigStore) -> Result<ReleaseCatalog, Box<dyn Error>> {
    let mut catalog = ReleaseCatalog::new(ctx, HttpClient::from_config(store));
    catalog.refresh()?;
    Ok(catalog)
}

fn print_release(release: &ReleaseRecord) {
    println!(
        "{:>6}  {:<28} {}",
        release.version, release.tag, release.published_at
    );
}
