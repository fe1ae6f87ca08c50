use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};
use ramme_core::{ManualClock, MemoryStorage, Storage};
use ramme_dash::config::{load_manifest, Settings};
use ramme_dash::core::{DashboardRuntime, FileStorage, PageView};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// ramme - render, simulate and seed manifest-driven dashboards
#[derive(Parser, Debug)]
#[command(name = "ramme")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Debug verbosity level (0=quiet, 1=info, 2=debug, 3=trace)
    #[arg(
        short = 'd',
        long = "debug",
        value_name = "LEVEL",
        default_value = "0",
        global = true
    )]
    debug: u8,

    /// Settings file (defaults to the platform config directory)
    #[arg(long = "config", value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Data lake directory (overrides the settings file)
    #[arg(long = "data-dir", value_name = "PATH", global = true)]
    data_dir: Option<PathBuf>,

    /// Keep collections in memory only; nothing is written to disk
    #[arg(long = "ephemeral", global = true)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check a manifest for structural problems
    Validate {
        #[arg(value_name = "MANIFEST")]
        manifest: PathBuf,
    },
    /// Render one page and print its view tree as JSON
    Render {
        #[arg(value_name = "MANIFEST")]
        manifest: PathBuf,
        /// Page id to render
        #[arg(short = 'p', long = "page")]
        page: String,
    },
    /// Run the simulator and workflow engine for a number of ticks
    Simulate {
        #[arg(value_name = "MANIFEST")]
        manifest: PathBuf,
        #[arg(short = 't', long = "ticks", default_value = "10")]
        ticks: u32,
        /// Fixed RNG seed for reproducible runs
        #[arg(long = "seed")]
        seed: Option<u64>,
    },
    /// Seed the data lake, or reset it so the next access re-seeds
    Seed {
        #[arg(value_name = "MANIFEST")]
        manifest: PathBuf,
        #[arg(long = "reset")]
        reset: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Level 0 (default): warn only, 1: info, 2: debug, 3+: trace
    let log_level = match cli.debug {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    // Allow RUST_LOG to override CLI setting
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    info!("Starting ramme v{}", env!("CARGO_PKG_VERSION"));

    let mut settings = match &cli.config {
        Some(path) => Settings::load_from_path(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => Settings::load().unwrap_or_else(|e| {
            warn!("Failed to load settings, using defaults: {}", e);
            Settings::default()
        }),
    };
    if let Some(dir) = &cli.data_dir {
        settings.data_dir = Some(dir.clone());
    }

    match &cli.command {
        Command::Validate { manifest } => validate(manifest),
        Command::Render { manifest, page } => {
            let runtime = runtime(manifest, settings, cli.ephemeral)?.simulate(false).build();
            match runtime.render_page(page) {
                PageView::NotFound { page_id } => bail!("Page '{}' not found", page_id),
                view => {
                    println!("{}", serde_json::to_string_pretty(&view)?);
                    Ok(())
                }
            }
        }
        Command::Simulate {
            manifest,
            ticks,
            seed,
        } => {
            let start = chrono::Utc::now().timestamp_millis().max(0) as u64;
            let clock = Arc::new(ManualClock::new(start));
            let interval = settings.simulation_interval();
            let mut builder = runtime(manifest, settings, cli.ephemeral)?
                .clock(clock.clone())
                .simulate(true);
            if let Some(seed) = seed {
                builder = builder.simulation_seed(*seed);
            }
            let runtime = builder.build();

            for tick in 0..*ticks {
                runtime.tick();
                clock.advance(interval);
                info!("Tick {} complete", tick + 1);
            }
            let snapshot = runtime.store().snapshot();
            let mut ids: Vec<&String> = snapshot.keys().collect();
            ids.sort();
            for id in ids {
                let value = &snapshot[id].value;
                println!("{:<24} {}", id, value);
            }
            Ok(())
        }
        Command::Seed { manifest, reset } => {
            let runtime = runtime(manifest, settings, cli.ephemeral)?.simulate(false).build();
            if *reset {
                runtime.data().reset();
                println!("Data lake reset");
            } else {
                let seeded = runtime.data().initialize();
                println!("Seeded {} collections", seeded);
            }
            for collection in runtime.data().persisted_collections() {
                println!("  {}", collection);
            }
            Ok(())
        }
    }
}

fn validate(path: &Path) -> Result<()> {
    let manifest = load_manifest(path)?;
    let issues = manifest.validate();
    if issues.is_empty() {
        println!("{}: OK", path.display());
        return Ok(());
    }
    for issue in &issues {
        println!("{}: {}", path.display(), issue);
    }
    bail!("{} issue(s) found", issues.len())
}

fn runtime(
    manifest: &Path,
    settings: Settings,
    ephemeral: bool,
) -> Result<ramme_dash::RuntimeBuilder> {
    let manifest = Arc::new(load_manifest(manifest)?);
    let storage: Arc<dyn Storage> = if ephemeral {
        Arc::new(MemoryStorage::new())
    } else {
        let dir = settings.resolve_data_dir()?;
        info!("Using data lake at {}", dir.display());
        let storage = FileStorage::open(&dir)
            .with_context(|| format!("Failed to open data lake {}", dir.display()))?;
        Arc::new(storage)
    };
    Ok(DashboardRuntime::builder(manifest, settings).storage(storage))
}
