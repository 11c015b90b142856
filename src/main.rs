mod config;
mod error;
mod scene;
mod script;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use canvas::catalog;
use canvas::engine::EngineCore;
use canvas::render::build_scene;
use clap::{Args, Parser, Subcommand};

use crate::config::SurfaceConfig;
use crate::error::HostError;
use crate::script::Script;

#[derive(Parser, Debug)]
#[command(name = "reportboard", about = "Report canvas engine host")]
struct Cli {
    /// Grid mode on/off; overrides REPORTBOARD_GRID.
    #[arg(long, global = true, value_parser = clap::builder::BoolishValueParser::new())]
    grid: Option<bool>,

    /// Grid unit; overrides REPORTBOARD_GRID_SIZE.
    #[arg(long, global = true)]
    grid_size: Option<f64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay an interaction script and save the resulting page snapshot.
    Replay(ReplayArgs),
    /// List the widget catalog.
    Catalog {
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
struct ReplayArgs {
    script: PathBuf,

    /// Write the snapshot here instead of stdout.
    #[arg(long, env = "REPORTBOARD_OUT")]
    out: Option<PathBuf>,

    /// Page to save; defaults to the page active when the script ends.
    #[arg(long)]
    page: Option<String>,

    /// Print the final scene to stderr.
    #[arg(long)]
    scene: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "reportboard failed");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), HostError> {
    match cli.command {
        Command::Replay(args) => {
            let config = SurfaceConfig::from_env()?.with_overrides(cli.grid, cli.grid_size);
            run_replay(&config, &args)
        }
        Command::Catalog { json } => run_catalog(json),
    }
}

fn run_replay(config: &SurfaceConfig, args: &ReplayArgs) -> Result<(), HostError> {
    let source = read_file(&args.script)?;
    let script = Script::from_json(&source)?;

    let mut core = EngineCore::new(config.surface()?);
    tracing::info!(
        script = %args.script.display(),
        width = config.width,
        height = config.height,
        grid = config.grid_enabled,
        "replay started"
    );
    let report = script.run(&mut core)?;
    tracing::info!(
        events = report.events,
        created = report.created,
        updated = report.updated,
        deleted = report.deleted,
        "replay finished"
    );

    if args.scene {
        for line in scene::describe(&build_scene(&core), &scene::text_registry()) {
            eprintln!("{line}");
        }
    }

    let page = args.page.clone().unwrap_or_else(|| core.active_page().to_string());
    let snapshot = core.snapshot_json(&page)?;
    match &args.out {
        Some(path) => {
            std::fs::write(path, snapshot + "\n").map_err(|source| io_error(path, source))?;
            tracing::info!(path = %path.display(), page = %page, "snapshot saved");
        }
        None => println!("{snapshot}"),
    }
    Ok(())
}

fn run_catalog(json: bool) -> Result<(), HostError> {
    if json {
        println!("{}", serde_json::to_string_pretty(catalog::entries())?);
        return Ok(());
    }
    for entry in catalog::entries() {
        let (w, h) = entry.footprint();
        println!("{:<16} {:<16} {:>4}x{:<4} {:?}", entry.tag, entry.label, w, h, entry.family);
    }
    Ok(())
}

fn read_file(path: &Path) -> Result<String, HostError> {
    std::fs::read_to_string(path).map_err(|source| io_error(path, source))
}

fn io_error(path: &Path, source: std::io::Error) -> HostError {
    HostError::Io { path: path.display().to_string(), source }
}
