//! mayflower - cross toolchain manager
//!
//! Usage:
//!   mayflower toolchain download [--arch riscv64]... [--clean]
//!   mayflower toolchain build [--arch x86_64]... [--clean] [--crosstool-only]
//!
//! Toolchains land in `<root>/<triplet>`. The root defaults to
//! `$MAYFLOWER_DATA/toolchain`, then `~/.local/mayflower/toolchain`.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mayflower::build::{ArchOutcome, BuildOutcome};
use mayflower::crosstool::GeneratorOutcome;
use mayflower::download::DownloadOutcome;
use mayflower::layout::default_toolchain_root;
use mayflower::settings::SETTINGS_FILENAME;
use mayflower::{
    run_toolchain, Settings, SystemHost, ToolchainContext, ToolchainLayout, ToolchainOutcome,
    ToolchainRequest,
};

#[derive(Parser)]
#[command(name = "mayflower")]
#[command(about = "Download or build mayflower cross toolchains")]
struct Cli {
    #[command(subcommand)]
    area: Area,
}

#[derive(Subcommand)]
enum Area {
    /// Manage per-architecture cross toolchains
    Toolchain(ToolchainArgs),
}

#[derive(clap::Args)]
struct ToolchainArgs {
    /// download | build
    command: String,

    /// Target architecture; repeat for several (default: x86_64, aarch64)
    #[arg(long = "arch", value_name = "ARCH")]
    arches: Vec<String>,

    /// Remove each architecture's toolchain before installing it
    #[arg(long)]
    clean: bool,

    /// Stop after crosstool-ng is built (build only)
    #[arg(long)]
    crosstool_only: bool,

    /// Toolchain root directory
    #[arg(long, env = "MAYFLOWER_TOOLCHAIN_ROOT", value_name = "DIR")]
    toolchain_root: Option<PathBuf>,

    /// Settings file (default: <root>/toolchain.toml when present)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let result = match cli.area {
        Area::Toolchain(args) => toolchain(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}

fn toolchain(args: ToolchainArgs) -> Result<()> {
    let request =
        ToolchainRequest::parse(&args.command, &args.arches, args.clean, args.crosstool_only)?;

    let root = args.toolchain_root.unwrap_or_else(default_toolchain_root);
    let settings = match &args.config {
        Some(path) => Settings::load(path)
            .with_context(|| format!("loading settings '{}'", path.display()))?,
        None => Settings::load_or_default(&root.join(SETTINGS_FILENAME))?,
    };
    let ctx = ToolchainContext::for_host(ToolchainLayout::new(root), settings);

    let outcome = run_toolchain(&ctx, &mut SystemHost, &request)
        .with_context(|| format!("toolchain {} failed", request.command))?;
    report(&ctx, &outcome);
    Ok(())
}

fn report(ctx: &ToolchainContext, outcome: &ToolchainOutcome) {
    let root = ctx.layout.root().display();
    match outcome {
        ToolchainOutcome::Downloaded(arches) => {
            let fetched = arches
                .iter()
                .filter(|(_, o)| matches!(o, DownloadOutcome::Downloaded { .. }))
                .count();
            println!(
                "[toolchain] {fetched} downloaded, {} already present in {root}",
                arches.len() - fetched
            );
        }
        ToolchainOutcome::Built(BuildOutcome::GeneratorOnly(generator)) => {
            let state = match generator {
                GeneratorOutcome::AlreadyBuilt => "already built",
                GeneratorOutcome::BuiltNow => "built",
            };
            println!("[toolchain:crosstool-ng] {state}; stopping (--crosstool-only)");
        }
        ToolchainOutcome::Built(BuildOutcome::Toolchains { arches, .. }) => {
            let built = arches
                .iter()
                .filter(|(_, o)| *o == ArchOutcome::Built)
                .count();
            println!(
                "[toolchain] {built} built, {} already present in {root}",
                arches.len() - built
            );
        }
    }
}
