//! `toolchain build`: build toolchains with crosstool-ng.

use std::fs;

use crate::arch::Arch;
use crate::context::ToolchainContext;
use crate::crosstool::{Crosstool, GeneratorOutcome};
use crate::error::{IoContext, Result, ToolchainError};
use crate::host::ToolchainHost;
use crate::process::ensure_exists;
use crate::state::{self, InstallRecord, InstallSource, PendingInstall};

/// Options for [`build`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildOptions {
    /// Remove each architecture's toolchain before building it.
    pub clean: bool,
    /// Stop once crosstool-ng is built.
    pub crosstool_only: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchOutcome {
    AlreadyPresent,
    Built,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    /// `crosstool_only` was set; no architecture was looked at.
    GeneratorOnly(GeneratorOutcome),
    Toolchains {
        generator: GeneratorOutcome,
        arches: Vec<(Arch, ArchOutcome)>,
    },
}

/// Build toolchains for `arches`, in order.
///
/// crosstool-ng is fetched and compiled first if its directory is missing.
/// A missing per-architecture config file is fatal for the whole run: no
/// build is started for that architecture or any after it.
pub fn build<H: ToolchainHost>(
    ctx: &ToolchainContext,
    host: &mut H,
    arches: &[Arch],
    options: BuildOptions,
) -> Result<BuildOutcome> {
    let layout = &ctx.layout;
    layout.ensure_root()?;
    let _lock = layout.lock()?;

    let crosstool = Crosstool::new(ctx);
    let generator = crosstool.ensure_built(ctx, host)?;
    if options.crosstool_only {
        return Ok(BuildOutcome::GeneratorOnly(generator));
    }

    let ct_ng = crosstool.executable();
    ensure_exists(&ct_ng, "crosstool-ng bootstrap")?;

    let mut outcomes = Vec::with_capacity(arches.len());
    for arch in arches {
        let triplet = ctx.triplet(arch);
        let arch_dir = layout.arch_dir(&triplet);

        if options.clean {
            state::clean(layout, &triplet)?;
        }

        if !state::needs_install(layout, &triplet)? {
            println!("[toolchain:{arch}] Toolchain directory exists: {arch}");
            state::log_existing(layout, &triplet);
            outcomes.push((arch.clone(), ArchOutcome::AlreadyPresent));
            continue;
        }

        let config = layout.config_file(&ctx.host_machine, &triplet);
        if !config.is_file() {
            return Err(ToolchainError::MissingConfig(config));
        }

        let working = layout.working_config();
        fs::copy(&config, &working).io_context(|| {
            format!("copying '{}' to '{}'", config.display(), working.display())
        })?;

        println!("[toolchain:{arch}] Building {triplet} with {}", ct_ng.display());
        let pending = PendingInstall::begin(layout, &triplet)?;
        host.run(&crosstool.build_command(ctx))?;
        ensure_exists(&arch_dir, &format!("ct-ng build for {triplet}"))?;

        pending.finish(&InstallRecord::new(
            arch,
            &triplet,
            InstallSource::Build {
                generator: ctx.settings.crosstool_dirname(),
                config,
            },
        ))?;
        println!("[toolchain:{arch}] installed {}", arch_dir.display());
        outcomes.push((arch.clone(), ArchOutcome::Built));
    }

    Ok(BuildOutcome::Toolchains {
        generator,
        arches: outcomes,
    })
}
