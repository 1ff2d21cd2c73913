//! `toolchain download`: fetch and unpack prebuilt toolchains.

use std::fs;

use crate::arch::Arch;
use crate::context::ToolchainContext;
use crate::error::Result;
use crate::host::ToolchainHost;
use crate::process::ensure_exists;
use crate::state::{self, InstallRecord, InstallSource, PendingInstall};

/// What happened to one architecture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    AlreadyPresent,
    Downloaded { url: String },
}

/// Download toolchains for `arches`, in order.
///
/// Existing toolchains are skipped without any network access. With `clean`,
/// each architecture's directory is removed first (no-op when missing). The
/// first failure aborts the remaining architectures.
pub fn download<H: ToolchainHost>(
    ctx: &ToolchainContext,
    host: &mut H,
    arches: &[Arch],
    clean: bool,
) -> Result<Vec<(Arch, DownloadOutcome)>> {
    let layout = &ctx.layout;
    layout.ensure_root()?;
    let _lock = layout.lock()?;

    let mut outcomes = Vec::with_capacity(arches.len());
    for arch in arches {
        let triplet = ctx.triplet(arch);
        let arch_dir = layout.arch_dir(&triplet);

        if clean {
            state::clean(layout, &triplet)?;
        }

        if !state::needs_install(layout, &triplet)? {
            println!("[toolchain:{arch}] Toolchain directory exists, skipping {arch}");
            state::log_existing(layout, &triplet);
            outcomes.push((arch.clone(), DownloadOutcome::AlreadyPresent));
            continue;
        }

        let url = ctx.settings.prebuilt_url(&ctx.host_machine, triplet.as_str())?;
        println!("[toolchain:{arch}] Downloading {url}");

        let fetched = host.fetch(&url, layout.root())?;
        let pending = PendingInstall::begin(layout, &triplet)?;
        host.extract(&fetched.path, layout.root())?;
        ensure_exists(&arch_dir, &format!("extracting {}", fetched.path.display()))?;

        // The toolchain directory is what counts; the archive is not kept.
        if let Err(e) = fs::remove_file(&fetched.path) {
            log::warn!("could not remove {}: {}", fetched.path.display(), e);
        }

        pending.finish(&InstallRecord::new(
            arch,
            &triplet,
            InstallSource::Download {
                url: url.clone(),
                archive_sha256: fetched.sha256,
            },
        ))?;
        println!("[toolchain:{arch}] installed {}", arch_dir.display());
        outcomes.push((arch.clone(), DownloadOutcome::Downloaded { url }));
    }

    Ok(outcomes)
}
