//! Per-architecture install state.
//!
//! A toolchain is `Absent`, `InProgress` or `Present`. The in-progress state
//! is a marker file next to the toolchain directory, written before anything
//! is unpacked or built into it and removed once that finished. A directory
//! without a marker is a finished toolchain. A marker without a directory is
//! left over from a run that failed before writing anything, so the toolchain
//! is simply absent.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::arch::{Arch, Triplet};
use crate::error::{IoContext, Result, ToolchainError};
use crate::layout::ToolchainLayout;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallStatus {
    Absent,
    InProgress,
    Present,
}

pub fn install_status(layout: &ToolchainLayout, triplet: &Triplet) -> InstallStatus {
    if !layout.arch_dir(triplet).exists() {
        InstallStatus::Absent
    } else if layout.pending_marker(triplet).exists() {
        InstallStatus::InProgress
    } else {
        InstallStatus::Present
    }
}

/// How a toolchain got onto disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InstallSource {
    Download { url: String, archive_sha256: String },
    Build { generator: String, config: PathBuf },
}

impl fmt::Display for InstallSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallSource::Download { url, .. } => write!(f, "{url}"),
            InstallSource::Build { generator, config } => {
                write!(f, "{generator} with {}", config.display())
            }
        }
    }
}

/// Written to `<root>/<triplet>.install.json` after a successful install.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallRecord {
    pub arch: String,
    pub triplet: String,
    pub source: InstallSource,
    pub installed_at_utc: String,
}

impl InstallRecord {
    pub fn new(arch: &Arch, triplet: &Triplet, source: InstallSource) -> Self {
        let installed_at_utc = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_else(|_| "unknown".to_string());
        Self {
            arch: arch.to_string(),
            triplet: triplet.to_string(),
            source,
            installed_at_utc,
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let bytes =
            fs::read(path).io_context(|| format!("reading install record '{}'", path.display()))?;
        serde_json::from_slice(&bytes).map_err(|e| {
            ToolchainError::io(
                format!("parsing install record '{}'", path.display()),
                e.into(),
            )
        })
    }

    fn write(&self, path: &Path) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(self).map_err(|e| {
            ToolchainError::io(
                format!("encoding install record '{}'", path.display()),
                e.into(),
            )
        })?;
        fs::write(path, bytes)
            .io_context(|| format!("writing install record '{}'", path.display()))
    }
}

/// Holds the pending marker for one architecture while it is installed.
///
/// The marker is only removed by [`PendingInstall::finish`]; if the install
/// fails or the process dies, it stays behind and the next run reports the
/// toolchain as [`InstallStatus::InProgress`].
#[derive(Debug)]
pub struct PendingInstall {
    marker: PathBuf,
    record: PathBuf,
}

impl PendingInstall {
    pub fn begin(layout: &ToolchainLayout, triplet: &Triplet) -> Result<Self> {
        let marker = layout.pending_marker(triplet);
        fs::write(&marker, triplet.as_str())
            .io_context(|| format!("writing pending marker '{}'", marker.display()))?;
        Ok(Self {
            marker,
            record: layout.install_record(triplet),
        })
    }

    pub fn finish(self, record: &InstallRecord) -> Result<()> {
        record.write(&self.record)?;
        fs::remove_file(&self.marker)
            .io_context(|| format!("removing pending marker '{}'", self.marker.display()))
    }
}

/// Remove a toolchain directory and its bookkeeping files. Missing files are
/// not an error.
pub fn clean(layout: &ToolchainLayout, triplet: &Triplet) -> Result<()> {
    let dir = layout.arch_dir(triplet);
    if dir.exists() {
        log::info!("removing {}", dir.display());
        fs::remove_dir_all(&dir)
            .io_context(|| format!("removing toolchain directory '{}'", dir.display()))?;
    }
    for file in [layout.pending_marker(triplet), layout.install_record(triplet)] {
        if file.exists() {
            fs::remove_file(&file).io_context(|| format!("removing '{}'", file.display()))?;
        }
    }
    Ok(())
}

/// Log where an existing toolchain came from, when it has a record.
pub(crate) fn log_existing(layout: &ToolchainLayout, triplet: &Triplet) {
    let path = layout.install_record(triplet);
    if !path.is_file() {
        return;
    }
    match InstallRecord::load(&path) {
        Ok(record) => log::info!(
            "{} installed {} from {}",
            record.triplet,
            record.installed_at_utc,
            record.source
        ),
        Err(e) => log::warn!("{e}"),
    }
}

/// Turn a status into "should we do the work?", failing on `InProgress`.
pub(crate) fn needs_install(layout: &ToolchainLayout, triplet: &Triplet) -> Result<bool> {
    match install_status(layout, triplet) {
        InstallStatus::Absent => {
            let marker = layout.pending_marker(triplet);
            if marker.exists() {
                log::debug!("removing stale marker {}", marker.display());
                fs::remove_file(&marker)
                    .io_context(|| format!("removing stale marker '{}'", marker.display()))?;
            }
            Ok(true)
        }
        InstallStatus::Present => Ok(false),
        InstallStatus::InProgress => Err(ToolchainError::Incomplete {
            triplet: triplet.to_string(),
            marker: layout.pending_marker(triplet),
        }),
    }
}
