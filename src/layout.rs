//! Toolchain root resolution and the paths derived from it.

use fs2::FileExt;
use std::env;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use crate::arch::Triplet;
use crate::error::{IoContext, Result, ToolchainError};

/// Overrides the data directory the default toolchain root lives under.
pub const DATA_DIR_ENV: &str = "MAYFLOWER_DATA";

/// Working configuration file the generator reads, relative to the root.
pub const WORKING_CONFIG: &str = ".config";

const LOCK_FILENAME: &str = ".mayflower.lock";

/// Default toolchain root when none is given explicitly.
///
/// Resolution order:
/// 1. `$MAYFLOWER_DATA/toolchain`
/// 2. `<home>/.local/mayflower/toolchain`
/// 3. `/tmp/mayflower/toolchain` when no home directory is known
pub fn default_toolchain_root() -> PathBuf {
    let data_dir = env::var_os(DATA_DIR_ENV)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            dirs::home_dir()
                .map(|home| home.join(".local"))
                .unwrap_or_else(|| PathBuf::from("/tmp"))
                .join("mayflower")
        });
    data_dir.join("toolchain")
}

/// Directory layout under a toolchain root.
#[derive(Debug, Clone)]
pub struct ToolchainLayout {
    root: PathBuf,
}

impl ToolchainLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the root (and parents) if it does not exist yet.
    pub fn ensure_root(&self) -> Result<()> {
        if !self.root.is_dir() {
            log::info!("creating toolchain root {}", self.root.display());
        }
        fs::create_dir_all(&self.root)
            .io_context(|| format!("creating toolchain root '{}'", self.root.display()))
    }

    /// `<root>/<triplet>`: where a finished toolchain lives.
    pub fn arch_dir(&self, triplet: &Triplet) -> PathBuf {
        self.root.join(triplet.as_str())
    }

    /// Marker present while a toolchain is being installed.
    pub fn pending_marker(&self, triplet: &Triplet) -> PathBuf {
        self.root.join(format!(".{}.pending", triplet.as_str()))
    }

    /// Record written after a toolchain was installed.
    pub fn install_record(&self, triplet: &Triplet) -> PathBuf {
        self.root.join(format!("{}.install.json", triplet.as_str()))
    }

    /// `<root>/<host machine>/<triplet>-ct-ng.config`
    pub fn config_file(&self, host_machine: &str, triplet: &Triplet) -> PathBuf {
        self.root
            .join(host_machine)
            .join(format!("{}-ct-ng.config", triplet.as_str()))
    }

    pub fn working_config(&self) -> PathBuf {
        self.root.join(WORKING_CONFIG)
    }

    pub fn generator_dir(&self, dirname: &str) -> PathBuf {
        self.root.join(dirname)
    }

    /// Take the exclusive lock on this root, failing fast if another
    /// process holds it. The lock is released when the guard drops.
    pub fn lock(&self) -> Result<RootLock> {
        let path = self.root.join(LOCK_FILENAME);
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .io_context(|| format!("opening lock file '{}'", path.display()))?;

        if file.try_lock_exclusive().is_err() {
            return Err(ToolchainError::Locked(path));
        }
        log::debug!("locked {}", path.display());
        Ok(RootLock { file, path })
    }
}

/// RAII guard for the toolchain root lock.
#[derive(Debug)]
pub struct RootLock {
    file: File,
    path: PathBuf,
}

impl Drop for RootLock {
    fn drop(&mut self) {
        // Leave the file in place; unlinking a locked file lets a second
        // process lock a different inode at the same path.
        let _ = FileExt::unlock(&self.file);
        log::debug!("unlocked {}", self.path.display());
    }
}
