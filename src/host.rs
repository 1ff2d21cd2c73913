//! The side-effecting primitives the orchestrators depend on.
//!
//! [`SystemHost`] talks to the network, unpacks archives and spawns
//! processes. Tests substitute a recording implementation so download and
//! build flows can be checked without any of that.

use std::path::Path;

use crate::archive;
use crate::error::Result;
use crate::fetch::{self, Fetched};
use crate::preflight;
use crate::process::{self, CommandSpec};

pub trait ToolchainHost {
    /// Fetch `url` into `dest_dir`, returning the local file.
    fn fetch(&mut self, url: &str, dest_dir: &Path) -> Result<Fetched>;

    /// Extract `archive` into `dest_dir`.
    fn extract(&mut self, archive: &Path, dest_dir: &Path) -> Result<()>;

    /// Run a command to completion; non-zero exit is an error.
    fn run(&mut self, command: &CommandSpec) -> Result<()>;

    /// Verify the host can build the generator.
    fn check_build_tools(&mut self) -> Result<()>;
}

/// The real host.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemHost;

impl ToolchainHost for SystemHost {
    fn fetch(&mut self, url: &str, dest_dir: &Path) -> Result<Fetched> {
        fetch::download_url(url, dest_dir)
    }

    fn extract(&mut self, archive: &Path, dest_dir: &Path) -> Result<()> {
        archive::extract_archive(archive, dest_dir)
    }

    fn run(&mut self, command: &CommandSpec) -> Result<()> {
        process::run(command)
    }

    fn check_build_tools(&mut self) -> Result<()> {
        preflight::check_required_tools(preflight::GENERATOR_TOOLS)
    }
}
