//! Architecture names and the target triplets they map to.
//!
//! Architectures are user input: they are trimmed and lowercased before any
//! lookup, so `X86_64` and `x86_64` are the same architecture. Because the
//! name ends up in directory and file names, only ASCII alphanumerics and `_`
//! are accepted.

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, ToolchainError};

/// Architectures processed when none are given on the command line.
///
/// Callers copy this into a fresh `Vec`; it is never mutated.
pub const DEFAULT_ARCHES: &[&str] = &["x86_64", "aarch64"];

/// A normalized architecture identifier (e.g. `x86_64`, `aarch64`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Arch(String);

impl Arch {
    pub fn parse(value: &str) -> Result<Self> {
        let name = value.trim().to_ascii_lowercase();
        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(ToolchainError::InvalidArch(value.to_string()));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The default architecture list, freshly allocated.
    pub fn defaults() -> Vec<Arch> {
        DEFAULT_ARCHES
            .iter()
            .map(|name| Arch(name.to_string()))
            .collect()
    }
}

impl FromStr for Arch {
    type Err = ToolchainError;

    fn from_str(s: &str) -> Result<Self> {
        Arch::parse(s)
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Operating system family a triplet is formed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Linux,
    Darwin,
    Windows,
}

impl Platform {
    /// The platform this binary was compiled for.
    pub fn host() -> Self {
        if cfg!(target_os = "macos") {
            Platform::Darwin
        } else if cfg!(target_os = "windows") {
            Platform::Windows
        } else {
            Platform::Linux
        }
    }
}

/// Canonical target triplet, e.g. `aarch64-linux-gnu`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Triplet(String);

impl Triplet {
    pub fn for_arch(arch: &Arch, platform: Platform) -> Self {
        let triplet = match platform {
            Platform::Linux => format!("{}-linux-gnu", arch.as_str()),
            Platform::Darwin => format!("{}-macos", arch.as_str()),
            Platform::Windows => format!("{}-win", arch.as_str()),
        };
        Self(triplet)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Triplet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Machine name of the host, as `uname -m` reports it.
///
/// This names the `{host}` URL segment and the `<root>/<host>/` config
/// directory, so it follows the OS spelling: Apple Silicon is `arm64`, not
/// `aarch64`.
pub fn host_machine() -> &'static str {
    machine_name(
        std::env::consts::ARCH,
        std::env::consts::OS,
        cfg!(target_endian = "little"),
    )
}

fn machine_name(arch: &'static str, os: &str, little_endian: bool) -> &'static str {
    match (arch, os) {
        ("x86", _) => "i686",
        ("aarch64", "macos") => "arm64",
        ("powerpc64", _) if little_endian => "ppc64le",
        (other, _) => other,
    }
}
