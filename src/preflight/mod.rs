//! Host tool checks run before building crosstool-ng.
//!
//! A missing `make` or compiler otherwise shows up as a confusing failure
//! halfway through `./configure`.

use crate::error::{Result, ToolchainError};

/// Check if a command exists on the host system (in `PATH`).
pub fn command_exists(cmd: &str) -> bool {
    which::which(cmd).is_ok()
}

/// Tools needed to configure and build crosstool-ng.
///
/// Each entry is a list of acceptable commands and the package that provides
/// them; one command per entry is enough.
pub const GENERATOR_TOOLS: &[(&[&str], &str)] = &[
    (&["make", "gmake"], "make"),
    (&["cc", "gcc", "clang"], "gcc"),
    (&["tar"], "tar"),
    (&["patch"], "patch"),
    (&["bison"], "bison"),
    (&["flex"], "flex"),
];

/// Check that at least one command of every entry is available.
pub fn check_required_tools(tools: &[(&[&str], &str)]) -> Result<()> {
    let missing: Vec<String> = tools
        .iter()
        .filter(|(candidates, _)| !candidates.iter().any(|cmd| command_exists(cmd)))
        .map(|(candidates, package)| {
            format!("  {} (install: {})", candidates.join(" or "), package)
        })
        .collect();

    if !missing.is_empty() {
        return Err(ToolchainError::MissingHostTools(missing.join("\n")));
    }
    Ok(())
}
