//! External command descriptions and execution.
//!
//! Commands always get an explicit working directory; the process's own
//! current directory is never changed, so a failing step cannot leave later
//! path resolution pointing somewhere unexpected.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{Result, ToolchainError};

/// A command to run: program, arguments, working directory and extra
/// environment on top of the inherited one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub cwd: PathBuf,
    pub env: Vec<(String, OsString)>,
}

impl CommandSpec {
    pub fn new(program: impl Into<PathBuf>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.into(),
            env: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<OsString>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Value of an environment override, if set.
    #[cfg(test)]
    pub(crate) fn env_value(&self, key: &str) -> Option<&OsString> {
        self.env
            .iter()
            .rev()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value)
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Run a command to completion with inherited stdio.
///
/// A non-zero exit is returned as [`ToolchainError::CommandFailed`].
pub fn run(spec: &CommandSpec) -> Result<()> {
    log::debug!("[run] ({}) {}", spec.cwd.display(), spec);

    let mut cmd = Command::new(&spec.program);
    cmd.args(&spec.args)
        .current_dir(&spec.cwd)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());
    for (key, value) in &spec.env {
        cmd.env(key, value);
    }

    let status = cmd.status().map_err(|source| ToolchainError::CommandSpawn {
        command: spec.to_string(),
        source,
    })?;

    if !status.success() {
        return Err(ToolchainError::CommandFailed {
            command: spec.to_string(),
            code: status.code().unwrap_or(-1),
        });
    }
    Ok(())
}

/// Fail with a descriptive error when `path` does not exist.
pub fn ensure_exists(path: &Path, what: &str) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    Err(ToolchainError::MissingOutput {
        what: what.to_string(),
        path: path.to_path_buf(),
    })
}
