//! Dispatch of the `toolchain` sub-command.

use std::fmt;
use std::str::FromStr;

use crate::arch::Arch;
use crate::build::{self, BuildOptions, BuildOutcome};
use crate::context::ToolchainContext;
use crate::download::{self, DownloadOutcome};
use crate::error::{Result, ToolchainError};
use crate::host::ToolchainHost;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolchainCommand {
    Download,
    Build,
}

impl FromStr for ToolchainCommand {
    type Err = ToolchainError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "download" => Ok(ToolchainCommand::Download),
            "build" => Ok(ToolchainCommand::Build),
            _ => Err(ToolchainError::UnknownCommand(s.to_string())),
        }
    }
}

impl fmt::Display for ToolchainCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ToolchainCommand::Download => "download",
            ToolchainCommand::Build => "build",
        })
    }
}

/// A parsed `toolchain` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainRequest {
    pub command: ToolchainCommand,
    pub arches: Vec<Arch>,
    pub clean: bool,
    pub crosstool_only: bool,
}

impl ToolchainRequest {
    /// Build a request from raw strings; an empty `arches` means the defaults.
    pub fn parse(
        command: &str,
        arches: &[String],
        clean: bool,
        crosstool_only: bool,
    ) -> Result<Self> {
        let command = command.parse()?;
        let arches = if arches.is_empty() {
            Arch::defaults()
        } else {
            arches
                .iter()
                .map(|a| Arch::parse(a))
                .collect::<Result<Vec<_>>>()?
        };
        Ok(Self {
            command,
            arches,
            clean,
            crosstool_only,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolchainOutcome {
    Downloaded(Vec<(Arch, DownloadOutcome)>),
    Built(BuildOutcome),
}

/// Run a `toolchain` request to completion.
pub fn run_toolchain<H: ToolchainHost>(
    ctx: &ToolchainContext,
    host: &mut H,
    request: &ToolchainRequest,
) -> Result<ToolchainOutcome> {
    log::debug!(
        "toolchain {} arches={:?} clean={} crosstool_only={} root={}",
        request.command,
        request.arches.iter().map(Arch::as_str).collect::<Vec<_>>(),
        request.clean,
        request.crosstool_only,
        ctx.layout.root().display()
    );

    match request.command {
        ToolchainCommand::Download => {
            if request.crosstool_only {
                log::warn!("--crosstool-only only applies to `build`; ignoring it");
            }
            download::download(ctx, host, &request.arches, request.clean)
                .map(ToolchainOutcome::Downloaded)
        }
        ToolchainCommand::Build => {
            let options = BuildOptions {
                clean: request.clean,
                crosstool_only: request.crosstool_only,
            };
            build::build(ctx, host, &request.arches, options).map(ToolchainOutcome::Built)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arch::Platform;
    use crate::crosstool::Crosstool;
    use crate::host::testing::FakeHost;
    use crate::layout::ToolchainLayout;
    use crate::settings::Settings;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    fn context(root: &Path) -> ToolchainContext {
        ToolchainContext {
            layout: ToolchainLayout::new(root),
            settings: Settings::default(),
            host_machine: "x86_64".to_string(),
            platform: Platform::Linux,
        }
    }

    #[test]
    fn test_parse_command() {
        assert_eq!(
            "download".parse::<ToolchainCommand>().unwrap(),
            ToolchainCommand::Download
        );
        assert_eq!(
            "BUILD".parse::<ToolchainCommand>().unwrap(),
            ToolchainCommand::Build
        );
        assert!(matches!(
            "install".parse::<ToolchainCommand>(),
            Err(ToolchainError::UnknownCommand(_))
        ));
    }

    #[test]
    fn test_request_defaults_and_replacement() {
        let req = ToolchainRequest::parse("download", &[], false, false).unwrap();
        assert_eq!(req.arches, Arch::defaults());

        let req = ToolchainRequest::parse("download", &["RISCV64".to_string()], false, false)
            .unwrap();
        assert_eq!(req.arches, vec![Arch::parse("riscv64").unwrap()]);

        assert!(ToolchainRequest::parse("build", &["x86/64".to_string()], false, false).is_err());
    }

    #[test]
    fn test_download_riscv64_end_to_end() {
        let tmp = TempDir::new().unwrap();
        let ctx = context(&tmp.path().join("toolchain"));
        let mut host = FakeHost {
            extract_creates: vec![(
                "riscv64-linux-gnu.tar.xz".into(),
                vec![PathBuf::from("riscv64-linux-gnu")],
            )],
            ..FakeHost::default()
        };
        let req = ToolchainRequest::parse("download", &["riscv64".into()], false, false).unwrap();

        let outcome = run_toolchain(&ctx, &mut host, &req).unwrap();

        assert!(ctx.layout.root().is_dir());
        assert_eq!(host.fetches().len(), 1);
        assert_eq!(host.extracts(), 1);
        assert!(matches!(outcome, ToolchainOutcome::Downloaded(ref v) if v.len() == 1));
    }

    #[test]
    fn test_build_existing_end_to_end() {
        let tmp = TempDir::new().unwrap();
        let ctx = context(tmp.path());
        fs::create_dir_all(Crosstool::new(&ctx).executable()).unwrap();
        fs::create_dir_all(tmp.path().join("x86_64-linux-gnu")).unwrap();
        let mut host = FakeHost::default();
        let req = ToolchainRequest::parse("build", &["x86_64".into()], false, false).unwrap();

        run_toolchain(&ctx, &mut host, &req).unwrap();

        assert!(host.runs().is_empty());
    }

    #[test]
    fn test_crosstool_only_end_to_end() {
        let tmp = TempDir::new().unwrap();
        let ctx = context(tmp.path());
        let ct_dir = Crosstool::new(&ctx).dir;
        let mut host = FakeHost {
            extract_creates: vec![(
                "crosstool-ng-1.25.0.tar.xz".into(),
                vec!["crosstool-ng-1.25.0".into()],
            )],
            run_creates: vec![("make".into(), vec![ct_dir.join("ct-ng")])],
            ..FakeHost::default()
        };
        let req = ToolchainRequest::parse("build", &[], false, true).unwrap();

        let outcome = run_toolchain(&ctx, &mut host, &req).unwrap();

        assert!(matches!(
            outcome,
            ToolchainOutcome::Built(BuildOutcome::GeneratorOnly(_))
        ));
        assert_eq!(host.runs().len(), 2);
        assert!(!tmp.path().join("x86_64").exists());
    }
}
