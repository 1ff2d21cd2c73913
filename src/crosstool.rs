//! Bootstrapping crosstool-ng, the toolchain generator.
//!
//! crosstool-ng is built "local" (`./configure --enable-local && make`), so
//! the `ct-ng` script ends up inside its own source directory and nothing is
//! installed system-wide.

use std::path::PathBuf;

use crate::context::ToolchainContext;
use crate::error::Result;
use crate::host::ToolchainHost;
use crate::process::{ensure_exists, CommandSpec};

/// Environment variable crosstool-ng reads the install prefix from.
pub const PREFIX_ENV: &str = "CT_PREFIX";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorOutcome {
    AlreadyBuilt,
    BuiltNow,
}

/// A crosstool-ng checkout under the toolchain root.
#[derive(Debug, Clone)]
pub struct Crosstool {
    pub dir: PathBuf,
}

impl Crosstool {
    pub fn new(ctx: &ToolchainContext) -> Self {
        Self {
            dir: ctx.layout.generator_dir(&ctx.settings.crosstool_dirname()),
        }
    }

    /// Path to the built `ct-ng` driver.
    pub fn executable(&self) -> PathBuf {
        self.dir.join("ct-ng")
    }

    /// Fetch and build crosstool-ng unless its directory already exists.
    ///
    /// The existence of the extracted directory is the only check: a failed
    /// `configure`/`make` leaves it behind, and the error says so.
    pub fn ensure_built<H: ToolchainHost>(
        &self,
        ctx: &ToolchainContext,
        host: &mut H,
    ) -> Result<GeneratorOutcome> {
        if self.dir.exists() {
            log::debug!("crosstool-ng present at {}", self.dir.display());
            return Ok(GeneratorOutcome::AlreadyBuilt);
        }

        host.check_build_tools()?;

        let url = ctx.settings.crosstool_url()?;
        println!("[toolchain:crosstool-ng] Downloading {url}");
        let root = ctx.layout.root();
        let fetched = host.fetch(&url, root)?;
        host.extract(&fetched.path, root)?;
        ensure_exists(&self.dir, &format!("extracting {}", fetched.path.display()))?;

        println!("[toolchain:crosstool-ng] Building in {}", self.dir.display());
        let configure =
            CommandSpec::new(self.dir.join("configure"), &self.dir).arg("--enable-local");
        let make = CommandSpec::new("make", &self.dir);
        for step in [configure, make] {
            host.run(&step).inspect_err(|_| {
                log::error!(
                    "crosstool-ng build failed; remove {} to retry from scratch",
                    self.dir.display()
                );
            })?;
        }

        ensure_exists(&self.executable(), "building crosstool-ng")?;
        Ok(GeneratorOutcome::BuiltNow)
    }

    /// `ct-ng build` with the install prefix pointed at the toolchain root.
    pub fn build_command(&self, ctx: &ToolchainContext) -> CommandSpec {
        let root = ctx.layout.root();
        CommandSpec::new(self.executable(), root)
            .arg("build")
            .env(PREFIX_ENV, root.as_os_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arch::Platform;
    use crate::error::ToolchainError;
    use crate::host::testing::{Call, FakeHost};
    use crate::layout::ToolchainLayout;
    use crate::settings::Settings;
    use std::fs;
    use tempfile::TempDir;

    fn context(tmp: &TempDir) -> ToolchainContext {
        ToolchainContext {
            layout: ToolchainLayout::new(tmp.path()),
            settings: Settings::default(),
            host_machine: "x86_64".to_string(),
            platform: Platform::Linux,
        }
    }

    fn building_host(ctx: &ToolchainContext) -> FakeHost {
        let dir = Crosstool::new(ctx).dir;
        FakeHost {
            extract_creates: vec![(
                "crosstool-ng-1.25.0.tar.xz".into(),
                vec!["crosstool-ng-1.25.0".into()],
            )],
            // `make` produces the ct-ng driver; model it as a directory.
            run_creates: vec![("make".into(), vec![dir.join("ct-ng")])],
            ..FakeHost::default()
        }
    }

    #[test]
    fn test_builds_when_missing() {
        let tmp = TempDir::new().unwrap();
        let ctx = context(&tmp);
        let mut host = building_host(&ctx);
        let ct = Crosstool::new(&ctx);

        assert_eq!(
            ct.ensure_built(&ctx, &mut host).unwrap(),
            GeneratorOutcome::BuiltNow
        );

        assert_eq!(host.calls[0], Call::CheckTools);
        assert_eq!(
            host.fetches(),
            vec!["http://crosstool-ng.org/download/crosstool-ng/crosstool-ng-1.25.0.tar.xz"]
        );
        let runs = host.runs();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].program, ct.dir.join("configure"));
        assert_eq!(runs[0].args, vec!["--enable-local"]);
        assert_eq!(runs[0].cwd, ct.dir);
        assert_eq!(runs[1].program, PathBuf::from("make"));
        assert_eq!(runs[1].cwd, ct.dir);
    }

    #[test]
    fn test_skips_when_present() {
        let tmp = TempDir::new().unwrap();
        let ctx = context(&tmp);
        let ct = Crosstool::new(&ctx);
        fs::create_dir_all(&ct.dir).unwrap();
        let mut host = FakeHost::default();

        assert_eq!(
            ct.ensure_built(&ctx, &mut host).unwrap(),
            GeneratorOutcome::AlreadyBuilt
        );
        assert!(host.calls.is_empty());
    }

    #[test]
    fn test_failed_make_keeps_cwd() {
        let tmp = TempDir::new().unwrap();
        let ctx = context(&tmp);
        let mut host = building_host(&ctx);
        host.failing_runs.push("make".into());
        let before = std::env::current_dir().unwrap();

        let err = Crosstool::new(&ctx).ensure_built(&ctx, &mut host).unwrap_err();

        assert!(matches!(err, ToolchainError::CommandFailed { .. }));
        assert_eq!(std::env::current_dir().unwrap(), before);
    }

    #[test]
    fn test_build_command_sets_prefix() {
        let tmp = TempDir::new().unwrap();
        let ctx = context(&tmp);
        let spec = Crosstool::new(&ctx).build_command(&ctx);
        assert_eq!(spec.args, vec!["build"]);
        assert_eq!(spec.cwd, tmp.path());
        assert_eq!(
            spec.env_value(PREFIX_ENV),
            Some(&tmp.path().as_os_str().to_os_string())
        );
    }
}
