//! Everything an orchestrator needs to know about where it runs.

use crate::arch::{host_machine, Arch, Platform, Triplet};
use crate::layout::ToolchainLayout;
use crate::settings::Settings;

/// Toolchain root, versions/URLs, and host identity for one invocation.
#[derive(Debug, Clone)]
pub struct ToolchainContext {
    pub layout: ToolchainLayout,
    pub settings: Settings,
    /// Host machine name used in download URLs and config directories.
    pub host_machine: String,
    /// Platform triplets are formed for.
    pub platform: Platform,
}

impl ToolchainContext {
    /// Context for the machine this process runs on.
    pub fn for_host(layout: ToolchainLayout, settings: Settings) -> Self {
        Self {
            layout,
            settings,
            host_machine: host_machine().to_string(),
            platform: Platform::host(),
        }
    }

    pub fn triplet(&self, arch: &Arch) -> Triplet {
        Triplet::for_arch(arch, self.platform)
    }
}
