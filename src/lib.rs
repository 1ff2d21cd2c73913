//! Cross toolchain management for mayflower.
//!
//! Every supported target architecture gets a toolchain directory under a
//! single toolchain root. This crate provides two ways to fill it:
//!
//! - **download** - Fetch a prebuilt toolchain archive per architecture and unpack it
//! - **build** - Bootstrap crosstool-ng, then run `ct-ng build` per architecture
//!
//! # Architecture
//!
//! ```text
//! mayflower toolchain <command>     (src/bin/mayflower.rs)
//!     │
//!     ├── command   ToolchainRequest -> download | build
//!     │
//!     ├── download  per arch: skip/clean -> fetch -> extract -> record
//!     ├── build     crosstool-ng bootstrap, then per arch: config -> ct-ng build
//!     │
//!     ├── host      ToolchainHost trait (fetch, extract, run, tool checks)
//!     │     └── SystemHost: fetch + archive + process + preflight
//!     │
//!     └── layout / state / settings / arch
//!           root paths, root lock, pending markers, install records,
//!           version + URL templates, triplets
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use mayflower::{Arch, Settings, SystemHost, ToolchainContext, ToolchainLayout};
//!
//! let layout = ToolchainLayout::new("/tmp/mayflower/toolchain");
//! let ctx = ToolchainContext::for_host(layout, Settings::default());
//! let arches = vec![Arch::parse("riscv64")?];
//! mayflower::download::download(&ctx, &mut SystemHost, &arches, false)?;
//! ```

pub mod arch;
pub mod archive;
pub mod build;
pub mod command;
pub mod context;
pub mod crosstool;
pub mod download;
pub mod error;
pub mod fetch;
pub mod host;
pub mod layout;
pub mod preflight;
pub mod process;
pub mod settings;
pub mod state;

pub use arch::{Arch, Platform, Triplet};
pub use command::{run_toolchain, ToolchainCommand, ToolchainOutcome, ToolchainRequest};
pub use context::ToolchainContext;
pub use error::{Result, ToolchainError};
pub use host::{SystemHost, ToolchainHost};
pub use layout::ToolchainLayout;
pub use settings::Settings;
