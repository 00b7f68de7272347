//! `oc-exec`: thin driver for the `oc` command-line client.
//!
//! # Architecture
//!
//! ```text
//! OptionSet       ← ordered Flag → value map, formatted into `--flag[=value]`
//!     │
//!     ▼
//! OcRunner        ← spawns `oc <subcommand...> <flags...>`
//!     │              drains stdout / stderr line by line
//!     ▼
//! OutputHider     ← echoes the command line, then swallows everything else
//!     │              into an in-memory buffer (hidden policy only)
//!     ▼
//! ExecResult      ← exit code + captured stdout + captured stderr
//! ```
//!
//! # Quick start
//!
//! ```rust,ignore
//! use oc_exec::{command_args, ExecPolicy, Flag, OcRunner, OptionSet, Platform, Subcommand};
//!
//! let runner = OcRunner::locate(Platform::current())?;
//! let options = OptionSet::new().with_bare(Flag::Flatten).with(Flag::Minify, "true");
//! let args = command_args(&[Subcommand::Config, Subcommand::View], &options);
//! let result = runner.run(&args, &ExecPolicy::hidden()).await?;
//! ```

pub mod error;
pub mod hider;
pub mod options;
pub mod platform;
pub mod runner;

pub use error::OcExecError;
pub use hider::{OutputHider, SUPPRESSION_MARKER};
pub use options::{command_args, Flag, OptionSet, Subcommand};
pub use platform::Platform;
pub use runner::{ExecPolicy, ExecResult, OcRunner, Redact};

/// Convenience `Result` alias for this crate.
pub type Result<T> = std::result::Result<T, OcExecError>;
