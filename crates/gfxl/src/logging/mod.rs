//! Logging and diagnostics.
//!
//! `init_logging` installs the process logger (`env_logger` behind the `log`
//! facade). `Diagnostics` is the renderer's message channel: driver compile and
//! link logs, missing files and decode failures are delivered to the callbacks
//! an application registers, and mirrored to the logger.

mod diagnostics;
mod init;

pub use diagnostics::{Diagnostics, Severity};
pub use init::{init_logging, LoggingConfig};
