//! Application contract and frame loop.
//!
//! `run` owns the window for the lifetime of the app; apps see the graphics
//! context, per-frame input and timing through `FrameCtx`.

mod app;
mod ctx;
mod run;

pub use app::{App, AppControl};
pub use ctx::FrameCtx;
pub use run::run;
