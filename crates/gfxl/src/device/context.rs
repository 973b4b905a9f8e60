use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::error::GfxError;
use crate::logging::{Diagnostics, Severity};

use super::backend::Backend;
use super::types::Capability;

struct GfxInner {
    backend: Rc<dyn Backend>,
    diagnostics: Diagnostics,
    lost: Cell<bool>,
}

/// Graphics context shared by every resource handle.
///
/// Cloning is cheap (`Rc`). The context bundles the driver backend with the
/// diagnostic channel, so handles report failures to whoever registered a
/// callback on the `Gfx` that created them.
///
/// `Gfx` is neither `Send` nor `Sync`: all calls happen on the thread owning
/// the driver context.
#[derive(Clone)]
pub struct Gfx {
    inner: Rc<GfxInner>,
}

impl Gfx {
    pub fn new(backend: Rc<dyn Backend>) -> Self {
        log::debug!("gfx context created on {} backend", backend.name());
        Self {
            inner: Rc::new(GfxInner {
                backend,
                diagnostics: Diagnostics::new(),
                lost: Cell::new(false),
            }),
        }
    }

    #[inline]
    pub fn backend(&self) -> &dyn Backend {
        self.inner.backend.as_ref()
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.inner.diagnostics
    }

    /// Registers the message callback (replaces any previous one).
    pub fn set_message_callback<F>(&self, callback: F)
    where
        F: FnMut(Severity, fmt::Arguments<'_>) + 'static,
    {
        self.inner.diagnostics.set_message_callback(callback);
    }

    /// Registers the error-string callback (replaces any previous one).
    pub fn set_error_callback<F>(&self, callback: F)
    where
        F: FnMut(&str) + 'static,
    {
        self.inner.diagnostics.set_error_callback(callback);
    }

    /// Emits an informational message on the diagnostic channel.
    pub fn message(&self, args: fmt::Arguments<'_>) {
        self.inner.diagnostics.info(args);
    }

    pub(crate) fn report_error(&self, args: fmt::Arguments<'_>) {
        self.inner.diagnostics.error(args);
    }

    /// Reports `err` on the diagnostic channel and hands it back.
    pub(crate) fn fail(&self, err: GfxError) -> GfxError {
        self.report_error(format_args!("{err}"));
        err
    }

    /// Marks the driver context as destroyed.
    ///
    /// Handles dropped afterwards skip their release calls.
    pub fn mark_lost(&self) {
        if !self.inner.lost.replace(true) {
            log::debug!("gfx context marked lost");
        }
    }

    pub fn is_lost(&self) -> bool {
        self.inner.lost.get()
    }

    /// Runs a release call unless the context is gone.
    pub(crate) fn release(&self, f: impl FnOnce(&dyn Backend)) {
        if !self.is_lost() {
            f(self.backend());
        }
    }

    /// Clears color, depth and stencil; color alpha is 1.
    pub fn clear(&self, r: f32, g: f32, b: f32) {
        self.backend().clear([r, g, b, 1.0]);
    }

    pub fn set_viewport(&self, width: u32, height: u32) {
        self.backend().set_viewport(0, 0, width, height);
    }

    pub fn enable(&self, capability: Capability) {
        self.backend().set_capability(capability, true);
    }

    pub fn disable(&self, capability: Capability) {
        self.backend().set_capability(capability, false);
    }

    pub fn set_depth_write(&self, enabled: bool) {
        self.backend().set_depth_write(enabled);
    }
}

impl fmt::Debug for Gfx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gfx")
            .field("backend", &self.backend().name())
            .field("lost", &self.is_lost())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{Call, HeadlessBackend};
    use std::cell::RefCell;

    #[test]
    fn clear_uses_opaque_alpha() {
        let hb = Rc::new(HeadlessBackend::new());
        let gfx = Gfx::new(hb.clone());
        gfx.clear(0.35, 0.1, 0.27);
        assert_eq!(hb.calls(), vec![Call::Clear([0.35, 0.1, 0.27, 1.0])]);
    }

    #[test]
    fn release_is_skipped_once_lost() {
        let hb = Rc::new(HeadlessBackend::new());
        let gfx = Gfx::new(hb.clone());
        let ran = RefCell::new(0);

        gfx.release(|_| *ran.borrow_mut() += 1);
        gfx.mark_lost();
        gfx.release(|_| *ran.borrow_mut() += 1);

        assert_eq!(*ran.borrow(), 1);
    }

    #[test]
    fn message_reaches_registered_callback() {
        let gfx = Gfx::new(Rc::new(HeadlessBackend::new()));
        let seen = Rc::new(RefCell::new(String::new()));
        let out = seen.clone();
        gfx.set_message_callback(move |_, args| *out.borrow_mut() = args.to_string());

        gfx.message(format_args!("Reloading shaders... {}", 10));

        assert_eq!(seen.borrow().as_str(), "Reloading shaders... 10");
    }
}
