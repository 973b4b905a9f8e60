use std::cell::RefCell;
use std::fmt;

/// Severity attached to every diagnostic.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

type MessageFn = Box<dyn FnMut(Severity, fmt::Arguments<'_>)>;
type ErrorFn = Box<dyn FnMut(&str)>;

/// Single-slot diagnostic channel.
///
/// Holds at most one message callback and at most one error callback.
/// Registering a callback replaces the previous one. With nothing registered,
/// diagnostics only reach the logger.
///
/// - the message callback receives every diagnostic, unformatted
/// - the error callback receives error-severity diagnostics as one string
#[derive(Default)]
pub struct Diagnostics {
    message: RefCell<Option<MessageFn>>,
    error: RefCell<Option<ErrorFn>>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_message_callback<F>(&self, callback: F)
    where
        F: FnMut(Severity, fmt::Arguments<'_>) + 'static,
    {
        *self.message.borrow_mut() = Some(Box::new(callback));
    }

    pub fn set_error_callback<F>(&self, callback: F)
    where
        F: FnMut(&str) + 'static,
    {
        *self.error.borrow_mut() = Some(Box::new(callback));
    }

    pub fn clear_message_callback(&self) {
        self.message.borrow_mut().take();
    }

    pub fn clear_error_callback(&self) {
        self.error.borrow_mut().take();
    }

    /// Emits one diagnostic.
    ///
    /// A callback that emits on the same channel while running is not
    /// re-entered; the nested diagnostic is logged only.
    pub fn emit(&self, severity: Severity, args: fmt::Arguments<'_>) {
        match severity {
            Severity::Info => log::info!("{args}"),
            Severity::Warning => log::warn!("{args}"),
            Severity::Error => log::error!("{args}"),
        }

        if let Ok(mut slot) = self.message.try_borrow_mut() {
            if let Some(callback) = slot.as_mut() {
                callback(severity, args);
            }
        }

        if severity == Severity::Error {
            if let Ok(mut slot) = self.error.try_borrow_mut() {
                if let Some(callback) = slot.as_mut() {
                    callback(&args.to_string());
                }
            }
        }
    }

    pub fn info(&self, args: fmt::Arguments<'_>) {
        self.emit(Severity::Info, args);
    }

    pub fn warn(&self, args: fmt::Arguments<'_>) {
        self.emit(Severity::Warning, args);
    }

    pub fn error(&self, args: fmt::Arguments<'_>) {
        self.emit(Severity::Error, args);
    }
}

impl fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diagnostics")
            .field("message_callback", &self.message.borrow().is_some())
            .field("error_callback", &self.error.borrow().is_some())
            .finish()
    }
}
