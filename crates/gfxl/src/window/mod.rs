//! Window, GL context and input pumping.
//!
//! [`Window`] owns the winit event loop, one OS window and its GL context.
//! The loop is pumped, not run: the caller drives frames with
//! [`Window::poll_events`] and [`Window::swap_buffers`].

mod settings;
mod surface;

use std::mem;
use std::rc::Rc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window as WinitWindow, WindowId};

use crate::device::{Gfx, GlBackend};
use crate::input::platform::winit::translate_key_event;
use crate::input::{InputFrame, InputState, Key, KeyEvent};

pub use settings::WindowSettings;

use surface::ContextSurface;

/// Pumps needed at most before the platform delivers `resumed`.
const STARTUP_PUMPS: usize = 16;

type KeyCallback = Box<dyn FnMut(Key, bool)>;

/// An OS window with a current OpenGL context.
///
/// Dropping the window (or calling [`terminate`](Window::terminate)) marks
/// its [`Gfx`] lost, then destroys the GL context before the OS window.
pub struct Window {
    shell: Shell,
    gfx: Gfx,
    key_callback: Option<KeyCallback>,
    should_close: bool,
    event_loop: EventLoop<()>,
}

impl Window {
    /// Opens a window and creates its GL context.
    pub fn new(settings: WindowSettings) -> Result<Self> {
        let mut event_loop = EventLoop::new().context("failed to create event loop")?;
        let mut shell = Shell::new(settings);

        for _ in 0..STARTUP_PUMPS {
            if let PumpStatus::Exit(code) =
                event_loop.pump_app_events(Some(Duration::ZERO), &mut shell)
            {
                bail!("event loop exited with code {code} while opening the window");
            }
            if let Some(err) = shell.error.take() {
                return Err(err);
            }
            if shell.target.is_some() {
                break;
            }
        }

        let gl = shell
            .gl
            .take()
            .ok_or_else(|| anyhow!("platform never resumed the application; no window was created"))?;

        let gfx = Gfx::new(Rc::new(GlBackend::new(gl)));
        let (width, height) = shell.size();
        gfx.set_viewport(width, height);

        log::info!("window \"{}\" opened at {width}x{height}", shell.settings.title);

        Ok(Self {
            shell,
            gfx,
            key_callback: None,
            should_close: false,
            event_loop,
        })
    }

    /// The graphics context bound to this window.
    pub fn gfx(&self) -> &Gfx {
        &self.gfx
    }

    /// Registers the key callback, replacing any previous one.
    ///
    /// Called with `(key, pressed)` for every press or release observed by
    /// [`poll_events`](Window::poll_events). Auto-repeats are not reported.
    pub fn set_key_callback<F>(&mut self, callback: F)
    where
        F: FnMut(Key, bool) + 'static,
    {
        self.key_callback = Some(Box::new(callback));
    }

    pub fn clear_key_callback(&mut self) {
        self.key_callback = None;
    }

    /// Processes pending OS events without blocking.
    ///
    /// Applies resizes to the surface and viewport, sets the close flag on a
    /// quit request and dispatches key transitions to the key callback.
    pub fn poll_events(&mut self) {
        let status = self
            .event_loop
            .pump_app_events(Some(Duration::ZERO), &mut self.shell);
        if let PumpStatus::Exit(code) = status {
            log::debug!("event loop exited with code {code}");
            self.should_close = true;
        }

        if let Some(size) = self.shell.resized.take() {
            if let Some(target) = &self.shell.target {
                target.surface.resize(size);
            }
            if size.width > 0 && size.height > 0 {
                self.gfx.set_viewport(size.width, size.height);
            }
        }

        if mem::take(&mut self.shell.close_requested) {
            self.should_close = true;
        }

        for event in self.shell.transitions.drain(..) {
            if let Some(callback) = self.key_callback.as_mut() {
                callback(event.key, event.state.is_pressed());
            }
        }
    }

    pub fn should_close(&self) -> bool {
        self.should_close
    }

    /// Sets the close flag as a quit request would.
    pub fn request_close(&mut self) {
        self.should_close = true;
    }

    pub fn swap_buffers(&self) -> Result<()> {
        match &self.shell.target {
            Some(target) => target.surface.swap_buffers(),
            None => Ok(()),
        }
    }

    pub fn key_down(&self, key: Key) -> bool {
        self.shell.input.key_down(key)
    }

    /// Key transitions since the previous call.
    pub fn take_frame(&mut self) -> InputFrame {
        mem::take(&mut self.shell.frame)
    }

    /// Client area in physical pixels.
    pub fn size(&self) -> (u32, u32) {
        self.shell.size()
    }

    pub fn title(&self) -> &str {
        &self.shell.settings.title
    }

    /// Destroys the GL context, then the OS window.
    pub fn terminate(self) {}
}

impl Drop for Window {
    fn drop(&mut self) {
        self.gfx.mark_lost();
        if let Some(target) = self.shell.target.take() {
            let Target { surface, window } = target;
            drop(surface);
            drop(window);
            log::debug!("window closed");
        }
    }
}

/// The live OS window and its GL surface; surface first in drop order.
struct Target {
    surface: ContextSurface,
    window: WinitWindow,
}

/// Event handler fed by `pump_app_events`.
struct Shell {
    settings: WindowSettings,
    target: Option<Target>,
    /// GL entry points loaded at creation, handed to the backend once.
    gl: Option<glow::Context>,
    error: Option<anyhow::Error>,

    input: InputState,
    frame: InputFrame,
    transitions: Vec<KeyEvent>,
    resized: Option<PhysicalSize<u32>>,
    close_requested: bool,
}

impl Shell {
    fn new(settings: WindowSettings) -> Self {
        Self {
            settings,
            target: None,
            gl: None,
            error: None,
            input: InputState::default(),
            frame: InputFrame::default(),
            transitions: Vec::new(),
            resized: None,
            close_requested: false,
        }
    }

    fn size(&self) -> (u32, u32) {
        match &self.target {
            Some(target) => target.window.inner_size().into(),
            None => (self.settings.width, self.settings.height),
        }
    }

    fn open(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attributes = WinitWindow::default_attributes()
            .with_title(self.settings.title.clone())
            .with_inner_size(LogicalSize::new(self.settings.width, self.settings.height));

        let window = event_loop
            .create_window(attributes)
            .context("failed to create window")?;

        let (surface, gl) = ContextSurface::create(&window, &self.settings)?;

        self.input.focused = window.has_focus();
        self.gl = Some(gl);
        self.target = Some(Target { surface, window });
        Ok(())
    }

    fn handle(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.close_requested = true,

            WindowEvent::Resized(size) => self.resized = Some(*size),

            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(target) = &self.target {
                    self.resized = Some(target.window.inner_size());
                }
            }

            WindowEvent::Focused(focused) => {
                let released = self.input.set_focused(&mut self.frame, *focused);
                self.transitions.extend(released);
            }

            WindowEvent::KeyboardInput { event, .. } => {
                let event = translate_key_event(event);
                if let Some(transition) = self.input.apply(&mut self.frame, event) {
                    self.transitions.push(transition);
                }
            }

            _ => {}
        }
    }
}

impl ApplicationHandler for Shell {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.target.is_some() || self.error.is_some() {
            return;
        }
        if let Err(err) = self.open(event_loop) {
            log::error!("failed to open window: {err:#}");
            self.error = Some(err);
        }
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        self.handle(&event);
    }
}
