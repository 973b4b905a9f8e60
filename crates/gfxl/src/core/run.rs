use anyhow::{Context, Result};

use crate::time::FrameClock;
use crate::window::{Window, WindowSettings};

use super::app::{App, AppControl};
use super::ctx::FrameCtx;

/// Opens a window and drives `app` until it exits or the window closes.
///
/// Per frame: poll events, deliver key transitions to [`App::on_key`], call
/// [`App::on_frame`], swap buffers. On exit the app (and every GPU handle it
/// owns) is dropped before the window is terminated.
pub fn run<A: App>(settings: WindowSettings, mut app: A) -> Result<()> {
    let mut window = Window::new(settings).context("failed to open window")?;
    app.init(window.gfx()).context("application init failed")?;

    let mut clock = FrameClock::new();
    let outcome = loop {
        window.poll_events();
        if window.should_close() {
            break Ok(());
        }

        let input = window.take_frame();
        let mut control = AppControl::Continue;
        for event in &input.events {
            if app.on_key(window.gfx(), event.key, event.state.is_pressed()) == AppControl::Exit {
                control = AppControl::Exit;
            }
        }
        if control == AppControl::Exit {
            break Ok(());
        }

        let mut ctx = FrameCtx::new(&window, &input, clock.tick());
        if app.on_frame(&mut ctx) == AppControl::Exit {
            break Ok(());
        }

        if let Err(err) = window.swap_buffers() {
            break Err(err);
        }
    };

    drop(app);
    window.terminate();
    outcome
}
