use std::ffi::CStr;
use std::num::NonZeroU32;

use anyhow::{Context, Result, anyhow};
use glutin::config::ConfigTemplateBuilder;
use glutin::context::{
    ContextApi, ContextAttributesBuilder, GlProfile, PossiblyCurrentContext, Version,
};
use glutin::display::{Display, DisplayApiPreference};
use glutin::prelude::*;
use glutin::surface::{Surface, SurfaceAttributesBuilder, SwapInterval, WindowSurface};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle, RawWindowHandle};
use winit::dpi::PhysicalSize;
use winit::window::Window as WinitWindow;

use super::WindowSettings;

/// Current GL context plus the window surface it presents to.
///
/// Field order is drop order: the context goes before the surface.
pub(crate) struct ContextSurface {
    context: PossiblyCurrentContext,
    surface: Surface<WindowSurface>,
}

impl ContextSurface {
    /// Creates a core-profile context for `window`, makes it current and
    /// loads the GL entry points.
    pub(crate) fn create(
        window: &WinitWindow,
        settings: &WindowSettings,
    ) -> Result<(Self, glow::Context)> {
        let display_handle = window
            .display_handle()
            .context("window has no display handle")?
            .as_raw();
        let window_handle = window
            .window_handle()
            .context("window has no native handle")?
            .as_raw();

        let display = unsafe { Display::new(display_handle, display_preference(window_handle)) }
            .context("failed to open GL display")?;

        let template = ConfigTemplateBuilder::new()
            .with_alpha_size(8)
            .with_depth_size(24)
            .with_stencil_size(8)
            .with_single_buffering(!settings.double_buffer)
            .compatible_with_native_window(window_handle)
            .build();

        let config = unsafe { display.find_configs(template) }
            .context("failed to query GL configs")?
            .next()
            .ok_or_else(|| anyhow!("no GL config matches the window settings"))?;

        let (width, height) = non_zero(window.inner_size());
        let surface_attributes =
            SurfaceAttributesBuilder::<WindowSurface>::new().build(window_handle, width, height);
        let surface = unsafe { display.create_window_surface(&config, &surface_attributes) }
            .context("failed to create GL window surface")?;

        let (major, minor) = settings.gl_version();
        let context_attributes = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::OpenGl(Some(Version::new(major, minor))))
            .with_profile(GlProfile::Core)
            .build(Some(window_handle));

        let context = unsafe { display.create_context(&config, &context_attributes) }
            .with_context(|| format!("failed to create an OpenGL {major}.{minor} core context"))?
            .make_current(&surface)
            .context("failed to make the GL context current")?;

        let interval = if settings.vsync {
            SwapInterval::Wait(NonZeroU32::MIN)
        } else {
            SwapInterval::DontWait
        };
        match surface.set_swap_interval(&context, interval) {
            Ok(()) => log::debug!("vsync {}", if settings.vsync { "on" } else { "off" }),
            Err(err) => log::warn!("failed to set swap interval: {err}"),
        }

        let gl = unsafe {
            glow::Context::from_loader_function_cstr(|name: &CStr| display.get_proc_address(name))
        };

        Ok((Self { context, surface }, gl))
    }

    /// Zero-sized (minimized) windows keep the previous surface size.
    pub(crate) fn resize(&self, size: PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        let (width, height) = non_zero(size);
        self.surface.resize(&self.context, width, height);
    }

    pub(crate) fn swap_buffers(&self) -> Result<()> {
        self.surface
            .swap_buffers(&self.context)
            .context("failed to swap buffers")
    }
}

fn non_zero(size: PhysicalSize<u32>) -> (NonZeroU32, NonZeroU32) {
    (
        NonZeroU32::new(size.width).unwrap_or(NonZeroU32::MIN),
        NonZeroU32::new(size.height).unwrap_or(NonZeroU32::MIN),
    )
}

#[cfg(target_os = "windows")]
fn display_preference(window: RawWindowHandle) -> DisplayApiPreference {
    log::debug!("using WGL for the OpenGL context");
    DisplayApiPreference::Wgl(Some(window))
}

#[cfg(target_os = "macos")]
fn display_preference(_window: RawWindowHandle) -> DisplayApiPreference {
    log::debug!("using CGL for the OpenGL context");
    DisplayApiPreference::Cgl
}

#[cfg(all(unix, not(target_os = "macos")))]
fn display_preference(_window: RawWindowHandle) -> DisplayApiPreference {
    log::debug!("using EGL for the OpenGL context");
    DisplayApiPreference::Egl
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_extent_becomes_one() {
        let (w, h) = non_zero(PhysicalSize::new(0, 480));
        assert_eq!((w.get(), h.get()), (1, 480));
    }

    #[test]
    fn window_surface_presents_through_glutin_trait() {
        let swap: fn(&Surface<WindowSurface>, &PossiblyCurrentContext) -> glutin::error::Result<()> =
            |surface, context| surface.swap_buffers(context);
        let resize: fn(&Surface<WindowSurface>, &PossiblyCurrentContext, NonZeroU32, NonZeroU32) =
            |surface, context, w, h| surface.resize(context, w, h);
        assert_ne!(swap as usize, 0);
        assert_ne!(resize as usize, 0);
    }
}
