/// Window and GL context configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowSettings {
    pub title: String,
    /// Logical size of the client area.
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
    /// Requested core-profile version; zeros fall back to 3.3.
    pub context_major_version: u8,
    pub context_minor_version: u8,
    pub double_buffer: bool,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: "gfxl".to_string(),
            width: 1280,
            height: 720,
            vsync: true,
            context_major_version: 3,
            context_minor_version: 3,
            double_buffer: true,
        }
    }
}

impl WindowSettings {
    pub fn new(title: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            title: title.into(),
            width,
            height,
            ..Self::default()
        }
    }

    /// GL version actually requested.
    pub fn gl_version(&self) -> (u8, u8) {
        match (self.context_major_version, self.context_minor_version) {
            (0, _) => (3, 3),
            version => version,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_request_gl33_core_double_buffered() {
        let settings = WindowSettings::default();
        assert_eq!((settings.width, settings.height), (1280, 720));
        assert_eq!(settings.gl_version(), (3, 3));
        assert!(settings.vsync);
        assert!(settings.double_buffer);
    }

    #[test]
    fn zero_major_version_falls_back() {
        let settings = WindowSettings {
            context_major_version: 0,
            context_minor_version: 0,
            ..WindowSettings::new("sandbox", 1600, 900)
        };
        assert_eq!(settings.gl_version(), (3, 3));
    }

    #[test]
    fn explicit_version_is_kept() {
        let settings = WindowSettings {
            context_major_version: 4,
            context_minor_version: 5,
            ..WindowSettings::default()
        };
        assert_eq!(settings.gl_version(), (4, 5));
    }
}
