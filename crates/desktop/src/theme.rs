use std::time::Duration;

use iced::color;
use iced::theme::Palette;
use iced::{Color, Theme};

use crate::settings::Appearance;

/// How often the OS appearance is re-read when following the system.
pub const SYSTEM_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Theme resolved once and reused across redraws.
///
/// Only `Appearance::System` ever changes; it is refreshed by [`poll`](Self::poll).
pub struct ThemeState {
    appearance: Appearance,
    theme: Theme,
}

impl ThemeState {
    pub fn new(appearance: Appearance) -> Self {
        Self {
            appearance,
            theme: resolve_theme(appearance),
        }
    }

    pub fn current(&self) -> &Theme {
        &self.theme
    }

    /// `Some` only when the theme follows the OS setting.
    pub fn poll_interval(&self) -> Option<Duration> {
        (self.appearance == Appearance::System).then_some(SYSTEM_POLL_INTERVAL)
    }

    /// Re-reads the OS appearance. Returns true when the theme changed.
    pub fn poll(&mut self) -> bool {
        if self.poll_interval().is_none() {
            return false;
        }
        let fresh = resolve_theme(self.appearance);
        if fresh.palette() == self.theme.palette() {
            return false;
        }
        self.theme = fresh;
        true
    }
}

/// Resolve the iced Theme from the appearance setting.
fn resolve_theme(appearance: Appearance) -> Theme {
    let is_dark = match appearance {
        Appearance::Dark => true,
        Appearance::Light => false,
        Appearance::System => detect_system_dark_mode(),
    };

    let palette = if is_dark {
        dark_palette()
    } else {
        light_palette()
    };

    Theme::custom("FaceCam", palette)
}

/// Secondary text color (labels, status line).
pub fn muted_color(theme: &Theme) -> Color {
    Color {
        a: 0.6,
        ..theme.palette().text
    }
}

pub fn error_color(theme: &Theme) -> Color {
    theme.palette().danger
}

fn dark_palette() -> Palette {
    Palette {
        background: color!(0x1c, 0x1c, 0x1e),
        text: color!(0xcc, 0xcc, 0xcc),
        primary: color!(0x5e, 0x9f, 0xf5),
        success: color!(0x30, 0xd1, 0x58),
        warning: color!(0xff, 0xcc, 0x00),
        danger: color!(0xff, 0x45, 0x3a),
    }
}

fn light_palette() -> Palette {
    Palette {
        background: color!(0xff, 0xff, 0xff),
        text: color!(0x1d, 0x1d, 0x1f),
        primary: color!(0x34, 0x78, 0xf6),
        success: color!(0x34, 0xc7, 0x59),
        warning: color!(0xff, 0x9f, 0x0a),
        danger: color!(0xff, 0x3b, 0x30),
    }
}

fn detect_system_dark_mode() -> bool {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("defaults")
            .args(["read", "-g", "AppleInterfaceStyle"])
            .output()
            .map(|o| {
                String::from_utf8_lossy(&o.stdout)
                    .trim()
                    .eq_ignore_ascii_case("dark")
            })
            .unwrap_or(false)
    }
    #[cfg(not(target_os = "macos"))]
    {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_appearance_is_never_polled() {
        let mut state = ThemeState::new(Appearance::Dark);
        assert_eq!(state.poll_interval(), None);
        assert!(!state.poll());
        assert_eq!(state.current().palette(), dark_palette());

        let state = ThemeState::new(Appearance::Light);
        assert_eq!(state.poll_interval(), None);
        assert_eq!(state.current().palette(), light_palette());
    }

    #[test]
    fn test_system_appearance_polls_slowly() {
        let mut state = ThemeState::new(Appearance::System);
        assert_eq!(state.poll_interval(), Some(SYSTEM_POLL_INTERVAL));
        // OS setting did not change between resolving and polling
        assert!(!state.poll());
    }
}
