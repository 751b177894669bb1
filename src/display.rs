//! Light/dark display mode selection.
//!
//! Kept out of the report core: the renderer gets an explicit
//! [`DisplayConfig`] and asks [`resolve_display_mode`] which theme applies.

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// Configured display mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    #[default]
    Light,
    Dark,
    Auto,
}

/// Theme actually applied to the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

/// Display preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub mode: DisplayMode,
    /// In auto mode, switch by time of day instead of following the system.
    pub auto_switch: bool,
    /// `HH:MM` at which dark mode starts.
    pub dark_start: String,
    /// `HH:MM` at which light mode starts.
    pub light_start: String,
}

pub const DEFAULT_DARK_START: &str = "18:00";
pub const DEFAULT_LIGHT_START: &str = "06:00";

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            mode: DisplayMode::Light,
            auto_switch: false,
            dark_start: DEFAULT_DARK_START.to_string(),
            light_start: DEFAULT_LIGHT_START.to_string(),
        }
    }
}

/// Parse `HH:MM` into minutes after midnight.
pub fn parse_clock(value: &str) -> Option<u32> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .ok()
        .map(|t| t.hour() * 60 + t.minute())
}

/// Pick the theme for `now`.
///
/// Fixed modes pass through. `Auto` with `auto_switch` is dark from
/// `dark_start` (inclusive) to `light_start` (exclusive), wrapping past
/// midnight when needed; equal start times mean never dark. `Auto` without
/// `auto_switch` follows `system_prefers_dark`. Unparseable start times use
/// the defaults.
pub fn resolve_display_mode(config: &DisplayConfig, now: NaiveTime, system_prefers_dark: bool) -> Theme {
    match config.mode {
        DisplayMode::Light => Theme::Light,
        DisplayMode::Dark => Theme::Dark,
        DisplayMode::Auto if !config.auto_switch => {
            if system_prefers_dark {
                Theme::Dark
            } else {
                Theme::Light
            }
        }
        DisplayMode::Auto => {
            let dark = clock_or_default(&config.dark_start, DEFAULT_DARK_START);
            let light = clock_or_default(&config.light_start, DEFAULT_LIGHT_START);
            let current = now.hour() * 60 + now.minute();

            let is_dark = if dark > light {
                current >= dark || current < light
            } else {
                current >= dark && current < light
            };

            if is_dark { Theme::Dark } else { Theme::Light }
        }
    }
}

fn clock_or_default(value: &str, default: &str) -> u32 {
    parse_clock(value)
        .or_else(|| parse_clock(default))
        .unwrap_or_default()
}
