//! # Output Configuration
//!
//! This module provides utilities for controlling CLI output appearance,
//! including color and emoji support based on terminal capabilities and
//! user preferences.
//!
//! ## Respecting User Preferences
//!
//! The module respects the following environment variables and flags:
//! - `--color=never|always|auto` - CLI flag for color control
//! - `NO_COLOR` - Disables colors when set (per https://no-color.org/)
//!
//! Anything else is left to `console`'s terminal detection.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use fleetsync::output::{OutputConfig, emoji};
//!
//! let config = OutputConfig::from_env_and_flag("auto");
//! println!("{} all workers finished", emoji(&config, "✅", "[OK]"));
//! ```

use std::env;

use console::Style;

/// Output configuration for controlling colors and emojis.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether colors and emojis should be used in output.
    pub use_color: bool,
}

impl OutputConfig {
    /// Create an output configuration from environment and CLI flag.
    ///
    /// # Arguments
    /// * `color_flag` - The value of the --color CLI flag: "always", "never", or "auto"
    ///
    /// In auto mode colors are used only when `NO_COLOR` is unset and stdout
    /// is a terminal that supports them.
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => {
                env::var_os("NO_COLOR").is_none()
                    && console::Term::stdout().features().colors_supported()
            }
        };

        Self { use_color }
    }

    /// Colors always enabled
    pub fn with_color() -> Self {
        Self { use_color: true }
    }

    /// Colors always disabled
    pub fn without_color() -> Self {
        Self { use_color: false }
    }

    /// Destination paths
    pub fn dest(&self, text: &str) -> String {
        self.paint(Style::new().bold(), text)
    }

    /// Source paths inside the master repository
    pub fn src(&self, text: &str) -> String {
        self.paint(Style::new().cyan(), text)
    }

    /// Node names
    pub fn node(&self, text: &str) -> String {
        self.paint(Style::new().green(), text)
    }

    /// Problems the user has to fix
    pub fn problem(&self, text: &str) -> String {
        self.paint(Style::new().red().bold(), text)
    }

    fn paint(&self, style: Style, text: &str) -> String {
        if self.use_color {
            style.force_styling(true).apply_to(text).to_string()
        } else {
            text.to_string()
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// Returns the emoji when colors are enabled, the plain text otherwise.
pub fn emoji<'a>(config: &OutputConfig, emoji_str: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        emoji_str
    } else {
        plain
    }
}
