// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Inspector configuration loaded from environment variables.

/// Inspector configuration. Command-line flags override these values.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Ribbon line width used for hit testing.
    pub line_width: f32,
    /// Tab stop spacing in space advances.
    pub tab_size: f32,
    /// Flip atlas V coordinates.
    pub flip_y: bool,
    /// Pretty-print the JSON report.
    pub pretty: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            line_width: 1.0,
            tab_size: 4.0,
            flip_y: true,
            pretty: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, falling back to defaults for
    /// missing or unparsable values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            line_width: lookup("MESHLINE_LINE_WIDTH")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.line_width),
            tab_size: lookup("MESHLINE_TAB_SIZE")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.tab_size),
            flip_y: lookup("MESHLINE_FLIP_Y")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.flip_y),
            pretty: lookup("MESHLINE_PRETTY")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.pretty),
        }
    }
}
