// Copyright (c) 2023-present, Raphael Amorim.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Largest width/height that can appear in a cache key.
pub const MAX_CACHE_DIMENSION: u32 = 1_000_000;
/// Default entry budget, roughly three times the working set of a large document.
pub const MAX_CACHE_SIZE: usize = 10_000;
/// Twips per CSS pixel at 96 DPI.
pub const TWIPS_PER_PX: f32 = 15.;

#[inline]
fn default_cache_capacity() -> usize {
    MAX_CACHE_SIZE
}

#[inline]
fn default_max_dimension() -> u32 {
    MAX_CACHE_DIMENSION
}

#[inline]
fn default_font_size() -> f32 {
    16.
}

#[inline]
fn default_line_height_factor() -> f32 {
    1.2
}

#[inline]
fn default_char_width_factor() -> f32 {
    0.5
}

#[inline]
fn default_tab_interval_twips() -> f32 {
    720.
}

#[inline]
fn default_subpixel_tolerance() -> f32 {
    0.5
}

#[inline]
fn default_marker_gutter() -> f32 {
    8.
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    #[serde(default = "default_cache_capacity", rename = "cache-capacity")]
    pub cache_capacity: usize,
    #[serde(default = "default_max_dimension", rename = "max-dimension")]
    pub max_dimension: u32,
    #[serde(default = "default_font_size", rename = "default-font-size")]
    pub default_font_size: f32,
    #[serde(default = "default_line_height_factor", rename = "line-height-factor")]
    pub line_height_factor: f32,
    /// Width of one character, as a fraction of the font size, used when no
    /// text measurer is available.
    #[serde(default = "default_char_width_factor", rename = "char-width-factor")]
    pub char_width_factor: f32,
    #[serde(default = "default_tab_interval_twips", rename = "tab-interval-twips")]
    pub tab_interval_twips: f32,
    #[serde(default = "default_subpixel_tolerance", rename = "subpixel-tolerance")]
    pub subpixel_tolerance: f32,
    #[serde(default = "default_marker_gutter", rename = "marker-gutter")]
    pub marker_gutter: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            cache_capacity: default_cache_capacity(),
            max_dimension: default_max_dimension(),
            default_font_size: default_font_size(),
            line_height_factor: default_line_height_factor(),
            char_width_factor: default_char_width_factor(),
            tab_interval_twips: default_tab_interval_twips(),
            subpixel_tolerance: default_subpixel_tolerance(),
            marker_gutter: default_marker_gutter(),
        }
    }
}

impl LayoutConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: LayoutConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_capacity == 0 {
            return Err(ConfigError::Invalid(
                "cache-capacity must be at least 1".to_string(),
            ));
        }

        let positive = [
            ("default-font-size", self.default_font_size),
            ("line-height-factor", self.line_height_factor),
            ("char-width-factor", self.char_width_factor),
            ("tab-interval-twips", self.tab_interval_twips),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0. {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }

        let non_negative = [
            ("subpixel-tolerance", self.subpixel_tolerance),
            ("marker-gutter", self.marker_gutter),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0. {
                return Err(ConfigError::Invalid(format!(
                    "{name} must not be negative, got {value}"
                )));
            }
        }

        Ok(())
    }

    /// Default tab interval converted to pixels.
    #[inline]
    pub fn tab_interval_px(&self) -> f32 {
        self.tab_interval_twips / TWIPS_PER_PX
    }
}
