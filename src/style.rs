//! Stroke styles for overlay tracks and the user facing style options
use crate::Error;
use serde::{Deserialize, Serialize};

/// Color used for walks and hikes when color detection is enabled
pub const HIKE_COLOR: &str = "pink";
/// Color used for runs when color detection is enabled
pub const RUN_COLOR: &str = "red";
/// Color used for rides when color detection is enabled
pub const RIDE_COLOR: &str = "cyan";

/// Stroke attributes attached to a single track
#[derive(Clone, Debug, PartialEq)]
pub struct StyleSpec {
    color: String,
    weight: f64,
    opacity: f64,
}

impl StyleSpec {
    /// Create a style, weight must be positive and opacity within [0, 1]
    pub fn new(color: impl Into<String>, weight: f64, opacity: f64) -> Result<Self, Error> {
        let color = color.into();
        if color.trim().is_empty() {
            return Err(Error::InvalidStyle("color must not be empty".to_string()));
        }
        if !(weight > 0.0 && weight.is_finite()) {
            return Err(Error::InvalidStyle(format!(
                "weight must be greater than zero, got {}",
                weight
            )));
        }
        if !(0.0..=1.0).contains(&opacity) {
            return Err(Error::InvalidStyle(format!(
                "opacity must be between 0 and 1, got {}",
                opacity
            )));
        }
        Ok(StyleSpec {
            color,
            weight,
            opacity,
        })
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }
}

/// Track style settings chosen by the user.
///
/// Only `override_existing` and `detect_colors` change how the overlay behaves, the remaining
/// fields are handed to the renderer untouched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleOptions {
    pub color: String,
    pub weight: f64,
    pub opacity: f64,
    pub smooth_factor: f64,
    pub override_existing: bool,
    pub detect_colors: bool,
}

impl StyleOptions {
    /// Stroke style for a newly added track with the given identifier
    pub fn style_for(&self, identifier: &str) -> Result<StyleSpec, Error> {
        let color = if self.detect_colors {
            detect_color(identifier, &self.color)
        } else {
            &self.color
        };
        StyleSpec::new(color, self.weight, self.opacity)
    }

    /// Stroke style applied to every existing track when overriding
    pub fn base_style(&self) -> Result<StyleSpec, Error> {
        StyleSpec::new(self.color.as_str(), self.weight, self.opacity)
    }
}

impl Default for StyleOptions {
    fn default() -> Self {
        StyleOptions {
            color: "#0CB1E8".to_string(),
            weight: 1.0,
            opacity: 0.5,
            smooth_factor: 1.0,
            override_existing: true,
            detect_colors: true,
        }
    }
}

/// Pick a color from the activity type encoded in a track identifier.
///
/// Checked in order hike/walk, run, ride and the first match wins.
pub fn detect_color<'a>(identifier: &str, default: &'a str) -> &'a str {
    if identifier.contains("-Hike") || identifier.contains("-Walk") {
        HIKE_COLOR
    } else if identifier.contains("-Run") {
        RUN_COLOR
    } else if identifier.contains("-Ride") {
        RIDE_COLOR
    } else {
        default
    }
}
