//! Flip panel configuration
//!
//! Every field has a serde default, so a config file only lists what it
//! changes:
//!
//! ```toml
//! direction = "vertical"
//! flip_reverse = true
//! stiffness = 200.0
//!
//! [engine]
//! type = "parallax"
//! offset_multiplier = 2.0
//! ```

use crate::error::{FliptError, Result};
use flipt_animation::SpringConfig;
use flipt_tilt::{EngineKind, EngineSettings};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Spring damping used for every flip
pub const FLIP_DAMPING: f32 = 10.0;

/// Axis the panel turns around
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Turn around the vertical axis (`rotateY`)
    #[default]
    Horizontal,
    /// Turn around the horizontal axis (`rotateX`)
    Vertical,
}

impl Direction {
    /// CSS rotation function for this direction
    pub fn rotate_fn(self) -> &'static str {
        match self {
            Direction::Horizontal => "rotateY",
            Direction::Vertical => "rotateX",
        }
    }
}

/// Flip panel configuration
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct FlipConfig {
    #[serde(default)]
    pub direction: Direction,
    #[serde(default = "default_border_radius")]
    pub border_radius: String,
    /// Border width of the back face
    #[serde(default = "default_border_width")]
    pub border_width: String,
    /// Border color of the back face
    #[serde(default = "default_border_color")]
    pub border_color: String,
    /// Border style of the back face
    #[serde(default = "default_border_style")]
    pub border_style: String,
    #[serde(default = "default_true")]
    pub shadow_enable: bool,
    /// Spring mass; higher is more sluggish
    #[serde(default = "default_mass")]
    pub mass: f32,
    /// Spring stiffness; higher is snappier
    #[serde(default = "default_stiffness")]
    pub stiffness: f32,
    /// Lock the panel to the back (`true`) or front (`false`) face
    #[serde(default)]
    pub flipped: Option<bool>,
    /// Rest the front face at +180 instead of -180
    #[serde(default)]
    pub flip_reverse: bool,
    /// Flip back by reversing instead of completing a full turn
    #[serde(default)]
    pub flip_back_reverse: bool,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub overflow_hidden_enable: bool,
    #[serde(default)]
    pub test_id_enable: bool,
    /// Listen on the whole document instead of the panel surface
    #[serde(default)]
    pub full_page_listening: bool,
    /// With control elements set, stop listening on the panel surface
    #[serde(default)]
    pub control_element_only: bool,
    #[serde(default = "default_max_angle")]
    pub tilt_max_angle_x: f32,
    #[serde(default = "default_max_angle")]
    pub tilt_max_angle_y: f32,
    #[serde(default)]
    pub tilt_reverse: bool,
    #[serde(default)]
    pub engine: EngineKind,
}

fn default_border_radius() -> String {
    "8px".to_string()
}

fn default_border_width() -> String {
    "2px".to_string()
}

fn default_border_color() -> String {
    "white".to_string()
}

fn default_border_style() -> String {
    "solid".to_string()
}

fn default_true() -> bool {
    true
}

fn default_mass() -> f32 {
    0.5
}

fn default_stiffness() -> f32 {
    120.0
}

fn default_max_angle() -> f32 {
    20.0
}

impl Default for FlipConfig {
    fn default() -> Self {
        Self {
            direction: Direction::default(),
            border_radius: default_border_radius(),
            border_width: default_border_width(),
            border_color: default_border_color(),
            border_style: default_border_style(),
            shadow_enable: true,
            mass: default_mass(),
            stiffness: default_stiffness(),
            flipped: None,
            flip_reverse: false,
            flip_back_reverse: false,
            disabled: false,
            overflow_hidden_enable: false,
            test_id_enable: false,
            full_page_listening: false,
            control_element_only: false,
            tilt_max_angle_x: default_max_angle(),
            tilt_max_angle_y: default_max_angle(),
            tilt_reverse: false,
            engine: EngineKind::default(),
        }
    }
}

impl FlipConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: FlipConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let source = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.spring_config().is_valid() {
            return Err(FliptError::InvalidSpring {
                mass: self.mass,
                stiffness: self.stiffness,
            });
        }
        Ok(())
    }

    /// Whether interactive flipping is switched off
    pub fn is_flip_locked(&self) -> bool {
        self.flipped.is_some() || self.disabled
    }

    /// Rotation at which the front face rests
    pub fn front_resting(&self) -> f32 {
        if self.flip_reverse {
            180.0
        } else {
            -180.0
        }
    }

    /// Rotation at mount
    pub fn initial_rotation(&self) -> f32 {
        if self.flipped == Some(true) {
            0.0
        } else {
            self.front_resting()
        }
    }

    pub fn spring_config(&self) -> SpringConfig {
        SpringConfig::new(self.stiffness, FLIP_DAMPING, self.mass)
    }

    /// Settings forwarded to the tilt engine
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            disabled: self.disabled,
            full_page_listening: self.full_page_listening,
            control_element_only: self.control_element_only,
            border_radius: self.border_radius.clone(),
            shadow_enable: self.shadow_enable,
            test_id_enable: self.test_id_enable,
            tilt_max_angle_x: self.tilt_max_angle_x,
            tilt_max_angle_y: self.tilt_max_angle_y,
            tilt_reverse: self.tilt_reverse,
        }
    }

    /// Engine variant with panel-level options folded in
    pub fn engine_kind(&self) -> EngineKind {
        match &self.engine {
            EngineKind::Parallax(options) => {
                let mut options = options.clone();
                options.overflow_hidden_enable |= self.overflow_hidden_enable;
                EngineKind::Parallax(options)
            }
            tilt => tilt.clone(),
        }
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn vertical(self) -> Self {
        self.direction(Direction::Vertical)
    }

    pub fn border_radius(mut self, radius: impl Into<String>) -> Self {
        self.border_radius = radius.into();
        self
    }

    pub fn border_width(mut self, width: impl Into<String>) -> Self {
        self.border_width = width.into();
        self
    }

    pub fn border_color(mut self, color: impl Into<String>) -> Self {
        self.border_color = color.into();
        self
    }

    pub fn border_style(mut self, style: impl Into<String>) -> Self {
        self.border_style = style.into();
        self
    }

    pub fn mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    pub fn stiffness(mut self, stiffness: f32) -> Self {
        self.stiffness = stiffness;
        self
    }

    pub fn flipped(mut self, flipped: bool) -> Self {
        self.flipped = Some(flipped);
        self
    }

    pub fn flip_reverse(mut self, reverse: bool) -> Self {
        self.flip_reverse = reverse;
        self
    }

    pub fn flip_back_reverse(mut self, reverse: bool) -> Self {
        self.flip_back_reverse = reverse;
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn overflow_hidden(mut self, enabled: bool) -> Self {
        self.overflow_hidden_enable = enabled;
        self
    }

    pub fn test_ids(mut self, enabled: bool) -> Self {
        self.test_id_enable = enabled;
        self
    }

    pub fn full_page_listening(mut self, enabled: bool) -> Self {
        self.full_page_listening = enabled;
        self
    }

    pub fn control_element_only(mut self, enabled: bool) -> Self {
        self.control_element_only = enabled;
        self
    }

    pub fn shadow(mut self, enabled: bool) -> Self {
        self.shadow_enable = enabled;
        self
    }

    pub fn engine(mut self, kind: EngineKind) -> Self {
        self.engine = kind;
        self
    }
}
