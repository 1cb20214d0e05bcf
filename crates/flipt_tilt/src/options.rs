//! Engine options
//!
//! Settings shared by both engines live in [`EngineSettings`]. Options only
//! one engine understands live on that engine's [`EngineKind`] variant, so a
//! tilt engine never sees parallax multipliers and vice versa.

use serde::{Deserialize, Serialize};

/// Which engine renders the panel surface
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EngineKind {
    Tilt(TiltOptions),
    Parallax(ParallaxOptions),
}

impl Default for EngineKind {
    fn default() -> Self {
        EngineKind::Tilt(TiltOptions::default())
    }
}

impl EngineKind {
    pub fn name(&self) -> &'static str {
        match self {
            EngineKind::Tilt(_) => "tilt",
            EngineKind::Parallax(_) => "parallax",
        }
    }

    pub fn is_parallax(&self) -> bool {
        matches!(self, EngineKind::Parallax(_))
    }
}

/// Options understood only by the tilt engine
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct TiltOptions {
    /// Scale applied while the pointer is over the surface
    #[serde(default = "default_one")]
    pub scale: f32,
    #[serde(default = "default_true")]
    pub spot_glare_enable: bool,
    #[serde(default = "default_true")]
    pub line_glare_enable: bool,
}

impl Default for TiltOptions {
    fn default() -> Self {
        Self {
            scale: 1.0,
            spot_glare_enable: true,
            line_glare_enable: true,
        }
    }
}

/// Options understood only by the parallax engine
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ParallaxOptions {
    #[serde(default)]
    pub animation_reverse: bool,
    #[serde(default = "default_one")]
    pub offset_multiplier: f32,
    #[serde(default = "default_one")]
    pub opacity_multiplier: f32,
    #[serde(default = "default_one")]
    pub scale_multiplier: f32,
    #[serde(default = "default_one")]
    pub rotation_multiplier: f32,
    #[serde(default = "default_one")]
    pub skew_multiplier: f32,
    /// Clip layers that move outside the surface
    #[serde(default)]
    pub overflow_hidden_enable: bool,
}

impl Default for ParallaxOptions {
    fn default() -> Self {
        Self {
            animation_reverse: false,
            offset_multiplier: 1.0,
            opacity_multiplier: 1.0,
            scale_multiplier: 1.0,
            rotation_multiplier: 1.0,
            skew_multiplier: 1.0,
            overflow_hidden_enable: false,
        }
    }
}

/// Settings every engine receives
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct EngineSettings {
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub full_page_listening: bool,
    #[serde(default)]
    pub control_element_only: bool,
    #[serde(default = "default_border_radius")]
    pub border_radius: String,
    #[serde(default = "default_true")]
    pub shadow_enable: bool,
    #[serde(default)]
    pub test_id_enable: bool,
    /// Largest rotation about the X axis, in degrees
    #[serde(default = "default_max_angle")]
    pub tilt_max_angle_x: f32,
    /// Largest rotation about the Y axis, in degrees
    #[serde(default = "default_max_angle")]
    pub tilt_max_angle_y: f32,
    #[serde(default)]
    pub tilt_reverse: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            disabled: false,
            full_page_listening: false,
            control_element_only: false,
            border_radius: default_border_radius(),
            shadow_enable: true,
            test_id_enable: false,
            tilt_max_angle_x: default_max_angle(),
            tilt_max_angle_y: default_max_angle(),
            tilt_reverse: false,
        }
    }
}

fn default_one() -> f32 {
    1.0
}

fn default_true() -> bool {
    true
}

fn default_max_angle() -> f32 {
    20.0
}

fn default_border_radius() -> String {
    "8px".to_string()
}
