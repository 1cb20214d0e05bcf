//! Imperative engine handle

use flipt_core::dom::{ElementId, ElementSource};

/// Pointer tilt, in degrees about each axis
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Angle {
    pub angle_x: f32,
    pub angle_y: f32,
}

impl Angle {
    pub const ZERO: Angle = Angle {
        angle_x: 0.0,
        angle_y: 0.0,
    };

    pub fn new(angle_x: f32, angle_y: f32) -> Self {
        Self { angle_x, angle_y }
    }
}

/// Control surface an engine exposes once mounted
pub trait TiltHandle: ElementSource {
    /// Current tilt angle
    fn angle(&self) -> Angle;

    /// Return to the untilted resting pose
    fn reset(&self);

    /// Tilt programmatically
    fn tilt(&self, angle: Angle);

    /// Toggle the engine's own will-change hint
    fn update_will_change(&self, enabled: bool);
}

/// Stand-in used before an engine has mounted
#[derive(Clone, Copy, Debug, Default)]
pub struct InertHandle;

impl ElementSource for InertHandle {
    fn element(&self) -> Option<ElementId> {
        None
    }
}

impl TiltHandle for InertHandle {
    fn angle(&self) -> Angle {
        Angle::ZERO
    }

    fn reset(&self) {}

    fn tilt(&self, _angle: Angle) {}

    fn update_will_change(&self, _enabled: bool) {}
}
