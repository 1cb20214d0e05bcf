//! Flip state machine
//!
//! Owns the logical face (a two-state FSM), the animated rotation, and the
//! layer hints the container renders with. Flipping is split in two so the
//! panel can run its callbacks in between:
//!
//! 1. [`FlipStateMachine::begin`] flips the logical face, turns the
//!    will-change hint on, and schedules pointer suppression.
//! 2. [`FlipStateMachine::animate`] drives the rotation toward the new
//!    face's resting value, reading the live rotation at that moment.
//!
//! Layer ops are applied at the start of the next [`tick`](FlipStateMachine::tick),
//! never in the frame that requested them.

use crate::config::FlipConfig;
use flipt_animation::{AnimatedValue, AnimationCompletion, SpringConfig};
use flipt_core::fsm::{EventId, StateId, StateMachine};
use smallvec::SmallVec;

/// Flip states
pub mod states {
    use super::StateId;

    pub const FRONT: StateId = 0;
    pub const BACK: StateId = 1;
}

/// Flip FSM events
pub mod events {
    use super::EventId;

    pub const FLIP: EventId = 1;
}

/// Rotation at which the back face rests
pub const BACK_RESTING: f32 = 0.0;

/// Which face is (logically) showing
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlipSide {
    Front,
    Back,
}

impl FlipSide {
    fn state(self) -> StateId {
        match self {
            FlipSide::Front => states::FRONT,
            FlipSide::Back => states::BACK,
        }
    }
}

/// Deferred changes to the container layer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayerOp {
    SuppressPointer,
    RestorePointer,
}

/// Rendering hints for the rotating container
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LayerHints {
    /// Promote the container while a flip is in flight
    pub will_change: bool,
    /// Ignore pointer input on the container
    pub pointer_events_suppressed: bool,
}

/// Face, rotation, and layer hints of one panel
#[derive(Debug)]
pub struct FlipStateMachine {
    fsm: StateMachine,
    rotation: AnimatedValue,
    spring: SpringConfig,
    front_resting: f32,
    flip_back_reverse: bool,
    hints: LayerHints,
    pending: SmallVec<[LayerOp; 4]>,
}

fn build_fsm(initial: FlipSide) -> StateMachine {
    StateMachine::builder(initial.state())
        .on(states::FRONT, events::FLIP, states::BACK)
        .on(states::BACK, events::FLIP, states::FRONT)
        .build()
}

impl FlipStateMachine {
    pub fn new(config: &FlipConfig) -> Self {
        let initial = if config.flipped == Some(true) {
            FlipSide::Back
        } else {
            FlipSide::Front
        };
        Self {
            fsm: build_fsm(initial),
            rotation: AnimatedValue::new(config.initial_rotation()),
            spring: config.spring_config(),
            front_resting: config.front_resting(),
            flip_back_reverse: config.flip_back_reverse,
            hints: LayerHints::default(),
            pending: SmallVec::new(),
        }
    }

    /// Pick up new spring and resting parameters.
    ///
    /// The face and the rotation are left where they are; the next flip uses
    /// the new values.
    pub fn set_config(&mut self, config: &FlipConfig) {
        self.spring = config.spring_config();
        self.front_resting = config.front_resting();
        self.flip_back_reverse = config.flip_back_reverse;
    }

    pub fn side(&self) -> FlipSide {
        if self.fsm.is_in(states::BACK) {
            FlipSide::Back
        } else {
            FlipSide::Front
        }
    }

    pub fn is_flipped(&self) -> bool {
        self.side() == FlipSide::Back
    }

    /// Current rotation in degrees
    pub fn rotation(&self) -> f32 {
        self.rotation.get()
    }

    pub fn is_animating(&self) -> bool {
        self.rotation.is_animating()
    }

    pub fn hints(&self) -> LayerHints {
        self.hints
    }

    pub fn front_resting(&self) -> f32 {
        self.front_resting
    }

    /// Layer ops waiting for the next tick
    pub fn pending_ops(&self) -> &[LayerOp] {
        &self.pending
    }

    /// Flip the logical face. Returns the face now showing.
    pub fn begin(&mut self) -> FlipSide {
        self.fsm.send(events::FLIP);
        self.hints.will_change = true;
        self.pending.push(LayerOp::SuppressPointer);
        self.side()
    }

    /// Where a flip back to the front heads from the current rotation.
    ///
    /// Without `flip_back_reverse`, a panel that already reached the back
    /// keeps turning the same way and lands on the mirrored resting value.
    pub fn back_target(&self) -> f32 {
        if !self.flip_back_reverse && self.rotation.get().abs() < 90.0 {
            -self.front_resting
        } else {
            self.front_resting
        }
    }

    /// Drive the rotation toward the resting value of `side`
    pub fn animate(&mut self, side: FlipSide) -> AnimationCompletion {
        let completion = match side {
            FlipSide::Back => {
                let current = self.rotation.get();
                if !self.flip_back_reverse && current != self.front_resting {
                    tracing::trace!(from = current, to = self.front_resting, "snapping to front rest");
                    self.rotation.jump(self.front_resting);
                }
                self.rotation.animate_to(BACK_RESTING, self.spring)
            }
            FlipSide::Front => {
                let target = self.back_target();
                self.rotation.animate_to(target, self.spring)
            }
        };

        if !self.rotation.is_animating() {
            self.settle();
        }
        completion
    }

    /// Advance one frame. Returns true if anything the container renders changed.
    pub fn tick(&mut self, dt: f32) -> bool {
        let mut changed = false;
        for op in self.pending.drain(..) {
            self.hints.pointer_events_suppressed = op == LayerOp::SuppressPointer;
            changed = true;
        }

        let was_animating = self.rotation.is_animating();
        changed |= self.rotation.tick(dt);
        if was_animating && !self.rotation.is_animating() {
            self.settle();
            changed = true;
        }
        changed
    }

    fn settle(&mut self) {
        self.hints.will_change = false;
        self.pending.push(LayerOp::RestorePointer);
        tracing::trace!(rotation = self.rotation.get(), "flip settled");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: f32 = 1.0 / 60.0;

    fn run_to_rest(machine: &mut FlipStateMachine) {
        for _ in 0..1200 {
            machine.tick(FRAME);
            if !machine.is_animating() {
                break;
            }
        }
        assert!(!machine.is_animating(), "rotation never settled");
    }

    fn flip(machine: &mut FlipStateMachine) -> AnimationCompletion {
        let side = machine.begin();
        machine.animate(side)
    }

    #[test]
    fn test_initial_state() {
        let machine = FlipStateMachine::new(&FlipConfig::default());
        assert_eq!(machine.side(), FlipSide::Front);
        assert_eq!(machine.rotation(), -180.0);
        assert_eq!(machine.hints(), LayerHints::default());

        let machine = FlipStateMachine::new(&FlipConfig::new().flipped(true));
        assert!(machine.is_flipped());
        assert_eq!(machine.rotation(), 0.0);

        let machine = FlipStateMachine::new(&FlipConfig::new().flip_reverse(true));
        assert_eq!(machine.rotation(), 180.0);
    }

    #[test]
    fn test_flip_reaches_back() {
        let mut machine = FlipStateMachine::new(&FlipConfig::default());
        let done = flip(&mut machine);
        assert!(machine.is_flipped());
        assert!(!done.is_complete());

        run_to_rest(&mut machine);
        assert!(done.is_complete());
        assert_eq!(machine.rotation(), 0.0);
    }

    #[test]
    fn test_flip_back_from_rest_completes_the_turn() {
        let mut machine = FlipStateMachine::new(&FlipConfig::default());
        flip(&mut machine);
        run_to_rest(&mut machine);

        assert_eq!(machine.back_target(), 180.0);
        flip(&mut machine);
        run_to_rest(&mut machine);
        assert!(!machine.is_flipped());
        assert_eq!(machine.rotation(), 180.0);
    }

    #[test]
    fn test_early_flip_back_reverses() {
        let mut machine = FlipStateMachine::new(&FlipConfig::default());
        flip(&mut machine);
        machine.tick(FRAME);
        assert!(machine.rotation().abs() > 90.0);

        flip(&mut machine);
        run_to_rest(&mut machine);
        assert_eq!(machine.rotation(), -180.0);
    }

    #[test]
    fn test_flip_back_reverse_always_returns() {
        let mut machine = FlipStateMachine::new(&FlipConfig::new().flip_back_reverse(true));
        flip(&mut machine);
        run_to_rest(&mut machine);

        assert_eq!(machine.back_target(), -180.0);
        flip(&mut machine);
        run_to_rest(&mut machine);
        assert_eq!(machine.rotation(), -180.0);
    }

    #[test]
    fn test_forward_flip_snaps_to_front_rest() {
        let mut machine = FlipStateMachine::new(&FlipConfig::default());
        flip(&mut machine);
        run_to_rest(&mut machine);
        flip(&mut machine);
        run_to_rest(&mut machine);
        assert_eq!(machine.rotation(), 180.0);

        // Mirrored rest: jump to -180 before heading for the back again
        machine.begin();
        machine.animate(FlipSide::Back);
        assert_eq!(machine.rotation(), -180.0);
        assert_eq!(machine.rotation.target(), BACK_RESTING);
    }

    #[test]
    fn test_forward_flip_with_reverse_does_not_snap() {
        let mut machine = FlipStateMachine::new(&FlipConfig::new().flip_back_reverse(true));
        flip(&mut machine);
        machine.tick(FRAME);
        let mid = machine.rotation();

        flip(&mut machine);
        flip(&mut machine);
        assert_eq!(machine.rotation(), mid);
    }

    #[test]
    fn test_hints_follow_frames() {
        let mut machine = FlipStateMachine::new(&FlipConfig::default());
        flip(&mut machine);

        // Requested this frame, applied next frame
        assert!(machine.hints().will_change);
        assert!(!machine.hints().pointer_events_suppressed);
        assert_eq!(machine.pending_ops(), &[LayerOp::SuppressPointer]);

        machine.tick(FRAME);
        assert!(machine.hints().pointer_events_suppressed);

        run_to_rest(&mut machine);
        assert!(!machine.hints().will_change);
        assert!(machine.hints().pointer_events_suppressed);

        machine.tick(FRAME);
        assert!(!machine.hints().pointer_events_suppressed);
        assert!(machine.pending_ops().is_empty());
    }

    #[test]
    fn test_superseded_flip_keeps_hints_until_rest() {
        let mut machine = FlipStateMachine::new(&FlipConfig::default());
        let first = flip(&mut machine);
        machine.tick(FRAME);
        let second = flip(&mut machine);

        assert!(first.is_complete());
        assert!(!second.is_complete());
        assert!(machine.hints().will_change);
    }

    #[test]
    fn test_noop_animation_settles_immediately() {
        let mut machine = FlipStateMachine::new(&FlipConfig::new().flip_back_reverse(true));
        // Already resting on the front: animating there finishes at once
        let done = machine.animate(FlipSide::Front);
        assert!(done.is_complete());
        assert!(!machine.hints().will_change);
        assert_eq!(machine.pending_ops(), &[LayerOp::RestorePointer]);
    }

    #[test]
    fn test_parity() {
        let mut machine = FlipStateMachine::new(&FlipConfig::default());
        for n in 1..=7 {
            flip(&mut machine);
            machine.tick(FRAME);
            assert_eq!(machine.is_flipped(), n % 2 == 1);
        }
    }

    #[test]
    fn test_set_config_keeps_face() {
        let mut machine = FlipStateMachine::new(&FlipConfig::default());
        flip(&mut machine);
        machine.set_config(&FlipConfig::new().flip_reverse(true));
        assert!(machine.is_flipped());
        assert_eq!(machine.front_resting(), 180.0);
    }
}
