//! State Machine Runtime
//!
//! Flat state machines for widget interaction states. A widget declares its
//! states and the events that move between them; the machine answers "where
//! am I now" synchronously, which is what event handlers need when they race
//! with in-flight animations.

use smallvec::SmallVec;

/// Identifier for a state within a state machine
pub type StateId = u32;

/// Identifier for an event type
pub type EventId = u32;

/// A transition in the state machine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Transition {
    from_state: StateId,
    event: EventId,
    to_state: StateId,
}

/// Builder for creating state machines
pub struct StateMachineBuilder {
    initial_state: StateId,
    transitions: SmallVec<[Transition; 4]>,
}

impl StateMachineBuilder {
    pub fn new(initial_state: StateId) -> Self {
        Self {
            initial_state,
            transitions: SmallVec::new(),
        }
    }

    /// Add a transition (from, event, to)
    pub fn on(mut self, from: StateId, event: EventId, to: StateId) -> Self {
        self.transitions.push(Transition {
            from_state: from,
            event,
            to_state: to,
        });
        self
    }

    pub fn build(self) -> StateMachine {
        StateMachine {
            current_state: self.initial_state,
            transitions: self.transitions,
        }
    }
}

/// A state machine instance
#[derive(Debug)]
pub struct StateMachine {
    current_state: StateId,
    transitions: SmallVec<[Transition; 4]>,
}

impl StateMachine {
    pub fn builder(initial_state: StateId) -> StateMachineBuilder {
        StateMachineBuilder::new(initial_state)
    }

    pub fn current_state(&self) -> StateId {
        self.current_state
    }

    pub fn is_in(&self, state: StateId) -> bool {
        self.current_state == state
    }

    /// Send an event, returning the (possibly unchanged) current state
    pub fn send(&mut self, event: EventId) -> StateId {
        let current = self.current_state;
        let Some(to_state) = self
            .transitions
            .iter()
            .find(|t| t.from_state == current && t.event == event)
            .map(|t| t.to_state)
        else {
            return current;
        };

        self.current_state = to_state;
        tracing::trace!(from = current, event, to = to_state, "fsm transition");
        to_state
    }
}
