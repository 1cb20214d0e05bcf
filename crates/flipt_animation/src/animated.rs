//! Animated values
//!
//! An [`AnimatedValue`] is a scalar driven by a [`Spring`]. The owner reads
//! it with [`get`](AnimatedValue::get), moves it with
//! [`animate_to`](AnimatedValue::animate_to) or [`jump`](AnimatedValue::jump),
//! and advances it once per frame with [`tick`](AnimatedValue::tick).
//!
//! Each `animate_to` hands back an [`AnimationCompletion`]. It resolves when
//! that animation comes to rest, or when a later `animate_to`/`jump`
//! supersedes it. Retargeting never queues: the spring keeps its velocity and
//! heads for the new target.
//!
//! ```rust
//! use flipt_animation::{AnimatedValue, SpringConfig};
//!
//! let mut rotate = AnimatedValue::new(-180.0);
//! let done = rotate.animate_to(0.0, SpringConfig::stiff());
//! assert!(rotate.is_animating());
//!
//! while rotate.is_animating() {
//!     rotate.tick(1.0 / 60.0);
//! }
//! assert!(done.is_complete());
//! assert_eq!(rotate.get(), 0.0);
//! ```

use crate::spring::{Spring, SpringConfig};
use std::future::{Future, IntoFuture};
use std::pin::Pin;
use tokio::sync::watch;

/// A spring-driven scalar with per-animation completion tracking
#[derive(Debug)]
pub struct AnimatedValue {
    spring: Spring,
    animating: bool,
    /// Id of the most recently started animation
    generation: u64,
    /// Highest animation id that has finished (settled or superseded)
    finished: watch::Sender<u64>,
}

impl AnimatedValue {
    /// Create a value at rest
    pub fn new(initial: f32) -> Self {
        let (finished, _) = watch::channel(0);
        Self {
            spring: Spring::new(SpringConfig::default(), initial),
            animating: false,
            generation: 0,
            finished,
        }
    }

    /// Current value
    pub fn get(&self) -> f32 {
        self.spring.value()
    }

    pub fn velocity(&self) -> f32 {
        self.spring.velocity()
    }

    /// Where the current (or last) animation is heading
    pub fn target(&self) -> f32 {
        self.spring.target()
    }

    pub fn is_animating(&self) -> bool {
        self.animating
    }

    /// Set the value instantly, stopping any animation in flight
    pub fn jump(&mut self, value: f32) {
        self.spring.snap(value);
        if self.animating {
            tracing::trace!(value, "jump interrupted animation {}", self.generation);
            self.animating = false;
            self.finish();
        }
    }

    /// Animate toward `target` with the given spring.
    ///
    /// Any animation already in flight is superseded and its completion
    /// resolves immediately.
    pub fn animate_to(&mut self, target: f32, config: SpringConfig) -> AnimationCompletion {
        if self.animating {
            self.finish();
        }

        self.generation += 1;
        let completion = AnimationCompletion {
            finished: self.finished.subscribe(),
            generation: self.generation,
        };

        self.spring.set_config(config);
        self.spring.set_target(target);
        self.animating = !self.spring.is_settled();
        if self.animating {
            tracing::trace!(from = self.get(), target, "animation {} started", self.generation);
        } else {
            self.spring.snap(target);
            self.finish();
        }
        completion
    }

    /// Advance by `dt` seconds. Returns true if the value moved.
    pub fn tick(&mut self, dt: f32) -> bool {
        if !self.animating {
            return false;
        }
        let before = self.spring.value();
        if self.spring.step(dt) {
            self.animating = false;
            self.finish();
        }
        self.spring.value() != before
    }

    fn finish(&self) {
        self.finished.send_replace(self.generation);
    }
}

/// Resolves when one particular animation has finished
#[derive(Clone, Debug)]
pub struct AnimationCompletion {
    finished: watch::Receiver<u64>,
    generation: u64,
}

impl AnimationCompletion {
    /// A completion that is already resolved
    pub fn ready() -> Self {
        let (_, finished) = watch::channel(u64::MAX);
        Self {
            finished,
            generation: 0,
        }
    }

    /// Check without waiting
    pub fn is_complete(&self) -> bool {
        *self.finished.borrow() >= self.generation
    }

    /// Wait until the animation settles or is superseded.
    ///
    /// Also resolves if the animated value is dropped.
    pub async fn wait(mut self) {
        if self.is_complete() {
            return;
        }
        let generation = self.generation;
        let _ = self.finished.wait_for(|done| *done >= generation).await;
    }
}

impl IntoFuture for AnimationCompletion {
    type Output = ();
    type IntoFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.wait())
    }
}
