//! Flipt Tilt Engine Contract
//!
//! A flip panel hands pointer-tracking visuals to a tilt or parallax engine.
//! This crate defines what the panel expects of such an engine:
//!
//! - [`TiltEngine`]: mounts a pointer-tracking surface and renders the
//!   panel's content inside it through a render wrapper
//! - [`TiltHandle`]: the engine's imperative handle (element, angle, reset,
//!   tilt, will-change hint)
//! - [`EngineKind`]: tilt or parallax, each carrying only its own options
//!
//! [`HeadlessEngine`] is a complete engine without pointer tracking, used by
//! hosts that only need the surface and the handle, and by tests.

pub mod engine;
pub mod handle;
pub mod headless;
pub mod options;

pub use engine::{EngineProps, RenderWrapper, TiltEngine};
pub use handle::{Angle, InertHandle, TiltHandle};
pub use headless::{HeadlessEngine, HeadlessHandle};
pub use options::{EngineKind, EngineSettings, ParallaxOptions, TiltOptions};
