//! Flipt Animation System
//!
//! Spring physics and animated scalar values.
//!
//! # Features
//!
//! - **Spring Physics**: RK4-integrated springs with stiffness, damping, mass
//! - **Animated Values**: `get`/`jump`/`animate_to` over a spring, ticked per frame
//! - **Interruptible**: Retargeting keeps velocity; superseded animations resolve
//! - **Awaitable**: Every `animate_to` returns a completion usable with `.await`

pub mod animated;
pub mod spring;

pub use animated::{AnimatedValue, AnimationCompletion};
pub use spring::{Spring, SpringConfig};
