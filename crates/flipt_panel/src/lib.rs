//! Flipt Flip Panel
//!
//! A two-sided panel that flips between a front and a back face with spring
//! physics. Hover, touch, and the keyboard flip it; external control elements
//! or the whole document can drive it instead of the panel's own surface.
//!
//! # Features
//!
//! - **Spring flips**: interruptible rotation with configurable mass and stiffness
//! - **Input routing**: pointer, touch, keyboard, and focus, with guards for
//!   disabled and forced-face panels
//! - **Control elements**: drive the panel from other elements or the document
//! - **Tilt engines**: the back face sits on a tilt or parallax surface
//! - **Imperative handle**: flip controls merged with the engine's handle
//!
//! # Example
//!
//! ```rust
//! use flipt_core::dom::Document;
//! use flipt_panel::{FlipConfig, FlipPanel};
//!
//! let doc = Document::new();
//! let panel = FlipPanel::builder()
//!     .config(FlipConfig::new().vertical().stiffness(200.0))
//!     .front("front.png")
//!     .back("back.png")
//!     .on_flip(|_| println!("showing the back"))
//!     .build();
//! panel.mount(&doc, None);
//!
//! let done = panel.flip();
//! while panel.tick(1.0 / 60.0) {}
//! assert!(done.is_complete());
//! assert!(panel.is_flipped());
//! ```

pub mod config;
pub mod error;
pub mod handle;
pub mod panel;
pub mod render;
pub mod router;
pub mod state;

pub use config::{Direction, FlipConfig};
pub use error::{FliptError, Result};
pub use handle::{FlipCompletion, FlipControl, HandleRef, UnifiedHandle};
pub use panel::{FlipCallback, FlipPanel, FlipPanelBuilder};
pub use render::FaceContent;
pub use router::{ControlTarget, ElementRef, Intent};
pub use state::{FlipSide, LayerHints};

pub use flipt_animation::AnimationCompletion;
