//! Camera input: pointer actions and the orbit controller.
//!
//! # Invariants
//! - Hosts map platform events to [`ControlInput`]; the controller never sees raw events.
//! - The controller is bound to exactly one camera and one surface element.

pub mod action;
mod orbit;

pub use action::{ControlInput, PointerButton, PointerTracker};
pub use orbit::OrbitControls;
