//! C3: the frame-state codec.
//!
//! Translates a [`crate::frame::VerifierFrame`] into a pair of exact-dual
//! [`crate::fragment::Fragment`]s: [`save::build`] captures the live frame
//! into a `MethodState` and hands it to the runtime continuation, and
//! [`restore::build`] reconstructs the same frame from a popped
//! `MethodState`. Primitive values round-trip through their own wrapper
//! class, never a substitute (most notably: `long` through `Long`, never
//! `Double`); reference values round-trip as themselves, downcast back to
//! their declared type on the way out.

pub mod boxing;
pub mod restore;
pub mod save;

pub use boxing::{box_value, unbox_value};
pub use restore::{build_from_state, pop_state};
