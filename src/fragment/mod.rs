//! C1: the instruction builder.
//!
//! A [`Fragment`] is a short, label-addressed run of instructions with a
//! documented net stack effect. The save/restore codec ([`crate::codec`])
//! and the method rewriter ([`crate::rewrite`]) are assembled entirely out
//! of [`builder`]'s primitives, never by constructing [`Op`] values
//! directly, so every synthesized sequence stays independently reviewable.

pub mod builder;
pub mod label;
pub mod list;
pub mod op;

pub use label::{Label, LabelFactory};
pub use list::{Fragment, Node};
pub use op::{InvokeKind, Op};
