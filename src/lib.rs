#![warn(
    clippy::pedantic,
    future_incompatible,
    missing_debug_implementations,
    missing_docs,
    rust_2018_idioms,
    rust_2021_compatibility
)]
#![allow(clippy::module_name_repetitions)]

//! `loomweave` retrofits stackful coroutines onto JVM class-file bytecode.
//!
//! A user writes an ordinary method that calls a `suspend()` primitive at
//! arbitrary points. This crate rewrites such methods, and every method that
//! transitively reaches one of them, so that the full execution frame
//! (operand stack, local variables, program location) can be captured into a
//! heap object at each such call site and later restored, resuming execution
//! exactly where it left off.
//!
//! The crate is a pure, synchronous, in-memory transform: it consumes a
//! [`ParsedMethod`](rewrite::ParsedMethod) (instructions + exception table +
//! a verifier-computed [`VerifierFrame`](frame::VerifierFrame) per
//! instruction) and produces a [`RewrittenMethod`](rewrite::RewrittenMethod).
//! Class-file parsing and serialization, archive and file I/O, and the
//! runtime library that holds the live continuation at execution time are
//! all external collaborators and out of scope here.
//!
//! ## Features
#![doc = document_features::document_features!()]

pub mod abi;
pub mod codec;
pub mod error;
pub mod fragment;
pub mod frame;
pub mod jvm;
pub mod rewrite;
pub mod slots;
pub mod types;

pub use error::{Error, InvalidRequest, MalformedFrame, Result};
