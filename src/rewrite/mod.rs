//! C4: the method rewriter.
//!
//! Each method transform is a pure, single-threaded, in-memory function of
//! one [`ParsedMethod`]. Nothing here holds state across calls, so
//! independent methods — even from different classes — can be rewritten
//! concurrently; [`par_rewrite_methods`] is a thin `rayon` convenience for
//! doing exactly that.

pub mod continuation;
pub mod exception;
pub mod method;
pub mod rewriter;

pub use continuation::ContinuationPoint;
pub use exception::ExceptionTableEntry;
pub use method::{ParsedMethod, RewrittenMethod};
pub use rewriter::rewrite_method;

use rayon::prelude::*;

use crate::error::Error;

/// Rewrites every method in `methods`, independently and in parallel.
///
/// Returns one result per input method, in the same order, so a caller can
/// still tell which methods succeeded and which failed rather than
/// aborting the whole batch on the first error.
pub fn par_rewrite_methods(methods: &[ParsedMethod]) -> Vec<Result<RewrittenMethod, Error>> {
    methods.par_iter().map(rewrite_method).collect()
}
