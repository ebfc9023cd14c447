//! The rewriter's input and output contracts.

use crate::fragment::Fragment;
use crate::jvm::access_flags::MethodAccessFlags;
use crate::jvm::references::MethodRef;

use super::continuation::ContinuationPoint;
use super::exception::ExceptionTableEntry;

/// A method as handed to the rewriter: its original body, verifier-computed
/// continuation points, and original frame size.
///
/// Producing this — parsing the class file, running a verifier-equivalent
/// frame analysis, and deciding which call sites may transitively reach
/// `suspend()` — is the job of an external front end and out of scope for
/// this crate.
#[derive(Debug, Clone)]
pub struct ParsedMethod {
    /// The method's own name, owner, and descriptor (before any
    /// instrumentation-driven change).
    pub identifier: MethodRef,
    /// The method's access flags.
    pub access_flags: MethodAccessFlags,
    /// The original `max_locals`: the local-variable frame size before the
    /// rewriter reserves any of its own slots.
    pub max_locals: u16,
    /// The original `max_stack`.
    pub max_stack: u16,
    /// The method's body.
    pub body: Fragment,
    /// The method's exception table.
    pub exception_table: Vec<ExceptionTableEntry>,
    /// Every call site in this method that may transitively reach
    /// `suspend()`, in the order they appear in `body`. Empty means this
    /// method cannot reach `suspend()` and the rewrite is a no-op.
    pub continuation_points: Vec<ContinuationPoint>,
}

/// A method after instrumentation.
#[derive(Debug, Clone)]
pub struct RewrittenMethod {
    /// The method's identifier. Unchanged for a pass-through (no
    /// continuation points); for an instrumented method, its descriptor
    /// gains one trailing parameter for the runtime continuation.
    pub identifier: MethodRef,
    /// The method's access flags. Never changed by the rewriter.
    pub access_flags: MethodAccessFlags,
    /// The new `max_locals`, covering every slot the rewriter reserved.
    pub max_locals: u16,
    /// The new `max_stack`. The rewriter's own synthesized code never
    /// pushes more than a handful of values at once; this is the larger of
    /// the original bound and whatever the synthesized code needs.
    pub max_stack: u16,
    /// The rewritten body.
    pub body: Fragment,
    /// The rewritten exception table.
    pub exception_table: Vec<ExceptionTableEntry>,
}
