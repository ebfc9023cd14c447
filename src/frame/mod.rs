//! Verifier frames: the typed operand-stack and local-variable shapes the
//! codec and rewriter consume at each program point.
//!
//! Computing these is explicitly out of scope for this crate (it is the job
//! of a full bytecode verifier / frame-analysis engine sitting upstream of
//! the rewriter); this module only defines the shape that engine's output
//! must take.

use crate::error::{MalformedFrame, Result};
use crate::types::TypeTag;

/// The typed shape of the operand stack and local variables at one program
/// point.
///
/// `stack` is logical: one entry per value actually occupying the operand
/// stack, regardless of width (a `long` contributes exactly one
/// [`TypeTag`], not two). `locals` is physical: indexed by raw
/// local-variable slot, so the second slot of a `long` or `double` local is
/// `None` rather than a duplicate of the first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifierFrame {
    stack: Vec<TypeTag>,
    locals: Vec<Option<TypeTag>>,
}

impl VerifierFrame {
    /// Builds a frame from its stack and locals, rejecting any pseudo-type
    /// (`void` or a method descriptor) occupying a slot.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedFrame::PseudoTypeInFrame`] if any stack or local
    /// entry is not a real value.
    pub fn new(stack: Vec<TypeTag>, locals: Vec<Option<TypeTag>>) -> Result<Self, MalformedFrame> {
        for tag in stack.iter().chain(locals.iter().flatten()) {
            if !tag.is_value() {
                return Err(MalformedFrame::PseudoTypeInFrame(tag.clone()));
            }
        }
        Ok(Self { stack, locals })
    }

    /// The operand stack, bottom first, one entry per logical value.
    #[must_use]
    pub fn stack(&self) -> &[TypeTag] {
        &self.stack
    }

    /// The local variables, indexed by raw slot. `None` marks either an
    /// unoccupied slot or the non-first slot of a dual-width value.
    #[must_use]
    pub fn locals(&self) -> &[Option<TypeTag>] {
        &self.locals
    }

    /// The number of logical values on the operand stack.
    #[must_use]
    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    /// Checks that this frame's stack depth matches an expected depth
    /// (e.g. the depth recorded when a continuation point was discovered).
    ///
    /// # Errors
    ///
    /// Returns [`MalformedFrame::StackDepthMismatch`] on disagreement.
    pub fn expect_stack_depth(&self, expected: usize) -> Result<(), MalformedFrame> {
        if self.stack.len() == expected {
            Ok(())
        } else {
            Err(MalformedFrame::StackDepthMismatch {
                expected,
                actual: self.stack.len(),
            })
        }
    }
}
