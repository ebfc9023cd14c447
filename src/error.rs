//! The two fatal error kinds the instrumentation pass can raise.
//!
//! Both abort the current method's transform outright: no partial output is
//! ever produced. [`InvalidRequest`] covers programming errors made against
//! this crate's own API (a type tag the codec cannot accept, a constructor
//! submitted for instrumentation, an argument count mismatch). [`MalformedFrame`]
//! covers an inconsistent input: the
//! verifier-computed frame handed to us by the front-end does not shape up
//! (e.g. `void` sitting on the operand stack).

use thiserror::Error;

use crate::types::TypeTag;

/// A programming error against this crate's own API. Surfaced once per
/// violation; the caller's method transform is abandoned.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum InvalidRequest {
    /// A constructor (`<init>`) was submitted for instrumentation.
    #[error("Instrumentation of constructors not allowed")]
    ConstructorNotInstrumentable,

    /// A type tag outside the codec's accepted set (`void` or `method(..)`)
    /// was used where a real value type is required.
    #[error("Type tag {0} is not a valid value type")]
    InvalidTypeTag(TypeTag),

    /// Two slots that are meant to be distinct within one fragment share an
    /// index.
    #[error("Slots {0} and {1} share an index within one fragment")]
    DuplicateSlotIndex(u16, u16),

    /// A call or construct fragment was built with the wrong number of
    /// argument fragments for the target's descriptor.
    #[error("Expected {expected} arguments for {target}, got {actual}")]
    ArgumentCountMismatch {
        /// The method or constructor being invoked.
        target: String,
        /// The number of parameters in its descriptor.
        expected: usize,
        /// The number of argument fragments actually supplied.
        actual: usize,
    },

    /// A builder primitive was handed a fragment it requires but was not
    /// given (a null/empty fragment where one is structurally required).
    #[error("{0}")]
    MissingFragment(&'static str),
}

/// The incoming verifier data for a method is internally inconsistent.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum MalformedFrame {
    /// A stack or local slot carried a pseudo-type (`void` or a method
    /// descriptor) where only real values may appear.
    #[error("Pseudo-type {0} cannot occupy a stack or local slot")]
    PseudoTypeInFrame(TypeTag),

    /// The incoming and outgoing frames of a continuation point disagree on
    /// stack depth in a way the codec cannot reconcile.
    #[error("Stack depth mismatch: expected {expected}, found {actual}")]
    StackDepthMismatch {
        /// The expected depth.
        expected: usize,
        /// The depth actually observed.
        actual: usize,
    },
}

/// The result type used throughout this crate.
pub type Result<T, E = InvalidRequest> = std::result::Result<T, E>;

/// Either fatal error kind, as raised by the method rewriter's top-level
/// entry point, which can fail for either reason depending on what it
/// finds.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum Error {
    /// See [`InvalidRequest`].
    #[error(transparent)]
    InvalidRequest(#[from] InvalidRequest),
    /// See [`MalformedFrame`].
    #[error(transparent)]
    MalformedFrame(#[from] MalformedFrame),
}
