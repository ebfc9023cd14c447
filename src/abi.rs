//! The fixed runtime ABI: references to the handful of runtime-library
//! methods synthesized code calls into.
//!
//! The runtime library itself (the object holding the live continuation) is
//! out of scope for this crate; these are just the method signatures the
//! codec and rewriter emit calls against. Keeping them in one place means a
//! runtime-library rename is a one-file change here.

use crate::jvm::references::{ClassRef, MethodRef};
use crate::types::method_descriptor::MethodDescriptor;

const CONTINUATION_CLASS: &str = "org/loomweave/runtime/Continuation";
const METHOD_STATE_CLASS: &str = "org/loomweave/runtime/MethodState";
const COROUTINE_CLASS: &str = "org/loomweave/runtime/Coroutine";

/// `Continuation`'s mode value while executing normally.
pub const MODE_NORMAL: i32 = 0;
/// `Continuation`'s mode value while a save fragment is capturing frames.
pub const MODE_SAVING: i32 = 1;
/// `Continuation`'s mode value while a restore fragment is replaying frames.
pub const MODE_RESTORING: i32 = 2;

fn method(owner: &str, name: &str, descriptor: &str) -> MethodRef {
    MethodRef {
        owner: ClassRef::new(owner),
        name: name.to_owned(),
        descriptor: descriptor
            .parse::<MethodDescriptor>()
            .expect("literal ABI descriptor is well-formed"),
    }
}

/// `Continuation`, as referenced by synthesized code.
pub mod continuation {
    use super::{method, CONTINUATION_CLASS};
    use crate::jvm::references::{ClassRef, MethodRef};

    /// The class itself.
    #[must_use]
    pub fn class() -> ClassRef {
        ClassRef::new(CONTINUATION_CLASS)
    }

    /// `int getMode()`.
    #[must_use]
    pub fn get_mode() -> MethodRef {
        method(CONTINUATION_CLASS, "getMode", "()I")
    }

    /// `void setMode(int)`.
    #[must_use]
    pub fn set_mode() -> MethodRef {
        method(CONTINUATION_CLASS, "setMode", "(I)V")
    }

    /// `void push(MethodState)`. Called once per frame, innermost last,
    /// while a save fragment is unwinding the call stack.
    #[must_use]
    pub fn push() -> MethodRef {
        method(
            CONTINUATION_CLASS,
            "push",
            "(Lorg/loomweave/runtime/MethodState;)V",
        )
    }

    /// `MethodState pop()`. Called once per frame, innermost first, while a
    /// restore fragment is replaying the call stack.
    #[must_use]
    pub fn pop() -> MethodRef {
        method(
            CONTINUATION_CLASS,
            "pop",
            "()Lorg/loomweave/runtime/MethodState;",
        )
    }
}

/// `MethodState`, as referenced by synthesized code.
pub mod method_state {
    use super::{method, METHOD_STATE_CLASS};
    use crate::jvm::references::{ClassRef, MethodRef};
    use crate::types::method_descriptor::MethodDescriptor;

    /// The class itself.
    #[must_use]
    pub fn class() -> ClassRef {
        ClassRef::new(METHOD_STATE_CLASS)
    }

    /// `<init>(int, Object[], Object[])`: continuation index, locals, stack.
    #[must_use]
    pub fn constructor() -> MethodDescriptor {
        "(I[Ljava/lang/Object;[Ljava/lang/Object;)V"
            .parse()
            .expect("literal ABI descriptor is well-formed")
    }

    /// `int getContinuationIndex()`.
    #[must_use]
    pub fn get_continuation_index() -> MethodRef {
        method(METHOD_STATE_CLASS, "getContinuationIndex", "()I")
    }

    /// `Object[] getLocals()`.
    #[must_use]
    pub fn get_locals() -> MethodRef {
        method(METHOD_STATE_CLASS, "getLocals", "()[Ljava/lang/Object;")
    }

    /// `Object[] getStack()`.
    #[must_use]
    pub fn get_stack() -> MethodRef {
        method(METHOD_STATE_CLASS, "getStack", "()[Ljava/lang/Object;")
    }
}

/// `Coroutine`, as referenced by synthesized code.
pub mod coroutine {
    use super::{method, COROUTINE_CLASS};
    use crate::jvm::references::MethodRef;

    /// `void run(Continuation)`: the trampoline a rewritten entry point
    /// hands its continuation to when it cannot complete synchronously.
    #[must_use]
    pub fn run() -> MethodRef {
        method(
            COROUTINE_CLASS,
            "run",
            "(Lorg/loomweave/runtime/Continuation;)V",
        )
    }
}
