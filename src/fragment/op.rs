//! The tagged-variant instruction set fragments are built from.
//!
//! This is deliberately smaller than a full JVM opcode enumeration: it is
//! the set of instruction *families* the save/restore codec and the method
//! rewriter actually emit, modeled closely enough to real bytecode that an
//! external serializer can lower each case to concrete opcodes
//! mechanically (e.g. [`Op::Load`] picks `iload`/`lload`/`fload`/`dload`/
//! `aload` by the carried type).

use super::label::Label;
use crate::jvm::references::{ClassRef, MethodRef};
use crate::types::field_type::FieldType;

/// How a method invocation dispatches.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum InvokeKind {
    /// `invokestatic`.
    Static,
    /// `invokevirtual`.
    Virtual,
    /// `invokespecial` (constructors and private/super calls).
    Special,
    /// `invokeinterface`.
    Interface,
}

/// One instruction or pseudo-instruction in a [`super::Fragment`].
#[derive(Debug, Clone)]
pub enum Op {
    /// Does nothing.
    Nop,
    /// Pushes a constant `int`.
    PushInt(i32),
    /// Pushes a constant `String`.
    PushString(String),
    /// Pushes the `null` reference.
    PushNull,
    /// Discards the top single-slot stack value.
    Pop,
    /// Duplicates the top single-slot stack value.
    Dup,
    /// Loads a local onto the stack, typed.
    Load {
        /// The local-variable index.
        index: u16,
        /// The static type, used to pick the load opcode and, for
        /// references, to downcast after the load.
        ty: FieldType,
    },
    /// Stores the top of the stack into a local, typed.
    Store {
        /// The local-variable index.
        index: u16,
        /// The static type, used to pick the store opcode.
        ty: FieldType,
    },
    /// Allocates a new, uninitialized instance of a class (`new`).
    New(ClassRef),
    /// Allocates a new `Object[]` of the length on top of the stack
    /// (`anewarray java/lang/Object`).
    NewObjectArray,
    /// Reads `array[index]` (`aaload`): pops index, then array ref; pushes
    /// the element.
    ArrayLoad,
    /// Writes `array[index] = value` (`aastore`): pops value, index, array
    /// ref.
    ArrayStore,
    /// Invokes a method or constructor.
    Invoke {
        /// The dispatch kind.
        kind: InvokeKind,
        /// The target.
        method: MethodRef,
    },
    /// Downcasts the reference on top of the stack (`checkcast`).
    CheckCast(FieldType),
    /// Throws the reference on top of the stack (`athrow`).
    Throw,
    /// Returns from the method. `None` is `return` (void); `Some(ty)` is
    /// the type-appropriate `?return` with the value already on the stack.
    Return(Option<FieldType>),
    /// Unconditional jump (`goto`).
    Jump(Label),
    /// Pops two ints; jumps if equal, falls through otherwise
    /// (`if_icmpeq`).
    IfICmpEq(Label),
    /// A dense switch on the `int` popped from the stack (`tableswitch`).
    TableSwitch {
        /// The value of the first (zero-indexed) case.
        low: i32,
        /// The jump target for each case, in ascending order.
        targets: Vec<Label>,
        /// The jump target when the value matches no case.
        default: Label,
    },
}
