//! C1: primitives for composing [`Fragment`]s.
//!
//! Every function here returns a self-contained, independently verifiable
//! fragment with a documented net stack effect. The method rewriter
//! ([`crate::rewrite`]) and the frame-state codec ([`crate::codec`]) are
//! built entirely out of these; neither pushes a raw [`Op`] directly.

use super::label::{Label, LabelFactory};
use super::list::{Fragment, Node};
use super::op::{InvokeKind, Op};
use crate::error::{InvalidRequest, Result};
use crate::jvm::references::{ClassRef, MethodRef};
use crate::slots::Slot;
use crate::types::field_type::FieldType;
use crate::types::method_descriptor::MethodDescriptor;

/// The empty fragment. Net effect: none.
#[must_use]
pub fn empty() -> Fragment {
    Fragment::empty()
}

/// Concatenates fragments in order. Net effect: the concatenation of each
/// fragment's effect, in order.
#[must_use]
pub fn merge<I: IntoIterator<Item = Fragment>>(fragments: I) -> Fragment {
    Fragment::merge(fragments)
}

/// Marks a jump target. Net effect: none.
#[must_use]
pub fn label(at: Label) -> Fragment {
    Fragment::single(Node::LabelDef(at))
}

/// An unconditional jump. Net effect: none (control transfers away).
#[must_use]
pub fn jump(to: Label) -> Fragment {
    Fragment::single(Node::Instruction(Op::Jump(to)))
}

/// Tags the following instruction with a source line, purely for
/// diagnosability of synthesized code. Net effect: none.
#[must_use]
pub fn line(number: u32) -> Fragment {
    Fragment::single(Node::Line(number))
}

/// Pushes a constant `int`. Net effect: `-> int`.
#[must_use]
pub fn push_int(value: i32) -> Fragment {
    Fragment::single(Node::Instruction(Op::PushInt(value)))
}

/// Pushes a constant `String`. Net effect: `-> String`.
#[must_use]
pub fn push_string(value: impl Into<String>) -> Fragment {
    Fragment::single(Node::Instruction(Op::PushString(value.into())))
}

/// Pushes `null`. Net effect: `-> null`.
#[must_use]
pub fn push_null() -> Fragment {
    Fragment::single(Node::Instruction(Op::PushNull))
}

/// Discards the top single-slot value. Net effect: `value ->`.
#[must_use]
pub fn pop() -> Fragment {
    Fragment::single(Node::Instruction(Op::Pop))
}

/// Duplicates the top single-slot value. Net effect: `value -> value, value`.
#[must_use]
pub fn dup() -> Fragment {
    Fragment::single(Node::Instruction(Op::Dup))
}

/// Loads a local onto the stack by raw index, bypassing [`Slot`] ownership.
/// Used to read locals the rewriter did not itself allocate, i.e. the
/// original method's own parameters and locals. Net effect: `-> value`.
#[must_use]
pub fn load_index(index: u16, ty: FieldType) -> Fragment {
    Fragment::single(Node::Instruction(Op::Load { index, ty }))
}

/// Stores the top of the stack into a local by raw index, bypassing
/// [`Slot`] ownership. Net effect: `value ->`.
#[must_use]
pub fn store_index(index: u16, ty: FieldType) -> Fragment {
    Fragment::single(Node::Instruction(Op::Store { index, ty }))
}

/// Loads a slot's value onto the stack. Net effect: `-> value`.
#[must_use]
pub fn load(slot: &Slot) -> Fragment {
    load_index(slot.index(), slot.ty().clone())
}

/// Stores the top of the stack into a slot. Net effect: `value ->`.
#[must_use]
pub fn store(slot: &Slot) -> Fragment {
    store_index(slot.index(), slot.ty().clone())
}

/// Reads `array[index]` (object-array element). Net effect:
/// `array, index -> value`.
#[must_use]
pub fn array_load() -> Fragment {
    Fragment::single(Node::Instruction(Op::ArrayLoad))
}

/// Writes `array[index] = value` (object-array element). Net effect:
/// `array, index, value ->`.
#[must_use]
pub fn array_store() -> Fragment {
    Fragment::single(Node::Instruction(Op::ArrayStore))
}

/// Allocates a fresh `Object[]` whose length is on top of the stack. Net
/// effect: `length -> array`.
#[must_use]
pub fn new_object_array() -> Fragment {
    Fragment::single(Node::Instruction(Op::NewObjectArray))
}

/// Downcasts the reference on top of the stack. Net effect:
/// `value -> value` (same reference, narrowed static type).
#[must_use]
pub fn check_cast(ty: FieldType) -> Fragment {
    Fragment::single(Node::Instruction(Op::CheckCast(ty)))
}

/// Throws the reference on top of the stack. Net effect: `exception ->`
/// (control never falls through).
#[must_use]
pub fn throw() -> Fragment {
    Fragment::single(Node::Instruction(Op::Throw))
}

/// Constructs `new java.lang.RuntimeException(message)` and throws it. Net
/// effect: none falls through; this is always the last fragment on its
/// control-flow path.
#[must_use]
pub fn throw_runtime(message: impl Into<String>) -> Fragment {
    let owner = ClassRef::new("java/lang/RuntimeException");
    let descriptor: MethodDescriptor = "(Ljava/lang/String;)V"
        .parse()
        .expect("literal descriptor is well-formed");
    merge([
        Fragment::single(Node::Instruction(Op::New(owner.clone()))),
        dup(),
        push_string(message),
        Fragment::single(Node::Instruction(Op::Invoke {
            kind: InvokeKind::Special,
            method: MethodRef {
                owner,
                name: MethodRef::CONSTRUCTOR_NAME.to_owned(),
                descriptor,
            },
        })),
        throw(),
    ])
}

/// Constructs a new instance of `owner` via `descriptor`'s constructor,
/// evaluating `args` (one fragment per parameter, each leaving exactly one
/// value on the stack) in order. Net effect: `-> instance`.
///
/// # Errors
///
/// Returns [`InvalidRequest::ArgumentCountMismatch`] if `args.len()` does
/// not match `descriptor.parameters_types.len()`.
pub fn construct(
    owner: ClassRef,
    descriptor: MethodDescriptor,
    args: Vec<Fragment>,
) -> Result<Fragment> {
    if args.len() != descriptor.parameters_types.len() {
        return Err(InvalidRequest::ArgumentCountMismatch {
            target: format!("{owner}::<init>"),
            expected: descriptor.parameters_types.len(),
            actual: args.len(),
        });
    }
    let method = MethodRef {
        owner: owner.clone(),
        name: MethodRef::CONSTRUCTOR_NAME.to_owned(),
        descriptor,
    };
    Ok(merge([
        Fragment::single(Node::Instruction(Op::New(owner))),
        dup(),
        merge(args),
        Fragment::single(Node::Instruction(Op::Invoke {
            kind: InvokeKind::Special,
            method,
        })),
    ]))
}

/// Invokes `method`. `receiver` is `None` for a static call, else a fragment
/// leaving the receiver reference on the stack. `args`, one fragment per
/// parameter, are evaluated in order after the receiver. Net effect:
/// `[receiver], args... -> [result]`.
///
/// # Errors
///
/// Returns [`InvalidRequest::ArgumentCountMismatch`] if `args.len()` does
/// not match `method.descriptor.parameters_types.len()`.
pub fn call(kind: InvokeKind, method: MethodRef, receiver: Option<Fragment>, args: Vec<Fragment>) -> Result<Fragment> {
    if args.len() != method.descriptor.parameters_types.len() {
        return Err(InvalidRequest::ArgumentCountMismatch {
            target: method.to_string(),
            expected: method.descriptor.parameters_types.len(),
            actual: args.len(),
        });
    }
    let receiver = receiver.unwrap_or_else(Fragment::empty);
    Ok(merge([
        receiver,
        merge(args),
        Fragment::single(Node::Instruction(Op::Invoke { kind, method })),
    ]))
}

/// Returns from the method. `value` is `None` for `return` (void), or a
/// fragment leaving the type-appropriate return value on the stack. Net
/// effect: control leaves the method.
#[must_use]
pub fn return_value(ty: Option<FieldType>, value: Fragment) -> Fragment {
    merge([
        value,
        Fragment::single(Node::Instruction(Op::Return(ty))),
    ])
}

/// Returns a placeholder value of the given type without having run the
/// method body. Used for the dispatcher's unreachable default case, where
/// the verifier still requires every path to return the declared type.
/// `None` is `void`. Net effect: control leaves the method.
#[must_use]
pub fn return_dummy(ty: Option<FieldType>) -> Fragment {
    let Some(field_type) = ty else {
        return Fragment::single(Node::Instruction(Op::Return(None)));
    };
    let push_default = match &field_type {
        FieldType::Base(_) => push_int(0),
        FieldType::Object(_) | FieldType::Array(_) => push_null(),
    };
    merge([
        push_default,
        Fragment::single(Node::Instruction(Op::Return(Some(field_type)))),
    ])
}

/// A two-way branch on integer equality. Evaluates `then` if the two
/// compared ints are equal, `otherwise` if not; both sides converge
/// afterward. Net effect: `lhs, rhs -> ` followed by either side's effect,
/// which must agree between `then` and `otherwise`.
#[must_use]
pub fn if_eq(then: Fragment, otherwise: Fragment, factory: &mut LabelFactory) -> Fragment {
    let then_label = factory.fresh();
    let end_label = factory.fresh();
    merge([
        Fragment::single(Node::Instruction(Op::IfICmpEq(then_label))),
        otherwise,
        jump(end_label),
        label(then_label),
        then,
        label(end_label),
    ])
}

/// A dense switch on the `int` popped from the stack. `cases[i]` runs when
/// the popped value is `low + i`; `default` runs otherwise. All branches
/// converge afterward. Net effect: `value ->` followed by whichever branch
/// ran, which must agree across all branches.
#[must_use]
pub fn table_switch(low: i32, cases: Vec<Fragment>, default: Fragment, factory: &mut LabelFactory) -> Fragment {
    let case_labels: Vec<Label> = cases.iter().map(|_| factory.fresh()).collect();
    let default_label = factory.fresh();
    let end_label = factory.fresh();

    let dispatch = Fragment::single(Node::Instruction(Op::TableSwitch {
        low,
        targets: case_labels.clone(),
        default: default_label,
    }));
    let case_bodies = case_labels.into_iter().zip(cases).map(|(case_label, body)| {
        merge([label(case_label), body, jump(end_label)])
    });
    merge(
        std::iter::once(dispatch)
            .chain(case_bodies)
            .chain([label(default_label), default, label(end_label)]),
    )
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::types::field_type::PrimitiveType;

    #[test]
    fn construct_rejects_wrong_argument_count() {
        let descriptor: MethodDescriptor = "(I)V".parse().unwrap();
        let err = construct(ClassRef::new("com/example/Widget"), descriptor, vec![]).unwrap_err();
        assert!(matches!(err, InvalidRequest::ArgumentCountMismatch { expected: 1, actual: 0, .. }));
    }

    #[test]
    fn call_accepts_matching_argument_count() {
        let descriptor: MethodDescriptor = "(I)V".parse().unwrap();
        let method = MethodRef {
            owner: ClassRef::new("com/example/Widget"),
            name: "accept".to_owned(),
            descriptor,
        };
        let fragment = call(InvokeKind::Virtual, method, Some(push_null()), vec![push_int(1)]).unwrap();
        assert_eq!(fragment.len(), 3);
    }

    #[test]
    fn if_eq_defines_two_labels_and_converges() {
        let mut factory = LabelFactory::new();
        let fragment = if_eq(push_int(1), push_int(0), &mut factory);
        assert_eq!(fragment.labels().len(), 2);
    }

    #[test]
    fn table_switch_defines_a_label_per_case_plus_default_and_end() {
        let mut factory = LabelFactory::new();
        let fragment = table_switch(0, vec![push_int(1), push_int(2)], push_int(0), &mut factory);
        assert_eq!(fragment.labels().len(), 4);
    }

    #[test]
    fn return_dummy_pushes_zero_for_primitives() {
        let fragment = return_dummy(Some(FieldType::Base(PrimitiveType::Int)));
        assert_eq!(fragment.len(), 2);
    }

    #[test]
    fn return_dummy_pushes_null_for_references() {
        let fragment = return_dummy(Some(FieldType::Object(ClassRef::new("java/lang/Object"))));
        assert_eq!(fragment.len(), 2);
    }
}
