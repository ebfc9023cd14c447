//! Builds the restore fragment for one continuation point.
//!
//! Restoring a frame is split into two pieces because the method rewriter
//! needs to inspect a popped `MethodState`'s continuation index *before* it
//! knows which continuation point's locals/stack shape to restore into:
//! [`pop_state`] pops exactly once per resumed frame, and
//! [`build_from_state`] (selected per continuation point via the
//! rewriter's dispatcher) restores a given [`VerifierFrame`] from it.
//! [`build`] composes the two for the common single-point case.

use crate::abi::{continuation, method_state};
use crate::fragment::builder::{array_load, call, load, push_int, store, store_index};
use crate::fragment::{Fragment, InvokeKind};
use crate::frame::VerifierFrame;
use crate::jvm::references::ClassRef;
use crate::slots::{Slot, VariableTable};
use crate::types::field_type::FieldType;

use super::boxing::unbox_value;

fn object_array_type() -> FieldType {
    FieldType::Object(ClassRef::new("java/lang/Object")).make_array_type()
}

/// Pops one `MethodState` off `continuation` into `state_slot`. Net effect:
/// none on the operand stack (the popped value is stashed, not left
/// behind).
#[must_use]
pub fn pop_state(continuation: &Slot, state_slot: &Slot) -> Fragment {
    crate::fragment::builder::merge([
        call(InvokeKind::Virtual, continuation::pop(), Some(load(continuation)), vec![])
            .expect("Continuation.pop is always called with matching argument count"),
        store(state_slot),
    ])
}

/// Restores `frame` from a `MethodState` already sitting in `state_slot`
/// (see [`pop_state`]). Consumes temporary slots from `variables`,
/// releasing all of them before returning. Net effect: the local variables
/// `frame` describes are overwritten, and the operand stack `frame`
/// describes is pushed, bottom first.
#[must_use]
pub fn build_from_state(frame: &VerifierFrame, state_slot: &Slot, variables: &mut VariableTable) -> Fragment {
    let locals_array_slot = variables.acquire(object_array_type());
    let stack_array_slot = variables.acquire(object_array_type());

    let mut steps = vec![
        call(InvokeKind::Virtual, method_state::get_locals(), Some(load(state_slot)), vec![])
            .expect("MethodState.getLocals is always called with matching argument count"),
        store(&locals_array_slot),
        call(InvokeKind::Virtual, method_state::get_stack(), Some(load(state_slot)), vec![])
            .expect("MethodState.getStack is always called with matching argument count"),
        store(&stack_array_slot),
    ];

    for (index, tag) in frame.locals().iter().enumerate() {
        if let Some(tag) = tag {
            let ty = tag
                .as_field_type()
                .expect("verifier frames only carry real values")
                .clone();
            steps.push(load(&locals_array_slot));
            steps.push(push_int(i32::try_from(index).unwrap_or(i32::MAX)));
            steps.push(array_load());
            steps.push(unbox_value(&ty));
            steps.push(store_index(u16::try_from(index).unwrap_or(u16::MAX), ty));
        }
    }

    for (index, tag) in frame.stack().iter().enumerate() {
        let ty = tag
            .as_field_type()
            .expect("verifier frames only carry real values")
            .clone();
        steps.push(load(&stack_array_slot));
        steps.push(push_int(i32::try_from(index).unwrap_or(i32::MAX)));
        steps.push(array_load());
        steps.push(unbox_value(&ty));
    }

    variables.release(&locals_array_slot);
    variables.release(&stack_array_slot);

    crate::fragment::builder::merge(steps)
}

/// Pops a `MethodState` off `continuation` and restores `frame` from it in
/// one step. Equivalent to [`pop_state`] followed by [`build_from_state`];
/// most callers with more than one continuation point in a method want
/// those separately, to dispatch on the popped state's continuation index
/// before picking which frame to restore.
#[must_use]
pub fn build(frame: &VerifierFrame, continuation: &Slot, variables: &mut VariableTable) -> Fragment {
    let state_slot = variables.acquire(FieldType::Object(method_state::class()));
    let popped = pop_state(continuation, &state_slot);
    let restored = build_from_state(frame, &state_slot, variables);
    variables.release(&state_slot);
    crate::fragment::builder::merge([popped, restored])
}

#[cfg(test)]
mod test {
    use proptest::prelude::*;

    use super::*;
    use crate::types::field_type::PrimitiveType;
    use crate::types::TypeTag;

    #[test]
    fn restoring_an_empty_frame_still_pops_a_method_state() {
        let frame = VerifierFrame::new(vec![], vec![]).unwrap();
        let mut variables = VariableTable::new(2);
        let continuation = variables.acquire(FieldType::Object(ClassRef::new(
            "org/loomweave/runtime/Continuation",
        )));
        let fragment = build(&frame, &continuation, &mut variables);
        assert!(!fragment.is_empty());
    }

    #[test]
    fn stack_values_are_pushed_in_ascending_order() {
        let frame = VerifierFrame::new(
            vec![
                TypeTag::primitive(PrimitiveType::Int),
                TypeTag::reference("java/lang/String"),
            ],
            vec![],
        )
        .unwrap();
        let mut variables = VariableTable::new(2);
        let continuation = variables.acquire(FieldType::Object(ClassRef::new(
            "org/loomweave/runtime/Continuation",
        )));
        let fragment = build(&frame, &continuation, &mut variables);
        assert!(fragment.len() > 10);
    }

    #[test]
    fn pop_state_then_build_from_state_matches_build() {
        let frame = VerifierFrame::new(vec![TypeTag::primitive(PrimitiveType::Int)], vec![]).unwrap();
        let mut variables = VariableTable::new(2);
        let continuation = variables.acquire(FieldType::Object(ClassRef::new(
            "org/loomweave/runtime/Continuation",
        )));
        let state_slot = variables.acquire(FieldType::Object(ClassRef::new(
            "org/loomweave/runtime/MethodState",
        )));
        let split = crate::fragment::builder::merge([
            pop_state(&continuation, &state_slot),
            build_from_state(&frame, &state_slot, &mut variables),
        ]);
        assert!(split.len() >= 6);
    }

    proptest! {
        /// [`build`] is defined as [`pop_state`] followed by
        /// [`build_from_state`] over an internally acquired state slot; for
        /// any frame shape the two paths must therefore emit exactly the
        /// same number of nodes, whether the caller takes them apart (to
        /// dispatch on the popped state between the two calls, as the
        /// rewriter does) or calls `build` directly.
        #[test]
        fn split_restore_matches_combined_restore_for_any_frame(
            stack_types in prop::collection::vec(any::<PrimitiveType>(), 0..4),
            local_types in prop::collection::vec(prop::option::of(any::<PrimitiveType>()), 0..4),
        ) {
            let stack = stack_types.into_iter().map(TypeTag::primitive).collect();
            let locals = local_types.into_iter().map(|t| t.map(TypeTag::primitive)).collect();
            let frame = VerifierFrame::new(stack, locals).unwrap();

            let mut split_variables = VariableTable::new(2);
            let split_continuation = split_variables.acquire(FieldType::Object(ClassRef::new(
                "org/loomweave/runtime/Continuation",
            )));
            let split_state_slot = split_variables.acquire(FieldType::Object(ClassRef::new(
                "org/loomweave/runtime/MethodState",
            )));
            let split = crate::fragment::builder::merge([
                pop_state(&split_continuation, &split_state_slot),
                build_from_state(&frame, &split_state_slot, &mut split_variables),
            ]);

            let mut combined_variables = VariableTable::new(2);
            let combined_continuation = combined_variables.acquire(FieldType::Object(ClassRef::new(
                "org/loomweave/runtime/Continuation",
            )));
            let combined = build(&frame, &combined_continuation, &mut combined_variables);

            prop_assert_eq!(split.len(), combined.len());
            prop_assert_eq!(split_variables.max_locals(), combined_variables.max_locals());
        }
    }
}
