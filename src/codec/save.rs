//! Builds the save fragment for one continuation point.
//!
//! A save fragment captures the entire live frame (operand stack and
//! locals) into a [`crate::abi::method_state`] object and hands it to the
//! [`crate::abi::continuation`] via `push`, emptying the real operand stack
//! in the process. The caller splices this in place of the instruction(s)
//! that may reach `suspend()`, guarded so it only runs when the callee
//! signals that it is unwinding to save state.

use crate::abi::{continuation, method_state};
use crate::fragment::builder::{
    array_store, call, construct, load, push_int, store,
};
use crate::fragment::{Fragment, InvokeKind};
use crate::frame::VerifierFrame;
use crate::jvm::references::ClassRef;
use crate::slots::{Slot, VariableTable};
use crate::types::field_type::FieldType;

use super::boxing::box_value;

fn object_array_type() -> FieldType {
    FieldType::Object(ClassRef::new("java/lang/Object")).make_array_type()
}

/// Builds the fragment that captures `frame` into a `MethodState` tagged
/// with `continuation_index` and pushes it onto `continuation`. Consumes
/// temporary slots from `variables`, releasing all of them before
/// returning. Net effect: the entire operand stack described by `frame` is
/// popped; nothing is left on the stack.
#[must_use]
pub fn build(
    frame: &VerifierFrame,
    continuation_index: i32,
    continuation: &Slot,
    variables: &mut VariableTable,
) -> Fragment {
    let stack_array_slot = variables.acquire(object_array_type());
    let locals_array_slot = variables.acquire(object_array_type());

    let mut steps = vec![
        push_int(i32::try_from(frame.stack().len()).unwrap_or(i32::MAX)),
        crate::fragment::builder::new_object_array(),
        store(&stack_array_slot),
        push_int(i32::try_from(frame.locals().len()).unwrap_or(i32::MAX)),
        crate::fragment::builder::new_object_array(),
        store(&locals_array_slot),
    ];

    // The real operand stack holds these values top-first; each is popped
    // via a scratch slot before being relocated into `stack_array_slot` at
    // its logical index, descending.
    for (index, tag) in frame.stack().iter().enumerate().rev() {
        let ty = tag
            .as_field_type()
            .expect("verifier frames only carry real values")
            .clone();
        let scratch = variables.acquire(ty.clone());
        steps.push(store(&scratch));
        steps.push(load(&stack_array_slot));
        steps.push(push_int(i32::try_from(index).unwrap_or(i32::MAX)));
        steps.push(load(&scratch));
        steps.push(box_value(&ty));
        steps.push(array_store());
        variables.release(&scratch);
    }

    // Locals aren't disturbed by the instructions emitted so far, so they
    // can be read directly by index without a scratch relocation.
    for (index, tag) in frame.locals().iter().enumerate() {
        if let Some(tag) = tag {
            let ty = tag
                .as_field_type()
                .expect("verifier frames only carry real values")
                .clone();
            steps.push(load(&locals_array_slot));
            steps.push(push_int(i32::try_from(index).unwrap_or(i32::MAX)));
            steps.push(crate::fragment::builder::load_index(
                u16::try_from(index).unwrap_or(u16::MAX),
                ty.clone(),
            ));
            steps.push(box_value(&ty));
            steps.push(array_store());
        }
    }

    variables.release(&stack_array_slot);
    variables.release(&locals_array_slot);

    let state = construct(
        method_state::class(),
        method_state::constructor(),
        vec![
            push_int(continuation_index),
            load(&locals_array_slot),
            load(&stack_array_slot),
        ],
    )
    .expect("MethodState constructor is always called with matching argument count");

    let push_state = call(
        InvokeKind::Virtual,
        continuation::push(),
        Some(load(continuation)),
        vec![state],
    )
    .expect("Continuation.push is always called with matching argument count");

    steps.push(push_state);
    crate::fragment::builder::merge(steps)
}
