//! C4: the method rewriter.
//!
//! Ties the instruction builder ([`crate::fragment`]), the slot allocator
//! ([`crate::slots`]), and the frame-state codec ([`crate::codec`])
//! together into the full per-method transform: reject constructors,
//! pass through methods with no continuation points untouched, and for
//! everything else install a resume dispatcher and a guarded save block at
//! every continuation point.

use crate::abi::continuation as abi_continuation;
use crate::abi::{method_state, MODE_NORMAL, MODE_RESTORING, MODE_SAVING};
use crate::codec;
use crate::error::Error;
use crate::fragment::builder::{
    call, empty, if_eq, jump, load, load_index, merge, pop, push_int, return_dummy, store, table_switch,
    throw_runtime,
};
use crate::fragment::{Fragment, InvokeKind, Label, LabelFactory, Node, Op};
use crate::frame::VerifierFrame;
use crate::jvm::access_flags::MethodAccessFlags;
use crate::jvm::references::MethodRef;
use crate::slots::VariableTable;
use crate::types::field_type::FieldType;
use crate::types::method_descriptor::{MethodDescriptor, ReturnType};

use super::continuation::ContinuationPoint;
use super::exception;
use super::method::{ParsedMethod, RewrittenMethod};

/// The `max_stack` headroom reserved for the rewriter's own synthesized
/// code (array/index/value triples, a handful deep at most).
const SYNTHESIZED_STACK_HEADROOM: u16 = 8;

fn value_width(ty: &FieldType) -> u16 {
    if ty.is_dual_slot() { 2 } else { 1 }
}

/// The local-variable index immediately past a method's real parameter
/// block: `this` (if not static) plus every declared parameter, each at its
/// natural width. Per JVM calling convention, a parameter appended to a
/// descriptor is assigned exactly this index, regardless of how large
/// `max_locals` is — the two only coincide when the original method has no
/// locals beyond its own parameters.
fn parameter_block_width(access_flags: MethodAccessFlags, descriptor: &MethodDescriptor) -> u16 {
    let implicit_this = u16::from(!access_flags.is_static());
    descriptor
        .parameters_types
        .iter()
        .fold(implicit_this, |width, ty| width + value_width(ty))
}

fn return_field_type(descriptor: &MethodDescriptor) -> Option<FieldType> {
    match &descriptor.return_type {
        ReturnType::Void => None,
        ReturnType::Some(ty) => Some(ty.clone()),
    }
}

/// The frame the codec should save/restore at a continuation point: the
/// stack values that remain untouched across the call (everything below
/// the receiver and arguments), plus the method's locals, exactly as they
/// stood right before the call's own arguments were evaluated.
fn untouched_frame(point: &ContinuationPoint) -> Result<VerifierFrame, Error> {
    let consumed = point.consumed_operand_count();
    let total = point.frame_before_call.stack_depth();
    let trailing = total
        .checked_sub(consumed)
        .ok_or(crate::error::MalformedFrame::StackDepthMismatch {
            expected: consumed,
            actual: total,
        })?;
    VerifierFrame::new(
        point.frame_before_call.stack()[..trailing].to_vec(),
        point.frame_before_call.locals().to_vec(),
    )
    .map_err(Error::from)
}

fn invoke_index_after(nodes: &[Node], call_site: Label, method: &MethodRef, kind: InvokeKind) -> Option<usize> {
    let start = nodes
        .iter()
        .position(|node| matches!(node, Node::LabelDef(label) if *label == call_site))?;
    nodes[start..]
        .iter()
        .position(|node| matches!(node, Node::Instruction(Op::Invoke { kind: k, method: m }) if *k == kind && m == method))
        .map(|relative| start + relative + 1)
}

/// Transforms `parsed` according to its continuation points.
///
/// A method with no continuation points cannot reach `suspend()` and is
/// returned unchanged (per the rule that only methods which can reach
/// `suspend()` are instrumented). A constructor is always rejected,
/// regardless of its continuation points.
///
/// # Errors
///
/// Returns [`crate::InvalidRequest::ConstructorNotInstrumentable`] if
/// `parsed.identifier` names a constructor, or
/// [`crate::MalformedFrame::StackDepthMismatch`] if a continuation point's
/// frame does not have enough stack depth for its own call's operands.
pub fn rewrite_method(parsed: &ParsedMethod) -> Result<RewrittenMethod, Error> {
    if parsed.identifier.is_constructor() {
        return Err(crate::error::InvalidRequest::ConstructorNotInstrumentable.into());
    }

    if parsed.continuation_points.is_empty() {
        return Ok(RewrittenMethod {
            identifier: parsed.identifier.clone(),
            access_flags: parsed.access_flags,
            max_locals: parsed.max_locals,
            max_stack: parsed.max_stack,
            body: parsed.body.clone(),
            exception_table: exception::carry_through(parsed.exception_table.clone()),
        });
    }

    let continuation_type = FieldType::Object(abi_continuation::class());
    let mut new_parameters = parsed.identifier.descriptor.parameters_types.clone();
    new_parameters.push(continuation_type.clone());
    let new_identifier = MethodRef {
        owner: parsed.identifier.owner.clone(),
        name: parsed.identifier.name.clone(),
        descriptor: MethodDescriptor {
            parameters_types: new_parameters,
            return_type: parsed.identifier.descriptor.return_type.clone(),
        },
    };

    let mut variables = VariableTable::new(parsed.max_locals);
    let continuation_slot = variables.acquire(continuation_type.clone());
    let real_continuation_index = parameter_block_width(parsed.access_flags, &parsed.identifier.descriptor);
    let receive_continuation = merge([load_index(real_continuation_index, continuation_type), store(&continuation_slot)]);
    let mut factory = LabelFactory::resuming_after(parsed.body.labels());
    let enclosing_return_type = return_field_type(&parsed.identifier.descriptor);

    let mut untouched_frames = Vec::with_capacity(parsed.continuation_points.len());
    for point in &parsed.continuation_points {
        untouched_frames.push(untouched_frame(point)?);
    }

    // The resume dispatcher: pop this frame's MethodState once, then
    // switch on its continuation index to land on the right restore block.
    let state_slot = variables.acquire(FieldType::Object(method_state::class()));
    let pop_state = codec::restore::pop_state(&continuation_slot, &state_slot);
    let continuation_index = call(
        InvokeKind::Virtual,
        method_state::get_continuation_index(),
        Some(load(&state_slot)),
        vec![],
    )
    .expect("MethodState.getContinuationIndex is always called with matching argument count");
    let cases: Vec<Fragment> = parsed
        .continuation_points
        .iter()
        .zip(&untouched_frames)
        .map(|(point, frame)| {
            let clear_mode = if point.is_suspend_primitive {
                call(
                    InvokeKind::Virtual,
                    abi_continuation::set_mode(),
                    Some(load(&continuation_slot)),
                    vec![push_int(MODE_NORMAL)],
                )
                .expect("Continuation.setMode is always called with matching argument count")
            } else {
                empty()
            };
            merge([
                codec::restore::build_from_state(frame, &state_slot, &mut variables),
                clear_mode,
                jump(point.call_site),
            ])
        })
        .collect();
    let dispatch = table_switch(
        0,
        cases,
        throw_runtime("Invalid continuation index"),
        &mut factory,
    );
    variables.release(&state_slot);

    let restoring_branch = merge([pop_state, continuation_index, dispatch]);
    let mode_is_restoring = merge([
        call(InvokeKind::Virtual, abi_continuation::get_mode(), Some(load(&continuation_slot)), vec![])
            .expect("Continuation.getMode is always called with matching argument count"),
        push_int(MODE_RESTORING),
    ]);
    let prologue = merge([mode_is_restoring, if_eq(restoring_branch, empty(), &mut factory)]);

    let mut body_nodes: Vec<Node> = parsed.body.clone().into_iter().collect();
    for (index, (point, frame)) in parsed.continuation_points.iter().zip(&untouched_frames).enumerate() {
        let result_type = return_field_type(&point.method.descriptor);
        let discard_result = if result_type.is_some() { pop() } else { empty() };
        let saving_branch = merge([
            discard_result,
            codec::save::build(
                frame,
                i32::try_from(index).unwrap_or(i32::MAX),
                &continuation_slot,
                &mut variables,
            ),
            return_dummy(enclosing_return_type.clone()),
        ]);
        let mode_is_saving = merge([
            call(InvokeKind::Virtual, abi_continuation::get_mode(), Some(load(&continuation_slot)), vec![])
                .expect("Continuation.getMode is always called with matching argument count"),
            push_int(MODE_SAVING),
        ]);
        let post_call = merge([mode_is_saving, if_eq(saving_branch, empty(), &mut factory)]);

        if let Some(at) = invoke_index_after(&body_nodes, point.call_site, &point.method, point.kind) {
            let splice: Vec<Node> = post_call.into_iter().collect();
            body_nodes.splice(at..at, splice);
        }
    }

    Ok(RewrittenMethod {
        identifier: new_identifier,
        access_flags: parsed.access_flags,
        max_locals: variables.max_locals(),
        max_stack: parsed.max_stack.max(SYNTHESIZED_STACK_HEADROOM),
        body: merge([receive_continuation, prologue, Fragment::from_iter(body_nodes)]),
        exception_table: exception::carry_through(parsed.exception_table.clone()),
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::jvm::access_flags::MethodAccessFlags;
    use crate::jvm::references::ClassRef;
    use crate::types::field_type::PrimitiveType;
    use crate::types::TypeTag;

    fn simple_method(name: &str) -> ParsedMethod {
        ParsedMethod {
            identifier: MethodRef {
                owner: ClassRef::new("com/example/Widget"),
                name: name.to_owned(),
                descriptor: "()V".parse().unwrap(),
            },
            access_flags: MethodAccessFlags::PUBLIC,
            max_locals: 1,
            max_stack: 1,
            body: Fragment::empty(),
            exception_table: vec![],
            continuation_points: vec![],
        }
    }

    #[test]
    fn constructor_is_always_rejected() {
        let mut method = simple_method(MethodRef::CONSTRUCTOR_NAME);
        method.identifier.descriptor = "()V".parse().unwrap();
        let err = rewrite_method(&method).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidRequest(crate::InvalidRequest::ConstructorNotInstrumentable)
        ));
    }

    #[test]
    fn method_without_continuation_points_passes_through_unchanged() {
        let method = simple_method("run");
        let rewritten = rewrite_method(&method).unwrap();
        assert_eq!(rewritten.identifier, method.identifier);
        assert_eq!(rewritten.max_locals, method.max_locals);
    }

    #[test]
    fn instrumented_method_gains_a_trailing_continuation_parameter() {
        let mut factory = LabelFactory::new();
        let call_site = factory.fresh();
        let mut method = simple_method("run");
        method.body = Fragment::from_iter([
            Node::LabelDef(call_site),
            Node::Instruction(Op::Invoke {
                kind: InvokeKind::Static,
                method: MethodRef {
                    owner: ClassRef::new("com/example/Coroutines"),
                    name: "suspend".to_owned(),
                    descriptor: "()V".parse().unwrap(),
                },
            }),
            Node::Instruction(Op::Return(None)),
        ]);
        method.continuation_points = vec![ContinuationPoint {
            call_site,
            method: MethodRef {
                owner: ClassRef::new("com/example/Coroutines"),
                name: "suspend".to_owned(),
                descriptor: "()V".parse().unwrap(),
            },
            kind: InvokeKind::Static,
            frame_before_call: VerifierFrame::new(vec![], vec![Some(TypeTag::reference("com/example/Widget"))]).unwrap(),
            is_suspend_primitive: true,
        }];
        let rewritten = rewrite_method(&method).unwrap();
        assert_eq!(rewritten.identifier.descriptor.parameters_types.len(), 1);
        assert!(matches!(
            rewritten.identifier.descriptor.parameters_types[0],
            FieldType::Object(_)
        ));
        assert!(rewritten.max_locals > method.max_locals);
    }

    #[test]
    fn continuation_argument_is_copied_from_its_real_parameter_slot() {
        // A static, zero-parameter method whose `max_locals` already reaches
        // past its (empty) parameter block: the real slot the JVM places the
        // appended `Continuation` argument in (index 0) and the scratch slot
        // the rewriter's own VariableTable acquires for it (index 5, past
        // max_locals) are different indices, and the rewritten body must
        // bridge them before anything reads the scratch slot.
        let mut factory = LabelFactory::new();
        let call_site = factory.fresh();
        let mut method = simple_method("run");
        method.access_flags = MethodAccessFlags::PUBLIC | MethodAccessFlags::STATIC;
        method.max_locals = 5;
        method.body = Fragment::from_iter([
            Node::LabelDef(call_site),
            Node::Instruction(Op::Invoke {
                kind: InvokeKind::Static,
                method: MethodRef {
                    owner: ClassRef::new("com/example/Coroutines"),
                    name: "suspend".to_owned(),
                    descriptor: "()V".parse().unwrap(),
                },
            }),
            Node::Instruction(Op::Return(None)),
        ]);
        method.continuation_points = vec![ContinuationPoint {
            call_site,
            method: MethodRef {
                owner: ClassRef::new("com/example/Coroutines"),
                name: "suspend".to_owned(),
                descriptor: "()V".parse().unwrap(),
            },
            kind: InvokeKind::Static,
            frame_before_call: VerifierFrame::new(vec![], vec![None; 5]).unwrap(),
            is_suspend_primitive: true,
        }];
        let rewritten = rewrite_method(&method).unwrap();

        let nodes: Vec<&Node> = rewritten.body.iter().collect();
        let mut instructions = nodes.into_iter().filter_map(|node| match node {
            Node::Instruction(op) => Some(op),
            _ => None,
        });
        let first = instructions.next().expect("body has at least one instruction");
        let second = instructions.next().expect("body has at least two instructions");
        assert!(
            matches!(first, Op::Load { index: 0, .. }),
            "first instruction must load the incoming continuation from its real parameter slot, got {first:?}"
        );
        match second {
            Op::Store { index, .. } => assert!(
                *index >= method.max_locals,
                "continuation must be stored into a scratch slot at or past the original max_locals, got index {index}"
            ),
            other => panic!("second instruction must store the loaded continuation, got {other:?}"),
        }
    }

    #[test]
    fn mismatched_operand_depth_is_reported_as_malformed() {
        let mut factory = LabelFactory::new();
        let call_site = factory.fresh();
        let mut method = simple_method("run");
        method.continuation_points = vec![ContinuationPoint {
            call_site,
            method: MethodRef {
                owner: ClassRef::new("com/example/Widget"),
                name: "compute".to_owned(),
                descriptor: "(II)V".parse().unwrap(),
            },
            kind: InvokeKind::Virtual,
            frame_before_call: VerifierFrame::new(
                vec![TypeTag::primitive(PrimitiveType::Int)],
                vec![],
            )
            .unwrap(),
            is_suspend_primitive: false,
        }];
        let err = rewrite_method(&method).unwrap_err();
        assert!(matches!(err, Error::MalformedFrame(_)));
    }
}
