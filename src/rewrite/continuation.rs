//! A single point within a method where execution may suspend.

use crate::fragment::Label;
use crate::fragment::InvokeKind;
use crate::frame::VerifierFrame;
use crate::jvm::references::MethodRef;

/// One call site that may reach `suspend()`, directly or transitively.
///
/// Discovered upstream (by whatever front end also computes
/// [`VerifierFrame`]s) and handed to the rewriter as part of a
/// [`super::method::ParsedMethod`]. Each point becomes one `case` in the
/// method's resume dispatcher and owns exactly one save/restore fragment
/// pair, built against the frame immediately preceding the call.
///
/// Resuming a suspended call does not reattach mid-invocation: it restores
/// the frame as it stood right before the call's own arguments were even
/// evaluated, then falls through into the call's original, unmodified
/// argument-evaluation code and re-issues the same invocation. This is why
/// only the call's identity (`method`, `kind`) is needed here, not a copy
/// of its argument-producing instructions — those already live in the
/// method body this point is attached to.
#[derive(Debug, Clone)]
pub struct ContinuationPoint {
    /// The label marking the position immediately before the call's
    /// argument-evaluation code begins. The rewriter's dispatcher jumps
    /// here on resume; nothing about the original code at this label is
    /// otherwise modified.
    pub call_site: Label,
    /// The method or constructor being called.
    pub method: MethodRef,
    /// How the call dispatches; together with `method`'s descriptor this
    /// determines how many stack slots the call itself consumes (the
    /// receiver, for anything but [`InvokeKind::Static`], plus one per
    /// parameter).
    pub kind: InvokeKind,
    /// The verifier frame immediately before the call instruction executes
    /// (i.e. after arguments are evaluated, right as the call is about to
    /// consume them). Its locals are assumed unaffected by the
    /// argument-evaluation code between `call_site` and the call itself.
    pub frame_before_call: VerifierFrame,
    /// Whether `method` names the `suspend()` primitive itself, as opposed
    /// to some other instrumented method that merely may reach it
    /// transitively. A resumed call landing on this kind of point is the
    /// actual resumption target, so its restore block additionally clears
    /// the continuation's mode back to normal before falling through into
    /// the re-issued call.
    pub is_suspend_primitive: bool,
}

impl ContinuationPoint {
    /// The number of stack slots the call consumes: one per parameter,
    /// plus a receiver unless the call is [`InvokeKind::Static`].
    #[must_use]
    pub fn consumed_operand_count(&self) -> usize {
        let receiver = usize::from(!matches!(self.kind, InvokeKind::Static));
        receiver + self.method.descriptor.parameters_types.len()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::fragment::LabelFactory;
    use crate::jvm::references::ClassRef;

    #[test]
    fn static_call_consumes_only_its_parameters() {
        let mut factory = LabelFactory::new();
        let point = ContinuationPoint {
            call_site: factory.fresh(),
            method: MethodRef {
                owner: ClassRef::new("com/example/Widget"),
                name: "compute".to_owned(),
                descriptor: "(II)I".parse().unwrap(),
            },
            kind: InvokeKind::Static,
            frame_before_call: VerifierFrame::new(vec![], vec![]).unwrap(),
            is_suspend_primitive: false,
        };
        assert_eq!(point.consumed_operand_count(), 2);
    }

    #[test]
    fn virtual_call_also_consumes_a_receiver() {
        let mut factory = LabelFactory::new();
        let point = ContinuationPoint {
            call_site: factory.fresh(),
            method: MethodRef {
                owner: ClassRef::new("com/example/Widget"),
                name: "compute".to_owned(),
                descriptor: "(I)I".parse().unwrap(),
            },
            kind: InvokeKind::Virtual,
            frame_before_call: VerifierFrame::new(vec![], vec![]).unwrap(),
            is_suspend_primitive: false,
        };
        assert_eq!(point.consumed_operand_count(), 2);
    }
}
