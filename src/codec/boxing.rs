//! Boxing and unboxing of primitive values for storage in an `Object[]`.
//!
//! Every primitive boxes through its own wrapper class's `valueOf` factory
//! and unboxes through that wrapper's own `xValue` accessor — in
//! particular, `long` boxes via `java.lang.Long.valueOf`, never
//! `java.lang.Double`. Reference values (objects and arrays) need neither:
//! they already satisfy `Object`, so boxing is the identity and unboxing is
//! just a downcast to the value's declared type.

use crate::fragment::builder::{call, check_cast};
use crate::fragment::{Fragment, InvokeKind};
use crate::jvm::references::{ClassRef, MethodRef};
use crate::types::field_type::{FieldType, PrimitiveType};
use crate::types::method_descriptor::{MethodDescriptor, ReturnType};

fn boxing_method(primitive: PrimitiveType) -> MethodRef {
    let wrapper = ClassRef::new(primitive.wrapper_class_name());
    MethodRef {
        owner: wrapper.clone(),
        name: primitive.boxing_method_name().to_owned(),
        descriptor: MethodDescriptor {
            parameters_types: vec![FieldType::Base(primitive)],
            return_type: ReturnType::Some(FieldType::Object(wrapper)),
        },
    }
}

fn unboxing_method(primitive: PrimitiveType) -> MethodRef {
    let wrapper = ClassRef::new(primitive.wrapper_class_name());
    MethodRef {
        owner: wrapper,
        name: primitive.unboxing_method_name().to_owned(),
        descriptor: MethodDescriptor {
            parameters_types: vec![],
            return_type: ReturnType::Some(FieldType::Base(primitive)),
        },
    }
}

/// Boxes the value on top of the stack, if it is a primitive. Net effect:
/// `value -> boxed` for primitives, `value -> value` (no-op) for references.
#[must_use]
pub fn box_value(ty: &FieldType) -> Fragment {
    match ty {
        FieldType::Base(primitive) => {
            call(InvokeKind::Static, boxing_method(*primitive), None, vec![Fragment::empty()])
                .expect("boxing call is always built with the right argument count")
        }
        FieldType::Object(_) | FieldType::Array(_) => Fragment::empty(),
    }
}

/// Unboxes a boxed reference on top of the stack back to `ty`. Net effect:
/// `boxed -> value` for primitives, `boxed -> value` (downcast only) for
/// references.
#[must_use]
pub fn unbox_value(ty: &FieldType) -> Fragment {
    match ty {
        FieldType::Base(primitive) => {
            let wrapper = FieldType::Object(ClassRef::new(primitive.wrapper_class_name()));
            let downcast = check_cast(wrapper);
            let unboxed = call(InvokeKind::Virtual, unboxing_method(*primitive), Some(Fragment::empty()), vec![])
                .expect("unboxing call is always built with the right argument count");
            crate::fragment::builder::merge([downcast, unboxed])
        }
        FieldType::Object(_) | FieldType::Array(_) => check_cast(ty.clone()),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn long_boxes_through_its_own_wrapper_not_double() {
        let method = boxing_method(PrimitiveType::Long);
        assert_eq!(method.owner, ClassRef::new("java/lang/Long"));
        assert_ne!(method.owner, ClassRef::new("java/lang/Double"));
    }

    #[test]
    fn long_unboxes_through_its_own_wrapper_not_double() {
        let method = unboxing_method(PrimitiveType::Long);
        assert_eq!(method.owner, ClassRef::new("java/lang/Long"));
        assert_eq!(method.name, "longValue");
    }

    #[test]
    fn boxing_a_reference_is_a_no_op() {
        let fragment = box_value(&FieldType::Object(ClassRef::new("java/lang/String")));
        assert!(fragment.is_empty());
    }

    #[test]
    fn unboxing_a_reference_is_a_downcast() {
        let fragment = unbox_value(&FieldType::Object(ClassRef::new("java/lang/String")));
        assert_eq!(fragment.len(), 1);
    }
}
