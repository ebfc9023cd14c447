//! The static type tag vocabulary used throughout the instrumentation pass.
//!
//! This is a strict superset of [`FieldType`]: it adds `void` and
//! `method(descriptor)`, which can appear as verifier-adjacent bookkeeping
//! (a method's own return type, say) but are never legal operand-stack or
//! local-variable contents. The codec ([`crate::codec`]) and the instruction
//! builder ([`crate::fragment`]) both reject these two variants wherever a
//! real value is expected.

use std::fmt::Display;

use super::field_type::{FieldType, PrimitiveType};
use super::method_descriptor::MethodDescriptor;

/// One of the type tags a verifier frame slot, or a fragment-builder
/// request, may carry.
#[derive(Debug, PartialEq, Eq, Clone, derive_more::Display)]
pub enum TypeTag {
    /// A real, storable value: a primitive, a reference, or an array.
    Value(FieldType),
    /// The pseudo-type of a method that returns nothing. Never valid as the
    /// type of a stack slot or local.
    #[display("void")]
    Void,
    /// The pseudo-type of a method signature itself. Never valid as the type
    /// of a stack slot or local.
    Method(MethodDescriptor),
}

impl TypeTag {
    /// Shorthand for a primitive [`TypeTag::Value`].
    #[must_use]
    pub fn primitive(p: PrimitiveType) -> Self {
        Self::Value(FieldType::Base(p))
    }

    /// Shorthand for a reference [`TypeTag::Value`].
    #[must_use]
    pub fn reference(class_name: impl Into<String>) -> Self {
        Self::Value(FieldType::Object(crate::jvm::references::ClassRef::new(
            class_name,
        )))
    }

    /// Shorthand for an array [`TypeTag::Value`] with the given element type.
    #[must_use]
    pub fn array(element: FieldType) -> Self {
        Self::Value(element.make_array_type())
    }

    /// Whether this tag is accepted wherever the codec or builder needs a
    /// concrete, storable value (i.e. it is neither `void` nor `method`).
    #[must_use]
    pub const fn is_value(&self) -> bool {
        matches!(self, Self::Value(_))
    }

    /// The underlying [`FieldType`], if this tag denotes a real value.
    #[must_use]
    pub const fn as_field_type(&self) -> Option<&FieldType> {
        match self {
            Self::Value(ft) => Some(ft),
            Self::Void | Self::Method(_) => None,
        }
    }

    /// Whether this tag occupies two consecutive slots (`long`/`double`).
    #[must_use]
    pub const fn is_dual_slot(&self) -> bool {
        match self {
            Self::Value(ft) => ft.is_dual_slot(),
            Self::Void | Self::Method(_) => false,
        }
    }
}

impl From<FieldType> for TypeTag {
    fn from(value: FieldType) -> Self {
        Self::Value(value)
    }
}
