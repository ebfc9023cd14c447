//! The JVM's non-generic type system, extended with the two pseudo-types
//! (`void`, a method descriptor) that the codec must recognize and reject.

pub mod field_type;
pub mod method_descriptor;
pub mod type_tag;

pub use field_type::{FieldType, PrimitiveType};
pub use method_descriptor::MethodDescriptor;
pub use type_tag::TypeTag;
