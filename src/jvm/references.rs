//! References to JVM classes and methods.

use derive_more::Display;

use crate::types::method_descriptor::{MethodDescriptor, ReturnType};

/// A reference to a class or interface, by binary name.
#[derive(Debug, PartialEq, Eq, Clone, Hash, PartialOrd, Ord, Display)]
#[display("{binary_name}")]
pub struct ClassRef {
    /// The binary name of the class, e.g. `java/lang/Object`.
    pub binary_name: String,
}

impl ClassRef {
    /// Creates a new reference from a binary name.
    pub fn new(binary_name: impl Into<String>) -> Self {
        Self {
            binary_name: binary_name.into(),
        }
    }
}

/// A reference to a method.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Display)]
#[display("{owner}::{name}{descriptor}")]
pub struct MethodRef {
    /// The class declaring the method.
    pub owner: ClassRef,
    /// The name of the method.
    pub name: String,
    /// The descriptor of the method.
    pub descriptor: MethodDescriptor,
}

impl MethodRef {
    /// The reserved name of instance initializer methods (constructors).
    pub const CONSTRUCTOR_NAME: &'static str = "<init>";

    /// The reserved name of class/interface initializer methods.
    pub const CLASS_INITIALIZER_NAME: &'static str = "<clinit>";

    /// Whether this reference names a constructor.
    #[must_use]
    pub fn is_constructor(&self) -> bool {
        self.name == Self::CONSTRUCTOR_NAME
            && matches!(self.descriptor.return_type, ReturnType::Void)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn constructor_is_recognized() {
        let ctor = MethodRef {
            owner: ClassRef::new("com/example/Widget"),
            name: MethodRef::CONSTRUCTOR_NAME.to_owned(),
            descriptor: "()V".parse().unwrap(),
        };
        assert!(ctor.is_constructor());
    }

    #[test]
    fn ordinary_method_is_not_constructor() {
        let m = MethodRef {
            owner: ClassRef::new("com/example/Widget"),
            name: "run".to_owned(),
            descriptor: "()V".parse().unwrap(),
        };
        assert!(!m.is_constructor());
    }
}
