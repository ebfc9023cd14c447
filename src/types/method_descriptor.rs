//! Non-generic JVM method descriptors.

use std::str::FromStr;

use itertools::Itertools;

use super::field_type::{FieldType, PrimitiveType};
use crate::jvm::references::ClassRef;

/// The descriptor of a method: the types of its parameters and its return type.
#[derive(Debug, PartialEq, Eq, Clone, derive_more::Display)]
#[display(
    "({}){return_type}",
    parameters_types.iter().map(ToString::to_string).join("")
)]
pub struct MethodDescriptor {
    /// The types of the parameters, in declaration order.
    pub parameters_types: Vec<FieldType>,
    /// The return type.
    pub return_type: ReturnType,
}

/// The return type of a method.
#[derive(Debug, PartialEq, Eq, Clone, derive_more::Display)]
pub enum ReturnType {
    /// The method returns a value of the given type.
    Some(FieldType),
    /// The method returns `void`.
    #[display("void")]
    Void,
}

const PARAM_START: char = '(';
const PARAM_END: char = ')';
const ARRAY_MARKER: char = '[';
const OBJECT_MARKER: char = 'L';
const OBJECT_END: char = ';';

impl FromStr for MethodDescriptor {
    type Err = InvalidDescriptor;

    fn from_str(descriptor: &str) -> Result<Self, Self::Err> {
        let remaining = descriptor
            .strip_prefix(PARAM_START)
            .ok_or_else(|| InvalidDescriptor(descriptor.to_owned()))?;
        let (parameters_types, remaining) = parse_params(descriptor, remaining)?;
        let return_type = ReturnType::from_str(remaining)
            .map_err(|_| InvalidDescriptor(descriptor.to_owned()))?;
        Ok(Self {
            parameters_types,
            return_type,
        })
    }
}

fn parse_params<'s>(
    original: &str,
    mut remaining: &'s str,
) -> Result<(Vec<FieldType>, &'s str), InvalidDescriptor> {
    let mut parameters_types = Vec::new();
    loop {
        if let Some(rest) = remaining.strip_prefix(PARAM_END) {
            return Ok((parameters_types, rest));
        }
        if remaining.is_empty() {
            return Err(InvalidDescriptor(original.to_owned()));
        }
        let (dimension, after_dim) = parse_array_dimension(remaining);
        let (base_type, after_param) =
            parse_next_param(original, after_dim).map_err(|_| InvalidDescriptor(original.to_owned()))?;
        let param_type = (0..dimension).fold(base_type, |acc, _| acc.make_array_type());
        parameters_types.push(param_type);
        remaining = after_param;
    }
}

fn parse_next_param<'s>(
    original: &str,
    input: &'s str,
) -> Result<(FieldType, &'s str), InvalidDescriptor> {
    let mut chars = input.chars();
    let first_char = chars
        .next()
        .ok_or_else(|| InvalidDescriptor(original.to_owned()))?;
    let remaining = chars.as_str();
    match first_char {
        'Z' => Ok((FieldType::Base(PrimitiveType::Boolean), remaining)),
        'B' => Ok((FieldType::Base(PrimitiveType::Byte), remaining)),
        'S' => Ok((FieldType::Base(PrimitiveType::Short), remaining)),
        'C' => Ok((FieldType::Base(PrimitiveType::Char), remaining)),
        'I' => Ok((FieldType::Base(PrimitiveType::Int), remaining)),
        'J' => Ok((FieldType::Base(PrimitiveType::Long), remaining)),
        'F' => Ok((FieldType::Base(PrimitiveType::Float), remaining)),
        'D' => Ok((FieldType::Base(PrimitiveType::Double), remaining)),
        OBJECT_MARKER => {
            let (class_name, rest) = remaining
                .split_once(OBJECT_END)
                .ok_or_else(|| InvalidDescriptor(original.to_owned()))?;
            Ok((FieldType::Object(ClassRef::new(class_name)), rest))
        }
        _ => Err(InvalidDescriptor(original.to_owned())),
    }
}

fn parse_array_dimension(input: &str) -> (u32, &str) {
    let count = input.chars().take_while(|&c| c == ARRAY_MARKER).count();
    (count as u32, &input[count..])
}

impl FromStr for ReturnType {
    type Err = InvalidDescriptor;

    fn from_str(descriptor: &str) -> Result<Self, Self::Err> {
        if descriptor == "V" {
            Ok(Self::Void)
        } else {
            let (field_type, rest) = parse_array_dimension(descriptor);
            let (base, rest) =
                parse_next_param(descriptor, rest).map_err(|_| InvalidDescriptor(descriptor.to_owned()))?;
            if !rest.is_empty() {
                return Err(InvalidDescriptor(descriptor.to_owned()));
            }
            let ty = (0..field_type).fold(base, |acc, _| acc.make_array_type());
            Ok(Self::Some(ty))
        }
    }
}

/// An error indicating that a descriptor string is not well-formed.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("Invalid descriptor: {0}")]
pub struct InvalidDescriptor(pub String);

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn round_trip_simple() {
        let desc: MethodDescriptor = "(ID)I".parse().unwrap();
        assert_eq!(
            desc.parameters_types,
            vec![
                FieldType::Base(PrimitiveType::Int),
                FieldType::Base(PrimitiveType::Double)
            ]
        );
        assert_eq!(desc.return_type, ReturnType::Some(FieldType::Base(PrimitiveType::Int)));
    }

    #[test]
    fn void_return() {
        let desc: MethodDescriptor = "()V".parse().unwrap();
        assert!(desc.parameters_types.is_empty());
        assert_eq!(desc.return_type, ReturnType::Void);
    }

    #[test]
    fn object_and_array_params() {
        let desc: MethodDescriptor = "(Ljava/lang/String;[I)Ljava/lang/Object;".parse().unwrap();
        assert_eq!(
            desc.parameters_types,
            vec![
                FieldType::Object(ClassRef::new("java/lang/String")),
                FieldType::Base(PrimitiveType::Int).make_array_type(),
            ]
        );
    }

    #[test]
    fn missing_close_paren() {
        assert!("(I".parse::<MethodDescriptor>().is_err());
    }

    #[test]
    fn empty_is_invalid() {
        assert!("".parse::<MethodDescriptor>().is_err());
    }
}
