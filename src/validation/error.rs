//! Specification construction errors.
//!
//! These are configuration errors: they surface while routes are being
//! registered and abort startup. They never reach an HTTP client.

use thiserror::Error;

/// A specification that cannot be used for processing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecificationError {
    /// A property was declared with an empty name.
    #[error("{specification}: property name must not be empty")]
    EmptyPropertyName { specification: String },

    /// Two properties share a name.
    #[error("{specification}.{property} is declared more than once")]
    DuplicateProperty { specification: String, property: String },

    /// An enumeration type lists no values.
    #[error("{specification}.{property}: enumeration must list at least one value")]
    EmptyEnumeration { specification: String, property: String },

    /// A nested specification was attached to a scalar property.
    #[error("{specification}.{property}: nested specification requires an object or array type, found {value_type}")]
    NestedOnScalar {
        specification: String,
        property: String,
        value_type: String,
    },

    /// An element type was attached to a property that is not an array.
    #[error("{specification}.{property}: element type is only allowed on arrays")]
    ElementTypeOnNonArray { specification: String, property: String },

    /// An array declares both a nested object specification and a scalar element type.
    #[error("{specification}.{property}: array declares both a nested specification and an element type")]
    ConflictingElementSpecification { specification: String, property: String },

    /// Element types must be scalar; arrays of objects use a nested specification.
    #[error("{specification}.{property}: element type {element_type} is not supported, use a nested specification for objects")]
    UnsupportedElementType {
        specification: String,
        property: String,
        element_type: String,
    },

    /// The default value does not satisfy the property's own specification.
    #[error("{specification}.{property}: default value is invalid: {reason}")]
    InvalidDefault {
        specification: String,
        property: String,
        reason: String,
    },
}
