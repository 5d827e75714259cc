//! Specification types and their builders.
//!
//! # Responsibilities
//! - Describe the expected shape of one object (`ObjectDataSpecification`)
//! - Describe one expected key of that object (`PropertySpecification`)
//! - Reject malformed specifications at construction time
//!
//! # Design Decisions
//! - Builders consume `self` so a specification reads as one expression
//! - `build()` is the only way to obtain an `ObjectDataSpecification`
//! - Custom validators and transformers are `Arc<dyn Fn + Send + Sync>`

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::validation::error::SpecificationError;
use crate::validation::processor::{process_property_value, ProcessingOptions};

/// Custom check over an accepted value.
///
/// `Err(Some(message))` fails with that message, `Err(None)` fails with the
/// generic message.
pub type CustomValidator = Arc<dyn Fn(&Value) -> Result<(), Option<String>> + Send + Sync>;

/// Maps an accepted value to the value stored in the processed data.
pub type Transformer = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// Expected runtime type of a property.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueType {
    String,
    Number,
    Boolean,
    Object,
    Array,
    /// One of the listed literal values.
    Enumeration(Vec<Value>),
}

impl ValueType {
    /// Returns true if `value` has this type.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (ValueType::String, Value::String(_))
            | (ValueType::Number, Value::Number(_))
            | (ValueType::Boolean, Value::Bool(_))
            | (ValueType::Object, Value::Object(_))
            | (ValueType::Array, Value::Array(_)) => true,
            (ValueType::Enumeration(_), value) => self.literal_for(value).is_some(),
            _ => false,
        }
    }

    /// The enumeration literal equal to `value`. Numbers compare by value,
    /// so `20.0` matches the literal `20`.
    pub fn literal_for(&self, value: &Value) -> Option<&Value> {
        match self {
            ValueType::Enumeration(values) => {
                values.iter().find(|literal| same_literal(literal, value))
            }
            _ => None,
        }
    }

    /// Scalars can appear as array elements and cannot carry nested specifications.
    pub fn is_scalar(&self) -> bool {
        !matches!(self, ValueType::Object | ValueType::Array)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::String => write!(f, "a string"),
            ValueType::Number => write!(f, "a number"),
            ValueType::Boolean => write!(f, "a boolean"),
            ValueType::Object => write!(f, "an object"),
            ValueType::Array => write!(f, "an array"),
            ValueType::Enumeration(values) => {
                write!(f, "one of [")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", value)?;
                }
                write!(f, "]")
            }
        }
    }
}

fn same_literal(literal: &Value, value: &Value) -> bool {
    match (literal, value) {
        (Value::Number(a), Value::Number(b)) if a.is_f64() || b.is_f64() => {
            a.as_f64().zip(b.as_f64()).is_some_and(|(a, b)| a == b)
        }
        _ => literal == value,
    }
}

/// Human-readable name of a value's runtime type.
pub fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// How keys that the specification does not declare are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectSubtype {
    /// Fixed key/value pairs: every undeclared key is a validation error.
    #[default]
    FixedKeys,
    /// Undeclared keys are tolerated and left out of the processed data.
    IgnoreUnknown,
    /// Undeclared keys are tolerated and copied verbatim.
    KeepUnknown,
}

/// One expected key of an object.
#[derive(Clone)]
pub struct PropertySpecification {
    name: String,
    value_type: ValueType,
    required: bool,
    nullable: bool,
    default_value: Option<Value>,
    nested: Option<Arc<ObjectDataSpecification>>,
    element_type: Option<ValueType>,
    validators: Vec<CustomValidator>,
    transformers: Vec<Transformer>,
}

impl PropertySpecification {
    /// Create an optional property of the given type.
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
            required: false,
            nullable: false,
            default_value: None,
            nested: None,
            element_type: None,
            validators: Vec::new(),
            transformers: Vec::new(),
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, ValueType::String)
    }

    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, ValueType::Number)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, ValueType::Boolean)
    }

    /// A free-form object, copied as is.
    pub fn any_object(name: impl Into<String>) -> Self {
        Self::new(name, ValueType::Object)
    }

    /// An object validated against a nested specification.
    pub fn object(name: impl Into<String>, nested: ObjectDataSpecification) -> Self {
        Self::new(name, ValueType::Object).nested(nested)
    }

    /// An array whose elements are not checked.
    pub fn array(name: impl Into<String>) -> Self {
        Self::new(name, ValueType::Array)
    }

    /// An array of scalars of one type.
    pub fn array_of(name: impl Into<String>, element_type: ValueType) -> Self {
        Self::new(name, ValueType::Array).element_type(element_type)
    }

    /// An array of objects, each validated against `nested`.
    pub fn array_of_objects(name: impl Into<String>, nested: ObjectDataSpecification) -> Self {
        Self::new(name, ValueType::Array).nested(nested)
    }

    pub fn enumeration<I, V>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::new(
            name,
            ValueType::Enumeration(values.into_iter().map(Into::into).collect()),
        )
    }

    /// Mark the property as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Mark the property as optional (the default).
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Accept `null` as a valid value.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Value used when the key is absent.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn nested(mut self, nested: ObjectDataSpecification) -> Self {
        self.nested = Some(Arc::new(nested));
        self
    }

    pub fn element_type(mut self, element_type: ValueType) -> Self {
        self.element_type = Some(element_type);
        self
    }

    /// Add a predicate; `message` is reported when it returns false.
    pub fn check<F>(self, predicate: F, message: impl Into<String>) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        let message = message.into();
        self.check_with(move |value| {
            if predicate(value) {
                Ok(())
            } else {
                Err(Some(message.clone()))
            }
        })
    }

    /// Add a custom validator with full control over the failure message.
    pub fn check_with<F>(mut self, validator: F) -> Self
    where
        F: Fn(&Value) -> Result<(), Option<String>> + Send + Sync + 'static,
    {
        self.validators.push(Arc::new(validator));
        self
    }

    /// Add a transformer. Transformers run in the order they were added.
    pub fn transform<F>(mut self, transformer: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.transformers.push(Arc::new(transformer));
        self
    }

    /// Minimum character count for strings, element count for arrays.
    pub fn min_length(self, minimum: usize) -> Self {
        self.check_with(move |value| match length_of(value) {
            Some((length, unit)) if length < minimum => {
                Err(Some(format!("must contain at least {} {}", minimum, unit)))
            }
            _ => Ok(()),
        })
    }

    /// Maximum character count for strings, element count for arrays.
    pub fn max_length(self, maximum: usize) -> Self {
        self.check_with(move |value| match length_of(value) {
            Some((length, unit)) if length > maximum => {
                Err(Some(format!("must contain at most {} {}", maximum, unit)))
            }
            _ => Ok(()),
        })
    }

    pub fn minimum(self, minimum: f64) -> Self {
        self.check_with(move |value| match value.as_f64() {
            Some(number) if number < minimum => Err(Some(format!(
                "must be greater than or equal to {}",
                minimum
            ))),
            _ => Ok(()),
        })
    }

    pub fn maximum(self, maximum: f64) -> Self {
        self.check_with(move |value| match value.as_f64() {
            Some(number) if number > maximum => {
                Err(Some(format!("must be less than or equal to {}", maximum)))
            }
            _ => Ok(()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value_type(&self) -> &ValueType {
        &self.value_type
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Default stored for absent keys; transformers are already applied once built.
    pub fn default(&self) -> Option<&Value> {
        self.default_value.as_ref()
    }

    pub fn nested_specification(&self) -> Option<&ObjectDataSpecification> {
        self.nested.as_deref()
    }

    pub fn element(&self) -> Option<&ValueType> {
        self.element_type.as_ref()
    }

    pub(crate) fn validators(&self) -> &[CustomValidator] {
        &self.validators
    }

    pub(crate) fn transformers(&self) -> &[Transformer] {
        &self.transformers
    }

    /// Structural checks run by `SpecificationBuilder::build`. Returns the
    /// default as the processor would store it, transformers applied.
    fn check_structure(&self, specification: &str) -> Result<Option<Value>, SpecificationError> {
        let specification = specification.to_string();
        let property = self.name.clone();

        if self.name.is_empty() {
            return Err(SpecificationError::EmptyPropertyName { specification });
        }

        let empty_enumeration = |value_type: &ValueType| {
            matches!(value_type, ValueType::Enumeration(values) if values.is_empty())
        };
        if empty_enumeration(&self.value_type)
            || self.element_type.as_ref().is_some_and(empty_enumeration)
        {
            return Err(SpecificationError::EmptyEnumeration {
                specification,
                property,
            });
        }

        if self.nested.is_some() && self.value_type.is_scalar() {
            return Err(SpecificationError::NestedOnScalar {
                specification,
                property,
                value_type: self.value_type.to_string(),
            });
        }

        if let Some(element_type) = &self.element_type {
            if self.value_type != ValueType::Array {
                return Err(SpecificationError::ElementTypeOnNonArray {
                    specification,
                    property,
                });
            }
            if self.nested.is_some() {
                return Err(SpecificationError::ConflictingElementSpecification {
                    specification,
                    property,
                });
            }
            if !element_type.is_scalar() {
                return Err(SpecificationError::UnsupportedElementType {
                    specification,
                    property,
                    element_type: element_type.to_string(),
                });
            }
        }

        let Some(default) = &self.default_value else {
            return Ok(None);
        };
        let path = format!("{}.{}", specification, property);
        let mut errors = Vec::new();
        let processed = process_property_value(
            self,
            default,
            &path,
            &ProcessingOptions::default(),
            &mut errors,
        );
        match processed {
            Some(processed) if errors.is_empty() => Ok(Some(processed)),
            _ => Err(SpecificationError::InvalidDefault {
                specification,
                property,
                reason: errors.join("; "),
            }),
        }
    }
}

impl fmt::Debug for PropertySpecification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertySpecification")
            .field("name", &self.name)
            .field("value_type", &self.value_type)
            .field("required", &self.required)
            .field("nullable", &self.nullable)
            .field("default_value", &self.default_value)
            .field("nested", &self.nested)
            .field("element_type", &self.element_type)
            .field("validators", &self.validators.len())
            .field("transformers", &self.transformers.len())
            .finish()
    }
}

fn length_of(value: &Value) -> Option<(usize, &'static str)> {
    match value {
        Value::String(text) => Some((text.chars().count(), "characters")),
        Value::Array(elements) => Some((elements.len(), "elements")),
        _ => None,
    }
}

/// Expected shape of one object.
///
/// Obtained through [`ObjectDataSpecification::builder`]; immutable afterwards.
#[derive(Debug, Clone)]
pub struct ObjectDataSpecification {
    name_for_logging: String,
    subtype: ObjectSubtype,
    properties: Vec<PropertySpecification>,
    index: HashMap<String, usize>,
}

impl ObjectDataSpecification {
    pub fn builder(name_for_logging: impl Into<String>) -> SpecificationBuilder {
        SpecificationBuilder {
            name_for_logging: name_for_logging.into(),
            subtype: ObjectSubtype::default(),
            properties: Vec::new(),
        }
    }

    /// Label that prefixes every validation message.
    pub fn name_for_logging(&self) -> &str {
        &self.name_for_logging
    }

    pub fn subtype(&self) -> ObjectSubtype {
        self.subtype
    }

    /// Properties in declaration order.
    pub fn properties(&self) -> &[PropertySpecification] {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&PropertySpecification> {
        self.index.get(name).map(|&i| &self.properties[i])
    }

    pub fn declares(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }
}

/// Builder for [`ObjectDataSpecification`].
#[derive(Debug)]
pub struct SpecificationBuilder {
    name_for_logging: String,
    subtype: ObjectSubtype,
    properties: Vec<PropertySpecification>,
}

impl SpecificationBuilder {
    pub fn subtype(mut self, subtype: ObjectSubtype) -> Self {
        self.subtype = subtype;
        self
    }

    pub fn property(mut self, property: PropertySpecification) -> Self {
        self.properties.push(property);
        self
    }

    pub fn properties(
        mut self,
        properties: impl IntoIterator<Item = PropertySpecification>,
    ) -> Self {
        self.properties.extend(properties);
        self
    }

    /// Validate the declared properties and freeze the specification.
    pub fn build(mut self) -> Result<ObjectDataSpecification, SpecificationError> {
        let mut index = HashMap::with_capacity(self.properties.len());

        for (position, property) in self.properties.iter_mut().enumerate() {
            property.default_value = property.check_structure(&self.name_for_logging)?;

            if index.insert(property.name().to_string(), position).is_some() {
                return Err(SpecificationError::DuplicateProperty {
                    specification: self.name_for_logging.clone(),
                    property: property.name().to_string(),
                });
            }
        }

        Ok(ObjectDataSpecification {
            name_for_logging: self.name_for_logging,
            subtype: self.subtype,
            properties: self.properties,
            index,
        })
    }
}
