//! Raw data processing against a specification.
//!
//! # Responsibilities
//! - Check that raw data is an object and every declared property conforms
//! - Fill defaults, recurse into nested specifications, run validators and transformers
//! - Report undeclared keys for fixed-key specifications
//!
//! # Design Decisions
//! - Collect every error in one pass; never fail fast
//! - Message order: declaration order, nested errors inline, undeclared keys last
//! - Recursion follows the specification, so depth is bounded by the specification

use std::borrow::Cow;

use serde_json::{Map, Number, Value};

use crate::validation::result::ProcessingResult;
use crate::validation::types::{
    describe, ObjectDataSpecification, ObjectSubtype, PropertySpecification, ValueType,
};

/// Options that vary per call site rather than per specification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessingOptions {
    /// Convert strings to numbers, booleans and non-string enumeration
    /// literals when the declared type asks for them. Query strings carry
    /// only strings, so query processing turns this on.
    pub coerce_strings: bool,
}

impl ProcessingOptions {
    /// Options used for deserialized query parameters.
    pub fn query_parameters() -> Self {
        Self {
            coerce_strings: true,
        }
    }
}

/// Process `raw` with default options.
pub fn process(raw: &Value, specification: &ObjectDataSpecification) -> ProcessingResult<Value> {
    process_with(raw, specification, &ProcessingOptions::default())
}

/// Process `raw` against `specification`.
pub fn process_with(
    raw: &Value,
    specification: &ObjectDataSpecification,
    options: &ProcessingOptions,
) -> ProcessingResult<Value> {
    let mut errors = Vec::new();
    let processed = process_object(
        raw,
        specification,
        specification.name_for_logging(),
        options,
        &mut errors,
    );

    match processed {
        Some(object) if errors.is_empty() => ProcessingResult::Valid {
            processed_data: Value::Object(object),
        },
        _ => ProcessingResult::Invalid {
            validation_errors_messages: errors,
        },
    }
}

fn process_object(
    raw: &Value,
    specification: &ObjectDataSpecification,
    path: &str,
    options: &ProcessingOptions,
    errors: &mut Vec<String>,
) -> Option<Map<String, Value>> {
    let Value::Object(source) = raw else {
        errors.push(format!(
            "{} is expected to be an object, but actually is {}",
            path,
            describe(raw)
        ));
        return None;
    };

    let mut processed = Map::new();

    for property in specification.properties() {
        let property_path = format!("{}.{}", path, property.name());

        match source.get(property.name()) {
            None => {
                if let Some(default) = property.default() {
                    processed.insert(property.name().to_string(), default.clone());
                } else if property.is_required() {
                    errors.push(format!("{} is required but missing", property_path));
                }
            }
            Some(value) => {
                if let Some(accepted) =
                    process_property_value(property, value, &property_path, options, errors)
                {
                    processed.insert(property.name().to_string(), accepted);
                }
            }
        }
    }

    match specification.subtype() {
        ObjectSubtype::FixedKeys => {
            for key in source.keys() {
                if !specification.declares(key) {
                    errors.push(format!("{}.{} is an unexpected property", path, key));
                }
            }
        }
        ObjectSubtype::IgnoreUnknown => {}
        ObjectSubtype::KeepUnknown => {
            for (key, value) in source {
                if !specification.declares(key) {
                    processed.insert(key.clone(), value.clone());
                }
            }
        }
    }

    Some(processed)
}

/// Check one present value; returns the value to store, or `None` after
/// recording at least one error.
pub(crate) fn process_property_value(
    property: &PropertySpecification,
    value: &Value,
    path: &str,
    options: &ProcessingOptions,
    errors: &mut Vec<String>,
) -> Option<Value> {
    if value.is_null() {
        if property.is_nullable() {
            return Some(Value::Null);
        }
        errors.push(type_mismatch(path, property.value_type(), value));
        return None;
    }

    let value = coerce(property.value_type(), value, options);
    if !property.value_type().accepts(&value) {
        errors.push(type_mismatch(path, property.value_type(), &value));
        return None;
    }
    let value = match property.value_type().literal_for(&value) {
        Some(literal) => Cow::Owned(literal.clone()),
        None => value,
    };

    let error_count = errors.len();
    let accepted = match (property.value_type(), property.nested_specification()) {
        (ValueType::Object, Some(nested)) => {
            Value::Object(process_object(&value, nested, path, options, errors)?)
        }
        (ValueType::Array, _) => process_array(property, &value, path, options, errors)?,
        _ => value.into_owned(),
    };
    if errors.len() > error_count {
        return None;
    }

    for validator in property.validators() {
        if let Err(message) = validator(&accepted) {
            errors.push(match message {
                Some(message) => format!("{}: {}", path, message),
                None => format!("{} did not pass the custom validation", path),
            });
        }
    }
    if errors.len() > error_count {
        return None;
    }

    Some(
        property
            .transformers()
            .iter()
            .fold(accepted, |value, transformer| transformer(value)),
    )
}

fn process_array(
    property: &PropertySpecification,
    value: &Value,
    path: &str,
    options: &ProcessingOptions,
    errors: &mut Vec<String>,
) -> Option<Value> {
    let Value::Array(elements) = value else {
        return None;
    };

    let mut processed = Vec::with_capacity(elements.len());
    for (index, element) in elements.iter().enumerate() {
        let element_path = format!("{}[{}]", path, index);

        if let Some(nested) = property.nested_specification() {
            if let Some(object) = process_object(element, nested, &element_path, options, errors) {
                processed.push(Value::Object(object));
            }
        } else if let Some(element_type) = property.element() {
            let element = coerce(element_type, element, options);
            if let Some(literal) = element_type.literal_for(&element) {
                processed.push(literal.clone());
            } else if element_type.accepts(&element) {
                processed.push(element.into_owned());
            } else {
                errors.push(type_mismatch(&element_path, element_type, &element));
            }
        } else {
            processed.push(element.clone());
        }
    }

    Some(Value::Array(processed))
}

fn coerce<'a>(
    expected: &ValueType,
    value: &'a Value,
    options: &ProcessingOptions,
) -> Cow<'a, Value> {
    if !options.coerce_strings {
        return Cow::Borrowed(value);
    }
    let Value::String(text) = value else {
        return Cow::Borrowed(value);
    };

    let coerced = match expected {
        ValueType::Number => parse_number(text),
        ValueType::Boolean => match text.as_str() {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            _ => None,
        },
        ValueType::Enumeration(values) if !values.contains(value) => match parse_number(text) {
            Some(number) => expected.literal_for(&number).cloned(),
            None => values
                .iter()
                .find(|literal| {
                    matches!(literal, Value::Bool(_) | Value::Null) && literal.to_string() == *text
                })
                .cloned(),
        },
        _ => None,
    };

    coerced.map_or(Cow::Borrowed(value), Cow::Owned)
}

/// JSON number syntax first so integers up to `u64::MAX` stay exact; Rust
/// syntax (`+5`, `007`, `.5`) is accepted as a fallback.
fn parse_number(text: &str) -> Option<Value> {
    text.parse::<Number>()
        .ok()
        .or_else(|| text.parse::<i64>().ok().map(Number::from))
        .or_else(|| text.parse::<u64>().ok().map(Number::from))
        .or_else(|| text.parse::<f64>().ok().and_then(Number::from_f64))
        .map(Value::Number)
}

fn type_mismatch(path: &str, expected: &ValueType, actual: &Value) -> String {
    let actual = match (expected, actual) {
        (ValueType::Enumeration(_), Value::String(_) | Value::Number(_) | Value::Bool(_)) => {
            actual.to_string()
        }
        _ => describe(actual).to_string(),
    };
    format!("{} is expected to be {}, but actually is {}", path, expected, actual)
}
