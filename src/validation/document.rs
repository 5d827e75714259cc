//! Declarative specification documents.
//!
//! Serde mirror of the builder API, so specifications can live in the TOML
//! configuration or in standalone JSON/TOML files. Custom closures cannot be
//! expressed here; the built-in constraints and transforms cover the common
//! cases.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::validation::error::SpecificationError;
use crate::validation::types::{
    ObjectDataSpecification, ObjectSubtype, PropertySpecification, ValueType,
};

/// Serialized form of an [`ObjectDataSpecification`].
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SpecificationDocument {
    /// Label prefixing validation messages. Falls back to the caller's label.
    #[serde(default)]
    pub name_for_logging: Option<String>,

    #[serde(default)]
    pub subtype: ObjectSubtype,

    #[serde(default)]
    pub properties: Vec<PropertyDocument>,
}

/// Serialized form of a [`PropertySpecification`].
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PropertyDocument {
    pub name: String,

    #[serde(rename = "type")]
    pub value_type: TypeName,

    #[serde(default)]
    pub required: bool,

    #[serde(default)]
    pub nullable: bool,

    #[serde(default)]
    pub default: Option<Value>,

    /// Literals for `enumeration`.
    #[serde(default)]
    pub values: Vec<Value>,

    /// Scalar element type for `array`.
    #[serde(default)]
    pub element_type: Option<TypeName>,

    /// Literals when `element_type` is `enumeration`.
    #[serde(default)]
    pub element_values: Vec<Value>,

    /// Nested object specification for `object` or array of objects.
    #[serde(default)]
    pub nested: Option<Box<SpecificationDocument>>,

    #[serde(default)]
    pub min_length: Option<usize>,

    #[serde(default)]
    pub max_length: Option<usize>,

    #[serde(default)]
    pub minimum: Option<f64>,

    #[serde(default)]
    pub maximum: Option<f64>,

    #[serde(default)]
    pub transforms: Vec<Transform>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeName {
    String,
    Number,
    Boolean,
    Object,
    Array,
    Enumeration,
}

/// Built-in string transforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Transform {
    Trim,
    Lowercase,
    Uppercase,
}

impl Transform {
    fn apply(self, value: Value) -> Value {
        match value {
            Value::String(text) => Value::String(match self {
                Transform::Trim => text.trim().to_string(),
                Transform::Lowercase => text.to_lowercase(),
                Transform::Uppercase => text.to_uppercase(),
            }),
            other => other,
        }
    }
}

fn value_type(name: TypeName, values: &[Value]) -> ValueType {
    match name {
        TypeName::String => ValueType::String,
        TypeName::Number => ValueType::Number,
        TypeName::Boolean => ValueType::Boolean,
        TypeName::Object => ValueType::Object,
        TypeName::Array => ValueType::Array,
        TypeName::Enumeration => ValueType::Enumeration(values.to_vec()),
    }
}

impl SpecificationDocument {
    /// Build the specification, using `default_label` when the document has
    /// no `name_for_logging`.
    pub fn build(
        &self,
        default_label: &str,
    ) -> Result<ObjectDataSpecification, SpecificationError> {
        let label = self.name_for_logging.as_deref().unwrap_or(default_label);

        let properties = self
            .properties
            .iter()
            .map(PropertyDocument::build)
            .collect::<Result<Vec<_>, _>>()?;

        ObjectDataSpecification::builder(label)
            .subtype(self.subtype)
            .properties(properties)
            .build()
    }
}

/// A specification document file could not be loaded.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to read {path:?}: {source}")]
    Io { path: PathBuf, source: std::io::Error },

    #[error("invalid TOML document: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid JSON document: {0}")]
    Json(#[from] serde_json::Error),
}

impl SpecificationDocument {
    /// Read a document file. `.toml` files are TOML, anything else is JSON.
    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        let content = std::fs::read_to_string(path).map_err(|source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        if path.extension().is_some_and(|extension| extension == "toml") {
            Ok(toml::from_str(&content)?)
        } else {
            Ok(serde_json::from_str(&content)?)
        }
    }
}

impl PropertyDocument {
    fn build(&self) -> Result<PropertySpecification, SpecificationError> {
        let value_type = value_type(self.value_type, &self.values);
        let mut property = PropertySpecification::new(self.name.clone(), value_type);

        if self.required {
            property = property.required();
        }
        if self.nullable {
            property = property.nullable();
        }
        if let Some(element_type) = self.element_type {
            property = property.element_type(self::value_type(element_type, &self.element_values));
        }
        if let Some(nested) = &self.nested {
            property = property.nested(nested.build(&self.name)?);
        }
        if let Some(minimum) = self.min_length {
            property = property.min_length(minimum);
        }
        if let Some(maximum) = self.max_length {
            property = property.max_length(maximum);
        }
        if let Some(minimum) = self.minimum {
            property = property.minimum(minimum);
        }
        if let Some(maximum) = self.maximum {
            property = property.maximum(maximum);
        }
        for &transform in &self.transforms {
            property = property.transform(move |value| transform.apply(value));
        }
        // Last, so build() checks the default against every constraint above.
        if let Some(default) = &self.default {
            property = property.default_value(default.clone());
        }

        Ok(property)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::processor::process;
    use serde_json::json;

    #[test]
    fn test_document_from_toml() {
        let document: SpecificationDocument = toml::from_str(
            r#"
            name_for_logging = "Signup"

            [[properties]]
            name = "email"
            type = "string"
            required = true
            transforms = ["trim", "lowercase"]

            [[properties]]
            name = "plan"
            type = "enumeration"
            values = ["free", "pro"]
            default = "free"

            [[properties]]
            name = "address"
            type = "object"

            [properties.nested]
            [[properties.nested.properties]]
            name = "city"
            type = "string"
            required = true
            "#,
        )
        .unwrap();

        let spec = document.build("RequestBody").unwrap();
        assert_eq!(spec.name_for_logging(), "Signup");

        let result = process(&json!({ "email": " A@B.C ", "address": { "city": "Oslo" } }), &spec);
        assert_eq!(
            result.processed_data(),
            Some(&json!({ "email": "a@b.c", "plan": "free", "address": { "city": "Oslo" } }))
        );

        let result = process(&json!({ "email": "a@b.c", "address": {} }), &spec);
        assert_eq!(
            result.validation_errors_messages(),
            ["Signup.address.city is required but missing"]
        );
    }

    #[test]
    fn test_document_from_json_with_constraints() {
        let document: SpecificationDocument = serde_json::from_value(json!({
            "subtype": "ignore_unknown",
            "properties": [
                { "name": "tags", "type": "array", "element_type": "string", "max_length": 2 },
                { "name": "age", "type": "number", "minimum": 0, "maximum": 150 }
            ]
        }))
        .unwrap();

        let spec = document.build("Profile").unwrap();
        assert_eq!(spec.name_for_logging(), "Profile");

        let result = process(&json!({ "tags": ["a", "b", "c"], "age": 200, "x": 1 }), &spec);
        assert_eq!(
            result.validation_errors_messages(),
            [
                "Profile.tags: must contain at most 2 elements",
                "Profile.age: must be less than or equal to 150",
            ]
        );
    }

    #[test]
    fn test_document_errors_surface_at_build() {
        let document: SpecificationDocument = serde_json::from_value(json!({
            "properties": [{ "name": "kind", "type": "enumeration" }]
        }))
        .unwrap();

        assert!(matches!(
            document.build("Body"),
            Err(SpecificationError::EmptyEnumeration { .. })
        ));
    }

    #[test]
    fn test_load_picks_format_from_extension() {
        let dir = tempfile::tempdir().unwrap();

        let toml_path = dir.path().join("body.toml");
        std::fs::write(&toml_path, "[[properties]]\nname = \"id\"\ntype = \"number\"\n").unwrap();
        let document = SpecificationDocument::load(&toml_path).unwrap();
        assert_eq!(document.properties.len(), 1);

        let json_path = dir.path().join("body.json");
        std::fs::write(&json_path, "[[properties]]").unwrap();
        assert!(matches!(
            SpecificationDocument::load(&json_path),
            Err(DocumentError::Json(_))
        ));

        assert!(matches!(
            SpecificationDocument::load(&dir.path().join("missing.json")),
            Err(DocumentError::Io { .. })
        ));
    }
}
