//! Annotation instances.
//!
//! [`Annotation`] is the only view of an instance the resolution strategies
//! rely on: its type identity and by-name attribute reads. Hosts that hold
//! annotations in some other representation implement the trait over it;
//! [`SynthesizedAnnotation`] is the map-backed implementation shipped here.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::{
    AnnotationRegistry, AnnotationTypeId, AttributeInvocationError, AttributeName, AttributeType,
    AttributeValue, SynthesisError,
};

/// One annotation instance.
pub trait Annotation: std::fmt::Debug + Send + Sync {
    /// Identity of the instance's annotation type.
    fn annotation_type(&self) -> &AnnotationTypeId;

    /// Reads the attribute named `name`.
    ///
    /// Failures are reported as [`AttributeInvocationError`] and are never
    /// interpreted as "absent".
    fn attribute(&self, name: &AttributeName) -> Result<AttributeValue, AttributeInvocationError>;
}

/// An annotation instance backed by an attribute map.
#[derive(Debug, Clone)]
pub struct SynthesizedAnnotation {
    annotation_type: AnnotationTypeId,
    attributes: BTreeMap<AttributeName, AttributeValue>,
}

impl SynthesizedAnnotation {
    /// Creates an instance of `annotation_type` with no attribute values.
    pub fn new(annotation_type: AnnotationTypeId) -> Self {
        Self {
            annotation_type,
            attributes: BTreeMap::new(),
        }
    }

    /// Sets one attribute value, replacing any previous one.
    #[must_use]
    pub fn with_attribute(mut self, name: AttributeName, value: AttributeValue) -> Self {
        self.attributes.insert(name, value);
        self
    }

    /// Synthesizes an instance from a JSON document.
    ///
    /// The document has the shape `{"type": "<id>", "attributes": {...}}`.
    /// Every attribute the registered type declares must be present and match
    /// its declared type; nested annotations are documents of the same shape.
    ///
    /// # Errors
    /// Returns a [`SynthesisError`] describing the first problem found.
    pub fn from_json(
        registry: &AnnotationRegistry,
        document: &Value,
    ) -> Result<Self, SynthesisError> {
        let object = document
            .as_object()
            .ok_or_else(|| malformed("annotation document must be an object"))?;
        let type_name = object
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| malformed("annotation document needs a string `type`"))?;
        let annotation_type = AnnotationTypeId::new(type_name)
            .ok_or_else(|| malformed("annotation `type` must not be empty"))?;
        let descriptor = registry
            .get(&annotation_type)
            .ok_or_else(|| SynthesisError::UnknownAnnotationType {
                annotation_type: annotation_type.clone(),
            })?;

        let no_attributes = Map::new();
        let values = match object.get("attributes") {
            None => &no_attributes,
            Some(Value::Object(values)) => values,
            Some(_) => return Err(malformed("annotation `attributes` must be an object")),
        };

        if let Some(undeclared) = values.keys().find(|key| {
            descriptor
                .attributes
                .iter()
                .all(|method| method.name.as_str() != key.as_str())
        }) {
            return Err(SynthesisError::UnknownAttribute {
                annotation_type,
                attribute: undeclared.clone(),
            });
        }

        let mut synthesized = Self::new(annotation_type);
        for method in &descriptor.attributes {
            let raw = values.get(method.name.as_str()).ok_or_else(|| {
                SynthesisError::MissingAttribute {
                    annotation_type: synthesized.annotation_type.clone(),
                    attribute: method.name.clone(),
                }
            })?;
            let value = convert_value(
                registry,
                &synthesized.annotation_type,
                &method.name,
                &method.return_type,
                raw,
            )?;
            synthesized.attributes.insert(method.name.clone(), value);
        }
        Ok(synthesized)
    }
}

impl Annotation for SynthesizedAnnotation {
    fn annotation_type(&self) -> &AnnotationTypeId {
        &self.annotation_type
    }

    fn attribute(&self, name: &AttributeName) -> Result<AttributeValue, AttributeInvocationError> {
        self.attributes
            .get(name)
            .cloned()
            .ok_or_else(|| AttributeInvocationError::NoSuchAttribute {
                annotation_type: self.annotation_type.clone(),
                attribute: name.clone(),
            })
    }
}

fn malformed(reason: &str) -> SynthesisError {
    SynthesisError::Malformed {
        reason: reason.to_string(),
    }
}

fn convert_value(
    registry: &AnnotationRegistry,
    owner: &AnnotationTypeId,
    attribute: &AttributeName,
    expected: &AttributeType,
    raw: &Value,
) -> Result<AttributeValue, SynthesisError> {
    let mismatch = || SynthesisError::TypeMismatch {
        annotation_type: owner.clone(),
        attribute: attribute.clone(),
        expected: expected.to_string(),
    };

    let value = match expected {
        AttributeType::Boolean => AttributeValue::Boolean(raw.as_bool().ok_or_else(mismatch)?),
        AttributeType::Integer => AttributeValue::Integer(raw.as_i64().ok_or_else(mismatch)?),
        AttributeType::Float => AttributeValue::Float(raw.as_f64().ok_or_else(mismatch)?),
        AttributeType::String => {
            AttributeValue::String(raw.as_str().ok_or_else(mismatch)?.to_string())
        }
        AttributeType::Class => {
            AttributeValue::Class(raw.as_str().ok_or_else(mismatch)?.to_string())
        }
        AttributeType::Enum(type_name) => AttributeValue::Enum {
            type_name: type_name.clone(),
            constant: raw.as_str().ok_or_else(mismatch)?.to_string(),
        },
        AttributeType::Annotation(nested_type) => {
            let nested = SynthesizedAnnotation::from_json(registry, raw)?;
            if !registry.is_assignable(nested_type, &nested.annotation_type) {
                return Err(mismatch());
            }
            AttributeValue::Annotation(Arc::new(nested))
        }
        AttributeType::Array(component) => {
            let items = raw.as_array().ok_or_else(mismatch)?;
            let converted = items
                .iter()
                .map(|item| convert_value(registry, owner, attribute, component, item))
                .collect::<Result<Vec<_>, _>>()?;
            AttributeValue::Array(converted)
        }
    };
    Ok(value)
}

impl AttributeValue {
    /// Renders this value as JSON.
    ///
    /// Nested annotations render in the document shape accepted by
    /// [`SynthesizedAnnotation::from_json`].
    ///
    /// # Errors
    /// Propagates failures reading nested annotation attributes.
    pub fn to_json(
        &self,
        registry: &AnnotationRegistry,
    ) -> Result<Value, AttributeInvocationError> {
        let json = match self {
            Self::Boolean(value) => Value::Bool(*value),
            Self::Integer(value) => Value::from(*value),
            Self::Float(value) => serde_json::Number::from_f64(*value)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Self::String(value) | Self::Class(value) => Value::String(value.clone()),
            Self::Enum { constant, .. } => Value::String(constant.clone()),
            Self::Annotation(annotation) => annotation_to_json(annotation.as_ref(), registry)?,
            Self::Array(values) => Value::Array(
                values
                    .iter()
                    .map(|value| value.to_json(registry))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
        };
        Ok(json)
    }
}

/// Renders an annotation instance as a `{"type", "attributes"}` document.
///
/// Attributes are read in the order the registered type declares them. An
/// unregistered type renders with no attributes.
///
/// # Errors
/// Propagates attribute read failures from the instance.
pub fn annotation_to_json(
    annotation: &dyn Annotation,
    registry: &AnnotationRegistry,
) -> Result<Value, AttributeInvocationError> {
    let mut attributes = Map::new();
    if let Some(descriptor) = registry.get(annotation.annotation_type()) {
        for method in &descriptor.attributes {
            let value = annotation.attribute(&method.name)?;
            attributes.insert(method.name.to_string(), value.to_json(registry)?);
        }
    }
    let mut document = Map::new();
    document.insert(
        "type".to_string(),
        Value::String(annotation.annotation_type().to_string()),
    );
    document.insert("attributes".to_string(), Value::Object(attributes));
    Ok(Value::Object(document))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{annotation_to_json, Annotation, SynthesizedAnnotation};
    use crate::{
        AnnotationRegistry, AnnotationType, AnnotationTypeId, AttributeInvocationError,
        AttributeName, AttributeType, SynthesisError,
    };

    fn id(name: &str) -> AnnotationTypeId {
        AnnotationTypeId::new(name).expect("test id is non-empty")
    }

    fn name(value: &str) -> AttributeName {
        AttributeName::new(value).expect("test name is non-empty")
    }

    fn registry() -> AnnotationRegistry {
        AnnotationRegistry::new([
            AnnotationType::new(id("com.example.Tag"))
                .with_attribute(AttributeName::value(), AttributeType::String)
                .repeatable_in(id("com.example.Tags")),
            AnnotationType::new(id("com.example.Tags")).with_attribute(
                AttributeName::value(),
                AttributeType::annotation_array(id("com.example.Tag")),
            ),
            AnnotationType::new(id("com.example.Limit"))
                .with_attribute(name("max"), AttributeType::Integer)
                .with_attribute(name("unit"), AttributeType::Enum("TimeUnit".to_string())),
        ])
        .expect("registry builds")
    }

    #[test]
    fn missing_attribute_reports_no_such_attribute() {
        let tag = SynthesizedAnnotation::new(id("com.example.Tag"));
        let err = tag
            .attribute(&AttributeName::value())
            .expect_err("unset attribute must fail");
        assert!(matches!(err, AttributeInvocationError::NoSuchAttribute { .. }));
    }

    #[test]
    fn synthesizes_nested_annotation_arrays_in_order() {
        let document = json!({
            "type": "com.example.Tags",
            "attributes": {
                "value": [
                    { "type": "com.example.Tag", "attributes": { "value": "a" } },
                    { "type": "com.example.Tag", "attributes": { "value": "b" } }
                ]
            }
        });
        let tags = SynthesizedAnnotation::from_json(&registry(), &document)
            .expect("document synthesizes");

        let elements = tags
            .attribute(&AttributeName::value())
            .expect("value attribute is set")
            .into_annotations()
            .expect("value holds annotations");
        let names: Vec<String> = elements
            .iter()
            .map(|tag| {
                tag.attribute(&AttributeName::value())
                    .expect("tag value is set")
                    .as_str()
                    .expect("tag value is a string")
                    .to_string()
            })
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn rejects_type_mismatches() {
        let document = json!({
            "type": "com.example.Limit",
            "attributes": { "max": "ten", "unit": "SECONDS" }
        });
        let err = SynthesizedAnnotation::from_json(&registry(), &document)
            .expect_err("string for integer attribute must fail");
        assert_eq!(
            err,
            SynthesisError::TypeMismatch {
                annotation_type: id("com.example.Limit"),
                attribute: name("max"),
                expected: "integer".to_string(),
            }
        );
    }

    #[test]
    fn rejects_nested_annotation_of_wrong_type() {
        let document = json!({
            "type": "com.example.Tags",
            "attributes": {
                "value": [{
                    "type": "com.example.Limit",
                    "attributes": { "max": 1, "unit": "SECONDS" }
                }]
            }
        });
        let err = SynthesizedAnnotation::from_json(&registry(), &document)
            .expect_err("nested annotation of the wrong type must fail");
        assert!(matches!(err, SynthesisError::TypeMismatch { .. }));
    }

    #[test]
    fn rejects_unknown_and_missing_attributes() {
        let unknown = json!({
            "type": "com.example.Tag",
            "attributes": { "value": "a", "colour": "red" }
        });
        assert!(matches!(
            SynthesizedAnnotation::from_json(&registry(), &unknown),
            Err(SynthesisError::UnknownAttribute { .. })
        ));

        let missing = json!({ "type": "com.example.Tag" });
        assert!(matches!(
            SynthesizedAnnotation::from_json(&registry(), &missing),
            Err(SynthesisError::MissingAttribute { .. })
        ));

        let unregistered = json!({ "type": "com.example.Nope" });
        assert!(matches!(
            SynthesizedAnnotation::from_json(&registry(), &unregistered),
            Err(SynthesisError::UnknownAnnotationType { .. })
        ));

        assert!(matches!(
            SynthesizedAnnotation::from_json(&registry(), &json!([])),
            Err(SynthesisError::Malformed { .. })
        ));
    }

    #[test]
    fn renders_back_to_document_shape() {
        let document = json!({
            "type": "com.example.Limit",
            "attributes": { "max": 10, "unit": "SECONDS" }
        });
        let limit = SynthesizedAnnotation::from_json(&registry(), &document)
            .expect("document synthesizes");
        let rendered = annotation_to_json(&limit, &registry()).expect("instance renders");
        assert_eq!(rendered, document);
    }
}
