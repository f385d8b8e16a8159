//! Annotation type descriptors and attribute values.
//!
//! These types take the place of runtime reflection: an [`AnnotationType`]
//! declares everything the resolution strategies need to know about a type
//! (its accessors in declaration order, its native repeatable container, and
//! the types it can be assigned to), and an [`AttributeValue`] is what reading
//! one accessor from an instance yields.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{Annotation, AnnotationTypeId, AttributeName};

// ---------------------------------------------------------------------------
// Attribute types
// ---------------------------------------------------------------------------

/// Declared return type of an annotation attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    Boolean,
    Integer,
    Float,
    String,
    /// A type reference, carried as its fully-qualified name.
    Class,
    /// A constant of the named enumeration.
    Enum(String),
    /// A nested annotation of the given type.
    Annotation(AnnotationTypeId),
    /// An array whose elements all have the component type.
    Array(Box<AttributeType>),
}

impl AttributeType {
    /// Shorthand for an array of annotations of type `id`.
    pub fn annotation_array(id: AnnotationTypeId) -> Self {
        Self::Array(Box::new(Self::Annotation(id)))
    }

    /// Returns `true` for array types.
    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array(_))
    }

    /// Returns the element type of an array type.
    pub fn component_type(&self) -> Option<&AttributeType> {
        match self {
            Self::Array(component) => Some(component),
            _ => None,
        }
    }

    /// Returns the annotation type when this is a (non-array) annotation type.
    pub fn annotation_type(&self) -> Option<&AnnotationTypeId> {
        match self {
            Self::Annotation(id) => Some(id),
            _ => None,
        }
    }
}

impl std::fmt::Display for AttributeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Boolean => write!(f, "boolean"),
            Self::Integer => write!(f, "integer"),
            Self::Float => write!(f, "float"),
            Self::String => write!(f, "string"),
            Self::Class => write!(f, "class"),
            Self::Enum(name) => write!(f, "enum {name}"),
            Self::Annotation(id) => write!(f, "@{id}"),
            Self::Array(component) => write!(f, "{component}[]"),
        }
    }
}

// ---------------------------------------------------------------------------
// Accessors and type descriptors
// ---------------------------------------------------------------------------

/// One attribute accessor declared by an annotation type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttributeMethod {
    /// Accessor name, unique within its declaring type.
    pub name: AttributeName,
    /// Declared return type.
    pub return_type: AttributeType,
}

impl AttributeMethod {
    /// Creates an accessor descriptor.
    pub fn new(name: AttributeName, return_type: AttributeType) -> Self {
        Self { name, return_type }
    }
}

/// Metadata describing one annotation type.
///
/// Type references (`repeatable_container`, `extends`, nested annotation
/// attribute types) are ids resolved through an
/// [`AnnotationRegistry`](crate::AnnotationRegistry), which lets mutually
/// referencing types (a repeatable and its container) be declared without
/// ownership cycles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationType {
    /// Fully-qualified type name.
    pub id: AnnotationTypeId,

    /// Attribute accessors in declaration order.
    #[serde(default)]
    pub attributes: Vec<AttributeMethod>,

    /// Native repeatable metadata: the container type this annotation is
    /// collected into when repeated. `None` for non-repeatable types.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeatable_container: Option<AnnotationTypeId>,

    /// Types an instance of this type is also assignable to.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extends: Vec<AnnotationTypeId>,
}

impl AnnotationType {
    /// Creates a descriptor with no attributes and no repeatable metadata.
    pub fn new(id: AnnotationTypeId) -> Self {
        Self {
            id,
            attributes: Vec::new(),
            repeatable_container: None,
            extends: Vec::new(),
        }
    }

    /// Appends an attribute accessor.
    #[must_use]
    pub fn with_attribute(mut self, name: AttributeName, return_type: AttributeType) -> Self {
        self.attributes.push(AttributeMethod::new(name, return_type));
        self
    }

    /// Marks this type as natively repeatable, collected into `container`.
    #[must_use]
    pub fn repeatable_in(mut self, container: AnnotationTypeId) -> Self {
        self.repeatable_container = Some(container);
        self
    }

    /// Declares a super type this type is assignable to.
    #[must_use]
    pub fn extending(mut self, super_type: AnnotationTypeId) -> Self {
        self.extends.push(super_type);
        self
    }

    /// Returns `true` if this type carries native repeatable metadata.
    pub fn is_repeatable(&self) -> bool {
        self.repeatable_container.is_some()
    }
}

// ---------------------------------------------------------------------------
// Attribute values
// ---------------------------------------------------------------------------

/// A value read from an annotation attribute.
#[derive(Debug, Clone)]
pub enum AttributeValue {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Class(String),
    Enum {
        /// Enumeration type name.
        type_name: String,
        /// Constant name.
        constant: String,
    },
    Annotation(Arc<dyn Annotation>),
    Array(Vec<AttributeValue>),
}

impl AttributeValue {
    /// Returns the string payload of a `String` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the payload of an `Integer` value.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the nested annotation of an `Annotation` value.
    pub fn as_annotation(&self) -> Option<&Arc<dyn Annotation>> {
        match self {
            Self::Annotation(annotation) => Some(annotation),
            _ => None,
        }
    }

    /// Returns the elements of an `Array` value.
    pub fn as_array(&self) -> Option<&[AttributeValue]> {
        match self {
            Self::Array(values) => Some(values),
            _ => None,
        }
    }

    /// Converts an array of annotation values into the annotations it holds.
    ///
    /// Returns `None` unless this is an array and every element is an
    /// annotation.
    pub fn into_annotations(self) -> Option<Vec<Arc<dyn Annotation>>> {
        match self {
            Self::Array(values) => values
                .into_iter()
                .map(|value| match value {
                    Self::Annotation(annotation) => Some(annotation),
                    _ => None,
                })
                .collect(),
            _ => None,
        }
    }
}
