//! Error types for annotation metadata.
//!
//! The two main families are kept apart because they surface at different
//! times:
//!
//! - [`AnnotationConfigurationError`] is raised while metadata or a container
//!   chain is being *built*. It is permanent: retrying with the same input fails
//!   the same way.
//! - [`AttributeInvocationError`] is raised while an annotation instance is
//!   being *read* during resolution. It is never converted into "not a
//!   container".
//!
//! [`SynthesisError`] covers turning a JSON document into an annotation
//! instance.

use thiserror::Error;

use crate::{AnnotationTypeId, AttributeName};

// ---------------------------------------------------------------------------
// Identifier errors
// ---------------------------------------------------------------------------

/// An identifier was deserialized from an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} must not be empty")]
pub struct EmptyIdentifierError {
    /// Name of the identifier type that rejected the value.
    pub kind: &'static str,
}

// ---------------------------------------------------------------------------
// Construction-time errors
// ---------------------------------------------------------------------------

/// A structurally invalid annotation declaration or container/repeatable pairing.
///
/// Produced by registry construction and by explicit container mappings. A
/// chain node that was built successfully never produces this error later.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnnotationConfigurationError {
    /// A mapping referred to an annotation type the registry does not know.
    #[error("Annotation type [{annotation_type}] is not registered")]
    UnknownAnnotationType {
        /// The unresolved type.
        annotation_type: AnnotationTypeId,
    },

    /// Two descriptors with the same type id were registered.
    #[error("Annotation type [{annotation_type}] is registered more than once")]
    DuplicateAnnotationType {
        /// The duplicated type.
        annotation_type: AnnotationTypeId,
    },

    /// One annotation type declares the same attribute name twice.
    #[error("Annotation type [{annotation_type}] declares attribute '{attribute}' more than once")]
    DuplicateAttribute {
        /// The declaring type.
        annotation_type: AnnotationTypeId,
        /// The repeated attribute name.
        attribute: AttributeName,
    },

    /// No container was supplied and the repeatable type carries no native
    /// repeatable metadata to deduce one from.
    #[error(
        "Annotation type must be a repeatable annotation: \
         failed to resolve container type for {repeatable}"
    )]
    NotRepeatable {
        /// The type that was expected to name its container.
        repeatable: AnnotationTypeId,
    },

    /// The container type could not be used at all (unregistered, or without a
    /// `value` attribute).
    #[error(
        "Invalid declaration of container type [{container}] \
         for repeatable annotation [{repeatable}]: {reason}"
    )]
    InvalidContainerDeclaration {
        /// The offending container type.
        container: AnnotationTypeId,
        /// The repeatable type it was paired with.
        repeatable: AnnotationTypeId,
        /// What was wrong with the container.
        reason: String,
    },

    /// The container declares `value`, but it does not return an array of the
    /// repeatable type.
    #[error(
        "Container type [{container}] must declare a 'value' attribute \
         for an array of type [{repeatable}]"
    )]
    ValueAttributeMismatch {
        /// The offending container type.
        container: AnnotationTypeId,
        /// The repeatable type it was paired with.
        repeatable: AnnotationTypeId,
    },
}

// ---------------------------------------------------------------------------
// Resolution-time errors
// ---------------------------------------------------------------------------

/// Reading an attribute from an annotation instance failed.
///
/// Resolution propagates this unchanged; it is distinct from the ordinary
/// "not a container" outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttributeInvocationError {
    /// The instance does not expose the requested attribute.
    #[error("Annotation [{annotation_type}] has no attribute '{attribute}'")]
    NoSuchAttribute {
        /// Type of the instance.
        annotation_type: AnnotationTypeId,
        /// The missing attribute.
        attribute: AttributeName,
    },

    /// The instance raised a failure while producing the value.
    #[error("Failed to invoke attribute '{attribute}' on [{annotation_type}]: {message}")]
    Failed {
        /// Type of the instance.
        annotation_type: AnnotationTypeId,
        /// The attribute being read.
        attribute: AttributeName,
        /// Failure reported by the instance.
        message: String,
    },

    /// The value produced did not have the shape the accessor declares.
    #[error("Attribute '{attribute}' on [{annotation_type}] did not return {expected}")]
    UnexpectedValue {
        /// Type of the instance.
        annotation_type: AnnotationTypeId,
        /// The attribute being read.
        attribute: AttributeName,
        /// Description of the expected shape.
        expected: &'static str,
    },
}

// ---------------------------------------------------------------------------
// Synthesis errors
// ---------------------------------------------------------------------------

/// An annotation document could not be turned into an instance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SynthesisError {
    /// The document is not shaped like `{"type": ..., "attributes": {...}}`.
    #[error("Malformed annotation document: {reason}")]
    Malformed {
        /// Description of the problem.
        reason: String,
    },

    /// The document names a type the registry does not know.
    #[error("Annotation type [{annotation_type}] is not registered")]
    UnknownAnnotationType {
        /// The unresolved type.
        annotation_type: AnnotationTypeId,
    },

    /// The document sets an attribute the type does not declare.
    #[error("Annotation type [{annotation_type}] declares no attribute '{attribute}'")]
    UnknownAttribute {
        /// The document's type.
        annotation_type: AnnotationTypeId,
        /// The undeclared attribute.
        attribute: String,
    },

    /// A declared attribute has no value in the document.
    #[error("Annotation [{annotation_type}] is missing a value for attribute '{attribute}'")]
    MissingAttribute {
        /// The document's type.
        annotation_type: AnnotationTypeId,
        /// The attribute without a value.
        attribute: AttributeName,
    },

    /// A value does not match the declared attribute type.
    #[error("Attribute '{attribute}' on [{annotation_type}] expects {expected}")]
    TypeMismatch {
        /// The document's type.
        annotation_type: AnnotationTypeId,
        /// The attribute with the bad value.
        attribute: AttributeName,
        /// The declared attribute type, rendered for humans.
        expected: String,
    },
}
