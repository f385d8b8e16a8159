//! Annotation metadata and repeatable-container resolution.
//!
//! This crate answers one question for annotation-metadata scanners: *is this
//! annotation a container of some repeatable annotation, and if so, what does
//! it contain?* Annotation types are described by explicit descriptors instead
//! of runtime reflection, and instances are read through the [`Annotation`]
//! trait.
//!
//! ## Architectural Layer
//!
//! **Domain logic.** This crate has no I/O dependencies. Callers load metadata
//! documents and hand the parsed values in.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`AnnotationTypeId`, `AttributeName`) |
//! | [`types`] | Type descriptors (`AnnotationType`, `AttributeType`) and `AttributeValue` |
//! | [`registry`] | The annotation type universe (`AnnotationRegistry`) |
//! | [`attributes`] | Ordered accessor view of one type (`AttributeMethods`) |
//! | [`annotation`] | The `Annotation` instance trait and `SynthesizedAnnotation` |
//! | [`cache`] | Memoized container-accessor lookups (`RepeatableMethodCache`) |
//! | [`containers`] | The strategy chain (`RepeatableContainers`, `ResolutionContext`) |
//! | [`config`] | Serde configuration documents |
//! | [`errors`] | Configuration, invocation and synthesis errors |
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use annotations::{
//!     AnnotationRegistry, AnnotationType, AnnotationTypeId, AttributeName, AttributeType,
//!     AttributeValue, RepeatableContainers, ResolutionContext, SynthesizedAnnotation,
//! };
//!
//! let tag = AnnotationTypeId::new("com.example.Tag").unwrap();
//! let tags = AnnotationTypeId::new("com.example.Tags").unwrap();
//! let registry = Arc::new(
//!     AnnotationRegistry::new([
//!         AnnotationType::new(tag.clone())
//!             .with_attribute(AttributeName::value(), AttributeType::String)
//!             .repeatable_in(tags.clone()),
//!         AnnotationType::new(tags.clone()).with_attribute(
//!             AttributeName::value(),
//!             AttributeType::annotation_array(tag.clone()),
//!         ),
//!     ])
//!     .unwrap(),
//! );
//!
//! let element = SynthesizedAnnotation::new(tag)
//!     .with_attribute(AttributeName::value(), AttributeValue::String("fast".into()));
//! let container = SynthesizedAnnotation::new(tags).with_attribute(
//!     AttributeName::value(),
//!     AttributeValue::Array(vec![AttributeValue::Annotation(Arc::new(element))]),
//! );
//!
//! let context = ResolutionContext::new(registry);
//! let repeated = RepeatableContainers::standard_repeatables()
//!     .find_repeated_annotations(&container, &context)
//!     .unwrap();
//! assert_eq!(repeated.map(|elements| elements.len()), Some(1));
//! ```

pub mod annotation;
pub mod attributes;
pub mod cache;
pub mod config;
pub mod containers;
pub mod errors;
pub mod identifiers;
pub mod registry;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use annotation::{annotation_to_json, Annotation, SynthesizedAnnotation};
pub use attributes::AttributeMethods;
pub use cache::{CachedAttribute, RepeatableMethodCache};
pub use config::{ContainerMode, ExplicitMapping, MetadataDocument, RepeatableContainersConfig};
pub use containers::{RepeatableContainers, ResolutionContext};
pub use errors::{
    AnnotationConfigurationError, AttributeInvocationError, EmptyIdentifierError, SynthesisError,
};
pub use identifiers::{AnnotationTypeId, AttributeName, VALUE_ATTRIBUTE};
pub use registry::AnnotationRegistry;
pub use types::{AnnotationType, AttributeMethod, AttributeType, AttributeValue};
