//! Repeatable-container resolution strategies.
//!
//! A [`RepeatableContainers`] value is an immutable chain of strategies. Given
//! an annotation instance, each strategy either recognizes it as a container
//! and returns the repeated annotations it holds, or hands it to the next
//! strategy. When the chain is exhausted the annotation is not a container.
//!
//! Three strategies exist:
//!
//! - **standard**: recognizes containers through native repeatable metadata,
//!   consulting the [`RepeatableMethodCache`] of the [`ResolutionContext`].
//! - **explicit**: one validated container/repeatable pairing, registered with
//!   [`RepeatableContainers::of`] or [`RepeatableContainers::and`].
//! - **none**: recognizes nothing.
//!
//! Chains are persistent: [`RepeatableContainers::and`] returns a new chain
//! whose head is checked before the chain it extends, and never changes the
//! original. Cloning a chain is an `Arc` clone.

use std::hash::{Hash, Hasher};
use std::sync::{Arc, LazyLock};

use tracing::{debug, trace, warn};

use crate::{
    Annotation, AnnotationConfigurationError, AnnotationRegistry, AnnotationTypeId,
    AttributeInvocationError, AttributeMethod, AttributeMethods, AttributeName, AttributeType,
    CachedAttribute, RepeatableMethodCache,
};

static STANDARD: LazyLock<RepeatableContainers> =
    LazyLock::new(|| RepeatableContainers::root(ContainerKind::Standard));

static NONE: LazyLock<RepeatableContainers> =
    LazyLock::new(|| RepeatableContainers::root(ContainerKind::Disabled));

// ---------------------------------------------------------------------------
// Resolution context
// ---------------------------------------------------------------------------

/// Type metadata and lookup cache used while resolving annotations.
///
/// Cloning shares both the registry and the cache.
#[derive(Debug, Clone)]
pub struct ResolutionContext {
    registry: Arc<AnnotationRegistry>,
    cache: Arc<RepeatableMethodCache>,
}

impl ResolutionContext {
    /// Creates a context with a fresh, empty cache.
    pub fn new(registry: Arc<AnnotationRegistry>) -> Self {
        Self::with_cache(registry, Arc::new(RepeatableMethodCache::new()))
    }

    /// Creates a context around an existing cache.
    ///
    /// The cache must only ever have been populated against `registry`.
    pub fn with_cache(
        registry: Arc<AnnotationRegistry>,
        cache: Arc<RepeatableMethodCache>,
    ) -> Self {
        Self { registry, cache }
    }

    pub fn registry(&self) -> &AnnotationRegistry {
        &self.registry
    }

    pub fn cache(&self) -> &RepeatableMethodCache {
        &self.cache
    }

    fn repeated_annotations_method(&self, annotation_type: &AnnotationTypeId) -> CachedAttribute {
        self.cache.get_or_compute(annotation_type, || {
            compute_repeated_annotations_method(&self.registry, annotation_type)
        })
    }
}

/// Native container check: the type's only attribute is `value`, returning an
/// array of an annotation type that carries repeatable metadata.
fn compute_repeated_annotations_method(
    registry: &AnnotationRegistry,
    annotation_type: &AnnotationTypeId,
) -> CachedAttribute {
    let Some(descriptor) = registry.get(annotation_type) else {
        return CachedAttribute::NotApplicable;
    };
    let methods = AttributeMethods::for_annotation_type(descriptor);
    if !methods.has_only_value_attribute() {
        return CachedAttribute::NotApplicable;
    }
    match methods.get(0) {
        Some(method) => match method.return_type.component_type() {
            Some(AttributeType::Annotation(component)) if registry.is_repeatable(component) => {
                CachedAttribute::Eligible(method.clone())
            }
            _ => CachedAttribute::NotApplicable,
        },
        None => CachedAttribute::NotApplicable,
    }
}

// ---------------------------------------------------------------------------
// Strategy chain
// ---------------------------------------------------------------------------

/// Strategy chain deciding which annotations are repeatable containers.
///
/// Two chains are equal when they were built from the same sequence of
/// strategies with the same type arguments; equal chains hash identically.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct RepeatableContainers {
    node: Arc<Node>,
}

#[derive(PartialEq, Eq, Hash)]
struct Node {
    parent: Option<RepeatableContainers>,
    kind: ContainerKind,
}

#[derive(Debug, PartialEq, Eq, Hash)]
enum ContainerKind {
    Standard,
    Explicit(ExplicitContainer),
    Disabled,
}

/// A validated container/repeatable pairing.
///
/// `value_attribute` is always the container's `value` accessor returning an
/// array of exactly `repeatable`; it is derived from the pair and therefore
/// excluded from equality.
#[derive(Debug)]
struct ExplicitContainer {
    repeatable: AnnotationTypeId,
    container: AnnotationTypeId,
    value_attribute: AttributeMethod,
}

impl PartialEq for ExplicitContainer {
    fn eq(&self, other: &Self) -> bool {
        self.container == other.container && self.repeatable == other.repeatable
    }
}

impl Eq for ExplicitContainer {}

impl Hash for ExplicitContainer {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.container.hash(state);
        self.repeatable.hash(state);
    }
}

impl ExplicitContainer {
    fn new(
        registry: &AnnotationRegistry,
        repeatable: &AnnotationTypeId,
        container: Option<&AnnotationTypeId>,
    ) -> Result<Self, AnnotationConfigurationError> {
        let repeatable_type = registry.get(repeatable).ok_or_else(|| {
            AnnotationConfigurationError::UnknownAnnotationType {
                annotation_type: repeatable.clone(),
            }
        })?;

        let container = match container {
            Some(container) => container.clone(),
            None => repeatable_type.repeatable_container.clone().ok_or_else(|| {
                AnnotationConfigurationError::NotRepeatable {
                    repeatable: repeatable.clone(),
                }
            })?,
        };

        let invalid = |reason: &str| AnnotationConfigurationError::InvalidContainerDeclaration {
            container: container.clone(),
            repeatable: repeatable.clone(),
            reason: reason.to_string(),
        };
        let container_type = registry
            .get(&container)
            .ok_or_else(|| invalid("container type is not registered"))?;
        let value_attribute = AttributeMethods::for_annotation_type(container_type)
            .get_by_name(&AttributeName::value())
            .ok_or_else(|| invalid("no value attribute found"))?;

        let element_type = value_attribute
            .return_type
            .component_type()
            .and_then(AttributeType::annotation_type);
        if element_type != Some(repeatable) {
            return Err(AnnotationConfigurationError::ValueAttributeMismatch {
                container,
                repeatable: repeatable.clone(),
            });
        }

        Ok(Self {
            repeatable: repeatable.clone(),
            value_attribute: value_attribute.clone(),
            container,
        })
    }
}

impl RepeatableContainers {
    fn root(kind: ContainerKind) -> Self {
        Self::with_parent(None, kind)
    }

    fn with_parent(parent: Option<RepeatableContainers>, kind: ContainerKind) -> Self {
        Self {
            node: Arc::new(Node { parent, kind }),
        }
    }

    /// Returns the shared chain that recognizes containers through native
    /// repeatable metadata.
    pub fn standard_repeatables() -> Self {
        STANDARD.clone()
    }

    /// Returns the shared chain that recognizes no containers.
    pub fn none() -> Self {
        NONE.clone()
    }

    /// Creates a single-mapping chain for `repeatable`.
    ///
    /// When `container` is `None` it is deduced from `repeatable`'s native
    /// repeatable metadata. The container must declare a `value` attribute
    /// returning an array of `repeatable`.
    ///
    /// # Errors
    /// Returns an [`AnnotationConfigurationError`] naming the offending types
    /// when the pairing is invalid.
    pub fn of(
        registry: &AnnotationRegistry,
        repeatable: &AnnotationTypeId,
        container: Option<&AnnotationTypeId>,
    ) -> Result<Self, AnnotationConfigurationError> {
        Self::explicit(None, registry, repeatable, container)
    }

    /// Returns a new chain that checks `container`/`repeatable` first and then
    /// falls back to `self`.
    ///
    /// # Errors
    /// Same validation as [`RepeatableContainers::of`].
    pub fn and(
        &self,
        registry: &AnnotationRegistry,
        container: &AnnotationTypeId,
        repeatable: &AnnotationTypeId,
    ) -> Result<Self, AnnotationConfigurationError> {
        Self::explicit(Some(self.clone()), registry, repeatable, Some(container))
    }

    pub(crate) fn explicit(
        parent: Option<RepeatableContainers>,
        registry: &AnnotationRegistry,
        repeatable: &AnnotationTypeId,
        container: Option<&AnnotationTypeId>,
    ) -> Result<Self, AnnotationConfigurationError> {
        match ExplicitContainer::new(registry, repeatable, container) {
            Ok(explicit) => {
                debug!(
                    container = %explicit.container,
                    repeatable = %explicit.repeatable,
                    "registered explicit repeatable container"
                );
                Ok(Self::with_parent(parent, ContainerKind::Explicit(explicit)))
            }
            Err(err) => {
                warn!(
                    repeatable = %repeatable,
                    error = %err,
                    "rejected explicit repeatable container"
                );
                Err(err)
            }
        }
    }

    /// Returns the repeated annotations held by `annotation`, or `None` if no
    /// strategy in the chain recognizes it as a container.
    ///
    /// # Errors
    /// Attribute read failures from the instance propagate unchanged, as does
    /// an accessor returning something other than an array of annotations.
    pub fn find_repeated_annotations(
        &self,
        annotation: &dyn Annotation,
        context: &ResolutionContext,
    ) -> Result<Option<Vec<Arc<dyn Annotation>>>, AttributeInvocationError> {
        let annotation_type = annotation.annotation_type();
        let mut current = Some(self);
        while let Some(chain) = current {
            let method = match &chain.node.kind {
                ContainerKind::Standard => context
                    .repeated_annotations_method(annotation_type)
                    .method()
                    .cloned(),
                ContainerKind::Explicit(explicit) => context
                    .registry
                    .is_assignable(&explicit.container, annotation_type)
                    .then(|| explicit.value_attribute.clone()),
                ContainerKind::Disabled => None,
            };
            if let Some(method) = method {
                let repeated = invoke_repeated(annotation, &method)?;
                trace!(
                    annotation_type = %annotation_type,
                    count = repeated.len(),
                    "resolved repeatable container"
                );
                return Ok(Some(repeated));
            }
            current = chain.node.parent.as_ref();
        }
        trace!(annotation_type = %annotation_type, "not a repeatable container");
        Ok(None)
    }

    /// Iterates the chain from the most recently added strategy to the root.
    fn nodes(&self) -> impl Iterator<Item = &Node> {
        std::iter::successors(Some(self.node.as_ref()), |node| {
            node.parent.as_ref().map(|parent| parent.node.as_ref())
        })
    }
}

fn invoke_repeated(
    annotation: &dyn Annotation,
    method: &AttributeMethod,
) -> Result<Vec<Arc<dyn Annotation>>, AttributeInvocationError> {
    annotation
        .attribute(&method.name)?
        .into_annotations()
        .ok_or_else(|| AttributeInvocationError::UnexpectedValue {
            annotation_type: annotation.annotation_type().clone(),
            attribute: method.name.clone(),
            expected: "an array of annotations",
        })
}

impl std::fmt::Display for RepeatableContainers {
    /// Renders the chain in lookup order, e.g. `explicit(a.Tags -> a.Tag) -> standard`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (index, node) in self.nodes().enumerate() {
            if index > 0 {
                write!(f, " -> ")?;
            }
            match &node.kind {
                ContainerKind::Standard => write!(f, "standard")?,
                ContainerKind::Explicit(explicit) => {
                    write!(f, "explicit({} -> {})", explicit.container, explicit.repeatable)?
                }
                ContainerKind::Disabled => write!(f, "none")?,
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for RepeatableContainers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.nodes().map(|node| &node.kind))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{RepeatableContainers, ResolutionContext};
    use crate::{
        AnnotationConfigurationError, AnnotationRegistry, AnnotationType, AnnotationTypeId,
        AttributeName, AttributeType, CachedAttribute,
    };

    fn id(name: &str) -> AnnotationTypeId {
        AnnotationTypeId::new(name).expect("test id is non-empty")
    }

    fn registry() -> AnnotationRegistry {
        AnnotationRegistry::new([
            AnnotationType::new(id("a.Tag"))
                .with_attribute(AttributeName::value(), AttributeType::String)
                .repeatable_in(id("a.Tags")),
            AnnotationType::new(id("a.Tags")).with_attribute(
                AttributeName::value(),
                AttributeType::annotation_array(id("a.Tag")),
            ),
            AnnotationType::new(id("a.Other"))
                .with_attribute(AttributeName::value(), AttributeType::String),
        ])
        .expect("registry builds")
    }

    #[test]
    fn standard_cache_entry_requires_repeatable_element_type() {
        let context = ResolutionContext::new(Arc::new(registry()));
        let tags = context.repeated_annotations_method(&id("a.Tags"));
        assert!(matches!(tags, CachedAttribute::Eligible(_)));

        let tag = context.repeated_annotations_method(&id("a.Tag"));
        assert_eq!(tag, CachedAttribute::NotApplicable);

        let unknown = context.repeated_annotations_method(&id("a.Unknown"));
        assert_eq!(unknown, CachedAttribute::NotApplicable);
        assert_eq!(context.cache().len(), 3);
    }

    #[test]
    fn singletons_are_shared() {
        let first = RepeatableContainers::standard_repeatables();
        let second = RepeatableContainers::standard_repeatables();
        assert!(Arc::ptr_eq(&first.node, &second.node));
        assert!(Arc::ptr_eq(
            &RepeatableContainers::none().node,
            &RepeatableContainers::none().node
        ));
        assert_ne!(first, RepeatableContainers::none());
    }

    #[test]
    fn deduces_container_from_repeatable_metadata() {
        let chain = RepeatableContainers::of(&registry(), &id("a.Tag"), None)
            .expect("container is deduced");
        assert_eq!(chain.to_string(), "explicit(a.Tags -> a.Tag)");
    }

    #[test]
    fn display_lists_strategies_in_lookup_order() {
        let registry = registry();
        let chain = RepeatableContainers::standard_repeatables()
            .and(&registry, &id("a.Tags"), &id("a.Tag"))
            .expect("mapping is valid");
        assert_eq!(chain.to_string(), "explicit(a.Tags -> a.Tag) -> standard");
        assert_eq!(RepeatableContainers::none().to_string(), "none");
    }

    #[test]
    fn rejects_unknown_repeatable() {
        let err = RepeatableContainers::of(&registry(), &id("a.Missing"), None)
            .expect_err("unregistered repeatable must be rejected");
        assert_eq!(
            err,
            AnnotationConfigurationError::UnknownAnnotationType {
                annotation_type: id("a.Missing"),
            }
        );
    }

    #[test]
    fn rejects_container_without_value_attribute() {
        let registry = AnnotationRegistry::new([
            AnnotationType::new(id("a.Marker")),
            AnnotationType::new(id("a.Group")).with_attribute(
                AttributeName::new("items").expect("test name is non-empty"),
                AttributeType::annotation_array(id("a.Marker")),
            ),
        ])
        .expect("registry builds");

        let err = RepeatableContainers::of(&registry, &id("a.Marker"), Some(&id("a.Group")))
            .expect_err("container without value must be rejected");
        match err {
            AnnotationConfigurationError::InvalidContainerDeclaration {
                container,
                repeatable,
                ..
            } => {
                assert_eq!(container, id("a.Group"));
                assert_eq!(repeatable, id("a.Marker"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
