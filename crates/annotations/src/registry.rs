//! The annotation type universe.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::{AnnotationConfigurationError, AnnotationType, AnnotationTypeId};

/// Immutable set of known annotation types, keyed by id.
///
/// Built once and shared behind an `Arc`; every type reference inside a
/// descriptor is resolved through here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationRegistry {
    types: BTreeMap<AnnotationTypeId, AnnotationType>,
}

impl AnnotationRegistry {
    /// Builds a registry from descriptors.
    ///
    /// # Errors
    /// - [`AnnotationConfigurationError::DuplicateAnnotationType`] when two
    ///   descriptors share an id.
    /// - [`AnnotationConfigurationError::DuplicateAttribute`] when a
    ///   descriptor declares one attribute name twice.
    pub fn new(
        types: impl IntoIterator<Item = AnnotationType>,
    ) -> Result<Self, AnnotationConfigurationError> {
        let mut registered = BTreeMap::new();
        for descriptor in types {
            let mut names = HashSet::new();
            for attribute in &descriptor.attributes {
                if !names.insert(&attribute.name) {
                    return Err(AnnotationConfigurationError::DuplicateAttribute {
                        annotation_type: descriptor.id.clone(),
                        attribute: attribute.name.clone(),
                    });
                }
            }
            if registered.contains_key(&descriptor.id) {
                return Err(AnnotationConfigurationError::DuplicateAnnotationType {
                    annotation_type: descriptor.id,
                });
            }
            registered.insert(descriptor.id.clone(), descriptor);
        }
        Ok(Self { types: registered })
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Returns the descriptor for `id`.
    pub fn get(&self, id: &AnnotationTypeId) -> Option<&AnnotationType> {
        self.types.get(id)
    }

    pub fn contains(&self, id: &AnnotationTypeId) -> bool {
        self.types.contains_key(id)
    }

    /// Iterates descriptors sorted by id.
    pub fn iter(&self) -> impl Iterator<Item = &AnnotationType> {
        self.types.values()
    }

    /// Returns `true` if `id` is registered and names a native container.
    pub fn is_repeatable(&self, id: &AnnotationTypeId) -> bool {
        self.get(id).is_some_and(AnnotationType::is_repeatable)
    }

    /// Returns `true` if an instance of `candidate` can be treated as `target`.
    ///
    /// That holds when the two are the same type, or when `target` is reachable
    /// through `candidate`'s `extends` declarations. Unregistered super types
    /// end the walk; cyclic declarations are tolerated.
    pub fn is_assignable(&self, target: &AnnotationTypeId, candidate: &AnnotationTypeId) -> bool {
        if target == candidate {
            return true;
        }
        let mut visited = BTreeSet::new();
        let mut pending = vec![candidate];
        while let Some(current) = pending.pop() {
            if !visited.insert(current) {
                continue;
            }
            let Some(descriptor) = self.get(current) else {
                continue;
            };
            for super_type in &descriptor.extends {
                if super_type == target {
                    return true;
                }
                pending.push(super_type);
            }
        }
        false
    }
}
