//! Memoized container-accessor lookups.
//!
//! Deciding whether an annotation type is a native container means inspecting
//! its attributes and the metadata of the element type. The answer is a pure
//! function of immutable type metadata, so it is computed at most once per
//! type and kept for the lifetime of the cache, negative answers included.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use tracing::debug;

use crate::{AnnotationTypeId, AttributeMethod};

/// Cached answer for one annotation type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CachedAttribute {
    /// The type is a container; its elements are read through this accessor.
    Eligible(AttributeMethod),
    /// The type was inspected and is not a container.
    NotApplicable,
}

impl CachedAttribute {
    /// Returns the accessor for eligible entries.
    pub fn method(&self) -> Option<&AttributeMethod> {
        match self {
            Self::Eligible(method) => Some(method),
            Self::NotApplicable => None,
        }
    }
}

/// Thread-safe map from annotation type to [`CachedAttribute`].
///
/// A key that is absent has not been computed yet. Entries are never updated
/// or removed once inserted.
#[derive(Debug, Default)]
pub struct RepeatableMethodCache {
    entries: RwLock<HashMap<AnnotationTypeId, CachedAttribute>>,
}

impl RepeatableMethodCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the entry for `annotation_type`, computing it on first use.
    ///
    /// `compute` runs without any lock held. Threads racing on the same key
    /// may each run it; the first insert wins and every caller returns the
    /// stored entry.
    pub fn get_or_compute(
        &self,
        annotation_type: &AnnotationTypeId,
        compute: impl FnOnce() -> CachedAttribute,
    ) -> CachedAttribute {
        if let Some(entry) = self.get(annotation_type) {
            return entry;
        }

        let computed = compute();
        debug!(
            annotation_type = %annotation_type,
            eligible = matches!(computed, CachedAttribute::Eligible(_)),
            "computed repeated-annotations accessor"
        );

        // Entries are insert-only, so a poisoned map is still consistent.
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        entries
            .entry(annotation_type.clone())
            .or_insert(computed)
            .clone()
    }

    /// Returns the stored entry without computing one.
    pub fn get(&self, annotation_type: &AnnotationTypeId) -> Option<CachedAttribute> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(annotation_type)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
