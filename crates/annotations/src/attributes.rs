//! Ordered attribute accessors of one annotation type.

use crate::{AnnotationType, AttributeMethod, AttributeName};

/// The attribute accessors an annotation type declares, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeMethods<'a> {
    methods: &'a [AttributeMethod],
}

impl<'a> AttributeMethods<'a> {
    /// Returns the accessors of `annotation_type`.
    pub fn for_annotation_type(annotation_type: &'a AnnotationType) -> Self {
        Self {
            methods: &annotation_type.attributes,
        }
    }

    /// An accessor set with no entries, used for types with no metadata.
    pub fn empty() -> Self {
        Self { methods: &[] }
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Returns the accessor at `index` in declaration order.
    pub fn get(&self, index: usize) -> Option<&'a AttributeMethod> {
        self.methods.get(index)
    }

    /// Returns the accessor named `name`.
    pub fn get_by_name(&self, name: &AttributeName) -> Option<&'a AttributeMethod> {
        self.methods.iter().find(|method| &method.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a AttributeMethod> {
        self.methods.iter()
    }

    /// Returns `true` if the only declared attribute is `value`.
    pub fn has_only_value_attribute(&self) -> bool {
        matches!(self.methods, [only] if only.name.is_value())
    }
}
