//! Declarative configuration documents.
//!
//! A [`MetadataDocument`] carries the annotation types of one application plus
//! the container strategy to resolve them with. Loading the bytes is the
//! caller's job; this module only deserializes and builds.

use serde::{Deserialize, Serialize};

use crate::{
    AnnotationConfigurationError, AnnotationRegistry, AnnotationType, AnnotationTypeId,
    RepeatableContainers,
};

/// Base strategy of a configured chain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerMode {
    /// Recognize containers through native repeatable metadata.
    #[default]
    Standard,
    /// Recognize only explicitly mapped containers.
    None,
}

impl ContainerMode {
    /// Returns the shared chain for this mode.
    pub fn base_chain(self) -> RepeatableContainers {
        match self {
            Self::Standard => RepeatableContainers::standard_repeatables(),
            Self::None => RepeatableContainers::none(),
        }
    }
}

/// One explicit container/repeatable pairing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplicitMapping {
    /// The repeated annotation type.
    pub repeatable: AnnotationTypeId,
    /// The container type; deduced from `repeatable` when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container: Option<AnnotationTypeId>,
}

/// Configured container strategy chain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepeatableContainersConfig {
    #[serde(default)]
    pub mode: ContainerMode,

    /// Explicit mappings, applied in order on top of the base chain. Later
    /// entries are checked first.
    #[serde(default)]
    pub explicit: Vec<ExplicitMapping>,
}

impl RepeatableContainersConfig {
    /// Builds the configured chain against `registry`.
    ///
    /// # Errors
    /// Returns the first invalid mapping's [`AnnotationConfigurationError`].
    pub fn build(
        &self,
        registry: &AnnotationRegistry,
    ) -> Result<RepeatableContainers, AnnotationConfigurationError> {
        self.explicit
            .iter()
            .try_fold(self.mode.base_chain(), |chain, mapping| {
                RepeatableContainers::explicit(
                    Some(chain),
                    registry,
                    &mapping.repeatable,
                    mapping.container.as_ref(),
                )
            })
    }
}

/// Annotation types and container configuration for one application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataDocument {
    #[serde(default)]
    pub annotation_types: Vec<AnnotationType>,

    #[serde(default)]
    pub repeatable_containers: RepeatableContainersConfig,
}

impl MetadataDocument {
    /// Builds the registry of the document's annotation types.
    ///
    /// # Errors
    /// See [`AnnotationRegistry::new`].
    pub fn registry(&self) -> Result<AnnotationRegistry, AnnotationConfigurationError> {
        AnnotationRegistry::new(self.annotation_types.iter().cloned())
    }
}
