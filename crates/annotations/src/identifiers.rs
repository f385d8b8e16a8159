//! Newtype identifiers for annotation metadata.
//!
//! Annotation types and their attributes are both named by strings, but the two
//! namespaces never mix: an [`AttributeName`] can't be passed where an
//! [`AnnotationTypeId`] is expected even though both wrap a `String`.

use serde::{Deserialize, Serialize};

use crate::errors::EmptyIdentifierError;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display, and a
// serde representation that rejects empty strings.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = EmptyIdentifierError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value).ok_or(EmptyIdentifierError {
                    kind: stringify!($name),
                })
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

string_id! {
    /// Identifies an annotation type by its fully-qualified name
    /// (e.g. `"com.example.Tag"`).
    ///
    /// This is the type identity used as the cache key and in every
    /// container/repeatable relationship.
    AnnotationTypeId
}

string_id! {
    /// Names one attribute accessor declared by an annotation type.
    AttributeName
}

/// Conventional name of the attribute through which a container annotation
/// exposes its repeated elements.
pub const VALUE_ATTRIBUTE: &str = "value";

impl AttributeName {
    /// Returns the conventional `value` attribute name.
    pub fn value() -> Self {
        Self(VALUE_ATTRIBUTE.to_string())
    }

    /// Returns `true` if this is the conventional `value` attribute.
    pub fn is_value(&self) -> bool {
        self.0 == VALUE_ATTRIBUTE
    }
}
