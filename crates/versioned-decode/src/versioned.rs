// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Versioned type identifiers.
//!
//! An identifier has the shape `<base>/<version>`. The base names a type
//! family, the version its schema revision. Identifiers without a `/` are
//! legal: they carry a base and an empty version.

use serde::{Deserialize, Deserializer, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Anything that can report its own versioned type identifier.
///
/// Payload types usually implement this by returning the identifier stored in
/// their embedded [`VersionedType`] field.
pub trait Typed {
    /// Returns the type and version of the object.
    fn get_type(&self) -> VersionedString;
}

/// Identifier of the form `base/version`.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionedString(String);

impl VersionedString {
    /// Build an identifier from its two components.
    ///
    /// The result is always `base/version`, so an empty `version` produces a
    /// trailing slash. Callers are expected to pass a non-empty version.
    pub fn new(base: &str, version: &str) -> Self {
        Self(format!("{}/{}", base, version))
    }

    /// Everything before the first `/`, or the whole string.
    pub fn base(&self) -> &str {
        match self.0.split_once('/') {
            Some((base, _)) => base,
            None => &self.0,
        }
    }

    /// Everything after the first `/`, or the empty string.
    pub fn version(&self) -> &str {
        match self.0.split_once('/') {
            Some((_, version)) => version,
            None => "",
        }
    }

    /// Raw identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the identifier is the empty string.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume the identifier, returning its text.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl Typed for VersionedString {
    fn get_type(&self) -> VersionedString {
        self.clone()
    }
}

impl fmt::Display for VersionedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VersionedString {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for VersionedString {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for VersionedString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for VersionedString {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for VersionedString {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for VersionedString {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Discriminator holder: the top-level `type` field of a typed document.
///
/// Payload types embed it with `#[serde(flatten)]` so the field lands at the
/// top level of the encoded document:
///
/// ```
/// use serde::{Deserialize, Serialize};
/// use versioned_decode::{Typed, VersionedString, VersionedType};
///
/// #[derive(Debug, Default, Serialize, Deserialize)]
/// struct OciArtifact {
///     #[serde(flatten)]
///     versioned: VersionedType,
///     #[serde(rename = "imageReference")]
///     image_reference: String,
/// }
///
/// impl Typed for OciArtifact {
///     fn get_type(&self) -> VersionedString {
///         self.versioned.get_type()
///     }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionedType {
    /// Type identifier. Decodes as empty when the field is absent or null.
    #[serde(rename = "type", default, deserialize_with = "nullable_identifier")]
    pub type_: VersionedString,
}

fn nullable_identifier<'de, D>(deserializer: D) -> Result<VersionedString, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<VersionedString>::deserialize(deserializer)?.unwrap_or_default())
}

impl VersionedType {
    /// Create a holder for the given identifier.
    pub fn new(type_: impl Into<VersionedString>) -> Self {
        Self {
            type_: type_.into(),
        }
    }
}

impl Typed for VersionedType {
    fn get_type(&self) -> VersionedString {
        self.type_.clone()
    }
}
