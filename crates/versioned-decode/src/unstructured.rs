// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Schema-less fallback for documents of unknown type.

use crate::versioned::{Typed, VersionedString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const TYPE_KEY: &str = "type";

/// Open bag of top-level fields.
///
/// Produced by a registry that allows unknown types when no constructor
/// matches. The discriminator is kept inside the map like any other field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Unstructured {
    data: Map<String, Value>,
}

impl Unstructured {
    /// Create an empty instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the identifier under the `type` key.
    pub fn set_type(&mut self, typ: VersionedString) {
        self.data
            .insert(TYPE_KEY.to_string(), Value::String(typ.into_string()));
    }

    /// Value at `key` if present and already of shape `T`.
    ///
    /// Strings are never parsed into numbers or the other way around.
    /// Numeric widening follows serde: an integer field reads as `f64`, a
    /// float field never reads as an integer.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.data.get(key)?;
        T::deserialize(value).ok()
    }

    /// Raw value at `key`.
    pub fn get_value(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Insert or replace a field.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.data.insert(key.into(), value.into())
    }

    /// All fields, discriminator included.
    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    pub fn into_data(self) -> Map<String, Value> {
        self.data
    }
}

impl Typed for Unstructured {
    /// The `type` field as text.
    ///
    /// Number and boolean scalars are rendered as text, matching how YAML
    /// readers hand a plain `type: 123` to the discriminator pass. Any other
    /// shape yields the empty identifier.
    fn get_type(&self) -> VersionedString {
        match self.data.get(TYPE_KEY) {
            Some(Value::String(s)) => VersionedString::from(s.as_str()),
            Some(Value::Number(n)) => VersionedString::from(n.to_string()),
            Some(Value::Bool(b)) => VersionedString::from(b.to_string()),
            _ => VersionedString::default(),
        }
    }
}

impl From<Map<String, Value>> for Unstructured {
    fn from(data: Map<String, Value>) -> Self {
        Self { data }
    }
}
