// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Dynamic registry of typed payload constructors.
//!
//! Every registered identifier is stored under two keys: the full
//! `base/version` string and the bare `base`. Lookups try the full key first,
//! so a version-specific constructor always wins over a base-wide one.

use crate::config::DecodeConfig;
use crate::error::{DecodeError, ResolveError};
use crate::typed::TypedValue;
use crate::unstructured::Unstructured;
use crate::versioned::VersionedString;
use parking_lot::RwLock;
use std::any::{self, Any};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Anything that can turn an identifier into a fresh, zero-valued instance.
///
/// This is the only capability the decode protocol needs from a registry.
pub trait Resolve {
    fn resolve(&self, typ: &VersionedString) -> Result<Box<dyn TypedValue>, ResolveError>;
}

impl<R: Resolve + ?Sized> Resolve for &R {
    fn resolve(&self, typ: &VersionedString) -> Result<Box<dyn TypedValue>, ResolveError> {
        (**self).resolve(typ)
    }
}

impl<R: Resolve + ?Sized> Resolve for Arc<R> {
    fn resolve(&self, typ: &VersionedString) -> Result<Box<dyn TypedValue>, ResolveError> {
        (**self).resolve(typ)
    }
}

impl<R: Resolve + ?Sized> Resolve for Box<R> {
    fn resolve(&self, typ: &VersionedString) -> Result<Box<dyn TypedValue>, ResolveError> {
        (**self).resolve(typ)
    }
}

/// Zero-argument factory for one concrete payload type.
///
/// Cheap to clone; clones share the same factory.
#[derive(Clone)]
pub struct Constructor {
    type_name: &'static str,
    construct: Arc<dyn Fn() -> Box<dyn TypedValue> + Send + Sync>,
}

impl Constructor {
    /// Constructor producing `T::default()`.
    pub fn of<T>() -> Self
    where
        T: TypedValue + Default,
    {
        Self {
            type_name: any::type_name::<T>(),
            construct: Arc::new(|| -> Box<dyn TypedValue> { Box::new(T::default()) }),
        }
    }

    /// Constructor backed by an arbitrary factory.
    ///
    /// `type_name` is only used for diagnostics. It is not checked against
    /// what the factory actually produces until [`Constructor::construct_as`].
    pub fn new<F>(type_name: &'static str, factory: F) -> Self
    where
        F: Fn() -> Box<dyn TypedValue> + Send + Sync + 'static,
    {
        Self {
            type_name,
            construct: Arc::new(factory),
        }
    }

    /// Build a fresh instance.
    pub fn construct(&self) -> Box<dyn TypedValue> {
        (self.construct)()
    }

    /// Build a fresh instance and recover it as `T`.
    ///
    /// Fails with [`DecodeError::MalformedConstructor`] when the factory
    /// registered under `alias` produces something other than `T`.
    pub fn construct_as<T: Any>(&self, alias: &str) -> Result<T, DecodeError> {
        let value = self.construct();
        let actual = value.type_name();
        match value.downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(_) => Err(DecodeError::MalformedConstructor {
                alias: alias.to_string(),
                expected: any::type_name::<T>(),
                actual,
            }),
        }
    }

    /// Declared name of the produced type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// True if both handles share the same factory.
    pub fn ptr_eq(&self, other: &Constructor) -> bool {
        Arc::ptr_eq(&self.construct, &other.construct)
    }
}

impl fmt::Debug for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constructor")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// Concurrency-safe registry of [`Constructor`]s keyed by identifier.
///
/// Reads vastly outnumber writes (decode per request, registration at
/// startup), hence the reader/writer lock. Callers that need every
/// registration visible before decoding starts must order that themselves.
pub struct TypeRegistry {
    /// When set, unknown identifiers resolve to [`Unstructured`] instead of
    /// failing.
    allow_unknown: bool,
    constructors: RwLock<HashMap<String, Constructor>>,
}

impl TypeRegistry {
    /// Create an empty registry that rejects unknown types.
    pub fn new() -> Self {
        Self {
            allow_unknown: false,
            constructors: RwLock::new(HashMap::new()),
        }
    }

    /// Set whether unknown types fall back to [`Unstructured`].
    pub fn allow_unknown(mut self, allow: bool) -> Self {
        self.allow_unknown = allow;
        self
    }

    /// Create an empty registry configured from `config`.
    pub fn from_config(config: &DecodeConfig) -> Self {
        Self::new().allow_unknown(config.allow_unknown)
    }

    pub fn allows_unknown(&self) -> bool {
        self.allow_unknown
    }

    /// Register `T::default` under every alias.
    ///
    /// Each alias is stored under its full string and its bare base. An
    /// existing binding for either key is replaced.
    pub fn register<T>(&self, aliases: &[VersionedString])
    where
        T: TypedValue + Default,
    {
        self.register_constructor(Constructor::of::<T>(), aliases);
    }

    /// Register a caller-built constructor under every alias.
    ///
    /// When several aliases share a base, the last one wins for the base key.
    pub fn register_constructor(&self, constructor: Constructor, aliases: &[VersionedString]) {
        if aliases.is_empty() {
            tracing::debug!(
                "register called without aliases for {}, nothing stored",
                constructor.type_name()
            );
            return;
        }

        let mut constructors = self.constructors.write();
        for alias in aliases {
            let full = alias.as_str();
            let base = alias.base();
            for key in std::iter::once(full).chain((base != full).then_some(base)) {
                if constructors
                    .insert(key.to_string(), constructor.clone())
                    .is_some()
                {
                    tracing::debug!("type registry: replaced constructor for '{}'", key);
                }
            }
            tracing::debug!(
                "type registry: registered {} as '{}'",
                constructor.type_name(),
                alias
            );
        }
    }

    /// Constructor bound to exactly `alias`, without base fallback.
    pub fn constructor(&self, alias: &str) -> Option<Constructor> {
        self.constructors.read().get(alias).cloned()
    }

    /// Copy every binding of `other` into this registry.
    ///
    /// Bindings from `other` replace existing ones on key collision. The
    /// allow-unknown setting is not copied.
    pub fn merge_from(&self, other: &TypeRegistry) {
        if std::ptr::eq(self, other) {
            return;
        }

        let incoming: Vec<(String, Constructor)> = other
            .constructors
            .read()
            .iter()
            .map(|(key, constructor)| (key.clone(), constructor.clone()))
            .collect();

        let mut constructors = self.constructors.write();
        let merged = incoming.len();
        constructors.extend(incoming);
        tracing::debug!(
            "type registry: merged {} bindings, {} total",
            merged,
            constructors.len()
        );
    }

    /// All registered keys (sorted for determinism).
    pub fn aliases(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.constructors.read().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Number of registered keys.
    pub fn len(&self) -> usize {
        self.constructors.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.constructors.read().is_empty()
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("allow_unknown", &self.allow_unknown)
            .field("aliases", &self.aliases())
            .finish()
    }
}

impl Resolve for TypeRegistry {
    fn resolve(&self, typ: &VersionedString) -> Result<Box<dyn TypedValue>, ResolveError> {
        let found = {
            let constructors = self.constructors.read();
            constructors
                .get(typ.as_str())
                .or_else(|| constructors.get(typ.base()))
                .cloned()
        };

        if let Some(constructor) = found {
            tracing::trace!("type registry: '{}' -> {}", typ, constructor.type_name());
            return Ok(constructor.construct());
        }

        if self.allow_unknown {
            tracing::debug!("type registry: unknown type '{}', using unstructured", typ);
            return Ok(Box::new(Unstructured::new()));
        }

        tracing::debug!("type registry: no constructor for '{}'", typ);
        Err(ResolveError::Unsupported(typ.clone()))
    }
}
