// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Registry propagation across call boundaries.
//!
//! A [`RegistryScope`] is passed explicitly down a call chain and carries at
//! most one shared [`TypeRegistry`]. Attaching another registry to a scope
//! that already carries one merges the new bindings into the existing
//! registry in place, so every scope sharing that registry sees them:
//!
//! ```
//! use std::sync::Arc;
//! use versioned_decode::{RegistryScope, TypeRegistry, Unstructured, VersionedString};
//!
//! let first = Arc::new(TypeRegistry::new());
//! first.register::<Unstructured>(&[VersionedString::from("a")]);
//! let root = RegistryScope::new().attach(first);
//!
//! let sibling = root.derive();
//! let second = Arc::new(TypeRegistry::new());
//! second.register::<Unstructured>(&[VersionedString::from("b")]);
//! let child = root.derive().attach(second);
//!
//! assert!(child.lookup("a").is_some());
//! assert!(sibling.lookup("b").is_some());
//! ```

use crate::error::{DecodeError, ResolveError};
use crate::registry::{Constructor, Resolve, TypeRegistry};
use crate::typed::TypedValue;
use crate::versioned::VersionedString;
use std::any::Any;
use std::sync::Arc;

/// Explicit carrier for a shared type registry.
#[derive(Debug, Clone, Default)]
pub struct RegistryScope {
    registry: Option<Arc<TypeRegistry>>,
}

impl RegistryScope {
    /// Scope without a registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `registry` reachable from the returned scope.
    ///
    /// If this scope already carries a registry, the bindings of `registry`
    /// are copied into it (replacing existing keys) and the returned scope
    /// shares the existing registry. Otherwise the returned scope carries
    /// `registry` itself, without copying.
    pub fn attach(&self, registry: Arc<TypeRegistry>) -> RegistryScope {
        match &self.registry {
            Some(existing) => {
                existing.merge_from(&registry);
                self.clone()
            }
            None => {
                tracing::debug!("registry scope: attached registry with {} keys", registry.len());
                Self {
                    registry: Some(registry),
                }
            }
        }
    }

    /// Child scope sharing this scope's registry.
    pub fn derive(&self) -> RegistryScope {
        self.clone()
    }

    /// The registry reachable from this scope.
    pub fn registry(&self) -> Result<&Arc<TypeRegistry>, ResolveError> {
        self.registry.as_ref().ok_or(ResolveError::NoRegistry)
    }

    pub fn has_registry(&self) -> bool {
        self.registry.is_some()
    }

    /// Constructor bound to exactly `alias`.
    ///
    /// `None` if no registry is attached or the key is absent.
    pub fn lookup(&self, alias: &str) -> Option<Constructor> {
        self.registry.as_ref()?.constructor(alias)
    }

    /// Construct the value bound to `alias` as a `T`.
    pub fn construct<T: Any>(&self, alias: &str) -> Result<T, DecodeError> {
        let registry = self.registry().map_err(|source| DecodeError::Unresolved {
            type_name: VersionedString::from(alias),
            source,
        })?;
        let constructor = registry
            .constructor(alias)
            .ok_or_else(|| DecodeError::Unresolved {
                type_name: VersionedString::from(alias),
                source: ResolveError::Unsupported(VersionedString::from(alias)),
            })?;
        constructor.construct_as::<T>(alias)
    }

    /// True if both scopes share the same registry.
    pub fn shares_registry_with(&self, other: &RegistryScope) -> bool {
        match (&self.registry, &other.registry) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Resolve for RegistryScope {
    fn resolve(&self, typ: &VersionedString) -> Result<Box<dyn TypedValue>, ResolveError> {
        self.registry()?.resolve(typ)
    }
}
