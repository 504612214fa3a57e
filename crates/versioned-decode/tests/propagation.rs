// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::uninlined_format_args)] // Test code readability over pedantic
#![allow(clippy::needless_pass_by_value)] // Test functions

//! Registry propagation through explicit scopes
//!
//! A scope is handed down through plain function calls, the way a request
//! context would be. Registries attached further down must become visible
//! to every scope sharing the same registry.

use serde::de::DeserializeSeed;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use versioned_decode::{
    DecodeError, RegistryScope, ResolveError, Typed, TypeRegistry, TypedDecoder, TypedSeed,
    VersionedString, VersionedType,
};

#[derive(Debug, Default, Serialize, Deserialize)]
struct LocalBlob {
    #[serde(flatten)]
    versioned: VersionedType,
    #[serde(rename = "localReference", default)]
    local_reference: String,
}

impl Typed for LocalBlob {
    fn get_type(&self) -> VersionedString {
        self.versioned.type_.clone()
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Helm {
    #[serde(flatten)]
    versioned: VersionedType,
    #[serde(default)]
    chart: String,
}

impl Typed for Helm {
    fn get_type(&self) -> VersionedString {
        self.versioned.type_.clone()
    }
}

fn registry_of<T>(alias: &str) -> Arc<TypeRegistry>
where
    T: versioned_decode::TypedValue + Default,
{
    let registry = Arc::new(TypeRegistry::new());
    registry.register::<T>(&[VersionedString::from(alias)]);
    registry
}

/// A plugin entry point that installs its own types into the caller's scope.
fn install_helm_plugin(scope: &RegistryScope) -> RegistryScope {
    scope.derive().attach(registry_of::<Helm>("helm/v1"))
}

/// A handler that only knows the scope it was given.
fn handle(scope: &RegistryScope, body: &str) -> Result<String, DecodeError> {
    let decoder = TypedDecoder::json(scope.derive());
    let value = decoder.decode_str(body)?;
    Ok(value.type_name().to_string())
}

#[test]
fn test_plugin_types_visible_to_siblings() {
    let root = RegistryScope::new().attach(registry_of::<LocalBlob>("localBlob/v1"));
    let handler_scope = root.derive();

    let err = handle(&handler_scope, r#"{"type":"helm/v1"}"#).expect_err("not yet");
    assert!(matches!(
        err,
        DecodeError::Unresolved {
            source: ResolveError::Unsupported(_),
            ..
        }
    ));

    let plugin_scope = install_helm_plugin(&root);
    assert!(plugin_scope.shares_registry_with(&handler_scope));

    let name = handle(&handler_scope, r#"{"type":"helm/v1","chart":"podinfo"}"#).expect("decode");
    assert!(name.ends_with("Helm"), "{}", name);

    let name = handle(&plugin_scope, r#"{"type":"localBlob/v1"}"#).expect("decode");
    assert!(name.ends_with("LocalBlob"), "{}", name);
}

#[test]
fn test_attach_overwrites_on_collision() {
    let root = RegistryScope::new().attach(registry_of::<LocalBlob>("shared/v1"));
    let _ = root.derive().attach(registry_of::<Helm>("shared/v1"));

    let value = TypedDecoder::json(root.derive())
        .decode_str(r#"{"type":"shared/v1"}"#)
        .expect("decode");
    assert!(value.is::<Helm>());
}

#[test]
fn test_scope_without_registry() {
    let scope = RegistryScope::new();
    let err = handle(&scope, r#"{"type":"localBlob/v1"}"#).expect_err("no registry");
    assert!(matches!(
        err,
        DecodeError::Unresolved {
            source: ResolveError::NoRegistry,
            ..
        }
    ));
    assert!(err.to_string().contains("no registry"));
}

#[test]
fn test_scope_missing_discriminator_before_registry_check() {
    let err = handle(&RegistryScope::new(), r#"{"chart":"x"}"#).expect_err("no type");
    assert!(matches!(err, DecodeError::MissingDiscriminator));
}

#[test]
fn test_nested_values_through_scope() {
    let root = RegistryScope::new().attach(registry_of::<LocalBlob>("localBlob/v1"));
    let scope = install_helm_plugin(&root);

    let doc = "- type: localBlob/v1\n  localReference: sha256:01\n- type: helm\n  chart: nginx\n";
    let values = TypedSeed::new(&scope)
        .many()
        .deserialize(serde_yaml::Deserializer::from_str(doc))
        .expect("decode");

    assert_eq!(values.len(), 2);
    let blob = values[0].downcast_ref::<LocalBlob>().expect("blob");
    assert_eq!(blob.local_reference, "sha256:01");
    let helm = values[1].downcast_ref::<Helm>().expect("helm");
    assert_eq!(helm.chart, "nginx");
}

