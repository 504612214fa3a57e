// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Typed values embedded in larger documents.
//!
//! [`TypedDecoder`](crate::TypedDecoder) handles a whole input stream. When a
//! discriminated value is only one field of an enclosing document, decode
//! that field with a [`TypedSeed`] instead: it buffers the field as a
//! self-describing value, reads its `type`, resolves it and replays the
//! buffered value into the resolved instance. Works with any serde format.

use crate::error::DecodeError;
use crate::registry::Resolve;
use crate::typed::TypedValue;
use crate::versioned::VersionedString;
use serde::de::{self, DeserializeSeed, Deserializer, SeqAccess, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::any::Any;
use std::fmt;
use std::ops::{Deref, DerefMut};

const TYPE_KEY: &str = "type";

/// A resolved typed value, serialized as the value itself.
#[derive(Debug)]
pub struct Versioned(pub Box<dyn TypedValue>);

impl Versioned {
    pub fn new(value: Box<dyn TypedValue>) -> Self {
        Self(value)
    }

    pub fn into_inner(self) -> Box<dyn TypedValue> {
        self.0
    }

    /// Recover the concrete value, handing the box back on mismatch.
    pub fn downcast<T: Any>(self) -> Result<T, Versioned> {
        self.0.downcast::<T>().map(|value| *value).map_err(Versioned)
    }
}

impl Deref for Versioned {
    type Target = dyn TypedValue;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}

impl DerefMut for Versioned {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.0
    }
}

impl From<Box<dyn TypedValue>> for Versioned {
    fn from(value: Box<dyn TypedValue>) -> Self {
        Self(value)
    }
}

impl Serialize for Versioned {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (*self.0).serialize(serializer)
    }
}

/// Deserialize one discriminated value through a resolver.
pub struct TypedSeed<'r, R: ?Sized> {
    resolver: &'r R,
}

impl<'r, R: Resolve + ?Sized> TypedSeed<'r, R> {
    pub fn new(resolver: &'r R) -> Self {
        Self { resolver }
    }

    /// Seed for a sequence of discriminated values.
    pub fn many(self) -> TypedSeqSeed<'r, R> {
        TypedSeqSeed {
            resolver: self.resolver,
        }
    }
}

impl<R: ?Sized> Clone for TypedSeed<'_, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R: ?Sized> Copy for TypedSeed<'_, R> {}

impl<'de, R: Resolve + ?Sized> DeserializeSeed<'de> for TypedSeed<'_, R> {
    type Value = Versioned;

    fn deserialize<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        let buffered = serde_yaml::Value::deserialize(deserializer)?;
        let typ = buffered
            .get(TYPE_KEY)
            .and_then(serde_yaml::Value::as_str)
            .map(VersionedString::from)
            .unwrap_or_default();
        if typ.base().is_empty() {
            return Err(de::Error::custom(DecodeError::MissingDiscriminator));
        }

        let mut instance = self.resolver.resolve(&typ).map_err(|source| {
            <D::Error as de::Error>::custom(DecodeError::Unresolved {
                type_name: typ.clone(),
                source,
            })
        })?;

        let mut erased = <dyn erased_serde::Deserializer>::erase(buffered);
        instance
            .as_decode_target()
            .decode_from(&mut erased)
            .map_err(|err| {
                <D::Error as de::Error>::custom(format!(
                    "failed to decode {} into resolved type: {}",
                    typ, err
                ))
            })?;
        tracing::trace!("typed seed: decoded nested '{}' as {}", typ, instance.type_name());
        Ok(Versioned(instance))
    }
}

/// Sequence counterpart of [`TypedSeed`].
pub struct TypedSeqSeed<'r, R: ?Sized> {
    resolver: &'r R,
}

impl<'de, R: Resolve + ?Sized> DeserializeSeed<'de> for TypedSeqSeed<'_, R> {
    type Value = Vec<Versioned>;

    fn deserialize<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(self)
    }
}

impl<'de, R: Resolve + ?Sized> Visitor<'de> for TypedSeqSeed<'_, R> {
    type Value = Vec<Versioned>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a sequence of typed values")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let seed = TypedSeed::new(self.resolver);
        let mut values = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(value) = seq.next_element_seed(seed)? {
            values.push(value);
        }
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::TypeRegistry;
    use crate::unstructured::Unstructured;
    use crate::versioned::{Typed, VersionedType};

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Layer {
        #[serde(flatten)]
        versioned: VersionedType,
        digest: String,
        #[serde(default)]
        size: u64,
    }

    impl Typed for Layer {
        fn get_type(&self) -> VersionedString {
            self.versioned.type_.clone()
        }
    }

    fn registry() -> TypeRegistry {
        let reg = TypeRegistry::new();
        reg.register::<Layer>(&[VersionedString::from("layer/v1")]);
        reg
    }

    #[test]
    fn test_seed_json() {
        let reg = registry();
        let mut de = serde_json::Deserializer::from_str(
            r#"{"type":"layer/v1","digest":"sha256:abc","size":42}"#,
        );
        let value = TypedSeed::new(&reg).deserialize(&mut de).expect("decode");
        let layer = value.downcast::<Layer>().expect("layer");
        assert_eq!(layer.digest, "sha256:abc");
        assert_eq!(layer.size, 42);
        assert_eq!(layer.versioned.type_, "layer/v1");
    }

    #[test]
    fn test_seed_yaml() {
        let reg = registry();
        let doc = "type: layer/v1\ndigest: sha256:def\n";
        let value = TypedSeed::new(&reg)
            .deserialize(serde_yaml::Deserializer::from_str(doc))
            .expect("decode");
        assert_eq!(value.get_type(), "layer/v1");
        assert_eq!(
            value.downcast_ref::<Layer>().map(|l| l.digest.as_str()),
            Some("sha256:def")
        );
    }

    #[test]
    fn test_seq_seed_mixed_types() {
        let reg = registry().allow_unknown(true);
        let mut de = serde_json::Deserializer::from_str(
            r#"[{"type":"layer/v1","digest":"a"},{"type":"other/v2","k":"v"}]"#,
        );
        let values = TypedSeed::new(&reg).many().deserialize(&mut de).expect("decode");
        assert_eq!(values.len(), 2);
        assert!(values[0].is::<Layer>());
        let other = values[1].downcast_ref::<Unstructured>().expect("unstructured");
        assert_eq!(other.get::<String>("k").as_deref(), Some("v"));
    }

    #[test]
    fn test_seed_missing_type() {
        let reg = registry();
        let mut de = serde_json::Deserializer::from_str(r#"{"digest":"a"}"#);
        let err = TypedSeed::new(&reg).deserialize(&mut de).expect_err("no type");
        assert!(err.to_string().contains("missing or invalid 'type'"));
    }

    #[test]
    fn test_seed_unknown_type() {
        let reg = registry();
        let mut de = serde_json::Deserializer::from_str(r#"{"type":"nope/v1"}"#);
        let err = TypedSeed::new(&reg).deserialize(&mut de).expect_err("unknown");
        assert!(err.to_string().contains("nope/v1"));
    }

    #[test]
    fn test_seed_payload_error() {
        let reg = registry();
        let mut de = serde_json::Deserializer::from_str(r#"{"type":"layer/v1","digest":7}"#);
        let err = TypedSeed::new(&reg).deserialize(&mut de).expect_err("bad digest");
        assert!(err.to_string().contains("into resolved type"));
    }

    #[test]
    fn test_versioned_serializes_inner() {
        let layer = Layer {
            versioned: VersionedType::new("layer/v1"),
            digest: "x".into(),
            size: 1,
        };
        let wrapped = Versioned::new(Box::new(layer));
        let json = serde_json::to_value(&wrapped).expect("encode");
        assert_eq!(
            json,
            serde_json::json!({"type": "layer/v1", "digest": "x", "size": 1})
        );
    }
}
