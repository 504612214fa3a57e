// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Object-safe view of typed payloads.
//!
//! [`Typed`] is what payload authors implement. [`TypedValue`] is the boxed,
//! type-erased form the registry hands out: it can be decoded into, encoded
//! from, and downcast back to its concrete type.

use crate::versioned::{Typed, VersionedString};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::any::{self, Any};
use std::fmt;

/// A value that a single-shot decoder can populate in place.
///
/// Implemented for every `DeserializeOwned` type. The decoder hands over an
/// erased deserializer so the target does not need to know the wire format.
pub trait DecodeTarget {
    /// Replace `self` with the value read from `deserializer`.
    fn decode_from<'de>(
        &mut self,
        deserializer: &mut dyn erased_serde::Deserializer<'de>,
    ) -> Result<(), erased_serde::Error>;
}

impl<T: DeserializeOwned> DecodeTarget for T {
    fn decode_from<'de>(
        &mut self,
        deserializer: &mut dyn erased_serde::Deserializer<'de>,
    ) -> Result<(), erased_serde::Error> {
        *self = erased_serde::deserialize(deserializer)?;
        Ok(())
    }
}

/// Type-erased typed payload.
///
/// Blanket-implemented for every `Typed` type that serde can both encode and
/// decode, so payload authors never implement it by hand.
pub trait TypedValue: fmt::Debug + Send + Sync + 'static {
    /// Identifier reported by the payload.
    fn get_type(&self) -> VersionedString;

    /// Name of the concrete Rust type, for diagnostics.
    fn type_name(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send + Sync>;

    /// Serializable view, used by the encoders.
    fn as_serialize(&self) -> &dyn erased_serde::Serialize;

    /// Decodable view, used by the replay phase.
    fn as_decode_target(&mut self) -> &mut dyn DecodeTarget;
}

impl<T> TypedValue for T
where
    T: Typed + Serialize + DeserializeOwned + fmt::Debug + Send + Sync + 'static,
{
    fn get_type(&self) -> VersionedString {
        Typed::get_type(self)
    }

    fn type_name(&self) -> &'static str {
        any::type_name::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send + Sync> {
        self
    }

    fn as_serialize(&self) -> &dyn erased_serde::Serialize {
        self
    }

    fn as_decode_target(&mut self) -> &mut dyn DecodeTarget {
        self
    }
}

impl dyn TypedValue {
    /// True if the boxed value is a `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.as_any().is::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }

    /// Recover the concrete value, handing the box back on mismatch.
    pub fn downcast<T: Any>(self: Box<Self>) -> Result<Box<T>, Box<dyn TypedValue>> {
        if self.is::<T>() {
            match self.into_any().downcast::<T>() {
                Ok(value) => Ok(value),
                Err(_) => unreachable!("type checked before downcast"),
            }
        } else {
            Err(self)
        }
    }
}

impl Serialize for dyn TypedValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        erased_serde::serialize(self.as_serialize(), serializer)
    }
}
