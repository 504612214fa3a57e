// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type-discriminated decoding of versioned documents
//!
//! Decodes JSON or YAML documents whose concrete type is named by a top-level
//! `type` field (`base` or `base/version`), without the caller knowing that
//! type in advance.
//!
//! # Features
//!
//! - **Type Registry**: Concurrency-safe identifier to constructor map with
//!   version-specific and base-wide bindings
//! - **Two-Pass Decode**: Discriminator first, then the full document into
//!   the resolved type, with buffered or tee replay
//! - **Scoped Propagation**: Registries shared and merged across call
//!   boundaries via [`RegistryScope`]
//! - **Unknown Types**: Optional fallback to [`Unstructured`]
//!
//! # Quick Start
//!
//! ```
//! use serde::{Deserialize, Serialize};
//! use versioned_decode::{Typed, TypeRegistry, TypedDecoder, VersionedString, VersionedType};
//!
//! #[derive(Debug, Default, Serialize, Deserialize)]
//! struct CustomAccess {
//!     #[serde(flatten)]
//!     versioned: VersionedType,
//!     #[serde(default)]
//!     field: String,
//! }
//!
//! impl Typed for CustomAccess {
//!     fn get_type(&self) -> VersionedString {
//!         self.versioned.type_.clone()
//!     }
//! }
//!
//! let registry = TypeRegistry::new();
//! registry.register::<CustomAccess>(&[VersionedString::new("customAccess", "v1")]);
//!
//! let decoder = TypedDecoder::json(&registry);
//! let access: CustomAccess = decoder
//!     .decode_as(&br#"{"type":"customAccess","field":"value"}"#[..])
//!     .unwrap();
//! assert_eq!(access.field, "value");
//! ```
//!
//! # Configuration File
//!
//! ```toml
//! allow_unknown = false
//! format = "json"
//! replay = "buffered"
//! max_document_size = 16777216
//! ```

pub mod codec;
pub mod config;
pub mod decoder;
pub mod error;
pub mod generic;
pub mod registry;
pub mod scope;
pub mod typed;
pub mod unstructured;
pub mod versioned;

pub use codec::{Decoder, DecoderError, DecoderFactory, Format, JsonDecoder, YamlDecoder};
pub use config::{ConfigError, DecodeConfig};
pub use decoder::{Replay, TypedDecoder};
pub use error::{DecodeError, EncodeError, ResolveError};
pub use generic::{TypedSeed, TypedSeqSeed, Versioned};
pub use registry::{Constructor, Resolve, TypeRegistry};
pub use scope::RegistryScope;
pub use typed::{DecodeTarget, TypedValue};
pub use unstructured::Unstructured;
pub use versioned::{Typed, VersionedString, VersionedType};
