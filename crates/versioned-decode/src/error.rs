// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types.

use crate::codec::DecoderError;
use crate::versioned::VersionedString;
use thiserror::Error;

/// Errors produced while resolving an identifier to a constructor.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("unsupported type: {0}")]
    Unsupported(VersionedString),

    #[error("no registry available in scope")]
    NoRegistry,
}

/// Errors produced by the typed decode protocol.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("missing or invalid 'type' in object that was expected to be typed")]
    MissingDiscriminator,

    #[error("failed to create new type {type_name}: {source}")]
    Unresolved {
        type_name: VersionedString,
        #[source]
        source: ResolveError,
    },

    #[error("constructor registered for {alias} produced {actual}, expected {expected}")]
    MalformedConstructor {
        alias: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("decoded {type_name} into {actual}, expected {expected}")]
    UnexpectedType {
        type_name: VersionedString,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("failed to decode type discriminator: {0}")]
    Discriminator(#[source] DecoderError),

    #[error("failed to decode {type_name} into resolved type: {source}")]
    Payload {
        type_name: VersionedString,
        #[source]
        source: DecoderError,
    },

    #[error("document exceeds maximum size of {limit} bytes")]
    DocumentTooLarge { limit: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors produced when encoding typed values.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("JSON encode error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML encode error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_phase() {
        let discriminator = DecodeError::Discriminator("bad syntax".into());
        assert!(discriminator.to_string().contains("discriminator"));

        let payload = DecodeError::Payload {
            type_name: "foo/v1".into(),
            source: "missing field".into(),
        };
        let msg = payload.to_string();
        assert!(msg.contains("foo/v1"));
        assert!(msg.contains("resolved type"));
    }

    #[test]
    fn test_unresolved_names_type() {
        let err = DecodeError::Unresolved {
            type_name: "unregistered/v1".into(),
            source: ResolveError::Unsupported("unregistered/v1".into()),
        };
        assert_eq!(
            err.to_string(),
            "failed to create new type unregistered/v1: unsupported type: unregistered/v1"
        );
    }
}
