// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Two-pass typed decode protocol.
//!
//! 1. Decode only the `type` discriminator from the input.
//! 2. Resolve the discriminator to a fresh, zero-valued instance.
//! 3. Decode the full input again, into that instance.
//!
//! The input must hold exactly one discriminated document. Both passes see
//! the same bytes, regardless of how far the underlying decoder reads during
//! the first pass.

use crate::codec::{DecoderFactory, Format};
use crate::config::DecodeConfig;
use crate::error::DecodeError;
use crate::registry::Resolve;
use crate::typed::TypedValue;
use crate::versioned::{VersionedString, VersionedType};
use serde::{Deserialize, Serialize};
use std::any::{self, Any};
use std::io::{self, Cursor, Read};

/// How the input is made available to the second pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Replay {
    /// Read the whole input into memory and run both passes over it.
    #[default]
    Buffered,

    /// Capture what the first pass reads, then replay the captured bytes
    /// followed by whatever the first pass left unread.
    Tee,
}

/// Decodes documents whose concrete type is named by their `type` field.
pub struct TypedDecoder<R, F> {
    resolver: R,
    factory: F,
    replay: Replay,
    max_document_size: Option<usize>,
}

impl<R: Resolve> TypedDecoder<R, Format> {
    /// JSON decoder over `resolver`.
    pub fn json(resolver: R) -> Self {
        Self::new(resolver, Format::Json)
    }

    /// YAML decoder over `resolver`.
    pub fn yaml(resolver: R) -> Self {
        Self::new(resolver, Format::Yaml)
    }

    /// Decoder using the format, replay strategy and size limit of `config`.
    pub fn from_config(resolver: R, config: &DecodeConfig) -> Self {
        Self {
            resolver,
            factory: config.format,
            replay: config.replay,
            max_document_size: config.max_document_size,
        }
    }
}

impl<R: Resolve, F: DecoderFactory> TypedDecoder<R, F> {
    /// Create a decoder with buffered replay and no size limit.
    pub fn new(resolver: R, factory: F) -> Self {
        Self {
            resolver,
            factory,
            replay: Replay::default(),
            max_document_size: None,
        }
    }

    /// Set the replay strategy.
    pub fn replay(mut self, replay: Replay) -> Self {
        self.replay = replay;
        self
    }

    /// Limit the number of bytes held in memory for one document.
    pub fn max_document_size(mut self, limit: usize) -> Self {
        self.max_document_size = Some(limit);
        self
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Decode one document from `source`.
    ///
    /// The source is considered fully consumed afterwards.
    pub fn decode<S: Read>(&self, source: S) -> Result<Box<dyn TypedValue>, DecodeError> {
        match self.replay {
            Replay::Buffered => {
                let buffered = self.buffer(source)?;
                self.decode_slice(&buffered)
            }
            Replay::Tee => self.decode_tee(source),
        }
    }

    /// Decode one document held in memory.
    pub fn decode_slice(&self, bytes: &[u8]) -> Result<Box<dyn TypedValue>, DecodeError> {
        if let Some(limit) = self.max_document_size {
            if bytes.len() > limit {
                return Err(DecodeError::DocumentTooLarge { limit });
            }
        }

        let typ = self.read_discriminator(Box::new(bytes))?;
        let instance = self.resolve(&typ)?;
        self.populate(&typ, instance, Box::new(bytes))
    }

    pub fn decode_str(&self, document: &str) -> Result<Box<dyn TypedValue>, DecodeError> {
        self.decode_slice(document.as_bytes())
    }

    /// Decode one document and recover it as `T`.
    pub fn decode_as<T: Any, S: Read>(&self, source: S) -> Result<T, DecodeError> {
        let value = self.decode(source)?;
        let type_name = value.get_type();
        let actual = value.type_name();
        match value.downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(_) => Err(DecodeError::UnexpectedType {
                type_name,
                expected: any::type_name::<T>(),
                actual,
            }),
        }
    }

    fn buffer<S: Read>(&self, source: S) -> Result<Vec<u8>, DecodeError> {
        let mut buffered = Vec::new();
        match self.max_document_size {
            Some(limit) => {
                source
                    .take(limit as u64 + 1)
                    .read_to_end(&mut buffered)?;
                if buffered.len() > limit {
                    return Err(DecodeError::DocumentTooLarge { limit });
                }
            }
            None => {
                let mut source = source;
                source.read_to_end(&mut buffered)?;
            }
        }
        Ok(buffered)
    }

    fn decode_tee<S: Read>(&self, source: S) -> Result<Box<dyn TypedValue>, DecodeError> {
        let mut tee = TeeReader::new(source, self.max_document_size);
        let discriminator = self.read_discriminator(Box::new(&mut tee));
        if tee.overflowed {
            if let Some(limit) = self.max_document_size {
                return Err(DecodeError::DocumentTooLarge { limit });
            }
        }
        let typ = discriminator?;
        let instance = self.resolve(&typ)?;

        let (captured, rest) = tee.into_parts();
        tracing::trace!(
            "typed decoder: replaying {} captured bytes for '{}'",
            captured.len(),
            typ
        );
        self.populate(&typ, instance, Box::new(Cursor::new(captured).chain(rest)))
    }

    fn read_discriminator(&self, source: Box<dyn Read + '_>) -> Result<VersionedString, DecodeError> {
        let mut decoder = self.factory.decoder(source);
        let mut raw = VersionedType::default();
        decoder
            .decode(&mut raw)
            .map_err(DecodeError::Discriminator)?;
        if raw.type_.base().is_empty() {
            return Err(DecodeError::MissingDiscriminator);
        }
        Ok(raw.type_)
    }

    fn resolve(&self, typ: &VersionedString) -> Result<Box<dyn TypedValue>, DecodeError> {
        self.resolver
            .resolve(typ)
            .map_err(|source| DecodeError::Unresolved {
                type_name: typ.clone(),
                source,
            })
    }

    fn populate(
        &self,
        typ: &VersionedString,
        mut instance: Box<dyn TypedValue>,
        source: Box<dyn Read + '_>,
    ) -> Result<Box<dyn TypedValue>, DecodeError> {
        let mut decoder = self.factory.decoder(source);
        decoder
            .decode(instance.as_decode_target())
            .map_err(|source| DecodeError::Payload {
                type_name: typ.clone(),
                source,
            })?;
        tracing::trace!("typed decoder: decoded '{}' as {}", typ, instance.type_name());
        Ok(instance)
    }
}

/// Reader that keeps a copy of every byte read through it.
struct TeeReader<S> {
    inner: S,
    captured: Vec<u8>,
    limit: Option<usize>,
    overflowed: bool,
}

impl<S: Read> TeeReader<S> {
    fn new(inner: S, limit: Option<usize>) -> Self {
        Self {
            inner,
            captured: Vec::new(),
            limit,
            overflowed: false,
        }
    }

    fn into_parts(self) -> (Vec<u8>, S) {
        (self.captured, self.inner)
    }
}

impl<S: Read> Read for TeeReader<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        if let Some(limit) = self.limit {
            if self.captured.len() + n > limit {
                self.overflowed = true;
                return Err(io::Error::other("document exceeds maximum size"));
            }
        }
        self.captured.extend_from_slice(&buf[..n]);
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::TypeRegistry;
    use crate::unstructured::Unstructured;

    #[test]
    fn test_tee_reader_captures_everything_read() {
        let mut tee = TeeReader::new(&b"hello world"[..], None);
        let mut first = [0u8; 5];
        tee.read_exact(&mut first).expect("read");
        let (captured, mut rest) = tee.into_parts();
        assert_eq!(captured, b"hello");

        let mut replayed = Vec::new();
        Cursor::new(captured)
            .chain(&mut rest)
            .read_to_end(&mut replayed)
            .expect("replay");
        assert_eq!(replayed, b"hello world");
    }

    #[test]
    fn test_tee_reader_limit() {
        let mut tee = TeeReader::new(&b"0123456789"[..], Some(4));
        let mut buf = [0u8; 8];
        assert!(tee.read(&mut buf).is_err());
        assert!(tee.overflowed);
    }

    #[test]
    fn test_unknown_type_both_replays() {
        let reg = TypeRegistry::new().allow_unknown(true);
        for replay in [Replay::Buffered, Replay::Tee] {
            let decoder = TypedDecoder::json(&reg).replay(replay);
            let value = decoder
                .decode(&br#"{"type":"mystery/v3","n":1}"#[..])
                .expect("decode");
            let u = value.downcast_ref::<Unstructured>().expect("unstructured");
            assert_eq!(u.get::<u64>("n"), Some(1));
        }
    }

    #[test]
    fn test_buffered_limit() {
        let reg = TypeRegistry::new().allow_unknown(true);
        let decoder = TypedDecoder::json(&reg).max_document_size(8);
        let err = decoder
            .decode(&br#"{"type":"mystery/v3"}"#[..])
            .expect_err("too large");
        assert!(matches!(err, DecodeError::DocumentTooLarge { limit: 8 }));

        let err = decoder
            .decode_str(r#"{"type":"mystery/v3"}"#)
            .expect_err("too large");
        assert!(matches!(err, DecodeError::DocumentTooLarge { limit: 8 }));
    }

    #[test]
    fn test_tee_limit() {
        let reg = TypeRegistry::new().allow_unknown(true);
        let decoder = TypedDecoder::json(&reg)
            .replay(Replay::Tee)
            .max_document_size(8);
        let err = decoder
            .decode(&br#"{"type":"mystery/v3"}"#[..])
            .expect_err("too large");
        assert!(matches!(err, DecodeError::DocumentTooLarge { limit: 8 }));
    }

    #[test]
    fn test_from_config() {
        let config = DecodeConfig {
            format: Format::Yaml,
            replay: Replay::Tee,
            ..Default::default()
        };
        let reg = TypeRegistry::from_config(&config).allow_unknown(true);
        let decoder = TypedDecoder::from_config(&reg, &config);
        let value = decoder.decode_str("type: thing\nx: 1\n").expect("decode");
        assert_eq!(value.get_type(), "thing");
    }
}
