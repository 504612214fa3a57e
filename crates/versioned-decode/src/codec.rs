// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Single-shot decoders and their factories.
//!
//! The decode protocol never talks to a tokenizer directly. It asks a
//! [`DecoderFactory`] for a fresh [`Decoder`] bound to a byte source and runs
//! exactly one [`Decoder::decode`] on it. JSON and YAML are provided through
//! [`Format`]; other formats plug in by implementing the two traits.

use crate::error::EncodeError;
use crate::typed::{DecodeTarget, TypedValue};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Read;

/// Error type produced by decoder implementations.
pub type DecoderError = Box<dyn std::error::Error + Send + Sync>;

/// One in-progress decode session over a byte source.
pub trait Decoder {
    /// Decode the next value from the source into `target`.
    fn decode(&mut self, target: &mut dyn DecodeTarget) -> Result<(), DecoderError>;
}

/// Creates a fresh [`Decoder`] for a byte source.
pub trait DecoderFactory {
    fn decoder<'a>(&self, source: Box<dyn Read + 'a>) -> Box<dyn Decoder + 'a>;
}

impl<F: DecoderFactory + ?Sized> DecoderFactory for &F {
    fn decoder<'a>(&self, source: Box<dyn Read + 'a>) -> Box<dyn Decoder + 'a> {
        (**self).decoder(source)
    }
}

/// JSON decoder backed by `serde_json`.
///
/// Reads the source byte by byte and stops at the end of the first value, so
/// trailing input stays unread.
pub struct JsonDecoder<R: Read> {
    de: serde_json::Deserializer<serde_json::de::IoRead<R>>,
}

impl<R: Read> JsonDecoder<R> {
    pub fn new(reader: R) -> Self {
        Self {
            de: serde_json::Deserializer::from_reader(reader),
        }
    }
}

impl<R: Read> Decoder for JsonDecoder<R> {
    fn decode(&mut self, target: &mut dyn DecodeTarget) -> Result<(), DecoderError> {
        let mut erased = <dyn erased_serde::Deserializer>::erase(&mut self.de);
        target.decode_from(&mut erased)?;
        Ok(())
    }
}

/// YAML decoder backed by `serde_yaml`.
///
/// `serde_yaml` consumes the whole source on first use, so the decoder is
/// good for exactly one document.
pub struct YamlDecoder<'a> {
    de: Option<serde_yaml::Deserializer<'a>>,
}

impl<'a> YamlDecoder<'a> {
    pub fn new<R: Read + 'a>(reader: R) -> Self {
        Self {
            de: Some(serde_yaml::Deserializer::from_reader(reader)),
        }
    }
}

impl Decoder for YamlDecoder<'_> {
    fn decode(&mut self, target: &mut dyn DecodeTarget) -> Result<(), DecoderError> {
        let de = self.de.take().ok_or("YAML decoder already consumed")?;
        let mut erased = <dyn erased_serde::Deserializer>::erase(de);
        target.decode_from(&mut erased)?;
        Ok(())
    }
}

/// Built-in document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Json,
    Yaml,
}

impl Format {
    /// Lowercase format name.
    pub fn name(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Yaml => "yaml",
        }
    }

    /// Encode a typed value, discriminator included.
    pub fn encode(&self, value: &dyn TypedValue) -> Result<Vec<u8>, EncodeError> {
        match self {
            Format::Json => Ok(serde_json::to_vec(value)?),
            Format::Yaml => Ok(serde_yaml::to_string(value)?.into_bytes()),
        }
    }

    /// Encode a typed value as text.
    pub fn encode_to_string(&self, value: &dyn TypedValue) -> Result<String, EncodeError> {
        match self {
            Format::Json => Ok(serde_json::to_string(value)?),
            Format::Yaml => Ok(serde_yaml::to_string(value)?),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl DecoderFactory for Format {
    fn decoder<'a>(&self, source: Box<dyn Read + 'a>) -> Box<dyn Decoder + 'a> {
        match self {
            Format::Json => Box::new(JsonDecoder::new(source)),
            Format::Yaml => Box::new(YamlDecoder::new(source)),
        }
    }
}
