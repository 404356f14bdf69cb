//! Encode and decode the tag model to and from JSON text.
//!
//! Encoding writes every known field in a fixed order and spells absent
//! values as `null`. Decoding goes through [`Codec::decode`], which threads
//! the codec (and its configuration) into every nested entity decoder.

use std::io;

use serde::{Deserialize, Serialize, de::DeserializeSeed};
use thiserror::Error;

mod entities;
pub mod tolerant;

pub use tolerant::{FieldCursor, FieldSchema, ListOf, Nullable, Tolerant};

/// What to do with field names a decoder does not know.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownFieldPolicy {
    /// skip the field and log a warning
    #[default]
    Warn,
    /// skip the field, logging only at debug level
    Ignore,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    pub pretty: bool,
    pub unknown_fields: UnknownFieldPolicy,
}

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("structural decode error: {0}")]
    StructuralDecode(#[source] serde_json::Error),

    #[error("encode error: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Entities the codec knows how to decode.
pub trait Decode: Sized {
    type Seed<'c>: for<'de> DeserializeSeed<'de, Value = Self>;

    fn seed(codec: &Codec) -> Self::Seed<'_>;
}

/// Encoder/decoder for the tag model, built once from a [`CodecConfig`] and
/// passed by reference to whoever needs it.
#[derive(Debug, Clone, Default)]
pub struct Codec {
    config: CodecConfig,
}

impl Codec {
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    pub fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<String, CodecError> {
        let text = if self.config.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        text.map_err(CodecError::Encode)
    }

    pub fn encode_to_writer<W, T>(&self, writer: W, value: &T) -> Result<(), CodecError>
    where
        W: io::Write,
        T: Serialize + ?Sized,
    {
        let written = if self.config.pretty {
            serde_json::to_writer_pretty(writer, value)
        } else {
            serde_json::to_writer(writer, value)
        };
        written.map_err(CodecError::Encode)
    }

    /// Decodes one value. A top-level `null` yields `None`.
    pub fn decode<T: Decode>(&self, text: &str) -> Result<Option<T>, CodecError> {
        let mut de = serde_json::Deserializer::from_str(text);
        self.decode_from(&mut de)
    }

    pub fn decode_from_reader<T: Decode, R: io::Read>(
        &self,
        reader: R,
    ) -> Result<Option<T>, CodecError> {
        let mut de = serde_json::Deserializer::from_reader(reader);
        self.decode_from(&mut de)
    }

    fn decode_from<'de, T, R>(
        &self,
        de: &mut serde_json::Deserializer<R>,
    ) -> Result<Option<T>, CodecError>
    where
        T: Decode,
        R: serde_json::de::Read<'de>,
    {
        let value = Nullable(T::seed(self))
            .deserialize(&mut *de)
            .map_err(CodecError::StructuralDecode)?;
        de.end().map_err(CodecError::StructuralDecode)?;
        Ok(value)
    }

    pub(crate) fn unknown_field(&self, type_name: &str, property: &str) {
        match self.config.unknown_fields {
            UnknownFieldPolicy::Warn => {
                log::warn!("unknown property for {type_name}: {property}")
            }
            UnknownFieldPolicy::Ignore => {
                log::debug!("skipping unknown property for {type_name}: {property}")
            }
        }
    }
}
