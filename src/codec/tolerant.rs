//! Generic field loop shared by every entity decoder.
//!
//! An entity describes itself through [`FieldSchema`]: its known field names
//! and how to read each of them into a partial value. [`Tolerant`] walks an
//! encoded object, hands known fields to the schema, and skips everything
//! else with a log line. Objects written by a newer schema therefore still
//! decode, losing only the fields this version does not know.

use std::{fmt, marker::PhantomData};

use serde::de::{self, DeserializeSeed, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};

use super::Codec;

/// Describes how one entity is read from an encoded object.
pub trait FieldSchema: Sized {
    /// Name used in log lines and error messages.
    const TYPE_NAME: &'static str;

    /// Known field names, in encoding order.
    const FIELDS: &'static [&'static str];

    /// Accumulates field values until the object is closed.
    type Partial: Default;

    /// Reads the value of `field`, one of [`Self::FIELDS`], from `map`.
    fn read_field<'de, A>(
        codec: &Codec,
        partial: &mut Self::Partial,
        field: &'static str,
        map: &mut A,
    ) -> Result<(), A::Error>
    where
        A: MapAccess<'de>;

    /// Builds the entity once the object is closed. Fails for missing
    /// required fields.
    fn finish<E: de::Error>(partial: Self::Partial) -> Result<Self, E>;
}

/// Progress of the field loop over one object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldCursor {
    seen: Vec<bool>,
    consumed: usize,
}

impl FieldCursor {
    pub fn new(total: usize) -> Self {
        Self {
            seen: vec![false; total],
            consumed: 0,
        }
    }

    /// Marks the known field at `index` as consumed. Returns `false` if it
    /// was consumed before.
    pub fn consume(&mut self, index: usize) -> bool {
        if self.seen[index] {
            return false;
        }
        self.seen[index] = true;
        self.consumed += 1;
        true
    }

    pub fn consumed(&self) -> usize {
        self.consumed
    }

    pub fn total(&self) -> usize {
        self.seen.len()
    }

    pub fn is_complete(&self) -> bool {
        self.consumed == self.total()
    }
}

/// Decodes a `T` from an encoded object, tolerating unknown fields.
pub struct Tolerant<'c, T> {
    codec: &'c Codec,
    marker: PhantomData<fn() -> T>,
}

impl<'c, T> Tolerant<'c, T> {
    pub fn new(codec: &'c Codec) -> Self {
        Self {
            codec,
            marker: PhantomData,
        }
    }
}

impl<T> Clone for Tolerant<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Tolerant<'_, T> {}

impl<'de, T: FieldSchema> DeserializeSeed<'de> for Tolerant<'_, T> {
    type Value = T;

    fn deserialize<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(self)
    }
}

impl<'de, T: FieldSchema> Visitor<'de> for Tolerant<'_, T> {
    type Value = T;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "a {} object", T::TYPE_NAME)
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut partial = T::Partial::default();
        let mut cursor = FieldCursor::new(T::FIELDS.len());

        while let Some(property) = map.next_key::<String>()? {
            match T::FIELDS.iter().position(|known| *known == property) {
                Some(index) => {
                    let field = T::FIELDS[index];
                    if !cursor.consume(index) {
                        return Err(de::Error::duplicate_field(field));
                    }
                    T::read_field(self.codec, &mut partial, field, &mut map)?;
                }
                None => {
                    self.codec.unknown_field(T::TYPE_NAME, &property);
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }

        if !cursor.is_complete() {
            log::debug!(
                "{} object closed after {} of {} known fields",
                T::TYPE_NAME,
                cursor.consumed(),
                cursor.total()
            );
        }

        T::finish(partial)
    }
}

/// Wraps a seed so that `null` decodes to `None`.
pub struct Nullable<S>(pub S);

impl<'de, S: DeserializeSeed<'de>> DeserializeSeed<'de> for Nullable<S> {
    type Value = Option<S::Value>;

    fn deserialize<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_option(NullableVisitor(self.0))
    }
}

struct NullableVisitor<S>(S);

impl<'de, S: DeserializeSeed<'de>> Visitor<'de> for NullableVisitor<S> {
    type Value = Option<S::Value>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("null or a value")
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        self.0.deserialize(deserializer).map(Some)
    }
}

/// Decodes an array, running the element seed on every item.
#[derive(Clone, Copy)]
pub struct ListOf<S>(pub S);

impl<'de, S> DeserializeSeed<'de> for ListOf<S>
where
    S: DeserializeSeed<'de> + Clone,
{
    type Value = Vec<S::Value>;

    fn deserialize<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(self)
    }
}

impl<'de, S> Visitor<'de> for ListOf<S>
where
    S: DeserializeSeed<'de> + Clone,
{
    type Value = Vec<S::Value>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an array")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element_seed(self.0.clone())? {
            items.push(item);
        }
        Ok(items)
    }
}
