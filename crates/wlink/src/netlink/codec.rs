//! Table-driven attribute codec.
//!
//! A record type describes its wire layout with a static table of
//! [`FieldSpec`]s: field name, attribute type and [`Codec`]. The same table
//! drives both directions:
//!
//! ```text
//!            decode_fields(table)              R::from_fields
//! TLV bytes ─────────────────────▶ Fields ─────────────────────▶ R
//!           ◀───────────────────── Fields ◀───────────────────── R
//!            encode_fields(table)              R::to_fields
//! ```
//!
//! Attribute types missing from a table are skipped on decode, so records
//! keep working against kernels that report more than we model.
//!
//! Nested arrays are a nested attribute whose children use their 1-based
//! position as the attribute type. The index is written on encode and ignored
//! on decode; element order is the only thing that matters.

use super::attr::{self, AttrIter, get};
use super::error::AttributeError;

type Result<T> = std::result::Result<T, AttributeError>;

/// How a field's payload is represented on the wire.
#[derive(Debug, Clone, Copy)]
pub enum Codec {
    U8,
    U16,
    U32,
    U64,
    /// Signed 32-bit (e.g. signal strength in mBm).
    S32,
    /// NUL-terminated UTF-8.
    Str,
    /// Opaque bytes.
    Bytes,
    /// Presence-only attribute with an empty payload.
    Flag,
    /// Nested attribute decoded with its own table.
    Record(&'static [FieldSpec]),
    /// Nested attribute whose children are positional elements.
    Array(&'static Codec),
}

impl Codec {
    /// Fixed payload size, for scalar codecs. Flags must be empty.
    pub const fn size(&self) -> Option<usize> {
        match self {
            Codec::U8 => Some(1),
            Codec::U16 => Some(2),
            Codec::U32 | Codec::S32 => Some(4),
            Codec::U64 => Some(8),
            Codec::Flag => Some(0),
            _ => None,
        }
    }
}

/// One row of a record's field table.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Field name, used for lookups and error reporting.
    pub name: &'static str,
    /// Attribute type on the wire (without flag bits).
    pub attr: u16,
    /// Payload representation.
    pub codec: Codec,
}

impl FieldSpec {
    pub const fn new(name: &'static str, attr: u16, codec: Codec) -> Self {
        Self { name, attr, codec }
    }
}

/// A decoded attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    S32(i32),
    Str(String),
    Bytes(Vec<u8>),
    Flag,
    Record(Fields),
    Array(Vec<AttrValue>),
}

impl AttrValue {
    pub fn as_u8(&self) -> Option<u8> {
        match self {
            Self::U8(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u16(&self) -> Option<u16> {
        match self {
            Self::U16(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Self::U32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::U64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_s32(&self) -> Option<i32> {
        match self {
            Self::S32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Fields> {
        match self {
            Self::Record(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[AttrValue]> {
        match self {
            Self::Array(v) => Some(v),
            _ => None,
        }
    }
}

/// Ordered mapping of field name to value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields {
    entries: Vec<(&'static str, AttrValue)>,
}

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: &'static str, value: AttrValue) -> Self {
        self.insert(name, value);
        self
    }

    /// Builder-style insert that skips `None`.
    pub fn with_opt(self, name: &'static str, value: Option<AttrValue>) -> Self {
        match value {
            Some(value) => self.with(name, value),
            None => self,
        }
    }

    /// Insert or replace a field, keeping its original position on replace.
    pub fn insert(&mut self, name: &'static str, value: AttrValue) {
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &AttrValue)> {
        self.entries.iter().map(|(n, v)| (*n, v))
    }

    fn require<'a, T>(
        &'a self,
        name: &'static str,
        extract: impl FnOnce(&'a AttrValue) -> Option<T>,
    ) -> Result<T> {
        let value = self.get(name).ok_or(AttributeError::FieldNotFound(name))?;
        extract(value).ok_or(AttributeError::UnexpectedValue { name })
    }

    fn optional<'a, T>(
        &'a self,
        name: &'static str,
        extract: impl FnOnce(&'a AttrValue) -> Option<T>,
    ) -> Result<Option<T>> {
        match self.get(name) {
            Some(value) => extract(value)
                .map(Some)
                .ok_or(AttributeError::UnexpectedValue { name }),
            None => Ok(None),
        }
    }

    pub fn u8(&self, name: &'static str) -> Result<u8> {
        self.require(name, AttrValue::as_u8)
    }

    pub fn u16(&self, name: &'static str) -> Result<u16> {
        self.require(name, AttrValue::as_u16)
    }

    pub fn u32(&self, name: &'static str) -> Result<u32> {
        self.require(name, AttrValue::as_u32)
    }

    pub fn u64(&self, name: &'static str) -> Result<u64> {
        self.require(name, AttrValue::as_u64)
    }

    pub fn str(&self, name: &'static str) -> Result<&str> {
        self.require(name, AttrValue::as_str)
    }

    pub fn bytes(&self, name: &'static str) -> Result<&[u8]> {
        self.require(name, AttrValue::as_bytes)
    }

    pub fn record(&self, name: &'static str) -> Result<&Fields> {
        self.require(name, AttrValue::as_record)
    }

    pub fn array(&self, name: &'static str) -> Result<&[AttrValue]> {
        self.require(name, AttrValue::as_array)
    }

    pub fn opt_u8(&self, name: &'static str) -> Result<Option<u8>> {
        self.optional(name, AttrValue::as_u8)
    }

    pub fn opt_u16(&self, name: &'static str) -> Result<Option<u16>> {
        self.optional(name, AttrValue::as_u16)
    }

    pub fn opt_u32(&self, name: &'static str) -> Result<Option<u32>> {
        self.optional(name, AttrValue::as_u32)
    }

    pub fn opt_u64(&self, name: &'static str) -> Result<Option<u64>> {
        self.optional(name, AttrValue::as_u64)
    }

    pub fn opt_s32(&self, name: &'static str) -> Result<Option<i32>> {
        self.optional(name, AttrValue::as_s32)
    }

    pub fn opt_bytes(&self, name: &'static str) -> Result<Option<&[u8]>> {
        self.optional(name, AttrValue::as_bytes)
    }

    pub fn opt_array(&self, name: &'static str) -> Result<Option<&[AttrValue]>> {
        self.optional(name, AttrValue::as_array)
    }

    /// Presence of a flag field.
    pub fn flag(&self, name: &str) -> bool {
        matches!(self.get(name), Some(AttrValue::Flag))
    }

    /// Decode every element of an array-of-records field.
    pub fn records<R: AttrRecord>(&self, name: &'static str) -> Result<Vec<R>> {
        self.array(name)?
            .iter()
            .map(|item| {
                item.as_record()
                    .ok_or(AttributeError::UnexpectedValue { name })
                    .and_then(R::from_fields)
            })
            .collect()
    }

    /// Like [`records`](Self::records), but an absent field is an empty list.
    pub fn opt_records<R: AttrRecord>(&self, name: &'static str) -> Result<Vec<R>> {
        if self.contains(name) {
            self.records(name)
        } else {
            Ok(Vec::new())
        }
    }
}

/// A record with a static field table.
pub trait AttrRecord: Sized {
    /// Field table shared by encode and decode.
    const FIELDS: &'static [FieldSpec];

    /// Build the record from decoded fields.
    fn from_fields(fields: &Fields) -> Result<Self>;

    /// Flatten the record into fields, in wire order.
    fn to_fields(&self) -> Fields;

    /// Decode from a TLV stream.
    fn decode(data: &[u8]) -> Result<Self> {
        Self::from_fields(&decode_fields(data, Self::FIELDS)?)
    }

    /// Encode into a TLV stream.
    fn encode(&self) -> Result<Vec<u8>> {
        encode_fields(&self.to_fields(), Self::FIELDS)
    }
}

/// Decode a TLV stream using `table`. Unknown attribute types are skipped.
pub fn decode_fields(data: &[u8], table: &'static [FieldSpec]) -> Result<Fields> {
    let mut fields = Fields::new();
    for attr in AttrIter::new(data) {
        let attr = attr?;
        let Some(spec) = table.iter().find(|spec| spec.attr == attr.kind) else {
            tracing::trace!(kind = attr.kind, "skipping unmodelled attribute");
            continue;
        };
        let value = decode_value(spec.name, spec.codec, attr.payload)?;
        fields.insert(spec.name, value);
    }
    Ok(fields)
}

fn decode_value(name: &'static str, codec: Codec, payload: &[u8]) -> Result<AttrValue> {
    if let Some(size) = codec.size()
        && payload.len() != size
    {
        return Err(AttributeError::ValueCorrupted {
            name,
            expected: size,
            actual: payload.len(),
        });
    }

    Ok(match codec {
        Codec::U8 => AttrValue::U8(get::u8(payload, name)?),
        Codec::U16 => AttrValue::U16(get::u16_ne(payload, name)?),
        Codec::U32 => AttrValue::U32(get::u32_ne(payload, name)?),
        Codec::U64 => AttrValue::U64(get::u64_ne(payload, name)?),
        Codec::S32 => AttrValue::S32(get::i32_ne(payload, name)?),
        Codec::Str => AttrValue::Str(get::string(payload, name)?.to_owned()),
        Codec::Bytes => AttrValue::Bytes(payload.to_vec()),
        Codec::Flag => AttrValue::Flag,
        Codec::Record(table) => AttrValue::Record(decode_fields(payload, table)?),
        Codec::Array(element) => {
            let mut items = Vec::new();
            for item in AttrIter::new(payload) {
                items.push(decode_value(name, *element, item?.payload)?);
            }
            AttrValue::Array(items)
        }
    })
}

/// Encode `fields` in order using `table`.
pub fn encode_fields(fields: &Fields, table: &'static [FieldSpec]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    encode_into(&mut buf, fields, table)?;
    Ok(buf)
}

/// Append `fields` to an existing buffer.
pub fn encode_into(buf: &mut Vec<u8>, fields: &Fields, table: &'static [FieldSpec]) -> Result<()> {
    for (name, value) in fields.iter() {
        let spec = table
            .iter()
            .find(|spec| spec.name == name)
            .ok_or(AttributeError::FieldNotFound(name))?;
        encode_value(buf, spec.attr, spec.name, spec.codec, value)?;
    }
    Ok(())
}

fn encode_value(
    buf: &mut Vec<u8>,
    attr_type: u16,
    name: &'static str,
    codec: Codec,
    value: &AttrValue,
) -> Result<()> {
    match (codec, value) {
        (Codec::U8, AttrValue::U8(v)) => attr::put(buf, attr_type, &[*v])?,
        (Codec::U16, AttrValue::U16(v)) => attr::put(buf, attr_type, &v.to_ne_bytes())?,
        (Codec::U32, AttrValue::U32(v)) => attr::put(buf, attr_type, &v.to_ne_bytes())?,
        (Codec::U64, AttrValue::U64(v)) => attr::put(buf, attr_type, &v.to_ne_bytes())?,
        (Codec::S32, AttrValue::S32(v)) => attr::put(buf, attr_type, &v.to_ne_bytes())?,
        (Codec::Str, AttrValue::Str(s)) => {
            let mut data = Vec::with_capacity(s.len() + 1);
            data.extend_from_slice(s.as_bytes());
            data.push(0);
            attr::put(buf, attr_type, &data)?;
        }
        (Codec::Bytes, AttrValue::Bytes(b)) => attr::put(buf, attr_type, b)?,
        (Codec::Flag, AttrValue::Flag) => attr::put(buf, attr_type, &[])?,
        (Codec::Record(table), AttrValue::Record(fields)) => {
            let nest = attr::nest_start(buf, attr_type);
            encode_into(buf, fields, table)?;
            attr::nest_end(buf, nest)?;
        }
        (Codec::Array(element), AttrValue::Array(items)) => {
            let nest = attr::nest_start(buf, attr_type);
            for (i, item) in items.iter().enumerate() {
                let index = u16::try_from(i + 1).map_err(|_| AttributeError::TooLong {
                    len: items.len(),
                })?;
                encode_value(buf, index, name, *element, item)?;
            }
            attr::nest_end(buf, nest)?;
        }
        _ => return Err(AttributeError::UnexpectedValue { name }),
    }
    Ok(())
}
