// socket-toolbox: Binary Message Socket Toolbox
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Message model: item formats, item values, and messages.
//!
//! ```text
//! [ItemFormat] --MessageFormat::new()--> MessageFormat (validated)
//!                                            |
//!                 Message <--decode()--  bytes  <--encode()-- Message
//!                                            |
//!            MessageDecoder (AsyncRead)   MessageEncoder (AsyncWrite)
//!
//! Wire layout: items back to back, big-endian, no padding between items.
//!   Len/Uint/Int     1..=8 bytes
//!   FixedString      NUL padded to len
//!   FixedBytes       zero padded to len
//!   VarString/Bytes  length taken from an earlier Len item
//! ```

pub mod codec;
pub mod format;
pub mod input;


use std::fmt;

use serde::{Deserialize, Serialize};

pub use codec::{MessageDecoder, MessageEncoder};
pub use format::MessageFormat;

/// Widest integer item, in bytes.
pub const MAX_INT_LEN: usize = 8;

/// Largest variable item accepted when decoding, in bytes.
pub const MAX_VAR_LEN: usize = 16 * 1024 * 1024;

/// Format of a single message item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemFormat {
    /// Unsigned length of a later variable item.
    Len { len: usize },
    /// Unsigned integer.
    Uint { len: usize },
    /// Signed integer.
    Int { len: usize },
    /// UTF-8 text padded to `len` bytes.
    FixedString { len: usize },
    /// UTF-8 text sized by the `Len` item at `len_idx`.
    VarString { len_idx: usize },
    /// Raw bytes padded to `len` bytes.
    FixedBytes { len: usize },
    /// Raw bytes sized by the `Len` item at `len_idx`.
    VarBytes { len_idx: usize },
}

impl ItemFormat {
    /// Short name used in the textual format syntax.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Len { .. } => "len",
            Self::Uint { .. } => "uint",
            Self::Int { .. } => "int",
            Self::FixedString { .. } => "str",
            Self::VarString { .. } => "varstr",
            Self::FixedBytes { .. } => "bytes",
            Self::VarBytes { .. } => "varbytes",
        }
    }

    /// Width in bytes for fixed items, `None` for variable ones.
    #[must_use]
    pub const fn fixed_len(&self) -> Option<usize> {
        match *self {
            Self::Len { len }
            | Self::Uint { len }
            | Self::Int { len }
            | Self::FixedString { len }
            | Self::FixedBytes { len } => Some(len),
            Self::VarString { .. } | Self::VarBytes { .. } => None,
        }
    }

    /// Index of the length item for variable items.
    #[must_use]
    pub const fn len_idx(&self) -> Option<usize> {
        match *self {
            Self::VarString { len_idx } | Self::VarBytes { len_idx } => Some(len_idx),
            _ => None,
        }
    }

    /// Name of the value kind this item carries.
    #[must_use]
    pub const fn value_kind(&self) -> &'static str {
        match self {
            Self::Len { .. } => "len",
            Self::Uint { .. } => "uint",
            Self::Int { .. } => "int",
            Self::FixedString { .. } | Self::VarString { .. } => "string",
            Self::FixedBytes { .. } | Self::VarBytes { .. } => "bytes",
        }
    }

    /// The zero value for this item.
    #[must_use]
    pub const fn default_value(&self) -> ItemValue {
        match self {
            Self::Len { .. } => ItemValue::Len(0),
            Self::Uint { .. } => ItemValue::Uint(0),
            Self::Int { .. } => ItemValue::Int(0),
            Self::FixedString { .. } | Self::VarString { .. } => ItemValue::String(String::new()),
            Self::FixedBytes { .. } | Self::VarBytes { .. } => ItemValue::Bytes(Vec::new()),
        }
    }
}

/// Value of a single message item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ItemValue {
    Len(u64),
    Uint(u64),
    Int(i64),
    String(String),
    #[serde(with = "hex_bytes")]
    Bytes(Vec<u8>),
}

impl ItemValue {
    /// Name of this value's kind.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Len(_) => "len",
            Self::Uint(_) => "uint",
            Self::Int(_) => "int",
            Self::String(_) => "string",
            Self::Bytes(_) => "bytes",
        }
    }

    /// Byte length of text and byte payloads.
    #[must_use]
    pub fn payload_len(&self) -> Option<u64> {
        match self {
            Self::String(s) => Some(s.len() as u64),
            Self::Bytes(b) => Some(b.len() as u64),
            Self::Len(_) | Self::Uint(_) | Self::Int(_) => None,
        }
    }
}

impl fmt::Display for ItemValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Len(v) | Self::Uint(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::Bytes(b) if b.is_empty() => f.write_str("0x"),
            Self::Bytes(b) => write!(f, "0x{}", hex::encode_upper(b)),
        }
    }
}

/// An ordered list of item values.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Message {
    values: Vec<ItemValue>,
}

impl Message {
    #[must_use]
    pub const fn new(values: Vec<ItemValue>) -> Self {
        Self { values }
    }

    #[must_use]
    pub fn values(&self) -> &[ItemValue] {
        &self.values
    }

    #[must_use]
    pub fn into_values(self) -> Vec<ItemValue> {
        self.values
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<Vec<ItemValue>> for Message {
    fn from(values: Vec<ItemValue>) -> Self {
        Self::new(values)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, value) in self.values.iter().enumerate() {
            if idx > 0 {
                f.write_str(" | ")?;
            }
            write!(f, "{value}")?;
        }
        Ok(())
    }
}

/// Serde helpers storing byte values as hex strings.
mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hex::encode_upper(bytes))
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        hex::decode(s).map_err(serde::de::Error::custom)
    }
}
