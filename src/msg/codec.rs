// socket-toolbox: Binary Message Socket Toolbox
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Encoding and decoding of messages.
//!
//! ```text
//! encode:  for each (item, value)
//!            check kind, range, Len consistency
//!            append big-endian / padded bytes
//!
//! decode:  for each item
//!            n = fixed width | value of earlier Len
//!            take n bytes --> decode_item()
//!
//! MessageDecoder (AsyncRead)
//!   first byte missing   --> EndOfStream (clean boundary)
//!   later byte missing   --> Eof (truncated message)
//!   invalid text         --> FromUtf8, after the whole message is read
//! ```

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use super::{ItemFormat, ItemValue, MAX_INT_LEN, MAX_VAR_LEN, Message, MessageFormat};
use crate::error::CodecError;

impl MessageFormat {
    /// Encodes `msg` into its wire representation.
    ///
    /// # Errors
    ///
    /// Returns a [`CodecError`] if the message does not fit the format.
    pub fn encode(&self, msg: &Message) -> Result<Vec<u8>, CodecError> {
        let values = msg.values();
        if values.len() != self.len() {
            return Err(CodecError::ItemCountMismatch {
                expected: self.len(),
                actual: values.len(),
            });
        }

        let mut buf = Vec::with_capacity(self.encoded_len_hint(values));
        for (item_idx, (item, value)) in self.items().iter().zip(values).enumerate() {
            match (*item, value) {
                (ItemFormat::Len { len }, ItemValue::Len(v)) => {
                    if let Some(var_idx) = self.described_by(item_idx)
                        && let Some(actual) = values[var_idx].payload_len()
                        && actual != *v
                    {
                        return Err(CodecError::LenMismatch {
                            item_idx,
                            var_idx,
                            declared: *v,
                            actual,
                        });
                    }
                    put_uint(&mut buf, *v, len, item_idx)?;
                }
                (ItemFormat::Uint { len }, ItemValue::Uint(v)) => {
                    put_uint(&mut buf, *v, len, item_idx)?;
                }
                (ItemFormat::Int { len }, ItemValue::Int(v)) => {
                    put_int(&mut buf, *v, len, item_idx)?;
                }
                (ItemFormat::FixedString { len }, ItemValue::String(s)) => {
                    put_fixed(&mut buf, s.as_bytes(), len, item_idx)?;
                }
                (ItemFormat::FixedBytes { len }, ItemValue::Bytes(b)) => {
                    put_fixed(&mut buf, b, len, item_idx)?;
                }
                (ItemFormat::VarString { .. }, ItemValue::String(s)) => {
                    buf.extend_from_slice(s.as_bytes());
                }
                (ItemFormat::VarBytes { .. }, ItemValue::Bytes(b)) => {
                    buf.extend_from_slice(b);
                }
                (item, value) => {
                    return Err(CodecError::KindMismatch {
                        item_idx,
                        expected: item.value_kind(),
                        actual: value.kind_name(),
                    });
                }
            }
        }

        Ok(buf)
    }

    /// Decodes exactly one message from `bytes`.
    ///
    /// # Errors
    ///
    /// Returns a [`CodecError`] if `bytes` is truncated, has trailing data, or
    /// holds invalid text.
    pub fn decode(&self, bytes: &[u8]) -> Result<Message, CodecError> {
        let mut values = Vec::with_capacity(self.len());
        let mut rest = bytes;

        for (item_idx, item) in self.items().iter().enumerate() {
            let needed = self.item_len(item_idx, &values)?;
            if rest.len() < needed {
                return Err(CodecError::Eof {
                    item_idx,
                    needed,
                    available: rest.len(),
                });
            }
            let (raw, tail) = rest.split_at(needed);
            values.push(decode_item(item_idx, item, raw)?);
            rest = tail;
        }

        if !rest.is_empty() {
            return Err(CodecError::TrailingBytes { count: rest.len() });
        }

        Ok(Message::new(values))
    }

    /// Byte length of item `item_idx`, given the values decoded so far.
    fn item_len(&self, item_idx: usize, values: &[ItemValue]) -> Result<usize, CodecError> {
        let item = &self.items()[item_idx];
        if let Some(len) = item.fixed_len() {
            return Ok(len);
        }

        // Validation guarantees len_idx < item_idx and points at a Len.
        let declared = match item.len_idx().and_then(|idx| values.get(idx)) {
            Some(ItemValue::Len(v)) => *v,
            _ => 0,
        };
        match usize::try_from(declared) {
            Ok(len) if len <= MAX_VAR_LEN => Ok(len),
            _ => Err(CodecError::VarLenTooLarge {
                item_idx,
                len: declared,
                max: MAX_VAR_LEN,
            }),
        }
    }

    fn encoded_len_hint(&self, values: &[ItemValue]) -> usize {
        self.items()
            .iter()
            .zip(values)
            .map(|(item, value)| {
                item.fixed_len().unwrap_or_else(|| {
                    value
                        .payload_len()
                        .and_then(|len| usize::try_from(len).ok())
                        .unwrap_or_default()
                })
            })
            .sum()
    }
}

fn put_uint(buf: &mut Vec<u8>, v: u64, len: usize, item_idx: usize) -> Result<(), CodecError> {
    if len < MAX_INT_LEN && v >> (len * 8) != 0 {
        return Err(CodecError::ValueOutOfRange {
            item_idx,
            len,
            value: v.to_string(),
        });
    }
    buf.extend_from_slice(&v.to_be_bytes()[MAX_INT_LEN - len..]);
    Ok(())
}

fn put_int(buf: &mut Vec<u8>, v: i64, len: usize, item_idx: usize) -> Result<(), CodecError> {
    if len < MAX_INT_LEN {
        let bits = len * 8 - 1;
        let min = -(1i64 << bits);
        let max = (1i64 << bits) - 1;
        if v < min || v > max {
            return Err(CodecError::ValueOutOfRange {
                item_idx,
                len,
                value: v.to_string(),
            });
        }
    }
    buf.extend_from_slice(&v.to_be_bytes()[MAX_INT_LEN - len..]);
    Ok(())
}

fn put_fixed(buf: &mut Vec<u8>, data: &[u8], len: usize, item_idx: usize) -> Result<(), CodecError> {
    if data.len() > len {
        return Err(CodecError::ValueLenOutOfBound {
            specified_len: len,
            item_idx,
            item_len: data.len(),
        });
    }
    buf.extend_from_slice(data);
    buf.resize(buf.len() + len - data.len(), 0);
    Ok(())
}

fn get_uint(raw: &[u8]) -> u64 {
    raw.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b))
}

fn get_int(raw: &[u8]) -> i64 {
    let shift = 64 - raw.len() * 8;
    // Move the item's sign bit to bit 63, then shift back arithmetically.
    #[allow(clippy::cast_possible_wrap)]
    let v = (get_uint(raw) << shift) as i64;
    v >> shift
}

fn decode_item(item_idx: usize, item: &ItemFormat, raw: &[u8]) -> Result<ItemValue, CodecError> {
    let value = match item {
        ItemFormat::Len { .. } => ItemValue::Len(get_uint(raw)),
        ItemFormat::Uint { .. } => ItemValue::Uint(get_uint(raw)),
        ItemFormat::Int { .. } => ItemValue::Int(get_int(raw)),
        ItemFormat::FixedString { .. } => {
            let end = raw.iter().rposition(|b| *b != 0).map_or(0, |pos| pos + 1);
            ItemValue::String(to_string(item_idx, &raw[..end])?)
        }
        ItemFormat::VarString { .. } => ItemValue::String(to_string(item_idx, raw)?),
        ItemFormat::FixedBytes { .. } | ItemFormat::VarBytes { .. } => ItemValue::Bytes(raw.to_vec()),
    };
    Ok(value)
}

fn to_string(item_idx: usize, raw: &[u8]) -> Result<String, CodecError> {
    String::from_utf8(raw.to_vec()).map_err(|source| CodecError::FromUtf8 { item_idx, source })
}

/// Reads whole messages from an async byte stream.
pub struct MessageDecoder<'a, R> {
    fmt: &'a MessageFormat,
    reader: &'a mut R,
}

impl<'a, R> MessageDecoder<'a, R>
where
    R: AsyncRead + Unpin,
{
    pub const fn new(fmt: &'a MessageFormat, reader: &'a mut R) -> Self {
        Self { fmt, reader }
    }

    /// Reads exactly one message.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::EndOfStream`] if the stream ends before the first
    /// byte, [`CodecError::Eof`] if it ends inside the message, and other
    /// [`CodecError`]s for invalid content.
    pub async fn decode(&mut self) -> Result<Message, CodecError> {
        let mut values = Vec::with_capacity(self.fmt.len());
        let mut buf = Vec::new();
        let mut started = false;
        let mut invalid = None;

        for (item_idx, item) in self.fmt.items().iter().enumerate() {
            let needed = self.fmt.item_len(item_idx, &values)?;
            buf.clear();
            buf.resize(needed, 0);

            let mut filled = 0;
            while filled < needed {
                let n = self.reader.read(&mut buf[filled..]).await?;
                if n == 0 {
                    return Err(if started {
                        CodecError::Eof {
                            item_idx,
                            needed,
                            available: filled,
                        }
                    } else {
                        CodecError::EndOfStream
                    });
                }
                started = true;
                filled += n;
            }

            // A bad text item still consumes its bytes so the next message
            // starts on a boundary.
            match decode_item(item_idx, item, &buf) {
                Ok(value) => values.push(value),
                Err(e) => {
                    invalid.get_or_insert(e);
                    values.push(ItemValue::String(String::new()));
                }
            }
        }

        match invalid {
            Some(e) => Err(e),
            None => Ok(Message::new(values)),
        }
    }
}

/// Writes whole messages to an async byte stream.
pub struct MessageEncoder<'a, W> {
    fmt: &'a MessageFormat,
    writer: &'a mut W,
}

impl<'a, W> MessageEncoder<'a, W>
where
    W: AsyncWrite + Unpin,
{
    pub const fn new(fmt: &'a MessageFormat, writer: &'a mut W) -> Self {
        Self { fmt, writer }
    }

    /// Encodes `msg`, writes it, and flushes.
    ///
    /// # Errors
    ///
    /// Returns a [`CodecError`] if encoding or writing fails.
    pub async fn encode(&mut self, msg: &Message) -> Result<(), CodecError> {
        let bytes = self.fmt.encode(msg)?;
        self.write_encoded(&bytes).await
    }

    /// Writes bytes that were already produced by [`MessageFormat::encode`].
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Io`] if writing fails.
    pub async fn write_encoded(&mut self, bytes: &[u8]) -> Result<(), CodecError> {
        self.writer.write_all(bytes).await?;
        self.writer.flush().await?;
        Ok(())
    }
}
