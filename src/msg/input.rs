// socket-toolbox: Binary Message Socket Toolbox
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Parsing formats and values from text.
//!
//! ```text
//! "uint:2"  "varstr:0"  "bytes:4"     --> ItemFormat  (FromStr / Display)
//! ["auto", "hello"] + MessageFormat   --> Vec<ItemValue>
//!   len/uint  u64      int  i64
//!   str       verbatim bytes hex (0x optional)
//!   referenced Len may be "auto", "_" or omitted entirely
//! ```

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use super::{ItemFormat, ItemValue, MessageFormat};
use crate::error::InputError;

impl FromStr for ItemFormat {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, n) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| InputError::Syntax { s: s.to_string() })?;
        let n: usize = n
            .trim()
            .parse()
            .map_err(|_| InputError::Syntax { s: s.to_string() })?;

        let item = match kind.trim().to_ascii_lowercase().as_str() {
            "len" => Self::Len { len: n },
            "uint" => Self::Uint { len: n },
            "int" => Self::Int { len: n },
            "str" | "fixed_string" => Self::FixedString { len: n },
            "varstr" | "var_string" => Self::VarString { len_idx: n },
            "bytes" | "fixed_bytes" => Self::FixedBytes { len: n },
            "varbytes" | "var_bytes" => Self::VarBytes { len_idx: n },
            other => {
                return Err(InputError::UnknownKind {
                    kind: other.to_string(),
                });
            }
        };
        Ok(item)
    }
}

impl fmt::Display for ItemFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.fixed_len().or_else(|| self.len_idx()).unwrap_or_default();
        write!(f, "{}:{n}", self.kind_name())
    }
}

fn parse_integer<T>(item_idx: usize, s: &str) -> Result<T, InputError>
where
    T: FromStr<Err = ParseIntError>,
{
    s.trim().parse::<T>().map_err(|source| InputError::Integer {
        item_idx,
        s: s.to_string(),
        source,
    })
}

/// Parses a hex blob. Whitespace and a leading `0x` are ignored.
///
/// # Errors
///
/// Returns [`InputError::Hex`] if the text is not an even number of hex digits.
pub fn parse_hex(s: &str) -> Result<Vec<u8>, InputError> {
    decode_hex(s).map_err(|source| InputError::Hex {
        s: s.to_string(),
        source,
    })
}

fn decode_hex(s: &str) -> Result<Vec<u8>, hex::FromHexError> {
    let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    let digits = compact
        .strip_prefix("0x")
        .or_else(|| compact.strip_prefix("0X"))
        .unwrap_or(&compact);
    hex::decode(digits)
}

fn is_auto(s: &str) -> bool {
    matches!(s.trim(), "auto" | "_")
}

/// Parses the text of a single value for `item`.
///
/// # Errors
///
/// Returns an [`InputError`] if the text does not parse as the item's kind.
pub fn parse_value(item_idx: usize, item: &ItemFormat, s: &str) -> Result<ItemValue, InputError> {
    let value = match item {
        ItemFormat::Len { .. } if is_auto(s) => ItemValue::Len(0),
        ItemFormat::Len { .. } => ItemValue::Len(parse_integer(item_idx, s)?),
        ItemFormat::Uint { .. } => ItemValue::Uint(parse_integer(item_idx, s)?),
        ItemFormat::Int { .. } => ItemValue::Int(parse_integer(item_idx, s)?),
        ItemFormat::FixedString { .. } | ItemFormat::VarString { .. } => {
            ItemValue::String(s.to_string())
        }
        ItemFormat::FixedBytes { .. } | ItemFormat::VarBytes { .. } => {
            ItemValue::Bytes(decode_hex(s).map_err(|source| InputError::Bytes {
                item_idx,
                s: s.to_string(),
                source,
            })?)
        }
    };
    Ok(value)
}

/// Parses one token per item, or one per item that is not a derived length.
///
/// Referenced `Len` items are always recomputed from their variable item.
///
/// # Errors
///
/// Returns [`InputError::ValueCount`] for a wrong number of tokens, or the
/// first per-value parse error.
pub fn parse_values<S: AsRef<str>>(
    fmt: &MessageFormat,
    tokens: &[S],
) -> Result<Vec<ItemValue>, InputError> {
    let full = fmt.len();
    let short = full - fmt.derived_len_count();

    let mut values = if tokens.len() == full {
        fmt.items()
            .iter()
            .zip(tokens)
            .enumerate()
            .map(|(idx, (item, token))| parse_value(idx, item, token.as_ref()))
            .collect::<Result<Vec<_>, _>>()?
    } else if tokens.len() == short {
        let mut tokens = tokens.iter();
        let mut values = Vec::with_capacity(full);
        for (idx, item) in fmt.items().iter().enumerate() {
            if fmt.is_referenced_len(idx) {
                values.push(ItemValue::Len(0));
            } else if let Some(token) = tokens.next() {
                values.push(parse_value(idx, item, token.as_ref())?);
            }
        }
        values
    } else {
        let expected = if full == short {
            full.to_string()
        } else {
            format!("{full} or {short}")
        };
        return Err(InputError::ValueCount {
            expected,
            actual: tokens.len(),
        });
    };

    fmt.fill_lengths(&mut values);
    Ok(values)
}

/// Splits an interactive command line into tokens.
///
/// Tokens are separated by whitespace. Double quotes group a token and allow
/// `\"` and `\\` escapes inside.
///
/// # Errors
///
/// Returns [`InputError::UnterminatedQuote`] if a quote is left open.
pub fn tokenize(line: &str) -> Result<Vec<String>, InputError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                in_token = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(escaped @ ('"' | '\\')) => current.push(escaped),
                            Some(other) => {
                                current.push('\\');
                                current.push(other);
                            }
                            None => {
                                return Err(InputError::UnterminatedQuote {
                                    line: line.to_string(),
                                });
                            }
                        },
                        Some(other) => current.push(other),
                        None => {
                            return Err(InputError::UnterminatedQuote {
                                line: line.to_string(),
                            });
                        }
                    }
                }
            }
            c if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            c => {
                in_token = true;
                current.push(c);
            }
        }
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}
