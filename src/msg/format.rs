// socket-toolbox: Binary Message Socket Toolbox
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Validated message formats.
//!
//! ```text
//! MessageFormat::new(&[ItemFormat])
//!   empty?               -> Empty
//!   width 0 / > 8        -> ZeroLen / LenTooLarge
//!   len_idx >= n         -> LenIdxOutOfBound
//!   len_idx >= item_idx  -> LenIdxNotPreceding
//!   target not Len       -> NotALen
//!   Len shared           -> LenReferencedTwice
//!
//! len_refs[len_idx] = Some(var_idx)   (which item a Len describes)
//! ```

use std::fmt;
use std::sync::Arc;

use super::{ItemFormat, ItemValue, MAX_INT_LEN};
use crate::error::FormatError;

/// An immutable, validated list of item formats.
///
/// Cloning is cheap; socket tasks each hold a clone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageFormat {
    items: Arc<[ItemFormat]>,
    len_refs: Arc<[Option<usize>]>,
}

impl MessageFormat {
    /// Validates `items` and builds a format.
    ///
    /// # Errors
    ///
    /// Returns a [`FormatError`] describing the first invalid item.
    pub fn new(items: &[ItemFormat]) -> Result<Self, FormatError> {
        if items.is_empty() {
            return Err(FormatError::Empty);
        }

        let mut len_refs: Vec<Option<usize>> = vec![None; items.len()];

        for (item_idx, item) in items.iter().enumerate() {
            match *item {
                ItemFormat::Len { len } | ItemFormat::Uint { len } | ItemFormat::Int { len } => {
                    if len == 0 {
                        return Err(FormatError::ZeroLen { item_idx });
                    }
                    if len > MAX_INT_LEN {
                        return Err(FormatError::LenTooLarge {
                            max_len: MAX_INT_LEN,
                            item_idx,
                            len,
                        });
                    }
                }
                ItemFormat::FixedString { len } | ItemFormat::FixedBytes { len } => {
                    if len == 0 {
                        return Err(FormatError::ZeroLen { item_idx });
                    }
                }
                ItemFormat::VarString { len_idx } | ItemFormat::VarBytes { len_idx } => {
                    if len_idx >= items.len() {
                        return Err(FormatError::LenIdxOutOfBound { item_idx, len_idx });
                    }
                    if len_idx >= item_idx {
                        return Err(FormatError::LenIdxNotPreceding { item_idx, len_idx });
                    }
                    if !matches!(items[len_idx], ItemFormat::Len { .. }) {
                        return Err(FormatError::NotALen { item_idx, len_idx });
                    }
                    if let Some(first) = len_refs[len_idx] {
                        return Err(FormatError::LenReferencedTwice {
                            len_idx,
                            first,
                            second: item_idx,
                        });
                    }
                    len_refs[len_idx] = Some(item_idx);
                }
            }
        }

        Ok(Self {
            items: items.into(),
            len_refs: len_refs.into(),
        })
    }

    #[must_use]
    pub fn items(&self) -> &[ItemFormat] {
        &self.items
    }

    /// Number of items. Never zero.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Index of the variable item described by the `Len` item at `len_idx`.
    #[must_use]
    pub fn described_by(&self, len_idx: usize) -> Option<usize> {
        self.len_refs.get(len_idx).copied().flatten()
    }

    /// Whether the item at `idx` is a `Len` that some variable item uses.
    #[must_use]
    pub fn is_referenced_len(&self, idx: usize) -> bool {
        self.described_by(idx).is_some()
    }

    /// Number of referenced `Len` items, which can be derived from the rest.
    #[must_use]
    pub fn derived_len_count(&self) -> usize {
        self.len_refs.iter().filter(|r| r.is_some()).count()
    }

    /// Zero value for every item.
    #[must_use]
    pub fn default_values(&self) -> Vec<ItemValue> {
        self.items.iter().map(ItemFormat::default_value).collect()
    }

    /// Sets each referenced `Len` value to the byte length of its variable item.
    ///
    /// Values whose kinds do not match the format are left untouched; `encode`
    /// reports them.
    pub fn fill_lengths(&self, values: &mut [ItemValue]) {
        for (len_idx, var_idx) in self.len_refs.iter().enumerate() {
            let Some(var_idx) = *var_idx else { continue };
            let Some(actual) = values.get(var_idx).and_then(ItemValue::payload_len) else {
                continue;
            };
            if let Some(ItemValue::Len(len)) = values.get_mut(len_idx) {
                *len = actual;
            }
        }
    }

    /// One line per item: index, kind, width or length reference.
    #[must_use]
    pub fn layout(&self) -> Vec<String> {
        let mut offset = Some(0usize);
        self.items
            .iter()
            .enumerate()
            .map(|(idx, item)| {
                let at = offset.map_or_else(|| "var".to_string(), |o| o.to_string());
                let line = if let Some(len_idx) = item.len_idx() {
                    format!(
                        "#{idx:<3} @{at:<5} {:<8} sized by #{len_idx}",
                        item.kind_name()
                    )
                } else {
                    let len = item.fixed_len().unwrap_or_default();
                    let note = self
                        .described_by(idx)
                        .map(|var| format!(", length of #{var}"))
                        .unwrap_or_default();
                    format!("#{idx:<3} @{at:<5} {:<8} {len} bytes{note}", item.kind_name())
                };
                offset = match (offset, item.fixed_len()) {
                    (Some(o), Some(len)) => Some(o + len),
                    _ => None,
                };
                line
            })
            .collect()
    }
}

impl fmt::Display for MessageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, item) in self.items.iter().enumerate() {
            if idx > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{item}")?;
        }
        Ok(())
    }
}
