// socket-toolbox: Binary Message Socket Toolbox
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Error handling module.
//!
//! ```text
//!          ToolboxError (~16 bytes)
//!                   |
//!   +------+------+-+----+------+------+
//!   v      v      v      v      v      v
//! Format Codec  Socket Input   Cfg     Io
//!  Box    Box    Box    Box    Box    Box
//!
//! Sub-errors (unboxed internally):
//!   Format  Empty, LenTooLarge, NotALen, LenIdxOutOfBound
//!   Codec   KindMismatch, ValueOutOfRange, Eof, EndOfStream
//!   Socket  AddrParse, Bind, Connect, NoSuchClient, NotConnected
//!   Input   Integer, Bytes, ValueCount, UnknownKind, UnknownCommand
//!   Config  ParseError, MissingKey, InvalidValue
//!
//! All variants boxed => ToolboxError is one tag plus one pointer.
//! ```

use thiserror::Error;

/// Convenience alias for `anyhow::Result`.
pub type Result<T> = anyhow::Result<T>;

/// Result type using [`ToolboxError`].
pub type ToolboxResult<T> = std::result::Result<T, ToolboxError>;

/// Top-level application error type.
///
/// All sub-errors are boxed to keep this enum two words wide.
#[derive(Debug, Error)]
pub enum ToolboxError {
    /// Message format validation failed.
    #[error("format error: {0}")]
    Format(#[from] Box<FormatError>),

    /// Encoding or decoding a message failed.
    #[error("codec error: {0}")]
    Codec(#[from] Box<CodecError>),

    /// Socket operation failed.
    #[error("socket error: {0}")]
    Socket(#[from] Box<SocketError>),

    /// User input could not be parsed.
    #[error("input error: {0}")]
    Input(#[from] Box<InputError>),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(#[from] Box<ConfigError>),

    /// I/O error.
    #[error("io error: {0}")]
    Io(Box<std::io::Error>),
}

// --- From implementations for boxing ---

/// Macro to generate `From` implementations that box the source error.
macro_rules! impl_from_boxed {
    ($($error:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$error> for ToolboxError {
                fn from(err: $error) -> Self {
                    ToolboxError::$variant(Box::new(err))
                }
            }
        )+
    };
}

impl_from_boxed! {
    FormatError => Format,
    CodecError => Codec,
    SocketError => Socket,
    InputError => Input,
    ConfigError => Config,
    std::io::Error => Io,
}

// --- Format Errors ---

/// Message format validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// A message format needs at least one item.
    #[error("the message format should not be empty")]
    Empty,

    /// A fixed-width item was given a width of zero.
    #[error("the length of item {item_idx} should not be zero")]
    ZeroLen { item_idx: usize },

    /// An integer or length item is wider than 8 bytes.
    #[error(
        "the length for this kind of item is too large, max len: `{max_len}`, index of item: `{item_idx}`, actual len: `{len}`"
    )]
    LenTooLarge {
        max_len: usize,
        item_idx: usize,
        len: usize,
    },

    /// A variable item points past the end of the format.
    #[error(
        "the index of length is out of bound, index of item: `{item_idx}`, index of length: `{len_idx}`"
    )]
    LenIdxOutOfBound { item_idx: usize, len_idx: usize },

    /// A variable item points at itself or a later item.
    #[error(
        "the length item must precede the item it describes, index of item: `{item_idx}`, index of length: `{len_idx}`"
    )]
    LenIdxNotPreceding { item_idx: usize, len_idx: usize },

    /// A variable item points at something that is not a length.
    #[error("the item specified by index `{len_idx}` is not a length, index of item: `{item_idx}`")]
    NotALen { item_idx: usize, len_idx: usize },

    /// Two variable items share one length item.
    #[error("the length item `{len_idx}` is referenced by both item `{first}` and item `{second}`")]
    LenReferencedTwice {
        len_idx: usize,
        first: usize,
        second: usize,
    },
}

// --- Codec Errors ---

/// Message encoding and decoding errors.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The message has a different number of values than the format has items.
    #[error("the message has {actual} values but the format has {expected} items")]
    ItemCountMismatch { expected: usize, actual: usize },

    /// A value does not match the kind of its item.
    #[error("item {item_idx} expects a {expected} value, got {actual}")]
    KindMismatch {
        item_idx: usize,
        expected: &'static str,
        actual: &'static str,
    },

    /// An integer does not fit in the width of its item.
    #[error("value `{value}` does not fit in {len} bytes, index of item: `{item_idx}`")]
    ValueOutOfRange {
        item_idx: usize,
        len: usize,
        value: String,
    },

    /// A fixed-width value is longer than its item.
    #[error(
        "the length of value is out of bound, len specified by format: `{specified_len}`, index of item: `{item_idx}`, len of item: `{item_len}`"
    )]
    ValueLenOutOfBound {
        specified_len: usize,
        item_idx: usize,
        item_len: usize,
    },

    /// A length value disagrees with the item it describes.
    #[error(
        "length item {item_idx} says {declared} bytes but item {var_idx} has {actual} bytes"
    )]
    LenMismatch {
        item_idx: usize,
        var_idx: usize,
        declared: u64,
        actual: u64,
    },

    /// A decoded length exceeds the accepted maximum.
    #[error("variable item {item_idx} declares {len} bytes, more than the maximum of {max}")]
    VarLenTooLarge { item_idx: usize, len: u64, max: usize },

    /// Input ended in the middle of an item.
    #[error("no more bytes can be read, index of item: `{item_idx}`, needed: {needed}, available: {available}")]
    Eof {
        item_idx: usize,
        needed: usize,
        available: usize,
    },

    /// Input ended cleanly between two messages.
    #[error("end of stream")]
    EndOfStream,

    /// Bytes remained after the last item was decoded.
    #[error("{count} trailing bytes after the last item")]
    TrailingBytes { count: usize },

    /// A text item is not valid UTF-8.
    #[error("the bytes can not be converted to a utf8 string, index of item: `{item_idx}`")]
    FromUtf8 {
        item_idx: usize,
        #[source]
        source: std::string::FromUtf8Error,
    },

    /// The underlying stream failed.
    #[error("io error, kind: `{:?}`", .0.kind())]
    Io(#[from] std::io::Error),
}

impl CodecError {
    /// Whether the error leaves a stream without usable message framing.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Io(_) | Self::Eof { .. } | Self::EndOfStream | Self::VarLenTooLarge { .. }
        )
    }
}

// --- Socket Errors ---

/// Socket operation errors.
#[derive(Debug, Error)]
pub enum SocketError {
    /// An address string is not a valid socket address.
    #[error("invalid IP address syntax, `{invalid_addr}`")]
    AddrParse { invalid_addr: String },

    /// Binding a local address failed.
    #[error("failed to bind `{addr}`: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Connecting to a remote address failed.
    #[error("failed to connect to `{addr}`: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Connecting took longer than the configured timeout.
    #[error("connecting to `{addr}` timed out after {timeout_ms} ms")]
    ConnectTimeout { addr: String, timeout_ms: u64 },

    /// The socket is already running.
    #[error("the {role} is already running")]
    AlreadyRunning { role: &'static str },

    /// The socket is not running.
    #[error("the {role} is not running")]
    NotRunning { role: &'static str },

    /// No connected client has the given address.
    #[error("there is no such client connected `{addr}`")]
    NoSuchClient { addr: String },

    /// The client has no live connection.
    #[error("the client is not connected to a server")]
    NotConnected,
}

// --- Input Errors ---

/// Errors parsing formats and values typed by the user.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    /// An integer field could not be parsed.
    #[error("`{s}` is not a valid integer, index of item: `{item_idx}`: {source}")]
    Integer {
        item_idx: usize,
        s: String,
        #[source]
        source: std::num::ParseIntError,
    },

    /// A bytes field is not valid hex.
    #[error("`{s}` is not valid hex, index of item: `{item_idx}`: {source}")]
    Bytes {
        item_idx: usize,
        s: String,
        #[source]
        source: hex::FromHexError,
    },

    /// A hex blob given for decoding is not valid hex.
    #[error("`{s}` is not valid hex: {source}")]
    Hex {
        s: String,
        #[source]
        source: hex::FromHexError,
    },

    /// Unknown item kind in a format description.
    #[error("unknown item kind `{kind}`, expected one of: len, uint, int, str, varstr, bytes, varbytes")]
    UnknownKind { kind: String },

    /// A format description does not follow `<kind>:<n>`.
    #[error("invalid item format `{s}`, expected `<kind>:<n>`")]
    Syntax { s: String },

    /// Wrong number of values for the format.
    #[error("expected {expected} values, got {actual}")]
    ValueCount { expected: String, actual: usize },

    /// An interactive command line has an unterminated quote.
    #[error("unterminated quote in `{line}`")]
    UnterminatedQuote { line: String },

    /// An interactive command line is not a known command.
    #[error("unknown command `{line}`, type `help` for a list")]
    UnknownCommand { line: String },
}

// --- Config Errors ---

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to parse configuration file.
    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: String, message: String },

    /// Missing required configuration key.
    #[error("missing required config key '{key}' in section '[{section}]'")]
    MissingKey { section: String, key: String },

    /// Invalid configuration value.
    #[error("invalid value for '{key}' in section '[{section}]': {message}")]
    InvalidValue {
        section: String,
        key: String,
        message: String,
    },
}
