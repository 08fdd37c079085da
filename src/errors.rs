//! Error handling.
use failure::Fail;

/// Error `enum` for errors raised by this library.
///
/// Exhaustive matching is NOT guaranteed by the library API (!).
#[derive(Fail, Debug, Clone, PartialEq, Eq)]
pub enum MessagingError {
    /// The input wasn't something we could even begin to parse (not hex,
    /// odd-length hex in strict mode, that sort of thing).
    #[fail(display = "Invalid input: {}", _0)]
    InvalidInput(String),
    /// The buffer ended before a declared length was satisfied.
    #[fail(display = "Unexpected end of input at byte offset {}", offset)]
    UnexpectedEnd {
        /// Byte offset at which the reader fell off the end.
        offset: usize
    },
    /// A wire primitive could not be parsed by any of its alternative forms.
    ///
    /// When a decoder returns this, it has restored its cursor to where it
    /// was before the call, so the caller may try another production.
    #[fail(display = "Decode error at byte offset {}: {}", offset, context)]
    DecodeError {
        /// What we were trying to decode.
        context: String,
        /// Byte offset at which decoding gave up.
        offset: usize
    },
    /// A value was out of range for the encoding it was asked to fit into.
    #[fail(display = "Encode error: {}", _0)]
    EncodeError(String),
    /// GSM 03.38 encoding in strict mode hit a code point with no mapping.
    #[fail(display = "Character not representable in GSM 03.38: {:?}", _0)]
    InvalidCharacter(char),
    /// A phone number that doesn't look like one (`^\+?\d{3,20}$`).
    #[fail(display = "Invalid number: {}", _0)]
    InvalidNumber(String),
    /// A wire feature we deliberately don't handle.
    #[fail(display = "Unsupported: {}", _0)]
    Unsupported(&'static str),
    /// This shouldn't be shown, and is designed to stop you matching on this
    /// `enum` exhaustively. If you do that, yo' code gonna break!
    #[fail(display = "[this should never be shown]")]
    #[doc(hidden)]
    __Nonexhaustive
}
impl MessagingError {
    pub(crate) fn decode<S: Into<String>>(context: S, offset: usize) -> MessagingError {
        MessagingError::DecodeError { context: context.into(), offset }
    }
    pub(crate) fn encode<S: Into<String>>(msg: S) -> MessagingError {
        MessagingError::EncodeError(msg.into())
    }
    /// Is this a `DecodeError`, i.e. is it worth trying another alternative?
    pub fn is_decode_error(&self) -> bool {
        match self {
            MessagingError::DecodeError { .. } => true,
            _ => false
        }
    }
}
/// Bog-standard result type alias.
pub type MessagingResult<T> = Result<T, MessagingError>;
