//! WSP data unit encoding and decoding (WAP-230, section 8.4).
//!
//! WSP is the odd little binary-HTTP layer the WAP stack runs on; MMS
//! borrows its primitive grammar wholesale, which is why this crate cares.
//! The functions here encode and decode the wire primitives (uintvar,
//! short/long integers, text strings, value lengths, parameters, content
//! types, headers) over a [`ByteCursor`].
//!
//! Decoders are speculative-parse friendly: on a `DecodeError` the cursor is
//! rewound to where the call started, so a caller can just try the next
//! production. Any other error (notably `UnexpectedEnd`) propagates as-is.
//! Encoders append to a [`BytesMut`].
//!
//! Shift-sequence header encoding is deliberately not handled.

use crate::cursor::ByteCursor;
use crate::errors::{MessagingError, MessagingResult};
use bytes::{BufMut, BytesMut};
use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use std::fmt;

pub mod tables;

pub use self::tables::{ParamKind, Version};
use self::tables::*;

/// A decoded parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Str(String),
    Int(u64),
    Q(f32),
    Date(NaiveDateTime),
    None
}
impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParamValue::Str(s) => write!(f, "{}", s),
            ParamValue::Int(i) => write!(f, "{}", i),
            ParamValue::Q(q) => write!(f, "{}", q),
            ParamValue::Date(d) => write!(f, "{}", d),
            ParamValue::None => Ok(())
        }
    }
}
/// Parameters attached to a content type (or other parameterised value).
pub type Parameters = BTreeMap<String, ParamValue>;

/// A constrained-encoding value: a well-known code or a media string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstrainedValue {
    Code(u8),
    Media(String)
}

/// Run a decoder speculatively: if it fails with a `DecodeError`, the cursor
/// is rewound to where it was so the caller can try something else.
fn attempt<T>(cur: &mut ByteCursor,
              f: impl FnOnce(&mut ByteCursor) -> MessagingResult<T>) -> MessagingResult<T> {
    let cp = cur.checkpoint();
    match f(cur) {
        Ok(v) => Ok(v),
        Err(e) => {
            if e.is_decode_error() {
                cur.rewind(cp);
            }
            Err(e)
        }
    }
}

// RFC 2616 separators (minus the ones a token simply can't start with).
static TOKEN_SEPARATORS: [u8; 19] = [
    b'\t', b' ', b'"', b'(', b')', b',', b'/', b':', b';', b'<', b'=', b'>',
    b'?', b'@', b'[', b'\\', b']', b'{', b'}'
];
fn is_token_separator(b: u8) -> bool {
    TOKEN_SEPARATORS.contains(&b)
}

// ---------------------------------------------------------------------------
// decoders
// ---------------------------------------------------------------------------

/// One literal octet.
pub fn decode_uint8(cur: &mut ByteCursor) -> MessagingResult<u8> {
    cur.next()
}
/// Variable-length unsigned integer: big-endian, seven payload bits per
/// octet, MSB set on every octet but the last. At most five octets.
pub fn decode_uintvar(cur: &mut ByteCursor) -> MessagingResult<u64> {
    attempt(cur, |cur| {
        let mut value: u64 = 0;
        for i in 0.. {
            if i == 5 {
                return Err(MessagingError::decode("uintvar longer than 5 octets",
                                                  cur.position()));
            }
            let byte = cur.next()?;
            value = (value << 7) | (byte & 0x7F) as u64;
            if byte & 0x80 == 0 {
                break;
            }
        }
        Ok(value)
    })
}
/// Short-integer: one octet with the MSB set, value in the low seven bits.
pub fn decode_short_integer(cur: &mut ByteCursor) -> MessagingResult<u8> {
    let byte = cur.preview()?;
    if byte & 0x80 == 0 {
        cur.reset_preview();
        return Err(MessagingError::decode("not a valid short-integer: MSB not set",
                                          cur.position()));
    }
    Ok(cur.next()? & 0x7F)
}
/// Short-length: one octet in 0..=30.
pub fn decode_short_length(cur: &mut ByteCursor) -> MessagingResult<u8> {
    let byte = cur.preview()?;
    if byte > 30 {
        cur.reset_preview();
        return Err(MessagingError::decode(
            "not a valid short-length: should be in octet range 0-30",
            cur.position()));
    }
    cur.next()
}
/// Long-integer: a short-length, then that many big-endian payload octets.
pub fn decode_long_integer(cur: &mut ByteCursor) -> MessagingResult<u64> {
    attempt(cur, |cur| {
        let len = decode_short_length(cur)?;
        if len > 8 {
            return Err(MessagingError::decode(
                format!("long-integer of {} octets is wider than we can hold", len),
                cur.position()));
        }
        let mut value: u64 = 0;
        for _ in 0..len {
            value = (value << 8) | cur.next()? as u64;
        }
        Ok(value)
    })
}
/// Integer-value: short-integer or long-integer.
pub fn decode_integer_value(cur: &mut ByteCursor) -> MessagingResult<u64> {
    match decode_short_integer(cur) {
        Ok(v) => Ok(v as u64),
        Err(ref e) if e.is_decode_error() => decode_long_integer(cur),
        Err(e) => Err(e)
    }
}
/// Text-string: optionally quote-prefixed (0x7F), NUL-terminated bytes,
/// exposed byte-preservingly as Latin-1 text.
pub fn decode_text_string(cur: &mut ByteCursor) -> MessagingResult<String> {
    let mut byte = cur.next()?;
    let mut ret = String::new();
    if byte == 0x7F {
        byte = cur.next()?;
    }
    while byte != 0x00 {
        ret.push(byte as char);
        byte = cur.next()?;
    }
    Ok(ret)
}
/// Quoted-string: octet 34, then a NUL-terminated string (the closing quote
/// is not encoded).
pub fn decode_quoted_string(cur: &mut ByteCursor) -> MessagingResult<String> {
    let byte = cur.preview()?;
    if byte != b'"' {
        cur.reset_preview();
        return Err(MessagingError::decode(
            "invalid quoted string: must start with <octet 34>", cur.position()));
    }
    cur.next()?;
    decode_text_string(cur)
}
/// Token-text: a run of token characters, NUL-terminated.
pub fn decode_token_text(cur: &mut ByteCursor) -> MessagingResult<String> {
    let byte = cur.preview()?;
    if byte <= 31 || is_token_separator(byte) {
        cur.reset_preview();
        return Err(MessagingError::decode("invalid token", cur.position()));
    }
    let mut token = String::new();
    let mut byte = cur.next()?;
    while byte > 31 && !is_token_separator(byte) {
        token.push(byte as char);
        byte = cur.next()?;
    }
    Ok(token)
}
/// Extension-media: NUL-terminated TEXT whose first byte is >= 0x20 and not
/// 0x7F.
pub fn decode_extension_media(cur: &mut ByteCursor) -> MessagingResult<String> {
    let byte = cur.preview()?;
    if byte < 32 || byte == 127 {
        cur.reset_preview();
        return Err(MessagingError::decode(
            format!("invalid extension-media: TEXT starts with invalid character {:#04x}", byte),
            cur.position()));
    }
    let mut media = String::new();
    let mut byte = cur.next()?;
    while byte != 0x00 {
        media.push(byte as char);
        byte = cur.next()?;
    }
    Ok(media)
}
/// Value-length: a short-length, or a length-quote (0x1F) and a uintvar.
pub fn decode_value_length(cur: &mut ByteCursor) -> MessagingResult<u64> {
    match decode_short_length(cur) {
        Ok(v) => Ok(v as u64),
        Err(ref e) if e.is_decode_error() => {
            let byte = cur.preview()?;
            if byte == 31 {
                cur.next()?;
                decode_uintvar(cur)
            }
            else {
                cur.reset_preview();
                Err(MessagingError::decode(
                    "invalid value-length: not short-length, and no length-quote present",
                    cur.position()))
            }
        },
        Err(e) => Err(e)
    }
}
/// No-value: a single 0x00 octet, consumed.
pub fn decode_no_value(cur: &mut ByteCursor) -> MessagingResult<()> {
    let byte = cur.preview()?;
    if byte != 0x00 {
        cur.reset_preview();
        return Err(MessagingError::decode("expected no-value", cur.position()));
    }
    cur.next()?;
    Ok(())
}
/// Text-value: no-value, token-text or quoted-string.
pub fn decode_text_value(cur: &mut ByteCursor) -> MessagingResult<String> {
    if let Ok(token) = decode_token_text(cur) {
        return Ok(token);
    }
    if let Ok(quoted) = decode_quoted_string(cur) {
        return Ok(quoted);
    }
    decode_no_value(cur)?;
    Ok(String::new())
}
/// Q-value: a uintvar holding either `q*100 + 1` (two decimals) or
/// `q*1000 + 100` (three decimals).
pub fn decode_q_value(cur: &mut ByteCursor) -> MessagingResult<f32> {
    let v = decode_uintvar(cur)?;
    if v > 100 {
        Ok((v as f32 - 100.0) / 1000.0)
    }
    else {
        Ok((v as f32 - 1.0) / 100.0)
    }
}
/// Version-value: a short-integer packing major.minor (minor 15 = omitted),
/// or a text-string.
pub fn decode_version_value(cur: &mut ByteCursor) -> MessagingResult<String> {
    match decode_short_integer(cur) {
        Ok(byte) => {
            let major = (byte & 0x70) >> 4;
            let minor = byte & 0x0F;
            if minor == 15 {
                Ok(format!("{}", major))
            }
            else {
                Ok(format!("{}.{}", major, minor))
            }
        },
        Err(ref e) if e.is_decode_error() => decode_text_string(cur),
        Err(e) => Err(e)
    }
}
/// Date-value: a long-integer of seconds since 1970-01-01 UTC.
pub fn decode_date_value(cur: &mut ByteCursor) -> MessagingResult<NaiveDateTime> {
    attempt(cur, |cur| {
        let at = cur.position();
        let secs = decode_long_integer(cur)?;
        NaiveDateTime::from_timestamp_opt(secs as i64, 0)
            .ok_or_else(|| MessagingError::decode("date-value out of range", at))
    })
}
/// Delta-seconds-value: an integer-value.
pub fn decode_delta_seconds(cur: &mut ByteCursor) -> MessagingResult<u64> {
    decode_integer_value(cur)
}
/// Well-known-charset: 0x7F for "*", else an integer MIBEnum value. Codes
/// missing from our table come back as their decimal rendering.
pub fn decode_well_known_charset(cur: &mut ByteCursor) -> MessagingResult<String> {
    let byte = cur.preview()?;
    cur.reset_preview();
    if byte == 127 {
        cur.next()?;
        return Ok("*".into());
    }
    let code = decode_integer_value(cur)?;
    Ok(match charset_from_code(code) {
        Some(name) => name.into(),
        None => format!("{}", code)
    })
}
/// Constrained-encoding: short-integer or extension-media.
pub fn decode_constrained_encoding(cur: &mut ByteCursor) -> MessagingResult<ConstrainedValue> {
    if let Ok(v) = decode_short_integer(cur) {
        return Ok(ConstrainedValue::Code(v));
    }
    match decode_extension_media(cur) {
        Ok(media) => Ok(ConstrainedValue::Media(media)),
        Err(ref e) if e.is_decode_error() => Err(MessagingError::decode(
            "not a valid constrained-encoding sequence", cur.position())),
        Err(e) => Err(e)
    }
}
/// Constrained-media: a constrained-encoding whose integer form indexes the
/// well-known content type table.
pub fn decode_constrained_media(cur: &mut ByteCursor) -> MessagingResult<String> {
    attempt(cur, |cur| {
        let at = cur.position();
        match decode_constrained_encoding(cur)? {
            ConstrainedValue::Code(code) => content_type_from_code(code as u64)
                .map(String::from)
                .ok_or_else(|| MessagingError::decode(
                    "invalid constrained media: unassigned content type code", at)),
            ConstrainedValue::Media(media) => Ok(media)
        }
    })
}
/// Well-known-media: an integer-value indexing the content type table.
pub fn decode_well_known_media(cur: &mut ByteCursor) -> MessagingResult<String> {
    attempt(cur, |cur| {
        let at = cur.position();
        let code = decode_integer_value(cur)?;
        content_type_from_code(code)
            .map(String::from)
            .ok_or_else(|| MessagingError::decode(
                "invalid well-known media: unassigned content type code", at))
    })
}
/// Media-type: well-known-media or extension-media.
pub fn decode_media_type(cur: &mut ByteCursor) -> MessagingResult<String> {
    match decode_well_known_media(cur) {
        Ok(m) => Ok(m),
        Err(ref e) if e.is_decode_error() => decode_extension_media(cur),
        Err(e) => Err(e)
    }
}
/// Content-general-form: a value-length, then a media-type and parameters
/// occupying exactly that many bytes.
pub fn decode_content_general_form(cur: &mut ByteCursor)
        -> MessagingResult<(String, Parameters)> {
    attempt(cur, |cur| {
        let value_length = decode_value_length(cur)? as usize;
        let field = cur.take(value_length)?;
        let mut sub = ByteCursor::new(field);
        let media_type = decode_media_type(&mut sub)?;
        let mut parameters = Parameters::new();
        while !sub.is_empty() {
            match decode_parameter(&mut sub, Version::default()) {
                Ok((name, value)) => {
                    parameters.insert(name, value);
                },
                Err(MessagingError::UnexpectedEnd { .. }) => break,
                Err(e) => return Err(e)
            }
        }
        Ok((media_type, parameters))
    })
}
/// Content-type-value: constrained-media or content-general-form.
pub fn decode_content_type_value(cur: &mut ByteCursor)
        -> MessagingResult<(String, Parameters)> {
    match decode_constrained_media(cur) {
        Ok(media) => Ok((media, Parameters::new())),
        Err(ref e) if e.is_decode_error() => decode_content_general_form(cur),
        Err(e) => Err(e)
    }
}

/// Parameter: typed (well-known token plus typed value) or untyped
/// (token-text name plus integer or text value).
pub fn decode_parameter(cur: &mut ByteCursor, version: Version)
        -> MessagingResult<(String, ParamValue)> {
    match decode_typed_parameter(cur, version) {
        Ok(p) => Ok(p),
        Err(ref e) if e.is_decode_error() => decode_untyped_parameter(cur),
        Err(e) => Err(e)
    }
}
/// Typed-parameter: the well-known token dictates the value's encoding.
pub fn decode_typed_parameter(cur: &mut ByteCursor, version: Version)
        -> MessagingResult<(String, ParamValue)> {
    attempt(cur, |cur| {
        let at = cur.position();
        let code = decode_integer_value(cur)?;
        let def = if code <= 0xFF {
            well_known_parameter(code as u8, version)
        }
        else {
            Option::None
        };
        let def = def.ok_or_else(|| MessagingError::decode(
            "invalid well-known parameter token: not in table of assigned numbers", at))?;
        let value = match decode_param_kind(cur, def.kind, version) {
            Ok(v) => v,
            // Typed-value = Compact-value | Text-value: values that can't be
            // expressed with the expected encoding arrive as text
            Err(ref e) if e.is_decode_error() => ParamValue::Str(decode_text_value(cur)?),
            Err(e) => return Err(e)
        };
        Ok((def.name.to_string(), value))
    })
}
/// Untyped-parameter: a token-text name, then an integer or text value.
pub fn decode_untyped_parameter(cur: &mut ByteCursor)
        -> MessagingResult<(String, ParamValue)> {
    attempt(cur, |cur| {
        let token = decode_token_text(cur)?;
        let value = decode_untyped_value(cur)?;
        Ok((token, value))
    })
}
/// Untyped-value: integer-value or text-value.
pub fn decode_untyped_value(cur: &mut ByteCursor) -> MessagingResult<ParamValue> {
    match decode_integer_value(cur) {
        Ok(v) => Ok(ParamValue::Int(v)),
        Err(ref e) if e.is_decode_error() => Ok(ParamValue::Str(decode_text_value(cur)?)),
        Err(e) => Err(e)
    }
}
fn decode_param_kind(cur: &mut ByteCursor, kind: ParamKind, version: Version)
        -> MessagingResult<ParamValue> {
    Ok(match kind {
        ParamKind::QValue => ParamValue::Q(decode_q_value(cur)?),
        ParamKind::WellKnownCharset => ParamValue::Str(decode_well_known_charset(cur)?),
        ParamKind::VersionValue => ParamValue::Str(decode_version_value(cur)?),
        ParamKind::IntegerValue => ParamValue::Int(decode_integer_value(cur)?),
        ParamKind::TextString => ParamValue::Str(decode_text_string(cur)?),
        ParamKind::FieldName => ParamValue::Str(decode_field_name(cur, version)?),
        ParamKind::ShortInteger => ParamValue::Int(decode_short_integer(cur)? as u64),
        ParamKind::ConstrainedEncoding => match decode_constrained_encoding(cur)? {
            ConstrainedValue::Code(c) => match content_type_from_code(c as u64) {
                Some(name) => ParamValue::Str(name.into()),
                Option::None => ParamValue::Int(c as u64)
            },
            ConstrainedValue::Media(m) => ParamValue::Str(m)
        },
        ParamKind::TextValue => ParamValue::Str(decode_text_value(cur)?),
        ParamKind::DeltaSecondsValue => ParamValue::Int(decode_delta_seconds(cur)?),
        ParamKind::NoValue => {
            decode_no_value(cur)?;
            ParamValue::None
        },
        ParamKind::DateValue => ParamValue::Date(decode_date_value(cur)?)
    })
}
/// Field-name: a short-integer index into the header table, or a token.
pub fn decode_field_name(cur: &mut ByteCursor, version: Version) -> MessagingResult<String> {
    attempt(cur, |cur| match decode_short_integer(cur) {
        Ok(idx) => header_field_names(version).get(idx as usize)
            .map(|s| s.to_string())
            .ok_or_else(|| MessagingError::decode(
                "field-name index out of range", cur.position())),
        Err(ref e) if e.is_decode_error() => decode_token_text(cur),
        Err(e) => Err(e)
    })
}

/// Header: well-known (short-integer field name plus wap-value) or
/// application-specific (token name plus text-string value).
pub fn decode_header(cur: &mut ByteCursor, version: Version)
        -> MessagingResult<(String, String)> {
    match decode_well_known_header(cur, version) {
        Ok(h) => Ok(h),
        Err(ref e) if e.is_decode_error() => decode_application_header(cur),
        Err(e) => Err(e)
    }
}
/// Well-known-header. Most wap-values travel as plain text-strings; Accept
/// and Pragma get their own decodings.
pub fn decode_well_known_header(cur: &mut ByteCursor, version: Version)
        -> MessagingResult<(String, String)> {
    attempt(cur, |cur| {
        let at = cur.position();
        let idx = decode_short_integer(cur)? as usize;
        let name = header_field_names(version).get(idx)
            .ok_or_else(|| MessagingError::decode(
                format!("invalid header field value: {}", idx), at))?;
        let value = match *name {
            "Accept" => decode_accept_value(cur)?,
            "Pragma" => decode_pragma_value(cur)?,
            _ => decode_text_string(cur)?
        };
        Ok((name.to_string(), value))
    })
}
/// Application-header: token-text name (with a text-string fallback for the
/// brute-force crowd), then a text-string value.
pub fn decode_application_header(cur: &mut ByteCursor)
        -> MessagingResult<(String, String)> {
    let name = match decode_token_text(cur) {
        Ok(n) => n,
        Err(ref e) if e.is_decode_error() => decode_text_string(cur)?,
        Err(e) => return Err(e)
    };
    let value = decode_text_string(cur)?;
    Ok((name, value))
}
/// Accept-value: constrained-media, or the general form. Accept-parameters
/// are consumed (the value-length says how far) but not retained.
pub fn decode_accept_value(cur: &mut ByteCursor) -> MessagingResult<String> {
    match decode_constrained_media(cur) {
        Ok(m) => Ok(m),
        Err(ref e) if e.is_decode_error() => attempt(cur, |cur| {
            let value_length = decode_value_length(cur)? as usize;
            let field = cur.take(value_length)?;
            let mut sub = ByteCursor::new(field);
            decode_media_type(&mut sub)
        }),
        Err(e) => Err(e)
    }
}
/// Pragma-value: No-cache (0x80), or a value-length and a parameter,
/// rendered back to `name=value` text.
pub fn decode_pragma_value(cur: &mut ByteCursor) -> MessagingResult<String> {
    let byte = cur.preview()?;
    if byte == 0x80 {
        cur.next()?;
        return Ok("No-cache".into());
    }
    cur.reset_preview();
    attempt(cur, |cur| {
        let _value_length = decode_value_length(cur)?;
        let (name, value) = decode_parameter(cur, Version::default())?;
        Ok(format!("{}={}", name, value))
    })
}

// ---------------------------------------------------------------------------
// encoders
// ---------------------------------------------------------------------------

/// One literal octet.
pub fn encode_uint8(value: u8, buf: &mut BytesMut) {
    buf.put_u8(value);
}
/// Minimal big-endian uintvar.
pub fn encode_uintvar(value: u64, buf: &mut BytesMut) {
    let mut groups = [0u8; 10];
    let mut n = 0;
    let mut v = value;
    loop {
        groups[n] = (v & 0x7F) as u8;
        v >>= 7;
        n += 1;
        if v == 0 {
            break;
        }
    }
    for i in (0..n).rev() {
        buf.put_u8(groups[i] | if i > 0 { 0x80 } else { 0 });
    }
}
pub fn encode_short_integer(value: u64, buf: &mut BytesMut) -> MessagingResult<()> {
    if value > 127 {
        return Err(MessagingError::encode(
            format!("short-integer value must be in range 0-127: {}", value)));
    }
    buf.put_u8(value as u8 | 0x80);
    Ok(())
}
pub fn encode_short_length(length: u64, buf: &mut BytesMut) -> MessagingResult<()> {
    if length > 30 {
        return Err(MessagingError::encode(
            "cannot encode short-length; length should be in the 0-30 range"));
    }
    buf.put_u8(length as u8);
    Ok(())
}
/// Long-integer: short-length, then minimal big-endian payload octets.
pub fn encode_long_integer(value: u64, buf: &mut BytesMut) {
    let mut payload = [0u8; 8];
    let mut n = 0;
    let mut v = value;
    while v > 0 {
        payload[n] = (v & 0xFF) as u8;
        v >>= 8;
        n += 1;
    }
    buf.put_u8(n as u8);
    for i in (0..n).rev() {
        buf.put_u8(payload[i]);
    }
}
/// Integer-value: short form when it fits, long form otherwise.
pub fn encode_integer_value(value: u64, buf: &mut BytesMut) {
    if encode_short_integer(value, buf).is_err() {
        encode_long_integer(value, buf);
    }
}
/// Text-string: NUL-terminated Latin-1, quote-prefixed when the first byte
/// would be mistaken for a binary encoding.
pub fn encode_text_string(text: &str, buf: &mut BytesMut) -> MessagingResult<()> {
    let mut first = true;
    for c in text.chars() {
        let b = c as u32;
        if b > 0xFF {
            return Err(MessagingError::encode(
                format!("text-string cannot carry {:?}", c)));
        }
        if first && b >= 0x80 {
            buf.put_u8(0x7F);
        }
        first = false;
        buf.put_u8(b as u8);
    }
    buf.put_u8(0x00);
    Ok(())
}
/// Token-text: like a text-string, but separators are a hard error.
pub fn encode_token_text(text: &str, buf: &mut BytesMut) -> MessagingResult<()> {
    for c in text.chars() {
        let b = c as u32;
        if b <= 31 || b > 0xFF || is_token_separator(b as u8) {
            return Err(MessagingError::encode(
                format!("char {:?} in text; cannot encode as token-text", c)));
        }
    }
    encode_text_string(text, buf)
}
/// Extension-media: a text-string whose first byte is >= 0x20 and not 0x7F.
pub fn encode_extension_media(media: &str, buf: &mut BytesMut) -> MessagingResult<()> {
    match media.chars().next() {
        Some(c) if (c as u32) >= 32 && (c as u32) != 127 => {},
        _ => {
            return Err(MessagingError::encode(
                "invalid extension-media: TEXT starts with invalid character"));
        }
    }
    encode_text_string(media, buf)
}
/// Value-length: short form when it fits, length-quote plus uintvar
/// otherwise.
pub fn encode_value_length(length: u64, buf: &mut BytesMut) {
    if encode_short_length(length, buf).is_err() {
        buf.put_u8(31);
        encode_uintvar(length, buf);
    }
}
pub fn encode_no_value(buf: &mut BytesMut) {
    buf.put_u8(0x00);
}
/// Q-value, per the restricted uintvar encoding.
pub fn encode_q_value(q: f32, buf: &mut BytesMut) -> MessagingResult<()> {
    if !(0.0..1.0).contains(&q) {
        return Err(MessagingError::encode(
            format!("quality factor out of range: {}", q)));
    }
    let milli = (q * 1000.0).round() as u64;
    if milli % 10 == 0 {
        encode_uintvar(milli / 10 + 1, buf);
    }
    else {
        encode_uintvar(milli + 100, buf);
    }
    Ok(())
}
/// Version-value: short form for `major[.minor]` in range, text otherwise.
pub fn encode_version_value(version: &str, buf: &mut BytesMut) -> MessagingResult<()> {
    let mut split = version.splitn(2, '.');
    let major = split.next().and_then(|s| s.parse::<u8>().ok());
    let minor = match split.next() {
        Some(s) => s.parse::<u8>().ok(),
        Option::None => Some(15)
    };
    match (major, minor) {
        (Some(major), Some(minor))
                if (1..=7).contains(&major) && (minor <= 14 || minor == 15) => {
            encode_short_integer(((major << 4) | minor) as u64, buf)
        },
        _ => encode_text_string(version, buf)
    }
}
/// Date-value: seconds since the epoch as a long-integer.
pub fn encode_date_value(when: NaiveDateTime, buf: &mut BytesMut) {
    encode_long_integer(when.timestamp() as u64, buf);
}
/// Well-known-charset: "*" or a MIBEnum integer-value.
pub fn encode_well_known_charset(charset: &str, buf: &mut BytesMut) -> MessagingResult<()> {
    if charset == "*" {
        buf.put_u8(127);
        return Ok(());
    }
    match charset_code(charset) {
        Some(code) => {
            encode_integer_value(code as u64, buf);
            Ok(())
        },
        Option::None => Err(MessagingError::encode(
            format!("unknown well-known charset {:?}", charset)))
    }
}
/// Media-type: a short-integer for well-known content types, otherwise
/// extension-media.
pub fn encode_media_type(content_type: &str, buf: &mut BytesMut) -> MessagingResult<()> {
    match content_type_code(content_type) {
        Some(code) => encode_short_integer(code as u64, buf),
        Option::None => encode_extension_media(content_type, buf)
    }
}
/// Content-type-value: constrained form when parameterless, general form
/// otherwise.
pub fn encode_content_type_value(content_type: &str, parameters: &Parameters,
                                 buf: &mut BytesMut) -> MessagingResult<()> {
    if parameters.is_empty() {
        return encode_media_type(content_type, buf);
    }
    let mut general = BytesMut::new();
    encode_media_type(content_type, &mut general)?;
    for (name, value) in parameters {
        encode_parameter(name, value, Version::default(), &mut general)?;
    }
    encode_value_length(general.len() as u64, buf);
    buf.extend_from_slice(&general);
    Ok(())
}
/// Parameter: typed form when the name has an assigned number the version
/// admits and the value fits its expected encoding; untyped otherwise.
pub fn encode_parameter(name: &str, value: &ParamValue, version: Version,
                        buf: &mut BytesMut) -> MessagingResult<()> {
    if let Some(def) = parameter_code(name, version) {
        let mut typed = BytesMut::new();
        encode_short_integer(def.code as u64, &mut typed)?;
        if encode_param_kind(def.kind, value, version, &mut typed).is_ok() {
            buf.extend_from_slice(&typed);
            return Ok(());
        }
    }
    encode_token_text(name, buf)?;
    match value {
        ParamValue::Int(i) => {
            encode_integer_value(*i, buf);
            Ok(())
        },
        ParamValue::Str(s) => encode_text_string(s, buf),
        other => Err(MessagingError::encode(
            format!("cannot encode {:?} as an untyped parameter value", other)))
    }
}
fn encode_param_kind(kind: ParamKind, value: &ParamValue, version: Version,
                     buf: &mut BytesMut) -> MessagingResult<()> {
    match (kind, value) {
        (ParamKind::QValue, ParamValue::Q(q)) => encode_q_value(*q, buf),
        (ParamKind::WellKnownCharset, ParamValue::Str(s)) => encode_well_known_charset(s, buf),
        (ParamKind::VersionValue, ParamValue::Str(s)) => encode_version_value(s, buf),
        (ParamKind::IntegerValue, ParamValue::Int(i))
        | (ParamKind::DeltaSecondsValue, ParamValue::Int(i)) => {
            encode_integer_value(*i, buf);
            Ok(())
        },
        (ParamKind::TextString, ParamValue::Str(s)) => encode_text_string(s, buf),
        (ParamKind::ShortInteger, ParamValue::Int(i)) => encode_short_integer(*i, buf),
        (ParamKind::ConstrainedEncoding, ParamValue::Str(s)) => match content_type_code(s) {
            Some(code) => encode_short_integer(code as u64, buf),
            Option::None => encode_extension_media(s, buf)
        },
        (ParamKind::ConstrainedEncoding, ParamValue::Int(i)) => encode_short_integer(*i, buf),
        (ParamKind::TextValue, ParamValue::Str(s)) => encode_text_string(s, buf),
        (ParamKind::NoValue, ParamValue::None) => {
            encode_no_value(buf);
            Ok(())
        },
        (ParamKind::DateValue, ParamValue::Date(d)) => {
            encode_date_value(*d, buf);
            Ok(())
        },
        (ParamKind::FieldName, ParamValue::Str(s)) => {
            match header_field_names(version).iter().position(|n| n == s) {
                Some(idx) => encode_short_integer(idx as u64, buf),
                Option::None => encode_token_text(s, buf)
            }
        },
        (kind, value) => Err(MessagingError::encode(
            format!("parameter value {:?} does not fit expected encoding {:?}", value, kind)))
    }
}
/// Header: well-known (short-integer name) where the table allows, else an
/// application header. Values go out as text-strings, bar Accept.
pub fn encode_header(name: &str, value: &str, version: Version,
                     buf: &mut BytesMut) -> MessagingResult<()> {
    match header_field_names(version).iter().position(|n| *n == name) {
        Some(idx) => encode_short_integer(idx as u64, buf)?,
        Option::None => encode_token_text(name, buf)?
    }
    if name == "Accept" {
        encode_accept_value(value, buf)
    }
    else {
        encode_text_string(value, buf)
    }
}
/// Accept-value, encoded as constrained-media (both the short-integer and
/// extension-media shapes are constrained; Accept-parameters are a
/// non-goal, so the general form is never needed).
pub fn encode_accept_value(value: &str, buf: &mut BytesMut) -> MessagingResult<()> {
    encode_media_type(value, buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cursor(data: &[u8]) -> ByteCursor {
        ByteCursor::new(data)
    }

    #[test]
    fn uintvar_roundtrip_small() {
        for n in 0..=255u64 {
            let mut buf = BytesMut::new();
            encode_uintvar(n, &mut buf);
            // minimality: one octet up to 127, two after
            assert_eq!(buf.len(), if n < 128 { 1 } else { 2 });
            assert_ne!(buf[0], 0x80, "leading all-zero continuation octet");
            let mut cur = cursor(&buf);
            assert_eq!(decode_uintvar(&mut cur).unwrap(), n);
            assert!(cur.is_empty());
        }
    }
    #[test]
    fn uintvar_roundtrip_large() {
        for n in [0x80, 0x3FFF, 0x4000, 0x1F_FFFF, 0x0FFF_FFFF, 0x7_FFFF_FFFF].iter() {
            let mut buf = BytesMut::new();
            encode_uintvar(*n, &mut buf);
            let mut cur = cursor(&buf);
            assert_eq!(decode_uintvar(&mut cur).unwrap(), *n);
        }
    }
    #[test]
    fn uintvar_rejects_overlong() {
        let mut cur = cursor(&[0x80, 0x80, 0x80, 0x80, 0x80, 0x01]);
        assert!(decode_uintvar(&mut cur).is_err());
        assert_eq!(cur.position(), 0);
    }
    #[test]
    fn short_integer_roundtrip() {
        for n in 0..=127u64 {
            let mut buf = BytesMut::new();
            encode_short_integer(n, &mut buf).unwrap();
            assert_eq!(decode_short_integer(&mut cursor(&buf)).unwrap() as u64, n);
        }
        let mut buf = BytesMut::new();
        assert!(encode_short_integer(128, &mut buf).is_err());
        // MSB clear isn't a short integer, and the cursor must not move
        let mut cur = cursor(&[0x7F]);
        assert!(decode_short_integer(&mut cur).is_err());
        assert_eq!(cur.position(), 0);
    }
    #[test]
    fn long_integer_roundtrip() {
        for n in [0u64, 1, 255, 256, 0x7400, 72000, 0xFFFF_FFFF, u64::max_value()].iter() {
            let mut buf = BytesMut::new();
            encode_long_integer(*n, &mut buf);
            assert_eq!(decode_long_integer(&mut cursor(&buf)).unwrap(), *n);
        }
        // 29696 encodes as two payload octets
        let mut buf = BytesMut::new();
        encode_long_integer(29696, &mut buf);
        assert_eq!(&buf[..], &[0x02, 0x74, 0x00]);
    }
    #[test]
    fn integer_value_picks_short_form() {
        let mut buf = BytesMut::new();
        encode_integer_value(100, &mut buf);
        assert_eq!(&buf[..], &[0x80 | 100]);
        let mut buf = BytesMut::new();
        encode_integer_value(200, &mut buf);
        assert_eq!(&buf[..], &[0x01, 200]);
    }
    #[test]
    fn text_string_roundtrip() {
        let mut buf = BytesMut::new();
        encode_text_string("hello", &mut buf).unwrap();
        assert_eq!(&buf[..], b"hello\0");
        assert_eq!(decode_text_string(&mut cursor(&buf)).unwrap(), "hello");
    }
    #[test]
    fn text_string_quotes_high_first_byte() {
        let mut buf = BytesMut::new();
        encode_text_string("\u{00E9}clair", &mut buf).unwrap();
        assert_eq!(buf[0], 0x7F);
        assert_eq!(buf[1], 0xE9);
        assert_eq!(decode_text_string(&mut cursor(&buf)).unwrap(), "éclair");
    }
    #[test]
    fn quoted_string() {
        let mut cur = cursor(b"\"quoted\0");
        assert_eq!(decode_quoted_string(&mut cur).unwrap(), "quoted");
        let mut cur = cursor(b"plain\0");
        assert!(decode_quoted_string(&mut cur).is_err());
        assert_eq!(cur.position(), 0);
    }
    #[test]
    fn token_text_rejects_separators() {
        let mut buf = BytesMut::new();
        assert!(encode_token_text("Content-ID", &mut buf).is_ok());
        let mut buf = BytesMut::new();
        assert!(encode_token_text("not a token", &mut buf).is_err());
        let mut cur = cursor(b"(paren\0");
        assert!(decode_token_text(&mut cur).is_err());
        assert_eq!(cur.position(), 0);
    }
    #[test]
    fn value_length_both_forms() {
        let mut buf = BytesMut::new();
        encode_value_length(12, &mut buf);
        assert_eq!(&buf[..], &[12]);
        assert_eq!(decode_value_length(&mut cursor(&buf)).unwrap(), 12);

        let mut buf = BytesMut::new();
        encode_value_length(200, &mut buf);
        assert_eq!(buf[0], 31);
        assert_eq!(decode_value_length(&mut cursor(&buf)).unwrap(), 200);
    }
    #[test]
    fn no_value_consumes_one_zero_byte() {
        let mut cur = cursor(&[0x00, 0x42]);
        decode_no_value(&mut cur).unwrap();
        assert_eq!(cur.position(), 1);
        let mut cur = cursor(&[0x42]);
        assert!(decode_no_value(&mut cur).is_err());
        assert_eq!(cur.position(), 0);
    }
    #[test]
    fn q_value_roundtrip() {
        for (q, wire) in [(0.1f32, vec![0x0B]), (0.99, vec![0x64]),
                          (0.333, vec![0x83, 0x31])].iter() {
            let mut buf = BytesMut::new();
            encode_q_value(*q, &mut buf).unwrap();
            assert_eq!(&buf[..], &wire[..]);
            let got = decode_q_value(&mut cursor(&buf)).unwrap();
            assert!((got - q).abs() < 0.0005, "{} vs {}", got, q);
        }
    }
    #[test]
    fn version_value_roundtrip() {
        let mut buf = BytesMut::new();
        encode_version_value("1.0", &mut buf).unwrap();
        assert_eq!(&buf[..], &[0x90]);
        assert_eq!(decode_version_value(&mut cursor(&buf)).unwrap(), "1.0");

        let mut buf = BytesMut::new();
        encode_version_value("1.2.4", &mut buf).unwrap();
        assert_eq!(decode_version_value(&mut cursor(&buf)).unwrap(), "1.2.4");

        // minor omitted
        let mut buf = BytesMut::new();
        encode_version_value("2", &mut buf).unwrap();
        assert_eq!(&buf[..], &[0x80 | 0x2F]);
        assert_eq!(decode_version_value(&mut cursor(&buf)).unwrap(), "2");
    }
    #[test]
    fn date_value_roundtrip() {
        let when = NaiveDateTime::from_timestamp_opt(1_040_419_616, 0).unwrap();
        let mut buf = BytesMut::new();
        encode_date_value(when, &mut buf);
        assert_eq!(decode_date_value(&mut cursor(&buf)).unwrap(), when);
    }
    #[test]
    fn charset_decoding() {
        let mut buf = BytesMut::new();
        encode_well_known_charset("utf-8", &mut buf).unwrap();
        assert_eq!(&buf[..], &[0x80 | 0x6A]);
        assert_eq!(decode_well_known_charset(&mut cursor(&buf)).unwrap(), "utf-8");

        let mut buf = BytesMut::new();
        encode_well_known_charset("iso-10646-ucs-2", &mut buf).unwrap();
        assert_eq!(decode_well_known_charset(&mut cursor(&buf)).unwrap(),
                   "iso-10646-ucs-2");

        assert_eq!(decode_well_known_charset(&mut cursor(&[127])).unwrap(), "*");
        // unknown codes come back numeric
        assert_eq!(decode_well_known_charset(&mut cursor(&[0x80 | 0x42])).unwrap(), "66");
    }
    #[test]
    fn constrained_media() {
        let mut cur = cursor(&[0x80 | 0x3E]);
        assert_eq!(decode_constrained_media(&mut cur).unwrap(),
                   "application/vnd.wap.mms-message");
        let mut cur = cursor(b"application/smil\0");
        assert_eq!(decode_constrained_media(&mut cur).unwrap(), "application/smil");
    }
    #[test]
    fn content_type_constrained_roundtrip() {
        let mut buf = BytesMut::new();
        encode_content_type_value("text/plain", &Parameters::new(), &mut buf).unwrap();
        assert_eq!(&buf[..], &[0x80 | 0x03]);
        let (ct, params) = decode_content_type_value(&mut cursor(&buf)).unwrap();
        assert_eq!(ct, "text/plain");
        assert!(params.is_empty());
    }
    #[test]
    fn content_type_general_form_roundtrip() {
        let mut params = Parameters::new();
        params.insert("Start".into(), ParamValue::Str("<0000>".into()));
        params.insert("Type".into(), ParamValue::Str("application/smil".into()));
        let mut buf = BytesMut::new();
        encode_content_type_value("application/vnd.wap.multipart.related",
                                  &params, &mut buf).unwrap();
        let (ct, got) = decode_content_type_value(&mut cursor(&buf)).unwrap();
        assert_eq!(ct, "application/vnd.wap.multipart.related");
        assert_eq!(got, params);
    }
    #[test]
    fn untyped_parameter_roundtrip() {
        // lowercase "name" has no assigned number, so it goes untyped
        let mut buf = BytesMut::new();
        encode_parameter("name", &ParamValue::Str("gnu-head.jpg".into()),
                         Version::default(), &mut buf).unwrap();
        let (name, value) = decode_parameter(&mut cursor(&buf), Version::default()).unwrap();
        assert_eq!(name, "name");
        assert_eq!(value, ParamValue::Str("gnu-head.jpg".into()));
    }
    #[test]
    fn charset_parameter_roundtrip() {
        let mut buf = BytesMut::new();
        encode_parameter("Charset", &ParamValue::Str("us-ascii".into()),
                         Version::default(), &mut buf).unwrap();
        assert_eq!(&buf[..], &[0x81, 0x83]);
        let (name, value) = decode_parameter(&mut cursor(&buf), Version::default()).unwrap();
        assert_eq!(name, "Charset");
        assert_eq!(value, ParamValue::Str("us-ascii".into()));
    }
    #[test]
    fn well_known_header_roundtrip() {
        let mut buf = BytesMut::new();
        encode_header("Content-Location", "btlogo.gif", Version::default(), &mut buf).unwrap();
        assert_eq!(buf[0], 0x80 | 0x0E);
        let (name, value) = decode_header(&mut cursor(&buf), Version::default()).unwrap();
        assert_eq!(name, "Content-Location");
        assert_eq!(value, "btlogo.gif");
    }
    #[test]
    fn application_header_roundtrip() {
        // Content-ID has no assigned number under 1.2
        let mut buf = BytesMut::new();
        encode_header("Content-ID", "<0000>", Version::default(), &mut buf).unwrap();
        let (name, value) = decode_header(&mut cursor(&buf), Version::default()).unwrap();
        assert_eq!(name, "Content-ID");
        assert_eq!(value, "<0000>");
    }
    #[test]
    fn accept_header() {
        let mut buf = BytesMut::new();
        encode_header("Accept", "image/gif", Version::default(), &mut buf).unwrap();
        assert_eq!(&buf[..], &[0x80, 0x80 | 0x1D]);
        let (name, value) = decode_header(&mut cursor(&buf), Version::default()).unwrap();
        assert_eq!(name, "Accept");
        assert_eq!(value, "image/gif");
    }
    #[test]
    fn pragma_no_cache() {
        let mut cur = cursor(&[0x80 | 0x1F, 0x80]);
        let (name, value) = decode_header(&mut cur, Version::default()).unwrap();
        assert_eq!(name, "Pragma");
        assert_eq!(value, "No-cache");
    }
    #[test]
    fn decode_error_rewinds_cursor() {
        // 0x42 is neither a short integer nor a valid anything much
        let data = [0x42, 0x43];
        let mut cur = cursor(&data);
        assert!(decode_short_integer(&mut cur).is_err());
        assert!(decode_long_integer(&mut cur).is_err());
        assert_eq!(cur.position(), 0);
        assert_eq!(cur.next().unwrap(), 0x42);
    }
}
