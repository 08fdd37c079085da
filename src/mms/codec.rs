//! MMS PDU encoding and decoding (WAP-209), layered on the WSP primitives.
//!
//! An MMS PDU is a run of headers (each a well-known field code and a value
//! whose encoding the field dictates), ending at the Content-Type header,
//! followed by a multipart body: a uintvar part count, then per part a
//! headers length, a data length, the part's Content-Type plus headers, and
//! the raw data.
//!
//! The encoder emits Message-Type, Transaction-Id and MMS-Version first (in
//! that order) and Content-Type last; the decoder accepts them in any
//! order, because broken producers abound.

use crate::cursor::ByteCursor;
use crate::errors::{MessagingError, MessagingResult};
use crate::mms::{DataPart, MmsMessage, MmsValue};
use crate::wsp::{self, Parameters, Version};
use bytes::{BufMut, Bytes, BytesMut};
use log::{debug, trace};

/// How each well-known MMS field's value travels on the wire.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum FieldKind {
    EncodedString,
    Uri,
    ContentType,
    Date,
    Boolean,
    /// Value-length, then an absolute/relative token and a date or delta.
    TimeToken,
    From,
    MessageClass,
    TextString,
    MessageType,
    VersionValue,
    LongInteger,
    Priority,
    ResponseStatus,
    SenderVisibility,
    Status
}

/// MMS field name assignments (WAP-209, section 7.3).
static MMS_FIELD_NAMES: [(u8, &str, FieldKind); 24] = [
    (0x01, "Bcc", FieldKind::EncodedString),
    (0x02, "Cc", FieldKind::EncodedString),
    (0x03, "Content-Location", FieldKind::Uri),
    (0x04, "Content-Type", FieldKind::ContentType),
    (0x05, "Date", FieldKind::Date),
    (0x06, "Delivery-Report", FieldKind::Boolean),
    (0x07, "Delivery-Time", FieldKind::TimeToken),
    (0x08, "Expiry", FieldKind::TimeToken),
    (0x09, "From", FieldKind::From),
    (0x0A, "Message-Class", FieldKind::MessageClass),
    (0x0B, "Message-ID", FieldKind::TextString),
    (0x0C, "Message-Type", FieldKind::MessageType),
    (0x0D, "MMS-Version", FieldKind::VersionValue),
    (0x0E, "Message-Size", FieldKind::LongInteger),
    (0x0F, "Priority", FieldKind::Priority),
    (0x10, "Read-Reply", FieldKind::Boolean),
    (0x11, "Report-Allowed", FieldKind::Boolean),
    (0x12, "Response-Status", FieldKind::ResponseStatus),
    (0x13, "Response-Text", FieldKind::EncodedString),
    (0x14, "Sender-Visibility", FieldKind::SenderVisibility),
    (0x15, "Status", FieldKind::Status),
    (0x16, "Subject", FieldKind::EncodedString),
    (0x17, "To", FieldKind::EncodedString),
    (0x18, "Transaction-Id", FieldKind::TextString)
];
static MESSAGE_TYPES: [(u8, &str); 7] = [
    (0x80, "m-send-req"),
    (0x81, "m-send-conf"),
    (0x82, "m-notification-ind"),
    (0x83, "m-notifyresp-ind"),
    (0x84, "m-retrieve-conf"),
    (0x85, "m-acknowledge-ind"),
    (0x86, "m-delivery-ind")
];
static STATUS_VALUES: [(u8, &str); 5] = [
    (0x80, "Expired"),
    (0x81, "Retrieved"),
    (0x82, "Rejected"),
    (0x83, "Deferred"),
    (0x84, "Unrecognised")
];
static RESPONSE_STATUS_VALUES: [(u8, &str); 9] = [
    (0x80, "Ok"),
    (0x81, "Error-unspecified"),
    (0x82, "Error-service-denied"),
    (0x83, "Error-message-format-corrupt"),
    (0x84, "Error-sending-address-unresolved"),
    (0x85, "Error-message-not-found"),
    (0x86, "Error-network-problem"),
    (0x87, "Error-content-not-accepted"),
    (0x88, "Error-unsupported-message")
];
static CLASS_IDENTIFIERS: [(u8, &str); 4] = [
    (0x80, "Personal"),
    (0x81, "Advertisement"),
    (0x82, "Informational"),
    (0x83, "Auto")
];
static PRIORITIES: [(u8, &str); 3] = [
    (0x80, "Low"),
    (0x81, "Normal"),
    (0x82, "High")
];

fn name_of(table: &'static [(u8, &'static str)], code: u8) -> Option<&'static str> {
    table.iter().find(|&&(c, _)| c == code).map(|&(_, n)| n)
}
fn code_of(table: &'static [(u8, &'static str)], name: &str) -> Option<u8> {
    table.iter().find(|&&(_, n)| n == name).map(|&(c, _)| c)
}
fn field_by_code(code: u8) -> Option<&'static (u8, &'static str, FieldKind)> {
    MMS_FIELD_NAMES.iter().find(|&&(c, _, _)| c == code)
}
fn field_by_name(name: &str) -> Option<&'static (u8, &'static str, FieldKind)> {
    MMS_FIELD_NAMES.iter().find(|&&(_, n, _)| n == name)
}

// ---------------------------------------------------------------------------
// decoding
// ---------------------------------------------------------------------------

/// Decode an MMS PDU (headers and multipart body) from bytes.
pub fn decode_mms(data: &[u8]) -> MessagingResult<MmsMessage> {
    let mut cur = ByteCursor::new(data);
    let mut msg = MmsMessage::new();
    msg.headers.clear();

    loop {
        match decode_header(&mut cur) {
            Ok((name, value)) => {
                trace!("mms header {} = {:?}", name, value);
                let content_type_found = name == "Content-Type";
                msg.headers.insert(name, value);
                if content_type_found {
                    break;
                }
            },
            Err(MessagingError::UnexpectedEnd { .. }) => break,
            Err(e) => return Err(e)
        }
    }
    decode_body(&mut cur, &mut msg).map_err(|e| match e {
        MessagingError::UnexpectedEnd { offset } => {
            MessagingError::decode("MMS body part runs past end of input", offset)
        },
        e => e
    })?;
    Ok(msg)
}

/// Decode one header: an MMS well-known header, or any WSP header.
fn decode_header(cur: &mut ByteCursor) -> MessagingResult<(String, MmsValue)> {
    match decode_mms_header(cur) {
        Ok(h) => Ok(h),
        Err(ref e) if e.is_decode_error() => {
            let (name, value) = wsp::decode_header(cur, Version::default())?;
            Ok((name, MmsValue::Str(value)))
        },
        Err(e) => Err(e)
    }
}
fn decode_mms_header(cur: &mut ByteCursor) -> MessagingResult<(String, MmsValue)> {
    let cp = cur.checkpoint();
    let byte = cur.preview()?;
    cur.reset_preview();
    let def = if byte & 0x80 != 0 {
        field_by_code(byte & 0x7F)
    }
    else {
        None
    };
    let &(_, name, kind) = match def {
        Some(d) => d,
        None => {
            return Err(MessagingError::decode(
                "invalid MMS header: could not decode MMS field name", cur.position()));
        }
    };
    cur.next()?;
    match decode_field_kind(cur, kind) {
        Ok(value) => Ok((name.to_string(), value)),
        Err(e) => {
            if e.is_decode_error() {
                cur.rewind(cp);
            }
            Err(e)
        }
    }
}
fn decode_field_kind(cur: &mut ByteCursor, kind: FieldKind) -> MessagingResult<MmsValue> {
    Ok(match kind {
        FieldKind::EncodedString => MmsValue::Str(decode_encoded_string_value(cur)?),
        FieldKind::Uri | FieldKind::TextString => MmsValue::Str(wsp::decode_text_string(cur)?),
        FieldKind::ContentType => {
            let (ct, params) = wsp::decode_content_type_value(cur)?;
            MmsValue::ContentType(ct, params)
        },
        FieldKind::Date => MmsValue::Date(wsp::decode_date_value(cur)?),
        FieldKind::Boolean => {
            let byte = cur.preview()?;
            if byte != 128 && byte != 129 {
                cur.reset_preview();
                return Err(MessagingError::decode(
                    format!("error parsing boolean value for byte {:#04x}", byte),
                    cur.position()));
            }
            MmsValue::Bool(cur.next()? == 128)
        },
        FieldKind::TimeToken => {
            let _value_length = wsp::decode_value_length(cur)?;
            let at = cur.position();
            match cur.next()? {
                0x80 => MmsValue::Date(wsp::decode_date_value(cur)?),
                0x81 => MmsValue::Int(wsp::decode_delta_seconds(cur)?),
                token => {
                    return Err(MessagingError::decode(
                        format!("time token value is undefined ({:#04x}), \
                                 should be either 128 or 129", token), at));
                }
            }
        },
        FieldKind::From => {
            let _value_length = wsp::decode_value_length(cur)?;
            if cur.next()? == 129 {
                // Insert-address-token
                MmsValue::Str("<not inserted>".into())
            }
            else {
                MmsValue::Str(decode_encoded_string_value(cur)?)
            }
        },
        FieldKind::MessageClass => {
            let byte = cur.preview()?;
            cur.reset_preview();
            match name_of(&CLASS_IDENTIFIERS, byte) {
                Some(name) => {
                    cur.next()?;
                    MmsValue::Str(name.into())
                },
                None => MmsValue::Str(wsp::decode_token_text(cur)?)
            }
        },
        FieldKind::MessageType => {
            let byte = cur.preview()?;
            cur.reset_preview();
            match name_of(&MESSAGE_TYPES, byte) {
                Some(name) => {
                    cur.next()?;
                    MmsValue::Str(name.into())
                },
                None => MmsValue::Str("<unknown>".into())
            }
        },
        FieldKind::VersionValue => MmsValue::Str(wsp::decode_version_value(cur)?),
        FieldKind::LongInteger => MmsValue::Int(wsp::decode_long_integer(cur)?),
        FieldKind::Priority => {
            let byte = cur.preview()?;
            cur.reset_preview();
            match name_of(&PRIORITIES, byte) {
                Some(name) => {
                    cur.next()?;
                    MmsValue::Str(name.into())
                },
                None => {
                    return Err(MessagingError::decode(
                        format!("error parsing priority value for byte {:#04x}", byte),
                        cur.position()));
                }
            }
        },
        FieldKind::ResponseStatus => {
            let byte = cur.next()?;
            MmsValue::Str(name_of(&RESPONSE_STATUS_VALUES, byte)
                .unwrap_or("Error-unspecified").into())
        },
        FieldKind::SenderVisibility => {
            let byte = cur.preview()?;
            if byte != 128 && byte != 129 {
                cur.reset_preview();
                return Err(MessagingError::decode(
                    format!("error parsing sender visibility value for byte {:#04x}", byte),
                    cur.position()));
            }
            MmsValue::Str(if cur.next()? == 128 { "Hide" } else { "Show" }.into())
        },
        FieldKind::Status => {
            let byte = cur.next()?;
            MmsValue::Str(name_of(&STATUS_VALUES, byte).unwrap_or("Unrecognised").into())
        }
    })
}
/// Encoded-string-value: a plain text-string, or value-length + charset +
/// text-string. The bytes come back as Latin-1 text either way.
fn decode_encoded_string_value(cur: &mut ByteCursor) -> MessagingResult<String> {
    let cp = cur.checkpoint();
    let with_charset = (|| -> MessagingResult<String> {
        let _value_length = wsp::decode_value_length(cur)?;
        let charset = wsp::decode_well_known_charset(cur)?;
        trace!("encoded-string-value charset {}", charset);
        wsp::decode_text_string(cur)
    })();
    match with_charset {
        Ok(s) => Ok(s),
        Err(ref e) if e.is_decode_error() => {
            cur.rewind(cp);
            wsp::decode_text_string(cur)
        },
        Err(e) => Err(e)
    }
}
fn decode_body(cur: &mut ByteCursor, msg: &mut MmsMessage) -> MessagingResult<()> {
    let num_parts = match wsp::decode_uintvar(cur) {
        Ok(n) => n,
        // a headers-only PDU (m-notification-ind et al) has no body
        Err(MessagingError::UnexpectedEnd { .. }) => return Ok(()),
        Err(e) => return Err(e)
    };
    debug!("mms body: {} parts", num_parts);
    for _ in 0..num_parts {
        let headers_len = wsp::decode_uintvar(cur)? as usize;
        let data_len = wsp::decode_uintvar(cur)? as usize;
        let header_bytes = cur.take(headers_len)?;
        let mut sub = ByteCursor::new(header_bytes);
        let (content_type, ct_params) = wsp::decode_content_type_value(&mut sub)?;
        let data = cur.take(data_len)?;
        let mut part = DataPart::new(data.to_vec(), &content_type);
        part.content_type_parameters = ct_params;
        while !sub.is_empty() {
            match wsp::decode_header(&mut sub, Version::default()) {
                Ok((name, value)) => {
                    part.headers.insert(name, value);
                },
                Err(MessagingError::UnexpectedEnd { .. }) => break,
                Err(e) => return Err(e)
            }
        }
        msg.add_data_part(part);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// encoding
// ---------------------------------------------------------------------------

/// Binary-encode an MMS message: normalised headers first (Message-Type,
/// Transaction-Id, MMS-Version, the rest, Content-Type last), then the
/// multipart body, with a SMIL part injected when the message has slides.
pub fn encode_mms(msg: &MmsMessage) -> MessagingResult<Bytes> {
    let mut buf = BytesMut::new();
    encode_headers(msg, &mut buf)?;
    encode_body(msg, &mut buf)?;
    Ok(buf.freeze())
}

fn encode_headers(msg: &MmsMessage, buf: &mut BytesMut) -> MessagingResult<()> {
    let mut headers = msg.headers.clone();
    // accept the X-Mms- spellings of the mandatory trio
    for (alias, clean) in [("X-Mms-Message-Type", "Message-Type"),
                           ("X-Mms-Transaction-Id", "Transaction-Id"),
                           ("X-Mms-Version", "MMS-Version")].iter() {
        if let Some(v) = headers.remove(*alias) {
            headers.insert(clean.to_string(), v);
        }
    }
    // m-send-req needs somebody to send to; fall back to m-retrieve-conf,
    // which doesn't (WAP-209, table 5)
    let mtype = headers.get("Message-Type").and_then(|v| v.as_str())
        .unwrap_or("m-retrieve-conf").to_string();
    let mtype = if mtype == "m-send-req"
            && !["To", "Cc", "Bcc"].iter().any(|h| headers.contains_key(*h)) {
        "m-retrieve-conf".to_string()
    }
    else {
        mtype
    };
    headers.insert("Message-Type".into(), MmsValue::Str(mtype));
    headers.entry("Transaction-Id".into()).or_insert_with(|| {
        MmsValue::Str(format!("{}", 1000 + rand::random::<u16>() % 9000))
    });
    headers.entry("MMS-Version".into())
        .or_insert_with(|| MmsValue::Str("1.0".into()));

    for name in ["Message-Type", "Transaction-Id", "MMS-Version"].iter() {
        if let Some(value) = headers.remove(*name) {
            encode_header(name, &value, buf)?;
        }
    }
    let content_type = headers.remove("Content-Type").unwrap_or_else(|| {
        MmsValue::ContentType(msg.content_type().into(), Parameters::new())
    });
    for (name, value) in &headers {
        encode_header(name, value, buf)?;
    }
    encode_header("Content-Type", &content_type, buf)
}

fn encode_header(name: &str, value: &MmsValue, buf: &mut BytesMut) -> MessagingResult<()> {
    if let Some(&(code, _, kind)) = field_by_name(name) {
        wsp::encode_short_integer(code as u64, buf)?;
        return encode_field_kind(name, kind, value, buf);
    }
    // not a well-known MMS field: application-header
    wsp::encode_token_text(name, buf)?;
    match value {
        MmsValue::Str(s) => wsp::encode_text_string(s, buf),
        other => Err(MessagingError::encode(
            format!("cannot encode {:?} as an application header value", other)))
    }
}
fn encode_field_kind(name: &str, kind: FieldKind, value: &MmsValue,
                     buf: &mut BytesMut) -> MessagingResult<()> {
    let type_error = || MessagingError::encode(
        format!("value {:?} does not fit MMS header {}", value, name));
    match (kind, value) {
        (FieldKind::EncodedString, MmsValue::Str(s))
        | (FieldKind::Uri, MmsValue::Str(s))
        | (FieldKind::TextString, MmsValue::Str(s)) => wsp::encode_text_string(s, buf),
        (FieldKind::ContentType, MmsValue::ContentType(ct, params)) => {
            wsp::encode_content_type_value(ct, params, buf)
        },
        (FieldKind::ContentType, MmsValue::Str(ct)) => {
            wsp::encode_content_type_value(ct, &Parameters::new(), buf)
        },
        (FieldKind::Date, MmsValue::Date(d)) => {
            wsp::encode_date_value(*d, buf);
            Ok(())
        },
        (FieldKind::Boolean, MmsValue::Bool(b)) => {
            buf.put_u8(if *b { 128 } else { 129 });
            Ok(())
        },
        (FieldKind::TimeToken, value) => {
            let mut inner = BytesMut::new();
            match value {
                MmsValue::Date(d) => {
                    inner.put_u8(0x80); // Absolute-token
                    wsp::encode_date_value(*d, &mut inner);
                },
                MmsValue::Int(secs) => {
                    inner.put_u8(0x81); // Relative-token
                    wsp::encode_integer_value(*secs, &mut inner);
                },
                _ => return Err(type_error())
            }
            wsp::encode_value_length(inner.len() as u64, buf);
            buf.extend_from_slice(&inner);
            Ok(())
        },
        (FieldKind::From, MmsValue::Str(s)) => {
            if s.is_empty() || s == "<not inserted>" {
                wsp::encode_value_length(1, buf);
                buf.put_u8(129); // Insert-address-token
            }
            else {
                let mut address = BytesMut::new();
                wsp::encode_text_string(s, &mut address)?;
                wsp::encode_value_length(address.len() as u64 + 1, buf);
                buf.put_u8(128); // Address-present-token
                buf.extend_from_slice(&address);
            }
            Ok(())
        },
        (FieldKind::MessageClass, MmsValue::Str(s)) => {
            match code_of(&CLASS_IDENTIFIERS, s) {
                Some(code) => {
                    buf.put_u8(code);
                    Ok(())
                },
                None => wsp::encode_token_text(s, buf)
            }
        },
        (FieldKind::MessageType, MmsValue::Str(s)) => {
            // unknown message types degrade to m-send-req
            buf.put_u8(code_of(&MESSAGE_TYPES, s).unwrap_or(0x80));
            Ok(())
        },
        (FieldKind::VersionValue, MmsValue::Str(s)) => wsp::encode_version_value(s, buf),
        (FieldKind::LongInteger, MmsValue::Int(i)) => {
            wsp::encode_long_integer(*i, buf);
            Ok(())
        },
        (FieldKind::Priority, MmsValue::Str(s)) => {
            buf.put_u8(code_of(&PRIORITIES, s).ok_or_else(type_error)?);
            Ok(())
        },
        (FieldKind::ResponseStatus, MmsValue::Str(s)) => {
            buf.put_u8(code_of(&RESPONSE_STATUS_VALUES, s).unwrap_or(0x81));
            Ok(())
        },
        (FieldKind::SenderVisibility, MmsValue::Str(s)) => {
            match s.as_str() {
                "Hide" => buf.put_u8(128),
                "Show" => buf.put_u8(129),
                _ => return Err(type_error())
            }
            Ok(())
        },
        (FieldKind::Status, MmsValue::Str(s)) => {
            buf.put_u8(code_of(&STATUS_VALUES, s).unwrap_or(0x84));
            Ok(())
        },
        _ => Err(type_error())
    }
}

fn encode_body(msg: &MmsMessage, buf: &mut BytesMut) -> MessagingResult<()> {
    let mut parts: Vec<DataPart> = vec![];
    if !msg.pages().is_empty() {
        // slides ride on a generated SMIL part, which goes first
        let mut smil_part = DataPart::new(msg.smil().into_bytes(), "application/smil");
        smil_part.headers.insert("Content-ID".into(), "<0000>".into());
        parts.push(smil_part);
        for page in msg.pages() {
            for slot in [page.image(), page.audio(), page.text()].iter() {
                if let Some((part, _, _)) = slot {
                    parts.push(part.clone());
                }
            }
        }
    }
    parts.extend(msg.data_parts().iter().cloned());

    wsp::encode_uintvar(parts.len() as u64, buf);
    for part in &parts {
        let mut content_type = BytesMut::new();
        wsp::encode_content_type_value(&part.content_type,
                                       &part.content_type_parameters,
                                       &mut content_type)?;
        let mut part_headers = BytesMut::new();
        for (name, value) in &part.headers {
            wsp::encode_header(name, value, Version::default(), &mut part_headers)?;
        }
        wsp::encode_uintvar((content_type.len() + part_headers.len()) as u64, buf);
        wsp::encode_uintvar(part.len() as u64, buf);
        buf.extend_from_slice(&content_type);
        buf.extend_from_slice(&part_headers);
        buf.put_slice(part.data());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mms::MmsPage;

    #[test]
    fn encode_m_notifyresp_ind() {
        let mut msg = MmsMessage::new();
        msg.headers.insert("Transaction-Id".into(),
            MmsValue::Str("NOK5AIdhfTMYSG4JeIgAAsHtp72AGAAAAAAAA".into()));
        msg.headers.insert("Message-Type".into(), MmsValue::Str("m-notifyresp-ind".into()));
        msg.headers.insert("Status".into(), MmsValue::Str("Retrieved".into()));
        let data = msg.encode().unwrap();
        let mut expected = vec![0x8C, 0x83, 0x98];
        expected.extend(b"NOK5AIdhfTMYSG4JeIgAAsHtp72AGAAAAAAAA");
        expected.extend(&[0x00, 0x8D, 0x90, 0x95, 0x81, 0x84, 0xA3, 0x00]);
        assert_eq!(&data[..], &expected[..]);
    }
    #[test]
    fn send_req_without_recipient_becomes_retrieve_conf() {
        let msg = MmsMessage::new();
        assert_eq!(msg.headers.get("Message-Type").unwrap().as_str(), Some("m-send-req"));
        let data = msg.encode().unwrap();
        let decoded = MmsMessage::from_data(&data).unwrap();
        assert_eq!(decoded.headers.get("Message-Type").unwrap().as_str(),
                   Some("m-retrieve-conf"));
    }
    #[test]
    fn roundtrip_send_req_with_slide() {
        let mut msg = MmsMessage::new();
        msg.headers.insert("To".into(), MmsValue::Str("1337/TYPE=PLMN".into()));
        msg.headers.insert("Subject".into(), MmsValue::Str("Picture".into()));
        msg.headers.insert("From".into(), MmsValue::Str(String::new()));
        let mut page = MmsPage::new();
        let mut img = DataPart::new(vec![0xFF, 0xD8, 0xFF, 0xE0], "image/jpeg");
        img.headers.insert("Content-Location".into(), "photo.jpg".into());
        page.add_image(img, 0, 0).unwrap();
        page.add_text("hello there", 0, 0).unwrap();
        msg.add_page(page);

        let data = msg.encode().unwrap();
        let decoded = MmsMessage::from_data(&data).unwrap();
        assert_eq!(decoded.headers.get("Message-Type").unwrap().as_str(),
                   Some("m-send-req"));
        assert_eq!(decoded.headers.get("To").unwrap().as_str(), Some("1337/TYPE=PLMN"));
        assert_eq!(decoded.headers.get("Subject").unwrap().as_str(), Some("Picture"));
        assert_eq!(decoded.headers.get("From").unwrap().as_str(), Some("<not inserted>"));
        assert_eq!(decoded.content_type(), "application/vnd.wap.multipart.related");

        let parts = decoded.data_parts();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].content_type, "application/smil");
        assert_eq!(parts[0].headers.get("Content-ID").map(String::as_str), Some("<0000>"));
        let smil = String::from_utf8(parts[0].data().to_vec()).unwrap();
        assert!(smil.contains("<par dur=\"4000ms\">"));
        assert!(smil.contains("<img src=\"photo.jpg\" region=\"Image\"/>"));
        assert_eq!(parts[1].content_type, "image/jpeg");
        assert_eq!(parts[1].data(), &[0xFF, 0xD8, 0xFF, 0xE0]);
        assert_eq!(parts[1].headers.get("Content-Location").map(String::as_str),
                   Some("photo.jpg"));
        assert_eq!(parts[2].content_type, "text/plain");
        assert_eq!(parts[2].data(), b"hello there");
    }
    #[test]
    fn roundtrip_mixed_without_slides_has_no_smil() {
        let mut msg = MmsMessage::new();
        msg.headers.insert("To".into(), MmsValue::Str("123/TYPE=PLMN".into()));
        msg.add_data_part(DataPart::text("just text"));
        let data = msg.encode().unwrap();
        let decoded = MmsMessage::from_data(&data).unwrap();
        assert_eq!(decoded.content_type(), "application/vnd.wap.multipart.mixed");
        assert_eq!(decoded.data_parts().len(), 1);
        assert_eq!(decoded.data_parts()[0].content_type, "text/plain");
        assert_eq!(decoded.data_parts()[0].data(), b"just text");
    }
    #[test]
    fn expiry_relative_roundtrip() {
        let mut msg = MmsMessage::new();
        msg.headers.insert("To".into(), MmsValue::Str("123".into()));
        msg.headers.insert("Expiry".into(), MmsValue::Int(72000));
        let data = msg.encode().unwrap();
        let decoded = MmsMessage::from_data(&data).unwrap();
        assert_eq!(decoded.headers.get("Expiry").unwrap().as_int(), Some(72000));
    }
    #[test]
    fn expiry_absolute_roundtrip() {
        use chrono::NaiveDate;
        let when = NaiveDate::from_ymd(2004, 3, 18).and_hms(7, 30, 34);
        let mut msg = MmsMessage::new();
        msg.headers.insert("To".into(), MmsValue::Str("123".into()));
        msg.headers.insert("Expiry".into(), MmsValue::Date(when));
        msg.headers.insert("Date".into(), MmsValue::Date(when));
        let data = msg.encode().unwrap();
        let decoded = MmsMessage::from_data(&data).unwrap();
        assert_eq!(decoded.headers.get("Expiry").unwrap().as_date(), Some(when));
        assert_eq!(decoded.headers.get("Date").unwrap().as_date(), Some(when));
    }
    #[test]
    fn boolean_and_visibility_roundtrip() {
        let mut msg = MmsMessage::new();
        msg.headers.insert("To".into(), MmsValue::Str("123".into()));
        msg.headers.insert("Delivery-Report".into(), MmsValue::Bool(false));
        msg.headers.insert("Read-Reply".into(), MmsValue::Bool(true));
        msg.headers.insert("Sender-Visibility".into(), MmsValue::Str("Show".into()));
        msg.headers.insert("Message-Class".into(), MmsValue::Str("Personal".into()));
        msg.headers.insert("Priority".into(), MmsValue::Str("Normal".into()));
        let data = msg.encode().unwrap();
        let decoded = MmsMessage::from_data(&data).unwrap();
        assert_eq!(decoded.headers.get("Delivery-Report").unwrap().as_bool(), Some(false));
        assert_eq!(decoded.headers.get("Read-Reply").unwrap().as_bool(), Some(true));
        assert_eq!(decoded.headers.get("Sender-Visibility").unwrap().as_str(), Some("Show"));
        assert_eq!(decoded.headers.get("Message-Class").unwrap().as_str(), Some("Personal"));
        assert_eq!(decoded.headers.get("Priority").unwrap().as_str(), Some("Normal"));
    }
    #[test]
    fn unknown_message_type_decodes_as_unknown() {
        // field 0x0C (Message-Type) with an unassigned code, then enough of
        // a message to terminate
        let data = [0x8C, 0x99, 0x84, 0xA3];
        let decoded = decode_mms(&data).unwrap();
        assert_eq!(decoded.headers.get("Message-Type").unwrap().as_str(),
                   Some("<unknown>"));
    }
    #[test]
    fn unknown_response_status_is_unspecified() {
        let data = [0x8C, 0x81, 0x92, 0xC0, 0x84, 0xA3];
        let decoded = decode_mms(&data).unwrap();
        assert_eq!(decoded.headers.get("Response-Status").unwrap().as_str(),
                   Some("Error-unspecified"));
    }
    #[test]
    fn message_size_long_integer() {
        let data = [0x8C, 0x82, 0x8E, 0x02, 0x74, 0x00, 0x84, 0xA3];
        let decoded = decode_mms(&data).unwrap();
        assert_eq!(decoded.headers.get("Message-Size").unwrap().as_int(), Some(29696));
    }
    #[test]
    fn truncated_body_is_a_decode_error() {
        // valid headers, then a body declaring a part that isn't there
        let data = [0x8C, 0x83, 0x84, 0xA3, 0x01, 0x01, 0x20, 0x83];
        match decode_mms(&data) {
            Err(e) => assert!(e.is_decode_error(), "unexpected error: {:?}", e),
            Ok(m) => panic!("should not decode: {:?}", m)
        }
    }
    #[test]
    fn repeated_header_keeps_last_occurrence() {
        // two Subject headers
        let data = [0x8C, 0x83,
                    0x96, b'o', b'n', b'e', 0x00,
                    0x96, b't', b'w', b'o', 0x00,
                    0x84, 0xA3];
        let decoded = decode_mms(&data).unwrap();
        assert_eq!(decoded.headers.get("Subject").unwrap().as_str(), Some("two"));
    }
}
