//! Encoders and decoders for the on-the-wire formats of mobile telephony
//! messaging: SMS PDUs ([3GPP TS
//! 23.040](https://en.wikipedia.org/wiki/GSM_03.40)), the GSM 03.38 7-bit
//! alphabet, WSP header encoding (WAP-230), and the MMS encapsulation that
//! rides on top of it (WAP-209).
//!
//! Everything here is purely computational: you hand a builder some values
//! and get bytes (well, uppercase hex for SMS - blame the AT command set),
//! or you hand a decoder some bytes and get a message back. No I/O, no
//! threads, no global state.
//!
//! The usual entry points:
//!
//! - [`pdu::SmsSubmit`] to build (possibly concatenated) SMS-SUBMIT PDUs;
//! - [`pdu::decode_sms`] to parse an SMS-DELIVER or SMS-STATUS-REPORT;
//! - [`mms::MmsMessage`] to build or parse an MMS;
//! - [`wap::extract_wap_push`] to pull an MMS notification out of the
//!   reassembled user data of a WAP push SMS.

macro_rules! check_offset {
    ($b:ident, $offset:expr, $reason:expr) => {
        if $b.get($offset).is_none() {
            return Err(crate::errors::MessagingError::decode(
                concat!("offset check failed for: ", $reason), $offset));
        }
    }
}

pub mod errors;
pub mod util;
pub mod cursor;
pub mod gsm_encoding;
pub mod pdu;
pub mod wsp;
pub mod mms;
pub mod wap;

#[cfg(test)]
mod tests;

pub use crate::errors::{MessagingError, MessagingResult};
pub use crate::gsm_encoding::is_gsm_text;
pub use crate::mms::codec::{decode_mms, encode_mms};
pub use crate::mms::{DataPart, MmsMessage, MmsPage};
pub use crate::pdu::{decode_sms, encode_sms_submit, DecodedSms, SmsSubmit};
pub use crate::wap::{extract_wap_push, is_mms_notification, is_wap_push};
