//! WAP push handling: spotting an MMS notification in reassembled SMS user
//! data and pulling the MMS PDU out of it.
//!
//! An MMS notification arrives as one or more 8-bit SMS-DELIVERs addressed
//! to the WAP push port; concatenating their user data yields a WSP Push
//! PDU: transaction id, PDU type (0x06 = Push), a headers length, that many
//! header bytes (content type and friends), and then the MMS itself.

use crate::errors::{MessagingError, MessagingResult};
use crate::mms::MmsMessage;

/// Is this reassembled user data a WAP push? (The byte at offset 1 is the
/// WSP PDU type; 0x06 is Push.)
pub fn is_wap_push(data: &[u8]) -> bool {
    data.get(1) == Some(&0x06)
}
/// Does this decoded MMS announce a new message waiting on the MMSC?
pub fn is_mms_notification(mms: &MmsMessage) -> bool {
    mms.headers.get("Message-Type").and_then(|v| v.as_str()) == Some("m-notification-ind")
}
/// Extract the MMS message (and the push transaction id) from WAP push
/// data. The WSP push headers are skipped, not interpreted.
pub fn extract_wap_push(data: &[u8]) -> MessagingResult<(MmsMessage, u8)> {
    if !is_wap_push(data) {
        return Err(MessagingError::InvalidInput(
            "not a WAP push: PDU type octet is not 0x06".into()));
    }
    let transaction_id = data[0];
    let headers_len = data[2] as usize;
    let offset = 3 + headers_len;
    if data.len() < offset {
        return Err(MessagingError::UnexpectedEnd { offset: data.len() });
    }
    Ok((MmsMessage::from_data(&data[offset..])?, transaction_id))
}
