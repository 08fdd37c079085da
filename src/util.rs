//! Small utilities: mostly hex wrangling.
use crate::errors::{MessagingError, MessagingResult};
use std::fmt;

/// A newtype for displaying binary data as an uppercase hex string, the way
/// SMS PDUs travel over the AT command set and through test vectors.
pub struct HexData<'a>(pub &'a [u8]);
impl<'a> fmt::Display for HexData<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for b in self.0.iter() {
            write!(f, "{:02X}", b)?;
        }
        Ok(())
    }
}
impl<'a> HexData<'a> {
    /// Decode a hex string into bytes. The string must have even length;
    /// callers that want to tolerate an odd trailing nibble chop it off
    /// before calling (see `pdu::decode_sms`).
    pub fn decode(data: &str) -> MessagingResult<Vec<u8>> {
        if data.len() % 2 != 0 {
            return Err(MessagingError::InvalidInput(
                "can not decode an odd-length hex string".into()));
        }
        data.as_bytes()
            .chunks(2)
            .map(|ch| {
                let st = std::str::from_utf8(ch).map_err(|_| {
                    MessagingError::InvalidInput("hex input is not ASCII".into())
                })?;
                u8::from_str_radix(st, 16).map_err(|_| {
                    MessagingError::InvalidInput(format!("not hex: {}", st))
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_roundtrip() {
        let bytes = HexData::decode("07914346466554F6").unwrap();
        assert_eq!(bytes, vec![0x07, 0x91, 0x43, 0x46, 0x46, 0x65, 0x54, 0xF6]);
        assert_eq!(format!("{}", HexData(&bytes)), "07914346466554F6");
    }
    #[test]
    fn hex_lowercase_accepted() {
        assert_eq!(HexData::decode("ff00ab").unwrap(), vec![0xFF, 0x00, 0xAB]);
    }
    #[test]
    fn hex_odd_length_rejected() {
        assert!(HexData::decode("ABC").is_err());
    }
    #[test]
    fn hex_garbage_rejected() {
        assert!(HexData::decode("zz").is_err());
    }
}
