//! User Data Headers (used for concatenated SMS, among other things).
//!
//! [This Wikipedia article](https://en.wikipedia.org/wiki/User_Data_Header)
//! explains what this is for pretty well. Most uses of the UDH are
//! vestigial; nowadays it's mostly useful for concatenated SMS and for the
//! port addressing that WAP push rides on.
use crate::errors::{MessagingError, MessagingResult};
use std::convert::TryFrom;

/// A single Information Element of a User Data Header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UdhComponent {
    /// Information Element Identifier.
    pub id: u8,
    /// Element data.
    pub data: Vec<u8>
}
/// A User Data Header itself.
///
/// You'll likely just want to call [`UserDataHeader::concat`] on this to
/// check whether the message is part of a multi-part series.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserDataHeader {
    pub components: Vec<UdhComponent>
}
/// Data about a concatenated SMS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConcatInfo {
    /// Reference identifying which logical message this part belongs to.
    pub reference: u16,
    /// How many parts the message has (e.g. 2).
    pub parts: u8,
    /// Which part this is (e.g. 1 of 2).
    pub sequence: u8
}
/// Application port addressing (IEs 0x04 and 0x05).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortAddress {
    pub dest_port: u16,
    pub orig_port: u16
}
impl UserDataHeader {
    /// Build the 6-octet concat-8 header (`05 00 03 ref total seq`) used
    /// when segmenting an outgoing message.
    pub fn concat_8bit(reference: u8, parts: u8, sequence: u8) -> UserDataHeader {
        UserDataHeader {
            components: vec![UdhComponent {
                id: 0x00,
                data: vec![reference, parts, sequence]
            }]
        }
    }
    /// A synthetic UDH carrying a status report's TP-MR as a concat
    /// reference, so consumers that key multipart bookkeeping off
    /// `concat().reference` can treat status reports uniformly.
    pub fn from_status_report_ref(reference: u8) -> UserDataHeader {
        UserDataHeader {
            components: vec![UdhComponent {
                id: 0x00,
                data: vec![reference, 0, 0]
            }]
        }
    }
    /// If there is concatenation data in this header, return it.
    pub fn concat(&self) -> Option<ConcatInfo> {
        for comp in self.components.iter() {
            if comp.id == 0x00 && comp.data.len() == 3 {
                return Some(ConcatInfo {
                    reference: comp.data[0] as u16,
                    parts: comp.data[1],
                    sequence: comp.data[2]
                });
            }
            if comp.id == 0x08 && comp.data.len() == 4 {
                let reference = ((comp.data[0] as u16) << 8) | (comp.data[1] as u16);
                return Some(ConcatInfo {
                    reference,
                    parts: comp.data[2],
                    sequence: comp.data[3]
                });
            }
        }
        None
    }
    /// If there is application port addressing in this header, return it.
    pub fn ports(&self) -> Option<PortAddress> {
        for comp in self.components.iter() {
            if comp.id == 0x04 && comp.data.len() == 2 {
                return Some(PortAddress {
                    dest_port: comp.data[0] as u16,
                    orig_port: comp.data[1] as u16
                });
            }
            if comp.id == 0x05 && comp.data.len() == 4 {
                return Some(PortAddress {
                    dest_port: ((comp.data[0] as u16) << 8) | (comp.data[1] as u16),
                    orig_port: ((comp.data[2] as u16) << 8) | (comp.data[3] as u16)
                });
            }
        }
        None
    }
    /// Serialize this UDH to wire format, UDHL octet included.
    pub fn as_bytes(&self) -> Vec<u8> {
        let mut ret = vec![];
        for comp in self.components.iter() {
            ret.push(comp.id);
            ret.push(comp.data.len() as u8);
            ret.extend(comp.data.iter());
        }
        let len = ret.len() as u8;
        ret.insert(0, len);
        ret
    }
}
impl<'a> TryFrom<&'a [u8]> for UserDataHeader {
    type Error = MessagingError;
    /// Accepts a UDH *without* the UDH Length octet at the start.
    fn try_from(b: &[u8]) -> MessagingResult<Self> {
        let mut offset = 0;
        let mut ret = vec![];
        loop {
            if b.get(offset).is_none() {
                break;
            }
            let id = b[offset];
            offset += 1;
            check_offset!(b, offset, "UDH component length");
            let len = b[offset];
            let end = offset + len as usize + 1;
            offset += 1;
            let o = end - 1;
            check_offset!(b, o, "UDH component data");
            let data = b[offset..end].to_owned();
            offset = end;
            ret.push(UdhComponent { id, data });
        }
        Ok(UserDataHeader {
            components: ret
        })
    }
}
