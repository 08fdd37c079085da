//! Building and parsing SMS PDUs (Protocol Data Units), as specified in
//! 3GPP TS 23.040.
//!
//! PDUs are the binary wire format SMSes actually travel in - rendered as
//! uppercase hex, because that's how the surrounding protocols (AT commands
//! in particular) like to carry them. This module owns the whole format:
//! bit-packed type octets, BCD-packed addresses, validity periods, the
//! quarter-hour timestamp encoding, and segmentation of long messages into
//! concatenated parts.
//!
//! Build outgoing messages with [`SmsSubmit`]; parse incoming ones with
//! [`decode_sms`], which hands back either a [`SmsDeliver`] or a
//! [`SmsStatusReport`].

use crate::cursor::ByteCursor;
use crate::errors::{MessagingError, MessagingResult};
use crate::gsm_encoding::udh::UserDataHeader;
use crate::gsm_encoding::{self, EncodingPolicy};
use crate::util::HexData;
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime};
use encoding::all::{ISO_8859_1, UTF_16BE};
use encoding::{DecoderTrap, EncoderTrap, Encoding};
use log::debug;
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use std::convert::TryFrom;
use std::fmt;

/// Septet capacity of a single-part 7-bit message.
pub const SEVENBIT_SIZE: usize = 160;
/// UTF-16 code unit capacity of a single-part UCS-2 message.
pub const UCS2_SIZE: usize = 70;
/// Octet capacity of a single-part 8-bit message.
pub const EIGHTBIT_SIZE: usize = 140;
// Per-part capacities once a 6-octet concat UDH is in the way.
const SEVENBIT_MP_SIZE: usize = 153;
const UCS2_MP_SIZE: usize = 67;
const EIGHTBIT_MP_SIZE: usize = 134;

/// Type of number, from the top bits of a type-of-address octet.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, FromPrimitive)]
pub enum TypeOfNumber {
    Unknown = 0b000,
    International = 0b001,
    National = 0b010,
    NetworkSpecific = 0b011,
    Subscriber = 0b100,
    /// GSM 7-bit septets instead of digits - "FONIC" and friends.
    Alphanumeric = 0b101,
    Abbreviated = 0b110,
    Reserved = 0b111
}
/// Numbering plan, from the low nibble of a type-of-address octet.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, FromPrimitive)]
pub enum NumberingPlanIdentification {
    NetworkDetermined = 0b0000,
    IsdnTelephone = 0b0001,
    Data = 0b0011,
    Telex = 0b0100,
    National = 0b1000,
    Private = 0b1001,
    Ermes = 0b1010
}
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AddressType {
    pub type_of_number: TypeOfNumber,
    pub numbering_plan_identification: NumberingPlanIdentification
}
impl Default for AddressType {
    fn default() -> Self {
        AddressType {
            type_of_number: TypeOfNumber::Unknown,
            numbering_plan_identification: NumberingPlanIdentification::IsdnTelephone
        }
    }
}
impl AddressType {
    pub fn as_u8(self) -> u8 {
        0b1000_0000
            | ((self.type_of_number as u8) << 4)
            | self.numbering_plan_identification as u8
    }
    pub fn type_of_number_from_u8(toa: u8) -> TypeOfNumber {
        // all eight 3-bit values are covered, so this can't actually miss
        TypeOfNumber::from_u8((toa >> 4) & 0b111).unwrap_or(TypeOfNumber::Unknown)
    }
}

/// A phone number plus its type-of-address, BCD-packable for the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PduAddress {
    pub type_addr: AddressType,
    /// The digits, without any leading `+`.
    digits: String
}
impl PduAddress {
    /// Parse a `+`-prefixed or bare digit string, validating it as
    /// `^\+?\d{3,20}$`. A leading `+` selects the international
    /// type-of-address (0x91); anything else is "unknown" (0x81).
    pub fn from_str(number: &str) -> MessagingResult<PduAddress> {
        let number = number.trim();
        let digits = number.strip_prefix('+').unwrap_or(number);
        let international = number.starts_with('+');
        if digits.len() < 3 || digits.len() > 20
            || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(MessagingError::InvalidNumber(number.into()));
        }
        let mut type_addr = AddressType::default();
        if international {
            type_addr.type_of_number = TypeOfNumber::International;
        }
        Ok(PduAddress { type_addr, digits: digits.into() })
    }
    /// BCD-pack the digits, two per octet, low nibble first, padding an odd
    /// count with 0xF.
    fn bcd(&self) -> Vec<u8> {
        let b = self.digits.as_bytes();
        b.chunks(2)
            .map(|ch| {
                let lo = ch[0] - b'0';
                let hi = if ch.len() == 2 { ch[1] - b'0' } else { 0xF };
                (hi << 4) | lo
            })
            .collect()
    }
    /// Serialize as an SMSC address field: length counts the *octets* of
    /// type-of-address plus BCD digits.
    pub fn as_smsc_bytes(&self) -> Vec<u8> {
        let mut ret = vec![self.type_addr.as_u8()];
        ret.extend(self.bcd());
        ret.insert(0, ret.len() as u8);
        ret
    }
    /// Serialize as a destination/originating address field: length counts
    /// the *digits*.
    pub fn as_dest_bytes(&self) -> Vec<u8> {
        let mut ret = vec![self.digits.len() as u8, self.type_addr.as_u8()];
        ret.extend(self.bcd());
        ret
    }
}
impl fmt::Display for PduAddress {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.type_addr.type_of_number == TypeOfNumber::International {
            write!(f, "+")?;
        }
        write!(f, "{}", self.digits)
    }
}

/// The alphabet a message payload is coded in, from TP-DCS bits 2..3.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, FromPrimitive)]
pub enum MessageEncoding {
    Gsm7Bit = 0x00,
    EightBit = 0x04,
    Ucs2 = 0x08,
    Reserved = 0x0C
}
impl MessageEncoding {
    /// The alphabet selected by a DCS octet, using the same precedence the
    /// deployed world uses: 8-bit beats UCS-2 when both bits are set.
    pub fn from_dcs(dcs: u8) -> MessageEncoding {
        if dcs & 0x0C == 0 {
            MessageEncoding::Gsm7Bit
        }
        else if dcs & 0x04 != 0 {
            MessageEncoding::EightBit
        }
        else {
            MessageEncoding::Ucs2
        }
    }
}

/// How long the network should keep trying to deliver a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SmsValidity {
    /// No TP-VP field at all.
    None,
    /// One relative-format octet (see [`timedelta_to_relative_validity`]).
    Relative(Duration),
    /// A full 7-octet absolute timestamp, timezone included.
    Absolute(DateTime<FixedOffset>)
}
impl Default for SmsValidity {
    /// Four days - the traditional 0xAA - which is what almost every
    /// handset and gateway sends.
    fn default() -> Self {
        SmsValidity::Relative(Duration::days(4))
    }
}

/// Convert a duration into the one-octet relative validity format.
///
/// The encoding is piecewise: 5-minute steps up to 12 hours, then
/// half-hour steps to a day, then days to 30, then weeks to 63. Durations
/// outside [5 minutes, 63 weeks] are an error; everything else rounds down
/// to the step in force.
pub fn timedelta_to_relative_validity(validity: Duration) -> MessagingResult<u8> {
    let minutes = validity.num_minutes();
    if minutes < 5 {
        Err(MessagingError::encode("validity period must be at least 5 minutes"))
    }
    else if minutes <= 720 {
        Ok((minutes / 5 - 1) as u8)
    }
    else if minutes <= 1440 {
        Ok((143 + (minutes - 720) / 30) as u8)
    }
    else if validity.num_days() <= 30 {
        Ok((validity.num_days() + 166) as u8)
    }
    else if validity.num_weeks() <= 63 {
        Ok((validity.num_weeks() + 192) as u8)
    }
    else {
        Err(MessagingError::encode("validity period must be at most 63 weeks"))
    }
}
/// The inverse of [`timedelta_to_relative_validity`].
pub fn relative_validity_to_timedelta(value: u8) -> Duration {
    match value {
        0..=143 => Duration::minutes(5 * (value as i64 + 1)),
        144..=167 => Duration::hours(12) + Duration::minutes(30 * (value as i64 - 143)),
        168..=196 => Duration::days(value as i64 - 166),
        _ => Duration::weeks(value as i64 - 192)
    }
}

fn swapped_bcd(value: u32) -> u8 {
    let tens = (value / 10) as u8;
    let units = (value % 10) as u8;
    (units << 4) | tens
}
/// Serialize an absolute datetime into the 7-octet nibble-swapped BCD
/// timestamp layout (`YY MM DD hh mm ss tz`), with the timezone as signed
/// quarter-hours.
pub fn datetime_to_absolute_validity(when: DateTime<FixedOffset>) -> [u8; 7] {
    use chrono::{Datelike, Timelike};
    let offset_minutes = when.offset().local_minus_utc() / 60;
    let quarters = (offset_minutes.abs() / 15) as u32;
    let mut tz = swapped_bcd(quarters);
    if offset_minutes < 0 {
        tz |= 0b0000_1000;
    }
    [
        swapped_bcd(when.year() as u32 % 100),
        swapped_bcd(when.month()),
        swapped_bcd(when.day()),
        swapped_bcd(when.hour()),
        swapped_bcd(when.minute()),
        swapped_bcd(when.second()),
        tz
    ]
}

/// Parse a 7-octet BCD timestamp. Returns the (local) datetime and the
/// timezone offset in minutes; the sign lives in bit 3 of the low nibble
/// of the stored tz octet.
fn decode_timestamp(cur: &mut ByteCursor) -> MessagingResult<(NaiveDateTime, i64)> {
    let at = cur.position();
    let raw = cur.take(7)?;
    let mut parts = [0u32; 6];
    for (i, b) in raw[..6].iter().enumerate() {
        let tens = (b & 0x0F) as u32;
        let units = (b >> 4) as u32;
        if tens > 9 || units > 9 {
            return Err(MessagingError::decode("timestamp is not BCD", at + i));
        }
        parts[i] = tens * 10 + units;
    }
    let tz = raw[6];
    let mut offset = ((tz & 0x07) as i64 * 10 + (tz >> 4) as i64) * 15;
    if tz & 0x08 != 0 {
        offset = -offset;
    }
    // strptime-style two-digit year pivot
    let year = if parts[0] >= 69 { 1900 + parts[0] } else { 2000 + parts[0] };
    let date = NaiveDate::from_ymd_opt(year as i32, parts[1], parts[2])
        .and_then(|d| d.and_hms_opt(parts[3], parts[4], parts[5]))
        .ok_or_else(|| MessagingError::decode("timestamp out of range", at))?;
    Ok((date, offset))
}

/// One wire-ready PDU, as uppercase hex, plus its position in a
/// concatenated series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pdu {
    /// The hex-encoded PDU, SMSC prefix included.
    pub pdu: String,
    len_smsc: usize,
    /// Total number of parts in the series this PDU belongs to.
    pub cnt: usize,
    /// This PDU's 1-based position in the series.
    pub seq: usize
}
impl Pdu {
    fn new(bytes: &[u8], len_smsc: usize, cnt: usize, seq: usize) -> Pdu {
        Pdu { pdu: format!("{}", HexData(bytes)), len_smsc, cnt, seq }
    }
    /// TPDU length in octets, excluding the SMSC field - the number `AT+CMGS`
    /// wants.
    pub fn length(&self) -> usize {
        self.pdu.len() / 2 - self.len_smsc
    }
}

/// Builder for SMS-SUBMIT messages.
///
/// Collects the destination, text and options, then renders one PDU - or
/// several, sharing a concatenation reference, if the text doesn't fit.
///
/// ```no_run
/// use gsm_messaging::pdu::SmsSubmit;
/// let mut sms = SmsSubmit::new("+34616585119", "hola")?;
/// sms.set_csca("+34646456456")?;
/// for pdu in sms.to_pdus()? {
///     println!("{} ({})", pdu.pdu, pdu.length());
/// }
/// # Ok::<(), gsm_messaging::MessagingError>(())
/// ```
#[derive(Debug, Clone)]
pub struct SmsSubmit {
    number: PduAddress,
    text: String,
    csca: Option<PduAddress>,
    /// Ask the network for a delivery status report (TP-SRR).
    pub request_status: bool,
    klass: Option<u8>,
    /// Validity period; defaults to four days, relative.
    pub validity: SmsValidity,
    /// TP-MR; a random one is chosen per `to_pdus` call if unset.
    pub reference: Option<u8>,
    /// Concatenation reference for multipart messages; random if unset.
    pub concat_reference: Option<u8>,
    /// TP-PID. You almost certainly want the 0x00 default.
    pub pid: u8,
    fmt: Option<MessageEncoding>
}
impl SmsSubmit {
    pub fn new(number: &str, text: &str) -> MessagingResult<SmsSubmit> {
        Ok(SmsSubmit {
            number: PduAddress::from_str(number)?,
            text: text.into(),
            csca: None,
            request_status: false,
            klass: None,
            validity: SmsValidity::default(),
            reference: None,
            concat_reference: None,
            pid: 0x00,
            fmt: None
        })
    }
    /// Set the service centre address.
    pub fn set_csca(&mut self, csca: &str) -> MessagingResult<&mut Self> {
        self.csca = Some(PduAddress::from_str(csca)?);
        Ok(self)
    }
    /// Set the message class (0..=3), folded into the DCS octet.
    pub fn set_class(&mut self, klass: u8) -> MessagingResult<&mut Self> {
        if klass > 3 {
            return Err(MessagingError::encode("message class must be between 0 and 3"));
        }
        self.klass = Some(klass);
        Ok(self)
    }
    /// Force a payload encoding instead of auto-picking GSM 7-bit/UCS-2.
    /// The only really useful override is [`MessageEncoding::EightBit`].
    pub fn set_encoding(&mut self, fmt: MessageEncoding) -> &mut Self {
        self.fmt = Some(fmt);
        self
    }

    fn first_octet(&self, udh: bool) -> u8 {
        let mut fo = 0x01; // TP-MTI = SMS-SUBMIT
        match self.validity {
            SmsValidity::None => {},
            SmsValidity::Relative(_) => fo |= 0b0001_0000,
            SmsValidity::Absolute(_) => fo |= 0b0001_1000
        }
        if self.request_status {
            fo |= 0b0010_0000;
        }
        if udh {
            fo |= 0b0100_0000;
        }
        fo
    }
    fn dcs(&self, fmt: MessageEncoding) -> u8 {
        let mut dcs = fmt as u8;
        if let Some(klass) = self.klass {
            dcs |= 0b0001_0000 | klass;
        }
        dcs
    }
    fn validity_bytes(&self) -> MessagingResult<Vec<u8>> {
        Ok(match self.validity {
            SmsValidity::None => vec![],
            SmsValidity::Relative(d) => vec![timedelta_to_relative_validity(d)?],
            SmsValidity::Absolute(dt) => datetime_to_absolute_validity(dt).to_vec()
        })
    }

    /// Render the message to one or more wire-ready PDUs.
    pub fn to_pdus(&self) -> MessagingResult<Vec<Pdu>> {
        let fmt = match self.fmt {
            Some(f) => f,
            None => if gsm_encoding::is_gsm_text(&self.text) {
                MessageEncoding::Gsm7Bit
            } else {
                MessageEncoding::Ucs2
            }
        };
        // (udl, tp-ud) per part
        let parts: Vec<(u8, Vec<u8>)> = match fmt {
            MessageEncoding::Gsm7Bit => self.gsm_parts()?,
            MessageEncoding::Ucs2 => self.ucs2_parts(),
            MessageEncoding::EightBit => self.eight_bit_parts(),
            MessageEncoding::Reserved => {
                return Err(MessagingError::encode("cannot encode with a reserved DCS alphabet"));
            }
        };
        let smsc = match self.csca {
            Some(ref c) => c.as_smsc_bytes(),
            None => vec![0x00]
        };
        let first_octet = self.first_octet(parts.len() > 1);
        let reference = self.reference.unwrap_or_else(rand::random);
        let dest = self.number.as_dest_bytes();
        let dcs = self.dcs(fmt);
        let vp = self.validity_bytes()?;

        let cnt = parts.len();
        let mut ret = Vec::with_capacity(cnt);
        for (seq, (udl, ud)) in parts.into_iter().enumerate() {
            let mut bytes = smsc.clone();
            bytes.push(first_octet);
            bytes.push(reference);
            bytes.extend(&dest);
            bytes.push(self.pid);
            bytes.push(dcs);
            bytes.extend(&vp);
            bytes.push(udl);
            bytes.extend(&ud);
            debug!("sms-submit part {}/{}: {}", seq + 1, cnt, HexData(&bytes));
            ret.push(Pdu::new(&bytes, smsc.len(), cnt, seq + 1));
        }
        Ok(ret)
    }

    fn concat_ref(&self) -> u8 {
        self.concat_reference.unwrap_or_else(rand::random)
    }
    fn gsm_parts(&self) -> MessagingResult<Vec<(u8, Vec<u8>)>> {
        let septets = gsm_encoding::gsm_encode_string(&self.text, EncodingPolicy::Strict)?;
        if septets.len() <= SEVENBIT_SIZE {
            return Ok(vec![(septets.len() as u8, gsm_encoding::pack_septets(&septets, 0))]);
        }
        // split into <=153-septet chunks, never through an escape pair
        let mut chunks = vec![];
        let mut pi = 0;
        while pi < septets.len() {
            let mut pe = (pi + SEVENBIT_MP_SIZE).min(septets.len());
            if pe - pi > 1 && septets[pe - 1] == 0x1B {
                pe -= 1;
            }
            chunks.push(&septets[pi..pe]);
            pi = pe;
        }
        let reference = self.concat_ref();
        let total = chunks.len();
        Ok(chunks.into_iter().enumerate().map(|(i, chunk)| {
            let udh = UserDataHeader::concat_8bit(reference, total as u8, i as u8 + 1);
            let mut ud = udh.as_bytes();
            let udh_bits = ud.len() * 8;
            let padding = (7 - udh_bits % 7) % 7;
            let udl = (udh_bits + padding) / 7 + chunk.len();
            ud.extend(gsm_encoding::pack_septets(chunk, padding));
            (udl as u8, ud)
        }).collect())
    }
    fn ucs2_parts(&self) -> Vec<(u8, Vec<u8>)> {
        let units: usize = self.text.chars().map(char::len_utf16).sum();
        if units <= UCS2_SIZE {
            let data = UTF_16BE.encode(&self.text, EncoderTrap::Replace).unwrap();
            return vec![(data.len() as u8, data)];
        }
        // chunk by UTF-16 code units, never through a surrogate pair
        let mut chunks: Vec<String> = vec![];
        let mut cur = String::new();
        let mut cur_units = 0;
        for c in self.text.chars() {
            let l = c.len_utf16();
            if cur_units + l > UCS2_MP_SIZE {
                chunks.push(std::mem::replace(&mut cur, String::new()));
                cur_units = 0;
            }
            cur.push(c);
            cur_units += l;
        }
        if !cur.is_empty() {
            chunks.push(cur);
        }
        self.data_parts_with_udh(chunks.iter().map(|ch| {
            UTF_16BE.encode(ch, EncoderTrap::Replace).unwrap()
        }).collect())
    }
    fn eight_bit_parts(&self) -> Vec<(u8, Vec<u8>)> {
        let data = ISO_8859_1.encode(&self.text, EncoderTrap::Replace).unwrap();
        if data.len() <= EIGHTBIT_SIZE {
            return vec![(data.len() as u8, data)];
        }
        self.data_parts_with_udh(data.chunks(EIGHTBIT_MP_SIZE).map(|c| c.to_vec()).collect())
    }
    /// Attach concat UDHs to pre-chunked octet payloads (UCS-2 and 8-bit;
    /// the UDL unit is octets, so no septet padding dance is needed).
    fn data_parts_with_udh(&self, chunks: Vec<Vec<u8>>) -> Vec<(u8, Vec<u8>)> {
        let reference = self.concat_ref();
        let total = chunks.len();
        chunks.into_iter().enumerate().map(|(i, chunk)| {
            let udh = UserDataHeader::concat_8bit(reference, total as u8, i as u8 + 1);
            let mut ud = udh.as_bytes();
            ud.extend(&chunk);
            (ud.len() as u8, ud)
        }).collect()
    }
}

/// One-call convenience for the common case: alphabet picked automatically,
/// default validity, no SMSC.
pub fn encode_sms_submit(number: &str, text: &str) -> MessagingResult<Vec<Pdu>> {
    SmsSubmit::new(number, text)?.to_pdus()
}

/// A decoded SMS-DELIVER: somebody sent you a message.
#[derive(Debug, Clone)]
pub struct SmsDeliver {
    /// Service centre address, if the PDU carried one.
    pub csca: Option<String>,
    /// The sender: `+`-prefixed digits, bare digits, or alphanumeric text.
    pub number: String,
    /// TP-PID.
    pub pid: u8,
    /// The raw TP-DCS octet.
    pub dcs: u8,
    /// The alphabet the DCS selected.
    pub fmt: MessageEncoding,
    /// Service centre timestamp, normalised to UTC.
    pub date: NaiveDateTime,
    /// The decoded message text.
    pub text: String,
    /// The User Data Header, if TP-UDHI was set.
    pub udh: Option<UserDataHeader>,
    /// The raw user data after the UDH (still septet-packed for 7-bit
    /// messages). This is what WAP push reassembly feeds on.
    pub user_data: Vec<u8>,
    /// The first octet, for the flags not broken out above (TP-MMS et al).
    pub first_octet: u8
}
impl SmsDeliver {
    /// TP-MMS, un-inverted: is the service centre holding more messages?
    pub fn more_messages(&self) -> bool {
        self.first_octet & 0b0000_0100 == 0
    }
}

/// A decoded SMS-STATUS-REPORT: the fate of a message you sent with
/// `request_status`.
#[derive(Debug, Clone)]
pub struct SmsStatusReport {
    /// Service centre address, if the PDU carried one.
    pub csca: Option<String>,
    /// TP-MR of the message this report is about.
    pub reference: u8,
    /// Who the original message was delivered (or not) to.
    pub recipient: String,
    /// When the service centre accepted the original message.
    pub scts: NaiveDateTime,
    /// Discharge time - when delivery succeeded/failed/expired. Kept even
    /// for non-zero statuses.
    pub dt: Option<NaiveDateTime>,
    /// Raw TP-ST, if present. Some networks really do omit it.
    pub status: Option<u8>,
    /// Legacy synthetic sender: "SR-OK", "SR-STORED" or "SR-UNKNOWN".
    pub number: String,
    /// Legacy `recipient|scts|dt` rendering.
    pub text: String
}

/// Either kind of mobile-terminated PDU [`decode_sms`] understands.
#[derive(Debug, Clone)]
pub enum DecodedSms {
    Deliver(SmsDeliver),
    StatusReport(SmsStatusReport)
}

/// Decode an SMS-DELIVER or SMS-STATUS-REPORT from its hex representation.
///
/// With `strict` unset, an odd-length hex string loses its final nibble and
/// decoding carries on - some modems really do truncate PDUs like that.
/// Declared lengths running past the (complete) buffer are an error in
/// either mode.
pub fn decode_sms(pdu_hex: &str, strict: bool) -> MessagingResult<DecodedSms> {
    let mut pdu_hex = pdu_hex.trim();
    if !pdu_hex.is_ascii() {
        return Err(MessagingError::InvalidInput("pdu hex is not ASCII".into()));
    }
    if pdu_hex.len() % 2 != 0 {
        if strict {
            return Err(MessagingError::InvalidInput(
                "can not decode an odd-length pdu".into()));
        }
        pdu_hex = &pdu_hex[..pdu_hex.len() - 1];
    }
    let bytes = HexData::decode(pdu_hex)?;
    let mut cur = ByteCursor::new(&bytes);

    let smsc_len = cur.next()? as usize;
    let csca = if smsc_len > 0 {
        let toa = cur.next()?;
        let digits = decode_semi_octets(cur.take(smsc_len - 1)?);
        Some(prefix_international(digits, toa))
    }
    else {
        None
    };

    let first_octet = cur.next()?;
    let decoded = match first_octet & 0b11 {
        0b00 => decode_deliver(&mut cur, csca, first_octet, strict).map(DecodedSms::Deliver),
        0b01 => Err(MessagingError::Unsupported("SMS-SUBMIT-REPORT decoding")),
        0b10 => decode_status_report(&mut cur, csca).map(DecodedSms::StatusReport),
        _ => Err(MessagingError::Unsupported("reserved TP-MTI value"))
    };
    decoded.map_err(|e| match e {
        MessagingError::UnexpectedEnd { offset } => {
            MessagingError::decode("PDU ends in the middle of a field", offset)
        },
        e => e
    })
}

fn prefix_international(digits: String, toa: u8) -> String {
    if AddressType::type_of_number_from_u8(toa) == TypeOfNumber::International {
        format!("+{}", digits)
    }
    else {
        digits
    }
}
/// Unpack BCD semi-octets back into a digit string, skipping filler nibbles.
fn decode_semi_octets(bytes: &[u8]) -> String {
    let mut ret = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        for nib in [b & 0x0F, b >> 4].iter() {
            if *nib != 0xF {
                // weird networks do send A-E; render them like everyone else
                ret.push(std::char::from_digit(*nib as u32, 16).unwrap());
            }
        }
    }
    ret
}
fn decode_address(cur: &mut ByteCursor) -> MessagingResult<String> {
    let digits = cur.next()? as usize;
    let toa = cur.next()?;
    let nbytes = (digits + 1) / 2;
    let raw = cur.take(nbytes)?;
    if AddressType::type_of_number_from_u8(toa) == TypeOfNumber::Alphanumeric {
        // semi-octet-padded GSM septets
        let septets = gsm_encoding::unpack_septets(raw, 0, raw.len() * 8 / 7);
        gsm_encoding::gsm_decode_string(&septets, EncodingPolicy::Strict)
    }
    else {
        Ok(prefix_international(decode_semi_octets(raw), toa))
    }
}

fn decode_deliver(cur: &mut ByteCursor, csca: Option<String>, first_octet: u8,
                  strict: bool) -> MessagingResult<SmsDeliver> {
    let number = decode_address(cur)?;
    let pid = cur.next()?;
    let dcs = cur.next()?;
    let fmt = MessageEncoding::from_dcs(dcs);
    let (local, offset) = decode_timestamp(cur)?;
    let date = local - Duration::minutes(offset);

    let udl = cur.next()? as usize;
    let required = match fmt {
        MessageEncoding::Gsm7Bit => (udl * 7 + 7) / 8,
        _ => udl
    };
    let at = cur.position();
    let ud = if cur.remaining() >= required {
        cur.take(required)?
    }
    else if strict {
        return Err(MessagingError::decode("TP-UD shorter than declared TP-UDL", at));
    }
    else {
        // the odd-nibble case: decode what we were given
        cur.take(cur.remaining())?
    };

    let mut udh = None;
    let mut head_septets = 0;
    let mut data_start = 0;
    if first_octet & 0b0100_0000 != 0 {
        check_offset!(ud, 0, "UDH length");
        let udhl = ud[0] as usize;
        data_start = udhl + 1;
        if ud.len() < data_start {
            return Err(MessagingError::decode("UDH length goes past end of data", at));
        }
        udh = Some(UserDataHeader::try_from(&ud[1..data_start])?);
        head_septets = (data_start * 8 + 6) / 7;
    }
    let text = match fmt {
        MessageEncoding::Gsm7Bit => {
            let septets = gsm_encoding::unpack_septets(ud, head_septets, udl);
            gsm_encoding::gsm_decode_string(&septets, EncodingPolicy::Strict)?
        },
        MessageEncoding::Ucs2 => {
            UTF_16BE.decode(&ud[data_start..], DecoderTrap::Replace).unwrap()
        },
        _ => {
            // 8-bit (and reserved, which we treat the same): Latin-1 text
            ISO_8859_1.decode(&ud[data_start..], DecoderTrap::Replace).unwrap()
        }
    };
    Ok(SmsDeliver {
        csca,
        number,
        pid,
        dcs,
        fmt,
        date,
        text,
        udh,
        user_data: ud[data_start..].to_vec(),
        first_octet
    })
}

fn decode_status_report(cur: &mut ByteCursor, csca: Option<String>)
        -> MessagingResult<SmsStatusReport> {
    let reference = cur.next()?;
    let recipient = decode_address(cur)?;
    let (scts, _) = decode_timestamp(cur)?;
    let scts_str = scts.format("%y/%m/%d %H:%M:%S").to_string();
    // tolerate garbage discharge times; they do happen in the wild
    let dt = match decode_timestamp(cur) {
        Ok((dt, _)) => Some(dt),
        Err(e) => {
            debug!("could not decode discharge time: {}", e);
            None
        }
    };
    let dt_str = dt.map(|d| d.format("%y/%m/%d %H:%M:%S").to_string())
        .unwrap_or_default();

    let (status, number, tail) = match cur.next() {
        Ok(st) => {
            let number = match st {
                0x00 => "SR-OK",
                0x30 => "SR-STORED",
                _ => "SR-UNKNOWN"
            };
            let tail = if st == 0x00 { dt_str } else { String::new() };
            (Some(st), number, tail)
        },
        // yes, it is entirely possible for a status report to come with no
        // status at all
        Err(_) => (None, "SR-UNKNOWN", dt_str)
    };
    let text = format!("{}|{}|{}", recipient, scts_str, tail);
    Ok(SmsStatusReport {
        csca,
        reference,
        recipient,
        scts,
        dt,
        status,
        number: number.into(),
        text
    })
}
