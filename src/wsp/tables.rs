//! The WAP-230 assigned-numbers tables: content types, well-known
//! parameters, header field names and charsets.
//!
//! Each table grew across WSP encoding versions 1.1 through 1.4, so lookups
//! are keyed by [`Version`]; codes assigned after the requested version are
//! invisible to it.

use crate::errors::{MessagingError, MessagingResult};

/// A WSP encoding version. Everything defaults to 1.2, which is what the
/// MMS encapsulation (WAP-209) assumes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Version {
    V1_1,
    V1_2,
    V1_3,
    V1_4
}
impl Default for Version {
    fn default() -> Self {
        Version::V1_2
    }
}
impl Version {
    /// Parse `"1.1"`..`"1.4"`; anything else fails before any wire input is
    /// consumed.
    pub fn from_str(s: &str) -> MessagingResult<Version> {
        match s {
            "1.1" => Ok(Version::V1_1),
            "1.2" => Ok(Version::V1_2),
            "1.3" => Ok(Version::V1_3),
            "1.4" => Ok(Version::V1_4),
            _ => Err(MessagingError::decode(
                format!("invalid WSP encoding version {:?}", s), 0))
        }
    }
}

/// Content type assignments (WAP-230 table 40), indexed by assigned number.
pub static WELL_KNOWN_CONTENT_TYPES: [&str; 76] = [
    "*/*", "text/*", "text/html", "text/plain",
    "text/x-hdml", "text/x-ttml", "text/x-vCalendar",
    "text/x-vCard", "text/vnd.wap.wml",
    "text/vnd.wap.wmlscript", "text/vnd.wap.wta-event",
    "multipart/*", "multipart/mixed", "multipart/form-data",
    "multipart/byterantes", "multipart/alternative",
    "application/*", "application/java-vm",
    "application/x-www-form-urlencoded",
    "application/x-hdmlc", "application/vnd.wap.wmlc",
    "application/vnd.wap.wmlscriptc",
    "application/vnd.wap.wta-eventc",
    "application/vnd.wap.uaprof",
    "application/vnd.wap.wtls-ca-certificate",
    "application/vnd.wap.wtls-user-certificate",
    "application/x-x509-ca-cert",
    "application/x-x509-user-cert",
    "image/*", "image/gif", "image/jpeg", "image/tiff",
    "image/png", "image/vnd.wap.wbmp",
    "application/vnd.wap.multipart.*",
    "application/vnd.wap.multipart.mixed",
    "application/vnd.wap.multipart.form-data",
    "application/vnd.wap.multipart.byteranges",
    "application/vnd.wap.multipart.alternative",
    "application/xml", "text/xml",
    "application/vnd.wap.wbxml",
    "application/x-x968-cross-cert",
    "application/x-x968-ca-cert",
    "application/x-x968-user-cert",
    "text/vnd.wap.si",
    "application/vnd.wap.sic",
    "text/vnd.wap.sl",
    "application/vnd.wap.slc",
    "text/vnd.wap.co",
    "application/vnd.wap.coc",
    "application/vnd.wap.multipart.related",
    "application/vnd.wap.sia",
    "text/vnd.wap.connectivity-xml",
    "application/vnd.wap.connectivity-wbxml",
    "application/pkcs7-mime",
    "application/vnd.wap.hashed-certificate",
    "application/vnd.wap.signed-certificate",
    "application/vnd.wap.cert-response",
    "application/xhtml+xml",
    "application/wml+xml",
    "text/css",
    "application/vnd.wap.mms-message",
    "application/vnd.wap.rollover-certificate",
    "application/vnd.wap.locc+wbxml",
    "application/vnd.wap.loc+xml",
    "application/vnd.syncml.dm+wbxml",
    "application/vnd.syncml.dm+xml",
    "application/vnd.syncml.notification",
    "application/vnd.wap.xhtml+xml",
    "application/vnd.wv.csp.cir",
    "application/vnd.oma.dd+xml",
    "application/vnd.oma.drm.message",
    "application/vnd.oma.drm.content",
    "application/vnd.oma.drm.rights+xml",
    "application/vnd.oma.drm.rights+wbxml"
];
pub fn content_type_from_code(code: u64) -> Option<&'static str> {
    WELL_KNOWN_CONTENT_TYPES.get(code as usize).copied()
}
pub fn content_type_code(name: &str) -> Option<u8> {
    WELL_KNOWN_CONTENT_TYPES.iter().position(|ct| *ct == name).map(|i| i as u8)
}

/// How a typed parameter's value is encoded on the wire.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ParamKind {
    QValue,
    WellKnownCharset,
    VersionValue,
    IntegerValue,
    TextString,
    FieldName,
    ShortInteger,
    ConstrainedEncoding,
    TextValue,
    DeltaSecondsValue,
    NoValue,
    DateValue
}
pub struct ParamDef {
    pub code: u8,
    pub name: &'static str,
    pub kind: ParamKind,
    pub since: Version
}
/// Well-known parameter assignments (WAP-230 table 38). Several names got
/// re-assigned under later versions with a different value kind; encoding
/// picks the highest code the chosen version admits.
pub static WELL_KNOWN_PARAMETERS: [ParamDef; 29] = [
    ParamDef { code: 0x00, name: "Q", kind: ParamKind::QValue, since: Version::V1_1 },
    ParamDef { code: 0x01, name: "Charset", kind: ParamKind::WellKnownCharset, since: Version::V1_1 },
    ParamDef { code: 0x02, name: "Level", kind: ParamKind::VersionValue, since: Version::V1_1 },
    ParamDef { code: 0x03, name: "Type", kind: ParamKind::IntegerValue, since: Version::V1_1 },
    ParamDef { code: 0x05, name: "Name", kind: ParamKind::TextString, since: Version::V1_1 },
    ParamDef { code: 0x06, name: "Filename", kind: ParamKind::TextString, since: Version::V1_1 },
    ParamDef { code: 0x07, name: "Differences", kind: ParamKind::FieldName, since: Version::V1_1 },
    ParamDef { code: 0x08, name: "Padding", kind: ParamKind::ShortInteger, since: Version::V1_1 },
    ParamDef { code: 0x09, name: "Type", kind: ParamKind::ConstrainedEncoding, since: Version::V1_2 },
    ParamDef { code: 0x0A, name: "Start", kind: ParamKind::TextString, since: Version::V1_2 },
    ParamDef { code: 0x0B, name: "Start-info", kind: ParamKind::TextString, since: Version::V1_2 },
    ParamDef { code: 0x0C, name: "Comment", kind: ParamKind::TextString, since: Version::V1_3 },
    ParamDef { code: 0x0D, name: "Domain", kind: ParamKind::TextString, since: Version::V1_3 },
    ParamDef { code: 0x0E, name: "Max-Age", kind: ParamKind::DeltaSecondsValue, since: Version::V1_3 },
    ParamDef { code: 0x0F, name: "Path", kind: ParamKind::TextString, since: Version::V1_3 },
    ParamDef { code: 0x10, name: "Secure", kind: ParamKind::NoValue, since: Version::V1_3 },
    ParamDef { code: 0x11, name: "SEC", kind: ParamKind::ShortInteger, since: Version::V1_4 },
    ParamDef { code: 0x12, name: "MAC", kind: ParamKind::TextValue, since: Version::V1_4 },
    ParamDef { code: 0x13, name: "Creation-date", kind: ParamKind::DateValue, since: Version::V1_4 },
    ParamDef { code: 0x14, name: "Modification-date", kind: ParamKind::DateValue, since: Version::V1_4 },
    ParamDef { code: 0x15, name: "Read-date", kind: ParamKind::DateValue, since: Version::V1_4 },
    ParamDef { code: 0x16, name: "Size", kind: ParamKind::IntegerValue, since: Version::V1_4 },
    ParamDef { code: 0x17, name: "Name", kind: ParamKind::TextValue, since: Version::V1_4 },
    ParamDef { code: 0x18, name: "Filename", kind: ParamKind::TextValue, since: Version::V1_4 },
    ParamDef { code: 0x19, name: "Start", kind: ParamKind::TextValue, since: Version::V1_4 },
    ParamDef { code: 0x1A, name: "Start-info", kind: ParamKind::TextValue, since: Version::V1_4 },
    ParamDef { code: 0x1B, name: "Comment", kind: ParamKind::TextValue, since: Version::V1_4 },
    ParamDef { code: 0x1C, name: "Domain", kind: ParamKind::TextValue, since: Version::V1_4 },
    ParamDef { code: 0x1D, name: "Path", kind: ParamKind::TextValue, since: Version::V1_4 }
];
/// Look up a parameter definition by assigned number, if `version` knows it.
pub fn well_known_parameter(code: u8, version: Version) -> Option<&'static ParamDef> {
    WELL_KNOWN_PARAMETERS.iter().find(|p| p.code == code && p.since <= version)
}
/// Look up the *highest* assigned number for a parameter name that
/// `version` admits (later assignments supersede earlier ones).
pub fn parameter_code(name: &str, version: Version) -> Option<&'static ParamDef> {
    WELL_KNOWN_PARAMETERS.iter().rev().find(|p| p.name == name && p.since <= version)
}

/// Header field name assignments (WAP-230 table 39), in assigned-number
/// order. Later encoding versions appended (and sometimes re-assigned)
/// names; [`header_field_names`] truncates accordingly.
pub static HEADER_FIELD_NAMES: [&str; 72] = [
    "Accept", "Accept-Charset", "Accept-Encoding",
    "Accept-Language", "Accept-Ranges", "Age",
    "Allow", "Authorization", "Cache-Control",
    "Connection", "Content-Base", "Content-Encoding",
    "Content-Language", "Content-Length",
    "Content-Location", "Content-MD5", "Content-Range",
    "Content-Type", "Date", "Etag", "Expires", "From",
    "Host", "If-Modified-Since", "If-Match",
    "If-None-Match", "If-Range", "If-Unmodified-Since",
    "Location", "Last-Modified", "Max-Forwards", "Pragma",
    "Proxy-Authenticate", "Proxy-Authorization", "Public",
    "Range", "Referer", "Retry-After", "Server",
    "Transfer-Encoding", "Upgrade", "User-Agent",
    "Vary", "Via", "Warning", "WWW-Authenticate",
    "Content-Disposition",
    // encoding version 1.2
    "X-Wap-Application-Id", "X-Wap-Content-URI",
    "X-Wap-Initiator-URI", "Accept-Application",
    "Bearer-Indication", "Push-Flag", "Profile",
    "Profile-Diff", "Profile-Warning",
    // encoding version 1.3
    "Expect", "TE", "Trailer", "Accept-Charset",
    "Accept-Encoding", "Cache-Control",
    "Content-Range", "X-Wap-Tod", "Content-ID",
    "Set-Cookie", "Cookie", "Encoding-Version",
    // encoding version 1.4
    "Profile-Warning", "Content-Disposition",
    "X-WAP-Security", "Cache-Control"
];
/// The header-field-name table as `version` sees it.
pub fn header_field_names(version: Version) -> &'static [&'static str] {
    match version {
        Version::V1_1 => &HEADER_FIELD_NAMES[..0x2F],
        Version::V1_2 => &HEADER_FIELD_NAMES[..0x38],
        Version::V1_3 => &HEADER_FIELD_NAMES[..0x44],
        Version::V1_4 => &HEADER_FIELD_NAMES[..]
    }
}

/// Well-known character sets (WAP-230 table 42). The assigned number is the
/// IANA MIBEnum value; this is by no means a complete list.
pub static WELL_KNOWN_CHARSETS: [(u32, &str); 14] = [
    (0x03, "us-ascii"),
    (0x04, "iso-8859-1"),
    (0x05, "iso-8859-2"),
    (0x06, "iso-8859-3"),
    (0x07, "iso-8859-4"),
    (0x08, "iso-8859-5"),
    (0x09, "iso-8859-6"),
    (0x0A, "iso-8859-7"),
    (0x0B, "iso-8859-8"),
    (0x0C, "iso-8859-9"),
    (0x11, "shift_JIS"),
    (0x6A, "utf-8"),
    (0x3E8, "iso-10646-ucs-2"),
    (0x7EA, "big5")
];
pub fn charset_from_code(code: u64) -> Option<&'static str> {
    WELL_KNOWN_CHARSETS.iter().find(|&&(c, _)| c as u64 == code).map(|&(_, n)| n)
}
pub fn charset_code(name: &str) -> Option<u32> {
    WELL_KNOWN_CHARSETS.iter().find(|&&(_, n)| n == name).map(|&(c, _)| c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_codes_match_assignments() {
        assert_eq!(content_type_from_code(0x00), Some("*/*"));
        assert_eq!(content_type_from_code(0x03), Some("text/plain"));
        assert_eq!(content_type_from_code(0x1E), Some("image/jpeg"));
        assert_eq!(content_type_from_code(0x23), Some("application/vnd.wap.multipart.mixed"));
        assert_eq!(content_type_from_code(0x33), Some("application/vnd.wap.multipart.related"));
        assert_eq!(content_type_from_code(0x3E), Some("application/vnd.wap.mms-message"));
        assert_eq!(content_type_from_code(0x4B), Some("application/vnd.oma.drm.rights+wbxml"));
        assert_eq!(content_type_from_code(0x4C), None);
        assert_eq!(content_type_code("application/vnd.wap.mms-message"), Some(0x3E));
    }
    #[test]
    fn parameters_are_versioned() {
        assert!(well_known_parameter(0x09, Version::V1_1).is_none());
        assert!(well_known_parameter(0x09, Version::V1_2).is_some());
        assert!(well_known_parameter(0x16, Version::V1_3).is_none());
        assert!(well_known_parameter(0x16, Version::V1_4).is_some());
        // "Name" resolves to 0x05 under 1.2 but 0x17 under 1.4
        assert_eq!(parameter_code("Name", Version::V1_2).unwrap().code, 0x05);
        assert_eq!(parameter_code("Name", Version::V1_4).unwrap().code, 0x17);
    }
    #[test]
    fn header_names_truncate_by_version() {
        assert_eq!(header_field_names(Version::V1_1).len(), 0x2F);
        assert_eq!(header_field_names(Version::V1_2).len(), 0x38);
        assert_eq!(header_field_names(Version::V1_3).len(), 0x44);
        assert_eq!(header_field_names(Version::V1_4).len(), 0x48);
        assert_eq!(header_field_names(Version::V1_3)[0x40], "Content-ID");
    }
    #[test]
    fn version_parsing() {
        assert_eq!(Version::from_str("1.2").unwrap(), Version::default());
        assert!(Version::from_str("2.0").is_err());
        assert!(Version::from_str("").is_err());
    }
    #[test]
    fn charsets() {
        assert_eq!(charset_from_code(0x6A), Some("utf-8"));
        assert_eq!(charset_from_code(0x3E8), Some("iso-10646-ucs-2"));
        assert_eq!(charset_code("big5"), Some(0x7EA));
        assert_eq!(charset_from_code(0x42), None);
    }
}
