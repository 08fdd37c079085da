//! High-level MMS message types: the header map, the body parts, and the
//! slide-deck convenience layer that renders a SMIL part.
//!
//! An [`MmsMessage`] can be built up (headers, [`MmsPage`] slides,
//! standalone [`DataPart`]s) and encoded with [`MmsMessage::encode`], or
//! parsed from bytes with [`MmsMessage::from_data`]. The wire grammar
//! itself lives in [`codec`].

use crate::errors::{MessagingError, MessagingResult};
use crate::wsp::Parameters;
use bytes::Bytes;
use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use std::path::Path;

pub mod codec;

/// A decoded (or to-be-encoded) MMS header value; which variant a header
/// uses is dictated by the assigned-numbers table in [`codec`].
///
/// Encoded-string values (addresses, subjects) are exposed as Latin-1
/// strings: every payload byte maps to the code point of the same value, so
/// nothing is lost even when a producer used some other charset.
#[derive(Debug, Clone, PartialEq)]
pub enum MmsValue {
    Str(String),
    Int(u64),
    Bool(bool),
    Date(NaiveDateTime),
    ContentType(String, Parameters)
}
impl MmsValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MmsValue::Str(s) => Some(s),
            _ => None
        }
    }
    pub fn as_int(&self) -> Option<u64> {
        match self {
            MmsValue::Int(i) => Some(*i),
            _ => None
        }
    }
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            MmsValue::Bool(b) => Some(*b),
            _ => None
        }
    }
    pub fn as_date(&self) -> Option<NaiveDateTime> {
        match self {
            MmsValue::Date(d) => Some(*d),
            _ => None
        }
    }
    pub fn as_content_type(&self) -> Option<(&str, &Parameters)> {
        match self {
            MmsValue::ContentType(ct, params) => Some((ct, params)),
            _ => None
        }
    }
}

/// A data entry in the MMS body: some content, its type (plus parameters),
/// and any extra part headers (Content-ID, Content-Location...).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataPart {
    pub content_type: String,
    pub content_type_parameters: Parameters,
    pub headers: BTreeMap<String, String>,
    data: Vec<u8>
}
impl DataPart {
    pub fn new(data: Vec<u8>, content_type: &str) -> DataPart {
        DataPart {
            content_type: content_type.into(),
            content_type_parameters: Parameters::new(),
            headers: BTreeMap::new(),
            data
        }
    }
    /// A `text/plain` part holding `text`.
    pub fn text(text: &str) -> DataPart {
        DataPart::new(text.as_bytes().to_vec(), "text/plain")
    }
    /// Load a part from a file, guessing the content type from the
    /// extension and setting Content-Location to the file name.
    pub fn from_file<P: AsRef<Path>>(path: P) -> MessagingResult<DataPart> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|e| {
            MessagingError::InvalidInput(format!("could not read {}: {}", path.display(), e))
        })?;
        let mut part = DataPart::new(data, guess_content_type(path));
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            part.headers.insert("Content-Location".into(), name.into());
        }
        Ok(part)
    }
    pub fn data(&self) -> &[u8] {
        &self.data
    }
    pub fn len(&self) -> usize {
        self.data.len()
    }
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
fn guess_content_type(path: &Path) -> &'static str {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "png" => "image/png",
        "wbmp" => "image/vnd.wap.wbmp",
        "amr" => "audio/amr",
        "mid" | "midi" => "audio/midi",
        "txt" => "text/plain",
        "smil" => "application/smil",
        _ => "application/octet-stream"
    }
}

/// A single slide in an MMS slide deck: at most one image, one audio clip
/// and one block of text, plus a display duration.
///
/// The begin/end arguments to the `add_*` methods open a display window (in
/// milliseconds) within the slide; zero means "the whole slide", and a
/// window running past the slide duration is clipped when the SMIL is
/// rendered.
#[derive(Debug, Clone, Default)]
pub struct MmsPage {
    duration: u32,
    image: Option<(DataPart, u32, u32)>,
    audio: Option<(DataPart, u32, u32)>,
    text: Option<(DataPart, u32, u32)>
}
impl MmsPage {
    pub fn new() -> MmsPage {
        MmsPage { duration: 4000, ..Default::default() }
    }
    fn check_window(time_begin: u32, time_end: u32) -> MessagingResult<()> {
        if time_end > 0 && time_end < time_begin {
            return Err(MessagingError::encode("time_end cannot be lower than time_begin"));
        }
        Ok(())
    }
    pub fn add_image(&mut self, part: DataPart, time_begin: u32, time_end: u32)
            -> MessagingResult<()> {
        Self::check_window(time_begin, time_end)?;
        self.image = Some((part, time_begin, time_end));
        Ok(())
    }
    pub fn add_audio(&mut self, part: DataPart, time_begin: u32, time_end: u32)
            -> MessagingResult<()> {
        Self::check_window(time_begin, time_end)?;
        self.audio = Some((part, time_begin, time_end));
        Ok(())
    }
    pub fn add_text(&mut self, text: &str, time_begin: u32, time_end: u32)
            -> MessagingResult<()> {
        Self::check_window(time_begin, time_end)?;
        self.text = Some((DataPart::text(text), time_begin, time_end));
        Ok(())
    }
    /// How long the slide is displayed, in milliseconds. Must be non-zero.
    pub fn set_duration(&mut self, duration: u32) -> MessagingResult<()> {
        if duration < 1 {
            return Err(MessagingError::encode("duration may not be 0"));
        }
        self.duration = duration;
        Ok(())
    }
    pub fn duration(&self) -> u32 {
        self.duration
    }
    pub fn image(&self) -> Option<&(DataPart, u32, u32)> {
        self.image.as_ref()
    }
    pub fn audio(&self) -> Option<&(DataPart, u32, u32)> {
        self.audio.as_ref()
    }
    pub fn text(&self) -> Option<&(DataPart, u32, u32)> {
        self.text.as_ref()
    }
    pub fn number_of_parts(&self) -> usize {
        [self.image.is_some(), self.audio.is_some(), self.text.is_some()]
            .iter().filter(|p| **p).count()
    }
}

/// An MMS message: a header map plus body parts, with optional slides.
#[derive(Debug, Clone)]
pub struct MmsMessage {
    /// The message headers. A repeated header keeps its last occurrence.
    pub headers: BTreeMap<String, MmsValue>,
    pages: Vec<MmsPage>,
    data_parts: Vec<DataPart>,
    /// root-layout width for the rendered SMIL.
    pub width: u32,
    /// root-layout height for the rendered SMIL.
    pub height: u32
}
impl Default for MmsMessage {
    fn default() -> Self {
        Self::new()
    }
}
impl MmsMessage {
    pub fn new() -> MmsMessage {
        let mut headers = BTreeMap::new();
        headers.insert("Message-Type".into(), MmsValue::Str("m-send-req".into()));
        headers.insert("Transaction-Id".into(), MmsValue::Str("1234".into()));
        headers.insert("MMS-Version".into(), MmsValue::Str("1.0".into()));
        headers.insert("Content-Type".into(),
                       MmsValue::ContentType("application/vnd.wap.multipart.mixed".into(),
                                             Parameters::new()));
        MmsMessage {
            headers,
            pages: vec![],
            data_parts: vec![],
            width: 176,
            height: 220
        }
    }
    /// The message's content type, sans parameters.
    pub fn content_type(&self) -> &str {
        self.headers.get("Content-Type")
            .and_then(|v| v.as_content_type())
            .map(|(ct, _)| ct)
            .unwrap_or("application/vnd.wap.multipart.mixed")
    }
    /// Add a slide. The first slide flips the content type to
    /// `application/vnd.wap.multipart.related` (a SMIL part will be
    /// generated on encode).
    pub fn add_page(&mut self, page: MmsPage) {
        if self.content_type() != "application/vnd.wap.multipart.related" {
            self.headers.insert("Content-Type".into(),
                MmsValue::ContentType("application/vnd.wap.multipart.related".into(),
                                      Parameters::new()));
        }
        self.pages.push(page);
    }
    pub fn pages(&self) -> &[MmsPage] {
        &self.pages
    }
    /// Add a standalone data part, not tied to any slide. This is the way
    /// to build `multipart.mixed` messages without SMIL.
    pub fn add_data_part(&mut self, part: DataPart) {
        self.data_parts.push(part);
    }
    pub fn data_parts(&self) -> &[DataPart] {
        &self.data_parts
    }
    /// Binary-encode the message. See [`codec::encode_mms`].
    pub fn encode(&self) -> MessagingResult<Bytes> {
        codec::encode_mms(self)
    }
    /// Decode a message from bytes. See [`codec::decode_mms`].
    pub fn from_data(data: &[u8]) -> MessagingResult<MmsMessage> {
        codec::decode_mms(data)
    }

    /// Render the SMIL document describing this message's slides.
    pub fn smil(&self) -> String {
        let mut out = String::new();
        out.push_str("<smil>\n<head>\n<layout>\n");
        out.push_str(&format!("<root-layout width=\"{}\" height=\"{}\"/>\n",
                              self.width, self.height));
        for (id, left, top, width, height) in
                [("Image", 0, 0, 176, 144), ("Text", 176, 144, 176, 76)].iter() {
            out.push_str(&format!(
                "<region id=\"{}\" left=\"{}\" top=\"{}\" width=\"{}\" height=\"{}\"/>\n",
                id, left, top, width, height));
        }
        out.push_str("</layout>\n</head>\n<body>\n");
        for page in &self.pages {
            out.push_str(&format!("<par dur=\"{}ms\">\n", page.duration));
            if let Some((part, begin, end)) = &page.image {
                smil_element(&mut out, "img", part, *begin, *end, page.duration,
                             Some("Image"));
            }
            if let Some((part, begin, end)) = &page.text {
                smil_element(&mut out, "text", part, *begin, *end, page.duration,
                             Some("Text"));
            }
            if let Some((part, begin, end)) = &page.audio {
                smil_element(&mut out, "audio", part, *begin, *end, page.duration, None);
            }
            out.push_str("</par>\n");
        }
        out.push_str("</body>\n</smil>\n");
        out
    }
}
fn smil_element(out: &mut String, tag: &str, part: &DataPart, begin: u32, mut end: u32,
                duration: u32, region: Option<&str>) {
    let src = part.headers.get("Content-Location")
        .or_else(|| part.headers.get("Content-ID"))
        .cloned()
        .unwrap_or_else(|| String::from_utf8_lossy(part.data()).into_owned());
    out.push_str(&format!("<{} src=\"{}\"", tag, xml_escape(&src)));
    if let Some(region) = region {
        out.push_str(&format!(" region=\"{}\"", region));
    }
    if begin > 0 || end > 0 {
        if end > duration {
            end = duration;
        }
        out.push_str(&format!(" begin=\"{}ms\" end=\"{}ms\"", begin, end));
    }
    out.push_str("/>\n");
}
fn xml_escape(s: &str) -> String {
    let mut ret = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => ret.push_str("&amp;"),
            '<' => ret.push_str("&lt;"),
            '>' => ret.push_str("&gt;"),
            '"' => ret.push_str("&quot;"),
            c => ret.push(c)
        }
    }
    ret
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adding_a_page_switches_content_type() {
        let mut msg = MmsMessage::new();
        assert_eq!(msg.content_type(), "application/vnd.wap.multipart.mixed");
        msg.add_page(MmsPage::new());
        assert_eq!(msg.content_type(), "application/vnd.wap.multipart.related");
    }
    #[test]
    fn page_part_counting() {
        let mut page = MmsPage::new();
        assert_eq!(page.number_of_parts(), 0);
        page.add_text("hi", 0, 0).unwrap();
        page.add_image(DataPart::new(vec![0xFF, 0xD8], "image/jpeg"), 0, 0).unwrap();
        assert_eq!(page.number_of_parts(), 2);
    }
    #[test]
    fn page_window_validation() {
        let mut page = MmsPage::new();
        assert!(page.add_text("hi", 500, 100).is_err());
        assert!(page.add_text("hi", 100, 500).is_ok());
        assert!(page.set_duration(0).is_err());
        assert!(page.set_duration(1000).is_ok());
    }
    #[test]
    fn smil_layout_and_elements() {
        let mut msg = MmsMessage::new();
        let mut page = MmsPage::new();
        let mut img = DataPart::new(vec![1, 2, 3], "image/jpeg");
        img.headers.insert("Content-Location".into(), "photo.jpg".into());
        page.add_image(img, 0, 0).unwrap();
        page.add_text("hello", 1000, 9999).unwrap();
        msg.add_page(page);
        let smil = msg.smil();
        assert!(smil.contains("<root-layout width=\"176\" height=\"220\"/>"));
        assert!(smil.contains(
            "<region id=\"Image\" left=\"0\" top=\"0\" width=\"176\" height=\"144\"/>"));
        assert!(smil.contains(
            "<region id=\"Text\" left=\"176\" top=\"144\" width=\"176\" height=\"76\"/>"));
        assert!(smil.contains("<par dur=\"4000ms\">"));
        assert!(smil.contains("<img src=\"photo.jpg\" region=\"Image\"/>"));
        // the text window is clipped to the slide duration
        assert!(smil.contains("<text src=\"hello\" region=\"Text\" \
                               begin=\"1000ms\" end=\"4000ms\"/>"));
    }
    #[test]
    fn smil_escapes_attribute_text() {
        let mut msg = MmsMessage::new();
        let mut page = MmsPage::new();
        page.add_text("a<b&c\"d", 0, 0).unwrap();
        msg.add_page(page);
        assert!(msg.smil().contains("a&lt;b&amp;c&quot;d"));
    }
    #[test]
    fn smil_inline_text_survives_non_ascii() {
        let mut msg = MmsMessage::new();
        let mut page = MmsPage::new();
        page.add_text("Grüße, Δelta", 0, 0).unwrap();
        msg.add_page(page);
        assert!(msg.smil().contains("<text src=\"Grüße, Δelta\" region=\"Text\"/>"));
    }
}
