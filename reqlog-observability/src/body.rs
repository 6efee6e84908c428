//! Request body rendering for body logging.
//!
//! Binary payloads are never written out; they are replaced with a
//! placeholder. Everything else is decoded as lossy UTF-8 and capped at the
//! configured byte length.

use regex::Regex;

/// Placeholder written instead of binary content.
pub const BINARY_PLACEHOLDER: &str = "(binary data)";

/// Marker appended to truncated bodies.
pub const TRUNCATION_MARKER: &str = "...";

/// Major media types treated as binary unless the subtype is textual.
const BINARY_TYPES: &[&str] = &["image", "application"];

/// `application/*` subtypes that are safe to log as text.
const TEXTUAL_APPLICATION_SUBTYPES: &[&str] = &["json", "xml", "x-www-form-urlencoded", "javascript"];

pub struct BodyRenderer {
    max_length: usize,
    part_header: Regex,
}

impl BodyRenderer {
    pub fn new(max_length: usize) -> Self {
        Self {
            max_length,
            // header block, major type, subtype, separator, part payload
            part_header: Regex::new(r"(?si)(.+Content-Type:.*?)(\S+)/(\S+)(?:\r\n)*(.+)")
                .expect("static multipart regex is valid"),
        }
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Render `body` for logging. `None` when there is nothing to log.
    pub fn render(&self, content_type: Option<&str>, body: &[u8]) -> Option<String> {
        if body.is_empty() {
            return None;
        }
        let media = content_type.map(MediaType::parse).unwrap_or_default();
        let rendered = if media.is_multipart() {
            match media.boundary.as_deref() {
                Some(boundary) => self.render_multipart(&String::from_utf8_lossy(body), boundary),
                None => String::from_utf8_lossy(body).into_owned(),
            }
        } else if media.is_binary() {
            return Some(BINARY_PLACEHOLDER.to_string());
        } else {
            String::from_utf8_lossy(body).into_owned()
        };
        Some(self.truncate(rendered))
    }

    fn render_multipart(&self, body: &str, boundary: &str) -> String {
        let delimiter = format!("--{boundary}");
        body.split(delimiter.as_str())
            .map(|part| self.render_part(part))
            .collect::<Vec<_>>()
            .join(&delimiter)
    }

    fn render_part(&self, part: &str) -> String {
        let Some(caps) = self.part_header.captures(part) else {
            return part.to_string();
        };
        let major = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
        let minor = caps.get(3).map(|m| m.as_str()).unwrap_or_default();
        let payload = caps.get(4).map(|m| m.as_str()).unwrap_or_default();
        let media = MediaType::parse(&format!("{major}/{minor}"));
        if media.is_binary() && !matches!(payload, "" | "\r\n") {
            self.part_header
                .replace(part, "${1}${2}/${3}\r\n\r\n(binary data)\r\n")
                .into_owned()
        } else {
            part.to_string()
        }
    }

    fn truncate(&self, mut text: String) -> String {
        if text.len() <= self.max_length {
            return text;
        }
        let mut cut = self.max_length;
        while !text.is_char_boundary(cut) {
            cut -= 1;
        }
        text.truncate(cut);
        text.push_str(TRUNCATION_MARKER);
        text
    }
}

#[derive(Debug, Default)]
struct MediaType {
    major: String,
    minor: String,
    boundary: Option<String>,
}

impl MediaType {
    fn parse(raw: &str) -> Self {
        let mut params = raw.split(';');
        let essence = params.next().unwrap_or_default().trim().to_ascii_lowercase();
        let (major, minor) = essence.split_once('/').unwrap_or((essence.as_str(), ""));
        let boundary = params.find_map(|p| {
            let (key, value) = p.trim().split_once('=')?;
            key.eq_ignore_ascii_case("boundary")
                .then(|| value.trim_matches('"').to_string())
        });
        Self {
            major: major.to_string(),
            minor: minor.to_string(),
            boundary,
        }
    }

    fn is_multipart(&self) -> bool {
        self.major == "multipart"
    }

    fn is_binary(&self) -> bool {
        if !BINARY_TYPES.contains(&self.major.as_str()) {
            return false;
        }
        let textual = TEXTUAL_APPLICATION_SUBTYPES.contains(&self.minor.as_str())
            || self.minor.ends_with("+json")
            || self.minor.ends_with("+xml");
        !(self.major == "application" && textual)
    }
}
