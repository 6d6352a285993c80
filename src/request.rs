use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::RequestError;

pub const PROMPT_MARKER: &str = "<<PROMPT>>";
pub const IMAGE_MARKER: &str = "<<BASE64_IMAGE>>";
pub const AUDIO_MARKER: &str = "<<BASE64_AUDIO>>";
pub const FILE_MARKER: &str = "multipart/form-data";

/// Input kind a request template expects besides the text prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Modality {
    Text,
    Image,
    Audio,
    Files,
    Mixed,
}

impl Modality {
    pub fn as_str(self) -> &'static str {
        match self {
            Modality::Text => "Text",
            Modality::Image => "Image",
            Modality::Audio => "Audio",
            Modality::Files => "Files",
            Modality::Mixed => "Mixed",
        }
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP-like request description split into its parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestTemplate {
    pub method: String,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: String,
    pub has_files: bool,
    pub has_image: bool,
    pub has_audio: bool,
}

/// Values substituted into a template body by [`RequestTemplate::render`].
#[derive(Debug, Clone, Default)]
pub struct Substitutions<'a> {
    pub prompt: &'a str,
    pub encoded_image: Option<&'a str>,
    pub encoded_audio: Option<&'a str>,
}

impl RequestTemplate {
    /// Parses `METHOD URL`, then `Key: Value` headers up to the first blank
    /// line, then the non-blank body lines.
    pub fn parse(text: &str) -> Result<Self, RequestError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(RequestError::Empty);
        }

        let mut lines = trimmed.lines();
        let request_line = lines.next().unwrap_or_default();
        let mut parts = request_line.split(' ');
        let (method, url) = match (parts.next(), parts.next()) {
            (Some(method), Some(url)) if !method.is_empty() && !url.is_empty() => {
                (method.to_string(), url.to_string())
            }
            _ => return Err(RequestError::InvalidRequestLine(request_line.to_string())),
        };

        let mut headers = BTreeMap::new();
        let mut body_lines = Vec::new();
        let mut reading_headers = true;
        for line in lines {
            // Blank lines end the header block and are dropped from the body.
            if line.is_empty() {
                reading_headers = false;
                continue;
            }
            if reading_headers {
                let mut fields = line.split(": ");
                match (fields.next(), fields.next(), fields.next()) {
                    (Some(key), Some(value), None) => {
                        headers.insert(key.to_string(), value.to_string());
                    }
                    _ => return Err(RequestError::InvalidHeader(line.to_string())),
                }
            } else {
                body_lines.push(line);
            }
        }
        let body = body_lines.join("\n");

        let has_files = headers
            .get("Content-Type")
            .is_some_and(|value| value.contains(FILE_MARKER));
        let has_image = body.contains(IMAGE_MARKER);
        let has_audio = body.contains(AUDIO_MARKER);

        Ok(Self {
            method,
            url,
            headers,
            body,
            has_files,
            has_image,
            has_audio,
        })
    }

    pub fn modality(&self) -> Modality {
        if self.has_image {
            Modality::Image
        } else if self.has_audio {
            Modality::Audio
        } else if self.has_files {
            Modality::Files
        } else {
            Modality::Text
        }
    }

    /// Produces the request body with every placeholder filled in.
    pub fn render(&self, subs: &Substitutions<'_>) -> Result<String, RequestError> {
        if self.has_files {
            return Err(RequestError::FilesNotSupported);
        }
        let image = match (self.has_image, subs.encoded_image) {
            (true, None) | (true, Some("")) => return Err(RequestError::MissingImage),
            (_, image) => image.unwrap_or_default(),
        };
        let audio = match (self.has_audio, subs.encoded_audio) {
            (true, None) | (true, Some("")) => return Err(RequestError::MissingAudio),
            (_, audio) => audio.unwrap_or_default(),
        };

        Ok(self
            .body
            .replace(PROMPT_MARKER, &escape_for_json(subs.prompt))
            .replace(IMAGE_MARKER, image)
            .replace(AUDIO_MARKER, audio))
    }
}

impl FromStr for RequestTemplate {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Escapes a prompt for inclusion inside a JSON string literal.
pub fn escape_for_json(prompt: &str) -> String {
    let mut escaped = String::with_capacity(prompt.len());
    for ch in prompt.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_handles_backslash_before_quotes() {
        assert_eq!(escape_for_json(r#"a\"b"#), r#"a\\\"b"#);
        assert_eq!(escape_for_json("line\nnext\ttab\r"), "line\\nnext\\ttab\\r");
    }

    #[test]
    fn extra_request_line_tokens_are_ignored() {
        let parsed = RequestTemplate::parse("GET http://host/x HTTP/1.1\n").unwrap();
        assert_eq!(parsed.method, "GET");
        assert_eq!(parsed.url, "http://host/x");
    }
}
