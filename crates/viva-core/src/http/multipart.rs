//! `multipart/form-data` bodies for essay uploads.
//!
//! The form is a plain list of parts until the client sends it; encoding is
//! delegated to the `multipart` crate's lazy writer.

use std::io::{self, Cursor, Read};

use mime::Mime;
use multipart::client::lazy::Multipart;

#[derive(Debug, Clone)]
enum Part {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        filename: String,
        content_type: String,
        data: Vec<u8>,
    },
}

/// Form fields and files to send as `multipart/form-data`.
#[derive(Debug, Clone, Default)]
pub struct MultipartForm {
    parts: Vec<Part>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a plain text field.
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(Part::Text {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Add a file field. An unparseable content type falls back to a guess
    /// from the filename.
    pub fn file(
        mut self,
        name: impl Into<String>,
        filename: impl Into<String>,
        content_type: impl Into<String>,
        data: Vec<u8>,
    ) -> Self {
        self.parts.push(Part::File {
            name: name.into(),
            filename: filename.into(),
            content_type: content_type.into(),
            data,
        });
        self
    }

    /// Encode with a fresh boundary, returning `(content_type, body)`.
    pub fn encode(&self) -> io::Result<(String, Vec<u8>)> {
        let mut writer = Multipart::new();
        for part in &self.parts {
            match part {
                Part::Text { name, value } => {
                    writer.add_text(name.as_str(), value.as_str());
                }
                Part::File {
                    name,
                    filename,
                    content_type,
                    data,
                } => {
                    let mime = content_type.parse::<Mime>().ok();
                    writer.add_stream(
                        name.as_str(),
                        Cursor::new(data.as_slice()),
                        Some(filename.as_str()),
                        mime,
                    );
                }
            }
        }

        let mut prepared = writer.prepare().map_err(|e| e.error)?;
        let content_type = format!("multipart/form-data; boundary={}", prepared.boundary());
        let mut body = Vec::new();
        prepared.read_to_end(&mut body)?;
        Ok((content_type, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boundary_of(content_type: &str) -> &str {
        content_type
            .strip_prefix("multipart/form-data; boundary=")
            .unwrap()
    }

    #[test]
    fn encodes_text_and_file_parts() {
        let form = MultipartForm::new()
            .text("content", "Hello world")
            .file("image", "cover.png", "image/png", vec![1, 2, 3]);

        let (content_type, body) = form.encode().unwrap();
        let boundary = boundary_of(&content_type).to_string();
        let text = String::from_utf8_lossy(&body);

        assert!(text.contains(&format!("--{boundary}\r\n")));
        assert!(text.contains("Content-Disposition: form-data; name=\"content\""));
        assert!(text.contains("\r\n\r\nHello world\r\n"));
        assert!(text.contains("name=\"image\"; filename=\"cover.png\""));
        assert!(text.contains("Content-Type: image/png"));
        assert!(text.trim_end().ends_with(&format!("--{boundary}--")));

        let data_at = body.windows(3).position(|w| w == [1, 2, 3]);
        assert!(data_at.is_some());
    }

    #[test]
    fn text_parts_keep_their_order() {
        let form = MultipartForm::new().text("first", "1").text("second", "2");
        let (_, body) = form.encode().unwrap();
        let text = String::from_utf8(body).unwrap();

        let first = text.find("name=\"first\"").unwrap();
        let second = text.find("name=\"second\"").unwrap();
        assert!(first < second);
    }

    #[test]
    fn boundaries_differ_between_encodings() {
        let form = MultipartForm::new().text("content", "x");
        let (a, _) = form.encode().unwrap();
        let (b, _) = form.encode().unwrap();
        assert_ne!(boundary_of(&a), boundary_of(&b));
    }
}
