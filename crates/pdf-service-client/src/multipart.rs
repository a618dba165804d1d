//! Minimal `multipart/form-data` encoder for the upload endpoints

use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_BOUNDARY: AtomicU64 = AtomicU64::new(1);

/// A form body under construction
#[derive(Debug)]
pub struct MultipartForm {
    boundary: String,
    body: Vec<u8>,
}

impl Default for MultipartForm {
    fn default() -> Self {
        Self::new()
    }
}

impl MultipartForm {
    pub fn new() -> Self {
        let n = NEXT_BOUNDARY.fetch_add(1, Ordering::Relaxed);
        Self::with_boundary(format!("----pdf-fields-boundary-{:016x}", n))
    }

    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            body: Vec::new(),
        }
    }

    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    fn open_part(&mut self, disposition: &str, content_type: &str) {
        self.body.extend_from_slice(b"--");
        self.body.extend_from_slice(self.boundary.as_bytes());
        self.body.extend_from_slice(b"\r\n");
        self.body.extend_from_slice(disposition.as_bytes());
        self.body.extend_from_slice(b"\r\n");
        self.body.extend_from_slice(b"Content-Type: ");
        self.body.extend_from_slice(content_type.as_bytes());
        self.body.extend_from_slice(b"\r\n\r\n");
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, data: &[u8]) -> Self {
        let disposition = format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"",
            escape(name),
            escape(file_name)
        );
        self.open_part(&disposition, content_type);
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        let disposition = format!("Content-Disposition: form-data; name=\"{}\"", escape(name));
        self.open_part(&disposition, "text/plain; charset=utf-8");
        self.body.extend_from_slice(value.as_bytes());
        self.body.extend_from_slice(b"\r\n");
        self
    }

    /// Close the form. Returns the content type header and the body.
    pub fn finish(mut self) -> (String, Vec<u8>) {
        self.body.extend_from_slice(b"--");
        self.body.extend_from_slice(self.boundary.as_bytes());
        self.body.extend_from_slice(b"--\r\n");
        (self.content_type(), self.body)
    }
}

fn escape(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace(['\r', '\n'], " ")
}
