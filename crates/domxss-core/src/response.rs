//! HTTP response boundary
//!
//! Acquisition of responses belongs to the host scanner. This module only
//! describes what the analyzer needs from one: its URL, an identifier, a
//! content type and the raw body.

#[derive(Debug, thiserror::Error)]
pub enum ResponseError {
    #[error("Response body of '{url}' is not valid UTF-8: {source}")]
    Decode {
        url: String,
        source: std::str::Utf8Error,
    },
}

const TEXT_OR_HTML_TYPES: &[&str] = &[
    "text/",
    "application/xhtml+xml",
    "application/xml",
    "application/javascript",
    "application/x-javascript",
    "application/json",
];

pub trait Response: Send + Sync {
    fn url(&self) -> &str;
    fn id(&self) -> u64;
    fn content_type(&self) -> Option<&str>;
    fn raw_body(&self) -> &[u8];

    /// Gate deciding whether the body is worth grepping at all.
    fn is_text_or_html(&self) -> bool {
        match self.content_type() {
            Some(content_type) => is_text_or_html_type(content_type),
            None => false,
        }
    }

    fn body(&self) -> Result<&str, ResponseError> {
        std::str::from_utf8(self.raw_body()).map_err(|e| ResponseError::Decode {
            url: self.url().to_string(),
            source: e,
        })
    }
}

pub fn is_text_or_html_type(content_type: &str) -> bool {
    let media_type = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    TEXT_OR_HTML_TYPES
        .iter()
        .any(|prefix| media_type.starts_with(prefix))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    url: String,
    id: u64,
    content_type: Option<String>,
    body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(url: &str, id: u64, body: impl Into<Vec<u8>>) -> Self {
        Self {
            url: url.to_string(),
            id,
            content_type: None,
            body: body.into(),
        }
    }

    pub fn html(url: &str, id: u64, body: &str) -> Self {
        Self::new(url, id, body).with_content_type("text/html; charset=utf-8")
    }

    pub fn with_content_type(mut self, content_type: &str) -> Self {
        self.content_type = Some(content_type.to_string());
        self
    }
}

impl Response for HttpResponse {
    fn url(&self) -> &str {
        &self.url
    }

    fn id(&self) -> u64 {
        self.id
    }

    fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    fn raw_body(&self) -> &[u8] {
        &self.body
    }
}
