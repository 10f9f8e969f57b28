//! Message encoding
//!
//! Builds single-part RFC 822 documents and the unpadded base64url form the
//! Gmail API expects in `raw` fields.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Utc};

/// Body content kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContentKind {
    #[default]
    PlainText,
    Html,
}

impl ContentKind {
    /// Value for the `Content-Type` header
    pub fn content_type(&self) -> &'static str {
        match self {
            ContentKind::PlainText => "text/plain; charset=\"UTF-8\"",
            ContentKind::Html => "text/html; charset=\"UTF-8\"",
        }
    }
}

/// Structured fields of an outbound message
#[derive(Debug, Clone)]
pub struct MailMessageDraft {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
    pub cc: Option<String>,
    pub bcc: Option<String>,
    pub content_kind: ContentKind,
}

impl MailMessageDraft {
    /// Headers in the order they are written, dated `date`
    pub fn headers_at(&self, date: DateTime<Utc>) -> Vec<(&'static str, String)> {
        let mut headers = vec![("From", self.from.clone()), ("To", self.to.clone())];

        if let Some(cc) = self.cc.as_ref().filter(|v| !v.is_empty()) {
            headers.push(("Cc", cc.clone()));
        }
        if let Some(bcc) = self.bcc.as_ref().filter(|v| !v.is_empty()) {
            headers.push(("Bcc", bcc.clone()));
        }

        headers.push(("Subject", encode_mime_header(&self.subject)));
        headers.push(("MIME-Version", "1.0".to_string()));
        headers.push(("Date", date.to_rfc2822()));
        headers.push(("Content-Transfer-Encoding", "8bit".to_string()));
        headers.push(("Content-Type", self.content_kind.content_type().to_string()));

        headers
    }

    /// Render the full document, dated now
    pub fn to_document(&self) -> String {
        render_message(&self.headers_at(Utc::now()), &self.body)
    }

    /// Render and encode, dated now
    pub fn to_raw(&self) -> String {
        build_raw_message(&self.headers_at(Utc::now()), &self.body)
    }
}

/// Join `name: value` lines with CRLF, then a blank line, then the body verbatim
pub fn render_message<K, V>(headers: &[(K, V)], body: &str) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut document = String::new();
    for (name, value) in headers {
        document.push_str(name.as_ref());
        document.push_str(": ");
        document.push_str(value.as_ref());
        document.push_str("\r\n");
    }
    document.push_str("\r\n");
    document.push_str(body);
    document
}

/// Render a message and encode it for a Gmail `raw` field
pub fn build_raw_message<K, V>(headers: &[(K, V)], body: &str) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    encode_raw_message(&render_message(headers, body))
}

/// Encode a document as base64url without padding, over its UTF-8 bytes
pub fn encode_raw_message(document: &str) -> String {
    URL_SAFE_NO_PAD.encode(document.as_bytes())
}

/// Encode text for a MIME header (RFC 2047) when it is not plain ASCII
pub fn encode_mime_header(text: &str) -> String {
    if text.chars().all(|c| c.is_ascii() && c != '\r' && c != '\n') {
        return text.to_string();
    }

    format!(
        "=?UTF-8?B?{}?=",
        base64::engine::general_purpose::STANDARD.encode(text.as_bytes())
    )
}
