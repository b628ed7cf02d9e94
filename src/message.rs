//! The inbound unit of work and its decoding from raw mail payloads.
//!
//! A [`RawMessage`] is created by the transport boundary once per delivered
//! notification and is read-only from the pipeline's point of view. The
//! transport may hand over fields it already has, or use
//! [`RawMessage::from_rfc822`] to decode a raw RFC 822 payload.

use crate::error::{Error, Result};
use chrono::{DateTime, TimeZone, Utc};
use mailparse::MailHeaderMap;
use tracing::debug;

/// An inbound notification email, one unit of pipeline work.
///
/// The `id` is the transport's opaque, unique message identifier; it anchors
/// the idempotency guarantee under at-least-once delivery.
#[derive(Debug, Clone)]
pub struct RawMessage {
    /// Opaque message identifier, unique per message, assigned by the transport.
    pub id: String,
    /// The sender address as it appeared in the From header.
    pub sender: String,
    /// The raw subject line.
    pub subject: String,
    /// The plaintext body.
    pub body: String,
    /// When the message was sent.
    pub date: DateTime<Utc>,
    /// Whether the subject carried a forwarding prefix.
    pub forwarded: bool,
}

impl RawMessage {
    /// Decodes a raw RFC 822 payload into a [`RawMessage`].
    ///
    /// Multipart messages prefer `text/plain` parts, concatenating all of
    /// them; nested `multipart/alternative` parts are descended recursively.
    /// A missing or unparsable Date header falls back to the current time
    /// rather than failing the whole message.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ParseMessage`] if the payload is not valid RFC 822,
    /// or [`Error::ExtractBody`] if no body can be decoded from it. Both are
    /// non-retryable: a malformed payload will not improve on redelivery.
    pub fn from_rfc822(id: impl Into<String>, raw: &[u8]) -> Result<Self> {
        let id = id.into();

        let parsed = mailparse::parse_mail(raw).map_err(|source| Error::ParseMessage {
            message_id: id.clone(),
            source,
        })?;

        let sender = parsed.headers.get_first_value("From").unwrap_or_default();
        let subject = parsed.headers.get_first_value("Subject").unwrap_or_default();
        let forwarded = subject.trim_start().to_lowercase().starts_with("fwd:");

        let date = parsed
            .headers
            .get_first_value("Date")
            .and_then(|raw_date| mailparse::dateparse(&raw_date).ok())
            .and_then(|epoch| Utc.timestamp_opt(epoch, 0).single())
            .unwrap_or_else(Utc::now);

        let body = extract_body_text(&parsed).map_err(|source| Error::ExtractBody {
            message_id: id.clone(),
            source,
        })?;

        debug!(
            message_id = %id,
            body_len = body.len(),
            forwarded,
            "Decoded raw message"
        );

        Ok(Self {
            id,
            sender,
            subject,
            body,
            date,
            forwarded,
        })
    }
}

/// Extracts text content from a parsed email, handling multipart messages.
///
/// All `text/plain` subparts are concatenated; a `multipart/alternative`
/// subpart is descended into. Single-part messages return their body
/// directly.
fn extract_body_text(
    parsed: &mailparse::ParsedMail<'_>,
) -> std::result::Result<String, mailparse::MailParseError> {
    if parsed.subparts.is_empty() {
        return parsed.get_body();
    }

    let mut body = String::new();
    for part in &parsed.subparts {
        let content_type = part.ctype.mimetype.to_lowercase();
        if content_type == "text/plain" {
            body.push_str(&part.get_body()?);
        } else if content_type.starts_with("multipart/") {
            body.push_str(&extract_body_text(part)?);
        }
    }

    // No text parts at all - fall back to the first subpart
    if body.is_empty() {
        if let Some(first) = parsed.subparts.first() {
            return extract_body_text(first);
        }
    }

    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_simple_message() {
        let raw = b"From: forms@example.com\r\n\
            Subject: NEW M LEAD inquiry\r\n\
            Date: Mon, 6 Jan 2025 10:00:00 +0200\r\n\
            \r\n\
            Jane Doe\r\n0821234567\r\njane@example.com\r\nCape Town";

        let msg = RawMessage::from_rfc822("m-1", raw).unwrap();
        assert_eq!(msg.id, "m-1");
        assert_eq!(msg.sender, "forms@example.com");
        assert_eq!(msg.subject, "NEW M LEAD inquiry");
        assert!(!msg.forwarded);
        assert!(msg.body.contains("Jane Doe"));
        assert_eq!(msg.date.timezone(), Utc);
    }

    #[test]
    fn test_forwarded_flag_from_subject() {
        let raw = b"From: a@b.co\r\nSubject: Fwd: NEW M LEAD\r\n\r\nbody";
        let msg = RawMessage::from_rfc822("m-2", raw).unwrap();
        assert!(msg.forwarded);

        let raw = b"From: a@b.co\r\nSubject: FWD: NEW M LEAD\r\n\r\nbody";
        let msg = RawMessage::from_rfc822("m-3", raw).unwrap();
        assert!(msg.forwarded);
    }

    #[test]
    fn test_multipart_prefers_text_plain() {
        let raw = b"From: a@b.co\r\n\
            Subject: SA Home page message\r\n\
            MIME-Version: 1.0\r\n\
            Content-Type: multipart/alternative; boundary=\"sep\"\r\n\
            \r\n\
            --sep\r\n\
            Content-Type: text/plain\r\n\
            \r\n\
            plain body here\r\n\
            --sep\r\n\
            Content-Type: text/html\r\n\
            \r\n\
            <p>html body here</p>\r\n\
            --sep--\r\n";

        let msg = RawMessage::from_rfc822("m-4", raw).unwrap();
        assert!(msg.body.contains("plain body here"));
        assert!(!msg.body.contains("<p>"));
    }

    #[test]
    fn test_missing_date_falls_back() {
        let raw = b"From: a@b.co\r\nSubject: x\r\n\r\nbody";
        let before = Utc::now();
        let msg = RawMessage::from_rfc822("m-5", raw).unwrap();
        assert!(msg.date >= before);
    }

    #[test]
    fn test_missing_headers_yield_empty_strings() {
        let raw = b"\r\njust a body";
        let msg = RawMessage::from_rfc822("m-6", raw).unwrap();
        assert_eq!(msg.sender, "");
        assert_eq!(msg.subject, "");
        assert!(!msg.forwarded);
    }
}
