//! Parsed message input.
//!
//! The parser only needs header lookup by name and the decoded body.
//! `Message::from_raw` builds one from a raw RFC 822 message through
//! `mail-parser`; other ingestion layers can build one directly with
//! `Message::new` and `with_header`.

use chrono::DateTime;
use mail_parser::MessageParser;

/// An incoming message, read-only to the parser.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    headers: Vec<(String, String)>,
    body: String,
}

impl Message {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Parses an RFC 822 message with MIME decoding. Encoded-word headers
    /// are decoded, and the body is the first text part with transfer
    /// encodings removed (an HTML-only message is converted to text).
    /// Input that does not parse as a message yields an empty `Message`.
    ///
    /// # Examples
    ///
    /// ```
    /// use pwned_notice::Message;
    ///
    /// let message = Message::from_raw(
    ///     "Subject: =?utf-8?Q?An_email_on_example.com_has_been_compromised?=\n\nBody text\n",
    /// );
    /// assert_eq!(message.subject(), Some("An email on example.com has been compromised"));
    /// assert_eq!(message.body().trim_end(), "Body text");
    /// ```
    pub fn from_raw(raw: &str) -> Self {
        let Some(parsed) = MessageParser::default().parse(raw) else {
            return Self::default();
        };

        let body = parsed
            .body_text(0)
            .or_else(|| parsed.body_html(0))
            .map(|body| body.into_owned())
            .unwrap_or_default();

        let mut message = Self::new(body);
        if let Some(from) = parsed.from().and_then(|address| address.first()) {
            let mailbox = match (from.name(), from.address()) {
                (Some(name), Some(address)) => format!("{name} <{address}>"),
                (None, Some(address)) => address.to_string(),
                (Some(name), None) => name.to_string(),
                (None, None) => String::new(),
            };
            message = message.with_header("From", mailbox);
        }
        if let Some(subject) = parsed.subject() {
            message = message.with_header("Subject", subject);
        }
        if let Some(date) = parsed
            .date()
            .and_then(|date| DateTime::from_timestamp(date.to_timestamp(), 0))
        {
            message = message.with_header("Date", date.to_rfc2822());
        }
        message
    }

    /// First header named `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(header, _)| header.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn subject(&self) -> Option<&str> {
        self.header("subject")
    }

    pub fn from(&self) -> Option<&str> {
        self.header("from")
    }

    pub fn date(&self) -> Option<&str> {
        self.header("date")
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Unix timestamp of the `Date` header, or `None` when it is missing or
    /// unparseable.
    pub fn timestamp(&self) -> Option<i64> {
        self.date().and_then(parse_date)
    }
}

/// Parses an RFC 2822 date (an RFC 3339 date is also accepted) into Unix
/// seconds.
pub fn parse_date(value: &str) -> Option<i64> {
    let value = value.trim();
    // Drop a trailing comment such as "(UTC)"
    let value = match value.rfind('(') {
        Some(pos) if value.ends_with(')') => value[..pos].trim_end(),
        _ => value,
    };

    DateTime::parse_from_rfc2822(value)
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .map(|dt| dt.timestamp())
        .ok()
}
