//! Result materialization
//!
//! Turns a completed response into the command's logical result. XML bodies
//! are decoded on a best-effort basis: when decoding fails the raw response
//! is returned instead and the parse error is dropped. This fallback is
//! intentional; callers that need strict decoding should parse
//! [`CommandOutput::Raw`] bodies themselves.

use crate::http::Response;
use crate::xml::XmlDocument;

/// Logical result of an executed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutput {
    /// The response, passed through unchanged
    Raw(Response),
    /// Decoded XML body
    Xml(XmlDocument),
}

impl CommandOutput {
    pub fn as_response(&self) -> Option<&Response> {
        match self {
            Self::Raw(response) => Some(response),
            Self::Xml(_) => None,
        }
    }

    pub fn as_xml(&self) -> Option<&XmlDocument> {
        match self {
            Self::Xml(doc) => Some(doc),
            Self::Raw(_) => None,
        }
    }

    pub fn is_xml(&self) -> bool {
        matches!(self, Self::Xml(_))
    }
}

/// Check whether a content type names an XML media type.
///
/// Matches `text/xml` and `application/xml` ignoring ASCII case, surrounding
/// whitespace and any `;`-separated parameters.
pub fn is_xml_content_type(content_type: &str) -> bool {
    let media_type = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim();
    media_type.eq_ignore_ascii_case("text/xml")
        || media_type.eq_ignore_ascii_case("application/xml")
}

/// Compute the result for a completed response
pub fn materialize(response: &Response) -> CommandOutput {
    if !is_xml_content_type(response.content_type()) {
        return CommandOutput::Raw(response.clone());
    }

    let body = match std::str::from_utf8(response.body()) {
        Ok(body) => body.trim(),
        Err(_) => {
            tracing::debug!("XML response body is not UTF-8, keeping raw response");
            return CommandOutput::Raw(response.clone());
        }
    };
    if body.is_empty() {
        return CommandOutput::Raw(response.clone());
    }

    match XmlDocument::parse(body) {
        Ok(doc) => CommandOutput::Xml(doc),
        // Deliberate fallback: a malformed body is not an error here
        Err(err) => {
            tracing::debug!(error = %err, "Failed to parse XML response, keeping raw response");
            CommandOutput::Raw(response.clone())
        }
    }
}
