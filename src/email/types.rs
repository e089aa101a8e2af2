use serde::{Deserialize, Serialize};

/// A fully built message ready to hand to a dispatch backend.
///
/// Serializes to the flat `{from, to, subject, text?, html?}` document read by
/// the queue consumer; exactly one of `text`/`html` is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "WireEmail", try_from = "WireEmail")]
pub struct OutboundMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: EmailBody,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailBody {
    Text(String),
    Html(String),
}

impl OutboundMessage {
    pub fn new(from: impl Into<String>, to: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            subject: subject.into(),
            body: EmailBody::Text(String::new()),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.body = EmailBody::Text(text.into());
        self
    }

    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.body = EmailBody::Html(html.into());
        self
    }

    pub fn plain_body(&self) -> Option<&str> {
        match &self.body {
            EmailBody::Text(text) => Some(text),
            EmailBody::Html(_) => None,
        }
    }

    pub fn rich_body(&self) -> Option<&str> {
        match &self.body {
            EmailBody::Html(html) => Some(html),
            EmailBody::Text(_) => None,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct WireEmail {
    from: String,
    to: String,
    subject: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    html: Option<String>,
}

impl From<OutboundMessage> for WireEmail {
    fn from(message: OutboundMessage) -> Self {
        let (text, html) = match message.body {
            EmailBody::Text(text) => (Some(text), None),
            EmailBody::Html(html) => (None, Some(html)),
        };
        Self {
            from: message.from,
            to: message.to,
            subject: message.subject,
            text,
            html,
        }
    }
}

impl TryFrom<WireEmail> for OutboundMessage {
    type Error = String;

    fn try_from(wire: WireEmail) -> Result<Self, Self::Error> {
        let body = match (wire.text, wire.html) {
            (Some(text), None) => EmailBody::Text(text),
            (None, Some(html)) => EmailBody::Html(html),
            (Some(_), Some(_)) => return Err("message has both text and html bodies".to_string()),
            (None, None) => return Err("message has no body".to_string()),
        };
        Ok(Self {
            from: wire.from,
            to: wire.to,
            subject: wire.subject,
            body,
        })
    }
}
