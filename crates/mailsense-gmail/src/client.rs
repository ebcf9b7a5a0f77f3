//! Gmail REST client.
//!
//! Lists the most recent message ids, fetches each message in full, and
//! flattens the MIME payload into the [`Message`] model. OAuth token
//! acquisition is out of scope; the client is handed a ready bearer token.

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::error::{MailError, Result};
use crate::source::{MailSource, Message};

const DEFAULT_BASE_URL: &str = "https://gmail.googleapis.com/gmail/v1";

/// Thin client for the Gmail REST API.
pub struct GmailClient {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl GmailClient {
    /// Create a client that talks to the public Gmail API.
    #[must_use]
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            access_token: access_token.into(),
        }
    }

    /// Override the API base URL (used by tests against a local server).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(MailError::Status(response.status()));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl MailSource for GmailClient {
    async fn fetch_recent(&self, max: usize) -> Result<Vec<Message>> {
        let list_url = format!("{}/users/me/messages?maxResults={max}", self.base_url);
        let list: MessageList = self.get_json(&list_url).await?;
        debug!(count = list.messages.len(), "listed recent messages");

        let mut messages = Vec::with_capacity(list.messages.len());
        for reference in list.messages {
            let detail_url = format!(
                "{}/users/me/messages/{}?format=full",
                self.base_url, reference.id
            );
            let detail: MessageDetail = self.get_json(&detail_url).await?;
            messages.push(detail.into_message()?);
        }

        Ok(messages)
    }
}

#[derive(Deserialize)]
struct MessageList {
    #[serde(default)]
    messages: Vec<MessageRef>,
}

#[derive(Deserialize)]
struct MessageRef {
    id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageDetail {
    id: String,
    internal_date: Option<String>,
    payload: Option<Payload>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct Payload {
    #[serde(default)]
    mime_type: String,
    #[serde(default)]
    headers: Vec<Header>,
    body: Option<Body>,
    #[serde(default)]
    parts: Vec<Payload>,
}

#[derive(Deserialize)]
struct Header {
    name: String,
    value: String,
}

#[derive(Deserialize)]
struct Body {
    data: Option<String>,
}

impl MessageDetail {
    fn into_message(self) -> Result<Message> {
        let timestamp = self
            .internal_date
            .as_deref()
            .and_then(|millis| millis.parse::<i64>().ok())
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .ok_or_else(|| {
                MailError::Decode(format!("message {} has no usable internalDate", self.id))
            })?;

        let payload = self.payload.unwrap_or_default();

        Ok(Message {
            id: self.id,
            sender: header_value(&payload.headers, "From").unwrap_or_default(),
            subject: header_value(&payload.headers, "Subject").unwrap_or_default(),
            body: extract_text(&payload).unwrap_or_default(),
            timestamp,
        })
    }
}

/// Look up a header value by case-insensitive name.
fn header_value(headers: &[Header], name: &str) -> Option<String> {
    headers
        .iter()
        .find(|h| h.name.eq_ignore_ascii_case(name))
        .map(|h| h.value.clone())
}

/// Extract the plain-text body from a (possibly multipart) payload.
///
/// Prefers the first `text/plain` part, descending into nested multiparts.
fn extract_text(payload: &Payload) -> Option<String> {
    if payload.parts.is_empty() {
        let data = payload.body.as_ref()?.data.as_deref()?;
        return Some(decode_body(data));
    }

    for part in &payload.parts {
        if part.mime_type == "text/plain" {
            if let Some(data) = part.body.as_ref().and_then(|b| b.data.as_deref()) {
                return Some(decode_body(data));
            }
        } else if !part.parts.is_empty()
            && let Some(text) = extract_text(part)
        {
            return Some(text);
        }
    }

    None
}

/// Decode a base64url body segment, tolerating missing padding.
fn decode_body(data: &str) -> String {
    URL_SAFE
        .decode(data)
        .or_else(|_| URL_SAFE_NO_PAD.decode(data))
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn encode(text: &str) -> String {
        URL_SAFE.encode(text.as_bytes())
    }

    #[test]
    fn test_decode_body_with_and_without_padding() {
        let padded = URL_SAFE.encode("hello world");
        let unpadded = URL_SAFE_NO_PAD.encode("hello world");

        assert_eq!(decode_body(&padded), "hello world");
        assert_eq!(decode_body(&unpadded), "hello world");
        assert_eq!(decode_body("not base64!!!"), "");
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let headers = vec![
            Header {
                name: "FROM".to_string(),
                value: "a@x.com".to_string(),
            },
            Header {
                name: "Subject".to_string(),
                value: "Hi".to_string(),
            },
        ];

        assert_eq!(header_value(&headers, "From").unwrap(), "a@x.com");
        assert_eq!(header_value(&headers, "subject").unwrap(), "Hi");
        assert!(header_value(&headers, "Date").is_none());
    }

    #[test]
    fn test_extract_text_prefers_plain_part() {
        let payload: Payload = serde_json::from_value(json!({
            "mimeType": "multipart/alternative",
            "parts": [
                { "mimeType": "text/html", "body": { "data": encode("<p>html</p>") } },
                { "mimeType": "text/plain", "body": { "data": encode("plain text") } },
            ],
        }))
        .unwrap();

        assert_eq!(extract_text(&payload).unwrap(), "plain text");
    }

    #[test]
    fn test_extract_text_descends_into_nested_multipart() {
        let payload: Payload = serde_json::from_value(json!({
            "mimeType": "multipart/mixed",
            "parts": [
                {
                    "mimeType": "multipart/alternative",
                    "parts": [
                        { "mimeType": "text/plain", "body": { "data": encode("nested") } },
                    ],
                },
            ],
        }))
        .unwrap();

        assert_eq!(extract_text(&payload).unwrap(), "nested");
    }

    #[test]
    fn test_extract_text_single_part() {
        let payload: Payload = serde_json::from_value(json!({
            "mimeType": "text/plain",
            "body": { "data": encode("just a body") },
        }))
        .unwrap();

        assert_eq!(extract_text(&payload).unwrap(), "just a body");
    }

    #[tokio::test]
    async fn test_fetch_recent_builds_messages_in_list_order() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/users/me/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "messages": [{ "id": "m1" }, { "id": "m2" }],
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/users/me/messages/m1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "m1",
                "internalDate": "1700000000000",
                "payload": {
                    "mimeType": "text/plain",
                    "headers": [
                        { "name": "From", "value": "alice@example.com" },
                        { "name": "Subject", "value": "Newest" },
                    ],
                    "body": { "data": encode("first body") },
                },
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/users/me/messages/m2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "m2",
                "internalDate": "1699999000000",
                "payload": {
                    "mimeType": "text/plain",
                    "headers": [
                        { "name": "From", "value": "bob@example.com" },
                        { "name": "Subject", "value": "Older" },
                    ],
                    "body": { "data": encode("second body") },
                },
            })))
            .mount(&server)
            .await;

        let client = GmailClient::new("token").with_base_url(server.uri());
        let messages = client.fetch_recent(2).await.unwrap();

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].id, "m1");
        assert_eq!(messages[0].sender, "alice@example.com");
        assert_eq!(messages[0].subject, "Newest");
        assert_eq!(messages[0].body, "first body");
        assert_eq!(messages[1].id, "m2");
    }

    #[tokio::test]
    async fn test_fetch_recent_surfaces_api_status() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/users/me/messages"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = GmailClient::new("expired").with_base_url(server.uri());
        let err = client.fetch_recent(10).await.unwrap_err();

        assert!(matches!(err, MailError::Status(status) if status.as_u16() == 401));
    }
}
