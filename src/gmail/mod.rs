//! Gmail REST API v1: wire types, the mailbox capability the triage session
//! consumes, and a blocking HTTP implementation of it.

pub mod client;

pub use client::{GmailClient, GmailError};

use anyhow::Result;

/// Label every inbox message carries; removing it archives the message.
pub const INBOX_LABEL: &str = "INBOX";

/// The one listing query this tool issues.
pub const INBOX_QUERY: &str = "label:INBOX";

/// Remote mailbox operations used by the loader and the triage controller.
pub trait Mailbox {
    fn list_threads(&self, query: &str) -> Result<Vec<api::ThreadRef>>;
    fn get_thread(&self, id: &str) -> Result<api::Thread>;
    fn delete_message(&self, id: &str) -> Result<()>;
    fn modify_message(&self, id: &str, remove_label_ids: &[&str]) -> Result<()>;
}

/// Supplies a bearer token for each request.
pub trait TokenSource {
    fn access_token(&self) -> Result<String>;
}

impl TokenSource for String {
    fn access_token(&self) -> Result<String> {
        Ok(self.clone())
    }
}

/// Gmail API response types
pub mod api {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Default, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ListThreadsResponse {
        #[serde(default)]
        pub threads: Vec<ThreadRef>,
        pub next_page_token: Option<String>,
    }

    #[derive(Debug, Clone, Deserialize, PartialEq)]
    pub struct ThreadRef {
        pub id: String,
    }

    /// A conversation; `messages` is oldest first.
    #[derive(Debug, Clone, Default, Deserialize)]
    pub struct Thread {
        pub id: String,
        #[serde(default)]
        pub messages: Vec<RawMessage>,
    }

    #[derive(Debug, Clone, Default, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RawMessage {
        pub id: String,
        #[serde(default)]
        pub snippet: String,
        #[serde(default)]
        pub size_estimate: i64,
        #[serde(default)]
        pub payload: MessagePart,
    }

    /// The top-level payload and each of its parts share this shape.
    #[derive(Debug, Clone, Default, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct MessagePart {
        #[serde(default)]
        pub mime_type: String,
        #[serde(default)]
        pub headers: Vec<Header>,
        #[serde(default)]
        pub body: MessagePartBody,
        #[serde(default)]
        pub parts: Vec<MessagePart>,
    }

    #[derive(Debug, Clone, Default, Deserialize)]
    pub struct Header {
        pub name: String,
        pub value: String,
    }

    /// `data` is URL-safe base64; absent for empty bodies and attachments.
    #[derive(Debug, Clone, Default, Deserialize)]
    pub struct MessagePartBody {
        #[serde(default)]
        pub data: String,
    }

    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ModifyMessageRequest<'a> {
        pub remove_label_ids: &'a [&'a str],
    }
}
