//! Fixtures shared by unit tests.

use anyhow::{Result, anyhow};
use base64::Engine as _;
use base64::engine::general_purpose;
use std::cell::RefCell;
use std::collections::HashSet;

use crate::gmail::Mailbox;
use crate::gmail::api::{Header, MessagePart, MessagePartBody, RawMessage, Thread, ThreadRef};

pub fn b64(s: &str) -> String {
    general_purpose::URL_SAFE.encode(s)
}

pub fn header(name: &str, value: &str) -> Header {
    Header {
        name: name.to_string(),
        value: value.to_string(),
    }
}

pub fn part(mime_type: &str, data: &str) -> MessagePart {
    MessagePart {
        mime_type: mime_type.to_string(),
        body: MessagePartBody {
            data: data.to_string(),
        },
        ..Default::default()
    }
}

pub fn raw_message(
    id: &str,
    data: &str,
    headers: Vec<Header>,
    parts: Vec<MessagePart>,
) -> RawMessage {
    let mime_type = if parts.is_empty() {
        "text/plain"
    } else {
        "multipart/alternative"
    };
    RawMessage {
        id: id.to_string(),
        size_estimate: 1024,
        payload: MessagePart {
            headers,
            parts,
            ..part(mime_type, data)
        },
        ..Default::default()
    }
}

pub fn thread(id: &str, messages: Vec<RawMessage>) -> Thread {
    Thread {
        id: id.to_string(),
        messages,
    }
}

/// In-memory mailbox recording every mutation it is asked to perform.
#[derive(Default)]
pub struct FakeMailbox {
    pub threads: Vec<Thread>,
    pub unreachable_threads: HashSet<String>,
    pub fail_listing: bool,
    pub fail_delete: bool,
    pub fail_modify: bool,
    pub calls: RefCell<Vec<String>>,
}

impl FakeMailbox {
    pub fn with_threads(threads: Vec<Thread>) -> Self {
        Self {
            threads,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl Mailbox for FakeMailbox {
    fn list_threads(&self, _query: &str) -> Result<Vec<ThreadRef>> {
        if self.fail_listing {
            return Err(anyhow!("listing refused"));
        }
        Ok(self
            .threads
            .iter()
            .map(|t| ThreadRef { id: t.id.clone() })
            .collect())
    }

    fn get_thread(&self, id: &str) -> Result<Thread> {
        if self.unreachable_threads.contains(id) {
            return Err(anyhow!("thread {id} unavailable"));
        }
        self.threads
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| anyhow!("no thread {id}"))
    }

    fn delete_message(&self, id: &str) -> Result<()> {
        if self.fail_delete {
            return Err(anyhow!("delete refused"));
        }
        self.calls.borrow_mut().push(format!("delete {id}"));
        Ok(())
    }

    fn modify_message(&self, id: &str, remove_label_ids: &[&str]) -> Result<()> {
        if self.fail_modify {
            return Err(anyhow!("modify refused"));
        }
        self.calls
            .borrow_mut()
            .push(format!("modify {id} -{}", remove_label_ids.join(",")));
        Ok(())
    }
}
