use anyhow::{Context, Result};
use base64::Engine as _;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use log::{info, warn};

use crate::domain::message::{Message, MessageStore};
use crate::gmail::api::{Header, MessagePart, RawMessage, Thread};
use crate::gmail::{INBOX_QUERY, Mailbox};

/// Gmail emits URL-safe base64, padded or not depending on the endpoint.
const BODY_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

pub fn decode_body(data: &str) -> Result<String> {
    let bytes = BODY_ENGINE.decode(data)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[derive(Default)]
struct Headers {
    date: String,
    subject: String,
    from: String,
    to: String,
}

fn pick_headers(headers: &[Header]) -> Headers {
    let mut out = Headers::default();
    for h in headers {
        let slot = match h.name.as_str() {
            "Date" => &mut out.date,
            "Subject" => &mut out.subject,
            "From" => &mut out.from,
            "To" => &mut out.to,
            _ => continue,
        };
        *slot = h.value.clone();
    }
    out
}

/// Primary body, or the first non-empty top-level text/plain part when it is empty.
fn body_text(payload: &MessagePart, id: &str) -> Result<String> {
    let body = decode_body(&payload.body.data)
        .with_context(|| format!("decoding body of message {id}"))?;
    if !body.is_empty() {
        return Ok(body);
    }
    for part in payload.parts.iter().filter(|p| p.mime_type == "text/plain") {
        let text = decode_body(&part.body.data).with_context(|| {
            format!(
                "decoding text/plain part of message {id} (len {}): {}",
                part.body.data.len(),
                part.body.data
            )
        })?;
        if !text.is_empty() {
            return Ok(text);
        }
    }
    Ok(String::new())
}

pub fn extract_message(raw: &RawMessage) -> Result<Message> {
    let h = pick_headers(&raw.payload.headers);
    Ok(Message {
        id: raw.id.clone(),
        size_estimate: raw.size_estimate,
        snippet: raw.snippet.clone(),
        body: body_text(&raw.payload, &raw.id)?,
        date: h.date,
        subject: h.subject,
        from: h.from,
        to: h.to,
    })
}

/// Extracts the thread's latest message. Decode failures are errors; an empty thread
/// or a message without an id yields `None`.
pub fn extract_thread(thread: &Thread) -> Result<Option<Message>> {
    let Some(last) = thread.messages.last() else {
        warn!("Thread {} has no messages, skipping", thread.id);
        return Ok(None);
    };
    if last.id.is_empty() {
        warn!("Thread {} latest message has no id, skipping", thread.id);
        return Ok(None);
    }
    extract_message(last).map(Some)
}

/// Lists inbox threads and extracts the latest message of each, in listing order.
/// A thread that fails to fetch is logged and skipped. `None` means the inbox listing
/// itself was empty.
pub fn load_inbox(mailbox: &impl Mailbox) -> Result<Option<MessageStore>> {
    info!("Retrieving threads...");
    let threads = mailbox
        .list_threads(INBOX_QUERY)
        .context("Unable to retrieve threads")?;
    if threads.is_empty() {
        return Ok(None);
    }
    info!("Found {} threads.", threads.len());

    let total = threads.len();
    let mut messages = Vec::with_capacity(total);
    for (idx, t) in threads.iter().enumerate() {
        info!("Retrieving messages in thread {} of {}.", idx + 1, total);
        let thread = match mailbox.get_thread(&t.id) {
            Ok(thread) => thread,
            Err(e) => {
                warn!("Unable to retrieve thread {}: {e:#}", t.id);
                continue;
            }
        };
        if let Some(m) = extract_thread(&thread)? {
            messages.push(m);
        }
    }
    if messages.len() < total {
        warn!("{} of {} threads contributed no message", total - messages.len(), total);
    }
    info!("Ready.");
    Ok(Some(messages.into_iter().collect()))
}
