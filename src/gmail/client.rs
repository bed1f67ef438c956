use anyhow::{Context, Result, anyhow};
use log::debug;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use url::Url;

use super::api::{ListThreadsResponse, ModifyMessageRequest, Thread, ThreadRef};
use super::{Mailbox, TokenSource};

pub const GMAIL_API_BASE: &str = "https://gmail.googleapis.com/gmail/v1";

#[derive(Debug, thiserror::Error)]
pub enum GmailError {
    #[error("Gmail API returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Gmail API request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Blocking Gmail client scoped to one mailbox user.
pub struct GmailClient<T> {
    http: Client,
    base: Url,
    user_id: String,
    tokens: T,
}

impl<T: TokenSource> GmailClient<T> {
    pub fn new(user_id: impl Into<String>, tokens: T) -> Result<Self> {
        let http = Client::builder().build()?;
        Self::from_parts(http, GMAIL_API_BASE, user_id, tokens)
    }

    fn from_parts(http: Client, base: &str, user_id: impl Into<String>, tokens: T) -> Result<Self> {
        Ok(Self {
            http,
            base: Url::parse(base).with_context(|| format!("invalid API base {base}"))?,
            user_id: user_id.into(),
            tokens,
        })
    }

    /// `<base>/users/<user_id>/<segments..>`, each segment percent-encoded.
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut u = self.base.clone();
        u.path_segments_mut()
            .map_err(|_| anyhow!("API base {} cannot hold a path", self.base))?
            .pop_if_empty()
            .extend(["users", self.user_id.as_str()])
            .extend(segments);
        Ok(u)
    }

    fn send(&self, req: RequestBuilder) -> Result<Response> {
        let token = self.tokens.access_token().context("obtaining access token")?;
        let resp = req.bearer_auth(token).send().map_err(GmailError::from)?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(GmailError::Status {
                status: status.as_u16(),
                body,
            }
            .into());
        }
        Ok(resp)
    }

    fn get_json<R: DeserializeOwned>(&self, url: Url, query: &[(&str, &str)]) -> Result<R> {
        debug!("GET {url}");
        let resp = self.send(self.http.get(url).query(query))?;
        Ok(resp.json::<R>().map_err(GmailError::from)?)
    }
}

impl<T: TokenSource> Mailbox for GmailClient<T> {
    /// Lists every thread matching `query`, following page tokens.
    fn list_threads(&self, query: &str) -> Result<Vec<ThreadRef>> {
        let url = self.url(&["threads"])?;
        let mut out = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut params = vec![("q", query)];
            if let Some(tok) = page_token.as_deref() {
                params.push(("pageToken", tok));
            }
            let page: ListThreadsResponse = self.get_json(url.clone(), &params)?;
            out.extend(page.threads);
            match page.next_page_token {
                Some(next) if !next.is_empty() => page_token = Some(next),
                _ => break,
            }
        }
        Ok(out)
    }

    fn get_thread(&self, id: &str) -> Result<Thread> {
        self.get_json(self.url(&["threads", id])?, &[("format", "full")])
    }

    fn delete_message(&self, id: &str) -> Result<()> {
        let url = self.url(&["messages", id])?;
        debug!("DELETE {url}");
        self.send(self.http.delete(url))?;
        Ok(())
    }

    fn modify_message(&self, id: &str, remove_label_ids: &[&str]) -> Result<()> {
        let url = self.url(&["messages", id, "modify"])?;
        debug!("POST {url} remove={remove_label_ids:?}");
        let body = ModifyMessageRequest { remove_label_ids };
        self.send(self.http.post(url).json(&body))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use std::thread::{self, JoinHandle};
    use tiny_http::{Response as StubResponse, Server};

    #[derive(Debug)]
    struct Seen {
        method: String,
        url: String,
        auth: Option<String>,
        body: String,
    }

    /// Answers one request per canned reply, in order, and records what arrived.
    fn stub(replies: Vec<(u16, &'static str)>) -> (String, JoinHandle<Vec<Seen>>) {
        let server = Server::http("127.0.0.1:0").unwrap();
        let base = format!("http://127.0.0.1:{}/gmail/v1", server.server_addr().port());
        let handle = thread::spawn(move || {
            let mut seen = Vec::new();
            for (status, reply) in replies {
                let mut req = server.recv().unwrap();
                let mut body = String::new();
                req.as_reader().read_to_string(&mut body).unwrap();
                seen.push(Seen {
                    method: req.method().to_string(),
                    url: req.url().to_string(),
                    auth: req
                        .headers()
                        .iter()
                        .find(|h| h.field.equiv("Authorization"))
                        .map(|h| h.value.as_str().to_string()),
                    body,
                });
                req.respond(StubResponse::from_string(reply).with_status_code(status))
                    .unwrap();
            }
            seen
        });
        (base, handle)
    }

    fn client(base: &str) -> GmailClient<String> {
        let http = Client::builder().no_proxy().build().unwrap();
        GmailClient::from_parts(http, base, "me", "tok".to_string()).unwrap()
    }

    #[test]
    fn list_threads_follows_page_tokens() {
        let (base, handle) = stub(vec![
            (200, r#"{"threads":[{"id":"t1"},{"id":"t2"}],"nextPageToken":"p2"}"#),
            (200, r#"{"threads":[{"id":"t3","snippet":"hi"}]}"#),
        ]);
        let threads = client(&base).list_threads("label:INBOX").unwrap();
        let ids: Vec<_> = threads.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["t1", "t2", "t3"]);

        let seen = handle.join().unwrap();
        assert_eq!(seen[0].method, "GET");
        assert_eq!(seen[0].url, "/gmail/v1/users/me/threads?q=label%3AINBOX");
        assert_eq!(seen[0].auth.as_deref(), Some("Bearer tok"));
        assert_eq!(
            seen[1].url,
            "/gmail/v1/users/me/threads?q=label%3AINBOX&pageToken=p2"
        );
    }

    #[test]
    fn empty_listing_has_no_threads() {
        let (base, handle) = stub(vec![(200, r#"{"resultSizeEstimate":0}"#)]);
        assert!(client(&base).list_threads("label:INBOX").unwrap().is_empty());
        handle.join().unwrap();
    }

    #[test]
    fn get_thread_decodes_payload() {
        let (base, handle) = stub(vec![(
            200,
            r#"{"id":"t1","messages":[{"id":"m1","threadId":"t1","snippet":"s","sizeEstimate":42,
               "payload":{"mimeType":"text/plain","headers":[{"name":"Subject","value":"Hi"}],
               "body":{"size":5,"data":"aGVsbG8="}}}]}"#,
        )]);
        let thread = client(&base).get_thread("t1").unwrap();
        assert_eq!(thread.messages.len(), 1);
        let m = &thread.messages[0];
        assert_eq!(m.size_estimate, 42);
        assert_eq!(m.payload.headers[0].value, "Hi");
        assert_eq!(m.payload.body.data, "aGVsbG8=");
        assert!(m.payload.parts.is_empty());

        let seen = handle.join().unwrap();
        assert_eq!(seen[0].url, "/gmail/v1/users/me/threads/t1?format=full");
    }

    #[test]
    fn delete_and_modify_requests() {
        let (base, handle) = stub(vec![(204, ""), (200, r#"{"id":"m1"}"#)]);
        let c = client(&base);
        c.delete_message("m1").unwrap();
        c.modify_message("m1", &["INBOX"]).unwrap();

        let seen = handle.join().unwrap();
        assert_eq!(seen[0].method, "DELETE");
        assert_eq!(seen[0].url, "/gmail/v1/users/me/messages/m1");
        assert_eq!(seen[1].method, "POST");
        assert_eq!(seen[1].url, "/gmail/v1/users/me/messages/m1/modify");
        let body: serde_json::Value = serde_json::from_str(&seen[1].body).unwrap();
        assert_eq!(body, serde_json::json!({"removeLabelIds": ["INBOX"]}));
    }

    #[test]
    fn error_status_is_reported() {
        let (base, handle) = stub(vec![(404, "not found")]);
        let err = client(&base).delete_message("gone").unwrap_err();
        match err.downcast_ref::<GmailError>() {
            Some(GmailError::Status { status, body }) => {
                assert_eq!(*status, 404);
                assert_eq!(body, "not found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        handle.join().unwrap();
    }
}
