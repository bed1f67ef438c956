/// The latest message of one inbox thread, normalized for triage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    pub id: String,
    pub size_estimate: i64,
    pub snippet: String,
    /// Decoded plain text; empty when the message has none.
    pub body: String,
    pub date: String,
    pub subject: String,
    pub from: String,
    pub to: String,
}

impl Message {
    /// Web UI link that opens this message regardless of its labels.
    pub fn deep_link(&self) -> String {
        format!("https://mail.google.com/mail/u/0/#all/{}", self.id)
    }
}

/// Messages in thread-listing order, filled once before triage starts.
#[derive(Debug, Default, Clone)]
pub struct MessageStore {
    messages: Vec<Message>,
}

impl MessageStore {
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }
}

impl FromIterator<Message> for MessageStore {
    fn from_iter<I: IntoIterator<Item = Message>>(iter: I) -> Self {
        Self {
            messages: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a MessageStore {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}
