use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// A message was shown to the operator.
    Entered,
    Deleted,
    Archived,
}

/// Counters for one triage session.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionStats {
    pub processed: u64,
    pub deleted: u64,
    pub archived: u64,
}

impl SessionStats {
    #[must_use]
    pub fn record(self, event: SessionEvent) -> Self {
        match event {
            SessionEvent::Entered => Self {
                processed: self.processed + 1,
                ..self
            },
            SessionEvent::Deleted => Self {
                deleted: self.deleted + 1,
                ..self
            },
            SessionEvent::Archived => Self {
                archived: self.archived + 1,
                ..self
            },
        }
    }

    pub fn summary(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SessionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Done.  {} messages processed, {} deleted, {} archived",
            self.processed, self.deleted, self.archived
        )
    }
}
