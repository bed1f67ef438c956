/// One operator answer to the per-message prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    View,
    Open,
    Delete,
    Archive,
    Skip,
    Quit,
    /// Anything else; handled like `Skip`.
    Unrecognized(String),
}

impl Command {
    /// Parses a raw input line. Blank input is the default, `Skip`.
    pub fn parse(line: &str) -> Self {
        match line.trim() {
            "v" | "view" => Command::View,
            "o" | "open" => Command::Open,
            "d" | "delete" => Command::Delete,
            "a" | "archive" => Command::Archive,
            "" | "s" | "skip" => Command::Skip,
            "q" | "quit" => Command::Quit,
            other => Command::Unrecognized(other.to_string()),
        }
    }
}
