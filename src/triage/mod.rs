//! The interactive loop: show each stored message, read a command, act on it.

pub mod browser;
pub mod command;
pub mod session;

use anyhow::{Context, Result, bail};
use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::terminal::{Clear, ClearType};
use log::{debug, info, warn};
use std::io::{BufRead, Write};

use crate::domain::message::{Message, MessageStore};
use crate::gmail::{INBOX_LABEL, Mailbox};
use browser::Browser;
use command::Command;
use session::{SessionEvent, SessionStats};

const PROMPT: &str = "Options: (v)iew, (a)rchive, (o)pen, (d)elete, (s)kip, (q)uit: [s] ";

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The operator asked to quit; remaining messages were left untouched.
    Quit,
    /// Every stored message was triaged.
    Exhausted,
}

#[derive(Debug, PartialEq, Eq)]
enum Step {
    Next,
    Quit,
}

pub struct Triage<'a, M, B, R, W> {
    mailbox: &'a M,
    browser: B,
    input: R,
    out: W,
    stats: SessionStats,
}

impl<'a, M, B, R, W> Triage<'a, M, B, R, W>
where
    M: Mailbox,
    B: Browser,
    R: BufRead,
    W: Write,
{
    pub fn new(mailbox: &'a M, browser: B, input: R, out: W) -> Self {
        Self {
            mailbox,
            browser,
            input,
            out,
            stats: SessionStats::default(),
        }
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Walks the store in order. Mutation and input errors end the session with `Err`;
    /// both normal endings print the summary.
    pub fn run(&mut self, store: &MessageStore) -> Result<Outcome> {
        for m in store {
            self.stats = self.stats.record(SessionEvent::Entered);
            if self.triage_one(m)? == Step::Quit {
                self.report()?;
                return Ok(Outcome::Quit);
            }
        }
        self.report()?;
        Ok(Outcome::Exhausted)
    }

    fn triage_one(&mut self, m: &Message) -> Result<Step> {
        loop {
            self.render(m)?;
            match self.read_command()? {
                Command::Open => self.open(m)?,
                Command::View => self.view(m)?,
                Command::Delete => {
                    self.mailbox
                        .delete_message(&m.id)
                        .with_context(|| format!("Unable to delete message {}", m.id))?;
                    info!("Deleted message {}.", m.id);
                    self.stats = self.stats.record(SessionEvent::Deleted);
                    return Ok(Step::Next);
                }
                Command::Archive => {
                    self.mailbox
                        .modify_message(&m.id, &[INBOX_LABEL])
                        .with_context(|| format!("Unable to archive message {}", m.id))?;
                    info!("Archived message {}.", m.id);
                    self.stats = self.stats.record(SessionEvent::Archived);
                    return Ok(Step::Next);
                }
                Command::Quit => return Ok(Step::Quit),
                Command::Skip => return Ok(Step::Next),
                Command::Unrecognized(input) => {
                    debug!("unrecognized command {input:?}, skipping");
                    return Ok(Step::Next);
                }
            }
        }
    }

    fn render(&mut self, m: &Message) -> Result<()> {
        writeln!(self.out, "\n{}", "-".repeat(80))?;
        write!(
            self.out,
            "Subject: {}\nFrom: {}\nTo: {}\nSize: {}\nDate: {}\n\n",
            m.subject, m.from, m.to, m.size_estimate, m.date
        )?;
        write!(self.out, "{PROMPT}")?;
        self.out.flush()?;
        Ok(())
    }

    /// Non-UTF-8 bytes are decoded lossily.
    fn read_command(&mut self) -> Result<Command> {
        let mut line = Vec::new();
        let n = self
            .input
            .read_until(b'\n', &mut line)
            .context("Unable to read input")?;
        if n == 0 {
            bail!("Unable to read input: end of input");
        }
        Ok(Command::parse(&String::from_utf8_lossy(&line)))
    }

    fn open(&mut self, m: &Message) -> Result<()> {
        let link = m.deep_link();
        if let Err(e) = self.browser.open(&link) {
            warn!("{e:#}");
            writeln!(self.out, "{link}")?;
        }
        Ok(())
    }

    fn view(&mut self, m: &Message) -> Result<()> {
        queue!(self.out, Clear(ClearType::All), MoveTo(0, 0))?;
        writeln!(self.out, "{}", m.body)?;
        Ok(())
    }

    fn report(&mut self) -> Result<()> {
        writeln!(self.out, "{}", self.stats.summary())?;
        self.out.flush()?;
        Ok(())
    }
}
