//! Parse errors and the rules for combining them.
//!
//! This module provides the error half of the engine:
//! - **Message**: a single diagnostic fragment (what was seen, what was
//!   wanted, or a free-form note)
//! - **ParseError**: a position plus a set of messages, with merge rules
//!   that keep reports precise across alternatives
//!
//! ## Merging
//!
//! Alternation produces errors from several branches; they are folded into
//! one report with [`ParseError::merge`]:
//!
//! 1. The error further into the input wins outright.
//! 2. At equal positions the message sets are unioned: `Expected` and
//!    `Message` entries accumulate, while at most one `Unexpected` entry is
//!    kept (the most recent write wins).
//!
//! This is what turns "three branches failed" into a single
//! "expected A, B or C" line instead of three separate reports.
//!
//! ## Rendering
//!
//! ```text
//! input.txt:1:4:
//! unexpected 'x'
//! expecting digit or end of input
//! ```
//!
//! Expectations are sorted and de-duplicated so the rendering is stable for
//! equivalent grammars.

use std::fmt;

use crate::pos::SourcePos;

/// A single diagnostic fragment inside a [`ParseError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// What the parser actually saw, e.g. `'x'` or `end of input`.
    Unexpected(String),
    /// What the parser wanted, e.g. `digit` or `';'`.
    Expected(String),
    /// Free-form text supplied through `fail`.
    Message(String),
}

impl Message {
    /// The text carried by this message, without its classification.
    pub fn text(&self) -> &str {
        match self {
            Message::Unexpected(text) | Message::Expected(text) | Message::Message(text) => text,
        }
    }
}

/// A parse failure: where it happened plus a set of messages describing it.
///
/// The message collection behaves as a set: duplicates are never stored,
/// `Expected` and `Message` entries accumulate, and adding an `Unexpected`
/// replaces any previous one. Errors are immutable values; every operation
/// returns a new error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pos: SourcePos,
    messages: Vec<Message>,
}

impl ParseError {
    /// An error at `pos` with no messages yet.
    pub fn unknown(pos: SourcePos) -> Self {
        Self {
            pos,
            messages: Vec::new(),
        }
    }

    /// An error at `pos` carrying a single message.
    pub fn new(pos: SourcePos, message: Message) -> Self {
        Self::unknown(pos).add(message)
    }

    /// Whether this error carries no messages at all.
    pub fn is_unknown(&self) -> bool {
        self.messages.is_empty()
    }

    /// Where the failure happened.
    pub fn position(&self) -> &SourcePos {
        &self.pos
    }

    /// The messages collected so far.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Add a message, maintaining the set discipline: duplicates are
    /// dropped, and a new `Unexpected` replaces any previous one.
    pub fn add(mut self, message: Message) -> Self {
        if let Message::Unexpected(_) = message {
            self.messages
                .retain(|m| !matches!(m, Message::Unexpected(_)));
        }
        if !self.messages.contains(&message) {
            self.messages.push(message);
        }
        self
    }

    /// Move the error to a different position, keeping its messages.
    pub fn set_position(mut self, pos: SourcePos) -> Self {
        self.pos = pos;
        self
    }

    /// Replace every `Expected` entry with the given label.
    ///
    /// `None` or an empty label removes the expectations outright; this is
    /// what `hidden` does.
    pub fn replace_expected(&mut self, label: Option<&str>) {
        self.messages.retain(|m| !matches!(m, Message::Expected(_)));
        if let Some(label) = label {
            if !label.is_empty() {
                self.messages.push(Message::Expected(label.to_string()));
            }
        }
    }

    /// Combine two errors into one report.
    ///
    /// The error further into the input wins. At equal positions the message
    /// sets are unioned; if `other` carries an `Unexpected` it replaces the
    /// one in `self`.
    pub fn merge(self, other: ParseError) -> ParseError {
        use std::cmp::Ordering;

        match self.pos.cmp(&other.pos) {
            Ordering::Greater => self,
            Ordering::Less => other,
            Ordering::Equal => {
                let mut merged = self;
                for message in other.messages {
                    merged = merged.add(message);
                }
                merged
            }
        }
    }

    fn render_body(&self) -> String {
        let mut unexpected = None;
        let mut expected = Vec::new();
        let mut notes = Vec::new();
        for message in &self.messages {
            match message {
                Message::Unexpected(text) => unexpected = Some(text.as_str()),
                Message::Expected(text) => expected.push(text.as_str()),
                Message::Message(text) => notes.push(text.as_str()),
            }
        }
        expected.sort_unstable();
        expected.dedup();

        let mut lines = Vec::new();
        if let Some(what) = unexpected {
            lines.push(format!("unexpected {}", what));
        }
        if !expected.is_empty() {
            lines.push(format!("expecting {}", join_or(&expected)));
        }
        for note in notes {
            lines.push(note.to_string());
        }
        if lines.is_empty() {
            return "unknown parse error".to_string();
        }
        lines.join("\n")
    }
}

/// Join alternatives with commas, except the last two with "or".
fn join_or(items: &[&str]) -> String {
    match items {
        [] => String::new(),
        [only] => (*only).to_string(),
        [rest @ .., last] => format!("{} or {}", rest.join(", "), last),
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:\n{}", self.pos, self.render_body())
    }
}

impl std::error::Error for ParseError {}
