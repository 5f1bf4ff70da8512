//! # Parser State Management
//!
//! This module provides the core infrastructure for the combinator engine:
//! - **ParseState**: input cursor, source position, user state, and the
//!   bookkeeping that drives commit/backtrack decisions
//! - **Checkpoint**: a saved state for backtracking
//! - **Parser trait**: generic interface for all parsers
//!
//! ## Consumed vs. empty
//!
//! The engine's central invariant is the distinction between a parser that
//! *consumed* input before its outcome and one that did not. Alternation
//! only tries its second branch after an **empty** failure; a failure after
//! consumption commits to the branch that made progress. `ParseState` tracks
//! this with a monotone counter of consumed tokens:
//!
//! ```text
//! let cp = state.checkpoint();        // save position
//! match parser.parse(&mut state) {
//!     Ok(value) => value,
//!     Err(err) if state.consumed_since(&cp) => return Err(err), // committed
//!     Err(err) => {
//!         state.restore(cp);          // backtrack and try the alternative
//!         alternative.parse(&mut state)
//!     }
//! }
//! ```
//!
//! ## Error tracking
//!
//! Combinators routinely discard errors and continue: alternation takes its
//! second branch, a repetition loop ends, an optional parser defaults. Those
//! discarded errors still carry the most useful expectations, so they are
//! folded into the state with [`ParseState::recover`]. The fold uses the
//! error merge rules (furthest position wins, equal positions union their
//! messages), which is how a final failure at column 4 can still say
//! "expecting digit or end of input" when the digit expectation came from a
//! loop that ended successfully.

use crate::error::{Message, ParseError};
use crate::pos::{SourcePos, DEFAULT_TAB_WIDTH};
use crate::stream::Stream;

/// Result type for parse operations.
///
/// A convenience alias for `Result<T, ParseError>` used throughout
/// the combinator engine.
pub type ParseResult<T> = Result<T, ParseError>;

/// Parser state: input cursor, position, user state, and error tracking.
///
/// `ParseState` is the mutable context every parser operates on. It is
/// generic over the input stream `S` and a caller-chosen user state `U`
/// threaded through the run unchanged (except by the state-accessor
/// parsers).
///
/// # Fields
///
/// * `input` - the not-yet-consumed remainder of the input
/// * `pos` - current source position
/// * `user` - caller-supplied state, opaque to the engine
/// * `tab_width` - column width used when advancing past tabs
/// * `consumed` - tokens consumed since the run started (monotone)
/// * `recovered` - the furthest error discarded by a combinator that
///   continued successfully
pub struct ParseState<S, U = ()> {
    input: S,
    pos: SourcePos,
    user: U,
    tab_width: u32,
    consumed: u64,
    recovered: Option<ParseError>,
}

/// A saved parser state, used for backtracking.
///
/// Produced by [`ParseState::checkpoint`] and consumed by
/// [`ParseState::restore`]. The discarded-error record deliberately stays
/// out of the checkpoint: backtracking undoes consumption, not what the
/// run has learned for error reporting.
pub struct Checkpoint<S, U> {
    input: S,
    pos: SourcePos,
    user: U,
    consumed: u64,
}

impl<S: Stream> ParseState<S, ()> {
    /// Create a state over `input` with no user state.
    pub fn new(input: S, name: impl Into<String>) -> Self {
        Self::with_user(input, name, ())
    }
}

impl<S: Stream, U> ParseState<S, U> {
    /// Create a state over `input` carrying a user state.
    pub fn with_user(input: S, name: impl Into<String>, user: U) -> Self {
        Self {
            input,
            pos: SourcePos::new(name),
            user,
            tab_width: DEFAULT_TAB_WIDTH,
            consumed: 0,
            recovered: None,
        }
    }

    /// Override the tab width used for position tracking.
    pub fn with_tab_width(mut self, tab_width: u32) -> Self {
        self.tab_width = tab_width.max(1);
        self
    }

    /// The not-yet-consumed input.
    pub fn input(&self) -> &S {
        &self.input
    }

    /// Replace the remaining input. Does not count as consumption.
    pub fn set_input(&mut self, input: S) {
        self.input = input;
    }

    /// The current source position.
    pub fn position(&self) -> &SourcePos {
        &self.pos
    }

    /// Overwrite the current source position.
    pub fn set_position(&mut self, pos: SourcePos) {
        self.pos = pos;
    }

    /// The tab width used for position tracking.
    pub fn tab_width(&self) -> u32 {
        self.tab_width
    }

    /// The caller-supplied user state.
    pub fn user(&self) -> &U {
        &self.user
    }

    /// Mutable access to the user state.
    pub fn user_mut(&mut self) -> &mut U {
        &mut self.user
    }

    /// Peek at the next token without consuming it.
    pub fn peek(&self) -> Option<S::Token> {
        self.input.uncons().map(|(tok, _)| tok)
    }

    /// Consume one token: step to `rest` at `pos`.
    ///
    /// Every primitive that reads a token goes through here so the
    /// consumption counter stays accurate.
    pub fn commit(&mut self, rest: S, pos: SourcePos) {
        self.input = rest;
        self.pos = pos;
        self.consumed += 1;
    }

    /// Save the current state for backtracking.
    pub fn checkpoint(&self) -> Checkpoint<S, U>
    where
        U: Clone,
    {
        Checkpoint {
            input: self.input.clone(),
            pos: self.pos.clone(),
            user: self.user.clone(),
            consumed: self.consumed,
        }
    }

    /// Restore a previously saved state.
    pub fn restore(&mut self, checkpoint: Checkpoint<S, U>) {
        self.input = checkpoint.input;
        self.pos = checkpoint.pos;
        self.user = checkpoint.user;
        self.consumed = checkpoint.consumed;
    }

    /// Whether any token was consumed since `checkpoint` was taken.
    pub fn consumed_since(&self, checkpoint: &Checkpoint<S, U>) -> bool {
        self.consumed > checkpoint.consumed
    }

    /// Total tokens consumed since the run started.
    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    /// Record an error that was discarded on a successful path.
    ///
    /// Merged into the running record with the usual rules: the furthest
    /// error wins, equal positions union their messages.
    pub fn recover(&mut self, err: ParseError) {
        self.recovered = Some(match self.recovered.take() {
            Some(acc) => acc.merge(err),
            None => err,
        });
    }

    /// The furthest discarded error, if any.
    pub fn recovered(&self) -> Option<&ParseError> {
        self.recovered.as_ref()
    }

    /// Take the discarded-error record, leaving it empty.
    pub fn take_recovered(&mut self) -> Option<ParseError> {
        self.recovered.take()
    }

    /// An "unexpected ..." error at the current position.
    pub fn unexpected_here(&self, what: impl Into<String>) -> ParseError {
        ParseError::new(self.pos.clone(), Message::Unexpected(what.into()))
    }
}

/// Generic parser trait.
///
/// All parsers implement this trait, enabling a unified interface for
/// parser combinators. The trait is implemented for:
/// - Functions that take `&mut ParseState` and return `ParseResult<T>`
/// - `BoxedParser`, the reusable parser value built by the combinators
pub trait Parser<S: Stream, U, T> {
    /// Parse from the given state.
    ///
    /// On success the state is left after the consumed input; on failure it
    /// is left wherever the parser stopped, and the caller decides whether
    /// to backtrack based on [`ParseState::consumed_since`].
    fn parse(&self, state: &mut ParseState<S, U>) -> ParseResult<T>;
}

/// Auto-implement Parser for functions matching the expected signature.
///
/// This enables any function that takes `&mut ParseState` and returns
/// `ParseResult<T>` to be used as a parser without explicit wrapping.
impl<S, U, T, F> Parser<S, U, T> for F
where
    S: Stream,
    F: Fn(&mut ParseState<S, U>) -> ParseResult<T>,
{
    fn parse(&self, state: &mut ParseState<S, U>) -> ParseResult<T> {
        self(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_advances_position_and_counter() {
        let mut state = ParseState::new("ab", "test");
        let (ch, rest) = state.input().uncons().unwrap();
        let next = state.position().advanced(ch, state.tab_width());
        state.commit(rest, next);
        assert_eq!(state.position().column, 2);
        assert_eq!(state.peek(), Some('b'));
    }

    #[test]
    fn restore_undoes_consumption() {
        let mut state = ParseState::new("ab", "test");
        let cp = state.checkpoint();
        let (ch, rest) = state.input().uncons().unwrap();
        let next = state.position().advanced(ch, state.tab_width());
        state.commit(rest, next);
        assert!(state.consumed_since(&cp));
        state.restore(cp);
        assert_eq!(state.peek(), Some('a'));
        assert_eq!(state.position().column, 1);
    }

    #[test]
    fn recover_keeps_the_furthest_error() {
        let mut state = ParseState::new("ab", "test");
        let near = state.unexpected_here("'a'");
        let far = ParseError::new(
            SourcePos {
                name: "test".into(),
                line: 1,
                column: 5,
            },
            Message::Expected("digit".into()),
        );
        state.recover(far.clone());
        state.recover(near);
        assert_eq!(state.take_recovered(), Some(far));
        assert_eq!(state.take_recovered(), None);
    }
}
