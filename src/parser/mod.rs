//! The primitive parser engine: state threading, sequencing, alternation,
//! backtracking, and the combinator library built on top of them.

mod combinators;
mod state;

pub use combinators::*;
pub use state::*;

use crate::error::ParseError;
use crate::stream::Stream;

/// Run a parser against an input.
///
/// Builds the initial state at line 1, column 1 of a source called `name`,
/// threads `user` through the run, and returns either the parsed value or
/// the final error. The error already includes expectations gathered from
/// alternatives that were tried and abandoned along the way.
pub fn run<S, U, T>(
    parser: &impl Parser<S, U, T>,
    name: &str,
    user: U,
    input: S,
) -> Result<T, ParseError>
where
    S: Stream,
{
    let mut state = ParseState::with_user(input, name, user);
    match parser.parse(&mut state) {
        Ok(value) => Ok(value),
        Err(err) => match state.take_recovered() {
            Some(far) => Err(far.merge(err)),
            None => Err(err),
        },
    }
}
