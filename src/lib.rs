//! Rarsec - Parsec-style parser combinators for Rust
//!
//! This library provides the core components for building parsers by
//! composing small ones: a primitive engine with predictive choice and
//! explicit backtracking, precise mergeable error reports, character-level
//! primitives, and a lexer generator driven by a declarative language
//! description.
//!
//! ```
//! use rarsec::char::{char, digit};
//! use rarsec::parser::{many1, run};
//!
//! let number = many1(digit()).map(|ds| ds.into_iter().collect::<String>());
//! let pair = number.clone().skip(char(',')).seq(number);
//! assert_eq!(
//!     run(&pair, "pair", (), "17,4"),
//!     Ok(("17".to_string(), "4".to_string()))
//! );
//! ```
//!
//! Choice is predictive: `p | q` only tries `q` when `p` failed without
//! consuming input, which keeps parsing linear and error messages sharp.
//! Wrap a branch in [`parser::attempt`] where real backtracking is wanted.

pub mod char;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod pos;
pub mod stream;

pub use error::{Message, ParseError};
pub use parser::{run, BoxedParser, ParseResult, ParseState, Parser};
pub use pos::SourcePos;
pub use stream::{CharStream, ChunkedStream, Stream};
