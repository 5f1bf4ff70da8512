//! Character-level primitives for text streams.
//!
//! Everything here bottoms out in [`token_prim`] with the position update
//! rules of [`crate::pos`], and works over any stream whose token is `char`.

use crate::parser::{token_prim, tokens, BoxedParser};
use crate::stream::Stream;

/// Consume one character satisfying the predicate.
pub fn satisfy<S, U, P>(pred: P) -> BoxedParser<S, U, char>
where
    S: Stream<Token = char> + 'static,
    U: Clone + 'static,
    P: Fn(char) -> bool + Send + Sync + 'static,
{
    token_prim(
        |ch: &char| format!("{:?}", ch),
        |pos, ch, tab_width| pos.advanced(*ch, tab_width),
        move |ch: &char| if pred(*ch) { Some(*ch) } else { None },
    )
}

/// Consume exactly the character `expected`.
pub fn char<S, U>(expected: char) -> BoxedParser<S, U, char>
where
    S: Stream<Token = char> + 'static,
    U: Clone + 'static,
{
    satisfy(move |ch| ch == expected).label(&format!("{:?}", expected))
}

/// Consume any one character.
pub fn any_char<S, U>() -> BoxedParser<S, U, char>
where
    S: Stream<Token = char> + 'static,
    U: Clone + 'static,
{
    satisfy(|_| true)
}

/// Consume one character contained in `set`.
pub fn one_of<S, U>(set: &str) -> BoxedParser<S, U, char>
where
    S: Stream<Token = char> + 'static,
    U: Clone + 'static,
{
    let set = set.to_string();
    satisfy(move |ch| set.contains(ch))
}

/// Consume one character not contained in `set`.
pub fn none_of<S, U>(set: &str) -> BoxedParser<S, U, char>
where
    S: Stream<Token = char> + 'static,
    U: Clone + 'static,
{
    let set = set.to_string();
    satisfy(move |ch| !set.contains(ch))
}

/// Consume exactly the string `expected`.
///
/// All-or-nothing on the first character; once the first character matched,
/// a later mismatch is a committed failure (use [`crate::parser::attempt`]
/// to backtrack over a partial match).
pub fn string<S, U>(expected: impl Into<String>) -> BoxedParser<S, U, String>
where
    S: Stream<Token = char> + 'static,
    U: Clone + 'static,
{
    let expected = expected.into();
    let label = format!("{:?}", expected);
    tokens(expected.chars().collect(), label, |pos, ch, tab_width| {
        pos.advanced(*ch, tab_width)
    })
    .map(|chars| chars.into_iter().collect())
}

/// An ASCII digit `0..=9`.
pub fn digit<S, U>() -> BoxedParser<S, U, char>
where
    S: Stream<Token = char> + 'static,
    U: Clone + 'static,
{
    satisfy(|ch| ch.is_ascii_digit()).label("digit")
}

/// An ASCII hexadecimal digit.
pub fn hex_digit<S, U>() -> BoxedParser<S, U, char>
where
    S: Stream<Token = char> + 'static,
    U: Clone + 'static,
{
    satisfy(|ch| ch.is_ascii_hexdigit()).label("hexadecimal digit")
}

/// An ASCII octal digit `0..=7`.
pub fn oct_digit<S, U>() -> BoxedParser<S, U, char>
where
    S: Stream<Token = char> + 'static,
    U: Clone + 'static,
{
    satisfy(|ch| ('0'..='7').contains(&ch)).label("octal digit")
}

/// A Unicode letter.
pub fn letter<S, U>() -> BoxedParser<S, U, char>
where
    S: Stream<Token = char> + 'static,
    U: Clone + 'static,
{
    satisfy(char::is_alphabetic).label("letter")
}

/// A Unicode letter or digit.
pub fn alpha_num<S, U>() -> BoxedParser<S, U, char>
where
    S: Stream<Token = char> + 'static,
    U: Clone + 'static,
{
    satisfy(char::is_alphanumeric).label("letter or digit")
}

/// A Unicode whitespace character.
pub fn space<S, U>() -> BoxedParser<S, U, char>
where
    S: Stream<Token = char> + 'static,
    U: Clone + 'static,
{
    satisfy(char::is_whitespace).label("space")
}

/// Zero or more whitespace characters.
pub fn spaces<S, U>() -> BoxedParser<S, U, ()>
where
    S: Stream<Token = char> + 'static,
    U: Clone + 'static,
{
    crate::parser::skip_many(space()).label("white space")
}

/// An uppercase letter.
pub fn upper<S, U>() -> BoxedParser<S, U, char>
where
    S: Stream<Token = char> + 'static,
    U: Clone + 'static,
{
    satisfy(char::is_uppercase).label("uppercase letter")
}

/// A lowercase letter.
pub fn lower<S, U>() -> BoxedParser<S, U, char>
where
    S: Stream<Token = char> + 'static,
    U: Clone + 'static,
{
    satisfy(char::is_lowercase).label("lowercase letter")
}

/// A tab character.
pub fn tab<S, U>() -> BoxedParser<S, U, char>
where
    S: Stream<Token = char> + 'static,
    U: Clone + 'static,
{
    char('\t').label("tab")
}

/// A line feed.
pub fn newline<S, U>() -> BoxedParser<S, U, char>
where
    S: Stream<Token = char> + 'static,
    U: Clone + 'static,
{
    char('\n').label("new-line")
}

/// A carriage return followed by a line feed, yielding `'\n'`.
pub fn crlf<S, U>() -> BoxedParser<S, U, char>
where
    S: Stream<Token = char> + 'static,
    U: Clone + 'static,
{
    char('\r').skip_left(char('\n')).label("crlf new-line")
}

/// An end of line: `"\n"` or `"\r\n"`, yielding `'\n'`.
pub fn eol<S, U>() -> BoxedParser<S, U, char>
where
    S: Stream<Token = char> + 'static,
    U: Clone + 'static,
{
    newline().or(crlf()).label("new-line")
}
