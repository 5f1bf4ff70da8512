use std::fmt::Debug;
use std::ops::{Add, BitOr, Mul, Shr, Sub};
use std::sync::Arc;

use crate::error::{Message, ParseError};
use crate::pos::SourcePos;
use crate::stream::Stream;

use super::state::{ParseResult, ParseState, Parser};

// === Boxed parser for type erasure ===

/// A reusable, shareable parser value.
///
/// Parsers are immutable once built and cheap to clone; they can be shared
/// across threads and run any number of times.
pub struct BoxedParser<S, U, T> {
    parser: Arc<dyn Fn(&mut ParseState<S, U>) -> ParseResult<T> + Send + Sync>,
}

impl<S, U, T> Clone for BoxedParser<S, U, T> {
    fn clone(&self) -> Self {
        BoxedParser {
            parser: Arc::clone(&self.parser),
        }
    }
}

impl<S: Stream, U, T> BoxedParser<S, U, T> {
    pub fn new<P>(parser: P) -> Self
    where
        P: Parser<S, U, T> + Send + Sync + 'static,
    {
        BoxedParser {
            parser: Arc::new(move |state: &mut ParseState<S, U>| parser.parse(state)),
        }
    }
}

impl<S: Stream, U, T> Parser<S, U, T> for BoxedParser<S, U, T> {
    fn parse(&self, state: &mut ParseState<S, U>) -> ParseResult<T> {
        (self.parser)(state)
    }
}

// === Combinators as methods ===

impl<S, U, T> BoxedParser<S, U, T>
where
    S: Stream + 'static,
    U: Clone + 'static,
    T: 'static,
{
    /// Sequence: parse self then other, return (T, V)
    pub fn seq<V: 'static>(self, other: BoxedParser<S, U, V>) -> BoxedParser<S, U, (T, V)> {
        BoxedParser::new(move |state: &mut ParseState<S, U>| {
            let a = self.parse(state)?;
            let b = other.parse(state)?;
            Ok((a, b))
        })
    }

    /// Keep left: parse self then other, discard other's result
    pub fn skip<V: 'static>(self, other: BoxedParser<S, U, V>) -> BoxedParser<S, U, T> {
        BoxedParser::new(move |state: &mut ParseState<S, U>| {
            let a = self.parse(state)?;
            let _ = other.parse(state)?;
            Ok(a)
        })
    }

    /// Keep right: parse self then other, discard self's result
    pub fn skip_left<V: 'static>(self, other: BoxedParser<S, U, V>) -> BoxedParser<S, U, V> {
        BoxedParser::new(move |state: &mut ParseState<S, U>| {
            let _ = self.parse(state)?;
            other.parse(state)
        })
    }

    /// Map: transform result
    pub fn map<V, F>(self, f: F) -> BoxedParser<S, U, V>
    where
        V: 'static,
        F: Fn(T) -> V + Send + Sync + 'static,
    {
        BoxedParser::new(move |state: &mut ParseState<S, U>| {
            let a = self.parse(state)?;
            Ok(f(a))
        })
    }

    /// Monadic bind: feed the result into a parser-producing function
    pub fn and_then<V, F>(self, f: F) -> BoxedParser<S, U, V>
    where
        V: 'static,
        F: Fn(T) -> BoxedParser<S, U, V> + Send + Sync + 'static,
    {
        BoxedParser::new(move |state: &mut ParseState<S, U>| {
            let a = self.parse(state)?;
            f(a).parse(state)
        })
    }

    /// Choice: try self; if it fails without consuming input, try other.
    ///
    /// A failure *after* consumption commits to the first branch — wrap it
    /// in [`attempt`] to get unconditional backtracking. The first branch's
    /// expectations are kept either way, so error reports cover both.
    pub fn or(self, other: BoxedParser<S, U, T>) -> BoxedParser<S, U, T> {
        BoxedParser::new(move |state: &mut ParseState<S, U>| {
            let cp = state.checkpoint();
            match self.parse(state) {
                Ok(a) => Ok(a),
                Err(first) => {
                    if state.consumed_since(&cp) {
                        return Err(first);
                    }
                    state.restore(cp);
                    match other.parse(state) {
                        Ok(b) => {
                            state.recover(first);
                            Ok(b)
                        }
                        Err(second) => Err(first.merge(second)),
                    }
                }
            }
        })
    }

    /// Name this parser in error reports.
    ///
    /// Replaces the expectations of an outcome that consumed no input with
    /// the single given label; once input has been consumed the low-level
    /// expectation is more precise, so it is left alone.
    pub fn label(self, name: &str) -> BoxedParser<S, U, T> {
        self.relabel(Some(name.to_string()))
    }

    /// Remove this parser's expectations from error reports entirely.
    pub fn hidden(self) -> BoxedParser<S, U, T> {
        self.relabel(None)
    }

    fn relabel(self, name: Option<String>) -> BoxedParser<S, U, T> {
        BoxedParser::new(move |state: &mut ParseState<S, U>| {
            // Scope the discarded-error record: expectations recovered while
            // this parser runs belong to it and get its label too.
            let outer = state.take_recovered();
            let before = state.consumed();
            let outcome = self.parse(state);
            let empty = state.consumed() == before;
            let mut inner = state.take_recovered();
            let outcome = match outcome {
                Ok(value) => {
                    if empty {
                        if let Some(err) = inner.as_mut() {
                            if !err.is_unknown() {
                                err.replace_expected(name.as_deref());
                            }
                        }
                    }
                    Ok(value)
                }
                Err(mut err) => {
                    if empty {
                        err.replace_expected(name.as_deref());
                        if let Some(carried) = inner.as_mut() {
                            carried.replace_expected(name.as_deref());
                        }
                    }
                    Err(err)
                }
            };
            let merged = match (outer, inner) {
                (Some(a), Some(b)) => Some(a.merge(b)),
                (Some(a), None) => Some(a),
                (None, b) => b,
            };
            if let Some(err) = merged {
                state.recover(err);
            }
            outcome
        })
    }

    /// Run this parser against an input; see [`super::run`].
    pub fn run(&self, name: &str, user: U, input: S) -> Result<T, ParseError> {
        super::run(self, name, user, input)
    }
}

// === Operator overloading ===

/// `+` for sequence: A + B -> (A, B)
impl<S, U, T, V> Add<BoxedParser<S, U, V>> for BoxedParser<S, U, T>
where
    S: Stream + 'static,
    U: Clone + 'static,
    T: 'static,
    V: 'static,
{
    type Output = BoxedParser<S, U, (T, V)>;

    fn add(self, rhs: BoxedParser<S, U, V>) -> Self::Output {
        self.seq(rhs)
    }
}

/// `-` for keep left: A - B -> A (parse B, discard result)
impl<S, U, T, V> Sub<BoxedParser<S, U, V>> for BoxedParser<S, U, T>
where
    S: Stream + 'static,
    U: Clone + 'static,
    T: 'static,
    V: 'static,
{
    type Output = BoxedParser<S, U, T>;

    fn sub(self, rhs: BoxedParser<S, U, V>) -> Self::Output {
        self.skip(rhs)
    }
}

/// `*` for keep right: A * B -> B (parse A, discard result)
impl<S, U, T, V> Mul<BoxedParser<S, U, V>> for BoxedParser<S, U, T>
where
    S: Stream + 'static,
    U: Clone + 'static,
    T: 'static,
    V: 'static,
{
    type Output = BoxedParser<S, U, V>;

    fn mul(self, rhs: BoxedParser<S, U, V>) -> Self::Output {
        self.skip_left(rhs)
    }
}

/// `|` for choice: A | B -> A or B
impl<S, U, T> BitOr<BoxedParser<S, U, T>> for BoxedParser<S, U, T>
where
    S: Stream + 'static,
    U: Clone + 'static,
    T: 'static,
{
    type Output = BoxedParser<S, U, T>;

    fn bitor(self, rhs: BoxedParser<S, U, T>) -> Self::Output {
        self.or(rhs)
    }
}

/// `>>` for map: A >> fn -> B
impl<S, U, T, V, F> Shr<F> for BoxedParser<S, U, T>
where
    S: Stream + 'static,
    U: Clone + 'static,
    T: 'static,
    V: 'static,
    F: Fn(T) -> V + Send + Sync + 'static,
{
    type Output = BoxedParser<S, U, V>;

    fn shr(self, f: F) -> Self::Output {
        self.map(f)
    }
}

// === Primitive parsers ===

/// Succeed with `value` without consuming input.
pub fn pure<S, U, T>(value: T) -> BoxedParser<S, U, T>
where
    S: Stream + 'static,
    U: 'static,
    T: Clone + Send + Sync + 'static,
{
    BoxedParser::new(move |_state: &mut ParseState<S, U>| Ok(value.clone()))
}

/// Fail without consuming input, with a free-form message.
pub fn fail<S, U, T>(message: &str) -> BoxedParser<S, U, T>
where
    S: Stream + 'static,
    U: 'static,
    T: 'static,
{
    let message = message.to_string();
    BoxedParser::new(move |state: &mut ParseState<S, U>| {
        Err(ParseError::new(
            state.position().clone(),
            Message::Message(message.clone()),
        ))
    })
}

/// Fail without consuming input, reporting `what` as the unexpected item.
pub fn unexpected<S, U, T>(what: &str) -> BoxedParser<S, U, T>
where
    S: Stream + 'static,
    U: 'static,
    T: 'static,
{
    let what = what.to_string();
    BoxedParser::new(move |state: &mut ParseState<S, U>| Err(state.unexpected_here(what.clone())))
}

/// The atomic token consumer every concrete parser bottoms out in.
///
/// Peeks one token; `matcher` decides whether to accept it and what value
/// to produce. On acceptance the stream advances and the position is
/// updated with `next_pos`. On rejection nothing is consumed and the token
/// is reported via `show`.
pub fn token_prim<S, U, T, Sh, Np, Ma>(show: Sh, next_pos: Np, matcher: Ma) -> BoxedParser<S, U, T>
where
    S: Stream + 'static,
    U: 'static,
    T: 'static,
    Sh: Fn(&S::Token) -> String + Send + Sync + 'static,
    Np: Fn(&SourcePos, &S::Token, u32) -> SourcePos + Send + Sync + 'static,
    Ma: Fn(&S::Token) -> Option<T> + Send + Sync + 'static,
{
    BoxedParser::new(move |state: &mut ParseState<S, U>| match state.input().uncons() {
        None => Err(state.unexpected_here("end of input")),
        Some((tok, rest)) => match matcher(&tok) {
            Some(value) => {
                let next = next_pos(state.position(), &tok, state.tab_width());
                state.commit(rest, next);
                Ok(value)
            }
            None => Err(state.unexpected_here(show(&tok))),
        },
    })
}

/// Match a fixed sequence of tokens, all or nothing on the first token.
///
/// A mismatch on the very first token consumes nothing; a mismatch later
/// leaves the matched prefix consumed (committed), with the error reported
/// at the sequence's starting position.
pub fn tokens<S, U, Np>(
    expected: Vec<S::Token>,
    label: String,
    next_pos: Np,
) -> BoxedParser<S, U, Vec<S::Token>>
where
    S: Stream + 'static,
    S::Token: PartialEq + Send + Sync,
    U: 'static,
    Np: Fn(&SourcePos, &S::Token, u32) -> SourcePos + Send + Sync + 'static,
{
    BoxedParser::new(move |state: &mut ParseState<S, U>| {
        let start = state.position().clone();
        for want in &expected {
            match state.input().uncons() {
                Some((tok, rest)) if tok == *want => {
                    let next = next_pos(state.position(), &tok, state.tab_width());
                    state.commit(rest, next);
                }
                found => {
                    let what = match found {
                        Some((tok, _)) => format!("{:?}", tok),
                        None => "end of input".to_string(),
                    };
                    return Err(ParseError::new(start, Message::Unexpected(what))
                        .add(Message::Expected(label.clone())));
                }
            }
        }
        Ok(expected.clone())
    })
}

/// Turn a committed failure into a backtracking one.
///
/// Runs `parser`; on any failure the state is rewound to where it started,
/// so an enclosing alternation can still try its other branches. The error
/// itself is untouched (it keeps its far position). This is the only source
/// of unbounded backtracking.
pub fn attempt<S, U, T>(parser: BoxedParser<S, U, T>) -> BoxedParser<S, U, T>
where
    S: Stream + 'static,
    U: Clone + 'static,
    T: 'static,
{
    BoxedParser::new(move |state: &mut ParseState<S, U>| {
        let cp = state.checkpoint();
        match parser.parse(state) {
            Ok(value) => Ok(value),
            Err(err) => {
                state.restore(cp);
                Err(err)
            }
        }
    })
}

/// Parse ahead without consuming: on success the input is rewound.
/// Failures pass through unchanged.
pub fn look_ahead<S, U, T>(parser: BoxedParser<S, U, T>) -> BoxedParser<S, U, T>
where
    S: Stream + 'static,
    U: Clone + 'static,
    T: 'static,
{
    BoxedParser::new(move |state: &mut ParseState<S, U>| {
        let cp = state.checkpoint();
        match parser.parse(state) {
            Ok(value) => {
                state.restore(cp);
                Ok(value)
            }
            Err(err) => Err(err),
        }
    })
}

/// Succeed only if `parser` fails; never consumes input.
pub fn not_followed_by<S, U, T>(parser: BoxedParser<S, U, T>) -> BoxedParser<S, U, ()>
where
    S: Stream + 'static,
    U: Clone + 'static,
    T: Debug + 'static,
{
    BoxedParser::new(move |state: &mut ParseState<S, U>| {
        let cp = state.checkpoint();
        let pos = state.position().clone();
        match parser.parse(state) {
            Ok(value) => {
                state.restore(cp);
                Err(ParseError::new(
                    pos,
                    Message::Unexpected(format!("{:?}", value)),
                ))
            }
            Err(_) => {
                state.restore(cp);
                Ok(())
            }
        }
    })
}

/// Succeed only at the end of input.
pub fn eof<S, U>() -> BoxedParser<S, U, ()>
where
    S: Stream + 'static,
    U: 'static,
{
    BoxedParser::new(|state: &mut ParseState<S, U>| match state.peek() {
        None => Ok(()),
        Some(tok) => Err(state
            .unexpected_here(format!("{:?}", tok))
            .add(Message::Expected("end of input".to_string()))),
    })
}

/// Defer construction, allowing recursive grammars.
///
/// The closure is invoked each time the parser runs, so a parser for a
/// recursive rule can refer back to the function that builds it without
/// the construction itself recursing forever.
pub fn lazy<S, U, T, F>(build: F) -> BoxedParser<S, U, T>
where
    S: Stream + 'static,
    U: 'static,
    T: 'static,
    F: Fn() -> BoxedParser<S, U, T> + Send + Sync + 'static,
{
    BoxedParser::new(move |state: &mut ParseState<S, U>| build().parse(state))
}

// === State accessors ===

/// Yield the current user state.
pub fn get_state<S, U>() -> BoxedParser<S, U, U>
where
    S: Stream + 'static,
    U: Clone + 'static,
{
    BoxedParser::new(|state: &mut ParseState<S, U>| Ok(state.user().clone()))
}

/// Replace the user state.
pub fn put_state<S, U>(user: U) -> BoxedParser<S, U, ()>
where
    S: Stream + 'static,
    U: Clone + Send + Sync + 'static,
{
    BoxedParser::new(move |state: &mut ParseState<S, U>| {
        *state.user_mut() = user.clone();
        Ok(())
    })
}

/// Update the user state in place.
pub fn modify_state<S, U, F>(f: F) -> BoxedParser<S, U, ()>
where
    S: Stream + 'static,
    U: 'static,
    F: Fn(&mut U) + Send + Sync + 'static,
{
    BoxedParser::new(move |state: &mut ParseState<S, U>| {
        f(state.user_mut());
        Ok(())
    })
}

/// Yield the current source position.
pub fn get_position<S, U>() -> BoxedParser<S, U, SourcePos>
where
    S: Stream + 'static,
    U: 'static,
{
    BoxedParser::new(|state: &mut ParseState<S, U>| Ok(state.position().clone()))
}

/// Overwrite the current source position.
pub fn set_position<S, U>(pos: SourcePos) -> BoxedParser<S, U, ()>
where
    S: Stream + 'static,
    U: 'static,
{
    BoxedParser::new(move |state: &mut ParseState<S, U>| {
        state.set_position(pos.clone());
        Ok(())
    })
}

/// Yield the remaining input.
pub fn get_input<S, U>() -> BoxedParser<S, U, S>
where
    S: Stream + 'static,
    U: 'static,
{
    BoxedParser::new(|state: &mut ParseState<S, U>| Ok(state.input().clone()))
}

/// Replace the remaining input.
pub fn set_input<S, U>(input: S) -> BoxedParser<S, U, ()>
where
    S: Stream + Send + Sync + 'static,
    U: 'static,
{
    BoxedParser::new(move |state: &mut ParseState<S, U>| {
        state.set_input(input.clone());
        Ok(())
    })
}

// === Repetition and choice ===

/// Parse zero or more occurrences.
pub fn many<S, U, T>(parser: BoxedParser<S, U, T>) -> BoxedParser<S, U, Vec<T>>
where
    S: Stream + 'static,
    U: Clone + 'static,
    T: 'static,
{
    BoxedParser::new(move |state: &mut ParseState<S, U>| {
        let mut items = Vec::new();
        loop {
            let cp = state.checkpoint();
            match parser.parse(state) {
                Ok(item) => {
                    if !state.consumed_since(&cp) {
                        panic!("combinator `many` applied to a parser that accepts an empty string");
                    }
                    items.push(item);
                }
                Err(err) => {
                    if state.consumed_since(&cp) {
                        return Err(err);
                    }
                    state.restore(cp);
                    state.recover(err);
                    return Ok(items);
                }
            }
        }
    })
}

/// Parse one or more occurrences.
pub fn many1<S, U, T>(parser: BoxedParser<S, U, T>) -> BoxedParser<S, U, Vec<T>>
where
    S: Stream + 'static,
    U: Clone + 'static,
    T: 'static,
{
    BoxedParser::new(move |state: &mut ParseState<S, U>| {
        let first = parser.parse(state)?;
        let mut items = vec![first];
        loop {
            let cp = state.checkpoint();
            match parser.parse(state) {
                Ok(item) => {
                    if !state.consumed_since(&cp) {
                        panic!(
                            "combinator `many1` applied to a parser that accepts an empty string"
                        );
                    }
                    items.push(item);
                }
                Err(err) => {
                    if state.consumed_since(&cp) {
                        return Err(err);
                    }
                    state.restore(cp);
                    state.recover(err);
                    return Ok(items);
                }
            }
        }
    })
}

/// Parse zero or more occurrences, discarding the results.
pub fn skip_many<S, U, T>(parser: BoxedParser<S, U, T>) -> BoxedParser<S, U, ()>
where
    S: Stream + 'static,
    U: Clone + 'static,
    T: 'static,
{
    BoxedParser::new(move |state: &mut ParseState<S, U>| loop {
        let cp = state.checkpoint();
        match parser.parse(state) {
            Ok(_) => {
                if !state.consumed_since(&cp) {
                    panic!(
                        "combinator `skip_many` applied to a parser that accepts an empty string"
                    );
                }
            }
            Err(err) => {
                if state.consumed_since(&cp) {
                    return Err(err);
                }
                state.restore(cp);
                state.recover(err);
                return Ok(());
            }
        }
    })
}

/// Parse one or more occurrences, discarding the results.
pub fn skip_many1<S, U, T>(parser: BoxedParser<S, U, T>) -> BoxedParser<S, U, ()>
where
    S: Stream + 'static,
    U: Clone + 'static,
    T: 'static,
{
    let rest = skip_many(parser.clone());
    BoxedParser::new(move |state: &mut ParseState<S, U>| {
        let _ = parser.parse(state)?;
        rest.parse(state)
    })
}

/// Try each parser in order; first success wins.
///
/// Expectations from every failed branch are kept, so the final report
/// lists all alternatives. A branch that fails after consuming input
/// commits, exactly as with `or`.
pub fn choice<S, U, T>(parsers: Vec<BoxedParser<S, U, T>>) -> BoxedParser<S, U, T>
where
    S: Stream + 'static,
    U: Clone + 'static,
    T: 'static,
{
    BoxedParser::new(move |state: &mut ParseState<S, U>| {
        let mut collected: Option<ParseError> = None;
        for parser in &parsers {
            let cp = state.checkpoint();
            match parser.parse(state) {
                Ok(value) => {
                    if let Some(err) = collected {
                        state.recover(err);
                    }
                    return Ok(value);
                }
                Err(err) => {
                    let merged = match collected {
                        Some(acc) => acc.merge(err),
                        None => err,
                    };
                    if state.consumed_since(&cp) {
                        return Err(merged);
                    }
                    state.restore(cp);
                    collected = Some(merged);
                }
            }
        }
        Err(collected.unwrap_or_else(|| ParseError::unknown(state.position().clone())))
    })
}

/// Parse `parser`, falling back to `default` on an empty failure.
pub fn option<S, U, T>(default: T, parser: BoxedParser<S, U, T>) -> BoxedParser<S, U, T>
where
    S: Stream + 'static,
    U: Clone + 'static,
    T: Clone + Send + Sync + 'static,
{
    BoxedParser::new(move |state: &mut ParseState<S, U>| {
        let cp = state.checkpoint();
        match parser.parse(state) {
            Ok(value) => Ok(value),
            Err(err) => {
                if state.consumed_since(&cp) {
                    return Err(err);
                }
                state.restore(cp);
                state.recover(err);
                Ok(default.clone())
            }
        }
    })
}

/// Parse `parser` or nothing, discarding the result.
pub fn optional<S, U, T>(parser: BoxedParser<S, U, T>) -> BoxedParser<S, U, ()>
where
    S: Stream + 'static,
    U: Clone + 'static,
    T: 'static,
{
    option((), parser.map(|_| ()))
}

/// Parse `open`, then `parser`, then `close`; keep the middle result.
pub fn between<S, U, A, B, T>(
    open: BoxedParser<S, U, A>,
    close: BoxedParser<S, U, B>,
    parser: BoxedParser<S, U, T>,
) -> BoxedParser<S, U, T>
where
    S: Stream + 'static,
    U: Clone + 'static,
    A: 'static,
    B: 'static,
    T: 'static,
{
    BoxedParser::new(move |state: &mut ParseState<S, U>| {
        let _ = open.parse(state)?;
        let value = parser.parse(state)?;
        let _ = close.parse(state)?;
        Ok(value)
    })
}

/// Zero or more `parser` separated by `sep`.
pub fn sep_by<S, U, T, V>(
    parser: BoxedParser<S, U, T>,
    sep: BoxedParser<S, U, V>,
) -> BoxedParser<S, U, Vec<T>>
where
    S: Stream + 'static,
    U: Clone + 'static,
    T: 'static,
    V: 'static,
{
    let rest = sep_by1(parser, sep);
    BoxedParser::new(move |state: &mut ParseState<S, U>| {
        let cp = state.checkpoint();
        match rest.parse(state) {
            Ok(items) => Ok(items),
            Err(err) => {
                if state.consumed_since(&cp) {
                    return Err(err);
                }
                state.restore(cp);
                state.recover(err);
                Ok(Vec::new())
            }
        }
    })
}

/// One or more `parser` separated by `sep`.
pub fn sep_by1<S, U, T, V>(
    parser: BoxedParser<S, U, T>,
    sep: BoxedParser<S, U, V>,
) -> BoxedParser<S, U, Vec<T>>
where
    S: Stream + 'static,
    U: Clone + 'static,
    T: 'static,
    V: 'static,
{
    BoxedParser::new(move |state: &mut ParseState<S, U>| {
        let first = parser.parse(state)?;
        let mut items = vec![first];
        loop {
            let cp = state.checkpoint();
            match sep.parse(state) {
                Ok(_) => match parser.parse(state) {
                    Ok(item) => items.push(item),
                    Err(err) => {
                        if state.consumed_since(&cp) {
                            return Err(err);
                        }
                        state.restore(cp);
                        state.recover(err);
                        return Ok(items);
                    }
                },
                Err(err) => {
                    if state.consumed_since(&cp) {
                        return Err(err);
                    }
                    state.restore(cp);
                    state.recover(err);
                    return Ok(items);
                }
            }
        }
    })
}

/// Zero or more `parser`, each followed by `sep`.
pub fn end_by<S, U, T, V>(
    parser: BoxedParser<S, U, T>,
    sep: BoxedParser<S, U, V>,
) -> BoxedParser<S, U, Vec<T>>
where
    S: Stream + 'static,
    U: Clone + 'static,
    T: 'static,
    V: 'static,
{
    many(parser.skip(sep))
}

/// One or more `parser`, each followed by `sep`.
pub fn end_by1<S, U, T, V>(
    parser: BoxedParser<S, U, T>,
    sep: BoxedParser<S, U, V>,
) -> BoxedParser<S, U, Vec<T>>
where
    S: Stream + 'static,
    U: Clone + 'static,
    T: 'static,
    V: 'static,
{
    many1(parser.skip(sep))
}

/// Zero or more `parser` separated, and optionally terminated, by `sep`.
pub fn sep_end_by<S, U, T, V>(
    parser: BoxedParser<S, U, T>,
    sep: BoxedParser<S, U, V>,
) -> BoxedParser<S, U, Vec<T>>
where
    S: Stream + 'static,
    U: Clone + 'static,
    T: 'static,
    V: 'static,
{
    let rest = sep_end_by1(parser, sep);
    BoxedParser::new(move |state: &mut ParseState<S, U>| {
        let cp = state.checkpoint();
        match rest.parse(state) {
            Ok(items) => Ok(items),
            Err(err) => {
                if state.consumed_since(&cp) {
                    return Err(err);
                }
                state.restore(cp);
                state.recover(err);
                Ok(Vec::new())
            }
        }
    })
}

/// One or more `parser` separated, and optionally terminated, by `sep`.
pub fn sep_end_by1<S, U, T, V>(
    parser: BoxedParser<S, U, T>,
    sep: BoxedParser<S, U, V>,
) -> BoxedParser<S, U, Vec<T>>
where
    S: Stream + 'static,
    U: Clone + 'static,
    T: 'static,
    V: 'static,
{
    BoxedParser::new(move |state: &mut ParseState<S, U>| {
        let first = parser.parse(state)?;
        let mut items = vec![first];
        loop {
            let cp = state.checkpoint();
            match sep.parse(state) {
                Ok(_) => {
                    let after_sep = state.checkpoint();
                    match parser.parse(state) {
                        Ok(item) => items.push(item),
                        Err(err) => {
                            if state.consumed_since(&after_sep) {
                                return Err(err);
                            }
                            // Trailing separator: keep it consumed and stop.
                            state.restore(after_sep);
                            state.recover(err);
                            return Ok(items);
                        }
                    }
                }
                Err(err) => {
                    if state.consumed_since(&cp) {
                        return Err(err);
                    }
                    state.restore(cp);
                    state.recover(err);
                    return Ok(items);
                }
            }
        }
    })
}

/// Repeat `parser` until `end` succeeds; `end` is tried first each round.
pub fn many_till<S, U, T, V>(
    parser: BoxedParser<S, U, T>,
    end: BoxedParser<S, U, V>,
) -> BoxedParser<S, U, Vec<T>>
where
    S: Stream + 'static,
    U: Clone + 'static,
    T: 'static,
    V: 'static,
{
    BoxedParser::new(move |state: &mut ParseState<S, U>| {
        let mut items = Vec::new();
        loop {
            let before = state.consumed();
            let cp = state.checkpoint();
            match end.parse(state) {
                Ok(_) => return Ok(items),
                Err(err) => {
                    if state.consumed() > before {
                        return Err(err);
                    }
                    state.restore(cp);
                    state.recover(err);
                    match parser.parse(state) {
                        Ok(item) => {
                            if state.consumed() == before {
                                panic!("combinator `many_till` applied to a parser that accepts an empty string");
                            }
                            items.push(item);
                        }
                        Err(err) => return Err(err),
                    }
                }
            }
        }
    })
}

/// Exactly `n` occurrences of `parser`.
pub fn count<S, U, T>(n: usize, parser: BoxedParser<S, U, T>) -> BoxedParser<S, U, Vec<T>>
where
    S: Stream + 'static,
    U: Clone + 'static,
    T: 'static,
{
    BoxedParser::new(move |state: &mut ParseState<S, U>| {
        let mut items = Vec::with_capacity(n);
        for _ in 0..n {
            items.push(parser.parse(state)?);
        }
        Ok(items)
    })
}
