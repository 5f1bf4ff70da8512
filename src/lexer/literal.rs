//! Character, string, and numeric literal parsers for the lexer.
//!
//! Escape handling follows the Haskell report: single-letter escapes,
//! numeric escapes in decimal/octal/hex, ASCII control mnemonics, caret
//! controls, and (inside strings) the empty escape `\&` plus whitespace
//! gaps `\ ... \` that contribute nothing to the result.

use crate::char::{char, digit, hex_digit, oct_digit, one_of, satisfy, string};
use crate::parser::{
    attempt, between, choice, fail, many, many1, option, pure, skip_many1, BoxedParser,
};
use crate::stream::Stream;

/// A numeric literal: integral or floating.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

// === Character and string literals ===

pub(crate) fn char_literal<S, U>() -> BoxedParser<S, U, char>
where
    S: Stream<Token = char> + 'static,
    U: Clone + 'static,
{
    between(
        char('\''),
        char('\'').label("end of character"),
        character_char(),
    )
}

fn character_char<S, U>() -> BoxedParser<S, U, char>
where
    S: Stream<Token = char> + 'static,
    U: Clone + 'static,
{
    let direct = satisfy(|ch: char| ch != '\'' && ch != '\\' && ch as u32 > 26);
    let escape = char('\\').skip_left(escape_code());
    direct.or(escape).label("literal character")
}

pub(crate) fn string_literal<S, U>() -> BoxedParser<S, U, String>
where
    S: Stream<Token = char> + 'static,
    U: Clone + 'static,
{
    between(
        char('"'),
        char('"').label("end of string"),
        many(string_char()),
    )
    .map(|chars: Vec<Option<char>>| chars.into_iter().flatten().collect())
}

/// One string element: a direct character, or an escape. Gaps and the
/// empty escape yield `None` and disappear from the result.
fn string_char<S, U>() -> BoxedParser<S, U, Option<char>>
where
    S: Stream<Token = char> + 'static,
    U: Clone + 'static,
{
    let direct = satisfy(|ch: char| ch != '"' && ch != '\\' && ch as u32 > 26).map(Some);
    direct.or(string_escape()).label("string character")
}

fn string_escape<S, U>() -> BoxedParser<S, U, Option<char>>
where
    S: Stream<Token = char> + 'static,
    U: Clone + 'static,
{
    let gap = skip_many1(satisfy(|ch: char| ch.is_whitespace()))
        .skip(char('\\').label("end of string gap"))
        .map(|_| None::<char>);
    let empty = char('&').map(|_| None::<char>);
    let code = escape_code().map(Some);
    char('\\').skip_left(choice(vec![gap, empty, code]))
}

// === Escape codes ===

const ESCAPE_MAP: &[(char, char)] = &[
    ('a', '\u{07}'),
    ('b', '\u{08}'),
    ('f', '\u{0C}'),
    ('n', '\n'),
    ('r', '\r'),
    ('t', '\t'),
    ('v', '\u{0B}'),
    ('\\', '\\'),
    ('"', '"'),
    ('\'', '\''),
];

// Three-letter mnemonics first, so "SOH" wins over "SO".
const ASCII_CODES: &[(&str, char)] = &[
    ("NUL", '\u{00}'),
    ("SOH", '\u{01}'),
    ("STX", '\u{02}'),
    ("ETX", '\u{03}'),
    ("EOT", '\u{04}'),
    ("ENQ", '\u{05}'),
    ("ACK", '\u{06}'),
    ("BEL", '\u{07}'),
    ("DLE", '\u{10}'),
    ("DC1", '\u{11}'),
    ("DC2", '\u{12}'),
    ("DC3", '\u{13}'),
    ("DC4", '\u{14}'),
    ("NAK", '\u{15}'),
    ("SYN", '\u{16}'),
    ("ETB", '\u{17}'),
    ("CAN", '\u{18}'),
    ("SUB", '\u{1A}'),
    ("ESC", '\u{1B}'),
    ("DEL", '\u{7F}'),
    ("BS", '\u{08}'),
    ("HT", '\u{09}'),
    ("LF", '\n'),
    ("VT", '\u{0B}'),
    ("FF", '\u{0C}'),
    ("CR", '\r'),
    ("SO", '\u{0E}'),
    ("SI", '\u{0F}'),
    ("EM", '\u{19}'),
    ("FS", '\u{1C}'),
    ("GS", '\u{1D}'),
    ("RS", '\u{1E}'),
    ("US", '\u{1F}'),
    ("SP", ' '),
];

fn escape_code<S, U>() -> BoxedParser<S, U, char>
where
    S: Stream<Token = char> + 'static,
    U: Clone + 'static,
{
    choice(vec![char_esc(), char_num(), char_ascii(), char_control()]).label("escape code")
}

fn char_esc<S, U>() -> BoxedParser<S, U, char>
where
    S: Stream<Token = char> + 'static,
    U: Clone + 'static,
{
    satisfy(|ch| ESCAPE_MAP.iter().any(|(esc, _)| *esc == ch)).map(|ch| {
        ESCAPE_MAP
            .iter()
            .find(|(esc, _)| *esc == ch)
            .map(|(_, code)| *code)
            .expect("the predicate only accepts mapped escapes")
    })
}

fn char_num<S, U>() -> BoxedParser<S, U, char>
where
    S: Stream<Token = char> + 'static,
    U: Clone + 'static,
{
    let code = choice(vec![
        base_integer(10, digit()),
        char('o').skip_left(base_integer(8, oct_digit())),
        char('x').skip_left(base_integer(16, hex_digit())),
    ]);
    code.and_then(|code: u64| {
        match u32::try_from(code).ok().and_then(std::char::from_u32) {
            Some(ch) => pure(ch),
            None => fail("invalid character code"),
        }
    })
}

fn char_ascii<S, U>() -> BoxedParser<S, U, char>
where
    S: Stream<Token = char> + 'static,
    U: Clone + 'static,
{
    choice(
        ASCII_CODES
            .iter()
            .map(|(mnemonic, code)| {
                let code = *code;
                attempt(string(*mnemonic)).map(move |_| code)
            })
            .collect(),
    )
}

fn char_control<S, U>() -> BoxedParser<S, U, char>
where
    S: Stream<Token = char> + 'static,
    U: Clone + 'static,
{
    let control = satisfy(|ch: char| ch.is_ascii_uppercase()).map(|ch| ((ch as u8) - 64) as char);
    char('^').skip_left(control)
}

// === Numbers ===

/// One or more digits in `base`, folded into a `u64` with overflow checks.
fn base_integer<S, U>(base: u32, digit: BoxedParser<S, U, char>) -> BoxedParser<S, U, u64>
where
    S: Stream<Token = char> + 'static,
    U: Clone + 'static,
{
    many1(digit).and_then(move |digits: Vec<char>| {
        let mut value: u64 = 0;
        for ch in digits {
            let d = u64::from(ch.to_digit(base).expect("the digit parser matches its base"));
            value = match value
                .checked_mul(u64::from(base))
                .and_then(|shifted| shifted.checked_add(d))
            {
                Some(v) => v,
                None => return fail("integer literal out of range"),
            };
        }
        pure(value)
    })
}

/// One or more decimal digits, read as an unsigned integer.
pub fn decimal<S, U>() -> BoxedParser<S, U, u64>
where
    S: Stream<Token = char> + 'static,
    U: Clone + 'static,
{
    base_integer(10, digit())
}

/// A `0x`/`0X` prefix followed by hexadecimal digits.
pub fn hexadecimal<S, U>() -> BoxedParser<S, U, u64>
where
    S: Stream<Token = char> + 'static,
    U: Clone + 'static,
{
    attempt(char('0').skip_left(one_of("xX"))).skip_left(base_integer(16, hex_digit()))
}

/// A `0o`/`0O` prefix followed by octal digits.
pub fn octal<S, U>() -> BoxedParser<S, U, u64>
where
    S: Stream<Token = char> + 'static,
    U: Clone + 'static,
{
    attempt(char('0').skip_left(one_of("oO"))).skip_left(base_integer(8, oct_digit()))
}

/// An optional sign directly in front of the digits; true means negative.
fn sign<S, U>() -> BoxedParser<S, U, bool>
where
    S: Stream<Token = char> + 'static,
    U: Clone + 'static,
{
    option(false, one_of("+-").map(|ch| ch == '-'))
}

pub(crate) fn signed_integer<S, U>() -> BoxedParser<S, U, i64>
where
    S: Stream<Token = char> + 'static,
    U: Clone + 'static,
{
    sign()
        .seq(decimal())
        .and_then(|(negative, magnitude): (bool, u64)| {
            let value = if negative {
                -(magnitude as i128)
            } else {
                magnitude as i128
            };
            match i64::try_from(value) {
                Ok(v) => pure(v),
                Err(_) => fail("integer literal out of range"),
            }
        })
}

/// `digits '.' digits [exp]` or `digits exp`: one of the fractional part
/// and the exponent must be present, or this is not a float.
pub(crate) fn float<S, U>() -> BoxedParser<S, U, f64>
where
    S: Stream<Token = char> + 'static,
    U: Clone + 'static,
{
    many1(digit()).and_then(|digits: Vec<char>| {
        let int_part: String = digits.into_iter().collect();
        fraction_exponent(int_part)
    })
}

fn fraction_exponent<S, U>(int_part: String) -> BoxedParser<S, U, f64>
where
    S: Stream<Token = char> + 'static,
    U: Clone + 'static,
{
    let with_fraction = {
        let int_part = int_part.clone();
        char('.')
            .skip_left(many1(digit()).label("fraction"))
            .seq(option(String::new(), exponent()))
            .map(move |(frac, exp): (Vec<char>, String)| {
                let frac: String = frac.into_iter().collect();
                read_float(&format!("{}.{}{}", int_part, frac, exp))
            })
    };
    let only_exponent = exponent().map(move |exp| read_float(&format!("{}{}", int_part, exp)));
    with_fraction.or(only_exponent)
}

/// `[eE] [+-]? digits`, rendered back to text for exact IEEE conversion.
fn exponent<S, U>() -> BoxedParser<S, U, String>
where
    S: Stream<Token = char> + 'static,
    U: Clone + 'static,
{
    one_of("eE")
        .skip_left(sign().seq(many1(digit()).label("exponent")))
        .map(|(negative, digits): (bool, Vec<char>)| {
            let digits: String = digits.into_iter().collect();
            if negative {
                format!("e-{}", digits)
            } else {
                format!("e{}", digits)
            }
        })
        .label("exponent")
}

fn read_float(text: &str) -> f64 {
    text.parse()
        .expect("the grammar only builds well-formed float literals")
}

pub(crate) fn signed_float<S, U>() -> BoxedParser<S, U, f64>
where
    S: Stream<Token = char> + 'static,
    U: Clone + 'static,
{
    sign()
        .seq(float())
        .map(|(negative, value)| if negative { -value } else { value })
}

pub(crate) fn number<S, U>() -> BoxedParser<S, U, Number>
where
    S: Stream<Token = char> + 'static,
    U: Clone + 'static,
{
    // The attempt matters: "12" is a valid prefix of "12.5".
    let as_float = attempt(float()).map(Number::Float);
    let as_int = decimal().and_then(|magnitude: u64| match i64::try_from(magnitude) {
        Ok(v) => pure(Number::Int(v)),
        Err(_) => fail("integer literal out of range"),
    });
    as_float.or(as_int)
}

pub(crate) fn signed_number<S, U>() -> BoxedParser<S, U, Number>
where
    S: Stream<Token = char> + 'static,
    U: Clone + 'static,
{
    sign().seq(number()).and_then(|(negative, value)| {
        if !negative {
            return pure(value);
        }
        match value {
            Number::Float(f) => pure(Number::Float(-f)),
            Number::Int(i) => pure(Number::Int(-i)),
        }
    })
}
