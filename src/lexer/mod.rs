//! Lexical tokenizer generator.
//!
//! A [`LanguageDef`] describes the lexical shape of a language: its comment
//! markers, what identifiers and operators look like, and which of them are
//! reserved. [`Lexer::new`] turns that description into a family of lexeme
//! parsers — identifiers, reserved words, operators, character/string/number
//! literals, brackets and separators — where every lexeme parser skips the
//! trailing whitespace (and comments) behind the token it read.
//!
//! ```text
//! let lexer = Lexer::new(LanguageDef {
//!     reserved_names: vec!["let".into(), "in".into()],
//!     ..LanguageDef::default()
//! });
//! let ident = lexer.identifier();     // fails on "let", skips trailing space
//! let number = lexer.signed_integer();
//! ```

mod literal;

pub use literal::{decimal, hexadecimal, octal, Number};

use unicode_ident::{is_xid_continue, is_xid_start};

use crate::char::{one_of, satisfy, string};
use crate::error::{Message, ParseError};
use crate::parser::{
    attempt, between, choice, many, not_followed_by, pure, sep_by, sep_by1, skip_many, skip_many1,
    unexpected, BoxedParser, ParseState,
};
use crate::stream::Stream;

/// Declarative description of a language's lexical level.
///
/// Parsers for identifier and operator characters are supplied by the
/// caller so a grammar can use whatever character classes it needs; the
/// remaining fields configure comments and the reserved vocabulary.
#[derive(Clone)]
pub struct LanguageDef<S, U> {
    /// Block comment opener; empty disables block comments.
    pub comment_start: String,
    /// Block comment closer.
    pub comment_end: String,
    /// Line comment prefix; empty disables line comments.
    pub comment_line: String,
    /// Whether block comments may nest.
    pub nested_comments: bool,
    /// First character of an identifier.
    pub ident_start: BoxedParser<S, U, char>,
    /// Subsequent characters of an identifier.
    pub ident_letter: BoxedParser<S, U, char>,
    /// First character of an operator.
    pub op_start: BoxedParser<S, U, char>,
    /// Subsequent characters of an operator.
    pub op_letter: BoxedParser<S, U, char>,
    /// Names the `identifier` parser must reject.
    pub reserved_names: Vec<String>,
    /// Operators the `operator` parser must reject.
    pub reserved_op_names: Vec<String>,
    /// Whether reserved-name matching distinguishes case.
    pub case_sensitive: bool,
}

const OPERATOR_CHARS: &str = ":!#$%&*+./<=>?@\\^|-~";

/// A C-flavoured baseline: `//` and non-nesting `/* */` comments, XID
/// identifiers (plus `_`), symbolic operators, nothing reserved.
impl<S, U> Default for LanguageDef<S, U>
where
    S: Stream<Token = char> + 'static,
    U: Clone + 'static,
{
    fn default() -> Self {
        Self {
            comment_start: "/*".to_string(),
            comment_end: "*/".to_string(),
            comment_line: "//".to_string(),
            nested_comments: false,
            ident_start: satisfy(|ch: char| is_xid_start(ch) || ch == '_'),
            ident_letter: satisfy(is_xid_continue),
            op_start: one_of(OPERATOR_CHARS),
            op_letter: one_of(OPERATOR_CHARS),
            reserved_names: Vec::new(),
            reserved_op_names: Vec::new(),
            case_sensitive: true,
        }
    }
}

/// A family of lexeme parsers generated from a [`LanguageDef`].
///
/// Every parser returned by these methods consumes its token and then the
/// whitespace (and comments) behind it, so grammars built on a `Lexer`
/// never mention whitespace. Parse the leading whitespace of a file once
/// with [`Lexer::white_space`] before the first token.
#[derive(Clone)]
pub struct Lexer<S, U> {
    def: LanguageDef<S, U>,
    // Sorted (and case-folded when insensitive) for binary search.
    reserved: Vec<String>,
    reserved_ops: Vec<String>,
}

impl<S, U> Lexer<S, U>
where
    S: Stream<Token = char> + 'static,
    U: Clone + 'static,
{
    pub fn new(def: LanguageDef<S, U>) -> Self {
        let mut reserved: Vec<String> = if def.case_sensitive {
            def.reserved_names.clone()
        } else {
            def.reserved_names
                .iter()
                .map(|name| name.to_lowercase())
                .collect()
        };
        reserved.sort_unstable();
        reserved.dedup();
        let mut reserved_ops = def.reserved_op_names.clone();
        reserved_ops.sort_unstable();
        reserved_ops.dedup();
        Self {
            def,
            reserved,
            reserved_ops,
        }
    }

    /// The language description this lexer was built from.
    pub fn def(&self) -> &LanguageDef<S, U> {
        &self.def
    }

    // === Whitespace ===

    /// Skip whitespace and comments, as configured by the language def.
    pub fn white_space(&self) -> BoxedParser<S, U, ()> {
        let mut layers: Vec<BoxedParser<S, U, ()>> =
            vec![skip_many1(satisfy(|ch: char| ch.is_whitespace()))];
        if !self.def.comment_line.is_empty() {
            layers.push(one_line_comment(self.def.comment_line.clone()));
        }
        if !self.def.comment_start.is_empty() {
            layers.push(multi_line_comment(
                self.def.comment_start.clone(),
                self.def.comment_end.clone(),
                self.def.nested_comments,
            ));
        }
        skip_many(choice(layers).hidden())
    }

    /// `parser` followed by whitespace; the unit every token parser is made of.
    pub fn lexeme<T: 'static>(&self, parser: BoxedParser<S, U, T>) -> BoxedParser<S, U, T> {
        parser.skip(self.white_space())
    }

    /// The literal string `s` as a lexeme.
    pub fn symbol(&self, s: &str) -> BoxedParser<S, U, String> {
        self.lexeme(string(s))
    }

    // === Identifiers and reserved words ===

    /// A legal, non-reserved identifier.
    pub fn identifier(&self) -> BoxedParser<S, U, String> {
        let name = self
            .def
            .ident_start
            .clone()
            .seq(many(self.def.ident_letter.clone()))
            .map(|(first, rest)| std::iter::once(first).chain(rest).collect::<String>())
            .label("identifier");
        let reserved = self.reserved.clone();
        let case_sensitive = self.def.case_sensitive;
        let checked = name.and_then(move |name: String| {
            let key = if case_sensitive {
                name.clone()
            } else {
                name.to_lowercase()
            };
            if reserved.binary_search(&key).is_ok() {
                unexpected(&format!("reserved word {:?}", name))
            } else {
                pure(name)
            }
        });
        self.lexeme(attempt(checked))
    }

    /// The reserved word `name`, not followed by an identifier character.
    pub fn reserved(&self, name: &str) -> BoxedParser<S, U, ()> {
        let word = case_string(name, self.def.case_sensitive);
        let guard =
            not_followed_by(self.def.ident_letter.clone()).label(&format!("end of {:?}", name));
        self.lexeme(attempt(word.skip(guard))).map(|_| ())
    }

    // === Operators ===

    /// A legal, non-reserved operator.
    pub fn operator(&self) -> BoxedParser<S, U, String> {
        let name = self
            .def
            .op_start
            .clone()
            .seq(many(self.def.op_letter.clone()))
            .map(|(first, rest)| std::iter::once(first).chain(rest).collect::<String>())
            .label("operator");
        let reserved_ops = self.reserved_ops.clone();
        let checked = name.and_then(move |name: String| {
            if reserved_ops.binary_search(&name).is_ok() {
                unexpected(&format!("reserved operator {:?}", name))
            } else {
                pure(name)
            }
        });
        self.lexeme(attempt(checked))
    }

    /// The reserved operator `name`, not followed by an operator character.
    pub fn reserved_op(&self, name: &str) -> BoxedParser<S, U, ()> {
        let guard =
            not_followed_by(self.def.op_letter.clone()).label(&format!("end of {:?}", name));
        self.lexeme(attempt(string(name).skip(guard))).map(|_| ())
    }

    // === Literals ===

    /// A single-quoted character literal with escape handling.
    pub fn char_literal(&self) -> BoxedParser<S, U, char> {
        self.lexeme(literal::char_literal()).label("character")
    }

    /// A double-quoted string literal with escapes and string gaps.
    pub fn string_literal(&self) -> BoxedParser<S, U, String> {
        self.lexeme(literal::string_literal()).label("literal string")
    }

    /// Raw decimal digits, no trailing whitespace skipped.
    pub fn decimal(&self) -> BoxedParser<S, U, u64> {
        literal::decimal()
    }

    /// Raw `0x`-prefixed hexadecimal number.
    pub fn hexadecimal(&self) -> BoxedParser<S, U, u64> {
        literal::hexadecimal()
    }

    /// Raw `0o`-prefixed octal number.
    pub fn octal(&self) -> BoxedParser<S, U, u64> {
        literal::octal()
    }

    /// An unsigned decimal integer lexeme.
    pub fn integer(&self) -> BoxedParser<S, U, u64> {
        self.lexeme(literal::decimal()).label("integer")
    }

    /// A decimal integer lexeme with an optional sign glued to the digits.
    pub fn signed_integer(&self) -> BoxedParser<S, U, i64> {
        self.lexeme(literal::signed_integer()).label("integer")
    }

    /// A floating-point lexeme; a fractional part or an exponent is required.
    pub fn float(&self) -> BoxedParser<S, U, f64> {
        self.lexeme(literal::float()).label("float")
    }

    /// A floating-point lexeme with an optional sign glued to the digits.
    pub fn signed_float(&self) -> BoxedParser<S, U, f64> {
        self.lexeme(literal::signed_float()).label("float")
    }

    /// A float or integer lexeme; "12" is an integer, "12.5" a float.
    pub fn number(&self) -> BoxedParser<S, U, Number> {
        self.lexeme(literal::number()).label("number")
    }

    /// A [`Lexer::number`] with an optional sign glued to the digits.
    pub fn signed_number(&self) -> BoxedParser<S, U, Number> {
        self.lexeme(literal::signed_number()).label("number")
    }

    // === Brackets and separators ===

    /// `parser` between `(` and `)` lexemes.
    pub fn parens<T: 'static>(&self, parser: BoxedParser<S, U, T>) -> BoxedParser<S, U, T> {
        between(self.symbol("("), self.symbol(")"), parser)
    }

    /// `parser` between `{` and `}` lexemes.
    pub fn braces<T: 'static>(&self, parser: BoxedParser<S, U, T>) -> BoxedParser<S, U, T> {
        between(self.symbol("{"), self.symbol("}"), parser)
    }

    /// `parser` between `<` and `>` lexemes.
    pub fn angles<T: 'static>(&self, parser: BoxedParser<S, U, T>) -> BoxedParser<S, U, T> {
        between(self.symbol("<"), self.symbol(">"), parser)
    }

    /// `parser` between `[` and `]` lexemes.
    pub fn brackets<T: 'static>(&self, parser: BoxedParser<S, U, T>) -> BoxedParser<S, U, T> {
        between(self.symbol("["), self.symbol("]"), parser)
    }

    pub fn semicolon(&self) -> BoxedParser<S, U, String> {
        self.symbol(";")
    }

    pub fn comma(&self) -> BoxedParser<S, U, String> {
        self.symbol(",")
    }

    pub fn colon(&self) -> BoxedParser<S, U, String> {
        self.symbol(":")
    }

    pub fn dot(&self) -> BoxedParser<S, U, String> {
        self.symbol(".")
    }

    /// Zero or more `parser` separated by commas.
    pub fn comma_sep<T: 'static>(&self, parser: BoxedParser<S, U, T>) -> BoxedParser<S, U, Vec<T>> {
        sep_by(parser, self.comma())
    }

    /// One or more `parser` separated by commas.
    pub fn comma_sep1<T: 'static>(
        &self,
        parser: BoxedParser<S, U, T>,
    ) -> BoxedParser<S, U, Vec<T>> {
        sep_by1(parser, self.comma())
    }

    /// Zero or more `parser` separated by semicolons.
    pub fn semicolon_sep<T: 'static>(
        &self,
        parser: BoxedParser<S, U, T>,
    ) -> BoxedParser<S, U, Vec<T>> {
        sep_by(parser, self.semicolon())
    }

    /// One or more `parser` separated by semicolons.
    pub fn semicolon_sep1<T: 'static>(
        &self,
        parser: BoxedParser<S, U, T>,
    ) -> BoxedParser<S, U, Vec<T>> {
        sep_by1(parser, self.semicolon())
    }
}

// === Comment scanning ===

fn one_line_comment<S, U>(prefix: String) -> BoxedParser<S, U, ()>
where
    S: Stream<Token = char> + 'static,
    U: Clone + 'static,
{
    attempt(string(prefix)).skip_left(skip_many(satisfy(|ch: char| ch != '\n')))
}

fn multi_line_comment<S, U>(start: String, end: String, nested: bool) -> BoxedParser<S, U, ()>
where
    S: Stream<Token = char> + 'static,
    U: Clone + 'static,
{
    attempt(string(start.clone())).skip_left(block_comment_body(start, end, nested))
}

/// Scan the body of a block comment whose opener was already consumed.
fn block_comment_body<S, U>(start: String, end: String, nested: bool) -> BoxedParser<S, U, ()>
where
    S: Stream<Token = char> + 'static,
    U: Clone + 'static,
{
    BoxedParser::new(move |state: &mut ParseState<S, U>| {
        let mut depth = 1u32;
        loop {
            if eat_marker(state, &end) {
                depth -= 1;
                if depth == 0 {
                    return Ok(());
                }
                continue;
            }
            if nested && eat_marker(state, &start) {
                depth += 1;
                continue;
            }
            match state.input().uncons() {
                Some((ch, rest)) => {
                    let next = state.position().advanced(ch, state.tab_width());
                    state.commit(rest, next);
                }
                None => {
                    return Err(state
                        .unexpected_here("end of input")
                        .add(Message::Expected("end of comment".to_string())));
                }
            }
        }
    })
}

/// Consume `marker` if it is next in the input; otherwise consume nothing.
fn eat_marker<S, U>(state: &mut ParseState<S, U>, marker: &str) -> bool
where
    S: Stream<Token = char>,
    U: Clone,
{
    let cp = state.checkpoint();
    for want in marker.chars() {
        match state.input().uncons() {
            Some((ch, rest)) if ch == want => {
                let next = state.position().advanced(ch, state.tab_width());
                state.commit(rest, next);
            }
            _ => {
                state.restore(cp);
                return false;
            }
        }
    }
    true
}

// === Case-insensitive matching ===

/// Match `name` exactly, or per-character in either case when the language
/// is case-insensitive. Returns `name` as written in the definition.
fn case_string<S, U>(name: &str, case_sensitive: bool) -> BoxedParser<S, U, String>
where
    S: Stream<Token = char> + 'static,
    U: Clone + 'static,
{
    if case_sensitive {
        return string(name);
    }
    let want: Vec<char> = name.chars().collect();
    let name = name.to_string();
    let label = format!("{:?}", name);
    BoxedParser::new(move |state: &mut ParseState<S, U>| {
        let start = state.position().clone();
        for want_ch in &want {
            match state.input().uncons() {
                Some((ch, rest)) if either_case(ch, *want_ch) => {
                    let next = state.position().advanced(ch, state.tab_width());
                    state.commit(rest, next);
                }
                found => {
                    let what = match found {
                        Some((ch, _)) => format!("{:?}", ch),
                        None => "end of input".to_string(),
                    };
                    return Err(ParseError::new(start.clone(), Message::Unexpected(what))
                        .add(Message::Expected(label.clone())));
                }
            }
        }
        Ok(name.clone())
    })
}

fn either_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}
