use rarsec::char::{
    alpha_num, any_char, char, crlf, digit, eol, hex_digit, letter, lower, newline, none_of,
    oct_digit, one_of, satisfy, space, spaces, string, tab, upper,
};
use rarsec::parser::{eof, get_input, many, run, BoxedParser};

type P<T> = BoxedParser<&'static str, (), T>;

fn run_str<T>(parser: &P<T>, input: &'static str) -> Result<T, rarsec::ParseError> {
    run(parser, "test", (), input)
}

#[test]
fn satisfy_checks_the_predicate() {
    let p: P<char> = satisfy(|ch| ch == 'q');
    assert_eq!(run_str(&p, "q"), Ok('q'));
    assert!(run_str(&p, "r").is_err());
}

#[test]
fn char_matches_exactly_one() {
    let p: P<char> = char('x');
    assert_eq!(run_str(&p, "xy"), Ok('x'));
    assert!(run_str(&p, "yx").is_err());
}

#[test]
fn any_char_takes_whatever_is_next() {
    let p: P<char> = any_char();
    assert_eq!(run_str(&p, "ß"), Ok('ß'));
    let err = run_str(&p, "").unwrap_err();
    assert!(err.to_string().contains("end of input"));
}

#[test]
fn one_of_and_none_of_are_set_membership() {
    let yes: P<char> = one_of("abc");
    assert_eq!(run_str(&yes, "b"), Ok('b'));
    assert!(run_str(&yes, "d").is_err());

    let no: P<char> = none_of("abc");
    assert_eq!(run_str(&no, "d"), Ok('d'));
    assert!(run_str(&no, "b").is_err());
}

#[test]
fn string_matches_the_whole_sequence() {
    let p: P<(String, &'static str)> = string("hello").seq(get_input());
    assert_eq!(run_str(&p, "hello!"), Ok(("hello".to_string(), "!")));
}

#[test]
fn empty_string_matches_nothing() {
    let p: P<(String, &'static str)> = string("").seq(get_input());
    assert_eq!(run_str(&p, "abc"), Ok(("".to_string(), "abc")));
}

#[test]
fn string_reports_errors_at_its_start() {
    let p: P<String> = string("hello");
    let err = run_str(&p, "help!").unwrap_err();
    assert_eq!((err.position().line, err.position().column), (1, 1));
    assert!(err.to_string().contains("\"hello\""));
}

#[test]
fn digit_classes_cover_their_ranges() {
    assert_eq!(run_str(&digit(), "7"), Ok('7'));
    assert!(run_str(&digit(), "a").is_err());

    assert_eq!(run_str(&hex_digit(), "f"), Ok('f'));
    assert_eq!(run_str(&hex_digit(), "E"), Ok('E'));
    assert!(run_str(&hex_digit(), "g").is_err());

    assert_eq!(run_str(&oct_digit(), "7"), Ok('7'));
    assert!(run_str(&oct_digit(), "8").is_err());
}

#[test]
fn letter_classes_are_unicode_aware() {
    assert_eq!(run_str(&letter(), "å"), Ok('å'));
    assert!(run_str(&letter(), "1").is_err());

    assert_eq!(run_str(&alpha_num(), "1"), Ok('1'));
    assert_eq!(run_str(&alpha_num(), "x"), Ok('x'));
    assert!(run_str(&alpha_num(), "!").is_err());

    assert_eq!(run_str(&upper(), "X"), Ok('X'));
    assert!(run_str(&upper(), "x").is_err());
    assert_eq!(run_str(&lower(), "x"), Ok('x'));
    assert!(run_str(&lower(), "X").is_err());
}

#[test]
fn whitespace_parsers() {
    assert_eq!(run_str(&space(), " "), Ok(' '));
    assert_eq!(run_str(&space(), "\u{a0}"), Ok('\u{a0}'));
    assert_eq!(run_str(&tab(), "\t"), Ok('\t'));

    let p: P<((), &'static str)> = spaces().seq(get_input());
    assert_eq!(run_str(&p, "  \t\n x"), Ok(((), "x")));
    assert_eq!(run_str(&p, "x"), Ok(((), "x")));
}

#[test]
fn newline_variants() {
    assert_eq!(run_str(&newline(), "\n"), Ok('\n'));
    assert_eq!(run_str(&crlf(), "\r\n"), Ok('\n'));
    assert_eq!(run_str(&eol(), "\n"), Ok('\n'));
    assert_eq!(run_str(&eol(), "\r\n"), Ok('\n'));
    // A lone carriage return commits and fails.
    assert!(run_str(&eol(), "\rx").is_err());

    let err = run_str(&eol(), "x").unwrap_err();
    assert_eq!(
        err.to_string(),
        "test:1:1:\nunexpected 'x'\nexpecting new-line"
    );
}

#[test]
fn classes_report_their_names() {
    let err = run_str(&digit(), "x").unwrap_err();
    assert_eq!(err.to_string(), "test:1:1:\nunexpected 'x'\nexpecting digit");
}

#[test]
fn many_letters_then_eof() {
    let p: P<Vec<char>> = many(letter()).skip(eof());
    assert_eq!(run_str(&p, "abc"), Ok(vec!['a', 'b', 'c']));
    assert!(run_str(&p, "ab1").is_err());
}
