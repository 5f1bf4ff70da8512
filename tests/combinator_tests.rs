use rarsec::char::{any_char, char, digit, string};
use rarsec::parser::{
    attempt, between, choice, count, eof, fail, get_input, get_position, get_state, lazy,
    look_ahead, many, many1, many_till, modify_state, not_followed_by, option, optional, pure,
    put_state, run, sep_by, sep_by1, sep_end_by, skip_many1, BoxedParser,
};

type P<T> = BoxedParser<&'static str, (), T>;

fn run_str<T>(parser: &P<T>, input: &'static str) -> Result<T, rarsec::ParseError> {
    run(parser, "test", (), input)
}

#[test]
fn pure_succeeds_without_consuming() {
    let p: P<(i32, &'static str)> = pure(42).seq(get_input());
    assert_eq!(run_str(&p, "abc"), Ok((42, "abc")));
}

#[test]
fn fail_reports_its_message() {
    let p: P<()> = fail("custom failure");
    let err = run_str(&p, "abc").unwrap_err();
    assert!(err.to_string().contains("custom failure"));
}

#[test]
fn sequencing_threads_the_input() {
    let p: P<(char, char)> = digit().seq(any_char());
    assert_eq!(run_str(&p, "1x"), Ok(('1', 'x')));
}

#[test]
fn and_then_feeds_the_first_result_forward() {
    // A digit deciding how many characters to read.
    let p: P<Vec<char>> = digit().and_then(|d| count(d.to_digit(10).unwrap() as usize, any_char()));
    assert_eq!(run_str(&p, "3abcd"), Ok(vec!['a', 'b', 'c']));
    assert!(run_str(&p, "3ab").is_err());
}

#[test]
fn operators_mirror_the_methods() {
    let seq: P<(char, char)> = char('a') + char('b');
    assert_eq!(run_str(&seq, "ab"), Ok(('a', 'b')));

    let keep_left: P<char> = char('a') - char('b');
    assert_eq!(run_str(&keep_left, "ab"), Ok('a'));

    let keep_right: P<char> = char('a') * char('b');
    assert_eq!(run_str(&keep_right, "ab"), Ok('b'));

    let alt: P<char> = char('a') | char('b');
    assert_eq!(run_str(&alt, "b"), Ok('b'));

    let mapped: P<bool> = digit() >> (|d: char| d == '7');
    assert_eq!(run_str(&mapped, "7"), Ok(true));
}

// === Choice and commitment ===

#[test]
fn alternation_takes_the_second_branch_on_empty_failure() {
    let p: P<String> = string("foo") | string("bar");
    assert_eq!(run_str(&p, "bar"), Ok("bar".to_string()));
}

#[test]
fn matching_a_prefix_commits_to_that_branch() {
    // "let" matches and wins even though "letrec" is longer.
    let p: P<(String, &'static str)> = (string("let") | string("letrec")).seq(get_input());
    assert_eq!(run_str(&p, "letrec"), Ok(("let".to_string(), "rec")));
}

#[test]
fn consumed_failure_skips_the_remaining_branches() {
    // "ab" consumes 'a' before failing, so "ac" is never tried.
    let p: P<String> = string("ab") | string("ac");
    assert!(run_str(&p, "ac").is_err());
}

#[test]
fn attempt_restores_the_input_for_the_next_branch() {
    let p: P<String> = attempt(string("ab")) | string("ac");
    assert_eq!(run_str(&p, "ac"), Ok("ac".to_string()));
}

#[test]
fn attempt_ordering_picks_the_first_match() {
    let p: P<(String, &'static str)> =
        (attempt(string("let")) | string("letrec")).seq(get_input());
    assert_eq!(run_str(&p, "letrec"), Ok(("let".to_string(), "rec")));

    let p: P<(String, &'static str)> =
        (attempt(string("letrec")) | string("let")).seq(get_input());
    assert_eq!(run_str(&p, "letrec"), Ok(("letrec".to_string(), "")));
}

#[test]
fn attempt_is_idempotent() {
    let once: P<String> = attempt(string("ab"));
    let twice: P<String> = attempt(attempt(string("ab")));
    assert_eq!(run_str(&once, "ax"), run_str(&twice, "ax"));
    assert_eq!(run_str(&once, "ab"), run_str(&twice, "ab"));
}

#[test]
fn choice_tries_branches_in_order() {
    let p: P<String> = choice(vec![string("one"), string("two"), string("three")]);
    assert_eq!(run_str(&p, "two"), Ok("two".to_string()));
    assert_eq!(run_str(&p, "three"), Ok("three".to_string()));
}

#[test]
fn empty_failure_laws_hold_for_alternation() {
    let left: P<char> = fail("boom") | digit();
    assert_eq!(run_str(&left, "5"), Ok('5'));

    let right: P<char> = digit() | fail("boom");
    assert_eq!(run_str(&right, "5"), Ok('5'));
}

#[test]
fn alternation_is_associative() {
    let left: P<char> = (char('a') | char('b')) | char('c');
    let right: P<char> = char('a') | (char('b') | char('c'));
    for input in ["a", "b", "c", "d"] {
        // Compare rendered errors: the rendering is canonical (sorted),
        // the in-memory message order is not.
        assert_eq!(
            run(&left, "test", (), input).map_err(|e| e.to_string()),
            run(&right, "test", (), input).map_err(|e| e.to_string())
        );
    }
}

// === Monad laws, spot-checked ===

#[test]
fn bind_left_identity() {
    let bound: P<i32> = pure(5).and_then(|n: i32| pure(n * 2));
    let direct: P<i32> = pure(10);
    assert_eq!(run_str(&bound, ""), run_str(&direct, ""));
}

#[test]
fn bind_right_identity() {
    let bound: P<char> = digit().and_then(|d| pure(d));
    let direct: P<char> = digit();
    assert_eq!(run_str(&bound, "7"), run_str(&direct, "7"));
    assert_eq!(run_str(&bound, "x"), run_str(&direct, "x"));
}

#[test]
fn bind_is_associative() {
    let f = |a: char| any_char().map(move |b| (a, b));
    let g = |(a, b): (char, char)| any_char().map(move |c| (a, b, c));
    let left: P<(char, char, char)> = digit().and_then(f).and_then(g);
    let right: P<(char, char, char)> = digit().and_then(move |a| f(a).and_then(g));
    for input in ["1bc", "1b", "x"] {
        assert_eq!(
            run(&left, "test", (), input),
            run(&right, "test", (), input)
        );
    }
}

// === Lookahead ===

#[test]
fn look_ahead_rewinds_on_success() {
    let p: P<(String, &'static str)> = look_ahead(string("ab")).seq(get_input());
    assert_eq!(run_str(&p, "abc"), Ok(("ab".to_string(), "abc")));
}

#[test]
fn look_ahead_passes_failures_through() {
    let p: P<String> = look_ahead(string("ab"));
    assert!(run_str(&p, "ax").is_err());
}

#[test]
fn not_followed_by_succeeds_when_the_parser_fails() {
    let p: P<char> = char('a').skip(not_followed_by(char('b')));
    assert_eq!(run_str(&p, "ac"), Ok('a'));
    assert!(run_str(&p, "ab").is_err());
}

#[test]
fn eof_accepts_only_the_end() {
    let p: P<()> = eof();
    assert_eq!(run_str(&p, ""), Ok(()));
    let err = run_str(&p, "x").unwrap_err();
    assert!(err.to_string().contains("end of input"));
}

// === Repetition ===

#[test]
fn many_collects_until_the_first_miss() {
    let p: P<Vec<char>> = many(digit());
    assert_eq!(run_str(&p, "123abc"), Ok(vec!['1', '2', '3']));
    assert_eq!(run_str(&p, "abc"), Ok(vec![]));
}

#[test]
fn many_stops_at_column_four_of_123abc() {
    let p: P<rarsec::SourcePos> = many(digit()).skip_left(get_position());
    let pos = run_str(&p, "123abc").unwrap();
    assert_eq!((pos.line, pos.column), (1, 4));
}

#[test]
fn many1_requires_at_least_one() {
    let p: P<Vec<char>> = many1(digit());
    assert_eq!(run_str(&p, "42x"), Ok(vec!['4', '2']));
    assert!(run_str(&p, "x").is_err());
}

#[test]
#[should_panic(expected = "accepts an empty string")]
fn many_rejects_empty_succeeding_parsers() {
    let p: P<Vec<i32>> = many(pure(1));
    let _ = run_str(&p, "abc");
}

#[test]
fn skip_many1_discards_results() {
    let p: P<((), &'static str)> = skip_many1(char('a')).seq(get_input());
    assert_eq!(run_str(&p, "aaab"), Ok(((), "b")));
    assert!(run_str(&p, "b").is_err());
}

#[test]
fn count_parses_exactly_n() {
    let p: P<Vec<char>> = count(3, digit());
    assert_eq!(run_str(&p, "1234"), Ok(vec!['1', '2', '3']));
    assert!(run_str(&p, "12").is_err());
}

#[test]
fn many_till_reads_until_the_terminator() {
    let p: P<Vec<char>> = many_till(any_char(), char(']'));
    assert_eq!(run_str(&p, "ab]"), Ok(vec!['a', 'b']));
    assert!(run_str(&p, "ab").is_err());
}

// === Optional values and separators ===

#[test]
fn option_falls_back_to_the_default() {
    let p: P<char> = option('z', digit());
    assert_eq!(run_str(&p, "5"), Ok('5'));
    assert_eq!(run_str(&p, "x"), Ok('z'));
}

#[test]
fn optional_discards_either_way() {
    let p: P<((), &'static str)> = optional(char('a')).seq(get_input());
    assert_eq!(run_str(&p, "ab"), Ok(((), "b")));
    assert_eq!(run_str(&p, "b"), Ok(((), "b")));
}

#[test]
fn between_keeps_the_inner_value() {
    let p: P<Vec<char>> = between(char('('), char(')'), many(digit()));
    assert_eq!(run_str(&p, "(12)"), Ok(vec!['1', '2']));
    assert!(run_str(&p, "(12").is_err());
}

#[test]
fn sep_by_handles_zero_and_more() {
    let p: P<Vec<char>> = sep_by(digit(), char(','));
    assert_eq!(run_str(&p, "1,2,3"), Ok(vec!['1', '2', '3']));
    assert_eq!(run_str(&p, "7"), Ok(vec!['7']));
    assert_eq!(run_str(&p, ""), Ok(vec![]));
}

#[test]
fn sep_by_commits_after_a_separator() {
    let p: P<Vec<char>> = sep_by(digit(), char(','));
    assert!(run_str(&p, "1,2,").is_err());
}

#[test]
fn sep_by1_requires_one_element() {
    let p: P<Vec<char>> = sep_by1(digit(), char(','));
    assert_eq!(run_str(&p, "1,2"), Ok(vec!['1', '2']));
    assert!(run_str(&p, "").is_err());
}

#[test]
fn sep_end_by_allows_a_trailing_separator() {
    let p: P<(Vec<char>, &'static str)> = sep_end_by(digit(), char(';')).seq(get_input());
    assert_eq!(run_str(&p, "1;2;"), Ok((vec!['1', '2'], "")));
    assert_eq!(run_str(&p, "1;2"), Ok((vec!['1', '2'], "")));
    assert_eq!(run_str(&p, "x"), Ok((vec![], "x")));
}

// === Recursion ===

#[test]
fn lazy_supports_recursive_grammars() {
    // nested := '(' nested ')' | digit
    fn nested() -> P<char> {
        between(char('('), char(')'), lazy(nested)) | digit()
    }
    assert_eq!(run_str(&nested(), "5"), Ok('5'));
    assert_eq!(run_str(&nested(), "((7))"), Ok('7'));
    assert!(run_str(&nested(), "((7)").is_err());
}

// === State threading ===

#[test]
fn user_state_counts_matches() {
    let counted: BoxedParser<&'static str, i32, Vec<char>> =
        many(char('a').skip(modify_state(|n: &mut i32| *n += 1)));
    let p = counted.skip_left(get_state());
    assert_eq!(run(&p, "test", 0, "aaab"), Ok(3));
}

#[test]
fn put_state_replaces_the_user_state() {
    let p: BoxedParser<&'static str, i32, i32> = put_state(7).skip_left(get_state());
    assert_eq!(run(&p, "test", 0, ""), Ok(7));
}

#[test]
fn backtracking_restores_the_user_state() {
    // The first branch bumps the state and then fails without consuming.
    let bump_then_fail: BoxedParser<&'static str, i32, ()> =
        modify_state(|n: &mut i32| *n += 10).skip_left(fail("nope"));
    let p = (bump_then_fail | pure(())).skip_left(get_state());
    assert_eq!(run(&p, "test", 1, ""), Ok(1));
}

#[test]
fn get_position_tracks_lines_and_columns() {
    let p: P<rarsec::SourcePos> = many(any_char()).skip_left(get_position());
    let pos = run_str(&p, "ab\nc").unwrap();
    assert_eq!((pos.line, pos.column), (2, 2));
}
