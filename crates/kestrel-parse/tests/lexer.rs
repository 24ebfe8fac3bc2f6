use kestrel_ast::lexeme::{Lexeme, ParenKind};
use kestrel_parse::{tokenize, LexError};

fn texts(src: &str) -> Vec<String> {
    tokenize(src, "<mem>")
        .expect("lex ok")
        .iter()
        .map(|l| l.text().to_string())
        .collect()
}

/// Concatenating lexeme texts with the skipped whitespace restores the source.
#[test]
fn lexemes_round_trip_through_spans() {
    let src = "let xs = [1, 2.5, \"a\\n\"];\nwhile i <= 10 { i = i + 1; }";
    let lexemes = tokenize(src, "<mem>").unwrap();

    let mut rebuilt = String::new();
    let mut pos = 0;
    for lexeme in &lexemes {
        let span = lexeme.span();
        assert!(src[pos..span.start].chars().all(char::is_whitespace));
        rebuilt.push_str(&src[pos..span.start]);
        assert_eq!(span.slice(src), lexeme.text());
        rebuilt.push_str(lexeme.text());
        pos = span.end;
    }
    rebuilt.push_str(&src[pos..]);
    assert_eq!(rebuilt, src);
}

#[test]
fn longest_punctuation_wins() {
    assert_eq!(texts("a==b"), ["a", "==", "b"]);
    assert_eq!(texts("a!=b"), ["a", "!=", "b"]);
    assert_eq!(texts("a<=b>=c"), ["a", "<=", "b", ">=", "c"]);
    assert_eq!(texts("x ~= y && z || w"), ["x", "~=", "y", "&&", "z", "||", "w"]);
    assert_eq!(texts("!a = -b"), ["!", "a", "=", "-", "b"]);
}

#[test]
fn words_and_numbers() {
    assert_eq!(texts("_foo1 bar_2"), ["_foo1", "bar_2"]);
    assert_eq!(texts("12 3.25 7."), ["12", "3.25", "7", "."]);
    assert_eq!(texts("3.to_s()"), ["3", ".", "to_s", "(", ")"]);

    let lexemes = tokenize("3.25", "<mem>").unwrap();
    let Lexeme::Number(n) = &lexemes[0] else {
        panic!("expected number");
    };
    assert_eq!(n.value(), 3.25);
}

#[test]
fn brackets_know_their_kind() {
    let lexemes = tokenize("( ] {", "<mem>").unwrap();
    let kinds: Vec<_> = lexemes
        .iter()
        .map(|l| match l {
            Lexeme::Paren(p) => (p.kind, p.opening),
            other => panic!("unexpected {other:?}"),
        })
        .collect();
    assert_eq!(
        kinds,
        [
            (ParenKind::Round, true),
            (ParenKind::Square, false),
            (ParenKind::Curly, true)
        ]
    );
}

#[test]
fn string_escapes_are_decoded() {
    let lexemes = tokenize(r#""a\tb\n\"q\" \\""#, "<mem>").unwrap();
    let Lexeme::Str(s) = &lexemes[0] else {
        panic!("expected string");
    };
    assert_eq!(s.value, "a\tb\n\"q\" \\");
    assert_eq!(s.text, r#""a\tb\n\"q\" \\""#);
}

#[test]
fn unknown_character_reports_offset() {
    let err = tokenize("a @ b", "<mem>").unwrap_err();
    assert!(matches!(err, LexError::UnknownCharacter { ch: '@', .. }));
    assert_eq!(err.offset(), 2);
}

#[test]
fn unknown_escape_is_error() {
    let err = tokenize(r#"x = "a\qb";"#, "<mem>").unwrap_err();
    assert!(matches!(err, LexError::UnknownEscape { escape: 'q', .. }));
    assert_eq!(err.offset(), 6);
    assert!(err.to_string().contains("\\q"));
}

#[test]
fn unterminated_string_is_error() {
    let err = tokenize("print(\"abc", "<mem>").unwrap_err();
    assert!(matches!(err, LexError::UnterminatedString { .. }));
    assert_eq!(err.offset(), 6);

    let err = tokenize("\"ends in escape\\", "<mem>").unwrap_err();
    assert!(matches!(err, LexError::UnterminatedString { .. }));
}

#[test]
fn spans_carry_file_name() {
    let lexemes = tokenize("a", "main.ks").unwrap();
    assert_eq!(&*lexemes[0].span().file, "main.ks");
}
