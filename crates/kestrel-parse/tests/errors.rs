use kestrel_parse::{parse_str, FrontendError, ParserError};

fn parse_error(src: &str) -> ParserError {
    match parse_str("<mem>", src) {
        Err(FrontendError::Parse(e)) => e,
        Err(other) => panic!("expected parser error, got {other}"),
        Ok(_) => panic!("expected {src:?} to fail"),
    }
}

#[test]
fn missing_semicolon_after_let() {
    let err = parse_error("let a = 1");
    assert!(err.critical);
    assert!(err.is_eoi());
    assert_eq!(err.to_string(), "expected `;` but got end of input");
}

#[test]
fn junk_after_tail_expression() {
    let err = parse_error("1 2");
    assert!(err.critical);
    assert_eq!(err.expected, "; or }");
    assert_eq!(err.got, "`2`");
    assert_eq!(err.span.start, 2);
    // the failed statement attempt is kept as the cause
    assert!(err.cause.is_some());
}

#[test]
fn end_of_input_inside_block_points_at_closer() {
    let err = parse_error("{ 1 + }");
    assert!(err.is_eoi());
    assert_eq!(err.span.start, 6);
}

#[test]
fn let_requires_plain_name() {
    let err = parse_error("let a.b = 1;");
    assert!(err.critical);
    assert_eq!(err.expected, "variable name");
}

#[test]
fn call_is_not_assignable() {
    let err = parse_error("f() = 1;");
    assert!(err.critical);
    assert_eq!(err.expected, "assignable expression");
    assert_eq!((err.span.start, err.span.end), (0, 3));
}

#[test]
fn missing_expression_after_operator() {
    let err = parse_error("x = 1 + ;");
    assert!(err.critical);
    assert_eq!(err.expected, "expression");
    assert_eq!(err.got, "`;`");
}

#[test]
fn dot_requires_name() {
    let err = parse_error("a.1");
    assert_eq!(err.expected, "identifier");
}

#[test]
fn if_requires_block() {
    let err = parse_error("if x 1");
    assert!(err.critical);
    assert_eq!(err.expected, "`{`");
}

#[test]
fn for_requires_in() {
    let err = parse_error("for x of xs { }");
    assert_eq!(err.expected, "`in`");
    assert_eq!(err.got, "`of`");
}

#[test]
fn list_items_need_commas() {
    let err = parse_error("f(1 2)");
    assert!(err.critical);
    assert_eq!(err.expected, "`,`");
}

#[test]
fn paren_holds_one_expression() {
    let err = parse_error("(1 2)");
    assert_eq!(err.expected, ")");
}

#[test]
fn lex_errors_pass_through() {
    let err = parse_str("<mem>", "x = #;").unwrap_err();
    assert!(matches!(err, FrontendError::Lex(_)));
    assert_eq!(err.span().start, 4);
}

#[test]
fn compound_assignment_is_reserved() {
    let err = parse_error("let x = 1; x += 2;");
    assert!(err.critical);
    assert_eq!(err.got, "`+=`");
    assert_eq!(err.expected, "`=` (`+=` is reserved)");
    assert_eq!(err.span.start, 13);

    let err = parse_error("o.count ~= \"!\";");
    assert_eq!(err.expected, "`=` (`~=` is reserved)");

    let err = parse_error("let y -= 1;");
    assert!(err.critical);
    assert_eq!(err.got, "`-=`");
}

#[test]
fn operator_expression_is_not_assignable() {
    let err = parse_error("a + b = 1;");
    assert!(err.critical);
    assert_eq!(err.expected, "assignable expression");
    assert_eq!((err.span.start, err.span.end), (0, 5));
}

#[test]
fn let_without_value() {
    let err = parse_error("let a;");
    assert!(err.critical);
    assert_eq!(err.expected, "`=`");
    assert_eq!(err.got, "`;`");
}
