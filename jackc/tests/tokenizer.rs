use jackc::{tokenize, Error, Keyword, TokenKind};

fn case(source: &str, expects: &[TokenKind]) {
    let mut toks = tokenize(source).unwrap();
    let mut kinds = Vec::new();
    while toks.has_more() {
        kinds.push(toks.current().unwrap().kind.clone());
        toks.advance().unwrap();
    }
    assert_eq!(kinds.len(), expects.len(), "token count for {source:?}");
    for (idx, expect) in expects.iter().enumerate() {
        assert_eq!(kinds[idx], *expect, "token {idx} of {source:?}");
    }
}

#[test]
fn statements_split_into_typed_tokens() {
    use TokenKind::*;
    case(
        "let x = x + 1;",
        &[
            Keyword(jackc::Keyword::Let),
            Ident("x".to_string()),
            Symbol('='),
            Ident("x".to_string()),
            Symbol('+'),
            IntConst(1),
            Symbol(';'),
        ],
    );
}

#[test]
fn comments_vanish_but_strings_survive() {
    use TokenKind::*;
    case(
        "do /* inline */ print(\"a // b /* c\"); // trailing\n/** doc */ return;",
        &[
            Keyword(jackc::Keyword::Do),
            Ident("print".to_string()),
            Symbol('('),
            StringConst("a // b /* c".to_string()),
            Symbol(')'),
            Symbol(';'),
            Keyword(jackc::Keyword::Return),
            Symbol(';'),
        ],
    );
}

#[test]
fn block_comments_span_lines() {
    use TokenKind::*;
    case(
        "var /* one\ntwo\nthree */ int i;",
        &[
            Keyword(jackc::Keyword::Var),
            Keyword(jackc::Keyword::Int),
            Ident("i".to_string()),
            Symbol(';'),
        ],
    );
}

#[test]
fn escaped_quotes_become_literal_quotes() {
    use TokenKind::*;
    case(
        r#""say \"hi\" now""#,
        &[StringConst("say \"hi\" now".to_string())],
    );
}

#[test]
fn keywords_beat_identifiers_only_on_exact_match() {
    use TokenKind::*;
    case(
        "class classes _class let lettuce",
        &[
            Keyword(jackc::Keyword::Class),
            Ident("classes".to_string()),
            Ident("_class".to_string()),
            Keyword(jackc::Keyword::Let),
            Ident("lettuce".to_string()),
        ],
    );
}

#[test]
fn integer_bounds_are_enforced() {
    use TokenKind::*;
    case("0 32767", &[IntConst(0), IntConst(32767)]);
    assert!(matches!(
        tokenize("32768"),
        Err(Error::IntegerRange { .. })
    ));
}

#[test]
fn unterminated_string_is_a_lexical_error() {
    assert!(matches!(
        tokenize("let s = \"dangling"),
        Err(Error::UnterminatedString(1))
    ));
}

#[test]
fn unclassifiable_characters_are_rejected() {
    assert!(matches!(
        tokenize("let $x = 1;"),
        Err(Error::UnexpectedChar { ch: '$', .. })
    ));
}

#[test]
fn advance_then_retreat_restores_the_current_token() {
    let mut toks = tokenize("if (x) { return; }").unwrap();
    // Round-trip at every position.
    while toks.has_more() {
        let before = toks.current().unwrap().clone();
        toks.advance().unwrap();
        toks.retreat().unwrap();
        assert_eq!(*toks.current().unwrap(), before);
        toks.advance().unwrap();
    }
}

#[test]
fn cursor_stops_at_both_ends() {
    let mut toks = tokenize("return;").unwrap();
    assert!(matches!(toks.retreat(), Err(Error::RetreatAtStart)));
    toks.advance().unwrap();
    toks.advance().unwrap();
    assert!(!toks.has_more());
    assert!(matches!(toks.advance(), Err(Error::UnexpectedEof)));
    assert!(matches!(toks.current(), Err(Error::UnexpectedEof)));
}

#[test]
fn accessors_enforce_the_current_kind() {
    let toks = tokenize("while").unwrap();
    assert_eq!(toks.keyword().unwrap(), Keyword::While);
    assert!(matches!(toks.symbol(), Err(Error::TokenMismatch(_))));
    assert!(matches!(toks.int_val(), Err(Error::TokenMismatch(_))));
    assert!(matches!(toks.identifier(), Err(Error::TokenMismatch(_))));
    assert!(matches!(toks.string_val(), Err(Error::TokenMismatch(_))));
}

#[test]
fn tokens_carry_their_source_line() {
    let mut toks = tokenize("class Main {\n  field int x;\n}\n").unwrap();
    assert_eq!(toks.current().unwrap().line, 1);
    for _ in 0..3 {
        toks.advance().unwrap();
    }
    // `field` sits on line 2.
    assert_eq!(toks.keyword().unwrap(), Keyword::Field);
    assert_eq!(toks.current().unwrap().line, 2);
}
