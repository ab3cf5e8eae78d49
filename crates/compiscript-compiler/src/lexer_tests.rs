use super::lexer::{TokenKind, lex, token_text};

fn kinds(source: &str) -> Vec<TokenKind> {
    lex(source).into_iter().map(|t| t.kind).collect()
}

#[test]
fn keywords_beat_identifiers() {
    assert_eq!(
        kinds("let lettuce"),
        vec![TokenKind::Let, TokenKind::Identifier, TokenKind::Eof]
    );
}

#[test]
fn operators() {
    assert_eq!(
        kinds("== = <= < != !"),
        vec![
            TokenKind::EqEq,
            TokenKind::Assign,
            TokenKind::Le,
            TokenKind::Lt,
            TokenKind::NotEq,
            TokenKind::Bang,
            TokenKind::Eof
        ]
    );
}

#[test]
fn float_wins_over_int() {
    assert_eq!(
        kinds("3.14 42"),
        vec![TokenKind::FloatLiteral, TokenKind::IntLiteral, TokenKind::Eof]
    );
}

#[test]
fn string_literal_spans_include_quotes() {
    let src = r#"let s = "hola";"#;
    let tokens = lex(src);
    let s = tokens
        .iter()
        .find(|t| t.kind == TokenKind::StringLiteral)
        .unwrap();
    assert_eq!(token_text(src, s), "\"hola\"");
}

#[test]
fn comments_are_skipped() {
    assert_eq!(
        kinds("let x; // trailing\n/* block */ let y;"),
        vec![
            TokenKind::Let,
            TokenKind::Identifier,
            TokenKind::Semi,
            TokenKind::Let,
            TokenKind::Identifier,
            TokenKind::Semi,
            TokenKind::Eof
        ]
    );
}

#[test]
fn garbage_runs_coalesce() {
    let tokens = lex("let @@@ x");
    let garbage: Vec<_> = tokens
        .iter()
        .filter(|t| t.kind == TokenKind::Garbage)
        .collect();
    assert_eq!(garbage.len(), 1);
    assert_eq!(garbage[0].span(), 4..7);
}

#[test]
fn eof_is_always_last() {
    assert_eq!(kinds(""), vec![TokenKind::Eof]);
    assert_eq!(*kinds("x").last().unwrap(), TokenKind::Eof);
}
