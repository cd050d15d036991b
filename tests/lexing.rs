//! Token-stream invariants checked through the public lexer API.

use mython::{Lexer, Token};

fn lex_all(source: &str) -> Vec<Token> {
    let mut lexer = Lexer::new(source).expect("source should lex");
    let mut tokens = vec![lexer.current().clone()];
    while !matches!(lexer.current(), Token::Eof) {
        tokens.push(lexer.advance().clone());
    }
    tokens
}

#[test]
fn test_relexing_is_deterministic() {
    let sources = [
        "a = 10\nb = 20\nprint a + b\n",
        "class Dog:\n  def bark():\n    print 'woof'\nd = Dog()\nd.bark()\n",
        "if a >= 1 and not b:\n  x = 'mixed' # comment\n",
    ];
    for source in sources {
        assert_eq!(lex_all(source), lex_all(source));
    }
}

#[test]
fn test_no_adjacent_newlines() {
    let source = "a = 1\n\n\n\nb = 2\n# only a comment\n\nif True:\n  c = 3\n\n  d = 4\n";
    let tokens = lex_all(source);
    for pair in tokens.windows(2) {
        assert!(
            !matches!(pair, [Token::Newline, Token::Newline]),
            "adjacent newlines in {:?}",
            tokens
        );
    }
}

#[test]
fn test_no_newline_directly_after_dedent() {
    let source = "if True:\n  a = 1\n\nb = 2\n\nif True:\n  c = 3\n";
    let tokens = lex_all(source);
    for pair in tokens.windows(2) {
        assert!(
            !matches!(pair, [Token::Dedent, Token::Newline]),
            "newline immediately after dedent in {:?}",
            tokens
        );
    }
}

#[test]
fn test_indents_and_dedents_balance() {
    let sources = [
        "if a:\n  b\n",
        "if a:\n  if b:\n    c\n",
        "class A:\n  def m():\n    if x:\n      y\nz\n",
        "if a:\n  b\nelse:\n  c\n",
        // unterminated final line inside two suites
        "if a:\n  if b:\n    c",
    ];
    for source in sources {
        let tokens = lex_all(source);
        let indents = tokens.iter().filter(|t| matches!(t, Token::Indent)).count();
        let dedents = tokens.iter().filter(|t| matches!(t, Token::Dedent)).count();
        assert_eq!(indents, dedents, "unbalanced layout for {:?}", source);
    }
}

#[test]
fn test_stream_ends_with_newline_or_dedent_then_eof() {
    for source in ["x = 1", "x = 1\n", "if a:\n  b\n", "if a:\n  b"] {
        let tokens = lex_all(source);
        let len = tokens.len();
        assert!(matches!(tokens[len - 1], Token::Eof));
        assert!(
            matches!(tokens[len - 2], Token::Newline | Token::Dedent),
            "stream should close its last line: {:?}",
            tokens
        );
    }
}

#[test]
fn test_token_display_round_trip_forms() {
    assert_eq!(Token::Number(10).to_string(), "Number{10}");
    assert_eq!(Token::Id("abc".to_string()).to_string(), "Id{abc}");
    assert_eq!(Token::Str("hi".to_string()).to_string(), "String{hi}");
    assert_eq!(Token::Char(b'(').to_string(), "Char{(}");
    assert_eq!(Token::Indent.to_string(), "Indent");
    assert_eq!(Token::Eof.to_string(), "Eof");
}

#[test]
fn test_token_equality_distinguishes_payloads() {
    assert_eq!(Token::Number(1), Token::Number(1));
    assert_ne!(Token::Number(1), Token::Number(2));
    assert_ne!(Token::Id("a".to_string()), Token::Str("a".to_string()));
    assert_eq!(Token::Char(b'+'), Token::Char(b'+'));
}

#[test]
fn test_keywords_inside_identifiers_stay_identifiers() {
    let tokens = lex_all("classify = 1\n");
    assert_eq!(tokens[0], Token::Id("classify".to_string()));
}

#[test]
fn test_span_positions_are_ascending() {
    let mut lexer = Lexer::new("a = 1\nif a:\n  print a\n").expect("source should lex");
    let mut last_start = 0;
    loop {
        let span = lexer.current_span();
        assert!(span.start >= last_start, "spans should not go backwards");
        last_start = span.start;
        if matches!(lexer.current(), Token::Eof) {
            break;
        }
        lexer.advance();
    }
}
