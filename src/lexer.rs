use crate::diagnostic::Span;
use crate::interpreter::error::LexError;
use crate::token::Token;

/// An indentation step is exactly this many spaces.
pub const SPACES_PER_INDENT: usize = 2;

/// Cursor over the token stream of one source text.
///
/// The whole token vector is materialized up front; `current`/`advance` walk
/// it. Once `Eof` is current, `advance` keeps returning `Eof`.
#[derive(Debug)]
pub struct Lexer {
    tokens: Vec<(Token, Span)>,
    current: usize,
}

impl Lexer {
    pub fn new(source: &str) -> Result<Self, LexError> {
        let tokens = Tokenizer::new(source).run()?;
        Ok(Self { tokens, current: 0 })
    }

    pub fn current(&self) -> &Token {
        &self.tokens[self.current].0
    }

    pub fn current_span(&self) -> Span {
        self.tokens[self.current].1
    }

    /// Moves to the next token and returns it.
    pub fn advance(&mut self) -> &Token {
        if self.current + 1 < self.tokens.len() {
            self.current += 1;
        }
        self.current()
    }
}

/// Single pass over the source text producing the token vector.
///
/// Layout rules: `Newline` is emitted once per logical line (blank and
/// comment-only lines collapse), `Indent`/`Dedent` are computed from the
/// leading-space count at the start of each line, and any indentation still
/// open at end of input is closed with trailing `Dedent`s before `Eof`.
struct Tokenizer<'a> {
    src: &'a str,
    pos: usize,
    indent: usize,
    tokens: Vec<(Token, Span)>,
}

impl<'a> Tokenizer<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            indent: 0,
            tokens: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Vec<(Token, Span)>, LexError> {
        // Leading spaces on the very first line are separators, not
        // indentation.
        self.skip_spaces();

        while let Some(c) = self.peek() {
            match c {
                b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.word(),
                b'0'..=b'9' => self.number()?,
                b'\'' | b'"' => self.string()?,
                b'#' => self.comment()?,
                b'\n' => self.newline()?,
                b' ' => self.skip_spaces(),
                c if c.is_ascii_punctuation() => self.operator(),
                _ => {
                    let span = Span::new(self.pos, self.pos + 1);
                    let ch = self.src[self.pos..].chars().next().unwrap_or('\u{fffd}');
                    return Err(LexError::unexpected_char(ch, span));
                }
            }
        }

        let end = self.src.len();
        if !self.tokens.is_empty()
            && !matches!(self.tokens.last(), Some((Token::Newline | Token::Dedent, _)))
        {
            self.tokens.push((Token::Newline, Span::new(end, end)));
        }
        while self.indent > 0 {
            self.indent -= 1;
            self.tokens.push((Token::Dedent, Span::new(end, end)));
        }
        self.tokens.push((Token::Eof, Span::new(end, end)));

        Ok(self.tokens)
    }

    fn peek(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    fn push(&mut self, token: Token, start: usize) {
        self.tokens.push((token, Span::new(start, self.pos)));
    }

    fn last_is(&self, matcher: fn(&Token) -> bool) -> bool {
        matches!(self.tokens.last(), Some((token, _)) if matcher(token))
    }

    fn skip_spaces(&mut self) {
        while self.peek() == Some(b' ') {
            self.pos += 1;
        }
    }

    fn word(&mut self) {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == b'_') {
            self.pos += 1;
        }

        let token = match &self.src[start..self.pos] {
            "class" => Token::Class,
            "return" => Token::Return,
            "if" => Token::If,
            "else" => Token::Else,
            "def" => Token::Def,
            "print" => Token::Print,
            "and" => Token::And,
            "or" => Token::Or,
            "not" => Token::Not,
            "None" => Token::None,
            "True" => Token::True,
            "False" => Token::False,
            word => Token::Id(word.to_string()),
        };
        self.push(token, start);
    }

    fn number(&mut self) -> Result<(), LexError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.pos += 1;
        }

        let literal = &self.src[start..self.pos];
        let value: i64 = literal
            .parse()
            .map_err(|_| LexError::number_too_large(literal, Span::new(start, self.pos)))?;
        self.push(Token::Number(value), start);
        Ok(())
    }

    fn operator(&mut self) {
        let start = self.pos;
        let first = self.src.as_bytes()[self.pos];
        self.pos += 1;

        let token = if self.peek() == Some(b'=') && matches!(first, b'!' | b'=' | b'>' | b'<') {
            self.pos += 1;
            match first {
                b'!' => Token::NotEq,
                b'=' => Token::Eq,
                b'>' => Token::GreaterOrEq,
                _ => Token::LessOrEq,
            }
        } else {
            Token::Char(first)
        };
        self.push(token, start);
    }

    fn string(&mut self) -> Result<(), LexError> {
        let start = self.pos;
        let quote = self.src.as_bytes()[self.pos] as char;
        self.pos += 1;

        let mut text = String::new();
        loop {
            let Some(c) = self.src[self.pos..].chars().next() else {
                return Err(LexError::unterminated_string(Span::new(start, self.pos)));
            };
            self.pos += c.len_utf8();

            match c {
                c if c == quote => break,
                '\\' => {
                    let Some(escape) = self.src[self.pos..].chars().next() else {
                        return Err(LexError::unterminated_string(Span::new(start, self.pos)));
                    };
                    self.pos += escape.len_utf8();
                    let unescaped = match escape {
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        '"' => '"',
                        '\\' => '\\',
                        '\'' => '\'',
                        other => {
                            let span = Span::new(self.pos - 1 - other.len_utf8(), self.pos);
                            return Err(LexError::unknown_escape(other, span));
                        }
                    };
                    text.push(unescaped);
                }
                '\n' | '\r' => {
                    return Err(LexError::newline_in_string(Span::new(start, self.pos)));
                }
                c => text.push(c),
            }
        }

        self.push(Token::Str(text), start);
        Ok(())
    }

    /// `#` consumes the rest of the line, including its newline. The comment
    /// does not hide the end of a logical line: if the line carried tokens
    /// and no `Newline` was emitted yet, one is emitted here.
    fn comment(&mut self) -> Result<(), LexError> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            self.pos += 1;
            if c == b'\n' {
                break;
            }
        }

        if !self.tokens.is_empty()
            && !self.last_is(|t| matches!(t, Token::Newline | Token::Dedent))
        {
            self.push(Token::Newline, start);
        }
        self.indentation()
    }

    /// Consumes one `\n`. Consecutive newlines collapse to a single token,
    /// so blank lines are invisible to the parser.
    fn newline(&mut self) -> Result<(), LexError> {
        let start = self.pos;
        self.pos += 1;

        if !self.tokens.is_empty() && !self.last_is(|t| matches!(t, Token::Newline)) {
            self.push(Token::Newline, start);
        }
        self.indentation()
    }

    /// Measures the leading spaces of the line that starts here and emits the
    /// `Indent`/`Dedent` steps between the previous level and the new one.
    /// Only runs right after a `Newline`; a blank line keeps the current
    /// level.
    fn indentation(&mut self) -> Result<(), LexError> {
        if !self.last_is(|t| matches!(t, Token::Newline)) {
            return Ok(());
        }
        if self.peek() == Some(b'\n') {
            return Ok(());
        }

        let start = self.pos;
        let mut spaces = 0usize;
        while self.peek() == Some(b' ') {
            self.pos += 1;
            spaces += 1;
        }

        if spaces % SPACES_PER_INDENT != 0 {
            return Err(LexError::bad_indent(spaces, Span::new(start, self.pos)));
        }

        let level = spaces / SPACES_PER_INDENT;
        while level > self.indent {
            self.indent += 1;
            self.push(Token::Indent, start);
        }
        while level < self.indent {
            self.indent -= 1;
            self.push(Token::Dedent, start);
        }
        Ok(())
    }
}
