use ast::Span;
use logos::Logos;

/// Raw token classes recognized by the longest-match lexer. Explicit
/// `#[token]` entries outrank the identifier regex, so keywords, primitive
/// type names and boolean literals win over `Name` at equal length.
#[derive(Logos, Debug, PartialEq, Eq, Clone)]
#[logos(skip r"[ \t\r\n]+")]
pub enum Token {
    // Keywords
    #[token("abstract")]
    Abstract,
    #[token("case")]
    Case,
    #[token("class")]
    Class,
    #[token("def")]
    Def,
    #[token("else")]
    Else,
    #[token("extends")]
    Extends,
    #[token("if")]
    If,
    #[token("match")]
    Match,
    #[token("object")]
    Object,
    #[token("val")]
    Val,
    #[token("error")]
    ErrorKw,
    #[token("_")]
    Underscore,

    // Primitive type names
    #[token("Int")]
    IntType,
    #[token("String")]
    StringType,
    #[token("Boolean")]
    BooleanType,
    #[token("Unit")]
    UnitType,

    // Boolean literals
    #[token("true")]
    True,
    #[token("false")]
    False,

    // Multi-char operators
    #[token("==")]
    EqEq,
    #[token("++")]
    Concat,
    #[token("||")]
    Or,
    #[token("&&")]
    And,
    #[token("<=")]
    Le,

    // Single-char operators
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("<")]
    Lt,
    #[token("!")]
    Bang,

    // Delimiters
    #[token("=>")]
    FatArrow,
    #[token(".")]
    Dot,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token(";")]
    Semicolon,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("=")]
    Assign,

    // Literals and identifiers (payloads are sliced from the source by span)
    #[regex(r"[A-Za-z][A-Za-z0-9_]*")]
    Name,
    #[regex(r"[0-9]+")]
    Number,
    #[regex(r#""[^"\n]*""#)]
    Str,

    // Comments are lexed but filtered out by the token stream
    #[regex(r"//[^\n]*")]
    LineComment,
    #[token("/*", block_comment)]
    BlockComment,

    Eof,

    /// A malformed token; the payload is the lexical error message.
    Error(&'static str),
}

/// Consume a `/* ... */` comment. Block comments do not nest: the first
/// closing marker terminates the comment. Returning `false` on a missing
/// terminator makes Logos yield an error spanning the opener through EOF.
fn block_comment(lex: &mut logos::Lexer<Token>) -> bool {
    match lex.remainder().find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            true
        }
        None => {
            lex.bump(lex.remainder().len());
            false
        }
    }
}

pub type SpannedToken = (Token, Span);

/// Wraps the Logos lexer for one source file: filters comments, decodes
/// error cases into [`Token::Error`] with a message, validates integer
/// literals against the `i32` range and appends a single EOF token.
/// Positions restart at zero for every file.
pub struct TokenStream<'src> {
    source: &'src str,
    file: usize,
    raw: Vec<(Result<Token, ()>, std::ops::Range<usize>)>,
    pos: usize,
    emit_eof: bool,
    finished: bool,
}

impl<'src> TokenStream<'src> {
    pub fn new(file: usize, source: &'src str) -> Self {
        let raw = Token::lexer(source).spanned().collect();
        Self {
            source,
            file,
            raw,
            pos: 0,
            emit_eof: true,
            finished: false,
        }
    }

    /// Suppress the trailing EOF token. Used when several files are
    /// concatenated into one program: only the last stream keeps its EOF.
    pub fn without_eof(mut self) -> Self {
        self.emit_eof = false;
        self
    }

    fn span(&self, range: &std::ops::Range<usize>) -> Span {
        Span::new(self.file, range.start, range.end)
    }

    /// Classify a Logos failure by looking at the offending slice.
    fn error_message(slice: &str) -> &'static str {
        if slice.starts_with("/*") {
            "Unclosed comment"
        } else if slice.starts_with('"') {
            "Unterminated string literal"
        } else {
            "Invalid character"
        }
    }
}

impl<'src> Iterator for TokenStream<'src> {
    type Item = SpannedToken;

    fn next(&mut self) -> Option<SpannedToken> {
        while self.pos < self.raw.len() {
            let (result, range) = self.raw[self.pos].clone();
            self.pos += 1;
            let span = self.span(&range);

            match result {
                Ok(Token::LineComment) | Ok(Token::BlockComment) => continue,
                Ok(Token::Number) => {
                    // Longest match already grouped the full digit run; all
                    // that remains is the signed 32-bit range check.
                    let token = match self.source[range].parse::<i32>() {
                        Ok(_) => Token::Number,
                        Err(_) => Token::Error("Invalid integer literal"),
                    };
                    return Some((token, span));
                }
                Ok(token) => return Some((token, span)),
                Err(()) => {
                    let message = Self::error_message(&self.source[range]);
                    return Some((Token::Error(message), span));
                }
            }
        }

        if self.emit_eof && !self.finished {
            self.finished = true;
            let end = self.source.len();
            return Some((Token::Eof, Span::new(self.file, end, end)));
        }
        None
    }
}

/// Lex an ordered list of source files into one token sequence terminated by
/// exactly one EOF.
pub fn tokenize(files: &[(usize, &str)]) -> Vec<SpannedToken> {
    let mut tokens = Vec::new();
    for (i, (file, source)) in files.iter().enumerate() {
        let stream = TokenStream::new(*file, source);
        if i + 1 == files.len() {
            tokens.extend(stream);
        } else {
            tokens.extend(stream.without_eof());
        }
    }
    tokens
}
