use logos::Logos;
use std::fmt;

/// Tokens of the source language. Newlines are significant: the `lex`
/// entry point turns them into statement terminators where the previous
/// token can end a statement, so the parser only ever sees `Semi`.
#[derive(Logos, Debug, PartialEq, Eq, Clone)]
#[logos(skip r"[ \t\r]+")] // Whitespace except newlines
#[logos(skip r"//[^\n]*")] // Line comments
pub enum Token {
    // --- Keywords ---
    #[token("package")]
    Package,
    #[token("import")]
    Import,
    #[token("func")]
    Func,
    #[token("return")]
    Return,
    #[token("var")]
    Var,
    #[token("const")]
    Const,
    #[token("type")]
    Type,

    // --- Identifiers and literals ---
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),

    /// The raw digit string; base detection happens during translation.
    #[regex(r"[0-9]+|0[xX][0-9a-fA-F]+", |lex| lex.slice().to_string())]
    Int(String),

    /// The raw bytes between the quotes. No escape processing is applied.
    #[regex(r#""[^"\n]*""#, |lex| {
        let s = lex.slice();
        s[1..s.len()-1].to_string()
    })]
    Str(String),

    // --- Operators and punctuation ---
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token(";")]
    Semi,
    #[token("=")]
    Assign,
    #[token(":=")]
    Define,
    #[token("*")]
    Star,
    #[token("&")]
    Amp,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,

    #[token("\n")]
    Newline,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Package => write!(f, "'package'"),
            Token::Import => write!(f, "'import'"),
            Token::Func => write!(f, "'func'"),
            Token::Return => write!(f, "'return'"),
            Token::Var => write!(f, "'var'"),
            Token::Const => write!(f, "'const'"),
            Token::Type => write!(f, "'type'"),
            Token::Ident(s) => write!(f, "identifier '{s}'"),
            Token::Int(s) => write!(f, "integer literal '{s}'"),
            Token::Str(_) => write!(f, "string literal"),
            Token::LParen => write!(f, "'('"),
            Token::RParen => write!(f, "')'"),
            Token::LBrace => write!(f, "'{{'"),
            Token::RBrace => write!(f, "'}}'"),
            Token::Comma => write!(f, "','"),
            Token::Semi => write!(f, "';'"),
            Token::Assign => write!(f, "'='"),
            Token::Define => write!(f, "':='"),
            Token::Star => write!(f, "'*'"),
            Token::Amp => write!(f, "'&'"),
            Token::Plus => write!(f, "'+'"),
            Token::Minus => write!(f, "'-'"),
            Token::Slash => write!(f, "'/'"),
            Token::Percent => write!(f, "'%'"),
            Token::Newline => write!(f, "newline"),
        }
    }
}

/// A token plus its byte range in the source.
pub type Spanned = (usize, Token, usize);

/// Tokenize `source`, applying automatic terminator insertion: a newline
/// becomes `Semi` when the previous token is an identifier, a literal,
/// `)`, `}`, or `return`; other newlines are dropped.
pub fn lex(source: &str) -> Result<Vec<Spanned>, LexicalError> {
    let mut lexer = Token::lexer(source);
    let mut out: Vec<Spanned> = Vec::new();
    while let Some(result) = lexer.next() {
        let span = lexer.span();
        match result {
            Ok(Token::Newline) => {
                let insert = matches!(
                    out.last(),
                    Some((_, tok, _)) if ends_statement(tok)
                );
                if insert {
                    out.push((span.start, Token::Semi, span.start));
                }
            }
            Ok(token) => out.push((span.start, token, span.end)),
            Err(_) => return Err(create_lexical_error(source, span.start)),
        }
    }
    Ok(out)
}

fn ends_statement(tok: &Token) -> bool {
    matches!(
        tok,
        Token::Ident(_)
            | Token::Int(_)
            | Token::Str(_)
            | Token::RParen
            | Token::RBrace
            | Token::Return
    )
}

/// Lexical error with enough context for a readable report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexicalError {
    pub location: usize,
    pub line: usize,
    pub column: usize,
    pub unexpected_char: char,
    pub context: String,
}

impl fmt::Display for LexicalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Unexpected character '{}' at line {}, column {} (position {})\n  Context: {}",
            self.unexpected_char, self.line, self.column, self.location, self.context
        )
    }
}

impl std::error::Error for LexicalError {}

/// Convert a byte position to line and column numbers (1-based)
pub fn position_to_line_col(source: &str, position: usize) -> (usize, usize) {
    let mut line = 1;
    let mut col = 1;
    for (i, ch) in source.char_indices() {
        if i >= position {
            break;
        }
        if ch == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }
    (line, col)
}

/// Get the line containing an error position, trimmed.
fn get_error_context(source: &str, position: usize) -> String {
    let line_start = source[..position]
        .rfind('\n')
        .map(|pos| pos + 1)
        .unwrap_or(0);
    let line_end = source[position..]
        .find('\n')
        .map(|pos| position + pos)
        .unwrap_or(source.len());
    source[line_start..line_end].trim().to_string()
}

fn create_lexical_error(source: &str, position: usize) -> LexicalError {
    let (line, column) = position_to_line_col(source, position);
    let unexpected_char = source[position..].chars().next().unwrap_or('\0');
    let context = get_error_context(source, position);
    LexicalError {
        location: position,
        line,
        column,
        unexpected_char,
        context,
    }
}
