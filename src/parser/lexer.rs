//! Lexer for placeholder expressions and host source using logos

use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

use logos::Logos;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r\x0C]+")]
pub enum Token {
    // Keywords
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("null")]
    Null,
    #[token("this")]
    This,
    #[token("new")]
    New,
    #[token("instanceof")]
    InstanceOf,

    // Logical and bitwise operators
    #[token("||")]
    OrOr,
    #[token("&&")]
    AndAnd,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("&")]
    Amp,
    #[token("!")]
    Bang,
    #[token("~")]
    Tilde,

    // Comparison operators
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<")]
    Less,
    #[token(">")]
    Greater,
    #[token("<=")]
    LessOrEqual,
    #[token(">=")]
    GreaterOrEqual,

    // Shifts
    #[token("<<")]
    Shl,
    #[token(">>")]
    Shr,
    #[token(">>>")]
    UShr,

    // Arithmetic
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
    #[token("++")]
    PlusPlus,
    #[token("--")]
    MinusMinus,

    // Assignment (recognized so it can be rejected with a clear message)
    #[token("=")]
    Assign,
    #[token("+=")]
    #[token("-=")]
    #[token("*=")]
    #[token("/=")]
    #[token("%=")]
    #[token("&=")]
    #[token("|=")]
    #[token("^=")]
    #[token("<<=")]
    #[token(">>=")]
    #[token(">>>=")]
    CompoundAssign,

    // Lambdas and method references
    #[token("->")]
    Arrow,
    #[token("::")]
    ColonColon,

    // Delimiters
    #[token("?")]
    Question,
    #[token(":")]
    Colon,
    #[token(".")]
    Dot,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token("@")]
    At,
    #[token("(")]
    ParenOpen,
    #[token(")")]
    ParenClose,
    #[token("[")]
    BracketOpen,
    #[token("]")]
    BracketClose,
    #[token("{")]
    BraceOpen,
    #[token("}")]
    BraceClose,

    // Literals - identifiers must come after keywords
    #[regex(r"[a-zA-Z_$][a-zA-Z0-9_$]*", |lex| lex.slice().to_string(), priority = 1)]
    Ident(String),

    #[regex(r"[0-9][0-9_]*[lL]?", |lex| lex.slice().to_string())]
    #[regex(r"0[xX][0-9a-fA-F][0-9a-fA-F_]*[lL]?", |lex| lex.slice().to_string())]
    #[regex(r"0[bB][01][01_]*[lL]?", |lex| lex.slice().to_string())]
    Int(String),

    #[regex(r"[0-9][0-9_]*\.[0-9][0-9_]*([eE][+-]?[0-9]+)?[fFdD]?", |lex| lex.slice().to_string())]
    #[regex(r"[0-9][0-9_]*[eE][+-]?[0-9]+[fFdD]?", |lex| lex.slice().to_string())]
    #[regex(r"[0-9][0-9_]*[fFdD]", |lex| lex.slice().to_string())]
    Float(String),

    #[regex(r"'([^'\\\n]|\\[^\n])[^'\n]{0,5}'", |lex| decode_char(lex.slice()))]
    Char(char),

    #[regex(r#""([^"\\\n]|\\[^\n])*""#, |lex| {
        let s = lex.slice();
        unescape(&s[1..s.len() - 1])
    })]
    String(String),

    // Comments (skip)
    #[regex(r"//[^\n]*", logos::skip)]
    LineComment,

    #[regex(r"/\*([^*]|\*+[^*/])*\*+/", logos::skip)]
    BlockComment,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Token::Ident(s) => return write!(f, "identifier '{}'", s),
            Token::Int(s) | Token::Float(s) => return write!(f, "number {}", s),
            Token::Char(c) => return write!(f, "character {:?}", c),
            Token::String(s) => return write!(f, "string \"{}\"", s),
            Token::True => "true",
            Token::False => "false",
            Token::Null => "null",
            Token::This => "this",
            Token::New => "new",
            Token::InstanceOf => "instanceof",
            Token::OrOr => "||",
            Token::AndAnd => "&&",
            Token::Pipe => "|",
            Token::Caret => "^",
            Token::Amp => "&",
            Token::Bang => "!",
            Token::Tilde => "~",
            Token::EqEq => "==",
            Token::NotEq => "!=",
            Token::Less => "<",
            Token::Greater => ">",
            Token::LessOrEqual => "<=",
            Token::GreaterOrEqual => ">=",
            Token::Shl => "<<",
            Token::Shr => ">>",
            Token::UShr => ">>>",
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Star => "*",
            Token::Slash => "/",
            Token::Percent => "%",
            Token::PlusPlus => "++",
            Token::MinusMinus => "--",
            Token::Assign => "=",
            Token::CompoundAssign => "compound assignment",
            Token::Arrow => "->",
            Token::ColonColon => "::",
            Token::Question => "?",
            Token::Colon => ":",
            Token::Dot => ".",
            Token::Comma => ",",
            Token::Semicolon => ";",
            Token::At => "@",
            Token::ParenOpen => "(",
            Token::ParenClose => ")",
            Token::BracketOpen => "[",
            Token::BracketClose => "]",
            Token::BraceOpen => "{",
            Token::BraceClose => "}",
            Token::LineComment | Token::BlockComment => "comment",
        };
        write!(f, "'{}'", symbol)
    }
}

/// Decode the escape sequences of a quoted literal body
///
/// Returns `None` for an unknown or truncated escape.
pub fn unescape(body: &str) -> Option<String> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let decoded = match chars.next()? {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            'b' => '\u{8}',
            'f' => '\u{c}',
            's' => ' ',
            '"' => '"',
            '\'' => '\'',
            '\\' => '\\',
            'u' => {
                let unit = unicode_escape(&mut chars)?;
                match unit {
                    0xD800..=0xDBFF => {
                        // A high surrogate needs its low half as the next escape
                        if chars.next()? != '\\' || chars.next()? != 'u' {
                            return None;
                        }
                        let low = unicode_escape(&mut chars)?;
                        if !(0xDC00..=0xDFFF).contains(&low) {
                            return None;
                        }
                        char::from_u32(0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00))?
                    }
                    unit => char::from_u32(unit)?,
                }
            }
            d @ '0'..='7' => {
                let mut value = d.to_digit(8)?;
                // Octal escapes take at most three digits and stay below \377
                let max_digits = if d <= '3' { 2 } else { 1 };
                for _ in 0..max_digits {
                    match chars.peek().and_then(|c| c.to_digit(8)) {
                        Some(digit) => {
                            value = value * 8 + digit;
                            chars.next();
                        }
                        None => break,
                    }
                }
                char::from_u32(value)?
            }
            _ => return None,
        };
        out.push(decoded);
    }
    Some(out)
}

/// Code unit of a `\u` escape after the `u`: extra `u`s, then exactly
/// four hex digits
fn unicode_escape(chars: &mut Peekable<Chars<'_>>) -> Option<u32> {
    while chars.peek() == Some(&'u') {
        chars.next();
    }
    let mut unit = 0;
    for _ in 0..4 {
        let digit = chars.next().filter(char::is_ascii_hexdigit)?;
        unit = unit * 16 + digit.to_digit(16)?;
    }
    Some(unit)
}

fn decode_char(slice: &str) -> Option<char> {
    let decoded = unescape(&slice[1..slice.len() - 1])?;
    let mut chars = decoded.chars();
    let c = chars.next()?;
    chars.next().is_none().then_some(c)
}

/// Lex input string into tokens with spans
///
/// Fails with the span of the first character that starts no token.
pub fn lex(input: &str) -> Result<Vec<(Token, Span)>, Span> {
    let mut tokens = Vec::new();
    for (tok, span) in Token::lexer(input).spanned() {
        match tok {
            Ok(t) => tokens.push((t, span)),
            Err(()) => return Err(span),
        }
    }
    Ok(tokens)
}
