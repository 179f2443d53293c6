use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    Illegal,
    Eof,

    Ident,
    Int,
    Float,
    String,

    Plus,
    Minus,
    Asterisk,
    Slash,
    SlashSlash,
    Percent,
    Bang,
    Lt,
    Gt,
    Lte,
    Gte,
    Eq,
    NotEq,
    Assign,

    And,
    Or,
    Amp,
    Pipe,
    Caret,
    Shl,
    Shr,

    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Semicolon,
    Colon,

    Let,
    Fn,
    If,
    Else,
    Return,
    True,
    False,
    Null,
    While,
    Break,
    Continue,
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

pub fn lookup_ident(ident: &str) -> TokenType {
    match ident {
        "let" => TokenType::Let,
        "fn" => TokenType::Fn,
        "if" => TokenType::If,
        "else" => TokenType::Else,
        "return" => TokenType::Return,
        "true" => TokenType::True,
        "false" => TokenType::False,
        "null" => TokenType::Null,
        "while" => TokenType::While,
        "break" => TokenType::Break,
        "continue" => TokenType::Continue,
        _ => TokenType::Ident,
    }
}
