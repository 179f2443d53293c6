use crate::syntax::token_type::TokenType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Lowest,
    LogicalOr,   // ||
    LogicalAnd,  // &&
    BitOr,       // |
    BitXor,      // ^
    BitAnd,      // &
    Equals,      // ==, !=
    LessGreater, // <, >, <=, >=
    Shift,       // <<, >>
    Sum,         // +, -
    Product,     // *, /, //, %
    Prefix,      // -x, !x
    Call,        // fn(x)
    Index,       // array[index]
}

pub fn precedence_of(token_type: &TokenType) -> Precedence {
    match token_type {
        TokenType::Or => Precedence::LogicalOr,
        TokenType::And => Precedence::LogicalAnd,
        TokenType::Pipe => Precedence::BitOr,
        TokenType::Caret => Precedence::BitXor,
        TokenType::Amp => Precedence::BitAnd,
        TokenType::Eq | TokenType::NotEq => Precedence::Equals,
        TokenType::Lt | TokenType::Gt | TokenType::Lte | TokenType::Gte => Precedence::LessGreater,
        TokenType::Shl | TokenType::Shr => Precedence::Shift,
        TokenType::Plus | TokenType::Minus => Precedence::Sum,
        TokenType::Asterisk | TokenType::Slash | TokenType::SlashSlash | TokenType::Percent => {
            Precedence::Product
        }
        TokenType::LParen => Precedence::Call,
        TokenType::LBracket => Precedence::Index,
        _ => Precedence::Lowest,
    }
}
