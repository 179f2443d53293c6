use std::fmt;

use crate::diagnostics::position::Span;
use crate::syntax::block::Block;

#[derive(Debug, Clone)]
pub enum Expression {
    IntegerLiteral {
        value: i64,
        span: Span,
    },
    DecimalLiteral {
        value: f64,
        span: Span,
    },
    StringLiteral {
        value: String,
        span: Span,
    },
    BooleanLiteral {
        value: bool,
        span: Span,
    },
    NullLiteral {
        span: Span,
    },
    Identifier {
        name: String,
        span: Span,
    },
    Array {
        elements: Vec<Expression>,
        span: Span,
    },
    Hash {
        pairs: Vec<(Expression, Expression)>,
        span: Span,
    },
    Unary {
        operator: String,
        right: Box<Expression>,
        span: Span,
    },
    Binary {
        left: Box<Expression>,
        operator: String,
        right: Box<Expression>,
        span: Span,
    },
    Assign {
        name: String,
        value: Box<Expression>,
        span: Span,
    },
    If {
        condition: Box<Expression>,
        consequence: Block,
        alternative: Option<Block>,
        span: Span,
    },
    FunctionLiteral {
        name: Option<String>,
        parameters: Vec<String>,
        body: Block,
        span: Span,
    },
    Call {
        function: Box<Expression>,
        arguments: Vec<Expression>,
        span: Span,
    },
    Index {
        left: Box<Expression>,
        index: Box<Expression>,
        span: Span,
    },
}

impl Expression {
    pub fn span(&self) -> Span {
        match self {
            Expression::IntegerLiteral { span, .. }
            | Expression::DecimalLiteral { span, .. }
            | Expression::StringLiteral { span, .. }
            | Expression::BooleanLiteral { span, .. }
            | Expression::NullLiteral { span }
            | Expression::Identifier { span, .. }
            | Expression::Array { span, .. }
            | Expression::Hash { span, .. }
            | Expression::Unary { span, .. }
            | Expression::Binary { span, .. }
            | Expression::Assign { span, .. }
            | Expression::If { span, .. }
            | Expression::FunctionLiteral { span, .. }
            | Expression::Call { span, .. }
            | Expression::Index { span, .. } => *span,
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::IntegerLiteral { value, .. } => write!(f, "{value}"),
            Expression::DecimalLiteral { value, .. } => write!(f, "{value}"),
            Expression::StringLiteral { value, .. } => write!(f, "{value:?}"),
            Expression::BooleanLiteral { value, .. } => write!(f, "{value}"),
            Expression::NullLiteral { .. } => write!(f, "null"),
            Expression::Identifier { name, .. } => write!(f, "{name}"),
            Expression::Array { elements, .. } => {
                let items: Vec<String> = elements.iter().map(|e| e.to_string()).collect();
                write!(f, "[{}]", items.join(", "))
            }
            Expression::Hash { pairs, .. } => {
                let items: Vec<String> =
                    pairs.iter().map(|(k, v)| format!("{k}: {v}")).collect();
                write!(f, "{{{}}}", items.join(", "))
            }
            Expression::Unary { operator, right, .. } => write!(f, "({operator}{right})"),
            Expression::Binary {
                left,
                operator,
                right,
                ..
            } => write!(f, "({left} {operator} {right})"),
            Expression::Assign { name, value, .. } => write!(f, "({name} = {value})"),
            Expression::If {
                condition,
                consequence,
                alternative,
                ..
            } => {
                write!(f, "if {condition} {consequence}")?;
                if let Some(alt) = alternative {
                    write!(f, " else {alt}")?;
                }
                Ok(())
            }
            Expression::FunctionLiteral {
                name,
                parameters,
                body,
                ..
            } => {
                let params = parameters.join(", ");
                match name {
                    Some(name) => write!(f, "fn {name}({params}) {body}"),
                    None => write!(f, "fn({params}) {body}"),
                }
            }
            Expression::Call {
                function,
                arguments,
                ..
            } => {
                let args: Vec<String> = arguments.iter().map(|a| a.to_string()).collect();
                write!(f, "{function}({})", args.join(", "))
            }
            Expression::Index { left, index, .. } => write!(f, "({left}[{index}])"),
        }
    }
}
