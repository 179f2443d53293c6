use crate::diagnostics::diagnostic::Diagnostic;
use crate::diagnostics::position::Span;
use crate::syntax::block::Block;
use crate::syntax::expression::Expression;
use crate::syntax::lexer::Lexer;
use crate::syntax::precedence::{Precedence, precedence_of};
use crate::syntax::program::Program;
use crate::syntax::statement::Statement;
use crate::syntax::token::Token;
use crate::syntax::token_type::TokenType;

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    file: String,
    cur_token: Token,
    peek_token: Token,
    errors: Vec<Diagnostic>,
}

impl<'a> Parser<'a> {
    pub fn new(mut lexer: Lexer<'a>, file: impl Into<String>) -> Self {
        let cur_token = lexer.skip_comments_and_next();
        let peek_token = lexer.skip_comments_and_next();
        Self {
            lexer,
            file: file.into(),
            cur_token,
            peek_token,
            errors: Vec::new(),
        }
    }

    fn next_token(&mut self) {
        std::mem::swap(&mut self.cur_token, &mut self.peek_token);
        self.peek_token = self.lexer.skip_comments_and_next();
    }

    fn error(&mut self, span: Span, message: impl Into<String>) {
        self.errors.push(Diagnostic::new(self.file.clone(), span, message));
    }

    fn peek_error(&mut self, expected: TokenType) {
        let message = format!(
            "expected next token to be {:?}, got {:?} instead",
            expected, self.peek_token.token_type
        );
        let span = Span::at(self.peek_token.position);
        self.error(span, message);
    }

    fn expect_peek(&mut self, expected: TokenType) -> bool {
        if self.peek_token.token_type == expected {
            self.next_token();
            true
        } else {
            self.peek_error(expected);
            false
        }
    }

    fn skip_optional_semicolon(&mut self) {
        if self.peek_token.token_type == TokenType::Semicolon {
            self.next_token();
        }
    }

    pub fn parse_program(mut self) -> Result<Program, Vec<Diagnostic>> {
        let start = self.cur_token.position;
        let mut statements = Vec::new();
        while self.cur_token.token_type != TokenType::Eof {
            if let Some(statement) = self.parse_statement() {
                statements.push(statement);
            }
            self.next_token();
        }
        let end = self.cur_token.position;
        if self.errors.is_empty() {
            Ok(Program {
                statements,
                span: Span::new(start, end),
            })
        } else {
            Err(self.errors)
        }
    }

    fn parse_statement(&mut self) -> Option<Statement> {
        match self.cur_token.token_type {
            TokenType::Let => self.parse_let_statement(),
            TokenType::Return => self.parse_return_statement(),
            TokenType::While => self.parse_while_statement(),
            TokenType::Break => {
                let span = Span::at(self.cur_token.position);
                self.skip_optional_semicolon();
                Some(Statement::Break { span })
            }
            TokenType::Continue => {
                let span = Span::at(self.cur_token.position);
                self.skip_optional_semicolon();
                Some(Statement::Continue { span })
            }
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_let_statement(&mut self) -> Option<Statement> {
        let start = self.cur_token.position;
        if !self.expect_peek(TokenType::Ident) {
            return None;
        }
        let name = self.cur_token.literal.clone();
        if !self.expect_peek(TokenType::Assign) {
            return None;
        }
        self.next_token();
        let mut value = self.parse_expression(Precedence::Lowest)?;
        if let Expression::FunctionLiteral { name: fn_name, .. } = &mut value {
            if fn_name.is_none() {
                *fn_name = Some(name.clone());
            }
        }
        self.skip_optional_semicolon();
        let span = Span::new(start, self.cur_token.position);
        Some(Statement::Let { name, value, span })
    }

    fn parse_return_statement(&mut self) -> Option<Statement> {
        let start = self.cur_token.position;
        if self.peek_token.token_type == TokenType::Semicolon
            || self.peek_token.token_type == TokenType::RBrace
        {
            self.skip_optional_semicolon();
            return Some(Statement::Return {
                value: None,
                span: Span::new(start, self.cur_token.position),
            });
        }
        self.next_token();
        let value = self.parse_expression(Precedence::Lowest)?;
        self.skip_optional_semicolon();
        let span = Span::new(start, self.cur_token.position);
        Some(Statement::Return {
            value: Some(value),
            span,
        })
    }

    fn parse_while_statement(&mut self) -> Option<Statement> {
        let start = self.cur_token.position;
        if !self.expect_peek(TokenType::LParen) {
            return None;
        }
        self.next_token();
        let condition = self.parse_expression(Precedence::Lowest)?;
        if !self.expect_peek(TokenType::RParen) {
            return None;
        }
        if !self.expect_peek(TokenType::LBrace) {
            return None;
        }
        let body = self.parse_block()?;
        let span = Span::new(start, self.cur_token.position);
        Some(Statement::While { condition, body, span })
    }

    fn parse_expression_statement(&mut self) -> Option<Statement> {
        let start = self.cur_token.position;
        let expression = self.parse_expression(Precedence::Lowest)?;
        self.skip_optional_semicolon();
        let span = Span::new(start, self.cur_token.position);
        Some(Statement::Expression { expression, span })
    }

    fn parse_block(&mut self) -> Option<Block> {
        let start = self.cur_token.position;
        let mut statements = Vec::new();
        self.next_token();
        while self.cur_token.token_type != TokenType::RBrace
            && self.cur_token.token_type != TokenType::Eof
        {
            if let Some(statement) = self.parse_statement() {
                statements.push(statement);
            }
            self.next_token();
        }
        if self.cur_token.token_type != TokenType::RBrace {
            self.error(Span::at(self.cur_token.position), "expected '}' to close block");
            return None;
        }
        let span = Span::new(start, self.cur_token.position);
        Some(Block { statements, span })
    }

    fn parse_expression(&mut self, precedence: Precedence) -> Option<Expression> {
        let mut left = self.parse_prefix()?;

        while self.peek_token.token_type != TokenType::Semicolon
            && precedence < precedence_of(&self.peek_token.token_type)
        {
            match self.peek_token.token_type {
                TokenType::LParen => {
                    self.next_token();
                    left = self.parse_call_expression(left)?;
                }
                TokenType::LBracket => {
                    self.next_token();
                    left = self.parse_index_expression(left)?;
                }
                _ if is_binary_operator(self.peek_token.token_type) => {
                    self.next_token();
                    left = self.parse_binary_expression(left)?;
                }
                _ => break,
            }
        }

        Some(left)
    }

    fn parse_prefix(&mut self) -> Option<Expression> {
        let start = self.cur_token.position;
        match self.cur_token.token_type {
            TokenType::Ident => {
                let name = self.cur_token.literal.clone();
                if self.peek_token.token_type == TokenType::Assign {
                    self.next_token();
                    self.next_token();
                    let value = self.parse_expression(Precedence::Lowest)?;
                    let span = Span::new(start, self.cur_token.position);
                    return Some(Expression::Assign {
                        name,
                        value: Box::new(value),
                        span,
                    });
                }
                Some(Expression::Identifier {
                    name,
                    span: Span::at(start),
                })
            }
            TokenType::Int => {
                let literal = self.cur_token.literal.clone();
                match literal.parse::<i64>() {
                    Ok(value) => Some(Expression::IntegerLiteral {
                        value,
                        span: Span::at(start),
                    }),
                    Err(_) => {
                        self.error(Span::at(start), format!("could not parse {literal} as integer"));
                        None
                    }
                }
            }
            TokenType::Float => {
                let literal = self.cur_token.literal.clone();
                match literal.parse::<f64>() {
                    Ok(value) => Some(Expression::DecimalLiteral {
                        value,
                        span: Span::at(start),
                    }),
                    Err(_) => {
                        self.error(Span::at(start), format!("could not parse {literal} as decimal"));
                        None
                    }
                }
            }
            TokenType::String => Some(Expression::StringLiteral {
                value: self.cur_token.literal.clone(),
                span: Span::at(start),
            }),
            TokenType::True => Some(Expression::BooleanLiteral {
                value: true,
                span: Span::at(start),
            }),
            TokenType::False => Some(Expression::BooleanLiteral {
                value: false,
                span: Span::at(start),
            }),
            TokenType::Null => Some(Expression::NullLiteral { span: Span::at(start) }),
            TokenType::Bang | TokenType::Minus => {
                let operator = self.cur_token.literal.clone();
                self.next_token();
                let right = self.parse_expression(Precedence::Prefix)?;
                let span = Span::new(start, self.cur_token.position);
                Some(Expression::Unary {
                    operator,
                    right: Box::new(right),
                    span,
                })
            }
            TokenType::LParen => {
                self.next_token();
                let expr = self.parse_expression(Precedence::Lowest)?;
                if !self.expect_peek(TokenType::RParen) {
                    return None;
                }
                Some(expr)
            }
            TokenType::LBracket => self.parse_array_literal(),
            TokenType::LBrace => self.parse_hash_literal(),
            TokenType::If => self.parse_if_expression(),
            TokenType::Fn => self.parse_function_literal(),
            other => {
                self.error(Span::at(start), format!("no prefix parse function for {other:?} found"));
                None
            }
        }
    }

    fn parse_binary_expression(&mut self, left: Expression) -> Option<Expression> {
        let start = left.span().start;
        let operator = self.cur_token.literal.clone();
        let precedence = precedence_of(&self.cur_token.token_type);
        self.next_token();
        let right = self.parse_expression(precedence)?;
        let span = Span::new(start, self.cur_token.position);
        Some(Expression::Binary {
            left: Box::new(left),
            operator,
            right: Box::new(right),
            span,
        })
    }

    fn parse_array_literal(&mut self) -> Option<Expression> {
        let start = self.cur_token.position;
        let elements = self.parse_expression_list(TokenType::RBracket)?;
        let span = Span::new(start, self.cur_token.position);
        Some(Expression::Array { elements, span })
    }

    fn parse_expression_list(&mut self, end: TokenType) -> Option<Vec<Expression>> {
        let mut list = Vec::new();
        if self.peek_token.token_type == end {
            self.next_token();
            return Some(list);
        }
        self.next_token();
        list.push(self.parse_expression(Precedence::Lowest)?);
        while self.peek_token.token_type == TokenType::Comma {
            self.next_token();
            self.next_token();
            list.push(self.parse_expression(Precedence::Lowest)?);
        }
        if !self.expect_peek(end) {
            return None;
        }
        Some(list)
    }

    fn parse_hash_literal(&mut self) -> Option<Expression> {
        let start = self.cur_token.position;
        let mut pairs = Vec::new();
        while self.peek_token.token_type != TokenType::RBrace {
            self.next_token();
            let key = self.parse_expression(Precedence::Lowest)?;
            if !self.expect_peek(TokenType::Colon) {
                return None;
            }
            self.next_token();
            let value = self.parse_expression(Precedence::Lowest)?;
            pairs.push((key, value));
            if self.peek_token.token_type != TokenType::RBrace && !self.expect_peek(TokenType::Comma) {
                return None;
            }
        }
        if !self.expect_peek(TokenType::RBrace) {
            return None;
        }
        let span = Span::new(start, self.cur_token.position);
        Some(Expression::Hash { pairs, span })
    }

    fn parse_if_expression(&mut self) -> Option<Expression> {
        let start = self.cur_token.position;
        if !self.expect_peek(TokenType::LParen) {
            return None;
        }
        self.next_token();
        let condition = self.parse_expression(Precedence::Lowest)?;
        if !self.expect_peek(TokenType::RParen) {
            return None;
        }
        if !self.expect_peek(TokenType::LBrace) {
            return None;
        }
        let consequence = self.parse_block()?;

        let alternative = if self.peek_token.token_type == TokenType::Else {
            self.next_token();
            if !self.expect_peek(TokenType::LBrace) {
                return None;
            }
            Some(self.parse_block()?)
        } else {
            None
        };

        let span = Span::new(start, self.cur_token.position);
        Some(Expression::If {
            condition: Box::new(condition),
            consequence,
            alternative,
            span,
        })
    }

    fn parse_function_literal(&mut self) -> Option<Expression> {
        let start = self.cur_token.position;
        if !self.expect_peek(TokenType::LParen) {
            return None;
        }
        let parameters = self.parse_function_parameters()?;
        if !self.expect_peek(TokenType::LBrace) {
            return None;
        }
        let body = self.parse_block()?;
        let span = Span::new(start, self.cur_token.position);
        Some(Expression::FunctionLiteral {
            name: None,
            parameters,
            body,
            span,
        })
    }

    fn parse_function_parameters(&mut self) -> Option<Vec<String>> {
        let mut parameters = Vec::new();
        if self.peek_token.token_type == TokenType::RParen {
            self.next_token();
            return Some(parameters);
        }
        self.next_token();
        parameters.push(self.cur_token.literal.clone());
        while self.peek_token.token_type == TokenType::Comma {
            self.next_token();
            self.next_token();
            parameters.push(self.cur_token.literal.clone());
        }
        if !self.expect_peek(TokenType::RParen) {
            return None;
        }
        Some(parameters)
    }

    fn parse_call_expression(&mut self, function: Expression) -> Option<Expression> {
        let start = function.span().start;
        let arguments = self.parse_expression_list(TokenType::RParen)?;
        let span = Span::new(start, self.cur_token.position);
        Some(Expression::Call {
            function: Box::new(function),
            arguments,
            span,
        })
    }

    fn parse_index_expression(&mut self, left: Expression) -> Option<Expression> {
        let start = left.span().start;
        self.next_token();
        let index = self.parse_expression(Precedence::Lowest)?;
        if !self.expect_peek(TokenType::RBracket) {
            return None;
        }
        let span = Span::new(start, self.cur_token.position);
        Some(Expression::Index {
            left: Box::new(left),
            index: Box::new(index),
            span,
        })
    }
}

fn is_binary_operator(token_type: TokenType) -> bool {
    matches!(
        token_type,
        TokenType::Plus
            | TokenType::Minus
            | TokenType::Asterisk
            | TokenType::Slash
            | TokenType::SlashSlash
            | TokenType::Percent
            | TokenType::Eq
            | TokenType::NotEq
            | TokenType::Lt
            | TokenType::Gt
            | TokenType::Lte
            | TokenType::Gte
            | TokenType::Amp
            | TokenType::Pipe
            | TokenType::Caret
            | TokenType::Shl
            | TokenType::Shr
            | TokenType::And
            | TokenType::Or
    )
}

pub fn parse_source(source: &str, file: impl Into<String>) -> Result<Program, Vec<Diagnostic>> {
    let lexer = Lexer::new(source);
    let parser = Parser::new(lexer, file);
    parser.parse_program()
}

#[cfg(test)]
mod parser_test {
    use super::*;

    fn parse(input: &str) -> Program {
        parse_source(input, "<test>").unwrap_or_else(|errors| {
            panic!("parser errors: {:?}", errors);
        })
    }

    #[test]
    fn test_let_statements() {
        let program = parse("let x = 5; let y = 10; let foobar = 838383;");
        assert_eq!(program.statements.len(), 3);
        match &program.statements[0] {
            Statement::Let { name, .. } => assert_eq!(name, "x"),
            other => panic!("expected let, got {other:?}"),
        }
    }

    #[test]
    fn test_function_literal_takes_let_name() {
        let program = parse("let add = fn(a, b) { a + b };");
        match &program.statements[0] {
            Statement::Let { value, .. } => match value {
                Expression::FunctionLiteral { name, parameters, .. } => {
                    assert_eq!(name.as_deref(), Some("add"));
                    assert_eq!(parameters, &["a", "b"]);
                }
                other => panic!("expected function literal, got {other:?}"),
            },
            other => panic!("expected let, got {other:?}"),
        }
    }

    #[test]
    fn test_operator_precedence() {
        let program = parse("a + b * c;");
        assert_eq!(program.statements[0].to_string(), "(a + (b * c));");
    }

    #[test]
    fn test_less_than_is_not_rewritten_by_parser() {
        let program = parse("a < b;");
        match &program.statements[0] {
            Statement::Expression {
                expression: Expression::Binary { operator, .. },
                ..
            } => assert_eq!(operator, "<"),
            other => panic!("expected binary expression, got {other:?}"),
        }
    }

    #[test]
    fn test_while_and_break_continue() {
        let program = parse("while (i < 10) { break; continue; }");
        match &program.statements[0] {
            Statement::While { body, .. } => {
                assert!(matches!(body.statements[0], Statement::Break { .. }));
                assert!(matches!(body.statements[1], Statement::Continue { .. }));
            }
            other => panic!("expected while, got {other:?}"),
        }
    }

    #[test]
    fn test_assign_expression() {
        let program = parse("x = 5;");
        match &program.statements[0] {
            Statement::Expression {
                expression: Expression::Assign { name, .. },
                ..
            } => assert_eq!(name, "x"),
            other => panic!("expected assign expression, got {other:?}"),
        }
    }

    #[test]
    fn test_hash_literal() {
        let program = parse(r#"{"a": 1, "b": 2};"#);
        match &program.statements[0] {
            Statement::Expression {
                expression: Expression::Hash { pairs, .. },
                ..
            } => assert_eq!(pairs.len(), 2),
            other => panic!("expected hash literal, got {other:?}"),
        }
    }

    #[test]
    fn test_parser_reports_errors() {
        let errors = parse_source("let x 5;", "<test>").unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("expected next token"));
    }
}
