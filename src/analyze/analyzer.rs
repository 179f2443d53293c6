use crate::bytecode::symbol_scope::SymbolScope;
use crate::bytecode::symbol_table::SymbolTable;
use crate::diagnostics::diagnostic::Diagnostic;
use crate::syntax::block::Block;
use crate::syntax::expression::Expression;
use crate::syntax::program::Program;
use crate::syntax::statement::Statement;

/// Single pass over the AST that mutates a symbol table exactly as the
/// compiler's own pass over the same tree would, so that resolution
/// failures surface as compile errors before the compiler ever runs.
/// Nested scopes (function bodies, `while` bodies) analyze against a
/// clone of the enclosing table: the clone needs to see every name
/// already defined, but its own definitions fall out of scope once the
/// nested body is fully checked.
pub struct Analyzer {
    file: String,
}

impl Analyzer {
    pub fn new(file: impl Into<String>) -> Self {
        Self { file: file.into() }
    }

    pub fn analyze(&self, program: &Program, symbols: &mut SymbolTable) -> Result<(), Diagnostic> {
        for statement in &program.statements {
            self.analyze_statement(statement, symbols)?;
        }
        Ok(())
    }

    fn analyze_block(&self, block: &Block, symbols: &mut SymbolTable) -> Result<(), Diagnostic> {
        for statement in &block.statements {
            self.analyze_statement(statement, symbols)?;
        }
        Ok(())
    }

    fn analyze_statement(&self, statement: &Statement, symbols: &mut SymbolTable) -> Result<(), Diagnostic> {
        match statement {
            Statement::Let { name, value, span } => {
                if let Some(existing) = symbols.resolve(name)
                    && (existing.is_local() || (existing.is_global() && symbols.is_global()))
                {
                    return Err(self.error(*span, format!("{name} is already defined")));
                }
                symbols.define(name.clone());
                self.analyze_expression(value, symbols)
            }
            Statement::Return { value, .. } => match value {
                Some(value) => self.analyze_expression(value, symbols),
                None => Ok(()),
            },
            Statement::While { condition, body, .. } => {
                self.analyze_expression(condition, symbols)?;
                let mut inner = SymbolTable::new_enclosed(symbols.clone(), true);
                self.analyze_block(body, &mut inner)
            }
            Statement::Break { span } => {
                if !symbols.inside_loop() {
                    return Err(self.error(*span, "syntax error: break outside loop"));
                }
                Ok(())
            }
            Statement::Continue { span } => {
                if !symbols.inside_loop() {
                    return Err(self.error(*span, "syntax error: continue outside loop"));
                }
                Ok(())
            }
            Statement::Expression { expression, .. } => self.analyze_expression(expression, symbols),
        }
    }

    fn analyze_expression(&self, expression: &Expression, symbols: &mut SymbolTable) -> Result<(), Diagnostic> {
        match expression {
            Expression::IntegerLiteral { .. }
            | Expression::DecimalLiteral { .. }
            | Expression::StringLiteral { .. }
            | Expression::BooleanLiteral { .. }
            | Expression::NullLiteral { .. } => Ok(()),
            Expression::Identifier { name, span } => {
                if symbols.resolve(name).is_none() {
                    return Err(self.error(*span, format!("identifier not found: {name}")));
                }
                Ok(())
            }
            Expression::Array { elements, .. } => {
                for element in elements {
                    self.analyze_expression(element, symbols)?;
                }
                Ok(())
            }
            Expression::Hash { pairs, .. } => {
                for (key, value) in pairs {
                    self.analyze_expression(key, symbols)?;
                    self.analyze_expression(value, symbols)?;
                }
                Ok(())
            }
            Expression::Unary { right, .. } => self.analyze_expression(right, symbols),
            Expression::Binary { left, right, .. } => {
                self.analyze_expression(left, symbols)?;
                self.analyze_expression(right, symbols)
            }
            Expression::Assign { name, value, span } => {
                let symbol = symbols
                    .resolve(name)
                    .ok_or_else(|| self.error(*span, format!("identifier not found: {name}")))?;
                let reassigns_current_function = symbol.is_function()
                    || (symbol.scope == SymbolScope::Outer
                        && symbol.ptr.is_some_and(|ptr| ptr.scope == SymbolScope::Function));
                if reassigns_current_function {
                    return Err(self.error(
                        *span,
                        format!("cannot reassign the current function being defined: {name}"),
                    ));
                }
                self.analyze_expression(value, symbols)
            }
            Expression::If {
                condition,
                consequence,
                alternative,
                ..
            } => {
                self.analyze_expression(condition, symbols)?;
                self.analyze_block(consequence, symbols)?;
                if let Some(alternative) = alternative {
                    self.analyze_block(alternative, symbols)?;
                }
                Ok(())
            }
            Expression::FunctionLiteral {
                name,
                parameters,
                body,
                ..
            } => {
                let mut inner = SymbolTable::new_enclosed(symbols.clone(), false);
                if let Some(name) = name {
                    inner.define_function_name(name.clone());
                }
                for parameter in parameters {
                    inner.define(parameter.clone());
                }
                self.analyze_block(body, &mut inner)
            }
            Expression::Call { function, arguments, .. } => {
                self.analyze_expression(function, symbols)?;
                for argument in arguments {
                    self.analyze_expression(argument, symbols)?;
                }
                Ok(())
            }
            Expression::Index { left, index, .. } => {
                self.analyze_expression(left, symbols)?;
                self.analyze_expression(index, symbols)
            }
        }
    }

    fn error(&self, span: crate::diagnostics::position::Span, message: impl Into<String>) -> Diagnostic {
        Diagnostic::new(self.file.clone(), span, message)
    }
}

#[cfg(test)]
mod analyzer_test {
    use super::*;
    use crate::bytecode::symbol_table::SymbolTable;
    use crate::syntax::parser::parse_source;

    fn analyze_str(input: &str) -> Result<(), Diagnostic> {
        let program = parse_source(input, "<stdin>").expect("parses cleanly");
        let mut symbols = SymbolTable::new();
        Analyzer::new("<stdin>").analyze(&program, &mut symbols)
    }

    #[test]
    fn test_identifier_not_found() {
        let err = analyze_str("foobar").unwrap_err();
        assert_eq!(err.message, "identifier not found: foobar");
    }

    #[test]
    fn test_assign_to_undefined_identifier() {
        let err = analyze_str("x = 2;").unwrap_err();
        assert_eq!(err.message, "identifier not found: x");
    }

    #[test]
    fn test_redefinition_in_same_scope() {
        let err = analyze_str("let a = 2; let a = 4;").unwrap_err();
        assert_eq!(err.message, "a is already defined");
    }

    #[test]
    fn test_redefinition_of_parameter() {
        let err = analyze_str("let f = fn(x) { let x = 3; }").unwrap_err();
        assert_eq!(err.message, "x is already defined");
    }

    #[test]
    fn test_break_outside_loop() {
        let err = analyze_str("break;").unwrap_err();
        assert_eq!(err.message, "syntax error: break outside loop");
    }

    #[test]
    fn test_continue_outside_loop() {
        let err = analyze_str("continue;").unwrap_err();
        assert_eq!(err.message, "syntax error: continue outside loop");
    }

    #[test]
    fn test_break_inside_function_inside_while_is_still_an_error() {
        let err = analyze_str("while (true) { let f = fn() { break; }; }").unwrap_err();
        assert_eq!(err.message, "syntax error: break outside loop");
    }

    #[test]
    fn test_while_condition_sees_enclosing_scope() {
        let err = analyze_str("while (x == 2) {}").unwrap_err();
        assert_eq!(err.message, "identifier not found: x");
    }

    #[test]
    fn test_reassigning_current_function_is_an_error() {
        let err = analyze_str("let f = fn(x) { if (x > 0) { f(x - 1); f = 2; } }").unwrap_err();
        assert_eq!(
            err.message,
            "cannot reassign the current function being defined: f"
        );
    }

    #[test]
    fn test_valid_program_analyzes_cleanly() {
        assert!(analyze_str("let a = 1; let b = a + 2; b;").is_ok());
        assert!(analyze_str("let f = fn(n) { if (n < 2) { n } else { f(n - 1) } }; f(5);").is_ok());
        assert!(
            analyze_str("let xs = [1,2,3]; let i = 0; while (i < 3) { i = i + 1; }").is_ok()
        );
    }

    #[test]
    fn test_loop_body_can_reassign_enclosing_local() {
        assert!(analyze_str(
            "let f = fn() { let i = 0; while (i < 3) { i = i + 1; } i };"
        )
        .is_ok());
    }
}
