use std::rc::Rc;

use crate::bytecode::op_code::OpCode;
use crate::bytecode::symbol::Symbol;
use crate::bytecode::symbol_scope::SymbolScope;
use crate::diagnostics::diagnostic::Diagnostic;
use crate::runtime::compiled_function::CompiledFunction;
use crate::runtime::value::Value;
use crate::syntax::block::Block;
use crate::syntax::expression::Expression;

use super::Compiler;

impl Compiler {
    pub(super) fn compile_expression(&mut self, expression: &Expression) -> Result<(), Diagnostic> {
        match expression {
            Expression::IntegerLiteral { value, .. } => {
                let index = self.add_constant(Value::Integer(*value));
                self.emit(OpCode::Constant, &[index]);
            }
            Expression::DecimalLiteral { value, .. } => {
                let index = self.add_constant(Value::Float(*value));
                self.emit(OpCode::Constant, &[index]);
            }
            Expression::StringLiteral { value, .. } => {
                let index = self.add_constant(Value::String(value.as_str().into()));
                self.emit(OpCode::Constant, &[index]);
            }
            Expression::BooleanLiteral { value, .. } => {
                self.emit(if *value { OpCode::True } else { OpCode::False }, &[]);
            }
            Expression::NullLiteral { .. } => {
                self.emit(OpCode::Null, &[]);
            }
            Expression::Identifier { name, span } => {
                let symbol = self
                    .symbol_table
                    .resolve(name)
                    .ok_or_else(|| self.make_identifier_not_found_error(name, *span))?;
                self.load_symbol(&symbol);
            }
            Expression::Array { elements, .. } => {
                for element in elements {
                    self.compile_expression(element)?;
                }
                self.emit(OpCode::Array, &[elements.len()]);
            }
            Expression::Hash { pairs, .. } => {
                for (key, value) in pairs {
                    self.compile_expression(key)?;
                    self.compile_expression(value)?;
                }
                self.emit(OpCode::Hash, &[pairs.len() * 2]);
            }
            Expression::Unary { operator, right, .. } => {
                self.compile_expression(right)?;
                match operator.as_str() {
                    "-" => self.emit(OpCode::Minus, &[]),
                    "!" => self.emit(OpCode::Bang, &[]),
                    other => unreachable!("unknown unary operator: {other}"),
                };
            }
            Expression::Binary {
                left,
                operator,
                right,
                ..
            } => self.compile_binary(left, operator, right)?,
            Expression::Assign { name, value, span } => {
                self.compile_expression(value)?;
                let symbol = self
                    .symbol_table
                    .resolve(name)
                    .ok_or_else(|| self.make_identifier_not_found_error(name, *span))?;
                self.emit_set(&symbol);
                self.load_symbol(&symbol);
            }
            Expression::If {
                condition,
                consequence,
                alternative,
                ..
            } => self.compile_if(condition, consequence, alternative.as_ref())?,
            Expression::FunctionLiteral {
                name,
                parameters,
                body,
                ..
            } => self.compile_function_literal(name.as_deref(), parameters, body)?,
            Expression::Call {
                function,
                arguments,
                ..
            } => {
                self.compile_expression(function)?;
                for argument in arguments {
                    self.compile_expression(argument)?;
                }
                self.emit(OpCode::Call, &[arguments.len()]);
            }
            Expression::Index { left, index, .. } => {
                self.compile_expression(left)?;
                self.compile_expression(index)?;
                self.emit(OpCode::Index, &[]);
            }
        }
        Ok(())
    }

    fn compile_binary(
        &mut self,
        left: &Expression,
        operator: &str,
        right: &Expression,
    ) -> Result<(), Diagnostic> {
        if operator == "<" || operator == "<=" {
            self.compile_expression(right)?;
            self.compile_expression(left)?;
            let op = if operator == "<" {
                OpCode::GreaterThan
            } else {
                OpCode::GreaterEqual
            };
            self.emit(op, &[]);
            return Ok(());
        }

        self.compile_expression(left)?;
        self.compile_expression(right)?;
        let op = match operator {
            "+" => OpCode::Add,
            "-" => OpCode::Sub,
            "*" => OpCode::Mul,
            "/" => OpCode::Div,
            "//" => OpCode::FloorDiv,
            "%" => OpCode::Mod,
            "==" => OpCode::Equal,
            "!=" => OpCode::NotEqual,
            ">" => OpCode::GreaterThan,
            ">=" => OpCode::GreaterEqual,
            "&" => OpCode::BitAnd,
            "|" => OpCode::BitOr,
            "^" => OpCode::BitXor,
            "<<" => OpCode::BitLsh,
            ">>" => OpCode::BitRsh,
            "&&" => OpCode::LogicalAnd,
            "||" => OpCode::LogicalOr,
            other => unreachable!("unknown binary operator: {other}"),
        };
        self.emit(op, &[]);
        Ok(())
    }

    /// Emits the `set_*` half of an assignment; the caller follows with a
    /// `load_symbol` so the assignment yields the assigned value.
    fn emit_set(&mut self, symbol: &Symbol) {
        match symbol.scope {
            SymbolScope::Global => self.emit(OpCode::SetGlobal, &[symbol.index]),
            SymbolScope::Local => self.emit(OpCode::SetLocal, &[symbol.index]),
            SymbolScope::Free => self.emit(OpCode::SetFree, &[symbol.index]),
            SymbolScope::Outer => {
                let ptr = symbol.ptr.expect("outer symbol always carries a pointer");
                self.emit(
                    OpCode::SetOuter,
                    &[ptr.level, ptr.scope as usize, ptr.index],
                )
            }
            SymbolScope::Builtin | SymbolScope::Function => {
                unreachable!("analyzer rejects assignment to builtin/function symbols")
            }
        };
    }

    fn compile_if(
        &mut self,
        condition: &Expression,
        consequence: &Block,
        alternative: Option<&Block>,
    ) -> Result<(), Diagnostic> {
        self.compile_expression(condition)?;
        let jump_not_truthy_pos = self.emit(OpCode::JumpNotTruthy, &[9999]);

        self.compile_block(consequence)?;
        if self.is_last_instruction(OpCode::Pop) {
            self.remove_last_pop();
        }

        let jump_pos = self.emit(OpCode::Jump, &[9999]);
        let after_consequence = self.current_instructions().len();
        self.change_operand(jump_not_truthy_pos, after_consequence);

        match alternative {
            Some(alternative) => {
                self.compile_block(alternative)?;
                if self.is_last_instruction(OpCode::Pop) {
                    self.remove_last_pop();
                }
            }
            None => {
                self.emit(OpCode::Null, &[]);
            }
        }
        let after_alternative = self.current_instructions().len();
        self.change_operand(jump_pos, after_alternative);

        Ok(())
    }

    fn compile_function_literal(
        &mut self,
        name: Option<&str>,
        parameters: &[String],
        body: &Block,
    ) -> Result<(), Diagnostic> {
        self.enter_scope();

        if let Some(name) = name {
            self.symbol_table.define_function_name(name);
        }
        for parameter in parameters {
            self.symbol_table.define(parameter.clone());
        }

        self.compile_block(body)?;

        if self.is_last_instruction(OpCode::Pop) {
            self.replace_last_pop_with_return();
        }
        if !self.is_last_instruction(OpCode::ReturnValue) {
            self.emit(OpCode::Null, &[]);
            self.emit(OpCode::ReturnValue, &[]);
        }

        let free_symbols = self.symbol_table.free_symbols().to_vec();
        let num_locals = self.symbol_table.num_definitions();
        let instructions = self.leave_scope().instructions;

        for free_symbol in &free_symbols {
            self.load_symbol(free_symbol);
        }

        let compiled_function = Value::Function(Rc::new(CompiledFunction::new(
            instructions,
            num_locals,
            parameters.len(),
        )));
        let constant_index = self.add_constant(compiled_function);
        self.emit(OpCode::Closure, &[constant_index, free_symbols.len()]);

        Ok(())
    }
}
