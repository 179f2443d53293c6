use crate::bytecode::op_code::{OpCode, make};
use crate::bytecode::symbol_scope::SymbolScope;
use crate::diagnostics::diagnostic::Diagnostic;
use crate::syntax::block::Block;
use crate::syntax::expression::Expression;
use crate::syntax::statement::Statement;

use super::Compiler;

impl Compiler {
    pub(super) fn compile_statement(&mut self, statement: &Statement) -> Result<(), Diagnostic> {
        match statement {
            Statement::Let { name, value, .. } => {
                let symbol = self.symbol_table.define(name.clone());
                self.compile_expression(value)?;
                match symbol.scope {
                    SymbolScope::Global => {
                        self.emit(OpCode::SetGlobal, &[symbol.index]);
                    }
                    _ => {
                        self.emit(OpCode::SetLocal, &[symbol.index]);
                    }
                }
            }
            Statement::Return { value, .. } => {
                match value {
                    Some(value) => self.compile_expression(value)?,
                    None => {
                        self.emit(OpCode::Null, &[]);
                    }
                }
                self.emit(OpCode::ReturnValue, &[]);
            }
            Statement::While { condition, body, .. } => self.compile_while(condition, body)?,
            Statement::Break { span } => {
                if !self.symbol_table.inside_loop() {
                    return Err(self.make_break_outside_loop_error(*span));
                }
                let pos = self.emit(OpCode::Break, &[0]);
                self.scopes[self.scope_index].break_positions.push(pos);
            }
            Statement::Continue { span } => {
                if !self.symbol_table.inside_loop() {
                    return Err(self.make_continue_outside_loop_error(*span));
                }
                let pos = self.emit(OpCode::Continue, &[0]);
                self.scopes[self.scope_index].continue_positions.push(pos);
            }
            Statement::Expression { expression, .. } => {
                self.compile_expression(expression)?;
                self.emit(OpCode::Pop, &[]);
            }
        }
        Ok(())
    }

    pub(super) fn compile_block(&mut self, block: &Block) -> Result<(), Diagnostic> {
        for statement in &block.statements {
            self.compile_statement(statement)?;
        }
        Ok(())
    }

    /// `while` bodies compile straight into the enclosing `CompilationScope`
    /// — only the symbol table nests (`enter_loop_scope`) — unlike function
    /// bodies, which get their own scope and are wrapped into a closure.
    /// Every jump a loop body emits, including ones from a nested `if` or a
    /// nested `while`, is therefore already an absolute offset into the
    /// buffer it runs from. `break`/`continue` placeholders are recorded on
    /// the shared scope and patched here using the index range added while
    /// this loop's body was compiling, so a nested loop's own placeholders
    /// (already patched and removed by the time its `compile_while` call
    /// returns) never leak into the outer loop's patch pass.
    fn compile_while(&mut self, condition: &Expression, body: &Block) -> Result<(), Diagnostic> {
        let loop_start = self.current_instructions().len();
        self.compile_expression(condition)?;
        let jump_not_truthy_pos = self.emit(OpCode::JumpNotTruthy, &[9999]);

        self.enter_loop_scope();
        let break_start = self.scopes[self.scope_index].break_positions.len();
        let continue_start = self.scopes[self.scope_index].continue_positions.len();
        let body_result = self.compile_block(body);
        self.leave_loop_scope();
        body_result?;

        self.emit(OpCode::Jump, &[loop_start]);
        let after_loop = self.current_instructions().len();
        self.change_operand(jump_not_truthy_pos, after_loop);

        let break_positions = self.scopes[self.scope_index]
            .break_positions
            .split_off(break_start);
        for break_pos in break_positions {
            self.replace_instruction(break_pos, make(OpCode::Jump, &[after_loop]));
        }
        let continue_positions = self.scopes[self.scope_index]
            .continue_positions
            .split_off(continue_start);
        for continue_pos in continue_positions {
            self.replace_instruction(continue_pos, make(OpCode::Jump, &[loop_start]));
        }

        Ok(())
    }
}
