use thiserror::Error;

use crate::parser::{Assignment, BinOpKind, Declaration, Expr, Program, Stmt, UnOpKind};

use super::{SymbolTable, SymbolType};

#[derive(Clone, Debug, Error, PartialEq)]
#[error("{0}")]
pub struct SemanticError(pub String);

/// Walks the AST once, building the symbol table and enforcing the
/// declaration/initialization/type rules. The table is used for validation
/// only; no later stage consults it.
#[derive(Debug, Default)]
pub struct SemanticVisitor {
    symbol_table: SymbolTable,
}

impl SemanticVisitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Analysis stops at the first violation.
    pub fn analyze(mut self, program: &Program) -> Result<SymbolTable, SemanticError> {
        self.visit_program(program)?;
        Ok(self.symbol_table)
    }

    fn visit_program(&mut self, program: &Program) -> Result<(), SemanticError> {
        for stmt in &program.statements {
            self.visit_statement(stmt)?;
        }
        Ok(())
    }

    /// Only declarations and assignments are checked. `print`, `if`,
    /// `while`, `for` and pattern statements, including everything nested in
    /// their blocks, are skipped here; output compatibility depends on this
    /// scope staying exactly as it is.
    fn visit_statement(&mut self, stmt: &Stmt) -> Result<(), SemanticError> {
        match stmt {
            Stmt::Declaration(node) => self.visit_declaration(node),
            Stmt::Assignment(node) => self.visit_assignment(node),
            Stmt::Print(_) | Stmt::If(_) | Stmt::While(_) | Stmt::For(_) | Stmt::Pattern(_) => {
                Ok(())
            }
        }
    }

    /// A declaration infers its type from the initializer and marks the
    /// symbol initialized.
    fn visit_declaration(&mut self, node: &Declaration) -> Result<(), SemanticError> {
        let expr_type = self.visit_expression(&node.value)?;
        self.symbol_table
            .declare(&node.name, expr_type, node.span.line)?;
        self.symbol_table.set_initialized(&node.name)
    }

    fn visit_assignment(&mut self, node: &Assignment) -> Result<(), SemanticError> {
        let Some(symbol) = self.symbol_table.lookup(&node.name) else {
            return Err(SemanticError(format!(
                "Variable '{}' not declared (line {})",
                node.name, node.span.line
            )));
        };
        let target_type = symbol.ty;

        let expr_type = self.visit_expression(&node.value)?;
        if target_type != expr_type && expr_type != SymbolType::Unknown {
            return Err(SemanticError(format!(
                "Type mismatch: '{}' is {}, but expression is {} (line {})",
                node.name,
                target_type.name(),
                expr_type.name(),
                node.span.line
            )));
        }

        self.symbol_table.set_initialized(&node.name)
    }

    fn visit_expression(&self, expr: &Expr) -> Result<SymbolType, SemanticError> {
        match expr {
            Expr::Identifier { name, span } => {
                let Some(symbol) = self.symbol_table.lookup(name) else {
                    return Err(SemanticError(format!(
                        "Variable '{}' not declared (line {})",
                        name, span.line
                    )));
                };
                if !symbol.initialized {
                    return Err(SemanticError(format!(
                        "Variable '{}' used before initialization (line {})",
                        name, span.line
                    )));
                }
                Ok(symbol.ty)
            }
            Expr::Integer { .. } => Ok(SymbolType::Integer),
            Expr::Str { .. } => Ok(SymbolType::Str),
            Expr::Binary {
                op, left, right, span, ..
            } => self.visit_binary_op(*op, left, right, span.line),
            Expr::Unary {
                op, operand, span, ..
            } => self.visit_unary_op(*op, operand, span.line),
        }
    }

    /// Comparisons require identical operand types and yield INTEGER (1/0);
    /// arithmetic requires INTEGER operands.
    fn visit_binary_op(
        &self,
        op: BinOpKind,
        left: &Expr,
        right: &Expr,
        line: usize,
    ) -> Result<SymbolType, SemanticError> {
        let left_type = self.visit_expression(left)?;
        let right_type = self.visit_expression(right)?;

        if op.is_comparison() {
            if left_type != right_type {
                return Err(SemanticError(format!(
                    "Type mismatch in comparison: {} {} {} (line {})",
                    left_type.name(),
                    op.symbol(),
                    right_type.name(),
                    line
                )));
            }
            return Ok(SymbolType::Integer);
        }

        if left_type != SymbolType::Integer || right_type != SymbolType::Integer {
            return Err(SemanticError(format!(
                "Arithmetic operation requires INTEGER operands, got {} and {} (line {})",
                left_type.name(),
                right_type.name(),
                line
            )));
        }
        Ok(SymbolType::Integer)
    }

    fn visit_unary_op(
        &self,
        op: UnOpKind,
        operand: &Expr,
        line: usize,
    ) -> Result<SymbolType, SemanticError> {
        let operand_type = self.visit_expression(operand)?;
        match op {
            UnOpKind::Neg => {
                if operand_type != SymbolType::Integer {
                    return Err(SemanticError(format!(
                        "Unary minus requires INTEGER operand, got {} (line {})",
                        operand_type.name(),
                        line
                    )));
                }
                Ok(SymbolType::Integer)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::parser::Parser;

    fn analyze(source: &str) -> Result<SymbolTable, SemanticError> {
        let tokens = Lexer::tokenize(source).unwrap();
        let program = Parser::new(tokens).parse().unwrap();
        SemanticVisitor::new().analyze(&program)
    }

    #[test]
    fn declaration_infers_type_and_initializes() {
        let table = analyze("var x = 1; var s = \"hi\";").unwrap();
        let x = table.lookup("x").unwrap();
        assert_eq!(x.ty, SymbolType::Integer);
        assert!(x.initialized);
        assert_eq!(table.lookup("s").unwrap().ty, SymbolType::Str);
    }

    #[test]
    fn redeclaration_fails_regardless_of_type() {
        let err = analyze("var x = 1;\nvar x = \"two\";").unwrap_err();
        assert_eq!(err.0, "Variable 'x' already declared at line 2");
    }

    #[test]
    fn assignment_to_undeclared_name_fails() {
        let err = analyze("x = 1;").unwrap_err();
        assert_eq!(err.0, "Variable 'x' not declared (line 1)");
    }

    #[test]
    fn read_of_undeclared_name_fails() {
        let err = analyze("var y = x + 1;").unwrap_err();
        assert_eq!(err.0, "Variable 'x' not declared (line 1)");
    }

    #[test]
    fn assignment_type_mismatch_fails() {
        let err = analyze("var x = 1;\nx = \"text\";").unwrap_err();
        assert_eq!(
            err.0,
            "Type mismatch: 'x' is INTEGER, but expression is STRING (line 2)"
        );
    }

    #[test]
    fn comparison_requires_matching_types() {
        let err = analyze("var x = 1 == \"one\";").unwrap_err();
        assert_eq!(
            err.0,
            "Type mismatch in comparison: INTEGER == STRING (line 1)"
        );
    }

    #[test]
    fn comparison_yields_integer() {
        let table = analyze("var b = 2 < 3;").unwrap();
        assert_eq!(table.lookup("b").unwrap().ty, SymbolType::Integer);
    }

    #[test]
    fn arithmetic_on_strings_fails() {
        let err = analyze("var x = \"a\" + \"b\";").unwrap_err();
        assert_eq!(
            err.0,
            "Arithmetic operation requires INTEGER operands, got STRING and STRING (line 1)"
        );
    }

    #[test]
    fn unary_minus_on_string_fails() {
        let err = analyze("var x = -\"a\";").unwrap_err();
        assert_eq!(err.0, "Unary minus requires INTEGER operand, got STRING (line 1)");
    }

    #[test]
    fn statement_bodies_are_not_analyzed() {
        // `q` is never declared, but the print sits inside a while body,
        // which this stage deliberately skips
        assert!(analyze("var i = 0; while (i < 1) { print q; i = i + 1; }").is_ok());
        assert!(analyze("print q;").is_ok());
    }

    #[test]
    fn pattern_target_is_not_declared_by_analysis() {
        let table = analyze("fibonacci(f, 6);").unwrap();
        assert!(table.lookup("f").is_none());
    }
}
