use crate::parser::{
    Assignment, Declaration, Expr, ForStmt, IfStmt, PatternStmt, PrintStmt, Program, Stmt,
    UnOpKind, WhileStmt,
};

use super::Instruction;

/// Prefix of generated temporary names. Dead-code elimination keys its
/// retention policy on it.
pub const TEMP_PREFIX: &str = "t";

/// Lowers a validated AST into a flat TAC list. Total: every failure mode
/// is caught by the earlier stages.
#[derive(Debug, Default)]
pub struct IrGenerator {
    instructions: Vec<Instruction>,
    temp_counter: usize,
    label_counter: usize,
}

impl IrGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generate(mut self, program: &Program) -> Vec<Instruction> {
        self.visit_program(program);
        self.instructions
    }

    fn new_temp(&mut self) -> String {
        let temp = format!("{}{}", TEMP_PREFIX, self.temp_counter);
        self.temp_counter += 1;
        temp
    }

    fn new_label(&mut self) -> String {
        let label = format!("L{}", self.label_counter);
        self.label_counter += 1;
        label
    }

    fn emit(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }

    fn visit_program(&mut self, program: &Program) {
        for stmt in &program.statements {
            self.visit_statement(stmt);
        }
    }

    fn visit_statement(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Declaration(node) => self.visit_declaration(node),
            Stmt::Assignment(node) => self.visit_assignment(node),
            Stmt::Print(node) => self.visit_print(node),
            Stmt::If(node) => self.visit_if(node),
            Stmt::While(node) => self.visit_while(node),
            Stmt::For(node) => self.visit_for(node),
            Stmt::Pattern(node) => self.visit_pattern(node),
        }
    }

    fn visit_declaration(&mut self, node: &Declaration) {
        let src = self.visit_expression(&node.value);
        self.emit(Instruction::Assign {
            src,
            dest: node.name.clone(),
        });
    }

    fn visit_assignment(&mut self, node: &Assignment) {
        let src = self.visit_expression(&node.value);
        self.emit(Instruction::Assign {
            src,
            dest: node.name.clone(),
        });
    }

    fn visit_print(&mut self, node: &PrintStmt) {
        let value = self.visit_expression(&node.value);
        self.emit(Instruction::Print { value });
    }

    /// ```text
    /// if_false cond, else|end
    /// <then>
    /// goto end       (only with an else branch)
    /// label else     (only with an else branch)
    /// <else>
    /// label end
    /// ```
    fn visit_if(&mut self, node: &IfStmt) {
        let cond = self.visit_expression(&node.condition);
        // a label pair is allocated even when there is no else branch
        let else_label = self.new_label();
        let end_label = self.new_label();

        let target = if node.else_block.is_some() {
            else_label.clone()
        } else {
            end_label.clone()
        };
        self.emit(Instruction::IfFalse { cond, target });

        for stmt in &node.then_block {
            self.visit_statement(stmt);
        }

        if let Some(else_block) = &node.else_block {
            self.emit(Instruction::Goto(end_label.clone()));
            self.emit(Instruction::Label(else_label));
            for stmt in else_block {
                self.visit_statement(stmt);
            }
        }

        self.emit(Instruction::Label(end_label));
    }

    /// ```text
    /// label start
    /// if_false cond, end
    /// <body>
    /// goto start
    /// label end
    /// ```
    fn visit_while(&mut self, node: &WhileStmt) {
        let start_label = self.new_label();
        let end_label = self.new_label();

        // the condition is evaluated after the loop label so each iteration
        // recomputes it
        self.emit(Instruction::Label(start_label.clone()));
        let cond = self.visit_expression(&node.condition);
        self.emit(Instruction::IfFalse {
            cond,
            target: end_label.clone(),
        });

        for stmt in &node.block {
            self.visit_statement(stmt);
        }

        self.emit(Instruction::Goto(start_label));
        self.emit(Instruction::Label(end_label));
    }

    /// Lowers to the `while` shape with the init assignment hoisted before
    /// the loop label and the update appended before the back-edge.
    fn visit_for(&mut self, node: &ForStmt) {
        let start_label = self.new_label();
        let end_label = self.new_label();

        self.visit_assignment(&node.init);

        self.emit(Instruction::Label(start_label.clone()));
        let cond = self.visit_expression(&node.condition);
        self.emit(Instruction::IfFalse {
            cond,
            target: end_label.clone(),
        });

        for stmt in &node.block {
            self.visit_statement(stmt);
        }

        self.visit_assignment(&node.update);
        self.emit(Instruction::Goto(start_label));
        self.emit(Instruction::Label(end_label));
    }

    fn visit_pattern(&mut self, node: &PatternStmt) {
        let args = node
            .args
            .iter()
            .map(|arg| self.visit_expression(arg))
            .collect();
        self.emit(Instruction::Pattern {
            kind: node.kind,
            args,
            dest: node.target.clone(),
        });
    }

    /// Returns the operand naming the expression's value: a literal for
    /// leaves, a fresh temporary for operator nodes.
    fn visit_expression(&mut self, expr: &Expr) -> String {
        match expr {
            Expr::Identifier { name, .. } => name.clone(),
            Expr::Integer { value, .. } => value.to_string(),
            Expr::Str { value, .. } => format!("\"{}\"", value),
            Expr::Binary {
                op, left, right, ..
            } => {
                let lhs = self.visit_expression(left);
                let rhs = self.visit_expression(right);
                let dest = self.new_temp();
                self.emit(Instruction::Binary {
                    op: (*op).into(),
                    lhs,
                    rhs,
                    dest: dest.clone(),
                });
                dest
            }
            Expr::Unary {
                op: UnOpKind::Neg,
                operand,
                ..
            } => {
                let src = self.visit_expression(operand);
                let dest = self.new_temp();
                self.emit(Instruction::Neg {
                    src,
                    dest: dest.clone(),
                });
                dest
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::BinOp;
    use crate::lexer::Lexer;
    use crate::parser::{Parser, PatternKind};

    fn generate(source: &str) -> Vec<Instruction> {
        let tokens = Lexer::tokenize(source).unwrap();
        let program = Parser::new(tokens).parse().unwrap();
        IrGenerator::new().generate(&program)
    }

    #[test]
    fn declaration_lowers_through_a_temp() {
        assert_eq!(
            generate("var x = 2 + 3;"),
            vec![
                Instruction::Binary {
                    op: BinOp::Add,
                    lhs: "2".into(),
                    rhs: "3".into(),
                    dest: "t0".into(),
                },
                Instruction::Assign {
                    src: "t0".into(),
                    dest: "x".into(),
                },
            ]
        );
    }

    #[test]
    fn if_without_else_jumps_to_the_end_label() {
        let tac = generate("var x = 1; if (x < 2) { print x; }");
        // the else label L0 is allocated but unused; the guard targets L1
        assert!(tac.contains(&Instruction::IfFalse {
            cond: "t0".into(),
            target: "L1".into(),
        }));
        assert_eq!(tac.last(), Some(&Instruction::Label("L1".into())));
    }

    #[test]
    fn if_else_shape() {
        let tac = generate("var x = 1; if (x < 2) { print 1; } else { print 2; }");
        assert_eq!(
            tac[2..],
            [
                Instruction::IfFalse {
                    cond: "t0".into(),
                    target: "L0".into(),
                },
                Instruction::Print { value: "1".into() },
                Instruction::Goto("L1".into()),
                Instruction::Label("L0".into()),
                Instruction::Print { value: "2".into() },
                Instruction::Label("L1".into()),
            ]
        );
    }

    #[test]
    fn while_reevaluates_its_condition_inside_the_loop() {
        let tac = generate("var i = 0; while (i < 3) { i = i + 1; }");
        assert_eq!(
            tac,
            vec![
                Instruction::Assign {
                    src: "0".into(),
                    dest: "i".into(),
                },
                Instruction::Label("L0".into()),
                Instruction::Binary {
                    op: BinOp::Lt,
                    lhs: "i".into(),
                    rhs: "3".into(),
                    dest: "t0".into(),
                },
                Instruction::IfFalse {
                    cond: "t0".into(),
                    target: "L1".into(),
                },
                Instruction::Binary {
                    op: BinOp::Add,
                    lhs: "i".into(),
                    rhs: "1".into(),
                    dest: "t1".into(),
                },
                Instruction::Assign {
                    src: "t1".into(),
                    dest: "i".into(),
                },
                Instruction::Goto("L0".into()),
                Instruction::Label("L1".into()),
            ]
        );
    }

    #[test]
    fn for_hoists_init_and_appends_update() {
        let tac = generate("for (i = 0; i < 2; i = i + 1) { print i; }");
        assert_eq!(
            tac[0],
            Instruction::Assign {
                src: "0".into(),
                dest: "i".into(),
            }
        );
        assert_eq!(tac[1], Instruction::Label("L0".into()));
        // update lands right before the back-edge
        let goto_at = tac
            .iter()
            .position(|i| *i == Instruction::Goto("L0".into()))
            .unwrap();
        assert_eq!(
            tac[goto_at - 1],
            Instruction::Assign {
                src: "t1".into(),
                dest: "i".into(),
            }
        );
    }

    #[test]
    fn pattern_keeps_an_ordered_argument_list() {
        let tac = generate("sequence(s, 5, 3 * 2);");
        assert_eq!(
            tac,
            vec![
                Instruction::Binary {
                    op: BinOp::Mul,
                    lhs: "3".into(),
                    rhs: "2".into(),
                    dest: "t0".into(),
                },
                Instruction::Pattern {
                    kind: PatternKind::Sequence,
                    args: vec!["5".into(), "t0".into()],
                    dest: "s".into(),
                },
            ]
        );
    }

    #[test]
    fn string_operands_keep_their_quotes() {
        assert_eq!(
            generate("print \"hi\";"),
            vec![Instruction::Print {
                value: "\"hi\"".into(),
            }]
        );
    }
}
