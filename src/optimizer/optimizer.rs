use std::collections::{HashMap, HashSet};

use crate::ir::{floor_div, floor_mod, BinOp, Instruction, TEMP_PREFIX};

/// Two-pass TAC optimizer: a single forward constant-folding sweep followed
/// by one round of dead-code elimination. Folding is straight-line only:
/// every label is a join point (loop heads receive their back-edge there),
/// so named bindings are dropped when one is crossed. Temporaries are
/// written exactly once by the generator and keep their bindings.
#[derive(Debug, Default)]
pub struct Optimizer {
    constants: HashMap<String, i64>,
    used_vars: HashSet<String>,
}

impl Optimizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn optimize(mut self, instructions: Vec<Instruction>) -> Vec<Instruction> {
        let folded = self.constant_folding(instructions);
        self.dead_code_elimination(folded)
    }

    /// Replaces operator instructions whose operands are all known integers
    /// with plain constant assignments. Jumps, prints, and pattern calls
    /// pass through untouched and do not disturb the constant map; a label
    /// drops every non-temporary binding, since a jump entering there can
    /// carry different values than the fallthrough path.
    fn constant_folding(&mut self, instructions: Vec<Instruction>) -> Vec<Instruction> {
        self.constants.clear();
        let mut optimized = Vec::with_capacity(instructions.len());

        for instr in instructions {
            match instr {
                Instruction::Binary {
                    op,
                    ref lhs,
                    ref rhs,
                    ref dest,
                } => match self.fold_binary(op, lhs, rhs) {
                    Some(result) => {
                        self.constants.insert(dest.clone(), result);
                        optimized.push(Instruction::Assign {
                            src: result.to_string(),
                            dest: dest.clone(),
                        });
                    }
                    None => optimized.push(instr),
                },
                Instruction::Neg { ref src, ref dest } => {
                    match self.constant_value(src).and_then(i64::checked_neg) {
                        Some(result) => {
                            self.constants.insert(dest.clone(), result);
                            optimized.push(Instruction::Assign {
                                src: result.to_string(),
                                dest: dest.clone(),
                            });
                        }
                        None => optimized.push(instr),
                    }
                }
                Instruction::Label(_) => {
                    self.constants.retain(|name, _| name.starts_with(TEMP_PREFIX));
                    optimized.push(instr);
                }
                Instruction::Assign { ref src, ref dest } => {
                    match self.constant_value(src) {
                        Some(value) => {
                            self.constants.insert(dest.clone(), value);
                        }
                        None => {
                            self.constants.remove(dest);
                        }
                    }
                    optimized.push(instr);
                }
                _ => optimized.push(instr),
            }
        }

        optimized
    }

    /// Evaluates `lhs op rhs` when both operands resolve to integers.
    /// Division and modulo by a known zero stay unfolded so the fault
    /// surfaces at run time, as does any overflowing computation.
    fn fold_binary(&self, op: BinOp, lhs: &str, rhs: &str) -> Option<i64> {
        let lhs = self.constant_value(lhs)?;
        let rhs = self.constant_value(rhs)?;

        match op {
            BinOp::Add => lhs.checked_add(rhs),
            BinOp::Sub => lhs.checked_sub(rhs),
            BinOp::Mul => lhs.checked_mul(rhs),
            BinOp::Div => (rhs != 0).then(|| floor_div(lhs, rhs)),
            BinOp::Mod => (rhs != 0).then(|| floor_mod(lhs, rhs)),
            BinOp::Eq => Some((lhs == rhs) as i64),
            BinOp::Ne => Some((lhs != rhs) as i64),
            BinOp::Lt => Some((lhs < rhs) as i64),
            BinOp::Gt => Some((lhs > rhs) as i64),
            BinOp::Le => Some((lhs <= rhs) as i64),
            BinOp::Ge => Some((lhs >= rhs) as i64),
        }
    }

    /// An operand is constant if it is an integer literal or a name the
    /// folding sweep has already pinned to one.
    fn constant_value(&self, operand: &str) -> Option<i64> {
        match operand.parse::<i64>() {
            Ok(value) => Some(value),
            Err(_) => self.constants.get(operand).copied(),
        }
    }

    /// Drops assignments and operator instructions whose destination is
    /// never read. Control flow, prints, and pattern calls always survive,
    /// and so does every temporary assignment.
    fn dead_code_elimination(&mut self, instructions: Vec<Instruction>) -> Vec<Instruction> {
        self.used_vars.clear();

        for instr in instructions.iter().rev() {
            match instr {
                Instruction::Print { value } => {
                    self.used_vars.insert(value.clone());
                }
                Instruction::IfFalse { cond, .. } => {
                    self.used_vars.insert(cond.clone());
                }
                Instruction::Pattern { args, dest, .. } => {
                    self.used_vars.insert(dest.clone());
                    for arg in args {
                        if arg.parse::<i64>().is_err() {
                            self.used_vars.insert(arg.clone());
                        }
                    }
                }
                // operator operands count as used whether or not the
                // destination itself is
                Instruction::Binary { lhs, rhs, .. } => {
                    self.used_vars.insert(lhs.clone());
                    self.used_vars.insert(rhs.clone());
                }
                Instruction::Neg { src, .. } => {
                    self.used_vars.insert(src.clone());
                }
                Instruction::Assign { src, dest } => {
                    if self.used_vars.contains(dest) {
                        self.used_vars.insert(src.clone());
                    }
                }
                Instruction::Label(_) | Instruction::Goto(_) => {}
            }
        }

        instructions
            .into_iter()
            .filter(|instr| match instr {
                Instruction::Label(_)
                | Instruction::Goto(_)
                | Instruction::IfFalse { .. }
                | Instruction::Print { .. }
                | Instruction::Pattern { .. } => true,
                Instruction::Assign { dest, .. } => {
                    self.used_vars.contains(dest) || dest.starts_with(TEMP_PREFIX)
                }
                Instruction::Binary { dest, .. } | Instruction::Neg { dest, .. } => {
                    self.used_vars.contains(dest)
                }
            })
            .collect()
    }
}
