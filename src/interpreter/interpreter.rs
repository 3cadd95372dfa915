use std::collections::HashMap;

use thiserror::Error;

use crate::ir::{floor_div, floor_mod, BinOp, Instruction};
use crate::parser::PatternKind;

use super::Value;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct RuntimeError(pub String);

/// Executes an optimized TAC listing and collects everything `print`
/// produces. A fault aborts the run; the caller never sees partial output.
#[derive(Debug, Default)]
pub struct Interpreter {
    memory: HashMap<String, Value>,
    output: Vec<String>,
    pc: usize,
    labels: HashMap<String, usize>,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn run(mut self, instructions: &[Instruction]) -> Result<Vec<String>, RuntimeError> {
        for (index, instr) in instructions.iter().enumerate() {
            if let Instruction::Label(name) = instr {
                self.labels.insert(name.clone(), index);
            }
        }

        // jumps set pc to the label's own index; the increment then lands
        // on its successor, labels being no-ops
        while self.pc < instructions.len() {
            self.execute(&instructions[self.pc])?;
            self.pc += 1;
        }

        Ok(self.output)
    }

    fn execute(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        match instr {
            Instruction::Assign { src, dest } => {
                let value = self.resolve(src);
                self.memory.insert(dest.clone(), value);
            }
            Instruction::Binary { op, lhs, rhs, dest } => {
                let lhs = self.resolve(lhs);
                let rhs = self.resolve(rhs);
                let result = self.apply_binary(*op, lhs, rhs)?;
                self.memory.insert(dest.clone(), result);
            }
            Instruction::Neg { src, dest } => match self.resolve(src) {
                Value::Int(n) => {
                    self.memory.insert(dest.clone(), Value::Int(n.wrapping_neg()));
                }
                value => {
                    return Err(RuntimeError(format!("Invalid operand for 'neg': {}", value)));
                }
            },
            Instruction::Print { value } => {
                let value = self.resolve(value);
                self.output.push(value.to_string());
            }
            Instruction::Label(_) => {}
            Instruction::Goto(target) => {
                self.pc = self.label_index(target)?;
            }
            Instruction::IfFalse { cond, target } => {
                if self.resolve(cond) == Value::Int(0) {
                    self.pc = self.label_index(target)?;
                }
            }
            Instruction::Pattern { kind, args, dest } => {
                let result = self.run_pattern(*kind, args)?;
                self.memory.insert(dest.clone(), result);
            }
        }
        Ok(())
    }

    fn apply_binary(&self, op: BinOp, lhs: Value, rhs: Value) -> Result<Value, RuntimeError> {
        match op {
            // addition doubles as concatenation; analysis never reaches
            // operands inside print statements or block bodies, so string
            // and sequence operands are observable here
            BinOp::Add => match (lhs, rhs) {
                (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a.wrapping_add(b))),
                (Value::Str(a), Value::Str(b)) => Ok(Value::Str(a + &b)),
                (Value::Seq(mut a), Value::Seq(b)) => {
                    a.extend(b);
                    Ok(Value::Seq(a))
                }
                (lhs, rhs) => Err(invalid_operands(op, &lhs, &rhs)),
            },
            BinOp::Sub => match (lhs, rhs) {
                (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a.wrapping_sub(b))),
                (lhs, rhs) => Err(invalid_operands(op, &lhs, &rhs)),
            },
            BinOp::Mul => match (lhs, rhs) {
                (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a.wrapping_mul(b))),
                (lhs, rhs) => Err(invalid_operands(op, &lhs, &rhs)),
            },
            BinOp::Div => match (lhs, rhs) {
                (_, Value::Int(0)) => Err(RuntimeError("Division by zero".to_string())),
                (Value::Int(a), Value::Int(b)) => Ok(Value::Int(floor_div(a, b))),
                (lhs, rhs) => Err(invalid_operands(op, &lhs, &rhs)),
            },
            BinOp::Mod => match (lhs, rhs) {
                (_, Value::Int(0)) => Err(RuntimeError("Modulo by zero".to_string())),
                (Value::Int(a), Value::Int(b)) => Ok(Value::Int(floor_mod(a, b))),
                (lhs, rhs) => Err(invalid_operands(op, &lhs, &rhs)),
            },
            // equality is structural across all value kinds
            BinOp::Eq => Ok(Value::Int((lhs == rhs) as i64)),
            BinOp::Ne => Ok(Value::Int((lhs != rhs) as i64)),
            BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge => {
                let ordering = match (&lhs, &rhs) {
                    (Value::Int(a), Value::Int(b)) => a.cmp(b),
                    (Value::Str(a), Value::Str(b)) => a.cmp(b),
                    (Value::Seq(a), Value::Seq(b)) => a.cmp(b),
                    _ => return Err(invalid_operands(op, &lhs, &rhs)),
                };
                let truth = match op {
                    BinOp::Lt => ordering.is_lt(),
                    BinOp::Gt => ordering.is_gt(),
                    BinOp::Le => ordering.is_le(),
                    _ => ordering.is_ge(),
                };
                Ok(Value::Int(truth as i64))
            }
        }
    }

    fn run_pattern(&self, kind: PatternKind, args: &[String]) -> Result<Value, RuntimeError> {
        match kind {
            PatternKind::Fibonacci => {
                let n = self.int_arg(kind, args, 0)?;
                Ok(Value::Seq(fibonacci(n)))
            }
            PatternKind::Factorial => {
                let n = self.int_arg(kind, args, 0)?;
                Ok(Value::Int(factorial(n)))
            }
            PatternKind::Sequence => {
                let start = self.int_arg(kind, args, 0)?;
                let step = self.int_arg(kind, args, 1)?;
                Ok(Value::Seq(arithmetic_sequence(start, step)))
            }
        }
    }

    /// Resolves the intrinsic's argument at `index` to an integer. Numeric
    /// strings coerce; anything else is a fault.
    fn int_arg(&self, kind: PatternKind, args: &[String], index: usize) -> Result<i64, RuntimeError> {
        let arg = args.get(index).ok_or_else(|| {
            let required = match kind {
                PatternKind::Sequence => "2 arguments",
                _ => "1 argument",
            };
            RuntimeError(format!("{} requires {}", kind.name(), required))
        })?;

        match self.resolve(arg) {
            Value::Int(n) => Ok(n),
            Value::Str(s) => s.parse().map_err(|_| {
                RuntimeError(format!("Invalid argument to {}: {}", kind.name(), s))
            }),
            value => Err(RuntimeError(format!(
                "Invalid argument to {}: {}",
                kind.name(),
                value
            ))),
        }
    }

    /// Operand resolution: integer literal, then quoted string literal,
    /// then store lookup. An operand that misses the store resolves to its
    /// own spelling as a string. That last step looks like a bug but it is
    /// observable behavior: analysis skips print statements and block
    /// bodies, so undeclared names can reach execution.
    fn resolve(&self, operand: &str) -> Value {
        if let Ok(n) = operand.parse::<i64>() {
            return Value::Int(n);
        }
        if operand.len() >= 2 && operand.starts_with('"') && operand.ends_with('"') {
            return Value::Str(operand[1..operand.len() - 1].to_string());
        }
        match self.memory.get(operand) {
            Some(value) => value.clone(),
            None => Value::Str(operand.to_string()),
        }
    }

    fn label_index(&self, name: &str) -> Result<usize, RuntimeError> {
        self.labels
            .get(name)
            .copied()
            .ok_or_else(|| RuntimeError(format!("Label '{}' not found", name)))
    }
}

fn invalid_operands(op: BinOp, lhs: &Value, rhs: &Value) -> RuntimeError {
    RuntimeError(format!(
        "Invalid operands for '{}': {} and {}",
        op.mnemonic(),
        lhs,
        rhs
    ))
}

/// The first n Fibonacci numbers, starting 0, 1.
fn fibonacci(n: i64) -> Vec<i64> {
    if n <= 0 {
        return Vec::new();
    }
    if n == 1 {
        return vec![0];
    }
    let mut fib: Vec<i64> = vec![0, 1];
    for i in 2..n as usize {
        let next = fib[i - 1].wrapping_add(fib[i - 2]);
        fib.push(next);
    }
    fib
}

/// Factorial with the clamped edges of the source language: negative
/// input yields 0, zero and one yield 1.
fn factorial(n: i64) -> i64 {
    if n < 0 {
        return 0;
    }
    let mut result: i64 = 1;
    for i in 2..=n {
        result = result.wrapping_mul(i);
    }
    result
}

/// Ten-element arithmetic progression from `start` with stride `step`.
fn arithmetic_sequence(start: i64, step: i64) -> Vec<i64> {
    (0i64..10)
        .map(|i| start.wrapping_add(i.wrapping_mul(step)))
        .collect()
}
