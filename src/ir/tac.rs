use std::fmt;

use crate::parser::{BinOpKind, PatternKind};

/// Binary TAC opcodes. Comparisons yield 1 or 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

impl BinOp {
    pub fn mnemonic(self) -> &'static str {
        match self {
            BinOp::Add => "add",
            BinOp::Sub => "sub",
            BinOp::Mul => "mul",
            BinOp::Div => "div",
            BinOp::Mod => "mod",
            BinOp::Eq => "eq",
            BinOp::Ne => "ne",
            BinOp::Lt => "lt",
            BinOp::Gt => "gt",
            BinOp::Le => "le",
            BinOp::Ge => "ge",
        }
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge
        )
    }
}

impl From<BinOpKind> for BinOp {
    fn from(op: BinOpKind) -> Self {
        match op {
            BinOpKind::Add => BinOp::Add,
            BinOpKind::Sub => BinOp::Sub,
            BinOpKind::Mul => BinOp::Mul,
            BinOpKind::Div => BinOp::Div,
            BinOpKind::Mod => BinOp::Mod,
            BinOpKind::Equal => BinOp::Eq,
            BinOpKind::NotEqual => BinOp::Ne,
            BinOpKind::LessThan => BinOp::Lt,
            BinOpKind::GreaterThan => BinOp::Gt,
            BinOpKind::LessEqual => BinOp::Le,
            BinOpKind::GreaterEqual => BinOp::Ge,
        }
    }
}

/// Flooring division, matching `div`'s semantics: the quotient rounds
/// toward negative infinity. Callers rule out a zero divisor first.
pub fn floor_div(lhs: i64, rhs: i64) -> i64 {
    let quotient = lhs / rhs;
    if lhs % rhs != 0 && (lhs < 0) != (rhs < 0) {
        quotient - 1
    } else {
        quotient
    }
}

/// Flooring remainder, matching `mod`'s semantics: the result takes the
/// sign of the divisor. Callers rule out a zero divisor first.
pub fn floor_mod(lhs: i64, rhs: i64) -> i64 {
    let remainder = lhs % rhs;
    if remainder != 0 && (remainder < 0) != (rhs < 0) {
        remainder + rhs
    } else {
        remainder
    }
}

/// One three-address instruction. Operands are textual: an integer literal,
/// a double-quoted string literal, or a name resolved against the store at
/// execution time.
#[derive(Clone, Debug, PartialEq)]
pub enum Instruction {
    /// `dest = src`
    Assign { src: String, dest: String },
    /// `dest = lhs op rhs`
    Binary {
        op: BinOp,
        lhs: String,
        rhs: String,
        dest: String,
    },
    /// `dest = -src`
    Neg { src: String, dest: String },
    Print { value: String },
    /// Jump target marker; a no-op when executed.
    Label(String),
    Goto(String),
    /// Jumps to `target` when `cond` is integer zero.
    IfFalse { cond: String, target: String },
    /// `dest = kind(args...)` — one of the sequence intrinsics.
    Pattern {
        kind: PatternKind,
        args: Vec<String>,
        dest: String,
    },
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Assign { src, dest } => write!(f, "{} = {}", dest, src),
            Instruction::Binary { op, lhs, rhs, dest } => {
                write!(f, "{} = {} {} {}", dest, lhs, op.mnemonic(), rhs)
            }
            Instruction::Neg { src, dest } => write!(f, "{} = neg {}", dest, src),
            Instruction::Print { value } => write!(f, "print {}", value),
            Instruction::Label(name) => write!(f, "label {}", name),
            Instruction::Goto(target) => write!(f, "goto {}", target),
            Instruction::IfFalse { cond, target } => write!(f, "if_false {} goto {}", cond, target),
            Instruction::Pattern { kind, args, dest } => {
                write!(f, "{} = {} {}", dest, kind.name(), args.join(", "))
            }
        }
    }
}
