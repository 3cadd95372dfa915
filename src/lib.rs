pub mod analyzer;
pub mod interpreter;
pub mod ir;
pub mod lexer;
pub mod optimizer;
pub mod parser;

use thiserror::Error;

use analyzer::{SemanticError, SemanticVisitor};
use interpreter::{Interpreter, RuntimeError};
use ir::IrGenerator;
use lexer::{Lexer, LexicalError};
use optimizer::Optimizer;
use parser::{Parser, SyntaxError};

/// Any failure the pipeline can surface, from the first bad character to a
/// fault during execution.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum CompileError {
    #[error(transparent)]
    Lexical(#[from] LexicalError),
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error("Semantic error: {0}")]
    Semantic(#[from] SemanticError),
    #[error("Runtime error: {0}")]
    Runtime(#[from] RuntimeError),
}

/// Runs a source program through all six phases and returns what it
/// printed. A failure in any phase aborts the pipeline; a run that faults
/// yields no output at all.
pub fn compile(source: &str) -> Result<Vec<String>, CompileError> {
    let tokens = Lexer::tokenize(source)?;
    let program = Parser::new(tokens).parse()?;
    SemanticVisitor::new().analyze(&program)?;
    let tac = IrGenerator::new().generate(&program);
    let optimized = Optimizer::new().optimize(tac);
    let output = Interpreter::new().run(&optimized)?;
    Ok(output)
}
