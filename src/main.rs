use std::io::{self, BufRead};
use std::process::ExitCode;

use clap::Parser;
use clap_stdin::FileOrStdin;

use pscc::analyzer::SemanticVisitor;
use pscc::interpreter::Interpreter;
use pscc::ir::IrGenerator;
use pscc::lexer::Lexer;
use pscc::optimizer::Optimizer;
use pscc::CompileError;

#[derive(Parser)]
#[command(about = "PatternScript compiler and interpreter")]
struct Args {
    /// Source file, or `-` to read from stdin
    #[arg(required_unless_present = "interactive")]
    source: Option<FileOrStdin>,

    /// Print the six-phase compilation walkthrough
    #[arg(short, long)]
    verbose: bool,

    /// Read the program from stdin until a line containing END
    #[arg(short, long)]
    interactive: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let source = if args.interactive {
        match read_interactive() {
            Ok(source) => source,
            Err(err) => {
                eprintln!("Error reading input: {}", err);
                return ExitCode::FAILURE;
            }
        }
    } else {
        let Some(input) = args.source else {
            eprintln!("No source given");
            return ExitCode::FAILURE;
        };
        match input.contents() {
            Ok(source) => source,
            Err(err) => {
                eprintln!("Error reading file: {}", err);
                return ExitCode::FAILURE;
            }
        }
    };

    let result = if args.verbose {
        compile_verbose(&source)
    } else {
        pscc::compile(&source).map(|output| {
            for line in &output {
                println!("{}", line);
            }
        })
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}

fn read_interactive() -> io::Result<String> {
    println!("PatternScript Compiler - Interactive Mode");
    println!("Enter your code (type 'END' on a new line to compile):");
    println!("{}", "-".repeat(60));

    let mut lines = Vec::new();
    for line in io::stdin().lock().lines() {
        let line = line?;
        if line.trim().eq_ignore_ascii_case("END") {
            break;
        }
        lines.push(line);
    }
    Ok(lines.join("\n"))
}

/// Runs the pipeline phase by phase, dumping each phase's result the way
/// exploratory compiler work wants to see it.
fn compile_verbose(source: &str) -> Result<(), CompileError> {
    banner("PHASE 1: LEXICAL ANALYSIS");
    let tokens = Lexer::tokenize(source)?;
    println!("Generated {} tokens", tokens.len());
    for token in tokens.iter().take(20) {
        println!("  {:?}", token);
    }
    if tokens.len() > 20 {
        println!("  ... and {} more tokens", tokens.len() - 20);
    }
    println!();

    banner("PHASE 2: SYNTAX ANALYSIS");
    let program = pscc::parser::Parser::new(tokens).parse()?;
    println!("Number of statements: {}", program.statements.len());
    println!();

    banner("PHASE 3: SEMANTIC ANALYSIS");
    let symbol_table = SemanticVisitor::new().analyze(&program)?;
    println!("Symbol Table:");
    for symbol in symbol_table.all_symbols() {
        println!(
            "  {}: {} (declared={}, initialized={})",
            symbol.name,
            symbol.ty.name(),
            symbol.declared,
            symbol.initialized
        );
    }
    println!();

    banner("PHASE 4: INTERMEDIATE CODE GENERATION");
    let tac = IrGenerator::new().generate(&program);
    println!("Three-Address Code (TAC):");
    for (i, instr) in tac.iter().enumerate() {
        println!("  {:3}: {}", i, instr);
    }
    println!();

    banner("PHASE 5: OPTIMIZATION");
    let optimized = Optimizer::new().optimize(tac.clone());
    println!("Optimized Three-Address Code:");
    for (i, instr) in optimized.iter().enumerate() {
        println!("  {:3}: {}", i, instr);
    }
    println!(
        "Reduced from {} to {} instructions",
        tac.len(),
        optimized.len()
    );
    println!();

    banner("PHASE 6: CODE GENERATION");
    let output = Interpreter::new().run(&optimized)?;
    println!("Execution Output:");
    for line in &output {
        println!("  {}", line);
    }
    println!();

    Ok(())
}

fn banner(title: &str) {
    println!("{}", "=".repeat(60));
    println!("{}", title);
    println!("{}", "=".repeat(60));
}
