mod generator;
mod tac;

pub use generator::*;
pub use tac::*;
