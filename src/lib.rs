//! This crate provides a single-tape deterministic Turing machine engine.
//! It includes a sparse two-way-infinite tape, a read/write head, the transition table and
//! the machine driver, plus a parser for `.tm` definitions, a static analyzer, a loader and
//! a small library of built-in programs.

pub mod analyzer;
pub mod head;
pub mod loader;
pub mod machine;
pub mod parser;
pub mod programs;
pub mod table;
pub mod tape;
pub mod types;

/// Re-exports the `Rule` enum from the parser module, used by the `pest` grammar.
pub use crate::parser::Rule;
/// Re-exports the `analyze` function and `AnalysisWarning` enum from the analyzer module.
pub use analyzer::{analyze, AnalysisWarning};
/// Re-exports the `Head` struct from the head module.
pub use head::Head;
/// Re-exports the `ProgramLoader` struct from the loader module.
pub use loader::ProgramLoader;
/// Re-exports the `TuringMachine` struct from the machine module.
pub use machine::TuringMachine;
/// Re-exports the `parse` function from the parser module.
pub use parser::parse;
/// Re-exports `ProgramInfo` and `ProgramManager` from the programs module.
pub use programs::{ProgramInfo, ProgramManager};
/// Re-exports the `InstructionTable` struct from the table module.
pub use table::InstructionTable;
/// Re-exports the `Tape` struct from the tape module.
pub use tape::Tape;
/// Re-exports the definition, execution and error types from the types module.
pub use types::{
    Direction, ExecutionResult, HeadStart, Instruction, InstructionKey, Program, Status, Symbol,
    TransitionRule, TuringMachineError, DEFAULT_BLANK_SYMBOL, MAX_PROGRAM_SIZE,
};
