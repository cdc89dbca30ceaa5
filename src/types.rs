//! This module defines the core data structures and types shared by the engine, the parser
//! and the front ends: symbols, directions, instructions, execution snapshots and errors.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::table::InstructionTable;
use crate::tape::Tape;
use crate::Rule;

/// A single tape cell value.
pub type Symbol = char;

/// The default blank symbol used on the tape.
pub const DEFAULT_BLANK_SYMBOL: Symbol = '_';
/// The symbol used in program definitions to denote the machine's blank symbol,
/// whatever character the definition selects as blank.
pub const INPUT_BLANK_SYMBOL: Symbol = '_';
/// The maximum allowed size for a program definition in bytes.
pub const MAX_PROGRAM_SIZE: usize = 65536; // 64KB

/// Represents a machine definition as supplied by a caller or read from a `.tm` file.
///
/// A program holds everything needed to build a fresh [`crate::TuringMachine`]: the finite
/// control and the initial tape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    /// The name of the program.
    pub name: String,
    /// The state the machine starts in.
    pub initial_state: String,
    /// States in which the machine halts, in declaration order.
    pub halting_states: Vec<String>,
    /// The blank symbol of the tape.
    pub blank: Symbol,
    /// Initial tape content, stored in consecutive cells starting at `origin`.
    pub tape: Vec<Symbol>,
    /// Position of the first symbol of `tape`.
    pub origin: i64,
    /// Where the head starts.
    pub head: HeadStart,
    /// Transition rules in declaration order.
    pub rules: Vec<TransitionRule>,
}

impl Program {
    /// Returns the initial tape content as a `String`.
    pub fn initial_tape(&self) -> String {
        self.tape.iter().collect()
    }

    /// Builds the initial sparse tape.
    pub fn tape(&self) -> Tape {
        Tape::from_symbols(self.blank, self.origin, self.tape.iter().copied())
    }

    /// Builds the instruction table from the rules.
    pub fn table(&self) -> InstructionTable {
        InstructionTable::from_rules(self.rules.iter().cloned())
    }

    /// Replaces the initial tape content. `INPUT_BLANK_SYMBOL` stands for the blank symbol.
    pub fn set_input(&mut self, input: &str) {
        self.tape = input
            .chars()
            .map(|c| if c == INPUT_BLANK_SYMBOL { self.blank } else { c })
            .collect();
    }

    /// Checks whether `state` is a halting state of this program.
    pub fn is_halting_state(&self, state: &str) -> bool {
        self.halting_states.iter().any(|s| s == state)
    }
}

/// Represents the possible directions the head can move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Move the head one position to the left.
    Left,
    /// Move the head one position to the right.
    Right,
    /// Keep the head in the same position.
    Stay,
}

impl Direction {
    /// Returns the single-letter direction code (`L`, `R` or `S`).
    pub fn code(self) -> char {
        match self {
            Direction::Left => 'L',
            Direction::Right => 'R',
            Direction::Stay => 'S',
        }
    }
}

impl TryFrom<char> for Direction {
    type Error = TuringMachineError;

    /// Supports `L`/`<` for Left, `R`/`>` for Right and `S`/`-` for Stay.
    fn try_from(code: char) -> Result<Self, Self::Error> {
        match code {
            'L' | '<' => Ok(Direction::Left),
            'R' | '>' => Ok(Direction::Right),
            'S' | '-' => Ok(Direction::Stay),
            other => Err(TuringMachineError::InvalidDirection(other)),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Lookup key of the transition function: the current state and the symbol under the head.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstructionKey {
    pub state: String,
    pub symbol: Symbol,
}

impl InstructionKey {
    pub fn new(state: impl Into<String>, symbol: Symbol) -> Self {
        Self {
            state: state.into(),
            symbol,
        }
    }
}

/// What the machine does once a key matches: write, move, and switch state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    /// The state the machine transitions to.
    pub next_state: String,
    /// The symbol written under the head before moving.
    pub write: Symbol,
    /// The direction the head moves after writing.
    pub direction: Direction,
}

impl Instruction {
    pub fn new(next_state: impl Into<String>, write: Symbol, direction: Direction) -> Self {
        Self {
            next_state: next_state.into(),
            write,
            direction,
        }
    }
}

/// A transition rule as exchanged with callers:
/// `(state, symbol) -> (next_state, write, direction)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRule {
    pub state: String,
    pub read: Symbol,
    pub next_state: String,
    pub write: Symbol,
    pub direction: Direction,
}

impl TransitionRule {
    pub fn new(
        state: impl Into<String>,
        read: Symbol,
        next_state: impl Into<String>,
        write: Symbol,
        direction: Direction,
    ) -> Self {
        Self {
            state: state.into(),
            read,
            next_state: next_state.into(),
            write,
            direction,
        }
    }

    /// Splits the rule into its lookup key and instruction.
    pub fn into_parts(self) -> (InstructionKey, Instruction) {
        (
            InstructionKey::new(self.state, self.read),
            Instruction::new(self.next_state, self.write, self.direction),
        )
    }
}

impl fmt::Display for TransitionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {} -> {}, {}, {}",
            self.state, self.read, self.next_state, self.write, self.direction
        )
    }
}

/// Where the head starts when a machine is built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeadStart {
    /// On the leftmost occupied cell of the tape (0 for an empty tape). Used for fresh runs.
    #[default]
    Leftmost,
    /// Exactly at the given position. Used when rebuilding a machine mid-run.
    At(i64),
}

/// Derived classification of a machine or a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    /// Not halted and a transition is defined for the current configuration.
    Running,
    /// The current state is a halting state.
    Halted,
    /// No transition is defined for the current state and symbol.
    Crashed,
}

impl Status {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Status::Running)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Status::Running => "running",
            Status::Halted => "halted",
            Status::Crashed => "crashed",
        };
        f.write_str(label)
    }
}

/// An immutable read-out of the machine after a step or a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Contiguous rendering of the occupied span of the tape.
    pub tape: String,
    /// The state the machine is in.
    pub state: String,
    /// Whether `state` is one of the halting states.
    pub is_in_final_state: bool,
    /// Whether no transition is defined for the current configuration.
    pub has_crashed: bool,
    /// The head position.
    pub head_position: i64,
}

impl ExecutionResult {
    pub fn status(&self) -> Status {
        if self.is_in_final_state {
            Status::Halted
        } else if self.has_crashed {
            Status::Crashed
        } else {
            Status::Running
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status().is_terminal()
    }
}

impl fmt::Display for ExecutionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} in state {} at head {}: {}",
            self.status(),
            self.state,
            self.head_position,
            self.tape
        )
    }
}

/// Represents various errors that can occur while loading or building a machine.
///
/// A machine running into an undefined transition is not an error; it is reported
/// through [`ExecutionResult::has_crashed`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TuringMachineError {
    /// Indicates a direction code other than `L`, `R` or `S` (or `<`, `>`, `-`).
    #[error("Invalid direction: {0}")]
    InvalidDirection(char),
    /// Indicates an error during the parsing of a program definition.
    #[error("Program parsing error: {0}")]
    ParseError(#[from] Box<pest::error::Error<Rule>>),
    /// Indicates a program definition that parses but is incomplete or inconsistent.
    #[error("Program validation error: {0}")]
    ValidationError(String),
    /// Indicates an error related to reading program files.
    #[error("File error: {0}")]
    FileError(String),
    /// Indicates a lookup of a built-in program that does not exist.
    #[error("Program not found: {0}")]
    ProgramNotFound(String),
}
