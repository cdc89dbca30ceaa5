//! This module defines the `TuringMachine` struct, which drives a single-tape deterministic
//! Turing machine. It holds the finite control (current state, halting states, transition
//! table) and the head bound to its tape, and executes one step at a time or to completion.

use crate::head::Head;
use crate::table::InstructionTable;
use crate::tape::Tape;
use crate::types::{ExecutionResult, HeadStart, Instruction, Program, Status, Symbol};
use log::{debug, trace};
use std::collections::HashSet;

/// Represents a single-tape Turing Machine.
///
/// The machine's status is never stored. It is derived on demand from the current state,
/// the halting states and the transition table.
#[derive(Debug, Clone)]
pub struct TuringMachine {
    state: String,
    halting_states: HashSet<String>,
    table: InstructionTable,
    head: Head,
    step_count: usize,
}

/// What a single application of the transition function did.
enum Advance {
    Halted,
    Crashed,
    Moved,
}

impl TuringMachine {
    /// Creates a new `TuringMachine`.
    ///
    /// # Arguments
    ///
    /// * `initial_state` - The state the machine starts in. It may already be a halting state.
    /// * `halting_states` - States in which execution ends successfully.
    /// * `table` - The transition function.
    /// * `tape` - The initial tape. The machine takes exclusive ownership of it.
    /// * `head_start` - [`HeadStart::Leftmost`] for a fresh run, or [`HeadStart::At`] to
    ///   continue from a known position when rebuilding a machine mid-run.
    pub fn new<I, S>(
        initial_state: impl Into<String>,
        halting_states: I,
        table: InstructionTable,
        tape: Tape,
        head_start: HeadStart,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let position = match head_start {
            HeadStart::Leftmost => tape.leftmost_occupied_position(),
            HeadStart::At(position) => position,
        };

        let machine = Self {
            state: initial_state.into(),
            halting_states: halting_states.into_iter().map(Into::into).collect(),
            table,
            head: Head::new(tape, position),
            step_count: 0,
        };

        debug!(
            "machine built in state {} with head at {} ({} instructions)",
            machine.state,
            position,
            machine.table.len()
        );

        machine
    }

    /// Creates a fresh machine from a `Program`, starting in its initial state.
    pub fn from_program(program: &Program) -> Self {
        Self::new(
            program.initial_state.as_str(),
            &program.halting_states,
            program.table(),
            program.tape(),
            program.head,
        )
    }

    /// Rebuilds a machine from a (possibly edited) `Program` so that execution continues
    /// in `state` with the head at `head_position`, instead of restarting from the
    /// program's initial state and head placement.
    pub fn resume(program: &Program, state: &str, head_position: i64) -> Self {
        Self::new(
            state,
            &program.halting_states,
            program.table(),
            program.tape(),
            HeadStart::At(head_position),
        )
    }

    /// Executes a single step.
    ///
    /// If the machine is in a halting state, or no transition is defined for the current
    /// state and symbol, nothing is mutated and the terminal snapshot is returned again.
    /// Otherwise the instruction is applied and the snapshot reflects the new state.
    pub fn step(&mut self) -> ExecutionResult {
        let advance = self.advance();
        self.execution_result(matches!(advance, Advance::Crashed))
    }

    /// Runs the machine until it reaches a halting state or an undefined transition.
    ///
    /// Equivalent to calling [`step`](Self::step) until it reports a terminal status and
    /// keeping the last result. There is no step limit: a machine that never halts or
    /// crashes runs forever. Callers wanting a budget should loop on `step` themselves.
    pub fn execute(&mut self) -> ExecutionResult {
        loop {
            match self.advance() {
                Advance::Moved => continue,
                Advance::Halted => {
                    debug!(
                        "machine halted in state {} after {} steps",
                        self.state, self.step_count
                    );
                    return self.execution_result(false);
                }
                Advance::Crashed => return self.execution_result(true),
            }
        }
    }

    /// Applies the transition function once.
    fn advance(&mut self) -> Advance {
        if self.is_in_final_state() {
            return Advance::Halted;
        }

        let symbol = self.head.read();
        let Some(instruction) = self.table.lookup(&self.state, symbol) else {
            debug!(
                "machine crashed: no transition for state {} reading {:?} at {}",
                self.state,
                symbol,
                self.head.position()
            );
            return Advance::Crashed;
        };

        trace!(
            "step {}: ({}, {:?}) at {} -> ({}, {:?}, {})",
            self.step_count + 1,
            self.state,
            symbol,
            self.head.position(),
            instruction.next_state,
            instruction.write,
            instruction.direction
        );

        self.head.write(instruction.write);
        self.head.move_to(instruction.direction);
        self.state.clone_from(&instruction.next_state);
        self.step_count += 1;

        Advance::Moved
    }

    fn execution_result(&self, has_crashed: bool) -> ExecutionResult {
        ExecutionResult {
            tape: self.head.tape().render(),
            state: self.state.clone(),
            is_in_final_state: self.is_in_final_state(),
            has_crashed,
            head_position: self.head.position(),
        }
    }

    /// Returns a snapshot of the machine as it is now.
    ///
    /// Unlike the result of [`step`](Self::step), which reports a crash only once a step
    /// has found no transition, this reports `has_crashed` as soon as the current
    /// configuration has no transition.
    pub fn snapshot(&self) -> ExecutionResult {
        self.execution_result(self.has_crashed())
    }

    /// Returns the current state.
    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn halting_states(&self) -> &HashSet<String> {
        &self.halting_states
    }

    /// Checks whether the current state is a halting state.
    pub fn is_in_final_state(&self) -> bool {
        self.halting_states.contains(&self.state)
    }

    /// Checks whether the machine is stuck: not halted and no transition defined for the
    /// current state and symbol under the head.
    pub fn has_crashed(&self) -> bool {
        !self.is_in_final_state() && self.table.lookup(&self.state, self.symbol()).is_none()
    }

    pub fn status(&self) -> Status {
        if self.is_in_final_state() {
            Status::Halted
        } else if self.has_crashed() {
            Status::Crashed
        } else {
            Status::Running
        }
    }

    /// Returns the symbol under the head.
    pub fn symbol(&self) -> Symbol {
        self.head.read()
    }

    /// Returns the instruction the next step would apply, if the machine is still running.
    pub fn instruction(&self) -> Option<&Instruction> {
        if self.is_in_final_state() {
            return None;
        }
        self.table.lookup(&self.state, self.symbol())
    }

    pub fn head_position(&self) -> i64 {
        self.head.position()
    }

    pub fn tape(&self) -> &Tape {
        self.head.tape()
    }

    pub fn table(&self) -> &InstructionTable {
        &self.table
    }

    pub fn blank(&self) -> Symbol {
        self.head.tape().blank()
    }

    /// Returns the number of transitions applied so far.
    pub fn step_count(&self) -> usize {
        self.step_count
    }
}
