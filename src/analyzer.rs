//! This module provides functions for analyzing machine definitions to spot likely mistakes
//! before execution: rules that can never fire, states that can never be reached, states
//! the machine would crash in as soon as it enters them, and tape symbols no rule reads.
//!
//! None of these make a definition invalid. A machine that crashes on an undefined
//! transition is behaving as specified, so findings are reported as warnings.

use crate::types::{Program, Symbol};
use std::collections::{BTreeSet, HashSet, VecDeque};
use std::fmt;

/// Represents the findings of analyzing a `Program`.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum AnalysisWarning {
    /// The program declares no halting states, so it can only crash or run forever.
    NoHaltingStates,
    /// Rules leave a halting state. They never fire because execution stops on entry.
    HaltingStateHasRules(String),
    /// States with rules that cannot be reached from the initial state.
    UnreachableStates(Vec<String>),
    /// Target states that are neither halting nor have any rule; entering one crashes.
    UnknownStates(Vec<String>),
    /// Symbols of the initial tape that no rule reads.
    UnhandledTapeSymbols(Vec<Symbol>),
}

impl fmt::Display for AnalysisWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisWarning::NoHaltingStates => write!(f, "No halting states declared"),
            AnalysisWarning::HaltingStateHasRules(state) => {
                write!(f, "Halting state has rules that never fire: {}", state)
            }
            AnalysisWarning::UnreachableStates(states) => {
                write!(f, "Unreachable states detected: {:?}", states)
            }
            AnalysisWarning::UnknownStates(states) => write!(
                f,
                "Transitions reference states without rules that are not halting: {:?}",
                states
            ),
            AnalysisWarning::UnhandledTapeSymbols(symbols) => write!(
                f,
                "Initial tape contains symbols not read by any rule: {:?}",
                symbols
            ),
        }
    }
}

/// Analyzes a `Program` and returns every finding, in a stable order.
///
/// # Arguments
///
/// * `program` - A reference to the `Program` to be analyzed.
///
/// # Returns
///
/// * An empty vector if nothing looks suspicious.
pub fn analyze(program: &Program) -> Vec<AnalysisWarning> {
    [
        check_halting_states,
        check_halting_state_rules,
        check_unreachable_states,
        check_unknown_states,
        check_tape_symbols,
    ]
    .iter()
    .flat_map(|check| check(program))
    .collect()
}

fn check_halting_states(program: &Program) -> Vec<AnalysisWarning> {
    if program.halting_states.is_empty() {
        vec![AnalysisWarning::NoHaltingStates]
    } else {
        Vec::new()
    }
}

/// Checks for rules whose source state is a halting state.
fn check_halting_state_rules(program: &Program) -> Vec<AnalysisWarning> {
    let sources: BTreeSet<&str> = program.rules.iter().map(|r| r.state.as_str()).collect();

    sources
        .into_iter()
        .filter(|state| program.is_halting_state(state))
        .map(|state| AnalysisWarning::HaltingStateHasRules(state.to_string()))
        .collect()
}

/// Checks for states with rules that are never reached from the initial state.
///
/// A breadth-first walk follows every rule from the initial state; halting states stop the
/// walk since their rules never fire.
fn check_unreachable_states(program: &Program) -> Vec<AnalysisWarning> {
    let mut reachable = HashSet::new();
    let mut queue = VecDeque::from([program.initial_state.as_str()]);

    while let Some(state) = queue.pop_front() {
        if !reachable.insert(state) || program.is_halting_state(state) {
            continue;
        }

        queue.extend(
            program
                .rules
                .iter()
                .filter(|rule| rule.state == state)
                .map(|rule| rule.next_state.as_str()),
        );
    }

    let unreachable: Vec<String> = program
        .rules
        .iter()
        .map(|rule| rule.state.as_str())
        .filter(|state| !reachable.contains(state))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(String::from)
        .collect();

    if unreachable.is_empty() {
        Vec::new()
    } else {
        vec![AnalysisWarning::UnreachableStates(unreachable)]
    }
}

/// Checks for target states that would crash on entry, whatever the symbol under the head.
fn check_unknown_states(program: &Program) -> Vec<AnalysisWarning> {
    let sources: HashSet<&str> = program.rules.iter().map(|r| r.state.as_str()).collect();

    let unknown: Vec<String> = program
        .rules
        .iter()
        .map(|rule| rule.next_state.as_str())
        .filter(|state| !sources.contains(state) && !program.is_halting_state(state))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(String::from)
        .collect();

    if unknown.is_empty() {
        Vec::new()
    } else {
        vec![AnalysisWarning::UnknownStates(unknown)]
    }
}

/// Checks whether every non-blank symbol on the initial tape is read by at least one rule.
fn check_tape_symbols(program: &Program) -> Vec<AnalysisWarning> {
    let handled: HashSet<Symbol> = program.rules.iter().map(|r| r.read).collect();

    let unhandled: Vec<Symbol> = program
        .tape
        .iter()
        .copied()
        .filter(|symbol| *symbol != program.blank && !handled.contains(symbol))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    if unhandled.is_empty() {
        Vec::new()
    } else {
        vec![AnalysisWarning::UnhandledTapeSymbols(unhandled)]
    }
}
