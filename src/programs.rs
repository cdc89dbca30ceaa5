//! A small library of built-in programs, embedded at compile time and parsed on first use.

use crate::parser::parse;
use crate::types::{Program, TuringMachineError};
use log::error;

// Built-in programs, embedded at compile time
const PROGRAM_TEXTS: [&str; 4] = [
    include_str!("../programs/binary-increment.tm"),
    include_str!("../programs/unary-addition.tm"),
    include_str!("../programs/busy-beaver-2.tm"),
    include_str!("../programs/busy-beaver-3.tm"),
];

lazy_static::lazy_static! {
    /// Built-in programs paired with their source text, parsed once on first use.
    static ref PROGRAMS: Vec<(&'static str, Program)> = PROGRAM_TEXTS
        .iter()
        .filter_map(|text| match parse(text) {
            Ok(program) => Some((*text, program)),
            Err(e) => {
                error!("Failed to parse built-in program: {}", e);
                None
            }
        })
        .collect();
}

/// Read-only access to the built-in program library.
pub struct ProgramManager;

impl ProgramManager {
    /// Get the number of available programs
    pub fn get_program_count() -> usize {
        PROGRAMS.len()
    }

    /// Get a program by its index
    pub fn get_program_by_index(index: usize) -> Result<Program, TuringMachineError> {
        PROGRAMS
            .get(index)
            .map(|(_, program)| program.clone())
            .ok_or_else(|| {
                TuringMachineError::ProgramNotFound(format!("index {} out of range", index))
            })
    }

    /// Get a program by its name, ignoring case
    pub fn get_program_by_name(name: &str) -> Result<Program, TuringMachineError> {
        PROGRAMS
            .iter()
            .find(|(_, program)| program.name.eq_ignore_ascii_case(name))
            .map(|(_, program)| program.clone())
            .ok_or_else(|| TuringMachineError::ProgramNotFound(name.to_string()))
    }

    /// List all program names
    pub fn list_program_names() -> Vec<String> {
        PROGRAMS
            .iter()
            .map(|(_, program)| program.name.clone())
            .collect()
    }

    /// Get information about a program by its index
    pub fn get_program_info(index: usize) -> Result<ProgramInfo, TuringMachineError> {
        let program = Self::get_program_by_index(index)?;

        Ok(ProgramInfo {
            index,
            state_count: program.table().states().len(),
            transition_count: program.rules.len(),
            initial_tape: program.initial_tape(),
            initial_state: program.initial_state,
            name: program.name,
        })
    }

    /// Search for programs by name
    pub fn search_programs(query: &str) -> Vec<usize> {
        let query = query.to_lowercase();

        PROGRAMS
            .iter()
            .enumerate()
            .filter(|(_, (_, program))| program.name.to_lowercase().contains(&query))
            .map(|(index, _)| index)
            .collect()
    }

    /// Get the original text of a program by its index
    pub fn get_program_text_by_index(index: usize) -> Result<&'static str, TuringMachineError> {
        PROGRAMS.get(index).map(|(text, _)| *text).ok_or_else(|| {
            TuringMachineError::ProgramNotFound(format!("text index {} out of range", index))
        })
    }
}

#[derive(Debug, Clone)]
pub struct ProgramInfo {
    pub index: usize,
    pub name: String,
    pub initial_state: String,
    pub initial_tape: String,
    pub state_count: usize,
    pub transition_count: usize,
}
