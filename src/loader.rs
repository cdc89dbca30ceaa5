//! This module provides the `ProgramLoader` struct, responsible for loading machine
//! definitions from files, directories and strings.

use crate::analyzer::analyze;
use crate::parser::parse;
use crate::types::{Program, TuringMachineError};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// File extension of machine definitions.
pub const PROGRAM_EXTENSION: &str = "tm";

/// `ProgramLoader` is a utility struct for loading machine definitions.
///
/// Every loaded program is analyzed and its findings are logged as warnings; they never
/// cause loading to fail.
pub struct ProgramLoader;

impl ProgramLoader {
    /// Loads a single program from the specified file path.
    ///
    /// # Arguments
    ///
    /// * `path` - A reference to the `Path` of the `.tm` file to load.
    ///
    /// # Returns
    ///
    /// * `Ok(Program)` if the file is successfully read and parsed into a `Program`.
    /// * `Err(TuringMachineError::FileError)` if the file cannot be read.
    /// * `Err(TuringMachineError::ParseError)` if the file content is not a valid program.
    pub fn load_program(path: &Path) -> Result<Program, TuringMachineError> {
        let content = fs::read_to_string(path).map_err(|e| {
            TuringMachineError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        debug!("loading program from {}", path.display());
        Self::load_program_from_string(&content)
    }

    /// Loads a single program from the provided string content, e.g. from stdin.
    pub fn load_program_from_string(content: &str) -> Result<Program, TuringMachineError> {
        let program = parse(content)?;

        for warning in analyze(&program) {
            warn!("{}: {}", program.name, warning);
        }

        Ok(program)
    }

    /// Loads all program files (`.tm` extension) from a given directory.
    ///
    /// Directories and files with other extensions are skipped. Each remaining file yields
    /// either its path and program or the error that prevented loading it.
    pub fn load_programs(directory: &Path) -> Vec<Result<(PathBuf, Program), TuringMachineError>> {
        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                return vec![Err(TuringMachineError::FileError(format!(
                    "Failed to read directory {}: {}",
                    directory.display(),
                    e
                )))]
            }
        };

        let mut results: Vec<_> = entries
            .filter_map(|entry| {
                let path = match entry {
                    Ok(entry) => entry.path(),
                    Err(e) => {
                        return Some(Err(TuringMachineError::FileError(format!(
                            "Failed to read directory entry: {}",
                            e
                        ))))
                    }
                };

                // Skip directories and non-.tm files
                if path.is_dir() || path.extension().is_none_or(|ext| ext != PROGRAM_EXTENSION) {
                    return None;
                }

                Some(Self::load_program(&path).map(|program| (path, program)))
            })
            .collect();

        // Directory order is platform dependent
        results.sort_by_key(|result| result.as_ref().ok().map(|(path, _)| path.clone()));
        results
    }
}
