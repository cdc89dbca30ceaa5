//! The transition function of a machine, keyed by `(state, symbol)`.

use crate::types::{Instruction, InstructionKey, Symbol, TransitionRule};
use std::collections::{BTreeSet, HashMap};

/// Maps [`InstructionKey`]s to [`Instruction`]s. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstructionTable {
    instructions: HashMap<InstructionKey, Instruction>,
}

impl InstructionTable {
    /// Builds a table from rule tuples. A later rule for the same `(state, symbol)` replaces
    /// an earlier one.
    pub fn from_rules<I>(rules: I) -> Self
    where
        I: IntoIterator<Item = TransitionRule>,
    {
        rules.into_iter().map(TransitionRule::into_parts).collect()
    }

    /// Finds the instruction for `state` reading `symbol`.
    ///
    /// `None` means no transition is defined; the machine treats this as a crash.
    pub fn lookup(&self, state: &str, symbol: Symbol) -> Option<&Instruction> {
        // Keys own their state name, so lookups build a temporary key.
        self.instructions.get(&InstructionKey::new(state, symbol))
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&InstructionKey, &Instruction)> {
        self.instructions.iter()
    }

    /// Every state named by the table, as a source or as a target, in sorted order.
    pub fn states(&self) -> BTreeSet<&str> {
        self.instructions
            .iter()
            .flat_map(|(key, instruction)| [key.state.as_str(), instruction.next_state.as_str()])
            .collect()
    }
}

impl FromIterator<(InstructionKey, Instruction)> for InstructionTable {
    fn from_iter<I: IntoIterator<Item = (InstructionKey, Instruction)>>(iter: I) -> Self {
        Self {
            instructions: iter.into_iter().collect(),
        }
    }
}
