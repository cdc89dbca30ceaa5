//! Sparse, two-way-infinite tape storage.
//!
//! Only cells holding a non-blank symbol are stored. Every other position reads as the
//! blank symbol, so the tape behaves as if it extended forever in both directions.

use crate::types::Symbol;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::RangeInclusive;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tape {
    blank: Symbol,
    // Never contains `blank` as a value.
    cells: BTreeMap<i64, Symbol>,
}

impl Tape {
    /// Creates an empty tape.
    pub fn new(blank: Symbol) -> Self {
        Self {
            blank,
            cells: BTreeMap::new(),
        }
    }

    /// Creates a tape from `(position, symbol)` pairs. Blank symbols are dropped and later
    /// pairs overwrite earlier ones.
    pub fn from_cells<I>(blank: Symbol, cells: I) -> Self
    where
        I: IntoIterator<Item = (i64, Symbol)>,
    {
        let mut tape = Self::new(blank);
        for (position, symbol) in cells {
            tape.write(position, symbol);
        }
        tape
    }

    /// Creates a tape holding `symbols` in consecutive cells starting at `origin`.
    /// Symbols that would land past `i64::MAX` are dropped.
    pub fn from_symbols<I>(blank: Symbol, origin: i64, symbols: I) -> Self
    where
        I: IntoIterator<Item = Symbol>,
    {
        let positions = std::iter::successors(Some(origin), |position| position.checked_add(1));
        Self::from_cells(blank, positions.zip(symbols))
    }

    /// Returns the symbol at `position`, or the blank symbol if the cell is empty.
    pub fn read(&self, position: i64) -> Symbol {
        self.cells.get(&position).copied().unwrap_or(self.blank)
    }

    /// Writes `symbol` at `position`. Writing the blank symbol clears the cell.
    pub fn write(&mut self, position: i64, symbol: Symbol) {
        if symbol == self.blank {
            self.cells.remove(&position);
        } else {
            self.cells.insert(position, symbol);
        }
    }

    /// Returns the smallest occupied position, or 0 when the tape is empty.
    pub fn leftmost_occupied_position(&self) -> i64 {
        self.cells.keys().next().copied().unwrap_or(0)
    }

    /// Returns the smallest and largest occupied positions.
    pub fn bounds(&self) -> Option<(i64, i64)> {
        let first = self.cells.keys().next()?;
        let last = self.cells.keys().next_back()?;
        Some((*first, *last))
    }

    /// Renders the contiguous span from the leftmost to the rightmost occupied cell,
    /// filling gaps with the blank symbol. An empty tape renders as an empty string.
    pub fn render(&self) -> String {
        match self.bounds() {
            Some((first, last)) => self.window(first..=last),
            None => String::new(),
        }
    }

    /// Renders an arbitrary range of the tape, materialising blank cells.
    pub fn window(&self, range: RangeInclusive<i64>) -> String {
        range.map(|position| self.read(position)).collect()
    }

    pub fn blank(&self) -> Symbol {
        self.blank
    }

    /// Number of occupied (non-blank) cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterates over occupied cells in position order.
    pub fn cells(&self) -> impl Iterator<Item = (i64, Symbol)> + '_ {
        self.cells.iter().map(|(&position, &symbol)| (position, symbol))
    }
}

impl fmt::Display for Tape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
