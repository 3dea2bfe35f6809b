//! Sparse, unbounded, two-way tape.
//!
//! Only non-blank cells are stored. Writing the blank symbol removes the cell, so two
//! tapes with the same visible content compare equal regardless of how they got there.
//! The cell map sits behind an `Arc` and is copied on the first write after a
//! [`Tape::snapshot`], which keeps earlier snapshots valid and makes taking one O(1).

use crate::types::{Symbol, MAX_CONTENT_SPAN};
use std::collections::HashMap;
use std::ops::RangeInclusive;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tape {
    cells: Arc<HashMap<i64, Symbol>>,
    blank: Symbol,
}

impl Tape {
    /// Creates an all-blank tape.
    pub fn new(blank: Symbol) -> Self {
        Self {
            cells: Arc::new(HashMap::new()),
            blank,
        }
    }

    /// Creates a tape holding `input` at positions `0..len`.
    pub fn from_input(input: &str, blank: Symbol) -> Self {
        let mut tape = Self::new(blank);
        for (i, c) in input.chars().enumerate() {
            tape.write(i as i64, c);
        }
        tape
    }

    pub fn blank(&self) -> Symbol {
        self.blank
    }

    /// Returns the symbol at `position`, or the blank symbol if nothing is stored there.
    pub fn read(&self, position: i64) -> Symbol {
        self.cells.get(&position).copied().unwrap_or(self.blank)
    }

    /// Writes `symbol` at `position`. Writing the blank symbol clears the cell.
    pub fn write(&mut self, position: i64, symbol: Symbol) {
        if symbol == self.blank {
            // Skip the copy-on-write clone if there is nothing to remove.
            if self.cells.contains_key(&position) {
                Arc::make_mut(&mut self.cells).remove(&position);
            }
        } else {
            Arc::make_mut(&mut self.cells).insert(position, symbol);
        }
    }

    /// Clears the cell at `position` back to blank.
    pub fn clear(&mut self, position: i64) {
        self.write(position, self.blank);
    }

    /// A copy of the tape that later writes to `self` will not affect.
    pub fn snapshot(&self) -> Tape {
        self.clone()
    }

    /// Number of stored (non-blank) cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Leftmost and rightmost non-blank positions, if any.
    pub fn bounds(&self) -> Option<(i64, i64)> {
        let min = self.cells.keys().min()?;
        let max = self.cells.keys().max()?;
        Some((*min, *max))
    }

    /// Symbols in `range`, blanks included.
    pub fn window(&self, range: RangeInclusive<i64>) -> Vec<Symbol> {
        range.map(|position| self.read(position)).collect()
    }

    /// The span between the outermost non-blank cells, as a string.
    /// Blanks inside the span are kept; an all-blank tape yields an empty string.
    ///
    /// Returns `None` when the outermost cells are more than [`MAX_CONTENT_SPAN`] apart.
    /// Use [`Tape::window`] or [`Tape::cells`] for such tapes.
    pub fn contents(&self) -> Option<String> {
        match self.bounds() {
            Some((min, max)) if max.abs_diff(min) > MAX_CONTENT_SPAN => None,
            Some((min, max)) => Some(self.window(min..=max).into_iter().collect()),
            None => Some(String::new()),
        }
    }

    /// Stored cells ordered by position.
    pub fn cells(&self) -> Vec<(i64, Symbol)> {
        let mut cells: Vec<_> = self.cells.iter().map(|(&p, &s)| (p, s)).collect();
        cells.sort_unstable_by_key(|&(p, _)| p);
        cells
    }
}
