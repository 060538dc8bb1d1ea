//! Section/row addressing for sectioned lists
//!
//! The mediator reasons about one flat, 1-based index. Lists that group
//! rows into sections report positions as `(section, row)` pairs; this
//! module converts them.

use serde::{Deserialize, Serialize};

/// Position of a row inside a sectioned list (both 0-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct IndexPath {
    /// Section index
    pub section: usize,
    /// Row index within the section
    pub row: usize,
}

impl IndexPath {
    /// Create an index path
    pub fn new(section: usize, row: usize) -> Self {
        Self { section, row }
    }
}

/// Row counts of a sectioned list
pub trait ListLayout {
    /// Number of sections
    fn number_of_sections(&self) -> usize;

    /// Number of rows in `section`
    fn number_of_rows(&self, section: usize) -> usize;

    /// Total rows across all sections
    fn total_rows(&self) -> usize {
        (0..self.number_of_sections())
            .map(|section| self.number_of_rows(section))
            .sum()
    }
}

impl ListLayout for [usize] {
    fn number_of_sections(&self) -> usize {
        self.len()
    }

    fn number_of_rows(&self, section: usize) -> usize {
        self.get(section).copied().unwrap_or(0)
    }
}

impl ListLayout for Vec<usize> {
    fn number_of_sections(&self) -> usize {
        self.as_slice().number_of_sections()
    }

    fn number_of_rows(&self, section: usize) -> usize {
        self.as_slice().number_of_rows(section)
    }
}

/// A flattened position: 1-based rank and total row count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlatPosition {
    /// 1-based rank of the row across all sections
    pub index: usize,
    /// Rows across all sections
    pub total: usize,
}

/// Flatten `index_path` against `layout`
///
/// The rank counts every row in the preceding sections, then the row
/// itself, starting at 1.
pub fn flatten<L>(layout: &L, index_path: IndexPath) -> FlatPosition
where
    L: ListLayout + ?Sized,
{
    let preceding: usize = (0..index_path.section)
        .map(|section| layout.number_of_rows(section))
        .sum();

    FlatPosition {
        index: 1 + preceding + index_path.row,
        total: layout.total_rows(),
    }
}
