//! Position within a fetched page for one-at-a-time browsing.
//!
//! Every refetch, whether from a refresh or a filter change, goes through
//! [`Cursor::reset`]; a position is never carried over to a new page.

/// Where the reader is in the current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    /// The page has no articles.
    #[default]
    Empty,
    /// Showing the article at this index.
    Viewing(usize),
}

impl Cursor {
    /// Start of a freshly fetched page of `len` articles.
    pub fn reset(len: usize) -> Self {
        if len == 0 { Cursor::Empty } else { Cursor::Viewing(0) }
    }

    /// Move forward one article, stopping at the last.
    pub fn next(self, len: usize) -> Self {
        match self {
            Cursor::Empty => Cursor::Empty,
            Cursor::Viewing(_) if len == 0 => Cursor::Empty,
            Cursor::Viewing(i) => Cursor::Viewing((i + 1).min(len - 1)),
        }
    }

    /// Move back one article, stopping at the first.
    pub fn previous(self, len: usize) -> Self {
        match self {
            Cursor::Empty => Cursor::Empty,
            Cursor::Viewing(_) if len == 0 => Cursor::Empty,
            Cursor::Viewing(i) => Cursor::Viewing(i.saturating_sub(1).min(len - 1)),
        }
    }

    pub fn index(self) -> Option<usize> {
        match self {
            Cursor::Empty => None,
            Cursor::Viewing(i) => Some(i),
        }
    }
}
