//! Read policies.

/// What a row read does when a row id shows up more than once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicateRows {
  /// Deliver only the first row seen for each row id.
  #[default]
  Skip,
  /// Deliver every leaf cell, repeats included.
  Emit,
}

/// Which children of a table interior page are visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChildOrder {
  /// Every left child except the last one, then each page number from the
  /// last cell's left child through the right-most pointer inclusive. Only
  /// correct when those pages are numbered contiguously.
  #[default]
  Span,
  /// Each cell's left child, then the right-most pointer.
  Pointers,
}

/// Configuration for reading rows out of a database.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadOptions {
  pub duplicate_rows: DuplicateRows,
  pub child_order: ChildOrder,
}

impl ReadOptions {
  pub fn new() -> Self {
    Self::default()
  }

  /// Sets the duplicate row id policy.
  pub fn with_duplicate_rows(mut self, policy: DuplicateRows) -> Self {
    self.duplicate_rows = policy;
    self
  }

  /// Sets how interior pages fan out.
  pub fn with_child_order(mut self, order: ChildOrder) -> Self {
    self.child_order = order;
    self
  }
}
