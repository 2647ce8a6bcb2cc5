//! Construction-time table settings.

/// Settings fixed for the lifetime of a table.
///
/// ```
/// use chain_table::TableConfig;
///
/// let cfg = TableConfig::new(64).take_ownership(true).max_entries(1_000);
/// assert_eq!(cfg.buckets(), 64);
/// assert!(cfg.takes_ownership());
/// assert_eq!(cfg.entry_limit(), Some(1_000));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableConfig {
    buckets: usize,
    take_ownership: bool,
    max_entries: Option<usize>,
}

impl TableConfig {
    /// Owning table with `buckets` slots and no entry budget.
    pub fn new(buckets: usize) -> Self {
        Self {
            buckets,
            take_ownership: true,
            max_entries: None,
        }
    }

    pub fn take_ownership(mut self, yes: bool) -> Self {
        self.take_ownership = yes;
        self
    }

    /// Cap on live entries. Inserts beyond it fail as a node allocation failure.
    pub fn max_entries(mut self, limit: usize) -> Self {
        self.max_entries = Some(limit);
        self
    }

    pub fn unbounded(mut self) -> Self {
        self.max_entries = None;
        self
    }

    pub fn buckets(&self) -> usize {
        self.buckets
    }

    pub fn takes_ownership(&self) -> bool {
        self.take_ownership
    }

    pub fn entry_limit(&self) -> Option<usize> {
        self.max_entries
    }
}
