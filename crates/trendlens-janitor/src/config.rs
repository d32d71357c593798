//! Configuration for the retention sweep.

/// Retention settings for one sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JanitorConfig {
    /// Raw snapshots to retain per platform.
    pub keep_raw: usize,
    /// Debug artifacts to retain.
    pub keep_debug: usize,
    /// Log what would be deleted without deleting.
    pub dry_run: bool,
}

impl Default for JanitorConfig {
    fn default() -> Self {
        Self {
            keep_raw: 3,
            keep_debug: 3,
            dry_run: false,
        }
    }
}

impl JanitorConfig {
    /// Keep the same number of every file class.
    pub fn keep_all(count: usize) -> Self {
        Self {
            keep_raw: count,
            keep_debug: count,
            dry_run: false,
        }
    }

    /// Switch this configuration to dry-run mode.
    pub fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }
}
