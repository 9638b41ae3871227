//! Tracks how much inventory data a cache has absorbed.

/// Counts snapshots installed and push batches merged into a cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncPosition {
    /// Number of full snapshots installed (initial pull and resyncs).
    pub snapshots_installed: u64,
    /// Number of push batches merged.
    pub batches_merged: u64,
}

impl SyncPosition {
    /// Creates a new position at zero.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Advances the position by one installed snapshot.
    pub fn after_snapshot(&self) -> Self {
        Self {
            snapshots_installed: self.snapshots_installed + 1,
            ..*self
        }
    }

    /// Advances the position by one merged batch.
    pub fn after_batch(&self) -> Self {
        Self {
            batches_merged: self.batches_merged + 1,
            ..*self
        }
    }

    /// Returns true once at least one snapshot has been installed.
    pub fn is_primed(&self) -> bool {
        self.snapshots_installed > 0
    }
}

impl std::fmt::Display for SyncPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "position(snapshots={}, batches={})",
            self.snapshots_installed, self.batches_merged
        )
    }
}
