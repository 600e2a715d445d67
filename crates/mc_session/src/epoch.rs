use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

/// Generation counter of a session.
///
/// Bumped on logout and teardown. Work started under an older epoch must not
/// touch the transcript or the view once it completes.
#[derive(Debug, Clone, Default)]
pub struct Epoch(Arc<AtomicU64>);

impl Epoch {
    #[must_use]
    pub fn current(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }

    /// Invalidate all outstanding work, returning the new epoch.
    pub fn bump(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    #[must_use]
    pub fn is_current(&self, epoch: u64) -> bool {
        self.current() == epoch
    }
}
