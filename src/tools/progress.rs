//! Run progress, observable while a run is in flight

use std::sync::Arc;
use tokio::sync::watch;

/// Percent complete (0-100) of the current run.
///
/// Cloning shares the same channel, so the blocking worker can report while
/// the session reads.
#[derive(Debug, Clone)]
pub struct Progress {
    tx: Arc<watch::Sender<u8>>,
}

impl Progress {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self { tx: Arc::new(tx) }
    }

    pub fn set(&self, percent: u8) {
        self.tx.send_replace(percent.min(100));
    }

    pub fn current(&self) -> u8 {
        *self.tx.borrow()
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_shared_between_clones() {
        let progress = Progress::new();
        let worker = progress.clone();
        worker.set(40);
        assert_eq!(progress.current(), 40);
    }

    #[test]
    fn test_progress_capped() {
        let progress = Progress::new();
        progress.set(250);
        assert_eq!(progress.current(), 100);
    }
}
