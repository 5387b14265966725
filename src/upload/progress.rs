//! Upload progress channel.
//!
//! Progress is a single `u8` percentage held in a `tokio::sync::watch`
//! channel. Watchers may poll the current value or await changes; within one
//! upload the value only ever increases.

use std::sync::Arc;
use tokio::sync::watch;

/// Producer half of the progress channel.
#[derive(Clone, Debug)]
pub struct ProgressReporter {
    tx: Arc<watch::Sender<u8>>,
}

/// Create a progress channel starting at 0%.
pub fn progress_channel() -> (ProgressReporter, watch::Receiver<u8>) {
    let (tx, rx) = watch::channel(0);
    (ProgressReporter { tx: Arc::new(tx) }, rx)
}

/// `round(sent * 100 / total)`, clamped to 100. `None` when the total is
/// unknown (zero).
pub fn percent(sent: u64, total: u64) -> Option<u8> {
    if total == 0 {
        return None;
    }
    let sent = sent.min(total) as u128;
    let total = total as u128;
    Some(((sent * 100 + total / 2) / total) as u8)
}

impl ProgressReporter {
    /// A reporter nobody listens to.
    pub fn detached() -> Self {
        progress_channel().0
    }

    pub fn subscribe(&self) -> watch::Receiver<u8> {
        self.tx.subscribe()
    }

    /// Publish `sent` of `total` bytes. Lower or equal percentages are
    /// dropped so watchers never see progress go backwards.
    pub fn report(&self, sent: u64, total: u64) {
        let Some(pct) = percent(sent, total) else {
            return;
        };

        let changed = self.tx.send_if_modified(|current| {
            if pct > *current {
                *current = pct;
                true
            } else {
                false
            }
        });

        if changed {
            tracing::debug!("Upload progress: {}%", pct);
        }
    }

    /// Start a new upload at 0%.
    pub fn reset(&self) {
        self.tx.send_replace(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_rounds_to_nearest() {
        assert_eq!(percent(0, 200), Some(0));
        assert_eq!(percent(1, 200), Some(1));
        assert_eq!(percent(1, 3), Some(33));
        assert_eq!(percent(2, 3), Some(67));
        assert_eq!(percent(3, 3), Some(100));
    }

    #[test]
    fn test_percent_unknown_total() {
        assert_eq!(percent(10, 0), None);
    }

    #[test]
    fn test_percent_never_exceeds_hundred() {
        assert_eq!(percent(500, 100), Some(100));
        assert_eq!(percent(u64::MAX, u64::MAX), Some(100));
    }

    #[test]
    fn test_report_is_monotonic() {
        let (reporter, rx) = progress_channel();

        reporter.report(50, 100);
        assert_eq!(*rx.borrow(), 50);

        reporter.report(20, 100);
        assert_eq!(*rx.borrow(), 50);

        reporter.report(100, 100);
        assert_eq!(*rx.borrow(), 100);
    }

    #[test]
    fn test_report_ignores_unknown_total() {
        let (reporter, rx) = progress_channel();
        reporter.report(10, 0);
        assert_eq!(*rx.borrow(), 0);
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_reset_returns_to_zero() {
        let (reporter, rx) = progress_channel();
        reporter.report(3, 4);
        reporter.reset();
        assert_eq!(*rx.borrow(), 0);
        assert_eq!(*reporter.subscribe().borrow(), 0);
    }

    #[tokio::test]
    async fn test_watcher_observes_changes() {
        let (reporter, mut rx) = progress_channel();

        let watcher = tokio::spawn(async move {
            let mut seen = Vec::new();
            while rx.changed().await.is_ok() {
                let value = *rx.borrow_and_update();
                seen.push(value);
                if value == 100 {
                    break;
                }
            }
            seen
        });

        reporter.report(100, 100);
        let seen = watcher.await.unwrap();
        assert_eq!(seen.last(), Some(&100));
    }
}
