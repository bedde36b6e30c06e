//! Federation counters.
//!
//! Cheap atomic counters shared between the inbox processor, the key
//! dispatcher and anything that wants to expose them.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Federation metrics collector.
#[derive(Debug, Default)]
pub struct FederationMetrics {
    /// Inbound activities handed to the processor
    pub activities_received: AtomicU64,
    /// Inbound activities dropped (malformed, unresolvable)
    pub activities_dropped: AtomicU64,
    /// Accept activities delivered
    pub accepts_sent: AtomicU64,
    /// Accept activities that failed to deliver
    pub accept_delivery_failures: AtomicU64,
    /// Follower relations persisted
    pub followers_added: AtomicU64,
    /// Follower relations removed
    pub followers_removed: AtomicU64,
    /// Follows answered with an Accept whose relation failed to persist
    pub follow_state_mismatches: AtomicU64,
    /// Actor key pairs generated and persisted
    pub keys_provisioned: AtomicU64,
}

/// Point-in-time copy of [`FederationMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub activities_received: u64,
    pub activities_dropped: u64,
    pub accepts_sent: u64,
    pub accept_delivery_failures: u64,
    pub followers_added: u64,
    pub followers_removed: u64,
    pub follow_state_mismatches: u64,
    pub keys_provisioned: u64,
}

impl FederationMetrics {
    /// Create a new metrics instance with all counters at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            activities_received: AtomicU64::new(0),
            activities_dropped: AtomicU64::new(0),
            accepts_sent: AtomicU64::new(0),
            accept_delivery_failures: AtomicU64::new(0),
            followers_added: AtomicU64::new(0),
            followers_removed: AtomicU64::new(0),
            follow_state_mismatches: AtomicU64::new(0),
            keys_provisioned: AtomicU64::new(0),
        }
    }

    /// Increment a counter.
    pub fn incr(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an Accept delivery attempt.
    pub fn record_accept(&self, success: bool) {
        if success {
            Self::incr(&self.accepts_sent);
        } else {
            Self::incr(&self.accept_delivery_failures);
        }
    }

    /// Get a snapshot of all counters.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            activities_received: self.activities_received.load(Ordering::Relaxed),
            activities_dropped: self.activities_dropped.load(Ordering::Relaxed),
            accepts_sent: self.accepts_sent.load(Ordering::Relaxed),
            accept_delivery_failures: self.accept_delivery_failures.load(Ordering::Relaxed),
            followers_added: self.followers_added.load(Ordering::Relaxed),
            followers_removed: self.followers_removed.load(Ordering::Relaxed),
            follow_state_mismatches: self.follow_state_mismatches.load(Ordering::Relaxed),
            keys_provisioned: self.keys_provisioned.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_accept() {
        let metrics = FederationMetrics::new();
        metrics.record_accept(true);
        metrics.record_accept(false);
        metrics.record_accept(true);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.accepts_sent, 2);
        assert_eq!(snapshot.accept_delivery_failures, 1);
        assert_eq!(snapshot.follow_state_mismatches, 0);
    }
}
