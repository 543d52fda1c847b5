//! Computational budgets shared by graph building, path search and solving.
//!
//! A single [`Quota`] is threaded through the whole pipeline so a global time
//! limit can be honoured end to end. Long-running loops poll
//! [`Quota::is_reached`] and stop at the next safe point.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Signals when computation should stop.
///
/// Implementations must be cheap to poll; hot loops call them frequently.
pub trait Quota: Send + Sync {
    /// Returns `true` once the budget is exhausted.
    fn is_reached(&self) -> bool;
}

/// A budget that never runs out.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unlimited;

impl Quota for Unlimited {
    fn is_reached(&self) -> bool {
        false
    }
}

/// A wall-clock budget measured from construction.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use covend_core::{Quota, TimeQuota};
///
/// let quota = TimeQuota::new(Duration::from_secs(60));
/// assert!(!quota.is_reached());
/// assert!(TimeQuota::new(Duration::ZERO).is_reached());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TimeQuota {
    started: Instant,
    limit: Duration,
}

impl TimeQuota {
    /// Start a budget of `limit` from now.
    pub fn new(limit: Duration) -> Self {
        Self {
            started: Instant::now(),
            limit,
        }
    }

    /// Time left before the budget is exhausted.
    pub fn remaining(&self) -> Duration {
        self.limit.saturating_sub(self.started.elapsed())
    }
}

impl Quota for TimeQuota {
    fn is_reached(&self) -> bool {
        self.started.elapsed() >= self.limit
    }
}

/// A budget that can be cancelled from another thread.
#[derive(Debug, Default)]
pub struct CancelFlag(AtomicBool);

impl CancelFlag {
    /// Create an untriggered flag.
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

impl Quota for CancelFlag {
    fn is_reached(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

impl<Q: Quota + ?Sized> Quota for &Q {
    fn is_reached(&self) -> bool {
        (**self).is_reached()
    }
}

/// An optional budget; `None` never runs out.
impl<Q: Quota> Quota for Option<Q> {
    fn is_reached(&self) -> bool {
        self.as_ref().is_some_and(Quota::is_reached)
    }
}

/// Either of two budgets; reached as soon as one is.
#[derive(Debug, Clone, Copy)]
pub struct AnyQuota<A, B>(pub A, pub B);

impl<A: Quota, B: Quota> Quota for AnyQuota<A, B> {
    fn is_reached(&self) -> bool {
        self.0.is_reached() || self.1.is_reached()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn unlimited_never_expires() {
        assert!(!Unlimited.is_reached());
    }

    #[rstest]
    fn cancel_flag_trips_once_cancelled() {
        let flag = CancelFlag::new();
        assert!(!flag.is_reached());
        flag.cancel();
        assert!(flag.is_reached());
    }

    #[rstest]
    fn any_quota_combines_budgets() {
        let flag = CancelFlag::new();
        let quota = AnyQuota(&flag, TimeQuota::new(Duration::from_secs(3600)));
        assert!(!quota.is_reached());
        flag.cancel();
        assert!(quota.is_reached());
    }

    #[rstest]
    fn absent_budget_never_expires() {
        let quota: Option<TimeQuota> = None;
        assert!(!quota.is_reached());
        assert!(Some(TimeQuota::new(Duration::ZERO)).is_reached());
    }

    #[rstest]
    fn remaining_saturates() {
        assert_eq!(TimeQuota::new(Duration::ZERO).remaining(), Duration::ZERO);
    }
}
