use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use parking_lot::Mutex;

/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Allowed,
    Rejected { retry_after: Duration },
}

/// One live counting window per tenant; reset when the window expires.
#[derive(Debug)]
struct RateWindow {
    window_start: Instant,
    count: u32,
}

/// Fixed-window request admission, keyed by tenant.
///
/// Each tenant's window lives behind its own mutex, so concurrent checks for
/// one tenant cannot double-count or lose increments, and a burst from one
/// tenant never blocks or drains another tenant's budget.
pub struct RateLimiter {
    windows: DashMap<String, Arc<Mutex<RateWindow>>>,
    requests_per_window: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(requests_per_window: u32, window: Duration) -> Self {
        Self {
            windows: DashMap::new(),
            requests_per_window,
            window,
        }
    }

    pub fn admit(&self, tenant_id: &str) -> Admission {
        let cell = self
            .windows
            .entry(tenant_id.to_string())
            .or_insert_with(|| {
                Arc::new(Mutex::new(RateWindow {
                    window_start: Instant::now(),
                    count: 0,
                }))
            })
            .clone();

        let mut window = cell.lock();
        let now = Instant::now();
        let elapsed = now.duration_since(window.window_start);

        if elapsed >= self.window {
            window.window_start = now;
            window.count = 0;
        }

        if window.count < self.requests_per_window {
            window.count += 1;
            Admission::Allowed
        } else {
            let retry_after = self.window.saturating_sub(now.duration_since(window.window_start));
            Admission::Rejected { retry_after }
        }
    }
}
