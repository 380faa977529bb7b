use chrono::{DateTime, Utc};

/// Minimum spacing between two accepted invocations of the same guarded action.
pub const MIN_INTERVAL_MS: i64 = 3000;

/// Per-action cooldown record.
///
/// Single-threaded by contract: the owner serializes calls, so there is no
/// compare-and-swap here. [`crate::Session`] keeps its gates behind its state lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateGate {
    last_invocation_ms: Option<i64>,
    min_interval_ms: i64,
}

impl RateGate {
    pub fn new(min_interval_ms: i64) -> Self {
        Self {
            last_invocation_ms: None,
            min_interval_ms,
        }
    }

    /// Fire the gate if the cooldown has elapsed.
    ///
    /// On success the timestamp moves to `now_ms` unconditionally, whatever
    /// happens to the action afterwards. A gate that never fired always accepts.
    pub fn try_acquire(&mut self, now_ms: i64) -> bool {
        let cooling_down = self
            .last_invocation_ms
            .is_some_and(|last| now_ms.saturating_sub(last) < self.min_interval_ms);
        if cooling_down {
            return false;
        }

        self.last_invocation_ms = Some(now_ms);
        true
    }

    pub fn last_invocation_ms(&self) -> Option<i64> {
        self.last_invocation_ms
    }
}

impl Default for RateGate {
    fn default() -> Self {
        Self::new(MIN_INTERVAL_MS)
    }
}

/// Source of "now" for gates and the fetched-at label.
pub trait Clock: Send + Sync + std::fmt::Debug {
    fn now(&self) -> DateTime<Utc>;

    fn now_ms(&self) -> i64 {
        self.now().timestamp_millis()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
#[cfg(test)]
#[derive(Debug)]
pub(crate) struct ManualClock {
    now_ms: std::sync::atomic::AtomicI64,
}

#[cfg(test)]
impl ManualClock {
    pub(crate) fn new(start: DateTime<Utc>) -> Self {
        Self {
            now_ms: start.timestamp_millis().into(),
        }
    }

    pub(crate) fn advance_ms(&self, ms: i64) {
        self.now_ms.fetch_add(ms, std::sync::atomic::Ordering::SeqCst);
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.now_ms()).unwrap_or_default()
    }

    fn now_ms(&self) -> i64 {
        self.now_ms.load(std::sync::atomic::Ordering::SeqCst)
    }
}
