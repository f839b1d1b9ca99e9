//! Leading plus trailing edge rate limiter for geometry commits.

/// Emits at most one value per `interval_ms`.
///
/// The first value offered after a quiet period is emitted immediately. Values offered inside
/// the interval replace each other as the pending trailing value, which becomes due once the
/// interval has elapsed ([`Throttle::poll`]) or can be forced out with [`Throttle::flush`].
#[derive(Debug, Clone)]
pub struct Throttle<T> {
    interval_ms: u64,
    last_emit_ms: Option<u64>,
    pending: Option<T>,
}

impl<T> Throttle<T> {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            last_emit_ms: None,
            pending: None,
        }
    }

    fn is_open(&self, now_ms: u64) -> bool {
        self.last_emit_ms
            .map_or(true, |last| now_ms.saturating_sub(last) >= self.interval_ms)
    }

    /// Offers `value`; returns it when it may be emitted now.
    pub fn offer(&mut self, now_ms: u64, value: T) -> Option<T> {
        if self.is_open(now_ms) {
            self.last_emit_ms = Some(now_ms);
            self.pending = None;
            Some(value)
        } else {
            self.pending = Some(value);
            None
        }
    }

    /// Emits the pending trailing value once its interval has elapsed.
    pub fn poll(&mut self, now_ms: u64) -> Option<T> {
        if self.pending.is_none() || !self.is_open(now_ms) {
            return None;
        }
        self.last_emit_ms = Some(now_ms);
        self.pending.take()
    }

    /// Time at which the pending value becomes due.
    pub fn trailing_deadline(&self) -> Option<u64> {
        self.pending.as_ref()?;
        Some(
            self.last_emit_ms
                .map_or(0, |last| last.saturating_add(self.interval_ms)),
        )
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Takes the pending value regardless of timing.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take()
    }

    /// Drops any pending value and forgets the last emission.
    pub fn reset(&mut self) {
        self.pending = None;
        self.last_emit_ms = None;
    }
}
