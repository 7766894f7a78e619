use gloo_timers::callback::Timeout;

/// Coalesces bursts of events into one callback fired `delay_ms` after the last one.
pub struct Debouncer {
    delay_ms: u32,
    pending: Option<Timeout>,
}

impl Debouncer {
    pub fn new(delay_ms: u32) -> Self {
        Self { delay_ms, pending: None }
    }

    /// Replaces any pending callback with `f`.
    pub fn schedule(&mut self, f: impl FnOnce() + 'static) {
        self.cancel();
        self.pending = Some(Timeout::new(self.delay_ms, f));
    }

    pub fn cancel(&mut self) {
        if let Some(timeout) = self.pending.take() {
            timeout.cancel();
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
