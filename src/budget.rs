/// Ceiling on concurrently live particles, shared by every emitter of one scene.
///
/// Emitters call [`ParticleBudget::try_acquire`] before building a particle; the
/// particle pool calls [`ParticleBudget::release`] once per expiry. An emitter gives a
/// slot back only when the particle it was acquired for could not be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticleBudget {
    count: usize,
    max: usize,
}

impl ParticleBudget {
    pub fn new(max: usize) -> Self {
        Self { count: 0, max }
    }

    /// Called on every scene (re)build.
    pub fn reset(&mut self, max: usize) {
        self.count = 0;
        self.max = max;
    }

    /// Claims one slot. A refused claim leaves the count untouched.
    pub fn try_acquire(&mut self) -> bool {
        if !self.has_room() {
            return false;
        }
        self.count += 1;
        true
    }

    pub(crate) fn release(&mut self) {
        debug_assert!(self.count > 0, "particle budget released below zero");
        self.count = self.count.saturating_sub(1);
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn max(&self) -> usize {
        self.max
    }

    pub fn has_room(&self) -> bool {
        self.count < self.max
    }
}
