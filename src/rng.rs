/// xorshift64 source owned by one scene; seedable so a run can be replayed.
#[derive(Debug, Clone)]
pub struct Rng {
    state: u64,
}

impl Rng {
    pub fn new(seed: u64) -> Self {
        Self { state: if seed == 0 { 0x9E37_79B9_7F4A_7C15 } else { seed } }
    }

    /// Seed once from `Math.random`. Browser only.
    pub fn from_js() -> Self {
        let seed = (js_sys::Math::random() * u64::MAX as f64) as u64;
        Self::new(seed)
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Uniform in [0, 1).
    pub fn random(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform in [lo, hi).
    pub fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + self.random() * (hi - lo)
    }

    /// Uniform in [-half, half).
    pub fn spread(&mut self, half: f64) -> f64 {
        (self.random() - 0.5) * 2.0 * half
    }

    /// Uniform integer in [0, n).
    pub fn index(&mut self, n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        ((self.random() * n as f64) as usize).min(n - 1)
    }

    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.index(items.len())]
    }

    /// One roll of `random() > threshold`.
    pub fn roll_above(&mut self, threshold: f64) -> bool {
        self.random() > threshold
    }
}
