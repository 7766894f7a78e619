use crate::budget::ParticleBudget;
use crate::scene_graph::{NodeId, SceneGraph, Transform};

/// Particles advance in fixed 30 Hz steps regardless of the display frame rate.
pub const FIXED_STEP_MS: f64 = 1000.0 / 30.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimateOptions {
    pub fade_rate: f64,
    pub scale_with_life: bool,
    pub grow_over_life: bool,
    pub scale_variance: bool,
}

impl Default for AnimateOptions {
    fn default() -> Self {
        Self { fade_rate: 1.0, scale_with_life: true, grow_over_life: false, scale_variance: false }
    }
}

impl AnimateOptions {
    pub fn fade(fade_rate: f64) -> Self {
        Self { fade_rate, ..Self::default() }
    }

    /// Trail/flame particles swell as they die.
    pub fn growing(fade_rate: f64) -> Self {
        Self { fade_rate, grow_over_life: true, ..Self::default() }
    }

    /// Exhaust particles shrink with a flicker.
    pub fn flickering(fade_rate: f64) -> Self {
        Self { fade_rate, scale_variance: true, ..Self::default() }
    }
}

#[derive(Debug, Clone)]
pub struct Particle {
    pub node: NodeId,
    pub container: NodeId,
    pub vx: f64,
    pub vy: f64,
    pub rotation_speed: Option<f64>,
    pub life: f64,
    pub max_life: f64,
    pub options: AnimateOptions,
    accumulator: f64,
}

impl Particle {
    pub fn new(
        node: NodeId,
        container: NodeId,
        velocity: (f64, f64),
        rotation_speed: Option<f64>,
        max_life: f64,
        options: AnimateOptions,
    ) -> Self {
        Self {
            node,
            container,
            vx: velocity.0,
            vy: velocity.1,
            rotation_speed,
            life: max_life,
            max_life,
            options,
            accumulator: 0.0,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.life <= 0.0
    }

    /// Feeds real elapsed time in and runs as many fixed steps as fit.
    /// Returns the number of steps taken; visuals are refreshed only when at least one ran.
    fn advance(&mut self, elapsed_ms: f64, t: &mut Transform) -> usize {
        self.accumulator += elapsed_ms;
        if self.accumulator < FIXED_STEP_MS {
            return 0;
        }

        let mut steps = 0;
        while self.accumulator >= FIXED_STEP_MS {
            t.x += self.vx;
            t.y += self.vy;
            if let Some(spin) = self.rotation_speed {
                t.rotation += spin;
            }
            self.life -= self.options.fade_rate;
            self.accumulator -= FIXED_STEP_MS;
            steps += 1;
            if self.is_expired() {
                break;
            }
        }

        let (alpha, scale) = visual_state(self.life, self.max_life, &self.options);
        t.alpha = alpha;
        if let Some(scale) = scale {
            t.scale = scale;
        }
        steps
    }
}

/// Alpha and (optionally) scale for a given remaining life.
pub fn visual_state(life: f64, max_life: f64, options: &AnimateOptions) -> (f64, Option<f64>) {
    let ratio = if max_life > 0.0 { (life / max_life).clamp(0.0, 1.0) } else { 0.0 };
    let alpha = ratio * if options.grow_over_life { 0.8 } else { 1.0 };

    let mut scale = None;
    if options.scale_with_life {
        scale = Some(if options.scale_variance {
            ratio * (0.6 + (life / 5.0).sin() * 0.4)
        } else {
            ratio
        });
    }
    if options.grow_over_life {
        scale = Some(1.0 + (1.0 - ratio) * 0.5);
    }
    (alpha, scale)
}

/// All live particles of a scene, stepped in one batched pass per frame.
#[derive(Debug, Default)]
pub struct ParticlePool {
    particles: Vec<Particle>,
}

impl ParticlePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes over a particle whose node is already attached to `particle.container`
    /// and whose budget slot is already claimed.
    pub fn animate(&mut self, particle: Particle) {
        self.particles.push(particle);
    }

    /// Steps every particle, detaching and releasing the ones that expire.
    /// Returns how many expired.
    pub fn update(&mut self, elapsed_ms: f64, graph: &mut SceneGraph, budget: &mut ParticleBudget) -> usize {
        let mut expired = 0;
        let mut i = 0;
        while i < self.particles.len() {
            let p = &mut self.particles[i];
            // A particle whose container went away dies with it; the slot still has to come back.
            let alive = graph.contains(p.container)
                && match graph.transform_mut(p.node) {
                    Some(t) => {
                        p.advance(elapsed_ms, t);
                        !p.is_expired()
                    }
                    None => false,
                };

            if alive {
                i += 1;
            } else {
                let node = p.node;
                graph.remove(node);
                budget.release();
                self.particles.swap_remove(i);
                expired += 1;
            }
        }
        expired
    }

    /// Forgets every particle without touching the graph or the budget.
    /// Used on teardown, where both are rebuilt from scratch.
    pub fn clear(&mut self) {
        self.particles.clear();
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }
}
