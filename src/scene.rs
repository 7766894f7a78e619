use std::cell::RefCell;
use std::rc::Rc;
use crate::budget::ParticleBudget;
use crate::config::SceneSettings;
use crate::constants::{MAX_FRAME_ELAPSED_MS, TICKER_FRAME_MS};
use crate::particles::ParticlePool;
use crate::rng::Rng;
use crate::rockets::{Emitter, Rocket, RocketKind, RocketParams};
use crate::scene_graph::{Node, NodeId, SceneGraph};

pub type SharedScene = Rc<RefCell<Scene>>;

/// The whole simulated background: rockets, their particles and the budget they share.
/// Browser-free; the host feeds it frame times and paints its graph.
pub struct Scene {
    graph: SceneGraph,
    layer: Option<NodeId>,
    rockets: Vec<Rocket>,
    particles: ParticlePool,
    budget: ParticleBudget,
    rng: Rng,
    settings: SceneSettings,
    clock_ms: f64,
    active: bool,
}

impl Scene {
    pub fn new(settings: SceneSettings, rng: Rng) -> Self {
        let mut scene = Self {
            graph: SceneGraph::new(),
            layer: None,
            rockets: Vec::new(),
            particles: ParticlePool::new(),
            budget: ParticleBudget::new(settings.max_particles),
            rng,
            settings: settings.clone(),
            clock_ms: 0.0,
            active: false,
        };
        scene.rebuild(settings);
        scene
    }

    /// Drops every rocket and particle and populates a fresh rocket layer.
    pub fn rebuild(&mut self, settings: SceneSettings) {
        self.clear();
        self.settings = settings;
        self.budget.reset(self.settings.max_particles);

        let root = self.graph.root();
        self.layer = self.graph.spawn(root, Node::new("rockets"));
        for _ in 0..self.settings.rocket_count {
            let kind = RocketKind::from_index(self.rng.index(RocketKind::ALL.len()));
            let params = RocketParams::random(&mut self.rng, kind, &self.settings);
            self.spawn_rocket(params);
        }
        self.active = true;
    }

    pub fn spawn_rocket(&mut self, params: RocketParams) -> Option<&Rocket> {
        let layer = self.layer?;
        let rocket = Rocket::spawn(&mut self.graph, layer, params, self.settings.tier)?;
        self.rockets.push(rocket);
        self.rockets.last()
    }

    /// Stops all simulation; later ticks are no-ops until the next rebuild.
    pub fn teardown(&mut self) {
        self.clear();
        self.active = false;
    }

    fn clear(&mut self) {
        if let Some(layer) = self.layer.and_then(|id| self.graph.node(id)) {
            log::debug!("clearing '{}' layer: {} rockets, {} particles", layer.label, self.rockets.len(), self.budget.count());
        }
        self.rockets.clear();
        self.particles.clear();
        let root = self.graph.root();
        self.graph.clear_children(root);
        self.layer = None;
        self.budget.reset(self.settings.max_particles);
    }

    /// One rendered frame. Particles catch up on their fixed-step clocks first so
    /// the ones emitted this frame start from zero elapsed time.
    pub fn tick(&mut self, elapsed_ms: f64) {
        if !self.active {
            return;
        }
        let elapsed_ms = elapsed_ms.clamp(0.0, MAX_FRAME_ELAPSED_MS);
        self.clock_ms += elapsed_ms;
        let delta = elapsed_ms / TICKER_FRAME_MS;

        self.particles.update(elapsed_ms, &mut self.graph, &mut self.budget);

        let tier = self.settings.tier;
        let (width, height) = (self.settings.width, self.settings.height);
        for rocket in self.rockets.iter_mut() {
            rocket.advance(&mut self.graph, delta, width, height, &mut self.rng);
            let mut emitter = Emitter {
                graph: &mut self.graph,
                pool: &mut self.particles,
                budget: &mut self.budget,
                rng: &mut self.rng,
                tier,
            };
            emitter.roll(rocket);
            rocket.pulse(&mut self.graph, self.clock_ms, tier);
        }
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn rockets(&self) -> &[Rocket] {
        &self.rockets
    }

    pub fn budget(&self) -> &ParticleBudget {
        &self.budget
    }

    #[cfg(test)]
    pub fn particles(&self) -> &ParticlePool {
        &self.particles
    }

    pub fn settings(&self) -> &SceneSettings {
        &self.settings
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DeviceProfile, DeviceTier, SceneOptions};
    use crate::rockets::Wobble;

    fn settings(width: f64, cores: Option<u32>) -> SceneSettings {
        let profile = DeviceProfile { width, height: 700.0, pixel_ratio: 1.0, hardware_concurrency: cores };
        SceneSettings::resolve(&profile, &SceneOptions::default())
    }

    fn run(scene: &mut Scene, frames: usize) {
        for _ in 0..frames {
            scene.tick(1000.0 / 30.0);
        }
    }

    #[test]
    fn test_build_spawns_table_count() {
        assert_eq!(Scene::new(settings(1024.0, None), Rng::new(1)).rockets().len(), 8);
        assert_eq!(Scene::new(settings(1920.0, None), Rng::new(1)).rockets().len(), 15);
        assert_eq!(Scene::new(settings(320.0, Some(2)), Rng::new(1)).rockets().len(), 4);
        assert_eq!(Scene::new(settings(320.0, Some(8)), Rng::new(1)).rockets().len(), 6);
    }

    #[test]
    fn test_rockets_start_below_viewport() {
        let scene = Scene::new(settings(1280.0, None), Rng::new(3));
        for r in scene.rockets() {
            let (x, y) = r.position(scene.graph()).unwrap();
            assert_eq!(y, 750.0);
            assert!((0.0..1280.0).contains(&x));
        }
    }

    #[test]
    fn test_budget_holds_over_long_run() {
        let mut scene = Scene::new(settings(1920.0, None), Rng::new(9));
        for _ in 0..600 {
            scene.tick(1000.0 / 30.0);
            let b = scene.budget();
            assert!(b.count() <= b.max());
            assert_eq!(b.count(), scene.particles().len());
        }
        assert!(scene.budget().count() > 0);
    }

    #[test]
    fn test_low_power_ceiling() {
        let mut scene = Scene::new(settings(375.0, Some(2)), Rng::new(5));
        assert_eq!(scene.settings().tier, DeviceTier::LowPower);
        assert_eq!(scene.budget().max(), 120);
        run(&mut scene, 300);
        assert!(scene.budget().count() <= 120);
    }

    #[test]
    fn test_rebuild_resets_budget_and_population() {
        let mut scene = Scene::new(settings(1920.0, None), Rng::new(11));
        run(&mut scene, 60);
        assert!(scene.budget().count() > 0);
        let old_rocket = scene.rockets()[0].node;

        scene.rebuild(settings(1024.0, None));
        assert_eq!(scene.budget().count(), 0);
        assert!(scene.particles().is_empty());
        assert_eq!(scene.rockets().len(), 8);
        assert!(!scene.graph().contains(old_rocket));
        assert_eq!(scene.graph().children(scene.graph().root()).len(), 1);
    }

    #[test]
    fn test_single_rocket_climbs_fifty_units() {
        let mut s = settings(1280.0, None);
        s.rocket_count = 0;
        let mut scene = Scene::new(s, Rng::new(2));
        let params = RocketParams {
            kind: RocketKind::Classic,
            x: 640.0,
            y: 600.0,
            size: 1.0,
            speed: 1.0,
            heading: 0.0,
            wobble: Wobble::NONE,
        };
        scene.spawn_rocket(params).unwrap();
        run(&mut scene, 50);
        let (x, y) = scene.rockets()[0].position(scene.graph()).unwrap();
        assert!((y - 550.0).abs() < 1e-9);
        assert!((x - 640.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_ceiling_scene_has_no_particles() {
        let mut s = settings(1920.0, None);
        s.max_particles = 0;
        let mut scene = Scene::new(s, Rng::new(4));
        run(&mut scene, 200);
        assert_eq!(scene.budget().count(), 0);
        assert!(scene.particles().is_empty());
    }

    #[test]
    fn test_teardown_freezes_former_particles() {
        let mut scene = Scene::new(settings(1920.0, None), Rng::new(21));
        run(&mut scene, 20);
        let live: Vec<NodeId> = scene.particles().iter().map(|p| p.node).take(10).collect();
        assert_eq!(live.len(), 10);

        scene.teardown();
        assert!(!scene.is_active());
        assert!(scene.particles().is_empty());
        assert!(scene.rockets().is_empty());
        assert_eq!(scene.budget().count(), 0);

        let nodes = scene.graph().len();
        run(&mut scene, 30);
        assert_eq!(scene.graph().len(), nodes);
        for id in live {
            assert!(scene.graph().node(id).is_none());
        }
    }

    #[test]
    fn test_particles_expire_eventually() {
        let mut scene = Scene::new(settings(1920.0, None), Rng::new(8));
        run(&mut scene, 30);
        let first: Vec<NodeId> = scene.particles().iter().map(|p| p.node).collect();
        assert!(!first.is_empty());
        // Longest standard life is 50 steps at fade 1.
        run(&mut scene, 60);
        for id in first {
            assert!(scene.particles().iter().all(|p| p.node != id));
        }
    }

    #[test]
    fn test_huge_frame_gap_is_clamped() {
        let mut s = settings(1280.0, None);
        s.rocket_count = 0;
        let mut scene = Scene::new(s, Rng::new(2));
        let params = RocketParams {
            kind: RocketKind::Tall,
            x: 640.0,
            y: 600.0,
            size: 1.0,
            speed: 1.0,
            heading: 0.0,
            wobble: Wobble { offset: 0.0, speed: 0.01, amount: 0.0 },
        };
        scene.spawn_rocket(params).unwrap();
        scene.tick(60_000.0);
        let wobble = scene.rockets()[0].wobble.offset;
        assert!((wobble - 0.01 * MAX_FRAME_ELAPSED_MS / TICKER_FRAME_MS).abs() < 1e-9);
    }
}
