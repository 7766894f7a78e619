use std::f64::consts::{PI, TAU};
use crate::budget::ParticleBudget;
use crate::config::{DeviceTier, SceneSettings};
use crate::constants::*;
use crate::graphics::{Color, Graphics, Paint, WHITE, BLACK};
use crate::particles::{AnimateOptions, Particle, ParticlePool};
use crate::rng::Rng;
use crate::scene_graph::{Node, NodeId, SceneGraph};
use crate::shapes::{draw_energy_burst, draw_energy_trail, draw_flame, draw_star};

const PANEL_GREY: Color = 0x999999;
const WINDOW_CYAN: Color = 0x88FFFF;
const PORTHOLE_BLUE: Color = 0x88CCFF;
const COCKPIT_CYAN: Color = 0xAAFFFF;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RocketKind {
    Classic,
    Tall,
    Capsule,
    Shuttle,
}

impl RocketKind {
    pub const ALL: [RocketKind; 4] = [RocketKind::Classic, RocketKind::Tall, RocketKind::Capsule, RocketKind::Shuttle];

    pub fn from_index(i: usize) -> Self {
        Self::ALL[i % Self::ALL.len()]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn colors(self) -> &'static ColorScheme {
        &COLOR_SCHEMES[self.index()]
    }

    pub fn style(self) -> &'static RocketStyle {
        &STYLES[self.index()]
    }
}

/// Per-kind drawing strategies. `detailed` is false on low-power devices.
pub struct RocketStyle {
    pub draw_body: fn(&mut Graphics, &ColorScheme, bool),
    pub draw_glow: fn(&mut Graphics, Color, bool),
    pub draw_exhaust: fn(&mut Graphics, f64, Paint),
    pub draw_fire: fn(&mut Graphics, f64, Color, bool),
    /// Wing glow plus a pulsing core glow, detailed mode only.
    pub winged: bool,
}

static STYLES: [RocketStyle; 4] = [
    RocketStyle { draw_body: classic_body, draw_glow: round_glow, draw_exhaust: exhaust_circle, draw_fire: fire_flame, winged: false },
    RocketStyle { draw_body: tall_body, draw_glow: round_glow, draw_exhaust: exhaust_square, draw_fire: fire_energy_trail, winged: false },
    RocketStyle { draw_body: capsule_body, draw_glow: capsule_glow, draw_exhaust: exhaust_triangle, draw_fire: fire_glow_orb, winged: false },
    RocketStyle { draw_body: shuttle_body, draw_glow: shuttle_glow, draw_exhaust: exhaust_star, draw_fire: fire_energy_burst, winged: true },
];

fn mirrored(points: &[(f64, f64)]) -> Vec<(f64, f64)> {
    points.iter().map(|&(x, y)| (-x, y)).collect()
}

fn classic_body(g: &mut Graphics, c: &ColorScheme, detailed: bool) {
    g.fill_rect(-5.0, -15.0, 10.0, 30.0, Paint::solid(c.body))
        .fill_rect(-4.0, -5.0, 8.0, 3.0, Paint::solid(PANEL_GREY))
        .fill_rect(-4.0, -10.0, 3.0, 12.0, Paint::new(WHITE, 0.4))
        .fill_poly(&[(-5.0, -15.0), (5.0, -15.0), (0.0, -25.0)], Paint::solid(c.head));

    let fin = [(-5.0, 15.0), (-15.0, 15.0), (-5.0, 0.0)];
    g.fill_poly(&fin, Paint::solid(c.fins)).fill_poly(&mirrored(&fin), Paint::solid(c.fins));

    if detailed {
        let highlight = [(-7.0, 12.0), (-12.0, 13.0), (-6.0, 3.0)];
        g.fill_poly(&highlight, Paint::new(c.body, 0.5))
            .fill_poly(&mirrored(&highlight), Paint::new(c.body, 0.5))
            .stroke_lines(&[[(-3.0, -12.0), (3.0, -12.0)]], 1.0, Paint::new(WHITE, 0.7))
            .fill_circle(-2.0, -18.0, 1.0, Paint::new(WHITE, 0.8));
    }
}

fn tall_body(g: &mut Graphics, c: &ColorScheme, detailed: bool) {
    g.fill_rect(-4.0, -20.0, 8.0, 40.0, Paint::solid(c.body))
        .fill_rect(-4.0, -10.0, 8.0, 2.0, Paint::solid(PANEL_GREY))
        .fill_rect(-4.0, 5.0, 8.0, 2.0, Paint::solid(PANEL_GREY))
        .fill_poly(&[(-4.0, -20.0), (4.0, -20.0), (0.0, -35.0)], Paint::solid(c.head));

    let fin = [(-4.0, 20.0), (-16.0, 30.0), (-4.0, 5.0)];
    g.fill_poly(&fin, Paint::solid(c.fins)).fill_poly(&mirrored(&fin), Paint::solid(c.fins));

    if detailed {
        g.stroke_lines(
            &[[(-4.0, 15.0), (-10.0, 20.0)], [(4.0, 15.0), (10.0, 20.0)]],
            1.0,
            Paint::new(BLACK, 0.3),
        );
    }

    let window = Paint::new(WINDOW_CYAN, 0.9);
    for (x, y) in [(-2.0, -5.0), (2.0, -5.0), (-2.0, 0.0), (2.0, 0.0)] {
        g.fill_circle(x, y, 1.5, window);
    }
}

fn capsule_body(g: &mut Graphics, c: &ColorScheme, detailed: bool) {
    g.fill_rect(-6.0, -10.0, 12.0, 25.0, Paint::solid(c.body))
        .fill_circle(-3.0, 0.0, 2.0, Paint::solid(PORTHOLE_BLUE))
        .fill_circle(3.0, 0.0, 2.0, Paint::solid(PORTHOLE_BLUE))
        .fill_circle(0.0, -10.0, 6.0, Paint::solid(c.head));

    let fin = [(-6.0, 15.0), (-12.0, 20.0), (-6.0, 5.0)];
    g.fill_poly(&fin, Paint::solid(c.fins)).fill_poly(&mirrored(&fin), Paint::solid(c.fins));

    if detailed {
        g.fill_rect(-6.0, 5.0, 12.0, 3.0, Paint::new(c.head, 0.7));
    }

    g.fill_circle(-3.0, 0.0, 2.5, Paint::new(PORTHOLE_BLUE, 0.9))
        .fill_circle(3.0, 0.0, 2.5, Paint::new(PORTHOLE_BLUE, 0.9));

    if detailed {
        g.stroke_arc(0.0, -10.0, 6.0, 0.0, PI, 1.0, Paint::new(c.head, 0.8));
    }
}

fn shuttle_body(g: &mut Graphics, c: &ColorScheme, detailed: bool) {
    g.fill_rect(-5.0, -15.0, 10.0, 30.0, Paint::solid(c.body))
        .fill_rect(-3.0, -8.0, 6.0, 12.0, Paint::new(WINDOW_CYAN, 0.7))
        .fill_circle(0.0, -15.0, 5.0, Paint::solid(c.head));

    let wing = [(-5.0, 5.0), (-20.0, 0.0), (-20.0, -5.0), (-5.0, -5.0)];
    g.fill_poly(&wing, Paint::solid(c.fins)).fill_poly(&mirrored(&wing), Paint::solid(c.fins));

    if detailed {
        g.stroke_lines(
            &[[(-5.0, 0.0), (-15.0, -2.0)], [(5.0, 0.0), (15.0, -2.0)]],
            1.0,
            Paint::new(c.head, 0.6),
        );
    }

    g.fill_rect(-3.0, -8.0, 6.0, 14.0, Paint::new(COCKPIT_CYAN, 0.8));
}

fn glow_paint(color: Color, detailed: bool) -> Paint {
    Paint::new(color, if detailed { 0.4 } else { 0.2 })
}

fn round_glow(g: &mut Graphics, color: Color, detailed: bool) {
    g.fill_circle(0.0, 0.0, if detailed { 26.0 } else { 15.0 }, glow_paint(color, detailed));
}

fn capsule_glow(g: &mut Graphics, color: Color, detailed: bool) {
    g.fill_circle(0.0, -5.0, if detailed { 22.0 } else { 15.0 }, glow_paint(color, detailed));
}

fn shuttle_glow(g: &mut Graphics, color: Color, detailed: bool) {
    if detailed {
        g.fill_rect(-25.0, -25.0, 50.0, 50.0, glow_paint(color, detailed));
    }
    g.fill_circle(0.0, -15.0, if detailed { 18.0 } else { 15.0 }, glow_paint(color, detailed));
}

fn exhaust_circle(g: &mut Graphics, size: f64, paint: Paint) {
    g.fill_circle(0.0, 0.0, size, paint);
}

fn exhaust_square(g: &mut Graphics, size: f64, paint: Paint) {
    g.fill_rect(-size / 2.0, -size / 2.0, size, size, paint);
}

fn exhaust_triangle(g: &mut Graphics, size: f64, paint: Paint) {
    g.fill_poly(&[(0.0, -size), (size, size), (-size, size)], paint);
}

fn exhaust_star(g: &mut Graphics, size: f64, paint: Paint) {
    draw_star(g, 0.0, 0.0, size, paint);
}

fn fire_flame(g: &mut Graphics, size: f64, color: Color, _detailed: bool) {
    draw_flame(g, size, color, 0.8);
}

fn fire_energy_trail(g: &mut Graphics, size: f64, color: Color, _detailed: bool) {
    draw_energy_trail(g, size, color, 0.8);
}

fn fire_glow_orb(g: &mut Graphics, size: f64, color: Color, detailed: bool) {
    g.fill_circle(0.0, 0.0, size, Paint::new(color, 0.8));
    if detailed {
        g.fill_circle(0.0, 0.0, size * 0.4, Paint::new(WHITE, 0.5));
    }
}

fn fire_energy_burst(g: &mut Graphics, size: f64, color: Color, _detailed: bool) {
    draw_energy_burst(g, size, color, 0.8);
}

pub fn random_heading(rng: &mut Rng) -> f64 {
    rng.range(-MAX_HEADING, MAX_HEADING)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wobble {
    pub offset: f64,
    pub speed: f64,
    pub amount: f64,
}

#[cfg(test)]
impl Wobble {
    pub const NONE: Wobble = Wobble { offset: 0.0, speed: 0.0, amount: 0.0 };
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RocketParams {
    pub kind: RocketKind,
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub speed: f64,
    pub heading: f64,
    pub wobble: Wobble,
}

impl RocketParams {
    pub fn random(rng: &mut Rng, kind: RocketKind, settings: &SceneSettings) -> Self {
        let low = settings.tier.is_low_power();
        Self {
            kind,
            x: rng.random() * settings.width,
            y: settings.height + SPAWN_MARGIN,
            size: rng.range(settings.min_size, settings.max_size),
            speed: 0.8 + rng.random() * if low { 1.5 } else { 2.0 },
            heading: random_heading(rng),
            wobble: Wobble {
                offset: rng.random() * TAU,
                speed: rng.random() * if low { 0.04 } else { 0.08 },
                amount: if low { 0.01 } else { 0.02 },
            },
        }
    }
}

/// One sprite plus the containers its particles live in.
#[derive(Debug, Clone)]
pub struct Rocket {
    pub node: NodeId,
    pub kind: RocketKind,
    pub speed: f64,
    pub heading: f64,
    pub wobble: Wobble,
    pub glow: NodeId,
    pub fire_trail: NodeId,
    pub trail: NodeId,
    pub core_glow: Option<NodeId>,
}

impl Rocket {
    pub fn spawn(graph: &mut SceneGraph, parent: NodeId, params: RocketParams, tier: DeviceTier) -> Option<Rocket> {
        let detailed = !tier.is_low_power();
        let style = params.kind.style();
        let colors = params.kind.colors();

        let mut root = Node::new("rocket").at(params.x, params.y);
        root.transform.scale = params.size;
        root.transform.rotation = params.heading;
        let node = graph.spawn(parent, root)?;

        let mut body = Graphics::new();
        (style.draw_body)(&mut body, colors, detailed);
        graph.spawn(node, Node::new("body").with_graphics(body))?;

        let mut core_glow = None;
        if style.winged && detailed {
            let mut wing = Graphics::new();
            wing.fill_rect(-25.0, -8.0, 50.0, 10.0, Paint::new(colors.fins, 0.3));
            graph.spawn(node, Node::new("wing-glow").with_graphics(wing))?;

            let mut core = Graphics::new();
            core.fill_circle(0.0, 0.0, 10.0, Paint::new(COCKPIT_CYAN, 0.5));
            core_glow = Some(graph.spawn(node, Node::new("core-glow").with_graphics(core))?);
        }

        let mut halo = Graphics::new();
        (style.draw_glow)(&mut halo, colors.glow, detailed);
        let glow = graph.spawn(node, Node::new("glow").with_graphics(halo))?;

        let fire_trail = graph.spawn(node, Node::new("fire-trail").at(0.0, 20.0))?;
        let trail = graph.spawn(node, Node::new("trail"))?;

        Some(Rocket {
            node,
            kind: params.kind,
            speed: params.speed,
            heading: params.heading,
            wobble: params.wobble,
            glow,
            fire_trail,
            trail,
            core_glow,
        })
    }

    #[cfg(test)]
    pub fn position(&self, graph: &SceneGraph) -> Option<(f64, f64)> {
        graph.transform(self.node).map(|t| (t.x, t.y))
    }

    /// Moves one frame along the wobbling heading. `delta` is in 60 Hz frame units
    /// and only drives the wobble phase. Returns true when the rocket wrapped.
    pub fn advance(&mut self, graph: &mut SceneGraph, delta: f64, width: f64, height: f64, rng: &mut Rng) -> bool {
        let t = match graph.transform_mut(self.node) {
            Some(t) => t,
            None => return false,
        };

        self.wobble.offset += self.wobble.speed * delta;
        let wobble = self.wobble.offset.sin() * self.wobble.amount;
        let heading = self.heading + wobble;
        t.x += heading.sin() * self.speed;
        t.y -= heading.cos() * self.speed;
        t.rotation = self.heading + wobble * NOSE_WIGGLE;

        if t.y < -WRAP_MARGIN || t.x < -WRAP_MARGIN || t.x > width + WRAP_MARGIN {
            t.x = rng.random() * width;
            t.y = height + SPAWN_MARGIN;
            self.heading = random_heading(rng);
            t.rotation = self.heading;
            return true;
        }
        false
    }

    /// Halo breathing and the shuttle's core pulse.
    pub fn pulse(&self, graph: &mut SceneGraph, now_ms: f64, tier: DeviceTier) {
        let wave = (now_ms / GLOW_PULSE_PERIOD_MS).sin();
        let halo = if tier.is_low_power() { 0.95 + wave * 0.1 } else { 0.9 + wave * 0.15 };
        if let Some(t) = graph.transform_mut(self.glow) {
            t.scale = halo;
        }
        if let Some(t) = self.core_glow.and_then(|id| graph.transform_mut(id)) {
            t.scale = 0.7 + wave * 0.4;
        }
    }
}

/// Borrowed view of the scene state the particle emitters need.
pub struct Emitter<'a> {
    pub graph: &'a mut SceneGraph,
    pub pool: &'a mut ParticlePool,
    pub budget: &'a mut ParticleBudget,
    pub rng: &'a mut Rng,
    pub tier: DeviceTier,
}

impl Emitter<'_> {
    /// Claims a budget slot and attaches a particle node to `container`.
    /// The claim is handed back if the container is gone.
    fn claim(&mut self, container: NodeId, node: Node) -> Option<NodeId> {
        if !self.budget.try_acquire() {
            return None;
        }
        let id = self.graph.spawn(container, node);
        if id.is_none() {
            self.budget.release();
        }
        id
    }

    /// The three independent per-frame emission rolls. Returns particles created.
    pub fn roll(&mut self, rocket: &Rocket) -> usize {
        let rates = self.tier.emission();
        let mut created = 0;
        if self.rng.roll_above(rates.exhaust) && self.exhaust(rocket) {
            created += 1;
        }
        if self.rng.roll_above(rates.fire_trail) && self.fire_trail(rocket) {
            created += 1;
        }
        if self.rng.roll_above(rates.burst) {
            created += self.burst(rocket);
        }
        created
    }

    pub fn exhaust(&mut self, rocket: &Rocket) -> bool {
        let low = self.tier.is_low_power();
        let rng = &mut *self.rng;
        let size = if low { rng.range(1.0, 2.5) } else { rng.range(1.5, 4.0) };
        let color = *rng.pick(&rocket.kind.colors().particles);

        let mut g = Graphics::new();
        (rocket.kind.style().draw_exhaust)(&mut g, size, Paint::new(color, 0.9));
        let node = Node::new("exhaust").with_graphics(g).at(rng.spread(4.0), 15.0);

        let spin = rng.spread(0.15);
        let velocity = (rng.spread(0.8), rng.range(1.2, 2.7));
        let life = if low { rng.range(15.0, 30.0) } else { rng.range(20.0, 50.0) };
        let with_glow = !low && rng.random() > 0.7;

        let id = match self.claim(rocket.trail, node) {
            Some(id) => id,
            None => return false,
        };
        if with_glow {
            let mut halo = Graphics::new();
            halo.fill_circle(0.0, 0.0, size * 1.8, Paint::new(color, 0.3));
            self.graph.spawn(id, Node::new("exhaust-glow").with_graphics(halo));
        }
        let options = AnimateOptions::flickering(if low { 1.2 } else { 1.0 });
        self.pool.animate(Particle::new(id, rocket.trail, velocity, Some(spin), life, options));
        true
    }

    pub fn fire_trail(&mut self, rocket: &Rocket) -> bool {
        let low = self.tier.is_low_power();
        let rng = &mut *self.rng;
        let size = if low { rng.range(2.0, 5.0) } else { rng.range(3.0, 8.0) };
        let color = *rng.pick(&rocket.kind.colors().fire);

        let mut g = Graphics::new();
        (rocket.kind.style().draw_fire)(&mut g, size, color, !low);
        let node = Node::new("fire").with_graphics(g).at(rng.spread(5.0), rng.range(20.0, 25.0));

        let spin = rng.spread(0.1);
        let velocity = (rng.spread(0.4), rng.range(1.5, 3.0));
        let life = if low { rng.range(15.0, 30.0) } else { rng.range(20.0, 45.0) };

        let id = match self.claim(rocket.fire_trail, node) {
            Some(id) => id,
            None => return false,
        };
        let options = AnimateOptions::growing(if low { 1.2 } else { 1.0 });
        self.pool.animate(Particle::new(id, rocket.fire_trail, velocity, Some(spin), life, options));
        true
    }

    /// A short spray of exhaust-shaped sparks. Stops early once the budget is full.
    pub fn burst(&mut self, rocket: &Rocket) -> usize {
        let low = self.tier.is_low_power();
        let count = if low { 3 + self.rng.index(2) } else { 4 + self.rng.index(4) };
        let options = AnimateOptions::fade(if low { 2.0 } else { 1.5 });

        let mut created = 0;
        for _ in 0..count {
            let rng = &mut *self.rng;
            let size = if low { rng.range(0.7, 1.7) } else { rng.range(1.0, 2.5) };
            let color = *rng.pick(&rocket.kind.colors().particles);

            let mut g = Graphics::new();
            (rocket.kind.style().draw_exhaust)(&mut g, size, Paint::new(color, 0.9));
            let node = Node::new("spark").with_graphics(g).at(rng.spread(6.0), 15.0);

            let velocity = (rng.spread(1.5), rng.range(2.0, 5.0));
            let life = if low { rng.range(5.0, 10.0) } else { rng.range(10.0, 20.0) };
            let spin = rng.spread(0.15);

            let id = match self.claim(rocket.trail, node) {
                Some(id) => id,
                None => break,
            };
            self.pool.animate(Particle::new(id, rocket.trail, velocity, Some(spin), life, options));
            created += 1;
        }
        created
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct World {
        graph: SceneGraph,
        pool: ParticlePool,
        budget: ParticleBudget,
        rng: Rng,
    }

    fn world(max_particles: usize) -> World {
        World { graph: SceneGraph::new(), pool: ParticlePool::new(), budget: ParticleBudget::new(max_particles), rng: Rng::new(1234) }
    }

    impl World {
        fn emitter(&mut self, tier: DeviceTier) -> Emitter<'_> {
            Emitter { graph: &mut self.graph, pool: &mut self.pool, budget: &mut self.budget, rng: &mut self.rng, tier }
        }

        fn rocket(&mut self, params: RocketParams, tier: DeviceTier) -> Rocket {
            let root = self.graph.root();
            Rocket::spawn(&mut self.graph, root, params, tier).unwrap()
        }
    }

    fn straight_up(kind: RocketKind) -> RocketParams {
        RocketParams { kind, x: 400.0, y: 650.0, size: 1.0, speed: 1.0, heading: 0.0, wobble: Wobble::NONE }
    }

    #[test]
    fn test_spawn_builds_containers() {
        let mut w = world(10);
        let r = w.rocket(straight_up(RocketKind::Classic), DeviceTier::Standard);
        let labels: Vec<_> = w.graph.children(r.node).iter().map(|id| w.graph.node(*id).unwrap().label).collect();
        assert_eq!(labels, ["body", "glow", "fire-trail", "trail"]);
        assert_eq!(w.graph.transform(r.fire_trail).unwrap().y, 20.0);
        assert!(r.core_glow.is_none());
    }

    #[test]
    fn test_shuttle_gets_wing_and_core_glow_when_detailed() {
        let mut w = world(10);
        let detailed = w.rocket(straight_up(RocketKind::Shuttle), DeviceTier::Standard);
        assert!(detailed.core_glow.is_some());
        assert_eq!(w.graph.children(detailed.node).len(), 6);

        let plain = w.rocket(straight_up(RocketKind::Shuttle), DeviceTier::LowPower);
        assert!(plain.core_glow.is_none());
        assert_eq!(w.graph.children(plain.node).len(), 4);
    }

    #[test]
    fn test_low_power_body_has_less_detail() {
        for kind in RocketKind::ALL {
            let mut detailed = Graphics::new();
            let mut plain = Graphics::new();
            (kind.style().draw_body)(&mut detailed, kind.colors(), true);
            (kind.style().draw_body)(&mut plain, kind.colors(), false);
            assert!(!plain.is_empty());
            assert!(detailed.len() > plain.len(), "{kind:?}");
        }
    }

    #[test]
    fn test_kind_index_wraps() {
        assert_eq!(RocketKind::from_index(0), RocketKind::Classic);
        assert_eq!(RocketKind::from_index(3), RocketKind::Shuttle);
        assert_eq!(RocketKind::from_index(5), RocketKind::Tall);
    }

    #[test]
    fn test_straight_climb_fifty_ticks() {
        let mut w = world(0);
        let mut r = w.rocket(straight_up(RocketKind::Classic), DeviceTier::Standard);
        for _ in 0..50 {
            assert!(!r.advance(&mut w.graph, 1.0, 800.0, 600.0, &mut w.rng));
        }
        let (x, y) = r.position(&w.graph).unwrap();
        assert!((y - 600.0).abs() < 1e-9);
        assert!((x - 400.0).abs() < 1e-9);
    }

    #[test]
    fn test_y_decreases_until_wrap() {
        let mut w = world(0);
        let settings = SceneSettings {
            width: 800.0, height: 600.0, tier: DeviceTier::Standard, resolution: 1.0, max_fps: 30,
            rocket_count: 1, max_particles: 0, min_size: 0.7, max_size: 1.3, background: BACKGROUND,
        };
        let params = RocketParams::random(&mut w.rng, RocketKind::Tall, &settings);
        let mut r = w.rocket(params, DeviceTier::Standard);
        let (_, mut last_y) = r.position(&w.graph).unwrap();
        for _ in 0..2000 {
            let wrapped = r.advance(&mut w.graph, 1.0, 800.0, 600.0, &mut w.rng);
            let (_, y) = r.position(&w.graph).unwrap();
            if wrapped {
                assert_eq!(y, 600.0 + SPAWN_MARGIN);
            } else {
                assert!(y < last_y);
            }
            last_y = y;
        }
    }

    #[test]
    fn test_wrap_repositions_instead_of_removing() {
        let mut w = world(0);
        let mut r = w.rocket(RocketParams { y: -49.5, ..straight_up(RocketKind::Capsule) }, DeviceTier::Standard);
        let nodes_before = w.graph.len();
        assert!(r.advance(&mut w.graph, 1.0, 800.0, 600.0, &mut w.rng));
        let (x, y) = r.position(&w.graph).unwrap();
        assert_eq!(y, 650.0);
        assert!((0.0..800.0).contains(&x));
        assert!(r.heading.abs() <= MAX_HEADING);
        assert_eq!(w.graph.len(), nodes_before);
    }

    #[test]
    fn test_wrap_on_side_edges() {
        let mut w = world(0);
        let mut left = w.rocket(RocketParams { x: -49.9, heading: -1.0, ..straight_up(RocketKind::Classic) }, DeviceTier::Standard);
        assert!(left.advance(&mut w.graph, 1.0, 800.0, 600.0, &mut w.rng));
        let mut right = w.rocket(RocketParams { x: 849.9, heading: 1.0, ..straight_up(RocketKind::Classic) }, DeviceTier::Standard);
        assert!(right.advance(&mut w.graph, 1.0, 800.0, 600.0, &mut w.rng));
    }

    #[test]
    fn test_nose_wiggle_is_a_fraction_of_wobble() {
        let mut w = world(0);
        let params = RocketParams { wobble: Wobble { offset: 0.0, speed: PI / 2.0, amount: 0.1 }, ..straight_up(RocketKind::Tall) };
        let mut r = w.rocket(params, DeviceTier::Standard);
        r.advance(&mut w.graph, 1.0, 800.0, 600.0, &mut w.rng);
        let rotation = w.graph.transform(r.node).unwrap().rotation;
        assert!((rotation - 0.1 * NOSE_WIGGLE).abs() < 1e-12);
        assert_eq!(r.heading, 0.0);
    }

    #[test]
    fn test_zero_budget_emits_nothing() {
        let mut w = world(0);
        let r = w.rocket(straight_up(RocketKind::Shuttle), DeviceTier::Standard);
        let mut e = w.emitter(DeviceTier::Standard);
        assert!(!e.exhaust(&r));
        assert!(!e.fire_trail(&r));
        assert_eq!(e.burst(&r), 0);
        for _ in 0..500 {
            assert_eq!(e.roll(&r), 0);
        }
        assert_eq!(w.budget.count(), 0);
        assert!(w.pool.is_empty());
        assert!(w.graph.children(r.trail).is_empty());
        assert!(w.graph.children(r.fire_trail).is_empty());
    }

    #[test]
    fn test_emitters_use_their_containers() {
        let mut w = world(100);
        let r = w.rocket(straight_up(RocketKind::Classic), DeviceTier::Standard);
        let mut e = w.emitter(DeviceTier::Standard);
        assert!(e.exhaust(&r));
        assert!(e.fire_trail(&r));
        assert_eq!(w.graph.children(r.trail).len(), 1);
        assert_eq!(w.graph.children(r.fire_trail).len(), 1);
        assert_eq!(w.budget.count(), 2);
        assert_eq!(w.pool.len(), 2);
        assert!(w.pool.iter().any(|p| p.options.grow_over_life && p.container == r.fire_trail));
        assert!(w.pool.iter().any(|p| p.options.scale_variance && p.container == r.trail));
    }

    #[test]
    fn test_burst_size_by_tier() {
        for (tier, lo, hi) in [(DeviceTier::Standard, 4, 7), (DeviceTier::LowPower, 3, 4)] {
            let mut w = world(10_000);
            let r = w.rocket(straight_up(RocketKind::Tall), tier);
            for _ in 0..200 {
                let n = w.emitter(tier).burst(&r);
                assert!((lo..=hi).contains(&n), "{tier:?} burst of {n}");
            }
        }
    }

    #[test]
    fn test_burst_stops_at_ceiling() {
        let mut w = world(2);
        let r = w.rocket(straight_up(RocketKind::Capsule), DeviceTier::Standard);
        assert_eq!(w.emitter(DeviceTier::Standard).burst(&r), 2);
        assert_eq!(w.budget.count(), 2);
        assert_eq!(w.pool.len(), 2);
    }

    #[test]
    fn test_budget_never_exceeded_under_load() {
        let mut w = world(25);
        let r = w.rocket(straight_up(RocketKind::Classic), DeviceTier::Standard);
        for _ in 0..1000 {
            w.emitter(DeviceTier::Standard).roll(&r);
            assert!(w.budget.count() <= 25);
            assert_eq!(w.budget.count(), w.pool.len());
        }
    }

    #[test]
    fn test_claim_returns_slot_when_container_gone() {
        let mut w = world(5);
        let r = w.rocket(straight_up(RocketKind::Classic), DeviceTier::Standard);
        w.graph.remove(r.node);
        assert!(!w.emitter(DeviceTier::Standard).exhaust(&r));
        assert_eq!(w.budget.count(), 0);
    }

    #[test]
    fn test_pulse_scales_glows() {
        let mut w = world(0);
        let r = w.rocket(straight_up(RocketKind::Shuttle), DeviceTier::Standard);
        r.pulse(&mut w.graph, 0.0, DeviceTier::Standard);
        assert!((w.graph.transform(r.glow).unwrap().scale - 0.9).abs() < 1e-12);
        assert!((w.graph.transform(r.core_glow.unwrap()).unwrap().scale - 0.7).abs() < 1e-12);

        let peak = GLOW_PULSE_PERIOD_MS * PI / 2.0;
        r.pulse(&mut w.graph, peak, DeviceTier::LowPower);
        assert!((w.graph.transform(r.glow).unwrap().scale - 1.05).abs() < 1e-9);
    }
}
