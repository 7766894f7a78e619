use crate::graphics::Color;

// Scene
pub const BACKGROUND: Color = 0x050A30;
pub const RESIZE_DEBOUNCE_MS: u32 = 300;
pub const RESIZE_DEBOUNCE_MAX_MS: u32 = 500;
pub const MAX_PARTICLES: usize = 240;
pub const MAX_PARTICLES_LOW_POWER: usize = 120;

// Breakpoints (px)
pub const SMALL_BREAKPOINT: f64 = 480.0;
pub const MOBILE_BREAKPOINT: f64 = 768.0;
pub const WIDE_BREAKPOINT: f64 = 1200.0;

// Rockets enter and re-enter this far below the bottom edge
pub const SPAWN_MARGIN: f64 = 50.0;
// ...and wrap once this far past the top or sides
pub const WRAP_MARGIN: f64 = 50.0;
pub const MAX_HEADING: f64 = std::f64::consts::FRAC_PI_4;
pub const NOSE_WIGGLE: f64 = 0.2;
pub const GLOW_PULSE_PERIOD_MS: f64 = 400.0;

// Pixi-style ticker units: 1.0 == one 60 Hz frame
pub const TICKER_FRAME_MS: f64 = 1000.0 / 60.0;
// Frame deltas above this are clamped (background tabs, debugger pauses)
pub const MAX_FRAME_ELAPSED_MS: f64 = 100.0;

pub struct SizeRange {
    pub min: f64,
    pub max: f64,
}

pub const DESKTOP_SIZE: SizeRange = SizeRange { min: 0.7, max: 1.3 };
pub const MOBILE_SIZE: SizeRange = SizeRange { min: 0.8, max: 1.5 };

/// Per-tier emission thresholds: a particle is emitted when `random() > threshold`.
pub struct EmissionRates {
    pub exhaust: f64,
    pub fire_trail: f64,
    pub burst: f64,
}

pub const EMISSION: EmissionRates = EmissionRates { exhaust: 0.6, fire_trail: 0.75, burst: 0.98 };
pub const EMISSION_LOW_POWER: EmissionRates = EmissionRates { exhaust: 0.8, fire_trail: 0.9, burst: 0.995 };

// Colors per rocket type
pub struct ColorScheme {
    pub body: Color,
    pub head: Color,
    pub fins: Color,
    pub particles: [Color; 4],
    pub glow: Color,
    pub fire: [Color; 4],
}

pub const COLOR_SCHEMES: [ColorScheme; 4] = [
    // Classic
    ColorScheme {
        body: 0xFFFFFF,
        head: 0xFF3300,
        fins: 0xFF6600,
        particles: [0xFF6600, 0xFFAA00, 0xFF3300, 0xFFDD00],
        glow: 0xFF8844,
        fire: [0xFF3300, 0xFF6600, 0xFFAA00, 0xFFFF00],
    },
    // Tall
    ColorScheme {
        body: 0x33CCFF,
        head: 0x3366FF,
        fins: 0x0033CC,
        particles: [0x33CCFF, 0x66FFFF, 0x00FFFF, 0x00CCFF],
        glow: 0x66AAFF,
        fire: [0x00DDFF, 0x00BBFF, 0x00FFFF, 0x99EEFF],
    },
    // Capsule
    ColorScheme {
        body: 0xFFD700,
        head: 0xFF8C00,
        fins: 0xFFA500,
        particles: [0xFF8C00, 0xFFD700, 0xFFFF00, 0xFFEE44],
        glow: 0xFFBB33,
        fire: [0xFFDD00, 0xFF8800, 0xFFCC00, 0xFFFF44],
    },
    // Shuttle
    ColorScheme {
        body: 0xAA00FF,
        head: 0x9900FF,
        fins: 0xCC00FF,
        particles: [0x9900FF, 0xFF00FF, 0xEE77FF, 0xCC88FF],
        glow: 0xCC66FF,
        fire: [0xFF00FF, 0xDD00FF, 0xEE77FF, 0xFF99FF],
    },
];
