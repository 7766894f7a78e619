use std::f64::consts::{FRAC_PI_2, PI};
use crate::graphics::{Color, Graphics, Paint, WHITE};

/// Elongated teardrop with a white highlight core.
pub fn draw_flame(g: &mut Graphics, size: f64, color: Color, alpha: f64) {
    let s = size;
    g.fill_poly(&[
        (0.0, -s * 1.2),
        (s * 0.6, -s * 0.4),
        (s * 0.4, s * 0.4),
        (0.0, s * 0.8),
        (-s * 0.4, s * 0.4),
        (-s * 0.6, -s * 0.4),
    ], Paint::new(color, alpha));
    g.fill_poly(&[
        (0.0, -s * 0.8),
        (s * 0.3, -s * 0.2),
        (s * 0.2, s * 0.2),
        (0.0, s * 0.4),
        (-s * 0.2, s * 0.2),
        (-s * 0.3, -s * 0.2),
    ], Paint::new(WHITE, 0.7));
}

/// Three concentric discs plus three motion streaks at 120 degrees.
pub fn draw_energy_trail(g: &mut Graphics, size: f64, color: Color, alpha: f64) {
    g.fill_circle(0.0, 0.0, size, Paint::new(color, alpha * 0.5));
    g.fill_circle(0.0, 0.0, size * 0.7, Paint::new(color, alpha));
    g.fill_circle(0.0, 0.0, size * 0.3, Paint::new(WHITE, alpha));

    let streaks: Vec<[(f64, f64); 2]> = (0..3)
        .map(|i| {
            let angle = i as f64 / 3.0 * PI * 2.0;
            let (sin, cos) = angle.sin_cos();
            [(cos * size * 0.4, sin * size * 0.4), (cos * size * 0.7, sin * size * 0.7)]
        })
        .collect();
    g.stroke_lines(&streaks, 1.0, Paint::new(WHITE, alpha * 0.8));
}

/// Four-point star with a white core.
pub fn draw_energy_burst(g: &mut Graphics, size: f64, color: Color, alpha: f64) {
    g.fill_poly(&star_points(0.0, 0.0, 4, size, size * 0.5, 0.0), Paint::new(color, alpha * 0.7));
    g.fill_circle(0.0, 0.0, size * 0.3, Paint::new(WHITE, alpha));
}

/// Classic five-point star, first point up.
pub fn draw_star(g: &mut Graphics, x: f64, y: f64, size: f64, paint: Paint) {
    g.fill_poly(&star_points(x, y, 5, size, size / 2.0, -FRAC_PI_2), paint);
}

/// Alternating outer/inner vertices, `points * 2` in total.
pub fn star_points(x: f64, y: f64, points: usize, outer: f64, inner: f64, offset: f64) -> Vec<(f64, f64)> {
    let step = PI / points as f64;
    (0..points * 2)
        .map(|i| {
            let radius = if i % 2 == 0 { outer } else { inner };
            let angle = i as f64 * step + offset;
            (x + radius * angle.cos(), y + radius * angle.sin())
        })
        .collect()
}
