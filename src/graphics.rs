/// 0xRRGGBB
pub type Color = u32;

pub const WHITE: Color = 0xFFFFFF;
pub const BLACK: Color = 0x000000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paint {
    pub color: Color,
    pub alpha: f64,
}

impl Paint {
    pub const fn new(color: Color, alpha: f64) -> Self {
        Self { color, alpha }
    }

    pub const fn solid(color: Color) -> Self {
        Self { color, alpha: 1.0 }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Rect { x: f64, y: f64, w: f64, h: f64 },
    Circle { x: f64, y: f64, r: f64 },
    Poly(Vec<(f64, f64)>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    Fill { shape: Shape, paint: Paint },
    Lines { segments: Vec<[(f64, f64); 2]>, paint: Paint, width: f64 },
    Arc { x: f64, y: f64, r: f64, start: f64, end: f64, paint: Paint, width: f64 },
}

/// Retained list of vector primitives in node-local coordinates.
/// Built once when a visual object is spawned, replayed by the renderer every frame.
#[derive(Debug, Clone, Default)]
pub struct Graphics {
    cmds: Vec<DrawCmd>,
}

impl Graphics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, paint: Paint) -> &mut Self {
        self.cmds.push(DrawCmd::Fill { shape: Shape::Rect { x, y, w, h }, paint });
        self
    }

    pub fn fill_circle(&mut self, x: f64, y: f64, r: f64, paint: Paint) -> &mut Self {
        self.cmds.push(DrawCmd::Fill { shape: Shape::Circle { x, y, r }, paint });
        self
    }

    pub fn fill_poly(&mut self, points: &[(f64, f64)], paint: Paint) -> &mut Self {
        if points.len() >= 3 {
            self.cmds.push(DrawCmd::Fill { shape: Shape::Poly(points.to_vec()), paint });
        }
        self
    }

    pub fn stroke_lines(&mut self, segments: &[[(f64, f64); 2]], width: f64, paint: Paint) -> &mut Self {
        if !segments.is_empty() {
            self.cmds.push(DrawCmd::Lines { segments: segments.to_vec(), paint, width });
        }
        self
    }

    pub fn stroke_arc(&mut self, x: f64, y: f64, r: f64, start: f64, end: f64, width: f64, paint: Paint) -> &mut Self {
        self.cmds.push(DrawCmd::Arc { x, y, r, start, end, paint, width });
        self
    }

    pub fn commands(&self) -> &[DrawCmd] {
        &self.cmds
    }

    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.cmds.len()
    }
}

pub fn css_rgba(color: Color, alpha: f64) -> String {
    let r = (color >> 16) & 0xFF;
    let g = (color >> 8) & 0xFF;
    let b = color & 0xFF;
    format!("rgba({}, {}, {}, {})", r, g, b, alpha.clamp(0.0, 1.0))
}
