use std::f64::consts::TAU;
use web_sys::CanvasRenderingContext2d;
use crate::graphics::{css_rgba, Color, DrawCmd, Graphics, Shape};
use crate::scene_graph::{NodeId, SceneGraph};

pub fn render(ctx: &CanvasRenderingContext2d, graph: &SceneGraph, size: (f64, f64), resolution: f64, background: Color) {
    let (w, h) = size;
    ctx.set_transform(resolution, 0.0, 0.0, resolution, 0.0, 0.0).unwrap_or(());
    ctx.set_global_alpha(1.0);
    ctx.set_fill_style_str(&css_rgba(background, 1.0));
    ctx.fill_rect(0.0, 0.0, w, h);

    draw_node(ctx, graph, graph.root(), 1.0);
    ctx.set_global_alpha(1.0);
}

fn draw_node(ctx: &CanvasRenderingContext2d, graph: &SceneGraph, id: NodeId, parent_alpha: f64) {
    let node = match graph.node(id) {
        Some(n) => n,
        None => return,
    };
    let t = &node.transform;
    let alpha = parent_alpha * t.alpha.clamp(0.0, 1.0);
    if alpha <= 0.0 || t.scale <= 0.0 {
        return;
    }

    ctx.save();
    ctx.translate(t.x, t.y).unwrap_or(());
    if t.rotation != 0.0 {
        ctx.rotate(t.rotation).unwrap_or(());
    }
    if t.scale != 1.0 {
        ctx.scale(t.scale, t.scale).unwrap_or(());
    }

    if !node.graphics.is_empty() {
        draw_graphics(ctx, &node.graphics, alpha);
    }
    for child in node.children() {
        draw_node(ctx, graph, *child, alpha);
    }

    ctx.restore();
}

fn draw_graphics(ctx: &CanvasRenderingContext2d, graphics: &Graphics, alpha: f64) {
    for cmd in graphics.commands() {
        match cmd {
            DrawCmd::Fill { shape, paint } => {
                ctx.set_global_alpha(alpha * paint.alpha);
                ctx.set_fill_style_str(&css_rgba(paint.color, 1.0));
                ctx.begin_path();
                trace_shape(ctx, shape);
                ctx.fill();
            }
            DrawCmd::Lines { segments, paint, width } => {
                ctx.set_global_alpha(alpha * paint.alpha);
                ctx.set_stroke_style_str(&css_rgba(paint.color, 1.0));
                ctx.set_line_width(*width);
                ctx.begin_path();
                for [(x1, y1), (x2, y2)] in segments {
                    ctx.move_to(*x1, *y1);
                    ctx.line_to(*x2, *y2);
                }
                ctx.stroke();
            }
            DrawCmd::Arc { x, y, r, start, end, paint, width } => {
                ctx.set_global_alpha(alpha * paint.alpha);
                ctx.set_stroke_style_str(&css_rgba(paint.color, 1.0));
                ctx.set_line_width(*width);
                ctx.begin_path();
                let _ = ctx.arc(*x, *y, *r, *start, *end);
                ctx.stroke();
            }
        }
    }
}

fn trace_shape(ctx: &CanvasRenderingContext2d, shape: &Shape) {
    match shape {
        Shape::Rect { x, y, w, h } => ctx.rect(*x, *y, *w, *h),
        Shape::Circle { x, y, r } => {
            let _ = ctx.arc(*x, *y, *r, 0.0, TAU);
        }
        Shape::Poly(points) => {
            if let Some((first, rest)) = points.split_first() {
                ctx.move_to(first.0, first.1);
                for (x, y) in rest {
                    ctx.line_to(*x, *y);
                }
                ctx.close_path();
            }
        }
    }
}
