//! Canvas 2D surface

use std::f64::consts::TAU;

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::frame::{DrawCmd, Frame, Surface};
use crate::Color;
use crate::sim::Aabb;

/// Replays frames onto a canvas element's 2D context
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    /// Wrap a canvas, sizing its backing store to the logical field size.
    /// Scaling to the page is left to CSS.
    pub fn new(canvas: HtmlCanvasElement, width: u32, height: u32) -> Option<Self> {
        canvas.set_width(width);
        canvas.set_height(height);
        let ctx = canvas
            .get_context("2d")
            .ok()??
            .dyn_into::<CanvasRenderingContext2d>()
            .ok()?;
        Some(Self { canvas, ctx })
    }

    /// Whether the canvas is still attached to the document
    pub fn is_connected(&self) -> bool {
        self.canvas.is_connected()
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    fn glow(&self, color: Color, blur: f32) {
        if blur > 0.0 {
            self.ctx.set_shadow_color(&color.to_css());
            self.ctx.set_shadow_blur(blur as f64);
        } else {
            self.ctx.set_shadow_blur(0.0);
        }
    }

    fn rounded_path(&self, rect: &Aabb, radius: f32) {
        let (x0, y0) = (rect.min.x as f64, rect.min.y as f64);
        let (x1, y1) = (rect.max.x as f64, rect.max.y as f64);
        let r = (radius as f64).min((x1 - x0) * 0.5).min((y1 - y0) * 0.5);

        self.ctx.begin_path();
        self.ctx.move_to(x0 + r, y0);
        let _ = self.ctx.arc_to(x1, y0, x1, y1, r);
        let _ = self.ctx.arc_to(x1, y1, x0, y1, r);
        let _ = self.ctx.arc_to(x0, y1, x0, y0, r);
        let _ = self.ctx.arc_to(x0, y0, x1, y0, r);
        self.ctx.close_path();
    }

    fn draw(&self, frame: &Frame, cmd: &DrawCmd) {
        let ctx = &self.ctx;
        match cmd {
            DrawCmd::Clear { color } => {
                ctx.set_shadow_blur(0.0);
                ctx.set_fill_style_str(&color.to_css());
                ctx.fill_rect(0.0, 0.0, frame.size.x as f64, frame.size.y as f64);
            }
            DrawCmd::Rect {
                rect,
                color,
                corner_radius,
                glow,
            } => {
                self.glow(*color, *glow);
                ctx.set_fill_style_str(&color.to_css());
                if *corner_radius > 0.0 {
                    self.rounded_path(rect, *corner_radius);
                    ctx.fill();
                } else {
                    ctx.fill_rect(
                        rect.min.x as f64,
                        rect.min.y as f64,
                        rect.width() as f64,
                        rect.height() as f64,
                    );
                }
            }
            DrawCmd::Circle {
                center,
                radius,
                color,
                glow,
            } => {
                self.glow(*color, *glow);
                ctx.set_fill_style_str(&color.to_css());
                ctx.begin_path();
                let _ = ctx.arc(center.x as f64, center.y as f64, *radius as f64, 0.0, TAU);
                ctx.fill();
            }
            DrawCmd::Line {
                from,
                to,
                color,
                width,
                dash,
            } => {
                ctx.set_shadow_blur(0.0);
                ctx.set_stroke_style_str(&color.to_css());
                ctx.set_line_width(*width as f64);
                let pattern = js_sys::Array::new();
                if let Some(dash) = dash {
                    pattern.push(&(*dash as f64).into());
                    pattern.push(&(*dash as f64).into());
                }
                let _ = ctx.set_line_dash(&pattern);
                ctx.begin_path();
                ctx.move_to(from.x as f64, from.y as f64);
                ctx.line_to(to.x as f64, to.y as f64);
                ctx.stroke();
                let _ = ctx.set_line_dash(&js_sys::Array::new());
            }
            DrawCmd::Text {
                text,
                pos,
                size,
                bold,
                align,
                color,
                glow,
            } => {
                self.glow(*color, *glow);
                let weight = if *bold { "bold " } else { "" };
                ctx.set_font(&format!("{weight}{size}px monospace"));
                ctx.set_text_align(align.as_str());
                ctx.set_text_baseline("middle");
                ctx.set_fill_style_str(&color.to_css());
                let _ = ctx.fill_text(text, pos.x as f64, pos.y as f64);
            }
        }
    }
}

impl Surface for CanvasSurface {
    fn present(&mut self, frame: &Frame) {
        for cmd in &frame.cmds {
            self.draw(frame, cmd);
        }
        self.ctx.set_shadow_blur(0.0);
    }
}
