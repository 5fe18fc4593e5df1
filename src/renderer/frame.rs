//! Display lists
//!
//! A `Frame` is an ordered list of 2D drawing commands in logical canvas
//! units. Games build one from their state without touching any surface;
//! a `Surface` then replays it.

use glam::Vec2;

use crate::Color;
use crate::settings::Settings;
use crate::sim::Aabb;

/// Horizontal text anchoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

impl Align {
    pub fn as_str(self) -> &'static str {
        match self {
            Align::Left => "left",
            Align::Center => "center",
            Align::Right => "right",
        }
    }
}

/// One drawing operation
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    Clear {
        color: Color,
    },
    Rect {
        rect: Aabb,
        color: Color,
        corner_radius: f32,
        glow: f32,
    },
    Circle {
        center: Vec2,
        radius: f32,
        color: Color,
        glow: f32,
    },
    Line {
        from: Vec2,
        to: Vec2,
        color: Color,
        width: f32,
        dash: Option<f32>,
    },
    Text {
        text: String,
        pos: Vec2,
        size: f32,
        bold: bool,
        align: Align,
        color: Color,
        glow: f32,
    },
}

/// A complete frame ready to present
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Logical canvas size
    pub size: Vec2,
    pub cmds: Vec<DrawCmd>,
    glow: bool,
    hud: bool,
}

impl Frame {
    pub fn new(size: Vec2, settings: &Settings) -> Self {
        Self {
            size,
            cmds: Vec::with_capacity(128),
            glow: !settings.reduced_motion,
            hud: settings.show_hud,
        }
    }

    /// Whether score/lives text should be drawn
    pub fn show_hud(&self) -> bool {
        self.hud
    }

    fn glow(&self, amount: f32) -> f32 {
        if self.glow { amount } else { 0.0 }
    }

    pub fn clear(&mut self, color: Color) {
        self.cmds.push(DrawCmd::Clear { color });
    }

    pub fn rect(&mut self, rect: Aabb, color: Color, glow: f32) {
        let glow = self.glow(glow);
        self.cmds.push(DrawCmd::Rect {
            rect,
            color,
            corner_radius: 0.0,
            glow,
        });
    }

    pub fn rounded_rect(&mut self, rect: Aabb, color: Color, corner_radius: f32, glow: f32) {
        let glow = self.glow(glow);
        self.cmds.push(DrawCmd::Rect {
            rect,
            color,
            corner_radius,
            glow,
        });
    }

    pub fn circle(&mut self, center: Vec2, radius: f32, color: Color, glow: f32) {
        let glow = self.glow(glow);
        self.cmds.push(DrawCmd::Circle {
            center,
            radius,
            color,
            glow,
        });
    }

    pub fn dashed_line(&mut self, from: Vec2, to: Vec2, color: Color, width: f32, dash: f32) {
        self.cmds.push(DrawCmd::Line {
            from,
            to,
            color,
            width,
            dash: Some(dash),
        });
    }

    pub fn text(
        &mut self,
        text: impl Into<String>,
        pos: Vec2,
        size: f32,
        align: Align,
        color: Color,
    ) {
        self.cmds.push(DrawCmd::Text {
            text: text.into(),
            pos,
            size,
            bold: false,
            align,
            color,
            glow: 0.0,
        });
    }

    pub fn title(
        &mut self,
        text: impl Into<String>,
        pos: Vec2,
        size: f32,
        color: Color,
        glow: f32,
    ) {
        let glow = self.glow(glow);
        self.cmds.push(DrawCmd::Text {
            text: text.into(),
            pos,
            size,
            bold: true,
            align: Align::Center,
            color,
            glow,
        });
    }

    /// Dim the whole field and print a centered title with prompt lines
    pub fn overlay(&mut self, title: &str, color: Color, lines: &[&str]) {
        let center = self.size * 0.5;
        self.rect(
            Aabb::new(Vec2::ZERO, self.size),
            Color::BACKGROUND.with_alpha(212),
            0.0,
        );
        self.title(title, center - Vec2::new(0.0, 30.0), 26.0, color, 16.0);
        for (i, line) in lines.iter().enumerate() {
            let (size, color) = if i == 0 { (14.0, Color::WHITE) } else { (11.0, Color::DIM) };
            self.text(
                *line,
                center + Vec2::new(0.0, 4.0 + i as f32 * 22.0),
                size,
                Align::Center,
                color,
            );
        }
    }

    /// Every text string in the frame, in draw order
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.cmds.iter().filter_map(|cmd| match cmd {
            DrawCmd::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// Anything that can show a frame
pub trait Surface {
    fn present(&mut self, frame: &Frame);
}
