//! Neon Arcade - a deterministic 2D arcade runtime
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, motion, collisions, phases, scoring)
//! - `games`: Concrete games built on the simulation (Breakout, Pong, Space Invaders, Lights-Out)
//! - `engine`: One running game instance with input, scoring and rendering glue
//! - `renderer`: Pure display lists and the Canvas 2D surface
//! - `platform`: Frame loop driver and browser host
//! - `persistence`: Key/value storage boundary
//! - `tuning`: Data-driven game balance

pub mod bridge;
pub mod engine;
pub mod games;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use engine::{Engine, Runtime};
pub use highscores::HighScores;
pub use settings::{QualityPreset, Settings};
pub use tuning::Tuning;

use serde::{Deserialize, Serialize};

/// Runtime-wide constants
pub mod consts {
    /// Downward pull applied to debris particles every step
    pub const PARTICLE_GRAVITY: f32 = 0.08;
    /// Hard cap on live particles per world, regardless of settings
    pub const MAX_PARTICLES: usize = 256;
}

/// An sRGB color with alpha
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::hex(0xffffff);
    pub const BACKGROUND: Color = Color::hex(0x0b0b10);
    pub const CYAN: Color = Color::hex(0x00e5ff);
    pub const MAGENTA: Color = Color::hex(0xff00ff);
    pub const GREEN: Color = Color::hex(0x22c55e);
    pub const DIM: Color = Color::rgba(255, 255, 255, 38);

    /// Opaque color from a `0xRRGGBB` literal
    pub const fn hex(rgb: u32) -> Self {
        Self {
            r: (rgb >> 16) as u8,
            g: (rgb >> 8) as u8,
            b: rgb as u8,
            a: 255,
        }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// CSS color string for canvas fill styles
    pub fn to_css(self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!(
                "rgba({},{},{},{:.3})",
                self.r,
                self.g,
                self.b,
                self.a as f32 / 255.0
            )
        }
    }
}
