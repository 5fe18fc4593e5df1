//! Lights-Out
//!
//! A 5x5 grid of lights. Pressing a cell flips it and its orthogonal
//! neighbours; the goal is to switch everything off. Boards are scrambled
//! from the solved state with distinct presses, so every board is solvable
//! and the scramble itself is a known solution.

use std::cell::Cell;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::Color;
use crate::engine::Game;
use crate::renderer::{Align, Frame};
use crate::sim::{Aabb, Command, GameEvent, InputSnapshot, World};
use crate::tuning::LightsOutTuning;

pub const ID: &str = "lightsout";

/// Cells per side
pub const SIZE: usize = 5;
const CELLS: usize = SIZE * SIZE;

pub const WIDTH: f32 = 300.0;
pub const HEIGHT: f32 = 380.0;

const CELL: f32 = 46.0;
const CELL_GAP: f32 = 6.0;
const BOARD_TOP: f32 = 64.0;
const BOARD_LEFT: f32 = (WIDTH - (SIZE as f32 * CELL + (SIZE - 1) as f32 * CELL_GAP)) * 0.5;
const BUTTON_TOP: f32 = 336.0;
const BUTTON_W: f32 = 84.0;
const BUTTON_H: f32 = 26.0;

const UNLIT: Color = Color::hex(0x0a0a18);

/// A board as one bit per cell, row-major
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board(u32);

impl Board {
    fn bit(row: usize, col: usize) -> u32 {
        1 << (row * SIZE + col)
    }

    pub fn is_lit(self, row: usize, col: usize) -> bool {
        row < SIZE && col < SIZE && self.0 & Self::bit(row, col) != 0
    }

    pub fn lit_count(self) -> u32 {
        self.0.count_ones()
    }

    pub fn is_solved(self) -> bool {
        self.0 == 0
    }

    /// Press a cell: flip it and whichever orthogonal neighbours exist.
    /// Out-of-range presses do nothing.
    pub fn press(&mut self, row: usize, col: usize) {
        if row >= SIZE || col >= SIZE {
            return;
        }
        let mut mask = Self::bit(row, col);
        if row > 0 {
            mask |= Self::bit(row - 1, col);
        }
        if row + 1 < SIZE {
            mask |= Self::bit(row + 1, col);
        }
        if col > 0 {
            mask |= Self::bit(row, col - 1);
        }
        if col + 1 < SIZE {
            mask |= Self::bit(row, col + 1);
        }
        self.0 ^= mask;
    }

    /// Board reached from all-off by pressing every cell in `presses`
    pub fn scramble(presses: &[(usize, usize)]) -> Board {
        let mut board = Board::default();
        for &(row, col) in presses {
            board.press(row, col);
        }
        board
    }

    /// Scramble a solved board with `moves` distinct presses. Returns the
    /// board and the presses that produced it.
    pub fn generate<R: Rng + ?Sized>(moves: usize, rng: &mut R) -> (Board, Vec<(usize, usize)>) {
        let moves = moves.clamp(1, CELLS);
        Self::generate_from(|| {
            rand::seq::index::sample(&mut *rng, CELLS, moves)
                .into_iter()
                .map(|i| (i / SIZE, i % SIZE))
                .collect()
        })
    }

    /// Draw press sets until one leaves a light on. A set that cancels back
    /// to all-off (a quiet pattern) is thrown away and redrawn.
    pub fn generate_from<F>(mut draw: F) -> (Board, Vec<(usize, usize)>)
    where
        F: FnMut() -> Vec<(usize, usize)>,
    {
        loop {
            let presses = draw();
            let board = Self::scramble(&presses);
            if !board.is_solved() {
                return (board, presses);
            }
            log::debug!("scramble of {} cancelled out, redrawing", presses.len());
        }
    }
}

/// Scramble depth presets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "EASY",
            Difficulty::Medium => "MEDIUM",
            Difficulty::Hard => "HARD",
        }
    }

    pub fn color(self) -> Color {
        match self {
            Difficulty::Easy => Color::GREEN,
            Difficulty::Medium => Color::CYAN,
            Difficulty::Hard => Color::MAGENTA,
        }
    }

    pub fn moves(self, tuning: &LightsOutTuning) -> usize {
        match self {
            Difficulty::Easy => tuning.easy_moves,
            Difficulty::Medium => tuning.medium_moves,
            Difficulty::Hard => tuning.hard_moves,
        }
    }
}

/// Points for solving in `moves` presses
pub fn solve_score(moves: u32) -> u32 {
    200u32.saturating_sub(moves.saturating_mul(4)).max(1)
}

fn cell_rect(row: usize, col: usize) -> Aabb {
    Aabb::from_corner(
        BOARD_LEFT + col as f32 * (CELL + CELL_GAP),
        BOARD_TOP + row as f32 * (CELL + CELL_GAP),
        CELL,
        CELL,
    )
}

fn button_rect(index: usize) -> Aabb {
    let spacing = (WIDTH - 3.0 * BUTTON_W) / 4.0;
    Aabb::from_corner(
        spacing + index as f32 * (BUTTON_W + spacing),
        BUTTON_TOP,
        BUTTON_W,
        BUTTON_H,
    )
}

/// Cell under a point, gaps excluded
pub fn cell_at(p: Vec2) -> Option<(usize, usize)> {
    (0..SIZE)
        .flat_map(|row| (0..SIZE).map(move |col| (row, col)))
        .find(|&(row, col)| cell_rect(row, col).contains_point(p))
}

fn difficulty_at(p: Vec2) -> Option<Difficulty> {
    Difficulty::ALL
        .into_iter()
        .enumerate()
        .find(|(i, _)| button_rect(*i).contains_point(p))
        .map(|(_, d)| d)
}

/// Lights-Out with its scramble depths. The chosen difficulty outlives a
/// single run so that restarting keeps it.
#[derive(Debug, Clone, Default)]
pub struct LightsOut {
    pub tuning: LightsOutTuning,
    difficulty: Cell<Difficulty>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LightsOutState {
    pub world: World,
    pub board: Board,
    pub difficulty: Difficulty,
    /// Presses that generated the board; replaying them solves it
    pub solution: Vec<(usize, usize)>,
    pub moves: u32,
}

impl LightsOut {
    pub fn new(tuning: LightsOutTuning) -> Self {
        Self {
            tuning,
            difficulty: Cell::new(Difficulty::default()),
        }
    }

    pub fn with_difficulty(self, difficulty: Difficulty) -> Self {
        self.difficulty.set(difficulty);
        self
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty.get()
    }

    fn deal(&self, state: &mut LightsOutState, difficulty: Difficulty) {
        let (board, solution) = Board::generate(difficulty.moves(&self.tuning), state.world.rng());
        state.board = board;
        state.solution = solution;
        state.difficulty = difficulty;
        state.moves = 0;
        log::info!("{} board with {} lights", difficulty.label(), board.lit_count());
    }

    /// Apply one press. Returns true if it solved the board.
    fn press(&self, state: &mut LightsOutState, row: usize, col: usize) -> bool {
        state.board.press(row, col);
        state.world.emit(GameEvent::TargetHit {
            points: 0,
            destroyed: false,
        });
        if state.board.is_solved() {
            // Scored on the presses made before the solving one
            state.world.progress.award(solve_score(state.moves));
            state.moves += 1;
            state.world.end_run(true);
            return true;
        }
        state.moves += 1;
        false
    }
}

impl Game for LightsOut {
    type State = LightsOutState;

    fn id(&self) -> &'static str {
        ID
    }

    fn title(&self) -> &'static str {
        "LIGHTS OUT"
    }

    fn instructions(&self) -> &'static [&'static str] {
        &["Each cell flips its neighbours"]
    }

    fn size(&self) -> Vec2 {
        Vec2::new(WIDTH, HEIGHT)
    }

    fn fresh_state(&self, seed: u64) -> LightsOutState {
        let mut state = LightsOutState {
            world: World::new(seed, 1),
            board: Board::default(),
            difficulty: self.difficulty(),
            solution: Vec::new(),
            moves: 0,
        };
        self.deal(&mut state, self.difficulty());
        state
    }

    fn world<'a>(&self, state: &'a LightsOutState) -> &'a World {
        &state.world
    }

    fn world_mut<'a>(&self, state: &'a mut LightsOutState) -> &'a mut World {
        &mut state.world
    }

    fn step(&self, state: &mut LightsOutState, input: &InputSnapshot) {
        for command in &input.commands {
            let Command::Primary { at: Some(p) } = *command else {
                continue;
            };
            if let Some((row, col)) = cell_at(p) {
                if self.press(state, row, col) {
                    return;
                }
            } else if let Some(difficulty) = difficulty_at(p) {
                self.difficulty.set(difficulty);
                self.deal(state, difficulty);
            }
        }
    }

    fn draw(&self, state: &LightsOutState, frame: &mut Frame) {
        let color = state.difficulty.color();

        if frame.show_hud() {
            let stats = [
                ("MOVES", state.moves.to_string(), color),
                ("LIGHTS", state.board.lit_count().to_string(), Color::WHITE),
            ];
            for (i, (label, value, value_color)) in stats.into_iter().enumerate() {
                let x = WIDTH * (0.3 + 0.4 * i as f32);
                frame.text(label, Vec2::new(x, 16.0), 9.0, Align::Center, Color::DIM);
                frame.title(value, Vec2::new(x, 38.0), 22.0, value_color, 0.0);
            }
        }

        for row in 0..SIZE {
            for col in 0..SIZE {
                let rect = cell_rect(row, col);
                if state.board.is_lit(row, col) {
                    frame.rounded_rect(rect, Color::CYAN, 10.0, 18.0);
                } else {
                    frame.rounded_rect(rect, UNLIT, 10.0, 0.0);
                }
            }
        }

        for (i, difficulty) in Difficulty::ALL.into_iter().enumerate() {
            let rect = button_rect(i);
            let selected = difficulty == state.difficulty;
            let (fill, text) = if selected {
                (difficulty.color().with_alpha(40), difficulty.color())
            } else {
                (Color::WHITE.with_alpha(13), Color::WHITE.with_alpha(77))
            };
            frame.rounded_rect(rect, fill, 12.0, if selected { 12.0 } else { 0.0 });
            frame.text(difficulty.label(), rect.center(), 10.0, Align::Center, text);
        }
    }
}
