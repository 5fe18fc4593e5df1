//! Events emitted during a simulation step.
//! The engine drains them after every step; hosts can forward them to
//! sound, toasts or remote sync.

use super::entity::Team;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    Started,
    Launched,
    PaddleHit,
    WallHit,
    /// A projectile left a shooter
    Fired { team: Team },
    TargetHit { points: u32, destroyed: bool },
    LifeLost { remaining: u8 },
    WaveCleared { level: u32 },
    Continued { level: u32 },
    Paused,
    Resumed,
    RunEnded { score: u64, won: bool },
}
