//! Game phase state machine
//!
//! Legal transitions:
//! - Idle -> Playing on Start
//! - Playing -> LevelUp on WaveCleared
//! - LevelUp -> Playing on Continue
//! - Playing -> Over on RunEnded
//! - Over -> Playing on Restart
//! - Playing <-> Paused on Pause
//!
//! Anything else is ignored; callers get `None` back and leave the phase alone.

use serde::{Deserialize, Serialize};

/// Current phase of a game instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Phase {
    /// Waiting for the first start, instructions overlay shown
    #[default]
    Idle,
    /// Simulation active
    Playing,
    /// Between waves, waiting for continue
    LevelUp,
    /// Frozen until unpaused
    Paused,
    /// Run ended, final score shown
    Over,
}

/// Something that may move the machine to another phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Start,
    WaveCleared,
    Continue,
    RunEnded,
    Restart,
    Pause,
}

impl Phase {
    /// Next phase for `trigger`, or `None` if the trigger is irrelevant here
    pub fn on(self, trigger: Trigger) -> Option<Phase> {
        use Phase::*;
        use Trigger::*;

        match (self, trigger) {
            (Idle, Start) => Some(Playing),
            (Playing, WaveCleared) => Some(LevelUp),
            (LevelUp, Continue) => Some(Playing),
            (Playing, RunEnded) => Some(Over),
            (Over, Restart) => Some(Playing),
            (Playing, Pause) => Some(Paused),
            (Paused, Pause) => Some(Playing),
            _ => None,
        }
    }

    /// Whether the simulation advances in this phase
    pub fn is_active(self) -> bool {
        self == Phase::Playing
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Playing => "playing",
            Phase::LevelUp => "levelup",
            Phase::Paused => "paused",
            Phase::Over => "over",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_PHASES: [Phase; 5] = [
        Phase::Idle,
        Phase::Playing,
        Phase::LevelUp,
        Phase::Paused,
        Phase::Over,
    ];
    const ALL_TRIGGERS: [Trigger; 6] = [
        Trigger::Start,
        Trigger::WaveCleared,
        Trigger::Continue,
        Trigger::RunEnded,
        Trigger::Restart,
        Trigger::Pause,
    ];

    #[test]
    fn test_legal_transitions() {
        assert_eq!(Phase::Idle.on(Trigger::Start), Some(Phase::Playing));
        assert_eq!(Phase::Playing.on(Trigger::WaveCleared), Some(Phase::LevelUp));
        assert_eq!(Phase::LevelUp.on(Trigger::Continue), Some(Phase::Playing));
        assert_eq!(Phase::Playing.on(Trigger::RunEnded), Some(Phase::Over));
        assert_eq!(Phase::Over.on(Trigger::Restart), Some(Phase::Playing));
        assert_eq!(Phase::Playing.on(Trigger::Pause), Some(Phase::Paused));
        assert_eq!(Phase::Paused.on(Trigger::Pause), Some(Phase::Playing));
    }

    #[test]
    fn test_exactly_seven_legal_transitions() {
        let legal = ALL_PHASES
            .iter()
            .flat_map(|p| ALL_TRIGGERS.iter().map(move |t| p.on(*t)))
            .filter(Option::is_some)
            .count();
        assert_eq!(legal, 7);
    }

    #[test]
    fn test_irrelevant_triggers_ignored() {
        assert_eq!(Phase::Idle.on(Trigger::RunEnded), None);
        assert_eq!(Phase::Over.on(Trigger::Start), None);
        assert_eq!(Phase::LevelUp.on(Trigger::Pause), None);
        assert_eq!(Phase::Paused.on(Trigger::RunEnded), None);
        assert!(Phase::Playing.is_active());
        assert!(!Phase::Paused.is_active());
    }
}
