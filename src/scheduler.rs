use crate::events::Effect;
use crate::minigame::{Continuation, MinigameEngine};
use crate::session::SessionState;
use crate::timer::{TimerCommand, TimerKey};

/// Arm the periodic background intrusion.
pub fn arm(interval_ms: u64) -> Effect {
    TimerCommand::Every {
        key: TimerKey::Background,
        period_ms: interval_ms,
    }
    .into()
}

/// Background tick: start a round unless one is live or the puzzle is solved.
pub fn on_tick(session: &mut SessionState, engine: &mut MinigameEngine) -> Vec<Effect> {
    if session.minigame_active || session.verify_won {
        tracing::debug!(?session, "background intrusion skipped");
        return Vec::new();
    }
    engine
        .trigger(session, Continuation::Background)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MinigameConfig;
    use crate::minigame::MinigamePhase;
    use crate::timer::RoundId;

    #[test]
    fn starts_a_round_when_idle() {
        let mut session = SessionState::default();
        let mut engine = MinigameEngine::new(MinigameConfig::default());
        assert!(!on_tick(&mut session, &mut engine).is_empty());
        assert!(session.minigame_active);
    }

    #[test]
    fn never_starts_a_second_round() {
        let mut session = SessionState::default();
        let mut engine = MinigameEngine::new(MinigameConfig::default());
        on_tick(&mut session, &mut engine);
        assert!(on_tick(&mut session, &mut engine).is_empty());
        assert_eq!(engine.round(), RoundId(1));
    }

    #[test]
    fn stays_quiet_once_won() {
        let mut session = SessionState {
            verify_won: true,
            ..SessionState::default()
        };
        let mut engine = MinigameEngine::new(MinigameConfig::default());
        assert!(on_tick(&mut session, &mut engine).is_empty());
        assert_eq!(engine.phase(), MinigamePhase::Idle);
    }
}
