use crate::audio::Cue;
use crate::events::{Effect, ShakeTarget, UiEvent};
use crate::session::SessionState;

pub const ACCESS_DENIED: &str = "ACCESS DENIED";

/// Check a submission against the decoded code. A match wins the session.
pub fn submit(session: &mut SessionState, input: &str, decoded_code: &str, shake_ms: u64) -> Vec<Effect> {
    if input.trim() == decoded_code {
        session.verify_won = true;
        tracing::info!("verification accepted, session won");
        return vec![UiEvent::WinShown.into(), Cue::Success.into()];
    }

    vec![
        UiEvent::VerifyMessage {
            message: ACCESS_DENIED.into(),
        }
        .into(),
        UiEvent::Shake {
            target: ShakeTarget::VerifyWindow,
            duration_ms: shake_ms,
        }
        .into(),
        Cue::Error.into(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    const CODE: &str = "SIGMA-PROTOCOL-INITIATED";

    #[test]
    fn exact_code_wins() {
        let mut session = SessionState::default();
        let effects = submit(&mut session, "  SIGMA-PROTOCOL-INITIATED ", CODE, 500);
        assert!(session.verify_won);
        assert!(effects.contains(&Effect::Ui(UiEvent::WinShown)));
    }

    #[test]
    fn anything_else_is_denied() {
        let mut session = SessionState::default();
        for attempt in ["sigma-protocol-initiated", "", "SIGMA"] {
            let effects = submit(&mut session, attempt, CODE, 500);
            assert!(effects.contains(&Effect::Cue(Cue::Error)));
            assert!(effects.contains(&Effect::Ui(UiEvent::VerifyMessage {
                message: ACCESS_DENIED.into()
            })));
        }
        assert!(!session.verify_won);
    }
}
