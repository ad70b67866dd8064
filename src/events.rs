use serde::Serialize;

use crate::audio::{Cue, Tone};
use crate::minigame::Circle;
use crate::timer::{CircleId, TimerCommand};
use crate::windows::Window;

/// Where a transient shake animation should play.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ShakeTarget {
    BrowserBody,
    VerifyWindow,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ResetReason {
    /// A circle expired; the whole session is discarded.
    Compromised,
    /// The player asked for a fresh boot.
    Restart,
}

/// Events streamed from the session to the frontend via Channel.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "event", content = "data")]
pub enum UiEvent {
    WindowChanged(Window),
    PlayCue { cue: Cue, tone: Tone },
    #[serde(rename_all = "camelCase")]
    MuteChanged { muted: bool },
    #[serde(rename_all = "camelCase")]
    PageLoaded { url: String, content: String, found: bool },

    OverlayShown,
    OverlayHidden,
    #[serde(rename_all = "camelCase")]
    Banner { title: String, subtitle: String },
    #[serde(rename_all = "camelCase")]
    ScoreChanged { completed: u32, target: u32 },
    CircleSpawned(Circle),
    #[serde(rename_all = "camelCase")]
    CircleRemoved { id: CircleId },

    #[serde(rename_all = "camelCase")]
    DecodeControl { enabled: bool },
    #[serde(rename_all = "camelCase")]
    DecodeProgress { progress: u32 },
    #[serde(rename_all = "camelCase")]
    DecodeLog { line: String },
    #[serde(rename_all = "camelCase")]
    CodeRevealed { code: String },

    #[serde(rename_all = "camelCase")]
    VerifyMessage { message: String },
    WinShown,

    #[serde(rename_all = "camelCase")]
    Shake { target: ShakeTarget, duration_ms: u64 },
    #[serde(rename_all = "camelCase")]
    Notify { message: String },
    #[serde(rename_all = "camelCase")]
    HardReset { reason: ResetReason, message: String },
}

/// Output of a state machine transition: something the frontend must show,
/// a sound routed through the mute switch, or a timer to arm or disarm.
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    Ui(UiEvent),
    Cue(Cue),
    Timer(TimerCommand),
}

impl From<UiEvent> for Effect {
    fn from(event: UiEvent) -> Self {
        Effect::Ui(event)
    }
}

impl From<Cue> for Effect {
    fn from(cue: Cue) -> Self {
        Effect::Cue(cue)
    }
}

impl From<TimerCommand> for Effect {
    fn from(command: TimerCommand) -> Self {
        Effect::Timer(command)
    }
}
