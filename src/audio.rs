use serde::Serialize;

use crate::events::UiEvent;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
}

/// A short synthesized blip the frontend plays through its audio context.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tone {
    pub freq_hz: f32,
    pub duration_ms: u32,
    pub wave: Waveform,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Cue {
    Click,
    Error,
    Success,
    Alert,
}

impl Cue {
    pub fn tone(self) -> Tone {
        let (freq_hz, duration_ms, wave) = match self {
            Cue::Click => (800.0, 50, Waveform::Sine),
            Cue::Error => (150.0, 300, Waveform::Sawtooth),
            Cue::Success => (1200.0, 200, Waveform::Sine),
            Cue::Alert => (600.0, 300, Waveform::Square),
        };
        Tone {
            freq_hz,
            duration_ms,
            wave,
        }
    }
}

/// Global mute switch in front of the fire-and-forget cue stream.
#[derive(Debug, Default)]
pub struct Audio {
    muted: bool,
}

impl Audio {
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn toggle_mute(&mut self) -> UiEvent {
        self.muted = !self.muted;
        UiEvent::MuteChanged { muted: self.muted }
    }

    /// Muted cues are dropped silently.
    pub fn play(&self, cue: Cue) -> Option<UiEvent> {
        (!self.muted).then(|| UiEvent::PlayCue {
            cue,
            tone: cue.tone(),
        })
    }
}
