//! Hash-tool decode runs.
//!
//! A run advances in fixed steps on a repeating tick. Crossing the
//! interruption window hands control to the minigame; once that round is won
//! the run starts over from zero with the same input.

use rand::Rng;

use crate::audio::Cue;
use crate::config::DecodeConfig;
use crate::error::{DesktopError, Result};
use crate::events::{Effect, ShakeTarget, UiEvent};
use crate::session::SessionState;
use crate::timer::{TimerCommand, TimerKey};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecodeOutcome {
    Success,
    Mismatch,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecodeSignal {
    /// The run froze and needs a minigame round before it can restart.
    Interrupt,
    Finished(DecodeOutcome),
}

#[derive(Debug, Default)]
pub struct DecodeStep {
    pub effects: Vec<Effect>,
    pub signal: Option<DecodeSignal>,
}

#[derive(Debug)]
struct DecodeRun {
    input: String,
    interrupt_checked: bool,
}

#[derive(Debug)]
pub struct Decoder {
    config: DecodeConfig,
    run: Option<DecodeRun>,
    /// Input of a run frozen by an interruption, waiting for the round to end.
    interrupted: Option<String>,
    progress: u32,
    control_enabled: bool,
}

impl Decoder {
    pub fn new(config: DecodeConfig) -> Self {
        Self {
            config,
            run: None,
            interrupted: None,
            progress: 0,
            control_enabled: true,
        }
    }

    /// Last reported progress; frozen while interrupted or after a run ends.
    pub fn progress(&self) -> u32 {
        self.progress
    }

    pub fn is_running(&self) -> bool {
        self.run.is_some()
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupted.is_some()
    }

    pub fn control_enabled(&self) -> bool {
        self.control_enabled
    }

    /// Begin a run. Empty input is rejected without touching any state; a
    /// disabled control swallows the submission.
    pub fn start(&mut self, raw_input: &str) -> Result<Vec<Effect>> {
        let input = raw_input.trim();
        if input.is_empty() {
            return Err(DesktopError::EmptyInput);
        }
        if !self.control_enabled {
            return Ok(Vec::new());
        }

        self.control_enabled = false;
        self.progress = 0;
        self.run = Some(DecodeRun {
            input: input.to_string(),
            interrupt_checked: false,
        });
        tracing::info!(len = input.len(), "decode run started");

        Ok(vec![
            UiEvent::DecodeControl { enabled: false }.into(),
            log("> CONNECTING..."),
            UiEvent::DecodeProgress { progress: 0 }.into(),
            TimerCommand::Every {
                key: TimerKey::DecodeTick,
                period_ms: self.config.tick_ms(),
            }
            .into(),
        ])
    }

    pub fn tick<R: Rng>(
        &mut self,
        session: &SessionState,
        secret: &str,
        decoded_code: &str,
        shake_ms: u64,
        rng: &mut R,
    ) -> DecodeStep {
        let Some(run) = self.run.as_mut() else {
            return DecodeStep {
                effects: vec![TimerCommand::Cancel(TimerKey::DecodeTick).into()],
                signal: None,
            };
        };

        self.progress = (self.progress + self.config.step).min(100);
        let progress = self.progress;
        let mut effects = vec![UiEvent::DecodeProgress { progress }.into()];

        if rng.gen_bool(self.config.log_chance) {
            let block = rng.gen_range(0..99);
            effects.push(log(&format!("> Analyzing block {block}...")));
        }

        let (low, high) = self.config.interrupt_window;
        if !run.interrupt_checked && progress > low && progress < high {
            run.interrupt_checked = true;
            let interrupt =
                !session.has_been_hacked || rng.gen_bool(self.config.resume_hack_chance);
            if interrupt {
                tracing::info!(progress, "decode run interrupted by intrusion");
                let run = self.run.take();
                self.interrupted = run.map(|r| r.input);
                effects.push(TimerCommand::Cancel(TimerKey::DecodeTick).into());
                return DecodeStep {
                    effects,
                    signal: Some(DecodeSignal::Interrupt),
                };
            }
        }

        if progress < 100 {
            return DecodeStep {
                effects,
                signal: None,
            };
        }

        let matched = run.input == secret;
        self.run = None;
        self.control_enabled = true;
        effects.push(TimerCommand::Cancel(TimerKey::DecodeTick).into());
        effects.push(UiEvent::DecodeControl { enabled: true }.into());

        let outcome = if matched {
            effects.push(log("> SUCCESS. DECRYPTED."));
            effects.push(log(&format!("> CODE: {decoded_code}")));
            effects.push(
                UiEvent::CodeRevealed {
                    code: decoded_code.to_string(),
                }
                .into(),
            );
            effects.push(Cue::Success.into());
            DecodeOutcome::Success
        } else {
            effects.push(log("> ERROR: HASH MISMATCH."));
            effects.push(Cue::Error.into());
            effects.push(
                UiEvent::Shake {
                    target: ShakeTarget::BrowserBody,
                    duration_ms: shake_ms,
                }
                .into(),
            );
            DecodeOutcome::Mismatch
        };
        tracing::info!(?outcome, "decode run finished");

        DecodeStep {
            effects,
            signal: Some(DecodeSignal::Finished(outcome)),
        }
    }

    /// Restart an interrupted run from zero. Progress made before the
    /// interruption is discarded.
    pub fn resume(&mut self) -> Vec<Effect> {
        let Some(input) = self.interrupted.take() else {
            return Vec::new();
        };
        self.control_enabled = true;
        let mut effects = vec![UiEvent::DecodeControl { enabled: true }.into()];
        // Input was non-empty when first accepted.
        effects.extend(self.start(&input).unwrap_or_default());
        effects
    }
}

fn log(line: &str) -> Effect {
    UiEvent::DecodeLog {
        line: line.to_string(),
    }
    .into()
}
