//! The session controller.
//!
//! `Desktop` owns every piece of session state plus the timer queue. Inputs
//! and timer firings go in, `UiEvent`s come out; nothing here sleeps or
//! spawns.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::audio::Audio;
use crate::config::GameConfig;
use crate::decoder::{DecodeSignal, Decoder};
use crate::error::DesktopError;
use crate::events::{Effect, ResetReason, UiEvent};
use crate::geometry::{Point, Viewport};
use crate::minigame::{Continuation, MinigameEngine, MinigamePhase, Outcome, Transition};
use crate::pages::{self, Browser};
use crate::scheduler;
use crate::secret::Secret;
use crate::session::SessionState;
use crate::timer::{CircleId, TimerKey, TimerQueue};
use crate::verify;
use crate::windows::{AppId, Window, WindowRegistry};

pub const COMPROMISED_MESSAGE: &str = "SYSTEM COMPROMISED. REBOOTING...";
pub const RESTART_MESSAGE: &str = "REBOOTING...";

/// User input forwarded by the frontend.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type", content = "data")]
pub enum Input {
    Focus { app: AppId },
    Minimize { app: AppId },
    Close { app: AppId },
    ToggleTaskbar { app: AppId },
    BeginDrag { app: AppId, pointer: Point },
    DragTo { pointer: Point },
    EndDrag,
    Navigate { url: String },
    SubmitDecode { input: String },
    SubmitVerify { input: String },
    ClickCircle { id: CircleId },
    ToggleMute,
    Resize { viewport: Viewport },
    Restart,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DesktopSnapshot {
    pub session: SessionState,
    pub windows: Vec<Window>,
    pub focused: Option<AppId>,
    pub minigame: MinigamePhase,
    pub decode_progress: u32,
    pub decode_enabled: bool,
    pub current_url: String,
    pub muted: bool,
    pub now_ms: u64,
}

pub struct Desktop {
    config: GameConfig,
    rng: StdRng,
    timers: TimerQueue,
    viewport: Viewport,
    audio: Audio,
    secret: Secret,
    session: SessionState,
    windows: WindowRegistry,
    minigame: MinigameEngine,
    decoder: Decoder,
    browser: Browser,
}

impl Desktop {
    pub fn new(config: GameConfig, viewport: Viewport, mut rng: StdRng) -> Self {
        let secret = Secret::generate(&mut rng);
        let windows = WindowRegistry::boot(viewport, &mut rng);
        Self {
            minigame: MinigameEngine::new(config.minigame.clone()),
            decoder: Decoder::new(config.decode.clone()),
            config,
            rng,
            timers: TimerQueue::new(),
            viewport,
            audio: Audio::default(),
            secret,
            session: SessionState::default(),
            windows,
            browser: Browser::default(),
        }
    }

    pub fn from_entropy(config: GameConfig, viewport: Viewport) -> Self {
        Self::new(config, viewport, StdRng::from_entropy())
    }

    /// Replace the generated hash; mostly useful for scripted sessions.
    pub fn with_secret(mut self, secret: Secret) -> Self {
        self.secret = secret;
        self
    }

    pub fn secret(&self) -> &Secret {
        &self.secret
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn windows(&self) -> &WindowRegistry {
        &self.windows
    }

    pub fn minigame(&self) -> &MinigameEngine {
        &self.minigame
    }

    pub fn decoder(&self) -> &Decoder {
        &self.decoder
    }

    pub fn now_ms(&self) -> u64 {
        self.timers.now_ms()
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.timers.next_deadline()
    }

    pub fn is_pending(&self, key: TimerKey) -> bool {
        self.timers.is_pending(key)
    }

    pub fn snapshot(&self) -> DesktopSnapshot {
        DesktopSnapshot {
            session: self.session,
            windows: self.windows.windows().to_vec(),
            focused: self.windows.focused(),
            minigame: self.minigame.phase(),
            decode_progress: self.decoder.progress(),
            decode_enabled: self.decoder.control_enabled(),
            current_url: self.browser.current_url().to_string(),
            muted: self.audio.is_muted(),
            now_ms: self.timers.now_ms(),
        }
    }

    /// Initial paint: windows, home page, mute state, background timer.
    pub fn boot(&mut self) -> Vec<UiEvent> {
        let mut effects: Vec<Effect> = self
            .windows
            .windows()
            .iter()
            .cloned()
            .map(|w| UiEvent::WindowChanged(w).into())
            .collect();
        effects.push(self.browser.navigate(pages::HOME_URL, &self.secret).into());
        effects.push(
            UiEvent::MuteChanged {
                muted: self.audio.is_muted(),
            }
            .into(),
        );
        effects.push(scheduler::arm(self.config.background_interval_ms));
        tracing::info!(now_ms = self.timers.now_ms(), "desktop booted");
        self.apply(effects)
    }

    /// Discard every piece of session state and boot again.
    fn hard_reset(&mut self, reason: ResetReason) -> Vec<UiEvent> {
        let message = match reason {
            ResetReason::Compromised => COMPROMISED_MESSAGE,
            ResetReason::Restart => RESTART_MESSAGE,
        };
        tracing::warn!(?reason, "hard reset");

        self.timers.cancel_all();
        self.secret = Secret::generate(&mut self.rng);
        self.windows = WindowRegistry::boot(self.viewport, &mut self.rng);
        self.session = SessionState::default();
        self.minigame = MinigameEngine::new(self.config.minigame.clone());
        self.decoder = Decoder::new(self.config.decode.clone());
        self.browser = Browser::default();
        self.audio = Audio::default();

        let mut events = vec![UiEvent::HardReset {
            reason,
            message: message.to_string(),
        }];
        events.extend(self.boot());
        events
    }

    pub fn handle(&mut self, input: Input) -> Vec<UiEvent> {
        let locked = self.session.minigame_active;
        let window_event =
            |w: Option<Window>| -> Vec<UiEvent> { w.map(UiEvent::WindowChanged).into_iter().collect() };

        match input {
            Input::Focus { app } => window_event(self.windows.focus(app, locked)),
            Input::Minimize { app } => window_event(self.windows.minimize(app)),
            Input::Close { app } => window_event(self.windows.close(app)),
            Input::ToggleTaskbar { app } => window_event(self.windows.toggle(app, locked)),
            Input::BeginDrag { app, pointer } => {
                window_event(self.windows.begin_drag(app, pointer, locked))
            }
            Input::DragTo { pointer } => window_event(self.windows.drag_to(pointer, locked)),
            Input::EndDrag => {
                self.windows.end_drag();
                Vec::new()
            }
            Input::Navigate { url } => vec![self.browser.navigate(&url, &self.secret)],
            Input::SubmitDecode { input } => self.submit_decode(&input),
            Input::SubmitVerify { input } => {
                let effects = verify::submit(
                    &mut self.session,
                    &input,
                    &self.config.decoded_code,
                    self.config.shake_ms,
                );
                self.apply(effects)
            }
            Input::ClickCircle { id } => {
                let transition = self.minigame.click(id);
                self.transition(transition)
            }
            Input::ToggleMute => vec![self.audio.toggle_mute()],
            Input::Resize { viewport } => {
                self.viewport = viewport;
                Vec::new()
            }
            Input::Restart => self.hard_reset(ResetReason::Restart),
        }
    }

    fn submit_decode(&mut self, input: &str) -> Vec<UiEvent> {
        if !self.browser.decode_control_wired() {
            tracing::debug!(url = self.browser.current_url(), "decode submitted off the hash tool");
            return Vec::new();
        }
        match self.decoder.start(input) {
            Ok(effects) => self.apply(effects),
            Err(err @ DesktopError::EmptyInput) => vec![UiEvent::Notify {
                message: err.to_string(),
            }],
            Err(err) => {
                tracing::warn!(%err, "decode rejected");
                Vec::new()
            }
        }
    }

    /// Fire every timer due at or before `now_ms`, in deadline order.
    pub fn advance_to(&mut self, now_ms: u64) -> Vec<UiEvent> {
        let mut events = Vec::new();
        while let Some(key) = self.timers.pop_due(now_ms) {
            events.extend(self.fire(key));
        }
        self.timers.set_now(now_ms);
        events
    }

    pub fn advance_by(&mut self, delta_ms: u64) -> Vec<UiEvent> {
        self.advance_to(self.timers.now_ms() + delta_ms)
    }

    fn fire(&mut self, key: TimerKey) -> Vec<UiEvent> {
        let now_ms = self.timers.now_ms();
        match key {
            TimerKey::Countdown => {
                let t = self.minigame.countdown_tick(
                    &mut self.session,
                    self.viewport,
                    now_ms,
                    &mut self.rng,
                );
                self.transition(t)
            }
            TimerKey::SpawnNext => {
                let t =
                    self.minigame
                        .spawn_next(&mut self.session, self.viewport, now_ms, &mut self.rng);
                self.transition(t)
            }
            TimerKey::Expire(id) => {
                let t = self.minigame.expire(id);
                self.transition(t)
            }
            TimerKey::Dismiss(round) => {
                let t = self.minigame.dismiss(round);
                self.transition(t)
            }
            TimerKey::DecodeTick => self.decode_tick(),
            TimerKey::Background => {
                let effects = scheduler::on_tick(&mut self.session, &mut self.minigame);
                self.apply(effects)
            }
        }
    }

    fn decode_tick(&mut self) -> Vec<UiEvent> {
        let step = self.decoder.tick(
            &self.session,
            self.secret.full(),
            &self.config.decoded_code,
            self.config.shake_ms,
            &mut self.rng,
        );
        let mut events = self.apply(step.effects);
        if step.signal == Some(DecodeSignal::Interrupt) {
            match self
                .minigame
                .trigger(&mut self.session, Continuation::ResumeDecode)
            {
                Some(effects) => events.extend(self.apply(effects)),
                // A background round is already up; winning it resumes the decode.
                None => self.minigame.attach(Continuation::ResumeDecode),
            }
        }
        events
    }

    fn transition(&mut self, transition: Transition) -> Vec<UiEvent> {
        let mut events = self.apply(transition.effects);
        match transition.outcome {
            None => {}
            Some(Outcome::Failed) => events.extend(self.hard_reset(ResetReason::Compromised)),
            Some(Outcome::Completed(continuation)) => {
                self.session.has_been_hacked = true;
                if continuation == Continuation::ResumeDecode {
                    let effects = self.decoder.resume();
                    events.extend(self.apply(effects));
                }
            }
        }
        events
    }

    fn apply(&mut self, effects: Vec<Effect>) -> Vec<UiEvent> {
        let mut events = Vec::with_capacity(effects.len());
        for effect in effects {
            match effect {
                Effect::Ui(event) => events.push(event),
                Effect::Cue(cue) => events.extend(self.audio.play(cue)),
                Effect::Timer(command) => self.timers.apply(command),
            }
        }
        events
    }
}
