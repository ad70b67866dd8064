//! Intrusion-defense minigame.
//!
//! `Idle → Countdown → Spawning → {Won, Failed}`. One circle is live at a
//! time; each one resolves exactly once, by click or by expiry. A click after
//! expiry (or the reverse) hits the resolved guard and is dropped.

use std::collections::HashMap;

use rand::Rng;
use serde::Serialize;

use crate::audio::Cue;
use crate::config::MinigameConfig;
use crate::events::{Effect, UiEvent};
use crate::geometry::{Point, Viewport};
use crate::session::SessionState;
use crate::timer::{CircleId, RoundId, TimerCommand, TimerKey};

pub const ALERT_TITLE: &str = "⚠ INTRUSION DETECTED ⚠";
pub const ALERT_SUBTITLE: &str = "FIREWALL BREACH IN PROGRESS";

/// What to do once a round is won and its overlay dismissed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Continuation {
    /// Round came from the background scheduler; just carry on.
    Background,
    /// Round interrupted a decode run; start decoding again.
    ResumeDecode,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Circle {
    pub id: CircleId,
    pub size: f64,
    pub position: Point,
    pub spawned_at_ms: u64,
    pub ttl_ms: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "phase")]
pub enum MinigamePhase {
    Idle,
    Countdown { remaining: u32 },
    Spawning { completed: u32, target: u32 },
    Won,
    Failed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Completed(Continuation),
    Failed,
}

/// Effects of one transition plus, at most, a terminal outcome for the caller.
#[derive(Debug, Default)]
pub struct Transition {
    pub effects: Vec<Effect>,
    pub outcome: Option<Outcome>,
}

impl Transition {
    fn effects(effects: Vec<Effect>) -> Self {
        Self {
            effects,
            outcome: None,
        }
    }
}

#[derive(Debug)]
struct LiveCircle {
    circle: Circle,
    resolved: bool,
}

#[derive(Debug)]
struct Round {
    completed: u32,
    active: Option<LiveCircle>,
}

#[derive(Debug)]
enum Phase {
    Idle,
    Countdown { remaining: u32 },
    Spawning(Round),
    Won,
    Failed,
}

#[derive(Debug)]
pub struct MinigameEngine {
    config: MinigameConfig,
    phase: Phase,
    round: RoundId,
    continuation: Continuation,
    /// Won rounds waiting for their overlay to be dismissed.
    dismissals: HashMap<RoundId, Continuation>,
    next_circle: u64,
}

impl MinigameEngine {
    pub fn new(config: MinigameConfig) -> Self {
        Self {
            config,
            phase: Phase::Idle,
            round: RoundId(0),
            continuation: Continuation::Background,
            dismissals: HashMap::new(),
            next_circle: 0,
        }
    }

    pub fn phase(&self) -> MinigamePhase {
        match &self.phase {
            Phase::Idle => MinigamePhase::Idle,
            Phase::Countdown { remaining } => MinigamePhase::Countdown {
                remaining: *remaining,
            },
            Phase::Spawning(round) => MinigamePhase::Spawning {
                completed: round.completed,
                target: self.config.target_circles,
            },
            Phase::Won => MinigamePhase::Won,
            Phase::Failed => MinigamePhase::Failed,
        }
    }

    pub fn round(&self) -> RoundId {
        self.round
    }

    /// The live, unresolved circle, if any.
    pub fn active_circle(&self) -> Option<&Circle> {
        match &self.phase {
            Phase::Spawning(Round {
                active: Some(live), ..
            }) if !live.resolved => Some(&live.circle),
            _ => None,
        }
    }

    /// Start a round. Returns `None` when one is already running.
    pub fn trigger(
        &mut self,
        session: &mut SessionState,
        continuation: Continuation,
    ) -> Option<Vec<Effect>> {
        if session.minigame_active {
            return None;
        }
        session.minigame_active = true;
        self.round = RoundId(self.round.0 + 1);
        self.continuation = continuation;
        let remaining = self.config.countdown_ticks;
        self.phase = Phase::Countdown { remaining };
        tracing::info!(round = self.round.0, ?continuation, "intrusion round triggered");

        Some(vec![
            UiEvent::OverlayShown.into(),
            banner(format!("BREACH IN {remaining}..."), "PREPARE DEFENSES"),
            UiEvent::ScoreChanged {
                completed: 0,
                target: self.config.target_circles,
            }
            .into(),
            Cue::Alert.into(),
            TimerCommand::Every {
                key: TimerKey::Countdown,
                period_ms: self.config.countdown_tick_ms,
            }
            .into(),
        ])
    }

    /// Let a running round also resume an interrupted decode when it is won.
    pub fn attach(&mut self, continuation: Continuation) {
        if continuation == Continuation::ResumeDecode {
            self.continuation = continuation;
        }
    }

    pub fn countdown_tick<R: Rng>(
        &mut self,
        session: &mut SessionState,
        viewport: Viewport,
        now_ms: u64,
        rng: &mut R,
    ) -> Transition {
        let Phase::Countdown { remaining } = &mut self.phase else {
            return Transition::effects(vec![TimerCommand::Cancel(TimerKey::Countdown).into()]);
        };
        *remaining = remaining.saturating_sub(1);
        if *remaining > 0 {
            let title = format!("BREACH IN {remaining}...");
            return Transition::effects(vec![banner(title, "PREPARE DEFENSES"), Cue::Click.into()]);
        }

        self.phase = Phase::Spawning(Round {
            completed: 0,
            active: None,
        });
        let mut effects = vec![
            TimerCommand::Cancel(TimerKey::Countdown).into(),
            banner(ALERT_TITLE.into(), ALERT_SUBTITLE),
            UiEvent::ScoreChanged {
                completed: 0,
                target: self.config.target_circles,
            }
            .into(),
        ];
        effects.extend(self.spawn_next(session, viewport, now_ms, rng).effects);
        Transition::effects(effects)
    }

    /// Spawn the next circle, or win if the target has been reached.
    pub fn spawn_next<R: Rng>(
        &mut self,
        session: &mut SessionState,
        viewport: Viewport,
        now_ms: u64,
        rng: &mut R,
    ) -> Transition {
        let Phase::Spawning(round) = &mut self.phase else {
            return Transition::default();
        };
        if round.completed >= self.config.target_circles {
            return self.win(session);
        }

        self.next_circle += 1;
        let cfg = &self.config;
        let size = rng.gen_range(cfg.circle_min_px..=cfg.circle_max_px);
        let ((min_x, max_x), (min_y, max_y)) = spawn_area(viewport, size);
        let circle = Circle {
            id: CircleId(self.next_circle),
            size,
            position: Point::new(rng.gen_range(min_x..=max_x), rng.gen_range(min_y..=max_y)),
            spawned_at_ms: now_ms,
            ttl_ms: rng.gen_range(cfg.ttl_min_ms..=cfg.ttl_max_ms),
        };
        let expire = TimerCommand::Once {
            key: TimerKey::Expire(circle.id),
            delay_ms: circle.ttl_ms,
        };
        round.active = Some(LiveCircle {
            circle: circle.clone(),
            resolved: false,
        });
        Transition::effects(vec![UiEvent::CircleSpawned(circle).into(), expire.into()])
    }

    pub fn click(&mut self, id: CircleId) -> Transition {
        let Phase::Spawning(round) = &mut self.phase else {
            return Transition::default();
        };
        let Some(live) = round.active.as_mut().filter(|l| l.circle.id == id && !l.resolved) else {
            return Transition::default();
        };
        live.resolved = true;
        round.completed += 1;
        tracing::debug!(completed = round.completed, "circle deflected");

        Transition::effects(vec![
            TimerCommand::Cancel(TimerKey::Expire(id)).into(),
            UiEvent::CircleRemoved { id }.into(),
            Cue::Click.into(),
            UiEvent::ScoreChanged {
                completed: round.completed,
                target: self.config.target_circles,
            }
            .into(),
            TimerCommand::Once {
                key: TimerKey::SpawnNext,
                delay_ms: self.config.spawn_gap_ms,
            }
            .into(),
        ])
    }

    pub fn expire(&mut self, id: CircleId) -> Transition {
        let Phase::Spawning(round) = &mut self.phase else {
            return Transition::default();
        };
        let Some(live) = round.active.as_mut().filter(|l| l.circle.id == id && !l.resolved) else {
            return Transition::default();
        };
        live.resolved = true;
        tracing::warn!(round = self.round.0, completed = round.completed, "circle expired, round failed");
        self.phase = Phase::Failed;

        Transition {
            effects: vec![
                TimerCommand::Cancel(TimerKey::SpawnNext).into(),
                TimerCommand::Cancel(TimerKey::Countdown).into(),
                Cue::Error.into(),
            ],
            outcome: Some(Outcome::Failed),
        }
    }

    fn win(&mut self, session: &mut SessionState) -> Transition {
        self.phase = Phase::Won;
        session.minigame_active = false;
        self.dismissals.insert(self.round, self.continuation);
        tracing::info!(round = self.round.0, "intrusion round won");
        Transition::effects(vec![TimerCommand::Once {
            key: TimerKey::Dismiss(self.round),
            delay_ms: self.config.dismiss_delay_ms,
        }
        .into()])
    }

    /// Hide the overlay of a won round and hand back its continuation.
    pub fn dismiss(&mut self, round: RoundId) -> Transition {
        let Some(continuation) = self.dismissals.remove(&round) else {
            return Transition::default();
        };
        let mut effects = Vec::new();
        // A newer round may already own the overlay.
        if matches!(self.phase, Phase::Won | Phase::Idle) {
            self.phase = Phase::Idle;
            effects.push(UiEvent::OverlayHidden.into());
            effects.push(banner(ALERT_TITLE.into(), ALERT_SUBTITLE));
        }
        Transition {
            effects,
            outcome: Some(Outcome::Completed(continuation)),
        }
    }
}

fn banner(title: String, subtitle: &str) -> Effect {
    UiEvent::Banner {
        title,
        subtitle: subtitle.to_string(),
    }
    .into()
}

/// Horizontal and vertical ranges for a circle's top-left corner: a margin of
/// 15 % (at least 100 px) off every edge, with a fixed fallback for small screens.
pub fn spawn_area(viewport: Viewport, size: f64) -> ((f64, f64), (f64, f64)) {
    let margin_x = (viewport.width * 0.15).max(100.0);
    let margin_y = (viewport.height * 0.15).max(100.0);
    let max_x = viewport.width - margin_x - size;
    let max_y = viewport.height - margin_y - size;

    let x = if margin_x < max_x {
        (margin_x, max_x)
    } else {
        (20.0, viewport.width - 60.0)
    };
    let y = if margin_y < max_y {
        (margin_y, max_y)
    } else {
        (60.0, viewport.height - 60.0)
    };
    ((x.0, x.1.max(x.0)), (y.0, y.1.max(y.0)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct Harness {
        engine: MinigameEngine,
        session: SessionState,
        rng: StdRng,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                engine: MinigameEngine::new(MinigameConfig::default()),
                session: SessionState::default(),
                rng: StdRng::seed_from_u64(42),
            }
        }

        fn start(&mut self) {
            self.engine
                .trigger(&mut self.session, Continuation::ResumeDecode)
                .unwrap();
            for _ in 0..MinigameConfig::default().countdown_ticks {
                self.engine
                    .countdown_tick(&mut self.session, Viewport::default(), 0, &mut self.rng);
            }
        }

        fn spawn(&mut self) -> Transition {
            self.engine
                .spawn_next(&mut self.session, Viewport::default(), 0, &mut self.rng)
        }

        fn live(&self) -> CircleId {
            self.engine.active_circle().unwrap().id
        }
    }

    fn has_cue(effects: &[Effect], cue: Cue) -> bool {
        effects.iter().any(|e| *e == Effect::Cue(cue))
    }

    #[test]
    fn trigger_is_not_reentrant() {
        let mut h = Harness::new();
        let effects = h.engine.trigger(&mut h.session, Continuation::Background).unwrap();
        assert!(h.session.minigame_active);
        assert!(has_cue(&effects, Cue::Alert));
        assert!(h.engine.trigger(&mut h.session, Continuation::Background).is_none());
        assert_eq!(h.engine.round(), RoundId(1));
    }

    #[test]
    fn countdown_runs_five_ticks_then_spawns() {
        let mut h = Harness::new();
        h.engine.trigger(&mut h.session, Continuation::Background);
        for remaining in (1..5).rev() {
            let t = h.engine.countdown_tick(&mut h.session, Viewport::default(), 0, &mut h.rng);
            assert!(has_cue(&t.effects, Cue::Click));
            assert_eq!(h.engine.phase(), MinigamePhase::Countdown { remaining });
        }
        let t = h.engine.countdown_tick(&mut h.session, Viewport::default(), 0, &mut h.rng);
        assert!(t.effects.contains(&Effect::Timer(TimerCommand::Cancel(TimerKey::Countdown))));
        assert!(t.effects.iter().any(|e| matches!(e, Effect::Ui(UiEvent::CircleSpawned(_)))));
        assert_eq!(
            h.engine.phase(),
            MinigamePhase::Spawning {
                completed: 0,
                target: 10
            }
        );
    }

    #[test]
    fn circles_are_sized_and_timed_within_bounds() {
        let mut h = Harness::new();
        h.start();
        for _ in 0..10 {
            let c = h.engine.active_circle().unwrap().clone();
            assert!((60.0..=90.0).contains(&c.size));
            assert!((2500..=3500).contains(&c.ttl_ms));
            let ((min_x, max_x), (min_y, max_y)) = spawn_area(Viewport::default(), c.size);
            assert!((min_x..=max_x).contains(&c.position.x));
            assert!((min_y..=max_y).contains(&c.position.y));
            h.engine.click(c.id);
            h.spawn();
        }
    }

    #[test]
    fn ten_clicks_win_and_hand_back_the_continuation() {
        let mut h = Harness::new();
        h.start();
        let mut last = 0;
        for _ in 0..10 {
            let t = h.engine.click(h.live());
            assert!(t.effects.contains(&Effect::Timer(TimerCommand::Once {
                key: TimerKey::SpawnNext,
                delay_ms: 200
            })));
            let MinigamePhase::Spawning { completed, .. } = h.engine.phase() else {
                panic!("expected spawning");
            };
            assert_eq!(completed, last + 1);
            last = completed;
            h.spawn();
        }
        assert_eq!(h.engine.phase(), MinigamePhase::Won);
        assert!(!h.session.minigame_active);

        let t = h.engine.dismiss(RoundId(1));
        assert_eq!(t.outcome, Some(Outcome::Completed(Continuation::ResumeDecode)));
        assert!(t.effects.contains(&Effect::Ui(UiEvent::OverlayHidden)));
        assert_eq!(h.engine.phase(), MinigamePhase::Idle);
        assert!(h.engine.dismiss(RoundId(1)).outcome.is_none());
    }

    #[test]
    fn expiry_fails_the_round() {
        let mut h = Harness::new();
        h.start();
        h.engine.click(h.live());
        h.spawn();
        let id = h.live();
        let t = h.engine.expire(id);
        assert_eq!(t.outcome, Some(Outcome::Failed));
        assert!(has_cue(&t.effects, Cue::Error));
        assert_eq!(h.engine.phase(), MinigamePhase::Failed);
        assert!(h.session.minigame_active);
    }

    #[test]
    fn click_and_expiry_resolve_exactly_once() {
        let mut h = Harness::new();
        h.start();
        let id = h.live();
        let clicked = h.engine.click(id);
        assert!(!clicked.effects.is_empty());
        let expired = h.engine.expire(id);
        assert!(expired.outcome.is_none());
        assert!(expired.effects.is_empty());
        assert_eq!(
            h.engine.phase(),
            MinigamePhase::Spawning {
                completed: 1,
                target: 10
            }
        );

        h.spawn();
        let id = h.live();
        assert_eq!(h.engine.expire(id).outcome, Some(Outcome::Failed));
        assert!(h.engine.click(id).effects.is_empty());
        assert_eq!(h.engine.phase(), MinigamePhase::Failed);
    }

    #[test]
    fn stale_circle_ids_are_ignored() {
        let mut h = Harness::new();
        h.start();
        let first = h.live();
        h.engine.click(first);
        h.spawn();
        assert!(h.engine.click(first).effects.is_empty());
        assert!(h.engine.expire(first).outcome.is_none());
    }

    #[test]
    fn attach_upgrades_background_rounds() {
        let mut h = Harness::new();
        h.engine.trigger(&mut h.session, Continuation::Background);
        h.engine.attach(Continuation::ResumeDecode);
        h.engine.attach(Continuation::Background);
        for _ in 0..5 {
            h.engine.countdown_tick(&mut h.session, Viewport::default(), 0, &mut h.rng);
        }
        for _ in 0..10 {
            h.engine.click(h.live());
            h.spawn();
        }
        assert_eq!(
            h.engine.dismiss(RoundId(1)).outcome,
            Some(Outcome::Completed(Continuation::ResumeDecode))
        );
    }

    #[test]
    fn late_dismissal_leaves_a_newer_overlay_alone() {
        let mut h = Harness::new();
        h.start();
        for _ in 0..10 {
            h.engine.click(h.live());
            h.spawn();
        }
        h.engine.trigger(&mut h.session, Continuation::Background).unwrap();
        let t = h.engine.dismiss(RoundId(1));
        assert!(t.outcome.is_some());
        assert!(!t.effects.contains(&Effect::Ui(UiEvent::OverlayHidden)));
        assert_eq!(h.engine.phase(), MinigamePhase::Countdown { remaining: 5 });
    }

    #[test]
    fn spawn_area_uses_proportional_margin() {
        let ((min_x, max_x), (min_y, max_y)) =
            spawn_area(Viewport { width: 2000.0, height: 1000.0 }, 80.0);
        assert_eq!((min_x, max_x), (300.0, 1620.0));
        assert_eq!((min_y, max_y), (150.0, 770.0));
    }

    #[test]
    fn spawn_area_falls_back_on_small_screens() {
        let ((min_x, max_x), (min_y, max_y)) =
            spawn_area(Viewport { width: 250.0, height: 240.0 }, 90.0);
        assert_eq!((min_x, max_x), (20.0, 190.0));
        assert_eq!((min_y, max_y), (60.0, 180.0));

        let ((min_x, max_x), _) = spawn_area(Viewport { width: 50.0, height: 50.0 }, 90.0);
        assert_eq!(min_x, max_x);
    }
}
