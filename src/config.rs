use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{DesktopError, Result};

/// Tunables for the intrusion minigame.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct MinigameConfig {
    pub target_circles: u32,
    pub circle_min_px: f64,
    pub circle_max_px: f64,
    pub ttl_min_ms: u64,
    pub ttl_max_ms: u64,
    /// Pause between a successful click and the next spawn.
    pub spawn_gap_ms: u64,
    /// Delay before the overlay is dismissed after a win.
    pub dismiss_delay_ms: u64,
    pub countdown_ticks: u32,
    pub countdown_tick_ms: u64,
}

impl Default for MinigameConfig {
    fn default() -> Self {
        Self {
            target_circles: 10,
            circle_min_px: 60.0,
            circle_max_px: 90.0,
            ttl_min_ms: 2500,
            ttl_max_ms: 3500,
            spawn_gap_ms: 200,
            dismiss_delay_ms: 500,
            countdown_ticks: 5,
            countdown_tick_ms: 1000,
        }
    }
}

/// Tunables for the hash-tool decoder.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct DecodeConfig {
    pub decode_time_ms: u64,
    pub ticks: u32,
    pub step: u32,
    /// Open interval of progress values in which an interruption may fire.
    pub interrupt_window: (u32, u32),
    pub resume_hack_chance: f64,
    pub log_chance: f64,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            decode_time_ms: 4000,
            ticks: 20,
            step: 5,
            interrupt_window: (35, 45),
            resume_hack_chance: 0.2,
            log_chance: 0.3,
        }
    }
}

impl DecodeConfig {
    pub fn tick_ms(&self) -> u64 {
        self.decode_time_ms / u64::from(self.ticks.max(1))
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct GameConfig {
    pub decoded_code: String,
    pub background_interval_ms: u64,
    pub shake_ms: u64,
    pub minigame: MinigameConfig,
    pub decode: DecodeConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            decoded_code: "SIGMA-PROTOCOL-INITIATED".into(),
            background_interval_ms: 120_000,
            shake_ms: 500,
            minigame: MinigameConfig::default(),
            decode: DecodeConfig::default(),
        }
    }
}

/// Upper bound for every configured delay or period: one day.
const MAX_DELAY_MS: u64 = 86_400_000;

impl GameConfig {
    pub fn validate(&self) -> Result<()> {
        let m = &self.minigame;
        let d = &self.decode;
        let fail = |msg: &str| Err(DesktopError::InvalidConfig(msg.into()));

        if self.decoded_code.trim().is_empty() {
            return fail("decodedCode must not be empty");
        }
        if self.background_interval_ms == 0 {
            return fail("backgroundIntervalMs must be positive");
        }
        if m.target_circles == 0 || m.countdown_ticks == 0 {
            return fail("targetCircles and countdownTicks must be positive");
        }
        if m.circle_min_px <= 0.0 || m.circle_min_px > m.circle_max_px {
            return fail("circle size range is inverted or empty");
        }
        if m.ttl_min_ms == 0 || m.ttl_min_ms > m.ttl_max_ms {
            return fail("TTL range is inverted or empty");
        }
        if d.ticks == 0 || d.step == 0 || d.tick_ms() == 0 {
            return fail("decode ticks, step and tick interval must be positive");
        }
        if d.step.checked_mul(d.ticks) != Some(100) {
            return fail("decode step * ticks must equal 100");
        }
        let (low, high) = d.interrupt_window;
        if low >= high {
            return fail("interruptWindow must be an open interval (low, high)");
        }
        // The first run of a session must hit the window exactly once.
        if !(1..=d.ticks).any(|i| (low + 1..high).contains(&(i * d.step))) {
            return fail("interruptWindow contains no decode progress value");
        }
        let delays = [
            self.background_interval_ms,
            self.shake_ms,
            m.ttl_max_ms,
            m.spawn_gap_ms,
            m.dismiss_delay_ms,
            m.countdown_tick_ms,
            d.decode_time_ms,
        ];
        if delays.iter().any(|ms| *ms > MAX_DELAY_MS) {
            return fail("delays must not exceed one day");
        }
        for chance in [d.resume_hack_chance, d.log_chance] {
            if !(0.0..=1.0).contains(&chance) {
                return fail("chances must lie in [0, 1]");
            }
        }
        Ok(())
    }
}

/// Expands a leading `~` in a path to the user's home directory.
fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    } else if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

fn config_path() -> Option<PathBuf> {
    if let Ok(custom) = std::env::var("SIGMA_OS_CONFIG") {
        return Some(expand_tilde(&custom));
    }
    dirs::home_dir().map(|h| h.join(".sigma-os").join("config.json"))
}

/// Parse and validate a config document.
pub fn parse_config(content: &str) -> Result<GameConfig> {
    let config: GameConfig = serde_json::from_str(content)?;
    config.validate()?;
    Ok(config)
}

/// Load the game config. A missing file yields the defaults.
pub fn load_config() -> Result<GameConfig> {
    let Some(path) = config_path() else {
        return Ok(GameConfig::default());
    };
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(GameConfig::default());
    }
    let content = std::fs::read_to_string(&path)?;
    let config = parse_config(&content)?;
    tracing::info!(path = %path.display(), "loaded game config");
    Ok(config)
}
