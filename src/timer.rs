//! Deadline-ordered timer queue driving every delayed or repeating callback.
//!
//! Time is virtual (milliseconds since boot). The runtime maps it onto
//! `tokio::time`, tests advance it by hand.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CircleId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RoundId(pub u64);

/// Identity of a pending callback. At most one entry per key is pending.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimerKey {
    Countdown,
    Expire(CircleId),
    SpawnNext,
    Dismiss(RoundId),
    DecodeTick,
    Background,
}

/// Timer request emitted by a state machine transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerCommand {
    Once { key: TimerKey, delay_ms: u64 },
    Every { key: TimerKey, period_ms: u64 },
    Cancel(TimerKey),
}

#[derive(Clone, Copy, Debug)]
struct Entry {
    key: TimerKey,
    period_ms: Option<u64>,
}

#[derive(Debug, Default)]
pub struct TimerQueue {
    now_ms: u64,
    next_seq: u64,
    // (deadline, seq) keeps equal deadlines in registration order.
    entries: BTreeMap<(u64, u64), Entry>,
    slots: HashMap<TimerKey, (u64, u64)>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn apply(&mut self, command: TimerCommand) {
        match command {
            TimerCommand::Once { key, delay_ms } => self.once(key, delay_ms),
            TimerCommand::Every { key, period_ms } => self.every(key, period_ms),
            TimerCommand::Cancel(key) => self.cancel(key),
        }
    }

    pub fn once(&mut self, key: TimerKey, delay_ms: u64) {
        self.insert(key, self.now_ms.saturating_add(delay_ms), None);
    }

    pub fn every(&mut self, key: TimerKey, period_ms: u64) {
        let period_ms = period_ms.max(1);
        self.insert(key, self.now_ms.saturating_add(period_ms), Some(period_ms));
    }

    pub fn cancel(&mut self, key: TimerKey) {
        if let Some(slot) = self.slots.remove(&key) {
            self.entries.remove(&slot);
        }
    }

    pub fn cancel_all(&mut self) {
        self.entries.clear();
        self.slots.clear();
    }

    pub fn is_pending(&self, key: TimerKey) -> bool {
        self.slots.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.entries.keys().next().map(|(deadline, _)| *deadline)
    }

    /// Pop the earliest entry due at or before `now_ms`, moving the clock to
    /// its deadline. Repeating entries are re-armed one period later.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<TimerKey> {
        let (&slot, _) = self.entries.iter().next()?;
        if slot.0 > now_ms {
            self.now_ms = self.now_ms.max(now_ms);
            return None;
        }
        let entry = self.entries.remove(&slot)?;
        self.slots.remove(&entry.key);
        self.now_ms = self.now_ms.max(slot.0);
        if let Some(period) = entry.period_ms {
            self.insert(entry.key, slot.0.saturating_add(period), Some(period));
        }
        Some(entry.key)
    }

    /// Move the clock forward without firing anything.
    pub fn set_now(&mut self, now_ms: u64) {
        self.now_ms = self.now_ms.max(now_ms);
    }

    fn insert(&mut self, key: TimerKey, deadline: u64, period_ms: Option<u64>) {
        self.cancel(key);
        let slot = (deadline, self.next_seq);
        self.next_seq += 1;
        self.entries.insert(slot, Entry { key, period_ms });
        self.slots.insert(key, slot);
    }
}
