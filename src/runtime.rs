//! Drives a `Desktop` on the tokio clock.
//!
//! One task owns the controller. It wakes for the next timer deadline or the
//! next inbound command, whichever comes first, and forwards every resulting
//! event to the outbound channel.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::desktop::{Desktop, DesktopSnapshot, Input};
use crate::error::{DesktopError, Result};
use crate::events::UiEvent;

enum Command {
    Input(Input),
    Snapshot(oneshot::Sender<DesktopSnapshot>),
}

pub struct DesktopRuntime {
    tx: mpsc::UnboundedSender<Command>,
    handle: JoinHandle<()>,
}

impl DesktopRuntime {
    /// Boot `desktop` and start driving it. Must be called inside a tokio runtime.
    pub fn spawn(desktop: Desktop, events: mpsc::UnboundedSender<UiEvent>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(drive(desktop, rx, events));
        Self { tx, handle }
    }

    pub fn send(&self, input: Input) -> Result<()> {
        self.tx
            .send(Command::Input(input))
            .map_err(|_| DesktopError::RuntimeClosed)
    }

    pub async fn snapshot(&self) -> Result<DesktopSnapshot> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Command::Snapshot(reply))
            .map_err(|_| DesktopError::RuntimeClosed)?;
        rx.await.map_err(|_| DesktopError::RuntimeClosed)
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Stop the task without waiting for it.
    pub fn abort(&self) {
        self.handle.abort();
    }

    pub async fn shutdown(self) {
        self.handle.abort();
        // Cancellation is the expected result here.
        let _ = self.handle.await;
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Returns false once nobody is listening.
fn forward(events: &mpsc::UnboundedSender<UiEvent>, batch: Vec<UiEvent>) -> bool {
    batch.into_iter().all(|event| events.send(event).is_ok())
}

async fn drive(
    mut desktop: Desktop,
    mut rx: mpsc::UnboundedReceiver<Command>,
    events: mpsc::UnboundedSender<UiEvent>,
) {
    let start = Instant::now();
    if !forward(&events, desktop.boot()) {
        return;
    }

    loop {
        let deadline = desktop.next_deadline();
        // A deadline past the clock's range never wakes the task.
        let wake_at = deadline.and_then(|ms| start.checked_add(Duration::from_millis(ms)));

        let batch = tokio::select! {
            command = rx.recv() => match command {
                Some(Command::Input(input)) => {
                    tracing::trace!(?input, "input");
                    // Anything already due fires before the input lands.
                    let mut batch = desktop.advance_to(elapsed_ms(start));
                    batch.extend(desktop.handle(input));
                    batch
                }
                Some(Command::Snapshot(reply)) => {
                    let _ = reply.send(desktop.snapshot());
                    continue;
                }
                None => break,
            },
            _ = tokio::time::sleep_until(wake_at.unwrap_or(start)), if wake_at.is_some() => {
                desktop.advance_to(deadline.unwrap_or_default())
            }
        };

        if !forward(&events, batch) {
            break;
        }
    }
    tracing::info!("desktop runtime stopped");
}
