use std::sync::Arc;

use tauri::ipc::Channel;
use tauri::AppHandle;
use tauri_plugin_dialog::{DialogExt, MessageDialogKind};
use tokio::sync::{mpsc, Mutex};

use crate::config::GameConfig;
use crate::desktop::{Desktop, DesktopSnapshot, Input};
use crate::error::{DesktopError, Result};
use crate::events::{ResetReason, UiEvent};
use crate::geometry::Viewport;
use crate::runtime::DesktopRuntime;

// ── State ───────────────────────────────────────────────────────────────────

pub struct DesktopSession {
    runtime: Arc<Mutex<Option<DesktopRuntime>>>,
}

impl Default for DesktopSession {
    fn default() -> Self {
        Self {
            runtime: Arc::new(Mutex::new(None)),
        }
    }
}

impl DesktopSession {
    /// Stop the session from a sync context (window teardown).
    pub fn kill_sync(&self) {
        if let Ok(mut guard) = self.runtime.try_lock() {
            if let Some(runtime) = guard.take() {
                runtime.abort();
            }
        }
    }
}

fn show_compromised(app: &AppHandle, message: &str) {
    app.dialog()
        .message(message)
        .title("Sigma OS")
        .kind(MessageDialogKind::Error)
        .show(|_| {});
}

// ── Commands ────────────────────────────────────────────────────────────────

/// Boots a fresh desktop and streams its events to the webview. A session
/// that is already running is replaced (e.g. after a frontend reload).
#[tauri::command]
pub async fn start_session(
    app: AppHandle,
    viewport: Option<Viewport>,
    on_event: Channel<UiEvent>,
    state: tauri::State<'_, DesktopSession>,
    config: tauri::State<'_, GameConfig>,
) -> Result<()> {
    let mut guard = state.runtime.lock().await;
    if let Some(previous) = guard.take() {
        tracing::info!("replacing running desktop session");
        previous.shutdown().await;
    }

    let (tx, mut rx) = mpsc::unbounded_channel();
    let desktop = Desktop::from_entropy(config.inner().clone(), viewport.unwrap_or_default());
    *guard = Some(DesktopRuntime::spawn(desktop, tx));

    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            if let UiEvent::HardReset {
                reason: ResetReason::Compromised,
                message,
            } = &event
            {
                show_compromised(&app, message);
            }
            if on_event.send(event).is_err() {
                tracing::warn!("webview channel closed, dropping desktop events");
                break;
            }
        }
    });

    Ok(())
}

#[tauri::command]
pub async fn send_input(input: Input, state: tauri::State<'_, DesktopSession>) -> Result<()> {
    let guard = state.runtime.lock().await;
    guard
        .as_ref()
        .ok_or(DesktopError::RuntimeClosed)?
        .send(input)
}

#[tauri::command]
pub async fn stop_session(state: tauri::State<'_, DesktopSession>) -> Result<()> {
    if let Some(runtime) = state.runtime.lock().await.take() {
        runtime.shutdown().await;
    }
    Ok(())
}

/// Returns `None` when no session has been started.
#[tauri::command]
pub async fn get_session_status(
    state: tauri::State<'_, DesktopSession>,
) -> Result<Option<DesktopSnapshot>> {
    let guard = state.runtime.lock().await;
    match guard.as_ref() {
        Some(runtime) if runtime.is_running() => Ok(Some(runtime.snapshot().await?)),
        _ => Ok(None),
    }
}
