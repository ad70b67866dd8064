//! Sigma OS: a simulated desktop puzzle.
//!
//! The core (`desktop` and the modules under it) is a set of synchronous
//! state machines driven by inputs and timer firings. `runtime` puts them on
//! the tokio clock; the `desktop` feature wraps that in a Tauri window.

pub mod audio;
pub mod config;
pub mod decoder;
pub mod desktop;
pub mod error;
pub mod events;
pub mod geometry;
pub mod logging;
pub mod minigame;
pub mod pages;
pub mod runtime;
pub mod scheduler;
pub mod secret;
pub mod session;
pub mod timer;
pub mod verify;
pub mod windows;

#[cfg(feature = "desktop")]
mod commands;

#[cfg(feature = "desktop")]
pub fn run(config: config::GameConfig) {
    use tauri::Manager;

    tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .manage(commands::session::DesktopSession::default())
        .manage(config)
        .invoke_handler(tauri::generate_handler![
            commands::session::start_session,
            commands::session::send_input,
            commands::session::stop_session,
            commands::session::get_session_status,
        ])
        .on_window_event(|window, event| {
            if let tauri::WindowEvent::Destroyed = event {
                // Stop the timers when the window is closed
                if let Some(state) = window.try_state::<commands::session::DesktopSession>() {
                    state.inner().kill_sync();
                }
            }
        })
        .run(tauri::generate_context!())
        .expect("failed to run Sigma OS");
}
