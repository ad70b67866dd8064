//! Window registry: stacking order, focus, minimize and drag bookkeeping.
//!
//! The focused window is the non-minimized window holding the highest
//! z-index. Every focus draws a fresh value from a single monotonic counter,
//! so z-indices are never reused and the most recent focus always wins.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Viewport};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AppId {
    Browser,
    Notes,
    Verify,
}

impl AppId {
    pub const ALL: [AppId; 3] = [AppId::Browser, AppId::Notes, AppId::Verify];

    pub fn as_str(self) -> &'static str {
        match self {
            AppId::Browser => "browser",
            AppId::Notes => "notes",
            AppId::Verify => "verify",
        }
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Window {
    pub app: AppId,
    pub is_open: bool,
    pub is_minimized: bool,
    pub z_index: u32,
    pub position: Point,
}

/// Pointer-down on a title bar until pointer-up.
#[derive(Clone, Copy, Debug)]
struct DragGesture {
    app: AppId,
    last: Point,
}

#[derive(Debug)]
pub struct WindowRegistry {
    windows: Vec<Window>,
    z_counter: u32,
    drag: Option<DragGesture>,
}

const INITIAL_Z: u32 = 10;
const Z_COUNTER_START: u32 = 20;

impl WindowRegistry {
    /// Build the fixed window set, scattered across the upper-left of the viewport.
    pub fn boot<R: Rng>(viewport: Viewport, rng: &mut R) -> Self {
        let windows = AppId::ALL
            .into_iter()
            .zip(INITIAL_Z..)
            .map(|(app, z_index)| {
                let top = rng.gen_range(0.10..=0.30) * viewport.height;
                let left = rng.gen_range(0.10..=0.50) * viewport.width;
                Window {
                    app,
                    is_open: true,
                    is_minimized: false,
                    z_index,
                    position: Point::new(left, top),
                }
            })
            .collect();

        Self {
            windows,
            z_counter: Z_COUNTER_START,
            drag: None,
        }
    }

    pub fn get(&self, app: AppId) -> &Window {
        // The registry always holds every AppId.
        self.windows
            .iter()
            .find(|w| w.app == app)
            .unwrap_or(&self.windows[0])
    }

    fn get_mut(&mut self, app: AppId) -> &mut Window {
        let idx = self.windows.iter().position(|w| w.app == app).unwrap_or(0);
        &mut self.windows[idx]
    }

    pub fn windows(&self) -> &[Window] {
        &self.windows
    }

    pub fn z_counter(&self) -> u32 {
        self.z_counter
    }

    /// The non-minimized window with the highest z-index.
    pub fn focused(&self) -> Option<AppId> {
        self.windows
            .iter()
            .filter(|w| !w.is_minimized)
            .max_by_key(|w| w.z_index)
            .map(|w| w.app)
    }

    /// Raise (and unminimize) a window. Ignored while a minigame round is live.
    pub fn focus(&mut self, app: AppId, locked: bool) -> Option<Window> {
        if locked {
            return None;
        }
        self.z_counter += 1;
        let z_index = self.z_counter;
        let window = self.get_mut(app);
        window.is_minimized = false;
        window.z_index = z_index;
        tracing::debug!(%app, z_index, "window focused");
        Some(window.clone())
    }

    pub fn minimize(&mut self, app: AppId) -> Option<Window> {
        let window = self.get_mut(app);
        if window.is_minimized {
            return None;
        }
        window.is_minimized = true;
        Some(window.clone())
    }

    /// Windows are session-resident; closing only hides.
    pub fn close(&mut self, app: AppId) -> Option<Window> {
        self.minimize(app)
    }

    /// Taskbar click: restore, hide if already on top, otherwise raise.
    pub fn toggle(&mut self, app: AppId, locked: bool) -> Option<Window> {
        if self.get(app).is_minimized {
            self.focus(app, locked)
        } else if self.focused() == Some(app) {
            self.minimize(app)
        } else {
            self.focus(app, locked)
        }
    }

    pub fn begin_drag(&mut self, app: AppId, pointer: Point, locked: bool) -> Option<Window> {
        let focused = self.focus(app, locked)?;
        self.drag = Some(DragGesture { app, last: pointer });
        Some(focused)
    }

    /// Move the window under an open gesture. A round going live mid-gesture
    /// drops the gesture.
    pub fn drag_to(&mut self, pointer: Point, locked: bool) -> Option<Window> {
        if locked {
            self.drag = None;
            return None;
        }
        let gesture = self.drag.as_mut()?;
        let (dx, dy) = (pointer.x - gesture.last.x, pointer.y - gesture.last.y);
        gesture.last = pointer;
        let app = gesture.app;

        let window = self.get_mut(app);
        window.position.x += dx;
        window.position.y += dy;
        Some(window.clone())
    }

    pub fn end_drag(&mut self) {
        self.drag = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn registry() -> WindowRegistry {
        WindowRegistry::boot(Viewport::default(), &mut StdRng::seed_from_u64(7))
    }

    fn max_z(reg: &WindowRegistry) -> AppId {
        reg.windows().iter().max_by_key(|w| w.z_index).unwrap().app
    }

    #[test]
    fn boot_layout() {
        let reg = registry();
        let z: Vec<u32> = reg.windows().iter().map(|w| w.z_index).collect();
        assert_eq!(z, vec![10, 11, 12]);
        assert_eq!(reg.z_counter(), 20);
        assert_eq!(reg.focused(), Some(AppId::Verify));
        for w in reg.windows() {
            assert!(w.is_open && !w.is_minimized);
            assert!((128.0..=640.0).contains(&w.position.x));
            assert!((80.0..=240.0).contains(&w.position.y));
        }
    }

    #[test]
    fn last_focus_holds_strictly_greatest_z() {
        let mut reg = registry();
        let sequence = [
            AppId::Notes,
            AppId::Browser,
            AppId::Browser,
            AppId::Verify,
            AppId::Notes,
        ];
        let mut seen = Vec::new();
        for app in sequence {
            let w = reg.focus(app, false).unwrap();
            assert!(seen.iter().all(|z| *z < w.z_index));
            seen.push(w.z_index);
            assert_eq!(max_z(&reg), app);
            assert_eq!(reg.focused(), Some(app));
        }
    }

    #[test]
    fn focus_is_ignored_while_locked() {
        let mut reg = registry();
        reg.minimize(AppId::Notes);
        assert!(reg.focus(AppId::Notes, true).is_none());
        assert!(reg.get(AppId::Notes).is_minimized);
        assert_eq!(reg.z_counter(), 20);
    }

    #[test]
    fn minimize_keeps_z_and_is_idempotent() {
        let mut reg = registry();
        let before = reg.get(AppId::Browser).z_index;
        assert!(reg.minimize(AppId::Browser).is_some());
        assert!(reg.minimize(AppId::Browser).is_none());
        assert_eq!(reg.get(AppId::Browser).z_index, before);
        assert!(reg.close(AppId::Browser).is_none());
        assert!(reg.get(AppId::Browser).is_open);
    }

    #[test]
    fn toggle_restores_then_hides() {
        let mut reg = registry();
        reg.minimize(AppId::Notes);

        let w = reg.toggle(AppId::Notes, false).unwrap();
        assert!(!w.is_minimized);
        assert_eq!(reg.focused(), Some(AppId::Notes));

        let w = reg.toggle(AppId::Notes, false).unwrap();
        assert!(w.is_minimized);
        assert_ne!(reg.focused(), Some(AppId::Notes));
    }

    #[test]
    fn toggle_raises_a_background_window() {
        let mut reg = registry();
        let w = reg.toggle(AppId::Browser, false).unwrap();
        assert!(!w.is_minimized);
        assert_eq!(reg.focused(), Some(AppId::Browser));
    }

    #[test]
    fn focused_ignores_minimized_windows() {
        let mut reg = registry();
        reg.focus(AppId::Notes, false);
        reg.minimize(AppId::Notes);
        assert_eq!(reg.focused(), Some(AppId::Verify));
    }

    #[test]
    fn drag_gesture_translates_by_pointer_delta() {
        let mut reg = registry();
        let start = reg.get(AppId::Browser).position;

        reg.begin_drag(AppId::Browser, Point::new(100.0, 100.0), false).unwrap();
        assert_eq!(reg.focused(), Some(AppId::Browser));
        reg.drag_to(Point::new(110.0, 95.0), false);
        let w = reg.drag_to(Point::new(130.0, 90.0), false).unwrap();
        assert_eq!(w.position, Point::new(start.x + 30.0, start.y - 10.0));

        reg.end_drag();
        assert!(reg.drag_to(Point::new(500.0, 500.0), false).is_none());
    }

    #[test]
    fn gesture_is_dropped_once_locked() {
        let mut reg = registry();
        let start = reg.get(AppId::Notes).position;
        reg.begin_drag(AppId::Notes, Point::new(10.0, 10.0), false).unwrap();
        assert!(reg.drag_to(Point::new(40.0, 40.0), true).is_none());
        assert_eq!(reg.get(AppId::Notes).position, start);

        // Still gone after the lock lifts; a new gesture is required.
        assert!(reg.drag_to(Point::new(50.0, 50.0), false).is_none());
    }

    #[test]
    fn begin_drag_is_ignored_while_locked() {
        let mut reg = registry();
        assert!(reg.begin_drag(AppId::Notes, Point::new(0.0, 0.0), true).is_none());
        assert!(reg.drag_to(Point::new(5.0, 5.0), false).is_none());
    }
}
