/// Player window lifecycle
///
/// The manager owns at most one handle to the named player window. It
/// opens the window or brings it forward, re-adopts a window left open
/// by an earlier page visit, and detects closure by polling: the host
/// offers no close callback the page can rely on, so the page runs a
/// timer while a handle is held and calls `poll` on every tick.

use log::{info, warn};
use std::fmt;
use std::time::Duration;

/// How often the page checks whether the player window is still there
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Name the player window is registered under
pub const PLAYER_WINDOW_NAME: &str = "dmdPlayerWindow";

/// Everything needed to open the popup
#[derive(Debug, Clone, PartialEq)]
pub struct PopupSpec {
    pub name: String,
    pub title: String,
    pub width: f32,
    pub height: f32,
}

impl Default for PopupSpec {
    fn default() -> Self {
        Self {
            name: PLAYER_WINDOW_NAME.to_string(),
            title: "Players View".to_string(),
            width: 1280.0,
            height: 720.0,
        }
    }
}

/// Window operations the manager needs from the windowing system
pub trait WindowHost {
    type Handle: Clone + PartialEq + fmt::Debug;

    /// Open a new window described by `spec`
    fn open(&mut self, spec: &PopupSpec) -> Self::Handle;

    /// Look up a window by name. Like opening a named window with an
    /// empty target, this may hand back a blank window nobody asked for.
    fn attach(&mut self, name: &str) -> Option<Self::Handle>;

    fn is_closed(&self, handle: &Self::Handle) -> bool;

    /// True when the window was opened by this application
    fn has_opener(&self, handle: &Self::Handle) -> bool;

    fn focus(&mut self, handle: &Self::Handle);

    fn close(&mut self, handle: &Self::Handle);
}

/// Signals raised towards the hosting page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupEvent {
    Opened,
    Focused,
    /// Raised once per handle, when the window goes away
    Closed,
    /// The held window had gone away unnoticed and a fresh one was opened
    /// in its place; the closure counts as signalled by this event
    Reopened,
}

pub struct PopupManager<H: WindowHost> {
    host: H,
    spec: PopupSpec,
    handle: Option<H::Handle>,
}

impl<H: WindowHost> PopupManager<H> {
    pub fn new(host: H, spec: PopupSpec) -> Self {
        Self {
            host,
            spec,
            handle: None,
        }
    }

    pub fn spec(&self) -> &PopupSpec {
        &self.spec
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn handle(&self) -> Option<&H::Handle> {
        self.handle.as_ref()
    }

    /// A live handle is held
    pub fn is_open(&self) -> bool {
        self.live_handle().is_some()
    }

    /// A handle is held, so liveness polling should run
    pub fn is_tracking(&self) -> bool {
        self.handle.is_some()
    }

    fn live_handle(&self) -> Option<&H::Handle> {
        self.handle
            .as_ref()
            .filter(|handle| !self.host.is_closed(handle))
    }

    /// Bring the player window forward, opening it if needed
    pub fn open_or_focus(&mut self) -> PopupEvent {
        if let Some(handle) = self.live_handle().cloned() {
            self.host.focus(&handle);
            return PopupEvent::Focused;
        }

        let missed_close = self.poll().is_some();
        let handle = self.host.open(&self.spec);
        info!("🪟 Opened {} ({}x{})", self.spec.name, self.spec.width, self.spec.height);
        self.handle = Some(handle);
        if missed_close {
            PopupEvent::Reopened
        } else {
            PopupEvent::Opened
        }
    }

    /// Adopt a player window that is already open.
    ///
    /// Only a window with an opener is adopted; a blank window created
    /// by the lookup itself is closed right away. Returns true when a
    /// live handle is held afterwards.
    pub fn reattach(&mut self) -> bool {
        if self.handle.is_some() {
            return self.is_open();
        }

        let Some(handle) = self.host.attach(&self.spec.name) else {
            return false;
        };

        if self.host.is_closed(&handle) {
            return false;
        }

        if self.host.has_opener(&handle) {
            info!("🔗 Re-attached to {}", self.spec.name);
            self.handle = Some(handle);
            true
        } else {
            warn!("⚠️  Closing stray {} window", self.spec.name);
            self.host.close(&handle);
            false
        }
    }

    /// Forget the handle without closing the window (page left)
    pub fn detach(&mut self) {
        self.handle = None;
    }

    /// No-op without a live handle
    pub fn focus(&mut self) -> bool {
        match self.live_handle().cloned() {
            Some(handle) => {
                self.host.focus(&handle);
                true
            }
            None => false,
        }
    }

    /// Close the player window. Calling it again does nothing.
    pub fn close(&mut self) -> Option<PopupEvent> {
        let handle = self.handle.take()?;
        if !self.host.is_closed(&handle) {
            self.host.close(&handle);
        }
        info!("🪟 Closed {}", self.spec.name);
        Some(PopupEvent::Closed)
    }

    /// Liveness check, run on every timer tick while tracking
    pub fn poll(&mut self) -> Option<PopupEvent> {
        let closed = self
            .handle
            .as_ref()
            .is_some_and(|handle| self.host.is_closed(handle));

        if closed {
            self.handle = None;
            info!("🪟 {} was closed", self.spec.name);
            Some(PopupEvent::Closed)
        } else {
            None
        }
    }
}

impl<H: WindowHost> fmt::Debug for PopupManager<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PopupManager")
            .field("spec", &self.spec)
            .field("handle", &self.handle)
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    #[derive(Debug, Default)]
    pub(crate) struct FakeWindow {
        pub name: String,
        pub opener: bool,
        pub closed: bool,
        pub focus_count: usize,
    }

    /// Window host that records what the manager asked for
    #[derive(Debug, Default)]
    pub(crate) struct FakeHost {
        pub windows: Vec<FakeWindow>,
        /// A lookup that finds nothing creates a blank window, like a browser does
        pub attach_creates_blank: bool,
    }

    impl FakeHost {
        pub fn user_closes(&mut self, handle: usize) {
            self.windows[handle].closed = true;
        }
    }

    impl WindowHost for FakeHost {
        type Handle = usize;

        fn open(&mut self, spec: &PopupSpec) -> usize {
            self.windows.push(FakeWindow {
                name: spec.name.clone(),
                opener: true,
                ..Default::default()
            });
            self.windows.len() - 1
        }

        fn attach(&mut self, name: &str) -> Option<usize> {
            let found = self
                .windows
                .iter()
                .position(|window| window.name == name && !window.closed);
            if found.is_some() || !self.attach_creates_blank {
                return found;
            }
            self.windows.push(FakeWindow {
                name: name.to_string(),
                ..Default::default()
            });
            Some(self.windows.len() - 1)
        }

        fn is_closed(&self, handle: &usize) -> bool {
            self.windows[*handle].closed
        }

        fn has_opener(&self, handle: &usize) -> bool {
            self.windows[*handle].opener
        }

        fn focus(&mut self, handle: &usize) {
            self.windows[*handle].focus_count += 1;
        }

        fn close(&mut self, handle: &usize) {
            self.windows[*handle].closed = true;
        }
    }

    fn manager() -> PopupManager<FakeHost> {
        PopupManager::new(FakeHost::default(), PopupSpec::default())
    }

    #[test]
    fn test_open_then_focus() {
        let mut popup = manager();
        assert!(!popup.is_open());
        assert!(!popup.focus());

        assert_eq!(popup.open_or_focus(), PopupEvent::Opened);
        assert!(popup.is_open());
        assert!(popup.is_tracking());

        assert_eq!(popup.open_or_focus(), PopupEvent::Focused);
        assert!(popup.focus());
        assert_eq!(popup.host().windows.len(), 1);
        assert_eq!(popup.host().windows[0].focus_count, 2);
    }

    #[test]
    fn test_poll_signals_closure_once() {
        let mut popup = manager();
        popup.open_or_focus();
        assert_eq!(popup.poll(), None);

        popup.host_mut().user_closes(0);
        assert_eq!(popup.poll(), Some(PopupEvent::Closed));
        assert!(!popup.is_tracking());
        assert_eq!(popup.poll(), None);

        // Reopening creates a fresh window
        assert_eq!(popup.open_or_focus(), PopupEvent::Opened);
        assert_eq!(popup.host().windows.len(), 2);
    }

    #[test]
    fn test_open_after_unpolled_close_reports_closure() {
        let mut popup = manager();
        assert_eq!(popup.open_or_focus(), PopupEvent::Opened);

        // Closed between two timer ticks, then reopened before the next one
        popup.host_mut().user_closes(0);
        assert!(!popup.is_open());
        assert_eq!(popup.open_or_focus(), PopupEvent::Reopened);

        assert!(popup.is_open());
        assert_eq!(popup.handle(), Some(&1));
        assert_eq!(popup.poll(), None);
        assert_eq!(popup.open_or_focus(), PopupEvent::Focused);
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut popup = manager();
        assert_eq!(popup.close(), None);

        popup.open_or_focus();
        assert_eq!(popup.close(), Some(PopupEvent::Closed));
        assert!(popup.host().windows[0].closed);
        assert_eq!(popup.close(), None);
        assert_eq!(popup.poll(), None);
    }

    #[test]
    fn test_reattach_adopts_known_window() {
        let mut popup = manager();
        popup.open_or_focus();
        popup.detach();
        assert!(!popup.is_tracking());
        assert!(!popup.host().windows[0].closed);

        assert!(popup.reattach());
        assert!(popup.is_open());
        assert_eq!(popup.host().windows.len(), 1);
    }

    #[test]
    fn test_reattach_closes_stray_blank_window() {
        let mut popup = PopupManager::new(
            FakeHost {
                attach_creates_blank: true,
                ..Default::default()
            },
            PopupSpec::default(),
        );

        assert!(!popup.reattach());
        assert!(!popup.is_tracking());
        assert_eq!(popup.host().windows.len(), 1);
        assert!(popup.host().windows[0].closed);
    }

    #[test]
    fn test_reattach_without_window() {
        let mut popup = manager();
        assert!(!popup.reattach());
        assert!(popup.host().windows.is_empty());
    }
}
