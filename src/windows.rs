use iced::window;
use iced::{Size, Task};
use std::collections::BTreeMap;

use crate::sync::popup::{PopupSpec, WindowHost};

#[derive(Debug, Clone)]
struct WindowEntry {
    name: String,
    /// Opened through the popup manager rather than found by name
    opener: bool,
}

/// Window host backed by iced's multi-window runtime.
///
/// iced applies window operations through tasks, so every operation is
/// queued here and drained by the update loop with `take_tasks`. The
/// registry mirrors which windows are open; it loses an entry as soon as
/// iced reports the window closed.
#[derive(Default)]
pub struct IcedWindows {
    windows: BTreeMap<window::Id, WindowEntry>,
    pending: Vec<Task<window::Id>>,
}

impl IcedWindows {
    /// Register a window opened outside the popup manager (the DM window)
    pub fn register(&mut self, id: window::Id, name: &str) {
        self.windows.insert(
            id,
            WindowEntry {
                name: name.to_string(),
                opener: false,
            },
        );
    }

    /// iced reported the window gone. Returns true if it was known.
    pub fn closed(&mut self, id: window::Id) -> bool {
        self.windows.remove(&id).is_some()
    }

    pub fn name_of(&self, id: window::Id) -> Option<&str> {
        self.windows.get(&id).map(|entry| entry.name.as_str())
    }

    /// Hand the queued window operations to the runtime
    pub fn take_tasks(&mut self) -> Task<window::Id> {
        Task::batch(std::mem::take(&mut self.pending))
    }
}

impl WindowHost for IcedWindows {
    type Handle = window::Id;

    fn open(&mut self, spec: &PopupSpec) -> window::Id {
        let (id, task) = window::open(window::Settings {
            size: Size::new(spec.width, spec.height),
            min_size: Some(Size::new(320.0, 180.0)),
            ..window::Settings::default()
        });
        self.windows.insert(
            id,
            WindowEntry {
                name: spec.name.clone(),
                opener: true,
            },
        );
        self.pending.push(task);
        id
    }

    fn attach(&mut self, name: &str) -> Option<window::Id> {
        self.windows
            .iter()
            .find(|(_, entry)| entry.name == name)
            .map(|(id, _)| *id)
    }

    fn is_closed(&self, handle: &window::Id) -> bool {
        !self.windows.contains_key(handle)
    }

    fn has_opener(&self, handle: &window::Id) -> bool {
        self.windows.get(handle).is_some_and(|entry| entry.opener)
    }

    fn focus(&mut self, handle: &window::Id) {
        self.pending.push(window::gain_focus(*handle));
    }

    fn close(&mut self, handle: &window::Id) {
        self.windows.remove(handle);
        self.pending.push(window::close(*handle));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::popup::{PopupEvent, PopupManager};

    #[test]
    fn test_registry_tracks_player_window() {
        let mut popup = PopupManager::new(IcedWindows::default(), PopupSpec::default());
        assert_eq!(popup.open_or_focus(), PopupEvent::Opened);
        let id = *popup.handle().unwrap();
        assert_eq!(popup.host().name_of(id), Some("dmdPlayerWindow"));
        assert!(popup.host().has_opener(&id));

        // iced reports the window closed, the next poll notices
        assert!(popup.host_mut().closed(id));
        assert_eq!(popup.poll(), Some(PopupEvent::Closed));
    }

    #[test]
    fn test_reattach_ignores_other_windows() {
        let mut host = IcedWindows::default();
        let (dm, _) = window::open(window::Settings::default());
        host.register(dm, "dm");

        let mut popup = PopupManager::new(host, PopupSpec::default());
        assert!(!popup.reattach());
        assert!(!popup.host().is_closed(&dm));
    }

    #[test]
    fn test_unowned_window_under_player_name_is_closed() {
        let mut host = IcedWindows::default();
        let (stray, _) = window::open(window::Settings::default());
        host.register(stray, "dmdPlayerWindow");

        let mut popup = PopupManager::new(host, PopupSpec::default());
        assert!(!popup.reattach());
        assert!(popup.host().is_closed(&stray));
    }
}
