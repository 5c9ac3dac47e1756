/// The DM's staging grid
///
/// A layout is a fixed number of slots (1, 2 or 4 depending on the
/// layout type). Each slot may hold a reference to an image plus a zoom
/// factor. The status shown to the DM is derived from two facts:
/// - whether any slot holds content
/// - whether the layout was explicitly published to the players
///
/// The status is serialized alongside the slots so the player window
/// receives the full picture in one message.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Amount added or removed by a single zoom step
pub const ZOOM_STEP: f32 = 0.1;

/// Smallest zoom a slot can reach
pub const MIN_ZOOM: f32 = 0.1;

/// Zoom of a freshly placed or reset slot
pub const DEFAULT_ZOOM: f32 = 1.0;

/// Shape of the staging grid
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum LayoutType {
    #[default]
    Single,
    Dual,
    Quad,
}

impl LayoutType {
    pub const ALL: [LayoutType; 3] = [LayoutType::Single, LayoutType::Dual, LayoutType::Quad];

    /// Number of slots in this layout
    pub fn slot_count(self) -> usize {
        match self {
            LayoutType::Single => 1,
            LayoutType::Dual => 2,
            LayoutType::Quad => 4,
        }
    }

    /// Grid arrangement as (columns, rows)
    pub fn grid(self) -> (usize, usize) {
        match self {
            LayoutType::Single => (1, 1),
            LayoutType::Dual => (2, 1),
            LayoutType::Quad => (2, 2),
        }
    }
}

impl fmt::Display for LayoutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LayoutType::Single => "Single",
            LayoutType::Dual => "Dual",
            LayoutType::Quad => "Quad",
        };
        f.write_str(label)
    }
}

/// What the DM sees on the staging area badge
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LayoutStatus {
    /// No slot holds content
    Empty,
    /// Content is staged but not shown to the players
    Staged,
    /// Content was published and is on the player window
    Live,
}

/// Direction of a zoom button press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
    Reset,
}

impl ZoomDirection {
    /// Compute the next zoom value from the current one
    pub fn apply(self, zoom: f32) -> f32 {
        match self {
            ZoomDirection::In => round_zoom(zoom + ZOOM_STEP),
            ZoomDirection::Out => round_zoom((zoom - ZOOM_STEP).max(MIN_ZOOM)),
            ZoomDirection::Reset => DEFAULT_ZOOM,
        }
    }
}

/// Keep two decimals and never go below the floor
fn round_zoom(zoom: f32) -> f32 {
    ((zoom * 100.0).round() / 100.0).max(MIN_ZOOM)
}

/// Zoom accepted from outside: rounded and floored, default when not a number
fn normalize_zoom(zoom: f32) -> f32 {
    if zoom.is_finite() {
        round_zoom(zoom)
    } else {
        DEFAULT_ZOOM
    }
}

fn default_zoom() -> f32 {
    DEFAULT_ZOOM
}

/// A single grid position
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImageSlot {
    /// Stable identity of the grid position (0-based)
    pub slot_id: usize,
    /// Displayable content, None when the slot is empty
    pub url: Option<String>,
    /// Scale applied when rendering the content
    #[serde(default = "default_zoom")]
    pub zoom: f32,
    /// Source asset, needed to save the slot in a preset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_id: Option<u64>,
}

impl ImageSlot {
    fn empty(slot_id: usize) -> Self {
        Self {
            slot_id,
            url: None,
            zoom: DEFAULT_ZOOM,
            image_id: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.url.is_none()
    }
}

/// Errors raised when a layout arrives from outside (window channel)
#[derive(Debug, Error, PartialEq)]
pub enum LayoutError {
    #[error("{layout} layout needs {expected} slots, got {actual}")]
    SlotCount {
        layout: LayoutType,
        expected: usize,
        actual: usize,
    },
    #[error("slot id {0} is out of range or repeated")]
    SlotId(usize),
}

/// Serialized form of a layout
#[derive(Serialize, Deserialize, Debug, Clone)]
struct LayoutWire {
    layout: LayoutType,
    status: LayoutStatus,
    slots: Vec<ImageSlot>,
}

/// The staging grid and its publication flag
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(into = "LayoutWire", try_from = "LayoutWire")]
pub struct LayoutState {
    layout: LayoutType,
    slots: Vec<ImageSlot>,
    published: bool,
}

impl Default for LayoutState {
    fn default() -> Self {
        Self::new(LayoutType::default())
    }
}

impl LayoutState {
    /// Create an all-empty layout of the given type
    pub fn new(layout: LayoutType) -> Self {
        Self {
            layout,
            slots: (0..layout.slot_count()).map(ImageSlot::empty).collect(),
            published: false,
        }
    }

    pub fn layout(&self) -> LayoutType {
        self.layout
    }

    pub fn slots(&self) -> &[ImageSlot] {
        &self.slots
    }

    pub fn slot(&self, slot_id: usize) -> Option<&ImageSlot> {
        self.slots.iter().find(|slot| slot.slot_id == slot_id)
    }

    fn slot_mut(&mut self, slot_id: usize) -> Option<&mut ImageSlot> {
        self.slots.iter_mut().find(|slot| slot.slot_id == slot_id)
    }

    /// True if at least one slot holds content
    pub fn has_content(&self) -> bool {
        self.slots.iter().any(|slot| !slot.is_empty())
    }

    /// Number of slots holding content
    pub fn occupied_count(&self) -> usize {
        self.slots.iter().filter(|slot| !slot.is_empty()).count()
    }

    /// Derived status: empty wins, then the publication flag
    pub fn status(&self) -> LayoutStatus {
        if !self.has_content() {
            LayoutStatus::Empty
        } else if self.published {
            LayoutStatus::Live
        } else {
            LayoutStatus::Staged
        }
    }

    /// Switch to another layout type, discarding every slot
    pub fn set_layout(&mut self, layout: LayoutType) {
        *self = Self::new(layout);
    }

    /// Put an asset into a slot. Returns false for an unknown slot.
    ///
    /// The publication flag is left alone: dropping into a live layout
    /// does not publish the change.
    pub fn place(&mut self, slot_id: usize, url: String, image_id: Option<u64>) -> bool {
        match self.slot_mut(slot_id) {
            Some(slot) => {
                slot.url = Some(url);
                slot.image_id = image_id;
                true
            }
            None => false,
        }
    }

    /// Remove the content of a slot, keeping its zoom
    pub fn clear(&mut self, slot_id: usize) -> bool {
        let Some(slot) = self.slot_mut(slot_id) else {
            return false;
        };
        slot.url = None;
        slot.image_id = None;

        // Clearing the last slot ends any publication
        if !self.has_content() {
            self.published = false;
        }
        true
    }

    /// Exchange the content, zoom and asset of two slots
    pub fn swap(&mut self, source: usize, target: usize) -> bool {
        if source == target {
            return false;
        }
        let source_index = self.slots.iter().position(|slot| slot.slot_id == source);
        let target_index = self.slots.iter().position(|slot| slot.slot_id == target);
        let (Some(a), Some(b)) = (source_index, target_index) else {
            return false;
        };

        let source_slot = self.slots[a].clone();
        let target_slot = self.slots[b].clone();

        let slot = &mut self.slots[a];
        slot.url = target_slot.url;
        slot.zoom = target_slot.zoom;
        slot.image_id = target_slot.image_id;

        let slot = &mut self.slots[b];
        slot.url = source_slot.url;
        slot.zoom = source_slot.zoom;
        slot.image_id = source_slot.image_id;
        true
    }

    /// Apply a zoom button press to a slot
    pub fn zoom(&mut self, slot_id: usize, direction: ZoomDirection) -> bool {
        match self.slot_mut(slot_id) {
            Some(slot) => {
                slot.zoom = direction.apply(slot.zoom);
                true
            }
            None => false,
        }
    }

    /// Set an absolute zoom (used when restoring presets)
    pub fn set_zoom(&mut self, slot_id: usize, zoom: f32) -> bool {
        match self.slot_mut(slot_id) {
            Some(slot) => {
                slot.zoom = normalize_zoom(zoom);
                true
            }
            None => false,
        }
    }

    /// Mark the layout as shown to the players.
    ///
    /// Only a staged layout can be published. Returns the snapshot to
    /// broadcast, which already carries the live status.
    pub fn publish(&mut self) -> Option<LayoutState> {
        if self.status() != LayoutStatus::Staged {
            return None;
        }
        self.published = true;
        Some(self.clone())
    }

    /// Take a live layout back to staged. Returns false if it was not live.
    pub fn unpublish(&mut self) -> bool {
        if self.status() != LayoutStatus::Live {
            return false;
        }
        self.published = false;
        true
    }
}

impl From<LayoutState> for LayoutWire {
    fn from(state: LayoutState) -> Self {
        LayoutWire {
            layout: state.layout,
            status: state.status(),
            slots: state.slots,
        }
    }
}

impl TryFrom<LayoutWire> for LayoutState {
    type Error = LayoutError;

    fn try_from(wire: LayoutWire) -> Result<Self, Self::Error> {
        let expected = wire.layout.slot_count();
        if wire.slots.len() != expected {
            return Err(LayoutError::SlotCount {
                layout: wire.layout,
                expected,
                actual: wire.slots.len(),
            });
        }

        let mut seen = vec![false; expected];
        for slot in &wire.slots {
            match seen.get_mut(slot.slot_id) {
                Some(flag) if !*flag => *flag = true,
                _ => return Err(LayoutError::SlotId(slot.slot_id)),
            }
        }

        let mut slots = wire.slots;
        for slot in &mut slots {
            slot.zoom = normalize_zoom(slot.zoom);
        }

        Ok(LayoutState {
            layout: wire.layout,
            slots,
            published: wire.status == LayoutStatus::Live,
        })
    }
}
