/// Shared data structures for the application state
///
/// These structs mirror the JSON served by the asset backend and
/// flow between the API client and the UI layer.

use serde::{Deserialize, Deserializer, Serialize};

use super::layout::LayoutType;

/// Type tag of an asset nobody has categorized yet
pub const UNKNOWN_TYPE: &str = "unknown";

fn unknown_type() -> String {
    UNKNOWN_TYPE.to_string()
}

/// Treat `null` like a missing list
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Represents a single image (map, handout, ...) owned by the backend
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MediaAsset {
    /// Unique database ID
    #[serde(rename = "ID")]
    pub id: u64,
    /// Display name (usually the filename)
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Free-form type tag, "unknown" when untagged
    #[serde(rename = "type", default = "unknown_type")]
    pub kind: String,
    /// Path relative to the backend's static root (e.g. "public/images/cave.png")
    pub file_path: String,
}

impl MediaAsset {
    /// Type to show on the thumbnail badge, None for untagged assets
    pub fn display_type(&self) -> Option<&str> {
        match self.kind.trim() {
            "" | UNKNOWN_TYPE => None,
            kind => Some(kind),
        }
    }

    /// False for a bare `{"ID": n}` reference, such as the backend's
    /// echo of a freshly created preset
    pub fn has_file(&self) -> bool {
        !self.file_path.trim().is_empty()
    }
}

/// A saved layout as returned by the backend
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PresetLayout {
    #[serde(rename = "ID")]
    pub id: u64,
    pub layout_type: LayoutType,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub slots: Vec<PresetSlot>,
}

/// One occupied slot of a saved layout
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PresetSlot {
    #[serde(rename = "ID", default)]
    pub id: u64,
    /// Grid position (0..4)
    pub slot_id: usize,
    /// Saved zoom level
    pub zoom: f32,
    /// The asset shown in the slot
    pub image: MediaAsset,
}

impl PresetSlot {
    pub fn image_id(&self) -> u64 {
        self.image.id
    }
}

/// Request body for creating a preset
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct NewPreset {
    pub layout_type: LayoutType,
    pub slots: Vec<NewPresetSlot>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct NewPresetSlot {
    pub slot_id: usize,
    pub zoom: f32,
    pub image: ImageRef,
}

/// Reference to an existing asset by ID
#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct ImageRef {
    #[serde(rename = "ID")]
    pub id: u64,
}

/// A downloaded copy of a static media URL, as stored in the catalog
#[derive(Debug, Clone, PartialEq)]
pub struct CachedMedia {
    pub url: String,
    /// Where the full image lives in the disk cache
    pub cache_path: String,
    /// 256px thumbnail, None until generated
    pub thumbnail_path: Option<String>,
    /// Unix timestamp of the download
    pub fetched_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_from_backend_json() {
        let json = r#"{
            "ID": 7, "CreatedAt": "2024-01-01T00:00:00Z", "DeletedAt": null,
            "name": "cave.png", "description": "", "type": "map",
            "file_path": "public/images/cave.png"
        }"#;
        let asset: MediaAsset = serde_json::from_str(json).unwrap();
        assert_eq!(asset.id, 7);
        assert_eq!(asset.kind, "map");
        assert_eq!(asset.display_type(), Some("map"));
    }

    #[test]
    fn test_untagged_asset_has_no_badge() {
        let json = r#"{"ID": 1, "name": "x", "file_path": "public/images/x.png"}"#;
        let asset: MediaAsset = serde_json::from_str(json).unwrap();
        assert_eq!(asset.kind, UNKNOWN_TYPE);
        assert_eq!(asset.display_type(), None);
    }

    #[test]
    fn test_preset_with_null_slots() {
        let json = r#"{"ID": 3, "layout_type": "dual", "slots": null}"#;
        let preset: PresetLayout = serde_json::from_str(json).unwrap();
        assert_eq!(preset.layout_type, LayoutType::Dual);
        assert!(preset.slots.is_empty());
    }

    #[test]
    fn test_new_preset_body() {
        let body = NewPreset {
            layout_type: LayoutType::Quad,
            slots: vec![NewPresetSlot {
                slot_id: 3,
                zoom: 1.2,
                image: ImageRef { id: 11 },
            }],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["layout_type"], "quad");
        assert_eq!(json["slots"][0]["slot_id"], 3);
        assert_eq!(json["slots"][0]["image"]["ID"], 11);
    }
}
