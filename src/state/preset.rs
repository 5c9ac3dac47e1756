/// Saving and restoring layouts as presets
///
/// A preset is a durable snapshot of which asset sits in which slot and
/// at what zoom. The staged/live status is session-local and never
/// saved: a restored preset always comes back staged.

use log::warn;

use super::data::{ImageRef, MediaAsset, NewPreset, NewPresetSlot, PresetLayout};
use super::layout::LayoutState;

/// Build the request body for saving the current layout.
///
/// Only occupied slots are kept. A slot without a source asset cannot
/// be persisted and is skipped.
pub fn snapshot(layout: &LayoutState) -> NewPreset {
    let slots = layout
        .slots()
        .iter()
        .filter(|slot| !slot.is_empty())
        .filter_map(|slot| match slot.image_id {
            Some(id) => Some(NewPresetSlot {
                slot_id: slot.slot_id,
                zoom: slot.zoom,
                image: ImageRef { id },
            }),
            None => {
                warn!("⚠️  Slot {} has no source asset, not saved in preset", slot.slot_id);
                None
            }
        })
        .collect();

    NewPreset {
        layout_type: layout.layout(),
        slots,
    }
}

/// Complete slot images that only carry an ID from the known assets.
///
/// Returns false when some slot still has no file to show.
pub fn fill_images(preset: &mut PresetLayout, assets: &[MediaAsset]) -> bool {
    let mut complete = true;
    for slot in preset.slots.iter_mut().filter(|slot| !slot.image.has_file()) {
        match assets.iter().find(|asset| asset.id == slot.image.id) {
            Some(asset) => slot.image = asset.clone(),
            None => complete = false,
        }
    }
    complete
}

/// Turn a saved preset back into a fresh staged layout.
///
/// `url_for` resolves an asset into the URL the windows display. Slots
/// whose image has no file are left empty.
pub fn restore(preset: &PresetLayout, url_for: impl Fn(&MediaAsset) -> String) -> LayoutState {
    let mut layout = LayoutState::new(preset.layout_type);

    for slot in &preset.slots {
        if !slot.image.has_file() {
            warn!(
                "⚠️  Preset {} slot {} has no file for image #{}",
                preset.id,
                slot.slot_id,
                slot.image_id()
            );
            continue;
        }
        if !layout.place(slot.slot_id, url_for(&slot.image), Some(slot.image_id())) {
            warn!(
                "⚠️  Preset {} references slot {} outside a {} layout",
                preset.id, slot.slot_id, preset.layout_type
            );
            continue;
        }
        layout.set_zoom(slot.slot_id, slot.zoom);
    }

    layout
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::PresetSlot;
    use crate::state::layout::{LayoutStatus, LayoutType, ZoomDirection};

    fn asset(id: u64) -> MediaAsset {
        MediaAsset {
            id,
            name: format!("asset-{id}.png"),
            description: String::new(),
            kind: "map".into(),
            file_path: format!("public/images/asset-{id}.png"),
        }
    }

    fn url_for(asset: &MediaAsset) -> String {
        format!("http://localhost:8080/static/{}", asset.file_path.trim_start_matches("public/"))
    }

    /// What the backend does with a NewPreset: attach the full assets
    fn persist(id: u64, body: &NewPreset) -> PresetLayout {
        PresetLayout {
            id,
            layout_type: body.layout_type,
            slots: body
                .slots
                .iter()
                .map(|slot| PresetSlot {
                    id: 0,
                    slot_id: slot.slot_id,
                    zoom: slot.zoom,
                    image: asset(slot.image.id),
                })
                .collect(),
        }
    }

    #[test]
    fn test_snapshot_keeps_only_occupied_slots() {
        let mut layout = LayoutState::new(LayoutType::Quad);
        layout.place(1, url_for(&asset(4)), Some(4));
        layout.place(3, url_for(&asset(5)), Some(5));
        layout.zoom(3, ZoomDirection::In);

        let body = snapshot(&layout);
        assert_eq!(body.layout_type, LayoutType::Quad);
        assert_eq!(body.slots.len(), 2);
        assert_eq!(body.slots[0].slot_id, 1);
        assert_eq!(body.slots[1].zoom, 1.1);
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let mut layout = LayoutState::new(LayoutType::Quad);
        layout.place(0, url_for(&asset(1)), Some(1));
        layout.place(2, url_for(&asset(2)), Some(2));
        layout.zoom(2, ZoomDirection::Out);
        layout.zoom(2, ZoomDirection::Out);
        layout.publish();

        let preset = persist(10, &snapshot(&layout));
        assert_eq!(preset.slots.len(), layout.occupied_count());

        let restored = restore(&preset, url_for);
        assert_eq!(restored.status(), LayoutStatus::Staged);
        assert_eq!(restored.occupied_count(), 2);
        for slot in layout.slots() {
            let other = restored.slot(slot.slot_id).unwrap();
            assert_eq!(other.url, slot.url);
            assert_eq!(other.image_id, slot.image_id);
            if !slot.is_empty() {
                assert_eq!(other.zoom, slot.zoom);
            }
        }
    }

    #[test]
    fn test_restore_skips_out_of_range_slots() {
        let preset = PresetLayout {
            id: 2,
            layout_type: LayoutType::Single,
            slots: vec![
                PresetSlot { id: 1, slot_id: 0, zoom: 1.0, image: asset(1) },
                PresetSlot { id: 2, slot_id: 3, zoom: 1.0, image: asset(2) },
            ],
        };
        let restored = restore(&preset, url_for);
        assert_eq!(restored.slots().len(), 1);
        assert_eq!(restored.occupied_count(), 1);
    }

    /// The backend answers a create with the request body, images by ID only
    const CREATED_ECHO: &str = r#"{"ID":3,"layout_type":"dual","slots":[
        {"slot_id":1,"zoom":1.2,"image":{"ID":7,"name":"","type":"","file_path":""}}]}"#;

    #[test]
    fn test_created_preset_is_filled_from_assets() {
        let mut saved: PresetLayout = serde_json::from_str(CREATED_ECHO).unwrap();
        assert!(!saved.slots[0].image.has_file());

        assert!(fill_images(&mut saved, &[asset(6), asset(7)]));
        assert_eq!(saved.slots[0].image, asset(7));

        let restored = restore(&saved, url_for);
        assert_eq!(restored.occupied_count(), 1);
        let slot = restored.slot(1).unwrap();
        assert_eq!(
            slot.url.as_deref(),
            Some("http://localhost:8080/static/images/asset-7.png")
        );
        assert_eq!(slot.image_id, Some(7));
        assert_eq!(slot.zoom, 1.2);
    }

    #[test]
    fn test_unresolved_image_leaves_slot_empty() {
        let mut saved: PresetLayout = serde_json::from_str(CREATED_ECHO).unwrap();
        assert!(!fill_images(&mut saved, &[asset(1)]));

        let restored = restore(&saved, url_for);
        assert_eq!(restored.status(), LayoutStatus::Empty);
        assert!(restored.slots().iter().all(|slot| slot.url.is_none()));
    }
}
