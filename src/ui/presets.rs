use iced::widget::image::Handle;
use iced::widget::{button, column, container, row, scrollable, text, Image, Space};
use iced::{Alignment, Background, Border, Color, ContentFit, Element, Length};

use crate::media::store::MediaStore;
use crate::state::data::{MediaAsset, PresetLayout};
use crate::Message;

const PREVIEW_WIDTH: f32 = 150.0;
const PREVIEW_HEIGHT: f32 = 84.0;
const PREVIEW_GAP: f32 = 2.0;

fn preview_cell<'a>(thumbnail: Option<&Handle>, width: f32, height: f32) -> Element<'a, Message> {
    let content: Element<'a, Message> = match thumbnail {
        Some(handle) => Image::<Handle>::new(handle.clone())
            .width(Length::Fill)
            .height(Length::Fill)
            .content_fit(ContentFit::Cover)
            .into(),
        None => Space::new(Length::Fill, Length::Fill).into(),
    };

    container(content)
        .width(Length::Fixed(width))
        .height(Length::Fixed(height))
        .clip(true)
        .style(|_theme| container::Style {
            background: Some(Background::Color(Color::from_rgb(0.15, 0.16, 0.19))),
            border: Border::default().rounded(3),
            ..Default::default()
        })
        .into()
}

/// Miniature of the saved grid with the slot thumbnails
fn preview<'a>(
    preset: &PresetLayout,
    media: &MediaStore,
    url_for: &impl Fn(&MediaAsset) -> String,
) -> Element<'a, Message> {
    let (columns, rows) = preset.layout_type.grid();
    let width = (PREVIEW_WIDTH - PREVIEW_GAP * (columns as f32 - 1.0)) / columns as f32;
    let height = (PREVIEW_HEIGHT - PREVIEW_GAP * (rows as f32 - 1.0)) / rows as f32;

    let grid_rows = (0..rows).map(|r| {
        let cells = (0..columns).map(|c| {
            let slot_id = r * columns + c;
            let url = preset
                .slots
                .iter()
                .find(|slot| slot.slot_id == slot_id)
                .map(|slot| url_for(&slot.image));
            let thumbnail = url.as_deref().and_then(|url| media.thumbnail(url));
            preview_cell(thumbnail, width, height)
        });
        row(cells).spacing(PREVIEW_GAP).into()
    });

    column(grid_rows).spacing(PREVIEW_GAP).into()
}

fn card<'a>(
    preset: &PresetLayout,
    media: &MediaStore,
    url_for: &impl Fn(&MediaAsset) -> String,
) -> Element<'a, Message> {
    let count = preset.slots.len();
    let caption = row![
        text(format!(
            "{} · {} image{}",
            preset.layout_type,
            count,
            if count == 1 { "" } else { "s" }
        ))
        .size(12),
        Space::with_width(Length::Fill),
        button(text("✕").size(12))
            .padding([0, 6])
            .style(button::danger)
            .on_press(Message::DeletePreset(preset.id)),
    ]
    .align_y(Alignment::Center)
    .width(Length::Fixed(PREVIEW_WIDTH));

    button(column![preview(preset, media, url_for), caption].spacing(6))
        .padding(6)
        .style(button::secondary)
        .on_press(Message::LoadPreset(preset.id))
        .into()
}

/// Side panel listing saved presets; click one to load it into staging
pub fn view<'a>(
    presets: &[PresetLayout],
    media: &MediaStore,
    url_for: impl Fn(&MediaAsset) -> String,
) -> Element<'a, Message> {
    let body: Element<'a, Message> = if presets.is_empty() {
        text("No saved presets. Save your first layout!")
            .size(13)
            .color(Color::from_rgb(0.55, 0.55, 0.6))
            .into()
    } else {
        scrollable(
            column(
                presets
                    .iter()
                    .map(|preset| card(preset, media, &url_for)),
            )
            .spacing(8),
        )
        .height(Length::Fill)
        .into()
    };

    container(column![text("Presets").size(16), body].spacing(10))
        .padding(10)
        .width(Length::Fixed(PREVIEW_WIDTH + 32.0))
        .height(Length::Fill)
        .style(container::rounded_box)
        .into()
}
