/// Staging area: the DM's editable copy of the player layout
///
/// Placement works by selection. Pick an asset in the asset bar and click
/// a slot to place it, or press "Move" on an occupied slot and click
/// another slot to swap the two.
use iced::widget::{
    button, center, column, container, mouse_area, pick_list, row, stack, text, Space,
};
use iced::{Alignment, Background, Border, Color, Element, Length};

use super::player::{grid, slot_image};
use super::status_color;
use crate::media::store::{MediaEntry, MediaStore};
use crate::state::layout::{ImageSlot, LayoutState, LayoutStatus, LayoutType, ZoomDirection};
use crate::state::notification::Notification;
use crate::Message;

/// What the DM has picked up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    None,
    /// An asset from the asset bar
    Asset(u64),
    /// The content of a slot, about to be moved
    Moving(usize),
}

/// Result of clicking a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotAction {
    Place { image_id: u64, slot_id: usize },
    Swap { source: usize, target: usize },
    Nothing,
}

/// Decide what a click on `slot_id` does
pub fn slot_action(selection: Selection, slot_id: usize) -> SlotAction {
    match selection {
        Selection::Asset(image_id) => SlotAction::Place { image_id, slot_id },
        Selection::Moving(source) if source != slot_id => SlotAction::Swap {
            source,
            target: slot_id,
        },
        _ => SlotAction::Nothing,
    }
}

fn hint(selection: Selection) -> &'static str {
    match selection {
        Selection::None => "Select an asset below, then click a slot to place it",
        Selection::Asset(_) => "Click a slot to place the selected asset",
        Selection::Moving(_) => "Click another slot to swap, or press Cancel",
    }
}

fn status_badge<'a>(status: LayoutStatus) -> Element<'a, Message> {
    let label = match status {
        LayoutStatus::Empty => "EMPTY",
        LayoutStatus::Staged => "STAGED",
        LayoutStatus::Live => "LIVE",
    };
    let color = status_color(status);

    container(text(label).size(12).color(Color::BLACK))
        .padding([3, 10])
        .style(move |_theme| container::Style {
            background: Some(Background::Color(color)),
            border: Border::default().rounded(10),
            ..Default::default()
        })
        .into()
}

fn control<'a>(label: &'a str, message: Message) -> Element<'a, Message> {
    button(text(label).size(12))
        .padding([2, 8])
        .style(button::secondary)
        .on_press(message)
        .into()
}

fn slot_cell<'a>(
    slot: &ImageSlot,
    status: LayoutStatus,
    media: &MediaStore,
    selection: Selection,
) -> Element<'a, Message> {
    let id = slot.slot_id;
    let moving_this = selection == Selection::Moving(id);

    let body: Element<'a, Message> = match slot.url.as_deref() {
        None => {
            let label = match selection {
                Selection::Asset(_) => "Click to place here",
                Selection::Moving(_) => "Click to move here",
                Selection::None => "Empty slot",
            };
            center(text(label).size(14).color(Color::from_rgb(0.5, 0.5, 0.55))).into()
        }
        Some(url) => {
            let picture: Element<'a, Message> = match media.get(url) {
                Some(MediaEntry::Ready { full, .. }) => slot_image(full, slot.zoom),
                Some(MediaEntry::Failed) => center(text("Image unavailable").size(14)).into(),
                _ => center(text("Loading…").size(14)).into(),
            };

            let controls = row![
                text(format!("Slot {} · {:.0}%", id + 1, slot.zoom * 100.0)).size(12),
                Space::with_width(Length::Fill),
                control("−", Message::Zoom(id, ZoomDirection::Out)),
                control("Reset", Message::Zoom(id, ZoomDirection::Reset)),
                control("+", Message::Zoom(id, ZoomDirection::In)),
                control(
                    if moving_this { "Cancel" } else { "Move" },
                    Message::StartMove(id)
                ),
                button(text("Clear").size(12))
                    .padding([2, 8])
                    .style(button::danger)
                    .on_press(Message::ClearSlot(id)),
            ]
            .spacing(4)
            .align_y(Alignment::Center);

            stack![
                picture,
                container(controls)
                    .padding(6)
                    .width(Length::Fill)
                    .style(|_theme| container::Style {
                        background: Some(Background::Color(Color::from_rgba(0.0, 0.0, 0.0, 0.55))),
                        ..Default::default()
                    }),
            ]
            .into()
        }
    };

    let border_color = if moving_this {
        Color::from_rgb(0.3, 0.6, 1.0)
    } else {
        status_color(status)
    };

    let cell = container(body)
        .width(Length::Fill)
        .height(Length::Fill)
        .clip(true)
        .style(move |_theme| container::Style {
            background: Some(Background::Color(Color::from_rgb(0.1, 0.11, 0.13))),
            border: Border {
                color: border_color,
                width: 2.0,
                radius: 8.0.into(),
            },
            ..Default::default()
        });

    mouse_area(cell).on_press(Message::SlotPressed(id)).into()
}

fn banner<'a>(notification: &Notification) -> Option<Element<'a, Message>> {
    if !notification.is_visible() {
        return None;
    }
    let message = notification.text().unwrap_or_default().to_string();

    let card = container(text(message).size(15).color(Color::BLACK))
        .padding([10, 18])
        .style(|_theme| container::Style {
            background: Some(Background::Color(Color::from_rgb(0.98, 0.85, 0.4))),
            border: Border::default().rounded(6),
            ..Default::default()
        });

    Some(
        container(card)
            .padding(12)
            .width(Length::Fill)
            .center_x(Length::Fill)
            .into(),
    )
}

pub fn view<'a>(
    layout: &LayoutState,
    media: &MediaStore,
    selection: Selection,
    notification: &Notification,
) -> Element<'a, Message> {
    let status = layout.status();

    let header = row![
        text("Layout").size(14),
        pick_list(LayoutType::ALL, Some(layout.layout()), Message::SetLayoutType),
        status_badge(status),
        Space::with_width(Length::Fill),
        text(hint(selection)).size(13).color(Color::from_rgb(0.6, 0.6, 0.65)),
        button(text("Save Preset"))
            .style(button::primary)
            .on_press_maybe((status != LayoutStatus::Empty).then_some(Message::SavePreset)),
    ]
    .spacing(10)
    .align_y(Alignment::Center);

    let cells = layout
        .slots()
        .iter()
        .map(|slot| slot_cell(slot, status, media, selection))
        .collect();
    let board = grid(layout, cells, 8.0);

    let board: Element<'a, Message> = match banner(notification) {
        Some(banner) => stack![board, banner].into(),
        None => board,
    };

    column![header, board]
        .spacing(10)
        .padding(10)
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}
