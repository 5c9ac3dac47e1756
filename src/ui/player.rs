/// Player window: the mirrored layout, full-bleed on black
use iced::widget::image::Handle;
use iced::widget::scrollable::{Direction, Scrollbar};
use iced::widget::{center, container, responsive, scrollable, text, Image};
use iced::{Background, Border, Color, ContentFit, Element, Length};

use crate::media::store::{MediaEntry, MediaStore};
use crate::state::layout::{ImageSlot, LayoutState};
use crate::Message;

/// Draw an image scaled by `zoom` inside whatever space it is given.
///
/// Up to 1.0 the image shrinks around the centre. Above 1.0 it overflows
/// its cell and can be panned by scrolling.
pub fn slot_image<'a>(handle: &Handle, zoom: f32) -> Element<'a, Message> {
    let handle = handle.clone();

    responsive(move |size| {
        let width = (size.width * zoom).max(1.0);
        let height = (size.height * zoom).max(1.0);
        let picture = Image::<Handle>::new(handle.clone())
            .width(Length::Fixed(width))
            .height(Length::Fixed(height))
            .content_fit(ContentFit::Contain);

        if zoom <= 1.0 {
            container(picture).center(Length::Fill).clip(true).into()
        } else {
            let hidden = || Scrollbar::new().width(0.0).scroller_width(0.0);
            scrollable(picture)
                .direction(Direction::Both {
                    vertical: hidden(),
                    horizontal: hidden(),
                })
                .width(Length::Fill)
                .height(Length::Fill)
                .into()
        }
    })
    .into()
}

/// Arrange cells in the grid of `layout` (1x1, 2x1 or 2x2)
pub fn grid<'a>(
    layout: &LayoutState,
    mut cells: Vec<Element<'a, Message>>,
    gap: f32,
) -> Element<'a, Message> {
    let (columns, rows) = layout.layout().grid();
    let mut grid_rows = Vec::with_capacity(rows);

    for _ in 0..rows {
        let take = columns.min(cells.len());
        let row_cells: Vec<Element<'a, Message>> = cells.drain(..take).collect();
        grid_rows.push(
            iced::widget::row(row_cells)
                .spacing(gap)
                .height(Length::Fill)
                .into(),
        );
    }

    iced::widget::column(grid_rows)
        .spacing(gap)
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}

fn cell<'a>(slot: &ImageSlot, media: &MediaStore) -> Element<'a, Message> {
    let content: Element<'a, Message> = match slot.url.as_deref() {
        None => text("").into(),
        Some(url) => match media.get(url) {
            Some(MediaEntry::Ready { full, .. }) => slot_image(full, slot.zoom),
            Some(MediaEntry::Failed) => center(text("Image unavailable").size(14)).into(),
            _ => center(text("Loading…").size(14)).into(),
        },
    };

    container(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .clip(true)
        .style(|_theme| container::Style {
            background: Some(Background::Color(Color::from_rgb(0.07, 0.08, 0.1))),
            border: Border::default().rounded(8),
            ..Default::default()
        })
        .into()
}

pub fn view<'a>(
    layout: Option<&LayoutState>,
    media: &MediaStore,
    placeholder: Option<&Handle>,
) -> Element<'a, Message> {
    let content: Element<'a, Message> = match layout {
        Some(layout) => {
            let cells = layout.slots().iter().map(|slot| cell(slot, media)).collect();
            grid(layout, cells, 8.0)
        }
        None => match placeholder {
            Some(handle) => container(
                Image::<Handle>::new(handle.clone())
                    .content_fit(ContentFit::Contain)
                    .width(Length::Fill)
                    .height(Length::Fill),
            )
            .padding(48)
            .center(Length::Fill)
            .into(),
            None => center(
                text("Waiting for the Dungeon Master…")
                    .size(28)
                    .color(Color::from_rgb(0.6, 0.6, 0.65)),
            )
            .into(),
        },
    };

    container(content)
        .padding(16)
        .width(Length::Fill)
        .height(Length::Fill)
        .style(|_theme| container::Style {
            background: Some(Background::Color(Color::BLACK)),
            ..Default::default()
        })
        .into()
}
