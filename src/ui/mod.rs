/// User interface building blocks
///
/// Each submodule renders one part of a window and emits `crate::Message`.

pub mod assets;
pub mod nav;
pub mod player;
pub mod presets;
pub mod staging;
pub mod toolbar;

use iced::widget::{center, container, mouse_area, opaque, stack, Space};
use iced::{Background, Color, Element, Length};

use crate::state::layout::LayoutStatus;
use crate::Message;

/// Accent colour for a layout status
pub fn status_color(status: LayoutStatus) -> Color {
    match status {
        LayoutStatus::Empty => Color::from_rgb(0.35, 0.35, 0.4),
        LayoutStatus::Staged => Color::from_rgb(0.95, 0.75, 0.2),
        LayoutStatus::Live => Color::from_rgb(0.9, 0.25, 0.25),
    }
}

/// Layer `content` over `base` with a dimmed backdrop that closes on click
pub fn modal<'a>(
    base: Element<'a, Message>,
    content: Element<'a, Message>,
    on_blur: Message,
) -> Element<'a, Message> {
    let backdrop: Element<Message> = mouse_area(
        container(Space::new(Length::Fill, Length::Fill))
            .width(Length::Fill)
            .height(Length::Fill)
            .style(|_theme| container::Style {
                background: Some(Background::Color(Color::from_rgba(0.0, 0.0, 0.0, 0.6))),
                ..Default::default()
            }),
    )
    .on_press(on_blur)
    .into();

    let dialog = center(opaque(content))
        .width(Length::Fill)
        .height(Length::Fill);

    stack![base, backdrop, dialog].into()
}
