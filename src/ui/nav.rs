use iced::widget::{button, center, column, container, row, text};
use iced::{Element, Length};

use crate::Message;

/// Pages of the DM window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Mirroring,
    Audio,
    Cards,
}

impl Page {
    pub const ALL: [Page; 3] = [Page::Mirroring, Page::Audio, Page::Cards];

    pub fn label(self) -> &'static str {
        match self {
            Page::Mirroring => "Screen Mirroring",
            Page::Audio => "Audio",
            Page::Cards => "Cards",
        }
    }
}

/// Bottom navigation bar
pub fn view<'a>(current: Page) -> Element<'a, Message> {
    let buttons = Page::ALL.into_iter().map(|page| {
        button(center(text(page.label())).height(Length::Shrink))
            .width(Length::Fill)
            .padding(10)
            .style(if page == current {
                button::primary
            } else {
                button::text
            })
            .on_press(Message::Navigate(page))
            .into()
    });

    container(row(buttons).spacing(4))
        .padding(6)
        .width(Length::Fill)
        .style(container::dark)
        .into()
}

/// Pages that have no content yet
pub fn placeholder<'a>(page: Page) -> Element<'a, Message> {
    center(
        column![
            text(page.label()).size(32),
            text("Coming soon").size(16),
        ]
        .spacing(10)
        .align_x(iced::Alignment::Center),
    )
    .into()
}
