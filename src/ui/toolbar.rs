use iced::widget::{button, container, row, text, Space};
use iced::{Alignment, Element, Length};

use crate::state::layout::LayoutStatus;
use crate::Message;

/// What the mirroring toolbar needs to know
#[derive(Debug, Clone, Copy)]
pub struct ToolbarState {
    pub player_open: bool,
    pub status: LayoutStatus,
    /// A show is waiting for the player window to start listening
    pub show_pending: bool,
}

impl ToolbarState {
    pub fn window_label(&self) -> &'static str {
        if self.player_open {
            "Close Players Window"
        } else {
            "Open Players Window"
        }
    }

    pub fn live_label(&self) -> &'static str {
        if self.status == LayoutStatus::Live {
            "Hide From Players"
        } else {
            "Show To Players"
        }
    }

    /// Show/Hide needs the player window and something staged
    pub fn live_enabled(&self) -> bool {
        self.player_open && self.status != LayoutStatus::Empty && !self.show_pending
    }

    pub fn focus_enabled(&self) -> bool {
        self.player_open
    }
}

pub fn view<'a>(state: ToolbarState) -> Element<'a, Message> {
    let window_button = button(text(state.window_label()))
        .on_press(Message::TogglePlayerWindow)
        .padding([8, 16])
        .style(if state.player_open {
            button::danger
        } else {
            button::primary
        });

    let live_button = button(text(state.live_label()))
        .on_press_maybe(state.live_enabled().then_some(Message::ToggleLive))
        .padding([8, 16])
        .style(if state.status == LayoutStatus::Live {
            button::secondary
        } else {
            button::success
        });

    let focus_button = button(text("Focus On Player Window"))
        .on_press_maybe(state.focus_enabled().then_some(Message::FocusPlayer))
        .padding([8, 16])
        .style(button::secondary);

    let sync_button = button(text("Get Player View"))
        .on_press(Message::RequestSync)
        .padding([8, 16])
        .style(button::text);

    let bar = row![
        window_button,
        live_button,
        focus_button,
        Space::with_width(Length::Fill),
        sync_button,
    ]
    .spacing(10)
    .align_y(Alignment::Center);

    container(bar)
        .padding(10)
        .width(Length::Fill)
        .style(container::rounded_box)
        .into()
}
