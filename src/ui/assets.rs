/// Asset bar: filterable thumbnails, import actions and the type editor
use iced::widget::image::Handle;
use iced::widget::scrollable::{Direction, Scrollbar};
use iced::widget::{
    button, center, column, container, pick_list, row, scrollable, text, text_input, Image, Space,
};
use iced::{padding, Alignment, Background, Border, Color, ContentFit, Element, Length};
use iced_aw::Wrap;
use std::fmt;

use super::staging::Selection;
use crate::media::store::MediaStore;
use crate::state::data::{MediaAsset, UNKNOWN_TYPE};
use crate::Message;

const TILE_SIZE: f32 = 96.0;

/// Entry of the type picker in the editor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeChoice {
    Existing(String),
    Uncategorized,
}

impl fmt::Display for TypeChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeChoice::Existing(kind) => write!(f, "{}", kind),
            TypeChoice::Uncategorized => write!(f, "Uncategorized"),
        }
    }
}

/// Open "edit type" dialog for one asset
#[derive(Debug, Clone)]
pub struct AssetEditor {
    pub asset: MediaAsset,
    pub choice: TypeChoice,
    /// Free text; wins over `choice` when not blank
    pub new_type: String,
}

impl AssetEditor {
    pub fn new(asset: MediaAsset) -> Self {
        let choice = match asset.display_type() {
            Some(kind) => TypeChoice::Existing(kind.to_string()),
            None => TypeChoice::Uncategorized,
        };
        Self {
            asset,
            choice,
            new_type: String::new(),
        }
    }

    /// Uncategorized first, then every known type except "unknown"
    pub fn choices(types: &[String]) -> Vec<TypeChoice> {
        std::iter::once(TypeChoice::Uncategorized)
            .chain(
                types
                    .iter()
                    .map(|kind| kind.trim())
                    .filter(|kind| !kind.is_empty() && *kind != UNKNOWN_TYPE)
                    .map(|kind| TypeChoice::Existing(kind.to_string())),
            )
            .collect()
    }

    /// The type tag to save
    pub fn resolved_type(&self) -> String {
        let typed = self.new_type.trim();
        if !typed.is_empty() {
            return typed.to_string();
        }
        match &self.choice {
            TypeChoice::Existing(kind) => kind.clone(),
            TypeChoice::Uncategorized => UNKNOWN_TYPE.to_string(),
        }
    }

    /// Saving would not change anything
    pub fn is_unchanged(&self) -> bool {
        self.resolved_type() == self.asset.kind
    }
}

fn type_label(kind: &str) -> &str {
    if kind == UNKNOWN_TYPE {
        "Uncategorized"
    } else {
        kind
    }
}

fn filter_pills<'a>(types: &[String], filter: Option<&str>) -> Element<'a, Message> {
    let pill = |label: String, value: Option<String>| -> Element<'a, Message> {
        let active = value.as_deref() == filter;
        button(text(label).size(13))
            .padding([4, 12])
            .style(if active {
                button::primary
            } else {
                button::secondary
            })
            .on_press(Message::FilterSelected(value))
            .into()
    };

    let mut pills = vec![pill("All".to_string(), None)];
    pills.extend(
        types
            .iter()
            .map(|kind| pill(type_label(kind).to_string(), Some(kind.clone()))),
    );

    scrollable(row(pills).spacing(6).padding(padding::bottom(8)))
        .direction(Direction::Horizontal(Scrollbar::new().width(4.0).scroller_width(4.0)))
        .width(Length::Fill)
        .into()
}

fn type_badge<'a>(kind: &str) -> Element<'a, Message> {
    container(text(kind.to_string()).size(11).color(Color::BLACK))
        .padding([1, 6])
        .style(|_theme| container::Style {
            background: Some(Background::Color(Color::from_rgb(0.55, 0.8, 0.95))),
            border: Border::default().rounded(6),
            ..Default::default()
        })
        .into()
}

fn tile<'a>(asset: &MediaAsset, thumbnail: Option<&Handle>, selected: bool) -> Element<'a, Message> {
    let picture: Element<'a, Message> = match thumbnail {
        Some(handle) => Image::<Handle>::new(handle.clone())
            .width(Length::Fixed(TILE_SIZE))
            .height(Length::Fixed(TILE_SIZE))
            .content_fit(ContentFit::Cover)
            .into(),
        None => container(text("…").size(20))
            .center_x(Length::Fixed(TILE_SIZE))
            .center_y(Length::Fixed(TILE_SIZE))
            .into(),
    };

    let mut name = asset.name.clone();
    if name.chars().count() > 14 {
        name = name.chars().take(13).collect::<String>() + "…";
    }

    let footer = row![
        text(name).size(11),
        Space::with_width(Length::Fill),
        button(text("✎").size(11))
            .padding([0, 4])
            .style(button::text)
            .on_press(Message::EditAsset(asset.id)),
    ]
    .align_y(Alignment::Center)
    .width(Length::Fixed(TILE_SIZE));

    let mut body = column![picture, footer].spacing(4);
    if let Some(kind) = asset.display_type() {
        body = body.push(type_badge(kind));
    }

    button(body)
        .padding(4)
        .style(if selected {
            button::primary
        } else {
            button::secondary
        })
        .on_press(Message::SelectAsset(asset.id))
        .into()
}

/// Everything the asset bar renders from
pub struct AssetBar<'s> {
    pub assets: &'s [MediaAsset],
    pub types: &'s [String],
    pub filter: Option<&'s str>,
    pub selection: Selection,
    pub media: &'s MediaStore,
    /// Last import/rescan result
    pub status_line: &'s str,
}

pub fn view<'a>(bar: AssetBar<'_>, url_for: impl Fn(&MediaAsset) -> String) -> Element<'a, Message> {
    let actions = row![
        text("Assets").size(16),
        Space::with_width(Length::Fill),
        text(bar.status_line.to_string()).size(13).color(Color::from_rgb(0.6, 0.6, 0.65)),
        button(text("Browse")).style(button::secondary).on_press(Message::BrowseFile),
        button(text("Import Folder")).style(button::secondary).on_press(Message::ImportFolder),
        button(text("Rescan")).style(button::secondary).on_press(Message::RescanBackend),
    ]
    .spacing(8)
    .align_y(Alignment::Center);

    let tiles: Element<'a, Message> = if bar.assets.is_empty() {
        center(text("No assets found").color(Color::from_rgb(0.5, 0.5, 0.55))).into()
    } else {
        let tiles = bar
            .assets
            .iter()
            .map(|asset| {
                let url = url_for(asset);
                let selected = bar.selection == Selection::Asset(asset.id);
                tile(asset, bar.media.thumbnail(&url), selected)
            })
            .collect();

        scrollable(Wrap::with_elements(tiles).spacing(8.0).line_spacing(8.0))
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    };

    container(
        column![actions, filter_pills(bar.types, bar.filter), tiles]
            .spacing(8)
            .height(Length::Fill),
    )
    .padding(10)
    .width(Length::Fill)
    .height(Length::Fixed(250.0))
    .style(container::rounded_box)
    .into()
}

/// The "edit type" dialog, shown through `ui::modal`
pub fn editor<'a>(editor: &AssetEditor, types: &[String]) -> Element<'a, Message> {
    let title = text(format!("Edit type of {}", editor.asset.name)).size(18);

    let picker = pick_list(
        AssetEditor::choices(types),
        Some(editor.choice.clone()),
        Message::EditTypeChosen,
    )
    .width(Length::Fill);

    let typed = text_input("Or enter a new type", &editor.new_type)
        .on_input(Message::EditNewType)
        .on_submit(Message::SaveAssetType)
        .padding(8);

    let buttons = row![
        Space::with_width(Length::Fill),
        button(text("Cancel"))
            .style(button::secondary)
            .on_press(Message::CloseEditor),
        button(text("Save"))
            .style(button::primary)
            .on_press(Message::SaveAssetType),
    ]
    .spacing(8);

    container(
        column![
            title,
            text("Existing type").size(13),
            picker,
            typed,
            buttons
        ]
        .spacing(12),
    )
    .padding(20)
    .width(Length::Fixed(380.0))
    .style(container::rounded_box)
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(kind: &str) -> MediaAsset {
        MediaAsset {
            id: 1,
            name: "cave.png".to_string(),
            description: String::new(),
            kind: kind.to_string(),
            file_path: "public/images/cave.png".to_string(),
        }
    }

    #[test]
    fn test_editor_starts_from_current_type() {
        assert_eq!(
            AssetEditor::new(asset("map")).choice,
            TypeChoice::Existing("map".to_string())
        );
        assert_eq!(AssetEditor::new(asset("unknown")).choice, TypeChoice::Uncategorized);
    }

    #[test]
    fn test_new_type_wins_when_not_blank() {
        let mut editor = AssetEditor::new(asset("map"));
        editor.new_type = "   ".to_string();
        assert_eq!(editor.resolved_type(), "map");
        assert!(editor.is_unchanged());

        editor.new_type = " token ".to_string();
        assert_eq!(editor.resolved_type(), "token");

        editor.new_type.clear();
        editor.choice = TypeChoice::Uncategorized;
        assert_eq!(editor.resolved_type(), UNKNOWN_TYPE);
    }

    #[test]
    fn test_choices_hide_unknown() {
        let types = vec!["map".to_string(), "unknown".to_string(), "npc".to_string()];
        assert_eq!(
            AssetEditor::choices(&types),
            vec![
                TypeChoice::Uncategorized,
                TypeChoice::Existing("map".to_string()),
                TypeChoice::Existing("npc".to_string()),
            ]
        );
        assert_eq!(TypeChoice::Uncategorized.to_string(), "Uncategorized");
    }
}
