use iced::widget::image::Handle;
use iced::widget::{column, row, text};
use iced::{time, window, Element, Length, Size, Subscription, Task, Theme};
use log::{debug, error, info, warn};
use rfd::FileDialog;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

mod api;
mod config;
mod logging;
mod media;
mod state;
mod sync;
mod ui;
mod windows;

use api::client::ApiClient;
use api::updates::{self, ServerEvent, UpdateEvent};
use config::AppConfig;
use media::cache::{fetch_media, prune_orphans, CacheDirs, FetchedMedia};
use media::import::{import_file_async, import_folder_async, ImportResult};
use media::store::MediaStore;
use state::data::{MediaAsset, PresetLayout};
use state::layout::{LayoutState, LayoutType, ZoomDirection};
use state::library::MediaLibrary;
use state::notification::{dismiss_after, Notification};
use state::preset;
use sync::channel::{listen_stream, subscribe, ChannelEvent};
use sync::mirror::{Mirror, SyncOutcome, EMPTY_PLAYER_NOTICE};
use sync::player::PlayerDisplay;
use sync::popup::{PopupEvent, PopupManager};
use ui::assets::{AssetBar, AssetEditor, TypeChoice};
use ui::nav::Page;
use ui::staging::{slot_action, Selection, SlotAction};
use ui::toolbar::ToolbarState;
use windows::IcedWindows;

const DM_WINDOW_NAME: &str = "dmdMainWindow";

/// The player window and the display state rendered in it
struct PlayerWindow {
    id: window::Id,
    display: PlayerDisplay,
    /// Its channel listener is attached
    listening: bool,
}

/// Main application state
struct DmDisplay {
    config: AppConfig,
    api: ApiClient,
    /// Catalog of downloaded media, None when it could not be opened
    library: Option<MediaLibrary>,
    /// Disk cache, None when its directories could not be created
    cache: Option<CacheDirs>,
    media: MediaStore,

    dm_window: window::Id,
    page: Page,
    mirror: Mirror,
    popup: PopupManager<IcedWindows>,
    player: Option<PlayerWindow>,
    /// "Show To Players" pressed before the player window was listening
    pending_show: bool,
    notification: Notification,
    selection: Selection,

    assets: Vec<MediaAsset>,
    types: Vec<String>,
    filter: Option<String>,
    editor: Option<AssetEditor>,
    presets: Vec<PresetLayout>,
    /// Status message to display to the user
    status: String,
    placeholder: Option<Handle>,
}

/// Application messages (events)
#[derive(Debug, Clone)]
pub enum Message {
    // Windows and navigation
    WindowOpened(window::Id),
    WindowClosed(window::Id),
    PollPopup,
    Navigate(Page),

    // Mirroring toolbar
    TogglePlayerWindow,
    ToggleLive,
    FocusPlayer,
    RequestSync,

    // Channel traffic, one stream per window
    DmChannel(ChannelEvent),
    PlayerChannel(ChannelEvent),
    DismissNotification(u64),

    // Staging area
    SetLayoutType(LayoutType),
    SelectAsset(u64),
    SlotPressed(usize),
    StartMove(usize),
    ClearSlot(usize),
    Zoom(usize, ZoomDirection),

    // Asset bar
    FilterSelected(Option<String>),
    AssetsLoaded(Result<Vec<MediaAsset>, String>),
    TypesLoaded(Result<Vec<String>, String>),
    EditAsset(u64),
    EditTypeChosen(TypeChoice),
    EditNewType(String),
    SaveAssetType,
    CloseEditor,
    AssetSaved(Result<MediaAsset, String>),

    // Media downloads
    MediaFetched(String, Result<FetchedMedia, String>),
    MediaBytes(String, Result<Vec<u8>, String>),
    CachePruned(usize),

    // Import
    BrowseFile,
    ImportFolder,
    ImportComplete(ImportResult),
    RescanBackend,
    RescanComplete(Result<(), String>),

    // Presets
    SavePreset,
    PresetSaved(Result<PresetLayout, String>),
    PresetsLoaded(Result<Vec<PresetLayout>, String>),
    LoadPreset(u64),
    DeletePreset(u64),
    PresetDeleted(u64, Result<(), String>),

    ServerUpdate(UpdateEvent),
}

impl DmDisplay {
    fn new(config: AppConfig, api: ApiClient) -> (Self, Task<Message>) {
        let (dm_window, open_dm) = window::open(window::Settings {
            size: Size::new(1440.0, 900.0),
            min_size: Some(Size::new(960.0, 640.0)),
            ..window::Settings::default()
        });

        // Without a catalog every start downloads media again
        let library = match MediaLibrary::new() {
            Ok(library) => Some(library),
            Err(e) => {
                warn!("⚠️  Media catalog unavailable ({}), using a temporary one", e);
                MediaLibrary::in_memory().ok()
            }
        };

        let cache = match CacheDirs::new() {
            Ok(dirs) => Some(dirs),
            Err(e) => {
                warn!("⚠️  Running without a disk cache: {}", e);
                None
            }
        };

        let mut prune = None;
        if let Some(library) = &library {
            match library.verify_files() {
                Ok(0) => {}
                Ok(removed) => info!("🧹 Forgot {} cached files that disappeared", removed),
                Err(e) => warn!("⚠️  Could not verify media catalog: {}", e),
            }
            if let (Some(dirs), Ok(known)) = (cache.clone(), library.known_files()) {
                let cutoff = SystemTime::now();
                prune = Some(Task::perform(
                    async move {
                        tokio::task::spawn_blocking(move || prune_orphans(&dirs, &known, cutoff))
                            .await
                            .unwrap_or(0)
                    },
                    Message::CachePruned,
                ));
            }
        }

        let cached = library
            .as_ref()
            .and_then(|library| library.media_count().ok())
            .unwrap_or(0);
        info!("🎲 DM Display initialized with {} cached media files", cached);

        let app = Self::assemble(config, api, library, cache, dm_window);

        // Downloads write into the cache folders, so they start once the prune is done
        let fetches = Task::batch([app.refresh_assets(), app.refresh_presets()]);
        let fetches = match prune {
            Some(prune) => prune.chain(fetches),
            None => fetches,
        };
        (app, Task::batch([open_dm.map(Message::WindowOpened), fetches]))
    }

    /// State around an already opened DM window, before anything is fetched
    fn assemble(
        config: AppConfig,
        api: ApiClient,
        library: Option<MediaLibrary>,
        cache: Option<CacheDirs>,
        dm_window: window::Id,
    ) -> Self {
        let mut host = IcedWindows::default();
        host.register(dm_window, DM_WINDOW_NAME);
        let popup = PopupManager::new(host, config.popup_spec());

        let placeholder = config.default_player_image.as_ref().map(Handle::from_path);
        let mirror = Mirror::new(subscribe(&config.channel_name));

        DmDisplay {
            config,
            api,
            library,
            cache,
            media: MediaStore::default(),
            dm_window,
            page: Page::default(),
            mirror,
            popup,
            player: None,
            pending_show: false,
            notification: Notification::default(),
            selection: Selection::None,
            assets: Vec::new(),
            types: Vec::new(),
            filter: None,
            editor: None,
            presets: Vec::new(),
            status: "Ready.".to_string(),
            placeholder,
        }
    }

    fn title(&self, id: window::Id) -> String {
        if self.player.as_ref().is_some_and(|player| player.id == id) {
            self.popup.spec().title.clone()
        } else {
            "DM Display".to_string()
        }
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        let task = self.handle(message);
        let window_ops = self.popup.host_mut().take_tasks().map(Message::WindowOpened);
        Task::batch([task, window_ops])
    }

    fn handle(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::WindowOpened(id) => {
                debug!(
                    "🪟 Window {:?} ({}) opened",
                    id,
                    self.popup.host().name_of(id).unwrap_or("unnamed")
                );
                Task::none()
            }
            Message::WindowClosed(id) => {
                if id == self.dm_window {
                    info!("👋 DM window closed, shutting down");
                    return iced::exit();
                }
                self.popup.host_mut().closed(id);
                if self.popup.handle() == Some(&id) {
                    if let Some(event) = self.popup.poll() {
                        return self.popup_event(event);
                    }
                }
                // Closed while the page was away and the handle detached
                if self.player.as_ref().is_some_and(|player| player.id == id) {
                    self.player = None;
                    self.pending_show = false;
                }
                Task::none()
            }
            Message::PollPopup => match self.popup.poll() {
                Some(event) => self.popup_event(event),
                None => Task::none(),
            },
            Message::Navigate(page) => {
                if page == self.page {
                    return Task::none();
                }
                if self.page == Page::Mirroring {
                    self.popup.detach();
                } else if page == Page::Mirroring && !self.popup.reattach() {
                    self.player_gone();
                }
                self.page = page;
                Task::none()
            }

            Message::TogglePlayerWindow => {
                let event = if self.popup.is_open() {
                    self.popup.close()
                } else {
                    Some(self.popup.open_or_focus())
                };
                match event {
                    Some(event) => self.popup_event(event),
                    None => Task::none(),
                }
            }
            Message::ToggleLive => {
                if self.player.as_ref().is_some_and(|player| player.listening) {
                    self.mirror.toggle_live();
                } else if self.mirror.can_publish() {
                    debug!("⏳ Show queued until the player window listens");
                    self.pending_show = true;
                }
                Task::none()
            }
            Message::FocusPlayer => {
                self.popup.focus();
                Task::none()
            }
            Message::RequestSync => {
                self.mirror.request_sync();
                Task::none()
            }

            Message::DmChannel(ChannelEvent::Listening) => {
                debug!("👂 DM window listening on {}", self.mirror.endpoint().name());
                Task::none()
            }
            Message::DmChannel(ChannelEvent::Received(message)) => {
                match self.mirror.handle(message) {
                    SyncOutcome::Replaced => {
                        self.selection = Selection::None;
                        let layout = self.mirror.layout().clone();
                        self.ensure_layout_media(&layout)
                    }
                    SyncOutcome::PlayerEmpty => self.notify(EMPTY_PLAYER_NOTICE),
                    SyncOutcome::Ignored => Task::none(),
                }
            }
            Message::PlayerChannel(ChannelEvent::Listening) => {
                if let Some(player) = self.player.as_mut() {
                    player.listening = true;
                }
                if std::mem::take(&mut self.pending_show) {
                    self.mirror.publish();
                }
                Task::none()
            }
            Message::PlayerChannel(ChannelEvent::Received(message)) => {
                let Some(player) = self.player.as_mut() else {
                    return Task::none();
                };
                if !player.display.handle(message) {
                    return Task::none();
                }
                match player.display.current().cloned() {
                    Some(layout) => self.ensure_layout_media(&layout),
                    None => Task::none(),
                }
            }
            Message::DismissNotification(generation) => {
                self.notification.dismiss(generation);
                Task::none()
            }

            Message::SetLayoutType(layout) => {
                self.mirror.set_layout_type(layout);
                self.selection = Selection::None;
                Task::none()
            }
            Message::SelectAsset(id) => {
                self.selection = if self.selection == Selection::Asset(id) {
                    Selection::None
                } else {
                    Selection::Asset(id)
                };
                Task::none()
            }
            Message::SlotPressed(slot_id) => match slot_action(self.selection, slot_id) {
                SlotAction::Place { image_id, slot_id } => {
                    let Some(asset) = self.assets.iter().find(|asset| asset.id == image_id) else {
                        self.selection = Selection::None;
                        return Task::none();
                    };
                    let url = self.api.asset_url(asset);
                    self.selection = Selection::None;
                    if self.mirror.drop_asset(slot_id, url.clone(), Some(image_id)) {
                        self.ensure_media(&url)
                    } else {
                        Task::none()
                    }
                }
                SlotAction::Swap { source, target } => {
                    self.mirror.move_slot(source, target);
                    self.selection = Selection::None;
                    Task::none()
                }
                SlotAction::Nothing => {
                    if matches!(self.selection, Selection::Moving(_)) {
                        self.selection = Selection::None;
                    }
                    Task::none()
                }
            },
            Message::StartMove(slot_id) => {
                let occupied = self
                    .mirror
                    .layout()
                    .slot(slot_id)
                    .is_some_and(|slot| !slot.is_empty());
                self.selection = if self.selection == Selection::Moving(slot_id) || !occupied {
                    Selection::None
                } else {
                    Selection::Moving(slot_id)
                };
                Task::none()
            }
            Message::ClearSlot(slot_id) => {
                self.mirror.clear_slot(slot_id);
                if self.selection == Selection::Moving(slot_id) {
                    self.selection = Selection::None;
                }
                Task::none()
            }
            Message::Zoom(slot_id, direction) => {
                self.mirror.zoom(slot_id, direction);
                Task::none()
            }

            Message::FilterSelected(filter) => {
                self.filter = filter;
                self.fetch_assets()
            }
            Message::AssetsLoaded(result) => {
                self.assets = result.unwrap_or_else(|e| {
                    warn!("⚠️  Could not load assets: {}", e);
                    Vec::new()
                });
                let urls: Vec<String> = self
                    .assets
                    .iter()
                    .map(|asset| self.api.asset_url(asset))
                    .collect();
                Task::batch(urls.iter().map(|url| self.ensure_media(url)))
            }
            Message::TypesLoaded(result) => {
                self.types = result.unwrap_or_else(|e| {
                    warn!("⚠️  Could not load asset types: {}", e);
                    Vec::new()
                });
                Task::none()
            }
            Message::EditAsset(id) => {
                self.editor = self
                    .assets
                    .iter()
                    .find(|asset| asset.id == id)
                    .cloned()
                    .map(AssetEditor::new);
                Task::none()
            }
            Message::EditTypeChosen(choice) => {
                if let Some(editor) = self.editor.as_mut() {
                    editor.choice = choice;
                }
                Task::none()
            }
            Message::EditNewType(value) => {
                if let Some(editor) = self.editor.as_mut() {
                    editor.new_type = value;
                }
                Task::none()
            }
            Message::SaveAssetType => {
                let Some(editor) = self.editor.take() else {
                    return Task::none();
                };
                if editor.is_unchanged() {
                    return Task::none();
                }
                let api = self.api.clone();
                let kind = editor.resolved_type();
                Task::perform(
                    async move { api.update_asset_type(&editor.asset, &kind).await },
                    |result| Message::AssetSaved(result.map_err(|e| e.to_string())),
                )
            }
            Message::CloseEditor => {
                self.editor = None;
                Task::none()
            }
            Message::AssetSaved(Ok(asset)) => {
                self.status = format!("🏷️  {} is now {}", asset.name, asset.kind);
                self.refresh_assets()
            }
            Message::AssetSaved(Err(e)) => {
                warn!("⚠️  Could not save asset type: {}", e);
                self.status = "⚠️  Could not save the asset type.".to_string();
                Task::none()
            }

            Message::MediaFetched(url, Ok(fetched)) => {
                if let Some(library) = &self.library {
                    let recorded = library.record(&url, &fetched.cache_path).and_then(|_| {
                        match &fetched.thumbnail_path {
                            Some(thumbnail) => library.set_thumbnail(&url, thumbnail),
                            None => Ok(()),
                        }
                    });
                    if let Err(e) = recorded {
                        warn!("⚠️  Could not catalog {}: {}", url, e);
                    }
                }
                self.media
                    .ready(&url, &fetched.cache_path, fetched.thumbnail_path.as_deref());
                Task::none()
            }
            Message::MediaFetched(url, Err(e)) | Message::MediaBytes(url, Err(e)) => {
                warn!("⚠️  Could not load {}: {}", url, e);
                self.media.failed(&url);
                Task::none()
            }
            Message::MediaBytes(url, Ok(bytes)) => {
                self.media.ready_bytes(&url, bytes);
                Task::none()
            }
            Message::CachePruned(removed) => {
                if removed > 0 {
                    info!("🧹 Removed {} orphaned cache files", removed);
                }
                Task::none()
            }

            Message::BrowseFile => {
                let file = FileDialog::new()
                    .set_title("Select an Image to Upload")
                    .add_filter("Images", &["jpg", "jpeg", "png", "gif", "webp"])
                    .pick_file();

                match file {
                    Some(path) => {
                        self.status = format!("📁 Uploading {}...", path.display());
                        Task::perform(
                            import_file_async(self.api.clone(), path),
                            Message::ImportComplete,
                        )
                    }
                    None => Task::none(),
                }
            }
            Message::ImportFolder => {
                let folder = FileDialog::new()
                    .set_title("Select Folder with Images")
                    .pick_folder();

                match folder {
                    Some(folder) => {
                        self.status = format!("📁 Importing from {}...", folder.display());
                        Task::perform(
                            import_folder_async(self.api.clone(), folder),
                            Message::ImportComplete,
                        )
                    }
                    None => Task::none(),
                }
            }
            Message::ImportComplete(result) => {
                self.status = format!(
                    "✅ Import complete! Uploaded {}, skipped {}.",
                    result.uploaded, result.skipped
                );
                self.refresh_assets()
            }
            Message::RescanBackend => {
                self.status = "🔍 Asking the server to rescan its media...".to_string();
                let api = self.api.clone();
                Task::perform(async move { api.sync_assets().await }, |result| {
                    Message::RescanComplete(result.map_err(|e| e.to_string()))
                })
            }
            Message::RescanComplete(Ok(())) => {
                self.status = "✅ Rescan complete.".to_string();
                self.refresh_assets()
            }
            Message::RescanComplete(Err(e)) => {
                warn!("⚠️  Rescan failed: {}", e);
                self.status = "⚠️  Rescan failed.".to_string();
                Task::none()
            }

            Message::SavePreset => {
                let new_preset = preset::snapshot(self.mirror.layout());
                if new_preset.slots.is_empty() {
                    return Task::none();
                }
                let api = self.api.clone();
                Task::perform(async move { api.create_preset(&new_preset).await }, |result| {
                    Message::PresetSaved(result.map_err(|e| e.to_string()))
                })
            }
            Message::PresetSaved(Ok(mut saved)) => {
                info!("💾 Saved {} preset #{}", saved.layout_type, saved.id);
                if !preset::fill_images(&mut saved, &self.assets) {
                    debug!("📂 Preset #{} references assets not loaded yet", saved.id);
                }
                self.presets.push(saved);
                // The listing carries the full images
                self.refresh_presets()
            }
            Message::PresetSaved(Err(e)) => {
                warn!("⚠️  Could not save preset: {}", e);
                self.status = "⚠️  Could not save the preset.".to_string();
                Task::none()
            }
            Message::PresetsLoaded(result) => {
                self.presets = result.unwrap_or_else(|e| {
                    warn!("⚠️  Could not load presets: {}", e);
                    Vec::new()
                });
                let urls: Vec<String> = self
                    .presets
                    .iter()
                    .flat_map(|preset| &preset.slots)
                    .filter(|slot| slot.image.has_file())
                    .map(|slot| self.api.asset_url(&slot.image))
                    .collect();
                Task::batch(urls.iter().map(|url| self.ensure_media(url)))
            }
            Message::LoadPreset(id) => {
                let Some(saved) = self.presets.iter().find(|preset| preset.id == id) else {
                    return Task::none();
                };
                let layout = preset::restore(saved, |asset| self.api.asset_url(asset));
                info!("📂 Loaded preset #{} into staging", id);
                self.mirror.load(layout.clone());
                self.selection = Selection::None;
                self.ensure_layout_media(&layout)
            }
            Message::DeletePreset(id) => {
                self.presets.retain(|preset| preset.id != id);
                let api = self.api.clone();
                Task::perform(async move { api.delete_preset(id).await }, move |result| {
                    Message::PresetDeleted(id, result.map_err(|e| e.to_string()))
                })
            }
            Message::PresetDeleted(_, Ok(())) => Task::none(),
            Message::PresetDeleted(id, Err(e)) => {
                warn!("⚠️  Could not delete preset #{}: {}", id, e);
                self.refresh_presets()
            }

            Message::ServerUpdate(UpdateEvent::Server(ServerEvent::ImagesUpdated)) => {
                info!("📨 Server reports new images");
                self.refresh_assets()
            }
            Message::ServerUpdate(event) => {
                debug!("📨 {:?}", event);
                Task::none()
            }
        }
    }

    /// React to the popup manager's signals
    fn popup_event(&mut self, event: PopupEvent) -> Task<Message> {
        match event {
            PopupEvent::Opened | PopupEvent::Reopened => {
                if event == PopupEvent::Reopened {
                    self.player_gone();
                }
                if let Some(&id) = self.popup.handle() {
                    let endpoint = subscribe(&self.config.channel_name);
                    self.player = Some(PlayerWindow {
                        id,
                        display: PlayerDisplay::new(endpoint),
                        listening: false,
                    });
                }
            }
            PopupEvent::Focused => {}
            PopupEvent::Closed => {
                self.player = None;
                self.player_gone();
            }
        }
        Task::none()
    }

    /// The player window is no longer reachable
    fn player_gone(&mut self) {
        self.pending_show = false;
        if self.mirror.player_closed() {
            info!("📺 Player window gone, layout is staged again");
        }
    }

    fn notify(&mut self, message: &str) -> Task<Message> {
        let generation = self.notification.show(message);
        Task::perform(
            dismiss_after(self.config.notification_timeout(), generation),
            Message::DismissNotification,
        )
    }

    fn refresh_assets(&self) -> Task<Message> {
        let api = self.api.clone();
        let types = Task::perform(async move { api.list_types().await }, |result| {
            Message::TypesLoaded(result.map_err(|e| e.to_string()))
        });
        Task::batch([self.fetch_assets(), types])
    }

    fn fetch_assets(&self) -> Task<Message> {
        let api = self.api.clone();
        let filter = self.filter.clone();
        Task::perform(
            async move { api.list_assets(filter.as_deref()).await },
            |result| Message::AssetsLoaded(result.map_err(|e| e.to_string())),
        )
    }

    fn refresh_presets(&self) -> Task<Message> {
        let api = self.api.clone();
        Task::perform(async move { api.list_presets().await }, |result| {
            Message::PresetsLoaded(result.map_err(|e| e.to_string()))
        })
    }

    fn ensure_layout_media(&mut self, layout: &LayoutState) -> Task<Message> {
        let tasks: Vec<Task<Message>> = layout
            .slots()
            .iter()
            .filter_map(|slot| slot.url.as_deref())
            .map(|url| self.ensure_media(url))
            .collect();
        Task::batch(tasks)
    }

    /// Make `url` renderable: from the disk cache when catalogued,
    /// otherwise by downloading it
    fn ensure_media(&mut self, url: &str) -> Task<Message> {
        if !self.media.begin(url) {
            return Task::none();
        }

        let cached = self
            .library
            .as_ref()
            .and_then(|library| library.lookup(url).ok().flatten())
            .filter(|cached| Path::new(&cached.cache_path).exists());
        if let Some(cached) = cached {
            debug!(
                "💾 {} from cache, fetched {}",
                cached.url,
                chrono::DateTime::from_timestamp(cached.fetched_at, 0)
                    .map(|at| at.to_rfc3339())
                    .unwrap_or_default()
            );
            let thumbnail = cached.thumbnail_path.as_ref().map(PathBuf::from);
            self.media
                .ready(url, Path::new(&cached.cache_path), thumbnail.as_deref());
            return Task::none();
        }

        let api = self.api.clone();
        let key = url.to_string();
        match self.cache.clone() {
            Some(dirs) => Task::perform(fetch_media(api, dirs, key.clone()), move |result| {
                Message::MediaFetched(key.clone(), result.map_err(|e| e.to_string()))
            }),
            None => {
                let target = key.clone();
                Task::perform(async move { api.fetch_bytes(&target).await }, move |result| {
                    Message::MediaBytes(key.clone(), result.map_err(|e| e.to_string()))
                })
            }
        }
    }

    /// Build the user interface of one window
    fn view(&self, id: window::Id) -> Element<'_, Message> {
        match &self.player {
            Some(player) if player.id == id => {
                ui::player::view(player.display.current(), &self.media, self.placeholder.as_ref())
            }
            _ if id == self.dm_window => self.dm_view(),
            _ => text("").into(),
        }
    }

    fn dm_view(&self) -> Element<'_, Message> {
        let page = match self.page {
            Page::Mirroring => self.mirroring_view(),
            other => ui::nav::placeholder(other),
        };

        let base: Element<'_, Message> = column![page, ui::nav::view(self.page)]
            .width(Length::Fill)
            .height(Length::Fill)
            .into();

        match &self.editor {
            Some(editor) if self.page == Page::Mirroring => ui::modal(
                base,
                ui::assets::editor(editor, &self.types),
                Message::CloseEditor,
            ),
            _ => base,
        }
    }

    fn mirroring_view(&self) -> Element<'_, Message> {
        let toolbar = ui::toolbar::view(ToolbarState {
            player_open: self.popup.is_open(),
            status: self.mirror.status(),
            show_pending: self.pending_show,
        });

        let staging = ui::staging::view(
            self.mirror.layout(),
            &self.media,
            self.selection,
            &self.notification,
        );

        let asset_bar = ui::assets::view(
            AssetBar {
                assets: &self.assets,
                types: &self.types,
                filter: self.filter.as_deref(),
                selection: self.selection,
                media: &self.media,
                status_line: &self.status,
            },
            |asset| self.api.asset_url(asset),
        );

        let presets = ui::presets::view(&self.presets, &self.media, |asset| {
            self.api.asset_url(asset)
        });

        column![
            toolbar,
            row![column![staging, asset_bar].spacing(10), presets].spacing(10),
        ]
        .spacing(10)
        .padding(10)
        .height(Length::Fill)
        .into()
    }

    /// Background listeners, rebuilt after every update
    fn subscription(&self) -> Subscription<Message> {
        let mut subscriptions = vec![
            window::close_events().map(Message::WindowClosed),
            Subscription::run_with_id("server-updates", updates::watch(self.config.ws_url.clone()))
                .map(Message::ServerUpdate),
        ];

        if self.page == Page::Mirroring {
            subscriptions.push(
                Subscription::run_with_id(
                    "dm-channel",
                    listen_stream(self.mirror.endpoint().clone()),
                )
                .map(Message::DmChannel),
            );
        }

        if self.popup.is_tracking() {
            subscriptions.push(time::every(self.config.poll_interval()).map(|_| Message::PollPopup));
        }

        if let Some(player) = &self.player {
            subscriptions.push(
                Subscription::run_with_id(
                    ("player-channel", player.id),
                    listen_stream(player.display.endpoint().clone()),
                )
                .map(Message::PlayerChannel),
            );
        }

        Subscription::batch(subscriptions)
    }

    /// Set the application theme
    fn theme(&self, _id: window::Id) -> Theme {
        Theme::Dark
    }
}

fn main() -> iced::Result {
    logging::init_logger();

    let config = AppConfig::load();
    let api = match ApiClient::new(&config.api_base_url) {
        Ok(api) => api,
        Err(e) => {
            error!("❌ Cannot use API URL {}: {}", config.api_base_url, e);
            std::process::exit(1);
        }
    };
    info!("🌐 Using asset server at {}", api.base_url());

    iced::daemon(DmDisplay::title, DmDisplay::update, DmDisplay::view)
        .subscription(DmDisplay::subscription)
        .theme(DmDisplay::theme)
        .run_with(move || DmDisplay::new(config, api))
}
