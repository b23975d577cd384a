use crate::asset::AssetProtocol;
use crate::backend::{Backend, EventSink, native::NativeBackend};
use crate::config::RwallConfig;
use crate::controller::Controller;
use crate::grid::{ClickTarget, LoadStatus, PendingImage, Tile, TileId};
use crate::protocol::{Dispatch, Envelope};
use crate::{Error, Result};
use iced::futures::SinkExt;
use iced::futures::channel::mpsc;
use iced::widget::image::Handle;
use iced::widget::{
    button, column, container, image, mouse_area, opaque, progress_bar, row, scrollable, stack,
    text,
};
use iced::{Background, Border, Color, Element, Length, Pixels, Size, Task, Theme};
use std::collections::HashMap;
use std::sync::Arc;

const THUMBNAIL_SIZE: u32 = 400;
const TILE_WIDTH: usize = 200;
const TILE_HEIGHT: usize = 150;
const SPACING: usize = 10;

macro_rules! themes {
    ($($variant:ident),*) => {
        fn string_to_theme(theme_str: &str) -> Theme {
            match theme_str {
                $(stringify!($variant) => Theme::$variant,)*
                _ => Theme::Dark,
            }
        }
    };
}

themes!(
    Dark,
    Light,
    Dracula,
    Nord,
    SolarizedLight,
    SolarizedDark,
    GruvboxLight,
    GruvboxDark,
    CatppuccinMocha,
    TokyoNight,
    KanagawaWave,
    Oxocarbon
);

#[derive(Debug, Clone)]
pub enum Message {
    Load,
    Set,
    Erase,
    Clicked(ClickTarget),
    Backend(Envelope),
    TileDecoded(TileId, std::result::Result<Handle, String>),
}

/// Forwards host events from the blocking worker into the UI stream.
struct ChannelSink {
    output: mpsc::Sender<Envelope>,
    runtime: tokio::runtime::Handle,
}

impl EventSink for ChannelSink {
    fn emit(&mut self, envelope: Envelope) {
        if let Err(e) = self.runtime.block_on(self.output.send(envelope)) {
            log::warn!("Dropping host event, the window is gone: {e}");
        }
    }
}

pub struct WallpaperPicker {
    controller: Controller<AssetProtocol>,
    backend: Arc<NativeBackend>,
    thumbnails: HashMap<TileId, Handle>,
    theme: Theme,
}

impl WallpaperPicker {
    pub fn new(config: RwallConfig) -> (Self, Task<Message>) {
        let mut controller =
            Controller::with_protocol(AssetProtocol::new(config.asset_prefix.clone()));
        controller.erase_images();

        let app = Self {
            controller,
            backend: Arc::new(NativeBackend::new(&config)),
            thumbnails: HashMap::new(),
            theme: string_to_theme(&config.theme),
        };
        (app, Task::none())
    }

    fn dispatch(&self, dispatch: Dispatch) -> Task<Message> {
        let backend = Arc::clone(&self.backend);

        let events = iced::stream::channel(100, move |output: mpsc::Sender<Envelope>| async move {
            let command = dispatch.command.name();
            let runtime = tokio::runtime::Handle::current();
            let result = tokio::task::spawn_blocking(move || {
                let mut sink = ChannelSink { output, runtime };
                backend.execute(dispatch, &mut sink)
            })
            .await;

            match result {
                Ok(Ok(())) => log::debug!("{command} finished"),
                Ok(Err(e)) => log::error!("{command} failed: {e}"),
                Err(e) => log::error!("{command} task failed: {e}"),
            }
        });

        Task::run(events, Message::Backend)
    }

    fn decode_tiles(&self, pending: Vec<PendingImage>) -> Task<Message> {
        Task::batch(pending.into_iter().map(|tile| {
            let protocol = self.controller.resolver().clone();
            Task::future(async move {
                let result = decode_thumbnail(&protocol, &tile.locator)
                    .await
                    .map_err(|e| e.to_string());
                (tile.id, result)
            })
            .map(|(id, result)| Message::TileDecoded(id, result))
        }))
    }

    fn do_update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Load => {
                let dispatch = self.controller.load();
                self.thumbnails.clear();
                self.dispatch(dispatch)
            }
            Message::Set => match self.controller.set() {
                Some(dispatch) => self.dispatch(dispatch),
                None => Task::none(),
            },
            Message::Erase => {
                let dispatch = self.controller.erase();
                self.thumbnails.clear();
                self.dispatch(dispatch)
            }
            Message::Clicked(target) => {
                self.controller.select_image(target);
                Task::none()
            }
            Message::Backend(envelope) => {
                let pending = self.controller.handle_event(envelope);
                let grid = self.controller.grid();
                self.thumbnails.retain(|id, _| grid.tile(*id).is_some());
                self.decode_tiles(pending)
            }
            Message::TileDecoded(id, result) => {
                let result = result.map(|handle| {
                    self.thumbnails.insert(id, handle);
                });
                self.controller.image_settled(id, result);
                Task::none()
            }
        }
    }

    fn tile_view(&self, tile: &Tile) -> Element<'_, Message> {
        let selected = self.controller.grid().is_selected(tile.id);
        let primary = self.theme.palette().primary;

        let content: Element<'_, Message> = match self.thumbnails.get(&tile.id) {
            Some(handle) => image(handle.clone())
                .width((TILE_WIDTH - 6) as u16)
                .height((TILE_HEIGHT - 6) as u16)
                .content_fit(iced::ContentFit::Cover)
                .into(),
            None => {
                let label = if tile.status == LoadStatus::Failed {
                    "Failed"
                } else {
                    "Loading..."
                };
                container(text(label))
                    .center_x(Length::Fill)
                    .center_y(Length::Fill)
                    .into()
            }
        };

        let framed = container(content)
            .width(TILE_WIDTH as u16)
            .height(TILE_HEIGHT as u16)
            .padding(3)
            .style(move |_theme| container::Style {
                border: Border {
                    width: if selected { 3.0 } else { 1.0 },
                    color: if selected {
                        primary
                    } else {
                        Color::from_rgb(0.5, 0.5, 0.5)
                    },
                    radius: 5.0.into(),
                },
                background: Some(Background::Color(Color::from_rgba(0.3, 0.3, 0.3, 0.5))),
                ..Default::default()
            });

        mouse_area(framed)
            .on_press(Message::Clicked(ClickTarget::Image(tile.id)))
            .into()
    }

    fn grid_view(&self, actual_width: usize) -> Element<'_, Message> {
        let tiles = self.controller.grid().tiles();
        let per_row = (actual_width.saturating_sub(SPACING) / (TILE_WIDTH + SPACING)).max(1);

        let rows: Vec<Element<'_, Message>> = tiles
            .chunks(per_row)
            .map(|chunk| {
                row(chunk.iter().map(|tile| self.tile_view(tile)))
                    .spacing(Pixels(SPACING as f32))
                    .into()
            })
            .collect();

        let grid = column(rows)
            .spacing(Pixels(SPACING as f32))
            .padding(20)
            .width(Length::Shrink);

        container(scrollable(grid).width(Length::Shrink).height(Length::Fill))
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .into()
    }

    fn modal_view(&self) -> Element<'_, Message> {
        let modal = self.controller.modal();
        let percent = modal.progress_percent().unwrap_or(0.0);

        let card = container(
            column![
                text(modal.message().unwrap_or_default()).size(18),
                progress_bar(0.0..=100.0, percent).height(8),
            ]
            .spacing(12)
            .padding(20)
            .width(Length::Fixed(360.0)),
        )
        .style(|theme: &Theme| container::Style {
            background: Some(Background::Color(theme.palette().background)),
            border: Border {
                width: 2.0,
                color: theme.palette().primary,
                radius: 8.0.into(),
            },
            ..Default::default()
        });

        opaque(
            container(card)
                .center_x(Length::Fill)
                .center_y(Length::Fill)
                .style(|_theme| container::Style {
                    background: Some(Background::Color(Color::from_rgba(0.0, 0.0, 0.0, 0.6))),
                    ..Default::default()
                }),
        )
    }

    fn toolbar_view(&self) -> Element<'_, Message> {
        let enabled = self.controller.modal().buttons_enabled();
        let action = |label: &'static str, message: Message| {
            button(text(label)).on_press_maybe(enabled.then_some(message))
        };

        row![
            action("Load", Message::Load),
            action("Set", Message::Set),
            action("Erase", Message::Erase),
        ]
        .spacing(10)
        .padding(10)
        .into()
    }
}

async fn decode_thumbnail(protocol: &AssetProtocol, locator: &str) -> Result<Handle> {
    let path = protocol
        .path_of(locator)
        .ok_or_else(|| Error::Backend(format!("Unresolvable image locator {locator}")))?;
    let bytes = tokio::fs::read(&path).await?;

    let thumbnail = tokio::task::spawn_blocking(move || -> Result<::image::RgbaImage> {
        let decoded = ::image::load_from_memory(&bytes)?;
        Ok(decoded.thumbnail(THUMBNAIL_SIZE, THUMBNAIL_SIZE).to_rgba8())
    })
    .await
    .map_err(|e| Error::Backend(format!("Thumbnail task failed: {e}")))??;

    let (width, height) = thumbnail.dimensions();
    Ok(Handle::from_rgba(width, height, thumbnail.into_raw()))
}

pub fn run_wallpaper_picker(config: RwallConfig) -> iced::Result {
    iced::application("rwall", update, view)
        .theme(|app: &WallpaperPicker| app.theme.clone())
        .window_size(Size {
            width: 870.0,
            height: 800.0,
        })
        .run_with(move || WallpaperPicker::new(config))
}

fn update(app: &mut WallpaperPicker, message: Message) -> Task<Message> {
    app.do_update(message)
}

fn view(app: &WallpaperPicker) -> Element<'_, Message> {
    let grid = iced::widget::responsive(move |size| app.grid_view(size.width as usize));

    let body: Element<'_, Message> = if app.controller.modal().is_visible() {
        stack([grid.into(), app.modal_view()]).into()
    } else {
        grid.into()
    };

    column![app.toolbar_view(), body].into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Event;
    use crate::utils::scratch_dir;

    fn picker() -> WallpaperPicker {
        let root = scratch_dir("picker");
        let config = RwallConfig {
            library_folder: root.join("rwall"),
            staging_folder: root.join("rwall_temp"),
            ..RwallConfig::default()
        };
        WallpaperPicker::new(config).0
    }

    fn pixel() -> Handle {
        Handle::from_rgba(1, 1, vec![0u8; 4])
    }

    #[test]
    fn test_starts_on_prompt() {
        let app = picker();
        assert!(app.controller.modal().is_visible());
        assert_eq!(
            app.controller.modal().message(),
            Some(crate::controller::PROMPT_MESSAGE)
        );
        assert!(app.controller.modal().buttons_enabled());
    }

    #[test]
    fn test_decoded_tiles_unblock_the_ui() {
        let mut app = picker();
        let _ = app.do_update(Message::Backend(Envelope::uncorrelated(Event::ImagesLoaded(
            vec!["/a.png".to_string(), "/b.png".to_string()],
        ))));
        let ids: Vec<TileId> = app.controller.grid().tiles().iter().map(|t| t.id).collect();
        assert_eq!(ids.len(), 2);

        let _ = app.do_update(Message::TileDecoded(ids[0], Ok(pixel())));
        assert!(app.controller.modal().is_visible());
        let _ = app.do_update(Message::TileDecoded(ids[1], Ok(pixel())));
        assert!(!app.controller.modal().is_visible());
        assert_eq!(app.thumbnails.len(), 2);

        let _ = app.do_update(Message::Clicked(ClickTarget::Image(ids[1])));
        assert!(app.controller.grid().is_selected(ids[1]));
    }

    #[test]
    fn test_rebuild_drops_stale_thumbnails() {
        let mut app = picker();
        let _ = app.do_update(Message::Backend(Envelope::uncorrelated(Event::ImagesLoaded(
            vec!["/a.png".to_string()],
        ))));
        let first = app.controller.grid().tiles()[0].id;
        let _ = app.do_update(Message::TileDecoded(first, Ok(pixel())));

        let _ = app.do_update(Message::Backend(Envelope::uncorrelated(Event::ImagesLoaded(
            vec!["/b.png".to_string()],
        ))));
        assert!(app.thumbnails.is_empty());
    }

    #[test]
    fn test_unknown_theme_falls_back_to_dark() {
        assert_eq!(string_to_theme("Nord"), Theme::Nord);
        assert_eq!(string_to_theme("Sepia"), Theme::Dark);
    }
}
