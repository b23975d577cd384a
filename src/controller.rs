//! Presentation-side coordination of the modal, the image grid and the
//! host's command/event traffic.
//!
//! The controller never talks to the host itself. Operations that need
//! the host return a [`Dispatch`] for the caller to deliver, and host
//! events are fed back through [`Controller::handle_event`].

use crate::asset::{strip_asset_prefix, AssetProtocol, AssetResolver, ASSET_PREFIX};
use crate::grid::{ClickTarget, ImageGrid, PendingImage, TileId, WaitOutcome};
use crate::modal::{ModalState, Phase, DEFAULT_PROGRESS};
use crate::protocol::{Command, Dispatch, Envelope, Event, RequestId};

pub const PROMPT_MESSAGE: &str = "Click Load";
pub const DOWNLOADING_MESSAGE: &str = "Downloading files...";
pub const MOVING_MESSAGE: &str = "Moving files...";
pub const RENDERING_MESSAGE: &str = "Loading images...";

pub struct Controller<R = AssetProtocol> {
    modal: ModalState,
    grid: ImageGrid,
    resolver: R,
    asset_prefix: String,
    phase: Phase,
    next_request: u64,
    active_load: Option<RequestId>,
    latest_load: Option<RequestId>,
}

impl Default for Controller<AssetProtocol> {
    fn default() -> Self {
        Self::with_protocol(AssetProtocol::default())
    }
}

impl Controller<AssetProtocol> {
    pub fn with_protocol(protocol: AssetProtocol) -> Self {
        let prefix = protocol.prefix().to_string();
        Self::new(protocol, prefix)
    }
}

impl<R: AssetResolver> Controller<R> {
    /// `asset_prefix` is stripped from locators before they go back to the
    /// host in a `set` command.
    pub fn new(resolver: R, asset_prefix: impl Into<String>) -> Self {
        Self {
            modal: ModalState::default(),
            grid: ImageGrid::new(),
            resolver,
            asset_prefix: asset_prefix.into(),
            phase: Phase::Idle,
            next_request: 0,
            active_load: None,
            latest_load: None,
        }
    }

    pub fn with_resolver(resolver: R) -> Self {
        Self::new(resolver, ASSET_PREFIX)
    }

    pub fn modal(&self) -> &ModalState {
        &self.modal
    }

    pub fn grid(&self) -> &ImageGrid {
        &self.grid
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn active_load(&self) -> Option<RequestId> {
        self.active_load
    }

    fn dispatch(&mut self, command: Command) -> Dispatch {
        self.next_request += 1;
        Dispatch {
            id: RequestId::new(self.next_request),
            command,
        }
    }

    /// Clears the grid and blocks the UI until the host reports back.
    /// Supersedes any load still in flight.
    pub fn load(&mut self) -> Dispatch {
        log::info!("Load requested");
        self.erase_images();
        self.modal.show_modal();
        self.modal.set_message(Some(DOWNLOADING_MESSAGE));
        self.modal.disable_buttons();
        self.phase = Phase::Loading;

        let dispatch = self.dispatch(Command::Load);
        self.latest_load = Some(dispatch.id);
        if let Some(previous) = self.active_load.replace(dispatch.id) {
            log::warn!("Load {} superseded by {}", previous, dispatch.id);
        }
        dispatch
    }

    /// Asks the host to apply the selected image. Without a selection
    /// nothing is sent.
    pub fn set(&mut self) -> Option<Dispatch> {
        let image = {
            let selected = self.grid.selected()?;
            strip_asset_prefix(&selected.locator, &self.asset_prefix).to_string()
        };
        log::info!("Set requested for {image}");
        Some(self.dispatch(Command::Set { image }))
    }

    pub fn erase(&mut self) -> Dispatch {
        log::info!("Erase requested");
        self.erase_images();
        self.dispatch(Command::Erase)
    }

    /// Empties the grid, drops the selection and shows the prompt.
    pub fn erase_images(&mut self) {
        self.grid.clear();
        self.modal.set_message(Some(PROMPT_MESSAGE));
        self.modal.show_modal();
    }

    /// Rebuilds the grid. The returned images must be loaded by the view
    /// and reported through [`Controller::image_settled`].
    pub fn add_images(&mut self, images: &[String]) -> Vec<PendingImage> {
        self.modal.set_message(Some(RENDERING_MESSAGE));
        let pending = self.grid.populate(images, &self.resolver);
        log::debug!("Rendering {} images", pending.len());

        if let Some(outcome) = self.grid.settle_if_empty() {
            self.finish_wait(outcome);
        }
        pending
    }

    pub fn select_image(&mut self, target: ClickTarget) -> bool {
        self.grid.select(target)
    }

    /// Load or error signal for one rendered image.
    pub fn image_settled(&mut self, id: TileId, result: Result<(), String>) {
        match self.grid.record_load(id, result) {
            Some(outcome) => self.finish_wait(outcome),
            None => {
                if self.grid.tile(id).is_none() {
                    log::debug!("Ignoring load signal for removed tile {id:?}");
                }
            }
        }
    }

    fn finish_wait(&mut self, outcome: WaitOutcome) {
        match outcome {
            WaitOutcome::AllLoaded => {
                log::info!("All {} images loaded", self.grid.len());
                self.modal.hide_modal();
            }
            WaitOutcome::Failed { path, reason } => {
                log::error!("Failed to load {path}: {reason}");
                self.modal.set_message(Some(format!("Failed to load {path}")));
                self.modal.hide_modal();
            }
        }
        self.modal.enable_buttons();
        self.phase = Phase::Idle;
        self.active_load = None;
    }

    // Only the most recent load counts, whether or not it has settled.
    fn is_stale(&self, request: Option<RequestId>) -> bool {
        match (request, self.latest_load) {
            (Some(request), Some(latest)) => request != latest,
            _ => false,
        }
    }

    /// Applies one host event. A grid rebuild returns the images to load.
    pub fn handle_event(&mut self, envelope: Envelope) -> Vec<PendingImage> {
        if self.is_stale(envelope.request) {
            log::debug!(
                "Dropping {} from superseded request {:?}",
                envelope.event.name(),
                envelope.request
            );
            return Vec::new();
        }

        match envelope.event {
            Event::RepoCloned => {
                self.modal.set_message(Some(MOVING_MESSAGE));
                self.phase = Phase::Cloning;
            }
            Event::ImagesMoved => {
                self.modal.set_message(None::<String>);
                self.modal.hide_modal();
                self.modal.update_progress(DEFAULT_PROGRESS);
                self.phase = Phase::Idle;
            }
            Event::CloneProgress(percent) | Event::MoveProgress(percent) => {
                self.modal.update_progress(&percent);
                if self.phase.is_busy() {
                    self.phase = Phase::Progress;
                }
            }
            Event::ImagesLoaded(images) => {
                self.erase_images();
                if !self.phase.is_busy() {
                    self.phase = Phase::Loading;
                }
                return self.add_images(&images);
            }
        }
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::LoadStatus;
    use crate::modal::Visibility;

    fn controller() -> Controller {
        Controller::default()
    }

    fn loaded(paths: &[&str]) -> Event {
        Event::ImagesLoaded(paths.iter().map(|p| p.to_string()).collect())
    }

    #[test]
    fn test_load_then_full_cycle() {
        let mut ctl = controller();
        let dispatch = ctl.load();
        assert_eq!(dispatch.command, Command::Load);
        assert!(ctl.grid().is_empty());
        assert!(ctl.modal().is_visible());
        assert_eq!(ctl.modal().message(), Some(DOWNLOADING_MESSAGE));
        assert!(!ctl.modal().buttons_enabled());
        assert_eq!(ctl.phase(), Phase::Loading);

        ctl.handle_event(Envelope::reply(dispatch.id, Event::RepoCloned));
        assert_eq!(ctl.modal().message(), Some(MOVING_MESSAGE));
        assert!(ctl.modal().is_visible());
        assert_eq!(ctl.phase(), Phase::Cloning);

        let pending = ctl.handle_event(Envelope::reply(dispatch.id, loaded(&["a.png", "b.png"])));
        assert_eq!(pending.len(), 2);
        assert_eq!(ctl.grid().len(), 2);
        assert!(ctl.modal().is_visible());
        assert!(!ctl.modal().buttons_enabled());

        for image in &pending {
            ctl.image_settled(image.id, Ok(()));
        }
        assert!(!ctl.modal().is_visible());
        assert!(ctl.modal().buttons_enabled());
        assert_eq!(ctl.phase(), Phase::Idle);
        assert_eq!(ctl.active_load(), None);
    }

    #[test]
    fn test_progress_events_only_move_the_bar() {
        let mut ctl = controller();
        let dispatch = ctl.load();
        ctl.handle_event(Envelope::reply(
            dispatch.id,
            Event::CloneProgress("57".to_string()),
        ));
        assert_eq!(ctl.modal().progress(), "57");
        assert_eq!(ctl.modal().message(), Some(DOWNLOADING_MESSAGE));
        assert!(ctl.modal().is_visible());
        assert_eq!(ctl.phase(), Phase::Progress);

        ctl.handle_event(Envelope::uncorrelated(Event::MoveProgress("abc".to_string())));
        assert_eq!(ctl.modal().progress(), "abc");
    }

    #[test]
    fn test_images_moved_resets_modal() {
        let mut ctl = controller();
        let dispatch = ctl.load();
        ctl.handle_event(Envelope::reply(dispatch.id, Event::MoveProgress("80".to_string())));
        ctl.handle_event(Envelope::reply(dispatch.id, Event::ImagesMoved));

        assert_eq!(ctl.modal().visibility(), Visibility::Hidden);
        assert_eq!(ctl.modal().message(), None);
        assert_eq!(ctl.modal().progress(), "0");
        assert_eq!(ctl.phase(), Phase::Idle);
        assert!(!ctl.modal().buttons_enabled());
    }

    #[test]
    fn test_erase_images_from_any_state() {
        let mut ctl = controller();
        let dispatch = ctl.load();
        let pending = ctl.handle_event(Envelope::reply(dispatch.id, loaded(&["a.png"])));
        ctl.image_settled(pending[0].id, Ok(()));
        ctl.select_image(ClickTarget::Image(pending[0].id));

        ctl.erase_images();
        assert!(ctl.grid().is_empty());
        assert!(ctl.grid().selected().is_none());
        assert!(ctl.modal().is_visible());
        assert_eq!(ctl.modal().message(), Some(PROMPT_MESSAGE));
    }

    #[test]
    fn test_erase_clears_and_dispatches() {
        let mut ctl = controller();
        let dispatch = ctl.erase();
        assert_eq!(dispatch.command, Command::Erase);
        assert!(ctl.grid().is_empty());
        assert_eq!(ctl.modal().message(), Some(PROMPT_MESSAGE));
    }

    #[test]
    fn test_last_click_wins() {
        let mut ctl = controller();
        let pending = ctl.add_images(&["1.png".to_string(), "2.png".to_string()]);

        assert!(ctl.select_image(ClickTarget::Image(pending[1].id)));
        assert!(ctl.select_image(ClickTarget::Image(pending[0].id)));
        assert!(!ctl.select_image(ClickTarget::Background));

        let marked: Vec<&str> = ctl
            .grid()
            .tiles()
            .iter()
            .filter(|t| ctl.grid().is_selected(t.id))
            .map(|t| t.path.as_str())
            .collect();
        assert_eq!(marked, ["1.png"]);
    }

    #[test]
    fn test_set_without_selection_sends_nothing() {
        let mut ctl = controller();
        assert_eq!(ctl.set(), None);
        ctl.add_images(&["a.png".to_string()]);
        assert_eq!(ctl.set(), None);
    }

    #[test]
    fn test_set_strips_asset_prefix() {
        let mut ctl = controller();
        let pending = ctl.add_images(&["/home/me/Pictures/rwall/a.png".to_string()]);
        ctl.select_image(ClickTarget::Image(pending[0].id));

        let dispatch = ctl.set().unwrap();
        assert_eq!(
            dispatch.command,
            Command::Set {
                image: "%2Fhome%2Fme%2FPictures%2Frwall%2Fa.png".to_string()
            }
        );
    }

    #[test]
    fn test_set_passes_foreign_locators_through() {
        let mut ctl = Controller::with_resolver(|path: &str| format!("file://{path}"));
        let pending = ctl.add_images(&["/a.png".to_string()]);
        ctl.select_image(ClickTarget::Image(pending[0].id));
        assert_eq!(
            ctl.set().map(|d| d.command),
            Some(Command::Set {
                image: "file:///a.png".to_string()
            })
        );
    }

    #[test]
    fn test_rebuild_does_not_accumulate() {
        let mut ctl = controller();
        ctl.handle_event(Envelope::uncorrelated(loaded(&["a.png", "b.png", "c.png"])));
        ctl.handle_event(Envelope::uncorrelated(loaded(&["d.png"])));
        assert_eq!(ctl.grid().len(), 1);
        assert_eq!(ctl.grid().tiles()[0].path, "d.png");
        assert_eq!(ctl.modal().message(), Some(RENDERING_MESSAGE));
    }

    #[test]
    fn test_empty_image_list_returns_to_idle() {
        let mut ctl = controller();
        let dispatch = ctl.load();
        let pending = ctl.handle_event(Envelope::reply(dispatch.id, loaded(&[])));
        assert!(pending.is_empty());
        assert!(!ctl.modal().is_visible());
        assert!(ctl.modal().buttons_enabled());
        assert_eq!(ctl.phase(), Phase::Idle);
    }

    #[test]
    fn test_failed_image_unblocks_grid_and_buttons() {
        let mut ctl = controller();
        let dispatch = ctl.load();
        let pending = ctl.handle_event(Envelope::reply(dispatch.id, loaded(&["a.png", "b.png"])));

        ctl.image_settled(pending[1].id, Err("decode error".to_string()));
        assert!(!ctl.modal().is_visible());
        assert_eq!(ctl.modal().message(), Some("Failed to load b.png"));
        assert!(ctl.modal().buttons_enabled());
        assert_eq!(ctl.grid().tiles()[1].status, LoadStatus::Failed);

        ctl.image_settled(pending[0].id, Ok(()));
        assert_eq!(ctl.grid().tiles()[0].status, LoadStatus::Loaded);
        assert!(ctl.select_image(ClickTarget::Image(pending[0].id)));
        assert!(!ctl.modal().is_visible());
    }

    #[test]
    fn test_second_load_supersedes_first() {
        let mut ctl = controller();
        let first = ctl.load();
        let second = ctl.load();
        assert_ne!(first.id, second.id);
        assert_eq!(ctl.active_load(), Some(second.id));

        let stale = ctl.handle_event(Envelope::reply(first.id, loaded(&["old.png"])));
        assert!(stale.is_empty());
        assert!(ctl.grid().is_empty());
        ctl.handle_event(Envelope::reply(first.id, Event::RepoCloned));
        assert_eq!(ctl.modal().message(), Some(DOWNLOADING_MESSAGE));

        let fresh = ctl.handle_event(Envelope::reply(second.id, loaded(&["new.png"])));
        assert_eq!(fresh.len(), 1);
        assert_eq!(ctl.grid().tiles()[0].path, "new.png");
    }

    #[test]
    fn test_signals_from_torn_down_grid_are_ignored() {
        let mut ctl = controller();
        let dispatch = ctl.load();
        let old = ctl.handle_event(Envelope::reply(dispatch.id, loaded(&["a.png"])));
        let dispatch = ctl.load();
        ctl.handle_event(Envelope::reply(dispatch.id, loaded(&["b.png"])));

        ctl.image_settled(old[0].id, Ok(()));
        assert!(ctl.modal().is_visible());
        assert!(!ctl.modal().buttons_enabled());
    }

    #[test]
    fn test_superseded_load_stays_stale_after_settling() {
        let mut ctl = controller();
        let first = ctl.load();
        let second = ctl.load();
        let pending = ctl.handle_event(Envelope::reply(second.id, loaded(&["new.png"])));
        ctl.image_settled(pending[0].id, Ok(()));
        assert_eq!(ctl.active_load(), None);
        assert_eq!(ctl.phase(), Phase::Idle);

        let late = ctl.handle_event(Envelope::reply(first.id, loaded(&["old.png"])));
        assert!(late.is_empty());
        ctl.handle_event(Envelope::reply(first.id, Event::RepoCloned));
        ctl.handle_event(Envelope::reply(first.id, Event::CloneProgress("40".to_string())));

        assert_eq!(ctl.grid().tiles()[0].path, "new.png");
        assert!(!ctl.modal().is_visible());
        assert_eq!(ctl.modal().progress(), "0");
        assert_eq!(ctl.phase(), Phase::Idle);
    }
}
