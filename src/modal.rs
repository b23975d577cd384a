pub const DEFAULT_PROGRESS: &str = "0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    Shown,
    #[default]
    Hidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Cloning,
    Progress,
}

impl Phase {
    pub fn is_busy(self) -> bool {
        self != Phase::Idle
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalState {
    visibility: Visibility,
    message: Option<String>,
    progress: String,
    buttons_enabled: bool,
}

impl Default for ModalState {
    fn default() -> Self {
        Self {
            visibility: Visibility::Hidden,
            message: None,
            progress: DEFAULT_PROGRESS.to_string(),
            buttons_enabled: true,
        }
    }
}

impl ModalState {
    pub fn show_modal(&mut self) {
        self.visibility = Visibility::Shown;
    }

    pub fn hide_modal(&mut self) {
        self.visibility = Visibility::Hidden;
    }

    /// Replaces the status text. `None` or an empty string clears it.
    pub fn set_message<S: Into<String>>(&mut self, message: Option<S>) {
        self.message = message.map(Into::into).filter(|m| !m.is_empty());
    }

    /// Stores the percentage verbatim. Out-of-range and non-numeric input
    /// are kept as given; see [`ModalState::progress_percent`].
    pub fn update_progress(&mut self, percent: &str) {
        self.progress = percent.to_string();
    }

    pub fn disable_buttons(&mut self) {
        self.buttons_enabled = false;
    }

    pub fn enable_buttons(&mut self) {
        self.buttons_enabled = true;
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_visible(&self) -> bool {
        self.visibility == Visibility::Shown
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn progress(&self) -> &str {
        &self.progress
    }

    /// Numeric width of the bar, or `None` when the stored value does not
    /// parse. Not clamped.
    pub fn progress_percent(&self) -> Option<f32> {
        self.progress.trim().parse::<f32>().ok().filter(|p| p.is_finite())
    }

    pub fn buttons_enabled(&self) -> bool {
        self.buttons_enabled
    }
}
