pub mod asset;
pub mod backend;
pub mod controller;
pub mod grid;
pub mod modal;
pub mod protocol;

#[cfg(feature = "native")]
pub mod config;
#[cfg(feature = "native")]
pub mod desktop;
#[cfg(feature = "gui")]
pub mod gui;
#[cfg(feature = "native")]
pub mod utils;

pub use asset::{AssetProtocol, AssetResolver};
pub use backend::{Backend, EventSink};
pub use controller::Controller;
pub use protocol::{Command, Dispatch, Envelope, Event, RequestId};

#[cfg(feature = "native")]
pub use backend::native::NativeBackend;
#[cfg(feature = "native")]
pub use config::RwallConfig;
#[cfg(feature = "native")]
pub use desktop::WallpaperManager;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Protocol error: {0}")]
    Protocol(String),
    #[error("Desktop environment error: {0}")]
    DesktopEnv(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Backend error: {0}")]
    Backend(String),

    #[cfg(feature = "gui")]
    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, Error>;
