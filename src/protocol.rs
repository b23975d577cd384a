//! Commands sent to the host and events pushed back from it.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

pub const REPO_CLONED: &str = "REPO-CLONED";
pub const IMAGES_MOVED: &str = "IMAGES-MOVED";
pub const CLONE_PROGRESS: &str = "CLONE-PROGRESS";
pub const MOVE_PROGRESS: &str = "MOVE-PROGRESS";
pub const IMAGES_LOADED: &str = "IMAGES-LOADED";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestId(u64);

impl RequestId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "lowercase")]
pub enum Command {
    Load,
    Set { image: String },
    Erase,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Load => "load",
            Command::Set { .. } => "set",
            Command::Erase => "erase",
        }
    }
}

/// A command tagged with the id its resulting events will carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dispatch {
    pub id: RequestId,
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    RepoCloned,
    ImagesMoved,
    CloneProgress(String),
    MoveProgress(String),
    ImagesLoaded(Vec<String>),
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::RepoCloned => REPO_CLONED,
            Event::ImagesMoved => IMAGES_MOVED,
            Event::CloneProgress(_) => CLONE_PROGRESS,
            Event::MoveProgress(_) => MOVE_PROGRESS,
            Event::ImagesLoaded(_) => IMAGES_LOADED,
        }
    }

    pub fn payload(&self) -> Value {
        match self {
            Event::RepoCloned | Event::ImagesMoved => Value::Null,
            Event::CloneProgress(percent) | Event::MoveProgress(percent) => {
                Value::String(percent.clone())
            }
            Event::ImagesLoaded(paths) => {
                Value::Array(paths.iter().cloned().map(Value::String).collect())
            }
        }
    }

    /// Parses an event from its wire name and JSON payload.
    pub fn from_wire(name: &str, payload: Value) -> Result<Self> {
        match name {
            REPO_CLONED => Ok(Event::RepoCloned),
            IMAGES_MOVED => Ok(Event::ImagesMoved),
            CLONE_PROGRESS => percent_payload(name, payload).map(Event::CloneProgress),
            MOVE_PROGRESS => percent_payload(name, payload).map(Event::MoveProgress),
            IMAGES_LOADED => serde_json::from_value(payload)
                .map(Event::ImagesLoaded)
                .map_err(|e| Error::Protocol(format!("{name}: {e}"))),
            other => Err(Error::Protocol(format!("Unknown event: {other}"))),
        }
    }
}

// The host emits integer percentages; strings pass through untouched.
fn percent_payload(name: &str, payload: Value) -> Result<String> {
    match payload {
        Value::String(percent) => Ok(percent),
        Value::Number(percent) => Ok(percent.to_string()),
        other => Err(Error::Protocol(format!(
            "{name}: expected a percentage, got {other}"
        ))),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub request: Option<RequestId>,
    pub event: Event,
}

impl Envelope {
    pub fn uncorrelated(event: Event) -> Self {
        Self {
            request: None,
            event,
        }
    }

    pub fn reply(request: RequestId, event: Event) -> Self {
        Self {
            request: Some(request),
            event,
        }
    }
}
