//! The host side of the command/event boundary.

#[cfg(feature = "native")]
pub mod native;

use crate::protocol::{Dispatch, Envelope};
use crate::Result;

/// Receives events pushed by a [`Backend`] while it works.
pub trait EventSink {
    fn emit(&mut self, envelope: Envelope);
}

impl<F> EventSink for F
where
    F: FnMut(Envelope),
{
    fn emit(&mut self, envelope: Envelope) {
        self(envelope)
    }
}

pub trait Backend: Send + Sync {
    /// Runs one command to completion, emitting its events on the way.
    /// Events carry `dispatch.id`.
    fn execute(&self, dispatch: Dispatch, events: &mut dyn EventSink) -> Result<()>;
}
