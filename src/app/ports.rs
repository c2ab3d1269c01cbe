//! Port traits decoupling the application core from the tag stack and
//! from whatever consumes its events.
//!
//! The detector only talks to these traits. Production wires in
//! `TagsEngine` and `LogEventSink`; tests wire in recording doubles.

use crate::app::events::AppEvent;
use crate::tags::types::{Completion, Status, TagIntf};

/// Command surface of the tag stack.
///
/// Commands are accepted or rejected synchronously; the outcome of an
/// accepted command arrives later through [`TagsConsumer::on_completion`].
/// A synchronous `Failed` means no completion will follow for that call.
pub trait TagsPort {
    /// Reset and initialize the controller.
    fn cmd_reset(&mut self) -> Status;
    /// Start polling for tags.
    fn cmd_discover(&mut self) -> Status;
    /// Deactivate the active tag and re-arm discovery.
    fn cmd_deactivate(&mut self) -> Status;
}

/// Receives operation completions from the tag stack.
///
/// `tag` is only present for [`crate::tags::types::OpId::DiscoverActivated`]
/// completions where the activated tag was recognized; an activation of an
/// unsupported tag technology completes with `Ok` and no tag.
pub trait TagsConsumer {
    fn on_completion(&mut self, completion: Completion, tag: Option<&TagIntf>, sink: &mut dyn EventSink);
}

/// Outbound application events (state changes, detections, errors).
pub trait EventSink {
    fn emit(&mut self, event: &AppEvent);
}
