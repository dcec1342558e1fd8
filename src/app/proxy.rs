//! Event delivery from backend code to the UI thread.

use super::events::UserEvent;
use tao::event_loop::EventLoopProxy;

/// Fire-and-forget sender for [`UserEvent`]s. Command handlers and classify
/// tasks stay generic over this, so tests can capture events on a channel
/// instead of spinning up an event loop.
pub trait EventProxy: Send + Sync + Clone + 'static {
    fn send_event(&self, event: UserEvent);
}

impl EventProxy for EventLoopProxy<UserEvent> {
    fn send_event(&self, event: UserEvent) {
        // Sending only fails once the event loop is gone, and then there is
        // no UI left to update.
        if let Err(e) = self.send_event(event) {
            tracing::warn!("Event loop closed, dropping event: {}", e);
        }
    }
}
