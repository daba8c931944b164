use crate::models::error::{CaptureError, SinkError};
use crate::models::state::SessionState;

/// Event hooks for capture session notifications.
///
/// `on_state_changed` and `on_provider_error` are called from the thread
/// running the control operation, with the control lock held.
/// `on_sink_error` is called from the provider's delivery thread.
/// Implementations must not call `start`/`stop` on the session.
pub trait SessionObserver: Send + Sync {
    /// Called on every lifecycle transition.
    fn on_state_changed(&self, state: SessionState);

    /// Called when the delivery target rejects a frame.
    fn on_sink_error(&self, _error: &SinkError) {}

    /// Called when the provider fails to arm or disarm.
    fn on_provider_error(&self, _error: &CaptureError) {}
}
