use crate::models::error::CaptureError;

pub use crate::session::relay::FrameRelay;

/// Identity of the backend behind a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderInfo {
    pub id: String,
    pub name: String,
}

/// Interface for the backend that actually produces audio.
///
/// Implemented outside this crate by OS capture backends, or through the
/// C function table in `system-audio-ffi`.
pub trait CaptureProvider: Send {
    /// Whether this capture source can currently be armed.
    fn is_available(&self) -> bool;

    /// Arm the backend. From now until `stop` returns, the backend may call
    /// `relay.deliver(..)` from any of its threads at its own cadence.
    ///
    /// Returning `Ok` is the acknowledgment that capture is running.
    fn start(&mut self, relay: FrameRelay) -> Result<(), CaptureError>;

    /// Disarm the backend and release its resources.
    ///
    /// Should not return while the backend's own threads are still
    /// producing, but the session tolerates late relay calls.
    fn stop(&mut self) -> Result<(), CaptureError>;

    fn info(&self) -> ProviderInfo;
}
