//! # system-audio-core
//!
//! Platform-agnostic system audio capture session.
//!
//! Owns the capture lifecycle (idle → starting → capturing → stopping → idle),
//! serializes start/stop against each other, and relays every frame a
//! backend produces to a single registered delivery target. Backends
//! implement the `CaptureProvider` trait; consumers implement
//! `DeliveryTarget` or use one of the sinks.
//!
//! Frames are borrowed views of the backend's storage, valid for one
//! delivery call. Copying out (`AudioFrame::to_owned_frame`) is the only way
//! to keep samples.
//!
//! ## Architecture
//!
//! ```text
//! system-audio-core (this crate)
//! ├── traits/    ← CaptureProvider, DeliveryTarget, SessionObserver
//! ├── models/    ← AudioFrame, SessionState, CaptureError, SessionConfig, diagnostics
//! ├── session/   ← CaptureSession (control side), FrameRelay (delivery side)
//! └── sinks/     ← ChannelSink, RollingBufferSink
//! ```

pub mod models;
pub mod session;
pub mod sinks;
pub mod traits;

#[cfg(test)]
pub(crate) mod testing;

// Re-export key types at crate root for convenience.
pub use models::config::{FrameValidation, SessionConfig};
pub use models::diagnostics::SessionDiagnostics;
pub use models::error::{CaptureError, SinkError};
pub use models::frame::{AudioFrame, FrameFormat, OwnedAudioFrame};
pub use models::state::SessionState;
pub use session::controller::CaptureSession;
pub use session::relay::FrameRelay;
pub use sinks::channel::ChannelSink;
pub use sinks::ring_buffer::RingBuffer;
pub use sinks::rolling::RollingBufferSink;
pub use traits::capture_provider::{CaptureProvider, ProviderInfo};
pub use traits::delivery_target::DeliveryTarget;
pub use traits::session_observer::SessionObserver;
