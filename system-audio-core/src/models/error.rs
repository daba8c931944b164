use thiserror::Error;

/// Errors returned by session control operations and capture providers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("capture already running")]
    AlreadyCapturing,

    #[error("provider failed to start: {0}")]
    ProviderStartFailed(String),

    #[error("provider failed to stop: {0}")]
    ProviderStopFailed(String),

    #[error("device not available")]
    DeviceNotAvailable,

    #[error("configuration failed: {0}")]
    ConfigurationFailed(String),

    /// `stop()` was called from inside a delivery call. Draining would wait
    /// on the caller itself.
    #[error("stop called from the delivery thread")]
    StopFromDelivery,

    #[error("unknown error: {0}")]
    Unknown(String),
}

/// A delivery target refused a frame. The frame is dropped; capture goes on.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SinkError {
    #[error("frame rejected: {0}")]
    Rejected(String),

    #[error("sink is full")]
    Full,

    #[error("sink disconnected")]
    Disconnected,
}
