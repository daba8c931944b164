use crate::models::error::SinkError;
use crate::models::frame::AudioFrame;

/// The consumer registered for one capture span.
///
/// `deliver` runs synchronously on a provider thread. The frame borrows the
/// provider's storage and cannot outlive the call; copy it out with
/// [`AudioFrame::to_owned_frame`] to keep it. Returning an error drops the
/// frame and nothing else: capture keeps running.
///
/// Any `Fn(&AudioFrame<'_>) -> Result<(), SinkError>` closure is a target.
pub trait DeliveryTarget: Send + Sync {
    fn deliver(&self, frame: &AudioFrame<'_>) -> Result<(), SinkError>;
}

impl<F> DeliveryTarget for F
where
    F: Fn(&AudioFrame<'_>) -> Result<(), SinkError> + Send + Sync,
{
    fn deliver(&self, frame: &AudioFrame<'_>) -> Result<(), SinkError> {
        self(frame)
    }
}
