use system_audio_core::{AudioFrame, DeliveryTarget, SinkError};

use crate::wire::{AudioCallback, AudioData};

/// Delivers frames to a host C callback, passing the backend's storage
/// through without copying.
#[derive(Debug, Clone, Copy)]
pub struct CallbackTarget {
    callback: AudioCallback,
}

impl CallbackTarget {
    pub fn new(callback: AudioCallback) -> Self {
        Self { callback }
    }
}

impl DeliveryTarget for CallbackTarget {
    fn deliver(&self, frame: &AudioFrame<'_>) -> Result<(), SinkError> {
        let data = AudioData::from_frame(frame).map_err(|e| SinkError::Rejected(e.to_string()))?;
        (self.callback)(data);
        Ok(())
    }
}
